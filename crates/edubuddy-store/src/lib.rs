//! # edubuddy-store
//!
//! Document store for shared notes, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`, runs schema migrations on open, and provides typed
//! helpers for the note records. Notes are insert-only: there is no update or
//! delete path.

pub mod database;
pub mod migrations;
pub mod notes;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
