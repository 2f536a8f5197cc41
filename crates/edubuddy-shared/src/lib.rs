// Domain types and pure logic shared by the store and the HTTP server.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod matcher;
pub mod reply;
pub mod types;
pub mod validate;

pub use error::ValidationError;
pub use matcher::{MatchPolicy, NoteMatcher};
pub use types::{ChatMessage, NewNote, Note, ResourceLink, Sender};
