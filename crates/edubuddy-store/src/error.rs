use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No home/data directory to put the default database in.
    #[error("No data directory available for the notes database")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A note was rejected before it reached SQLite (e.g. blank title).
    #[error("Invalid note: {0}")]
    Invalid(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
