//! v001 -- Initial schema creation.
//!
//! Creates the `notes` table. Column names follow the hosted table the web
//! client was first written against (`year`, `uploaded_by`, `file_url`, ...).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id          TEXT PRIMARY KEY NOT NULL,          -- UUID v4
    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT NOT NULL DEFAULT '',
    subject     TEXT NOT NULL,                      -- stream / branch
    category    TEXT NOT NULL,
    year        TEXT NOT NULL,                      -- academic year label
    semester    TEXT NOT NULL,
    uploaded_by TEXT NOT NULL,
    upload_date TEXT NOT NULL,                      -- RFC-3339, fixed width, UTC
    file_url    TEXT NOT NULL,
    file_path   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_upload_date ON notes(upload_date DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
