//! Insert and read operations for [`Note`] records.
//!
//! Notes are immutable: the store assigns `id` and `upload_date` on insert
//! and never touches the row again.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use edubuddy_shared::types::{NewNote, Note};

use crate::database::Database;
use crate::error::{Result, StoreError};

const NOTE_COLUMNS: &str = "id, title, description, subject, category, year, semester, \
                            uploaded_by, upload_date, file_url, file_path";

impl Database {
    /// Persist a new note and return the stored record.
    ///
    /// `upload_date` is the current time, clamped so that it is never earlier
    /// than the newest stored note. Listing order therefore always matches
    /// insertion order.
    pub fn insert_note(&self, new: NewNote) -> Result<Note> {
        if new.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".into()));
        }

        let latest: Option<String> = self
            .conn()
            .query_row("SELECT MAX(upload_date) FROM notes", [], |row| row.get(0))
            .optional()?
            .flatten();
        // Stored with microsecond precision; truncate so the returned record
        // equals what a later read yields.
        let mut upload_date = Utc::now().trunc_subsecs(6);
        if let Some(latest) = latest.as_deref().map(parse_timestamp).transpose()? {
            upload_date = upload_date.max(latest);
        }

        let note = new.into_note(Uuid::new_v4().to_string(), upload_date);

        self.conn().execute(
            &format!(
                "INSERT INTO notes ({NOTE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                note.id,
                note.title,
                note.description,
                note.subject,
                note.category,
                note.academic_year,
                note.semester,
                note.uploaded_by,
                format_timestamp(&note.upload_date),
                note.file_url,
                note.file_path,
            ],
        )?;

        tracing::debug!(id = %note.id, title = %note.title, "inserted note");
        Ok(note)
    }

    /// All notes, newest first.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             ORDER BY upload_date DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], row_to_note)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    pub fn count_notes(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

// Fixed-width UTC form so that text ordering equals time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Invalid(format!("bad upload_date {s:?}: {e}")))
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let date_str: String = row.get(8)?;
    let upload_date: DateTime<Utc> = DateTime::parse_from_rfc3339(&date_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        subject: row.get(3)?,
        category: row.get(4)?,
        academic_year: row.get(5)?,
        semester: row.get(6)?,
        uploaded_by: row.get(7)?,
        upload_date,
        file_url: row.get(9)?,
        file_path: row.get(10)?,
    })
}
