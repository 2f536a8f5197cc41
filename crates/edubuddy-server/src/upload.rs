//! The "share a note" workflow: validate, store the file, record the note.
//!
//! Validation happens before anything is written. The file goes to blob
//! storage first and the note record second, so a record never points at a
//! file that was not stored. If the record insert fails the stored file is
//! left in place and its key is logged.

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use edubuddy_shared::validate::{validate_file, NoteSubmission};
use edubuddy_shared::Note;

use crate::backend::{BlobStorage, NoteStore};
use crate::blob_store::object_key;
use crate::error::ServerError;

/// A submitted upload form: metadata plus the attached file.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub submission: NoteSubmission,
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Where uploads land and how big they may be.
#[derive(Debug, Clone)]
pub struct UploadPolicy<'a> {
    pub prefix: &'a str,
    pub max_size: usize,
}

pub async fn share_note(
    notes: &dyn NoteStore,
    blobs: &dyn BlobStorage,
    policy: UploadPolicy<'_>,
    req: UploadRequest,
) -> Result<Note, ServerError> {
    req.submission.validate()?;
    validate_file(req.file_name.as_deref(), req.data.len(), policy.max_size)?;

    // validate_file rejected a missing name above
    let file_name = req.file_name.as_deref().unwrap_or_default();
    let key = object_key(policy.prefix, file_name, Utc::now().timestamp_millis());

    let stored = blobs.upload(&key, &req.data).await?;

    let new_note = req
        .submission
        .into_new_note(stored.public_url.clone(), stored.key.clone());

    match notes.insert_note(new_note).await {
        Ok(note) => {
            info!(
                id = %note.id,
                key = %stored.key,
                size = req.data.len(),
                subject = %note.subject,
                "Note shared"
            );
            Ok(note)
        }
        Err(e) => {
            warn!(key = %stored.key, error = %e, "Stored file has no note record");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use edubuddy_shared::ValidationError;

    use crate::backend::fakes::{MemoryBlobs, MemoryNotes};

    fn policy() -> UploadPolicy<'static> {
        UploadPolicy {
            prefix: "pdfs",
            max_size: 1024,
        }
    }

    fn request() -> UploadRequest {
        UploadRequest {
            submission: NoteSubmission {
                name: "Asha".into(),
                year: "3rd Year".into(),
                semester: "5th".into(),
                title: "DBMS Unit 1".into(),
                subject: "Computer Science".into(),
                category: "Lecture Notes".into(),
                description: "ER diagrams".into(),
            },
            file_name: Some("dbms unit1.pdf".into()),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn test_share_note_stores_file_then_record() {
        let notes = MemoryNotes::default();
        let blobs = MemoryBlobs::default();

        let note = share_note(&notes, &blobs, policy(), request()).await.unwrap();

        assert_eq!(note.title, "DBMS Unit 1");
        assert_eq!(note.uploaded_by, "Asha");
        assert!(note.file_path.starts_with("pdfs/"));
        assert!(note.file_path.ends_with("-dbms_unit1.pdf"));
        assert_eq!(note.file_url, format!("mem://{}", note.file_path));
        assert_eq!(blobs.read(&note.file_path).await.unwrap(), b"%PDF-1.4");
        assert_eq!(notes.list_notes().await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn test_invalid_submission_touches_nothing() {
        let notes = MemoryNotes::default();
        let blobs = MemoryBlobs::default();

        let mut req = request();
        req.submission.title = " ".into();
        let err = share_note(&notes, &blobs, policy(), req).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Validation(ValidationError::MissingField("title"))
        ));

        let mut req = request();
        req.file_name = Some("virus.exe".into());
        assert!(share_note(&notes, &blobs, policy(), req).await.is_err());

        let mut req = request();
        req.data = Bytes::from(vec![0u8; 2048]);
        let err = share_note(&notes, &blobs, policy(), req).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Validation(ValidationError::FileTooLarge { .. })
        ));

        assert_eq!(blobs.len().await, 0);
        assert!(notes.list_notes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let notes = MemoryNotes::default();
        let blobs = MemoryBlobs::default();

        let mut req = request();
        req.file_name = None;
        req.data = Bytes::new();
        let err = share_note(&notes, &blobs, policy(), req).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(ValidationError::MissingFile)));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_blob() {
        let notes = MemoryNotes::failing_inserts();
        let blobs = MemoryBlobs::default();

        let err = share_note(&notes, &blobs, policy(), request()).await.unwrap_err();
        assert!(matches!(err, ServerError::Store(_)));
        assert_eq!(blobs.len().await, 1);
        assert!(notes.list_notes().await.unwrap().is_empty());
    }
}
