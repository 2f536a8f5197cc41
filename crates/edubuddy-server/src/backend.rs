//! Collaborator interfaces used by the HTTP handlers.
//!
//! Handlers never reach for a global client: the document store, the blob
//! store and the chat-completion provider are passed in through
//! [`crate::api::AppState`] as trait objects, so tests can swap in fakes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

use edubuddy_shared::types::{ChatTurn, NewNote, Note};
use edubuddy_store::Database;

use crate::blob_store::BlobStore;
use crate::error::ServerError;

/// Structured record storage for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Every note, newest first.
    async fn list_notes(&self) -> Result<Vec<Note>, ServerError>;

    /// Persist a new note; either the record exists afterwards or it does not.
    async fn insert_note(&self, note: NewNote) -> Result<Note, ServerError>;
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBlob {
    pub key: String,
    pub public_url: String,
}

/// Object storage for uploaded files.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `key`, refusing to overwrite.
    async fn upload(&self, key: &str, data: &[u8]) -> Result<StoredBlob, ServerError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, ServerError>;
}

/// "Generate a completion from a conversation", nothing more.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, conversation: &[ChatTurn]) -> Result<String, ServerError>;
}

/// [`NoteStore`] over the local SQLite database. Queries run on the
/// blocking pool; the connection is locked only inside that closure.
#[derive(Clone)]
pub struct SqliteNoteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteNoteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub async fn count_notes(&self) -> Result<u64, ServerError> {
        self.with_db(|db| db.count_notes())
            .await?
            .map_err(|e| ServerError::StoreUnavailable(e.to_string()))
    }

    async fn with_db<T, F>(&self, f: F) -> Result<edubuddy_store::Result<T>, ServerError>
    where
        F: FnOnce(&Database) -> edubuddy_store::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| ServerError::Internal("database lock poisoned".into()))?;
            Ok(f(&db))
        })
        .await
        .map_err(|e| ServerError::Internal(format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn list_notes(&self) -> Result<Vec<Note>, ServerError> {
        self.with_db(|db| db.list_notes())
            .await?
            .map_err(|e| ServerError::StoreUnavailable(e.to_string()))
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, ServerError> {
        Ok(self.with_db(move |db| db.insert_note(note)).await??)
    }
}

#[async_trait]
impl BlobStorage for BlobStore {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<StoredBlob, ServerError> {
        self.store_blob(key, data).await?;
        Ok(StoredBlob {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, ServerError> {
        self.get_blob(key).await
    }
}

/// In-memory collaborators for handler and workflow tests.
#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;

    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryNotes {
        notes: Mutex<Vec<Note>>,
        fail_inserts: bool,
        unavailable: bool,
    }

    impl MemoryNotes {
        /// Seeded with `notes`, which must already be newest first.
        pub fn with_notes(notes: Vec<Note>) -> Self {
            Self {
                notes: Mutex::new(notes),
                ..Default::default()
            }
        }

        pub fn failing_inserts() -> Self {
            Self {
                fail_inserts: true,
                ..Default::default()
            }
        }

        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl NoteStore for MemoryNotes {
        async fn list_notes(&self) -> Result<Vec<Note>, ServerError> {
            if self.unavailable {
                return Err(ServerError::StoreUnavailable("connection refused".into()));
            }
            Ok(self.notes.lock().await.clone())
        }

        async fn insert_note(&self, note: NewNote) -> Result<Note, ServerError> {
            if self.fail_inserts {
                return Err(ServerError::Store("disk full".into()));
            }
            let mut notes = self.notes.lock().await;
            let note = note.into_note(format!("n{}", notes.len() + 1), Utc::now());
            notes.insert(0, note.clone());
            Ok(note)
        }
    }

    #[derive(Default)]
    pub struct MemoryBlobs {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryBlobs {
        pub async fn len(&self) -> usize {
            self.objects.lock().await.len()
        }

        fn public_url(key: &str) -> String {
            format!("mem://{key}")
        }
    }

    #[async_trait]
    impl BlobStorage for MemoryBlobs {
        async fn upload(&self, key: &str, data: &[u8]) -> Result<StoredBlob, ServerError> {
            let mut objects = self.objects.lock().await;
            if objects.contains_key(key) {
                return Err(ServerError::BlobExists(key.into()));
            }
            objects.insert(key.to_string(), data.to_vec());
            Ok(StoredBlob {
                key: key.to_string(),
                public_url: Self::public_url(key),
            })
        }

        async fn read(&self, key: &str) -> Result<Vec<u8>, ServerError> {
            self.objects
                .lock()
                .await
                .get(key)
                .cloned()
                .ok_or_else(|| ServerError::NotFound(key.into()))
        }
    }

    /// Answers every conversation with the last user turn echoed back.
    pub struct EchoChat;

    #[async_trait]
    impl ChatCompletion for EchoChat {
        async fn complete(&self, conversation: &[ChatTurn]) -> Result<String, ServerError> {
            let last = conversation.last().map(|t| t.content.as_str()).unwrap_or("");
            Ok(format!("echo ({} turns): {last}", conversation.len()))
        }
    }
}
