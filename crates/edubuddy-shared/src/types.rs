use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// A shared study resource. Created once by the upload workflow, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Stream / branch, e.g. "Computer Science".
    pub subject: String,
    pub category: String,
    #[serde(rename = "year")]
    pub academic_year: String,
    pub semester: String,
    pub uploaded_by: String,
    pub upload_date: DateTime<Utc>,
    pub file_url: String,
    pub file_path: String,
}

impl Note {
    /// Field values the search box looks at. `description` is deliberately
    /// left out.
    pub fn indexed_fields(&self) -> [&str; 6] {
        [
            &self.title,
            &self.subject,
            &self.category,
            &self.academic_year,
            &self.semester,
            &self.uploaded_by,
        ]
    }
}

/// Fields of a note before the document store assigns `id` and `upload_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub category: String,
    #[serde(rename = "year")]
    pub academic_year: String,
    pub semester: String,
    pub uploaded_by: String,
    pub file_url: String,
    pub file_path: String,
}

impl NewNote {
    pub fn into_note(self, id: String, upload_date: DateTime<Utc>) -> Note {
        Note {
            id,
            title: self.title,
            description: self.description,
            subject: self.subject,
            category: self.category,
            academic_year: self.academic_year,
            semester: self.semester,
            uploaded_by: self.uploaded_by,
            upload_date,
            file_url: self.file_url,
            file_path: self.file_path,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
}

/// A chat bubble. Lives only as long as the client session that shows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceLink>>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            resources: None,
        }
    }

    pub fn with_resources(mut self, resources: Vec<ResourceLink>) -> Self {
        self.resources = Some(resources);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of a conversation forwarded to the chat-completion provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_serializes_with_client_field_names() {
        let note = NewNote {
            title: "DBMS Unit 1".into(),
            description: String::new(),
            subject: "Computer Science".into(),
            category: "Lecture Notes".into(),
            academic_year: "3rd Year".into(),
            semester: "5th".into(),
            uploaded_by: "Asha".into(),
            file_url: "http://localhost/files/pdfs/1-a.pdf".into(),
            file_path: "pdfs/1-a.pdf".into(),
        }
        .into_note("n1".into(), Utc::now());

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["year"], "3rd Year");
        assert_eq!(json["uploadedBy"], "Asha");
        assert_eq!(json["fileUrl"], "http://localhost/files/pdfs/1-a.pdf");
        assert!(json.get("uploadDate").is_some());
    }

    #[test]
    fn chat_message_omits_missing_resources() {
        let msg = ChatMessage::new(Sender::User, "dbms notes");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert!(json.get("resources").is_none());
    }

    #[test]
    fn chat_turn_roles_are_lowercase() {
        let turn = ChatTurn::system("be nice");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "system");
    }
}
