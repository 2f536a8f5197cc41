//! Bot replies for the note-search chat.

use crate::types::{ChatMessage, Note, ResourceLink, Sender};

pub const NO_MATCH_REPLY: &str = "I couldn't find any matching notes for your query. Please try being more specific about the subject, year, or semester you're looking for.";

pub const LIBRARY_UNAVAILABLE_REPLY: &str = "I couldn't reach the notes library right now, so I can't search it. Please try again in a moment.";

/// Build the bot message listing `notes`, with one download link per note.
pub fn compose_reply(notes: &[Note]) -> ChatMessage {
    if notes.is_empty() {
        return ChatMessage::new(Sender::Bot, NO_MATCH_REPLY);
    }

    let plural = if notes.len() > 1 { "s" } else { "" };
    let listing = notes
        .iter()
        .map(|note| {
            format!(
                "📚 {}\n   Subject: {}\n   Year: {}, Semester: {}\n   Category: {}\n",
                note.title, note.subject, note.academic_year, note.semester, note.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!(
        "I found {} note{} that might help:\n\n{}",
        notes.len(),
        plural,
        listing
    );

    let resources = notes
        .iter()
        .map(|note| ResourceLink {
            title: note.title.clone(),
            url: note.file_url.clone(),
        })
        .collect();

    ChatMessage::new(Sender::Bot, text).with_resources(resources)
}

/// Reply used when the document store could not be read.
pub fn unavailable_reply() -> ChatMessage {
    ChatMessage::new(Sender::Bot, LIBRARY_UNAVAILABLE_REPLY)
}
