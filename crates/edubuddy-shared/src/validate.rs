//! Input checks for the note upload form.
//!
//! Everything here runs before the file is sent anywhere, so a rejected
//! submission has no side effects.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, ACADEMIC_YEARS, CATEGORIES, STREAMS};
use crate::constants::ALLOWED_EXTENSIONS;
use crate::error::ValidationError;
use crate::types::NewNote;

/// Metadata fields of an upload, as typed into the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteSubmission {
    /// Display name of the submitter.
    pub name: String,
    pub year: String,
    pub semester: String,
    pub title: String,
    pub subject: String,
    pub category: String,
    pub description: String,
}

impl NoteSubmission {
    /// Check required fields and catalog membership.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("title", &self.title)?;
        require("year", &self.year)?;
        require("semester", &self.semester)?;
        require("subject", &self.subject)?;
        require("category", &self.category)?;

        let year = self.year.trim();
        let semester = self.semester.trim();
        one_of("year", year, ACADEMIC_YEARS)?;
        one_of("subject", self.subject.trim(), STREAMS)?;
        one_of("category", self.category.trim(), CATEGORIES)?;

        let allowed = catalog::semesters_for_year(year).unwrap_or(&[]);
        if !allowed.contains(&semester) {
            return Err(ValidationError::SemesterMismatch {
                year: year.to_string(),
                semester: semester.to_string(),
            });
        }
        Ok(())
    }

    pub fn into_new_note(self, file_url: String, file_path: String) -> NewNote {
        NewNote {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            subject: self.subject.trim().to_string(),
            category: self.category.trim().to_string(),
            academic_year: self.year.trim().to_string(),
            semester: self.semester.trim().to_string(),
            uploaded_by: self.name.trim().to_string(),
            file_url,
            file_path,
        }
    }
}

/// Check an uploaded file's presence, size and extension.
pub fn validate_file(
    file_name: Option<&str>,
    size: usize,
    max_size: usize,
) -> Result<(), ValidationError> {
    let Some(file_name) = file_name.filter(|n| !n.trim().is_empty()) else {
        return Err(ValidationError::MissingFile);
    };
    if size == 0 {
        return Err(ValidationError::MissingFile);
    }
    if size > max_size {
        return Err(ValidationError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    match file_extension(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::UnsupportedFileType(file_name.to_string())),
    }
}

/// Lowercased extension of a file name, without the dot.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn one_of(field: &'static str, value: &str, options: &[&str]) -> Result<(), ValidationError> {
    if options.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownOption {
            field,
            value: value.to_string(),
        })
    }
}
