use thiserror::Error;

/// Problems with a submitted note, detected before any remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Please select a file to upload")]
    MissingFile,

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported file type: {0} (allowed: PDF, DOC, DOCX, TXT, PPT, PPTX)")]
    UnsupportedFileType(String),

    #[error("Unknown {field}: {value}")]
    UnknownOption { field: &'static str, value: String },

    #[error("Semester {semester} does not belong to {year}")]
    SemesterMismatch { year: String, semester: String },
}
