//! Upload validation. Runs before any storage or AI call so invalid files never
//! leave the process.

use thiserror::Error;

/// Largest accepted resume, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Pdf,
    Doc,
    Docx,
}

impl ResumeKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary".
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            MIME_PDF => Some(Self::Pdf),
            MIME_DOC => Some(Self::Doc),
            MIME_DOCX => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Doc => MIME_DOC,
            Self::Docx => MIME_DOCX,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Invalid file type '{0}'. Only PDF, DOC, and DOCX are supported.")]
    UnsupportedType(String),

    #[error("File is too large ({size} bytes). The maximum size is {limit} bytes (5 MB).")]
    TooLarge { size: usize, limit: usize },

    #[error("The uploaded file is empty.")]
    Empty,
}

/// Checks the declared MIME type and size of an uploaded resume.
/// The type check runs first, so a disallowed type is reported whatever its size.
pub fn validate_upload(content_type: &str, size: usize) -> Result<ResumeKind, UploadRejection> {
    let kind = ResumeKind::from_mime(content_type)
        .ok_or_else(|| UploadRejection::UnsupportedType(content_type.to_string()))?;
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    if size == 0 {
        return Err(UploadRejection::Empty);
    }
    Ok(kind)
}
