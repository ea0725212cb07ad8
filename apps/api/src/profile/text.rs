//! Plain-text extraction from uploaded resumes.
//!
//! PDF parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::errors::AppError;
use crate::profile::upload::ResumeKind;

#[derive(Debug, Error)]
pub enum TextExtractionError {
    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("DOCX container error: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document body exceeds {limit} bytes when decompressed")]
    Inflated { limit: u64 },
}

/// Ceiling on the decompressed `word/document.xml`; a small DOCX can inflate far past the upload limit.
pub const MAX_DOCX_XML_BYTES: u64 = 20 * 1024 * 1024;

pub async fn extract_text(kind: ResumeKind, bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text_blocking(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("text extraction task failed: {e}")))?
        .map_err(|e| {
            warn!("Failed to extract text from {:?} upload: {e}", kind);
            AppError::UnprocessableEntity(format!(
                "Failed to extract text from {}",
                kind.extension().to_uppercase()
            ))
        })?;

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract text from the uploaded file".to_string(),
        ));
    }
    Ok(text)
}

pub fn extract_text_blocking(kind: ResumeKind, bytes: &[u8]) -> Result<String, TextExtractionError> {
    match kind {
        ResumeKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| TextExtractionError::Pdf(e.to_string())),
        ResumeKind::Docx => docx_text(bytes),
        ResumeKind::Doc => Ok(legacy_doc_text(bytes)),
    }
}

fn docx_text(bytes: &[u8]) -> Result<String, TextExtractionError> {
    docx_text_limited(bytes, MAX_DOCX_XML_BYTES)
}

fn docx_text_limited(bytes: &[u8], limit: u64) -> Result<String, TextExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let entry = archive.by_name("word/document.xml")?;
    if entry.size() > limit {
        return Err(TextExtractionError::Inflated { limit });
    }

    // The declared size can lie; never read more than one byte past the limit.
    let mut xml = String::new();
    entry.take(limit + 1).read_to_string(&mut xml)?;
    if xml.len() as u64 > limit {
        return Err(TextExtractionError::Inflated { limit });
    }
    Ok(document_xml_text(&xml))
}

fn docx_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br/>")
            .expect("docx token regex is valid")
    })
}

/// Flattens WordprocessingML body XML into text, one line per paragraph.
fn document_xml_text(xml: &str) -> String {
    let mut text = String::new();
    for caps in docx_token_regex().captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&unescape_xml(run.as_str())),
            None => match &caps[0] {
                "<w:tab/>" => text.push('\t'),
                _ => text.push('\n'),
            },
        }
    }
    text
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Legacy .doc is a binary format; keep the readable characters of a lossy decode.
fn legacy_doc_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !(c.is_control() || *c == '\u{FFFD}'))
        .collect()
}
