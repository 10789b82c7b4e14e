//! services/api/src/extract.rs
//!
//! Turns an uploaded binary document into plain text.
//!
//! Exactly two input shapes are accepted, distinguished by the declared
//! media type: PDF and Word-processing documents. Styling is discarded;
//! only the text survives. The original binary is not kept anywhere.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

/// Media type for PDF documents.
pub const MEDIA_TYPE_PDF: &str = "application/pdf";
/// Media type for Open XML word documents (`.docx`).
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Media type for legacy Word documents (`.doc`).
pub const MEDIA_TYPE_DOC: &str = "application/msword";

/// Typed failure for text extraction. The `Display` messages are user-facing;
/// the underlying parser error is logged, never surfaced.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to extract text from file. Please try again with a different file.")]
    ExtractionFailed,
}

/// Extracts plain text from `bytes` according to the declared media type.
///
/// Pure function over bytes in, text out. Any internal parse failure
/// (corrupt file, truncated stream) is re-signaled uniformly as
/// [`ExtractError::ExtractionFailed`].
pub fn extract_text(bytes: &[u8], media_type: &str) -> Result<String, ExtractError> {
    let result = match media_type {
        MEDIA_TYPE_PDF => extract_pdf(bytes),
        // Legacy `.doc` payloads are attempted through the same path; they
        // fail the zip open and surface as an extraction failure.
        MEDIA_TYPE_DOCX | MEDIA_TYPE_DOC => extract_docx(bytes),
        other => return Err(ExtractError::UnsupportedFormat(other.to_string())),
    };

    result.map_err(|cause| {
        warn!(media_type, %cause, "document text extraction failed");
        ExtractError::ExtractionFailed
    })
}

/// Decodes the PDF content streams into concatenated page text.
fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

/// Unzips an OOXML word document and walks `word/document.xml`, collecting
/// run text (`w:t`) with newlines at paragraph boundaries and explicit
/// breaks, tabs for `w:tab`.
fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut document_xml)
        .map_err(|e| e.to_string())?;

    let mut reader = Reader::from_reader(document_xml.as_bytes());
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(|e| e.to_string())? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = true,
                b"w:br" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                text.push_str(&t.xml_content().map_err(|e| e.to_string())?);
            }
            Event::GeneralRef(r) if in_run_text => {
                if let Some(ch) = r.resolve_char_ref().map_err(|e| e.to_string())? {
                    text.push(ch);
                } else {
                    let name = r.decode().map_err(|e| e.to_string())?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| format!("unknown entity: {}", name))?;
                    text.push_str(resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
