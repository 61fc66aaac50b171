//! Metadata extraction seam.
//!
//! Content-aware extraction (reading the PDF text, calling a model) is a
//! separate service behind this trait. The built-in fallback derives a
//! usable title from the upload filename so the pipeline always produces
//! a pass.

use chrono::{DateTime, Utc};

use crate::pdf::PdfInfo;
use crate::wallet::DocumentType;

/// What the builder needs to know about a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassMetadata {
    /// Human-readable title, shown as the pass description.
    pub title: String,
    pub document_type: DocumentType,
    /// Event start, when known. Drives expiry and relevance.
    pub event_date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub seat: Option<String>,
    /// Payload for the pass barcode, when the document carries one.
    pub barcode_message: Option<String>,
}

/// Trait for metadata extraction backends.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, filename: &str, info: &PdfInfo) -> PassMetadata;
}

/// Extractor that derives everything from the upload filename.
pub struct FilenameExtractor;

/// Longest title the fallback will produce.
const MAX_TITLE_LEN: usize = 60;

const EVENT_KEYWORDS: &[&str] = &["ticket", "event", "concert", "admission", "entry"];

impl FilenameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FilenameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor for FilenameExtractor {
    fn extract(&self, filename: &str, _info: &PdfInfo) -> PassMetadata {
        let stem = filename
            .rsplit('/')
            .next()
            .unwrap_or(filename)
            .trim_end_matches(".pdf")
            .trim_end_matches(".PDF");

        let mut title: String = stem
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if title.is_empty() {
            title = "Document".to_string();
        }
        if title.chars().count() > MAX_TITLE_LEN {
            title = title.chars().take(MAX_TITLE_LEN).collect();
        }

        let lowered = title.to_lowercase();
        let document_type = if EVENT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            DocumentType::EventTicket
        } else {
            DocumentType::Generic
        };

        PassMetadata {
            title,
            document_type,
            event_date: None,
            venue: None,
            seat: None,
            barcode_message: None,
        }
    }
}
