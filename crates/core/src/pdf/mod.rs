//! Structural PDF validation for upload intake.
//!
//! Content extraction (text, barcodes) is a delegated service; the intake
//! only guards the pipeline against inputs that are not well-formed PDFs.

use thiserror::Error;

/// Error type for PDF validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdfError {
    #[error("PDF file is empty")]
    Empty,

    #[error("Not a PDF: missing %PDF header")]
    NotAPdf,

    #[error("PDF is truncated: missing %%EOF trailer")]
    Truncated,

    #[error("Encrypted PDFs are not supported")]
    Encrypted,

    #[error("PDF has no pages")]
    NoPages,
}

/// Basic facts about a validated PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    /// Version from the header, e.g. "1.7".
    pub version: String,
    /// Number of page objects found.
    pub page_count: usize,
    pub size_bytes: usize,
}

/// Trait for PDF intake validation backends.
pub trait PdfValidator: Send + Sync {
    fn validate(&self, bytes: &[u8]) -> Result<PdfInfo, PdfError>;
}

/// Validator that checks PDF structure without parsing content.
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfValidator for StructuralValidator {
    fn validate(&self, bytes: &[u8]) -> Result<PdfInfo, PdfError> {
        if bytes.is_empty() {
            return Err(PdfError::Empty);
        }

        // The header is allowed a small amount of leading junk.
        let head = &bytes[..bytes.len().min(1024)];
        let header_pos = find(head, b"%PDF-").ok_or(PdfError::NotAPdf)?;
        let version = read_version(&bytes[header_pos + 5..]);

        // %%EOF must appear near the end of the file.
        let tail_start = bytes.len().saturating_sub(1024);
        if find(&bytes[tail_start..], b"%%EOF").is_none() {
            return Err(PdfError::Truncated);
        }

        if find(bytes, b"/Encrypt").is_some() {
            return Err(PdfError::Encrypted);
        }

        let page_count = count_page_objects(bytes);
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        Ok(PdfInfo {
            version,
            page_count,
            size_bytes: bytes.len(),
        })
    }
}

fn read_version(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|b| !b.is_ascii_whitespace())
        .map(|&b| b as char)
        .collect()
}

/// Count `/Type /Page` object markers, excluding `/Type /Pages` tree nodes.
fn count_page_objects(bytes: &[u8]) -> usize {
    let mut count = 0;
    for needle in [b"/Type /Page".as_slice(), b"/Type/Page".as_slice()] {
        let mut from = 0;
        while let Some(pos) = find(&bytes[from..], needle) {
            let end = from + pos + needle.len();
            if bytes.get(end) != Some(&b's') {
                count += 1;
            }
            from = end;
        }
    }
    count
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::minimal_pdf;

    fn validate(bytes: &[u8]) -> Result<PdfInfo, PdfError> {
        StructuralValidator::new().validate(bytes)
    }

    #[test]
    fn test_valid_pdf() {
        let info = validate(&minimal_pdf()).unwrap();
        assert_eq!(info.version, "1.4");
        assert_eq!(info.page_count, 1);
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(validate(b""), Err(PdfError::Empty));
    }

    #[test]
    fn test_not_a_pdf() {
        assert_eq!(validate(b"hello world"), Err(PdfError::NotAPdf));
    }

    #[test]
    fn test_truncated_pdf() {
        let mut bytes = minimal_pdf();
        // Drop the %%EOF trailer.
        bytes.truncate(bytes.len() - 6);
        assert_eq!(validate(&bytes), Err(PdfError::Truncated));
    }

    #[test]
    fn test_encrypted_pdf_rejected() {
        let mut bytes = minimal_pdf();
        let insert_at = bytes.len() - 6;
        bytes.splice(insert_at..insert_at, b"/Encrypt 4 0 R\n".iter().copied());
        assert_eq!(validate(&bytes), Err(PdfError::Encrypted));
    }

    #[test]
    fn test_no_pages() {
        let bytes = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF".to_vec();
        assert_eq!(validate(&bytes), Err(PdfError::NoPages));
    }

    #[test]
    fn test_pages_node_not_counted_as_page() {
        // A /Type /Pages tree node alone is not a page.
        let bytes =
            b"%PDF-1.4\n2 0 obj << /Type /Pages /Count 0 >> endobj\n%%EOF".to_vec();
        assert_eq!(validate(&bytes), Err(PdfError::NoPages));
    }

    #[test]
    fn test_compact_page_marker() {
        let bytes = b"%PDF-1.7\n3 0 obj << /Type/Page >> endobj\n%%EOF".to_vec();
        let info = validate(&bytes).unwrap();
        assert_eq!(info.version, "1.7");
        assert_eq!(info.page_count, 1);
    }
}
