//! Shared document fixtures.

/// A minimal single-page PDF that passes structural validation.
pub fn minimal_pdf() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"%PDF-1.4\n");
    bytes.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    bytes.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    bytes.extend_from_slice(
        b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >> endobj\n",
    );
    bytes.extend_from_slice(b"trailer << /Root 1 0 R >>\n");
    bytes.extend_from_slice(b"%%EOF");
    bytes
}
