//! Plain-text extraction.
//!
//! The one extractor with a fatal failure mode: bytes that are not valid
//! UTF-8 are a client error (the upload is not the text file it claims to
//! be), surfaced as [`LingodocError::InvalidEncoding`] and mapped to a 400
//! by the HTTP layer — never an unhandled crash.

use super::ExtractedDocument;
use crate::error::LingodocError;

/// Decode the byte stream as UTF-8 text, verbatim.
pub fn extract(bytes: Vec<u8>, filename: &str) -> Result<ExtractedDocument, LingodocError> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(ExtractedDocument::from_text(text)),
        Err(e) => Err(LingodocError::InvalidEncoding {
            filename: filename.to_string(),
            detail: e.utf8_error().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decodes_verbatim() {
        let doc = extract(b"Hello world".to_vec(), "hello.txt").unwrap();
        assert_eq!(doc.text(), "Hello world");
    }

    #[test]
    fn multibyte_utf8_survives() {
        let doc = extract("héllo wörld — 你好".as_bytes().to_vec(), "i18n.txt").unwrap();
        assert_eq!(doc.text(), "héllo wörld — 你好");
    }

    #[test]
    fn invalid_utf8_is_a_client_error() {
        let err = extract(vec![0xff, 0xfe, 0x00], "bad.txt").unwrap_err();
        assert!(matches!(err, LingodocError::InvalidEncoding { .. }));
        assert!(err.to_string().contains("bad.txt"));
    }
}
