//! Upload decoding.
//!
//! Uploads are read as UTF-8. Anything that is not valid UTF-8 is read as
//! Windows-1252, the WHATWG single-byte Western encoding.

use encoding_rs::WINDOWS_1252;
use html2xlsx_common::{ProcessingError, Result};
use tracing::warn;

/// Decode uploaded bytes into text.
pub fn decode_upload(bytes: &[u8]) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => {
            warn!(
                "Upload is not valid UTF-8 ({}), falling back to {}",
                e,
                WINDOWS_1252.name()
            );
            let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            if had_errors {
                return Err(ProcessingError::Encoding);
            }
            Ok(text.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let text = decode_upload("<p>café</p>".as_bytes()).unwrap();
        assert_eq!(text, "<p>café</p>");
    }

    #[test]
    fn test_latin_fallback() {
        // 0xE9 is 'é' in Latin-1 / Windows-1252 and invalid as lone UTF-8
        let bytes = b"<p>caf\xE9</p>";
        let text = decode_upload(bytes).unwrap();
        assert_eq!(text, "<p>café</p>");
    }

    #[test]
    fn test_windows_1252_specials() {
        // 0x93/0x94 are curly quotes in Windows-1252
        let text = decode_upload(b"\x93quoted\x94").unwrap();
        assert_eq!(text, "\u{201C}quoted\u{201D}");
    }

    #[test]
    fn test_empty_upload() {
        assert_eq!(decode_upload(b"").unwrap(), "");
    }
}
