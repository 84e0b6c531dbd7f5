//! Document text extraction
//!
//! Extraction never fails: unsupported or unreadable input yields a
//! bracketed placeholder string that flows through the pipeline like any
//! other document text, so a bad upload degrades instead of erroring.

use tracing::debug;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv", "log"];

/// Turns uploaded bytes into plain text
pub trait DocumentExtractor: Send + Sync {
    /// Extract text from raw bytes. Infallible: returns a placeholder
    /// description when the format is unsupported.
    fn extract_text(&self, bytes: &[u8], filename: &str) -> String;
}

/// Extractor for plain-text formats
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8], filename: &str) -> String {
        let extension = filename
            .rsplit('.')
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();

        if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return String::from_utf8_lossy(bytes).into_owned();
        }

        // Unknown extension but valid UTF-8 is still usable text
        if let Ok(text) = std::str::from_utf8(bytes) {
            debug!(filename, "treating unknown extension as plain text");
            return text.to_string();
        }

        format!(
            "[Unsupported format: '{filename}' could not be read as text. \
             Supported formats: txt, md, markdown, csv, log.]"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extension_lossy_decodes() {
        let extractor = PlainTextExtractor;
        let text = extractor.extract_text(b"hello \xff world", "notes.txt");
        assert!(text.starts_with("hello "));
        assert!(text.ends_with(" world"));
    }

    #[test]
    fn test_unknown_extension_valid_utf8() {
        let extractor = PlainTextExtractor;
        let text = extractor.extract_text("plan: ship".as_bytes(), "plan.cfg");
        assert_eq!(text, "plan: ship");
    }

    #[test]
    fn test_binary_yields_placeholder() {
        let extractor = PlainTextExtractor;
        let text = extractor.extract_text(&[0xff, 0xfe, 0x00, 0x01], "chart.png");
        assert!(text.starts_with("[Unsupported format"));
        assert!(text.contains("chart.png"));
    }
}
