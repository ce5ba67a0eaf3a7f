//! PDF text extraction via lopdf

use super::traits::TextDecoder;
use crate::error::{DecodeError, Result};
use std::path::Path;
use tracing::debug;

/// Extracts the text layer of every page, one page per line block
///
/// Scanned PDFs without a text layer yield an empty string; the resolver
/// treats that as "nothing extracted" and moves on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDecoder;

impl TextDecoder for PdfDecoder {
    fn decode(&self, path: &Path) -> Result<String> {
        let document = lopdf::Document::load(path).map_err(|e| DecodeError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut text = String::new();
        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    debug!(?path, page = page_number, error = %e, "skipping unreadable PDF page");
                }
            }
        }
        Ok(text)
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".pdf"]
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}
