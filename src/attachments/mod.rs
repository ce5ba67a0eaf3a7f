//! Attachment resolution and text extraction
//!
//! For a comment whose detail payload includes attachments, the
//! [`AttachmentResolver`] walks every attachment's file formats in server
//! order, downloads the eligible ones into a per-comment scratch directory,
//! and decodes them until one yields non-empty text.
//!
//! ## Decoders
//!
//! Extraction is pluggable through the [`TextDecoder`] trait. Two decoders
//! ship behind cargo features, both enabled by default:
//!
//! - `pdf`: [`PdfDecoder`] (lopdf)
//! - `docx`: [`DocxDecoder`] (docx-rs), also tried for legacy `.doc`
//!
//! A format whose decoder is absent is still reported via `has_attachment`,
//! it just never contributes text.

mod clean;
#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;
mod traits;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use clean::clean_text;
#[cfg(feature = "docx")]
pub use docx::DocxDecoder;
#[cfg(feature = "pdf")]
pub use pdf::PdfDecoder;
pub use traits::{DecoderCapabilities, DecoderSet, TextDecoder};

use crate::api::CommentDetail;
use crate::error::{DecodeError, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Extensions considered for download and extraction
pub const ELIGIBLE_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc"];

/// Outcome of resolving one comment's attachments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Cleaned text of the first attachment that decoded to non-empty text
    pub text: String,
    /// At least one attachment file URL was present
    pub has_attachment: bool,
    /// Attachments that were tried and failed, in order
    pub failures: Vec<AttachmentFailure>,
}

/// A download or decode failure for one attachment file
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentFailure {
    /// File URL that failed
    pub url: String,
    /// Error message
    pub error: String,
}

/// Downloads and decodes comment attachments
#[derive(Debug, Clone)]
pub struct AttachmentResolver {
    http: reqwest::Client,
    decoders: DecoderSet,
    temp_root: Option<PathBuf>,
}

impl AttachmentResolver {
    /// Build a resolver
    ///
    /// `temp_root` is the parent for per-comment scratch directories; `None`
    /// uses the system temp directory.
    pub fn new(http: reqwest::Client, decoders: DecoderSet, temp_root: Option<PathBuf>) -> Self {
        Self {
            http,
            decoders,
            temp_root,
        }
    }

    /// Formats this resolver can extract
    pub fn capabilities(&self) -> DecoderCapabilities {
        self.decoders.capabilities()
    }

    /// Resolve the attachments of one comment
    ///
    /// Never fails: download and decode errors are logged, collected in
    /// [`Resolution::failures`], and scanning continues. The scratch
    /// directory is removed before this returns, on every path.
    pub async fn resolve(&self, detail: &CommentDetail) -> Resolution {
        let mut resolution = Resolution::default();
        if detail.included.is_empty() {
            return resolution;
        }

        let scratch = match self.scratch_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!(comment_id = %detail.data.id, error = %e, "cannot create scratch directory, skipping downloads");
                None
            }
        };

        let mut downloads = 0usize;
        for resource in detail.included.iter().filter(|r| r.is_attachment()) {
            for format in resource.file_formats() {
                let Some(url) = format.url() else {
                    continue;
                };
                resolution.has_attachment = true;

                let extension = file_extension(url);
                if !ELIGIBLE_EXTENSIONS.contains(&extension.as_str()) {
                    debug!(url, extension = %extension, "attachment format not eligible for extraction");
                    continue;
                }
                let Some(decoder) = self.decoders.for_extension(&extension) else {
                    debug!(url, extension = %extension, "no decoder available for attachment format");
                    continue;
                };
                let Some(dir) = scratch.as_ref() else {
                    continue;
                };

                downloads += 1;
                let dest = dir.path().join(format!("attachment-{}{}", downloads, extension));
                info!(comment_id = %detail.data.id, url, "downloading attachment");

                match self.extract(url, &dest, decoder).await {
                    Ok(text) => {
                        debug!(comment_id = %detail.data.id, chars = text.len(), "attachment text extracted");
                        resolution.text = text;
                        return resolution;
                    }
                    Err(e) => {
                        warn!(comment_id = %detail.data.id, url, error = %e, "attachment extraction failed");
                        resolution.failures.push(AttachmentFailure {
                            url: url.to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        resolution
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("regs-harvest-");
        match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    async fn extract(&self, url: &str, dest: &Path, decoder: Arc<dyn TextDecoder>) -> Result<String> {
        self.download(url, dest).await?;

        let path = dest.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || decoder.decode(&path))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("decoder task panicked: {}", e))))??;

        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(DecodeError::Empty {
                path: dest.to_path_buf(),
            }
            .into());
        }
        Ok(text)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let download_error = |reason: String| DecodeError::Download {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// Lowercase extension (with leading dot) of a URL's path, or "" if none
pub fn file_extension(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}
