//! Decoder trait and the set of decoders available to a run

use std::path::Path;
use std::sync::Arc;

/// Turns a downloaded attachment into plain text
///
/// Decoders are synchronous; the resolver runs them on the blocking pool.
/// The returned text is raw: cleaning and trimming happen in the resolver.
///
/// # Examples
///
/// ```no_run
/// use regs_harvest::attachments::{DecoderSet, TextDecoder};
/// use std::path::Path;
///
/// let decoders = DecoderSet::builtin();
/// if let Some(decoder) = decoders.for_extension(".pdf") {
///     let text = decoder.decode(Path::new("attachment-1.pdf"))?;
///     println!("{} chars via {}", text.len(), decoder.name());
/// }
/// # Ok::<(), regs_harvest::Error>(())
/// ```
pub trait TextDecoder: Send + Sync {
    /// Extract the text of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) when the file cannot be
    /// read or parsed.
    fn decode(&self, path: &Path) -> crate::Result<String>;

    /// Lowercase extensions (with leading dot) this decoder accepts
    fn extensions(&self) -> &'static [&'static str];

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Which attachment formats this build can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderCapabilities {
    /// PDF text extraction available
    pub pdf: bool,
    /// DOCX (and legacy DOC) text extraction available
    pub docx: bool,
}

impl DecoderCapabilities {
    /// True when at least one format can be extracted
    pub fn any(&self) -> bool {
        self.pdf || self.docx
    }
}

/// Ordered collection of decoders, looked up by file extension
#[derive(Clone, Default)]
pub struct DecoderSet {
    decoders: Vec<Arc<dyn TextDecoder>>,
}

impl DecoderSet {
    /// No decoders: every attachment is recorded but never extracted
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decoders compiled into this build (`pdf` and `docx` features)
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut set = Self::empty();
        #[cfg(feature = "pdf")]
        {
            set = set.with(super::pdf::PdfDecoder);
        }
        #[cfg(feature = "docx")]
        {
            set = set.with(super::docx::DocxDecoder);
        }
        set
    }

    /// Add a decoder; earlier decoders win on overlapping extensions
    pub fn with(mut self, decoder: impl TextDecoder + 'static) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    /// Decoder for a lowercase extension such as ".pdf"
    pub fn for_extension(&self, extension: &str) -> Option<Arc<dyn TextDecoder>> {
        self.decoders
            .iter()
            .find(|d| d.extensions().iter().any(|e| *e == extension))
            .cloned()
    }

    /// Capabilities derived from the registered decoders
    pub fn capabilities(&self) -> DecoderCapabilities {
        DecoderCapabilities {
            pdf: self.for_extension(".pdf").is_some(),
            docx: self.for_extension(".docx").is_some(),
        }
    }
}

impl std::fmt::Debug for DecoderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.decoders.iter().map(|d| d.name()))
            .finish()
    }
}
