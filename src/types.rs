//! Core types for regs-harvest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Docket identifier, e.g. "FSIS-2010-0004"
///
/// No structure is assumed beyond being non-empty after trimming.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocketId(String);

impl DocketId {
    /// Trim and validate a caller-supplied docket id
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("docket id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The id as sent to the API
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with hyphens removed, for file names
    pub fn file_stem(&self) -> String {
        self.0.replace('-', "")
    }
}

impl std::fmt::Display for DocketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Event emitted while a harvest runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HarvestEvent {
    /// Documents of the docket have been listed
    DocumentsListed {
        /// Number of documents found
        count: usize,
    },

    /// Comments on one document have been listed
    CommentsListed {
        /// Object id of the commented-on document
        object_id: String,
        /// Comments listed for this document
        count: usize,
        /// Comments listed so far across all documents
        total: usize,
    },

    /// One comment row was written
    CommentHarvested {
        /// 1-based position of the comment in the run
        index: usize,
        /// Comments listed so far
        total: usize,
        /// Comment id
        id: String,
        /// Row text came from an attachment
        from_attachment: bool,
        /// Comment has at least one attachment file
        has_attachment: bool,
    },

    /// An attachment could not be downloaded or decoded
    AttachmentFailed {
        /// Comment id
        comment_id: String,
        /// File URL
        url: String,
        /// Error message
        error: String,
    },

    /// The CSV file is complete
    Finished {
        /// Path of the written file
        path: PathBuf,
        /// Number of data rows
        rows: usize,
    },
}
