//! Wire types for the regulations.gov v4 JSON:API payloads
//!
//! Only the fields the harvester reads are modelled. Everything the API may
//! omit or send as `null` is an `Option`, so a missing attribute never turns
//! into a lookup failure deeper in the pipeline; a payload with the wrong
//! shape is rejected by serde at the boundary instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Endpoint paths relative to the API base URL
pub mod endpoints {
    /// Document listing, filtered by docket
    pub const DOCUMENTS: &str = "documents";
    /// Comment listing, filtered by the commented-on document
    pub const COMMENTS: &str = "comments";

    /// Single comment, with attachments included
    pub fn comment(id: &str) -> String {
        format!("{}/{}", COMMENTS, id)
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Paging metadata; absent means "no further pages"
    #[serde(default)]
    pub meta: ListMeta,
}

/// Paging metadata of a list response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Server says another page follows
    #[serde(default)]
    pub has_next_page: bool,
    /// Total items across all pages, when reported
    #[serde(default)]
    pub total_elements: Option<u64>,
}

/// A document attached to a docket
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    /// Document id (e.g. "FSIS-2010-0004-0001")
    pub id: String,
    /// Document attributes
    #[serde(default)]
    pub attributes: DocumentAttributes,
}

/// Attributes of a document; only `objectId` is interpreted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttributes {
    /// Internal object id that comments refer to via `commentOnId`
    #[serde(default)]
    pub object_id: Option<String>,
    /// Every other attribute, untouched
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// A comment as returned by the comment list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CommentSummary {
    /// Comment id
    pub id: String,
    /// Attributes from the listing (no comment text)
    #[serde(default)]
    pub attributes: CommentAttributes,
}

/// Comment attributes shared by the list and detail endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAttributes {
    /// Comment title
    #[serde(default)]
    pub title: Option<String>,
    /// Inline comment text (detail endpoint only)
    #[serde(default)]
    pub comment: Option<String>,
    /// Posting timestamp as sent by the API
    #[serde(default)]
    pub posted_date: Option<String>,
    /// Document type (normally "Public Submission")
    #[serde(default)]
    pub document_type: Option<String>,
}

/// Response of `GET /comments/{id}?include=attachments`
#[derive(Debug, Clone, Deserialize)]
pub struct CommentDetail {
    /// The comment itself
    pub data: CommentData,
    /// Included resources (attachments)
    #[serde(default)]
    pub included: Vec<IncludedResource>,
}

/// Primary data of a comment detail response
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    /// Comment id
    pub id: String,
    /// Full attributes, including the inline text
    #[serde(default)]
    pub attributes: CommentAttributes,
}

/// Resource type string used for attachments in `included`
pub const ATTACHMENT_TYPE: &str = "attachments";

/// Entry of the `included` array
#[derive(Debug, Clone, Deserialize)]
pub struct IncludedResource {
    /// JSON:API resource type
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource attributes
    #[serde(default)]
    pub attributes: IncludedAttributes,
}

impl IncludedResource {
    /// True for attachment resources
    pub fn is_attachment(&self) -> bool {
        self.resource_type == ATTACHMENT_TYPE
    }

    /// File formats of this resource, in server order
    pub fn file_formats(&self) -> &[FileFormat] {
        self.attributes.file_formats.as_deref().unwrap_or(&[])
    }
}

/// Attributes of an included resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedAttributes {
    /// Downloadable renditions of the attachment
    #[serde(default)]
    pub file_formats: Option<Vec<FileFormat>>,
}

/// One downloadable rendition of an attachment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFormat {
    /// Download URL
    #[serde(default)]
    pub file_url: Option<String>,
    /// Format label sent by the API ("pdf", "docx", ...)
    #[serde(default)]
    pub format: Option<String>,
}

impl FileFormat {
    /// The URL, if present and non-blank
    pub fn url(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}
