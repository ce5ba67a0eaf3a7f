//! # regs-harvest
//!
//! Harvests public comments for a regulations.gov docket into a CSV file.
//!
//! ## Pipeline
//!
//! - **Key rotation** ([`keys`]): several API keys share the load; a key that
//!   hits its quota is rotated away from and retried after a full cycle.
//! - **Fetching** ([`client`], [`retry`]): one request at a time, bounded
//!   retries, HTTP 200 is the only success. Exhaustion means "no data", not
//!   an error.
//! - **Pagination** ([`paginate`]): page-number traversal of list endpoints
//!   with an optional item cap.
//! - **Attachments** ([`attachments`]): PDF/DOCX attachments are downloaded
//!   to a scratch directory and their text extracted.
//! - **Reconciliation** ([`reconcile`]): the longer of inline text and
//!   attachment text wins.
//! - **Output** ([`output`]): one CSV row per comment, fixed schema.
//!
//! ## Quick Start
//!
//! ```no_run
//! use regs_harvest::{Config, DocketId, HarvestOutcome, HarvestRequest, Harvester};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.api_keys = vec!["first-key".into(), "second-key".into()];
//!
//!     let mut harvester = Harvester::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = harvester.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let request = HarvestRequest::new(DocketId::parse("FSIS-2010-0004")?);
//!     if let HarvestOutcome::Written { path, rows } = harvester.run(&request).await? {
//!         println!("{} comments written to {}", rows, path.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// regulations.gov payload types
pub mod api;
/// Attachment download and text extraction
pub mod attachments;
/// Rate-limited API fetcher
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Harvest orchestration
pub mod harvest;
/// API key rotation
pub mod keys;
/// CSV output
pub mod output;
/// List endpoint pagination
pub mod paginate;
/// Inline vs attachment text selection
pub mod reconcile;
/// Retry policy
pub mod retry;
/// Core types
pub mod types;

pub use attachments::{AttachmentResolver, DecoderCapabilities, DecoderSet, TextDecoder};
pub use client::ApiClient;
pub use config::Config;
pub use error::{DecodeError, Error, Result};
pub use harvest::{HarvestOutcome, HarvestRequest, Harvester};
pub use keys::{ApiKey, KeyRotator};
pub use output::{CommentRecord, CsvSink};
pub use types::{DocketId, HarvestEvent};
