//! Harvest orchestration
//!
//! A [`Harvester`] drives one docket from listing to CSV:
//!
//! 1. list the docket's documents,
//! 2. list the comments on every document that has an `objectId`, honoring
//!    the request's comment cap across documents,
//! 3. fetch each comment's detail, resolve its attachments and reconcile the
//!    two text sources,
//! 4. stream one row per comment to the output file.
//!
//! Everything runs on one task, one request at a time. Upstream failures
//! shrink the result; they never abort the run.

use crate::api::{CommentDetail, CommentSummary, DocumentRecord, endpoints};
use crate::attachments::{AttachmentResolver, DecoderCapabilities, DecoderSet, Resolution};
use crate::client::ApiClient;
use crate::config::{Config, PaginationConfig};
use crate::error::{Error, Result};
use crate::output::{CommentRecord, CsvSink};
use crate::paginate::{PageRequest, collect_all};
use crate::reconcile::reconcile;
use crate::types::{DocketId, HarvestEvent};
use chrono::Local;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Event channel capacity; slow subscribers see `RecvError::Lagged` past this
const EVENT_BUFFER: usize = 1000;

/// What to harvest
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    /// Docket to harvest
    pub docket: DocketId,
    /// Stop after this many comments across all documents
    pub max_comments: Option<usize>,
    /// Download attachments and extract their text
    pub extract_attachments: bool,
}

impl HarvestRequest {
    /// Uncapped request with attachment extraction enabled
    pub fn new(docket: DocketId) -> Self {
        Self {
            docket,
            max_comments: None,
            extract_attachments: true,
        }
    }
}

/// Result of a harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// The CSV file was written
    Written {
        /// Output file
        path: PathBuf,
        /// Data rows in the file
        rows: usize,
    },
    /// The docket has no documents (or they could not be listed)
    NoDocuments,
    /// The documents have no comments (or they could not be listed)
    NoComments,
}

/// Runs harvests against the regulations.gov API
pub struct Harvester {
    client: ApiClient,
    resolver: AttachmentResolver,
    pagination: PaginationConfig,
    output_dir: PathBuf,
    event_tx: broadcast::Sender<HarvestEvent>,
}

impl Harvester {
    /// Build a harvester from configuration
    ///
    /// Merges the keys file (if configured), validates the result, and sets
    /// up the API client and the builtin attachment decoders.
    pub fn new(mut config: Config) -> Result<Self> {
        config.api.load_keys()?;
        config.validate()?;

        let client = ApiClient::new(&config.api, config.retry.clone())?;
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e), "api"))?;
        let resolver = AttachmentResolver::new(
            http,
            DecoderSet::builtin(),
            config.harvest.temp_dir.clone(),
        );

        Ok(Self::with_parts(client, resolver, &config))
    }

    /// Assemble a harvester from already-built parts
    pub fn with_parts(client: ApiClient, resolver: AttachmentResolver, config: &Config) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_BUFFER);
        Self {
            client,
            resolver,
            pagination: config.pagination.clone(),
            output_dir: config.harvest.output_dir.clone(),
            event_tx,
        }
    }

    /// Subscribe to harvest events
    ///
    /// Multiple subscribers are supported; each receives every event sent
    /// after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<HarvestEvent> {
        self.event_tx.subscribe()
    }

    /// Attachment formats this harvester can extract
    pub fn capabilities(&self) -> DecoderCapabilities {
        self.resolver.capabilities()
    }

    /// The API client (attempt counters, active key)
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn emit_event(&self, event: HarvestEvent) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    /// Harvest one docket into a CSV file
    ///
    /// Only local failures (creating or writing the output file) are errors.
    pub async fn run(&mut self, request: &HarvestRequest) -> Result<HarvestOutcome> {
        info!(
            docket = %request.docket,
            max_comments = ?request.max_comments,
            extract_attachments = request.extract_attachments,
            keys = self.client.rotator().len(),
            "starting harvest"
        );

        let documents = self.list_documents(&request.docket).await;
        if documents.is_empty() {
            info!(docket = %request.docket, "no documents found for docket");
            return Ok(HarvestOutcome::NoDocuments);
        }
        self.emit_event(HarvestEvent::DocumentsListed {
            count: documents.len(),
        });

        let comments = self.list_comments(&documents, request.max_comments).await;
        if comments.is_empty() {
            info!(docket = %request.docket, "no comments found for documents in docket");
            return Ok(HarvestOutcome::NoComments);
        }

        let mut sink = CsvSink::create(&self.output_dir, &request.docket, Local::now())?;
        let total = comments.len();
        for (i, summary) in comments.iter().enumerate() {
            debug!(index = i + 1, total, comment_id = %summary.id, "processing comment");
            let record = self.harvest_comment(summary, request.extract_attachments).await;
            sink.write(&record)?;
            self.emit_event(HarvestEvent::CommentHarvested {
                index: i + 1,
                total,
                id: record.id.clone(),
                from_attachment: record.from_attachment,
                has_attachment: record.has_attachment,
            });
        }

        let rows = sink.rows();
        let path = sink.finish()?;
        self.emit_event(HarvestEvent::Finished {
            path: path.clone(),
            rows,
        });
        Ok(HarvestOutcome::Written { path, rows })
    }

    async fn list_documents(&mut self, docket: &DocketId) -> Vec<DocumentRecord> {
        let request = PageRequest::new(endpoints::DOCUMENTS, &[("filter[docketId]", docket.as_str())]);
        let documents: Vec<DocumentRecord> =
            collect_all(&mut self.client, request, &self.pagination, None).await;
        info!(docket = %docket, count = documents.len(), "listed documents");
        documents
    }

    async fn list_comments(
        &mut self,
        documents: &[DocumentRecord],
        max_comments: Option<usize>,
    ) -> Vec<CommentSummary> {
        let mut comments: Vec<CommentSummary> = Vec::new();

        for document in documents {
            let Some(object_id) = document.attributes.object_id.as_deref() else {
                debug!(document_id = %document.id, "document has no objectId, skipping");
                continue;
            };

            let remaining = max_comments.map(|max| max.saturating_sub(comments.len()));
            if remaining == Some(0) {
                info!(max_comments = ?max_comments, "comment cap reached");
                break;
            }

            let request = PageRequest::new(
                endpoints::COMMENTS,
                &[("filter[commentOnId]", object_id), ("sort", "postedDate")],
            );
            let batch: Vec<CommentSummary> =
                collect_all(&mut self.client, request, &self.pagination, remaining).await;

            let count = batch.len();
            info!(document_id = %document.id, object_id, count, "listed comments");
            comments.extend(batch);
            self.emit_event(HarvestEvent::CommentsListed {
                object_id: object_id.to_string(),
                count,
                total: comments.len(),
            });
        }

        comments
    }

    /// Build the row for one comment; detail and attachment failures degrade it
    async fn harvest_comment(&mut self, summary: &CommentSummary, extract: bool) -> CommentRecord {
        let detail = self.fetch_detail(&summary.id).await;

        let attributes = detail
            .as_ref()
            .map(|d| &d.data.attributes)
            .unwrap_or(&summary.attributes);
        let comment_text = attributes.comment.as_deref().unwrap_or_default();

        let resolution = match (&detail, extract) {
            (Some(detail), true) => self.resolver.resolve(detail).await,
            _ => Resolution::default(),
        };
        for failure in &resolution.failures {
            self.emit_event(HarvestEvent::AttachmentFailed {
                comment_id: summary.id.clone(),
                url: failure.url.clone(),
                error: failure.error.clone(),
            });
        }

        let text = reconcile(comment_text, &resolution.text);
        if text.from_attachment {
            debug!(comment_id = %summary.id, "using attachment text");
        }
        CommentRecord::new(&summary.id, attributes, text, resolution.has_attachment)
    }

    async fn fetch_detail(&mut self, id: &str) -> Option<CommentDetail> {
        let query = vec![("include".to_string(), "attachments".to_string())];
        match self.client.fetch(&endpoints::comment(id), &query).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                warn!(comment_id = %id, "comment detail unavailable, using list attributes");
                None
            }
            Err(e) => {
                warn!(comment_id = %id, error = %e, "comment detail unreadable, using list attributes");
                None
            }
        }
    }
}
