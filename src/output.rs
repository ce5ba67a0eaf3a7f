//! CSV output of harvested comments
//!
//! The file layout is fixed: a header row
//! `id,title,comment,postedDate,documentType,fromAttachment,hasAttachment`
//! followed by one row per comment, in the order the rows are written.
//! Booleans are written as `true` / `false`.

use crate::api::CommentAttributes;
use crate::error::Result;
use crate::reconcile::Reconciled;
use crate::types::DocketId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column names, in file order
pub const HEADER: [&str; 7] = [
    "id",
    "title",
    "comment",
    "postedDate",
    "documentType",
    "fromAttachment",
    "hasAttachment",
];

/// One output row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Comment id
    pub id: String,
    /// Title, or empty
    pub title: String,
    /// Final comment text, or empty; never absent
    pub comment: String,
    /// Posting date as sent by the API, or empty
    pub posted_date: String,
    /// Document type, or empty
    pub document_type: String,
    /// `comment` came from an attachment
    pub from_attachment: bool,
    /// The comment had at least one attachment file
    pub has_attachment: bool,
}

impl CommentRecord {
    /// Assemble a row from comment attributes and the reconciled text
    ///
    /// `from_attachment` is only kept when `has_attachment` is set.
    pub fn new(
        id: impl Into<String>,
        attributes: &CommentAttributes,
        text: Reconciled,
        has_attachment: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: attributes.title.clone().unwrap_or_default(),
            comment: text.text,
            posted_date: attributes.posted_date.clone().unwrap_or_default(),
            document_type: attributes.document_type.clone().unwrap_or_default(),
            from_attachment: text.from_attachment && has_attachment,
            has_attachment,
        }
    }
}

/// File name for a docket's output written at `now`
///
/// `{docket-without-hyphens}_comments_{YYYYMMDD_HHMMSS}.csv`
pub fn output_filename(docket: &DocketId, now: DateTime<Local>) -> String {
    format!(
        "{}_comments_{}.csv",
        docket.file_stem(),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Streaming CSV writer; rows hit the file as they are written
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl CsvSink {
    /// Create the output file in `dir` (created if missing) and write the header
    pub fn create(dir: &Path, docket: &DocketId, now: DateTime<Local>) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(output_filename(docket, now));
        // Header is written up front so an empty run still yields a valid file
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&path)?;
        writer.write_record(HEADER)?;
        debug!(path = %path.display(), "created output file");

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    /// Append one row
    pub fn write(&mut self, record: &CommentRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the file, returning its path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        info!(path = %self.path.display(), rows = self.rows, "wrote comments CSV");
        Ok(self.path)
    }
}

/// Write `records` in order to a new file in `dir`, returning its path
pub fn emit<'a, I>(records: I, docket: &DocketId, dir: &Path) -> Result<PathBuf>
where
    I: IntoIterator<Item = &'a CommentRecord>,
{
    let mut sink = CsvSink::create(dir, docket, Local::now())?;
    for record in records {
        sink.write(record)?;
    }
    sink.finish()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn docket() -> DocketId {
        DocketId::parse("FSIS-2010-0004").unwrap()
    }

    fn records() -> Vec<CommentRecord> {
        vec![
            CommentRecord {
                id: "FSIS-2010-0004-0002".into(),
                title: "Comment from Jane Doe".into(),
                comment: "I support this rule.".into(),
                posted_date: "2010-06-01T04:00:00Z".into(),
                document_type: "Public Submission".into(),
                from_attachment: false,
                has_attachment: false,
            },
            CommentRecord {
                id: "FSIS-2010-0004-0003".into(),
                title: "Comment, with \"quotes\"".into(),
                comment: "Line one\nLine two, with a comma".into(),
                posted_date: "2010-06-02T04:00:00Z".into(),
                document_type: "Public Submission".into(),
                from_attachment: true,
                has_attachment: true,
            },
            CommentRecord {
                id: "FSIS-2010-0004-0004".into(),
                has_attachment: true,
                ..CommentRecord::default()
            },
        ]
    }

    #[test]
    fn filename_strips_hyphens_and_stamps_time() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            output_filename(&docket(), now),
            "FSIS20100004_comments_20240305_140709.csv"
        );
    }

    #[test]
    fn emit_then_parse_round_trips() {
        let dir = TempDir::new().unwrap();
        let input = records();

        let path = emit(&input, &docket(), dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, HEADER);
        let rows: Vec<CommentRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, input);
    }

    #[test]
    fn missing_fields_are_written_as_empty_strings() {
        let dir = TempDir::new().unwrap();
        let path = emit(&records()[2..], &docket(), dir.path()).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "FSIS-2010-0004-0004,,,,,false,true");
    }

    #[test]
    fn empty_run_still_has_header() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::create(dir.path(), &docket(), Local::now()).unwrap();
        assert_eq!(sink.rows(), 0);
        let path = sink.finish().unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "id,title,comment,postedDate,documentType,fromAttachment,hasAttachment\n"
        );
    }

    #[test]
    fn sink_creates_output_dir_and_counts_rows() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("csv");
        let mut sink = CsvSink::create(&nested, &docket(), Local::now()).unwrap();
        for record in &records() {
            sink.write(record).unwrap();
        }
        assert_eq!(sink.rows(), 3);
        assert!(sink.path().starts_with(&nested));
        sink.finish().unwrap();
    }

    #[test]
    fn record_never_claims_attachment_text_without_attachment() {
        let attributes = CommentAttributes {
            title: Some("T".into()),
            comment: None,
            posted_date: None,
            document_type: Some("Public Submission".into()),
        };
        let text = Reconciled {
            text: "body".into(),
            from_attachment: true,
        };

        let record = CommentRecord::new("C-1", &attributes, text.clone(), false);
        assert!(!record.from_attachment);
        assert_eq!(record.title, "T");
        assert_eq!(record.posted_date, "");

        let record = CommentRecord::new("C-1", &attributes, text, true);
        assert!(record.from_attachment && record.has_attachment);
    }
}
