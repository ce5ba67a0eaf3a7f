//! Attachment fixtures and CSV helpers

use regs_harvest::CommentRecord;
use std::path::Path;

// PDF/DOCX builders shared with the unit tests in src/attachments
#[allow(dead_code, unused_imports)]
#[path = "../../src/attachments/test_fixtures.rs"]
mod builders;

#[cfg(feature = "pdf")]
pub(crate) use builders::pdf_bytes;

/// Parse a CSV file written by the harvester
pub fn read_rows(path: &Path) -> Vec<CommentRecord> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .deserialize()
        .map(|row| row.expect("valid row"))
        .collect()
}
