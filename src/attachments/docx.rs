//! DOCX text extraction via docx-rs

use super::traits::TextDecoder;
use crate::error::{DecodeError, Result};
use std::path::Path;

/// Extracts paragraph and table text from Word documents
///
/// Legacy binary `.doc` files are routed here too; docx-rs rejects them and
/// the resolver logs the failure like any other decode error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxDecoder;

impl TextDecoder for DocxDecoder {
    fn decode(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&bytes).map_err(|e| DecodeError::Docx {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })?;

        let mut blocks = Vec::new();
        for child in &docx.document.children {
            let block = match child {
                docx_rs::DocumentChild::Paragraph(para) => paragraph_text(para),
                docx_rs::DocumentChild::Table(table) => table_text(table),
                _ => continue,
            };
            if !block.trim().is_empty() {
                blocks.push(block);
            }
        }
        Ok(blocks.join("\n"))
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".docx", ".doc"]
    }

    fn name(&self) -> &'static str {
        "docx-rs"
    }
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut buffer = String::new();
    for child in &para.children {
        push_paragraph_child(child, &mut buffer);
    }
    buffer
}

fn push_paragraph_child(child: &docx_rs::ParagraphChild, buffer: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => push_run(run, buffer),
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for link_child in &link.children {
                push_paragraph_child(link_child, buffer);
            }
        }
        _ => {}
    }
}

fn push_run(run: &docx_rs::Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text) => buffer.push_str(&text.text),
            docx_rs::RunChild::Tab(_) => buffer.push('\t'),
            docx_rs::RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

fn table_text(table: &docx_rs::Table) -> String {
    let mut rows = Vec::new();
    for row in &table.rows {
        let docx_rs::TableChild::TableRow(tr) = row;
        let mut cells = Vec::new();
        for cell in &tr.cells {
            let docx_rs::TableRowChild::TableCell(tc) = cell;
            let mut cell_text = String::new();
            for content in &tc.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    cell_text.push_str(&paragraph_text(para));
                }
            }
            cells.push(cell_text);
        }
        if cells.iter().any(|c| !c.is_empty()) {
            rows.push(cells.join("\t"));
        }
    }
    rows.join("\n")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::test_fixtures::docx_bytes;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn extracts_paragraphs_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.docx");
        std::fs::write(&path, docx_bytes(&["First paragraph", "Second paragraph"])).unwrap();

        let text = DocxDecoder.decode(&path).unwrap();
        assert_eq!(text, "First paragraph\nSecond paragraph");
    }

    #[test]
    fn legacy_doc_bytes_fail_to_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.doc");
        // OLE compound file signature, not a zip container
        std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]).unwrap();

        let err = DocxDecoder.decode(&path).unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Docx { .. })));
    }

    #[test]
    fn accepts_doc_and_docx_extensions() {
        assert_eq!(DocxDecoder.extensions(), &[".docx", ".doc"]);
    }
}
