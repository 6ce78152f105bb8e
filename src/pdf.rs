//! Page-level PDF access behind the [`PageSource`] seam.
//!
//! Extraction logic downstream (column merging, table flattening) operates on
//! plain [`PageContent`] values, so it can be tested without a PDF toolkit.
//! The production reader uses pdfium for page geometry and clipped text
//! regions; when the pdfium library cannot be loaded, a plain-text reader
//! backed by `pdf-extract` takes over with degraded output (no per-page
//! geometry, whole-document text only).

use anyhow::{anyhow, Result};
use pdfium_render::prelude::*;
use std::path::Path;

/// Rows of cells as detected on a page. Cells may be absent (`None`) or
/// contain embedded line breaks; the flattener normalizes both.
pub type Table = Vec<Vec<Option<String>>>;

/// Everything the extractors need from one PDF page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub width: f32,
    pub height: f32,
    /// Whole-page text; empty when the page has none.
    pub text: String,
    /// Text clipped to the left half-width region, full height.
    pub left_text: String,
    /// Text clipped to the right half-width region, full height.
    pub right_text: String,
    /// Tables detected on this page, in reading order.
    pub tables: Vec<Table>,
}

/// Capability for reading the pages of a PDF file.
pub trait PageSource {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageContent>>;
}

/// Pdfium-backed reader: per-page size, midpoint-clipped column regions,
/// and gap-based table detection over the page text.
pub struct PdfiumReader {
    pdfium: Pdfium,
}

impl PdfiumReader {
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| anyhow!("could not load pdfium library: {:?}", e))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageSource for PdfiumReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageContent>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| anyhow!("failed to open {}: {:?}", path.display(), e))?;

        let mut pages = Vec::new();

        for page in document.pages().iter() {
            let width = page.width().value;
            let height = page.height().value;

            let text_page = page
                .text()
                .map_err(|e| anyhow!("failed to read text of {}: {:?}", path.display(), e))?;
            let text = text_page.all();

            // Left and right half-width clip regions, full height. Pages with
            // a single-column layout still get split at the midpoint.
            let left_text = text_page.inside_rect(PdfRect::new(
                PdfPoints::new(0.0),
                PdfPoints::new(0.0),
                PdfPoints::new(height),
                PdfPoints::new(width / 2.0),
            ));
            let right_text = text_page.inside_rect(PdfRect::new(
                PdfPoints::new(0.0),
                PdfPoints::new(width / 2.0),
                PdfPoints::new(height),
                PdfPoints::new(width),
            ));

            let tables = detect_tables(&text);

            pages.push(PageContent {
                width,
                height,
                text,
                left_text,
                right_text,
                tables,
            });
        }

        Ok(pages)
    }
}

/// Fallback reader using `pdf-extract`: whole-document text as a single
/// pseudo-page with no column regions.
pub struct PlainTextReader;

impl PageSource for PlainTextReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageContent>> {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| anyhow!("failed to extract {}: {}", path.display(), e))?;
        let tables = detect_tables(&text);
        Ok(vec![PageContent {
            width: 0.0,
            height: 0.0,
            left_text: text.clone(),
            right_text: String::new(),
            tables,
            text,
        }])
    }
}

/// Open the best available page source, falling back to plain text when
/// the pdfium library is not installed.
pub fn open_page_source() -> Box<dyn PageSource> {
    match PdfiumReader::new() {
        Ok(reader) => Box::new(reader),
        Err(e) => {
            eprintln!("Warning: {}; falling back to plain-text extraction", e);
            Box::new(PlainTextReader)
        }
    }
}

/// Detect table-like regions in page text.
///
/// A row is a line whose content splits into two or more cells on runs of
/// two or more spaces; two or more consecutive rows form a table. This is a
/// positional heuristic, not layout analysis: it recovers the row/column
/// adjacency that matters for flattening, nothing more.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Table = Vec::new();

    for line in text.lines() {
        let cells = split_row(line);
        if cells.len() >= 2 {
            current.push(cells.into_iter().map(Some).collect());
        } else {
            if current.len() >= 2 {
                tables.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= 2 {
        tables.push(current);
    }

    tables
}

fn split_row(line: &str) -> Vec<String> {
    line.trim()
        .split("  ")
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_tables_finds_gap_separated_rows() {
        let text = "Course list\nCS101  Intro to CS  4\nCS202  Data Structures  3\nEnd of list";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(
            tables[0][0],
            vec![
                Some("CS101".to_string()),
                Some("Intro to CS".to_string()),
                Some("4".to_string())
            ]
        );
    }

    #[test]
    fn test_detect_tables_ignores_single_row() {
        let text = "intro\nA  B\nplain prose continues here";
        assert!(detect_tables(text).is_empty());
    }

    #[test]
    fn test_detect_tables_splits_on_prose_gap() {
        let text = "A  B\nC  D\nprose\nE  F\nG  H";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_detect_tables_handles_wide_gaps() {
        let text = "left     middle     right\nuno     dos     tres";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0].len(), 3);
    }

    #[test]
    fn test_plain_text_reader_missing_file_is_error() {
        let err = PlainTextReader
            .read_pages(Path::new("/nonexistent/file.pdf"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to extract"));
    }
}
