//! Document-level text assembly over extracted pages.
//!
//! Two assembly modes, matching the two PDF source layouts:
//!
//! - [`merge_columns`] for two-column bulletins: each page contributes its
//!   left-region text, a newline, its right-region text, and a newline,
//!   concatenated in page order. Naive whole-page extraction would
//!   interleave unrelated columns' lines.
//! - [`flatten_pages`] for tabular documents and handouts: whole-page text
//!   concatenated across pages, with each detected table flattened via
//!   [`flatten_table`] and appended right after the page text that produced
//!   it.

use crate::pdf::{PageContent, Table};

/// Column separator used when linearizing a table row.
const CELL_SEPARATOR: &str = " - ";

/// Merge a document's pages in left-then-right column order.
pub fn merge_columns(pages: &[PageContent]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&page.left_text);
        out.push('\n');
        out.push_str(&page.right_text);
        out.push('\n');
    }
    out
}

/// Concatenate page text across pages, appending each page's flattened
/// tables immediately after that page's text.
pub fn flatten_pages(pages: &[PageContent]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&page.text);
        for table in &page.tables {
            out.push('\n');
            out.push_str(&flatten_table(table));
            out.push('\n');
        }
    }
    out
}

/// Linearize one table into a text block.
///
/// Cell line breaks become single spaces, absent cells become empty
/// strings, cells join with `" - "`, rows join with `\n`. The result keeps
/// row/column adjacency readable without re-parsing structure.
pub fn flatten_table(table: &Table) -> String {
    table
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(text) => text.lines().collect::<Vec<_>>().join(" "),
                    None => String::new(),
                })
                .collect::<Vec<_>>()
                .join(CELL_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
