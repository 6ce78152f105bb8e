//! Document labeler: runs the extractors over every configured source and
//! yields the unified labeled-chunk collection consumed by indexing.
//!
//! Labels are composite keys, unique by construction within one run:
//! `bulletin_{i}_chunk_{j}`, `pdf_content_{i}_chunk_{j}`,
//! `course_{i}_chunk_{j}`, and `handout_{i}` for handouts, which bypass
//! splitting and keep one chunk per file.
//!
//! Sources are isolated: a source that fails to extract is recorded in the
//! run report and skipped, and the remaining sources continue. A failed
//! source still consumes its index so labels stay stable across runs.

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::chunk::split_text;
use crate::config::Config;
use crate::extract;
use crate::models::{LabeledChunk, SourceCategory};
use crate::pdf::PageSource;
use crate::timetable;

/// Outcome of extracting one source (a file, or the timetable record).
#[derive(Debug)]
pub struct SourceOutcome {
    pub category: SourceCategory,
    pub source: String,
    pub chunks: usize,
    pub error: Option<String>,
}

/// Per-source outcomes for one labeling run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    fn record_ok(&mut self, category: SourceCategory, source: &str, chunks: usize) {
        self.outcomes.push(SourceOutcome {
            category,
            source: source.to_string(),
            chunks,
            error: None,
        });
    }

    fn record_err(&mut self, category: SourceCategory, source: &str, error: &anyhow::Error) {
        self.outcomes.push(SourceOutcome {
            category,
            source: source.to_string(),
            chunks: 0,
            error: Some(format!("{:#}", error)),
        });
    }
}

/// Run all four source categories and collect the labeled chunks.
pub fn build_labeled_chunks(
    config: &Config,
    pages: &dyn PageSource,
) -> (Vec<LabeledChunk>, RunReport) {
    let mut chunks = Vec::new();
    let mut report = RunReport::default();
    let chunking = &config.chunking;

    // Two-column bulletins, split into overlapping chunks.
    for (i, path) in config.sources.bulletins.iter().enumerate() {
        let source = path.display().to_string();
        match pages.read_pages(path) {
            Ok(doc_pages) => {
                let text = extract::merge_columns(&doc_pages);
                let n = push_split(
                    &mut chunks,
                    SourceCategory::Bulletin,
                    i,
                    &text,
                    chunking.chunk_size,
                    chunking.chunk_overlap,
                );
                report.record_ok(SourceCategory::Bulletin, &source, n);
            }
            Err(e) => report.record_err(SourceCategory::Bulletin, &source, &e),
        }
    }

    // Tabular PDFs: page text plus flattened tables, then split.
    for (i, path) in config.sources.tabular.iter().enumerate() {
        let source = path.display().to_string();
        match pages.read_pages(path) {
            Ok(doc_pages) => {
                let text = extract::flatten_pages(&doc_pages);
                let n = push_split(
                    &mut chunks,
                    SourceCategory::PdfContent,
                    i,
                    &text,
                    chunking.chunk_size,
                    chunking.chunk_overlap,
                );
                report.record_ok(SourceCategory::PdfContent, &source, n);
            }
            Err(e) => report.record_err(SourceCategory::PdfContent, &source, &e),
        }
    }

    // Handouts: same flattening, but one unsplit chunk per file.
    if let Some(dir) = &config.sources.handouts_dir {
        match scan_handouts(dir) {
            Ok(files) => {
                for (i, path) in files.iter().enumerate() {
                    let source = path.display().to_string();
                    match pages.read_pages(path) {
                        Ok(doc_pages) => {
                            let text = extract::flatten_pages(&doc_pages);
                            chunks.push(LabeledChunk {
                                label: format!("{}_{}", SourceCategory::Handout, i),
                                content: text,
                            });
                            report.record_ok(SourceCategory::Handout, &source, 1);
                        }
                        Err(e) => report.record_err(SourceCategory::Handout, &source, &e),
                    }
                }
            }
            Err(e) => report.record_err(SourceCategory::Handout, &dir.display().to_string(), &e),
        }
    }

    // Timetable: one rendered block per course, each split independently.
    if let Some(path) = &config.sources.timetable {
        let source = path.display().to_string();
        match timetable::load_timetable(path) {
            Ok(timetable) => {
                let blocks = timetable::render_courses(&timetable.courses);
                let mut n = 0;
                for (i, block) in blocks.iter().enumerate() {
                    n += push_split(
                        &mut chunks,
                        SourceCategory::Course,
                        i,
                        block,
                        chunking.chunk_size,
                        chunking.chunk_overlap,
                    );
                }
                report.record_ok(SourceCategory::Course, &source, n);
            }
            Err(e) => report.record_err(SourceCategory::Course, &source, &e),
        }
    }

    (chunks, report)
}

/// Split `text` and append one labeled chunk per window. Returns the number
/// of chunks produced.
fn push_split(
    out: &mut Vec<LabeledChunk>,
    category: SourceCategory,
    source_index: usize,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> usize {
    let windows = split_text(text, chunk_size, chunk_overlap);
    let n = windows.len();
    for (j, window) in windows.into_iter().enumerate() {
        out.push(LabeledChunk {
            label: format!("{}_{}_chunk_{}", category, source_index, j),
            content: window.text,
        });
    }
    n
}

/// List handout PDFs under `dir`, sorted for deterministic labeling.
fn scan_handouts(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        bail!("Handouts directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Reject duplicate labels before upsert: the index silently overwrites on
/// id collision, so a collision here means lost content.
pub fn ensure_unique_labels(chunks: &[LabeledChunk]) -> Result<()> {
    let mut seen = HashSet::new();
    for chunk in chunks {
        if !seen.insert(chunk.label.as_str()) {
            bail!("Duplicate chunk label: {}", chunk.label);
        }
    }
    Ok(())
}
