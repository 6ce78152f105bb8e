//! Core data models used throughout campus-rag.
//!
//! These types represent the labeled chunks, vector records, and chat turns
//! that flow through the ingestion and question-answering pipeline.

use serde::{Deserialize, Serialize};

/// The four ingestion source categories. The label prefix is the first
/// component of every chunk identifier produced for that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    /// Two-column bulletin PDFs (facilities, course descriptions, holidays).
    Bulletin,
    /// Tabular PDFs (course lists, programme details, contacts).
    PdfContent,
    /// Course handout PDFs, ingested as one chunk per file.
    Handout,
    /// The structured timetable record.
    Course,
}

impl SourceCategory {
    pub fn label_prefix(&self) -> &'static str {
        match self {
            SourceCategory::Bulletin => "bulletin",
            SourceCategory::PdfContent => "pdf_content",
            SourceCategory::Handout => "handout",
            SourceCategory::Course => "course",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label_prefix())
    }
}

/// The atomic unit handed to the vector index.
///
/// `label` is the vector record id and must be unique across one ingestion
/// run; the index silently overwrites on collision, so uniqueness is
/// validated before upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledChunk {
    pub label: String,
    pub content: String,
}

/// An upsert record for the vector index.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub text: String,
}

/// A similarity-search match returned by the vector index.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
}

/// Role of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One (role, message) turn in a session history or prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
