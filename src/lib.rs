//! campus-rag: retrieval pipeline for a university chatbot.
//!
//! Turns campus PDFs (two-column bulletins, tabular documents, course
//! handouts) and a structured timetable into labeled, overlapping text
//! chunks, indexes them in a vector store, and answers student questions
//! over the indexed content with a session-aware chat chain.
//!
//! The pipeline stages are plain functions over owned data; the external
//! collaborators (PDF reader, embedding provider, vector index, chat model,
//! session store) sit behind narrow traits so each stage is testable with
//! fakes.

pub mod chat;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod label;
pub mod models;
pub mod pdf;
pub mod search;
pub mod session;
pub mod timetable;
pub mod vector_store;
