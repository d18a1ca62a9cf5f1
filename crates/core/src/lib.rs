//! Core types and collaborator traits for the news RAG search pipeline.
//!
//! This crate provides foundational pieces used across all other crates:
//! - Domain value objects (documents, filters, search requests, candidates)
//! - Chat message types
//! - Collaborator traits for pluggable backends (embedder, vector index,
//!   chat model, document store)
//! - Error taxonomy
//! - Injectable retry policy

pub mod document;
pub mod error;
pub mod message;
pub mod request;
pub mod retry;
pub mod traits;

pub use document::{Document, DocumentFilter};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use request::{ScoredPoint, SearchOutcome, SearchRequest};
pub use retry::{RetryPolicy, Transient};
pub use traits::{ChatModel, DocumentStore, Embedder, VectorIndex};
