//! Search request and result value objects.

use serde::{Deserialize, Serialize};

use crate::document::DocumentFilter;
use crate::error::{Error, Result};

/// One incoming search, immutable for the duration of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query text.
    pub query_text: String,
    /// Requested number of ranked results; clamped to the configured maximum
    /// before any search is issued.
    pub top_k: usize,
    /// Total retrieval rounds including the first raw-query round.
    pub queries_count: usize,
    /// Structural prefilter restricting the candidate universe.
    #[serde(default)]
    pub filter: DocumentFilter,
    /// When true, return ranked `{id, score}` pairs without LLM synthesis.
    #[serde(default)]
    pub raw_return: bool,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            top_k: 5,
            queries_count: 1,
            filter: DocumentFilter::default(),
            raw_return: false,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_queries_count(mut self, queries_count: usize) -> Self {
        self.queries_count = queries_count;
        self
    }

    pub fn with_filter(mut self, filter: DocumentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw_return = true;
        self
    }

    /// Reject malformed requests before any collaborator is touched.
    pub fn validate(&self) -> Result<()> {
        if self.query_text.trim().is_empty() {
            return Err(Error::InvalidRequest("query_text is empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidRequest("top_k must be > 0".to_string()));
        }
        if self.queries_count == 0 {
            return Err(Error::InvalidRequest(
                "queries_count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One ranked retrieval candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: i64,
    pub score: f32,
}

impl ScoredPoint {
    pub fn new(id: i64, score: f32) -> Self {
        Self { id, score }
    }
}

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Ranked `{id, score}` pairs, best first. May be empty.
    Ranked(Vec<ScoredPoint>),
    /// Synthesized answer text with an appended sources section.
    Answer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_query() {
        let req = SearchRequest::new("   ");
        assert!(matches!(req.validate(), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn validate_rejects_zero_top_k() {
        let req = SearchRequest::new("ai in education").with_top_k(0);
        assert!(matches!(req.validate(), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn validate_rejects_zero_queries_count() {
        let req = SearchRequest::new("ai in education").with_queries_count(0);
        assert!(matches!(req.validate(), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SearchRequest::new("ai in education").validate().is_ok());
    }
}
