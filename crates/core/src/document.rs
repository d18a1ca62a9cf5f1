//! Document and filter types.
//!
//! Documents are owned by the external datastore; the pipeline only ever
//! reads them, either as an id-set (prefilter) or as full rows after ranking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored article as the datastore hands it to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Datastore primary key; equals the vector point id.
    pub id: i64,
    /// Full text or summary used as grounding context.
    pub text: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: String,
    /// Additional scalar fields carried along for filtering collaborators.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: i64, text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            title: None,
            url: None,
            published_at: None,
            source_name: source_name.into(),
            extra: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

/// Structural (non-semantic) filter applied before any vector search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Publication source, e.g. "Nature".
    pub source_name: Option<String>,
    /// Sphere or topic, e.g. "analysis" or "science".
    pub sphere: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DocumentFilter {
    pub fn is_empty(&self) -> bool {
        self.source_name.is_none()
            && self.sphere.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter() {
        assert!(DocumentFilter::default().is_empty());

        let filter = DocumentFilter {
            source_name: Some("Nature".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
