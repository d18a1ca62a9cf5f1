//! Multi-query retrieval orchestration.
//!
//! One search request runs as:
//! prefilter -> retrieval rounds -> merge -> raw ids | grounded answer.
//!
//! Round 1 searches on the raw query; every further round asks the chat
//! model to paraphrase the ORIGINAL query (never the previous paraphrase)
//! and searches on the paraphrase. Rounds run concurrently; the merge step
//! starts only once all of them have resolved. Candidates are deduplicated
//! by id keeping the maximum score seen across rounds, then ranked by score.

use std::collections::HashMap;
use std::sync::Arc;

use news_rag_config::Settings;
use news_rag_core::{
    ChatModel, Document, DocumentStore, Error, Message, Result, ScoredPoint, SearchOutcome,
    SearchRequest,
};
use news_rag_llm::PromptLibrary;

use crate::semantic_index::SemanticIndex;
use crate::tokens::trim_to_tokens;

/// Orchestrator configuration, derived from [`Settings`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Embedding model name; keys the tokenizer for query trims.
    pub embedding_model: String,
    /// Input ceiling of the embedding model.
    pub embedding_input_tokens: usize,
    /// Chat model name; keys the tokenizer for the grounding block trim.
    pub chat_model: String,
    /// Context ceiling applied to the grounding document block.
    pub chat_context_tokens: usize,
    /// Hard ceiling on effective top_k, regardless of the request.
    pub max_top_k: usize,
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            embedding_model: settings.embedding_model.name.clone(),
            embedding_input_tokens: settings.embedding_model.max_input_tokens,
            chat_model: settings.chat_model.name.clone(),
            chat_context_tokens: settings.chat_model.max_context_tokens,
            max_top_k: settings.search.max_top_k,
        }
    }
}

/// Drives the paraphrase-and-retrieve loop and answer synthesis.
///
/// Holds no cross-request state; collaborators are injected at construction.
pub struct RetrievalOrchestrator {
    config: OrchestratorConfig,
    semantic: SemanticIndex,
    chat: Arc<dyn ChatModel>,
    store: Arc<dyn DocumentStore>,
    prompts: PromptLibrary,
}

impl RetrievalOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        semantic: SemanticIndex,
        chat: Arc<dyn ChatModel>,
        store: Arc<dyn DocumentStore>,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            config,
            semantic,
            chat,
            store,
            prompts,
        }
    }

    /// Run one search request to a terminal outcome.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        request.validate()?;

        // The prefilter fixes the candidate universe for the whole request.
        let allowed_ids = self.store.find_ids_by_filter(&request.filter).await?;
        if allowed_ids.is_empty() {
            return Err(Error::NotFound(
                "no documents match the requested filters".to_string(),
            ));
        }

        let top_k = request.top_k.min(self.config.max_top_k);
        let query = trim_to_tokens(
            &request.query_text,
            self.config.embedding_input_tokens,
            &self.config.embedding_model,
        )?;

        tracing::info!(
            top_k,
            queries_count = request.queries_count,
            candidates = allowed_ids.len(),
            raw_return = request.raw_return,
            "starting retrieval"
        );

        let rounds = (1..=request.queries_count)
            .map(|round| self.run_round(round, &query, top_k, &allowed_ids));
        let round_results = futures::future::join_all(rounds).await;

        let total_rounds = round_results.len();
        let mut pool = Vec::new();
        let mut failed = 0usize;
        let mut last_error = None;
        for (i, result) in round_results.into_iter().enumerate() {
            match result {
                Ok(points) => {
                    tracing::debug!(round = i + 1, found = points.len(), "round finished");
                    pool.extend(points);
                }
                Err(err) => {
                    // Best-effort: a failed paraphrase round does not abort
                    // the request while any other round survived.
                    tracing::warn!(round = i + 1, error = %err, "retrieval round failed");
                    failed += 1;
                    last_error = Some(err);
                }
            }
        }
        if failed == total_rounds {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        let ranked = merge_candidates(pool, top_k);

        if request.raw_return {
            return Ok(SearchOutcome::Ranked(ranked));
        }

        if ranked.is_empty() {
            return Err(Error::NoRelevantDocuments(
                "retrieval produced no candidates to ground an answer".to_string(),
            ));
        }

        self.compose_answer(&query, &ranked).await
    }

    /// One retrieval round. Round 1 searches on the raw query; later rounds
    /// search on a fresh paraphrase of the original.
    async fn run_round(
        &self,
        round: usize,
        query: &str,
        top_k: usize,
        allowed_ids: &[i64],
    ) -> Result<Vec<ScoredPoint>> {
        let text = if round == 1 {
            query.to_string()
        } else {
            self.paraphrase(query).await?
        };
        self.semantic
            .search_similar(&text, top_k, Some(allowed_ids))
            .await
    }

    /// Ask the chat model to rewrite the original query. The rephrase
    /// template and the query travel as separate user messages, template
    /// first, matching the template's expectations.
    async fn paraphrase(&self, query: &str) -> Result<String> {
        let instruction = trim_to_tokens(
            self.prompts.rephrase_prompt(),
            self.config.embedding_input_tokens,
            &self.config.embedding_model,
        )?;
        self.chat
            .complete(&[Message::user(instruction), Message::user(query)])
            .await
    }

    /// Fetch the ranked documents and synthesize a grounded answer with a
    /// trailing sources section.
    async fn compose_answer(&self, query: &str, ranked: &[ScoredPoint]) -> Result<SearchOutcome> {
        let ids: Vec<i64> = ranked.iter().map(|p| p.id).collect();
        let fetched = self.store.fetch_by_ids(&ids).await?;
        if fetched.is_empty() {
            return Err(Error::NotFound(
                "ranked documents are missing from the datastore".to_string(),
            ));
        }

        // The store returns rows in its own order; restore ranking order so
        // both the grounding block and the sources list are deterministic.
        let by_id: HashMap<i64, &Document> = fetched.iter().map(|d| (d.id, d)).collect();
        let documents: Vec<&Document> = ids.iter().filter_map(|id| by_id.get(id).copied()).collect();

        let block = documents
            .iter()
            .map(|doc| document_block(doc))
            .collect::<Vec<_>>()
            .join("\n");
        let block = trim_to_tokens(
            &block,
            self.config.chat_context_tokens,
            &self.config.chat_model,
        )?;

        // One extra paraphrase of the original query, independent of the
        // retrieval rounds, to diversify the grounding context.
        let paraphrased_query = self.paraphrase(query).await?;

        let answer = self
            .chat
            .complete(&[
                Message::user(self.prompts.synthesis_prompt()),
                Message::user(paraphrased_query),
                Message::user(block),
            ])
            .await?;

        Ok(SearchOutcome::Answer(format!(
            "{}\n\n{}",
            answer,
            sources_section(&documents)
        )))
    }
}

/// Deduplicate by id keeping the maximum score seen (first-seen wins on
/// ties), rank by descending score, truncate to `top_k`.
pub fn merge_candidates(pool: Vec<ScoredPoint>, top_k: usize) -> Vec<ScoredPoint> {
    let mut merged: Vec<ScoredPoint> = Vec::new();
    let mut slot_by_id: HashMap<i64, usize> = HashMap::new();

    for point in pool {
        match slot_by_id.get(&point.id) {
            Some(&slot) => {
                if point.score > merged[slot].score {
                    merged[slot].score = point.score;
                }
            }
            None => {
                slot_by_id.insert(point.id, merged.len());
                merged.push(point);
            }
        }
    }

    // Stable sort keeps first-seen order across equal scores.
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    merged.truncate(top_k);
    merged
}

/// One grounding line per document: "Title – Summary" when titled.
fn document_block(doc: &Document) -> String {
    match &doc.title {
        Some(title) => format!("{title} – {}", doc.text),
        None => doc.text.clone(),
    }
}

/// Deterministic sources list appended after the model's answer.
fn sources_section(documents: &[&Document]) -> String {
    let mut section = String::from("Sources:");
    for doc in documents {
        let title = doc.title.as_deref().unwrap_or(&doc.source_name);
        section.push_str(&format!("\n- {title}"));
        if let Some(url) = &doc.url {
            section.push_str(&format!(" ({url})"));
        }
        if let Some(date) = doc.published_at {
            section.push_str(&format!(", {}", date.format("%Y-%m-%d")));
        }
    }
    section
}
