//! Memoized document summarization
//!
//! One summary per filename per process. The summary is what agents see in
//! their prompts; the full text is reserved for direct document Q&A. A
//! failed summarization falls back to a raw excerpt so the document still
//! grounds the discussion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use workroom_llm::{CompletionRequest, LlmProvider, Message};

use crate::session::DocumentContext;
use crate::utils::char_prefix;

const SUMMARIZER_SYSTEM: &str = "You are a document summarizer for a team working session. \
    Produce a structured summary that captures ALL key facts, \
    requirements, numbers, names, and technical details. \
    This summary will be the ONLY context agents see, so be thorough \
    but concise. Use bullet points. Keep under 2000 chars.";

/// Summarizes uploaded documents, memoized by filename
pub struct DocumentSummarizer {
    provider: Arc<dyn LlmProvider>,
    cache: RwLock<HashMap<String, String>>,
    prefix_chars: usize,
    budget_chars: usize,
    inject_chars: usize,
}

impl DocumentSummarizer {
    /// Create a summarizer with the given truncation thresholds
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        prefix_chars: usize,
        budget_chars: usize,
        inject_chars: usize,
    ) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
            prefix_chars,
            budget_chars,
            inject_chars,
        }
    }

    /// Summarize a document, computing at most once per filename.
    ///
    /// Returns an empty string for documents with no text.
    pub async fn summarize(&self, document: &DocumentContext) -> String {
        if document.text.is_empty() {
            return String::new();
        }

        if let Some(cached) = self.cache.read().await.get(&document.filename) {
            debug!(filename = %document.filename, "document summary cache hit");
            return cached.clone();
        }

        let truncated = char_prefix(&document.text, self.prefix_chars);
        let request = CompletionRequest::new()
            .with_message(Message::system(SUMMARIZER_SYSTEM))
            .with_message(Message::user(format!(
                "Summarize this document: **{}**\n\n---\n{}\n---\n\n\
                 Include: key stakeholders, problem statement, requirements, \
                 data/technical details, open questions, and any specific asks.",
                document.filename, truncated
            )))
            .with_max_tokens(1200)
            .with_temperature(0.0);

        let summary = match self.provider.complete(request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(filename = %document.filename, error = %e, "summarization failed, using raw excerpt");
                format!(
                    "[Summary unavailable - using raw excerpt]\n\n{}",
                    char_prefix(truncated, self.budget_chars)
                )
            }
        };

        self.cache
            .write()
            .await
            .insert(document.filename.clone(), summary.clone());
        summary
    }

    /// Build the compact context block injected into agent prompts.
    ///
    /// `None` when there is nothing to inject.
    pub async fn context_block(&self, document: &DocumentContext) -> Option<String> {
        let summary = self.summarize(document).await;
        if summary.is_empty() {
            return None;
        }
        Some(format!(
            "Reference Document: **{}**\nSummary:\n{}\n\n\
             GROUNDING RULE: First, cite 1-2 specific facts from this document that are most relevant \
             to your expertise and the current question. Then give your analysis building on those facts. \
             Do NOT ask generic questions that the document already answers.",
            document.filename,
            char_prefix(&summary, self.inject_chars)
        ))
    }
}
