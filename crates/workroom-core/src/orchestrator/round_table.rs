//! Round table - several agents answer the same message in parallel
//!
//! Agents and shared context are resolved up front, then every turn runs
//! concurrently. Replies are reassembled in requested order regardless of
//! completion order, so the transcript is deterministic for a given team.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::agents::runtime::{Agent, LlmAgent, TurnContext};
use crate::error::Result;
use crate::orchestrator::core::{capitalize, Orchestrator};
use crate::orchestrator::handle::MessageInput;
use crate::orchestrator::types::OrchestratorResponse;
use crate::session::AgentReply;

impl Orchestrator {
    /// Ask every listed agent to answer the message in parallel.
    ///
    /// Unknown keys degrade to a placeholder reply in their slot rather
    /// than dropping out.
    pub async fn round_table(
        &self,
        keys: &[String],
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        debug!(agents = ?keys, "starting round table");

        // Resolve agents and the shared document block before fanning out,
        // so the summary is computed once and storage reads stay sequential
        let mut roster: Vec<(String, Option<Arc<LlmAgent>>)> = Vec::with_capacity(keys.len());
        for key in keys {
            let agent = self.agent_for(key).await?;
            if agent.is_none() {
                warn!(key, "round table includes unknown agent");
            }
            roster.push((key.clone(), agent));
        }

        let summary_block = match input.document {
            Some(doc) => self.summarizer.context_block(doc).await,
            None => None,
        };

        let summary = summary_block.as_deref();
        let futures = roster.iter().map(|(key, agent)| {
            let teammates: Vec<String> = keys.iter().filter(|k| *k != key).cloned().collect();
            async move {
                match agent {
                    Some(agent) => {
                        let ctx = TurnContext {
                            history: input.history,
                            document: input.document,
                            summary_block: summary,
                            teammates: &teammates,
                            concise: true,
                        };
                        (
                            agent.label().to_string(),
                            agent.respond(input.message, &ctx).await,
                        )
                    }
                    None => (
                        capitalize(key),
                        "_(This agent is not available. Check the session's agent list.)_"
                            .to_string(),
                    ),
                }
            }
        });

        // join_all preserves input order, which is the requested key order
        let results = join_all(futures).await;

        let mut replies = Vec::with_capacity(results.len());
        for (label, text) in results {
            self.scan_for_decision(input, &text).await?;
            replies.push(AgentReply {
                agent_label: label,
                text,
            });
        }

        let combined = replies
            .iter()
            .map(|r| format!("**{}**\n\n{}", r.agent_label, r.text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        Ok(OrchestratorResponse::round_table(combined, replies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definition::AgentDefinition;
    use crate::orchestrator::types::OrchestratorConfig;
    use crate::storage::{MemoryStore, Storage};
    use workroom_llm::{CompletionResponse, MockProvider};

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn team_storage() -> Arc<MemoryStore> {
        let storage = Arc::new(MemoryStore::new());
        for (key, label) in [("challenger", "Challenger"), ("writer", "Writer")] {
            storage
                .save_agent(&AgentDefinition::new(
                    key,
                    label,
                    format!("You are the {label}."),
                ))
                .await
                .unwrap();
        }
        storage
    }

    // Answers based on which persona the system prompt names
    fn persona_echo_provider() -> Arc<MockProvider> {
        Arc::new(MockProvider::with_handler(|req| {
            let system = &req.messages[0].content;
            let text = if system.contains("Challenger") {
                "risk take"
            } else {
                "draft take"
            };
            Ok(CompletionResponse {
                content: text.to_string(),
                model: "mock-model".to_string(),
            })
        }))
    }

    #[tokio::test]
    async fn test_replies_in_requested_order() {
        let storage = team_storage().await;
        let orchestrator = Orchestrator::new(
            persona_echo_provider(),
            storage,
            OrchestratorConfig::default(),
        );

        let team = keys(&["writer", "challenger"]);
        let input = MessageInput::new("share your thoughts");
        let response = orchestrator.round_table(&team, &input).await.unwrap();

        let replies = response.multi_response.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].agent_label, "Writer");
        assert_eq!(replies[0].text, "draft take");
        assert_eq!(replies[1].agent_label, "Challenger");
        assert_eq!(replies[1].text, "risk take");
    }

    #[tokio::test]
    async fn test_combined_text_separates_agents() {
        let storage = team_storage().await;
        let orchestrator = Orchestrator::new(
            persona_echo_provider(),
            storage,
            OrchestratorConfig::default(),
        );

        let team = keys(&["challenger", "writer"]);
        let input = MessageInput::new("go");
        let response = orchestrator.round_table(&team, &input).await.unwrap();

        assert!(response.text.contains("**Challenger**"));
        assert!(response.text.contains("**Writer**"));
        assert!(response.text.contains("\n\n---\n\n"));
    }

    #[tokio::test]
    async fn test_unknown_agent_gets_placeholder_slot() {
        let storage = team_storage().await;
        let orchestrator = Orchestrator::new(
            persona_echo_provider(),
            storage,
            OrchestratorConfig::default(),
        );

        let team = keys(&["challenger", "ghost"]);
        let input = MessageInput::new("go");
        let response = orchestrator.round_table(&team, &input).await.unwrap();

        let replies = response.multi_response.unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1].agent_label, "Ghost");
        assert!(replies[1].text.contains("not available"));
    }
}
