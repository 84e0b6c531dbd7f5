//! Inbound message handling
//!
//! The routing ladder, in priority order: explicit @mentions, LLM-assisted
//! smart routing inside a workroom, fast intent patterns, document Q&A,
//! and finally a clarification menu. Earlier rungs always win.

use tracing::{debug, info, warn};
use workroom_llm::{CompletionRequest, LlmProvider, Message};

use crate::error::Result;
use crate::orchestrator::core::Orchestrator;
use crate::orchestrator::mentions::resolve_mentions;
use crate::orchestrator::routing::{
    detect_intent, is_open_ended, parse_agent_selection, Intent, SMART_ROUTE_SYSTEM,
};
use crate::orchestrator::types::OrchestratorResponse;
use crate::session::{ChatMessage, ChatRole, DocumentContext, WorkroomSession};
use crate::storage::Storage;
use crate::utils::char_prefix;

const DOCUMENT_QA_SYSTEM: &str = "You are a helpful assistant for a team working session. Answer questions \
    using both the provided document and any relevant context shared earlier in the conversation.\n\n\
    If the document does not contain the answer but the conversation includes relevant context \
    (e.g. meeting notes, customer quotes, stakeholder input), synthesize from that context instead - \
    and be explicit about the source.\n\n\
    For requests involving drafting, writing, or creating content (e.g. requirements, feature \
    requests, summaries), do so proactively using all available information. Do not refuse just \
    because the document alone lacks detail.\n\n\
    Do not fabricate information that was not provided in the document or conversation.";

const DOC_QA_HISTORY: usize = 12;
const SMART_ROUTE_TURN_CHARS: usize = 200;

/// One inbound message with its session context
#[derive(Debug, Clone, Default)]
pub struct MessageInput<'a> {
    /// The user's text
    pub message: &'a str,
    /// Attached document, if any
    pub document: Option<&'a DocumentContext>,
    /// Recent transcript, oldest first
    pub history: &'a [ChatMessage],
    /// Keys of agents active in the session; empty = no restriction
    pub active_agents: &'a [String],
    /// The workroom session, when this is a workroom conversation
    pub session: Option<&'a WorkroomSession>,
}

impl<'a> MessageInput<'a> {
    /// A bare message with no context
    #[must_use]
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            ..Default::default()
        }
    }

    /// Attach a document
    #[must_use]
    pub fn with_document(mut self, document: &'a DocumentContext) -> Self {
        self.document = Some(document);
        self
    }

    /// Attach conversation history
    #[must_use]
    pub fn with_history(mut self, history: &'a [ChatMessage]) -> Self {
        self.history = history;
        self
    }

    /// Restrict to a set of active agents
    #[must_use]
    pub fn with_active_agents(mut self, active: &'a [String]) -> Self {
        self.active_agents = active;
        self
    }

    /// Mark as a workroom conversation
    #[must_use]
    pub fn with_session(mut self, session: &'a WorkroomSession) -> Self {
        self.session = Some(session);
        self
    }
}

impl Orchestrator {
    /// Route one inbound message to the right agent(s)
    pub async fn handle_message(
        &self,
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        // Explicit @mentions take precedence over everything
        let known_keys: Vec<String> = self
            .storage
            .list_agents()
            .await?
            .into_iter()
            .map(|a| a.key)
            .collect();
        let mentions = resolve_mentions(input.message, &known_keys);

        // Tokens matching neither an alias nor a known key are not agent
        // mentions (email addresses, handles); they fall through to the
        // rest of the ladder
        if !mentions.invalid.is_empty() {
            debug!(tokens = ?mentions.invalid, "ignoring unresolved @tokens");
        }

        if !mentions.agents.is_empty() {
            let blocked: Vec<String> = mentions
                .agents
                .iter()
                .filter(|k| !Self::agent_allowed(k, input.active_agents))
                .map(|k| crate::orchestrator::core::capitalize(k))
                .collect();
            if !blocked.is_empty() {
                return Ok(Self::agents_blocked(&blocked, input.active_agents));
            }
            info!(agents = ?mentions.agents, "routing by mention");
            return if mentions.agents.len() == 1 {
                self.route_by_key(&mentions.agents[0], input).await
            } else {
                self.round_table(&mentions.agents, input).await
            };
        }

        // Workrooms with a curated team bypass the fast intent patterns:
        // the router understands conversational follow-ups, the patterns
        // don't
        if input.session.is_some() && !input.active_agents.is_empty() {
            return self.smart_route(input).await;
        }

        match detect_intent(input.message) {
            Intent::Challenge => return self.route_intent("challenger", input).await,
            Intent::Write => return self.route_intent("writer", input).await,
            Intent::Research => return self.route_intent("researcher", input).await,
            Intent::Ambiguous => {}
        }

        if let Some(document) = input.document {
            return self.document_query(document, input).await;
        }

        Ok(self.clarification_menu(input))
    }

    async fn route_intent(
        &self,
        key: &str,
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        if !Self::agent_allowed(key, input.active_agents) {
            return Ok(Self::agent_blocked(
                &crate::orchestrator::core::capitalize(key),
                input.active_agents,
            ));
        }
        self.route_by_key(key, input).await
    }

    /// LLM-assisted selection of the best 1-2 agents for the message.
    ///
    /// Open-ended messages skip the router and go to the full curated team.
    /// A selection of zero, too many, or unparseable output also falls back
    /// to the full team.
    pub(crate) async fn smart_route(
        &self,
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        let active = input.active_agents;

        if is_open_ended(input.message, self.config.open_ended_max_words) {
            debug!("open-ended message, full round table");
            return self.round_table(active, input).await;
        }

        let agents = self.storage.list_agents().await?;
        let descriptions = active
            .iter()
            .map(|key| {
                let description = agents
                    .iter()
                    .find(|a| a.key == *key)
                    .map(|a| a.description.clone())
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| format!("Agent: {key}"));
                format!("- {key}: {description}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let recent = input
            .history
            .iter()
            .rev()
            .take(self.config.smart_route_history)
            .rev()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                };
                format!("{role}: {}\n", char_prefix(&m.content, SMART_ROUTE_TURN_CHARS))
            })
            .collect::<String>();

        let request = CompletionRequest::new()
            .with_message(Message::system(SMART_ROUTE_SYSTEM))
            .with_message(Message::user(format!(
                "Available agents:\n{descriptions}\n\n\
                 Recent conversation:\n{recent}\n\
                 User message: {}\n\n\
                 Which agent(s) should respond? Return JSON array of keys.",
                input.message
            )))
            .with_temperature(0.0)
            .with_max_tokens(100);

        let selected = match self.provider.complete(request).await {
            Ok(response) => parse_agent_selection(&response.content, active),
            Err(e) => {
                warn!(error = %e, "smart route failed, using full team");
                active.to_vec()
            }
        };

        if selected.len() >= active.len() || selected.len() > self.config.smart_route_max_selection
        {
            return self.round_table(active, input).await;
        }
        if selected.len() == 1 {
            info!(agent = %selected[0], "smart route picked one agent");
            return self.route_by_key(&selected[0], input).await;
        }
        info!(agents = ?selected, "smart route picked a mini round table");
        self.round_table(&selected, input).await
    }

    /// Answer a free-form question about the uploaded document
    pub(crate) async fn document_query(
        &self,
        document: &DocumentContext,
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        let mut truncated = char_prefix(&document.text, self.config.doc_prefix_chars).to_string();
        if document.text.chars().count() > self.config.doc_prefix_chars {
            truncated.push_str("\n\n[...document truncated for length...]");
        }

        let mut messages = vec![Message::system(DOCUMENT_QA_SYSTEM)];
        let start = input.history.len().saturating_sub(DOC_QA_HISTORY);
        for turn in &input.history[start..] {
            if turn.content.is_empty() {
                continue;
            }
            messages.push(match turn.role {
                ChatRole::User => Message::user(turn.content.clone()),
                ChatRole::Assistant => Message::assistant(turn.content.clone()),
            });
        }
        messages.push(Message::user(format!(
            "Document: **{}**\n\n---\n{truncated}\n---\n\nQuestion: {}",
            document.filename, input.message
        )));

        let request = CompletionRequest::new()
            .with_messages(messages)
            .with_max_tokens(1500);

        let answer = match self.provider.complete(request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "document query failed");
                "_(Unable to process document query due to a connection issue. \
                 Please try again.)_"
                    .to_string()
            }
        };

        Ok(OrchestratorResponse::agent(
            "Document Q&A",
            format!("_{}_\n\n{answer}", document.filename),
        ))
    }

    /// Fallback menu when no route applies
    fn clarification_menu(&self, input: &MessageInput<'_>) -> OrchestratorResponse {
        let default_team = ["challenger", "writer", "researcher"];
        let active: Vec<&str> = if input.active_agents.is_empty() {
            default_team.to_vec()
        } else {
            input.active_agents.iter().map(String::as_str).collect()
        };

        let mut examples = Vec::new();
        if active.contains(&"challenger") {
            examples
                .push("- **Challenge an idea**: 'Challenge this: [plan]' or 'Red team this'");
        }
        if active.contains(&"writer") {
            examples.push("- **Draft a message**: 'Draft an email to [recipient] about [topic]'");
        }
        if active.contains(&"researcher") {
            examples.push("- **Research a topic**: 'Research: [topic]' or 'Deep dive on [subject]'");
        }
        if examples.is_empty() {
            examples.push("- **@mention an agent**: '@[agent key] [your question]'");
        }

        OrchestratorResponse::system(format!(
            "I'm not sure what you'd like to do. Here are your options with the active agents:\n\n{}",
            examples.join("\n")
        ))
        .with_pending_action("clarify")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definition::AgentDefinition;
    use crate::orchestrator::types::OrchestratorConfig;
    use crate::storage::{MemoryStore, Storage};
    use std::sync::Arc;
    use workroom_llm::MockProvider;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn full_team_storage() -> Arc<MemoryStore> {
        let storage = Arc::new(MemoryStore::new());
        for (key, label) in [
            ("challenger", "Challenger"),
            ("writer", "Writer"),
            ("researcher", "Researcher"),
        ] {
            storage
                .save_agent(
                    &AgentDefinition::new(key, label, format!("You are the {label}."))
                        .with_description(format!("{label} things")),
                )
                .await
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_intent_routes_to_challenger() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("holes poked");
        let orchestrator = Orchestrator::new(
            provider,
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        let input = MessageInput::new("please poke holes in this plan");
        let response = orchestrator.handle_message(&input).await.unwrap();
        assert_eq!(response.agent_label, "Challenger");
    }

    #[tokio::test]
    async fn test_unresolved_token_does_not_block_intent_routing() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("Subject: Launch");
        let orchestrator = Orchestrator::new(
            provider,
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        // "@example" from the address is not an agent mention
        let input =
            MessageInput::new("draft an email to john@example.com about the launch");
        let response = orchestrator.handle_message(&input).await.unwrap();
        assert_eq!(response.agent_label, "Writer");
        assert_eq!(response.text, "Subject: Launch");
    }

    #[tokio::test]
    async fn test_blocked_response_names_every_inactive_mention() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = Orchestrator::new(
            provider.clone(),
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        let active = keys(&["researcher"]);
        let input =
            MessageInput::new("@challenger @writer thoughts?").with_active_agents(&active);
        let response = orchestrator.handle_message(&input).await.unwrap();

        assert_eq!(response.agent_label, "System");
        assert!(response.text.contains("**Challenger**, **Writer** aren't in this session"));
        assert!(response.text.contains("Active agents: researcher"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blocked_intent_agent() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = Orchestrator::new(
            provider.clone(),
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        let active = keys(&["writer"]);
        let input = MessageInput::new("poke holes in this plan").with_active_agents(&active);
        let response = orchestrator.handle_message(&input).await.unwrap();
        assert_eq!(response.agent_label, "System");
        assert!(response.text.contains("isn't in this session"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_clarification_menu_when_ambiguous() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = Orchestrator::new(
            provider.clone(),
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        let input = MessageInput::new("hmm interesting situation we have here today folks");
        let response = orchestrator.handle_message(&input).await.unwrap();
        assert_eq!(response.agent_label, "System");
        assert_eq!(response.pending_action.as_deref(), Some("clarify"));
        assert!(response.text.contains("Challenge an idea"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_document_query_fallback_path() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("the doc says Friday");
        let orchestrator = Orchestrator::new(
            provider,
            full_team_storage().await,
            OrchestratorConfig::default(),
        );

        let doc = DocumentContext::new("plan.md", "Launch is on Friday.");
        let input =
            MessageInput::new("when is the launch happening exactly, according to the plan?")
                .with_document(&doc);
        let response = orchestrator.handle_message(&input).await.unwrap();
        assert_eq!(response.agent_label, "Document Q&A");
        assert!(response.text.contains("plan.md"));
        assert!(response.text.contains("the doc says Friday"));
    }
}
