//! Orchestrator construction and direct agent dispatch

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use workroom_llm::LlmProvider;

use crate::agents::runtime::{Agent, LlmAgent, TurnContext};
use crate::error::Result;
use crate::orchestrator::decisions::contains_decision;
use crate::orchestrator::doc_context::DocumentSummarizer;
use crate::orchestrator::handle::MessageInput;
use crate::orchestrator::types::{OrchestratorConfig, OrchestratorResponse};
use crate::session::Decision;
use crate::skills::SkillRegistry;
use crate::storage::Storage;
use crate::utils::char_prefix;

/// Bounds for decision snippets persisted from agent replies
const DECISION_CONTENT_CHARS: usize = 300;
const DECISION_CONTEXT_CHARS: usize = 200;

/// Routes messages across the agent team and manages shared context
pub struct Orchestrator {
    pub(crate) provider: Arc<dyn LlmProvider>,
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) skills: Arc<SkillRegistry>,
    pub(crate) summarizer: DocumentSummarizer,
    pub(crate) config: OrchestratorConfig,
    agents: RwLock<HashMap<String, Arc<LlmAgent>>>,
}

impl Orchestrator {
    /// Create an orchestrator over a provider and storage backend
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        storage: Arc<dyn Storage>,
        config: OrchestratorConfig,
    ) -> Self {
        let summarizer = DocumentSummarizer::new(
            provider.clone(),
            config.doc_prefix_chars,
            config.summary_budget_chars,
            config.summary_inject_chars,
        );
        Self {
            provider,
            storage,
            skills: Arc::new(SkillRegistry::new()),
            summarizer,
            config,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a skill registry agents may call into
    #[must_use]
    pub fn with_skills(mut self, skills: Arc<SkillRegistry>) -> Self {
        self.skills = skills;
        self
    }

    /// Resolve an agent by key, building and caching its runtime on first
    /// use. `None` when no stored definition has that key.
    pub(crate) async fn agent_for(&self, key: &str) -> Result<Option<Arc<LlmAgent>>> {
        if let Some(agent) = self.agents.read().await.get(key) {
            return Ok(Some(agent.clone()));
        }

        let Some(definition) = self
            .storage
            .list_agents()
            .await?
            .into_iter()
            .find(|a| a.key == key)
        else {
            return Ok(None);
        };

        debug!(key, "building agent runtime");
        let agent = Arc::new(
            LlmAgent::new(definition, self.provider.clone(), self.skills.clone())
                .with_retry(self.config.retry.clone()),
        );
        self.agents
            .write()
            .await
            .insert(key.to_string(), agent.clone());
        Ok(Some(agent))
    }

    /// Invalidate the agent runtime cache, e.g. after library edits
    pub async fn invalidate_agents(&self) {
        self.agents.write().await.clear();
    }

    pub(crate) fn agent_allowed(key: &str, active: &[String]) -> bool {
        // Empty active set means no restriction
        active.is_empty() || active.iter().any(|k| k == key)
    }

    pub(crate) fn agent_blocked(label: &str, active: &[String]) -> OrchestratorResponse {
        Self::agents_blocked(&[label.to_string()], active)
    }

    /// Blocked response naming every mentioned agent that is not in the
    /// session
    pub(crate) fn agents_blocked(labels: &[String], active: &[String]) -> OrchestratorResponse {
        let available = if active.is_empty() {
            "none".to_string()
        } else {
            active.join(", ")
        };
        let named = labels
            .iter()
            .map(|l| format!("**{l}**"))
            .collect::<Vec<_>>()
            .join(", ");
        let verb = if labels.len() == 1 { "isn't" } else { "aren't" };
        OrchestratorResponse::system(format!(
            "{named} {verb} in this session.\n\n\
             Active agents: {available}.\n\n\
             Use the agent selector to add {named} to your session."
        ))
    }

    /// Dispatch a message to one agent by key, with full shared context
    pub(crate) async fn route_by_key(
        &self,
        key: &str,
        input: &MessageInput<'_>,
    ) -> Result<OrchestratorResponse> {
        if !Self::agent_allowed(key, input.active_agents) {
            return Ok(Self::agent_blocked(&capitalize(key), input.active_agents));
        }

        let Some(agent) = self.agent_for(key).await? else {
            return Ok(OrchestratorResponse::system(format!(
                "Agent `{key}` not found. Check the spelling or create a custom agent with that key."
            )));
        };

        let workroom = input.session.is_some();
        let summary_block = match (workroom, input.document) {
            (true, Some(doc)) => self.summarizer.context_block(doc).await,
            _ => None,
        };
        let teammates: Vec<String> = if workroom && input.active_agents.len() > 1 {
            input
                .active_agents
                .iter()
                .filter(|k| *k != key)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let ctx = TurnContext {
            history: input.history,
            document: input.document,
            summary_block: summary_block.as_deref(),
            teammates: &teammates,
            concise: workroom,
        };

        let text = agent.respond(input.message, &ctx).await;
        self.scan_for_decision(input, &text).await?;

        Ok(OrchestratorResponse::agent(agent.label(), text))
    }

    /// Persist a decision when an agent reply records one
    pub(crate) async fn scan_for_decision(
        &self,
        input: &MessageInput<'_>,
        reply: &str,
    ) -> Result<()> {
        let Some(session) = input.session else {
            return Ok(());
        };
        if !contains_decision(reply) {
            return Ok(());
        }
        let decision = Decision::new(
            char_prefix(reply, DECISION_CONTENT_CHARS),
            char_prefix(input.message, DECISION_CONTEXT_CHARS),
        );
        info!(session = %session.id, decision = %decision.id, "decision detected");
        self.storage.add_decision(&session.id, decision).await?;
        Ok(())
    }
}

pub(crate) fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definition::AgentDefinition;
    use crate::session::WorkroomSession;
    use crate::storage::MemoryStore;
    use workroom_llm::MockProvider;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn orchestrator_with_challenger(
        provider: Arc<MockProvider>,
    ) -> Orchestrator {
        let storage = Arc::new(MemoryStore::new());
        storage
            .save_agent(&AgentDefinition::new(
                "challenger",
                "Challenger",
                "You are the Challenger.",
            ))
            .await
            .unwrap();
        Orchestrator::new(provider, storage, OrchestratorConfig::default())
    }

    #[test]
    fn test_empty_active_set_allows_everyone() {
        assert!(Orchestrator::agent_allowed("challenger", &[]));
        assert!(Orchestrator::agent_allowed("writer", &keys(&["writer"])));
        assert!(!Orchestrator::agent_allowed("writer", &keys(&["challenger"])));
    }

    #[tokio::test]
    async fn test_route_to_known_agent() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("here is the risk");
        let orchestrator = orchestrator_with_challenger(provider).await;

        let input = MessageInput::new("poke holes in this");
        let response = orchestrator
            .route_by_key("challenger", &input)
            .await
            .unwrap();
        assert_eq!(response.agent_label, "Challenger");
        assert_eq!(response.text, "here is the risk");
    }

    #[tokio::test]
    async fn test_unknown_agent_yields_system_message() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = orchestrator_with_challenger(provider.clone()).await;

        let input = MessageInput::new("hello");
        let response = orchestrator.route_by_key("ghost", &input).await.unwrap();
        assert_eq!(response.agent_label, "System");
        assert!(response.text.contains("`ghost` not found"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blocked_agent_not_called() {
        let provider = Arc::new(MockProvider::new());
        let orchestrator = orchestrator_with_challenger(provider.clone()).await;

        let active = keys(&["writer"]);
        let input = MessageInput::new("poke holes").with_active_agents(&active);
        let response = orchestrator
            .route_by_key("challenger", &input)
            .await
            .unwrap();
        assert_eq!(response.agent_label, "System");
        assert!(response.text.contains("isn't in this session"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_decision_persisted_from_reply() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text(
            "After weighing both options against the rollout constraints and the \
             support team's capacity, we decided to ship the beta on Friday and \
             hold the enterprise tier until the following sprint.",
        );
        let storage = Arc::new(MemoryStore::new());
        storage
            .save_agent(&AgentDefinition::new(
                "challenger",
                "Challenger",
                "You are the Challenger.",
            ))
            .await
            .unwrap();
        let session = WorkroomSession::new("Launch", "Plan it");
        storage.save_session(&session).await.unwrap();

        let orchestrator = Orchestrator::new(
            provider,
            storage.clone(),
            OrchestratorConfig::default(),
        );
        let input = MessageInput::new("so what do we do?").with_session(&session);
        orchestrator.route_by_key("challenger", &input).await.unwrap();

        let loaded = storage.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.decisions.len(), 1);
        assert!(loaded.decisions[0].content.contains("decided to ship"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("challenger"), "Challenger");
        assert_eq!(capitalize(""), "");
    }
}
