//! Orchestrator response envelope and tunable thresholds

use serde::{Deserialize, Serialize};

use crate::session::AgentReply;
use crate::utils::retry::RetryConfig;

/// The routed result of one inbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorResponse {
    /// Display label of the responder ("System" for orchestrator-authored
    /// text, the agent label otherwise)
    pub agent_label: String,
    /// Response text (combined transcript for round tables)
    pub text: String,
    /// Per-agent replies when several agents answered
    #[serde(default)]
    pub multi_response: Option<Vec<AgentReply>>,
    /// Machine-readable hint that the caller should take an action (e.g.
    /// show a clarification menu)
    #[serde(default)]
    pub pending_action: Option<String>,
    /// Non-fatal note for the caller (e.g. some mentions were invalid)
    #[serde(default)]
    pub warning: Option<String>,
}

impl OrchestratorResponse {
    /// An orchestrator-authored message (routing feedback, menus, blocks)
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            agent_label: "System".to_string(),
            text: text.into(),
            multi_response: None,
            pending_action: None,
            warning: None,
        }
    }

    /// A single agent's answer
    #[must_use]
    pub fn agent(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            agent_label: label.into(),
            text: text.into(),
            multi_response: None,
            pending_action: None,
            warning: None,
        }
    }

    /// A multi-agent round-table answer
    #[must_use]
    pub fn round_table(text: impl Into<String>, replies: Vec<AgentReply>) -> Self {
        Self {
            agent_label: "Team".to_string(),
            text: text.into(),
            multi_response: Some(replies),
            pending_action: None,
            warning: None,
        }
    }

    /// Attach a pending-action hint
    #[must_use]
    pub fn with_pending_action(mut self, action: impl Into<String>) -> Self {
        self.pending_action = Some(action.into());
        self
    }

    /// Attach a warning
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Tunable routing and context thresholds
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Word cap for the open-ended heuristic
    pub open_ended_max_words: usize,
    /// History turns shown to the smart router
    pub smart_route_history: usize,
    /// Above this many selected agents the router falls back to everyone
    pub smart_route_max_selection: usize,
    /// Transcript turns fed to output synthesis
    pub transcript_cap: usize,
    /// Document prefix characters sent to the summarizer
    pub doc_prefix_chars: usize,
    /// Character budget for the raw-excerpt summary fallback
    pub summary_budget_chars: usize,
    /// Character cap on the injected document context block
    pub summary_inject_chars: usize,
    /// Retry policy for agent completion calls
    pub retry: RetryConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            open_ended_max_words: 6,
            smart_route_history: 4,
            smart_route_max_selection: 2,
            transcript_cap: 60,
            doc_prefix_chars: 12_000,
            summary_budget_chars: 2_000,
            summary_inject_chars: 3_000,
            retry: RetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_response_labeled() {
        let response = OrchestratorResponse::system("pick an agent")
            .with_pending_action("clarify");
        assert_eq!(response.agent_label, "System");
        assert_eq!(response.pending_action.as_deref(), Some("clarify"));
        assert!(response.multi_response.is_none());
    }

    #[test]
    fn test_round_table_response_carries_replies() {
        let response = OrchestratorResponse::round_table(
            "combined",
            vec![AgentReply {
                agent_label: "Challenger".to_string(),
                text: "risk".to_string(),
            }],
        );
        assert_eq!(response.agent_label, "Team");
        assert_eq!(response.multi_response.as_ref().map(Vec::len), Some(1));
    }
}
