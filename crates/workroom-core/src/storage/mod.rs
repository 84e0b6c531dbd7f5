//! Persistence layer
//!
//! [`Storage`] is the single persistence seam. [`MemoryStore`] backs tests
//! and ephemeral runs; [`JsonStore`] persists to JSON files with atomic
//! writes. Both uphold the same contracts: sessions are upserted whole,
//! transcripts are replaced whole, and default agents cannot be deleted.

pub mod json_store;

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::agents::definition::{default_agents, AgentDefinition};
use crate::error::Result;
use crate::session::{ChatMessage, Decision, GeneratedOutput, WorkroomSession};

pub use json_store::JsonStore;

/// Persistence seam for sessions, transcripts, and the agent library
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Upsert a session by id
    async fn save_session(&self, session: &WorkroomSession) -> Result<()>;

    /// Fetch a session by id
    async fn get_session(&self, id: &str) -> Result<Option<WorkroomSession>>;

    /// List sessions, newest first. Archived sessions appear only when
    /// `include_archived` is set.
    async fn list_sessions(&self, include_archived: bool) -> Result<Vec<WorkroomSession>>;

    /// Replace the full transcript for a session
    async fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) -> Result<()>;

    /// Load the transcript for a session, oldest first
    async fn load_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// Upsert an agent definition by id
    async fn save_agent(&self, agent: &AgentDefinition) -> Result<()>;

    /// List every stored agent definition
    async fn list_agents(&self) -> Result<Vec<AgentDefinition>>;

    /// Delete an agent by id. Refuses default agents; returns whether a
    /// record was removed.
    async fn delete_agent(&self, id: &str) -> Result<bool>;

    /// Append a decision to a session. Returns false when the session does
    /// not exist.
    async fn add_decision(&self, session_id: &str, decision: Decision) -> Result<bool>;

    /// Append a generated output to a session. Returns false when the
    /// session does not exist.
    async fn add_output(&self, session_id: &str, output: GeneratedOutput) -> Result<bool>;

    /// Remove stored default agents whose keys are no longer valid.
    /// Returns the number pruned.
    async fn prune_stale_defaults(&self, valid_keys: &[String]) -> Result<usize>;
}

/// Reconcile the stored agent library with the shipped default set.
///
/// Stale defaults are pruned, categories of surviving defaults are
/// re-asserted (user edits to prompts are preserved), and missing defaults
/// are seeded.
pub async fn ensure_default_agents(storage: &dyn Storage) -> Result<()> {
    let library = default_agents();
    let valid_keys: Vec<String> = library.iter().map(|a| a.key.clone()).collect();

    let pruned = storage.prune_stale_defaults(&valid_keys).await?;
    if pruned > 0 {
        info!(pruned, "removed stale default agents");
    }

    let stored = storage.list_agents().await?;
    for shipped in library {
        match stored.iter().find(|a| a.is_default && a.key == shipped.key) {
            Some(existing) => {
                if existing.category != shipped.category {
                    let mut updated = existing.clone();
                    updated.category = shipped.category.clone();
                    debug!(key = %shipped.key, category = %shipped.category, "resynced agent category");
                    storage.save_agent(&updated).await?;
                }
            }
            None => {
                info!(key = %shipped.key, "seeding default agent");
                storage.save_agent(&shipped).await?;
            }
        }
    }
    Ok(())
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, WorkroomSession>,
    messages: HashMap<String, Vec<ChatMessage>>,
    agents: HashMap<String, AgentDefinition>,
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStore {
    async fn save_session(&self, session: &WorkroomSession) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<WorkroomSession>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(id).cloned())
    }

    async fn list_sessions(&self, include_archived: bool) -> Result<Vec<WorkroomSession>> {
        let state = self.state.read().await;
        let mut sessions: Vec<_> = state
            .sessions
            .values()
            .filter(|s| include_archived || !s.is_archived())
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .messages
            .insert(session_id.to_string(), messages.to_vec());
        Ok(())
    }

    async fn load_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let state = self.state.read().await;
        Ok(state.messages.get(session_id).cloned().unwrap_or_default())
    }

    async fn save_agent(&self, agent: &AgentDefinition) -> Result<()> {
        let mut state = self.state.write().await;
        state.agents.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn list_agents(&self) -> Result<Vec<AgentDefinition>> {
        let state = self.state.read().await;
        let mut agents: Vec<_> = state.agents.values().cloned().collect();
        agents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(agents)
    }

    async fn delete_agent(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.agents.get(id) {
            Some(agent) if agent.is_default => Ok(false),
            Some(_) => {
                state.agents.remove(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_decision(&self, session_id: &str, decision: Decision) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(session_id) {
            Some(session) => {
                session.decisions.push(decision);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_output(&self, session_id: &str, output: GeneratedOutput) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(session_id) {
            Some(session) => {
                session.generated_outputs.push(output);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn prune_stale_defaults(&self, valid_keys: &[String]) -> Result<usize> {
        let mut state = self.state.write().await;
        let before = state.agents.len();
        state
            .agents
            .retain(|_, a| !a.is_default || valid_keys.contains(&a.key));
        Ok(before - state.agents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_upsert_and_listing() {
        let store = MemoryStore::new();
        let mut session = WorkroomSession::new("Launch", "Plan it");
        store.save_session(&session).await.unwrap();

        session.title = "Launch v2".to_string();
        store.save_session(&session).await.unwrap();

        let listed = store.list_sessions(false).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Launch v2");
    }

    #[tokio::test]
    async fn test_archived_sessions_hidden_by_default() {
        let store = MemoryStore::new();
        let mut session = WorkroomSession::new("Old", "Done");
        session.archive();
        store.save_session(&session).await.unwrap();

        assert!(store.list_sessions(false).await.unwrap().is_empty());
        assert_eq!(store.list_sessions(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transcript_full_replace() {
        let store = MemoryStore::new();
        let first = vec![ChatMessage::user("one")];
        store.save_messages("s1", &first).await.unwrap();

        let second = vec![ChatMessage::user("one"), ChatMessage::user("two")];
        store.save_messages("s1", &second).await.unwrap();

        let loaded = store.load_messages("s1").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(store.load_messages("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_refuses_default_agent() {
        let store = MemoryStore::new();
        ensure_default_agents(&store).await.unwrap();

        let agents = store.list_agents().await.unwrap();
        let default = agents.iter().find(|a| a.is_default).unwrap();
        assert!(!store.delete_agent(&default.id).await.unwrap());

        let custom = AgentDefinition::new("my_pm", "My PM", "You are a PM.");
        store.save_agent(&custom).await.unwrap();
        assert!(store.delete_agent(&custom.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_defaults_seeds_and_prunes() {
        let store = MemoryStore::new();

        // A default whose key is no longer shipped
        let mut stale = AgentDefinition::new("oldtimer", "Oldtimer", "Retired.");
        stale.is_default = true;
        store.save_agent(&stale).await.unwrap();

        ensure_default_agents(&store).await.unwrap();

        let agents = store.list_agents().await.unwrap();
        assert!(agents.iter().all(|a| a.key != "oldtimer"));
        assert!(agents.iter().any(|a| a.key == "challenger"));
        assert_eq!(agents.len(), default_agents().len());
    }

    #[tokio::test]
    async fn test_ensure_defaults_preserves_user_edited_prompt() {
        let store = MemoryStore::new();
        ensure_default_agents(&store).await.unwrap();

        let mut edited = store
            .list_agents()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.key == "challenger")
            .unwrap();
        edited.system_prompt = "You are a much tougher challenger.".to_string();
        edited.category = "wrong".to_string();
        store.save_agent(&edited).await.unwrap();

        ensure_default_agents(&store).await.unwrap();

        let reloaded = store
            .list_agents()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.key == "challenger")
            .unwrap();
        assert_eq!(reloaded.system_prompt, "You are a much tougher challenger.");
        assert_eq!(reloaded.category, "professional");
    }

    #[tokio::test]
    async fn test_decision_on_missing_session_is_false() {
        let store = MemoryStore::new();
        let added = store
            .add_decision("nope", Decision::new("x", "y"))
            .await
            .unwrap();
        assert!(!added);
    }
}
