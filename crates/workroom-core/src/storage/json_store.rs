//! File-backed JSON storage
//!
//! Three files under one directory: `sessions.json`, `messages.json`, and
//! `agents.json`. Every write goes through a temp file in the same
//! directory followed by an atomic rename, so a crash mid-write leaves the
//! previous snapshot intact.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::agents::definition::AgentDefinition;
use crate::error::{Error, Result};
use crate::session::{ChatMessage, Decision, GeneratedOutput, WorkroomSession};
use crate::storage::Storage;

const SESSIONS_FILE: &str = "sessions.json";
const MESSAGES_FILE: &str = "messages.json";
const AGENTS_FILE: &str = "agents.json";

/// JSON-file storage rooted at a data directory
pub struct JsonStore {
    dir: PathBuf,
    // Single writer lock; file IO is blocking and cheap at this scale
    lock: tokio::sync::Mutex<()>,
}

impl JsonStore {
    /// Open (creating if needed) a store at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: tokio::sync::Mutex::new(()),
        })
    }

    fn load_file<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_file<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        write_atomic(&self.dir, &path, value)?;
        debug!(file = %path.display(), "persisted");
        Ok(())
    }

    fn load_sessions(&self) -> Result<HashMap<String, WorkroomSession>> {
        self.load_file(SESSIONS_FILE)
    }

    fn load_transcripts(&self) -> Result<HashMap<String, Vec<ChatMessage>>> {
        self.load_file(MESSAGES_FILE)
    }

    fn load_agent_map(&self) -> Result<HashMap<String, AgentDefinition>> {
        self.load_file(AGENTS_FILE)
    }
}

/// Serialize to a temp file in `dir`, then rename over `path`.
fn write_atomic<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| Error::Storage(format!("atomic rename failed: {e}")))?;
    Ok(())
}

#[async_trait::async_trait]
impl Storage for JsonStore {
    async fn save_session(&self, session: &WorkroomSession) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.load_sessions()?;
        sessions.insert(session.id.clone(), session.clone());
        self.write_file(SESSIONS_FILE, &sessions)
    }

    async fn get_session(&self, id: &str) -> Result<Option<WorkroomSession>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_sessions()?.remove(id))
    }

    async fn list_sessions(&self, include_archived: bool) -> Result<Vec<WorkroomSession>> {
        let _guard = self.lock.lock().await;
        let mut sessions: Vec<_> = self
            .load_sessions()?
            .into_values()
            .filter(|s| include_archived || !s.is_archived())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut transcripts = self.load_transcripts()?;
        transcripts.insert(session_id.to_string(), messages.to_vec());
        self.write_file(MESSAGES_FILE, &transcripts)
    }

    async fn load_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load_transcripts()?
            .remove(session_id)
            .unwrap_or_default())
    }

    async fn save_agent(&self, agent: &AgentDefinition) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut agents = self.load_agent_map()?;
        agents.insert(agent.id.clone(), agent.clone());
        self.write_file(AGENTS_FILE, &agents)
    }

    async fn list_agents(&self) -> Result<Vec<AgentDefinition>> {
        let _guard = self.lock.lock().await;
        let mut agents: Vec<_> = self.load_agent_map()?.into_values().collect();
        agents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(agents)
    }

    async fn delete_agent(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut agents = self.load_agent_map()?;
        match agents.get(id) {
            Some(agent) if agent.is_default => Ok(false),
            Some(_) => {
                agents.remove(id);
                self.write_file(AGENTS_FILE, &agents)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_decision(&self, session_id: &str, decision: Decision) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.load_sessions()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(false);
        };
        session.decisions.push(decision);
        self.write_file(SESSIONS_FILE, &sessions)?;
        Ok(true)
    }

    async fn add_output(&self, session_id: &str, output: GeneratedOutput) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.load_sessions()?;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(false);
        };
        session.generated_outputs.push(output);
        self.write_file(SESSIONS_FILE, &sessions)?;
        Ok(true)
    }

    async fn prune_stale_defaults(&self, valid_keys: &[String]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut agents = self.load_agent_map()?;
        let before = agents.len();
        agents.retain(|_, a| !a.is_default || valid_keys.contains(&a.key));
        let pruned = before - agents.len();
        if pruned > 0 {
            self.write_file(AGENTS_FILE, &agents)?;
        }
        Ok(pruned)
    }
}
