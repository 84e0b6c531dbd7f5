//! Built-in skills

use std::sync::Arc;

use chrono::Utc;

use super::Skill;
use crate::error::Result;
use crate::storage::Storage;

/// Returns today's date in ISO 8601 format
pub struct CurrentDateSkill;

#[async_trait::async_trait]
impl Skill for CurrentDateSkill {
    fn name(&self) -> &str {
        "current_date"
    }

    fn description(&self) -> &str {
        "Returns today's date in ISO 8601 format (YYYY-MM-DD)."
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<String> {
        Ok(Utc::now().format("%Y-%m-%d").to_string())
    }
}

/// Lists the decisions logged so far in a session
pub struct ListDecisionsSkill {
    storage: Arc<dyn Storage>,
}

impl ListDecisionsSkill {
    /// Create the skill with its storage handle
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait::async_trait]
impl Skill for ListDecisionsSkill {
    fn name(&self) -> &str {
        "list_decisions"
    }

    fn description(&self) -> &str {
        "Lists the decisions logged so far in the given workroom session."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Identifier of the workroom session"
                }
            },
            "required": ["session_id"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String> {
        let session_id = args["session_id"].as_str().unwrap_or_default();
        let Some(session) = self.storage.get_session(session_id).await? else {
            return Ok(format!("[No session found with id '{session_id}']"));
        };
        if session.decisions.is_empty() {
            return Ok("No decisions have been logged in this session yet.".to_string());
        }
        let lines: Vec<String> = session
            .decisions
            .iter()
            .map(|d| format!("- [{}] {}", d.made_at.format("%Y-%m-%d %H:%M"), d.content))
            .collect();
        Ok(lines.join("\n"))
    }
}
