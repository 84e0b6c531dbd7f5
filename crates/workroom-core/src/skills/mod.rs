//! Agent skills
//!
//! A [`Skill`] exposes a named, schema-described callable an agent may
//! invoke mid-turn. The [`SkillRegistry`] maps skill names to
//! implementations and is constructed explicitly and injected into the
//! orchestrator, so each test can build its own isolated registry.

pub mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use workroom_llm::ToolDefinition;

use crate::error::Result;

pub use builtin::{CurrentDateSkill, ListDecisionsSkill};

/// A callable exposed to agents via function calling
#[async_trait::async_trait]
pub trait Skill: Send + Sync {
    /// Unique snake_case identifier, e.g. "current_date"
    fn name(&self) -> &str;

    /// Natural-language description shown to the model
    fn description(&self) -> &str;

    /// JSON schema for the arguments; defaults to "no parameters"
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}, "required": []})
    }

    /// Execute the skill. The string result is fed back into the model's
    /// conversation as a tool turn.
    async fn execute(&self, args: serde_json::Value) -> Result<String>;
}

/// Registry mapping skill names to implementations
#[derive(Default)]
pub struct SkillRegistry {
    skills: HashMap<String, Arc<dyn Skill>>,
}

impl SkillRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill, replacing any existing skill with the same name
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        let name = skill.name().to_string();
        if self.skills.contains_key(&name) {
            warn!(skill = %name, "replacing existing skill");
        }
        debug!(skill = %name, "registered skill");
        self.skills.insert(name, skill);
    }

    /// Look up a skill by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Skill>> {
        self.skills.get(name)
    }

    /// All registered skill names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }

    /// Tool definitions for the given skill names, silently skipping
    /// unknown names (with a warning)
    #[must_use]
    pub fn tool_definitions(&self, skill_names: &[String]) -> Vec<ToolDefinition> {
        let mut tools = Vec::new();
        for name in skill_names {
            match self.skills.get(name) {
                Some(skill) => tools.push(ToolDefinition::new(
                    skill.name(),
                    skill.description(),
                    skill.parameters(),
                )),
                None => warn!(skill = %name, "unknown skill requested"),
            }
        }
        tools
    }

    /// Execute a skill by name.
    ///
    /// Never fails: unknown skills and execution errors come back as
    /// bracketed description strings the model can read and recover from.
    pub async fn execute(&self, name: &str, args: serde_json::Value) -> String {
        let Some(skill) = self.skills.get(name) else {
            warn!(skill = %name, "skill not found for execution");
            return format!(
                "[Skill '{name}' is not registered. Available: {:?}]",
                self.names()
            );
        };
        match skill.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                warn!(skill = %name, error = %e, "skill execution failed");
                format!("[Skill '{name}' raised an error: {e}]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSkill;

    #[async_trait::async_trait]
    impl Skill for EchoSkill {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the 'text' argument back."
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }

        async fn execute(&self, args: serde_json::Value) -> Result<String> {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct BrokenSkill;

    #[async_trait::async_trait]
    impl Skill for BrokenSkill {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        async fn execute(&self, _args: serde_json::Value) -> Result<String> {
            Err(crate::Error::Internal("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_execute_registered_skill() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill));

        let result = registry
            .execute("echo", serde_json::json!({"text": "hi"}))
            .await;
        assert_eq!(result, "hi");
    }

    #[tokio::test]
    async fn test_unknown_skill_yields_description_string() {
        let registry = SkillRegistry::new();
        let result = registry.execute("missing", serde_json::json!({})).await;
        assert!(result.contains("not registered"));
    }

    #[tokio::test]
    async fn test_failing_skill_yields_error_string() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(BrokenSkill));

        let result = registry.execute("broken", serde_json::json!({})).await;
        assert!(result.contains("raised an error"));
        assert!(result.contains("boom"));
    }

    #[test]
    fn test_tool_definitions_skip_unknown() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill));

        let tools = registry
            .tool_definitions(&["echo".to_string(), "missing".to_string()]);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
    }
}
