//! Agent definitions and the default agent library
//!
//! An [`AgentDefinition`] is a reusable persona: a routing key, a display
//! label, and a system prompt, optionally wired to callable skills. Default
//! agents ship with the system and are reseeded on startup; user-created
//! agents live entirely in storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::short_id;

/// A reusable agent persona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Record identifier
    pub id: String,
    /// Routing identifier, unique across the agent library (e.g. "challenger")
    pub key: String,
    /// Display label (e.g. "Challenger")
    pub label: String,
    /// One-line specialty description, shown to the routing model
    #[serde(default)]
    pub description: String,
    /// Full system prompt
    pub system_prompt: String,
    /// Category tag; resynced from the default library for default agents
    #[serde(default)]
    pub category: String,
    /// True for agents shipped with the system
    #[serde(default)]
    pub is_default: bool,
    /// Names of skills this agent may invoke mid-turn; empty = no tool use
    #[serde(default)]
    pub skill_names: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AgentDefinition {
    /// Create a user-defined agent
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: short_id(),
            key: key.into(),
            label: label.into(),
            description: String::new(),
            system_prompt: system_prompt.into(),
            category: String::new(),
            is_default: false,
            skill_names: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the specialty description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category tag
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Grant callable skills
    #[must_use]
    pub fn with_skills(mut self, skill_names: Vec<String>) -> Self {
        self.skill_names = skill_names;
        self
    }

    fn default_agent(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// The default agent library, seeded into storage on startup.
///
/// Keys here are the source of truth: stored defaults whose keys disappear
/// from this list are pruned, and categories are re-asserted on every load.
#[must_use]
pub fn default_agents() -> Vec<AgentDefinition> {
    vec![
        AgentDefinition::new(
            "challenger",
            "Challenger",
            "You are the Challenger, a rigorous devil's advocate. Your job is to \
             stress-test ideas: find the weakest assumption, name the most likely \
             failure mode, and argue the strongest opposing case. Be direct and \
             specific; vague caution is useless. When a plan survives your \
             scrutiny, say so plainly.",
        )
        .with_description("Stress-tests ideas, argues the opposing case, finds risks")
        .with_category("professional")
        .default_agent(),
        AgentDefinition::new(
            "writer",
            "Writer",
            "You are the Writer, an expert at turning rough discussion into crisp \
             prose. You draft emails, briefs, summaries, and stakeholder updates. \
             Match the register to the audience, lead with the point, and keep \
             every sentence earning its place.",
        )
        .with_description("Drafts emails, briefs, summaries, and stakeholder updates")
        .with_category("professional")
        .default_agent(),
        AgentDefinition::new(
            "researcher",
            "Researcher",
            "You are the Researcher. You provide background, industry context, and \
             deep dives on topics the team raises. Distinguish what you know with \
             confidence from informed speculation, and always say which is which.",
        )
        .with_description("Provides background, deep dives, and industry context")
        .with_category("professional")
        .default_agent(),
        AgentDefinition::new(
            "facilitator",
            "Facilitator",
            "You are the Facilitator. You keep the discussion moving toward the \
             session goal: summarize where the group stands, surface unresolved \
             disagreements, and propose the next concrete question to settle. You \
             never take sides on content.",
        )
        .with_description("Facilitates discussion, summarizes progress")
        .with_category("professional")
        .default_agent(),
    ]
}
