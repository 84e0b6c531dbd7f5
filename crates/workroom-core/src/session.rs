//! Workroom data model
//!
//! A [`WorkroomSession`] is one goal-directed conversation with a curated
//! team of agents. Transcript turns ([`ChatMessage`]) are append-only;
//! decisions and generated outputs accumulate on the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a short random identifier
#[must_use]
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Operating mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkroomMode {
    /// Professional context
    #[default]
    Work,
    /// Personal context
    Life,
}

/// How the discussion is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionMode {
    /// Smart routing picks responders per message
    #[default]
    Open,
    /// Every message goes to the whole team
    RoundTable,
    /// One agent carries the discussion
    Focused,
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// In progress
    #[default]
    Active,
    /// Goal reached
    Completed,
    /// Soft-deleted; excluded from default listings
    Archived,
}

/// Closed set of synthesizable document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Product requirements document
    Prd,
    /// System design document
    Architecture,
    /// Chronological decision log
    DecisionLog,
    /// Agenda, logistics, action items
    EventPlan,
    /// Functional and non-functional requirements
    Requirements,
    /// Key points and next steps
    #[default]
    Summary,
    /// Caller-described output
    Custom,
}

impl OutputType {
    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prd => "PRD",
            Self::Architecture => "Architecture",
            Self::DecisionLog => "Decision Log",
            Self::EventPlan => "Event Plan",
            Self::Requirements => "Requirements",
            Self::Summary => "Summary",
            Self::Custom => "Custom",
        }
    }
}

/// A detected or manually logged commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Short identifier
    pub id: String,
    /// Decision text (bounded snippet)
    pub content: String,
    /// Snippet of the message that triggered the detection
    pub context: String,
    /// When the decision was recorded
    pub made_at: DateTime<Utc>,
}

impl Decision {
    /// Create a decision with a fresh id and timestamp
    #[must_use]
    pub fn new(content: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            content: content.into(),
            context: context.into(),
            made_at: Utc::now(),
        }
    }
}

/// A document synthesized from the session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedOutput {
    /// Short identifier
    pub id: String,
    /// Which document type was produced
    pub output_type: OutputType,
    /// Document title
    pub title: String,
    /// Full markdown content
    pub content: String,
    /// When the output was generated
    pub generated_at: DateTime<Utc>,
}

impl GeneratedOutput {
    /// Create an output record with a fresh id and timestamp
    #[must_use]
    pub fn new(output_type: OutputType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            output_type,
            title: title.into(),
            content: content.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Reference material attached to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentContext {
    /// Original filename
    pub filename: String,
    /// Extracted plain text
    pub text: String,
}

impl DocumentContext {
    /// Create a document context
    #[must_use]
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// Facilitator agent settings for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitatorSettings {
    /// Whether the facilitator participates
    pub enabled: bool,
    /// Summarize every N user messages
    pub summary_interval: u32,
    /// Whether the facilitator's intro has been sent
    pub intro_sent: bool,
}

impl Default for FacilitatorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            summary_interval: 6,
            intro_sent: false,
        }
    }
}

/// A goal-directed multi-agent conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkroomSession {
    /// Short identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Goal statement
    pub goal: String,
    /// Desired outcome / deliverable
    #[serde(default)]
    pub key_outcome: String,
    /// Operating mode
    #[serde(default)]
    pub mode: WorkroomMode,
    /// Target output type for synthesis
    #[serde(default)]
    pub output_type: OutputType,
    /// Discussion style
    #[serde(default)]
    pub discussion_mode: DiscussionMode,
    /// Agent carrying the discussion when mode is `Focused`; must be `None`
    /// otherwise
    #[serde(default)]
    pub focused_agent: Option<String>,
    /// Keys of agents participating in this session
    #[serde(default)]
    pub active_agents: Vec<String>,
    /// Accumulated decisions
    #[serde(default)]
    pub decisions: Vec<Decision>,
    /// Accumulated synthesized documents
    #[serde(default)]
    pub generated_outputs: Vec<GeneratedOutput>,
    /// Attached reference document; persists until explicitly cleared
    #[serde(default)]
    pub document: Option<DocumentContext>,
    /// Facilitator settings
    #[serde(default)]
    pub facilitator: FacilitatorSettings,
    /// Lifecycle state
    #[serde(default)]
    pub status: SessionStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl WorkroomSession {
    /// Create a new active session
    #[must_use]
    pub fn new(title: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            title: title.into(),
            goal: goal.into(),
            key_outcome: String::new(),
            mode: WorkroomMode::default(),
            output_type: OutputType::default(),
            discussion_mode: DiscussionMode::default(),
            focused_agent: None,
            active_agents: Vec::new(),
            decisions: Vec::new(),
            generated_outputs: Vec::new(),
            document: None,
            facilitator: FacilitatorSettings::default(),
            status: SessionStatus::default(),
            created_at: Utc::now(),
        }
    }

    /// Set the agent team
    #[must_use]
    pub fn with_agents(mut self, keys: Vec<String>) -> Self {
        self.active_agents = keys;
        self
    }

    /// Switch discussion mode, clearing the focused agent unless the new
    /// mode is `Focused`
    pub fn set_discussion_mode(&mut self, mode: DiscussionMode) {
        self.discussion_mode = mode;
        if mode != DiscussionMode::Focused {
            self.focused_agent = None;
        }
    }

    /// Focus the discussion on one agent
    pub fn focus_on(&mut self, agent_key: impl Into<String>) {
        self.discussion_mode = DiscussionMode::Focused;
        self.focused_agent = Some(agent_key.into());
    }

    /// Soft-delete the session
    pub fn archive(&mut self) {
        self.status = SessionStatus::Archived;
    }

    /// Whether the session is archived
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == SessionStatus::Archived
    }
}

/// Role of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Turn authored by the user
    User,
    /// Turn produced by an agent (or the team)
    Assistant,
}

/// One agent's contribution to a round table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// Display label of the responding agent
    pub agent_label: String,
    /// Response text
    pub text: String,
}

/// One turn in a session transcript (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the turn
    pub role: ChatRole,
    /// Text content (combined transcript for round tables)
    pub content: String,
    /// Originating agent label; `None` for user turns and round tables,
    /// where the author is conceptually "the team"
    #[serde(default)]
    pub agent_label: Option<String>,
    /// Parallel per-agent replies when produced by a round table
    #[serde(default)]
    pub replies: Option<Vec<AgentReply>>,
    /// When the turn was appended
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            agent_label: None,
            replies: None,
            sent_at: Utc::now(),
        }
    }

    /// Create a single-agent assistant turn
    #[must_use]
    pub fn assistant(agent_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            agent_label: Some(agent_label.into()),
            replies: None,
            sent_at: Utc::now(),
        }
    }

    /// Create a round-table turn with per-agent replies
    #[must_use]
    pub fn team(content: impl Into<String>, replies: Vec<AgentReply>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            agent_label: None,
            replies: Some(replies),
            sent_at: Utc::now(),
        }
    }
}
