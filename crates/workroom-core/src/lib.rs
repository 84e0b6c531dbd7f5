//! Workroom core - multi-agent conversation sessions
//!
//! A workroom is a goal-directed conversation where a curated team of LLM
//! agents discusses alongside the user. This crate provides the session
//! model, the agent library and runtime, persistence, skills, and the
//! orchestrator that routes each message to the right agent(s) and
//! synthesizes the discussion into structured documents.
//!
//! The model backend is abstracted behind [`workroom_llm::LlmProvider`];
//! everything here is tested against the in-repo mock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod session;
pub mod skills;
pub mod storage;
pub mod utils;

pub use agents::{default_agents, Agent, AgentDefinition, LlmAgent, TurnContext};
pub use error::{Error, Result};
pub use extract::{DocumentExtractor, PlainTextExtractor};
pub use orchestrator::{
    MessageInput, Orchestrator, OrchestratorConfig, OrchestratorResponse,
};
pub use session::{
    AgentReply, ChatMessage, ChatRole, Decision, DiscussionMode, DocumentContext,
    FacilitatorSettings, GeneratedOutput, OutputType, SessionStatus, WorkroomMode,
    WorkroomSession,
};
pub use skills::{Skill, SkillRegistry};
pub use storage::{ensure_default_agents, JsonStore, MemoryStore, Storage};
pub use utils::retry::RetryConfig;
