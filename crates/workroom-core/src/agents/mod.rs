//! Agent personas and the runtime that executes a single agent turn

pub mod definition;
pub mod runtime;

pub use definition::{default_agents, AgentDefinition};
pub use runtime::{Agent, LlmAgent, TurnContext};
