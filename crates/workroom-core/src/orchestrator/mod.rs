//! Message routing across the agent team
//!
//! The orchestrator owns the routing ladder (mentions, smart routing,
//! intent patterns, document Q&A, clarification), the parallel round
//! table, document summarization, decision capture, and output synthesis.

pub mod core;
pub mod decisions;
pub mod doc_context;
pub mod handle;
pub mod mentions;
pub mod round_table;
pub mod routing;
pub mod synthesis;
pub mod types;

pub use core::Orchestrator;
pub use decisions::contains_decision;
pub use doc_context::DocumentSummarizer;
pub use handle::MessageInput;
pub use mentions::{resolve_mentions, ResolvedMentions};
pub use routing::{detect_intent, is_open_ended, parse_agent_selection, Intent};
pub use types::{OrchestratorConfig, OrchestratorResponse};
