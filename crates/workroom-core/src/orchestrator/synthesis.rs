//! Output synthesis - compile a discussion into a structured document

use tracing::{info, warn};
use workroom_llm::{CompletionRequest, LlmProvider, Message};

use crate::error::Result;
use crate::orchestrator::core::Orchestrator;
use crate::session::{ChatMessage, ChatRole, GeneratedOutput, OutputType, WorkroomSession};
use crate::storage::Storage;
use crate::utils::char_prefix;

const SYNTHESIS_SYSTEM: &str = "You are a synthesis agent for a Multi-Agent Workroom.\n\n\
    Your job is to compile a multi-agent discussion into a high-quality, structured document.\n\n\
    Output requirements by type:\n\
    - **PRD**: Title, Overview, Problem Statement, Goals, Target Users, Key Features (prioritised), Non-Goals, Success Metrics, Open Questions\n\
    - **Architecture**: Overview, Components, Data Flow, API / Integration points, Trade-offs, Risks, Next Steps\n\
    - **Requirements**: Functional Requirements (numbered), Non-Functional Requirements, Constraints, Assumptions\n\
    - **Decision Log**: Chronological list of decisions made - each with context, options considered, decision taken, rationale\n\
    - **Event Plan**: Goal, Date/Time, Attendees, Agenda (timed), Logistics, Budget (if mentioned), Action Items\n\
    - **Summary**: TL;DR (2-3 sentences), Key Points (bullets), Decisions Made, Open Questions, Next Steps\n\
    - **Custom**: Interpret the user's custom request and produce the most useful structured output\n\n\
    Rules:\n\
    - Be concrete - use actual names, numbers, and quotes from the discussion\n\
    - Do not invent details not present in the conversation; write [NEEDS INPUT] where a required fact is missing\n\
    - Use clear markdown headers and bullet points\n\
    - Length: comprehensive but not padded - quality over quantity\n\n\
    Return only the document content in markdown. No preamble like \"Here is the document:\".";

/// Transcript turns shorter than this are noise (acks, upload markers)
const MIN_TURN_CHARS: usize = 5;
const DECISION_SNIPPET_CHARS: usize = 200;

impl Orchestrator {
    /// Synthesize the transcript into a structured document.
    ///
    /// A completion failure yields placeholder text rather than an error;
    /// the result is persisted on the session when one is given.
    pub async fn generate_output(
        &self,
        output_type: OutputType,
        messages: &[ChatMessage],
        session: Option<&WorkroomSession>,
        custom_description: &str,
    ) -> Result<String> {
        let turns: Vec<String> = messages
            .iter()
            .filter(|m| m.content.len() >= MIN_TURN_CHARS)
            .map(|m| {
                let speaker = match (&m.role, &m.agent_label) {
                    (ChatRole::User, _) => "User",
                    (ChatRole::Assistant, Some(label)) => label.as_str(),
                    (ChatRole::Assistant, None) => "Team",
                };
                format!("**{speaker}:** {}", m.content)
            })
            .collect();
        let start = turns.len().saturating_sub(self.config.transcript_cap);
        let transcript = turns[start..].join("\n\n");

        let mut context_parts = Vec::new();
        if let Some(session) = session {
            context_parts.push(format!("Session title: {}", session.title));
            context_parts.push(format!("Session goal: {}", session.goal));
            if !session.decisions.is_empty() {
                let decisions = session
                    .decisions
                    .iter()
                    .map(|d| format!("- {}", char_prefix(&d.content, DECISION_SNIPPET_CHARS)))
                    .collect::<Vec<_>>()
                    .join("\n");
                context_parts.push(format!("Logged decisions:\n{decisions}"));
            }
        }
        if !custom_description.is_empty() {
            context_parts.push(format!("Custom output description: {custom_description}"));
        }

        let mut prompt = format!(
            "Generate a **{}** from the following multi-agent workroom discussion.\n\n",
            output_type.label().to_uppercase()
        );
        if !context_parts.is_empty() {
            prompt.push_str(&format!("Session context:\n{}\n\n", context_parts.join("\n")));
        }
        prompt.push_str(&format!("Conversation transcript:\n\n{transcript}"));

        let request = CompletionRequest::new()
            .with_message(Message::system(SYNTHESIS_SYSTEM))
            .with_message(Message::user(prompt))
            .with_max_tokens(3000);

        let content = match self.provider.complete(request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "output synthesis failed");
                "_(Unable to generate output due to a connection issue. Please try again.)_"
                    .to_string()
            }
        };

        if let Some(session) = session {
            let title = format!("{} - {}", output_type.label(), session.title);
            info!(session = %session.id, output = %output_type.label(), "persisting generated output");
            self.storage
                .add_output(
                    &session.id,
                    GeneratedOutput::new(output_type, title, content.clone()),
                )
                .await?;
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::types::OrchestratorConfig;
    use crate::storage::{MemoryStore, Storage};
    use std::sync::Arc;
    use workroom_llm::{CompletionResponse, MockProvider};

    #[tokio::test]
    async fn test_short_turns_filtered_from_transcript() {
        let provider = Arc::new(MockProvider::with_handler(|req| {
            let prompt = &req.messages.last().unwrap().content;
            assert!(prompt.contains("**User:** should we ship on Friday?"));
            assert!(prompt.contains("**Challenger:** only if staging is green"));
            assert!(!prompt.contains("**User:** ok"));
            Ok(CompletionResponse {
                content: "# Summary".to_string(),
                model: "mock-model".to_string(),
            })
        }));
        let orchestrator = Orchestrator::new(
            provider,
            Arc::new(MemoryStore::new()),
            OrchestratorConfig::default(),
        );

        let messages = vec![
            ChatMessage::user("should we ship on Friday?"),
            ChatMessage::assistant("Challenger", "only if staging is green"),
            ChatMessage::user("ok"),
        ];
        let content = orchestrator
            .generate_output(OutputType::Summary, &messages, None, "")
            .await
            .unwrap();
        assert_eq!(content, "# Summary");
    }

    #[tokio::test]
    async fn test_output_persisted_on_session() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("# PRD\n\ncontent");
        let storage = Arc::new(MemoryStore::new());
        let session = WorkroomSession::new("Launch", "Plan it");
        storage.save_session(&session).await.unwrap();

        let orchestrator =
            Orchestrator::new(provider, storage.clone(), OrchestratorConfig::default());
        orchestrator
            .generate_output(
                OutputType::Prd,
                &[ChatMessage::user("long enough turn")],
                Some(&session),
                "",
            )
            .await
            .unwrap();

        let loaded = storage.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.generated_outputs.len(), 1);
        assert_eq!(loaded.generated_outputs[0].title, "PRD - Launch");
        assert_eq!(loaded.generated_outputs[0].output_type, OutputType::Prd);
    }

    #[tokio::test]
    async fn test_session_decisions_included_in_context() {
        let provider = Arc::new(MockProvider::with_handler(|req| {
            let prompt = &req.messages.last().unwrap().content;
            assert!(prompt.contains("Logged decisions:"));
            assert!(prompt.contains("- ship friday"));
            Ok(CompletionResponse {
                content: "doc".to_string(),
                model: "mock-model".to_string(),
            })
        }));
        let storage = Arc::new(MemoryStore::new());
        let mut session = WorkroomSession::new("Launch", "Plan it");
        session
            .decisions
            .push(crate::session::Decision::new("ship friday", "ctx"));
        storage.save_session(&session).await.unwrap();

        let orchestrator =
            Orchestrator::new(provider, storage, OrchestratorConfig::default());
        orchestrator
            .generate_output(
                OutputType::DecisionLog,
                &[ChatMessage::user("a long enough message")],
                Some(&session),
                "",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_synthesis_failure_yields_placeholder() {
        let provider = Arc::new(MockProvider::with_handler(|_| {
            Err(workroom_llm::Error::Network("down".to_string()))
        }));
        let orchestrator = Orchestrator::new(
            provider,
            Arc::new(MemoryStore::new()),
            OrchestratorConfig::default(),
        );

        let content = orchestrator
            .generate_output(
                OutputType::Summary,
                &[ChatMessage::user("a long enough message")],
                None,
                "",
            )
            .await
            .unwrap();
        assert!(content.contains("Unable to generate output"));
    }
}
