//! Single-agent turn execution
//!
//! [`LlmAgent`] turns an [`AgentDefinition`] into a live responder: it
//! assembles the system prompt from the persona plus live context (concise
//! constraint, document grounding, team awareness), trims history, calls the
//! completion service under the retry policy, and runs the bounded
//! tool/skill loop for agents that have skills.
//!
//! A failed turn never propagates an error; it degrades to a clearly-marked
//! placeholder so one agent's outage cannot abort a round table.

use std::sync::Arc;

use tracing::{debug, warn};
use workroom_llm::{
    CompletionRequest, LlmProvider, Message, ToolCompletionRequest, ToolCompletionResponse,
};

use crate::agents::definition::AgentDefinition;
use crate::session::{ChatMessage, ChatRole, DocumentContext};
use crate::skills::SkillRegistry;
use crate::utils::char_prefix;
use crate::utils::retry::{retry_with_backoff, RetryConfig};

/// How many history turns to include (concise mode carries more, because
/// round-table follow-ups need the cross-agent context)
const HISTORY_WINDOW: usize = 8;
const HISTORY_WINDOW_CONCISE: usize = 12;

/// Output caps: tight in concise mode so round tables stay skimmable
const MAX_OUTPUT_TOKENS: u32 = 2000;
const MAX_OUTPUT_TOKENS_CONCISE: u32 = 500;

/// Maximum full-text characters embedded for a turn with no prepared summary
const DOC_EMBED_CHARS: usize = 8000;

/// Cap on tool/skill rounds per turn
const MAX_TOOL_ROUNDS: usize = 5;

/// Behavioral constraint appended in live workroom discussions
const CONCISE_CONSTRAINT: &str = "\n\nCRITICAL CONSTRAINT - You are in a live workroom discussion. \
     You MUST respond in 3-5 sentences (absolute hard max 6 sentences). \
     Do NOT use headers, bullet lists, numbered lists, or multi-section formatting. \
     Write in flowing prose paragraphs only. \
     Lead with your key insight, recommendation, or answer. \
     You will get follow-up turns - do NOT try to cover everything in one response. \
     If you need more information, ask ONE focused follow-up question. \
     End with your single most important takeaway, prefixed with '->'.";

/// The shared context an agent sees for one turn
#[derive(Debug, Clone, Default)]
pub struct TurnContext<'a> {
    /// Recent conversation history, oldest first
    pub history: &'a [ChatMessage],
    /// Attached document, if any
    pub document: Option<&'a DocumentContext>,
    /// Prepared document-summary block (preferred over raw text for cost)
    pub summary_block: Option<&'a str>,
    /// Keys of the *other* agents active in the session
    pub teammates: &'a [String],
    /// Whether the concise workroom constraint applies
    pub concise: bool,
}

/// A persona that can produce one response per turn
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Routing key
    fn key(&self) -> &str;

    /// Display label
    fn label(&self) -> &str;

    /// Specialty description, shown to the routing model
    fn description(&self) -> &str;

    /// Produce one response. Must not fail: degraded turns return
    /// placeholder text.
    async fn respond(&self, message: &str, ctx: &TurnContext<'_>) -> String;
}

/// An agent backed by an LLM completion call
pub struct LlmAgent {
    definition: AgentDefinition,
    provider: Arc<dyn LlmProvider>,
    skills: Arc<SkillRegistry>,
    retry: RetryConfig,
}

impl LlmAgent {
    /// Create an agent from its definition
    #[must_use]
    pub fn new(
        definition: AgentDefinition,
        provider: Arc<dyn LlmProvider>,
        skills: Arc<SkillRegistry>,
    ) -> Self {
        Self {
            definition,
            provider,
            skills,
            retry: RetryConfig::default(),
        }
    }

    /// Set the retry policy for completion calls
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying definition
    #[must_use]
    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    fn unavailable_placeholder(&self) -> String {
        format!(
            "_({} is temporarily unavailable. Please resend your message to try again.)_",
            self.definition.label
        )
    }

    fn build_system_prompt(&self, ctx: &TurnContext<'_>) -> String {
        let mut prompt = self.definition.system_prompt.clone();

        if ctx.concise {
            prompt.push_str(CONCISE_CONSTRAINT);
        }

        if let Some(block) = ctx.summary_block {
            prompt.push_str("\n\n");
            prompt.push_str(block);
        } else if let Some(doc) = ctx.document {
            prompt.push_str(&format!(
                "\n\nA reference document has been uploaded to this session: **{}**. \
                 Its full text is embedded directly in the user message under \
                 'Document context'. You already have access to all of its content - \
                 do NOT say you cannot access the file.",
                doc.filename
            ));
        }

        if !ctx.teammates.is_empty() {
            prompt.push_str(&format!(
                "\n\nTeam context: other agents present: {}. \
                 Focus on YOUR unique specialty and do not duplicate what they would \
                 cover. If a point overlaps with another agent's area, mention it \
                 briefly and move on.",
                ctx.teammates.join(", ")
            ));
        }

        prompt
    }

    fn build_messages(&self, message: &str, ctx: &TurnContext<'_>) -> Vec<Message> {
        let mut messages = vec![Message::system(self.build_system_prompt(ctx))];

        let window = if ctx.concise {
            HISTORY_WINDOW_CONCISE
        } else {
            HISTORY_WINDOW
        };
        let start = ctx.history.len().saturating_sub(window);
        for turn in &ctx.history[start..] {
            if turn.content.is_empty() {
                continue;
            }
            // Skip prior stale refusals so they aren't reinforced
            let lower = turn.content.to_lowercase();
            if lower.contains("cannot access") || lower.contains("i need to extract") {
                continue;
            }
            messages.push(match turn.role {
                ChatRole::User => Message::user(turn.content.clone()),
                ChatRole::Assistant => Message::assistant(turn.content.clone()),
            });
        }

        // Embed the full document text only when no prepared summary exists
        let user_content = match (ctx.document, ctx.summary_block) {
            (Some(doc), None) => format!(
                "Document context ({}):\n---\n{}\n---\n\n{}",
                doc.filename,
                char_prefix(&doc.text, DOC_EMBED_CHARS),
                message
            ),
            _ => message.to_string(),
        };
        messages.push(Message::user(user_content));

        messages
    }

    async fn respond_plain(&self, messages: Vec<Message>, max_tokens: u32) -> String {
        let result = retry_with_backoff(
            &self.retry,
            || {
                let request = CompletionRequest::new()
                    .with_messages(messages.clone())
                    .with_max_tokens(max_tokens);
                async move { self.provider.complete(request).await }
            },
            workroom_llm::Error::is_transient,
        )
        .await;

        match result {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                warn!(
                    agent = %self.definition.key,
                    error = %e.last_error,
                    attempts = e.attempts,
                    "agent turn failed, substituting placeholder"
                );
                self.unavailable_placeholder()
            }
        }
    }

    async fn respond_with_skills(&self, mut messages: Vec<Message>, max_tokens: u32) -> String {
        let tools = self.skills.tool_definitions(&self.definition.skill_names);
        let mut last_text: Option<String> = None;

        for round in 0..MAX_TOOL_ROUNDS {
            let result = retry_with_backoff(
                &self.retry,
                || {
                    let request = ToolCompletionRequest::new(
                        CompletionRequest::new()
                            .with_messages(messages.clone())
                            .with_max_tokens(max_tokens),
                        tools.clone(),
                    );
                    async move { self.provider.complete_with_tools(request).await }
                },
                workroom_llm::Error::is_transient,
            )
            .await;

            let response: ToolCompletionResponse = match result {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        agent = %self.definition.key,
                        error = %e.last_error,
                        attempts = e.attempts,
                        "agent turn failed, substituting placeholder"
                    );
                    return self.unavailable_placeholder();
                }
            };

            if !response.has_tool_calls() {
                return response.content.unwrap_or_default().trim().to_string();
            }

            if let Some(content) = &response.content {
                if !content.is_empty() {
                    last_text = Some(content.clone());
                }
            }
            messages.push(Message::assistant(
                response.content.clone().unwrap_or_default(),
            ));

            for call in &response.tool_calls {
                let result = self.skills.execute(&call.name, call.arguments_value()).await;
                debug!(
                    agent = %self.definition.key,
                    skill = %call.name,
                    round,
                    "executed skill"
                );
                messages.push(Message::tool_response(call.id.clone(), result));
            }
        }

        warn!(
            agent = %self.definition.key,
            max_rounds = MAX_TOOL_ROUNDS,
            "tool round cap reached, returning last text"
        );
        last_text.unwrap_or_else(|| self.unavailable_placeholder())
    }
}

#[async_trait::async_trait]
impl Agent for LlmAgent {
    fn key(&self) -> &str {
        &self.definition.key
    }

    fn label(&self) -> &str {
        &self.definition.label
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    async fn respond(&self, message: &str, ctx: &TurnContext<'_>) -> String {
        let messages = self.build_messages(message, ctx);
        let max_tokens = if ctx.concise {
            MAX_OUTPUT_TOKENS_CONCISE
        } else {
            MAX_OUTPUT_TOKENS
        };

        if self.definition.skill_names.is_empty() {
            self.respond_plain(messages, max_tokens).await
        } else {
            self.respond_with_skills(messages, max_tokens).await
        }
    }
}
