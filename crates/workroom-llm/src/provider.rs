//! LLM provider trait and test double
//!
//! [`LlmProvider`] is the single seam between the orchestrator and any model
//! backend. [`MockProvider`] is the in-repo implementation used by the test
//! suites: it serves queued responses, or computes responses from the request
//! via a handler closure, and counts every call.

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Trait for LLM completion backends
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name, for logging
    fn name(&self) -> &str;

    /// Whether the provider supports function calling/tools
    fn supports_tools(&self) -> bool;

    /// Default model identifier
    fn default_model(&self) -> &str;

    /// Complete a conversation (text only)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Complete a conversation with tools available
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse>;
}

/// Handler computing a response from the request contents.
pub type MockHandler =
    dyn Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync + 'static;

/// A mock provider for tests.
///
/// Responses are resolved in order of preference: a queued tool response (for
/// `complete_with_tools`), a queued text response, the handler closure, then a
/// fixed default. Every call increments the call counter regardless of how it
/// was answered, which is what the summary-memoization tests observe.
pub struct MockProvider {
    text_responses: Mutex<VecDeque<CompletionResponse>>,
    tool_responses: Mutex<VecDeque<ToolCompletionResponse>>,
    handler: Option<Box<MockHandler>>,
    calls: AtomicU32,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a mock that answers every call with a fixed default
    #[must_use]
    pub fn new() -> Self {
        Self {
            text_responses: Mutex::new(VecDeque::new()),
            tool_responses: Mutex::new(VecDeque::new()),
            handler: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Create a mock whose responses are computed from the request
    #[must_use]
    pub fn with_handler(
        handler: impl Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            text_responses: Mutex::new(VecDeque::new()),
            tool_responses: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            calls: AtomicU32::new(0),
        }
    }

    /// Queue a text response
    pub fn push_text(&self, content: impl Into<String>) {
        self.text_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(CompletionResponse {
                content: content.into(),
                model: "mock-model".to_string(),
            });
    }

    /// Queue a tool-completion response
    pub fn push_tool_response(&self, response: ToolCompletionResponse) {
        self.tool_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Number of completion calls served so far (both variants)
    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn default_response() -> CompletionResponse {
        CompletionResponse {
            content: "mock response".to_string(),
            model: "mock-model".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(resp) = self
            .text_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Ok(resp);
        }
        if let Some(handler) = &self.handler {
            return handler(&request);
        }
        Ok(Self::default_response())
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        if let Some(resp) = self
            .tool_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            return Ok(resp);
        }

        // Fall through to the text path so handler-driven mocks serve both
        // entry points.
        let text = self.complete(request.request).await?;
        Ok(ToolCompletionResponse {
            content: Some(text.content),
            tool_calls: vec![],
            model: text.model,
        })
    }
}
