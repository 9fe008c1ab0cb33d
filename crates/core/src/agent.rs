//! Collaborator agent contracts consumed by the orchestrator.
//!
//! The agents themselves (and their transport to model back ends) live
//! outside this workspace; the core only sees these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::{Message, RelatedQueries, ToolInvocationResult};
use crate::stream::StreamableValue;
use crate::ui::UiStream;

/// Which answer-generation strategy runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Retry the tool-augmented researcher until it answers
    #[default]
    General,
    /// One researcher pass, then a constrained writer fallback
    Specific,
}

/// The classifier's branch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Proceed,
    Inquire,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub next: NextStep,
}

/// A clarifying question for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub question: String,
}

/// Everything a researcher pass needs.
pub struct ResearchRequest<'a> {
    pub system_prompt: &'a str,
    pub ui: &'a UiStream,
    pub text: &'a StreamableValue<String>,
    pub messages: &'a [Message],
    pub mode: GenerationMode,
}

/// What one researcher pass produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchOutput {
    pub full_response: String,
    pub has_error: bool,
    pub tool_responses: Vec<ToolInvocationResult>,
}

/// Everything the constrained writer needs.
pub struct WriterRequest<'a> {
    pub system_prompt: &'a str,
    pub ui: &'a UiStream,
    pub text: &'a StreamableValue<String>,
    pub messages: &'a [Message],
}

/// Decides whether to ask a clarifying question or proceed.
///
/// `Ok(None)` means the classifier could not decide; the turn proceeds.
#[async_trait]
pub trait TaskClassifier: Send + Sync {
    async fn classify(&self, messages: &[Message]) -> Result<Option<Classification>, AgentError>;
}

#[async_trait]
pub trait InquiryAgent: Send + Sync {
    async fn inquire(&self, ui: &UiStream, messages: &[Message]) -> Result<Inquiry, AgentError>;
}

/// Tool-augmented answer generation.
///
/// Implementations stream partial answer text through `text` and progress
/// fragments through `ui`; they must not finalize either handle.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn research(&self, request: ResearchRequest<'_>) -> Result<ResearchOutput, AgentError>;
}

/// Constrained writer used as the specific-mode fallback.
#[async_trait]
pub trait WriterAgent: Send + Sync {
    async fn write(&self, request: WriterRequest<'_>) -> Result<String, AgentError>;
}

#[async_trait]
pub trait QuerySuggestor: Send + Sync {
    async fn suggest(&self, messages: &[Message]) -> Result<RelatedQueries, AgentError>;
}
