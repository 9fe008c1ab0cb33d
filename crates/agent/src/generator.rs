//! Tool-augmented answer generation.
//!
//! Two strategies, selected by [`GenerationMode`]:
//!
//! - **General**: call the researcher until it answers or reports an error,
//!   at most `max_research_attempts` times.
//! - **Specific**: one researcher pass; if that yields no answer, one writer
//!   pass over the recent log with tool results restated as assistant turns.
//!
//! Every tool result is appended to the session log the moment its pass
//! returns, and also fed back into the context of the next pass.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use turnwright_config::GenerationConfig;
use turnwright_core::agent::{ResearchAgent, ResearchOutput, ResearchRequest, WriterAgent, WriterRequest};
use turnwright_core::{
    EventBus, GenerationMode, Message, StreamableValue, ToolInvocationResult, TurnEvent, TurnLog,
    UiStream,
};

/// The result of one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutcome {
    pub full_response: String,
    /// Short-circuits the commit path regardless of `full_response`
    pub has_error: bool,
    pub tool_responses: Vec<ToolInvocationResult>,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        !self.has_error && !self.full_response.is_empty()
    }
}

/// The per-turn handles a generation run writes through.
pub struct TurnScope<'a> {
    pub turn_id: &'a str,
    pub group_id: &'a str,
    pub log: &'a RwLock<TurnLog>,
    pub ui: &'a UiStream,
    pub text: &'a StreamableValue<String>,
    pub events: &'a EventBus,
}

#[derive(Clone)]
pub struct AnswerGenerator {
    researcher: Arc<dyn ResearchAgent>,
    writer: Arc<dyn WriterAgent>,
    config: GenerationConfig,
    system_prompt: String,
}

impl AnswerGenerator {
    pub fn new(
        researcher: Arc<dyn ResearchAgent>,
        writer: Arc<dyn WriterAgent>,
        config: GenerationConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            researcher,
            writer,
            config,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.config.mode
    }

    /// Run the configured strategy. The text stream is finalized on return.
    pub async fn generate(&self, scope: &TurnScope<'_>, messages: Vec<Message>) -> GenerationOutcome {
        let outcome = match self.config.mode {
            GenerationMode::General => self.generate_general(scope, messages).await,
            GenerationMode::Specific => self.generate_specific(scope, messages).await,
        };

        if !scope.text.is_done() {
            let closed = if outcome.has_error {
                scope.text.close()
            } else {
                scope.text.done(outcome.full_response.clone())
            };
            if let Err(e) = closed {
                debug!(turn_id = scope.turn_id, error = %e, "Text stream already finalized");
            }
        }

        outcome
    }

    async fn generate_general(&self, scope: &TurnScope<'_>, mut context: Vec<Message>) -> GenerationOutcome {
        let mut tool_responses = Vec::new();

        for attempt in 1..=self.config.max_research_attempts {
            debug!(turn_id = scope.turn_id, attempt, "Research attempt");

            let output = self.research_pass(scope, &context, GenerationMode::General).await;
            self.record_tools(scope, &output.tool_responses, &mut context).await;
            tool_responses.extend(output.tool_responses);

            if output.has_error {
                warn!(turn_id = scope.turn_id, attempt, "Researcher reported an error");
                return GenerationOutcome {
                    full_response: output.full_response,
                    has_error: true,
                    tool_responses,
                };
            }

            if !output.full_response.is_empty() {
                info!(turn_id = scope.turn_id, attempts = attempt, "Answer generated");
                return GenerationOutcome {
                    full_response: output.full_response,
                    has_error: false,
                    tool_responses,
                };
            }
        }

        warn!(
            turn_id = scope.turn_id,
            attempts = self.config.max_research_attempts,
            "Research attempts exhausted without an answer"
        );
        GenerationOutcome {
            full_response: String::new(),
            has_error: true,
            tool_responses,
        }
    }

    async fn generate_specific(&self, scope: &TurnScope<'_>, mut context: Vec<Message>) -> GenerationOutcome {
        let output = self.research_pass(scope, &context, GenerationMode::Specific).await;
        self.record_tools(scope, &output.tool_responses, &mut context).await;

        if output.has_error || !output.full_response.is_empty() {
            return GenerationOutcome {
                full_response: output.full_response,
                has_error: output.has_error,
                tool_responses: output.tool_responses,
            };
        }

        let writer_context = scope.log.read().await.writer_window(self.config.specific_window);
        debug!(
            turn_id = scope.turn_id,
            messages = writer_context.len(),
            "No answer from researcher, falling back to writer"
        );

        let request = WriterRequest {
            system_prompt: &self.system_prompt,
            ui: scope.ui,
            text: scope.text,
            messages: &writer_context,
        };
        match self.writer.write(request).await {
            Ok(answer) => GenerationOutcome {
                full_response: answer,
                has_error: false,
                tool_responses: output.tool_responses,
            },
            Err(e) => {
                warn!(turn_id = scope.turn_id, error = %e, "Writer failed");
                GenerationOutcome {
                    full_response: String::new(),
                    has_error: true,
                    tool_responses: output.tool_responses,
                }
            }
        }
    }

    async fn research_pass(
        &self,
        scope: &TurnScope<'_>,
        context: &[Message],
        mode: GenerationMode,
    ) -> ResearchOutput {
        let request = ResearchRequest {
            system_prompt: &self.system_prompt,
            ui: scope.ui,
            text: scope.text,
            messages: context,
            mode,
        };
        match self.researcher.research(request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(turn_id = scope.turn_id, error = %e, "Researcher failed");
                ResearchOutput {
                    has_error: true,
                    ..ResearchOutput::default()
                }
            }
        }
    }

    /// Append tool results to the log in resolution order.
    async fn record_tools(
        &self,
        scope: &TurnScope<'_>,
        results: &[ToolInvocationResult],
        context: &mut Vec<Message>,
    ) {
        for result in results {
            let message = Message::tool_result(result, scope.group_id);
            scope.log.write().await.append(message.clone());
            context.push(message);

            debug!(turn_id = scope.turn_id, tool = %result.tool_name, "Tool result appended");
            scope.events.publish(TurnEvent::ToolResultAppended {
                turn_id: scope.turn_id.to_string(),
                tool_name: result.tool_name.clone(),
                timestamp: Utc::now(),
            });
        }
    }
}
