//! Offline stand-ins for the model-backed agents.
//!
//! They exercise the full turn pipeline without any network back end:
//! one-word questions get a clarifying question, everything else goes
//! through one search pass and a canned answer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use turnwright_agent::Agents;
use turnwright_core::agent::{
    Classification, Inquiry, InquiryAgent, QuerySuggestor, ResearchAgent, ResearchOutput,
    ResearchRequest, TaskClassifier, WriterAgent, WriterRequest,
};
use turnwright_core::error::AgentError;
use turnwright_core::message::RelatedQuery;
use turnwright_core::{
    FragmentKind, GenerationMode, Message, MessageKind, NextStep, RelatedQueries, Role,
    ToolInvocationResult, UiFragment, UiStream,
};

pub fn agents() -> Agents {
    Agents {
        classifier: Arc::new(OfflineClassifier),
        inquiry: Arc::new(OfflineInquiry),
        researcher: Arc::new(OfflineResearcher),
        writer: Arc::new(OfflineWriter),
        suggestor: Arc::new(OfflineSuggestor),
    }
}

/// The most recent thing the user asked about.
fn topic(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .find_map(|m| {
            let field = match m.kind? {
                MessageKind::Input => "input",
                MessageKind::InputRelated => "related_query",
                MessageKind::Inquiry => "answer",
                _ => return None,
            };
            m.content_object()?
                .get(field)?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "your question".to_string())
}

struct OfflineClassifier;

#[async_trait]
impl TaskClassifier for OfflineClassifier {
    async fn classify(&self, messages: &[Message]) -> Result<Option<Classification>, AgentError> {
        let Some(last) = messages.last() else {
            return Ok(None);
        };
        let vague = last.is_kind(MessageKind::Input)
            && last.role == Role::User
            && topic(std::slice::from_ref(last)).split_whitespace().count() < 2;
        Ok(Some(Classification {
            next: if vague {
                NextStep::Inquire
            } else {
                NextStep::Proceed
            },
        }))
    }
}

struct OfflineInquiry;

#[async_trait]
impl InquiryAgent for OfflineInquiry {
    async fn inquire(&self, ui: &UiStream, messages: &[Message]) -> Result<Inquiry, AgentError> {
        let question = format!("What would you like to know about \"{}\"?", topic(messages));
        ui.append(UiFragment::new(
            FragmentKind::Inquiry,
            json!({ "question": question }),
        ))
        .map_err(|e| AgentError::request_failed("inquiry", e.to_string()))?;
        Ok(Inquiry { question })
    }
}

struct OfflineResearcher;

#[async_trait]
impl ResearchAgent for OfflineResearcher {
    async fn research(&self, request: ResearchRequest<'_>) -> Result<ResearchOutput, AgentError> {
        let topic = topic(request.messages);
        let searched = request.messages.iter().any(|m| m.role == Role::Tool);
        let stream_err = |e: turnwright_core::error::StreamError| {
            AgentError::request_failed("researcher", e.to_string())
        };

        if !searched {
            let payload = json!({ "query": topic, "results": [] });
            request
                .ui
                .append(UiFragment::new(FragmentKind::Search, payload.clone()))
                .map_err(stream_err)?;
            return Ok(ResearchOutput {
                tool_responses: vec![ToolInvocationResult::new("search", payload)],
                ..ResearchOutput::default()
            });
        }

        // Specific mode leaves the answer to the writer.
        if request.mode == GenerationMode::Specific {
            return Ok(ResearchOutput::default());
        }

        let answer = format!("No live back end is configured, so here is an offline answer about {topic}.");
        let mut partial = String::new();
        for word in answer.split_inclusive(' ') {
            partial.push_str(word);
            request.text.write(partial.clone()).map_err(stream_err)?;
        }
        request
            .ui
            .append(UiFragment::new(FragmentKind::Answer, json!({ "text": answer })))
            .map_err(stream_err)?;

        Ok(ResearchOutput {
            full_response: answer,
            ..ResearchOutput::default()
        })
    }
}

struct OfflineWriter;

#[async_trait]
impl WriterAgent for OfflineWriter {
    async fn write(&self, request: WriterRequest<'_>) -> Result<String, AgentError> {
        let results = request
            .messages
            .iter()
            .filter(|m| m.is_kind(MessageKind::Tool))
            .count();
        let answer = format!(
            "Offline summary about {} from {results} tool result(s).",
            topic(request.messages)
        );
        request
            .ui
            .append(UiFragment::new(FragmentKind::Answer, json!({ "text": answer })))
            .map_err(|e| AgentError::request_failed("writer", e.to_string()))?;
        Ok(answer)
    }
}

struct OfflineSuggestor;

#[async_trait]
impl QuerySuggestor for OfflineSuggestor {
    async fn suggest(&self, messages: &[Message]) -> Result<RelatedQueries, AgentError> {
        let topic = topic(messages);
        Ok(RelatedQueries {
            items: vec![
                RelatedQuery {
                    query: format!("{topic} explained"),
                },
                RelatedQuery {
                    query: format!("latest on {topic}"),
                },
            ],
        })
    }
}
