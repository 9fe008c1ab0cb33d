//! Message domain types.
//!
//! A message is keyed by `(role, kind)`: the role says who produced it, the
//! kind says what shape its `content` has. Content is an opaque string that is
//! frequently JSON-encoded (user forms, related-query payloads, tool results).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Content of the finalize batch's trailing follow-up marker.
pub const FOLLOWUP_CONTENT: &str = "followup";

/// Content of the persistence sentinel.
pub const END_CONTENT: &str = "end";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant (answers, inquiries, related queries, sentinels)
    Assistant,
    /// Tool invocation result
    Tool,
}

/// Disambiguates the payload shape within a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// User text, content `{"input": ...}`
    Input,
    /// User picked a related query, content `{"related_query": ...}`
    InputRelated,
    /// Clarifying question (assistant) or the user's answer form (user)
    Inquiry,
    /// Final answer text
    Response,
    /// JSON-encoded [`RelatedQueries`]
    Related,
    /// Follow-up affordance marker
    Followup,
    /// Tool result payload
    Tool,
    /// Persistence sentinel
    End,
    /// Any kind this version does not know about
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::InputRelated => "input_related",
            Self::Inquiry => "inquiry",
            Self::Response => "response",
            Self::Related => "related",
            Self::Followup => "followup",
            Self::Tool => "tool",
            Self::End => "end",
            Self::Unknown => "unknown",
        }
    }
}

/// A single entry of a [`TurnLog`](crate::log::TurnLog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who produced this message
    pub role: Role,

    /// Payload shape; absent on legacy records
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,

    /// Opaque content, often JSON
    pub content: String,

    /// Turn grouping key; everything one turn produces shares it
    #[serde(default)]
    pub group_id: String,

    /// Tool name for tool-role messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Message {
    fn build(role: Role, kind: MessageKind, content: String, group_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            kind: Some(kind),
            content,
            group_id: group_id.to_string(),
            name: None,
            created_at: Utc::now(),
        }
    }

    /// A user message of the given kind with raw content.
    pub fn user(kind: MessageKind, content: impl Into<String>, group_id: &str) -> Self {
        Self::build(Role::User, kind, content.into(), group_id)
    }

    /// An assistant message of the given kind.
    pub fn assistant(kind: MessageKind, content: impl Into<String>, group_id: &str) -> Self {
        Self::build(Role::Assistant, kind, content.into(), group_id)
    }

    /// A tool-role message carrying a JSON-encoded result.
    pub fn tool_result(result: &ToolInvocationResult, group_id: &str) -> Self {
        let mut msg = Self::build(
            Role::Tool,
            MessageKind::Tool,
            result.result_payload.to_string(),
            group_id,
        );
        msg.name = Some(result.tool_name.clone());
        msg
    }

    /// An untyped user directive sent to agents but never logged.
    pub fn directive(content: impl Into<String>, group_id: &str) -> Self {
        let mut msg = Self::build(Role::User, MessageKind::Input, content.into(), group_id);
        msg.kind = None;
        msg
    }

    /// The persistence sentinel.
    pub fn end(group_id: &str) -> Self {
        Self::assistant(MessageKind::End, END_CONTENT, group_id)
    }

    pub fn is_kind(&self, kind: MessageKind) -> bool {
        self.kind == Some(kind)
    }

    /// Parse `content` as a JSON object, `None` if it is not one.
    pub fn content_object(&self) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(&self.content) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// What the user submitted to start a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Literal user text
    Text(String),
    /// A related query the user selected from a previous answer
    RelatedQuery(String),
    /// The user's answer to a clarifying question, as a form object
    InquiryAnswer(Map<String, Value>),
    /// Proceed without new user content
    Skip,
}

impl Submission {
    /// The user message this submission logs, if any.
    pub fn to_message(&self, group_id: &str) -> Option<Message> {
        let (kind, content) = match self {
            Self::Text(text) => (
                MessageKind::Input,
                serde_json::json!({ "input": text }).to_string(),
            ),
            Self::RelatedQuery(query) => (
                MessageKind::InputRelated,
                serde_json::json!({ "related_query": query }).to_string(),
            ),
            Self::InquiryAnswer(form) => (
                MessageKind::Inquiry,
                Value::Object(form.clone()).to_string(),
            ),
            Self::Skip => return None,
        };
        Some(Message::user(kind, content, group_id))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// What agents see in place of user content for a skipped turn.
    pub fn skip_directive(group_id: &str) -> Message {
        Message::directive(serde_json::json!({ "action": "skip" }).to_string(), group_id)
    }
}

/// A single tool result produced during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub tool_name: String,
    pub result_payload: Value,
}

impl ToolInvocationResult {
    pub fn new(tool_name: impl Into<String>, result_payload: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            result_payload,
        }
    }
}

/// Payload of a `related` message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedQueries {
    pub items: Vec<RelatedQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub query: String,
}
