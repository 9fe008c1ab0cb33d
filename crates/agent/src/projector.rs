//! Rebuilds renderable UI state from a log.
//!
//! Used when a stored chat is reopened or shared. Projection is a pure
//! function of the log: malformed entries are logged and render nothing,
//! and the rest of the log still projects.

use serde_json::Value;
use tracing::warn;
use turnwright_core::{Message, MessageKind, RelatedQueries, Role, StreamReader, StreamableValue, TurnLog, ViewMode};

/// Tool name whose payloads may carry a map query.
pub const GEOSPATIAL_TOOL: &str = "geospatialQueryTool";

/// `type` field value marking a map query payload.
pub const MAP_QUERY_TRIGGER: &str = "MAP_QUERY_TRIGGER";

/// One rendered log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEntry {
    /// ID of the message this entry came from
    pub id: String,
    pub view: View,
    /// Present on tool views; whether the section starts collapsed
    pub is_collapsed: Option<StreamReader<bool>>,
}

/// What an entry renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    UserMessage {
        message: String,
        chat_id: String,
        show_share: bool,
    },
    Inquiry {
        content: String,
    },
    Response {
        answer: StreamReader<String>,
    },
    Related {
        queries: StreamReader<RelatedQueries>,
    },
    Followup,
    MapQuery {
        tool_output: Value,
    },
    Search {
        result: StreamReader<String>,
    },
    Retrieve {
        data: Value,
    },
    VideoSearch {
        result: StreamReader<String>,
    },
}

impl View {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserMessage { .. } => "user_message",
            Self::Inquiry { .. } => "inquiry",
            Self::Response { .. } => "response",
            Self::Related { .. } => "related",
            Self::Followup => "followup",
            Self::MapQuery { .. } => "map_query",
            Self::Search { .. } => "search",
            Self::Retrieve { .. } => "retrieve",
            Self::VideoSearch { .. } => "video_search",
        }
    }
}

/// The view mode a log should be shown in; share pages are always read-only.
pub fn view_mode_for(log: &TurnLog, configured: ViewMode) -> ViewMode {
    if log.is_share_page {
        ViewMode::SharedReadOnly
    } else {
        configured
    }
}

/// Project the whole log, in order.
pub fn project(log: &TurnLog, mode: ViewMode) -> Vec<UiEntry> {
    let shared = mode == ViewMode::SharedReadOnly;
    log.messages()
        .iter()
        .enumerate()
        .filter_map(|(index, message)| project_message(&log.session_id, index, message, shared))
        .collect()
}

fn project_message(chat_id: &str, index: usize, message: &Message, shared: bool) -> Option<UiEntry> {
    let kind = message.kind?;
    if kind == MessageKind::End {
        return None;
    }
    if shared && matches!(kind, MessageKind::Related | MessageKind::Followup) {
        return None;
    }

    let entry = |view: View| UiEntry {
        id: message.id.clone(),
        view,
        is_collapsed: None,
    };

    match (message.role, kind) {
        (Role::User, MessageKind::Input | MessageKind::InputRelated) => {
            let field = if kind == MessageKind::Input {
                "input"
            } else {
                "related_query"
            };
            let Some(text) = message
                .content_object()
                .and_then(|obj| obj.get(field).and_then(Value::as_str).map(str::to_string))
            else {
                warn!(message_id = %message.id, field, "User message content is not parseable");
                return None;
            };
            Some(entry(View::UserMessage {
                message: text,
                chat_id: chat_id.to_string(),
                show_share: index == 0 && !shared,
            }))
        }
        (Role::User, MessageKind::Inquiry) => Some(entry(View::Inquiry {
            content: message.content.clone(),
        })),
        (Role::Assistant, MessageKind::Response) => Some(entry(View::Response {
            answer: StreamableValue::resolved(message.content.clone()),
        })),
        (Role::Assistant, MessageKind::Related) => {
            match serde_json::from_str::<RelatedQueries>(&message.content) {
                Ok(queries) => Some(entry(View::Related {
                    queries: StreamableValue::resolved(queries),
                })),
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "Related queries are not parseable");
                    None
                }
            }
        }
        (Role::Assistant, MessageKind::Followup) => Some(entry(View::Followup)),
        (Role::Tool, _) => project_tool(message),
        _ => None,
    }
}

fn project_tool(message: &Message) -> Option<UiEntry> {
    let output: Value = match serde_json::from_str(&message.content) {
        Ok(output) => output,
        Err(e) => {
            warn!(message_id = %message.id, error = %e, "Tool result is not parseable");
            return None;
        }
    };
    let name = message.name.as_deref().unwrap_or_default();

    if name == GEOSPATIAL_TOOL
        && output.get("type").and_then(Value::as_str) == Some(MAP_QUERY_TRIGGER)
    {
        return Some(UiEntry {
            id: message.id.clone(),
            view: View::MapQuery { tool_output: output },
            is_collapsed: Some(StreamableValue::resolved(false)),
        });
    }

    let view = match name {
        "search" => View::Search {
            result: StreamableValue::resolved(output.to_string()),
        },
        "retrieve" => View::Retrieve { data: output },
        "videoSearch" => View::VideoSearch {
            result: StreamableValue::resolved(output.to_string()),
        },
        other => {
            warn!(message_id = %message.id, tool = other, "Unhandled tool result");
            return None;
        }
    };
    Some(UiEntry {
        id: message.id.clone(),
        view,
        is_collapsed: Some(StreamableValue::resolved(true)),
    })
}
