//! The append-only per-session message record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{FOLLOWUP_CONTENT, Message, MessageKind, RelatedQueries, Role};

/// Title used when the first message carries no `input` text.
pub const UNTITLED_CHAT: &str = "Untitled Chat";

/// Titles are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Ordered record of one session's messages.
///
/// Entries are only ever appended. The one bulk append is the finalize batch
/// `[response, related, followup]`, which always lands as a single step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnLog {
    /// Session (chat) ID
    pub session_id: String,

    messages: Vec<Message>,

    /// Rendered as a shared, read-only page
    #[serde(default)]
    pub is_share_page: bool,
}

impl TurnLog {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            is_share_page: false,
        }
    }

    /// A log with a fresh random session ID.
    pub fn fresh() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Rebuild a log from previously stored messages.
    pub fn restore(session_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            session_id: session_id.into(),
            messages,
            is_share_page: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append the finalize batch for one turn in a single step.
    pub fn append_finalize(&mut self, group_id: &str, answer: &str, related: &RelatedQueries) {
        let related_json =
            serde_json::to_string(related).unwrap_or_else(|_| r#"{"items":[]}"#.to_string());
        self.messages.extend([
            Message::assistant(MessageKind::Response, answer, group_id),
            Message::assistant(MessageKind::Related, related_json, group_id),
            Message::assistant(MessageKind::Followup, FOLLOWUP_CONTENT, group_id),
        ]);
    }

    /// Append the persistence sentinel.
    pub fn seal(&mut self, group_id: &str) {
        self.messages.push(Message::end(group_id));
    }

    /// Explicit full-history clear; the session ID is kept.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Whether the log holds a `response`, which gates persistence.
    pub fn is_persist_eligible(&self) -> bool {
        self.messages.iter().any(|m| m.is_kind(MessageKind::Response))
    }

    /// The last `window` messages worth sending to agents.
    ///
    /// Tool results, related queries, follow-up markers and sentinels are
    /// dropped before the window is applied.
    pub fn context_window(&self, window: usize) -> Vec<Message> {
        let relevant: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| {
                m.role != Role::Tool
                    && !matches!(
                        m.kind,
                        Some(MessageKind::Followup | MessageKind::Related | MessageKind::End)
                    )
            })
            .collect();
        let skip = relevant.len().saturating_sub(window);
        relevant.into_iter().skip(skip).cloned().collect()
    }

    /// The last `window` messages with tool results restated as assistant turns.
    ///
    /// Used for the constrained writer pass, which must never see raw
    /// tool-role entries.
    pub fn writer_window(&self, window: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(window);
        self.messages
            .iter()
            .skip(skip)
            .map(|m| {
                if m.role != Role::Tool {
                    return m.clone();
                }
                let mut restated = m.clone();
                restated.role = Role::Assistant;
                restated.kind = Some(MessageKind::Tool);
                restated.content = serde_json::Value::String(m.content.clone()).to_string();
                restated
            })
            .collect()
    }

    /// Chat title: the first message's `input` field, cut to 100 characters.
    pub fn title(&self) -> String {
        self.messages
            .first()
            .and_then(|m| m.content_object())
            .and_then(|obj| obj.get("input").and_then(|v| v.as_str()).map(str::to_owned))
            .filter(|input| !input.is_empty())
            .map(|input| input.chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| UNTITLED_CHAT.to_string())
    }
}

impl Default for TurnLog {
    fn default() -> Self {
        Self::fresh()
    }
}
