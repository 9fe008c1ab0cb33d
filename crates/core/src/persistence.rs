//! Persistence and identity contracts.
//!
//! A finalized turn is handed to a [`PersistenceGateway`]; browsing stored
//! chats goes through [`ChatHistory`]. Implementations live in the store crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::log::TurnLog;
use crate::message::Message;

/// Page size used when the caller gives none or an invalid one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// A stored chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub path: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    /// Snapshot a log for saving under `user_id`.
    pub fn from_log(log: &TurnLog, user_id: &str) -> Self {
        Self {
            id: log.session_id.clone(),
            user_id: user_id.to_string(),
            title: log.title(),
            path: format!("/search/{}", log.session_id),
            messages: log.messages().to_vec(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild the live log for this chat.
    pub fn into_log(self) -> TurnLog {
        TurnLog::restore(self.id, self.messages)
    }

    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            path: self.path.clone(),
            created_at: self.created_at,
            message_count: self.messages.len(),
        }
    }
}

/// A chat as shown in a history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

/// One page of a user's history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPage {
    pub chats: Vec<ChatSummary>,
    pub next_offset: Option<usize>,
}

/// Clamp a requested page limit into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_page_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(l) if (1..=MAX_PAGE_LIMIT).contains(&l) => l,
        _ => DEFAULT_PAGE_LIMIT,
    }
}

/// Slice a newest-first list of summaries into a page.
pub fn paginate(mut all: Vec<ChatSummary>, limit: usize, offset: usize) -> ChatPage {
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = all.len();
    let chats: Vec<ChatSummary> = all.into_iter().skip(offset).take(limit).collect();
    let end = offset + chats.len();
    ChatPage {
        next_offset: (end < total).then_some(end),
        chats,
    }
}

/// Where finalized turns are saved.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    fn name(&self) -> &str;

    /// Insert or replace a chat.
    async fn save(&self, chat: ChatRecord) -> Result<(), StoreError>;
}

/// Read side of stored chats.
#[async_trait]
pub trait ChatHistory: Send + Sync {
    async fn chats_page(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ChatPage, StoreError>;

    async fn get_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<ChatRecord>, StoreError>;

    /// Delete every chat of the user, returning how many were removed.
    async fn clear_history(&self, user_id: &str) -> Result<usize, StoreError>;
}

/// Resolves the authenticated user, if any.
pub trait SessionProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}
