//! In-memory chat store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use turnwright_core::error::StoreError;
use turnwright_core::persistence::{ChatHistory, ChatPage, ChatRecord, PersistenceGateway};

use crate::records;

/// A chat store that keeps records in a Vec.
#[derive(Clone)]
pub struct InMemoryChatStore {
    chats: Arc<RwLock<Vec<ChatRecord>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            chats: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn count(&self) -> usize {
        self.chats.read().await.len()
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryChatStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, chat: ChatRecord) -> Result<(), StoreError> {
        debug!(chat_id = %chat.id, messages = chat.messages.len(), "Saving chat in memory");
        records::upsert(&mut *self.chats.write().await, chat)
    }
}

#[async_trait]
impl ChatHistory for InMemoryChatStore {
    async fn chats_page(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ChatPage, StoreError> {
        Ok(records::page(&self.chats.read().await, user_id, limit, offset))
    }

    async fn get_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<ChatRecord>, StoreError> {
        Ok(records::find(&self.chats.read().await, user_id, chat_id))
    }

    async fn clear_history(&self, user_id: &str) -> Result<usize, StoreError> {
        Ok(records::remove_user(&mut *self.chats.write().await, user_id))
    }
}
