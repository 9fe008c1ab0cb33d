//! File-based chat store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `ChatRecord`. Records are loaded into memory
//! on creation and the whole file is rewritten on every mutation (save,
//! clear). This gives fast reads with durable writes.
//!
//! Storage location: `~/.turnwright/chats/chats.jsonl`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use turnwright_core::error::StoreError;
use turnwright_core::persistence::{ChatHistory, ChatPage, ChatRecord, PersistenceGateway};

use crate::records;

const FILE_NAME: &str = "chats.jsonl";

/// A file-backed chat store using JSONL (one chat per line).
pub struct FileChatStore {
    path: PathBuf,
    chats: Arc<RwLock<Vec<ChatRecord>>>,
}

impl FileChatStore {
    /// Open the store kept in `dir`.
    ///
    /// If the file exists, chats are loaded from it. Otherwise the store
    /// starts empty and the file is created on first write.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(FILE_NAME);
        let chats = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = chats.len(), "File chat store loaded");
        Self {
            path,
            chats: Arc::new(RwLock::new(chats)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<ChatRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<ChatRecord>(line) {
                Ok(chat) => Some(chat),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted chat record");
                    None
                }
            })
            .collect()
    }

    /// Flush all chats to disk as JSONL.
    async fn flush(&self) -> Result<(), StoreError> {
        let chats = self.chats.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create chat directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for chat in chats.iter() {
            let line = serde_json::to_string(chat).map_err(|e| StoreError::Corrupted {
                chat_id: chat.id.clone(),
                reason: e.to_string(),
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write chat file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for FileChatStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, chat: ChatRecord) -> Result<(), StoreError> {
        debug!(chat_id = %chat.id, messages = chat.messages.len(), "Saving chat to file");
        records::upsert(&mut *self.chats.write().await, chat)?;
        self.flush().await
    }
}

#[async_trait]
impl ChatHistory for FileChatStore {
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
        let removed = records::remove_user(&mut *self.chats.write().await, user_id);
        if removed > 0 {
            self.flush().await?;
        }
        Ok(removed)
    }
}
