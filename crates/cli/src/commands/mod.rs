pub mod ask;
pub mod config_cmd;
pub mod history;

use std::sync::Arc;

use tracing::debug;
use turnwright_agent::{UiEntry, View};
use turnwright_config::AppConfig;
use turnwright_core::error::StoreError;
use turnwright_core::{ChatHistory, ChatRecord, Error, PersistenceGateway, Result};
use turnwright_store::{FileChatStore, InMemoryChatStore};

/// A store that both saves turns and serves history.
pub trait ChatStore: PersistenceGateway + ChatHistory {}

impl<T: PersistenceGateway + ChatHistory> ChatStore for T {}

/// Load the effective configuration.
pub fn load_config() -> Result<AppConfig> {
    AppConfig::load().map_err(Error::config)
}

/// Open the store selected by `store.backend`.
pub fn open_store(config: &AppConfig) -> Arc<dyn ChatStore> {
    debug!(backend = %config.store.backend, "Opening chat store");
    match config.store.backend.as_str() {
        "memory" => Arc::new(InMemoryChatStore::new()),
        _ => Arc::new(FileChatStore::open(&config.store.resolved_path())),
    }
}

/// The configured user, required for anything touching history.
pub fn require_user(config: &AppConfig) -> std::result::Result<String, StoreError> {
    config
        .session
        .user_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or(StoreError::Unauthorized)
}

/// Fetch one of the user's chats, failing if it does not exist.
pub async fn find_chat(store: &dyn ChatStore, user_id: &str, chat_id: &str) -> Result<ChatRecord> {
    store
        .get_chat(user_id, chat_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(chat_id.to_string()).into())
}

pub fn print_entries(entries: &[UiEntry]) {
    for entry in entries {
        match &entry.view {
            View::UserMessage {
                message,
                show_share,
                ..
            } => {
                let share = if *show_share { "  [share]" } else { "" };
                println!("🧑 {message}{share}");
            }
            View::Inquiry { content } => println!("❓ {content}"),
            View::Response { answer } => {
                println!("🤖 {}", answer.current().unwrap_or_default());
            }
            View::Related { queries } => {
                println!("   Related:");
                for item in queries.current().unwrap_or_default().items {
                    println!("   → {}", item.query);
                }
            }
            View::Followup => println!("   (follow-up)"),
            View::MapQuery { tool_output } => println!("🗺️  map query: {tool_output}"),
            View::Search { result } => {
                println!("🔎 search: {}", result.current().unwrap_or_default());
            }
            View::Retrieve { data } => println!("📄 retrieve: {data}"),
            View::VideoSearch { result } => {
                println!("🎬 video search: {}", result.current().unwrap_or_default());
            }
        }
    }
}
