//! `turnwright history` — Stored chat commands.

use turnwright_agent::{project, view_mode_for};
use turnwright_core::persistence::clamp_page_limit;
use turnwright_core::Result;

use super::{find_chat, load_config, open_store, print_entries, require_user};

pub async fn list(limit: Option<usize>, offset: usize) -> Result<()> {
    let config = load_config()?;
    let user_id = require_user(&config)?;
    let store = open_store(&config);

    let page = store
        .chats_page(&user_id, clamp_page_limit(limit), offset)
        .await?;

    if page.chats.is_empty() {
        println!("No chats yet.");
        return Ok(());
    }

    for chat in &page.chats {
        println!(
            "{}  {}  {} ({} messages)",
            chat.created_at.format("%Y-%m-%d %H:%M"),
            chat.id,
            chat.title,
            chat.message_count
        );
    }
    if let Some(next) = page.next_offset {
        println!();
        println!("More: turnwright history list --offset {next}");
    }
    Ok(())
}

pub async fn show(chat_id: &str, shared: bool) -> Result<()> {
    let config = load_config()?;
    let user_id = require_user(&config)?;
    let store = open_store(&config);

    let chat = find_chat(store.as_ref(), &user_id, chat_id).await?;

    println!("📜 {} ({})", chat.title, chat.path);
    println!();

    let mut log = chat.into_log();
    log.is_share_page = shared;
    print_entries(&project(&log, view_mode_for(&log, config.view.mode)));
    Ok(())
}

pub async fn clear() -> Result<()> {
    let config = load_config()?;
    let user_id = require_user(&config)?;
    let store = open_store(&config);

    let removed = store.clear_history(&user_id).await?;
    println!("🗑️  Removed {removed} chat(s)");
    Ok(())
}
