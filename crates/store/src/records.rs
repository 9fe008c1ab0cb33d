//! Record-list operations shared by the store backends.

use turnwright_core::error::StoreError;
use turnwright_core::persistence::{ChatPage, ChatRecord, paginate};

/// Insert `chat`, replacing the caller's own record with the same ID.
///
/// A replaced record keeps its original creation time. A record with the
/// same ID owned by someone else is left alone and the save is refused.
pub(crate) fn upsert(records: &mut Vec<ChatRecord>, mut chat: ChatRecord) -> Result<(), StoreError> {
    match records.iter_mut().find(|r| r.id == chat.id) {
        Some(existing) if existing.user_id != chat.user_id => Err(StoreError::Forbidden(chat.id)),
        Some(existing) => {
            chat.created_at = existing.created_at;
            *existing = chat;
            Ok(())
        }
        None => {
            records.push(chat);
            Ok(())
        }
    }
}

pub(crate) fn page(records: &[ChatRecord], user_id: &str, limit: usize, offset: usize) -> ChatPage {
    let owned = records
        .iter()
        .filter(|r| r.user_id == user_id)
        .map(ChatRecord::summary)
        .collect();
    paginate(owned, limit, offset)
}

pub(crate) fn find(records: &[ChatRecord], user_id: &str, chat_id: &str) -> Option<ChatRecord> {
    records
        .iter()
        .find(|r| r.id == chat_id && r.user_id == user_id)
        .cloned()
}

/// Remove every record owned by `user_id`, returning how many went.
pub(crate) fn remove_user(records: &mut Vec<ChatRecord>, user_id: &str) -> usize {
    let before = records.len();
    records.retain(|r| r.user_id != user_id);
    before - records.len()
}
