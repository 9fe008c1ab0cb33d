//! Chat store and identity implementations for turnwright.

mod records;

pub mod in_memory;
pub mod file_backend;
pub mod session;

pub use in_memory::InMemoryChatStore;
pub use file_backend::FileChatStore;
pub use session::{AnonymousSession, StaticSession};
