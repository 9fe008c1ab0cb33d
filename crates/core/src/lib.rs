//! # turnwright Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! turnwright conversational turn orchestrator. Nothing here talks to a
//! model back end or a database; this crate defines the domain model that
//! the other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (classifier, researcher, writer, persistence,
//! identity) is a trait here. Implementations live elsewhere, so the
//! orchestration core can be driven by scripted stand-ins in tests.

pub mod error;
pub mod message;
pub mod log;
pub mod stream;
pub mod ui;
pub mod agent;
pub mod persistence;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, MessageKind, RelatedQueries, Role, Submission, ToolInvocationResult};
pub use log::TurnLog;
pub use stream::{Snapshot, StreamReader, StreamableValue};
pub use ui::{FragmentKind, UiFragment, UiStream, ViewMode};
pub use agent::{GenerationMode, NextStep};
pub use persistence::{ChatHistory, ChatRecord, PersistenceGateway, SessionProvider};
pub use event::{EventBus, TurnEvent};
