//! Turn lifecycle events — decoupled observation of the orchestrator.
//!
//! Events are published as a turn moves through classification, generation
//! and commit. Observers subscribe without coupling to the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::agent::NextStep;

/// All turn lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A turn began running for a session
    TurnStarted {
        session_id: String,
        turn_id: String,
        skipped_input: bool,
        timestamp: DateTime<Utc>,
    },

    /// The branch was decided
    BranchChosen {
        turn_id: String,
        next: NextStep,
        forced: bool,
        timestamp: DateTime<Utc>,
    },

    /// A tool result landed in the log
    ToolResultAppended {
        turn_id: String,
        tool_name: String,
        timestamp: DateTime<Utc>,
    },

    /// The finalize batch was committed
    TurnFinalized {
        turn_id: String,
        answer_chars: usize,
        related_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The turn ended without finalizing
    TurnFailed {
        turn_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The chat was handed to the persistence gateway
    ChatSaved {
        session_id: String,
        message_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The save was skipped or failed
    SaveSkipped {
        session_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl TurnEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TurnStarted { .. } => "turn_started",
            Self::BranchChosen { .. } => "branch_chosen",
            Self::ToolResultAppended { .. } => "tool_result_appended",
            Self::TurnFinalized { .. } => "turn_finalized",
            Self::TurnFailed { .. } => "turn_failed",
            Self::ChatSaved { .. } => "chat_saved",
            Self::SaveSkipped { .. } => "save_skipped",
        }
    }
}

/// A broadcast-based event bus for turn events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<TurnEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: TurnEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<TurnEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
