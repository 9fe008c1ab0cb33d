//! Structured UI fragments streamed while a turn runs.
//!
//! The orchestrator never renders markup; it emits `{kind, payload}`
//! descriptors and a separate view layer owns presentation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;
use crate::stream::{StreamReader, StreamableValue};

/// What a fragment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Spinner,
    Inquiry,
    Answer,
    Search,
    Retrieve,
    VideoSearch,
    Related,
    Followup,
    MapQuery,
}

/// A single renderable descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiFragment {
    pub kind: FragmentKind,
    #[serde(default)]
    pub payload: Value,
}

impl UiFragment {
    pub fn new(kind: FragmentKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    pub fn spinner() -> Self {
        Self::new(FragmentKind::Spinner, Value::Null)
    }

    pub fn followup() -> Self {
        Self::new(FragmentKind::Followup, serde_json::json!({ "title": "Follow-up" }))
    }
}

/// How the projector filters the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Owner view, everything shown
    #[default]
    Full,
    /// Shared page: related queries and follow-up affordances hidden
    SharedReadOnly,
}

/// The turn's live UI: an ordered list of fragments.
///
/// `update` replaces the trailing fragment (e.g. a spinner giving way to
/// results), `append` adds one, `done` freezes the list.
#[derive(Debug, Default)]
pub struct UiStream {
    cell: StreamableValue<Vec<UiFragment>>,
}

impl UiStream {
    pub fn new() -> Self {
        Self {
            cell: StreamableValue::with_initial(Vec::new()),
        }
    }

    pub fn update(&self, fragment: UiFragment) -> Result<(), StreamError> {
        self.cell.update_with(|current| {
            let list = current.get_or_insert_with(Vec::new);
            list.pop();
            list.push(fragment);
        })
    }

    pub fn append(&self, fragment: UiFragment) -> Result<(), StreamError> {
        self.cell
            .update_with(|current| current.get_or_insert_with(Vec::new).push(fragment))
    }

    pub fn done(&self) -> Result<(), StreamError> {
        self.cell.close()
    }

    pub fn is_done(&self) -> bool {
        self.cell.is_done()
    }

    pub fn fragments(&self) -> Vec<UiFragment> {
        self.cell.current().unwrap_or_default()
    }

    pub fn reader(&self) -> StreamReader<Vec<UiFragment>> {
        self.cell.reader()
    }
}
