//! Turn orchestration for turnwright.
//!
//! A turn runs through a fixed pipeline:
//!
//! 1. **Receive** a submission against a session
//! 2. **Classify**: ask a clarifying question or proceed
//! 3. **Generate**: tool-augmented research, streaming partial text and UI
//! 4. **Finalize**: related queries, then `[response, related, followup]`
//! 5. **Persist** the sealed log for the signed-in user
//!
//! Turns against one session run strictly one after another. Stored logs are
//! turned back into UI state by the [`projector`].

pub mod generator;
pub mod orchestrator;
pub mod projector;
pub mod session;

pub use generator::{AnswerGenerator, GenerationOutcome, TurnScope};
pub use orchestrator::{Agents, TurnHandle, TurnOrchestrator, TurnOutcome};
pub use projector::{UiEntry, View, project, view_mode_for};
pub use session::SessionContext;
