//! The turn orchestrator.
//!
//! `submit` hands back live stream handles at once and runs the turn on a
//! detached task:
//!
//! 1. Wait for the session's previous turn, then log the user message
//! 2. Trim the context window and classify (skipped for [`Submission::Skip`])
//! 3. **Inquire**: ask a clarifying question and stop
//! 4. **Proceed**: generate, suggest related queries, settle, finalize
//! 5. Persist the log once it holds a response
//!
//! Failures are contained to the turn: the log keeps whatever was appended
//! before the failure and the session stays usable.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use turnwright_config::GenerationConfig;
use turnwright_core::agent::{
    InquiryAgent, QuerySuggestor, ResearchAgent, TaskClassifier, WriterAgent,
};
use turnwright_core::{
    ChatRecord, EventBus, FragmentKind, Message, MessageKind, NextStep, PersistenceGateway,
    RelatedQueries, SessionProvider, StreamReader, StreamableValue, Submission, TurnEvent,
    UiFragment, UiStream,
};
use uuid::Uuid;

use crate::generator::{AnswerGenerator, TurnScope};
use crate::session::SessionContext;

/// The model-backed collaborators a turn calls out to.
#[derive(Clone)]
pub struct Agents {
    pub classifier: Arc<dyn TaskClassifier>,
    pub inquiry: Arc<dyn InquiryAgent>,
    pub researcher: Arc<dyn ResearchAgent>,
    pub writer: Arc<dyn WriterAgent>,
    pub suggestor: Arc<dyn QuerySuggestor>,
}

/// Live handles for one submitted turn.
pub struct TurnHandle {
    pub turn_id: String,
    pub ui: StreamReader<Vec<UiFragment>>,
    /// The answer text as it is generated; closes without a value on failure
    pub text: StreamReader<String>,
    pub is_generating: StreamReader<bool>,
    pub is_collapsed: StreamReader<bool>,
    task: JoinHandle<TurnOutcome>,
}

impl TurnHandle {
    /// Wait for the turn's task to finish.
    pub async fn outcome(self) -> TurnOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => TurnOutcome::Failed {
                reason: format!("turn task aborted: {e}"),
            },
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A clarifying question was asked
    Inquired { question: String },
    /// The finalize batch was appended
    Finalized { answer: String, persisted: bool },
    /// Generation failed; nothing was finalized
    Failed { reason: String },
}

/// Writer halves owned by the turn task.
struct TurnStreams {
    ui: UiStream,
    text: StreamableValue<String>,
    is_generating: StreamableValue<bool>,
    is_collapsed: StreamableValue<bool>,
}

#[derive(Clone)]
pub struct TurnOrchestrator {
    classifier: Arc<dyn TaskClassifier>,
    inquiry: Arc<dyn InquiryAgent>,
    suggestor: Arc<dyn QuerySuggestor>,
    generator: AnswerGenerator,
    gateway: Arc<dyn PersistenceGateway>,
    identity: Arc<dyn SessionProvider>,
    event_bus: Arc<EventBus>,
    config: GenerationConfig,
}

impl TurnOrchestrator {
    pub fn new(
        agents: Agents,
        gateway: Arc<dyn PersistenceGateway>,
        identity: Arc<dyn SessionProvider>,
        config: GenerationConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        let generator =
            AnswerGenerator::new(agents.researcher, agents.writer, config.clone(), system_prompt);
        Self {
            classifier: agents.classifier,
            inquiry: agents.inquiry,
            suggestor: agents.suggestor,
            generator,
            gateway,
            identity,
            event_bus: Arc::new(EventBus::default()),
            config,
        }
    }

    /// Publish lifecycle events on a shared bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Start a turn. Returns immediately; the work runs on its own task.
    pub fn submit(&self, session: &SessionContext, submission: Submission) -> TurnHandle {
        let turn_id = Uuid::new_v4().to_string();
        let streams = TurnStreams {
            ui: UiStream::new(),
            text: StreamableValue::new(),
            is_generating: StreamableValue::with_initial(true),
            is_collapsed: StreamableValue::with_initial(false),
        };
        let ui = streams.ui.reader();
        let text = streams.text.reader();
        let is_generating = streams.is_generating.reader();
        let is_collapsed = streams.is_collapsed.reader();

        let ticket = session.enqueue();
        let this = self.clone();
        let session = session.clone();
        let id = turn_id.clone();
        let task = tokio::spawn(async move {
            let _permit = ticket.acquire().await;
            this.run_turn(&session, &id, submission, streams).await
        });

        TurnHandle {
            turn_id,
            ui,
            text,
            is_generating,
            is_collapsed,
            task,
        }
    }

    async fn run_turn(
        &self,
        session: &SessionContext,
        turn_id: &str,
        submission: Submission,
        streams: TurnStreams,
    ) -> TurnOutcome {
        let group_id = Uuid::new_v4().to_string();
        let skipped = submission.is_skip();

        info!(session_id = %session.session_id(), turn_id, skipped, "Turn started");
        self.event_bus.publish(TurnEvent::TurnStarted {
            session_id: session.session_id().to_string(),
            turn_id: turn_id.to_string(),
            skipped_input: skipped,
            timestamp: Utc::now(),
        });

        let mut context = {
            let mut log = session.log().write().await;
            if let Some(message) = submission.to_message(&group_id) {
                log.append(message);
            }
            log.context_window(self.config.window())
        };
        if skipped {
            context.push(Submission::skip_directive(&group_id));
        }

        let next = if skipped {
            NextStep::Proceed
        } else {
            self.classify(turn_id, &context).await
        };
        self.event_bus.publish(TurnEvent::BranchChosen {
            turn_id: turn_id.to_string(),
            next,
            forced: skipped,
            timestamp: Utc::now(),
        });

        let outcome = match next {
            NextStep::Inquire => {
                self.inquire(session, turn_id, &group_id, &context, &streams)
                    .await
            }
            NextStep::Proceed => {
                self.proceed(session, turn_id, &group_id, context, &streams)
                    .await
            }
        };

        if let TurnOutcome::Failed { reason } = &outcome {
            self.event_bus.publish(TurnEvent::TurnFailed {
                turn_id: turn_id.to_string(),
                reason: reason.clone(),
                timestamp: Utc::now(),
            });
        }

        finish(turn_id, &streams);
        outcome
    }

    /// An indeterminate classification never blocks the turn.
    async fn classify(&self, turn_id: &str, context: &[Message]) -> NextStep {
        match self.classifier.classify(context).await {
            Ok(Some(classification)) => classification.next,
            Ok(None) => {
                warn!(turn_id, "Classifier returned no result, proceeding");
                NextStep::Proceed
            }
            Err(e) => {
                warn!(turn_id, error = %e, "Classifier failed, proceeding");
                NextStep::Proceed
            }
        }
    }

    async fn inquire(
        &self,
        session: &SessionContext,
        turn_id: &str,
        group_id: &str,
        context: &[Message],
        streams: &TurnStreams,
    ) -> TurnOutcome {
        match self.inquiry.inquire(&streams.ui, context).await {
            Ok(inquiry) => {
                session.log().write().await.append(Message::assistant(
                    MessageKind::Inquiry,
                    inquiry.question.clone(),
                    group_id,
                ));
                if let Err(e) = streams.is_collapsed.done(false) {
                    debug!(turn_id, error = %e, "Collapse flag already set");
                }
                info!(turn_id, "Clarifying question asked");
                TurnOutcome::Inquired {
                    question: inquiry.question,
                }
            }
            Err(e) => {
                warn!(turn_id, error = %e, "Inquiry agent failed");
                TurnOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn proceed(
        &self,
        session: &SessionContext,
        turn_id: &str,
        group_id: &str,
        context: Vec<Message>,
        streams: &TurnStreams,
    ) -> TurnOutcome {
        if let Err(e) = streams.is_collapsed.done(true) {
            debug!(turn_id, error = %e, "Collapse flag already set");
        }
        if let Err(e) = streams.ui.update(UiFragment::spinner()) {
            debug!(turn_id, error = %e, "UI stream closed early");
        }

        let scope = TurnScope {
            turn_id,
            group_id,
            log: session.log(),
            ui: &streams.ui,
            text: &streams.text,
            events: &self.event_bus,
        };
        let outcome = self.generator.generate(&scope, context.clone()).await;

        if !outcome.is_success() {
            let reason = if outcome.has_error {
                "generation reported an error"
            } else {
                "generation produced no answer"
            };
            warn!(turn_id, reason, "Turn not finalized");
            return TurnOutcome::Failed {
                reason: reason.to_string(),
            };
        }

        let related = match self.suggestor.suggest(&context).await {
            Ok(related) => related,
            Err(e) => {
                warn!(turn_id, error = %e, "Query suggestor failed, finalizing without related queries");
                RelatedQueries::default()
            }
        };

        let fragments = [
            UiFragment::new(
                FragmentKind::Related,
                serde_json::to_value(&related).unwrap_or_default(),
            ),
            UiFragment::followup(),
        ];
        for fragment in fragments {
            if let Err(e) = streams.ui.append(fragment) {
                debug!(turn_id, error = %e, "UI stream closed early");
            }
        }

        // Let observers drain the UI stream before the log commits.
        tokio::time::sleep(self.config.settle()).await;

        session
            .log()
            .write()
            .await
            .append_finalize(group_id, &outcome.full_response, &related);
        info!(
            turn_id,
            group_id,
            answer_chars = outcome.full_response.chars().count(),
            "Turn finalized"
        );
        self.event_bus.publish(TurnEvent::TurnFinalized {
            turn_id: turn_id.to_string(),
            answer_chars: outcome.full_response.chars().count(),
            related_count: related.items.len(),
            timestamp: Utc::now(),
        });

        let persisted = self.persist(session, group_id).await;
        TurnOutcome::Finalized {
            answer: outcome.full_response,
            persisted,
        }
    }

    /// Seal an eligible log and hand it to the gateway.
    async fn persist(&self, session: &SessionContext, group_id: &str) -> bool {
        let sealed = {
            let mut log = session.log().write().await;
            if !log.is_persist_eligible() {
                return false;
            }
            log.seal(group_id);
            log.clone()
        };

        let session_id = sealed.session_id.clone();
        let Some(user_id) = self.identity.current_user_id() else {
            error!(session_id = %session_id, "No authenticated user, chat not saved");
            self.event_bus.publish(TurnEvent::SaveSkipped {
                session_id,
                reason: "unauthenticated".into(),
                timestamp: Utc::now(),
            });
            return false;
        };

        let record = ChatRecord::from_log(&sealed, &user_id);
        let message_count = record.messages.len();
        match self.gateway.save(record).await {
            Ok(()) => {
                debug!(
                    session_id = %session_id,
                    gateway = self.gateway.name(),
                    message_count,
                    "Chat saved"
                );
                self.event_bus.publish(TurnEvent::ChatSaved {
                    session_id,
                    message_count,
                    timestamp: Utc::now(),
                });
                true
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to save chat");
                self.event_bus.publish(TurnEvent::SaveSkipped {
                    session_id,
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                false
            }
        }
    }
}

/// Resolve every caller-visible handle of a turn.
fn finish(turn_id: &str, streams: &TurnStreams) {
    let results = [
        ("is_collapsed", streams.is_collapsed.close()),
        ("text", streams.text.close()),
        ("is_generating", streams.is_generating.done(false)),
        ("ui", streams.ui.done()),
    ];
    for (stream, result) in results {
        if let Err(e) = result {
            debug!(turn_id, stream, error = %e, "Stream already final");
        }
    }
}
