//! End-to-end turn scenarios driven by scripted collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use async_trait::async_trait;
use turnwright_agent::{Agents, SessionContext, TurnOrchestrator, TurnOutcome, View, project};
use turnwright_config::GenerationConfig;
use turnwright_core::agent::{
    Classification, Inquiry, InquiryAgent, QuerySuggestor, ResearchAgent, ResearchOutput,
    ResearchRequest, TaskClassifier, WriterAgent, WriterRequest,
};
use turnwright_core::error::AgentError;
use turnwright_core::message::RelatedQuery;
use turnwright_core::{
    ChatHistory, FragmentKind, GenerationMode, Message, MessageKind, NextStep, RelatedQueries,
    Role, SessionProvider, Submission, ToolInvocationResult, TurnEvent, TurnLog, ViewMode,
};
use turnwright_store::{AnonymousSession, InMemoryChatStore, StaticSession};

// --- Scripted collaborators ---

struct ScriptedClassifier {
    next: Option<NextStep>,
    calls: Mutex<usize>,
}

impl ScriptedClassifier {
    fn new(next: Option<NextStep>) -> Arc<Self> {
        Arc::new(Self {
            next,
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TaskClassifier for ScriptedClassifier {
    async fn classify(&self, _messages: &[Message]) -> Result<Option<Classification>, AgentError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.next.map(|next| Classification { next }))
    }
}

struct FixedInquiry(&'static str);

#[async_trait]
impl InquiryAgent for FixedInquiry {
    async fn inquire(
        &self,
        ui: &turnwright_core::UiStream,
        _messages: &[Message],
    ) -> Result<Inquiry, AgentError> {
        ui.append(turnwright_core::UiFragment::new(
            FragmentKind::Inquiry,
            serde_json::json!({ "question": self.0 }),
        ))
        .unwrap();
        Ok(Inquiry {
            question: self.0.to_string(),
        })
    }
}

/// Returns scripted outputs in order, repeating the last one, and records
/// every context it was given.
struct ScriptedResearcher {
    outputs: Vec<ResearchOutput>,
    delay: Duration,
    gate: Option<Arc<Notify>>,
    contexts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedResearcher {
    fn new(outputs: Vec<ResearchOutput>) -> Arc<Self> {
        Self::slow(outputs, Duration::ZERO)
    }

    fn slow(outputs: Vec<ResearchOutput>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outputs,
            delay,
            gate: None,
            contexts: Mutex::new(Vec::new()),
        })
    }

    /// Streams the first word of each answer, then holds until `gate` is notified.
    fn gated(outputs: Vec<ResearchOutput>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            outputs,
            delay: Duration::ZERO,
            gate: Some(gate),
            contexts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    fn last_context(&self) -> Vec<Message> {
        self.contexts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ResearchAgent for ScriptedResearcher {
    async fn research(&self, request: ResearchRequest<'_>) -> Result<ResearchOutput, AgentError> {
        let index = {
            let mut contexts = self.contexts.lock().unwrap();
            contexts.push(request.messages.to_vec());
            (contexts.len() - 1).min(self.outputs.len() - 1)
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let output = self.outputs[index].clone();
        if let Some(gate) = &self.gate {
            if let Some(word) = output.full_response.split_inclusive(' ').next() {
                request.text.write(word.to_string()).unwrap();
            }
            gate.notified().await;
        }
        if !output.full_response.is_empty() {
            request.text.write(output.full_response.clone()).unwrap();
        }
        Ok(output)
    }
}

struct FixedWriter(&'static str);

#[async_trait]
impl WriterAgent for FixedWriter {
    async fn write(&self, request: WriterRequest<'_>) -> Result<String, AgentError> {
        assert!(request.messages.iter().all(|m| m.role != Role::Tool));
        Ok(self.0.to_string())
    }
}

struct FixedSuggestor(Vec<&'static str>);

#[async_trait]
impl QuerySuggestor for FixedSuggestor {
    async fn suggest(&self, _messages: &[Message]) -> Result<RelatedQueries, AgentError> {
        Ok(RelatedQueries {
            items: self
                .0
                .iter()
                .map(|q| RelatedQuery {
                    query: q.to_string(),
                })
                .collect(),
        })
    }
}

// --- Fixtures ---

fn answer(text: &str) -> ResearchOutput {
    ResearchOutput {
        full_response: text.into(),
        ..ResearchOutput::default()
    }
}

fn failing() -> ResearchOutput {
    ResearchOutput {
        has_error: true,
        tool_responses: vec![ToolInvocationResult::new(
            "search",
            serde_json::json!({ "results": [] }),
        )],
        ..ResearchOutput::default()
    }
}

fn config(mode: GenerationMode) -> GenerationConfig {
    GenerationConfig {
        mode,
        settle_ms: 0,
        max_research_attempts: 4,
        ..GenerationConfig::default()
    }
}

struct Harness {
    orchestrator: TurnOrchestrator,
    store: InMemoryChatStore,
    classifier: Arc<ScriptedClassifier>,
    researcher: Arc<ScriptedResearcher>,
}

fn harness_with(
    classifier: Arc<ScriptedClassifier>,
    researcher: Arc<ScriptedResearcher>,
    identity: Arc<dyn SessionProvider>,
    config: GenerationConfig,
) -> Harness {
    let store = InMemoryChatStore::new();
    let agents = Agents {
        classifier: classifier.clone(),
        inquiry: Arc::new(FixedInquiry("Which city do you mean?")),
        researcher: researcher.clone(),
        writer: Arc::new(FixedWriter("Written from tool results.")),
        suggestor: Arc::new(FixedSuggestor(vec!["weather in Lyon"])),
    };
    let orchestrator = TurnOrchestrator::new(
        agents,
        Arc::new(store.clone()),
        identity,
        config,
        "You are a research assistant.",
    );
    Harness {
        orchestrator,
        store,
        classifier,
        researcher,
    }
}

fn harness(next: Option<NextStep>, researcher: Arc<ScriptedResearcher>) -> Harness {
    harness_with(
        ScriptedClassifier::new(next),
        researcher,
        Arc::new(StaticSession::new(Some("alice".into()))),
        config(GenerationMode::General),
    )
}

fn kinds(log: &TurnLog) -> Vec<(Role, Option<MessageKind>)> {
    log.messages().iter().map(|m| (m.role, m.kind)).collect()
}

fn count_kind(log: &TurnLog, kind: MessageKind) -> usize {
    log.messages().iter().filter(|m| m.is_kind(kind)).count()
}

// --- Scenarios ---

#[tokio::test]
async fn paris_turn_finalizes_projects_and_saves() {
    let h = harness(
        Some(NextStep::Proceed),
        ScriptedResearcher::new(vec![answer("It's sunny in Paris.")]),
    );
    let session = SessionContext::new(TurnLog::new("chat-paris"));

    let handle = h
        .orchestrator
        .submit(&session, Submission::Text("weather in Paris".into()));
    let mut is_generating = handle.is_generating.clone();
    let mut is_collapsed = handle.is_collapsed.clone();
    let mut ui = handle.ui.clone();

    let outcome = handle.outcome().await;
    assert_eq!(
        outcome,
        TurnOutcome::Finalized {
            answer: "It's sunny in Paris.".into(),
            persisted: true,
        }
    );

    let log = session.snapshot().await;
    assert_eq!(
        kinds(&log),
        vec![
            (Role::User, Some(MessageKind::Input)),
            (Role::Assistant, Some(MessageKind::Response)),
            (Role::Assistant, Some(MessageKind::Related)),
            (Role::Assistant, Some(MessageKind::Followup)),
            (Role::Assistant, Some(MessageKind::End)),
        ]
    );
    let messages = log.messages();
    assert_eq!(messages[1].content, "It's sunny in Paris.");
    assert_eq!(messages[2].content, r#"{"items":[{"query":"weather in Lyon"}]}"#);
    assert_eq!(messages[3].content, "followup");

    let views: Vec<_> = project(&log, ViewMode::Full)
        .into_iter()
        .map(|e| e.view)
        .collect();
    assert_eq!(views.len(), 4);
    assert!(matches!(&views[0], View::UserMessage { message, .. } if message == "weather in Paris"));
    match &views[1] {
        View::Response { answer } => {
            assert_eq!(answer.current().as_deref(), Some("It's sunny in Paris."))
        }
        other => panic!("unexpected view {other:?}"),
    }
    assert!(matches!(views[2], View::Related { .. }));
    assert!(matches!(views[3], View::Followup));

    let saved = h.store.get_chat("alice", "chat-paris").await.unwrap().unwrap();
    assert_eq!(saved.title, "weather in Paris");
    assert_eq!(saved.path, "/search/chat-paris");
    assert_eq!(saved.messages.len(), 5);

    assert_eq!(is_generating.settled().await, Some(false));
    assert_eq!(is_collapsed.settled().await, Some(true));
    let fragments = ui.settled().await.unwrap();
    let fragment_kinds: Vec<_> = fragments.iter().map(|f| f.kind).collect();
    assert_eq!(
        fragment_kinds,
        vec![FragmentKind::Spinner, FragmentKind::Related, FragmentKind::Followup]
    );
}

#[tokio::test]
async fn title_is_cut_to_one_hundred_characters() {
    let h = harness(Some(NextStep::Proceed), ScriptedResearcher::new(vec![answer("ok")]));
    let session = SessionContext::new(TurnLog::new("chat-long"));
    let long = "é".repeat(150);

    h.orchestrator
        .submit(&session, Submission::Text(long))
        .outcome()
        .await;

    let saved = h.store.get_chat("alice", "chat-long").await.unwrap().unwrap();
    assert_eq!(saved.title.chars().count(), 100);
}

#[tokio::test]
async fn inquire_appends_one_question_and_stops() {
    let h = harness(Some(NextStep::Inquire), ScriptedResearcher::new(vec![answer("unused")]));
    let session = SessionContext::new(TurnLog::new("chat-inquire"));

    let handle = h
        .orchestrator
        .submit(&session, Submission::Text("weather".into()));
    let mut is_collapsed = handle.is_collapsed.clone();
    let mut is_generating = handle.is_generating.clone();
    let mut ui = handle.ui.clone();

    let outcome = handle.outcome().await;
    assert_eq!(
        outcome,
        TurnOutcome::Inquired {
            question: "Which city do you mean?".into()
        }
    );

    let log = session.snapshot().await;
    assert_eq!(
        kinds(&log),
        vec![
            (Role::User, Some(MessageKind::Input)),
            (Role::Assistant, Some(MessageKind::Inquiry)),
        ]
    );
    assert!(!log.is_persist_eligible());
    assert_eq!(h.researcher.calls(), 0);
    assert_eq!(h.store.count().await, 0);

    assert_eq!(is_collapsed.settled().await, Some(false));
    assert_eq!(is_generating.settled().await, Some(false));
    let fragments = ui.settled().await.unwrap();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].kind, FragmentKind::Inquiry);
}

#[tokio::test]
async fn skip_bypasses_classifier_and_sends_directive() {
    let h = harness(Some(NextStep::Inquire), ScriptedResearcher::new(vec![answer("resumed")]));
    let mut log = TurnLog::new("chat-skip");
    log.append(Submission::Text("weather".into()).to_message("g0").unwrap());
    log.append(Message::assistant(MessageKind::Inquiry, "Which city?", "g0"));
    let session = SessionContext::new(log);

    let outcome = h.orchestrator.submit(&session, Submission::Skip).outcome().await;
    assert!(matches!(outcome, TurnOutcome::Finalized { .. }));
    assert_eq!(h.classifier.calls(), 0);

    let context = h.researcher.last_context();
    let directive = context.last().unwrap();
    assert_eq!(directive.role, Role::User);
    assert!(directive.kind.is_none());
    assert_eq!(directive.content_object().unwrap()["action"], "skip");

    // No user message was logged for the skipped turn.
    let log = session.snapshot().await;
    assert_eq!(
        log.messages().iter().filter(|m| m.role == Role::User).count(),
        1
    );
    assert!(log.messages().iter().all(|m| m.kind.is_some()));
}

#[tokio::test]
async fn indeterminate_classification_proceeds() {
    let h = harness(None, ScriptedResearcher::new(vec![answer("fine")]));
    let session = SessionContext::new(TurnLog::new("chat-none"));

    let outcome = h
        .orchestrator
        .submit(&session, Submission::Text("anything".into()))
        .outcome()
        .await;

    assert!(matches!(outcome, TurnOutcome::Finalized { .. }));
    assert_eq!(h.classifier.calls(), 1);
}

#[tokio::test]
async fn failing_generation_never_finalizes_or_saves() {
    let h = harness(Some(NextStep::Proceed), ScriptedResearcher::new(vec![failing()]));
    let session = SessionContext::new(TurnLog::new("chat-error"));
    let mut events = h.orchestrator.event_bus().subscribe();

    let handle = h
        .orchestrator
        .submit(&session, Submission::Text("weather".into()));
    let mut is_generating = handle.is_generating.clone();
    let outcome = handle.outcome().await;

    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert_eq!(is_generating.settled().await, Some(false));

    let log = session.snapshot().await;
    // Tool results produced before the error stay in the log.
    assert_eq!(
        kinds(&log),
        vec![
            (Role::User, Some(MessageKind::Input)),
            (Role::Tool, Some(MessageKind::Tool)),
        ]
    );
    assert!(!log.is_persist_eligible());
    assert_eq!(count_kind(&log, MessageKind::End), 0);
    assert_eq!(h.store.count().await, 0);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type());
    }
    assert_eq!(
        seen,
        vec!["turn_started", "branch_chosen", "tool_result_appended", "turn_failed"]
    );
}

#[tokio::test]
async fn exhausted_attempts_fail_the_turn() {
    let h = harness(
        Some(NextStep::Proceed),
        ScriptedResearcher::new(vec![ResearchOutput::default()]),
    );
    let session = SessionContext::new(TurnLog::new("chat-empty"));

    let outcome = h
        .orchestrator
        .submit(&session, Submission::Text("weather".into()))
        .outcome()
        .await;

    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert_eq!(h.researcher.calls(), 4);
    assert_eq!(h.store.count().await, 0);
}

#[tokio::test]
async fn specific_mode_falls_back_to_writer() {
    let tool_only = ResearchOutput {
        tool_responses: vec![ToolInvocationResult::new(
            "retrieve",
            serde_json::json!({ "url": "https://example.org" }),
        )],
        ..ResearchOutput::default()
    };
    let h = harness_with(
        ScriptedClassifier::new(Some(NextStep::Proceed)),
        ScriptedResearcher::new(vec![tool_only]),
        Arc::new(StaticSession::new(Some("alice".into()))),
        config(GenerationMode::Specific),
    );
    let session = SessionContext::new(TurnLog::new("chat-specific"));

    let outcome = h
        .orchestrator
        .submit(&session, Submission::Text("summarize example.org".into()))
        .outcome()
        .await;

    assert_eq!(
        outcome,
        TurnOutcome::Finalized {
            answer: "Written from tool results.".into(),
            persisted: true,
        }
    );
    assert_eq!(h.researcher.calls(), 1);

    let log = session.snapshot().await;
    assert_eq!(
        kinds(&log),
        vec![
            (Role::User, Some(MessageKind::Input)),
            (Role::Tool, Some(MessageKind::Tool)),
            (Role::Assistant, Some(MessageKind::Response)),
            (Role::Assistant, Some(MessageKind::Related)),
            (Role::Assistant, Some(MessageKind::Followup)),
            (Role::Assistant, Some(MessageKind::End)),
        ]
    );
}

#[tokio::test]
async fn unauthenticated_save_is_skipped_but_sealed() {
    let h = harness_with(
        ScriptedClassifier::new(Some(NextStep::Proceed)),
        ScriptedResearcher::new(vec![answer("sunny")]),
        Arc::new(AnonymousSession),
        config(GenerationMode::General),
    );
    let session = SessionContext::new(TurnLog::new("chat-anon"));
    let mut events = h.orchestrator.event_bus().subscribe();

    let outcome = h
        .orchestrator
        .submit(&session, Submission::Text("weather".into()))
        .outcome()
        .await;

    assert_eq!(
        outcome,
        TurnOutcome::Finalized {
            answer: "sunny".into(),
            persisted: false,
        }
    );
    assert_eq!(h.store.count().await, 0);
    assert_eq!(count_kind(&session.snapshot().await, MessageKind::End), 1);

    let mut skipped = false;
    while let Ok(event) = events.try_recv() {
        if let TurnEvent::SaveSkipped { reason, .. } = event.as_ref() {
            assert_eq!(reason, "unauthenticated");
            skipped = true;
        }
    }
    assert!(skipped);
}

#[tokio::test]
async fn tool_results_precede_finalize_batch() {
    let with_tools = ResearchOutput {
        tool_responses: vec![
            ToolInvocationResult::new("search", serde_json::json!({ "q": 1 })),
            ToolInvocationResult::new("videoSearch", serde_json::json!({ "q": 2 })),
        ],
        ..ResearchOutput::default()
    };
    let h = harness(
        Some(NextStep::Proceed),
        ScriptedResearcher::new(vec![with_tools, answer("done")]),
    );
    let session = SessionContext::new(TurnLog::new("chat-tools"));

    h.orchestrator
        .submit(&session, Submission::Text("weather".into()))
        .outcome()
        .await;

    let log = session.snapshot().await;
    let names: Vec<_> = log
        .messages()
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter_map(|m| m.name.as_deref())
        .collect();
    assert_eq!(names, vec!["search", "videoSearch"]);

    // The second pass saw both tool results.
    let context = h.researcher.last_context();
    assert_eq!(context.iter().filter(|m| m.role == Role::Tool).count(), 2);

    // Eligibility implies the last three non-sentinel entries are the batch.
    let batch: Vec<&Message> = log
        .messages()
        .iter()
        .filter(|m| !m.is_kind(MessageKind::End))
        .rev()
        .take(3)
        .collect();
    let batch_kinds: Vec<_> = batch.iter().rev().map(|m| m.kind).collect();
    assert_eq!(
        batch_kinds,
        vec![
            Some(MessageKind::Response),
            Some(MessageKind::Related),
            Some(MessageKind::Followup),
        ]
    );
    assert!(batch.iter().all(|m| m.group_id == batch[0].group_id));
    assert!(log.messages().iter().all(|m| m.group_id == batch[0].group_id));
}

#[tokio::test]
async fn turns_on_one_session_run_in_submission_order() {
    let h = harness(
        Some(NextStep::Proceed),
        ScriptedResearcher::slow(vec![answer("answer")], Duration::from_millis(30)),
    );
    let session = SessionContext::new(TurnLog::new("chat-serial"));

    let first = h
        .orchestrator
        .submit(&session, Submission::Text("first".into()));
    let second = h
        .orchestrator
        .submit(&session, Submission::RelatedQuery("second".into()));

    first.outcome().await;
    second.outcome().await;

    let log = session.snapshot().await;
    assert_eq!(
        kinds(&log),
        vec![
            (Role::User, Some(MessageKind::Input)),
            (Role::Assistant, Some(MessageKind::Response)),
            (Role::Assistant, Some(MessageKind::Related)),
            (Role::Assistant, Some(MessageKind::Followup)),
            (Role::Assistant, Some(MessageKind::End)),
            (Role::User, Some(MessageKind::InputRelated)),
            (Role::Assistant, Some(MessageKind::Response)),
            (Role::Assistant, Some(MessageKind::Related)),
            (Role::Assistant, Some(MessageKind::Followup)),
            (Role::Assistant, Some(MessageKind::End)),
        ]
    );

    // The second turn's context included the first turn's answer.
    let context = h.researcher.last_context();
    assert!(context.iter().any(|m| m.is_kind(MessageKind::Response)));

    let saved = h.store.get_chat("alice", "chat-serial").await.unwrap().unwrap();
    assert_eq!(saved.messages.len(), 10);
    assert_eq!(saved.title, "first");
    assert_eq!(h.store.count().await, 1);
}

#[tokio::test]
async fn log_grows_until_cleared() {
    let h = harness(Some(NextStep::Proceed), ScriptedResearcher::new(vec![answer("a")]));
    let session = SessionContext::new(TurnLog::new("chat-grow"));

    let mut last = 0;
    for text in ["one", "two", "three"] {
        h.orchestrator
            .submit(&session, Submission::Text(text.into()))
            .outcome()
            .await;
        let len = session.snapshot().await.len();
        assert!(len >= last);
        last = len;
    }
    assert_eq!(count_kind(&session.snapshot().await, MessageKind::End), 3);

    session.clear().await;
    let log = session.snapshot().await;
    assert!(log.is_empty());
    assert_eq!(log.session_id, "chat-grow");
}

#[tokio::test]
async fn restored_chat_projects_identically() {
    let h = harness(Some(NextStep::Proceed), ScriptedResearcher::new(vec![answer("sunny")]));
    let session = SessionContext::new(TurnLog::new("chat-restore"));

    h.orchestrator
        .submit(&session, Submission::Text("weather".into()))
        .outcome()
        .await;

    let saved = h.store.get_chat("alice", "chat-restore").await.unwrap().unwrap();
    let restored = saved.into_log();
    let live = session.snapshot().await;

    assert_eq!(
        project(&restored, ViewMode::Full),
        project(&live, ViewMode::Full)
    );
    assert!(
        project(&restored, ViewMode::SharedReadOnly)
            .iter()
            .all(|e| !matches!(e.view, View::Related { .. } | View::Followup))
    );
}

#[tokio::test]
async fn text_stream_shows_partials_before_the_outcome() {
    let gate = Arc::new(Notify::new());
    let h = harness(
        Some(NextStep::Proceed),
        ScriptedResearcher::gated(vec![answer("It's sunny in Paris.")], gate.clone()),
    );
    let session = SessionContext::new(TurnLog::new("chat-partial"));

    let handle = h
        .orchestrator
        .submit(&session, Submission::Text("weather in Paris".into()));
    let mut text = handle.text.clone();

    let partial = text.next().await.unwrap();
    assert_eq!(partial.value.as_deref(), Some("It's "));
    assert!(!partial.done);
    assert_eq!(count_kind(&session.snapshot().await, MessageKind::Response), 0);

    gate.notify_one();
    assert!(matches!(handle.outcome().await, TurnOutcome::Finalized { .. }));
    assert_eq!(text.settled().await.as_deref(), Some("It's sunny in Paris."));
    assert!(text.is_done());
}

#[tokio::test(start_paused = true)]
async fn finalize_waits_for_the_settle_delay() {
    let settle = GenerationConfig::default().settle();
    assert_eq!(settle, Duration::from_millis(500));

    let h = harness_with(
        ScriptedClassifier::new(Some(NextStep::Proceed)),
        ScriptedResearcher::new(vec![answer("sunny")]),
        Arc::new(StaticSession::new(Some("alice".into()))),
        GenerationConfig::default(),
    );
    let session = SessionContext::new(TurnLog::new("chat-settle"));
    let started = tokio::time::Instant::now();

    let handle = h
        .orchestrator
        .submit(&session, Submission::Text("weather in Paris".into()));
    let mut ui = handle.ui.clone();
    loop {
        let snapshot = ui.next().await.expect("ui closed before the follow-up");
        let fragments = snapshot.value.unwrap_or_default();
        if fragments.iter().any(|f| f.kind == FragmentKind::Followup) {
            break;
        }
    }

    // The follow-up is on screen but the log has not committed yet.
    let held = session.snapshot().await;
    assert_eq!(count_kind(&held, MessageKind::Response), 0);
    assert_eq!(count_kind(&held, MessageKind::Followup), 0);

    tokio::time::advance(settle).await;

    assert!(matches!(handle.outcome().await, TurnOutcome::Finalized { .. }));
    assert!(started.elapsed() >= settle);
    let log = session.snapshot().await;
    assert_eq!(count_kind(&log, MessageKind::Response), 1);
    assert_eq!(count_kind(&log, MessageKind::Related), 1);
    assert_eq!(count_kind(&log, MessageKind::Followup), 1);
}
