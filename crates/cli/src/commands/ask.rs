//! `turnwright ask` — Run a turn through the orchestrator.
//!
//! When the classifier asks a clarifying question, the answer is read from
//! stdin and submitted as the next turn of the same chat. An empty answer
//! skips the question.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use turnwright_agent::{SessionContext, TurnOrchestrator, TurnOutcome, project, view_mode_for};
use turnwright_core::{Error, PersistenceGateway, Result, Submission, TurnLog, UiFragment};
use turnwright_store::StaticSession;

use super::{find_chat, load_config, open_store, print_entries, require_user};
use crate::offline;

pub async fn run(
    text: Option<String>,
    skip: bool,
    chat: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    let mut submission = match (text, skip) {
        (_, true) => Submission::Skip,
        (Some(text), false) if !text.trim().is_empty() => Submission::Text(text),
        _ => {
            return Err(Error::InvalidInput(
                "nothing to ask: pass some text or --skip".into(),
            ));
        }
    };

    let store = open_store(&config);
    let log = match &chat {
        Some(chat_id) => {
            let user_id = require_user(&config)?;
            find_chat(store.as_ref(), &user_id, chat_id)
                .await?
                .into_log()
        }
        None => TurnLog::fresh(),
    };
    let session = SessionContext::new(log);

    let gateway: Arc<dyn PersistenceGateway> = store;
    let orchestrator = TurnOrchestrator::new(
        offline::agents(),
        gateway,
        Arc::new(StaticSession::new(config.session.user_id.clone())),
        config.generation.clone(),
        config.system_prompt(),
    );

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let handle = orchestrator.submit(&session, submission);
        println!("💬 Turn {} in chat {}", handle.turn_id, session.session_id());

        let mut ui = handle.ui.clone();
        let mut shown = 0;
        while let Some(snapshot) = ui.next().await {
            let fragments = snapshot.value.unwrap_or_default();
            for fragment in fragments.iter().skip(shown) {
                print_fragment(fragment);
            }
            shown = shown.max(fragments.len());
        }

        match handle.outcome().await {
            TurnOutcome::Inquired { question } => {
                println!();
                println!("  ❓ {question}");
                print!("  You > ");
                std::io::stdout().flush()?;

                let answer = stdin.next_line().await?.unwrap_or_default();
                submission = if answer.trim().is_empty() {
                    Submission::Skip
                } else {
                    let mut form = serde_json::Map::new();
                    form.insert("answer".into(), serde_json::Value::String(answer));
                    Submission::InquiryAnswer(form)
                };
            }
            TurnOutcome::Finalized { persisted, .. } => {
                println!();
                let log = session.snapshot().await;
                print_entries(&project(&log, view_mode_for(&log, config.view.mode)));
                if !persisted {
                    println!();
                    println!("⚠️  Chat not saved (set session.user_id or TURNWRIGHT_USER_ID)");
                }
                return Ok(());
            }
            TurnOutcome::Failed { reason } => {
                return Err(Error::TurnFailed { reason });
            }
        }
    }
}

fn print_fragment(fragment: &UiFragment) {
    if fragment.payload.is_null() {
        println!("   · {:?}", fragment.kind);
    } else {
        println!("   · {:?} {}", fragment.kind, fragment.payload);
    }
}
