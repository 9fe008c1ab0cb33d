//! turnwright CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Run one turn with the offline agents
//! - `history`  — Browse or clear stored chats
//! - `config`   — Show configuration

use clap::{Parser, Subcommand};

mod commands;
mod offline;

#[derive(Parser)]
#[command(
    name = "turnwright",
    about = "turnwright — conversational turn orchestrator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one turn and print the streamed UI and the resulting chat
    Ask {
        /// What to ask
        text: Option<String>,

        /// Proceed without new input, e.g. after a clarifying question
        #[arg(long, conflicts_with = "text")]
        skip: bool,

        /// Continue a stored chat instead of starting a new one
        #[arg(long)]
        chat: Option<String>,
    },

    /// Browse stored chats
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show configuration
    Config {
        /// Print the built-in defaults instead of the effective config
        #[arg(long)]
        defaults: bool,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List chats, newest first
    List {
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },

    /// Replay one chat
    Show {
        id: String,

        /// Render as a shared, read-only page
        #[arg(long)]
        shared: bool,
    },

    /// Delete every stored chat of the current user
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask { text, skip, chat } => commands::ask::run(text, skip, chat).await?,
        Commands::History { action } => match action {
            HistoryAction::List { limit, offset } => commands::history::list(limit, offset).await?,
            HistoryAction::Show { id, shared } => commands::history::show(&id, shared).await?,
            HistoryAction::Clear => commands::history::clear().await?,
        },
        Commands::Config { defaults } => commands::config_cmd::show(defaults).await?,
    }

    Ok(())
}
