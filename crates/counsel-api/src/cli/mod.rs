//! CLI command definitions and dispatch for the `counsel` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod advisor;
pub mod analyze;
pub mod chat;
pub mod conversation;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

/// Put a question to your board of advisors.
#[derive(Parser)]
#[command(name = "counsel", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "COUNSEL_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the advisors on the board.
    Advisors,

    /// Show one advisor's profile.
    Advisor {
        /// Advisor id (e.g. warren_buffett).
        id: String,
    },

    /// Start a new conversation with every advisor.
    New {
        /// Conversation title.
        #[arg(long)]
        title: Option<String>,

        /// Owner id (defaults to the configured owner).
        #[arg(long)]
        owner: Option<String>,
    },

    /// List conversations, most recently active first.
    #[command(alias = "ls")]
    Conversations {
        /// Owner id (defaults to the configured owner).
        #[arg(long)]
        owner: Option<String>,
    },

    /// Delete a conversation with its messages and memory.
    #[command(alias = "rm")]
    Delete {
        /// Conversation id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Send one message and print every advisor's reply.
    Send {
        /// Conversation id.
        id: String,

        /// Message text.
        text: String,
    },

    /// Show a conversation's message history.
    History {
        /// Conversation id.
        id: String,
    },

    /// Show what each advisor remembers of a conversation.
    Memory {
        /// Conversation id.
        id: String,
    },

    /// Start an interactive chat with the board.
    Chat {
        /// Resume an existing conversation (starts a new one if omitted).
        id: Option<String>,
    },

    /// Ask every advisor for a take on a stock symbol.
    Analyze {
        /// Ticker symbol (e.g. AAPL).
        symbol: String,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse a conversation id argument.
pub(crate) fn parse_conversation_id(raw: &str) -> Result<Uuid> {
    raw.trim()
        .parse::<Uuid>()
        .with_context(|| format!("'{raw}' is not a valid conversation id"))
}

/// Steady-ticking spinner, hidden when output is machine-readable or quiet.
pub(crate) fn spinner(message: &str, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    Ok(spinner)
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub(crate) fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let diff = chrono::Utc::now() - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
