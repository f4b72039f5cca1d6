//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for browsing the
//! conversation, the board, and each advisor's memory.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat.
    Exit,
    /// Start a fresh conversation with the same board.
    New(Option<String>),
    /// Show this conversation's messages.
    History,
    /// Show each advisor's memory window.
    Memory,
    /// List the board.
    Advisors,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), Some(arg.trim().to_string())),
        None => (trimmed.to_lowercase(), None),
    };

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/new" => Some(ChatCommand::New(arg.filter(|title| !title.is_empty()))),
        "/history" => Some(ChatCommand::History),
        "/memory" | "/mem" => Some(ChatCommand::Memory),
        "/advisors" | "/board" => Some(ChatCommand::Advisors),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
        ("/new [title]", "Start a new conversation"),
        ("/history", "Show this conversation's messages"),
        ("/memory", "Show what each advisor remembers"),
        ("/advisors", "List the board"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, help) in rows {
        println!("  {:<14} {}", style(command).cyan(), help);
    }
    println!();
    println!(
        "  {}",
        style("Ctrl+C cancels a running turn, Ctrl+D exits").dim()
    );
    println!();
}
