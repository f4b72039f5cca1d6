//! Main chat loop orchestration.
//!
//! Resolves or creates the conversation, prints the banner, then runs one
//! board turn per submitted line. While a turn is in flight the input is
//! still polled so Ctrl+C can cancel it.

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use counsel_types::error::TurnError;
use counsel_types::turn::TurnOutcome;

use crate::cli::conversation::{print_message, print_outcome, show_memory};
use crate::cli::{parse_conversation_id, spinner};
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// How a turn raced against the input ended.
enum TurnResult {
    Finished(Result<TurnOutcome, TurnError>),
    /// Ctrl+D arrived mid-turn; the turn was cancelled and the chat ends.
    Quit,
}

/// Run the interactive chat loop, resuming `resume_id` when given.
pub async fn run_chat_loop(state: &AppState, resume_id: Option<String>) -> anyhow::Result<()> {
    let service = &state.conversation_service;

    let (mut conversation, resumed) = match resume_id {
        Some(raw) => {
            let id = parse_conversation_id(&raw)?;
            (service.get_conversation(&id).await?, true)
        }
        None => {
            let owner = state.owner_or_default(None);
            (service.create_conversation(&owner, None).await?, false)
        }
    };

    print_welcome_banner(&conversation, service.registry().list(), resumed);
    info!(conversation_id = %conversation.id, resumed, "chat started");

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::New(title) => {
                    let owner = conversation.owner_id.clone();
                    conversation = service.create_conversation(&owner, title).await?;
                    print_welcome_banner(&conversation, service.registry().list(), false);
                }
                ChatCommand::History => {
                    let messages = service.get_messages(&conversation.id, None, None).await?;
                    println!();
                    if messages.is_empty() {
                        println!("  {}\n", style("(no messages yet)").dim());
                    }
                    for message in &messages {
                        print_message(state, message, Some(100));
                    }
                }
                ChatCommand::Memory => {
                    show_memory(state, &conversation.id.to_string(), false).await?;
                }
                ChatCommand::Advisors => {
                    crate::cli::advisor::list_advisors(state, false)?;
                }
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        match run_turn(state, conversation.id, &text, &mut chat_input).await? {
            TurnResult::Finished(Ok(outcome)) => print_outcome(&outcome),
            TurnResult::Finished(Err(TurnError::Cancelled)) => {
                println!(
                    "\n  {} Turn cancelled. Nothing was saved.\n",
                    style("!").yellow().bold()
                );
            }
            TurnResult::Finished(Err(e @ TurnError::Validation(_))) => {
                println!("\n  {} {e}\n", style("!").yellow().bold());
            }
            TurnResult::Finished(Err(e)) => return Err(e.into()),
            TurnResult::Quit => break,
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    info!(conversation_id = %conversation.id, "chat ended");
    Ok(())
}

/// Run one turn while still listening for Ctrl+C and Ctrl+D.
async fn run_turn(
    state: &AppState,
    conversation_id: Uuid,
    text: &str,
    chat_input: &mut ChatInput,
) -> anyhow::Result<TurnResult> {
    let cancel = CancellationToken::new();
    let spinner = spinner("Consulting the board...", false)?;

    let turn = state
        .conversation_service
        .send_message(conversation_id, text, &cancel);
    tokio::pin!(turn);

    let mut quit = false;
    let result = loop {
        tokio::select! {
            result = &mut turn => break result,
            event = chat_input.read_line(), if !cancel.is_cancelled() => match event {
                InputEvent::Interrupted => {
                    debug!(%conversation_id, "turn interrupted");
                    spinner.set_message("Cancelling...");
                    cancel.cancel();
                }
                InputEvent::Eof => {
                    quit = true;
                    cancel.cancel();
                }
                InputEvent::Message(line) => {
                    if let Some(notice) = discarded_line_notice(&line) {
                        spinner.println(notice);
                    }
                    spinner.set_message("Still consulting the board (Ctrl+C to cancel)...");
                }
            },
        }
    };
    spinner.finish_and_clear();

    // A turn that committed before the cancel landed still counts.
    if quit {
        if let Ok(outcome) = &result {
            print_outcome(outcome);
        }
        return Ok(TurnResult::Quit);
    }
    Ok(TurnResult::Finished(result))
}

/// Notice for a line typed while a turn was running. Blank lines are ignored.
fn discarded_line_notice(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(format!(
        "  {} Not sent (the board is still answering): {}",
        style("!").yellow().bold(),
        style(crate::cli::truncate(line, 60)).dim()
    ))
}
