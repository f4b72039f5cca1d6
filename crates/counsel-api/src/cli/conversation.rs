//! Conversation CLI commands: new, list, delete, send, history, memory.
//!
//! Provides conversation browsing with rich tables, one-shot turns with a
//! spinner while the advisors respond, and deletion with confirmation.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use tokio_util::sync::CancellationToken;

use counsel_types::conversation::{Message, MessageRole};
use counsel_types::turn::TurnOutcome;

use crate::state::AppState;

use super::{format_relative_time, parse_conversation_id, spinner, truncate};

/// Create a conversation and initialize every advisor's memory.
///
/// # Examples
///
/// ```bash
/// counsel new --title "Retirement plan"
/// ```
pub async fn new_conversation(
    state: &AppState,
    title: Option<String>,
    owner: Option<String>,
    json: bool,
) -> Result<()> {
    let owner_id = state.owner_or_default(owner);
    let conversation = state
        .conversation_service
        .create_conversation(&owner_id, title)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Conversation created.",
        style("✓").green().bold()
    );
    println!();
    println!("  {}  {}", style("Title:").bold(), style(&conversation.title).cyan());
    println!(
        "  {}     {}",
        style("ID:").bold(),
        style(conversation.id.to_string()).dim()
    );
    println!(
        "  {}  {} advisor{}",
        style("Board:").bold(),
        state.conversation_service.registry().len(),
        if state.conversation_service.registry().len() == 1 { "" } else { "s" }
    );
    println!();
    println!(
        "  Start talking: {}",
        style(format!("counsel chat {}", conversation.id)).yellow()
    );
    println!();

    Ok(())
}

/// List an owner's conversations, most recently active first.
pub async fn list_conversations(state: &AppState, owner: Option<String>, json: bool) -> Result<()> {
    let owner_id = state.owner_or_default(owner);
    let conversations = state
        .conversation_service
        .list_conversations(&owner_id, None, None)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations for '{}'. Start one with: {}",
            style("i").blue().bold(),
            style(&owner_id).cyan(),
            style("counsel new").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last Active").fg(Color::White),
    ]);

    for conversation in &conversations {
        table.add_row(vec![
            Cell::new(truncate(&conversation.title, 40)).fg(Color::Cyan),
            Cell::new(conversation.id.to_string()).fg(Color::DarkGrey),
            Cell::new(conversation.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(format_relative_time(&conversation.updated_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        style(conversations.len()).bold(),
        if conversations.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Delete a conversation with confirmation.
///
/// # Examples
///
/// ```bash
/// counsel delete <conversation-id>
/// counsel delete <conversation-id> --force
/// ```
pub async fn delete_conversation(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let id = parse_conversation_id(id)?;
    let conversation = state.conversation_service.get_conversation(&id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete conversation '{}' with all its messages and advisor memory?",
                style(&conversation.title).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.conversation_service.delete_conversation(&id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "conversation_id": id.to_string()})
        );
    } else {
        println!(
            "  {} Conversation '{}' deleted.",
            style("✓").red().bold(),
            conversation.title
        );
    }

    Ok(())
}

/// Run one turn and print the board's replies.
///
/// # Examples
///
/// ```bash
/// counsel send <conversation-id> "Should I buy index funds?"
/// ```
pub async fn send_message(
    state: &AppState,
    id: &str,
    text: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let id = parse_conversation_id(id)?;

    let spinner = spinner("Consulting the board...", json || quiet)?;
    let outcome = state
        .conversation_service
        .send_message(id, text, &CancellationToken::new())
        .await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

/// Print advisor replies in board order, then any failures.
pub(crate) fn print_outcome(outcome: &TurnOutcome) {
    println!();
    for reply in &outcome.responses {
        println!("  {}", style(&reply.advisor_name).cyan().bold());
        for line in reply.message.content.lines() {
            println!("  {line}");
        }
        println!();
    }

    for failure in &outcome.failures {
        println!(
            "  {} {} did not answer: {}",
            style("!").yellow().bold(),
            style(failure.advisor_id.as_str()).bold(),
            style(&failure.error).dim()
        );
    }
    if !outcome.failures.is_empty() {
        println!();
    }
}

/// Print a conversation's messages in order.
pub async fn show_history(state: &AppState, id: &str, json: bool) -> Result<()> {
    let id = parse_conversation_id(id)?;
    let conversation = state.conversation_service.get_conversation(&id).await?;
    let messages = state
        .conversation_service
        .get_messages(&id, None, None)
        .await?;

    if json {
        let export = serde_json::json!({
            "conversation": conversation,
            "messages": messages,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&conversation.title).cyan().bold());
    println!();

    if messages.is_empty() {
        println!("  {}", style("(no messages yet)").dim());
        println!();
        return Ok(());
    }

    for message in &messages {
        print_message(state, message, None);
    }

    Ok(())
}

/// Print one message with its author; `max_len` shortens the body.
pub(crate) fn print_message(state: &AppState, message: &Message, max_len: Option<usize>) {
    let author = match (message.role, &message.advisor_id) {
        (MessageRole::Advisor, Some(advisor_id)) => {
            let name = state
                .conversation_service
                .registry()
                .get(advisor_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|_| advisor_id.to_string());
            format!("{}", style(name).cyan().bold())
        }
        _ => format!("{}", style("You").green().bold()),
    };

    let body = match max_len {
        Some(max) => truncate(&message.content, max),
        None => message.content.clone(),
    };

    println!(
        "  {} {}",
        author,
        style(message.created_at.format("%H:%M")).dim()
    );
    for line in body.lines() {
        println!("  {line}");
    }
    println!();
}

/// Show what each advisor remembers of a conversation.
pub async fn show_memory(state: &AppState, id: &str, json: bool) -> Result<()> {
    let id = parse_conversation_id(id)?;
    let memories = state.conversation_service.advisor_memories(&id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!();
        println!(
            "  {} No advisors are attached to this conversation.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Advisor").fg(Color::White),
        Cell::new("Exchanges").fg(Color::White),
        Cell::new("Last Question").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    let registry = state.conversation_service.registry();
    for memory in &memories {
        let name = registry
            .get(&memory.advisor_id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|_| memory.advisor_id.to_string());
        let last_question = memory
            .window
            .pairs()
            .last()
            .map(|pair| truncate(&pair.user, 40))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(memory.window.len()),
            Cell::new(last_question),
            Cell::new(format_relative_time(&memory.updated_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
