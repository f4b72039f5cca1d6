//! Welcome banner for chat sessions.

use console::style;

use counsel_types::advisor::Advisor;
use counsel_types::conversation::Conversation;

use crate::cli::advisor::category_emoji;

/// Print the board and conversation the chat is attached to.
pub fn print_welcome_banner(conversation: &Conversation, advisors: &[Advisor], resumed: bool) {
    println!();
    println!(
        "  {} {}",
        style("Counsel").cyan().bold(),
        style(if resumed { "(resumed)" } else { "" }).dim()
    );
    println!("  {}", style(&conversation.title).bold());
    println!();
    for advisor in advisors {
        println!(
            "    {} {}  {}",
            category_emoji(advisor.category()),
            style(&advisor.name).cyan(),
            style(advisor.category()).dim()
        );
    }
    println!();

    let id = conversation.id.to_string();
    println!(
        "  {}  {}",
        style("Conversation:").bold(),
        style(&id[..8.min(id.len())]).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
