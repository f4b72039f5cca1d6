//! Advisor board CLI commands: list, show.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use counsel_types::advisor::{AdvisorId, ExpertiseCategory};

use crate::state::AppState;

use super::truncate;

/// List the advisors in registry order.
///
/// # Examples
///
/// ```bash
/// counsel advisors
/// counsel advisors --json
/// ```
pub fn list_advisors(state: &AppState, json: bool) -> Result<()> {
    let advisors = state.conversation_service.registry().list();

    if json {
        println!("{}", serde_json::to_string_pretty(advisors)?);
        return Ok(());
    }

    if advisors.is_empty() {
        println!();
        println!(
            "  {} No advisors registered. Add some under [[advisors]] in {}",
            style("i").blue().bold(),
            style(state.data_dir.join("config.toml").display()).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Focus").fg(Color::White),
        Cell::new("Expertise").fg(Color::White),
    ]);

    for (position, advisor) in advisors.iter().enumerate() {
        let category = advisor.category();
        table.add_row(vec![
            Cell::new(position + 1).fg(Color::DarkGrey),
            Cell::new(format!("{} {}", category_emoji(category), advisor.name)).fg(Color::Cyan),
            Cell::new(advisor.id.as_str()).fg(Color::White),
            Cell::new(category.to_string()),
            Cell::new(truncate(&advisor.expertise.join(", "), 50)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} advisor{}",
        style(advisors.len()).bold(),
        if advisors.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show one advisor's full profile.
pub fn show_advisor(state: &AppState, id: &str, json: bool) -> Result<()> {
    let advisor = state
        .conversation_service
        .registry()
        .get(&AdvisorId::from(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(advisor)?);
        return Ok(());
    }

    let category = advisor.category();

    println!();
    println!(
        "  {} {}",
        category_emoji(category),
        style(&advisor.name).cyan().bold()
    );
    println!("  {}", style(&advisor.description).dim());
    println!();

    println!("  {}", style("── Details ──").dim());
    println!("  {}         {}", style("ID:").bold(), advisor.id);
    println!("  {}      {}", style("Focus:").bold(), category);
    println!("  {}   {}", style("Position:").bold(), advisor.position + 1);
    println!();

    println!("  {}", style("── Expertise ──").dim());
    for tag in &advisor.expertise {
        println!("    {} {}", style("•").dim(), tag);
    }
    println!();

    println!("  {}", style("── Personality ──").dim());
    if !advisor.personality.traits.is_empty() {
        println!(
            "  {}     {}",
            style("Traits:").bold(),
            advisor.personality.traits.join(", ")
        );
    }
    println!(
        "  {}      {}",
        style("Style:").bold(),
        advisor.personality.communication_style
    );
    println!();

    Ok(())
}

pub(crate) fn category_emoji(category: ExpertiseCategory) -> &'static str {
    match category {
        ExpertiseCategory::ValueInvesting => "💰",
        ExpertiseCategory::Macroeconomics => "🌍",
        ExpertiseCategory::PatternRecognition => "📈",
        ExpertiseCategory::LongTermPrinciples => "🔭",
    }
}
