//! `counsel analyze <SYMBOL>`: quote snapshot plus every advisor's take.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use counsel_core::registry::AdvisorRegistry;
use counsel_types::advisor::AdvisorId;

use crate::state::AppState;

use super::advisor::category_emoji;
use super::spinner;

pub async fn analyze(state: &AppState, symbol: &str, json: bool, quiet: bool) -> Result<()> {
    let spinner = spinner(&format!("Analyzing {}...", symbol.trim()), json || quiet)?;
    let analysis = state.analysis_service.analyze(symbol).await;
    spinner.finish_and_clear();
    let analysis = analysis?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let quote = &analysis.quote;
    let change_color = if quote.change >= 0.0 { Color::Green } else { Color::Red };

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);
    table.add_row(vec![
        Cell::new("Price"),
        Cell::new(format!("${:.2}", quote.price)).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Change"),
        Cell::new(format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent)).fg(change_color),
    ]);
    table.add_row(vec![Cell::new("Market Cap"), Cell::new(&quote.market_cap)]);
    table.add_row(vec![Cell::new("P/E"), Cell::new(format!("{:.1}", quote.pe_ratio))]);
    table.add_row(vec![
        Cell::new("Dividend Yield"),
        Cell::new(format!("{:.2}%", quote.dividend_yield)),
    ]);
    table.add_row(vec![
        Cell::new("52w Range"),
        Cell::new(format!("${:.2} - ${:.2}", quote.week52_low, quote.week52_high)),
    ]);

    println!();
    println!("  {}", style(&quote.symbol).cyan().bold());
    println!("{table}");
    println!("  {}", style(format!("Source: {}", quote.data_source)).dim());
    println!();

    let registry = state.conversation_service.registry();
    for take in &analysis.analyses {
        let emoji = registry_emoji(registry, &take.advisor_id);
        println!(
            "  {} {}  {}",
            emoji,
            style(&take.name).cyan().bold(),
            style(format!("[{}]", take.recommendation)).yellow()
        );
        println!("  {}", take.summary);
        println!();
    }

    Ok(())
}

fn registry_emoji(registry: &AdvisorRegistry, id: &AdvisorId) -> &'static str {
    registry
        .get(id)
        .map(|advisor| category_emoji(advisor.category()))
        .unwrap_or("•")
}
