//! Per-advisor stock analysis.
//!
//! Framing is chosen by the same ordered expertise rules as chat replies,
//! so an advisor's analysis and its replies always agree in perspective.

pub mod quote;

use counsel_types::advisor::{Advisor, ExpertiseCategory};
use counsel_types::analysis::{AdvisorAnalysis, StockAnalysis};
use counsel_types::error::AnalysisError;
use tracing::debug;

use crate::registry::AdvisorRegistry;

use self::quote::QuoteSource;

const MAX_SYMBOL_LEN: usize = 10;

/// Trim, uppercase and check a ticker symbol.
///
/// Accepts ASCII letters, digits, `.` and `-`, up to 10 characters.
pub fn validate_symbol(raw: &str) -> Result<String, AnalysisError> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(symbol)
    } else {
        Err(AnalysisError::InvalidSymbol(raw.to_string()))
    }
}

/// One advisor's analysis of `symbol`.
pub fn analyze_symbol(advisor: &Advisor, symbol: &str) -> AdvisorAnalysis {
    let (summary, recommendation) = match advisor.category() {
        ExpertiseCategory::ValueInvesting => (
            format!("From a value investing perspective, {symbol} requires careful fundamental analysis."),
            "Need to examine P/E ratio, book value, and cash flow before making a determination.",
        ),
        ExpertiseCategory::Macroeconomics => (
            format!("The macroeconomic environment significantly impacts {symbol}'s prospects."),
            "Consider how interest rates and sector trends affect this company's outlook.",
        ),
        ExpertiseCategory::PatternRecognition => (
            format!("Interesting patterns emerge when examining {symbol}'s performance metrics."),
            "Look for non-linear relationships between various business factors.",
        ),
        ExpertiseCategory::LongTermPrinciples => (
            format!("A fundamental analysis of {symbol} reveals important considerations."),
            "Focus on long-term business quality rather than short-term price movements.",
        ),
    };

    AdvisorAnalysis {
        advisor_id: advisor.id.clone(),
        name: advisor.name.clone(),
        summary,
        recommendation: recommendation.to_string(),
    }
}

/// Quotes a symbol and collects every advisor's analysis.
pub struct AnalysisService<Q: QuoteSource> {
    registry: AdvisorRegistry,
    quotes: Q,
}

impl<Q: QuoteSource> AnalysisService<Q> {
    pub fn new(registry: AdvisorRegistry, quotes: Q) -> Self {
        Self { registry, quotes }
    }

    pub async fn analyze(&self, symbol: &str) -> Result<StockAnalysis, AnalysisError> {
        let symbol = validate_symbol(symbol)?;
        let quote = self.quotes.quote(&symbol).await?;
        let analyses: Vec<AdvisorAnalysis> = self
            .registry
            .list()
            .iter()
            .map(|advisor| analyze_symbol(advisor, &symbol))
            .collect();

        debug!(
            symbol = %symbol,
            source = self.quotes.name(),
            analyses = analyses.len(),
            "Stock analysis assembled"
        );
        Ok(StockAnalysis { quote, analyses })
    }
}
