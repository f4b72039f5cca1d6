//! Market data sources.

use counsel_types::analysis::StockQuote;
use counsel_types::error::AnalysisError;

/// Anything that can quote a stock symbol.
///
/// `symbol` is already validated and uppercased by the caller.
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    fn quote(
        &self,
        symbol: &str,
    ) -> impl std::future::Future<Output = Result<StockQuote, AnalysisError>> + Send;
}

/// Fixed figures used when no market data provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderQuoteSource;

pub const PLACEHOLDER_DATA_SOURCE: &str = "Placeholder data (API keys not configured)";

impl QuoteSource for PlaceholderQuoteSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn quote(&self, symbol: &str) -> Result<StockQuote, AnalysisError> {
        Ok(StockQuote {
            symbol: symbol.to_string(),
            price: 123.45,
            change: 1.23,
            change_percent: 1.01,
            market_cap: "123.45B".to_string(),
            pe_ratio: 15.67,
            dividend_yield: 2.34,
            week52_high: 150.00,
            week52_low: 100.00,
            data_source: PLACEHOLDER_DATA_SOURCE.to_string(),
        })
    }
}
