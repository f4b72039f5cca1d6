//! Stock quote and advisor analysis types.

use serde::{Deserialize, Serialize};

use crate::advisor::AdvisorId;

/// Snapshot of market data for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub market_cap: String,
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub week52_high: f64,
    pub week52_low: f64,
    /// Where the figures came from; flags placeholder data.
    pub data_source: String,
}

/// One advisor's take on a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorAnalysis {
    pub advisor_id: AdvisorId,
    pub name: String,
    pub summary: String,
    pub recommendation: String,
}

/// A quote plus every advisor's analysis, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub quote: StockQuote,
    pub analyses: Vec<AdvisorAnalysis>,
}
