//! Stock analysis handler.
//!
//! Endpoint:
//! - GET /api/v1/financial/{symbol} - Quote plus one analysis per advisor

use axum::extract::{Path, State};

use counsel_types::analysis::StockAnalysis;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// GET /api/v1/financial/{symbol} - Analyze a stock symbol.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<ApiResponse<StockAnalysis>, AppError> {
    let clock = RequestClock::start();
    let analysis = state.analysis_service.analyze(&symbol).await?;

    let self_link = format!("/api/v1/financial/{}", analysis.quote.symbol);
    Ok(clock.success(analysis).with_link("self", &self_link))
}
