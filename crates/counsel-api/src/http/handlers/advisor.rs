//! Advisor registry handlers.
//!
//! Endpoints:
//! - GET /api/v1/advisors      - List advisors in registry order
//! - GET /api/v1/advisors/{id} - Get a single advisor

use axum::extract::{Path, State};

use counsel_types::advisor::{Advisor, AdvisorId};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// GET /api/v1/advisors - List every registered advisor.
pub async fn list_advisors(State(state): State<AppState>) -> ApiResponse<Vec<Advisor>> {
    let clock = RequestClock::start();
    let advisors = state.conversation_service.registry().list().to_vec();

    clock.success(advisors).with_link("self", "/api/v1/advisors")
}

/// GET /api/v1/advisors/{id} - Get one advisor by id.
pub async fn get_advisor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Advisor>, AppError> {
    let clock = RequestClock::start();
    let advisor = state
        .conversation_service
        .registry()
        .get(&AdvisorId::from(id))?
        .clone();

    let self_link = format!("/api/v1/advisors/{}", advisor.id);
    Ok(clock
        .success(advisor)
        .with_link("self", &self_link)
        .with_link("advisors", "/api/v1/advisors"))
}
