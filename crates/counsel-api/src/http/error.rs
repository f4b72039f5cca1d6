//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use counsel_types::error::{
    AnalysisError, ConversationError, MemoryError, RegistryError, RepositoryError, TurnError,
};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Turn rejected before commit.
    Turn(TurnError),
    /// Conversation lifecycle errors.
    Conversation(ConversationError),
    /// Advisor lookups.
    Registry(RegistryError),
    /// Stock analysis errors.
    Analysis(AnalysisError),
    /// Validation error raised by the HTTP layer itself.
    Validation(String),
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        AppError::Turn(e)
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        AppError::Registry(e)
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        AppError::Analysis(e)
    }
}

fn storage(e: &RepositoryError) -> (StatusCode, &'static str) {
    match e {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Turn(TurnError::Validation(_)) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Turn(TurnError::ConversationNotFound(_)) => {
                (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND")
            }
            AppError::Turn(TurnError::NoAdvisors(_)) => (StatusCode::CONFLICT, "NO_ADVISORS"),
            AppError::Turn(TurnError::Cancelled) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TURN_CANCELLED")
            }
            AppError::Turn(TurnError::Storage(e)) => storage(e),
            AppError::Conversation(ConversationError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND")
            }
            AppError::Conversation(ConversationError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Conversation(ConversationError::Memory(
                MemoryError::DuplicateInitialization(_),
            )) => (StatusCode::CONFLICT, "DUPLICATE_INITIALIZATION"),
            AppError::Conversation(ConversationError::Memory(MemoryError::Storage(e)))
            | AppError::Conversation(ConversationError::Storage(e)) => storage(e),
            AppError::Registry(RegistryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "ADVISOR_NOT_FOUND")
            }
            AppError::Registry(RegistryError::Storage(e)) => storage(e),
            AppError::Analysis(AnalysisError::InvalidSymbol(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Analysis(AnalysisError::QuoteUnavailable(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "QUOTE_UNAVAILABLE")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Turn(e) => e.to_string(),
            AppError::Conversation(e) => e.to_string(),
            AppError::Registry(e) => e.to_string(),
            AppError::Analysis(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::debug!(code, error = %message, "Request rejected");
        }

        ApiResponse::error(status, code, &message, uuid::Uuid::now_v7().to_string())
            .into_response()
    }
}
