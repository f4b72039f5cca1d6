//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Advisors
        .route("/advisors", get(handlers::advisor::list_advisors))
        .route("/advisors/{id}", get(handlers::advisor::get_advisor))
        // Conversations
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .patch(handlers::conversation::update_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(handlers::conversation::get_messages).post(handlers::conversation::send_message),
        )
        .route(
            "/conversations/{id}/memory",
            get(handlers::conversation::get_memory),
        )
        // Stock analysis
        .route(
            "/financial/{symbol}",
            get(handlers::financial::get_analysis),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).await.unwrap();
        // Leak tempdir so the database outlives the test body
        std::mem::forget(dir);
        build_router(state)
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let resp = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let router = test_router().await;
        let (status, body) = call(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_advisors_listed_in_registry_order() {
        let router = test_router().await;
        let (status, body) = call(&router, "GET", "/api/v1/advisors", None).await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["Warren Buffett", "John Maynard Keynes", "Benjamin Graham", "Albert Einstein"]
        );

        let (status, body) = call(&router, "GET", "/api/v1/advisors/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "ADVISOR_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_conversation_turn_flow() {
        let router = test_router().await;

        let (status, created) = call(
            &router,
            "POST",
            "/api/v1/conversations",
            Some(serde_json::json!({"title": "Portfolio"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["owner_id"], "default_user");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, turn) = call(
            &router,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(serde_json::json!({"content": "Evaluate XYZ"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(turn["data"]["responses"].as_array().unwrap().len(), 4);
        assert_eq!(turn["data"]["responses"][0]["advisor_id"], "warren_buffett");
        assert!(turn["data"]["failures"].as_array().unwrap().is_empty());

        let (_, messages) =
            call(&router, "GET", &format!("/api/v1/conversations/{id}/messages"), None).await;
        assert_eq!(messages["data"].as_array().unwrap().len(), 5);
        assert_eq!(messages["data"][0]["role"], "user");

        let (_, memory) =
            call(&router, "GET", &format!("/api/v1/conversations/{id}/memory"), None).await;
        let memories = memory["data"].as_array().unwrap();
        assert_eq!(memories.len(), 4);
        assert_eq!(memories[0]["window"].as_array().unwrap().len(), 1);

        let (_, listed) = call(&router, "GET", "/api/v1/conversations", None).await;
        assert_eq!(listed["data"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let router = test_router().await;
        let (_, created) = call(&router, "POST", "/api/v1/conversations", None).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &router,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(serde_json::json!({"content": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (_, messages) =
            call(&router, "GET", &format!("/api/v1/conversations/{id}/messages"), None).await;
        assert!(messages["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let router = test_router().await;
        let (_, created) = call(&router, "POST", "/api/v1/conversations", None).await;
        assert_eq!(created["data"]["title"], "New Conversation");
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/conversations/{id}");

        let (status, renamed) =
            call(&router, "PATCH", &uri, Some(serde_json::json!({"title": "Bonds"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["data"]["title"], "Bonds");

        let (status, _) = call(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_ids_and_unknown_conversations() {
        let router = test_router().await;

        let (status, _) = call(&router, "GET", "/api/v1/conversations/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::now_v7();
        let (status, body) = call(
            &router,
            "POST",
            &format!("/api/v1/conversations/{missing}/messages"),
            Some(serde_json::json!({"content": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "CONVERSATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_financial_analysis() {
        let router = test_router().await;

        let (status, body) = call(&router, "GET", "/api/v1/financial/aapl", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quote"]["symbol"], "AAPL");
        assert_eq!(body["data"]["analyses"].as_array().unwrap().len(), 4);

        let (status, _) = call(&router, "GET", "/api/v1/financial/TOOLONGSYMBOL", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
