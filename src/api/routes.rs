//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Token metadata
        .route("/api/token", get(handlers::get_token_info))
        .route("/api/initialize", post(handlers::initialize))
        // Balances and allowances
        .route("/api/balances/{address}", get(handlers::get_balance))
        .route("/api/allowance", get(handlers::get_allowance))
        .route("/api/allowance/{owner}", get(handlers::get_allowance_from))
        // Transfers
        .route("/api/transfer", post(handlers::transfer))
        .route("/api/approve", post(handlers::approve))
        .route("/api/transfer-from", post(handlers::transfer_from))
        // Supply (admin only)
        .route("/api/mint", post(handlers::mint))
        .route("/api/burn", post(handlers::burn))
        // Admins
        .route(
            "/api/admins",
            get(handlers::list_admins).post(handlers::add_admin),
        )
        .route("/api/admins/{address}", delete(handlers::delete_admin))
        // Inspection
        .route("/api/accounts", get(handlers::list_accounts))
        .route("/api/history", get(handlers::get_history))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, SharedLedger};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        caller: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(handlers::CALLER_HEADER, caller);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn create_app() -> Router {
        create_router(ApiState {
            ledger: SharedLedger::new(Ledger::new()),
        })
    }

    #[tokio::test]
    async fn test_routes_end_to_end() {
        let app = create_app();

        let (status, _) = send(
            &app,
            "POST",
            "/api/initialize",
            Some("alice"),
            Some(json!({"name": "Coin", "ticker": "CN", "total_supply": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &app,
            "POST",
            "/api/transfer",
            Some("alice"),
            Some(json!({"to": "bob", "amount": 300})),
        )
        .await;
        assert_eq!(body["success"], true);

        let (_, body) = send(
            &app,
            "POST",
            "/api/approve",
            Some("bob"),
            Some(json!({"spender": "carol", "amount": 50})),
        )
        .await;
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, "GET", "/api/balances/bob", None, None).await;
        assert_eq!(body["balance"], 300);

        let (_, body) = send(
            &app,
            "GET",
            "/api/allowance?owner=bob&spender=carol",
            None,
            None,
        )
        .await;
        assert_eq!(body["allowance"], 50);

        let (_, body) = send(&app, "GET", "/api/allowance/bob", Some("carol"), None).await;
        assert_eq!(body["allowance"], 50);

        let (_, body) = send(
            &app,
            "POST",
            "/api/transfer-from",
            Some("carol"),
            Some(json!({"from": "bob", "to": "dave", "amount": 20})),
        )
        .await;
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, "GET", "/api/token", None, None).await;
        assert_eq!(body["total_supply"], 1000);
        assert_eq!(body["owner"], "alice");
    }

    #[tokio::test]
    async fn test_routes_map_errors_to_status() {
        let app = create_app();
        send(
            &app,
            "POST",
            "/api/initialize",
            Some("alice"),
            Some(json!({"name": "Coin", "ticker": "CN", "total_supply": 1000})),
        )
        .await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/mint",
            None,
            Some(json!({"to": "alice", "amount": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/admins",
            Some("mallory"),
            Some(json!({"address": "mallory"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "POST",
            "/api/admins",
            Some("alice"),
            Some(json!({"address": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", "/api/admins/bob", Some("bob"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "DELETE", "/api/admins/bob", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/history", None, None).await;
        let kinds: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["initialize", "admin_added", "admin_removed"]);
    }
}
