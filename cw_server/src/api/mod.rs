//! HTTP API for the wallet ledger service.
//!
//! Thin query/mutation boundary over the [`LedgerEngine`]. The service does
//! not authenticate callers itself: the gateway authenticates upstream and
//! forwards the resolved user id in the `x-user-id` header (see
//! [`identity`]). Everything observable about balances goes through the
//! ledger engine; handlers here only translate between the wire contract and
//! the engine's types.
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                        - Health check (public)
//! GET  /api/v1/wallet/balance         - Current balance for the caller
//! POST /api/v1/wallet/transactions    - Apply a deposit/withdraw/bet/win
//! GET  /api/v1/wallet/transactions    - Transaction history (chronological)
//! POST /api/v1/wallet/bet-win         - Atomic bet + optional win
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cw_server::api::{AppState, create_router};
//! use std::sync::Arc;
//! # use casino_wallet::ledger::LedgerEngine;
//! # use sqlx::PgPool;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let ledger: LedgerEngine = unimplemented!();
//! # let pool: PgPool = unimplemented!();
//! let state = AppState {
//!     ledger: Arc::new(ledger),
//!     pool: Arc::new(pool),
//! };
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8002").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod identity;
pub mod request_id;
pub mod wallet;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use casino_wallet::ledger::LedgerEngine;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    /// The ledger engine, sole authority over balances
    pub ledger: Arc<LedgerEngine>,
    /// Database connection pool, used by the health probe
    pub pool: Arc<PgPool>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// Wallet routes are versioned under `/api/v1` for future evolution; the
/// health check stays unversioned for load balancers.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/wallet/balance", get(wallet::get_balance))
        .route(
            "/wallet/transactions",
            get(wallet::list_transactions).post(wallet::create_transaction),
        )
        .route("/wallet/bet-win", post(wallet::process_bet_win));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes database connectivity; returns `200 OK` when healthy, otherwise
/// `503 Service Unavailable`.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8002/health
/// # {"status":"healthy","database":true,"timestamp":"2026-01-10T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": if db_healthy { "healthy" } else { "unhealthy" },
            "database": db_healthy,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
