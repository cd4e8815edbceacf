//! Wallet API handlers.
//!
//! This module provides the HTTP endpoints for the ledger engine:
//! - Reading the caller's balance (cache-accelerated)
//! - Applying deposit/withdraw/bet/win transactions
//! - The atomic bet + optional win composite used by game services
//! - Listing the caller's transaction history
//!
//! Amounts cross the wire as decimal numbers and are converted to integer
//! minor units (cents) at this boundary; the engine never sees floats.
//!
//! # Examples
//!
//! Apply a deposit:
//! ```bash
//! curl -X POST http://localhost:8002/api/v1/wallet/transactions \
//!   -H "x-user-id: 42" \
//!   -H "Content-Type: application/json" \
//!   -d '{"type": "deposit", "amount": 100.0}'
//! ```
//!
//! Place a bet with an immediate win:
//! ```bash
//! curl -X POST http://localhost:8002/api/v1/wallet/bet-win \
//!   -H "x-user-id: 42" \
//!   -H "Content-Type: application/json" \
//!   -d '{"bet_amount": 10.0, "win_amount": 25.0}'
//! ```

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use casino_wallet::ledger::{LedgerEntry, LedgerError};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::identity::Caller;
use crate::metrics;

/// Default number of history entries returned when no limit is given
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Hard cap on history entries per request
pub const MAX_HISTORY_LIMIT: i64 = 1000;

const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub wallet_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub status: String,
    pub created_at: String,
}

impl From<LedgerEntry> for TransactionResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            wallet_id: entry.user_id,
            kind: entry.kind.to_string(),
            amount: to_major_units(entry.amount),
            status: entry.status.to_string(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct BetWinPayload {
    pub bet_amount: f64,
    pub win_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Error variant of every wallet response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Get the caller's current balance.
///
/// # Response
///
/// Returns `200 OK`:
/// ```json
/// {"balance": 150.0, "currency": "USD"}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: no resolved caller identity
/// - `500 Internal Server Error`: storage failure
pub async fn get_balance(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<BalanceResponse>, ApiError> {
    match state.ledger.get_balance(caller).await {
        Ok(view) => {
            metrics::ledger_operations_total("get_balance", "ok");
            Ok(Json(BalanceResponse {
                balance: to_major_units(view.balance),
                currency: view.currency,
            }))
        }
        Err(err) => Err(error_response("get_balance", err)),
    }
}

/// Apply a single balance-affecting transaction.
///
/// # Request Body
///
/// ```json
/// {"type": "deposit", "amount": 100.0}
/// ```
///
/// `type` is one of `deposit`, `withdraw`, `bet`, `win` (case-insensitive).
///
/// # Response
///
/// Returns `200 OK` with the finalized transaction record:
/// ```json
/// {
///   "id": 17,
///   "wallet_id": 42,
///   "type": "deposit",
///   "amount": 100.0,
///   "status": "completed",
///   "created_at": "2026-01-10T10:30:00+00:00"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: non-positive or non-finite amount, unknown type
/// - `401 Unauthorized`: no resolved caller identity
/// - `409 Conflict`: insufficient funds
/// - `500 Internal Server Error`: storage failure (rolled back)
pub async fn create_transaction(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let amount = to_minor_units(payload.amount).map_err(bad_amount)?;

    match state
        .ledger
        .create_transaction(caller, &payload.kind, amount)
        .await
    {
        Ok(entry) => {
            metrics::ledger_operations_total("create_transaction", "ok");
            Ok(Json(entry.into()))
        }
        Err(err) => Err(error_response("create_transaction", err)),
    }
}

/// Atomically place a bet and, optionally, credit a win.
///
/// Used by game services to settle a round in one call. Both legs commit or
/// neither does; the returned record is the win transaction when a win
/// occurred, otherwise the bet transaction.
///
/// # Request Body
///
/// ```json
/// {"bet_amount": 10.0, "win_amount": 25.0}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: non-positive bet, negative win, non-finite amounts
/// - `401 Unauthorized`: no resolved caller identity
/// - `409 Conflict`: insufficient funds for the bet
/// - `500 Internal Server Error`: storage failure (rolled back)
pub async fn process_bet_win(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(payload): Json<BetWinPayload>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let bet_amount = to_minor_units(payload.bet_amount).map_err(bad_amount)?;
    let win_amount = payload
        .win_amount
        .map(to_minor_units)
        .transpose()
        .map_err(bad_amount)?;

    match state
        .ledger
        .process_bet_win(caller, bet_amount, win_amount)
        .await
    {
        Ok(entry) => {
            metrics::ledger_operations_total("bet_win", "ok");
            Ok(Json(entry.into()))
        }
        Err(err) => Err(error_response("bet_win", err)),
    }
}

/// List the caller's transactions in chronological order.
///
/// # Query Parameters
///
/// - `limit`: maximum entries to return (default 100, capped at 1000)
///
/// # Response
///
/// Returns `200 OK` with an array of transaction records; an empty array if
/// the caller has no account yet.
pub async fn list_transactions(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    match state.ledger.list_transactions(caller, limit).await {
        Ok(entries) => {
            metrics::ledger_operations_total("list_transactions", "ok");
            Ok(Json(entries.into_iter().map(Into::into).collect()))
        }
        Err(err) => Err(error_response("list_transactions", err)),
    }
}

/// Convert a wire-format decimal amount to integer minor units (cents).
///
/// Rounds to the nearest cent. Rejects non-finite values and values whose
/// scaled magnitude does not fit an i64. Sign is preserved so the engine can
/// report precise validation errors for non-positive amounts.
fn to_minor_units(amount: f64) -> Result<i64, String> {
    if !amount.is_finite() {
        return Err(format!("Amount must be a finite number, got {amount}"));
    }
    let scaled = (amount * MINOR_UNITS_PER_MAJOR).round();
    if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
        return Err(format!("Amount out of range: {amount}"));
    }
    Ok(scaled as i64)
}

fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR
}

fn bad_amount(message: String) -> ApiError {
    metrics::ledger_operations_total("validation", "rejected");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { message }))
}

/// Map a ledger error to a status code and the wire's error variant.
///
/// Validation and authentication failures keep their messages; storage
/// failures are redacted by `client_message`.
fn error_response(operation: &str, err: LedgerError) -> ApiError {
    let status = match &err {
        LedgerError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        LedgerError::InvalidAmount(_)
        | LedgerError::InvalidKind(_)
        | LedgerError::NegativeWinAmount(_) => StatusCode::BAD_REQUEST,
        LedgerError::InsufficientFunds { .. }
        | LedgerError::InsufficientBetFunds { .. }
        | LedgerError::BalanceOverflow => StatusCode::CONFLICT,
        LedgerError::Database(_) | LedgerError::InvalidStatus(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let outcome = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(operation, error = %err, "Ledger operation failed");
        "error"
    } else {
        tracing::debug!(operation, error = %err, "Ledger operation rejected");
        "rejected"
    };
    metrics::ledger_operations_total(operation, outcome);

    (
        status,
        Json(ErrorResponse {
            message: err.client_message(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units_rounds_to_cents() {
        assert_eq!(to_minor_units(100.0).unwrap(), 10_000);
        assert_eq!(to_minor_units(0.01).unwrap(), 1);
        assert_eq!(to_minor_units(10.01).unwrap(), 1_001);
        assert_eq!(to_minor_units(0.99).unwrap(), 99);
        assert_eq!(to_minor_units(-5.0).unwrap(), -500);
        assert_eq!(to_minor_units(0.0).unwrap(), 0);
    }

    #[test]
    fn test_to_minor_units_rejects_non_finite() {
        assert!(to_minor_units(f64::NAN).is_err());
        assert!(to_minor_units(f64::INFINITY).is_err());
        assert!(to_minor_units(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_to_minor_units_rejects_out_of_range() {
        assert!(to_minor_units(1e30).is_err());
    }

    #[test]
    fn test_major_minor_round_trip() {
        for minor in [0_i64, 1, 99, 100, 12_345, 1_000_000] {
            assert_eq!(to_minor_units(to_major_units(minor)).unwrap(), minor);
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response("test", LedgerError::NotAuthenticated);
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = error_response("test", LedgerError::InvalidAmount(0));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = error_response(
            "test",
            LedgerError::InsufficientBetFunds {
                available: 0,
                required: 100,
            },
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.0.message.starts_with("Insufficient funds for bet"));

        let (status, body) = error_response("test", LedgerError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0.message, "Internal server error");
    }
}
