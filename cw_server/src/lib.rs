//! HTTP surface for the casino wallet ledger service.
//!
//! Thin axum wrapper over the [`casino_wallet`] ledger engine. Routing,
//! identity propagation, metrics, and configuration live here; all balance
//! semantics live in the library.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
