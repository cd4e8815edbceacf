//! Ledger module owning all account balance mutation logic.
//!
//! This module implements:
//! - Lazily created per-user accounts with non-negative integer balances
//! - An append-only ledger of every committed balance change
//! - Atomic, row-locked read-modify-write units per operation
//! - Write-through maintenance of the injected balance cache
//!
//! ## Example
//!
//! ```no_run
//! use casino_wallet::cache::InMemoryBalanceCache;
//! use casino_wallet::db::{Database, DatabaseConfig};
//! use casino_wallet::ledger::LedgerEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let ledger = LedgerEngine::new(
//!         Arc::new(db.pool().clone()),
//!         Arc::new(InMemoryBalanceCache::default()),
//!     );
//!
//!     ledger.create_transaction(Some(7), "deposit", 5_000).await?;
//!     let view = ledger.get_balance(Some(7)).await?;
//!     println!("Balance: {} {}", view.balance, view.currency);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod errors;
pub mod models;

pub use engine::LedgerEngine;
pub use errors::{LedgerError, LedgerResult};
pub use models::{
    Account, BalanceView, DEFAULT_CURRENCY, LedgerEntry, TransactionKind, TransactionStatus,
    UserId,
};
