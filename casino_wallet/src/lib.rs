//! # Casino Wallet
//!
//! The wallet ledger and transactional balance engine for a casino platform.
//!
//! This library is the sole authority over user balances. Every
//! balance-affecting operation (deposit, withdraw, bet, win) runs as one
//! atomic, row-locked unit of work against PostgreSQL, producing exactly one
//! immutable ledger entry per committed balance change. A short-TTL balance
//! cache accelerates reads without ever being trusted inside a mutation.
//!
//! ## Core Modules
//!
//! - [`ledger`]: the [`LedgerEngine`](ledger::LedgerEngine), models, and
//!   error taxonomy
//! - [`db`]: PostgreSQL connection pooling and schema bootstrap
//! - [`cache`]: the injected [`BalanceCache`](cache::BalanceCache) seam and
//!   the in-process TTL implementation
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
//!     db.ensure_schema().await?;
//!
//!     let cache = Arc::new(InMemoryBalanceCache::default());
//!     let ledger = LedgerEngine::new(Arc::new(db.pool().clone()), cache);
//!
//!     let entry = ledger
//!         .create_transaction(Some(42), "deposit", 10_000)
//!         .await?;
//!     println!("Deposited, entry id {}", entry.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Mutations on the same account are serialized by a row-level lock held for
//! the duration of the read-modify-write; mutations on different accounts
//! never block each other. Reads may be served from the cache and can be
//! stale for up to the cache TTL.

/// Balance cache abstraction and implementations.
pub mod cache;

/// PostgreSQL connection pooling and utilities.
pub mod db;

/// Ledger engine, models, and errors.
pub mod ledger;

pub use cache::{BalanceCache, CachedBalance, InMemoryBalanceCache};
pub use db::{Database, DatabaseConfig};
pub use ledger::{
    Account, BalanceView, LedgerEngine, LedgerEntry, LedgerError, LedgerResult, TransactionKind,
    TransactionStatus, UserId,
};
