//! Balance cache abstraction.
//!
//! The ledger keeps a short-TTL, non-authoritative mirror of each account's
//! balance so that read-heavy callers (game services polling balances) do not
//! hit the balance store on every request. The cache is injected into the
//! [`LedgerEngine`](crate::ledger::LedgerEngine) behind the [`BalanceCache`]
//! trait so tests can substitute a fake, and so the in-process implementation
//! can later be replaced with a shared networked store without touching the
//! engine.
//!
//! Invariants the engine relies on:
//!
//! - the cache is never consulted inside a mutating operation; and
//! - every successful mutation overwrites the cached value after commit, so a
//!   read immediately following a mutation observes the post-mutation balance
//!   even within the TTL window.

use async_trait::async_trait;

use crate::ledger::UserId;

pub mod memory;

pub use memory::InMemoryBalanceCache;

/// Cached mirror of an account's balance.
///
/// Balance is in minor units, same as the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBalance {
    pub balance: i64,
    pub currency: String,
}

/// Read-through cache for account balances.
///
/// Implementations decide the expiry policy; entries must expire after the
/// implementation's fixed TTL and `put` must overwrite unconditionally.
#[async_trait]
pub trait BalanceCache: Send + Sync {
    /// Look up the cached balance for a user, if present and unexpired.
    async fn get(&self, user_id: UserId) -> Option<CachedBalance>;

    /// Store or overwrite the cached balance for a user.
    async fn put(&self, user_id: UserId, balance: CachedBalance);
}
