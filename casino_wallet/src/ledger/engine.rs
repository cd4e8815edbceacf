//! Ledger engine implementation.
//!
//! Single authority for reading and mutating account balances. Every mutation
//! runs inside one storage transaction that holds a row-level lock on the
//! account for the whole read-modify-write, so concurrent operations on the
//! same account serialize and an external reader only ever observes the
//! pre-state or the fully committed post-state.

use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::errors::{LedgerError, LedgerResult};
use super::models::{
    Account, BalanceView, DEFAULT_CURRENCY, LedgerEntry, TransactionKind, TransactionStatus,
    UserId,
};
use crate::cache::{BalanceCache, CachedBalance};

/// Ledger engine
#[derive(Clone)]
pub struct LedgerEngine {
    pool: Arc<PgPool>,
    cache: Arc<dyn BalanceCache>,
}

impl LedgerEngine {
    /// Create a new ledger engine
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `cache` - Balance cache, written through on every mutation
    pub fn new(pool: Arc<PgPool>, cache: Arc<dyn BalanceCache>) -> Self {
        Self { pool, cache }
    }

    /// Get the balance for the calling user.
    ///
    /// Checks the cache first; a hit is returned directly, which may be stale
    /// for up to the cache TTL. On a miss the account is read from the store
    /// (lazily created at balance 0) and the cache repopulated.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotAuthenticated` - No caller identity supplied
    pub async fn get_balance(&self, caller: Option<UserId>) -> LedgerResult<BalanceView> {
        let user_id = caller.ok_or(LedgerError::NotAuthenticated)?;

        if let Some(cached) = self.cache.get(user_id).await {
            debug!("balance cache hit for user {user_id}");
            return Ok(BalanceView {
                balance: cached.balance,
                currency: cached.currency,
            });
        }

        let account = self.get_or_create_account(user_id).await?;
        self.cache
            .put(
                user_id,
                CachedBalance {
                    balance: account.balance,
                    currency: account.currency.clone(),
                },
            )
            .await;

        Ok(BalanceView {
            balance: account.balance,
            currency: account.currency,
        })
    }

    /// Apply a single balance-affecting operation and record it.
    ///
    /// `kind` is parsed case-insensitively; `amount` is in minor units and
    /// must be positive. Deposits and wins always credit; withdrawals and
    /// bets debit only when the balance covers the amount. The balance update
    /// and the completed ledger entry commit in the same atomic unit, then
    /// the cache is overwritten with the new balance.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotAuthenticated` - No caller identity supplied
    /// * `LedgerError::InvalidAmount` - Non-positive amount
    /// * `LedgerError::InvalidKind` - Unrecognized operation kind
    /// * `LedgerError::InsufficientFunds` - Withdrawal exceeds balance
    /// * `LedgerError::InsufficientBetFunds` - Bet exceeds balance
    pub async fn create_transaction(
        &self,
        caller: Option<UserId>,
        kind: &str,
        amount: i64,
    ) -> LedgerResult<LedgerEntry> {
        let user_id = caller.ok_or(LedgerError::NotAuthenticated)?;
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let kind = TransactionKind::from_str(kind)?;

        let mut tx = self.pool.begin().await?;

        let account = Self::lock_or_create_account(&mut tx, user_id).await?;
        let new_balance = Self::apply_delta(&account, kind, amount)?;

        Self::update_balance(&mut tx, user_id, new_balance).await?;
        let entry =
            Self::insert_entry(&mut tx, user_id, kind, amount, TransactionStatus::Completed)
                .await?;

        tx.commit().await?;

        debug!(
            "committed {kind} of {amount} for user {user_id}, balance {} -> {new_balance}",
            account.balance
        );
        self.cache
            .put(
                user_id,
                CachedBalance {
                    balance: new_balance,
                    currency: account.currency,
                },
            )
            .await;

        Ok(entry)
    }

    /// Atomically place a bet and, if `win_amount > 0`, credit the win.
    ///
    /// Composite operation for game services: the bet debit and the optional
    /// win credit commit in one atomic unit, each with its own completed
    /// ledger entry. The cache is written once with the final balance.
    /// Returns the win entry if a win occurred, otherwise the bet entry.
    ///
    /// The account is lazily created like every other operation, so a fresh
    /// account simply fails the bet for lack of funds.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotAuthenticated` - No caller identity supplied
    /// * `LedgerError::InvalidAmount` - Non-positive bet amount
    /// * `LedgerError::NegativeWinAmount` - Negative win amount
    /// * `LedgerError::InsufficientBetFunds` - Bet exceeds balance
    pub async fn process_bet_win(
        &self,
        caller: Option<UserId>,
        bet_amount: i64,
        win_amount: Option<i64>,
    ) -> LedgerResult<LedgerEntry> {
        let user_id = caller.ok_or(LedgerError::NotAuthenticated)?;
        if bet_amount <= 0 {
            return Err(LedgerError::InvalidAmount(bet_amount));
        }
        if let Some(win) = win_amount {
            if win < 0 {
                return Err(LedgerError::NegativeWinAmount(win));
            }
        }

        let mut tx = self.pool.begin().await?;

        let account = Self::lock_or_create_account(&mut tx, user_id).await?;
        let mut balance = Self::apply_delta(&account, TransactionKind::Bet, bet_amount)?;

        Self::update_balance(&mut tx, user_id, balance).await?;
        let bet_entry = Self::insert_entry(
            &mut tx,
            user_id,
            TransactionKind::Bet,
            bet_amount,
            TransactionStatus::Completed,
        )
        .await?;

        let mut win_entry = None;
        if let Some(win) = win_amount.filter(|&w| w > 0) {
            balance = balance
                .checked_add(win)
                .ok_or(LedgerError::BalanceOverflow)?;
            Self::update_balance(&mut tx, user_id, balance).await?;
            win_entry = Some(
                Self::insert_entry(
                    &mut tx,
                    user_id,
                    TransactionKind::Win,
                    win,
                    TransactionStatus::Completed,
                )
                .await?,
            );
        }

        tx.commit().await?;

        debug!(
            "committed bet {bet_amount} / win {:?} for user {user_id}, balance {} -> {balance}",
            win_amount, account.balance
        );
        self.cache
            .put(
                user_id,
                CachedBalance {
                    balance,
                    currency: account.currency,
                },
            )
            .await;

        Ok(win_entry.unwrap_or(bet_entry))
    }

    /// List ledger entries for the calling user in chronological order.
    ///
    /// Returns an empty list when no account exists. `limit` bounds the scan.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotAuthenticated` - No caller identity supplied
    pub async fn list_transactions(
        &self,
        caller: Option<UserId>,
        limit: i64,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let user_id = caller.ok_or(LedgerError::NotAuthenticated)?;

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, amount, status, created_at
            FROM ledger_entries
            WHERE user_id = $1
            ORDER BY id ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(LedgerEntry {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    kind: row.get::<String, _>("kind").parse()?,
                    amount: row.get("amount"),
                    status: row.get::<String, _>("status").parse()?,
                    created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                })
            })
            .collect()
    }

    /// Compute the post-operation balance, enforcing the no-negative-balance
    /// invariant and the overflow guard. No state is touched on error.
    fn apply_delta(account: &Account, kind: TransactionKind, amount: i64) -> LedgerResult<i64> {
        if kind.is_credit() {
            return account
                .balance
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow);
        }

        if account.balance < amount {
            return Err(match kind {
                TransactionKind::Bet => LedgerError::InsufficientBetFunds {
                    available: account.balance,
                    required: amount,
                },
                _ => LedgerError::InsufficientFunds {
                    available: account.balance,
                    required: amount,
                },
            });
        }
        Ok(account.balance - amount)
    }

    /// Read the account outside any mutation, creating it lazily at 0.
    async fn get_or_create_account(&self, user_id: UserId) -> LedgerResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (user_id, balance, currency)
            VALUES ($1, 0, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, balance, currency, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(DEFAULT_CURRENCY)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Self::account_from_row(&row))
    }

    /// Lazily create the account row if absent, then lock it for the
    /// remainder of the transaction.
    async fn lock_or_create_account(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> LedgerResult<Account> {
        sqlx::query(
            "INSERT INTO accounts (user_id, balance, currency)
             VALUES ($1, 0, $2)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(DEFAULT_CURRENCY)
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query(
            "SELECT user_id, balance, currency, created_at, updated_at
             FROM accounts
             WHERE user_id = $1
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Self::account_from_row(&row))
    }

    async fn update_balance(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        new_balance: i64,
    ) -> LedgerResult<()> {
        sqlx::query("UPDATE accounts SET balance = $1, updated_at = NOW() WHERE user_id = $2")
            .bind(new_balance)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Append one finalized ledger entry inside the operation's transaction.
    async fn insert_entry(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        kind: TransactionKind,
        amount: i64,
        status: TransactionStatus,
    ) -> LedgerResult<LedgerEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO ledger_entries (user_id, kind, amount, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(amount)
        .bind(status.to_string())
        .fetch_one(&mut **tx)
        .await?;

        Ok(LedgerEntry {
            id: row.get("id"),
            user_id,
            kind,
            amount,
            status,
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        })
    }

    fn account_from_row(row: &sqlx::postgres::PgRow) -> Account {
        Account {
            user_id: row.get("user_id"),
            balance: row.get("balance"),
            currency: row.get("currency"),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(balance: i64) -> Account {
        Account {
            user_id: 1,
            balance,
            currency: DEFAULT_CURRENCY.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_delta_credits() {
        let acct = account(5_000);
        assert_eq!(
            LedgerEngine::apply_delta(&acct, TransactionKind::Deposit, 10_000).unwrap(),
            15_000
        );
        assert_eq!(
            LedgerEngine::apply_delta(&acct, TransactionKind::Win, 2_500).unwrap(),
            7_500
        );
    }

    #[test]
    fn test_apply_delta_debit_guard() {
        let acct = account(5_000);
        assert_eq!(
            LedgerEngine::apply_delta(&acct, TransactionKind::Withdraw, 5_000).unwrap(),
            0
        );

        let err = LedgerEngine::apply_delta(&acct, TransactionKind::Withdraw, 10_000).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds {
                available: 5_000,
                required: 10_000
            }
        ));

        let err = LedgerEngine::apply_delta(&acct, TransactionKind::Bet, 10_000).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBetFunds { .. }));
    }

    #[test]
    fn test_apply_delta_overflow() {
        let acct = account(i64::MAX - 10);
        let err = LedgerEngine::apply_delta(&acct, TransactionKind::Win, 100).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
    }
}
