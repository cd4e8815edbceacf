//! Ledger error types.

use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing caller identity
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Amount must be positive
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Unrecognized transaction kind
    #[error("Invalid transaction type: {0}. Valid types: deposit, withdraw, bet, win")]
    InvalidKind(String),

    /// Unrecognized transaction status read back from the store
    #[error("Invalid transaction status: {0}")]
    InvalidStatus(String),

    /// Win amount in a bet+win composite must not be negative
    #[error("Win amount cannot be negative, got {0}")]
    NegativeWinAmount(i64),

    /// Balance insufficient for a withdrawal
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// Balance insufficient for a bet
    #[error("Insufficient funds for bet: available {available}, required {required}")]
    InsufficientBetFunds { available: i64, required: i64 },

    /// Credit would overflow the balance
    #[error("Balance overflow")]
    BalanceOverflow,
}

impl LedgerError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized so SQL details and internal structure
    /// never reach external callers.
    pub fn client_message(&self) -> String {
        match self {
            // A bad status can only come from the store itself
            LedgerError::Database(_) | LedgerError::InvalidStatus(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_redacted() {
        let err = LedgerError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.to_string().contains("Database error"));
    }

    #[test]
    fn test_insufficient_funds_messages_distinguishable() {
        let withdraw = LedgerError::InsufficientFunds {
            available: 5_000,
            required: 10_000,
        };
        let bet = LedgerError::InsufficientBetFunds {
            available: 5_000,
            required: 10_000,
        };
        assert!(withdraw.client_message().starts_with("Insufficient funds:"));
        assert!(bet.client_message().starts_with("Insufficient funds for bet:"));
    }

    #[test]
    fn test_validation_messages_pass_through() {
        assert_eq!(
            LedgerError::NotAuthenticated.client_message(),
            "Not authenticated"
        );
        assert!(
            LedgerError::InvalidAmount(0)
                .client_message()
                .contains("positive")
        );
    }
}
