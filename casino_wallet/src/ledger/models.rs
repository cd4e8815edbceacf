//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::LedgerError;

/// User ID type. Opaque, issued by the external auth collaborator.
pub type UserId = i64;

/// Currency assigned to lazily created accounts.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Account model. One row per user; balance in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Balance view returned by reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub balance: i64,
    pub currency: String,
}

/// One immutable record of a balance-affecting operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Bet,
    Win,
}

impl TransactionKind {
    /// Whether this kind credits the balance (`true`) or debits it (`false`).
    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Win)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdraw => write!(f, "withdraw"),
            TransactionKind::Bet => write!(f, "bet"),
            TransactionKind::Win => write!(f, "win"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    /// Case-insensitive parse, matching the wire contract where `type` is a
    /// free-form string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "bet" => Ok(TransactionKind::Bet),
            "win" => Ok(TransactionKind::Win),
            _ => Err(LedgerError::InvalidKind(s.to_string())),
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(LedgerError::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_kind_parse_case_insensitive() {
        assert_eq!(
            "DEPOSIT".parse::<TransactionKind>().unwrap(),
            TransactionKind::Deposit
        );
        assert_eq!(
            "Bet".parse::<TransactionKind>().unwrap(),
            TransactionKind::Bet
        );
        assert_eq!(
            "win".parse::<TransactionKind>().unwrap(),
            TransactionKind::Win
        );
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        let err = "jackpot".parse::<TransactionKind>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Invalid transaction type"));
        assert!(msg.contains("deposit"));
        assert!(msg.contains("withdraw"));
        assert!(msg.contains("bet"));
        assert!(msg.contains("win"));
    }

    #[test]
    fn test_kind_credit_direction() {
        assert!(TransactionKind::Deposit.is_credit());
        assert!(TransactionKind::Win.is_credit());
        assert!(!TransactionKind::Withdraw.is_credit());
        assert!(!TransactionKind::Bet.is_credit());
    }

    #[test]
    fn test_status_display_roundtrip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(
                status.to_string().parse::<TransactionStatus>().unwrap(),
                status
            );
        }
    }

    proptest! {
        #[test]
        fn prop_kind_display_parse_roundtrip_any_case(
            kind in prop_oneof![
                Just(TransactionKind::Deposit),
                Just(TransactionKind::Withdraw),
                Just(TransactionKind::Bet),
                Just(TransactionKind::Win),
            ],
            uppercase in any::<bool>(),
        ) {
            let text = if uppercase {
                kind.to_string().to_uppercase()
            } else {
                kind.to_string()
            };
            prop_assert_eq!(text.parse::<TransactionKind>().unwrap(), kind);
        }
    }
}
