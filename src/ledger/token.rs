//! Token metadata, ledger events and errors

use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominal destination of burned units. Never credited.
pub const BURN_ADDRESS: &str = "0";

/// Number of events kept in the ledger history
pub const MAX_HISTORY: usize = 100;

/// Fatal ledger errors.
///
/// Expected business failures (insufficient balance, allowance or supply, unknown
/// accounts) are not errors: operations report them as `Ok(false)`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Caller identity is empty")]
    AnonymousCaller,
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized { caller: String, action: &'static str },
    #[error("Caller account not found: {0}")]
    CallerAccountNotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Token metadata. Empty until the ledger is initialized.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    /// Token name (e.g., "Coin")
    pub name: String,
    /// Ticker symbol (e.g., "CN")
    pub ticker: String,
    /// Units in circulation; equals the sum of all balances
    pub total_supply: u64,
    /// Address that called `initialize`
    pub creator: String,
}

/// Kind of ledger mutation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Initialize,
    Transfer,
    Approve,
    TransferFrom,
    Mint,
    Burn,
    AdminAdded,
    AdminRemoved,
}

/// A successful ledger mutation. Admin events carry the affected admin in `to`
/// and a zero amount.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub kind: EventKind,
    /// Identity that invoked the operation
    pub caller: String,
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent {
    pub fn new(kind: EventKind, caller: &str, from: &str, to: &str, amount: u64) -> Self {
        Self {
            kind,
            caller: caller.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
        }
    }
}
