//! Per-address account record
//!
//! An account holds a balance and the allowances its owner has granted to spenders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ledger account
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Owner address (opaque host principal)
    pub address: String,
    /// Token units held
    pub balance: u64,
    /// Allowances: spender -> remaining amount
    #[serde(default)]
    pub allowances: BTreeMap<String, u64>,
}

impl Account {
    /// Create an empty account for an address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance: 0,
            allowances: BTreeMap::new(),
        }
    }

    /// Create an account holding an initial balance
    pub fn with_balance(address: impl Into<String>, balance: u64) -> Self {
        Self {
            balance,
            ..Self::new(address)
        }
    }

    /// Remaining amount `spender` may move out of this account
    pub fn allowance(&self, spender: &str) -> u64 {
        self.allowances.get(spender).copied().unwrap_or(0)
    }

    /// Overwrite the allowance for a spender
    pub fn set_allowance(&mut self, spender: &str, amount: u64) {
        self.allowances.insert(spender.to_string(), amount);
    }

    /// Reduce a spender's allowance.
    ///
    /// Returns `false` without touching anything if the allowance is too small.
    /// An allowance that reaches zero is kept as a zero entry.
    pub fn spend_allowance(&mut self, spender: &str, amount: u64) -> bool {
        match self.allowances.get_mut(spender) {
            Some(remaining) if *remaining >= amount => {
                *remaining -= amount;
                true
            }
            // No entry means zero allowance, which only covers a zero amount
            None => amount == 0,
            Some(_) => false,
        }
    }

    /// Debit the balance if it covers `amount`
    pub fn debit(&mut self, amount: u64) -> bool {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }

    /// Credit the balance unless it would overflow
    pub fn credit(&mut self, amount: u64) -> bool {
        match self.balance.checked_add(amount) {
            Some(total) => {
                self.balance = total;
                true
            }
            None => false,
        }
    }
}
