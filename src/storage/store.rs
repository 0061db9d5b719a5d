//! Account store
//!
//! Keyed storage of whole account records. Every write replaces the full record;
//! the store offers no transactions across keys.

use crate::ledger::Account;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Address -> account mapping with last-writer-wins semantics per key
pub trait AccountStore {
    /// Look up an account
    fn get(&self, address: &str) -> Option<Account>;

    /// Store a whole account record under its address, returning the stored value
    fn insert(&mut self, account: Account) -> Account;

    /// All accounts, in an order that is stable for an unchanged store
    fn accounts(&self) -> Vec<Account>;

    fn contains(&self, address: &str) -> bool {
        self.get(address).is_some()
    }

    fn len(&self) -> usize {
        self.accounts().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store ordered by address
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    accounts: BTreeMap<String, Account>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }
}

impl FromIterator<Account> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        let mut store = Self::new();
        for account in iter {
            store.insert(account);
        }
        store
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, address: &str) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn insert(&mut self, account: Account) -> Account {
        self.accounts
            .insert(account.address.clone(), account.clone());
        account
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    fn contains(&self, address: &str) -> bool {
        self.accounts.contains_key(address)
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}
