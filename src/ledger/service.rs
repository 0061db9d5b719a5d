//! Shared ledger handle
//!
//! Serializes every operation on one ledger through a single async mutex so that no
//! two operations observe each other's intermediate state. When backed by
//! [`Storage`], each successful mutation is persisted before the lock is released;
//! if the save fails the in-memory ledger is rolled back to its previous state.

use crate::ledger::account::Account;
use crate::ledger::engine::Ledger;
use crate::ledger::token::{LedgerError, LedgerEvent, TokenInfo};
use crate::storage::{Storage, StorageError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable, thread-safe handle to one ledger instance
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
    storage: Option<Arc<Storage>>,
}

impl SharedLedger {
    /// Wrap an in-memory ledger without persistence
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            storage: None,
        }
    }

    /// Wrap a ledger that is saved to `storage` after every mutation
    pub fn with_storage(ledger: Ledger, storage: Arc<Storage>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            storage: Some(storage),
        }
    }

    /// Load the ledger saved in `storage`, or start an empty one
    pub fn open(storage: Storage) -> Result<Self, StorageError> {
        let ledger = storage.load_or_default()?;
        Ok(Self::with_storage(ledger, Arc::new(storage)))
    }

    async fn apply<T>(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<T, LedgerError>,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T, LedgerError> {
        let mut ledger = self.inner.lock().await;

        let storage = match &self.storage {
            Some(storage) => storage,
            None => return op(&mut *ledger),
        };

        let previous = ledger.clone();
        let result = op(&mut *ledger)?;

        if changed(&result) {
            if let Err(e) = storage.save_ledger(&ledger) {
                log::error!("Failed to persist ledger, rolling back: {}", e);
                *ledger = previous;
                return Err(e.into());
            }
        }

        Ok(result)
    }

    async fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let ledger = self.inner.lock().await;
        f(&*ledger)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn initialize(
        &self,
        caller: &str,
        name: &str,
        ticker: &str,
        total_supply: u64,
    ) -> Result<String, LedgerError> {
        self.apply(
            |l| l.initialize(caller, name, ticker, total_supply),
            |_| true,
        )
        .await
    }

    pub async fn transfer(&self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        self.apply(|l| l.transfer(caller, to, amount), |ok| *ok)
            .await
    }

    pub async fn approve(
        &self,
        caller: &str,
        spender: &str,
        amount: u64,
    ) -> Result<bool, LedgerError> {
        self.apply(|l| l.approve(caller, spender, amount), |ok| *ok)
            .await
    }

    pub async fn transfer_from(
        &self,
        caller: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<bool, LedgerError> {
        self.apply(|l| l.transfer_from(caller, from, to, amount), |ok| *ok)
            .await
    }

    pub async fn mint(&self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        self.apply(|l| l.mint(caller, to, amount), |ok| *ok).await
    }

    pub async fn burn(&self, caller: &str, from: &str, amount: u64) -> Result<bool, LedgerError> {
        self.apply(|l| l.burn(caller, from, amount), |ok| *ok).await
    }

    pub async fn add_admin(&self, caller: &str, address: &str) -> Result<bool, LedgerError> {
        self.apply(|l| l.add_admin(caller, address), |ok| *ok).await
    }

    pub async fn delete_admin(&self, caller: &str, address: &str) -> Result<bool, LedgerError> {
        self.apply(|l| l.delete_admin(caller, address), |ok| *ok)
            .await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn info(&self) -> TokenInfo {
        self.read(|l| l.info().clone()).await
    }

    pub async fn balance_of(&self, address: &str) -> u64 {
        self.read(|l| l.balance_of(address)).await
    }

    pub async fn total_supply(&self) -> u64 {
        self.read(|l| l.total_supply()).await
    }

    pub async fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.read(|l| l.allowance(owner, spender)).await
    }

    pub async fn allowance_from(&self, caller: &str, owner: &str) -> Result<u64, LedgerError> {
        self.read(|l| l.allowance_from(caller, owner)).await
    }

    pub async fn admins(&self) -> Vec<String> {
        self.read(|l| l.admins().to_vec()).await
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.read(|l| l.accounts()).await
    }

    pub async fn history(&self) -> Vec<LedgerEvent> {
        self.read(|l| l.history()).await
    }

    /// Write the current state to storage, if any
    pub async fn flush(&self) -> Result<(), StorageError> {
        let ledger = self.inner.lock().await;
        match &self.storage {
            Some(storage) => storage.save_ledger(&ledger),
            None => Ok(()),
        }
    }
}
