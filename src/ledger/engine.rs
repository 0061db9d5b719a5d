//! Ledger engine
//!
//! Implements every token operation on top of an [`AccountStore`]. Each mutation
//! follows the same protocol: resolve the caller, load copies of the accounts it
//! touches, validate and mutate the copies, and only then write them back. A failed
//! validation returns before any write, so no operation is ever partially applied.

use crate::ledger::account::Account;
use crate::ledger::admin::AdminSet;
use crate::ledger::token::{
    EventKind, LedgerError, LedgerEvent, TokenInfo, BURN_ADDRESS, MAX_HISTORY,
};
use crate::storage::{AccountStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Full ledger state in serializable form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub info: TokenInfo,
    pub admins: AdminSet,
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub history: Vec<LedgerEvent>,
}

/// The token ledger: metadata, admin set, accounts and recent events
#[derive(Clone, Debug)]
pub struct Ledger<S = MemoryStore> {
    info: TokenInfo,
    admins: AdminSet,
    store: S,
    history: VecDeque<LedgerEvent>,
}

impl<S: AccountStore + Default> Default for Ledger<S> {
    fn default() -> Self {
        Self::with_store(S::default())
    }
}

impl Ledger<MemoryStore> {
    /// Create an uninitialized in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: AccountStore + Default> Ledger<S> {
    /// Rebuild a ledger from a snapshot
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut store = S::default();
        for account in snapshot.accounts {
            store.insert(account);
        }

        Self {
            info: snapshot.info,
            admins: snapshot.admins,
            store,
            history: snapshot.history.into_iter().collect(),
        }
    }
}

impl<S: AccountStore> Ledger<S> {
    /// Create an uninitialized ledger over an existing store
    pub fn with_store(store: S) -> Self {
        Self {
            info: TokenInfo::default(),
            admins: AdminSet::new(),
            store,
            history: VecDeque::new(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn resolve_caller(caller: &str) -> Result<&str, LedgerError> {
        if caller.is_empty() {
            return Err(LedgerError::AnonymousCaller);
        }
        Ok(caller)
    }

    fn require_admin(&self, caller: &str, action: &'static str) -> Result<(), LedgerError> {
        if !self.admins.contains(caller) {
            log::warn!("Rejected {} by non-admin {}", action, caller);
            return Err(LedgerError::Unauthorized {
                caller: caller.to_string(),
                action,
            });
        }
        Ok(())
    }

    fn require_account(&self, address: &str) -> Result<Account, LedgerError> {
        self.store
            .get(address)
            .ok_or_else(|| LedgerError::CallerAccountNotFound(address.to_string()))
    }

    fn load_or_create(&self, address: &str) -> Account {
        self.store
            .get(address)
            .unwrap_or_else(|| Account::new(address))
    }

    fn record(&mut self, event: LedgerEvent) {
        self.history.push_back(event);
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    /// Debit `from` on behalf of `spender`, consuming allowance.
    ///
    /// Returns the updated copy of `from` without writing it, or `None` if the
    /// account is missing, the allowance is short, or the balance is short.
    fn delegated_debit(&self, spender: &str, from: &str, amount: u64) -> Option<Account> {
        let mut from_account = match self.store.get(from) {
            Some(account) => account,
            None => {
                log::warn!("Delegated debit from unknown account {}", from);
                return None;
            }
        };

        if !from_account.spend_allowance(spender, amount) {
            log::warn!(
                "Insufficient allowance: {} -> {} has {}, needs {}",
                from,
                spender,
                from_account.allowance(spender),
                amount
            );
            return None;
        }

        if !from_account.debit(amount) {
            log::warn!(
                "Insufficient balance: {} has {}, needs {}",
                from,
                from_account.balance,
                amount
            );
            return None;
        }

        Some(from_account)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Set up the token and hand the whole supply to the caller.
    ///
    /// Not guarded against repeat calls: a second call overwrites the token info and
    /// the caller's account, and adds the caller to the admin set again.
    pub fn initialize(
        &mut self,
        caller: &str,
        name: &str,
        ticker: &str,
        total_supply: u64,
    ) -> Result<String, LedgerError> {
        let creator = Self::resolve_caller(caller)?;

        if !self.info.creator.is_empty() {
            log::warn!(
                "Ledger re-initialized by {} (previous creator {})",
                creator,
                self.info.creator
            );
        }

        self.store
            .insert(Account::with_balance(creator, total_supply));

        self.info = TokenInfo {
            name: name.to_string(),
            ticker: ticker.to_string(),
            total_supply,
            creator: creator.to_string(),
        };
        self.admins.push(creator);

        self.record(LedgerEvent::new(
            EventKind::Initialize,
            creator,
            BURN_ADDRESS,
            creator,
            total_supply,
        ));

        log::info!(
            "Token initialized: {} ({}) supply {} by {}",
            name,
            ticker,
            total_supply,
            creator
        );

        Ok(creator.to_string())
    }

    // =========================================================================
    // View functions
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn ticker(&self) -> &str {
        &self.info.ticker
    }

    pub fn total_supply(&self) -> u64 {
        self.info.total_supply
    }

    /// Address that initialized the token
    pub fn owner(&self) -> &str {
        &self.info.creator
    }

    pub fn info(&self) -> &TokenInfo {
        &self.info
    }

    /// Balance of an address, zero if unknown
    pub fn balance_of(&self, address: &str) -> u64 {
        self.store.get(address).map(|a| a.balance).unwrap_or(0)
    }

    /// Remaining amount `spender` may move out of `owner`
    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.store
            .get(owner)
            .map(|a| a.allowance(spender))
            .unwrap_or(0)
    }

    /// Remaining amount the caller may move out of `owner`
    pub fn allowance_from(&self, caller: &str, owner: &str) -> Result<u64, LedgerError> {
        let spender = Self::resolve_caller(caller)?;
        Ok(self.allowance(owner, spender))
    }

    pub fn admins(&self) -> &[String] {
        self.admins.as_slice()
    }

    pub fn is_admin(&self, address: &str) -> bool {
        self.admins.contains(address)
    }

    /// Every account ever referenced
    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    /// Most recent events, oldest first
    pub fn history(&self) -> Vec<LedgerEvent> {
        self.history.iter().cloned().collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            info: self.info.clone(),
            admins: self.admins.clone(),
            accounts: self.store.accounts(),
            history: self.history(),
        }
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Move `amount` from the caller to `to`, creating `to` on first use
    pub fn transfer(&mut self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        let from = Self::resolve_caller(caller)?;

        let mut from_account = match self.store.get(from) {
            Some(account) => account,
            None => {
                log::warn!("Transfer from unknown account {}", from);
                return Ok(false);
            }
        };

        if !from_account.debit(amount) {
            log::warn!(
                "Insufficient balance: {} has {}, needs {}",
                from,
                from_account.balance,
                amount
            );
            return Ok(false);
        }

        if from != to {
            let mut to_account = self.load_or_create(to);
            if !to_account.credit(amount) {
                log::warn!("Transfer of {} would overflow balance of {}", amount, to);
                return Ok(false);
            }

            self.store.insert(from_account);
            self.store.insert(to_account);
        }

        self.record(LedgerEvent::new(EventKind::Transfer, from, from, to, amount));
        log::debug!("Transfer {} -> {}: {}", from, to, amount);

        Ok(true)
    }

    /// Set the caller's allowance for `spender` to exactly `amount`.
    ///
    /// The caller's balance must cover `amount` at approval time.
    pub fn approve(
        &mut self,
        caller: &str,
        spender: &str,
        amount: u64,
    ) -> Result<bool, LedgerError> {
        let owner = Self::resolve_caller(caller)?;

        let mut owner_account = match self.store.get(owner) {
            Some(account) => account,
            None => {
                log::warn!("Approve from unknown account {}", owner);
                return Ok(false);
            }
        };

        if owner_account.balance < amount {
            log::warn!(
                "Approval of {} exceeds balance {} of {}",
                amount,
                owner_account.balance,
                owner
            );
            return Ok(false);
        }

        owner_account.set_allowance(spender, amount);

        if spender != owner && !self.store.contains(spender) {
            self.store.insert(Account::new(spender));
        }
        self.store.insert(owner_account);

        self.record(LedgerEvent::new(EventKind::Approve, owner, owner, spender, amount));
        log::debug!("Approve {} -> {}: {}", owner, spender, amount);

        Ok(true)
    }

    /// Move `amount` from `from` to `to` on behalf of the caller, consuming allowance
    pub fn transfer_from(
        &mut self,
        caller: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<bool, LedgerError> {
        let spender = Self::resolve_caller(caller)?;

        if !self.store.contains(spender) {
            log::warn!("Delegated transfer by unknown spender {}", spender);
            return Ok(false);
        }

        let mut from_account = match self.delegated_debit(spender, from, amount) {
            Some(account) => account,
            None => return Ok(false),
        };

        if from == to {
            // Debit and credit cancel out; only the allowance changes
            from_account.balance += amount;
            self.store.insert(from_account);
        } else {
            let mut to_account = self.load_or_create(to);
            if !to_account.credit(amount) {
                log::warn!("Transfer of {} would overflow balance of {}", amount, to);
                return Ok(false);
            }

            self.store.insert(from_account);
            self.store.insert(to_account);
        }

        self.record(LedgerEvent::new(
            EventKind::TransferFrom,
            spender,
            from,
            to,
            amount,
        ));
        log::debug!("TransferFrom {} -> {} by {}: {}", from, to, spender, amount);

        Ok(true)
    }

    // =========================================================================
    // Supply management (admin only)
    // =========================================================================

    /// Create `amount` new units in an existing account
    pub fn mint(&mut self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        let caller = Self::resolve_caller(caller)?;
        self.require_admin(caller, "mint")?;
        self.require_account(caller)?;

        let mut to_account = match self.store.get(to) {
            Some(account) => account,
            None => {
                log::warn!("Mint to unknown account {}", to);
                return Ok(false);
            }
        };

        let new_supply = match self.info.total_supply.checked_add(amount) {
            Some(supply) => supply,
            None => {
                log::warn!("Mint of {} would overflow total supply", amount);
                return Ok(false);
            }
        };

        if !to_account.credit(amount) {
            log::warn!("Mint of {} would overflow balance of {}", amount, to);
            return Ok(false);
        }

        self.store.insert(to_account);
        self.info.total_supply = new_supply;

        self.record(LedgerEvent::new(EventKind::Mint, caller, BURN_ADDRESS, to, amount));
        log::info!("Minted {} to {} (supply {})", amount, to, new_supply);

        Ok(true)
    }

    /// Destroy `amount` units from `from`.
    ///
    /// `from` must have approved the caller for at least `amount`; the burn consumes
    /// that allowance like a delegated transfer to [`BURN_ADDRESS`].
    pub fn burn(&mut self, caller: &str, from: &str, amount: u64) -> Result<bool, LedgerError> {
        let caller = Self::resolve_caller(caller)?;
        self.require_admin(caller, "burn")?;
        self.require_account(caller)?;

        if self.allowance(from, caller) < amount {
            log::warn!(
                "Insufficient allowance to burn {} from {} by {}",
                amount,
                from,
                caller
            );
            return Ok(false);
        }

        if self.info.total_supply < amount {
            log::warn!(
                "Insufficient supply to burn {} (supply {})",
                amount,
                self.info.total_supply
            );
            return Ok(false);
        }

        let from_account = match self.delegated_debit(caller, from, amount) {
            Some(account) => account,
            None => return Ok(false),
        };

        self.store.insert(from_account);
        self.info.total_supply -= amount;

        self.record(LedgerEvent::new(EventKind::Burn, caller, from, BURN_ADDRESS, amount));
        log::info!(
            "Burned {} from {} (supply {})",
            amount,
            from,
            self.info.total_supply
        );

        Ok(true)
    }

    // =========================================================================
    // Admin management
    // =========================================================================

    /// Grant admin rights. Any existing admin may call this.
    pub fn add_admin(&mut self, caller: &str, address: &str) -> Result<bool, LedgerError> {
        let caller = Self::resolve_caller(caller)?;
        self.require_admin(caller, "add admins")?;

        self.admins.push(address);
        self.record(LedgerEvent::new(EventKind::AdminAdded, caller, caller, address, 0));
        log::info!("Admin {} added by {}", address, caller);

        Ok(true)
    }

    /// Revoke the first admin entry for `address`. Only the creator may call this.
    pub fn delete_admin(&mut self, caller: &str, address: &str) -> Result<bool, LedgerError> {
        let caller = Self::resolve_caller(caller)?;

        if self.info.creator != caller {
            log::warn!("Rejected admin removal by non-creator {}", caller);
            return Err(LedgerError::Unauthorized {
                caller: caller.to_string(),
                action: "remove admins",
            });
        }

        if self.admins.remove_first(address) {
            self.record(LedgerEvent::new(EventKind::AdminRemoved, caller, caller, address, 0));
            log::info!("Admin {} removed by {}", address, caller);
        }

        Ok(true)
    }
}
