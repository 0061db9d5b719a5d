//! Token Ledger: a fungible-token ledger implementation in Rust
//!
//! This crate provides:
//! - Per-address balances with lazy account creation
//! - Allowances for delegated transfers
//! - Admin-gated mint and burn with a creator-managed admin set
//! - Serialized shared access for multi-threaded hosts
//! - JSON snapshot persistence with backups
//! - REST API and CLI front ends
//!
//! # Example
//!
//! ```rust
//! use token_ledger::Ledger;
//!
//! let mut ledger = Ledger::new();
//! let creator = ledger.initialize("alice", "Coin", "CN", 1000).unwrap();
//!
//! // Transfer tokens
//! assert!(ledger.transfer(&creator, "bob", 300).unwrap());
//!
//! // Failed operations report `false` and change nothing
//! assert!(!ledger.transfer("bob", "carol", 301).unwrap());
//!
//! assert_eq!(ledger.balance_of("bob"), 300);
//! assert_eq!(ledger.total_supply(), 1000);
//! ```

pub mod api;
pub mod cli;
pub mod ledger;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use ledger::{
    Account, AdminSet, EventKind, Ledger, LedgerError, LedgerEvent, LedgerSnapshot,
    SharedLedger, TokenInfo, BURN_ADDRESS,
};
pub use storage::{AccountStore, MemoryStore, Storage, StorageConfig, StorageError};
