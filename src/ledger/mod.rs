//! Fungible-token ledger
//!
//! Tracks per-address balances and allowances with:
//! - Direct and delegated (allowance-bounded) transfers
//! - Admin-gated mint and burn
//! - An admin set managed by existing admins and the token creator
//!
//! # Example
//!
//! ```
//! use token_ledger::ledger::Ledger;
//!
//! let mut ledger = Ledger::new();
//! ledger.initialize("alice", "Coin", "CN", 1000).unwrap();
//!
//! assert!(ledger.transfer("alice", "bob", 300).unwrap());
//! assert!(ledger.approve("alice", "carol", 100).unwrap());
//! assert!(ledger.transfer_from("carol", "alice", "dave", 60).unwrap());
//!
//! assert_eq!(ledger.balance_of("alice"), 640);
//! assert_eq!(ledger.allowance("alice", "carol"), 40);
//! ```

pub mod account;
pub mod admin;
pub mod engine;
pub mod service;
pub mod token;

pub use account::Account;
pub use admin::AdminSet;
pub use engine::{Ledger, LedgerSnapshot};
pub use service::SharedLedger;
pub use token::{EventKind, LedgerError, LedgerEvent, TokenInfo, BURN_ADDRESS, MAX_HISTORY};
