//! REST API module
//!
//! Exposes the ledger over HTTP. The caller identity of every request is taken
//! from the `x-caller` header; the ledger trusts it as given.
//!
//! # Endpoints
//!
//! ## Token
//! - `GET /api/token` - Name, ticker, total supply and owner
//! - `POST /api/initialize` - Initialize the token
//!
//! ## Balances
//! - `GET /api/balances/{address}` - Balance of an address
//! - `GET /api/allowance?owner=&spender=` - Allowance lookup
//! - `GET /api/allowance/{owner}` - Allowance granted to the caller
//!
//! ## Transfers
//! - `POST /api/transfer` - Transfer from the caller
//! - `POST /api/approve` - Approve a spender
//! - `POST /api/transfer-from` - Delegated transfer
//!
//! ## Admin
//! - `POST /api/mint`, `POST /api/burn` - Supply changes
//! - `GET /api/admins`, `POST /api/admins`, `DELETE /api/admins/{address}`
//!
//! ## Inspection
//! - `GET /api/accounts` - All accounts
//! - `GET /api/history` - Recent events

pub mod handlers;
pub mod routes;

pub use handlers::{ApiState, CALLER_HEADER};
pub use routes::create_router;
