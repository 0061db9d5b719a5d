//! Storage module: account store and snapshot persistence

pub mod persistence;
pub mod store;

pub use persistence::{load_from_file, save_to_file, Storage, StorageConfig, StorageError};
pub use store::{AccountStore, MemoryStore};
