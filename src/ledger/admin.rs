//! Admin permission set
//!
//! Admins may mint, burn and add further admins. Only the token creator may remove one.

use serde::{Deserialize, Serialize};

/// Ordered list of admin addresses.
///
/// Entries are not deduplicated: adding an address twice requires two removals.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AdminSet {
    admins: Vec<String>,
}

impl AdminSet {
    pub fn new() -> Self {
        Self { admins: Vec::new() }
    }

    /// Check whether an address holds admin rights
    pub fn contains(&self, address: &str) -> bool {
        self.admins.iter().any(|a| a == address)
    }

    /// Append an address
    pub fn push(&mut self, address: &str) {
        self.admins.push(address.to_string());
    }

    /// Remove the first entry matching `address`.
    ///
    /// Returns whether an entry was removed.
    pub fn remove_first(&mut self, address: &str) -> bool {
        match self.admins.iter().position(|a| a == address) {
            Some(index) => {
                self.admins.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.admins
    }
}
