//! Ledger persistence layer
//!
//! Saves and loads full ledger snapshots as JSON. Writes go to a temporary file that
//! is renamed over the previous snapshot, and older snapshots rotate into backups.

use crate::ledger::{Ledger, LedgerSnapshot};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ledger_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Ledger snapshot storage
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Save a snapshot to disk
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        check_supply(snapshot)?;
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.ledger_file));
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, snapshot)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Ledger snapshot saved to {:?}", path);

        Ok(())
    }

    /// Save the current state of a ledger
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<(), StorageError> {
        self.save(&ledger.snapshot())
    }

    /// Load the snapshot from disk
    pub fn load(&self) -> Result<LedgerSnapshot, StorageError> {
        let path = self.ledger_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Ledger file not found".to_string(),
            ));
        }

        read_snapshot(&path)
    }

    /// Load the saved ledger, or start an empty one if none exists
    pub fn load_or_default(&self) -> Result<Ledger, StorageError> {
        if self.exists() {
            Ok(Ledger::from_snapshot(self.load()?))
        } else {
            Ok(Ledger::new())
        }
    }

    /// Check if a saved ledger exists
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<LedgerSnapshot, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        read_snapshot(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

/// Save a snapshot to a specific file path
pub fn save_to_file(snapshot: &LedgerSnapshot, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Load a snapshot from a specific file path
pub fn load_from_file(path: &Path) -> Result<LedgerSnapshot, StorageError> {
    read_snapshot(path)
}

fn read_snapshot(path: &Path) -> Result<LedgerSnapshot, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;
    check_supply(&snapshot)?;
    Ok(snapshot)
}

/// Balances must sum to the recorded total supply
fn check_supply(snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
    let sum = snapshot
        .accounts
        .iter()
        .try_fold(0u64, |acc, a| acc.checked_add(a.balance))
        .ok_or_else(|| StorageError::InvalidData("Account balances overflow".to_string()))?;

    if sum != snapshot.info.total_supply {
        return Err(StorageError::InvalidData(format!(
            "Balances sum to {} but total supply is {}",
            sum, snapshot.info.total_supply
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage(dir: &Path, max_backups: usize) -> Storage {
        let config = StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        };
        Storage::new(config).unwrap()
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        let mut ledger = Ledger::new();
        ledger.initialize("alice", "Coin", "CN", 1000).unwrap();
        ledger.transfer("alice", "bob", 300).unwrap();
        ledger.approve("alice", "carol", 100).unwrap();

        storage.save_ledger(&ledger).unwrap();
        assert!(storage.exists());

        let loaded = storage.load_or_default().unwrap();
        assert_eq!(loaded.name(), "Coin");
        assert_eq!(loaded.total_supply(), 1000);
        assert_eq!(loaded.balance_of("bob"), 300);
        assert_eq!(loaded.allowance("alice", "carol"), 100);
        assert_eq!(loaded.admins(), &["alice".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 5);

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));

        let ledger = storage.load_or_default().unwrap();
        assert_eq!(ledger.total_supply(), 0);
        assert!(ledger.accounts().is_empty());
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 3);

        let mut ledger = Ledger::new();
        ledger.initialize("alice", "Coin", "CN", 1000).unwrap();

        for _ in 0..5 {
            storage.save_ledger(&ledger).unwrap();
            ledger.transfer("alice", "bob", 10).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);

        // Newest backup holds the state before the last save
        let backup = storage.restore_backup(0).unwrap();
        let restored: Ledger = Ledger::from_snapshot(backup);
        assert_eq!(restored.balance_of("bob"), 30);
    }

    #[test]
    fn test_rejects_corrupt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 3);

        fs::write(temp_dir.path().join("ledger.json"), "{ not json").unwrap();
        assert!(matches!(
            storage.load(),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_rejects_supply_mismatch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(temp_dir.path(), 3);

        let mut ledger = Ledger::new();
        ledger.initialize("alice", "Coin", "CN", 1000).unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.info.total_supply = 5;

        // Written around `save`, which refuses the same state
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        assert!(matches!(
            storage.load_or_default(),
            Err(StorageError::InvalidData(_))
        ));
        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::InvalidData(_))
        ));
        assert!(matches!(
            storage.save(&snapshot),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_export_import() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");

        let mut ledger = Ledger::new();
        ledger.initialize("alice", "Coin", "CN", 500).unwrap();

        save_to_file(&ledger.snapshot(), &path).unwrap();
        let snapshot = load_from_file(&path).unwrap();

        assert_eq!(snapshot.info.total_supply, 500);
        assert_eq!(snapshot.accounts.len(), 1);
    }
}
