//! CLI commands for the ledger
//!
//! Each command loads the ledger snapshot from the data directory, runs one
//! operation as the given caller and saves the result.

use crate::ledger::Ledger;
use crate::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub ledger: Ledger,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the ledger from the data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };

        let storage = Storage::new(storage_config)?;
        let ledger = storage.load_or_default()?;

        Ok(Self {
            ledger,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save_ledger(&self.ledger)?;
        Ok(())
    }
}

fn report(action: &str, success: bool) {
    if success {
        println!("✅ {} succeeded", action);
    } else {
        println!("❌ {} rejected (insufficient balance, allowance or unknown account)", action);
    }
}

/// Initialize the token
pub fn cmd_init(
    state: &mut AppState,
    caller: &str,
    name: &str,
    ticker: &str,
    supply: u64,
) -> CliResult<()> {
    if !state.ledger.owner().is_empty() {
        println!(
            "⚠️  Ledger already initialized by {}; re-initializing",
            state.ledger.owner()
        );
    }

    let creator = state.ledger.initialize(caller, name, ticker, supply)?;
    state.save()?;

    println!("✅ Token initialized!");
    println!("   📁 Data directory: {:?}", state.data_dir);
    println!("   🪙 {} ({})", name, ticker);
    println!("   💰 Supply: {}", supply);
    println!("   👤 Creator: {}", creator);

    Ok(())
}

/// Transfer from the caller
pub fn cmd_transfer(state: &mut AppState, caller: &str, to: &str, amount: u64) -> CliResult<()> {
    let success = state.ledger.transfer(caller, to, amount)?;
    if success {
        state.save()?;
    }

    report("Transfer", success);
    println!("   {} -> {}: {}", caller, to, amount);

    Ok(())
}

/// Approve a spender
pub fn cmd_approve(
    state: &mut AppState,
    caller: &str,
    spender: &str,
    amount: u64,
) -> CliResult<()> {
    let success = state.ledger.approve(caller, spender, amount)?;
    if success {
        state.save()?;
    }

    report("Approve", success);
    println!("   {} allows {} to spend {}", caller, spender, amount);

    Ok(())
}

/// Delegated transfer by the caller
pub fn cmd_transfer_from(
    state: &mut AppState,
    caller: &str,
    from: &str,
    to: &str,
    amount: u64,
) -> CliResult<()> {
    let success = state.ledger.transfer_from(caller, from, to, amount)?;
    if success {
        state.save()?;
    }

    report("Transfer from", success);
    println!("   {} -> {} by {}: {}", from, to, caller, amount);
    println!(
        "   Remaining allowance: {}",
        state.ledger.allowance(from, caller)
    );

    Ok(())
}

/// Mint new tokens
pub fn cmd_mint(state: &mut AppState, caller: &str, to: &str, amount: u64) -> CliResult<()> {
    let success = state.ledger.mint(caller, to, amount)?;
    if success {
        state.save()?;
    }

    report("Mint", success);
    println!("   Total supply: {}", state.ledger.total_supply());

    Ok(())
}

/// Burn approved tokens
pub fn cmd_burn(state: &mut AppState, caller: &str, from: &str, amount: u64) -> CliResult<()> {
    let success = state.ledger.burn(caller, from, amount)?;
    if success {
        state.save()?;
    }

    report("Burn", success);
    println!("   Total supply: {}", state.ledger.total_supply());

    Ok(())
}

/// Show a balance
pub fn cmd_balance(state: &AppState, address: &str) -> CliResult<()> {
    println!("💰 Balance for {}", address);
    println!(
        "   {} {}",
        state.ledger.balance_of(address),
        state.ledger.ticker()
    );
    Ok(())
}

/// Show an allowance
pub fn cmd_allowance(state: &AppState, owner: &str, spender: &str) -> CliResult<()> {
    println!("🔓 Allowance {} -> {}", owner, spender);
    println!("   {}", state.ledger.allowance(owner, spender));
    Ok(())
}

/// Display token info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let info = state.ledger.info();

    if info.creator.is_empty() {
        println!("📭 Ledger not initialized. Run: token-ledger init");
        return Ok(());
    }

    println!("🪙 Token Info");
    println!("   ├─ Name: {}", info.name);
    println!("   ├─ Ticker: {}", info.ticker);
    println!("   ├─ Total supply: {}", info.total_supply);
    println!("   ├─ Owner: {}", info.creator);
    println!("   ├─ Admins: {}", state.ledger.admins().len());
    println!("   └─ Accounts: {}", state.ledger.accounts().len());

    Ok(())
}

/// List all accounts
pub fn cmd_accounts(state: &AppState) -> CliResult<()> {
    let accounts = state.ledger.accounts();

    if accounts.is_empty() {
        println!("📭 No accounts yet.");
        return Ok(());
    }

    println!("📋 Accounts ({}):", accounts.len());
    for account in &accounts {
        println!("   {} - {}", account.address, account.balance);
        for (spender, amount) in &account.allowances {
            println!("   └─ {} may spend {}", spender, amount);
        }
    }

    Ok(())
}

/// Show recent events
pub fn cmd_history(state: &AppState, count: usize) -> CliResult<()> {
    let history = state.ledger.history();

    println!("📜 Recent events:");
    for event in history.iter().rev().take(count) {
        println!(
            "   {} | {:?} | {} -> {} | {} (by {})",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.kind,
            event.from,
            event.to,
            event.amount,
            event.caller
        );
    }

    Ok(())
}

/// Add an admin
pub fn cmd_admin_add(state: &mut AppState, caller: &str, address: &str) -> CliResult<()> {
    state.ledger.add_admin(caller, address)?;
    state.save()?;

    println!("✅ {} is now an admin", address);
    Ok(())
}

/// Remove an admin
pub fn cmd_admin_remove(state: &mut AppState, caller: &str, address: &str) -> CliResult<()> {
    state.ledger.delete_admin(caller, address)?;
    state.save()?;

    if state.ledger.is_admin(address) {
        println!("⚠️  Removed one entry; {} still holds admin rights", address);
    } else {
        println!("✅ {} is no longer an admin", address);
    }
    Ok(())
}

/// List admins
pub fn cmd_admin_list(state: &AppState) -> CliResult<()> {
    let admins = state.ledger.admins();

    if admins.is_empty() {
        println!("📭 No admins.");
        return Ok(());
    }

    println!("🛡️  Admins:");
    for admin in admins {
        println!("   {}", admin);
    }

    Ok(())
}

/// Export the ledger snapshot to a file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.ledger.snapshot(), path)?;
    println!("📦 Ledger exported to {:?}", path);
    Ok(())
}

/// Import a ledger snapshot from a file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let snapshot = crate::storage::load_from_file(path)?;
    state.ledger = Ledger::from_snapshot(snapshot);
    state.save()?;

    println!("📥 Ledger imported from {:?}", path);
    println!("   Accounts: {}", state.ledger.accounts().len());

    Ok(())
}

/// List saved backups, newest first
pub fn cmd_backups(state: &AppState) -> CliResult<()> {
    let backups = state.storage.list_backups();

    if backups.is_empty() {
        println!("📭 No backups.");
        return Ok(());
    }

    println!("🗄️  Backups (0 is newest):");
    for index in backups {
        let snapshot = state.storage.restore_backup(index)?;
        println!(
            "   [{}] supply {} - {} accounts",
            index,
            snapshot.info.total_supply,
            snapshot.accounts.len()
        );
    }

    Ok(())
}

/// Replace the saved ledger with a backup.
///
/// Does not load the current ledger file, so it also recovers from a corrupt one.
pub fn cmd_restore(data_dir: &Path, index: usize) -> CliResult<()> {
    let storage = Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?;

    let ledger: Ledger = Ledger::from_snapshot(storage.restore_backup(index)?);
    storage.save_ledger(&ledger)?;

    println!("♻️  Restored backup {}", index);
    println!("   Total supply: {}", ledger.total_supply());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_persist_between_states() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        let mut state = AppState::new(data_dir.clone()).unwrap();
        cmd_init(&mut state, "alice", "Coin", "CN", 1000).unwrap();
        cmd_transfer(&mut state, "alice", "bob", 300).unwrap();
        cmd_approve(&mut state, "bob", "alice", 100).unwrap();
        cmd_burn(&mut state, "alice", "bob", 50).unwrap();

        let state = AppState::new(data_dir).unwrap();
        assert_eq!(state.ledger.balance_of("alice"), 700);
        assert_eq!(state.ledger.balance_of("bob"), 250);
        assert_eq!(state.ledger.allowance("bob", "alice"), 50);
        assert_eq!(state.ledger.total_supply(), 950);
    }

    #[test]
    fn test_unauthorized_command_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(temp_dir.path().to_path_buf()).unwrap();
        cmd_init(&mut state, "alice", "Coin", "CN", 1000).unwrap();

        assert!(cmd_mint(&mut state, "bob", "alice", 10).is_err());
        assert!(cmd_admin_add(&mut state, "bob", "bob").is_err());
    }

    #[test]
    fn test_export_import_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let export_path = temp_dir.path().join("export.json");

        let mut source = AppState::new(temp_dir.path().join("a")).unwrap();
        cmd_init(&mut source, "alice", "Coin", "CN", 1000).unwrap();
        cmd_transfer(&mut source, "alice", "bob", 10).unwrap();
        cmd_export(&source, &export_path).unwrap();

        let mut target = AppState::new(temp_dir.path().join("b")).unwrap();
        cmd_import(&mut target, &export_path).unwrap();
        assert_eq!(target.ledger.balance_of("bob"), 10);
    }

    #[test]
    fn test_import_rejects_inconsistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let export_path = temp_dir.path().join("export.json");

        let mut source = AppState::new(temp_dir.path().join("a")).unwrap();
        cmd_init(&mut source, "alice", "Coin", "CN", 1000).unwrap();
        let mut snapshot = source.ledger.snapshot();
        snapshot.info.total_supply = 5;
        std::fs::write(&export_path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let mut target = AppState::new(temp_dir.path().join("b")).unwrap();
        assert!(cmd_import(&mut target, &export_path).is_err());
        assert_eq!(target.ledger.total_supply(), 0);
        assert!(!target.storage.exists());
    }

    #[test]
    fn test_restore_backup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        let mut state = AppState::new(data_dir.clone()).unwrap();
        cmd_init(&mut state, "alice", "Coin", "CN", 1000).unwrap();
        cmd_transfer(&mut state, "alice", "bob", 100).unwrap();
        cmd_transfer(&mut state, "alice", "bob", 100).unwrap();
        cmd_backups(&state).unwrap();

        // Backup 0 holds the state before the last transfer
        cmd_restore(&data_dir, 0).unwrap();

        let reopened = AppState::new(data_dir.clone()).unwrap();
        assert_eq!(reopened.ledger.balance_of("bob"), 100);
        assert_eq!(reopened.ledger.balance_of("alice"), 900);

        assert!(cmd_restore(&data_dir, 4).is_err());
    }

    #[test]
    fn test_restore_over_corrupt_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        let mut state = AppState::new(data_dir.clone()).unwrap();
        cmd_init(&mut state, "alice", "Coin", "CN", 1000).unwrap();
        cmd_transfer(&mut state, "alice", "bob", 100).unwrap();

        std::fs::write(data_dir.join("ledger.json"), "{ not json").unwrap();
        assert!(AppState::new(data_dir.clone()).is_err());

        cmd_restore(&data_dir, 0).unwrap();
        let reopened = AppState::new(data_dir).unwrap();
        assert_eq!(reopened.ledger.total_supply(), 1000);
        assert_eq!(reopened.ledger.balance_of("bob"), 0);
    }
}
