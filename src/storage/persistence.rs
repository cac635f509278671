//! Wallet persistence layer
//!
//! The wallet snapshot, the ledger and the outbox are saved together as one
//! JSON file in a data directory, so a transfer's nonce, debit and outbox
//! entry are committed by a single rename.

use crate::multisig::WalletState;
use crate::storage::ledger::{JsonLedger, Outbox};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
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

/// Everything the host keeps for one wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub wallet: WalletState,
    #[serde(default)]
    pub ledger: JsonLedger,
    #[serde(default)]
    pub outbox: Outbox,
}

impl HostSnapshot {
    /// Fresh wallet with an empty ledger and outbox
    pub fn new(wallet: WalletState) -> Self {
        Self {
            wallet,
            ledger: JsonLedger::new(),
            outbox: Outbox::new(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub wallet_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            wallet_file: "wallet.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Wallet storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn wallet_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.wallet_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.wallet_file, index))
    }

    /// Check if a saved wallet exists
    pub fn exists(&self) -> bool {
        self.wallet_path().exists()
    }

    /// Save the snapshot, keeping a backup of the previous one
    pub fn save(&self, snapshot: &HostSnapshot) -> Result<(), StorageError> {
        let path = self.wallet_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        write_json(&path, snapshot)
    }

    /// Load the snapshot
    pub fn load(&self) -> Result<HostSnapshot, StorageError> {
        let path = self.wallet_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Wallet file not found in {:?}; run `init` first",
                self.config.data_dir
            )));
        }
        read_json(&path)
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore the snapshot from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<HostSnapshot, StorageError> {
        let backup_path = self.backup_path(backup_index);
        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }
        read_json(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.wallet_path();
        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let temp_path = path.with_extension("tmp");
    {
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, value)?;
    }

    // Atomic rename
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::multisig::{BalanceLedger, SignerRegistry, Transfer, TransferBroadcaster};
    use chrono::Utc;

    fn storage(temp_dir: &tempfile::TempDir, max_backups: usize) -> Storage {
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        };
        Storage::new(config).unwrap()
    }

    fn sample_state() -> WalletState {
        let mut signers = SignerRegistry::new();
        for _ in 0..3 {
            let kp = KeyPair::generate();
            signers.add(kp.address(), kp.public_key()).unwrap();
        }
        WalletState {
            owner: KeyPair::generate().address(),
            required_signatures: 2,
            signers,
            nonce: 7,
        }
    }

    #[test]
    fn test_save_load_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(&temp_dir, 5);
        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));

        let snapshot = HostSnapshot::new(sample_state());
        storage.save(&snapshot).unwrap();
        assert!(storage.exists());
        assert_eq!(storage.load().unwrap(), snapshot);
    }

    #[test]
    fn test_ledger_and_outbox_saved_with_wallet() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(&temp_dir, 5);
        let mut snapshot = HostSnapshot::new(sample_state());
        let account = snapshot.wallet.owner;

        snapshot.ledger.credit(&account, 250).unwrap();
        snapshot.outbox.send(&Transfer {
            from: account,
            to: KeyPair::generate().address(),
            amount: 10,
            nonce: 0,
            executed_at: Utc::now(),
        });
        storage.save(&snapshot).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.ledger.balance(&account), 250);
        assert_eq!(loaded.outbox, snapshot.outbox);
        assert_eq!(loaded.wallet.nonce, 7);
    }

    #[test]
    fn test_missing_ledger_and_outbox_default_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(&temp_dir, 5);
        let wallet = sample_state();
        let json = serde_json::json!({ "wallet": wallet });
        fs::write(temp_dir.path().join("wallet.json"), json.to_string()).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.wallet, wallet);
        assert_eq!(loaded.ledger, JsonLedger::new());
        assert!(loaded.outbox.is_empty());
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(&temp_dir, 3);
        let mut snapshot = HostSnapshot::new(sample_state());

        for nonce in 0..5 {
            snapshot.wallet.nonce = nonce;
            storage.save(&snapshot).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        // Most recent backup is the save before the last one
        assert_eq!(storage.restore_backup(0).unwrap().wallet.nonce, 3);
        assert_eq!(storage.stats().unwrap().backup_count, 3);
    }
}
