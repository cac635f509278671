//! Storage module for wallet persistence

pub mod ledger;
pub mod persistence;

pub use ledger::{JsonLedger, Outbox};
pub use persistence::{HostSnapshot, Storage, StorageConfig, StorageError, StorageStats};
