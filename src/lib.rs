//! Multisig-Wallet: M-of-N multi-signature wallet logic in Rust
//!
//! This crate provides:
//! - A capacity-bounded registry of authorized signers
//! - Threshold verification of ordered signature sets (secp256k1 ECDSA)
//! - A wallet contract whose transfers pass balance, signature, recipient
//!   and amount gates before any funds move
//! - A mutex-guarded handle for hosts that dispatch calls concurrently
//! - JSON persistence and a CLI host
//!
//! # Example
//!
//! ```ignore
//! use multisig_wallet::crypto::{KeyPair, Secp256k1Verifier};
//! use multisig_wallet::multisig::{SignatureSet, WalletContract};
//! use multisig_wallet::storage::{JsonLedger, Outbox};
//!
//! let owner = KeyPair::generate().address();
//! let signer = KeyPair::generate();
//!
//! let mut ledger = JsonLedger::new();
//! ledger.credit(&owner, 1000)?;
//!
//! let mut wallet =
//!     WalletContract::initialize(owner, 1, ledger, Secp256k1Verifier::new(), Outbox::new());
//! wallet.add_authorized_signer(&owner, signer.address(), signer.public_key())?;
//!
//! let recipient = KeyPair::generate().address();
//! let intent = wallet.transfer_intent(recipient, 250);
//! let sigs = SignatureSet::new(vec![signer.sign_intent(&intent)?])?;
//! let transfer = wallet.execute_transaction(recipient, 250, &sigs)?;
//! println!("Sent {} to {}", transfer.amount, transfer.to);
//! ```

pub mod cli;
pub mod crypto;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use crypto::{KeyPair, Secp256k1Verifier};
pub use multisig::{
    Address, BalanceLedger, MultisigError, PublicKey, SharedWallet, Signature, SignatureSet,
    SignatureVerifier, SignerRegistry, ThresholdPolicy, Transfer, TransferBroadcaster,
    TransferIntent, WalletContract, WalletState,
};
pub use storage::{HostSnapshot, JsonLedger, Outbox, Storage, StorageConfig};
