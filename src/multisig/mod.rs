//! Multi-signature wallet authorization and transfer logic
//!
//! A wallet holds a registry of authorized signers and a threshold M. A
//! transfer executes only when the wallet account can cover it and at least
//! M registered signers have signed the transfer intent.
//!
//! # Example
//!
//! ```ignore
//! use multisig_wallet::multisig::{SignatureSet, WalletContract};
//!
//! // 2-of-3 wallet
//! let mut wallet = WalletContract::initialize(owner, 2, ledger, verifier, broadcaster);
//! wallet.add_authorized_signer(&owner, alice.address(), alice.public_key())?;
//! wallet.add_authorized_signer(&owner, bob.address(), bob.public_key())?;
//! wallet.add_authorized_signer(&owner, carol.address(), carol.public_key())?;
//!
//! // Signers approve the intent for the next transfer
//! let intent = wallet.transfer_intent(recipient, 500);
//! let sigs = SignatureSet::new(vec![alice.sign_intent(&intent)?, bob.sign_intent(&intent)?])?;
//!
//! let transfer = wallet.execute_transaction(recipient, 500, &sigs)?;
//! ```

pub mod error;
pub mod interfaces;
pub mod policy;
pub mod registry;
pub mod shared;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{MultisigError, Result};
pub use interfaces::{BalanceLedger, LedgerError, SignatureVerifier, TransferBroadcaster};
pub use policy::ThresholdPolicy;
pub use registry::{SignerRegistry, SIGNER_CAPACITY};
pub use shared::SharedWallet;
pub use types::{
    Address, ParseError, PublicKey, Signature, SignatureSet, Transfer, TransferIntent,
    MAX_SIGNATURES,
};
pub use wallet::{WalletContract, WalletState};
