//! Serialized access to a wallet shared between threads
//!
//! Each operation holds the wallet lock for its whole duration, so the
//! balance check and the debit inside `execute_transaction` cannot
//! interleave with another caller.

use super::error::{MultisigError, Result};
use super::interfaces::{BalanceLedger, SignatureVerifier, TransferBroadcaster};
use super::types::{Address, PublicKey, SignatureSet, Transfer, TransferIntent};
use super::wallet::{WalletContract, WalletState};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle; every clone refers to the same wallet
pub struct SharedWallet<L, V, B> {
    inner: Arc<Mutex<WalletContract<L, V, B>>>,
}

impl<L, V, B> Clone for SharedWallet<L, V, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, V, B> SharedWallet<L, V, B>
where
    L: BalanceLedger,
    V: SignatureVerifier,
    B: TransferBroadcaster,
{
    pub fn new(wallet: WalletContract<L, V, B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wallet)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletContract<L, V, B>>> {
        self.inner.lock().map_err(|_| MultisigError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the wallet
    pub fn with<T>(&self, f: impl FnOnce(&mut WalletContract<L, V, B>) -> T) -> Result<T> {
        let mut wallet = self.lock()?;
        Ok(f(&mut *wallet))
    }

    pub fn state(&self) -> Result<WalletState> {
        Ok(self.lock()?.state())
    }

    pub fn has_sufficient_balance(&self, amount: u128) -> Result<bool> {
        self.lock()?.has_sufficient_balance(amount)
    }

    pub fn transfer_intent(&self, recipient: Address, amount: u128) -> Result<TransferIntent> {
        Ok(self.lock()?.transfer_intent(recipient, amount))
    }

    pub fn verify_signatures(
        &self,
        intent: &TransferIntent,
        signatures: &SignatureSet,
    ) -> Result<bool> {
        self.lock()?.verify_signatures(intent, signatures)
    }

    pub fn execute_transaction(
        &self,
        recipient: Address,
        amount: u128,
        signatures: &SignatureSet,
    ) -> Result<Transfer> {
        self.lock()?.execute_transaction(recipient, amount, signatures)
    }

    pub fn add_authorized_signer(
        &self,
        caller: &Address,
        signer: Address,
        public_key: PublicKey,
    ) -> Result<()> {
        self.lock()?.add_authorized_signer(caller, signer, public_key)
    }

    pub fn remove_authorized_signer(&self, caller: &Address, signer: &Address) -> Result<()> {
        self.lock()?.remove_authorized_signer(caller, signer)
    }

    pub fn update_required_signatures(&self, caller: &Address, required: u32) -> Result<()> {
        self.lock()?.update_required_signatures(caller, required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, Secp256k1Verifier};
    use crate::multisig::testing::{MemoryLedger, RecordingBroadcaster};
    use std::thread;

    #[test]
    fn test_concurrent_transfers_cannot_double_spend() {
        let owner = KeyPair::generate().address();
        let signer = KeyPair::generate();
        let wallet = WalletContract::initialize(
            owner,
            1,
            MemoryLedger::with_balance(owner, 1000),
            Secp256k1Verifier::new(),
            RecordingBroadcaster::default(),
        );
        let shared = SharedWallet::new(wallet);
        shared
            .add_authorized_signer(&owner, signer.address(), signer.public_key())
            .unwrap();

        // Both callers sign against the same starting nonce
        let to = KeyPair::generate().address();
        let intent = shared.transfer_intent(to, 600).unwrap();
        let sigs = SignatureSet::new(vec![signer.sign_intent(&intent).unwrap()]).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let shared = shared.clone();
                let sigs = sigs.clone();
                thread::spawn(move || shared.execute_transaction(to, 600, &sigs))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(MultisigError::InsufficientBalance { balance: 400, .. }))));

        shared
            .with(|w| {
                assert_eq!(w.ledger().balance(&owner), 400);
                assert_eq!(w.broadcaster().sent.len(), 1);
            })
            .unwrap();
    }

    #[test]
    fn test_clones_share_state() {
        let owner = KeyPair::generate().address();
        let shared = SharedWallet::new(WalletContract::initialize(
            owner,
            2,
            MemoryLedger::default(),
            Secp256k1Verifier::new(),
            RecordingBroadcaster::default(),
        ));
        let other = shared.clone();

        other.update_required_signatures(&owner, 5).unwrap();
        assert_eq!(shared.state().unwrap().required_signatures, 5);
        assert!(!shared.has_sufficient_balance(1).unwrap());
    }
}
