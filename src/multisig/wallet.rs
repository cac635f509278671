//! Multi-signature wallet contract
//!
//! Composes the signer registry, the threshold policy and the external
//! ledger/verifier/broadcaster into the wallet's public operations.

use super::error::{MultisigError, Result};
use super::interfaces::{BalanceLedger, SignatureVerifier, TransferBroadcaster};
use super::policy::ThresholdPolicy;
use super::registry::SignerRegistry;
use super::types::{Address, PublicKey, SignatureSet, Transfer, TransferIntent};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Persistable snapshot of a wallet's own state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    /// Owner, also the account the wallet spends from
    pub owner: Address,
    pub required_signatures: u32,
    pub signers: SignerRegistry,
    /// Number of transfers executed so far
    pub nonce: u64,
}

/// An M-of-N wallet bound to its collaborators
pub struct WalletContract<L, V, B> {
    owner: Address,
    registry: SignerRegistry,
    policy: ThresholdPolicy,
    nonce: u64,
    ledger: L,
    verifier: V,
    broadcaster: B,
}

impl<L, V, B> WalletContract<L, V, B>
where
    L: BalanceLedger,
    V: SignatureVerifier,
    B: TransferBroadcaster,
{
    /// Create a wallet with no signers
    pub fn initialize(
        owner: Address,
        required_signatures: u32,
        ledger: L,
        verifier: V,
        broadcaster: B,
    ) -> Self {
        log::info!(
            "Initialized wallet {} requiring {} signature(s)",
            owner,
            required_signatures
        );

        Self {
            owner,
            registry: SignerRegistry::new(),
            policy: ThresholdPolicy::new(required_signatures),
            nonce: 0,
            ledger,
            verifier,
            broadcaster,
        }
    }

    /// Rebuild a wallet from a saved snapshot
    ///
    /// # Errors
    /// `CapacityExceeded` if the snapshot holds more signers than allowed.
    pub fn restore(state: WalletState, ledger: L, verifier: V, broadcaster: B) -> Result<Self> {
        let mut registry = SignerRegistry::new();
        for (signer, public_key) in state.signers.iter() {
            registry.add(*signer, *public_key)?;
        }

        Ok(Self {
            owner: state.owner,
            registry,
            policy: ThresholdPolicy::new(state.required_signatures),
            nonce: state.nonce,
            ledger,
            verifier,
            broadcaster,
        })
    }

    pub fn state(&self) -> WalletState {
        WalletState {
            owner: self.owner,
            required_signatures: self.policy.required(),
            signers: self.registry.clone(),
            nonce: self.nonce,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn required_signatures(&self) -> u32 {
        self.policy.required()
    }

    pub fn registry(&self) -> &SignerRegistry {
        &self.registry
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    /// Hand the collaborators back, e.g. to persist them
    pub fn into_parts(self) -> (WalletState, L, V, B) {
        let state = self.state();
        (state, self.ledger, self.verifier, self.broadcaster)
    }

    /// Description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.policy.required(), self.registry.len())
    }

    // =========================================================================
    // Transfer operations
    // =========================================================================

    fn account_balance(&self) -> Result<i128> {
        let balance = self.ledger.balance(&self.owner);
        if balance < 0 {
            log::error!(
                "Ledger returned negative balance {} for {}",
                balance,
                self.owner
            );
            return Err(MultisigError::NegativeBalanceInvariant {
                account: self.owner,
                balance,
            });
        }
        Ok(balance)
    }

    /// Whether the wallet account holds at least `amount`
    ///
    /// # Errors
    /// `NegativeBalanceInvariant` if the ledger reports a negative balance.
    pub fn has_sufficient_balance(&self, amount: u128) -> Result<bool> {
        let balance = self.account_balance()?;
        Ok(balance as u128 >= amount)
    }

    /// The message signers must sign to authorize this transfer next
    pub fn transfer_intent(&self, recipient: Address, amount: u128) -> TransferIntent {
        TransferIntent {
            wallet: self.owner,
            recipient,
            amount,
            nonce: self.nonce,
        }
    }

    /// Check `signatures` against the registry and threshold for `intent`
    pub fn verify_signatures(
        &self,
        intent: &TransferIntent,
        signatures: &SignatureSet,
    ) -> Result<bool> {
        self.policy.verify(
            signatures,
            &intent.signing_data(),
            &self.registry,
            &self.verifier,
        )
    }

    fn is_valid_recipient(&self, recipient: &Address) -> bool {
        !recipient.is_null() && *recipient != self.owner
    }

    /// Move `amount` to `recipient` if every gate passes
    ///
    /// Gates run in this order and the first failure aborts with nothing
    /// debited or broadcast:
    /// 1. balance sufficiency (`InsufficientBalance`)
    /// 2. signature verification (`InvalidSignatures`)
    /// 3. recipient validity (`InvalidRecipient`)
    /// 4. amount positivity (`InvalidAmount`)
    pub fn execute_transaction(
        &mut self,
        recipient: Address,
        amount: u128,
        signatures: &SignatureSet,
    ) -> Result<Transfer> {
        let balance = self.account_balance()?;
        if (balance as u128) < amount {
            log::warn!(
                "Rejected transfer of {} from {}: balance {}",
                amount,
                self.owner,
                balance
            );
            return Err(MultisigError::InsufficientBalance { balance, amount });
        }

        let intent = self.transfer_intent(recipient, amount);
        if !self.verify_signatures(&intent, signatures)? {
            log::warn!(
                "Rejected transfer of {} from {}: signatures do not meet {}",
                amount,
                self.owner,
                self.description()
            );
            return Err(MultisigError::InvalidSignatures);
        }

        if !self.is_valid_recipient(&recipient) {
            return Err(MultisigError::InvalidRecipient(recipient));
        }

        if amount == 0 {
            return Err(MultisigError::InvalidAmount);
        }

        self.ledger.debit(&self.owner, amount)?;

        let transfer = Transfer {
            from: self.owner,
            to: recipient,
            amount,
            nonce: self.nonce,
            executed_at: Utc::now(),
        };
        self.broadcaster.send(&transfer);
        self.nonce += 1;

        log::info!(
            "Transferred {} from {} to {} (nonce {})",
            amount,
            transfer.from,
            transfer.to,
            transfer.nonce
        );

        Ok(transfer)
    }

    // =========================================================================
    // Administration (owner only)
    // =========================================================================

    fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            log::warn!("Rejected administrative call from {}", caller);
            return Err(MultisigError::NotOwner(*caller));
        }
        Ok(())
    }

    pub fn add_authorized_signer(
        &mut self,
        caller: &Address,
        signer: Address,
        public_key: PublicKey,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.registry.add(signer, public_key)?;
        log::info!("Authorized signer {} ({})", signer, self.description());
        Ok(())
    }

    pub fn remove_authorized_signer(&mut self, caller: &Address, signer: &Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if self.registry.remove(signer).is_some() {
            log::info!("Removed signer {} ({})", signer, self.description());
            if !self.policy.is_reachable(&self.registry) {
                log::warn!(
                    "Wallet {} now requires more signatures than it has signers",
                    self.owner
                );
            }
        }
        Ok(())
    }

    pub fn update_required_signatures(
        &mut self,
        caller: &Address,
        required_signatures: u32,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.policy.set_required(required_signatures);
        if !self.policy.is_reachable(&self.registry) {
            log::warn!(
                "Wallet {} requires {} signatures but has only {} signers",
                self.owner,
                required_signatures,
                self.registry.len()
            );
        }
        Ok(())
    }
}
