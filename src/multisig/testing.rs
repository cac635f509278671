//! Collaborator doubles shared by the wallet tests

use super::interfaces::{BalanceLedger, LedgerError, SignatureVerifier, TransferBroadcaster};
use super::types::{Address, PublicKey, Transfer};
use std::cell::Cell;
use std::collections::BTreeMap;

/// In-memory balances with a record of every debit
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    pub balances: BTreeMap<Address, i128>,
    pub debits: Vec<(Address, u128)>,
}

impl MemoryLedger {
    pub fn with_balance(account: Address, balance: i128) -> Self {
        let mut ledger = Self::default();
        ledger.balances.insert(account, balance);
        ledger
    }
}

impl BalanceLedger for MemoryLedger {
    fn balance(&self, account: &Address) -> i128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance(account);
        if balance < 0 || (balance as u128) < amount {
            return Err(LedgerError::InsufficientFunds { balance, amount });
        }
        self.balances.insert(*account, balance - amount as i128);
        self.debits.push((*account, amount));
        Ok(())
    }
}

/// Wraps a verifier and counts how often it is consulted
pub struct SpyVerifier<V> {
    pub inner: V,
    pub calls: Cell<usize>,
}

impl<V: SignatureVerifier> SpyVerifier<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<V: SignatureVerifier> SignatureVerifier for SpyVerifier<V> {
    fn verify(&self, proof: &[u8], public_key: &PublicKey, message: &[u8]) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.inner.verify(proof, public_key, message)
    }
}

/// Keeps every transfer it is asked to send
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    pub sent: Vec<Transfer>,
}

impl TransferBroadcaster for RecordingBroadcaster {
    fn send(&mut self, transfer: &Transfer) {
        self.sent.push(transfer.clone());
    }
}
