//! Collaborators the wallet consumes but does not implement

use super::types::{Address, PublicKey, Transfer};
use thiserror::Error;

/// Errors reported by a balance ledger
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient funds: balance {balance}, debit {amount}")]
    InsufficientFunds { balance: i128, amount: u128 },
    #[error("Balance overflow for {0}")]
    Overflow(Address),
}

/// Account balances owned outside the wallet
pub trait BalanceLedger {
    /// Current balance. A negative value only ever signals upstream corruption.
    fn balance(&self, account: &Address) -> i128;

    /// Remove `amount` from `account`, failing with
    /// [`LedgerError::InsufficientFunds`] if it exceeds the balance
    fn debit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError>;
}

/// Cryptographic check of a single proof
pub trait SignatureVerifier {
    fn verify(&self, proof: &[u8], public_key: &PublicKey, message: &[u8]) -> bool;
}

/// Fire-and-forget delivery of an executed transfer
pub trait TransferBroadcaster {
    fn send(&mut self, transfer: &Transfer);
}
