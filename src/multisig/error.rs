//! Errors raised by wallet operations

use super::interfaces::LedgerError;
use super::types::Address;
use thiserror::Error;

/// Every failure a wallet operation can end with
#[derive(Error, Debug)]
pub enum MultisigError {
    /// The ledger reported a negative balance, which it must never do
    #[error("Ledger invariant violated: account {account} has negative balance {balance}")]
    NegativeBalanceInvariant { account: Address, balance: i128 },
    #[error("Signer not authorized: {0}")]
    UnauthorizedSigner(Address),
    #[error("Signer appears more than once in the signature set: {0}")]
    DuplicateSigner(Address),
    #[error("Insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: i128, amount: u128 },
    #[error("Invalid signatures")]
    InvalidSignatures,
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Unknown signer: {0}")]
    UnknownSigner(Address),
    #[error("Signer registry is full ({capacity} signers)")]
    CapacityExceeded { capacity: usize },
    #[error("Too many signatures: {count} exceeds the maximum of {max}")]
    TooManySignatures { count: usize, max: usize },
    #[error("Caller is not the wallet owner: {0}")]
    NotOwner(Address),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Wallet lock poisoned by a panicking holder")]
    LockPoisoned,
}

impl MultisigError {
    /// True for conditions that signal corruption or misuse rather than an
    /// ordinary rejection the caller can retry with corrected inputs
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MultisigError::NegativeBalanceInvariant { .. }
                | MultisigError::UnauthorizedSigner(_)
                | MultisigError::DuplicateSigner(_)
                | MultisigError::LockPoisoned
        )
    }
}

/// Result alias for wallet operations
pub type Result<T> = std::result::Result<T, MultisigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let account = Address::from_bytes([7u8; 20]);
        assert!(MultisigError::NegativeBalanceInvariant {
            account,
            balance: -1
        }
        .is_fatal());
        assert!(MultisigError::UnauthorizedSigner(account).is_fatal());

        assert!(!MultisigError::InvalidSignatures.is_fatal());
        assert!(!MultisigError::InvalidAmount.is_fatal());
        assert!(!MultisigError::InsufficientBalance {
            balance: 1,
            amount: 2
        }
        .is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = MultisigError::InsufficientBalance {
            balance: 50,
            amount: 100,
        };
        assert_eq!(err.to_string(), "Insufficient balance: have 50, need 100");
    }
}
