//! File-backed balance ledger and transfer outbox used by the CLI host

use crate::multisig::{Address, BalanceLedger, LedgerError, Transfer, TransferBroadcaster};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account balances, saved with the wallet snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonLedger {
    balances: BTreeMap<Address, i128>,
}

impl JsonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add funds to an account
    pub fn credit(&mut self, account: &Address, amount: u128) -> Result<i128, LedgerError> {
        let amount = i128::try_from(amount).map_err(|_| LedgerError::Overflow(*account))?;
        let balance = self
            .balance(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*account))?;
        self.balances.insert(*account, balance);
        Ok(balance)
    }

    /// Accounts with a recorded balance
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &i128)> {
        self.balances.iter()
    }
}

impl BalanceLedger for JsonLedger {
    fn balance(&self, account: &Address) -> i128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance(account);
        if balance < 0 || (balance as u128) < amount {
            return Err(LedgerError::InsufficientFunds { balance, amount });
        }
        // amount <= balance <= i128::MAX here
        self.balances.insert(*account, balance - amount as i128);
        Ok(())
    }
}

/// Executed transfers awaiting pickup, saved with the wallet snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outbox {
    transfers: Vec<Transfer>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

impl TransferBroadcaster for Outbox {
    fn send(&mut self, transfer: &Transfer) {
        log::debug!("Queued transfer {} -> {} in outbox", transfer.from, transfer.to);
        self.transfers.push(transfer.clone());
    }
}
