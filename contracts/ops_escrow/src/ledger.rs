//! Custody currency ledger.
//!
//! Plays the role of the chain's native balance table: the registry debits
//! depositors, holds escrow under its own contract address and pays the
//! royalty receiver and redeemers. Every payment goes through
//! [`Ledger::transfer_batch`], which validates all legs before touching any
//! balance.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::types::{Address, Amount};
use crate::Error;

/// One leg of a batch payment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payment {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl Payment {
    pub fn new(from: &Address, to: &Address, amount: Amount) -> Self {
        Payment {
            from: from.clone(),
            to: to.clone(),
            amount,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    balances: BTreeMap<Address, Amount>,
    blocked: HashSet<Address>,
}

impl Ledger {
    pub fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Fund an account from outside the registry.
    pub fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        if account.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let current = self.balance(account);
        let next = current.checked_add(amount).ok_or(Error::ArithmeticOverflow)?;
        self.balances.insert(account.clone(), next);
        debug!(account = %account, amount, balance = next, "ledger credited");
        Ok(())
    }

    /// Mark `account` as refusing incoming payments.
    pub fn block_recipient(&mut self, account: &Address) {
        self.blocked.insert(account.clone());
    }

    pub fn unblock_recipient(&mut self, account: &Address) {
        self.blocked.remove(account);
    }

    pub fn accepts(&self, account: &Address) -> bool {
        !account.is_zero() && !self.blocked.contains(account)
    }

    /// Apply every payment or none of them.
    ///
    /// Legs are checked in order against a working copy of the touched
    /// balances, so a later leg may spend funds an earlier leg delivered.
    /// Zero-amount legs are skipped.
    pub fn transfer_batch(&mut self, payments: &[Payment]) -> Result<(), Error> {
        let mut pending: BTreeMap<Address, Amount> = BTreeMap::new();

        for payment in payments.iter().filter(|p| p.amount != 0) {
            if payment.amount < 0 {
                return Err(Error::InvalidAmount(payment.amount));
            }
            if !self.accepts(&payment.to) {
                return Err(Error::PaymentRejected(payment.to.clone()));
            }

            let from_balance = *pending
                .entry(payment.from.clone())
                .or_insert_with(|| self.balance(&payment.from));
            if from_balance < payment.amount {
                return Err(Error::InsufficientFunds {
                    account: payment.from.clone(),
                    needed: payment.amount,
                    available: from_balance,
                });
            }
            pending.insert(payment.from.clone(), from_balance - payment.amount);

            let to_balance = *pending
                .entry(payment.to.clone())
                .or_insert_with(|| self.balance(&payment.to));
            let credited = to_balance
                .checked_add(payment.amount)
                .ok_or(Error::ArithmeticOverflow)?;
            pending.insert(payment.to.clone(), credited);
        }

        for (account, balance) in pending {
            self.balances.insert(account, balance);
        }
        Ok(())
    }
}
