//! Royalty arithmetic.
//!
//! The same fraction is charged twice: once on the deposit at mint time and
//! once on the remaining escrow at redemption, so a redeemer receives
//! `deposit * (1 - f)^2` (floored at each step).

use serde::{Deserialize, Serialize};

use crate::types::Amount;
use crate::Error;

/// Basis-point style denominator, matching the usual NFT royalty standard.
pub const DEFAULT_DENOMINATOR: u32 = 10_000;
/// 1 %.
pub const DEFAULT_NUMERATOR: u32 = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyFraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for RoyaltyFraction {
    fn default() -> Self {
        RoyaltyFraction {
            numerator: DEFAULT_NUMERATOR,
            denominator: DEFAULT_DENOMINATOR,
        }
    }
}

impl RoyaltyFraction {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, Error> {
        if denominator == 0 || numerator > denominator {
            return Err(Error::InvalidRoyaltyFraction {
                numerator,
                denominator,
            });
        }
        Ok(RoyaltyFraction {
            numerator,
            denominator,
        })
    }

    /// `floor(amount * numerator / denominator)`.
    ///
    /// Negative amounts are rejected; the query is otherwise defined for any
    /// amount so callers can preview fees off-line.
    pub fn royalty_on(&self, amount: Amount) -> Result<Amount, Error> {
        if amount < 0 {
            return Err(Error::InvalidAmount(amount));
        }
        amount
            .checked_mul(Amount::from(self.numerator))
            .map(|scaled| scaled / Amount::from(self.denominator))
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Splits `amount` into `(royalty, remainder)`.
    pub fn split(&self, amount: Amount) -> Result<(Amount, Amount), Error> {
        let royalty = self.royalty_on(amount)?;
        Ok((royalty, amount - royalty))
    }
}
