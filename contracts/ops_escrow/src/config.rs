//! Registry configuration, fixed at construction.

use serde::{Deserialize, Serialize};

use crate::auth::MintPolicy;
use crate::royalty::RoyaltyFraction;
use crate::types::Address;
use crate::Error;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Deployer; the only minter under [`MintPolicy::AdminOnly`].
    pub admin: Address,
    /// Custody account that holds all escrow.
    pub contract_address: Address,
    pub royalty_receiver: Address,
    #[serde(default)]
    pub royalty: RoyaltyFraction,
    #[serde(default)]
    pub mint_policy: MintPolicy,
}

impl RegistryConfig {
    pub fn new(admin: Address, contract_address: Address, royalty_receiver: Address) -> Self {
        RegistryConfig {
            admin,
            contract_address,
            royalty_receiver,
            royalty: RoyaltyFraction::default(),
            mint_policy: MintPolicy::default(),
        }
    }

    pub fn with_royalty(mut self, royalty: RoyaltyFraction) -> Self {
        self.royalty = royalty;
        self
    }

    pub fn with_mint_policy(mut self, mint_policy: MintPolicy) -> Self {
        self.mint_policy = mint_policy;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.admin.is_zero() || self.contract_address.is_zero() || self.royalty_receiver.is_zero()
        {
            return Err(Error::ZeroAddress);
        }
        if self.admin == self.contract_address {
            return Err(Error::InvalidConfig(
                "admin must differ from the contract address".to_string(),
            ));
        }
        if self.contract_address == self.royalty_receiver {
            return Err(Error::InvalidConfig(
                "royalty receiver must differ from the contract address".to_string(),
            ));
        }
        RoyaltyFraction::new(self.royalty.numerator, self.royalty.denominator)?;
        Ok(())
    }
}
