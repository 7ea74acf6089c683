//! Application configuration loaded from environment variables.

use ops_escrow::{Address, MintPolicy, RegistryConfig, RoyaltyFraction};

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Deployer / admin account of the registry
    pub admin: String,
    /// Account receiving mint-time and redemption royalties
    pub royalty_receiver: String,
    /// Custody account that holds escrowed funds
    pub contract_address: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    pub royalty_numerator: u32,
    pub royalty_denominator: u32,
    /// `admin` (only the admin mints) or `open`
    pub mint_policy: MintPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            admin: env_var("ADMIN_ADDRESS").map_err(|_| {
                ServiceError::Config("ADMIN_ADDRESS environment variable is required".to_string())
            })?,
            royalty_receiver: env_var("ROYALTY_ADDRESS").map_err(|_| {
                ServiceError::Config(
                    "ROYALTY_ADDRESS environment variable is required".to_string(),
                )
            })?,
            contract_address: env_var("CONTRACT_ADDRESS")
                .unwrap_or_else(|_| "ops-escrow-custody".to_string()),
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./ops_escrow.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ServiceError::Config("Invalid API_PORT".to_string()))?,
            royalty_numerator: env_var("ROYALTY_NUMERATOR")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| ServiceError::Config("Invalid ROYALTY_NUMERATOR".to_string()))?,
            royalty_denominator: env_var("ROYALTY_DENOMINATOR")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| ServiceError::Config("Invalid ROYALTY_DENOMINATOR".to_string()))?,
            mint_policy: parse_mint_policy(
                &env_var("MINT_POLICY").unwrap_or_else(|_| "admin".to_string()),
            )?,
        })
    }

    /// Build the registry configuration, validating the royalty fraction.
    pub fn registry_config(&self) -> Result<RegistryConfig> {
        let royalty = RoyaltyFraction::new(self.royalty_numerator, self.royalty_denominator)?;
        let config = RegistryConfig::new(
            Address::new(self.admin.clone()),
            Address::new(self.contract_address.clone()),
            Address::new(self.royalty_receiver.clone()),
        )
        .with_royalty(royalty)
        .with_mint_policy(self.mint_policy);
        config.validate()?;
        Ok(config)
    }
}

fn parse_mint_policy(raw: &str) -> Result<MintPolicy> {
    match raw.to_ascii_lowercase().as_str() {
        "admin" | "admin_only" => Ok(MintPolicy::AdminOnly),
        "open" => Ok(MintPolicy::Open),
        other => Err(ServiceError::Config(format!("Invalid MINT_POLICY: {other}"))),
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServiceError::Config(format!("Missing env var: {key}")))
}
