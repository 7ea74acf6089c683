//! # Types
//!
//! Shared data structures used across all modules of the escrow registry.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Project` is internally stored as two separate records:
//!
//! - [`ProjectConfig`] — written once at mint; never mutated.
//! - [`ProjectState`] — written on every transfer, submission and redemption.
//!
//! The public API exposes the reconstructed [`Project`] struct for convenience.
//!
//! ### Status as a Finite-State Machine
//!
//! [`ProjectStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! New ──► Active ──► Closed
//!  └─────────────────►┘
//! ```
//!
//! `Closed` is terminal: every mutating entry point rejects it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest currency unit. Signed so that negative requests can be rejected
/// explicitly instead of wrapping.
pub type Amount = i128;

/// Sequential project (token) identifier.
pub type TokenId = u64;

/// An opaque account identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Canonical burn / "no approval" address.
    pub const ZERO_STR: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn new(value: impl Into<String>) -> Self {
        Address(value.into())
    }

    pub fn zero() -> Self {
        Address(Self::ZERO_STR.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Self::ZERO_STR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address::new(value)
    }
}

/// Serde adapter writing an [`Amount`] as a decimal string.
///
/// Tagged enums buffer their fields before decoding, and that buffer cannot
/// hold integers wider than 64 bits. Reading also accepts plain JSON
/// numbers.
pub mod decimal {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer amount or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("amount {v} out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.parse()
                .map_err(|_| E::custom(format!("invalid decimal amount: {v:?}")))
        }
    }
}

/// Lifecycle status of a project.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Minted and funded; no submissions yet.
    New,
    /// At least one submission received.
    Active,
    /// Escrow redeemed. Terminal.
    Closed,
}

impl ProjectStatus {
    pub fn is_open(self) -> bool {
        self != ProjectStatus::Closed
    }
}

/// A candidate deliverable offered by a non-owner account.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submitter: Address,
    pub content: String,
}

/// Immutable project configuration, written once at mint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: TokenId,
    pub creator: Address,
    pub metadata_uri: String,
}

/// Mutable project state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub owner: Address,
    pub escrowed_amount: Amount,
    pub status: ProjectStatus,
    pub submissions: Vec<Submission>,
    pub winning_submission: Option<usize>,
}

/// Full representation of a bounty project.
///
/// Used as the public API return type; reconstructed internally from
/// the split `ProjectConfig` + `ProjectState` records.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Sequential identifier, never reused.
    pub id: TokenId,
    /// Current holder; changes on transfer or winner declaration.
    pub owner: Address,
    /// Account that funded the project.
    pub creator: Address,
    pub metadata_uri: String,
    /// Escrow held for this project, net of the mint-time royalty.
    pub escrowed_amount: Amount,
    pub status: ProjectStatus,
    /// Append-only, in arrival order. The index is the submission id.
    pub submissions: Vec<Submission>,
    pub winning_submission: Option<usize>,
    pub initialized: bool,
}
