//! Events emitted by the escrow registry.
//!
//! Every successful mutating entry point appends one or more events to the
//! registry's log, in the order the effects happened. A failed call emits
//! nothing.

use serde::{Deserialize, Serialize};

use crate::types::{decimal, Address, Amount, TokenId};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A project was minted. `escrow_value` is net of the mint-time royalty.
    Created {
        creator: Address,
        token_id: TokenId,
        uri: String,
        #[serde(with = "decimal")]
        escrow_value: Amount,
    },
    /// Ownership of a project record moved. `from` is the zero address on mint.
    Transfer {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    /// Single-token approval set or cleared (`approved` is the zero address).
    Approval {
        owner: Address,
        approved: Address,
        token_id: TokenId,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    SubmissionMade {
        submitter: Address,
        token_id: TokenId,
        content: String,
        owner: Address,
    },
    WinnerDeclared {
        token_id: TokenId,
        submission_index: usize,
        winner: Address,
    },
    RoyaltyPaid {
        receiver: Address,
        #[serde(with = "decimal")]
        amount: Amount,
    },
    Redeemed {
        redeemer: Address,
        #[serde(with = "decimal")]
        amount: Amount,
    },
}

impl Event {
    /// Short topic name, used as the event type when indexing.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::Created { .. } => "created",
            Event::Transfer { .. } => "transfer",
            Event::Approval { .. } => "approval",
            Event::ApprovalForAll { .. } => "approval_for_all",
            Event::SubmissionMade { .. } => "submission_made",
            Event::WinnerDeclared { .. } => "winner_declared",
            Event::RoyaltyPaid { .. } => "royalty_paid",
            Event::Redeemed { .. } => "redeemed",
        }
    }

    /// Project the event refers to, when it names one.
    pub fn token_id(&self) -> Option<TokenId> {
        match self {
            Event::Created { token_id, .. }
            | Event::Transfer { token_id, .. }
            | Event::Approval { token_id, .. }
            | Event::SubmissionMade { token_id, .. }
            | Event::WinnerDeclared { token_id, .. } => Some(*token_id),
            Event::ApprovalForAll { .. } | Event::RoyaltyPaid { .. } | Event::Redeemed { .. } => {
                None
            }
        }
    }

    /// The account that acted or benefited.
    pub fn actor(&self) -> &Address {
        match self {
            Event::Created { creator, .. } => creator,
            Event::Transfer { to, .. } => to,
            Event::Approval { owner, .. } | Event::ApprovalForAll { owner, .. } => owner,
            Event::SubmissionMade { submitter, .. } => submitter,
            Event::WinnerDeclared { winner, .. } => winner,
            Event::RoyaltyPaid { receiver, .. } => receiver,
            Event::Redeemed { redeemer, .. } => redeemer,
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            Event::Created { escrow_value, .. } => Some(*escrow_value),
            Event::RoyaltyPaid { amount, .. } | Event::Redeemed { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}
