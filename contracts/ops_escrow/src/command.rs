//! Serialisable commands and receipts.
//!
//! A [`Command`] names one mutating entry point with its arguments. Applying
//! the same sequence of `(caller, command)` pairs to a fresh registry with the
//! same config always reproduces the same state, which is what lets a host
//! rebuild the registry from an append-only command log.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::Event;
use crate::types::{decimal, Address, Amount, TokenId};
use crate::{Error, EscrowRegistry};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Credit {
        account: Address,
        #[serde(with = "decimal")]
        amount: Amount,
    },
    Mint {
        metadata_uri: String,
        #[serde(with = "decimal")]
        deposit: Amount,
    },
    Approve {
        to: Address,
        token_id: TokenId,
    },
    SetApprovalForAll {
        operator: Address,
        approved: bool,
    },
    TransferFrom {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    SafeTransferFrom {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    MakeSubmission {
        token_id: TokenId,
        content: String,
    },
    DeclareWinningSubmission {
        token_id: TokenId,
        submission_index: usize,
    },
    Redeem {
        token_id: TokenId,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Credit { .. } => "credit",
            Command::Mint { .. } => "mint",
            Command::Approve { .. } => "approve",
            Command::SetApprovalForAll { .. } => "set_approval_for_all",
            Command::TransferFrom { .. } => "transfer_from",
            Command::SafeTransferFrom { .. } => "safe_transfer_from",
            Command::MakeSubmission { .. } => "make_submission",
            Command::DeclareWinningSubmission { .. } => "declare_winning_submission",
            Command::Redeem { .. } => "redeem",
        }
    }
}

/// Return value of the entry point a command dispatched to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Output {
    Unit,
    TokenId(TokenId),
    SubmissionIndex(usize),
    Winner(Address),
    Payout(#[serde(with = "decimal")] Amount),
}

/// Outcome of one successfully applied command.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub output: Output,
    /// Events emitted by this command only, in emission order.
    pub events: Vec<Event>,
}

impl EscrowRegistry {
    /// Dispatch `command` on behalf of `caller`.
    ///
    /// The events the command emitted move out of the registry into the
    /// receipt, so a host applying commands keeps no event history in memory.
    pub fn apply(&mut self, caller: &Address, command: &Command) -> Result<Receipt, Error> {
        let first_event = self.events.len();

        let output = match command {
            Command::Credit { account, amount } => {
                self.credit(caller, account, *amount).map(|_| Output::Unit)
            }
            Command::Mint {
                metadata_uri,
                deposit,
            } => self.mint(caller, metadata_uri, *deposit).map(Output::TokenId),
            Command::Approve { to, token_id } => {
                self.approve(caller, to, *token_id).map(|_| Output::Unit)
            }
            Command::SetApprovalForAll { operator, approved } => self
                .set_approval_for_all(caller, operator, *approved)
                .map(|_| Output::Unit),
            Command::TransferFrom { from, to, token_id } => self
                .transfer_from(caller, from, to, *token_id)
                .map(|_| Output::Unit),
            Command::SafeTransferFrom { from, to, token_id } => self
                .safe_transfer_from(caller, from, to, *token_id)
                .map(|_| Output::Unit),
            Command::MakeSubmission { token_id, content } => self
                .make_submission(caller, *token_id, content)
                .map(Output::SubmissionIndex),
            Command::DeclareWinningSubmission {
                token_id,
                submission_index,
            } => self
                .declare_winning_submission(caller, *token_id, *submission_index)
                .map(Output::Winner),
            Command::Redeem { token_id } => self
                .redeem_eth_from_nft(caller, *token_id)
                .map(Output::Payout),
        };

        match output {
            Ok(output) => Ok(Receipt {
                output,
                events: self.events.split_off(first_event),
            }),
            Err(e) => {
                debug!(command = command.name(), caller = %caller, error = %e, "command rejected");
                Err(e)
            }
        }
    }
}
