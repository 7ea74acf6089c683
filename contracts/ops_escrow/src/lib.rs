//! # Ops Escrow Registry
//!
//! Root crate of the **Ops bounty escrow**. A creator posts a project by
//! depositing funds and metadata; the deposit sits in escrow under the
//! registry's custody. Workers submit deliverables, the owner declares a
//! winner, and the winner (now owner of the project record) redeems the
//! escrow, net of a royalty charged both at mint and at redemption.
//!
//! | Phase        | Entry Point(s)                                               |
//! |--------------|--------------------------------------------------------------|
//! | Bootstrap    | [`EscrowRegistry::new`], [`EscrowRegistry::credit`]          |
//! | Mint         | [`EscrowRegistry::mint`]                                     |
//! | Ownership    | `approve`, `set_approval_for_all`, `transfer_from`, `safe_transfer_from` |
//! | Submissions  | [`EscrowRegistry::make_submission`], [`EscrowRegistry::declare_winning_submission`] |
//! | Payout       | [`EscrowRegistry::redeem_eth_from_nft`]                      |
//! | Queries      | `token_details`, `royalty_info`, index lookups               |
//!
//! ## Architecture
//!
//! Authorization is fully delegated to [`auth`]. Storage access is fully
//! delegated to [`storage`]. Currency movements go through [`ledger`]. This
//! file contains the public entry points and event emissions.
//!
//! Every mutating entry point takes `&mut self`: the registry is a serial
//! state machine and callers sharing one instance must wrap it in a single
//! writer lock. Each call runs all checks and the payment batch before its
//! first write, so an `Err` always leaves the registry untouched.

use thiserror::Error;
use tracing::info;

pub mod auth;
pub mod command;
pub mod config;
pub mod events;
pub mod ledger;
pub mod royalty;
mod storage;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_mint;
#[cfg(test)]
mod test_redeem;

pub use auth::MintPolicy;
pub use command::{Command, Output, Receipt};
pub use config::RegistryConfig;
pub use events::Event;
pub use ledger::{Ledger, Payment};
pub use royalty::RoyaltyFraction;
pub use types::{Address, Amount, Project, ProjectStatus, Submission, TokenId};

use storage::Storage;

/// Failure classes callers can branch on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    TerminalState,
    Payment,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    #[error("invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("deposit {deposit} exceeds available balance {available}")]
    DepositExceedsBalance { deposit: Amount, available: Amount },

    #[error("metadata URI must not be empty")]
    EmptyMetadata,

    #[error("submission index {index} out of range for project {token_id}")]
    InvalidSubmissionIndex { token_id: TokenId, index: usize },

    #[error("the zero address is not a valid target")]
    ZeroAddress,

    #[error("project {token_id} is not owned by {from}")]
    IncorrectOwner { token_id: TokenId, from: Address },

    #[error("{0} cannot safely receive project records")]
    UnsafeRecipient(Address),

    #[error("invalid royalty fraction {numerator}/{denominator}")]
    InvalidRoyaltyFraction { numerator: u32, denominator: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} is not authorized for this operation")]
    NotAuthorized(Address),

    #[error("minting is restricted to the admin; {0} may not mint")]
    MintRestricted(Address),

    #[error("the custody account {0} cannot hold projects or external funds")]
    CustodyAccount(Address),

    #[error("the owner of project {token_id} cannot submit to it")]
    SelfSubmission { token_id: TokenId },

    #[error("approval to the current owner")]
    ApproveToOwner,

    #[error("operator approval for the caller itself")]
    ApproveToCaller,

    #[error("project {0} does not exist")]
    ProjectNotFound(TokenId),

    #[error("project {0} is closed")]
    ProjectClosed(TokenId),

    #[error("payment to {0} was rejected")]
    PaymentRejected(Address),

    #[error("insufficient funds in {account}: needed {needed}, available {available}")]
    InsufficientFunds {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAmount(_)
            | Error::DepositExceedsBalance { .. }
            | Error::EmptyMetadata
            | Error::InvalidSubmissionIndex { .. }
            | Error::ZeroAddress
            | Error::IncorrectOwner { .. }
            | Error::UnsafeRecipient(_)
            | Error::InvalidRoyaltyFraction { .. }
            | Error::InvalidConfig(_) => ErrorKind::Validation,
            Error::NotAuthorized(_)
            | Error::MintRestricted(_)
            | Error::CustodyAccount(_)
            | Error::SelfSubmission { .. }
            | Error::ApproveToOwner
            | Error::ApproveToCaller => ErrorKind::Authorization,
            Error::ProjectNotFound(_) => ErrorKind::NotFound,
            Error::ProjectClosed(_) => ErrorKind::TerminalState,
            Error::PaymentRejected(_)
            | Error::InsufficientFunds { .. }
            | Error::ArithmeticOverflow => ErrorKind::Payment,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EscrowRegistry {
    config: RegistryConfig,
    storage: Storage,
    ledger: Ledger,
    events: Vec<Event>,
}

impl EscrowRegistry {
    // ─────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────

    pub fn new(config: RegistryConfig) -> Result<Self, Error> {
        config.validate()?;
        info!(
            admin = %config.admin,
            contract = %config.contract_address,
            royalty_receiver = %config.royalty_receiver,
            mint_policy = ?config.mint_policy,
            "escrow registry initialised"
        );
        Ok(EscrowRegistry {
            config,
            storage: Storage::default(),
            ledger: Ledger::default(),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fund `account` from the external custody system. Admin only.
    pub fn credit(
        &mut self,
        caller: &Address,
        account: &Address,
        amount: Amount,
    ) -> Result<(), Error> {
        auth::require_admin(&self.config, caller)?;
        auth::require_not_custody(&self.config, account)?;
        self.ledger.credit(account, amount)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mark `account` as refusing payments. Any operation that would pay it
    /// fails and rolls back.
    pub fn block_recipient(&mut self, account: &Address) {
        info!(account = %account, "recipient blocked");
        self.ledger.block_recipient(account);
    }

    pub fn unblock_recipient(&mut self, account: &Address) {
        info!(account = %account, "recipient unblocked");
        self.ledger.unblock_recipient(account);
    }

    // ─────────────────────────────────────────────────────────
    // Mint
    // ─────────────────────────────────────────────────────────

    /// Create a project funded with `deposit` from the caller's balance.
    ///
    /// The mint-time royalty goes straight to the royalty receiver; the
    /// remainder is held by the contract address as the project's escrow.
    pub fn mint(
        &mut self,
        caller: &Address,
        metadata_uri: &str,
        deposit: Amount,
    ) -> Result<TokenId, Error> {
        auth::require_can_mint(&self.config, caller)?;
        auth::require_not_custody(&self.config, caller)?;
        if metadata_uri.is_empty() {
            return Err(Error::EmptyMetadata);
        }
        if deposit <= 0 {
            return Err(Error::InvalidAmount(deposit));
        }
        let available = self.ledger.balance(caller);
        if deposit > available {
            return Err(Error::DepositExceedsBalance { deposit, available });
        }

        let (royalty, escrowed) = self.config.royalty.split(deposit)?;
        self.ledger.transfer_batch(&[
            Payment::new(caller, &self.config.contract_address, escrowed),
            Payment::new(caller, &self.config.royalty_receiver, royalty),
        ])?;

        let id = self.storage.get_and_increment_project_id();
        let project = Project {
            id,
            owner: caller.clone(),
            creator: caller.clone(),
            metadata_uri: metadata_uri.to_string(),
            escrowed_amount: escrowed,
            status: ProjectStatus::New,
            submissions: Vec::new(),
            winning_submission: None,
            initialized: true,
        };
        self.storage.save_project(&project);

        self.events.push(Event::Transfer {
            from: Address::zero(),
            to: caller.clone(),
            token_id: id,
        });
        self.events.push(Event::RoyaltyPaid {
            receiver: self.config.royalty_receiver.clone(),
            amount: royalty,
        });
        self.events.push(Event::Created {
            creator: caller.clone(),
            token_id: id,
            uri: project.metadata_uri,
            escrow_value: escrowed,
        });

        info!(token_id = id, creator = %caller, deposit, escrowed, royalty, "project minted");
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────

    pub fn approve(
        &mut self,
        caller: &Address,
        to: &Address,
        token_id: TokenId,
    ) -> Result<(), Error> {
        let owner = self.storage.load_project_state(token_id)?.owner.clone();
        if *to == owner {
            return Err(Error::ApproveToOwner);
        }
        auth::require_owner_or_operator(&self.storage, &owner, caller)?;

        self.storage.set_approved(token_id, to);
        self.events.push(Event::Approval {
            owner,
            approved: to.clone(),
            token_id,
        });
        Ok(())
    }

    pub fn set_approval_for_all(
        &mut self,
        caller: &Address,
        operator: &Address,
        approved: bool,
    ) -> Result<(), Error> {
        if caller == operator {
            return Err(Error::ApproveToCaller);
        }
        self.storage.set_operator(caller, operator, approved);
        self.events.push(Event::ApprovalForAll {
            owner: caller.clone(),
            operator: operator.clone(),
            approved,
        });
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        token_id: TokenId,
    ) -> Result<(), Error> {
        self.check_transfer(caller, from, to, token_id)?;
        self.move_token(token_id, to)
    }

    /// Like [`transfer_from`](Self::transfer_from), but also refuses
    /// recipients the ledger marks as unable to receive.
    pub fn safe_transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        token_id: TokenId,
    ) -> Result<(), Error> {
        self.check_transfer(caller, from, to, token_id)?;
        if !self.ledger.accepts(to) {
            return Err(Error::UnsafeRecipient(to.clone()));
        }
        self.move_token(token_id, to)
    }

    fn check_transfer(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        token_id: TokenId,
    ) -> Result<(), Error> {
        let state = self.storage.load_project_state(token_id)?;
        auth::require_open(token_id, state)?;
        if to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        auth::require_not_custody(&self.config, to)?;
        if state.owner != *from {
            return Err(Error::IncorrectOwner {
                token_id,
                from: from.clone(),
            });
        }
        auth::require_owner_or_approved(&self.storage, token_id, caller)
    }

    /// Reassign ownership, clearing the single-token approval.
    fn move_token(&mut self, token_id: TokenId, to: &Address) -> Result<(), Error> {
        let from = self.storage.set_owner(token_id, to)?;
        self.events.push(Event::Approval {
            owner: from.clone(),
            approved: Address::zero(),
            token_id,
        });
        self.events.push(Event::Transfer {
            from: from.clone(),
            to: to.clone(),
            token_id,
        });
        info!(token_id, from = %from, to = %to, "project ownership transferred");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Submissions
    // ─────────────────────────────────────────────────────────

    /// Offer a deliverable for `token_id`. Returns the submission index.
    pub fn make_submission(
        &mut self,
        caller: &Address,
        token_id: TokenId,
        content: &str,
    ) -> Result<usize, Error> {
        let state = self.storage.load_project_state(token_id)?;
        auth::require_open(token_id, state)?;
        auth::require_not_owner(token_id, state, caller)?;
        auth::require_not_custody(&self.config, caller)?;
        let owner = state.owner.clone();

        let index = self.storage.record_submission(
            token_id,
            Submission {
                submitter: caller.clone(),
                content: content.to_string(),
            },
        )?;

        self.events.push(Event::SubmissionMade {
            submitter: caller.clone(),
            token_id,
            content: content.to_string(),
            owner,
        });
        info!(token_id, submitter = %caller, index, "submission recorded");
        Ok(index)
    }

    /// Pick submission `submission_index` as the winner and hand the project
    /// record to its submitter. The status is left as is so the winner can
    /// redeem. A later declaration on a still-open project replaces the
    /// earlier one.
    pub fn declare_winning_submission(
        &mut self,
        caller: &Address,
        token_id: TokenId,
        submission_index: usize,
    ) -> Result<Address, Error> {
        let state = self.storage.load_project_state(token_id)?;
        auth::require_open(token_id, state)?;
        auth::require_owner(&self.storage, token_id, caller)?;
        let winner = state
            .submissions
            .get(submission_index)
            .map(|s| s.submitter.clone())
            .ok_or(Error::InvalidSubmissionIndex {
                token_id,
                index: submission_index,
            })?;

        self.storage.set_winning_submission(token_id, submission_index)?;
        self.move_token(token_id, &winner)?;
        self.events.push(Event::WinnerDeclared {
            token_id,
            submission_index,
            winner: winner.clone(),
        });
        info!(token_id, submission_index, winner = %winner, "winning submission declared");
        Ok(winner)
    }

    // ─────────────────────────────────────────────────────────
    // Redemption
    // ─────────────────────────────────────────────────────────

    /// Pay out the escrow of `token_id` to its current owner.
    ///
    /// The royalty is charged again, on the current escrow. Returns the amount
    /// paid to the redeemer.
    pub fn redeem_eth_from_nft(
        &mut self,
        caller: &Address,
        token_id: TokenId,
    ) -> Result<Amount, Error> {
        let state = self.storage.load_project_state(token_id)?;
        auth::require_open(token_id, state)?;
        auth::require_owner(&self.storage, token_id, caller)?;

        let (royalty, payout) = self.config.royalty.split(state.escrowed_amount)?;
        self.ledger.transfer_batch(&[
            Payment::new(
                &self.config.contract_address,
                &self.config.royalty_receiver,
                royalty,
            ),
            Payment::new(&self.config.contract_address, caller, payout),
        ])?;
        self.storage.close_project(token_id, payout)?;

        self.events.push(Event::RoyaltyPaid {
            receiver: self.config.royalty_receiver.clone(),
            amount: royalty,
        });
        self.events.push(Event::Redeemed {
            redeemer: caller.clone(),
            amount: payout,
        });
        info!(token_id, redeemer = %caller, payout, royalty, "escrow redeemed");
        Ok(payout)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Royalty owed on `sale_amount`. Pure: any amount may be previewed, for
    /// any token id.
    pub fn royalty_info(
        &self,
        _token_id: TokenId,
        sale_amount: Amount,
    ) -> Result<(Address, Amount), Error> {
        let royalty = self.config.royalty.royalty_on(sale_amount)?;
        Ok((self.config.royalty_receiver.clone(), royalty))
    }

    pub fn token_details(&self, token_id: TokenId) -> Result<Project, Error> {
        self.storage.load_project(token_id)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, Error> {
        Ok(self.storage.load_project_state(token_id)?.owner.clone())
    }

    /// Number of project records held by `owner`.
    pub fn balance_of(&self, owner: &Address) -> Result<u64, Error> {
        if owner.is_zero() {
            return Err(Error::ZeroAddress);
        }
        Ok(self.storage.token_balance(owner))
    }

    pub fn get_approved(&self, token_id: TokenId) -> Result<Address, Error> {
        if !self.storage.exists(token_id) {
            return Err(Error::ProjectNotFound(token_id));
        }
        Ok(self.storage.approved(token_id))
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.storage.is_operator(owner, operator)
    }

    pub fn token_uri(&self, token_id: TokenId) -> Result<String, Error> {
        Ok(self.storage.load_project_config(token_id)?.metadata_uri.clone())
    }

    pub fn total_supply(&self) -> u64 {
        self.storage.project_count()
    }

    /// True once any project has been minted.
    pub fn initialized(&self) -> bool {
        self.storage.project_count() > 0
    }

    pub fn contract_address(&self) -> &Address {
        &self.config.contract_address
    }

    /// Creator of `token_id`, or the zero address if it was never minted.
    pub fn get_nft_creator(&self, token_id: TokenId) -> Address {
        self.storage
            .load_project_config(token_id)
            .map(|c| c.creator.clone())
            .unwrap_or_else(|_| Address::zero())
    }

    /// Escrow currently held for `token_id`; 0 if it was never minted.
    pub fn get_amount_stored_in_nft(&self, token_id: TokenId) -> Amount {
        self.storage
            .load_project_state(token_id)
            .map(|s| s.escrowed_amount)
            .unwrap_or(0)
    }

    pub fn get_array_of_nfts_from_creator(&self, creator: &Address) -> Vec<TokenId> {
        self.storage.projects_from_creator(creator)
    }

    pub fn get_number_of_open_nfts_from_creator(&self, creator: &Address) -> u64 {
        self.storage.open_projects_from_creator(creator)
    }

    pub fn get_submissions_for_token_id(
        &self,
        token_id: TokenId,
    ) -> Result<Vec<Submission>, Error> {
        Ok(self.storage.load_project_state(token_id)?.submissions.clone())
    }

    pub fn get_submissions_from_address_for_token_id(
        &self,
        submitter: &Address,
        token_id: TokenId,
    ) -> Vec<Submission> {
        self.storage.submissions_from(submitter, token_id)
    }

    pub fn get_token_ids_with_submissions_from_address(&self, submitter: &Address) -> Vec<TokenId> {
        self.storage.projects_with_submissions_from(submitter)
    }

    pub fn get_total_eth_paid_out(&self) -> Amount {
        self.storage.total_paid_out()
    }

    pub fn get_total_bounty_amount(&self) -> Amount {
        self.storage.total_escrowed()
    }

    /// Currency balance of `account` in the custody ledger.
    pub fn account_balance(&self, account: &Address) -> Amount {
        self.ledger.balance(account)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.storage.projects().collect()
    }

    // ─────────────────────────────────────────────────────────
    // Event log
    // ─────────────────────────────────────────────────────────

    /// Events emitted by direct entry-point calls and not yet taken.
    /// [`apply`](Self::apply) moves a command's events into its receipt, so
    /// they never accumulate here.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
