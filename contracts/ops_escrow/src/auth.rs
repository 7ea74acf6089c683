//! Capability checks.
//!
//! Every mutating entry point calls the relevant `require_*` helpers before it
//! changes anything. Each helper returns the tagged error for the first
//! failed check, so a rejected call never leaves partial writes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RegistryConfig;
use crate::storage::Storage;
use crate::types::{Address, ProjectState, TokenId};
use crate::Error;

/// Who may mint new projects.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MintPolicy {
    /// Only the registry admin.
    #[default]
    AdminOnly,
    /// Any funded account.
    Open,
}

pub fn require_can_mint(config: &RegistryConfig, caller: &Address) -> Result<(), Error> {
    match config.mint_policy {
        MintPolicy::Open => Ok(()),
        MintPolicy::AdminOnly if *caller == config.admin => Ok(()),
        MintPolicy::AdminOnly => {
            debug!(caller = %caller, "mint rejected: admin-gated");
            Err(Error::MintRestricted(caller.clone()))
        }
    }
}

pub fn require_admin(config: &RegistryConfig, caller: &Address) -> Result<(), Error> {
    if *caller != config.admin {
        return Err(Error::NotAuthorized(caller.clone()));
    }
    Ok(())
}

/// The custody account holds pooled escrow. It may not deposit, receive
/// credits, submit work or own a project.
pub fn require_not_custody(config: &RegistryConfig, account: &Address) -> Result<(), Error> {
    if *account == config.contract_address {
        debug!(account = %account, "rejected: custody account");
        return Err(Error::CustodyAccount(account.clone()));
    }
    Ok(())
}

/// The project must not be in its terminal state.
pub fn require_open(id: TokenId, state: &ProjectState) -> Result<(), Error> {
    if !state.status.is_open() {
        return Err(Error::ProjectClosed(id));
    }
    Ok(())
}

/// Caller must be the current project owner.
pub fn require_owner(store: &Storage, id: TokenId, caller: &Address) -> Result<(), Error> {
    let state = store.load_project_state(id)?;
    if state.owner != *caller {
        debug!(token_id = id, caller = %caller, "rejected: caller is not owner");
        return Err(Error::NotAuthorized(caller.clone()));
    }
    Ok(())
}

/// Caller must be `owner` itself or one of its blanket operators.
pub fn require_owner_or_operator(
    store: &Storage,
    owner: &Address,
    caller: &Address,
) -> Result<(), Error> {
    if caller == owner || store.is_operator(owner, caller) {
        return Ok(());
    }
    Err(Error::NotAuthorized(caller.clone()))
}

/// Caller must be the owner, the token's approved account, or an operator
/// for the owner.
pub fn require_owner_or_approved(
    store: &Storage,
    id: TokenId,
    caller: &Address,
) -> Result<(), Error> {
    let owner = &store.load_project_state(id)?.owner;
    if caller == owner || store.approved(id) == *caller || store.is_operator(owner, caller) {
        return Ok(());
    }
    debug!(token_id = id, caller = %caller, "rejected: not owner nor approved");
    Err(Error::NotAuthorized(caller.clone()))
}

/// Owners may not submit to their own project.
pub fn require_not_owner(id: TokenId, state: &ProjectState, caller: &Address) -> Result<(), Error> {
    if state.owner == *caller {
        return Err(Error::SelfSubmission { token_id: id });
    }
    Ok(())
}
