//! # Storage
//!
//! Typed helpers over the registry's tables. Nothing outside this module
//! touches the maps directly, so the derived indices can only change together
//! with the primary project records.
//!
//! ## Primary tables
//!
//! | Table       | Key        | Value           | Description                     |
//! |-------------|------------|-----------------|---------------------------------|
//! | `configs`   | `TokenId`  | `ProjectConfig` | Immutable project configuration |
//! | `states`    | `TokenId`  | `ProjectState`  | Mutable project state           |
//! | `approvals` | `TokenId`  | `Address`       | Single-token approval           |
//! | `operators` | `(owner, operator)` | —      | Blanket approvals               |
//!
//! ## Derived indices
//!
//! | Index                      | Key                   | Value               |
//! |----------------------------|-----------------------|---------------------|
//! | `creator_projects`         | creator               | ids, mint order     |
//! | `open_by_creator`          | creator               | count not `Closed`  |
//! | `submitter_projects`       | submitter             | ids, one per submit |
//! | `submissions_by_submitter` | `(submitter, id)`     | that pair's entries |
//! | `token_balances`           | owner                 | tokens held         |

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{
    Address, Amount, Project, ProjectConfig, ProjectState, ProjectStatus, Submission, TokenId,
};
use crate::Error;

#[derive(Clone, Debug, Default)]
pub struct Storage {
    project_count: u64,
    configs: BTreeMap<TokenId, ProjectConfig>,
    states: BTreeMap<TokenId, ProjectState>,
    approvals: HashMap<TokenId, Address>,
    operators: HashSet<(Address, Address)>,
    token_balances: HashMap<Address, u64>,
    creator_projects: HashMap<Address, Vec<TokenId>>,
    open_by_creator: HashMap<Address, u64>,
    submitter_projects: HashMap<Address, Vec<TokenId>>,
    submissions_by_submitter: HashMap<(Address, TokenId), Vec<Submission>>,
    total_escrowed: Amount,
    total_paid_out: Amount,
}

impl Storage {
    // ── Counters ─────────────────────────────────────────────────────

    /// Reads and increments the project counter.
    /// Returns the ID to use for the *current* project (pre-increment value).
    pub fn get_and_increment_project_id(&mut self) -> TokenId {
        let current = self.project_count;
        self.project_count += 1;
        current
    }

    pub fn project_count(&self) -> u64 {
        self.project_count
    }

    pub fn total_escrowed(&self) -> Amount {
        self.total_escrowed
    }

    pub fn total_paid_out(&self) -> Amount {
        self.total_paid_out
    }

    // ── Projects ─────────────────────────────────────────────────────

    /// Save both the immutable config and initial state for a new project,
    /// and register it in the creator and ownership indices.
    pub fn save_project(&mut self, project: &Project) {
        let config = ProjectConfig {
            id: project.id,
            creator: project.creator.clone(),
            metadata_uri: project.metadata_uri.clone(),
        };
        let state = ProjectState {
            owner: project.owner.clone(),
            escrowed_amount: project.escrowed_amount,
            status: project.status,
            submissions: project.submissions.clone(),
            winning_submission: project.winning_submission,
        };

        self.configs.insert(project.id, config);
        self.states.insert(project.id, state);

        self.creator_projects
            .entry(project.creator.clone())
            .or_default()
            .push(project.id);
        if project.status.is_open() {
            *self.open_by_creator.entry(project.creator.clone()).or_default() += 1;
        }
        *self.token_balances.entry(project.owner.clone()).or_default() += 1;
        self.total_escrowed += project.escrowed_amount;
    }

    pub fn exists(&self, id: TokenId) -> bool {
        self.configs.contains_key(&id)
    }

    /// Load the full `Project` by combining config and state.
    pub fn load_project(&self, id: TokenId) -> Result<Project, Error> {
        let config = self.load_project_config(id)?;
        let state = self.load_project_state(id)?;
        Ok(Project {
            id: config.id,
            owner: state.owner.clone(),
            creator: config.creator.clone(),
            metadata_uri: config.metadata_uri.clone(),
            escrowed_amount: state.escrowed_amount,
            status: state.status,
            submissions: state.submissions.clone(),
            winning_submission: state.winning_submission,
            initialized: true,
        })
    }

    pub fn load_project_config(&self, id: TokenId) -> Result<&ProjectConfig, Error> {
        self.configs.get(&id).ok_or(Error::ProjectNotFound(id))
    }

    pub fn load_project_state(&self, id: TokenId) -> Result<&ProjectState, Error> {
        self.states.get(&id).ok_or(Error::ProjectNotFound(id))
    }

    fn state_mut(&mut self, id: TokenId) -> Result<&mut ProjectState, Error> {
        self.states.get_mut(&id).ok_or(Error::ProjectNotFound(id))
    }

    // ── Ownership ────────────────────────────────────────────────────

    pub fn token_balance(&self, owner: &Address) -> u64 {
        self.token_balances.get(owner).copied().unwrap_or(0)
    }

    /// Move a token to `to`, clearing its single-token approval.
    /// Returns the previous owner.
    pub fn set_owner(&mut self, id: TokenId, to: &Address) -> Result<Address, Error> {
        let state = self.state_mut(id)?;
        let from = std::mem::replace(&mut state.owner, to.clone());

        if let Some(count) = self.token_balances.get_mut(&from) {
            *count = count.saturating_sub(1);
        }
        *self.token_balances.entry(to.clone()).or_default() += 1;
        self.approvals.remove(&id);
        Ok(from)
    }

    pub fn approved(&self, id: TokenId) -> Address {
        self.approvals.get(&id).cloned().unwrap_or_else(Address::zero)
    }

    pub fn set_approved(&mut self, id: TokenId, to: &Address) {
        if to.is_zero() {
            self.approvals.remove(&id);
        } else {
            self.approvals.insert(id, to.clone());
        }
    }

    pub fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operators.contains(&(owner.clone(), operator.clone()))
    }

    pub fn set_operator(&mut self, owner: &Address, operator: &Address, approved: bool) {
        let key = (owner.clone(), operator.clone());
        if approved {
            self.operators.insert(key);
        } else {
            self.operators.remove(&key);
        }
    }

    // ── Submissions ──────────────────────────────────────────────────

    /// Append a submission and update both submitter indices.
    /// Moves a `New` project to `Active`. Returns the submission index.
    pub fn record_submission(
        &mut self,
        id: TokenId,
        submission: Submission,
    ) -> Result<usize, Error> {
        let state = self.state_mut(id)?;
        state.submissions.push(submission.clone());
        if state.status == ProjectStatus::New {
            state.status = ProjectStatus::Active;
        }
        let index = state.submissions.len() - 1;

        self.submitter_projects
            .entry(submission.submitter.clone())
            .or_default()
            .push(id);
        self.submissions_by_submitter
            .entry((submission.submitter.clone(), id))
            .or_default()
            .push(submission);
        Ok(index)
    }

    pub fn set_winning_submission(&mut self, id: TokenId, index: usize) -> Result<(), Error> {
        self.state_mut(id)?.winning_submission = Some(index);
        Ok(())
    }

    // ── Redemption ───────────────────────────────────────────────────

    /// Zero the escrow, close the project and settle the global counters.
    pub fn close_project(&mut self, id: TokenId, paid_out: Amount) -> Result<(), Error> {
        let creator = self.load_project_config(id)?.creator.clone();
        let state = self.state_mut(id)?;
        let released = std::mem::take(&mut state.escrowed_amount);
        state.status = ProjectStatus::Closed;

        self.total_escrowed -= released;
        self.total_paid_out += paid_out;
        if let Some(open) = self.open_by_creator.get_mut(&creator) {
            *open = open.saturating_sub(1);
        }
        Ok(())
    }

    // ── Index lookups ────────────────────────────────────────────────

    pub fn projects_from_creator(&self, creator: &Address) -> Vec<TokenId> {
        self.creator_projects.get(creator).cloned().unwrap_or_default()
    }

    pub fn open_projects_from_creator(&self, creator: &Address) -> u64 {
        self.open_by_creator.get(creator).copied().unwrap_or(0)
    }

    pub fn projects_with_submissions_from(&self, submitter: &Address) -> Vec<TokenId> {
        self.submitter_projects.get(submitter).cloned().unwrap_or_default()
    }

    pub fn submissions_from(&self, submitter: &Address, id: TokenId) -> Vec<Submission> {
        self.submissions_by_submitter
            .get(&(submitter.clone(), id))
            .cloned()
            .unwrap_or_default()
    }

    /// All projects in id order.
    pub fn projects(&self) -> impl Iterator<Item = Project> + '_ {
        self.configs.keys().filter_map(|id| self.load_project(*id).ok())
    }
}
