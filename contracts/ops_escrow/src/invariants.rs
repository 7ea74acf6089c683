#![allow(dead_code)]

use crate::types::{Amount, Project, ProjectStatus};
use crate::EscrowRegistry;

/// INV-1: Escrow is never negative, and a closed project holds nothing.
pub fn assert_escrow_consistent(project: &Project) {
    assert!(
        project.escrowed_amount >= 0,
        "INV-1 violated: project {} has negative escrow ({})",
        project.id,
        project.escrowed_amount
    );
    if project.status == ProjectStatus::Closed {
        assert_eq!(
            project.escrowed_amount, 0,
            "INV-1 violated: closed project {} still holds escrow",
            project.id
        );
    }
}

/// INV-2: A project with submissions has left `New`.
pub fn assert_status_matches_submissions(project: &Project) {
    if !project.submissions.is_empty() {
        assert_ne!(
            project.status,
            ProjectStatus::New,
            "INV-2 violated: project {} has submissions but is still New",
            project.id
        );
    }
}

/// INV-3: Only forward transitions are allowed:
///   New    -> Active | Closed
///   Active -> Closed
///   Closed -> (none)
pub fn assert_valid_status_transition(from: ProjectStatus, to: ProjectStatus) {
    let valid = (from == to && from != ProjectStatus::Closed)
        || matches!(
            (from, to),
            (ProjectStatus::New, ProjectStatus::Active)
                | (ProjectStatus::New, ProjectStatus::Closed)
                | (ProjectStatus::Active, ProjectStatus::Closed)
        );
    assert!(
        valid,
        "INV-3 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-4: Project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-4 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-5: Fields fixed at mint (id, creator, metadata) never change.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-5 violated: project id changed");
    assert_eq!(
        original.creator, current.creator,
        "INV-5 violated: project creator changed"
    );
    assert_eq!(
        original.metadata_uri, current.metadata_uri,
        "INV-5 violated: project metadata changed"
    );
}

/// INV-6: Submissions are append-only.
pub fn assert_submissions_extend(original: &Project, current: &Project) {
    assert!(
        current.submissions.starts_with(&original.submissions),
        "INV-6 violated: submissions of project {} were rewritten",
        current.id
    );
}

/// INV-7: Paid-out total never decreases.
pub fn assert_paid_out_monotonic(before: Amount, after: Amount) {
    assert!(
        after >= before,
        "INV-7 violated: total paid out decreased from {} to {}",
        before,
        after
    );
}

/// INV-8: Global counters agree with the project table, and the contract
/// address holds exactly the outstanding escrow.
pub fn assert_accounting_consistent(reg: &EscrowRegistry) {
    let projects = reg.projects();
    let escrowed: Amount = projects.iter().map(|p| p.escrowed_amount).sum();
    assert_eq!(
        reg.get_total_bounty_amount(),
        escrowed,
        "INV-8 violated: total bounty {} != sum of escrow {}",
        reg.get_total_bounty_amount(),
        escrowed
    );
    assert_eq!(
        reg.account_balance(reg.contract_address()),
        escrowed,
        "INV-8 violated: custody balance differs from outstanding escrow"
    );
    for project in &projects {
        let open = projects
            .iter()
            .filter(|p| p.creator == project.creator && p.status != ProjectStatus::Closed)
            .count() as u64;
        assert_eq!(
            reg.get_number_of_open_nfts_from_creator(&project.creator),
            open,
            "INV-8 violated: open count for {} drifted",
            project.creator
        );
    }
}

/// Run all stateless project invariants, plus the registry-wide accounting.
pub fn assert_all_invariants(reg: &EscrowRegistry) {
    let projects = reg.projects();
    assert_sequential_ids(&projects);
    for project in &projects {
        assert_escrow_consistent(project);
        assert_status_matches_submissions(project);
    }
    assert_accounting_consistent(reg);
}
