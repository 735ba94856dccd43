use jiff::Timestamp;
use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::{
        lifecycle::{LifecycleState, TransitionError, attempt_transition},
        project::{ApprovalStatus, Budget, Category, EditRequestStatus, Project},
        store::Store,
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreateProjectError {
    #[error("Invalid start date '{0}': {1}")]
    InvalidStartDate(String, String),

    #[error("Budget amounts must be non-negative (got {0})")]
    NegativeBudget(f64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateProjectParameters {
    pub name: String,
    pub category: Category,
    pub start_date: String,
    pub planned_budget: Option<f64>,
    pub manager: Option<String>,
    pub created_by: String,
}

pub fn create_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateProjectParameters,
) -> Result<Project, CreateProjectError> {
    let start_date = parameters
        .start_date
        .parse::<Date>()
        .map_err(|e| {
            CreateProjectError::InvalidStartDate(parameters.start_date.clone(), e.to_string())
        })?;

    let planned = parameters.planned_budget.unwrap_or(0.0);
    if planned < 0.0 {
        return Err(CreateProjectError::NegativeBudget(planned));
    }

    let now = Timestamp::now();
    let project = Project {
        name: parameters.name,
        category: parameters.category,
        start_date,
        budget: Budget {
            planned,
            ..Budget::default()
        },
        manager: parameters.manager,
        created_by: parameters.created_by,
        created_at: now,
        updated_at: now,
        ..Project::default()
    };

    let created = store.add_project(project).clone();

    storage.save(store)?;

    Ok(created)
}

#[derive(Debug, Error)]
pub enum SubmitProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project in state '{0}' is not eligible for submission without an edit request")]
    NotEligibleForSubmission(LifecycleState),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct SubmitProjectParameters {
    pub code: String,
    pub submitted_by: String,
}

/// Sends a project into the approval queue. A freshly created project
/// qualifies directly; a decided one only after an edit request.
pub fn submit_for_approval(
    store: &mut Store,
    storage: &impl Storage,
    parameters: SubmitProjectParameters,
) -> Result<Project, SubmitProjectError> {
    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| SubmitProjectError::ProjectNotFound(parameters.code.clone()))?;

    let state = LifecycleState::of(project)?;
    let reopened = project.edit_request_status == EditRequestStatus::EditRequested;

    if state != LifecycleState::Draft && !reopened {
        return Err(SubmitProjectError::NotEligibleForSubmission(state));
    }

    let now = Timestamp::now();
    if state == LifecycleState::Draft {
        attempt_transition(project, LifecycleState::PendingApproval, now)?;
    } else {
        // Resubmission after an edit request re-enters the approval queue
        // from outside the board's transition table.
        let (approval, execution) = LifecycleState::PendingApproval.statuses();
        project.approval_status = approval;
        project.execution_status = execution;
        project.updated_at = now;
    }

    project.edit_request_status = EditRequestStatus::None;
    project.submitted_by = Some(parameters.submitted_by);
    project.submitted_at = Some(now);

    let submitted = project.clone();

    storage.save(store)?;

    Ok(submitted)
}

#[derive(Debug, Error)]
pub enum ApproveProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project in state '{0}' is not pending approval")]
    NotPendingApproval(LifecycleState),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct ApproveProjectParameters {
    pub code: String,
    pub decided_by: String,
    pub notes: Option<String>,
}

pub fn approve_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: ApproveProjectParameters,
) -> Result<Project, ApproveProjectError> {
    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| ApproveProjectError::ProjectNotFound(parameters.code.clone()))?;

    let state = LifecycleState::of(project)?;
    if state != LifecycleState::PendingApproval {
        return Err(ApproveProjectError::NotPendingApproval(state));
    }

    let now = Timestamp::now();
    attempt_transition(project, LifecycleState::Approved, now)?;

    project.decided_by = Some(parameters.decided_by);
    project.decided_at = Some(now);
    project.decision_notes = parameters.notes;

    let approved = project.clone();

    storage.save(store)?;

    Ok(approved)
}

#[derive(Debug, Error)]
pub enum RejectProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project in state '{0}' is not pending approval")]
    NotPendingApproval(LifecycleState),

    #[error("A rejection reason is required")]
    MissingReason,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct RejectProjectParameters {
    pub code: String,
    pub decided_by: String,
    pub reason: String,
}

pub fn reject_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: RejectProjectParameters,
) -> Result<Project, RejectProjectError> {
    if parameters.reason.trim().is_empty() {
        return Err(RejectProjectError::MissingReason);
    }

    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| RejectProjectError::ProjectNotFound(parameters.code.clone()))?;

    let state = LifecycleState::of(project)?;
    if state != LifecycleState::PendingApproval {
        return Err(RejectProjectError::NotPendingApproval(state));
    }

    let now = Timestamp::now();
    attempt_transition(project, LifecycleState::Rejected, now)?;

    project.decided_by = Some(parameters.decided_by);
    project.decided_at = Some(now);
    project.rejection_reason = Some(parameters.reason);

    let rejected = project.clone();

    storage.save(store)?;

    Ok(rejected)
}

#[derive(Debug, Error)]
pub enum SuspendProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project in state '{0}' cannot be suspended")]
    NotSuspendable(LifecycleState),

    #[error("A suspension reason is required")]
    MissingReason,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct SuspendProjectParameters {
    pub code: String,
    pub reason: String,
}

/// Suspends an approved project. Unlike the board's transition table this
/// also covers a project whose execution has not started yet.
pub fn suspend_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: SuspendProjectParameters,
) -> Result<Project, SuspendProjectError> {
    if parameters.reason.trim().is_empty() {
        return Err(SuspendProjectError::MissingReason);
    }

    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| SuspendProjectError::ProjectNotFound(parameters.code.clone()))?;

    let state = LifecycleState::of(project)?;
    let now = Timestamp::now();

    match state {
        LifecycleState::InProgress => {
            attempt_transition(project, LifecycleState::Suspended, now)?;
        }
        LifecycleState::Approved => {
            let (approval, execution) = LifecycleState::Suspended.statuses();
            project.approval_status = approval;
            project.execution_status = execution;
            project.updated_at = now;
        }
        other => return Err(SuspendProjectError::NotSuspendable(other)),
    }

    project.suspension_reason = Some(parameters.reason);

    let suspended = project.clone();

    storage.save(store)?;

    Ok(suspended)
}

#[derive(Debug, Error)]
pub enum DeleteProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project with approval status '{0:?}' cannot be deleted")]
    NotDeletable(ApprovalStatus),

    #[error("A deletion reason is required")]
    MissingReason,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteProjectParameters {
    pub code: String,
    pub reason: String,
}

/// Soft delete: the project keeps its record and code, flagged as deleted.
/// Approved projects (whatever their execution status) are protected.
pub fn delete_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteProjectParameters,
) -> Result<Project, DeleteProjectError> {
    if parameters.reason.trim().is_empty() {
        return Err(DeleteProjectError::MissingReason);
    }

    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| DeleteProjectError::ProjectNotFound(parameters.code.clone()))?;

    match project.approval_status {
        ApprovalStatus::Initialized | ApprovalStatus::PendingApproval | ApprovalStatus::Rejected => {}
        other => return Err(DeleteProjectError::NotDeletable(other)),
    }

    let now = Timestamp::now();
    project.approval_status = ApprovalStatus::Deleted;
    project.deletion_reason = Some(parameters.reason);
    project.deleted_at = Some(now);
    project.updated_at = now;

    let deleted = project.clone();

    storage.save(store)?;

    Ok(deleted)
}

#[derive(Debug, Error)]
pub enum RequestEditError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Only approved or rejected projects can be reopened for editing (state is '{0}')")]
    NotEditRequestable(LifecycleState),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct RequestEditParameters {
    pub code: String,
}

pub fn request_edit(
    store: &mut Store,
    storage: &impl Storage,
    parameters: RequestEditParameters,
) -> Result<Project, RequestEditError> {
    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| RequestEditError::ProjectNotFound(parameters.code.clone()))?;

    let state = LifecycleState::of(project)?;
    if !matches!(state, LifecycleState::Approved | LifecycleState::Rejected) {
        return Err(RequestEditError::NotEditRequestable(state));
    }

    project.edit_request_status = EditRequestStatus::EditRequested;
    project.updated_at = Timestamp::now();

    let reopened = project.clone();

    storage.save(store)?;

    Ok(reopened)
}

#[derive(Debug, Error)]
pub enum MoveProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct MoveProjectParameters {
    pub code: String,
    pub target: LifecycleState,
}

/// The generic board move: a straight lookup in the transition table.
/// Illegal moves are reported, never silently dropped.
pub fn move_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: MoveProjectParameters,
) -> Result<Project, MoveProjectError> {
    let project = store
        .get_project_by_code_mut(&parameters.code)
        .ok_or_else(|| MoveProjectError::ProjectNotFound(parameters.code.clone()))?;

    attempt_transition(project, parameters.target, Timestamp::now())?;

    let moved = project.clone();

    storage.save(store)?;

    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullStorage;

    fn created_project(store: &mut Store) -> String {
        let project = create_project(
            store,
            &NullStorage,
            CreateProjectParameters {
                name: String::from("District archive digitization"),
                category: Category::Investment,
                start_date: String::from("2025-06-01"),
                planned_budget: Some(500_000.0),
                manager: None,
                created_by: String::from("alice"),
            },
        )
        .unwrap();
        project.code
    }

    fn approved_project(store: &mut Store) -> String {
        let code = created_project(store);
        submit_for_approval(
            store,
            &NullStorage,
            SubmitProjectParameters {
                code: code.clone(),
                submitted_by: String::from("alice"),
            },
        )
        .unwrap();
        approve_project(
            store,
            &NullStorage,
            ApproveProjectParameters {
                code: code.clone(),
                decided_by: String::from("Jane"),
                notes: None,
            },
        )
        .unwrap();
        code
    }

    #[test]
    fn test_create_assigns_sequential_codes() {
        let mut store = Store::default();
        let first = created_project(&mut store);
        let second = created_project(&mut store);

        assert_eq!(first, "INV-2025-001");
        assert_eq!(second, "INV-2025-002");
    }

    #[test]
    fn test_create_rejects_invalid_start_date() {
        let mut store = Store::default();
        let result = create_project(
            &mut store,
            &NullStorage,
            CreateProjectParameters {
                name: String::from("Broken"),
                category: Category::Service,
                start_date: String::from("not-a-date"),
                planned_budget: None,
                manager: None,
                created_by: String::from("alice"),
            },
        );

        assert!(matches!(
            result,
            Err(CreateProjectError::InvalidStartDate(_, _))
        ));
        assert!(store.projects.is_empty());
    }

    #[test]
    fn test_submit_then_approve_then_approve_again_fails() {
        let mut store = Store::default();
        let code = created_project(&mut store);

        submit_for_approval(
            &mut store,
            &NullStorage,
            SubmitProjectParameters {
                code: code.clone(),
                submitted_by: String::from("alice"),
            },
        )
        .unwrap();

        let approved = approve_project(
            &mut store,
            &NullStorage,
            ApproveProjectParameters {
                code: code.clone(),
                decided_by: String::from("Jane"),
                notes: None,
            },
        )
        .unwrap();

        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert_eq!(approved.decided_by.as_deref(), Some("Jane"));

        let again = approve_project(
            &mut store,
            &NullStorage,
            ApproveProjectParameters {
                code,
                decided_by: String::from("Jane"),
                notes: None,
            },
        );
        assert!(matches!(
            again,
            Err(ApproveProjectError::NotPendingApproval(
                LifecycleState::Approved
            ))
        ));
    }

    #[test]
    fn test_submit_requires_draft_or_edit_request() {
        let mut store = Store::default();
        let code = approved_project(&mut store);

        let blocked = submit_for_approval(
            &mut store,
            &NullStorage,
            SubmitProjectParameters {
                code: code.clone(),
                submitted_by: String::from("alice"),
            },
        );
        assert!(matches!(
            blocked,
            Err(SubmitProjectError::NotEligibleForSubmission(_))
        ));

        request_edit(
            &mut store,
            &NullStorage,
            RequestEditParameters { code: code.clone() },
        )
        .unwrap();

        let resubmitted = submit_for_approval(
            &mut store,
            &NullStorage,
            SubmitProjectParameters {
                code,
                submitted_by: String::from("alice"),
            },
        )
        .unwrap();

        assert_eq!(
            resubmitted.approval_status,
            ApprovalStatus::PendingApproval
        );
        assert_eq!(resubmitted.edit_request_status, EditRequestStatus::None);
    }

    #[test]
    fn test_reject_requires_a_reason() {
        let mut store = Store::default();
        let code = created_project(&mut store);
        submit_for_approval(
            &mut store,
            &NullStorage,
            SubmitProjectParameters {
                code: code.clone(),
                submitted_by: String::from("alice"),
            },
        )
        .unwrap();

        let blank = reject_project(
            &mut store,
            &NullStorage,
            RejectProjectParameters {
                code: code.clone(),
                decided_by: String::from("Jane"),
                reason: String::from("   "),
            },
        );
        assert!(matches!(blank, Err(RejectProjectError::MissingReason)));

        let rejected = reject_project(
            &mut store,
            &NullStorage,
            RejectProjectParameters {
                code,
                decided_by: String::from("Jane"),
                reason: String::from("Budget source not identified"),
            },
        )
        .unwrap();
        assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Budget source not identified")
        );
    }

    #[test]
    fn test_suspend_covers_not_started_and_in_progress() {
        use crate::models::project::ExecutionStatus;

        let mut store = Store::default();

        // Approved but not started
        let code = approved_project(&mut store);
        let suspended = suspend_project(
            &mut store,
            &NullStorage,
            SuspendProjectParameters {
                code,
                reason: String::from("Funding paused"),
            },
        )
        .unwrap();
        assert_eq!(suspended.execution_status, ExecutionStatus::Suspended);

        // Approved and in progress
        let code = approved_project(&mut store);
        move_project(
            &mut store,
            &NullStorage,
            MoveProjectParameters {
                code: code.clone(),
                target: LifecycleState::InProgress,
            },
        )
        .unwrap();
        let suspended = suspend_project(
            &mut store,
            &NullStorage,
            SuspendProjectParameters {
                code,
                reason: String::from("Contractor dispute"),
            },
        )
        .unwrap();
        assert_eq!(suspended.execution_status, ExecutionStatus::Suspended);

        // Draft is not suspendable
        let code = created_project(&mut store);
        let blocked = suspend_project(
            &mut store,
            &NullStorage,
            SuspendProjectParameters {
                code,
                reason: String::from("n/a"),
            },
        );
        assert!(matches!(
            blocked,
            Err(SuspendProjectError::NotSuspendable(LifecycleState::Draft))
        ));
    }

    #[test]
    fn test_delete_protects_approved_projects() {
        let mut store = Store::default();
        let code = approved_project(&mut store);

        let blocked = delete_project(
            &mut store,
            &NullStorage,
            DeleteProjectParameters {
                code: code.clone(),
                reason: String::from("cleanup"),
            },
        );
        assert!(matches!(
            blocked,
            Err(DeleteProjectError::NotDeletable(ApprovalStatus::Approved))
        ));

        // Still protected once execution starts
        move_project(
            &mut store,
            &NullStorage,
            MoveProjectParameters {
                code: code.clone(),
                target: LifecycleState::InProgress,
            },
        )
        .unwrap();
        let blocked = delete_project(
            &mut store,
            &NullStorage,
            DeleteProjectParameters {
                code,
                reason: String::from("cleanup"),
            },
        );
        assert!(matches!(blocked, Err(DeleteProjectError::NotDeletable(_))));
    }

    #[test]
    fn test_delete_is_a_soft_tombstone() {
        let mut store = Store::default();
        let code = created_project(&mut store);

        let deleted = delete_project(
            &mut store,
            &NullStorage,
            DeleteProjectParameters {
                code: code.clone(),
                reason: String::from("Created by mistake"),
            },
        )
        .unwrap();

        assert_eq!(deleted.approval_status, ApprovalStatus::Deleted);
        assert!(deleted.deleted_at.is_some());
        // Record survives and the code stays reserved
        assert!(store.get_project_by_code(&code).is_some());
        assert_eq!(store.get_active_projects().count(), 0);
        assert_eq!(store.get_deleted_projects().count(), 1);
    }

    #[test]
    fn test_board_move_follows_the_table_and_reports_illegal_moves() {
        let mut store = Store::default();
        let code = approved_project(&mut store);

        move_project(
            &mut store,
            &NullStorage,
            MoveProjectParameters {
                code: code.clone(),
                target: LifecycleState::InProgress,
            },
        )
        .unwrap();
        let completed = move_project(
            &mut store,
            &NullStorage,
            MoveProjectParameters {
                code: code.clone(),
                target: LifecycleState::Completed,
            },
        )
        .unwrap();
        assert_eq!(
            LifecycleState::of(&completed).unwrap(),
            LifecycleState::Completed
        );

        // Completed is terminal; every further move fails loudly
        for target in crate::models::lifecycle::ALL_STATES {
            let result = move_project(
                &mut store,
                &NullStorage,
                MoveProjectParameters {
                    code: code.clone(),
                    target,
                },
            );
            assert!(matches!(
                result,
                Err(MoveProjectError::Transition(TransitionError::Illegal { .. }))
            ));
        }
    }
}
