use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::project::{ApprovalStatus, ExecutionStatus, Project};

/// Composite lifecycle state of a project, computed from its approval and
/// execution axes. Only these seven combinations are reachable; anything
/// else in a loaded store is treated as corruption.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LifecycleState {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Suspended,
}

pub const ALL_STATES: [LifecycleState; 7] = [
    LifecycleState::Draft,
    LifecycleState::PendingApproval,
    LifecycleState::Approved,
    LifecycleState::Rejected,
    LifecycleState::InProgress,
    LifecycleState::Completed,
    LifecycleState::Suspended,
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot move a project from '{from}' to '{to}'")]
    Illegal {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Project status pair ({approval:?}, {execution:?}) is not a valid lifecycle state")]
    CorruptState {
        approval: ApprovalStatus,
        execution: ExecutionStatus,
    },

    #[error("Project is deleted and cannot be moved")]
    ProjectDeleted,
}

#[derive(Debug, thiserror::Error)]
pub enum StateParseError {
    #[error(
        "Unknown lifecycle state '{0}'. Expected one of: draft, pending, approved, rejected, in-progress, completed, suspended"
    )]
    Unknown(String),
}

impl LifecycleState {
    /// Computes the composite state from a project's two status fields.
    pub fn of(project: &Project) -> Result<LifecycleState, TransitionError> {
        use ApprovalStatus as A;
        use ExecutionStatus as E;

        match (project.approval_status, project.execution_status) {
            (A::Deleted, _) => Err(TransitionError::ProjectDeleted),
            (A::Initialized, E::NotStarted) => Ok(LifecycleState::Draft),
            (A::PendingApproval, E::NotStarted) => Ok(LifecycleState::PendingApproval),
            (A::Approved, E::NotStarted) => Ok(LifecycleState::Approved),
            (A::Rejected, E::NotStarted) => Ok(LifecycleState::Rejected),
            (A::Approved, E::InProgress) => Ok(LifecycleState::InProgress),
            (A::Approved, E::Completed) => Ok(LifecycleState::Completed),
            (A::Approved, E::Suspended) => Ok(LifecycleState::Suspended),
            (approval, execution) => Err(TransitionError::CorruptState {
                approval,
                execution,
            }),
        }
    }

    /// The (approval, execution) pair this composite state decomposes into.
    pub fn statuses(&self) -> (ApprovalStatus, ExecutionStatus) {
        use ApprovalStatus as A;
        use ExecutionStatus as E;

        match self {
            LifecycleState::Draft => (A::Initialized, E::NotStarted),
            LifecycleState::PendingApproval => (A::PendingApproval, E::NotStarted),
            LifecycleState::Approved => (A::Approved, E::NotStarted),
            LifecycleState::Rejected => (A::Rejected, E::NotStarted),
            LifecycleState::InProgress => (A::Approved, E::InProgress),
            LifecycleState::Completed => (A::Approved, E::Completed),
            LifecycleState::Suspended => (A::Approved, E::Suspended),
        }
    }

    /// Legal outgoing edges. Rejected, Completed and Suspended are
    /// terminal sinks with no back-edges.
    pub fn allowed_targets(&self) -> &'static [LifecycleState] {
        match self {
            LifecycleState::Draft => &[LifecycleState::PendingApproval],
            LifecycleState::PendingApproval => {
                &[LifecycleState::Approved, LifecycleState::Rejected]
            }
            LifecycleState::Approved => &[LifecycleState::InProgress],
            LifecycleState::InProgress => {
                &[LifecycleState::Completed, LifecycleState::Suspended]
            }
            LifecycleState::Rejected
            | LifecycleState::Completed
            | LifecycleState::Suspended => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Draft => "Draft",
            LifecycleState::PendingApproval => "Pending Approval",
            LifecycleState::Approved => "Approved",
            LifecycleState::Rejected => "Rejected",
            LifecycleState::InProgress => "In Progress",
            LifecycleState::Completed => "Completed",
            LifecycleState::Suspended => "Suspended",
        }
    }

    pub fn parse(input: &str) -> Result<LifecycleState, StateParseError> {
        match input.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "draft" => Ok(LifecycleState::Draft),
            "pending" | "pendingapproval" => Ok(LifecycleState::PendingApproval),
            "approved" => Ok(LifecycleState::Approved),
            "rejected" => Ok(LifecycleState::Rejected),
            "inprogress" => Ok(LifecycleState::InProgress),
            "completed" => Ok(LifecycleState::Completed),
            "suspended" => Ok(LifecycleState::Suspended),
            _ => Err(StateParseError::Unknown(input.to_string())),
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Moves a project to `target` if the transition table allows it.
///
/// On an illegal edge the project is left untouched and the same error is
/// returned however many times the move is retried. On success the two
/// status fields are rewritten from the target's decomposition and
/// `updated_at` is stamped.
pub fn attempt_transition(
    project: &mut Project,
    target: LifecycleState,
    now: Timestamp,
) -> Result<(), TransitionError> {
    let current = LifecycleState::of(project)?;

    if !current.allowed_targets().contains(&target) {
        return Err(TransitionError::Illegal {
            from: current,
            to: target,
        });
    }

    let (approval, execution) = target.statuses();
    project.approval_status = approval;
    project.execution_status = execution;
    project.updated_at = now;

    Ok(())
}
