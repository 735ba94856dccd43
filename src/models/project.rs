use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval axis of a project's lifecycle
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ApprovalStatus {
    #[default]
    Initialized,
    PendingApproval,
    Approved,
    Rejected,
    Deleted,
}

/// Execution axis of a project's lifecycle
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExecutionStatus {
    #[default]
    NotStarted,
    InProgress,
    Suspended,
    Completed,
}

/// Whether an already-decided project has been reopened for editing
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditRequestStatus {
    #[default]
    None,
    EditRequested,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Investment,
    Procurement,
    Service,
    Maintenance,
}

#[derive(Debug, thiserror::Error)]
pub enum CategoryParseError {
    #[error("Unknown category '{0}'. Expected one of: investment, procurement, service, maintenance")]
    Unknown(String),
}

impl Category {
    /// Code prefix used when generating project codes
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Investment => "INV",
            Category::Procurement => "PUR",
            Category::Service => "SER",
            Category::Maintenance => "MAI",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Investment => "Investment",
            Category::Procurement => "Procurement",
            Category::Service => "Service",
            Category::Maintenance => "Maintenance",
        }
    }

    pub fn parse(input: &str) -> Result<Category, CategoryParseError> {
        match input.to_lowercase().as_str() {
            "investment" | "inv" => Ok(Category::Investment),
            "procurement" | "pur" => Ok(Category::Procurement),
            "service" | "ser" => Ok(Category::Service),
            "maintenance" | "mai" => Ok(Category::Maintenance),
            _ => Err(CategoryParseError::Unknown(input.to_string())),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Investment
    }
}

/// Monetary figures for a project, all in a single currency.
///
/// No cross-field relation is enforced (an approved budget may exceed the
/// planned one); `warnings` reports suspicious combinations without
/// blocking any operation.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Budget {
    pub planned: f64,
    pub approved: f64,
    pub disbursed_total: f64,
    pub disbursed_this_year: f64,
    pub expected_future: f64,
    pub next_year_plan: f64,
}

impl Budget {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.approved > self.planned && self.planned > 0.0 {
            warnings.push(format!(
                "Approved budget ({}) exceeds planned budget ({})",
                self.approved, self.planned
            ));
        }
        if self.disbursed_total > self.approved && self.approved > 0.0 {
            warnings.push(format!(
                "Total disbursement ({}) exceeds approved budget ({})",
                self.disbursed_total, self.approved
            ));
        }
        if self.disbursed_this_year > self.disbursed_total {
            warnings.push(format!(
                "This year's disbursement ({}) exceeds total disbursement ({})",
                self.disbursed_this_year, self.disbursed_total
            ));
        }
        warnings
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Project {
    /// UUID of the project
    pub id: Uuid,
    /// Generated code, e.g. INV-2025-001
    pub code: String,
    /// Name of the project
    pub name: String,
    /// Category of the project, fixed at creation
    pub category: Category,
    /// Approval axis of the lifecycle
    pub approval_status: ApprovalStatus,
    /// Execution axis of the lifecycle
    pub execution_status: ExecutionStatus,
    /// Edit-request flag allowing resubmission of a decided project
    pub edit_request_status: EditRequestStatus,
    /// Start date, drives the year in the generated code
    pub start_date: Date,
    /// Budget figures
    pub budget: Budget,
    /// Who created the project
    pub created_by: String,
    /// Assigned manager
    pub manager: Option<String>,
    /// External decision/approval reference number
    pub decision_number: Option<String>,
    /// Date of the external decision
    pub decision_date: Option<Date>,
    /// Who submitted the project for approval
    pub submitted_by: Option<String>,
    /// When the project was submitted for approval
    pub submitted_at: Option<Timestamp>,
    /// Who approved or rejected the project
    pub decided_by: Option<String>,
    /// When the approval decision was made
    pub decided_at: Option<Timestamp>,
    /// Optional notes recorded on approval
    pub decision_notes: Option<String>,
    /// Reason recorded on rejection
    pub rejection_reason: Option<String>,
    /// Reason recorded on suspension
    pub suspension_reason: Option<String>,
    /// Reason recorded on soft delete
    pub deletion_reason: Option<String>,
    /// When the project was soft deleted
    pub deleted_at: Option<Timestamp>,
    /// When the project was created
    pub created_at: Timestamp,
    /// When the project was last mutated
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_deleted(&self) -> bool {
        self.approval_status == ApprovalStatus::Deleted
    }
}

impl Default for Project {
    fn default() -> Self {
        let now = Timestamp::default();
        Self {
            id: Uuid::new_v4(),
            code: String::new(),
            name: String::new(),
            category: Category::default(),
            approval_status: ApprovalStatus::default(),
            execution_status: ExecutionStatus::default(),
            edit_request_status: EditRequestStatus::default(),
            start_date: Date::default(),
            budget: Budget::default(),
            created_by: String::new(),
            manager: None,
            decision_number: None,
            decision_date: None,
            submitted_by: None,
            submitted_at: None,
            decided_by: None,
            decided_at: None,
            decision_notes: None,
            rejection_reason: None,
            suspension_reason: None,
            deletion_reason: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_prefixes() {
        assert_eq!(Category::Investment.prefix(), "INV");
        assert_eq!(Category::Procurement.prefix(), "PUR");
        assert_eq!(Category::Service.prefix(), "SER");
        assert_eq!(Category::Maintenance.prefix(), "MAI");
    }

    #[test]
    fn test_category_parse_accepts_names_and_prefixes() {
        assert_eq!(Category::parse("investment").unwrap(), Category::Investment);
        assert_eq!(Category::parse("PUR").unwrap(), Category::Procurement);
        assert!(matches!(
            Category::parse("construction"),
            Err(CategoryParseError::Unknown(_))
        ));
    }

    #[test]
    fn test_budget_warnings_do_not_block() {
        let budget = Budget {
            planned: 100.0,
            approved: 150.0,
            ..Budget::default()
        };
        let warnings = budget.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("exceeds planned"));

        let clean = Budget {
            planned: 100.0,
            approved: 80.0,
            ..Budget::default()
        };
        assert!(clean.warnings().is_empty());
    }
}
