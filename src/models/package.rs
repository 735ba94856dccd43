use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat status of a bidding package, unlike the project's two-axis model
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PackageStatus {
    #[default]
    Draft,
    Created,
    InProgress,
    Published,
    Bidding,
    Evaluating,
    Awarded,
    Completed,
    Cancelled,
}

impl PackageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PackageStatus::Draft => "Draft",
            PackageStatus::Created => "Created",
            PackageStatus::InProgress => "In Progress",
            PackageStatus::Published => "Published",
            PackageStatus::Bidding => "Bidding",
            PackageStatus::Evaluating => "Evaluating",
            PackageStatus::Awarded => "Awarded",
            PackageStatus::Completed => "Completed",
            PackageStatus::Cancelled => "Cancelled",
        }
    }

    /// States no operation may leave
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PackageStatus::Awarded | PackageStatus::Completed | PackageStatus::Cancelled
        )
    }

    /// The single-step preparation chain a package may be advanced along.
    /// Award, cancellation and completion go through their own operations.
    pub fn next_in_chain(&self) -> Option<PackageStatus> {
        match self {
            PackageStatus::Draft => Some(PackageStatus::Created),
            PackageStatus::Created => Some(PackageStatus::InProgress),
            PackageStatus::InProgress => Some(PackageStatus::Published),
            PackageStatus::Published => Some(PackageStatus::Bidding),
            PackageStatus::Bidding => Some(PackageStatus::Evaluating),
            _ => None,
        }
    }

    pub fn parse(input: &str) -> Result<PackageStatus, PackageStatusParseError> {
        match input.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "draft" => Ok(PackageStatus::Draft),
            "created" => Ok(PackageStatus::Created),
            "inprogress" => Ok(PackageStatus::InProgress),
            "published" => Ok(PackageStatus::Published),
            "bidding" => Ok(PackageStatus::Bidding),
            "evaluating" => Ok(PackageStatus::Evaluating),
            "awarded" => Ok(PackageStatus::Awarded),
            "completed" => Ok(PackageStatus::Completed),
            "cancelled" => Ok(PackageStatus::Cancelled),
            _ => Err(PackageStatusParseError::Unknown(input.to_string())),
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageStatusParseError {
    #[error(
        "Unknown package status '{0}'. Expected one of: draft, created, in-progress, published, bidding, evaluating, awarded, completed, cancelled"
    )]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    pub fn parse(input: &str) -> Result<Priority, PriorityParseError> {
        match input.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(PriorityParseError::Unknown(input.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PriorityParseError {
    #[error("Unknown priority '{0}'. Expected one of: low, medium, high, critical")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TenderMethod {
    #[default]
    Open,
    Limited,
    Direct,
    CompetitiveConsultation,
}

impl TenderMethod {
    pub fn label(&self) -> &'static str {
        match self {
            TenderMethod::Open => "Open",
            TenderMethod::Limited => "Limited",
            TenderMethod::Direct => "Direct",
            TenderMethod::CompetitiveConsultation => "Competitive Consultation",
        }
    }

    pub fn parse(input: &str) -> Result<TenderMethod, TenderMethodParseError> {
        match input.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "open" => Ok(TenderMethod::Open),
            "limited" => Ok(TenderMethod::Limited),
            "direct" => Ok(TenderMethod::Direct),
            "competitiveconsultation" | "consultation" => {
                Ok(TenderMethod::CompetitiveConsultation)
            }
            _ => Err(TenderMethodParseError::Unknown(input.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TenderMethodParseError {
    #[error(
        "Unknown tender method '{0}'. Expected one of: open, limited, direct, competitive-consultation"
    )]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Clone)]
pub struct BiddingPackage {
    /// UUID of the package
    pub id: Uuid,
    /// Generated code, e.g. GT-2025-001
    pub code: String,
    /// Title of the package
    pub title: String,
    /// Parent project
    pub project_id: Uuid,
    /// Flat lifecycle status
    pub status: PackageStatus,
    /// Priority of the package
    pub priority: Priority,
    /// Tender method
    pub method: TenderMethod,
    /// Monetary estimate
    pub estimate: f64,
    /// Currency of the estimate
    pub currency: String,
    /// Winning bidder recorded on award
    pub awarded_to: Option<String>,
    /// Reason recorded on cancellation
    pub cancellation_reason: Option<String>,
    /// When the package was published
    pub published_at: Option<Timestamp>,
    /// When the package was awarded
    pub awarded_at: Option<Timestamp>,
    /// When the package was cancelled
    pub cancelled_at: Option<Timestamp>,
    /// When the package was created
    pub created_at: Timestamp,
    /// When the package was last mutated
    pub updated_at: Timestamp,
}

impl Default for BiddingPackage {
    fn default() -> Self {
        let now = Timestamp::default();
        Self {
            id: Uuid::new_v4(),
            code: String::new(),
            title: String::new(),
            project_id: Uuid::nil(),
            status: PackageStatus::default(),
            priority: Priority::default(),
            method: TenderMethod::default(),
            estimate: 0.0,
            currency: String::from("VND"),
            awarded_to: None,
            cancellation_reason: None,
            published_at: None,
            awarded_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
