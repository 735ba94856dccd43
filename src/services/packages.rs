use jiff::Timestamp;
use thiserror::Error;

use crate::{
    models::{
        package::{BiddingPackage, PackageStatus, Priority, TenderMethod},
        store::Store,
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreatePackageError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project '{0}' is deleted; packages cannot be attached to it")]
    ProjectDeleted(String),

    #[error("Estimate must be non-negative (got {0})")]
    NegativeEstimate(f64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreatePackageParameters {
    pub title: String,
    pub project_code: String,
    pub method: TenderMethod,
    pub priority: Priority,
    pub estimate: Option<f64>,
    pub currency: Option<String>,
}

pub fn create_package(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreatePackageParameters,
) -> Result<BiddingPackage, CreatePackageError> {
    let project = store
        .get_project_by_code(&parameters.project_code)
        .ok_or_else(|| CreatePackageError::ProjectNotFound(parameters.project_code.clone()))?;

    if project.is_deleted() {
        return Err(CreatePackageError::ProjectDeleted(parameters.project_code));
    }

    let estimate = parameters.estimate.unwrap_or(0.0);
    if estimate < 0.0 {
        return Err(CreatePackageError::NegativeEstimate(estimate));
    }

    let now = Timestamp::now();
    let package = BiddingPackage {
        title: parameters.title,
        project_id: project.id,
        method: parameters.method,
        priority: parameters.priority,
        estimate,
        currency: parameters.currency.unwrap_or_else(|| String::from("VND")),
        created_at: now,
        updated_at: now,
        ..BiddingPackage::default()
    };

    let year = jiff::Zoned::now().date().year();
    let created = store.add_package(package, year).clone();

    storage.save(store)?;

    Ok(created)
}

#[derive(Debug, Error)]
pub enum PublishPackageError {
    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package in status '{0}' cannot be published")]
    NotPublishable(PackageStatus),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct PublishPackageParameters {
    pub code: String,
}

/// Publishes a package still in preparation (Draft, Created or InProgress).
pub fn publish_package(
    store: &mut Store,
    storage: &impl Storage,
    parameters: PublishPackageParameters,
) -> Result<BiddingPackage, PublishPackageError> {
    let package = store
        .get_package_by_code_mut(&parameters.code)
        .ok_or_else(|| PublishPackageError::PackageNotFound(parameters.code.clone()))?;

    match package.status {
        PackageStatus::Draft | PackageStatus::Created | PackageStatus::InProgress => {}
        other => return Err(PublishPackageError::NotPublishable(other)),
    }

    let now = Timestamp::now();
    package.status = PackageStatus::Published;
    package.published_at = Some(now);
    package.updated_at = now;

    let published = package.clone();

    storage.save(store)?;

    Ok(published)
}

#[derive(Debug, Error)]
pub enum AwardPackageError {
    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package in status '{0}' cannot be awarded")]
    NotAwardable(PackageStatus),

    #[error("The winning bidder is required")]
    MissingBidder,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AwardPackageParameters {
    pub code: String,
    pub awarded_to: String,
}

/// Awards a package that has been through the market (Published, Bidding
/// or Evaluating).
pub fn award_package(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AwardPackageParameters,
) -> Result<BiddingPackage, AwardPackageError> {
    if parameters.awarded_to.trim().is_empty() {
        return Err(AwardPackageError::MissingBidder);
    }

    let package = store
        .get_package_by_code_mut(&parameters.code)
        .ok_or_else(|| AwardPackageError::PackageNotFound(parameters.code.clone()))?;

    match package.status {
        PackageStatus::Published | PackageStatus::Bidding | PackageStatus::Evaluating => {}
        other => return Err(AwardPackageError::NotAwardable(other)),
    }

    let now = Timestamp::now();
    package.status = PackageStatus::Awarded;
    package.awarded_to = Some(parameters.awarded_to);
    package.awarded_at = Some(now);
    package.updated_at = now;

    let awarded = package.clone();

    storage.save(store)?;

    Ok(awarded)
}

#[derive(Debug, Error)]
pub enum CancelPackageError {
    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package in status '{0}' cannot be cancelled")]
    NotCancellable(PackageStatus),

    #[error("A cancellation reason is required")]
    MissingReason,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CancelPackageParameters {
    pub code: String,
    pub reason: String,
}

pub fn cancel_package(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CancelPackageParameters,
) -> Result<BiddingPackage, CancelPackageError> {
    if parameters.reason.trim().is_empty() {
        return Err(CancelPackageError::MissingReason);
    }

    let package = store
        .get_package_by_code_mut(&parameters.code)
        .ok_or_else(|| CancelPackageError::PackageNotFound(parameters.code.clone()))?;

    if package.status.is_terminal() {
        return Err(CancelPackageError::NotCancellable(package.status));
    }

    let now = Timestamp::now();
    package.status = PackageStatus::Cancelled;
    package.cancellation_reason = Some(parameters.reason);
    package.cancelled_at = Some(now);
    package.updated_at = now;

    let cancelled = package.clone();

    storage.save(store)?;

    Ok(cancelled)
}

#[derive(Debug, Error)]
pub enum AdvancePackageError {
    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package in status '{from}' cannot be advanced to '{to}'")]
    IllegalPackageMove { from: PackageStatus, to: PackageStatus },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AdvancePackageParameters {
    pub code: String,
    pub target: PackageStatus,
}

/// Advances a package one step along the preparation chain
/// (Draft → Created → InProgress → Published → Bidding → Evaluating).
/// Award, completion and cancellation go through their own operations.
pub fn advance_package(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AdvancePackageParameters,
) -> Result<BiddingPackage, AdvancePackageError> {
    let package = store
        .get_package_by_code_mut(&parameters.code)
        .ok_or_else(|| AdvancePackageError::PackageNotFound(parameters.code.clone()))?;

    if package.status.next_in_chain() != Some(parameters.target) {
        return Err(AdvancePackageError::IllegalPackageMove {
            from: package.status,
            to: parameters.target,
        });
    }

    let now = Timestamp::now();
    package.status = parameters.target;
    if parameters.target == PackageStatus::Published {
        package.published_at = Some(now);
    }
    package.updated_at = now;

    let advanced = package.clone();

    storage.save(store)?;

    Ok(advanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Category;
    use crate::services::projects::{CreateProjectParameters, create_project};
    use crate::storage::NullStorage;

    fn store_with_project() -> (Store, String) {
        let mut store = Store::default();
        let project = create_project(
            &mut store,
            &NullStorage,
            CreateProjectParameters {
                name: String::from("Server room refit"),
                category: Category::Procurement,
                start_date: String::from("2025-03-15"),
                planned_budget: Some(80_000.0),
                manager: None,
                created_by: String::from("alice"),
            },
        )
        .unwrap();
        (store, project.code)
    }

    fn created_package(store: &mut Store, project_code: &str) -> String {
        create_package(
            store,
            &NullStorage,
            CreatePackageParameters {
                title: String::from("Rack and cabling supply"),
                project_code: project_code.to_string(),
                method: TenderMethod::Open,
                priority: Priority::High,
                estimate: Some(25_000.0),
                currency: None,
            },
        )
        .unwrap()
        .code
    }

    #[test]
    fn test_create_requires_an_existing_project() {
        let mut store = Store::default();
        let result = create_package(
            &mut store,
            &NullStorage,
            CreatePackageParameters {
                title: String::from("Orphan"),
                project_code: String::from("INV-2025-001"),
                method: TenderMethod::Open,
                priority: Priority::Medium,
                estimate: None,
                currency: None,
            },
        );

        assert!(matches!(
            result,
            Err(CreatePackageError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_packages_get_gt_codes() {
        let (mut store, project_code) = store_with_project();
        let first = created_package(&mut store, &project_code);
        let second = created_package(&mut store, &project_code);

        assert!(first.starts_with("GT-"));
        assert!(first.ends_with("-001"));
        assert!(second.ends_with("-002"));
    }

    #[test]
    fn test_publish_whitelist() {
        let (mut store, project_code) = store_with_project();
        let code = created_package(&mut store, &project_code);

        let published = publish_package(
            &mut store,
            &NullStorage,
            PublishPackageParameters { code: code.clone() },
        )
        .unwrap();
        assert_eq!(published.status, PackageStatus::Published);
        assert!(published.published_at.is_some());

        // Publishing twice is illegal
        let again = publish_package(
            &mut store,
            &NullStorage,
            PublishPackageParameters { code },
        );
        assert!(matches!(
            again,
            Err(PublishPackageError::NotPublishable(PackageStatus::Published))
        ));
    }

    #[test]
    fn test_award_requires_market_exposure_and_a_bidder() {
        let (mut store, project_code) = store_with_project();
        let code = created_package(&mut store, &project_code);

        // Draft package cannot be awarded
        let premature = award_package(
            &mut store,
            &NullStorage,
            AwardPackageParameters {
                code: code.clone(),
                awarded_to: String::from("Acme Networks"),
            },
        );
        assert!(matches!(
            premature,
            Err(AwardPackageError::NotAwardable(PackageStatus::Draft))
        ));

        publish_package(
            &mut store,
            &NullStorage,
            PublishPackageParameters { code: code.clone() },
        )
        .unwrap();

        let unnamed = award_package(
            &mut store,
            &NullStorage,
            AwardPackageParameters {
                code: code.clone(),
                awarded_to: String::from("  "),
            },
        );
        assert!(matches!(unnamed, Err(AwardPackageError::MissingBidder)));

        let awarded = award_package(
            &mut store,
            &NullStorage,
            AwardPackageParameters {
                code,
                awarded_to: String::from("Acme Networks"),
            },
        )
        .unwrap();
        assert_eq!(awarded.status, PackageStatus::Awarded);
        assert_eq!(awarded.awarded_to.as_deref(), Some("Acme Networks"));
        assert!(awarded.awarded_at.is_some());
    }

    #[test]
    fn test_cancel_spares_terminal_packages() {
        let (mut store, project_code) = store_with_project();
        let code = created_package(&mut store, &project_code);

        publish_package(
            &mut store,
            &NullStorage,
            PublishPackageParameters { code: code.clone() },
        )
        .unwrap();
        award_package(
            &mut store,
            &NullStorage,
            AwardPackageParameters {
                code: code.clone(),
                awarded_to: String::from("Acme Networks"),
            },
        )
        .unwrap();

        let blocked = cancel_package(
            &mut store,
            &NullStorage,
            CancelPackageParameters {
                code,
                reason: String::from("Requirements changed"),
            },
        );
        assert!(matches!(
            blocked,
            Err(CancelPackageError::NotCancellable(PackageStatus::Awarded))
        ));
    }

    #[test]
    fn test_advance_walks_the_chain_one_step_at_a_time() {
        let (mut store, project_code) = store_with_project();
        let code = created_package(&mut store, &project_code);

        // Draft cannot jump straight to Evaluating
        let jump = advance_package(
            &mut store,
            &NullStorage,
            AdvancePackageParameters {
                code: code.clone(),
                target: PackageStatus::Evaluating,
            },
        );
        assert!(matches!(
            jump,
            Err(AdvancePackageError::IllegalPackageMove { .. })
        ));

        for target in [
            PackageStatus::Created,
            PackageStatus::InProgress,
            PackageStatus::Published,
            PackageStatus::Bidding,
            PackageStatus::Evaluating,
        ] {
            let advanced = advance_package(
                &mut store,
                &NullStorage,
                AdvancePackageParameters {
                    code: code.clone(),
                    target,
                },
            )
            .unwrap();
            assert_eq!(advanced.status, target);
        }

        // Evaluating only leaves through award or cancel
        let stuck = advance_package(
            &mut store,
            &NullStorage,
            AdvancePackageParameters {
                code,
                target: PackageStatus::Awarded,
            },
        );
        assert!(matches!(
            stuck,
            Err(AdvancePackageError::IllegalPackageMove { .. })
        ));
    }
}
