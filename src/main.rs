use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    models::{
        lifecycle::LifecycleState,
        package::{PackageStatus, Priority, TenderMethod},
        project::Category,
    },
    services::{
        packages::{
            AdvancePackageError, AdvancePackageParameters, AwardPackageError,
            AwardPackageParameters, CancelPackageError, CancelPackageParameters,
            CreatePackageError, CreatePackageParameters, PublishPackageError,
            PublishPackageParameters, advance_package, award_package, cancel_package,
            create_package, publish_package,
        },
        projects::{
            ApproveProjectError, ApproveProjectParameters, CreateProjectError,
            CreateProjectParameters, DeleteProjectError, DeleteProjectParameters,
            MoveProjectError, MoveProjectParameters, RejectProjectError, RejectProjectParameters,
            RequestEditError, RequestEditParameters, SubmitProjectError, SubmitProjectParameters,
            SuspendProjectError, SuspendProjectParameters, approve_project, create_project,
            delete_project, move_project, reject_project, request_edit, submit_for_approval,
            suspend_project,
        },
    },
    storage::{Storage, json::JsonFileStorage},
};

mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "procman",
    about = "Procurement project and tender package manager for your terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the seven-column lifecycle board
    Board,

    /// Show deleted projects
    Trash,

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage bidding packages
    #[command(subcommand)]
    Package(PackageCommands),
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// Create a new project
    New {
        /// Project name
        name: String,

        /// Category: investment, procurement, service or maintenance
        #[arg(short, long)]
        category: String,

        /// Start date (YYYY-MM-DD); its year goes into the project code
        #[arg(short, long)]
        start: String,

        /// Planned budget
        #[arg(short, long)]
        planned: Option<f64>,

        /// Assigned manager
        #[arg(short, long)]
        manager: Option<String>,

        /// Who is creating the project
        #[arg(long, default_value = "unknown")]
        by: String,
    },

    /// List all active projects
    List,

    /// Show one project in detail
    View { code: String },

    /// Submit a project for approval
    Submit {
        code: String,

        /// Who is submitting
        #[arg(long)]
        by: String,
    },

    /// Approve a pending project
    Approve {
        code: String,

        /// Who is approving
        #[arg(long)]
        by: String,

        /// Optional approval notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Reject a pending project
    Reject {
        code: String,

        /// Who is rejecting
        #[arg(long)]
        by: String,

        /// Rejection reason (required)
        #[arg(short, long)]
        reason: String,
    },

    /// Suspend an approved project
    Suspend {
        code: String,

        /// Suspension reason (required)
        #[arg(short, long)]
        reason: String,
    },

    /// Soft-delete a project
    Delete {
        code: String,

        /// Deletion reason (required)
        #[arg(short, long)]
        reason: String,
    },

    /// Reopen a decided project for editing and resubmission
    RequestEdit { code: String },

    /// Move a project to another board column
    Move {
        code: String,

        /// Target column: draft, pending, approved, rejected, in-progress, completed, suspended
        target: String,
    },
}

#[derive(Debug, Subcommand)]
enum PackageCommands {
    /// Create a new bidding package under a project
    New {
        /// Package title
        title: String,

        /// Parent project code
        #[arg(short, long)]
        project: String,

        /// Tender method: open, limited, direct or competitive-consultation
        #[arg(short, long, default_value = "open")]
        method: String,

        /// Priority: low, medium, high or critical
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Monetary estimate
        #[arg(short, long)]
        estimate: Option<f64>,

        /// Currency of the estimate
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// List bidding packages
    List {
        /// Only packages of this project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Publish a package
    Publish { code: String },

    /// Award a package to the winning bidder
    Award {
        code: String,

        /// Winning bidder
        #[arg(long)]
        to: String,
    },

    /// Cancel a package
    Cancel {
        code: String,

        /// Cancellation reason (required)
        #[arg(short, long)]
        reason: String,
    },

    /// Advance a package one step along the preparation chain
    Advance {
        code: String,

        /// Target status: created, in-progress, published, bidding, evaluating
        target: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize storage
    let storage_path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("procman")
        .join("store.json");

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error: Failed to create data directory: {}", e);
            std::process::exit(1);
        });
    }

    let storage = JsonFileStorage::new(storage_path);

    let mut store = match storage.load() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load store: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Board) => {
            ui::render_board(&store);
        }
        Some(Commands::Trash) => {
            let deleted: Vec<_> = store.get_deleted_projects().collect();
            if deleted.is_empty() {
                println!("Trash is empty");
            } else {
                ui::render_view_header("Trash", deleted.len());
                for project in deleted {
                    ui::render_project_line(project);
                    if let Some(reason) = &project.deletion_reason {
                        println!("      {}", reason.dimmed());
                    }
                }
            }
        }
        Some(Commands::Project(command)) => {
            run_project_command(&mut store, &storage, command);
        }
        Some(Commands::Package(command)) => {
            run_package_command(&mut store, &storage, command);
        }
        None => {
            ui::render_board(&store);
        }
    }
}

fn run_project_command(
    store: &mut crate::models::store::Store,
    storage: &impl Storage,
    command: ProjectCommands,
) {
    match command {
        ProjectCommands::New {
            name,
            category,
            start,
            planned,
            manager,
            by,
        } => {
            let category = Category::parse(&category).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let params = CreateProjectParameters {
                name,
                category,
                start_date: start,
                planned_budget: planned,
                manager,
                created_by: by,
            };

            match create_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Project created: {}", project.name);
                    println!("  {}", project.code);
                    for warning in project.budget.warnings() {
                        println!("  {} {}", "⚠".yellow(), warning.yellow());
                    }
                }
                Err(CreateProjectError::InvalidStartDate(date_str, error)) => {
                    eprintln!("Error: Invalid start date '{}': {}", date_str, error);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-06-01)");
                    std::process::exit(1);
                }
                Err(CreateProjectError::NegativeBudget(amount)) => {
                    eprintln!("Error: Budget amounts must be non-negative (got {})", amount);
                    std::process::exit(1);
                }
                Err(CreateProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::List => {
            let mut projects: Vec<_> = store.get_active_projects().collect();
            if projects.is_empty() {
                println!("No active projects");
            } else {
                projects.sort_by(|a, b| a.code.cmp(&b.code));
                ui::render_view_header("Projects", projects.len());
                for project in projects {
                    ui::render_project_line(project);
                }
            }
        }
        ProjectCommands::View { code } => match store.get_project_by_code(&code) {
            Some(project) => {
                ui::render_project_detail(project);
                let packages: Vec<_> = store.get_packages_for_project(project.id).collect();
                if !packages.is_empty() {
                    ui::render_section_header(&format!("Packages ({})", packages.len()));
                    for package in packages {
                        ui::render_package_line(package, store);
                    }
                }
            }
            None => {
                eprintln!("Error: Project '{}' not found", code);
                std::process::exit(1);
            }
        },
        ProjectCommands::Submit { code, by } => {
            let params = SubmitProjectParameters {
                code,
                submitted_by: by,
            };

            match submit_for_approval(store, storage, params) {
                Ok(project) => {
                    println!("✓ Submitted for approval: {}", project.name);
                    println!("  {}", project.code);
                }
                Err(SubmitProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(SubmitProjectError::NotEligibleForSubmission(state)) => {
                    eprintln!(
                        "Error: Project in state '{}' is not eligible for submission",
                        state
                    );
                    eprintln!(
                        "\nOnly a draft project, or a decided one reopened with 'project request-edit', can be submitted."
                    );
                    std::process::exit(1);
                }
                Err(SubmitProjectError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(SubmitProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::Approve { code, by, notes } => {
            let params = ApproveProjectParameters {
                code,
                decided_by: by,
                notes,
            };

            match approve_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Approved: {}", project.name);
                    println!("  {}", project.code);
                }
                Err(ApproveProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(ApproveProjectError::NotPendingApproval(state)) => {
                    eprintln!("Error: Project in state '{}' is not pending approval", state);
                    std::process::exit(1);
                }
                Err(ApproveProjectError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(ApproveProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::Reject { code, by, reason } => {
            let params = RejectProjectParameters {
                code,
                decided_by: by,
                reason,
            };

            match reject_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Rejected: {}", project.name);
                    println!("  {}", project.code);
                }
                Err(RejectProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(RejectProjectError::NotPendingApproval(state)) => {
                    eprintln!("Error: Project in state '{}' is not pending approval", state);
                    std::process::exit(1);
                }
                Err(RejectProjectError::MissingReason) => {
                    eprintln!("Error: A rejection reason is required");
                    std::process::exit(1);
                }
                Err(RejectProjectError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(RejectProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::Suspend { code, reason } => {
            let params = SuspendProjectParameters { code, reason };

            match suspend_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Suspended: {}", project.name);
                    println!("  {}", project.code);
                }
                Err(SuspendProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(SuspendProjectError::NotSuspendable(state)) => {
                    eprintln!("Error: Project in state '{}' cannot be suspended", state);
                    eprintln!("\nOnly an approved project (started or not) can be suspended.");
                    std::process::exit(1);
                }
                Err(SuspendProjectError::MissingReason) => {
                    eprintln!("Error: A suspension reason is required");
                    std::process::exit(1);
                }
                Err(SuspendProjectError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(SuspendProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::Delete { code, reason } => {
            let params = DeleteProjectParameters { code, reason };

            match delete_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Moved to trash: {}", project.name);
                    println!("  {}", project.code);
                }
                Err(DeleteProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(DeleteProjectError::NotDeletable(status)) => {
                    eprintln!(
                        "Error: Project with approval status '{:?}' cannot be deleted",
                        status
                    );
                    eprintln!("\nApproved projects are protected; suspend or complete them instead.");
                    std::process::exit(1);
                }
                Err(DeleteProjectError::MissingReason) => {
                    eprintln!("Error: A deletion reason is required");
                    std::process::exit(1);
                }
                Err(DeleteProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::RequestEdit { code } => {
            let params = RequestEditParameters { code };

            match request_edit(store, storage, params) {
                Ok(project) => {
                    println!("✓ Reopened for editing: {}", project.name);
                    println!("  {} can be resubmitted with 'project submit'", project.code);
                }
                Err(RequestEditError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(RequestEditError::NotEditRequestable(state)) => {
                    eprintln!(
                        "Error: Only approved or rejected projects can be reopened (state is '{}')",
                        state
                    );
                    std::process::exit(1);
                }
                Err(RequestEditError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(RequestEditError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ProjectCommands::Move { code, target } => {
            let target = LifecycleState::parse(&target).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let params = MoveProjectParameters { code, target };

            match move_project(store, storage, params) {
                Ok(project) => {
                    println!("✓ Moved: {}", project.name);
                    println!("  {} is now in '{}'", project.code, target);
                }
                Err(MoveProjectError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);
                    std::process::exit(1);
                }
                Err(MoveProjectError::Transition(e)) => {
                    eprintln!("Error: {}", e);
                    eprintln!("\nLegal moves follow the lifecycle board left to right; rejected, completed and suspended projects cannot move again.");
                    std::process::exit(1);
                }
                Err(MoveProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to save project: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn run_package_command(
    store: &mut crate::models::store::Store,
    storage: &impl Storage,
    command: PackageCommands,
) {
    match command {
        PackageCommands::New {
            title,
            project,
            method,
            priority,
            estimate,
            currency,
        } => {
            let method = TenderMethod::parse(&method).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            let priority = Priority::parse(&priority).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let params = CreatePackageParameters {
                title,
                project_code: project,
                method,
                priority,
                estimate,
                currency,
            };

            match create_package(store, storage, params) {
                Ok(package) => {
                    println!("✓ Package created: {}", package.title);
                    println!("  {}", package.code);
                }
                Err(CreatePackageError::ProjectNotFound(code)) => {
                    eprintln!("Error: Project '{}' not found", code);

                    let projects: Vec<_> = store.get_active_projects().collect();
                    if !projects.is_empty() {
                        eprintln!("\nAvailable projects:");
                        for project in projects {
                            eprintln!("  - {} ({})", project.code, project.name);
                        }
                    } else {
                        eprintln!("\nNo projects exist yet. Create one first.");
                    }
                    std::process::exit(1);
                }
                Err(CreatePackageError::ProjectDeleted(code)) => {
                    eprintln!("Error: Project '{}' is deleted", code);
                    std::process::exit(1);
                }
                Err(CreatePackageError::NegativeEstimate(amount)) => {
                    eprintln!("Error: Estimate must be non-negative (got {})", amount);
                    std::process::exit(1);
                }
                Err(CreatePackageError::Storage(e)) => {
                    eprintln!("Error: Failed to save package: {}", e);
                    std::process::exit(1);
                }
            }
        }
        PackageCommands::List { project } => {
            let packages: Vec<_> = match project {
                Some(code) => match store.get_project_by_code(&code) {
                    Some(project) => store.get_packages_for_project(project.id).collect(),
                    None => {
                        eprintln!("Error: Project '{}' not found", code);
                        std::process::exit(1);
                    }
                },
                None => store.packages.iter().collect(),
            };

            if packages.is_empty() {
                println!("No bidding packages");
            } else {
                ui::render_view_header("Bidding Packages", packages.len());
                for package in packages {
                    ui::render_package_line(package, store);
                }
            }
        }
        PackageCommands::Publish { code } => {
            let params = PublishPackageParameters { code };

            match publish_package(store, storage, params) {
                Ok(package) => {
                    println!("✓ Published: {}", package.title);
                    println!("  {}", package.code);
                }
                Err(PublishPackageError::PackageNotFound(code)) => {
                    eprintln!("Error: Package '{}' not found", code);
                    std::process::exit(1);
                }
                Err(PublishPackageError::NotPublishable(status)) => {
                    eprintln!("Error: Package in status '{}' cannot be published", status);
                    std::process::exit(1);
                }
                Err(PublishPackageError::Storage(e)) => {
                    eprintln!("Error: Failed to save package: {}", e);
                    std::process::exit(1);
                }
            }
        }
        PackageCommands::Award { code, to } => {
            let params = AwardPackageParameters {
                code,
                awarded_to: to,
            };

            match award_package(store, storage, params) {
                Ok(package) => {
                    println!(
                        "✓ Awarded: {} → {}",
                        package.title,
                        package.awarded_to.as_deref().unwrap_or("?")
                    );
                    println!("  {}", package.code);
                }
                Err(AwardPackageError::PackageNotFound(code)) => {
                    eprintln!("Error: Package '{}' not found", code);
                    std::process::exit(1);
                }
                Err(AwardPackageError::NotAwardable(status)) => {
                    eprintln!("Error: Package in status '{}' cannot be awarded", status);
                    eprintln!("\nA package must be published, bidding or evaluating first.");
                    std::process::exit(1);
                }
                Err(AwardPackageError::MissingBidder) => {
                    eprintln!("Error: The winning bidder is required");
                    std::process::exit(1);
                }
                Err(AwardPackageError::Storage(e)) => {
                    eprintln!("Error: Failed to save package: {}", e);
                    std::process::exit(1);
                }
            }
        }
        PackageCommands::Cancel { code, reason } => {
            let params = CancelPackageParameters { code, reason };

            match cancel_package(store, storage, params) {
                Ok(package) => {
                    println!("✓ Cancelled: {}", package.title);
                    println!("  {}", package.code);
                }
                Err(CancelPackageError::PackageNotFound(code)) => {
                    eprintln!("Error: Package '{}' not found", code);
                    std::process::exit(1);
                }
                Err(CancelPackageError::NotCancellable(status)) => {
                    eprintln!("Error: Package in status '{}' cannot be cancelled", status);
                    std::process::exit(1);
                }
                Err(CancelPackageError::MissingReason) => {
                    eprintln!("Error: A cancellation reason is required");
                    std::process::exit(1);
                }
                Err(CancelPackageError::Storage(e)) => {
                    eprintln!("Error: Failed to save package: {}", e);
                    std::process::exit(1);
                }
            }
        }
        PackageCommands::Advance { code, target } => {
            let target = PackageStatus::parse(&target).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let params = AdvancePackageParameters { code, target };

            match advance_package(store, storage, params) {
                Ok(package) => {
                    println!("✓ Advanced: {}", package.title);
                    println!("  {} is now '{}'", package.code, package.status);
                }
                Err(AdvancePackageError::PackageNotFound(code)) => {
                    eprintln!("Error: Package '{}' not found", code);
                    std::process::exit(1);
                }
                Err(AdvancePackageError::IllegalPackageMove { from, to }) => {
                    eprintln!(
                        "Error: Package in status '{}' cannot be advanced to '{}'",
                        from, to
                    );
                    eprintln!(
                        "\nPackages advance one step at a time: draft → created → in-progress → published → bidding → evaluating. Use 'package award' or 'package cancel' to close one out."
                    );
                    std::process::exit(1);
                }
                Err(AdvancePackageError::Storage(e)) => {
                    eprintln!("Error: Failed to save package: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
