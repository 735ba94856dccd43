use colored::*;

use crate::models::{
    lifecycle::{ALL_STATES, LifecycleState},
    package::{BiddingPackage, PackageStatus, Priority},
    project::Project,
    store::Store,
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Status glyph for a project's lifecycle column
pub fn state_glyph(state: LifecycleState) -> ColoredString {
    match state {
        LifecycleState::Draft => "○".normal(),
        LifecycleState::PendingApproval => "◐".yellow(),
        LifecycleState::Approved => "●".green(),
        LifecycleState::InProgress => "▶".blue(),
        LifecycleState::Completed => "✓".dimmed(),
        LifecycleState::Rejected => "✗".red(),
        LifecycleState::Suspended => "‖".red(),
    }
}

pub fn state_label(state: LifecycleState) -> ColoredString {
    match state {
        LifecycleState::Draft => state.label().normal(),
        LifecycleState::PendingApproval => state.label().yellow(),
        LifecycleState::Approved => state.label().green(),
        LifecycleState::InProgress => state.label().blue(),
        LifecycleState::Completed => state.label().dimmed(),
        LifecycleState::Rejected | LifecycleState::Suspended => state.label().red(),
    }
}

pub fn package_status_label(status: PackageStatus) -> ColoredString {
    match status {
        PackageStatus::Draft | PackageStatus::Created => status.label().normal(),
        PackageStatus::InProgress => status.label().blue(),
        PackageStatus::Published | PackageStatus::Bidding | PackageStatus::Evaluating => {
            status.label().yellow()
        }
        PackageStatus::Awarded => status.label().green(),
        PackageStatus::Completed => status.label().dimmed(),
        PackageStatus::Cancelled => status.label().red(),
    }
}

pub fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::Low => priority.label().dimmed(),
        Priority::Medium => priority.label().normal(),
        Priority::High => priority.label().yellow(),
        Priority::Critical => priority.label().red().bold(),
    }
}

/// Render a single project line: code, glyph, name, right-aligned context
pub fn render_project_line(project: &Project) {
    let terminal_width = get_terminal_width();

    let glyph = match LifecycleState::of(project) {
        Ok(state) => state_glyph(state),
        Err(_) => "·".dimmed(),
    };

    let left_section = format!("  {}  {}  {}", project.code, glyph, project.name);
    let styled_left = if project.is_deleted() {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let mut context_parts = vec![project.category.label().to_string()];
    if let Some(manager) = &project.manager {
        context_parts.push(manager.clone());
    }
    let right_section = context_parts.join(" · ");

    let left_visible_len = format!("  {}  {}  {}", project.code, " ", project.name).len();
    let total_content = left_visible_len + right_section.len();

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
    } else {
        println!("{}", styled_left);
    }
}

/// Render a single package line with its status and priority
pub fn render_package_line(package: &BiddingPackage, store: &Store) {
    let project_code = store
        .get_project(package.project_id)
        .map(|p| p.code.clone())
        .unwrap_or_else(|| String::from("?"));

    println!(
        "  {}  {}  {}",
        package.code.dimmed(),
        package_status_label(package.status),
        package.title.bold()
    );
    println!(
        "      {} {} {} {} {}",
        project_code.blue(),
        "•".dimmed(),
        priority_label(package.priority),
        "•".dimmed(),
        format_amount(package.estimate, &package.currency)
    );
}

/// Render the seven-column lifecycle board as stacked sections
pub fn render_board(store: &Store) {
    let active: Vec<_> = store.get_active_projects().collect();
    render_view_header("Lifecycle Board", active.len());

    for state in ALL_STATES {
        let mut column: Vec<_> = active
            .iter()
            .filter(|p| LifecycleState::of(p) == Ok(state))
            .collect();
        column.sort_by(|a, b| a.code.cmp(&b.code));

        render_section_header(&format!("{} ({})", state_label(state), column.len()));
        if column.is_empty() {
            println!("    {}", "—".dimmed());
        } else {
            for project in column {
                render_project_line(project);
            }
        }
    }
}

pub fn format_amount(amount: f64, currency: &str) -> String {
    if amount == 0.0 {
        format!("0 {currency}")
    } else {
        format!("{amount:.0} {currency}")
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let noun = if count == 1 { "item" } else { "items" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, noun);
}

/// Render a section header (e.g., a board column)
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Render the detail card for a single project
pub fn render_project_detail(project: &Project) {
    println!("\n  {}  {}", project.code.dimmed(), project.name.bold());

    match LifecycleState::of(project) {
        Ok(state) => println!("  State: {}", state_label(state)),
        Err(_) if project.is_deleted() => println!("  State: {}", "Deleted".red()),
        Err(_) => println!(
            "  State: {}",
            format!(
                "invalid ({:?}, {:?})",
                project.approval_status, project.execution_status
            )
            .red()
        ),
    }

    println!("  Category: {}", project.category.label());
    println!("  Start date: {}", project.start_date);
    println!("  Created by: {}", project.created_by);
    if let Some(manager) = &project.manager {
        println!("  Manager: {}", manager);
    }
    if let Some(submitted_by) = &project.submitted_by {
        println!("  Submitted by: {}", submitted_by);
    }
    if let Some(decided_by) = &project.decided_by {
        println!("  Decided by: {}", decided_by);
    }
    if let Some(notes) = &project.decision_notes {
        println!("  Decision notes: {}", notes);
    }
    if let Some(reason) = &project.rejection_reason {
        println!("  Rejection reason: {}", reason.red());
    }
    if let Some(reason) = &project.suspension_reason {
        println!("  Suspension reason: {}", reason.red());
    }

    println!("  Planned budget: {}", format_amount(project.budget.planned, "VND"));
    if project.budget.approved > 0.0 {
        println!("  Approved budget: {}", format_amount(project.budget.approved, "VND"));
    }
    for warning in project.budget.warnings() {
        println!("  {} {}", "⚠".yellow(), warning.yellow());
    }
    println!();
}
