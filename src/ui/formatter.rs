//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from the workflow.
//! Functions here have no side effects beyond printing, and the string builders are testable.

use console::style;

use crate::boundary::PlanNote;
use crate::catalog::MajorVersionMapping;
use crate::planner::MergeUpPlan;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Join a merge-up chain into a single line, oldest first.
pub fn format_branch_chain(branches: &[String]) -> String {
    branches.join(" → ")
}

/// Display a merge-up plan.
///
/// Shows the ordered branch chain, or why there is none. With `show_dropped`, every
/// branch left out of the plan is listed with its reason.
///
/// # Arguments
/// * `plan` - The plan to display
/// * `show_dropped` - Also list the branches that were left out
pub fn display_plan(plan: &MergeUpPlan, show_dropped: bool) {
    println!(
        "\n{}",
        style(format!("Merge-up plan for {}", plan.repository)).bold()
    );

    if plan.skipped {
        display_status("Repository is configured to be skipped for merge-up");
    } else if plan.is_empty() {
        display_status("No branches to merge up");
    } else {
        for (i, branch) in plan.branches.iter().enumerate() {
            println!("  {}. {}", i + 1, style(branch).cyan());
        }
        println!("  {}", style(format_branch_chain(&plan.branches)).dim());
    }

    if show_dropped && !plan.dropped.is_empty() {
        println!("\n{}", style("Left out:").underlined());
        for note in &plan.dropped {
            display_plan_note(note);
        }
    }
}

/// Display why a branch was left out of a plan.
pub fn display_plan_note(note: &PlanNote) {
    println!("  {} {}", style("-").yellow(), note);
}

/// Display the platform major line resolved for a branch.
///
/// # Arguments
/// * `repository` - Repository the branch belongs to
/// * `branch` - The branch that was resolved
/// * `major_line` - The resolved platform major, if any
pub fn display_major_line(repository: &str, branch: &str, major_line: Option<&str>) {
    match major_line {
        Some(major) => display_success(&format!(
            "{} branch '{}' is on platform major line {}",
            repository,
            branch,
            style(major).green().bold()
        )),
        None => display_status(&format!(
            "Could not work out the platform major line of {} branch '{}'",
            repository, branch
        )),
    }
}

/// Format a major version mapping as `4 => 1, 5 => 2`.
pub fn format_mapping(mapping: &MajorVersionMapping) -> String {
    mapping
        .entries()
        .map(|(platform, majors)| format!("{} => {}", platform, majors.join("|")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display packages released in lock-step with the platform.
pub fn display_lockstepped(repositories: &[(&str, &MajorVersionMapping)]) {
    println!("{}", style("Lockstepped packages:").bold());
    for (package, mapping) in repositories {
        println!("  - {} ({})", package, format_mapping(mapping));
    }
}

/// Display every problem found while validating the catalog.
pub fn display_catalog_problems(problems: &[String]) {
    for problem in problems {
        eprintln!("{} {}", style("✗").red(), problem);
    }
}
