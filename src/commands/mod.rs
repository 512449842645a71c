pub mod apply;
pub mod clean;
pub mod plan;
pub mod scan;
pub mod search;
pub mod status;
pub mod undo;

use crate::orchestrator::{status_rows, BatchSummary, PlanSummary};
use crate::session::Session;

/// Print the file table for a session
pub fn print_status_table(session: &Session) {
    let rows = status_rows(session);
    if rows.is_empty() {
        println!("\n📭 No files in the current batch.");
        return;
    }

    let name_width = rows
        .iter()
        .map(|row| row.original_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Original".len());
    let target_width = rows
        .iter()
        .map(|row| row.target_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("New name".len());

    println!(
        "\n{:<name_width$}  {:<target_width$}  Status",
        "Original", "New name"
    );
    println!("{}", "─".repeat(name_width + target_width + 12));
    for row in rows {
        println!(
            "{:<name_width$}  {:<target_width$}  {}",
            row.original_name, row.target_name, row.status
        );
    }
}

pub fn print_plan_summary(summary: &PlanSummary) {
    println!("\n📋 Planning Summary");
    println!("✅ Matched: {}", summary.matched);
    println!(
        "⏭️  Skipped (different season): {}",
        summary.skipped_different_season
    );
    println!("❓ Unmatched: {}", summary.unmatched);
}

/// `label` is "Renamed" or "Restored"
pub fn print_batch_summary(label: &str, summary: &BatchSummary) {
    println!("\n📊 {} {} of {} file(s)", label, summary.succeeded, summary.total());
    if summary.skipped > 0 {
        println!("⏭️  Not renamed yet, left alone: {}", summary.skipped);
    }
    if summary.failed == 0 {
        return;
    }

    println!("❌ Failed: {}", summary.failed);
    for failure in &summary.failures {
        println!("   • {}: {}", failure.original_name, failure.error);
    }
}
