//! Console rendering of previews, outcomes and run summaries.

use crate::config::workflow_config::WorkflowSummary;
use crate::core::engine::BatchReport;
use crate::core::workflow::{DestinationResult, WorkflowReport};
use crate::domain::model::{DuplicationOutcome, OutcomeAction, Preview};
use crate::domain::ports::ReportSink;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

/// Link to an item on the hosted board.
pub fn item_url(account: &str, board_id: u64, item_id: &str) -> String {
    format!(
        "https://{}.monday.com/boards/{}/pulses/{}",
        account, board_id, item_id
    )
}

pub fn preview_table(preview: &Preview) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        format!("Source Column: ({})", preview.source_board_name),
        format!("Destination Column: ({})", preview.dest_board_name),
        "Value".to_string(),
    ]);
    for row in &preview.rows {
        table.add_row(vec![
            row.source_name.as_str(),
            row.dest_name.as_str(),
            row.value.as_str(),
        ]);
    }
    table
}

pub fn workflow_table(workflows: &[WorkflowSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Enabled", "Name", "Source", "Destinations"]);
    for workflow in workflows {
        table.add_row(vec![
            workflow.id.clone(),
            if workflow.enabled { "✓" } else { "✗" }.to_string(),
            workflow.name.clone(),
            workflow.source_board.clone(),
            workflow.destinations.join(", "),
        ]);
    }
    table
}

/// Prints previews and final summaries to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    account: Option<String>,
}

impl ConsoleReporter {
    pub fn new(account: Option<String>) -> Self {
        Self { account }
    }
}

impl ReportSink for ConsoleReporter {
    fn preview(&self, preview: &Preview) {
        println!("\n📋 PREVIEW - Ready to {}", preview.action_label());
        println!(
            "   Target: board {} / group {}",
            preview.dest_board_id, preview.dest_group_id
        );
        println!("\n✅ Will Map ({} columns):", preview.rows.len());
        println!("{}", preview_table(preview));
    }

    fn outcome(&self, outcome: &DuplicationOutcome, mapped_summary: &[String]) {
        if outcome.action == OutcomeAction::Cancelled {
            return;
        }
        println!("\n📋 FINAL SUMMARY ({})", outcome.action);
        println!(
            "\n✅ Successfully Mapped ({} columns):",
            mapped_summary.len()
        );
        println!("  • Name: '{}'", outcome.item_name);
        for line in mapped_summary {
            println!("  • {}", line);
        }
    }
}

pub fn print_batch_summary(report: &BatchReport, board_id: u64, account: Option<&str>) {
    println!("\n📊 BATCH PROCESSING SUMMARY");
    println!(
        "\n✅ Successfully processed: {}/{} items",
        report.succeeded(),
        report.total_items
    );
    println!("   • Created: {}", report.created());
    println!("   • Updated: {}", report.updated());
    if report.cancelled() > 0 {
        println!("   • Cancelled: {}", report.cancelled());
    }
    if report.aborted {
        println!(
            "   • Not visited: {}",
            report.total_items - report.outcomes.len() - report.failures.len()
        );
    }
    if !report.failures.is_empty() {
        println!("   • Failed: {}", report.failures.len());
    }

    for (title, action) in [
        ("📋 Items Created:", OutcomeAction::Created),
        ("🔄 Items Updated:", OutcomeAction::Updated),
    ] {
        let outcomes: Vec<&DuplicationOutcome> =
            report.outcomes.iter().filter(|o| o.action == action).collect();
        if outcomes.is_empty() {
            continue;
        }
        println!("\n{}", title);
        for outcome in outcomes {
            let id = outcome.dest_item_id.as_deref().unwrap_or("-");
            println!("   • {} (ID: {})", outcome.item_name, id);
            if let Some(account) = account {
                println!("     URL: {}", item_url(account, board_id, id));
            }
        }
    }

    if report.cancelled() > 0 {
        println!("\n⏭️  Items Cancelled:");
        for outcome in report
            .outcomes
            .iter()
            .filter(|o| o.action == OutcomeAction::Cancelled)
        {
            println!("   • {}", outcome.item_name);
        }
    }

    if !report.failures.is_empty() {
        println!("\n❌ Items Failed:");
        for failure in &report.failures {
            println!("   • {}: {}", failure.item_name, failure.error);
        }
    }
}

pub fn print_workflow_report(report: &WorkflowReport, account: Option<&str>) {
    for destination in &report.destinations {
        println!("\n📍 {}", destination.board_name);
        match &destination.result {
            Ok(DestinationResult::Single(outcome)) => {
                println!("   Action: {}", outcome.action);
                if let (Some(id), Some(account)) = (&outcome.dest_item_id, account) {
                    println!("   Item URL: {}", item_url(account, destination.board_id, id));
                }
            }
            Ok(DestinationResult::Batch(batch)) => {
                print_batch_summary(batch, destination.board_id, account);
            }
            Err(message) => println!("   ❌ {}", message),
        }
    }
    if report.aborted {
        println!("\n⏹️  Stopped by user; remaining items and destinations were skipped.");
    } else {
        println!("\n🎉 All destinations processed!");
    }
}
