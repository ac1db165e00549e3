//! The `timedquiz show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use timedquiz_core::model::{Outcome, Verdict};
use timedquiz_core::report::Report;

pub fn execute(report_path: PathBuf) -> Result<()> {
    let report = Report::load_json(&report_path)?;

    println!(
        "Bank: {} ({})  finished: {}  at {}",
        report.bank.name,
        report.bank.id,
        report.finish_reason,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Prompt", "Outcome", "Verdict", "Time"]);

    for record in &report.records {
        table.add_row(vec![
            Cell::new(record.number),
            Cell::new(&record.prompt),
            Cell::new(outcome_label(&record.outcome)),
            Cell::new(verdict_label(&record.verdict)),
            Cell::new(format!("{:.1}s", record.elapsed_ms as f64 / 1000.0)),
        ]);
    }

    println!("\n{table}\n");
    for line in report.summary_lines() {
        println!("{line}");
    }

    Ok(())
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Answered(choice) => format!("answered {choice}"),
        Outcome::TimedOut => "timed out".to_string(),
        Outcome::QuitRequested => "quit".to_string(),
    }
}

fn verdict_label(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Correct => "correct".to_string(),
        Verdict::Incorrect { expected } => format!("incorrect (expected {expected})"),
        Verdict::InvalidSelection { selected } => format!("invalid selection {selected}"),
        Verdict::TimedOut => "no answer".to_string(),
        Verdict::Quit => "quit".to_string(),
    }
}
