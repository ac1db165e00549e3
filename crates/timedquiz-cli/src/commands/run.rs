//! The `timedquiz run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use timedquiz_core::config::{load_config_from, LateInputPolicy};
use timedquiz_core::input::InputSource;
use timedquiz_core::parser;
use timedquiz_core::session::QuizSession;

use crate::console::ConsoleObserver;

/// Options for a single quiz run.
pub struct RunArgs {
    pub bank: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub time_limit: Option<u64>,
    pub late_input: Option<String>,
    pub no_intro: bool,
    pub output: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    // Load config, then let flags override it
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(secs) = args.time_limit {
        config.question_time_limit_secs = secs;
    }
    if let Some(policy) = &args.late_input {
        config.late_input = policy
            .parse::<LateInputPolicy>()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if args.no_intro {
        config.wait_for_start = false;
    }
    config.validate().context("invalid quiz configuration")?;

    // Load the bank
    let bank = match &args.bank {
        Some(path) => parser::parse_bank(path)?,
        None => parser::builtin_bank()?,
    };
    for warning in parser::validate_bank(&bank) {
        tracing::warn!("{}: {}", bank.id, warning.message);
    }

    let session = QuizSession::new(bank, config, Arc::new(ConsoleObserver::default()));
    let input = InputSource::stdin();
    let report = session.run(&input).await;

    if let Some(dir) = &args.output {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}
