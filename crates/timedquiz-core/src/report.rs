//! Final session report with JSON persistence.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::model::{FinishReason, Outcome, QuestionBank, Tier, Verdict};

/// What happened on one attempted question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 1-based position in the bank.
    pub number: usize,
    pub prompt: String,
    pub outcome: Outcome,
    pub verdict: Verdict,
    /// Time from the question being shown to its resolution.
    pub elapsed_ms: u64,
}

/// Summary of the bank a report was produced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
}

/// Read-only snapshot of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub bank: BankSummary,
    /// Size of the bank, even when the session ended early.
    pub total_questions: usize,
    pub correct: usize,
    /// Questions that produced an outcome, including the one quit on.
    pub attempted: usize,
    /// `correct / total_questions * 100`.
    pub percentage: f64,
    pub tier: Tier,
    pub passed: bool,
    pub finish_reason: FinishReason,
    pub records: Vec<QuestionRecord>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Percentage of `correct` over `total`. Zero when `total` is zero.
pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

impl Report {
    pub fn new(
        bank: &QuestionBank,
        config: &QuizConfig,
        correct: usize,
        finish_reason: FinishReason,
        records: Vec<QuestionRecord>,
        duration: Duration,
    ) -> Self {
        let total_questions = bank.len();
        let percentage = percentage(correct, total_questions);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
            },
            total_questions,
            correct,
            attempted: records.len(),
            percentage,
            tier: config.tiers.classify(percentage),
            passed: config.passed(percentage),
            finish_reason,
            records,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Closing message for the participant.
    pub fn pass_message(&self) -> &'static str {
        if self.passed {
            "Congratulations! You passed the quiz!"
        } else {
            "Keep practicing and try again. You'll improve!"
        }
    }

    /// The final results block, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            "--- Final Results ---".to_string(),
            format!("Total Questions: {}", self.total_questions),
            format!("Correct Answers: {}", self.correct),
            format!("Score Percentage: {:.2}%", self.percentage),
            format!("Performance: {}", self.tier),
            self.pass_message().to_string(),
        ]
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: Report =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
