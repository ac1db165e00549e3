//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::BankError;
use crate::model::{Question, QuestionBank};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    choices: Vec<String>,
    /// 1-based index into `choices`.
    answer: usize,
}

/// The question bank shipped with the binary.
pub const BUILTIN_BANK: &str = r#"[bank]
id = "general-knowledge"
name = "General Knowledge"
description = "Five mixed questions to warm up with"

[[questions]]
prompt = "Which city is the capital of France?"
choices = ["Berlin", "Madrid", "Paris", "Rome"]
answer = 3

[[questions]]
prompt = "What is the chemical symbol for water?"
choices = ["CO2", "H2O", "NaCl", "O2"]
answer = 2

[[questions]]
prompt = "Solve: 5 × 3 - 4"
choices = ["15", "11", "13", "9"]
answer = 2

[[questions]]
prompt = "Who is the author of 'Pride and Prejudice'?"
choices = ["Jane Austen", "Charles Dickens", "George Eliot", "Charlotte Brontë"]
answer = 1

[[questions]]
prompt = "Which continent is the Sahara Desert located in?"
choices = ["Asia", "Africa", "Australia", "South America"]
answer = 2
"#;

/// Parse the built-in bank.
pub fn builtin_bank() -> Result<QuestionBank> {
    parse_bank_str(BUILTIN_BANK, Path::new("<builtin>"))
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            Question::new(q.prompt, q.choices, q.answer).map_err(|source| BankError::Question {
                number: i + 1,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    let bank = QuestionBank::new(
        parsed.bank.id,
        parsed.bank.name,
        parsed.bank.description,
        questions,
    )
    .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    Ok(bank)
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for issues that do not prevent it from being used.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_prompts = HashSet::new();
    for (i, q) in bank.questions().iter().enumerate() {
        if !seen_prompts.insert(q.prompt().trim().to_lowercase()) {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: format!("duplicate prompt: {}", q.prompt()),
            });
        }
    }

    for (i, q) in bank.questions().iter().enumerate() {
        if q.choices().iter().any(|c| c.trim().is_empty()) {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: "one or more choices are empty".into(),
            });
        }

        let mut seen_choices = HashSet::new();
        if q.choices().iter().any(|c| !seen_choices.insert(c.trim())) {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: "choices contain duplicates".into(),
            });
        }
    }

    if bank.name.trim().is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "bank name is empty".into(),
        });
    }

    warnings
}
