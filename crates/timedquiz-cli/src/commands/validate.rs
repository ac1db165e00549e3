//! The `timedquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use timedquiz_core::model::QuestionBank;
use timedquiz_core::parser::{load_bank_directory, parse_bank, validate_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks: Vec<QuestionBank> = if bank_path.is_dir() {
        load_bank_directory(&bank_path)?
    } else {
        vec![parse_bank(&bank_path)?]
    };
    if banks.is_empty() {
        anyhow::bail!("no valid question banks found in {}", bank_path.display());
    }

    let mut warning_count = 0;
    for bank in &banks {
        println!("Question bank: {} ({} questions)", bank.name, bank.len());
        for warning in validate_bank(bank) {
            match warning.question {
                Some(n) => println!("  [question {n}] WARNING: {}", warning.message),
                None => println!("  WARNING: {}", warning.message),
            }
            warning_count += 1;
        }
    }

    if warning_count == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{warning_count} warning(s) found.");
    }
    Ok(())
}
