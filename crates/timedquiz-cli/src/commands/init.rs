//! The `timedquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};

use timedquiz_core::parser::BUILTIN_BANK;

const CONFIG_PATH: &str = "timedquiz.toml";
const EXAMPLE_BANK_PATH: &str = "question-banks/example.toml";

pub fn execute() -> Result<()> {
    write_starter(Path::new(CONFIG_PATH), SAMPLE_CONFIG)?;
    write_starter(Path::new(EXAMPLE_BANK_PATH), BUILTIN_BANK)?;

    println!("\nTry it out:");
    println!("  timedquiz validate --bank {EXAMPLE_BANK_PATH}");
    println!("  timedquiz run --bank {EXAMPLE_BANK_PATH}");
    println!("\nAdd more [[questions]] entries, or drop new .toml banks into question-banks/.");

    Ok(())
}

/// Write `contents` to `path` unless something is already there.
fn write_starter(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# timedquiz configuration

question_time_limit_secs = 30
quit_keyword = "quit"
pass_threshold = 60.0

# "discard" drops input typed for a question that already timed out.
# "detach" keeps the stray reader alive and loses the next line.
late_input = "discard"
wait_for_start = true

[tiers]
outstanding = 90.0
very_good = 75.0
acceptable = 60.0
"#;
