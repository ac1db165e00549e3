//! Quiz configuration and loading.
//!
//! Every value here is read once at startup and stays fixed for the life of
//! a session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Tier;

/// What happens to a collector whose question has already timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateInputPolicy {
    /// Leave the collector running in the background. It keeps reading the
    /// shared input and silently drops what it parses, so the first line
    /// typed after a timeout never reaches the next question.
    Detach,
    /// Drop the collector with the timed-out question and discard any lines
    /// queued before the next question is shown.
    #[default]
    Discard,
}

impl std::str::FromStr for LateInputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detach" | "legacy" => Ok(LateInputPolicy::Detach),
            "discard" => Ok(LateInputPolicy::Discard),
            other => Err(format!("unknown late input policy: {other}")),
        }
    }
}

/// Percentage thresholds for each performance tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_outstanding")]
    pub outstanding: f64,
    #[serde(default = "default_very_good")]
    pub very_good: f64,
    #[serde(default = "default_acceptable")]
    pub acceptable: f64,
}

fn default_outstanding() -> f64 {
    90.0
}
fn default_very_good() -> f64 {
    75.0
}
fn default_acceptable() -> f64 {
    60.0
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            outstanding: default_outstanding(),
            very_good: default_very_good(),
            acceptable: default_acceptable(),
        }
    }
}

impl TierThresholds {
    /// Map a percentage onto its tier. Lower bounds are inclusive.
    pub fn classify(&self, percentage: f64) -> Tier {
        if percentage >= self.outstanding {
            Tier::Outstanding
        } else if percentage >= self.very_good {
            Tier::VeryGood
        } else if percentage >= self.acceptable {
            Tier::Acceptable
        } else {
            Tier::NeedsImprovement
        }
    }
}

/// Top-level quiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Seconds allowed per question.
    #[serde(default = "default_time_limit")]
    pub question_time_limit_secs: u64,
    /// Keyword that ends the session early, matched case-insensitively.
    #[serde(default = "default_quit_keyword")]
    pub quit_keyword: String,
    /// Minimum percentage that counts as a pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    #[serde(default)]
    pub tiers: TierThresholds,
    #[serde(default)]
    pub late_input: LateInputPolicy,
    /// Consume one line ("Press Enter to begin") before the first question.
    #[serde(default = "default_true")]
    pub wait_for_start: bool,
}

fn default_time_limit() -> u64 {
    30
}
fn default_quit_keyword() -> String {
    "quit".to_string()
}
fn default_pass_threshold() -> f64 {
    60.0
}
fn default_true() -> bool {
    true
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_time_limit_secs: default_time_limit(),
            quit_keyword: default_quit_keyword(),
            pass_threshold: default_pass_threshold(),
            tiers: TierThresholds::default(),
            late_input: LateInputPolicy::default(),
            wait_for_start: true,
        }
    }
}

impl QuizConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.question_time_limit_secs)
    }

    pub fn passed(&self, percentage: f64) -> bool {
        percentage >= self.pass_threshold
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.question_time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.quit_keyword.trim().is_empty() {
            return Err(ConfigError::BlankQuitKeyword);
        }
        for (name, value) in [
            ("pass", self.pass_threshold),
            ("outstanding", self.tiers.outstanding),
            ("very_good", self.tiers.very_good),
            ("acceptable", self.tiers.acceptable),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.tiers.outstanding < self.tiers.very_good
            || self.tiers.very_good < self.tiers.acceptable
        {
            return Err(ConfigError::UnorderedTiers);
        }
        Ok(())
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `timedquiz.toml` in the current directory
/// 2. `~/.config/timedquiz/config.toml`
///
/// Environment variable overrides: `TIMEDQUIZ_TIME_LIMIT`, `TIMEDQUIZ_QUIT_KEYWORD`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("timedquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.validate().context("invalid quiz configuration")?;
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizConfig) -> Result<()> {
    if let Ok(secs) = std::env::var("TIMEDQUIZ_TIME_LIMIT") {
        config.question_time_limit_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("TIMEDQUIZ_TIME_LIMIT is not a number: '{secs}'"))?;
    }
    if let Ok(keyword) = std::env::var("TIMEDQUIZ_QUIT_KEYWORD") {
        config.quit_keyword = keyword;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("timedquiz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QuizConfig::default();
        assert_eq!(config.time_limit(), Duration::from_secs(30));
        assert_eq!(config.quit_keyword, "quit");
        assert_eq!(config.late_input, LateInputPolicy::Discard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn classify_uses_inclusive_lower_bounds() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.classify(100.0), Tier::Outstanding);
        assert_eq!(tiers.classify(90.0), Tier::Outstanding);
        assert_eq!(tiers.classify(89.99), Tier::VeryGood);
        assert_eq!(tiers.classify(75.0), Tier::VeryGood);
        assert_eq!(tiers.classify(60.0), Tier::Acceptable);
        assert_eq!(tiers.classify(59.9), Tier::NeedsImprovement);
        assert_eq!(tiers.classify(0.0), Tier::NeedsImprovement);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let config = QuizConfig::default();
        assert!(config.passed(60.0));
        assert!(!config.passed(59.99));
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
question_time_limit_secs = 10
late_input = "detach"

[tiers]
outstanding = 95.0
"#;
        let config: QuizConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.question_time_limit_secs, 10);
        assert_eq!(config.late_input, LateInputPolicy::Detach);
        assert_eq!(config.tiers.outstanding, 95.0);
        assert_eq!(config.tiers.very_good, 75.0);
        assert_eq!(config.quit_keyword, "quit");
        assert!(config.wait_for_start);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = QuizConfig {
            question_time_limit_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeLimit));

        config.question_time_limit_secs = 5;
        config.quit_keyword = "  ".into();
        assert_eq!(config.validate(), Err(ConfigError::BlankQuitKeyword));

        config.quit_keyword = "exit".into();
        config.tiers.very_good = 95.0;
        assert_eq!(config.validate(), Err(ConfigError::UnorderedTiers));

        config.tiers.very_good = 75.0;
        config.pass_threshold = 120.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "pass", .. })
        ));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.toml");
        std::fs::write(&path, "quit_keyword = \"exit\"\nwait_for_start = false\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert!(!config.wait_for_start);
        assert!(
            config.quit_keyword == "exit" || std::env::var("TIMEDQUIZ_QUIT_KEYWORD").is_ok()
        );
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let err = load_config_from(Some(Path::new("/no/such/timedquiz.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn late_input_policy_from_str() {
        assert_eq!("Detach".parse::<LateInputPolicy>(), Ok(LateInputPolicy::Detach));
        assert_eq!("legacy".parse::<LateInputPolicy>(), Ok(LateInputPolicy::Detach));
        assert_eq!("discard".parse::<LateInputPolicy>(), Ok(LateInputPolicy::Discard));
        assert!("drop".parse::<LateInputPolicy>().is_err());
    }
}
