//! Typed error definitions.
//!
//! Library errors are `thiserror` enums so callers can match on them; I/O
//! boundaries (reading banks, configs, reports) wrap these in `anyhow` with
//! file context attached.

use thiserror::Error;

/// Why a single question cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// Fewer than two choices were offered.
    #[error("{count} choice(s) given, at least 2 are required")]
    TooFewChoices { count: usize },

    /// The correct answer does not point at one of the choices.
    #[error("answer {answer} is outside choices 1-{count}")]
    AnswerOutOfRange { answer: usize, count: usize },

    /// The prompt text is blank.
    #[error("prompt is empty")]
    EmptyPrompt,
}

/// Problems with a question bank as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// A question in the bank is invalid. `number` is 1-based.
    #[error("question {number}: {source}")]
    Question {
        number: usize,
        #[source]
        source: QuestionError,
    },

    /// The bank contains no questions at all.
    #[error("question bank '{0}' contains no questions")]
    Empty(String),
}

/// A line of participant input that is neither a number nor the quit keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("please enter a valid number")]
    NotANumber(String),
}

impl ResponseError {
    /// The raw (trimmed) text that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            ResponseError::NotANumber(raw) => raw,
        }
    }
}

/// Invalid quiz configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("question time limit must be greater than zero")]
    ZeroTimeLimit,

    #[error("quit keyword must not be blank")]
    BlankQuitKeyword,

    #[error("{name} threshold {value} is outside 0-100")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("tier thresholds must satisfy outstanding >= very_good >= acceptable")]
    UnorderedTiers,
}
