//! Core data model types for timedquiz.
//!
//! Questions and banks are immutable once built; outcomes and verdicts are
//! the values that flow from the arbiter into the session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BankError, QuestionError};

/// A single multiple-choice question.
///
/// Fields are private so a `Question` can only exist in a valid state:
/// a non-blank prompt, at least two choices, and a 1-based correct index
/// that points at one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    choices: Vec<String>,
    answer: usize,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        choices: Vec<String>,
        answer: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                count: choices.len(),
            });
        }
        if answer == 0 || answer > choices.len() {
            return Err(QuestionError::AnswerOutOfRange {
                answer,
                count: choices.len(),
            });
        }
        Ok(Self {
            prompt,
            choices,
            answer,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// 1-based index of the correct choice.
    pub fn answer(&self) -> usize {
        self.answer
    }

    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// Judge a selection made by the participant.
    pub fn judge(&self, selected: i64) -> Verdict {
        match usize::try_from(selected) {
            Ok(k) if (1..=self.choices.len()).contains(&k) => {
                if k == self.answer {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect {
                        expected: self.answer,
                    }
                }
            }
            _ => Verdict::InvalidSelection { selected },
        }
    }
}

/// An ordered, non-empty collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of the bank.
    pub description: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        let id = id.into();
        if questions.is_empty() {
            return Err(BankError::Empty(id));
        }
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            questions,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions; never zero.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// The single resolved result of one question round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choice", rename_all = "snake_case")]
pub enum Outcome {
    /// The participant submitted a number. Range is not checked yet.
    Answered(i64),
    /// The deadline passed before a valid answer arrived.
    TimedOut,
    /// The participant asked to stop the session.
    QuitRequested,
}

/// How the session judged an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect { expected: usize },
    InvalidSelection { selected: i64 },
    TimedOut,
    Quit,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every question in the bank was attempted.
    Completed,
    /// The participant quit early (or input ended).
    Quit,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Completed => write!(f, "completed"),
            FinishReason::Quit => write!(f, "quit"),
        }
    }
}

/// Named performance bracket derived from the score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Outstanding,
    VeryGood,
    Acceptable,
    NeedsImprovement,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Outstanding => write!(f, "Outstanding"),
            Tier::VeryGood => write!(f, "Very Good"),
            Tier::Acceptable => write!(f, "Acceptable"),
            Tier::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital_question() -> Question {
        Question::new(
            "Which city is the capital of France?",
            vec!["Berlin".into(), "Madrid".into(), "Paris".into(), "Rome".into()],
            3,
        )
        .unwrap()
    }

    #[test]
    fn question_rejects_bad_shapes() {
        assert_eq!(
            Question::new("q", vec!["only".into()], 1),
            Err(QuestionError::TooFewChoices { count: 1 })
        );
        assert_eq!(
            Question::new("q", vec!["a".into(), "b".into()], 3),
            Err(QuestionError::AnswerOutOfRange {
                answer: 3,
                count: 2
            })
        );
        assert_eq!(
            Question::new("q", vec!["a".into(), "b".into()], 0),
            Err(QuestionError::AnswerOutOfRange {
                answer: 0,
                count: 2
            })
        );
        assert_eq!(
            Question::new("   ", vec!["a".into(), "b".into()], 1),
            Err(QuestionError::EmptyPrompt)
        );
    }

    #[test]
    fn judge_covers_every_verdict() {
        let q = capital_question();
        assert_eq!(q.judge(3), Verdict::Correct);
        assert_eq!(q.judge(1), Verdict::Incorrect { expected: 3 });
        assert_eq!(q.judge(0), Verdict::InvalidSelection { selected: 0 });
        assert_eq!(q.judge(5), Verdict::InvalidSelection { selected: 5 });
        assert_eq!(q.judge(-2), Verdict::InvalidSelection { selected: -2 });
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = QuestionBank::new("none", "None", "", vec![]).unwrap_err();
        assert_eq!(err, BankError::Empty("none".into()));
    }

    #[test]
    fn tier_labels() {
        assert_eq!(Tier::VeryGood.to_string(), "Very Good");
        assert_eq!(Tier::NeedsImprovement.to_string(), "Needs Improvement");
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Outcome::Answered(2)).unwrap();
        assert_eq!(json, r#"{"kind":"answered","choice":2}"#);
        let json = serde_json::to_string(&Outcome::TimedOut).unwrap();
        assert_eq!(json, r#"{"kind":"timed_out"}"#);
    }
}
