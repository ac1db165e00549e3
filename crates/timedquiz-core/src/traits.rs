//! Core trait definitions.
//!
//! The session and its collectors never write to the terminal themselves;
//! everything the participant sees goes through a [`QuizObserver`].

use crate::config::QuizConfig;
use crate::error::ResponseError;
use crate::model::{Question, QuestionBank, Verdict};
use crate::report::Report;

/// Receives session progress for rendering or logging.
///
/// `on_invalid_input` may be called from a background collector task, so
/// implementations must be `Send + Sync`.
pub trait QuizObserver: Send + Sync {
    fn on_session_start(&self, bank: &QuestionBank, config: &QuizConfig);
    fn on_question(&self, index: usize, total: usize, question: &Question, quit_keyword: &str);
    fn on_invalid_input(&self, error: &ResponseError);
    fn on_outcome(&self, index: usize, question: &Question, verdict: &Verdict);
    fn on_input_closed(&self);
    fn on_finish(&self, report: &Report);
}

/// No-op observer.
pub struct NoopObserver;

impl QuizObserver for NoopObserver {
    fn on_session_start(&self, _: &QuestionBank, _: &QuizConfig) {}
    fn on_question(&self, _: usize, _: usize, _: &Question, _: &str) {}
    fn on_invalid_input(&self, _: &ResponseError) {}
    fn on_outcome(&self, _: usize, _: &Question, _: &Verdict) {}
    fn on_input_closed(&self) {}
    fn on_finish(&self, _: &Report) {}
}
