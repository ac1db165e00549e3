//! Answer collection from the interactive source.
//!
//! A collector reads lines until one parses as either the quit keyword or an
//! integer. Lines that parse as neither are reported to the observer and
//! skipped; they never end the question.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::ResponseError;
use crate::input::InputSource;
use crate::traits::QuizObserver;

/// A successfully parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Quit,
    Choice(i64),
}

/// Parse one raw line. Surrounding whitespace is ignored and the quit
/// keyword is matched case-insensitively.
pub fn parse_response(line: &str, quit_keyword: &str) -> Result<Response, ResponseError> {
    let trimmed = line.trim();
    if trimmed.to_lowercase() == quit_keyword.trim().to_lowercase() {
        return Ok(Response::Quit);
    }
    trimmed
        .parse::<i64>()
        .map(Response::Choice)
        .map_err(|_| ResponseError::NotANumber(trimmed.to_string()))
}

/// The single value a collector emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collected {
    Quit,
    Choice(i64),
    /// The source ended before a valid line arrived.
    Closed,
}

impl From<Response> for Collected {
    fn from(response: Response) -> Self {
        match response {
            Response::Quit => Collected::Quit,
            Response::Choice(k) => Collected::Choice(k),
        }
    }
}

/// Collects one answer for one question.
pub struct Collector {
    question: usize,
    input: InputSource,
    quit_keyword: Arc<str>,
    observer: Arc<dyn QuizObserver>,
}

impl Collector {
    pub fn new(
        question: usize,
        input: InputSource,
        quit_keyword: Arc<str>,
        observer: Arc<dyn QuizObserver>,
    ) -> Self {
        Self {
            question,
            input,
            quit_keyword,
            observer,
        }
    }

    /// Read until a line parses. Reports closure of the source.
    pub async fn run(&self) -> Collected {
        let collected = self.read_answer().await;
        if collected == Collected::Closed {
            self.report_closed();
        }
        collected
    }

    /// Run on a background task that outlives its question.
    ///
    /// The task is never cancelled. If nobody is listening by the time it
    /// parses a line, the value is dropped and that line is gone.
    pub fn spawn_detached(self) -> oneshot::Receiver<Collected> {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let collected = self.read_answer().await;
            if tx.is_closed() {
                tracing::debug!(
                    question = self.question + 1,
                    ?collected,
                    "question already resolved, dropping late answer"
                );
                return;
            }
            if collected == Collected::Closed {
                self.report_closed();
            }
            let _ = tx.send(collected);
        });
        rx
    }

    async fn read_answer(&self) -> Collected {
        loop {
            let Some(line) = self.input.next_line().await else {
                return Collected::Closed;
            };
            match parse_response(&line, &self.quit_keyword) {
                Ok(response) => return response.into(),
                Err(e) => {
                    tracing::debug!(question = self.question + 1, input = e.input(), "rejected input");
                    self.observer.on_invalid_input(&e);
                }
            }
        }
    }

    fn report_closed(&self) {
        tracing::warn!(question = self.question + 1, "input closed before an answer arrived");
        self.observer.on_input_closed();
    }
}
