//! Session driver.
//!
//! Walks the bank in order, racing each question's deadline against the
//! participant's input, and produces a [`Report`] once the session reaches a
//! terminal state.

use std::sync::Arc;

use tokio::time::Instant;

use crate::arbiter::arbitrate;
use crate::collector::{Collected, Collector};
use crate::config::{LateInputPolicy, QuizConfig};
use crate::input::InputSource;
use crate::model::{FinishReason, Outcome, Question, QuestionBank, Verdict};
use crate::report::{QuestionRecord, Report};
use crate::timer::DeadlineTimer;
use crate::traits::QuizObserver;

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting on the question at this 0-based index.
    Running(usize),
    Finished(FinishReason),
}

impl SessionState {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::Finished(_))
    }
}

/// One participant working through one bank.
pub struct QuizSession {
    bank: QuestionBank,
    config: QuizConfig,
    observer: Arc<dyn QuizObserver>,
    state: SessionState,
    score: usize,
    records: Vec<QuestionRecord>,
}

impl QuizSession {
    pub fn new(bank: QuestionBank, config: QuizConfig, observer: Arc<dyn QuizObserver>) -> Self {
        Self {
            bank,
            config,
            observer,
            state: SessionState::Running(0),
            score: 0,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.bank.len()
    }

    /// Apply the outcome of the current question and advance.
    ///
    /// Returns `None` without touching the score if the session has already
    /// finished, so no question can be scored twice.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Verdict> {
        let SessionState::Running(index) = self.state else {
            return None;
        };
        let question = &self.bank.questions()[index];

        let verdict = match outcome {
            Outcome::Answered(k) => question.judge(k),
            Outcome::TimedOut => Verdict::TimedOut,
            Outcome::QuitRequested => Verdict::Quit,
        };
        if verdict.is_correct() {
            self.score += 1;
        }

        self.state = if verdict == Verdict::Quit {
            SessionState::Finished(FinishReason::Quit)
        } else if index + 1 >= self.bank.len() {
            SessionState::Finished(FinishReason::Completed)
        } else {
            SessionState::Running(index + 1)
        };
        Some(verdict)
    }

    /// Run the session to completion against `input`.
    pub async fn run(mut self, input: &InputSource) -> Report {
        let started = Instant::now();
        let quit_keyword: Arc<str> = Arc::from(self.config.quit_keyword.as_str());
        let time_limit = self.config.time_limit();
        let policy = self.config.late_input;

        tracing::info!(
            bank = %self.bank.id,
            questions = self.bank.len(),
            time_limit_secs = time_limit.as_secs(),
            ?policy,
            "session started"
        );
        self.observer.on_session_start(&self.bank, &self.config);

        if self.config.wait_for_start && input.next_line().await.is_none() {
            tracing::warn!("input closed before the session began");
            self.observer.on_input_closed();
            self.state = SessionState::Finished(FinishReason::Quit);
        }

        let mut previous = None;
        while let SessionState::Running(index) = self.state {
            if policy == LateInputPolicy::Discard && previous == Some(Outcome::TimedOut) {
                for line in input.drain_pending() {
                    tracing::debug!(question = index + 1, %line, "discarding input typed after deadline");
                }
            }

            let question = self.bank.questions()[index].clone();
            self.observer
                .on_question(index, self.bank.len(), &question, &quit_keyword);

            let asked = Instant::now();
            let mut timer = DeadlineTimer::arm(time_limit);
            let collector = Collector::new(
                index,
                input.clone(),
                Arc::clone(&quit_keyword),
                Arc::clone(&self.observer),
            );
            let outcome = match policy {
                LateInputPolicy::Discard => arbitrate(&mut timer, collector.run()).await,
                LateInputPolicy::Detach => {
                    let answer = collector.spawn_detached();
                    arbitrate(&mut timer, async move {
                        answer.await.unwrap_or(Collected::Closed)
                    })
                    .await
                }
            };
            let elapsed = asked.elapsed();
            tracing::debug!(question = index + 1, ?outcome, elapsed_ms = elapsed.as_millis() as u64, "question resolved");

            if let Some(verdict) = self.apply(outcome) {
                self.record(index, &question, outcome, verdict, elapsed.as_millis() as u64);
                self.observer.on_outcome(index, &question, &verdict);
            }
            previous = Some(outcome);
        }

        let reason = match self.state {
            SessionState::Finished(reason) => reason,
            SessionState::Running(_) => FinishReason::Completed,
        };
        let report = Report::new(
            &self.bank,
            &self.config,
            self.score,
            reason,
            self.records,
            started.elapsed(),
        );
        tracing::info!(
            correct = report.correct,
            total = report.total_questions,
            percentage = report.percentage,
            reason = %reason,
            "session finished"
        );
        self.observer.on_finish(&report);
        report
    }

    fn record(
        &mut self,
        index: usize,
        question: &Question,
        outcome: Outcome,
        verdict: Verdict,
        elapsed_ms: u64,
    ) {
        self.records.push(QuestionRecord {
            number: index + 1,
            prompt: question.prompt().to_string(),
            outcome,
            verdict,
            elapsed_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio::time::sleep;

    use crate::error::ResponseError;
    use crate::model::Tier;
    use crate::parser::builtin_bank;
    use crate::traits::NoopObserver;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Start,
        Question(usize),
        Invalid(String),
        Outcome(usize, Verdict),
        Closed,
        Finish(usize),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl QuizObserver for Recorder {
        fn on_session_start(&self, _: &QuestionBank, _: &QuizConfig) {
            self.push(Event::Start);
        }
        fn on_question(&self, index: usize, _: usize, _: &Question, _: &str) {
            self.push(Event::Question(index));
        }
        fn on_invalid_input(&self, error: &ResponseError) {
            self.push(Event::Invalid(error.input().to_string()));
        }
        fn on_outcome(&self, index: usize, _: &Question, verdict: &Verdict) {
            self.push(Event::Outcome(index, *verdict));
        }
        fn on_input_closed(&self) {
            self.push(Event::Closed);
        }
        fn on_finish(&self, report: &Report) {
            self.push(Event::Finish(report.correct));
        }
    }

    fn config(policy: LateInputPolicy) -> QuizConfig {
        QuizConfig {
            late_input: policy,
            wait_for_start: false,
            ..Default::default()
        }
    }

    fn session(policy: LateInputPolicy) -> (QuizSession, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let session = QuizSession::new(builtin_bank().unwrap(), config(policy), recorder.clone());
        (session, recorder)
    }

    /// An input source plus the sender feeding it.
    async fn scripted(lines: &[&str]) -> (InputSource, mpsc::Sender<String>) {
        let (tx, rx) = mpsc::channel(32);
        for line in lines {
            tx.send(line.to_string()).await.unwrap();
        }
        (InputSource::from_channel(rx), tx)
    }

    fn send_after(tx: &mpsc::Sender<String>, delay: Duration, line: &str) {
        let tx = tx.clone();
        let line = line.to_string();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(line).await;
        });
    }

    // --- pure state machine ---

    #[test]
    fn apply_walks_every_transition() {
        let (mut session, _) = session(LateInputPolicy::Discard);
        assert_eq!(session.state(), SessionState::Running(0));

        assert_eq!(session.apply(Outcome::Answered(3)), Some(Verdict::Correct));
        assert_eq!(session.score(), 1);
        assert_eq!(session.state(), SessionState::Running(1));

        assert_eq!(
            session.apply(Outcome::Answered(1)),
            Some(Verdict::Incorrect { expected: 2 })
        );
        assert_eq!(
            session.apply(Outcome::Answered(7)),
            Some(Verdict::InvalidSelection { selected: 7 })
        );
        assert_eq!(session.apply(Outcome::TimedOut), Some(Verdict::TimedOut));
        assert_eq!(session.score(), 1);
        assert_eq!(session.state(), SessionState::Running(4));

        assert_eq!(session.apply(Outcome::Answered(2)), Some(Verdict::Correct));
        assert_eq!(
            session.state(),
            SessionState::Finished(FinishReason::Completed)
        );
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn apply_after_finish_scores_nothing() {
        let (mut session, _) = session(LateInputPolicy::Discard);
        assert_eq!(session.apply(Outcome::QuitRequested), Some(Verdict::Quit));
        assert_eq!(session.state(), SessionState::Finished(FinishReason::Quit));

        assert_eq!(session.apply(Outcome::Answered(3)), None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn score_never_exceeds_total() {
        let (mut session, _) = session(LateInputPolicy::Discard);
        for _ in 0..20 {
            let before = session.score();
            session.apply(Outcome::Answered(2));
            assert!(session.score() >= before);
            assert!(session.score() <= session.total());
        }
        assert!(session.state().is_finished());
    }

    // --- full sessions ---

    #[tokio::test(start_paused = true)]
    async fn three_correct_of_five_passes_as_acceptable() {
        let (session, recorder) = session(LateInputPolicy::Discard);
        let (input, _tx) = scripted(&["3", "2", "1", "1", "4"]).await;

        let report = session.run(&input).await;

        assert_eq!(report.correct, 3);
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.percentage, 60.0);
        assert_eq!(report.tier, Tier::Acceptable);
        assert!(report.passed);
        assert_eq!(report.finish_reason, FinishReason::Completed);
        assert!(report.records.iter().all(|r| r.elapsed_ms == 0));
        assert_eq!(recorder.events().last(), Some(&Event::Finish(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn quit_on_third_question_halts_session() {
        let (session, recorder) = session(LateInputPolicy::Discard);
        let (input, _tx) = scripted(&["3", "1", "QUIT", "1", "2"]).await;

        let report = session.run(&input).await;

        assert_eq!(report.correct, 1);
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.percentage, 20.0);
        assert_eq!(report.tier, Tier::NeedsImprovement);
        assert!(!report.passed);
        assert_eq!(report.finish_reason, FinishReason::Quit);

        let asked: Vec<usize> = recorder
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::Question(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(asked, vec![0, 1, 2]);
        assert_eq!(input.next_line().await.as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_input_keeps_question_active() {
        let (session, recorder) = session(LateInputPolicy::Discard);
        let (input, _tx) = scripted(&["abc", "", "3", "2", "2", "1", "2"]).await;

        let report = session.run(&input).await;

        assert_eq!(report.correct, 5);
        assert_eq!(report.attempted, 5);
        let events = recorder.events();
        assert_eq!(
            &events[..5],
            &[
                Event::Start,
                Event::Question(0),
                Event::Invalid("abc".into()),
                Event::Invalid(String::new()),
                Event::Outcome(0, Verdict::Correct),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_input_does_not_extend_deadline() {
        let (session, _) = session(LateInputPolicy::Discard);
        let (input, tx) = scripted(&[]).await;
        for secs in [10, 20, 29] {
            send_after(&tx, Duration::from_secs(secs), "abc");
        }

        let start = Instant::now();
        let report = session.run(&input).await;

        assert_eq!(report.records[0].outcome, Outcome::TimedOut);
        assert!(report.records[0].elapsed_ms >= 30_000);
        assert!(report.records[0].elapsed_ms < 31_000);
        assert!(start.elapsed() >= Duration::from_secs(150));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_question_times_out_then_next_arms() {
        let (session, recorder) = session(LateInputPolicy::Discard);
        let (input, tx) = scripted(&[]).await;
        send_after(&tx, Duration::from_secs(35), "2");
        send_after(&tx, Duration::from_secs(36), "quit");

        let report = session.run(&input).await;

        assert_eq!(report.records[0].outcome, Outcome::TimedOut);
        assert_eq!(report.records[0].verdict, Verdict::TimedOut);
        assert_eq!(report.records[1].outcome, Outcome::Answered(2));
        assert!(report.records[1].elapsed_ms >= 4_000);
        assert!(report.records[1].elapsed_ms < 6_000);
        assert_eq!(report.correct, 1);
        assert_eq!(report.finish_reason, FinishReason::Quit);

        let events = recorder.events();
        let timed_out = events
            .iter()
            .position(|e| *e == Event::Outcome(0, Verdict::TimedOut))
            .unwrap();
        let second = events.iter().position(|e| *e == Event::Question(1)).unwrap();
        assert!(timed_out < second);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_after_deadline_is_not_credited_to_timed_out_question() {
        let (session, _) = session(LateInputPolicy::Discard);
        let (input, tx) = scripted(&[]).await;
        send_after(&tx, Duration::from_secs(31), "3");
        send_after(&tx, Duration::from_secs(32), "quit");

        let report = session.run(&input).await;

        assert_eq!(report.records[0].outcome, Outcome::TimedOut);
        assert_eq!(report.records[0].verdict, Verdict::TimedOut);
        assert_eq!(report.correct, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_ends_session_as_quit() {
        let (session, recorder) = session(LateInputPolicy::Discard);
        let (input, tx) = scripted(&["3"]).await;
        drop(tx);

        let report = session.run(&input).await;

        assert_eq!(report.finish_reason, FinishReason::Quit);
        assert_eq!(report.correct, 1);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.records[1].outcome, Outcome::QuitRequested);
        assert!(recorder.events().contains(&Event::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_start_line() {
        let recorder = Arc::new(Recorder::default());
        let config = QuizConfig {
            wait_for_start: true,
            ..Default::default()
        };
        let session = QuizSession::new(builtin_bank().unwrap(), config, recorder.clone());
        let (input, _tx) = scripted(&["", "3", "quit"]).await;

        let report = session.run(&input).await;

        assert_eq!(report.correct, 1);
        assert!(!recorder.events().iter().any(|e| matches!(e, Event::Invalid(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_before_start_attempts_nothing() {
        let recorder = Arc::new(Recorder::default());
        let config = QuizConfig {
            wait_for_start: true,
            ..Default::default()
        };
        let session = QuizSession::new(builtin_bank().unwrap(), config, recorder.clone());
        let (input, tx) = scripted(&[]).await;
        drop(tx);

        let report = session.run(&input).await;

        assert_eq!(report.attempted, 0);
        assert_eq!(report.finish_reason, FinishReason::Quit);
        assert_eq!(
            recorder.events(),
            vec![Event::Start, Event::Closed, Event::Finish(0)]
        );
    }

    // --- late input after a timeout ---
    //
    // Same script under both policies: question 1 times out at 30s, a line
    // meant for it arrives at 31s, a second line at 32s.

    #[tokio::test(start_paused = true)]
    async fn detach_policy_leaks_late_line_to_stray_collector() {
        let (session, _) = session(LateInputPolicy::Detach);
        let (input, tx) = scripted(&[]).await;
        send_after(&tx, Duration::from_secs(31), "3");
        send_after(&tx, Duration::from_secs(32), "2");
        send_after(&tx, Duration::from_secs(33), "quit");

        let report = session.run(&input).await;

        assert_eq!(report.records[0].outcome, Outcome::TimedOut);
        // "3" was swallowed by question 1's stray collector.
        assert_eq!(report.records[1].outcome, Outcome::Answered(2));
        assert_eq!(report.records[1].verdict, Verdict::Correct);
        assert_eq!(report.records[2].outcome, Outcome::QuitRequested);
        assert_eq!(report.correct, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_policy_hands_next_line_to_next_question() {
        let (session, _) = session(LateInputPolicy::Discard);
        let (input, tx) = scripted(&[]).await;
        send_after(&tx, Duration::from_secs(31), "3");
        send_after(&tx, Duration::from_secs(32), "2");
        send_after(&tx, Duration::from_secs(33), "quit");

        let report = session.run(&input).await;

        assert_eq!(report.records[0].outcome, Outcome::TimedOut);
        // No stray reader: question 2 sees the 31s line.
        assert_eq!(report.records[1].outcome, Outcome::Answered(3));
        assert_eq!(
            report.records[1].verdict,
            Verdict::Incorrect { expected: 2 }
        );
        assert_eq!(report.records[2].outcome, Outcome::Answered(2));
        assert_eq!(report.records[3].outcome, Outcome::QuitRequested);
        assert_eq!(report.correct, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detach_policy_answers_normally_without_timeouts() {
        let (session, _) = session(LateInputPolicy::Detach);
        let (input, _tx) = scripted(&["3", "2", "2", "1", "2"]).await;

        let report = session.run(&input).await;

        assert_eq!(report.correct, 5);
        assert_eq!(report.tier, Tier::Outstanding);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_without_an_observer() {
        let session = QuizSession::new(
            builtin_bank().unwrap(),
            config(LateInputPolicy::Discard),
            Arc::new(NoopObserver),
        );
        let (input, _tx) = scripted(&["3", "4", "quit"]).await;

        let report = session.run(&input).await;

        let verdicts: Vec<Verdict> = report.records.iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![Verdict::Correct, Verdict::Incorrect { expected: 2 }, Verdict::Quit]
        );
        assert_eq!(report.records[2].outcome, Outcome::QuitRequested);
        assert_eq!(report.finish_reason, FinishReason::Quit);
    }
}
