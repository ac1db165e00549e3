//! Terminal rendering of a quiz session.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use timedquiz_core::config::QuizConfig;
use timedquiz_core::error::ResponseError;
use timedquiz_core::model::{Question, QuestionBank, Verdict};
use timedquiz_core::report::Report;
use timedquiz_core::traits::QuizObserver;

/// Writes prompts and feedback to stdout.
#[derive(Default)]
pub struct ConsoleObserver {
    input_closed: AtomicBool,
}

impl ConsoleObserver {
    fn flush() {
        let _ = std::io::stdout().flush();
    }
}

impl QuizObserver for ConsoleObserver {
    fn on_session_start(&self, bank: &QuestionBank, config: &QuizConfig) {
        println!("\nWelcome to the Interactive Quiz Platform!");
        println!("Bank: {}", bank.name);
        println!(
            "You have {}s for each question. Total questions: {}",
            config.question_time_limit_secs,
            bank.len()
        );
        if config.wait_for_start {
            println!("Press Enter to begin...");
        }
        Self::flush();
    }

    fn on_question(&self, index: usize, total: usize, question: &Question, quit_keyword: &str) {
        println!("\nQuestion {}/{}:", index + 1, total);
        println!("{}", question.prompt());
        for (i, choice) in question.choices().iter().enumerate() {
            println!("{}. {}", i + 1, choice);
        }
        print!(
            "\nEnter your answer (1-{}) or '{}' to exit: ",
            question.choice_count(),
            quit_keyword
        );
        Self::flush();
    }

    fn on_invalid_input(&self, error: &ResponseError) {
        println!("Error: {error}");
        Self::flush();
    }

    fn on_outcome(&self, _index: usize, _question: &Question, verdict: &Verdict) {
        match verdict {
            Verdict::Correct => println!("Correct!"),
            Verdict::Incorrect { expected } => {
                println!("Incorrect. The correct answer was: {expected}")
            }
            Verdict::InvalidSelection { .. } => println!("Invalid selection. No points scored."),
            Verdict::TimedOut => println!("\nTime's up! Proceeding to the next question..."),
            // End of input already explained itself.
            Verdict::Quit if self.input_closed.load(Ordering::Relaxed) => {}
            Verdict::Quit => println!("\nQuiz terminated by the participant."),
        }
        Self::flush();
    }

    fn on_input_closed(&self) {
        self.input_closed.store(true, Ordering::Relaxed);
        println!("\nInput closed. Ending the quiz.");
        Self::flush();
    }

    fn on_finish(&self, report: &Report) {
        println!();
        for line in report.summary_lines() {
            println!("{line}");
        }
        Self::flush();
    }
}
