//! One-shot per-question deadline.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Armed,
    Fired,
    Disarmed,
}

/// A countdown that signals exactly once.
///
/// The countdown runs on its own task from the moment it is armed, so it
/// keeps progressing whether or not anyone is awaiting [`expired`].
///
/// [`expired`]: DeadlineTimer::expired
pub struct DeadlineTimer {
    deadline: Instant,
    signal: Option<oneshot::Receiver<()>>,
    task: JoinHandle<()>,
    state: TimerState,
}

impl DeadlineTimer {
    /// Start a countdown of `duration` from now.
    pub fn arm(duration: Duration) -> Self {
        let deadline = Instant::now() + duration;
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(());
        });
        Self {
            deadline,
            signal: Some(rx),
            task,
            state: TimerState::Armed,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.state == TimerState::Armed
    }

    pub fn has_fired(&self) -> bool {
        self.state == TimerState::Fired
    }

    /// Cancel the signal. No-op once the timer has fired or been disarmed.
    pub fn disarm(&mut self) {
        if self.state == TimerState::Armed {
            self.task.abort();
            self.signal = None;
            self.state = TimerState::Disarmed;
        }
    }

    /// Resolve when the deadline passes.
    ///
    /// Completes at most once over the timer's lifetime; after that, or after
    /// [`disarm`](Self::disarm), it never resolves. Cancel-safe.
    pub async fn expired(&mut self) {
        if let Some(signal) = self.signal.as_mut() {
            let fired = signal.await.is_ok();
            self.signal = None;
            if fired {
                self.state = TimerState::Fired;
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
