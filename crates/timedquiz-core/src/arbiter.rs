//! First-ready race between a question's timer and its collector.

use std::future::Future;

use crate::collector::Collected;
use crate::model::Outcome;
use crate::timer::DeadlineTimer;

/// Wait for whichever of `collector` and `timer` finishes first.
///
/// If the collector wins, the timer is disarmed before returning. If the
/// timer wins, `collector` is dropped: whether that stops the underlying
/// read depends on what the caller passed in (an inline read is cancelled,
/// a handle to a detached task is not).
///
/// A closed input source resolves as [`Outcome::QuitRequested`]. When both
/// sides are ready at once either may win.
pub async fn arbitrate<F>(timer: &mut DeadlineTimer, collector: F) -> Outcome
where
    F: Future<Output = Collected>,
{
    tokio::select! {
        collected = collector => {
            timer.disarm();
            match collected {
                Collected::Choice(k) => Outcome::Answered(k),
                Collected::Quit | Collected::Closed => Outcome::QuitRequested,
            }
        }
        () = timer.expired() => Outcome::TimedOut,
    }
}
