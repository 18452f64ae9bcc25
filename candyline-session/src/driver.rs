//! Gesture intake loop
//!
//! Feeds gestures from a channel into a [`Session`] one at a time. While a
//! gesture is being handled, anything else that arrives is dropped, not
//! queued.

use tokio::sync::mpsc;

use crate::gesture::Gesture;
use crate::presenter::Presenter;
use crate::session::{Session, TurnOutcome};

/// Channel capacity used by [`gesture_channel`]
pub const GESTURE_QUEUE: usize = 64;

/// Sender/receiver pair for feeding [`drive`]
pub fn gesture_channel() -> (mpsc::Sender<Gesture>, mpsc::Receiver<Gesture>) {
    mpsc::channel(GESTURE_QUEUE)
}

/// What happened while the driver ran
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverReport {
    /// Outcome of every gesture that was handled, in order
    pub outcomes: Vec<TurnOutcome>,
    /// Gestures that arrived while the session was busy
    pub dropped: usize,
}

/// Run until every sender is gone and the last gesture has been handled
pub async fn drive<P: Presenter>(
    session: &mut Session<P>,
    mut gestures: mpsc::Receiver<Gesture>,
) -> DriverReport {
    let mut report = DriverReport::default();
    let mut open = true;

    while open {
        let Some(gesture) = gestures.recv().await else {
            break;
        };

        let turn = session.handle_gesture(gesture);
        tokio::pin!(turn);

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut turn => break outcome,
                next = gestures.recv(), if open => match next {
                    Some(late) => {
                        tracing::debug!("Dropping {:?} while resolving", late);
                        report.dropped += 1;
                    }
                    None => open = false,
                },
            }
        };
        report.outcomes.push(outcome);
    }

    tracing::debug!(
        "Gesture channel closed: {} handled, {} dropped",
        report.outcomes.len(),
        report.dropped
    );
    report
}
