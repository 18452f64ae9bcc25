//! Automated player shared by `play` and `bench`
//!
//! Picks the first swap that clears something, else a random adjacent swap,
//! and feeds it to the session as two taps.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use candyline_core::{Coord, Direction};
use candyline_session::{Gesture, Presenter, Session, TurnOutcome};

/// Totals over a run of automated turns
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlayStats {
    pub turns: usize,
    pub resolved: usize,
    pub reverted: usize,
    pub cleared: usize,
    pub cascades: u64,
    pub longest_cascade: u32,
    pub score: u64,
}

impl PlayStats {
    pub fn record(&mut self, outcome: &TurnOutcome) {
        self.turns += 1;
        match outcome {
            TurnOutcome::Resolved {
                cleared,
                cascades,
                score_delta,
                ..
            } => {
                self.resolved += 1;
                self.cleared += cleared;
                self.cascades += *cascades as u64;
                self.longest_cascade = self.longest_cascade.max(*cascades);
                self.score += score_delta;
            }
            TurnOutcome::Reverted(_) => self.reverted += 1,
            _ => {}
        }
    }

    /// Fold another run into this one
    pub fn merge(&mut self, other: &PlayStats) {
        self.turns += other.turns;
        self.resolved += other.resolved;
        self.reverted += other.reverted;
        self.cleared += other.cleared;
        self.cascades += other.cascades;
        self.longest_cascade = self.longest_cascade.max(other.longest_cascade);
        self.score += other.score;
    }
}

/// Play one turn. Returns `None` when the board has no adjacent pair.
pub async fn play_turn<P: Presenter>(
    session: &mut Session<P>,
    rng: &mut ChaCha8Rng,
) -> Option<TurnOutcome> {
    let (from, to) = choose_swap(session, rng)?;
    session.handle_gesture(Gesture::Tap(from)).await;
    Some(session.handle_gesture(Gesture::Tap(to)).await)
}

/// Play up to `turns` turns
pub async fn play_turns<P: Presenter>(
    session: &mut Session<P>,
    turns: usize,
    rng: &mut ChaCha8Rng,
) -> PlayStats {
    let mut stats = PlayStats::default();
    for _ in 0..turns {
        match play_turn(session, rng).await {
            Some(outcome) => stats.record(&outcome),
            None => break,
        }
    }
    stats
}

/// Hinted swap if one exists, else a random adjacent pair
fn choose_swap<P: Presenter>(session: &Session<P>, rng: &mut ChaCha8Rng) -> Option<(Coord, Coord)> {
    if let Some(pair) = session.hint() {
        return Some((pair.from, pair.to));
    }

    let (rows, cols) = (session.board().rows(), session.board().cols());
    if rows * cols < 2 {
        return None;
    }
    loop {
        let from = Coord::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
        let targets: Vec<Coord> = Direction::ALL
            .iter()
            .filter_map(|&d| from.step(d, rows, cols))
            .collect();
        if let Some(&to) = targets.choose(rng) {
            return Some((from, to));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
