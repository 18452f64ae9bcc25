//! Presentation collaborator contract
//!
//! The session never draws anything. It tells a [`Presenter`] which visual
//! actors exist, where they sit and which effects to play, and waits on the
//! returned [`Completion`] signals before touching the board again.

use std::fmt;
use std::time::Duration;

use candyline_core::{Point, ScoreDelta, TokenId};
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio::time::Instant;

// ============================================================================
// COMPLETION SIGNALS
// ============================================================================

/// Sending half of an effect completion; call [`Completer::complete`] once
/// the effect has finished. Dropping it without completing counts as a
/// rejected effect.
#[derive(Debug)]
pub struct Completer {
    tx: oneshot::Sender<()>,
}

impl Completer {
    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

/// Receiving half of an effect completion
#[derive(Debug)]
pub struct Completion {
    rx: Option<oneshot::Receiver<()>>,
}

/// How a single awaited effect ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectStatus {
    Done,
    /// The watchdog fired first
    TimedOut,
    /// The completer was dropped without signalling
    Dropped,
}

impl Completion {
    /// A linked completer/completion pair
    pub fn pair() -> (Completer, Completion) {
        let (tx, rx) = oneshot::channel();
        (Completer { tx }, Completion { rx: Some(rx) })
    }

    /// An effect that is already finished
    pub fn ready() -> Self {
        Self { rx: None }
    }

    /// Wait for the effect, giving up at `deadline`
    pub async fn wait_until(self, deadline: Option<Instant>) -> EffectStatus {
        let Some(rx) = self.rx else {
            return EffectStatus::Done;
        };
        let result = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, rx).await {
                Ok(result) => result,
                Err(_) => return EffectStatus::TimedOut,
            },
            None => rx.await,
        };
        match result {
            Ok(()) => EffectStatus::Done,
            Err(_) => EffectStatus::Dropped,
        }
    }
}

/// Tally of a batch of awaited effects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub done: usize,
    pub timed_out: usize,
    pub dropped: usize,
}

impl JoinReport {
    pub fn is_clean(&self) -> bool {
        self.timed_out == 0 && self.dropped == 0
    }
}

/// Barrier over a batch of independent effects.
///
/// All effects share one deadline, so a batch never waits longer than
/// `timeout` in total. Timed out and dropped effects are counted as finished.
pub async fn join_all(completions: Vec<Completion>, timeout: Option<Duration>) -> JoinReport {
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut report = JoinReport::default();
    for completion in completions {
        match completion.wait_until(deadline).await {
            EffectStatus::Done => report.done += 1,
            EffectStatus::TimedOut => report.timed_out += 1,
            EffectStatus::Dropped => report.dropped += 1,
        }
    }
    report
}

// ============================================================================
// PRESENTER TRAIT
// ============================================================================

/// Host-side visual layer.
///
/// Positions are world-space cell centres computed by
/// [`candyline_core::Layout`]. Effects return immediately and report their
/// end through the returned [`Completion`].
pub trait Presenter {
    /// Opaque reference to one visual actor
    type Handle: fmt::Debug;

    /// Create a visual actor for a token kind
    fn instantiate(&mut self, token: TokenId) -> Self::Handle;

    /// Remove a visual actor for good
    fn destroy(&mut self, handle: Self::Handle);

    /// Snap a handle to a position without animating
    fn place(&mut self, handle: &Self::Handle, at: Point);

    /// Set scale without animating
    fn set_scale(&mut self, _handle: &Self::Handle, _scale: f32) {}

    /// Animate a handle between two positions (swaps and gravity slides)
    fn play_move(&mut self, handle: &Self::Handle, from: Point, to: Point) -> Completion;

    /// Animate a handle toward a scale (highlight and spawn pop-in)
    fn play_scale(&mut self, handle: &Self::Handle, scale: f32) -> Completion;

    /// Type-specific removal effect
    fn play_clear(&mut self, handle: &Self::Handle, token: TokenId) -> Completion;

    /// The running score changed
    fn score_changed(&mut self, _change: ScoreDelta) {}
}

// ============================================================================
// HEADLESS PRESENTER
// ============================================================================

/// Handle type of [`HeadlessPresenter`]
pub type ActorId = u32;

/// One recorded presenter call
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Instantiate { handle: ActorId, token: TokenId },
    Destroy { handle: ActorId },
    Place { handle: ActorId, at: Point },
    SetScale { handle: ActorId, scale: f32 },
    Move { handle: ActorId, from: Point, to: Point },
    Scale { handle: ActorId, scale: f32 },
    Clear { handle: ActorId, token: TokenId },
    Score(ScoreDelta),
}

/// How the headless presenter finishes effects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectMode {
    /// Every effect is already complete
    #[default]
    Immediate,
    /// Each effect completes after a fixed delay (needs a tokio runtime)
    Delayed(Duration),
    /// Effects never complete on their own. Completers are held until
    /// [`HeadlessPresenter::release_stalled`]; meant for watchdog tests, as
    /// the held set grows with every effect.
    Stalled,
    /// Completers are dropped on the spot
    Rejected,
}

/// In-memory presenter that records every call.
///
/// Used by the command line host and by tests.
#[derive(Debug)]
pub struct HeadlessPresenter {
    mode: EffectMode,
    record: bool,
    next_id: ActorId,
    live: FxHashMap<ActorId, TokenId>,
    effects: Vec<Effect>,
    held: Vec<Completer>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self {
            mode: EffectMode::Immediate,
            record: true,
            next_id: 0,
            live: FxHashMap::default(),
            effects: Vec::new(),
            held: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: EffectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Skip the effect log (long automated runs)
    pub fn without_recording(mut self) -> Self {
        self.record = false;
        self
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Number of actors instantiated and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn token_of(&self, handle: ActorId) -> Option<TokenId> {
        self.live.get(&handle).copied()
    }

    /// Number of completers held by [`EffectMode::Stalled`]
    pub fn stalled_count(&self) -> usize {
        self.held.len()
    }

    /// Complete every held effect. Returns how many were released.
    pub fn release_stalled(&mut self) -> usize {
        let released = self.held.len();
        for completer in self.held.drain(..) {
            completer.complete();
        }
        released
    }

    fn log(&mut self, effect: Effect) {
        if self.record {
            self.effects.push(effect);
        }
    }

    fn finish(&mut self) -> Completion {
        match self.mode {
            EffectMode::Immediate => Completion::ready(),
            EffectMode::Delayed(delay) => {
                let (completer, completion) = Completion::pair();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    completer.complete();
                });
                completion
            }
            EffectMode::Stalled => {
                let (completer, completion) = Completion::pair();
                self.held.push(completer);
                completion
            }
            EffectMode::Rejected => Completion::pair().1,
        }
    }
}

impl Presenter for HeadlessPresenter {
    type Handle = ActorId;

    fn instantiate(&mut self, token: TokenId) -> ActorId {
        let handle = self.next_id;
        self.next_id += 1;
        self.live.insert(handle, token);
        self.log(Effect::Instantiate { handle, token });
        handle
    }

    fn destroy(&mut self, handle: ActorId) {
        if self.live.remove(&handle).is_none() {
            tracing::warn!("destroying unknown actor {}", handle);
        }
        self.log(Effect::Destroy { handle });
    }

    fn place(&mut self, handle: &ActorId, at: Point) {
        self.log(Effect::Place { handle: *handle, at });
    }

    fn set_scale(&mut self, handle: &ActorId, scale: f32) {
        self.log(Effect::SetScale {
            handle: *handle,
            scale,
        });
    }

    fn play_move(&mut self, handle: &ActorId, from: Point, to: Point) -> Completion {
        self.log(Effect::Move {
            handle: *handle,
            from,
            to,
        });
        self.finish()
    }

    fn play_scale(&mut self, handle: &ActorId, scale: f32) -> Completion {
        self.log(Effect::Scale {
            handle: *handle,
            scale,
        });
        self.finish()
    }

    fn play_clear(&mut self, handle: &ActorId, token: TokenId) -> Completion {
        self.log(Effect::Clear {
            handle: *handle,
            token,
        });
        self.finish()
    }

    fn score_changed(&mut self, change: ScoreDelta) {
        self.log(Effect::Score(change));
    }
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_completion_is_done() {
        assert_eq!(Completion::ready().wait_until(None).await, EffectStatus::Done);
    }

    #[tokio::test]
    async fn test_completed_pair_is_done() {
        let (completer, completion) = Completion::pair();
        completer.complete();
        assert_eq!(completion.wait_until(None).await, EffectStatus::Done);
    }

    #[tokio::test]
    async fn test_dropped_completer_is_reported() {
        let (completer, completion) = Completion::pair();
        drop(completer);
        assert_eq!(completion.wait_until(None).await, EffectStatus::Dropped);
    }

    #[tokio::test]
    async fn test_join_all_times_out_once() {
        let (_held, stalled) = Completion::pair();
        let (_held2, stalled2) = Completion::pair();
        let start = std::time::Instant::now();
        let report = join_all(
            vec![Completion::ready(), stalled, stalled2],
            Some(Duration::from_millis(30)),
        )
        .await;
        assert_eq!(
            report,
            JoinReport {
                done: 1,
                timed_out: 2,
                dropped: 0
            }
        );
        assert!(!report.is_clean());
        // Shared deadline: two stalled effects do not double the wait
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_delayed_mode_completes() {
        let mut presenter = HeadlessPresenter::new().with_mode(EffectMode::Delayed(Duration::from_millis(5)));
        let handle = presenter.instantiate(2);
        let completion = presenter.play_clear(&handle, 2);
        assert_eq!(completion.wait_until(None).await, EffectStatus::Done);
    }

    #[tokio::test]
    async fn test_release_stalled_completes_held_effects() {
        let mut presenter = HeadlessPresenter::new().with_mode(EffectMode::Stalled);
        let handle = presenter.instantiate(1);
        let first = presenter.play_scale(&handle, 1.2);
        let second = presenter.play_clear(&handle, 1);
        assert_eq!(presenter.stalled_count(), 2);

        assert_eq!(presenter.release_stalled(), 2);
        assert_eq!(presenter.stalled_count(), 0);
        let report = join_all(vec![first, second], Some(Duration::from_secs(1))).await;
        assert_eq!(report.done, 2);
    }

    #[test]
    fn test_headless_tracks_live_actors() {
        let mut presenter = HeadlessPresenter::new();
        let a = presenter.instantiate(0);
        let b = presenter.instantiate(3);
        assert_ne!(a, b);
        assert_eq!(presenter.live_count(), 2);
        assert_eq!(presenter.token_of(b), Some(3));

        presenter.destroy(a);
        assert_eq!(presenter.live_count(), 1);
        assert_eq!(
            presenter.effects().last(),
            Some(&Effect::Destroy { handle: a })
        );
    }

    #[test]
    fn test_without_recording_keeps_log_empty() {
        let mut presenter = HeadlessPresenter::new().without_recording();
        let a = presenter.instantiate(0);
        presenter.place(&a, Point::new(1.0, 2.0));
        assert!(presenter.effects().is_empty());
        assert_eq!(presenter.live_count(), 1);
    }
}
