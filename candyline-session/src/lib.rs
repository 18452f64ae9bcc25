//! Candyline Session - Turn orchestration over a presenter
//!
//! This crate drives a `candyline-core` board through player turns:
//! - Presenter contract with awaitable effect completions
//! - Gesture handling (click-click and click-drag swaps)
//! - Resolution loop: swap, match, clear, collapse, refill, cascade
//! - Watchdog on presenter effects
//! - Channel driver that drops gestures while a turn is in flight

pub mod presenter;
pub mod gesture;
pub mod session;
pub mod driver;

// Re-exports for convenient access
pub use presenter::{
    join_all, ActorId, Completer, Completion, Effect, EffectMode, EffectStatus, HeadlessPresenter,
    JoinReport, Presenter,
};
pub use gesture::Gesture;
pub use session::{Session, SessionError, Snapshot, TurnOutcome, HIGHLIGHT_SCALE, NORMAL_SCALE};
pub use driver::{drive, gesture_channel, DriverReport, GESTURE_QUEUE};
