//! Score accumulation

use serde::{Deserialize, Serialize};

/// Points per removed token when not configured
pub const CANDY_SCORE: u32 = 10;

/// One change to the running total
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub total: u64,
    pub delta: u64,
}

/// Running score; only ever grows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    total: u64,
    per_token: u32,
}

impl Scoreboard {
    pub fn new(per_token: u32) -> Self {
        Self {
            total: 0,
            per_token,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_token(&self) -> u32 {
        self.per_token
    }

    /// Credit `removed` tokens. Returns `None` when nothing changed.
    pub fn add(&mut self, removed: usize) -> Option<ScoreDelta> {
        let delta = (removed as u64).saturating_mul(self.per_token as u64);
        if delta == 0 {
            return None;
        }
        self.total = self.total.saturating_add(delta);
        Some(ScoreDelta {
            total: self.total,
            delta,
        })
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(CANDY_SCORE)
    }
}
