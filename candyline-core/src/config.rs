//! Game configuration
//!
//! All knobs a host can set for one session. Loaded from JSON or built in
//! code with the `with_*` helpers, then checked with [`GameConfig::validate`]
//! before any board is created.

use std::path::Path;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::Layout;
use crate::scoring::CANDY_SCORE;
use crate::tokens::Catalog;

/// Catalog size below which the refill loop tends to chain long cascades
pub const RECOMMENDED_MIN_TOKENS: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("token catalog is empty")]
    EmptyCatalog,
    #[error("token catalog has {size} kinds, at most 256 are supported")]
    CatalogTooLarge { size: usize },
    #[error("token #{0} has a blank name")]
    BlankToken(usize),
    #[error("duplicate token kind: {0}")]
    DuplicateToken(String),
    #[error("catalog of {size} kinds cannot fill a board without adjacent repeats (need {required})")]
    CatalogTooSmall { size: usize, required: usize },
    #[error("board must have at least one row and one column, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("invalid {name}: {value}")]
    InvalidLength { name: &'static str, value: f32 },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board row count
    pub rows: usize,
    /// Board column count
    pub cols: usize,
    /// Board width in world units; cells are square
    pub board_width: f32,
    /// Drag travel (world units) needed before a drag becomes a swap
    pub min_drag_distance: f32,
    /// Points per removed token
    pub token_score: u32,
    /// Token kinds
    pub catalog: Catalog,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Upper bound on full-board rescans in one turn
    pub max_cascades: u32,
    /// Longest wait for a single visual effect, in milliseconds (None = unbounded)
    pub effect_timeout_ms: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            board_width: 640.0,
            min_drag_distance: 20.0,
            token_score: CANDY_SCORE,
            catalog: Catalog::default(),
            seed: None,
            max_cascades: 64,
            effect_timeout_ms: Some(5_000),
        }
    }
}

impl GameConfig {
    /// Config for a `rows` x `cols` board with defaults elsewhere
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Set token kinds
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set points per removed token
    pub fn with_token_score(mut self, score: u32) -> Self {
        self.token_score = score;
        self
    }

    /// Set the cascade safety bound
    pub fn with_max_cascades(mut self, max: u32) -> Self {
        self.max_cascades = max;
        self
    }

    /// Set (or clear) the per-effect watchdog
    pub fn with_effect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.effect_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn effect_timeout(&self) -> Option<Duration> {
        self.effect_timeout_ms.map(Duration::from_millis)
    }

    /// RNG from the configured seed, or from entropy when unset
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.rows, self.cols, self.board_width)
    }

    /// Smallest catalog that can fill this board without adjacent repeats
    pub fn required_tokens(&self) -> usize {
        if self.rows * self.cols > 1 {
            2
        } else {
            1
        }
    }

    /// Check setup preconditions. A catalog too small for the adjacency rule
    /// is fatal here rather than surfacing mid-game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.board_width.is_finite() && self.board_width > 0.0) {
            return Err(ConfigError::InvalidLength {
                name: "board_width",
                value: self.board_width,
            });
        }
        if !(self.min_drag_distance.is_finite() && self.min_drag_distance >= 0.0) {
            return Err(ConfigError::InvalidLength {
                name: "min_drag_distance",
                value: self.min_drag_distance,
            });
        }

        let required = self.required_tokens();
        if self.catalog.len() < required {
            return Err(ConfigError::CatalogTooSmall {
                size: self.catalog.len(),
                required,
            });
        }
        if self.catalog.len() < RECOMMENDED_MIN_TOKENS {
            tracing::warn!(
                "catalog has only {} kinds; at least {} are recommended",
                self.catalog.len(),
                RECOMMENDED_MIN_TOKENS
            );
        }
        if self.max_cascades == 0 {
            tracing::warn!("max_cascades is 0; cascades after a swap will not be resolved");
        }

        Ok(())
    }

    /// Load from a JSON file and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout().cell_size(), 80.0);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = GameConfig::with_size(0, 5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { rows: 0, cols: 5 })
        ));
    }

    #[test]
    fn test_rejects_single_kind_catalog() {
        let config = GameConfig::with_size(4, 4).with_catalog(Catalog::new(["A"]).unwrap());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CatalogTooSmall { size: 1, required: 2 })
        ));

        let single_cell = GameConfig::with_size(1, 1).with_catalog(Catalog::new(["A"]).unwrap());
        assert!(single_cell.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut config = GameConfig::default();
        config.board_width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLength { .. })));

        let mut config = GameConfig::default();
        config.min_drag_distance = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLength { .. })));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;
        let config = GameConfig::default().with_seed(7);
        let (mut a, mut b) = (config.rng(), config.rng());
        for _ in 0..4 {
            assert_eq!(a.gen::<u32>(), b.gen::<u32>());
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"rows": 6, "cols": 5, "catalog": ["A","B","C","D"]}"#).unwrap();
        assert_eq!(config.rows, 6);
        assert_eq!(config.cols, 5);
        assert_eq!(config.catalog.len(), 4);
        assert_eq!(config.token_score, CANDY_SCORE);
        assert_eq!(config.effect_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("candyline-config-{}.json", std::process::id()));
        let config = GameConfig::with_size(5, 7).with_seed(99).with_token_score(25);
        config.save(&path).unwrap();
        let loaded = GameConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_catalog() {
        let path = std::env::temp_dir().join(format!("candyline-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"catalog": ["A", "A"]}"#).unwrap();
        let result = GameConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
