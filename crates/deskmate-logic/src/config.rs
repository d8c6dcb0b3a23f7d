//! Round configuration and its validation.
//!
//! A [`RoundConfig`] is everything one timed attempt needs: grid size,
//! countdown, penalty, the blocks to place and where they spawn. It is
//! produced by the day data (see [`crate::catalog`]) and treated as
//! immutable for the round's lifetime.
//!
//! ```
//! use deskmate_logic::config::{validate_config, RoundConfig};
//! use deskmate_logic::geometry::Vec2;
//! use deskmate_logic::shape::Shape;
//!
//! let config = RoundConfig {
//!     labels: vec!["Lunch".into()],
//!     shapes: vec![Shape::filled(2, 2).unwrap()],
//!     positions: vec![Vec2::new(-330.0, 160.0)],
//!     ..RoundConfig::default()
//! };
//! assert!(validate_config(&config).is_empty());
//! ```

use crate::constants::defaults;
use crate::geometry::Vec2;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) fn default_grid_width() -> u32 {
    defaults::GRID_WIDTH
}

pub(crate) fn default_grid_height() -> u32 {
    defaults::GRID_HEIGHT
}

pub(crate) fn default_time_limit() -> f32 {
    defaults::TIME_LIMIT
}

pub(crate) fn default_penalty() -> i32 {
    defaults::DEPENDENCY_PENALTY
}

/// Parameters for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    #[serde(default = "default_grid_width")]
    pub grid_width: u32,
    #[serde(default = "default_grid_height")]
    pub grid_height: u32,
    /// Countdown in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: f32,
    /// Stat delta applied on timeout.
    #[serde(default = "default_penalty")]
    pub failure_penalty: i32,
    /// Display text per block, in spawn order.
    pub labels: Vec<String>,
    /// Shape per block, parallel to `labels`.
    pub shapes: Vec<Shape>,
    /// Initial canvas anchor per block, parallel to `labels`.
    pub positions: Vec<Vec2>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            grid_width: defaults::GRID_WIDTH,
            grid_height: defaults::GRID_HEIGHT,
            time_limit: defaults::TIME_LIMIT,
            failure_penalty: defaults::DEPENDENCY_PENALTY,
            labels: Vec::new(),
            shapes: Vec::new(),
            positions: Vec::new(),
        }
    }
}

impl RoundConfig {
    pub fn piece_count(&self) -> usize {
        self.labels.len()
    }

    /// Occupied cells across all shapes.
    pub fn total_cells(&self) -> usize {
        self.shapes.iter().map(Shape::cell_count).sum()
    }

    pub fn grid_area(&self) -> usize {
        (self.grid_width as usize).saturating_mul(self.grid_height as usize)
    }
}

/// A reason a configuration cannot start a round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must have between 1 and {} cells, got {width}×{height}", defaults::MAX_GRID_CELLS)]
    InvalidGridSize { width: u32, height: u32 },
    #[error("time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(f32),
    #[error("round has no blocks")]
    NoPieces,
    #[error("{labels} schedule items but {shapes} shape definitions")]
    ShapeCountMismatch { labels: usize, shapes: usize },
    #[error("{labels} schedule items but {positions} spawn positions")]
    PositionCountMismatch { labels: usize, positions: usize },
    #[error("spawn position {index} is not finite")]
    NonFinitePosition { index: usize },
    #[error("block {index} is {width}×{height}, larger than the {grid_width}×{grid_height} grid")]
    ShapeTooLarge {
        index: usize,
        width: u32,
        height: u32,
        grid_width: u32,
        grid_height: u32,
    },
    #[error("blocks cover {cells} cells but the grid only has {area}")]
    NotEnoughRoom { cells: usize, area: usize },
    #[error("grid image rectangle must be finite with a positive size")]
    InvalidGeometry,
}

/// Validate a round configuration, returning all errors found.
pub fn validate_config(config: &RoundConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let grid_ok = config.grid_width > 0
        && config.grid_height > 0
        && config.grid_area() <= defaults::MAX_GRID_CELLS;
    if !grid_ok {
        errors.push(ConfigError::InvalidGridSize {
            width: config.grid_width,
            height: config.grid_height,
        });
    }
    // Also rejects NaN.
    if !(config.time_limit > 0.0 && config.time_limit.is_finite()) {
        errors.push(ConfigError::InvalidTimeLimit(config.time_limit));
    }
    if config.labels.is_empty() {
        errors.push(ConfigError::NoPieces);
    }
    if config.labels.len() != config.shapes.len() {
        errors.push(ConfigError::ShapeCountMismatch {
            labels: config.labels.len(),
            shapes: config.shapes.len(),
        });
    }
    if config.labels.len() != config.positions.len() {
        errors.push(ConfigError::PositionCountMismatch {
            labels: config.labels.len(),
            positions: config.positions.len(),
        });
    }
    for (index, pos) in config.positions.iter().enumerate() {
        if !pos.is_finite() {
            errors.push(ConfigError::NonFinitePosition { index });
        }
    }

    if grid_ok {
        for (index, shape) in config.shapes.iter().enumerate() {
            if shape.width() > config.grid_width || shape.height() > config.grid_height {
                errors.push(ConfigError::ShapeTooLarge {
                    index,
                    width: shape.width(),
                    height: shape.height(),
                    grid_width: config.grid_width,
                    grid_height: config.grid_height,
                });
            }
        }
        let cells = config.total_cells();
        if cells > config.grid_area() {
            errors.push(ConfigError::NotEnoughRoom {
                cells,
                area: config.grid_area(),
            });
        }
    }

    errors
}
