//! Day catalog: named shapes plus per-day round parameters, loaded from JSON.
//!
//! Each day lists its schedule items and, in parallel, the shape name each
//! item uses. Everything else falls back to the defaults in
//! [`crate::constants::defaults`].

use crate::config::{
    default_grid_height, default_grid_width, default_penalty, default_time_limit, validate_config,
    ConfigError, RoundConfig,
};
use crate::geometry::{GridGeometry, Vec2};
use crate::round::RoundSettings;
use crate::shape::Shape;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse day catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no day {0} in the catalog")]
    UnknownDay(u32),
    #[error("day {0} appears more than once")]
    DuplicateDay(u32),
    #[error("day {day} uses unknown shape {name:?}")]
    UnknownShape { day: u32, name: String },
    #[error("day {day} has {items} schedule items but {blocks} blocks")]
    BlockCountMismatch { day: u32, items: usize, blocks: usize },
    #[error("day {day} is not playable: {}", summarize(.errors))]
    InvalidDay { day: u32, errors: Vec<ConfigError> },
}

fn summarize(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One in-game day's puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: u32,
    pub schedule_items: Vec<String>,
    /// Shape name per schedule item.
    pub blocks: Vec<String>,
    #[serde(default = "default_time_limit")]
    pub time_limit: f32,
    #[serde(default = "default_penalty")]
    pub dependency_penalty: i32,
    #[serde(default)]
    pub block_positions: Vec<Vec2>,
    #[serde(default = "default_grid_width")]
    pub grid_width: u32,
    #[serde(default = "default_grid_height")]
    pub grid_height: u32,
}

impl DayEntry {
    /// Resolve shape names against `catalog` into a round configuration.
    ///
    /// The result is not validated; `RoundController::start_round` does that.
    pub fn round_config(&self, catalog: &DayCatalog) -> Result<RoundConfig, CatalogError> {
        if self.schedule_items.len() != self.blocks.len() {
            return Err(CatalogError::BlockCountMismatch {
                day: self.day,
                items: self.schedule_items.len(),
                blocks: self.blocks.len(),
            });
        }
        let shapes = self
            .blocks
            .iter()
            .map(|name| {
                catalog
                    .shapes
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CatalogError::UnknownShape {
                        day: self.day,
                        name: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoundConfig {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            time_limit: self.time_limit,
            failure_penalty: self.dependency_penalty,
            labels: self.schedule_items.clone(),
            shapes,
            positions: self.block_positions.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayCatalog {
    /// Where the grid sits on the canvas.
    #[serde(default)]
    pub geometry: GridGeometry,
    pub shapes: BTreeMap<String, Shape>,
    pub days: Vec<DayEntry>,
}

impl DayCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn day(&self, day: u32) -> Result<&DayEntry, CatalogError> {
        self.days
            .iter()
            .find(|d| d.day == day)
            .ok_or(CatalogError::UnknownDay(day))
    }

    pub fn round_config(&self, day: u32) -> Result<RoundConfig, CatalogError> {
        self.day(day)?.round_config(self)
    }

    /// Engine settings for this catalog's canvas.
    pub fn round_settings(&self) -> RoundSettings {
        RoundSettings {
            geometry: self.geometry,
            ..RoundSettings::default()
        }
    }

    /// Check every day resolves to a valid configuration.
    pub fn validate(&self) -> Vec<CatalogError> {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        for entry in &self.days {
            if !seen.insert(entry.day) {
                errors.push(CatalogError::DuplicateDay(entry.day));
            }
            match entry.round_config(self) {
                Ok(config) => {
                    let problems = validate_config(&config);
                    if !problems.is_empty() {
                        errors.push(CatalogError::InvalidDay {
                            day: entry.day,
                            errors: problems,
                        });
                    }
                }
                Err(e) => errors.push(e),
            }
        }
        errors
    }
}

/// Random spawn anchors beside the grid, alternating left and right.
///
/// Returns an empty list when `grid` is not a valid rectangle.
pub fn scatter_positions(count: usize, grid: &GridGeometry, rng: &mut impl Rng) -> Vec<Vec2> {
    if !grid.is_valid() {
        return Vec::new();
    }
    let half_width = grid.width / 2.0;
    let bottom = grid.center_y - grid.height / 2.0;
    (0..count)
        .map(|i| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let dx = half_width * rng.gen_range(1.25..1.75);
            let y = rng.gen_range(bottom..=grid.top());
            Vec2::new(grid.center_x + side * dx, y)
        })
        .collect()
}
