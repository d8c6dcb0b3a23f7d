//! Canvas-space geometry: mapping pointer positions to grid cells and
//! grid cells back to snap positions.
//!
//! Canvas space has `y` pointing up and is measured in the same units as
//! the grid image rectangle. Grid rows count downward from the top edge,
//! so the two vertical axes run in opposite directions:
//!
//! ```text
//!   top ──► row 0
//!           row 1
//!           ...
//!   bottom  row H-1
//! ```

use crate::grid::GridPos;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};

/// 2D canvas position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// The grid image's rectangle on the canvas (centre + size), plus a fixed
/// nudge applied to every snapped piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub snap_offset_x: f32,
    #[serde(default)]
    pub snap_offset_y: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            width: 400.0,
            height: 500.0,
            snap_offset_x: 0.0,
            snap_offset_y: 0.0,
        }
    }
}

impl GridGeometry {
    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center_y + self.height / 2.0
    }

    /// Usable as a layout: finite, strictly positive size.
    pub fn is_valid(&self) -> bool {
        [self.center_x, self.center_y, self.snap_offset_x, self.snap_offset_y]
            .iter()
            .all(|v| v.is_finite())
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Split the rectangle into `columns × rows` cells.
    pub fn layout(&self, columns: u32, rows: u32) -> CellLayout {
        CellLayout {
            left: self.left(),
            top: self.top(),
            cell_width: self.width / columns.max(1) as f32,
            cell_height: self.height / rows.max(1) as f32,
            snap_offset: Vec2::new(self.snap_offset_x, self.snap_offset_y),
        }
    }
}

/// Per-round cell metrics derived from [`GridGeometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub left: f32,
    pub top: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub snap_offset: Vec2,
}

impl CellLayout {
    /// Grid cell under `point`, floored. May be out of range or negative.
    /// Non-finite input maps to `i32::MIN`, which no grid accepts.
    pub fn cell_at(&self, point: Vec2) -> GridPos {
        if !point.is_finite() {
            return GridPos::new(i32::MIN, i32::MIN);
        }
        let col = ((point.x - self.left) / self.cell_width).floor();
        let row = ((self.top - point.y) / self.cell_height).floor();
        // `as` saturates at the i32 range.
        GridPos::new(col as i32, row as i32)
    }

    /// Centre of cell `pos` on the canvas.
    pub fn cell_center(&self, pos: GridPos) -> Vec2 {
        Vec2::new(
            self.left + self.cell_width / 2.0 + pos.x as f32 * self.cell_width,
            self.top - self.cell_height / 2.0 - pos.y as f32 * self.cell_height,
        )
    }

    /// Anchor for a piece placed at `origin`: the origin cell's centre
    /// shifted to the middle of the shape's bounding box, plus the nudge.
    pub fn snap_position(&self, shape: &Shape, origin: GridPos) -> Vec2 {
        let corner = self.cell_center(origin);
        let center_offset = Vec2::new(
            (shape.width() as f32 - 1.0) * self.cell_width / 2.0,
            -(shape.height() as f32 - 1.0) * self.cell_height / 2.0,
        );
        corner + center_offset + self.snap_offset
    }
}
