//! Block shapes: rectangular boolean masks over local coordinates.
//!
//! A shape is indexed as `(x, y)` with `x` growing right and `y` growing
//! down, matching grid coordinates. Shapes never rotate or mirror.
//!
//! ```
//! use deskmate_logic::shape::Shape;
//!
//! let ell = Shape::from_rows(&["#.", "#.", "##"]).unwrap();
//! assert_eq!((ell.width(), ell.height()), (2, 3));
//! assert!(ell.get(1, 2));
//! assert!(!ell.get(1, 0));
//! assert_eq!(ell.cell_count(), 4);
//! ```

use crate::constants::glyphs;
use crate::grid::GridPos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a shape definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape has no rows or no columns")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unexpected glyph {glyph:?} in row {row}")]
    BadGlyph { row: usize, glyph: char },
    #[error("shape marks no occupied cells")]
    NoCells,
}

/// An immutable occupancy mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Shape {
    width: u32,
    height: u32,
    /// Row-major: index `y * width + x`.
    cells: Vec<bool>,
}

impl Shape {
    /// Build from rows of booleans, top row first.
    pub fn from_matrix(rows: &[Vec<bool>]) -> Result<Self, ShapeError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || width == 0 {
            return Err(ShapeError::Empty);
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(ShapeError::RaggedRow {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        if !cells.iter().any(|&c| c) {
            return Err(ShapeError::NoCells);
        }
        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            cells,
        })
    }

    /// Build from row strings using `#` for occupied and `.` for empty.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ShapeError> {
        let mut matrix = Vec::with_capacity(rows.len());
        for (row, text) in rows.iter().enumerate() {
            let mut values = Vec::new();
            for glyph in text.as_ref().chars() {
                match glyph {
                    glyphs::FILLED => values.push(true),
                    glyphs::EMPTY => values.push(false),
                    _ => return Err(ShapeError::BadGlyph { row, glyph }),
                }
            }
            matrix.push(values);
        }
        Self::from_matrix(&matrix)
    }

    /// A fully occupied `width × height` rectangle.
    pub fn filled(width: u32, height: u32) -> Result<Self, ShapeError> {
        let row = vec![true; width as usize];
        Self::from_matrix(&vec![row; height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether local cell `(x, y)` is occupied. Out-of-range is `false`.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[(y * self.width + x) as usize]
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied local cells in row-major order.
    pub fn local_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.get(x, y))
    }

    /// Grid cells covered when local `(0, 0)` sits at `origin`.
    /// Coordinates may fall outside any particular grid and saturate at
    /// the `i32` range.
    pub fn cells_at(&self, origin: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        self.local_cells().map(move |(x, y)| {
            GridPos::new(origin.x.saturating_add(x as i32), origin.y.saturating_add(y as i32))
        })
    }

    /// Row strings in `#`/`.` notation, top row first.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        if self.get(x, y) {
                            glyphs::FILLED
                        } else {
                            glyphs::EMPTY
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Vec<String>> for Shape {
    type Error = ShapeError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Shape> for Vec<String> {
    fn from(shape: Shape) -> Self {
        shape.to_rows()
    }
}
