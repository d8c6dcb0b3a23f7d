//! Occupancy grid and placement validation.
//!
//! The grid is the single source of truth for "can this shape go here".
//! Cells hold a back-reference to the piece covering them; pieces
//! themselves are owned by the round.

use crate::piece::PieceId;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};

/// A grid coordinate. `x` is the column, `y` the row (row 0 at the top).
/// Signed so that drag input can produce out-of-range candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One grid cell. Occupied iff it has an occupant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    occupant: Option<PieceId>,
}

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }
}

/// How a cell should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Normal,
    Highlighted,
    Occupied,
    Invalid,
}

/// Cells a dragged shape would cover, clipped to the grid, plus whether
/// the drop would be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub origin: GridPos,
    pub valid: bool,
    pub cells: Vec<GridPos>,
}

/// Fixed-size `width × height` occupancy table.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(Cell::is_occupied)
    }

    pub fn occupant(&self, pos: GridPos) -> Option<PieceId> {
        self.cell(pos).and_then(Cell::occupant)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Cells currently claimed by `piece`, row-major.
    pub fn cells_of(&self, piece: PieceId) -> Vec<GridPos> {
        self.positions()
            .filter(|&pos| self.occupant(pos) == Some(piece))
            .collect()
    }

    /// Every coordinate in the grid, row-major.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPos::new(x, y)))
    }

    /// True when `shape` anchored at `origin` lies inside the grid and
    /// covers only empty cells. Negative origins are rejected.
    pub fn can_place(&self, shape: &Shape, origin: GridPos) -> bool {
        if origin.x < 0 || origin.y < 0 {
            return false;
        }
        let right = origin.x as i64 + shape.width() as i64;
        let bottom = origin.y as i64 + shape.height() as i64;
        if right > self.width as i64 || bottom > self.height as i64 {
            return false;
        }
        shape.cells_at(origin).all(|pos| !self.is_occupied(pos))
    }

    /// Claim the cells of `shape` at `origin` for `piece`.
    ///
    /// Callers must have checked [`Grid::can_place`] with the same
    /// arguments; this does not re-validate. Cells outside the grid are
    /// skipped rather than indexed.
    pub fn place(&mut self, shape: &Shape, origin: GridPos, piece: PieceId) {
        for pos in shape.cells_at(origin) {
            if let Some(i) = self.index(pos) {
                self.cells[i].occupant = Some(piece);
            }
        }
    }

    /// Release every cell held by `piece`. Idempotent.
    pub fn remove(&mut self, piece: PieceId) {
        for cell in &mut self.cells {
            if cell.occupant == Some(piece) {
                cell.occupant = None;
            }
        }
    }

    /// Cells `shape` would cover at `origin`, clipped to the grid.
    pub fn preview(&self, shape: &Shape, origin: GridPos) -> Preview {
        Preview {
            origin,
            valid: self.can_place(shape, origin),
            cells: shape
                .cells_at(origin)
                .filter(|&pos| self.contains(pos))
                .collect(),
        }
    }

    /// Visual state of a cell, with an optional live preview on top.
    pub fn cell_state(&self, pos: GridPos, preview: Option<&Preview>) -> CellState {
        if let Some(p) = preview {
            if p.cells.contains(&pos) {
                return if p.valid {
                    CellState::Highlighted
                } else {
                    CellState::Invalid
                };
            }
        }
        if self.is_occupied(pos) {
            CellState::Occupied
        } else {
            CellState::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Shape {
        Shape::from_rows(&["##", "##"]).unwrap()
    }

    #[test]
    fn square_on_four_by_five() {
        let mut grid = Grid::new(4, 5);
        let sq = square();
        assert!(!grid.can_place(&sq, GridPos::new(3, 4)), "3+2 > 4 overflows width");
        assert!(grid.can_place(&sq, GridPos::new(2, 3)), "fits flush bottom-right");

        grid.place(&sq, GridPos::new(2, 3), PieceId(0));
        assert_eq!(grid.occupied_count(), 4);
        assert!(!grid.can_place(&sq, GridPos::new(2, 3)));
        let dot = Shape::filled(1, 1).unwrap();
        assert!(!grid.can_place(&dot, GridPos::new(3, 4)));
        assert!(grid.can_place(&dot, GridPos::new(1, 3)));
    }

    #[test]
    fn negative_origins_rejected() {
        let grid = Grid::new(4, 5);
        let dot = Shape::filled(1, 1).unwrap();
        assert!(!grid.can_place(&dot, GridPos::new(-1, 0)));
        assert!(!grid.can_place(&dot, GridPos::new(0, -1)));
        assert!(!grid.can_place(&dot, GridPos::new(i32::MIN, i32::MIN)));
    }

    #[test]
    fn huge_origin_does_not_overflow() {
        let grid = Grid::new(4, 5);
        let dot = Shape::filled(1, 1).unwrap();
        assert!(!grid.can_place(&dot, GridPos::new(i32::MAX, i32::MAX)));
    }

    #[test]
    fn bounds_hold_for_every_origin() {
        let grid = Grid::new(4, 5);
        let ell = Shape::from_rows(&["#.", "#.", "##"]).unwrap();
        for y in -4..8 {
            for x in -4..8 {
                let origin = GridPos::new(x, y);
                let inside = ell.cells_at(origin).all(|p| grid.contains(p));
                assert_eq!(
                    grid.can_place(&ell, origin),
                    inside,
                    "origin ({x},{y}) on an empty grid"
                );
            }
        }
    }

    #[test]
    fn empty_corner_of_shape_may_overlap() {
        let mut grid = Grid::new(3, 3);
        grid.place(&Shape::filled(1, 1).unwrap(), GridPos::new(1, 0), PieceId(7));
        let hook = Shape::from_rows(&[".#", "##"]).unwrap();
        assert!(!grid.can_place(&hook, GridPos::new(0, 0)), "local (1,0) lands on (1,0)");
        assert!(grid.can_place(&hook, GridPos::new(1, 0)), "empty local (0,0) lands on (1,0)");
        let cup = Shape::from_rows(&["#.#", "###"]).unwrap();
        assert!(grid.can_place(&cup, GridPos::new(0, 0)), "hole sits over the occupied cell");
    }

    #[test]
    fn remove_restores_placeability() {
        let mut grid = Grid::new(4, 5);
        let sq = square();
        grid.place(&sq, GridPos::new(1, 1), PieceId(3));
        assert_eq!(grid.cells_of(PieceId(3)).len(), 4);
        grid.remove(PieceId(3));
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.can_place(&sq, GridPos::new(1, 1)));
    }

    #[test]
    fn remove_only_clears_own_cells() {
        let mut grid = Grid::new(4, 5);
        grid.place(&square(), GridPos::new(0, 0), PieceId(1));
        grid.place(&square(), GridPos::new(2, 0), PieceId(2));
        grid.remove(PieceId(1));
        assert_eq!(grid.occupied_count(), 4);
        assert_eq!(grid.occupant(GridPos::new(2, 0)), Some(PieceId(2)));
        assert_eq!(grid.occupant(GridPos::new(0, 0)), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut grid = Grid::new(4, 5);
        grid.place(&square(), GridPos::new(0, 0), PieceId(1));
        let before: Vec<_> = grid.positions().map(|p| grid.occupant(p)).collect();
        grid.remove(PieceId(9));
        grid.remove(PieceId(9));
        let after: Vec<_> = grid.positions().map(|p| grid.occupant(p)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn place_skips_out_of_range_cells() {
        let mut grid = Grid::new(2, 2);
        grid.place(&square(), GridPos::new(1, 1), PieceId(0));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn preview_clips_to_grid() {
        let grid = Grid::new(4, 5);
        let preview = grid.preview(&square(), GridPos::new(3, 4));
        assert!(!preview.valid);
        assert_eq!(preview.cells, vec![GridPos::new(3, 4)]);

        let preview = grid.preview(&square(), GridPos::new(-1, -1));
        assert!(!preview.valid);
        assert_eq!(preview.cells, vec![GridPos::new(0, 0)]);
    }

    #[test]
    fn cell_state_layers_preview_over_occupancy() {
        let mut grid = Grid::new(4, 5);
        grid.place(&square(), GridPos::new(0, 0), PieceId(0));
        assert_eq!(grid.cell_state(GridPos::new(0, 0), None), CellState::Occupied);
        assert_eq!(grid.cell_state(GridPos::new(3, 3), None), CellState::Normal);

        let bad = grid.preview(&square(), GridPos::new(1, 1));
        assert_eq!(grid.cell_state(GridPos::new(1, 1), Some(&bad)), CellState::Invalid);
        assert_eq!(grid.cell_state(GridPos::new(2, 2), Some(&bad)), CellState::Invalid);
        assert_eq!(grid.cell_state(GridPos::new(0, 0), Some(&bad)), CellState::Occupied);

        let good = grid.preview(&square(), GridPos::new(2, 2));
        assert_eq!(grid.cell_state(GridPos::new(3, 3), Some(&good)), CellState::Highlighted);
    }
}
