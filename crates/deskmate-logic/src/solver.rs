//! Backtracking packer used to check that day data is solvable.
//!
//! Blocks are tried in order; each is placed at the first origin (row by
//! row, left to right) that fits, backing out on dead ends. Day puzzles are
//! a handful of blocks, so exhaustive search is fine.

use crate::grid::{Grid, GridPos};
use crate::piece::PieceId;
use crate::shape::Shape;

/// Find an origin for every shape such that all fit without overlap.
pub fn solve(width: u32, height: u32, shapes: &[Shape]) -> Option<Vec<GridPos>> {
    let mut grid = Grid::new(width, height);
    let mut origins = Vec::with_capacity(shapes.len());
    if search(&mut grid, shapes, &mut origins) {
        Some(origins)
    } else {
        None
    }
}

fn search(grid: &mut Grid, shapes: &[Shape], origins: &mut Vec<GridPos>) -> bool {
    let index = origins.len();
    let Some(shape) = shapes.get(index) else {
        return true;
    };
    let id = PieceId(index as u32);
    let max_x = grid.width() as i32 - shape.width() as i32;
    let max_y = grid.height() as i32 - shape.height() as i32;
    for oy in 0..=max_y {
        for ox in 0..=max_x {
            let origin = GridPos::new(ox, oy);
            if !grid.can_place(shape, origin) {
                continue;
            }
            grid.place(shape, origin, id);
            origins.push(origin);
            if search(grid, shapes, origins) {
                return true;
            }
            origins.pop();
            grid.remove(id);
        }
    }
    false
}
