//! Schedule blocks: a labelled shape plus placement state.

use crate::geometry::Vec2;
use crate::grid::GridPos;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};

/// Stable handle for a piece within one round. Grid cells store this as a
/// back-reference; it never owns the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// Where a piece currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Unplaced,
    /// On the grid with local `(0, 0)` at this cell.
    Placed(GridPos),
}

#[derive(Debug, Clone)]
pub struct Piece {
    id: PieceId,
    label: String,
    shape: Shape,
    placement: Placement,
    /// Canvas-space anchor (the centre of the rendered block).
    anchor: Vec2,
    spawn: Vec2,
}

impl Piece {
    pub fn new(id: PieceId, label: impl Into<String>, shape: Shape, spawn: Vec2) -> Self {
        Self {
            id,
            label: label.into(),
            shape,
            placement: Placement::Unplaced,
            anchor: spawn,
            spawn,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_placed(&self) -> bool {
        matches!(self.placement, Placement::Placed(_))
    }

    /// Grid origin while placed.
    pub fn origin(&self) -> Option<GridPos> {
        match self.placement {
            Placement::Placed(origin) => Some(origin),
            Placement::Unplaced => None,
        }
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    /// Record the piece as sitting on the grid at `origin`. Grid occupancy
    /// is the caller's job.
    pub fn mark_placed(&mut self, origin: GridPos) {
        self.placement = Placement::Placed(origin);
    }

    pub fn mark_unplaced(&mut self) {
        self.placement = Placement::Unplaced;
    }
}
