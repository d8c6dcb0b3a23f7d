//! Drag gestures: pointer input → candidate grid origin → commit or revert.
//!
//! Per piece the gesture runs Idle → Dragging → Idle:
//! 1. `begin` lifts the piece off the grid if it was placed and records the
//!    anchor it had when the gesture started
//! 2. `update` moves the anchor with the pointer (keeping the grab offset)
//!    and refreshes the live preview
//! 3. `release` places the piece if the pointer's cell accepts it and snaps
//!    the anchor over its cells; otherwise the anchor goes back to where
//!    this gesture started
//!
//! The candidate origin is the cell under the *pointer*, not under the
//! piece anchor.

use crate::geometry::{CellLayout, Vec2};
use crate::grid::{Grid, GridPos, Preview};
use crate::piece::{Piece, PieceId};

/// Result of letting go of a piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Committed to the grid; anchor snapped to `anchor`.
    Placed { origin: GridPos, anchor: Vec2 },
    /// Rejected; anchor restored to its pre-drag position.
    Reverted { origin: GridPos, anchor: Vec2 },
}

impl DropOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, DropOutcome::Placed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    piece: PieceId,
    start_anchor: Vec2,
    grab_offset: Vec2,
}

/// Tracks at most one in-flight gesture and its preview.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    gesture: Option<Gesture>,
    preview: Option<Preview>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Piece currently being dragged.
    pub fn dragged(&self) -> Option<PieceId> {
        self.gesture.map(|g| g.piece)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    /// Start dragging `piece` from `pointer`. A placed piece is removed from
    /// the grid and marked unplaced first.
    ///
    /// Returns `true` if the piece was lifted off the grid.
    pub fn begin(&mut self, piece: &mut Piece, grid: &mut Grid, pointer: Vec2) -> bool {
        let lifted = piece.is_placed();
        if lifted {
            grid.remove(piece.id());
            piece.mark_unplaced();
        }
        self.preview = None;
        self.gesture = Some(Gesture {
            piece: piece.id(),
            start_anchor: piece.anchor(),
            grab_offset: piece.anchor() - pointer,
        });
        lifted
    }

    /// Follow the pointer. Returns the preview's validity, or `None` when
    /// `piece` is not the one being dragged.
    pub fn update(
        &mut self,
        piece: &mut Piece,
        grid: &Grid,
        layout: &CellLayout,
        pointer: Vec2,
    ) -> Option<bool> {
        let gesture = self.gesture.filter(|g| g.piece == piece.id())?;
        if pointer.is_finite() {
            piece.set_anchor(pointer + gesture.grab_offset);
        }
        let origin = layout.cell_at(pointer);
        let preview = grid.preview(piece.shape(), origin);
        let valid = preview.valid;
        self.preview = Some(preview);
        Some(valid)
    }

    /// Let go at `pointer`. Returns `None` when `piece` is not the one
    /// being dragged.
    pub fn release(
        &mut self,
        piece: &mut Piece,
        grid: &mut Grid,
        layout: &CellLayout,
        pointer: Vec2,
    ) -> Option<DropOutcome> {
        let gesture = self.gesture.filter(|g| g.piece == piece.id())?;
        self.gesture = None;
        self.preview = None;

        let origin = layout.cell_at(pointer);
        if grid.can_place(piece.shape(), origin) {
            grid.place(piece.shape(), origin, piece.id());
            piece.mark_placed(origin);
            let anchor = layout.snap_position(piece.shape(), origin);
            piece.set_anchor(anchor);
            Some(DropOutcome::Placed { origin, anchor })
        } else {
            piece.set_anchor(gesture.start_anchor);
            Some(DropOutcome::Reverted {
                origin,
                anchor: gesture.start_anchor,
            })
        }
    }

    /// Drop the gesture without placing, restoring the pre-drag anchor.
    pub fn abort(&mut self, piece: &mut Piece) {
        if let Some(gesture) = self.gesture.filter(|g| g.piece == piece.id()) {
            piece.set_anchor(gesture.start_anchor);
            self.gesture = None;
        }
        self.preview = None;
    }
}
