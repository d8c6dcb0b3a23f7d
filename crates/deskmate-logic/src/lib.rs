//! Puzzle logic for the Deskmate schedule minigame.
//!
//! The player drags polyomino-like schedule blocks onto a small grid before
//! a countdown expires. This crate holds everything below the renderer:
//! occupancy and placement validation, pointer-to-cell mapping, the drag
//! gesture, the timed round and its resolution, and the day data that
//! feeds it. It has no engine or UI dependency; callers drive it with
//! pointer positions and frame deltas.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | JSON day catalog: named shapes and per-day round parameters |
//! | [`config`] | Round configuration and validation |
//! | [`constants`] | Defaults and player-facing text |
//! | [`drag`] | Pick up, preview, snap or revert a block |
//! | [`geometry`] | Canvas ↔ grid cell mapping and snap positions |
//! | [`grid`] | Occupancy grid, `can_place`/`place`/`remove`, cell states |
//! | [`piece`] | Schedule blocks and their placement state |
//! | [`round`] | Timed round controller, penalty and resolution callbacks |
//! | [`session`] | One attempt per in-game day, instruction screen, notices |
//! | [`shape`] | Rectangular occupancy masks |
//! | [`solver`] | Backtracking packer for checking day data |
//! | [`stats`] | Character stat ledger fed by round penalties |

pub mod catalog;
pub mod config;
pub mod constants;
pub mod drag;
pub mod geometry;
pub mod grid;
pub mod piece;
pub mod round;
pub mod session;
pub mod shape;
pub mod solver;
pub mod stats;
