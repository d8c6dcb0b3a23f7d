//! Round controller: one timed attempt from configuration to resolution.
//!
//! Phases: Idle → Active → Succeeded | Failed (| Cancelled).
//!
//! The controller is driven by an external frame loop through [`tick`].
//! Collaborators are injected at construction: a [`RoundListener`] that
//! hears `on_round_resolved` exactly once per resolved round, and a
//! [`StatSink`] that receives the failure penalty.
//!
//! After a round resolves it stays in its terminal phase for
//! `handoff_delay` seconds of ticks before the listener is notified and
//! the round is torn down. The penalty is applied immediately.
//!
//! [`tick`]: RoundController::tick
//!
//! ```
//! use deskmate_logic::config::RoundConfig;
//! use deskmate_logic::geometry::Vec2;
//! use deskmate_logic::grid::GridPos;
//! use deskmate_logic::piece::PieceId;
//! use deskmate_logic::round::{RoundController, RoundPhase};
//! use deskmate_logic::shape::Shape;
//! use deskmate_logic::stats::Stats;
//!
//! let mut resolved = Vec::new();
//! let mut stats = Stats::default();
//! let mut rounds = RoundController::new(&mut resolved, &mut stats);
//! rounds
//!     .start_round(RoundConfig {
//!         labels: vec!["Lunch".into()],
//!         shapes: vec![Shape::filled(2, 2).unwrap()],
//!         positions: vec![Vec2::new(-330.0, 160.0)],
//!         ..RoundConfig::default()
//!     })
//!     .unwrap();
//!
//! let target = rounds.layout().unwrap().cell_center(GridPos::new(2, 3));
//! rounds.begin_drag(PieceId(0), Vec2::new(-330.0, 160.0)).unwrap();
//! rounds.drag_to(target).unwrap();
//! assert!(rounds.end_drag(target).unwrap().is_placed());
//! assert!(rounds.commit().unwrap());
//! assert_eq!(rounds.phase(), RoundPhase::Succeeded);
//!
//! rounds.tick(2.0);
//! assert_eq!(rounds.phase(), RoundPhase::Idle);
//! drop(rounds);
//! assert_eq!(resolved, vec![true]);
//! ```

use crate::config::{validate_config, ConfigError, RoundConfig};
use crate::constants::{defaults, messages};
use crate::drag::{DragController, DropOutcome};
use crate::geometry::{CellLayout, GridGeometry, Vec2};
use crate::grid::{CellState, Grid, GridPos, Preview};
use crate::piece::{Piece, PieceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Receives stat changes. Only the failure penalty flows through here.
pub trait StatSink {
    fn apply_stat_delta(&mut self, delta: i32);
}

/// Hears how each round ended.
pub trait RoundListener {
    fn on_round_resolved(&mut self, success: bool);
}

impl<T: StatSink + ?Sized> StatSink for &mut T {
    fn apply_stat_delta(&mut self, delta: i32) {
        (**self).apply_stat_delta(delta);
    }
}

impl<T: RoundListener + ?Sized> RoundListener for &mut T {
    fn on_round_resolved(&mut self, success: bool) {
        (**self).on_round_resolved(success);
    }
}

/// Records outcomes in order.
impl RoundListener for Vec<bool> {
    fn on_round_resolved(&mut self, success: bool) {
        self.push(success);
    }
}

/// Lifecycle of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round loaded.
    Idle,
    /// Timer running, input accepted.
    Active,
    Succeeded,
    Failed,
    /// Abandoned by the caller. No penalty, no notification.
    Cancelled,
}

/// Engine tunables that are not part of the day data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundSettings {
    pub geometry: GridGeometry,
    /// Seconds between resolution and `on_round_resolved`.
    pub handoff_delay: f32,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            handoff_delay: defaults::HANDOFF_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    #[error("invalid round configuration ({} problems)", .0.len())]
    InvalidConfig(Vec<ConfigError>),
    #[error("no round is active")]
    NotActive,
    #[error("not every block is on the grid")]
    NotAllPlaced,
    #[error("no block with id {0:?} in this round")]
    UnknownPiece(PieceId),
    #[error("block {0:?} is already being dragged")]
    DragInProgress(PieceId),
    #[error("no drag in progress")]
    NoDrag,
    #[error("nothing to begin; open the schedule first")]
    NothingToBegin,
}

#[derive(Debug, Clone)]
struct Round {
    config: RoundConfig,
    grid: Grid,
    pieces: Vec<Piece>,
    layout: CellLayout,
    drag: DragController,
    remaining: f32,
    phase: RoundPhase,
    all_placed: bool,
    /// Seconds left before the listener hears about a resolved round.
    handoff: Option<f32>,
}

impl Round {
    fn build(config: RoundConfig, geometry: &GridGeometry) -> Self {
        let grid = Grid::new(config.grid_width, config.grid_height);
        let layout = geometry.layout(config.grid_width, config.grid_height);
        let pieces = config
            .labels
            .iter()
            .zip(&config.shapes)
            .zip(&config.positions)
            .enumerate()
            .map(|(i, ((label, shape), &spawn))| {
                Piece::new(PieceId(i as u32), label.clone(), shape.clone(), spawn)
            })
            .collect();
        Self {
            remaining: config.time_limit,
            config,
            grid,
            pieces,
            layout,
            drag: DragController::new(),
            phase: RoundPhase::Active,
            all_placed: false,
            handoff: None,
        }
    }

    fn refresh_completion(&mut self) {
        let all_placed = self.pieces.iter().all(Piece::is_placed);
        if all_placed != self.all_placed {
            log::debug!("all blocks placed: {}", all_placed);
        }
        self.all_placed = all_placed;
    }

    fn abort_drag(&mut self) {
        if let Some(id) = self.drag.dragged() {
            if let Some(piece) = self.pieces.get_mut(id.0 as usize) {
                self.drag.abort(piece);
            }
        }
        self.drag.clear_preview();
    }
}

/// Owns the active round and the injected collaborators.
pub struct RoundController<L, S> {
    listener: L,
    stats: S,
    settings: RoundSettings,
    round: Option<Round>,
    last_outcome: Option<RoundPhase>,
}

impl<L: RoundListener, S: StatSink> RoundController<L, S> {
    pub fn new(listener: L, stats: S) -> Self {
        Self::with_settings(listener, stats, RoundSettings::default())
    }

    pub fn with_settings(listener: L, stats: S, settings: RoundSettings) -> Self {
        Self {
            listener,
            stats,
            settings,
            round: None,
            last_outcome: None,
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut S {
        &mut self.stats
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    /// Validate `config` and start a new round.
    ///
    /// A round still running is cancelled; one waiting to hand off is
    /// handed off now. On error the previous round is left untouched.
    pub fn start_round(&mut self, config: RoundConfig) -> Result<(), RoundError> {
        let mut errors = validate_config(&config);
        if !self.settings.geometry.is_valid() {
            errors.push(ConfigError::InvalidGeometry);
        }
        if !errors.is_empty() {
            for e in &errors {
                log::warn!("rejecting round configuration: {}", e);
            }
            return Err(RoundError::InvalidConfig(errors));
        }

        self.teardown();
        log::info!(
            "starting round: {}×{} grid, {} blocks, {}s limit",
            config.grid_width,
            config.grid_height,
            config.piece_count(),
            config.time_limit
        );
        self.round = Some(Round::build(config, &self.settings.geometry));
        self.last_outcome = None;
        Ok(())
    }

    fn teardown(&mut self) {
        let Some(phase) = self.round.as_ref().map(|r| r.phase) else {
            return;
        };
        match phase {
            RoundPhase::Active => {
                self.round = None;
                self.last_outcome = Some(RoundPhase::Cancelled);
                log::info!("round cancelled by restart");
            }
            RoundPhase::Succeeded | RoundPhase::Failed => self.hand_off(),
            RoundPhase::Idle | RoundPhase::Cancelled => self.round = None,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.as_ref().map_or(RoundPhase::Idle, |r| r.phase)
    }

    pub fn is_active(&self) -> bool {
        self.phase() == RoundPhase::Active
    }

    /// How the current round ended, or the last one if none is loaded.
    /// `None` while a round is still being played.
    pub fn outcome(&self) -> Option<RoundPhase> {
        match &self.round {
            Some(round) if round.phase == RoundPhase::Active => None,
            Some(round) => Some(round.phase),
            None => self.last_outcome,
        }
    }

    pub fn config(&self) -> Option<&RoundConfig> {
        self.round.as_ref().map(|r| &r.config)
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.round.as_ref().map(|r| &r.grid)
    }

    pub fn layout(&self) -> Option<&CellLayout> {
        self.round.as_ref().map(|r| &r.layout)
    }

    pub fn pieces(&self) -> &[Piece] {
        self.round.as_ref().map_or(&[], |r| r.pieces.as_slice())
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces().get(id.0 as usize)
    }

    pub fn remaining_time(&self) -> f32 {
        self.round.as_ref().map_or(0.0, |r| r.remaining)
    }

    /// True while every block of the active round is on the grid. This is
    /// what unlocks [`commit`](Self::commit).
    pub fn all_placed(&self) -> bool {
        self.round
            .as_ref()
            .is_some_and(|r| r.phase == RoundPhase::Active && r.all_placed)
    }

    pub fn dragged(&self) -> Option<PieceId> {
        self.round.as_ref().and_then(|r| r.drag.dragged())
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.round.as_ref().and_then(|r| r.drag.preview())
    }

    pub fn cell_state(&self, pos: GridPos) -> CellState {
        match &self.round {
            Some(round) => round.grid.cell_state(pos, round.drag.preview()),
            None => CellState::Normal,
        }
    }

    /// Countdown text for the timer widget.
    pub fn timer_label(&self) -> String {
        match &self.round {
            Some(round) if round.phase == RoundPhase::Failed => messages::TIMER_FAILED.to_string(),
            Some(round) => format!("Time: {}s", round.remaining.ceil()),
            None if self.last_outcome == Some(RoundPhase::Failed) => {
                messages::TIMER_FAILED.to_string()
            }
            None => String::new(),
        }
    }

    /// Instruction line under the grid.
    pub fn status_message(&self) -> Option<&'static str> {
        match self.phase() {
            RoundPhase::Active if self.all_placed() => Some(messages::ALL_PLACED),
            RoundPhase::Active => Some(messages::DRAG_PROMPT),
            _ => match self.outcome() {
                Some(RoundPhase::Succeeded) => Some(messages::COMPLETED),
                Some(RoundPhase::Failed) => Some(messages::TIMED_OUT),
                _ => None,
            },
        }
    }

    fn active_round(&mut self) -> Result<&mut Round, RoundError> {
        match self.round.as_mut() {
            Some(round) if round.phase == RoundPhase::Active => Ok(round),
            _ => Err(RoundError::NotActive),
        }
    }

    /// Pick up a block. A placed block leaves the grid immediately.
    /// Returns whether it was lifted off the grid.
    pub fn begin_drag(&mut self, id: PieceId, pointer: Vec2) -> Result<bool, RoundError> {
        let round = self.active_round()?;
        if let Some(current) = round.drag.dragged() {
            return Err(RoundError::DragInProgress(current));
        }
        let piece = round
            .pieces
            .get_mut(id.0 as usize)
            .ok_or(RoundError::UnknownPiece(id))?;
        let lifted = round.drag.begin(piece, &mut round.grid, pointer);
        if lifted {
            log::debug!("picked up {:?} ({}) from the grid", id, piece.label());
            round.refresh_completion();
        }
        Ok(lifted)
    }

    /// Move the dragged block. Returns whether dropping here would succeed.
    pub fn drag_to(&mut self, pointer: Vec2) -> Result<bool, RoundError> {
        let round = self.active_round()?;
        let id = round.drag.dragged().ok_or(RoundError::NoDrag)?;
        let piece = round
            .pieces
            .get_mut(id.0 as usize)
            .ok_or(RoundError::UnknownPiece(id))?;
        round
            .drag
            .update(piece, &round.grid, &round.layout, pointer)
            .ok_or(RoundError::NoDrag)
    }

    /// Drop the dragged block at `pointer`.
    pub fn end_drag(&mut self, pointer: Vec2) -> Result<DropOutcome, RoundError> {
        let round = self.active_round()?;
        let id = round.drag.dragged().ok_or(RoundError::NoDrag)?;
        let piece = round
            .pieces
            .get_mut(id.0 as usize)
            .ok_or(RoundError::UnknownPiece(id))?;
        let outcome = round
            .drag
            .release(piece, &mut round.grid, &round.layout, pointer)
            .ok_or(RoundError::NoDrag)?;
        match outcome {
            DropOutcome::Placed { origin, .. } => {
                log::debug!("placed {:?} ({}) at {:?}", id, piece.label(), origin)
            }
            DropOutcome::Reverted { origin, .. } => {
                log::debug!("rejected drop of {:?} at {:?}", id, origin)
            }
        }
        round.refresh_completion();
        Ok(outcome)
    }

    /// Finalise a fully placed round as a success.
    ///
    /// Returns `Ok(true)` when this call resolved the round and `Ok(false)`
    /// when there is no unresolved round (a no-op).
    pub fn commit(&mut self) -> Result<bool, RoundError> {
        match self.round.as_ref().map(|r| (r.phase, r.all_placed)) {
            Some((RoundPhase::Active, true)) => {
                self.resolve(true);
                Ok(true)
            }
            Some((RoundPhase::Active, false)) => Err(RoundError::NotAllPlaced),
            _ => {
                log::debug!("commit ignored: no unresolved round");
                Ok(false)
            }
        }
    }

    /// Abandon the active round without penalty or notification.
    pub fn cancel(&mut self) -> Result<(), RoundError> {
        let round = self.active_round()?;
        round.abort_drag();
        round.phase = RoundPhase::Cancelled;
        self.round = None;
        self.last_outcome = Some(RoundPhase::Cancelled);
        log::info!("round cancelled");
        Ok(())
    }

    /// Advance time by `dt` seconds. Non-positive or NaN steps are ignored.
    pub fn tick(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let phase = round.phase;
        match phase {
            RoundPhase::Active => {
                round.remaining = (round.remaining - dt).max(0.0);
                if round.remaining <= 0.0 {
                    self.resolve(false);
                }
            }
            RoundPhase::Succeeded | RoundPhase::Failed => {
                let left = round.handoff.map_or(0.0, |t| t - dt);
                round.handoff = Some(left);
                if left <= 0.0 {
                    self.hand_off();
                }
            }
            RoundPhase::Idle | RoundPhase::Cancelled => {}
        }
    }

    fn resolve(&mut self, success: bool) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.phase != RoundPhase::Active {
            log::debug!("ignoring second resolution ({:?})", round.phase);
            return;
        }
        round.abort_drag();
        if success {
            round.phase = RoundPhase::Succeeded;
            log::info!("schedule completed with {:.1}s left", round.remaining);
        } else {
            round.phase = RoundPhase::Failed;
            round.remaining = 0.0;
            log::info!(
                "schedule timed out; applying penalty {}",
                round.config.failure_penalty
            );
            self.stats.apply_stat_delta(round.config.failure_penalty);
        }
        let delay = self.settings.handoff_delay.max(0.0);
        round.handoff = Some(delay);
        if delay <= 0.0 {
            self.hand_off();
        }
    }

    fn hand_off(&mut self) {
        if let Some(round) = self.round.take() {
            let success = round.phase == RoundPhase::Succeeded;
            self.last_outcome = Some(round.phase);
            self.listener.on_round_resolved(success);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::stats::Stats;

    #[derive(Default)]
    struct Penalties(Vec<i32>);

    impl StatSink for Penalties {
        fn apply_stat_delta(&mut self, delta: i32) {
            self.0.push(delta);
        }
    }

    fn immediate() -> RoundSettings {
        RoundSettings {
            handoff_delay: 0.0,
            ..RoundSettings::default()
        }
    }

    fn two_squares() -> RoundConfig {
        RoundConfig {
            labels: vec!["Lunch".into(), "Gym".into()],
            shapes: vec![Shape::filled(2, 2).unwrap(), Shape::filled(2, 2).unwrap()],
            positions: vec![Vec2::new(-330.0, 160.0), Vec2::new(330.0, 160.0)],
            time_limit: 30.0,
            failure_penalty: -4,
            ..RoundConfig::default()
        }
    }

    fn controller() -> RoundController<Vec<bool>, Penalties> {
        RoundController::with_settings(Vec::new(), Penalties::default(), immediate())
    }

    fn place(
        rounds: &mut RoundController<Vec<bool>, Penalties>,
        id: PieceId,
        cell: GridPos,
    ) -> DropOutcome {
        let start = rounds.piece(id).unwrap().anchor();
        let target = rounds.layout().unwrap().cell_center(cell);
        rounds.begin_drag(id, start).unwrap();
        rounds.drag_to(target).unwrap();
        rounds.end_drag(target).unwrap()
    }

    #[test]
    fn start_round_spawns_pieces() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        assert_eq!(rounds.phase(), RoundPhase::Active);
        assert_eq!(rounds.pieces().len(), 2);
        assert_eq!(rounds.remaining_time(), 30.0);
        assert_eq!(rounds.piece(PieceId(1)).unwrap().anchor(), Vec2::new(330.0, 160.0));
        assert_eq!(rounds.grid().unwrap().occupied_count(), 0);
        assert_eq!(rounds.status_message(), Some(messages::DRAG_PROMPT));
    }

    #[test]
    fn invalid_config_rejected_without_touching_state() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(0, 0));

        let mut bad = two_squares();
        bad.labels.push("Dentist".into());
        let err = rounds.start_round(bad).unwrap_err();
        assert!(matches!(err, RoundError::InvalidConfig(ref e) if e.iter().any(|c| matches!(c, ConfigError::ShapeCountMismatch { .. }))));
        assert!(rounds.is_active());
        assert!(rounds.piece(PieceId(0)).unwrap().is_placed());
    }

    #[test]
    fn invalid_geometry_rejected() {
        let settings = RoundSettings {
            geometry: GridGeometry {
                width: 0.0,
                ..GridGeometry::default()
            },
            ..immediate()
        };
        let mut rounds = RoundController::with_settings(Vec::new(), Penalties::default(), settings);
        let err = rounds.start_round(two_squares()).unwrap_err();
        assert_eq!(err, RoundError::InvalidConfig(vec![ConfigError::InvalidGeometry]));
    }

    #[test]
    fn huge_grid_rejected_instead_of_allocating() {
        let mut rounds = controller();
        let config = RoundConfig {
            grid_width: 65_536,
            grid_height: 65_537,
            labels: vec!["Lunch".into()],
            shapes: vec![Shape::filled(1, 1).unwrap()],
            positions: vec![Vec2::ZERO],
            ..RoundConfig::default()
        };
        let err = rounds.start_round(config).unwrap_err();
        assert!(matches!(
            err,
            RoundError::InvalidConfig(ref e)
                if e.contains(&ConfigError::InvalidGridSize { width: 65_536, height: 65_537 })
        ));
        assert_eq!(rounds.phase(), RoundPhase::Idle);
    }

    #[test]
    fn all_placed_tracks_pickups() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(0, 0));
        assert!(!rounds.all_placed());
        assert_eq!(rounds.commit(), Err(RoundError::NotAllPlaced));

        place(&mut rounds, PieceId(1), GridPos::new(2, 0));
        assert!(rounds.all_placed());
        assert_eq!(rounds.status_message(), Some(messages::ALL_PLACED));

        // Picking one back up re-locks the commit.
        let anchor = rounds.piece(PieceId(1)).unwrap().anchor();
        assert!(rounds.begin_drag(PieceId(1), anchor).unwrap());
        assert!(!rounds.all_placed());
        assert_eq!(rounds.commit(), Err(RoundError::NotAllPlaced));

        let target = rounds.layout().unwrap().cell_center(GridPos::new(2, 2));
        assert!(rounds.end_drag(target).unwrap().is_placed());
        assert!(rounds.all_placed());
        assert_eq!(rounds.commit(), Ok(true));
        assert_eq!(rounds.listener(), &vec![true]);
        assert!(rounds.stats().0.is_empty(), "success applies no penalty");
    }

    #[test]
    fn overlapping_drop_reverts() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(1, 1));
        let outcome = place(&mut rounds, PieceId(1), GridPos::new(2, 2));
        assert_eq!(
            outcome,
            DropOutcome::Reverted {
                origin: GridPos::new(2, 2),
                anchor: Vec2::new(330.0, 160.0),
            }
        );
        assert_eq!(rounds.grid().unwrap().occupied_count(), 4);
        assert!(!rounds.piece(PieceId(1)).unwrap().is_placed());
    }

    #[test]
    fn timeout_fails_once_and_penalises_once() {
        let mut rounds = controller();
        let config = RoundConfig {
            time_limit: 5.0,
            ..two_squares()
        };
        rounds.start_round(config).unwrap();
        let mut last = rounds.remaining_time();
        for _ in 0..4 {
            rounds.tick(1.0);
            assert!(rounds.remaining_time() < last);
            last = rounds.remaining_time();
        }
        assert!(rounds.is_active());
        rounds.tick(1.0);
        assert_eq!(rounds.phase(), RoundPhase::Idle);
        assert_eq!(rounds.outcome(), Some(RoundPhase::Failed));
        assert_eq!(rounds.listener(), &vec![false]);
        assert_eq!(rounds.stats().0, vec![-4]);
        assert_eq!(rounds.timer_label(), "FAILED");

        for _ in 0..10 {
            rounds.tick(1.0);
        }
        assert_eq!(rounds.commit(), Ok(false));
        assert_eq!(rounds.listener(), &vec![false]);
        assert_eq!(rounds.stats().0, vec![-4]);
    }

    #[test]
    fn remaining_time_never_negative() {
        let mut rounds = RoundController::new(Vec::new(), Penalties::default());
        rounds.start_round(two_squares()).unwrap();
        rounds.tick(1000.0);
        assert_eq!(rounds.remaining_time(), 0.0);
        assert_eq!(rounds.phase(), RoundPhase::Failed);
    }

    #[test]
    fn ignores_bad_time_steps() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        rounds.tick(0.0);
        rounds.tick(-3.0);
        rounds.tick(f32::NAN);
        assert_eq!(rounds.remaining_time(), 30.0);
    }

    #[test]
    fn handoff_waits_for_delay() {
        let mut rounds = RoundController::new(Vec::new(), Penalties::default());
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(0, 0));
        place(&mut rounds, PieceId(1), GridPos::new(2, 0));
        assert_eq!(rounds.commit(), Ok(true));
        assert_eq!(rounds.phase(), RoundPhase::Succeeded);
        assert_eq!(rounds.outcome(), Some(RoundPhase::Succeeded));
        assert!(rounds.listener().is_empty());

        let frozen = rounds.remaining_time();
        rounds.tick(1.5);
        assert_eq!(rounds.remaining_time(), frozen, "timer stops once completed");
        assert!(rounds.listener().is_empty());
        assert_eq!(rounds.commit(), Ok(false), "double commit is a no-op");

        rounds.tick(0.5);
        assert_eq!(rounds.phase(), RoundPhase::Idle);
        assert_eq!(rounds.listener(), &vec![true]);
        assert_eq!(rounds.status_message(), Some(messages::COMPLETED));
    }

    #[test]
    fn input_rejected_after_resolution() {
        let mut rounds = RoundController::new(Vec::new(), Penalties::default());
        rounds.start_round(two_squares()).unwrap();
        rounds.tick(30.0);
        assert_eq!(rounds.phase(), RoundPhase::Failed);
        assert_eq!(
            rounds.begin_drag(PieceId(0), Vec2::ZERO),
            Err(RoundError::NotActive)
        );
        assert_eq!(rounds.cancel(), Err(RoundError::NotActive));
    }

    #[test]
    fn timeout_mid_drag_restores_anchor() {
        let mut rounds = RoundController::new(Vec::new(), Penalties::default());
        rounds.start_round(two_squares()).unwrap();
        rounds.begin_drag(PieceId(0), Vec2::new(-330.0, 160.0)).unwrap();
        rounds.drag_to(Vec2::ZERO).unwrap();
        rounds.tick(31.0);
        assert_eq!(rounds.dragged(), None);
        assert!(rounds.preview().is_none());
        assert_eq!(
            rounds.piece(PieceId(0)).unwrap().anchor(),
            Vec2::new(-330.0, 160.0)
        );
    }

    #[test]
    fn fully_placed_but_uncommitted_still_times_out() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(0, 0));
        place(&mut rounds, PieceId(1), GridPos::new(2, 0));
        rounds.tick(30.0);
        assert_eq!(rounds.outcome(), Some(RoundPhase::Failed));
        assert_eq!(rounds.stats().0, vec![-4]);
    }

    #[test]
    fn cancel_is_silent() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        rounds.cancel().unwrap();
        assert_eq!(rounds.phase(), RoundPhase::Idle);
        assert_eq!(rounds.outcome(), Some(RoundPhase::Cancelled));
        assert!(rounds.listener().is_empty());
        assert!(rounds.stats().0.is_empty());
    }

    #[test]
    fn restart_flushes_pending_handoff() {
        let mut rounds = RoundController::new(Vec::new(), Penalties::default());
        rounds.start_round(two_squares()).unwrap();
        rounds.tick(30.0);
        assert_eq!(rounds.phase(), RoundPhase::Failed);
        rounds.start_round(two_squares()).unwrap();
        assert_eq!(rounds.listener(), &vec![false]);
        assert!(rounds.is_active());
        assert_eq!(rounds.outcome(), None);

        // Restarting an active round cancels it without notification.
        rounds.start_round(two_squares()).unwrap();
        assert_eq!(rounds.listener(), &vec![false]);
        assert_eq!(rounds.stats().0, vec![-4]);
    }

    #[test]
    fn one_drag_at_a_time() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        rounds.begin_drag(PieceId(0), Vec2::ZERO).unwrap();
        assert_eq!(
            rounds.begin_drag(PieceId(1), Vec2::ZERO),
            Err(RoundError::DragInProgress(PieceId(0)))
        );
        assert_eq!(
            rounds.begin_drag(PieceId(9), Vec2::ZERO),
            Err(RoundError::DragInProgress(PieceId(0)))
        );
    }

    #[test]
    fn unknown_piece_and_missing_drag() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        assert_eq!(
            rounds.begin_drag(PieceId(9), Vec2::ZERO),
            Err(RoundError::UnknownPiece(PieceId(9)))
        );
        assert_eq!(rounds.drag_to(Vec2::ZERO), Err(RoundError::NoDrag));
        assert_eq!(rounds.end_drag(Vec2::ZERO), Err(RoundError::NoDrag));
    }

    #[test]
    fn preview_drives_cell_states() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        place(&mut rounds, PieceId(0), GridPos::new(0, 0));
        let layout = *rounds.layout().unwrap();
        rounds.begin_drag(PieceId(1), Vec2::ZERO).unwrap();
        assert!(!rounds.drag_to(layout.cell_center(GridPos::new(1, 1))).unwrap());
        assert_eq!(rounds.cell_state(GridPos::new(1, 1)), CellState::Invalid);
        assert_eq!(rounds.cell_state(GridPos::new(0, 0)), CellState::Occupied);
        assert!(rounds.drag_to(layout.cell_center(GridPos::new(2, 3))).unwrap());
        assert_eq!(rounds.cell_state(GridPos::new(3, 4)), CellState::Highlighted);
        assert_eq!(rounds.cell_state(GridPos::new(1, 1)), CellState::Occupied);
    }

    #[test]
    fn timer_label_rounds_up() {
        let mut rounds = controller();
        rounds.start_round(two_squares()).unwrap();
        assert_eq!(rounds.timer_label(), "Time: 30s");
        rounds.tick(0.25);
        assert_eq!(rounds.timer_label(), "Time: 30s");
        rounds.tick(0.75);
        assert_eq!(rounds.timer_label(), "Time: 29s");
    }

    #[test]
    fn stats_ledger_as_sink() {
        let mut stats = Stats::default();
        stats.modify(0, 10);
        let mut rounds = RoundController::with_settings(Vec::new(), &mut stats, immediate());
        rounds.start_round(two_squares()).unwrap();
        rounds.tick(30.0);
        drop(rounds);
        assert_eq!(stats.dependency, 6);
    }
}
