//! One in-game day of the schedule minigame.
//!
//! A day offers a single attempt. Opening the schedule shows the
//! instructions; after the attempt resolves, opening it again only shows a
//! short notice that hides itself after a few seconds.

use crate::config::RoundConfig;
use crate::constants::{defaults, messages};
use crate::round::{RoundController, RoundError, RoundListener, RoundPhase, StatSink};
use std::fmt;

/// Text for the pre-round instruction screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    /// `"Day N - Time Limit: X seconds"`.
    pub day_info: String,
    pub body: String,
}

impl Instructions {
    pub fn for_round(day: u32, config: &RoundConfig) -> Self {
        let mut body = String::from(
            "HOW TO PLAY:\n\n\
             • Drag the schedule blocks from the sides\n\
             • Drop them into the grid to organize your day\n\
             • All blocks must fit within the grid boundaries\n\
             • Blocks cannot overlap with each other\n\
             • Complete the puzzle before time runs out\n\n\
             SCHEDULE ITEMS:\n",
        );
        for item in &config.labels {
            body.push_str("• ");
            body.push_str(item);
            body.push('\n');
        }
        body.push('\n');
        body.push_str(messages::BEGIN_PROMPT);
        Self {
            day_info: format!("Day {} - Time Limit: {} seconds", day, config.time_limit),
            body,
        }
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.day_info, self.body)
    }
}

/// What opening the schedule produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// First visit today: show these, then call [`DaySession::begin`].
    Instructions(Instructions),
    /// Already attempted today.
    Notice(&'static str),
    /// A round is already on screen.
    InProgress,
}

pub struct DaySession<L, S> {
    day: u32,
    rounds: RoundController<L, S>,
    pending: Option<RoundConfig>,
    /// A round started by `begin` has not reported its outcome yet.
    tracking: bool,
    attempted: bool,
    completed: bool,
    notice: Option<(&'static str, f32)>,
}

impl<L: RoundListener, S: StatSink> DaySession<L, S> {
    pub fn new(day: u32, rounds: RoundController<L, S>) -> Self {
        Self {
            day,
            rounds,
            pending: None,
            tracking: false,
            attempted: false,
            completed: false,
            notice: None,
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn rounds(&self) -> &RoundController<L, S> {
        &self.rounds
    }

    /// Drag input goes straight to the controller. Commit through
    /// [`DaySession::commit`] so the day flags stay current.
    pub fn rounds_mut(&mut self) -> &mut RoundController<L, S> {
        &mut self.rounds
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Notice currently on screen.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice.map(|(text, _)| text)
    }

    pub fn open(&mut self, config: RoundConfig) -> OpenOutcome {
        self.sync();
        if self.rounds.phase() != RoundPhase::Idle {
            return OpenOutcome::InProgress;
        }
        if self.attempted {
            let text = if self.completed {
                messages::ALREADY_ORGANIZED
            } else {
                messages::ALREADY_ATTEMPTED
            };
            self.notice = Some((text, defaults::NOTICE_DURATION));
            return OpenOutcome::Notice(text);
        }
        let instructions = Instructions::for_round(self.day, &config);
        self.pending = Some(config);
        OpenOutcome::Instructions(instructions)
    }

    /// Start the round captured by the last [`open`](Self::open).
    pub fn begin(&mut self) -> Result<(), RoundError> {
        let config = self.pending.take().ok_or(RoundError::NothingToBegin)?;
        self.rounds.start_round(config)?;
        self.tracking = true;
        log::info!("day {} schedule started", self.day);
        Ok(())
    }

    pub fn tick(&mut self, dt: f32) {
        self.rounds.tick(dt);
        if dt > 0.0 {
            if let Some((text, left)) = self.notice {
                let left = left - dt;
                self.notice = (left > 0.0).then_some((text, left));
            }
        }
        self.sync();
    }

    pub fn commit(&mut self) -> Result<bool, RoundError> {
        let result = self.rounds.commit();
        self.sync();
        result
    }

    /// Clear the day's flags. A round still running is cancelled.
    pub fn reset_for_new_day(&mut self, day: u32) {
        if self.rounds.cancel().is_ok() {
            log::debug!("cancelled unfinished round for day {}", self.day);
        }
        self.day = day;
        self.pending = None;
        self.tracking = false;
        self.attempted = false;
        self.completed = false;
        self.notice = None;
    }

    fn sync(&mut self) {
        if !self.tracking {
            return;
        }
        match self.rounds.outcome() {
            Some(RoundPhase::Succeeded) => {
                self.attempted = true;
                self.completed = true;
                self.tracking = false;
            }
            Some(RoundPhase::Failed) => {
                self.attempted = true;
                self.tracking = false;
            }
            Some(RoundPhase::Cancelled) => self.tracking = false,
            _ => {}
        }
    }
}
