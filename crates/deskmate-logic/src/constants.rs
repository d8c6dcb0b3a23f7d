//! Puzzle defaults and player-facing text.
//!
//! The numeric defaults match the values the day data falls back to when a
//! field is omitted. The text strings are what the schedule screen shows.

pub mod defaults {
    /// Grid columns when a day does not override them.
    pub const GRID_WIDTH: u32 = 4;
    /// Grid rows when a day does not override them.
    pub const GRID_HEIGHT: u32 = 5;
    /// Largest grid a round accepts, in cells.
    pub const MAX_GRID_CELLS: usize = 4096;
    /// Seconds on the countdown.
    pub const TIME_LIMIT: f32 = 60.0;
    /// Dependency change applied when the timer runs out.
    pub const DEPENDENCY_PENALTY: i32 = -3;
    /// Seconds between resolving a round and handing control back.
    pub const HANDOFF_DELAY: f32 = 2.0;
    /// Seconds an "already attempted" notice stays on screen.
    pub const NOTICE_DURATION: f32 = 3.0;
}

pub mod messages {
    pub const DRAG_PROMPT: &str = "Drag schedule blocks to fit them in the grid!";
    pub const ALL_PLACED: &str = "All blocks placed! Click Complete to finish.";
    pub const COMPLETED: &str = "Schedule completed successfully!";
    pub const TIMED_OUT: &str = "Time's up! Schedule organization failed.";
    pub const TIMER_FAILED: &str = "FAILED";
    pub const ALREADY_ORGANIZED: &str = "Schedule already organized for today!";
    pub const ALREADY_ATTEMPTED: &str = "Schedule attempt completed. Check back tomorrow!";
    pub const BEGIN_PROMPT: &str = "Press BEGIN when you're ready to start!";
}

/// Glyphs used by the row-string shape notation.
pub mod glyphs {
    pub const FILLED: char = '#';
    pub const EMPTY: char = '.';
}
