//! Simple cli for tracking daily and weekly habits. Habits are kept in a
//! small json file, and streaks and completion rates are computed on the fly,
//! so the whole thing stays easily inspectable through a terminal.
//!

pub mod cli;
pub mod habits;
pub mod storage;
pub mod utils;
