//! The habit core.
//! The basic idea is:
//!  - A [habit::Habit] owns its completion history and computes streaks and
//!    completion rates from it.
//!  - A [registry::HabitRegistry] owns the habits, enforces name uniqueness
//!    and answers analytics queries like the longest streak.
//!  - Persistence and presentation live outside this module and only go
//!    through the operations exposed here.

pub mod error;
pub mod habit;
pub mod registry;
