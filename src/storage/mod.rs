//! Storage is organized through [habit_store::HabitStoreImpl].
//! The basic idea is:
//!  - The full habit list lives in a single json file.
//!  - Records keep iso-8601 text timestamps so the file stays readable and
//!    editable by hand.
//!  - Every save overwrites the whole file. The cli saves after each
//!    mutating command, so the file always mirrors the registry.

pub mod entities;
pub mod habit_store;
