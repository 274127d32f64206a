use thiserror::Error;

/// Expected, recoverable failures of habit operations. Everything else
/// (broken files, io) is carried as [anyhow::Error] at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HabitError {
    #[error("habit name can't be empty")]
    InvalidName,
    #[error("unknown periodicity {0:?}, expected \"daily\" or \"weekly\"")]
    InvalidPeriodicity(String),
    #[error("a habit named {0:?} already exists")]
    DuplicateName(String),
    #[error("no habit named {0:?}")]
    NotFound(String),
}
