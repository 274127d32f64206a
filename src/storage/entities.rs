use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habits::habit::{Habit, Periodicity};

/// The struct used for storing a habit on the disk. Timestamps are kept as
/// rfc 3339 text instead of something more compact so that the file can be
/// read and fixed up by hand. There is no version field, changing this
/// schema breaks previously stored files.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HabitEntity {
    pub name: String,
    pub periodicity: String,
    pub creation_dt: String,
    pub completion_dt: Vec<String>,
}

impl From<&Habit> for HabitEntity {
    fn from(habit: &Habit) -> Self {
        HabitEntity {
            name: habit.name().to_string(),
            periodicity: habit.periodicity().as_str().to_string(),
            creation_dt: habit.created_at().to_rfc3339(),
            completion_dt: habit
                .completions()
                .iter()
                .map(|moment| moment.to_rfc3339())
                .collect(),
        }
    }
}

impl HabitEntity {
    /// Parses the record into a [Habit]. All four fields are validated here
    /// so a hand-edited file fails with an error naming the record instead
    /// of surfacing a raw parse fault somewhere downstream.
    pub fn into_habit(self) -> Result<Habit> {
        let periodicity: Periodicity = self
            .periodicity
            .parse()
            .with_context(|| format!("Habit record {:?}", self.name))?;
        let created_at = parse_timestamp(&self.creation_dt)
            .with_context(|| format!("Habit record {:?} has a bad creation date", self.name))?;
        let completions = self
            .completion_dt
            .iter()
            .map(|value| parse_timestamp(value))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Habit record {:?} has a bad completion date", self.name))?;
        let habit = Habit::with_history(&self.name, periodicity, created_at, completions)
            .with_context(|| format!("Habit record {:?}", self.name))?;
        Ok(habit)
    }
}

fn parse_timestamp(value: &str) -> chrono::ParseResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
