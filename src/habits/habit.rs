use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::ValueEnum;

use crate::utils::{percentage::Percentage, time::week_start};

use super::error::HabitError;

/// Cadence a habit is expected to recur at.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Periodicity {
    Daily,
    Weekly,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
        }
    }

    /// Maps a moment to the period it falls into. Periods are keyed by their
    /// first calendar day, so daily habits bucket by day and weekly habits by
    /// the monday of the iso week.
    pub fn period_start(&self, moment: DateTime<Utc>) -> NaiveDate {
        match self {
            Periodicity::Daily => moment.date_naive(),
            Periodicity::Weekly => week_start(moment.date_naive()),
        }
    }

    /// Distance between the starts of two consecutive periods.
    pub fn period_step(&self) -> Duration {
        match self {
            Periodicity::Daily => Duration::days(1),
            Periodicity::Weekly => Duration::days(7),
        }
    }
}

impl Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            other => Err(HabitError::InvalidPeriodicity(other.to_string())),
        }
    }
}

/// A single tracked habit. Completions are only ever appended through
/// [Habit::mark_completed] or wiped through [Habit::reset_completions], so
/// streak and rate math can trust the history to be real timestamps.
///
/// Marking a habit twice in the same period is allowed, both entries are
/// stored and the math counts the period once.
#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    name: String,
    periodicity: Periodicity,
    created_at: DateTime<Utc>,
    completions: Vec<DateTime<Utc>>,
}

impl Habit {
    pub fn new(
        name: &str,
        periodicity: Periodicity,
        created_at: DateTime<Utc>,
    ) -> Result<Self, HabitError> {
        Self::with_history(name, periodicity, created_at, vec![])
    }

    /// Rebuilds a habit from an already recorded history. Used when hydrating
    /// from the store.
    pub fn with_history(
        name: &str,
        periodicity: Periodicity,
        created_at: DateTime<Utc>,
        completions: Vec<DateTime<Utc>>,
    ) -> Result<Self, HabitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HabitError::InvalidName);
        }
        Ok(Self {
            name: name.to_string(),
            periodicity,
            created_at,
            completions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completions(&self) -> &[DateTime<Utc>] {
        &self.completions
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.completions.push(at);
    }

    pub fn reset_completions(&mut self) {
        self.completions.clear();
    }

    /// Count of consecutive completed periods ending at the most recent
    /// completion. The walk is anchored at the latest entry, not at "today",
    /// so a habit that wasn't completed this period still reports its last
    /// run.
    pub fn current_streak(&self) -> u32 {
        let periods: BTreeSet<NaiveDate> = self
            .completions
            .iter()
            .map(|moment| self.periodicity.period_start(*moment))
            .collect();

        let step = self.periodicity.period_step();
        let mut streak = 0;
        let mut expected = None;
        for period in periods.iter().rev() {
            match expected {
                Some(expected) if *period != expected => break,
                _ => {}
            }
            streak += 1;
            expected = Some(*period - step);
        }
        streak
    }

    /// Share of periods since creation that have at least one completion,
    /// rounded to whole percents. `at` is the evaluation instant, usually
    /// now.
    pub fn completion_rate(&self, at: DateTime<Utc>) -> Percentage {
        if self.completions.is_empty() {
            return Percentage::ZERO;
        }

        let elapsed_days = (at - self.created_at).num_days();
        let expected_periods = match self.periodicity {
            Periodicity::Daily => elapsed_days + 1,
            Periodicity::Weekly => elapsed_days / 7 + 1,
        };
        // Histories that start before the creation timestamp are caller bugs.
        // The result is meaningless for them, but it must not divide by zero.
        let expected_periods = expected_periods.max(1) as usize;

        let completed_periods: BTreeSet<NaiveDate> = self
            .completions
            .iter()
            .map(|moment| self.periodicity.period_start(*moment))
            .collect();
        let completed_periods = completed_periods.len().min(expected_periods);

        let rate = (completed_periods as f64 / expected_periods as f64 * 100.).round();
        Percentage::new_opt(rate).expect("Percentage should always be at least 0")
    }
}
