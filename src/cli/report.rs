use chrono::{DateTime, Utc};

use crate::{
    habits::habit::{Habit, Periodicity},
    utils::time::display_date,
};

/// Prints habits as tab separated rows and returns how many were printed.
/// `now` is the evaluation instant for completion rates.
pub fn print_habits<'a>(habits: impl Iterator<Item = &'a Habit>, now: DateTime<Utc>) -> usize {
    let mut printed = 0;
    for habit in habits {
        println!(
            "{}\t{}\t{}\t{}\tsince {}",
            habit.name(),
            habit.periodicity(),
            format_streak(habit.current_streak(), habit.periodicity()),
            habit.completion_rate(now),
            display_date(habit.created_at()),
        );
        printed += 1;
    }
    printed
}

pub fn format_streak(streak: u32, periodicity: Periodicity) -> String {
    let unit = match periodicity {
        Periodicity::Daily => "day",
        Periodicity::Weekly => "week",
    };
    if streak == 1 {
        format!("1 {unit}")
    } else {
        format!("{streak} {unit}s")
    }
}
