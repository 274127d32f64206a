use chrono::{DateTime, Utc};
use tracing::warn;

use super::{
    error::HabitError,
    habit::{Habit, Periodicity},
};

/// In-memory collection of habits, at most one per case-insensitive name.
/// Insertion order is preserved for listing and for tie breaking in
/// analytics. The registry is the only thing allowed to hand out habits, so
/// all mutation goes through it.
///
/// The registry itself never touches the disk. Whoever owns it is expected
/// to hydrate it from the store at startup and hand its contents back to the
/// store after every mutation.
#[derive(Debug, Default)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from persisted state, keeping file order. Records
    /// that would break name uniqueness are skipped. A hand-edited file is
    /// the only way to get such records, so a warning is enough.
    pub fn from_habits(habits: Vec<Habit>) -> Self {
        let mut registry = Self::new();
        for habit in habits {
            if registry.find_habit(habit.name()).is_some() {
                warn!("Skipping duplicate habit {:?} during load", habit.name());
                continue;
            }
            registry.habits.push(habit);
        }
        registry
    }

    pub fn add_habit(
        &mut self,
        name: &str,
        periodicity: Periodicity,
        created_at: DateTime<Utc>,
    ) -> Result<&Habit, HabitError> {
        let habit = Habit::new(name, periodicity, created_at)?;
        if self.find_habit(habit.name()).is_some() {
            return Err(HabitError::DuplicateName(habit.name().to_string()));
        }
        self.habits.push(habit);
        Ok(self.habits.last().expect("push succeeded"))
    }

    /// Case-insensitive exact match on the full name.
    pub fn find_habit(&self, name: &str) -> Option<&Habit> {
        self.position(name).map(|i| &self.habits[i])
    }

    pub fn mark_completed(&mut self, name: &str, at: DateTime<Utc>) -> Result<(), HabitError> {
        let position = self
            .position(name)
            .ok_or_else(|| HabitError::NotFound(name.trim().to_string()))?;
        self.habits[position].mark_completed(at);
        Ok(())
    }

    /// Removes and returns the matching habit. The order of the remaining
    /// habits is untouched.
    pub fn delete_habit(&mut self, name: &str) -> Result<Habit, HabitError> {
        let position = self
            .position(name)
            .ok_or_else(|| HabitError::NotFound(name.trim().to_string()))?;
        Ok(self.habits.remove(position))
    }

    pub fn reset_habit(&mut self, name: &str) -> Result<(), HabitError> {
        let position = self
            .position(name)
            .ok_or_else(|| HabitError::NotFound(name.trim().to_string()))?;
        self.habits[position].reset_completions();
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for habit in &mut self.habits {
            habit.reset_completions();
        }
    }

    pub fn list_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter()
    }

    pub fn habits_by_periodicity(
        &self,
        periodicity: Periodicity,
    ) -> impl Iterator<Item = &Habit> + '_ {
        self.habits
            .iter()
            .filter(move |habit| habit.periodicity() == periodicity)
    }

    /// Habit with the longest current streak, earliest added on ties. None
    /// only when the registry is empty.
    pub fn longest_streak_habit(&self) -> Option<&Habit> {
        let mut best: Option<(&Habit, u32)> = None;
        for habit in &self.habits {
            let streak = habit.current_streak();
            match best {
                Some((_, best_streak)) if streak <= best_streak => {}
                _ => best = Some((habit, streak)),
            }
        }
        best.map(|(habit, _)| habit)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.habits
            .iter()
            .position(|habit| habit.name().to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::{
        habits::{
            error::HabitError,
            habit::{Habit, Periodicity},
        },
        utils::logging::TEST_LOGGING,
    };

    use super::HabitRegistry;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn moment(days_after: i64) -> DateTime<Utc> {
        let noon = NaiveDateTime::new(TEST_DATE, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        Utc.from_utc_datetime(&noon) + Duration::days(days_after)
    }

    fn names(registry: &HabitRegistry) -> Vec<&str> {
        registry.list_habits().map(|h| h.name()).collect()
    }

    #[test]
    fn added_habit_is_found_case_insensitively() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();

        let found = registry.find_habit("rEaD").unwrap();
        assert_eq!(found.name(), "Read");
        assert_eq!(found.periodicity(), Periodicity::Daily);
    }

    #[test]
    fn duplicate_name_is_rejected_and_registry_unchanged() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();

        assert_eq!(
            registry
                .add_habit("READ", Periodicity::Weekly, moment(1))
                .unwrap_err(),
            HabitError::DuplicateName("READ".into())
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.find_habit("read").unwrap().periodicity(),
            Periodicity::Daily
        );
    }

    #[test]
    fn invalid_name_is_propagated() {
        let mut registry = HabitRegistry::new();
        assert_eq!(
            registry
                .add_habit("  ", Periodicity::Daily, moment(0))
                .unwrap_err(),
            HabitError::InvalidName
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn delete_keeps_the_order_of_the_rest() {
        let mut registry = HabitRegistry::new();
        for name in ["Read", "Gym", "Water"] {
            registry
                .add_habit(name, Periodicity::Daily, moment(0))
                .unwrap();
        }

        let removed = registry.delete_habit("gym").unwrap();
        assert_eq!(removed.name(), "Gym");
        assert_eq!(names(&registry), vec!["Read", "Water"]);
    }

    #[test]
    fn delete_of_missing_habit_changes_nothing() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();

        assert_eq!(
            registry.delete_habit("Gym").unwrap_err(),
            HabitError::NotFound("Gym".into())
        );
        assert_eq!(names(&registry), vec!["Read"]);
    }

    #[test]
    fn mark_completed_goes_through_the_registry() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();

        registry.mark_completed("read", moment(0)).unwrap();
        registry.mark_completed("read", moment(1)).unwrap();
        assert_eq!(registry.find_habit("Read").unwrap().current_streak(), 2);

        assert_eq!(
            registry.mark_completed("Gym", moment(0)).unwrap_err(),
            HabitError::NotFound("Gym".into())
        );
    }

    #[test]
    fn reset_all_zeroes_streaks_and_rates() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();
        registry
            .add_habit("Gym", Periodicity::Weekly, moment(0))
            .unwrap();
        registry.mark_completed("Read", moment(0)).unwrap();
        registry.mark_completed("Gym", moment(0)).unwrap();

        registry.reset_all();

        for habit in registry.list_habits() {
            assert_eq!(habit.current_streak(), 0);
            assert_eq!(*habit.completion_rate(moment(3)), 0.);
        }
    }

    #[test]
    fn reset_all_on_empty_registry_is_a_noop() {
        let mut registry = HabitRegistry::new();
        registry.reset_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn reset_single_habit_leaves_others_alone() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();
        registry
            .add_habit("Gym", Periodicity::Daily, moment(0))
            .unwrap();
        registry.mark_completed("Read", moment(0)).unwrap();
        registry.mark_completed("Gym", moment(0)).unwrap();

        registry.reset_habit("Read").unwrap();
        assert_eq!(registry.find_habit("Read").unwrap().current_streak(), 0);
        assert_eq!(registry.find_habit("Gym").unwrap().current_streak(), 1);

        assert_eq!(
            registry.reset_habit("Water").unwrap_err(),
            HabitError::NotFound("Water".into())
        );
    }

    #[test]
    fn listing_twice_yields_the_same_sequence() {
        let mut registry = HabitRegistry::new();
        for name in ["Read", "Gym", "Water"] {
            registry
                .add_habit(name, Periodicity::Daily, moment(0))
                .unwrap();
        }

        let first: Vec<_> = names(&registry);
        let second: Vec<_> = names(&registry);
        assert_eq!(first, second);
        assert_eq!(first, vec!["Read", "Gym", "Water"]);
    }

    #[test]
    fn filtering_by_periodicity_keeps_insertion_order() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();
        registry
            .add_habit("Gym", Periodicity::Weekly, moment(0))
            .unwrap();
        registry
            .add_habit("Water", Periodicity::Daily, moment(0))
            .unwrap();

        let daily: Vec<_> = registry
            .habits_by_periodicity(Periodicity::Daily)
            .map(|h| h.name())
            .collect();
        assert_eq!(daily, vec!["Read", "Water"]);

        let weekly: Vec<_> = registry
            .habits_by_periodicity(Periodicity::Weekly)
            .map(|h| h.name())
            .collect();
        assert_eq!(weekly, vec!["Gym"]);
    }

    #[test]
    fn longest_streak_on_empty_registry_is_none() {
        assert!(HabitRegistry::new().longest_streak_habit().is_none());
    }

    #[test]
    fn longest_streak_prefers_the_first_added_on_ties() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();
        registry
            .add_habit("Gym", Periodicity::Daily, moment(0))
            .unwrap();
        for day in [0, 1] {
            registry.mark_completed("Read", moment(day)).unwrap();
            registry.mark_completed("Gym", moment(day)).unwrap();
        }

        assert_eq!(registry.longest_streak_habit().unwrap().name(), "Read");
    }

    #[test]
    fn longest_streak_picks_the_maximum() {
        let mut registry = HabitRegistry::new();
        registry
            .add_habit("Read", Periodicity::Daily, moment(0))
            .unwrap();
        registry
            .add_habit("Gym", Periodicity::Daily, moment(0))
            .unwrap();
        registry.mark_completed("Read", moment(0)).unwrap();
        for day in [0, 1, 2] {
            registry.mark_completed("Gym", moment(day)).unwrap();
        }

        assert_eq!(registry.longest_streak_habit().unwrap().name(), "Gym");
    }

    #[test]
    fn hydration_keeps_order_and_skips_duplicates() {
        *TEST_LOGGING;

        let habits = vec![
            Habit::new("Read", Periodicity::Daily, moment(0)).unwrap(),
            Habit::new("Gym", Periodicity::Weekly, moment(0)).unwrap(),
            Habit::new("READ", Periodicity::Weekly, moment(1)).unwrap(),
        ];

        let registry = HabitRegistry::from_habits(habits);
        assert_eq!(names(&registry), vec!["Read", "Gym"]);
        assert_eq!(
            registry.find_habit("read").unwrap().periodicity(),
            Periodicity::Daily
        );
    }
}
