use std::collections::{HashMap, HashSet};

use mealpick_shared::mealplan::MealHistoryEntry;
use mealpick_shared::recipe::CuisineType;
use time::{Date, Duration};

use crate::config::PreferenceConfig;
use crate::monitor::{Degradation, DegradationMonitor};
use crate::repository::MealHistoryRepository;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuisineStat {
    pub uses: u32,
    /// Share of all analysed meals that used this cuisine.
    pub usage_ratio: f64,
    pub completion_rate: f64,
}

/// Immutable view of a user's habits, built once per request and shared by
/// every candidate scored in that request.
///
/// An empty snapshot means "nothing known" and scores neutrally. It never
/// means the user dislikes everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceSnapshot {
    pub cuisines: HashMap<CuisineType, CuisineStat>,
    /// Recipes used within the recent window, mapped to their latest use.
    pub recently_used: HashMap<String, Date>,
    /// Recipes with enough uses and a high completion rate.
    pub favorites: HashSet<String>,
    /// Completion rate of recipes with enough attempts to be meaningful.
    pub completion_rates: HashMap<String, f64>,
    pub analysed_entries: usize,
}

#[derive(Default)]
struct RecipeTally {
    attempts: u32,
    completed: u32,
}

impl RecipeTally {
    fn rate(&self) -> f64 {
        f64::from(self.completed) / f64::from(self.attempts)
    }
}

impl PreferenceSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.analysed_entries == 0
    }

    /// Derives the snapshot from already loaded history.
    ///
    /// Entries outside `[as_of - analysis_days, as_of]` are ignored. Entries
    /// without a cuisine count toward the total but form no cuisine group.
    pub fn from_history(
        entries: &[MealHistoryEntry],
        as_of: Date,
        config: &PreferenceConfig,
    ) -> Self {
        let since = as_of.saturating_sub(Duration::days(i64::from(config.analysis_days)));
        let recent_days = i64::from(config.recent_days);

        let mut cuisine_tally: HashMap<CuisineType, RecipeTally> = HashMap::new();
        let mut recipe_tally: HashMap<&str, RecipeTally> = HashMap::new();
        let mut recently_used: HashMap<String, Date> = HashMap::new();
        let mut analysed_entries = 0usize;

        for entry in entries
            .iter()
            .filter(|entry| entry.date >= since && entry.date <= as_of)
        {
            analysed_entries += 1;

            if let Some(cuisine) = entry.cuisine {
                let tally = cuisine_tally.entry(cuisine).or_default();
                tally.attempts += 1;
                tally.completed += u32::from(entry.completed);
            }

            let tally = recipe_tally.entry(entry.recipe_id.as_str()).or_default();
            tally.attempts += 1;
            tally.completed += u32::from(entry.completed);

            if (as_of - entry.date).whole_days() < recent_days {
                recently_used
                    .entry(entry.recipe_id.to_owned())
                    .and_modify(|last| *last = (*last).max(entry.date))
                    .or_insert(entry.date);
            }
        }

        if analysed_entries == 0 {
            return Self::empty();
        }

        let total = analysed_entries as f64;
        let cuisines = cuisine_tally
            .into_iter()
            .map(|(cuisine, tally)| {
                let stat = CuisineStat {
                    uses: tally.attempts,
                    usage_ratio: f64::from(tally.attempts) / total,
                    completion_rate: tally.rate(),
                };
                (cuisine, stat)
            })
            .collect();

        let favorites = recipe_tally
            .iter()
            .filter(|(_, tally)| {
                tally.attempts >= config.favorite_min_uses
                    && tally.rate() >= config.favorite_min_completion
            })
            .map(|(id, _)| (*id).to_owned())
            .collect();

        let completion_rates = recipe_tally
            .iter()
            .filter(|(_, tally)| tally.attempts >= config.completion_min_attempts)
            .map(|(id, tally)| ((*id).to_owned(), tally.rate()))
            .collect();

        Self {
            cuisines,
            recently_used,
            favorites,
            completion_rates,
            analysed_entries,
        }
    }

    /// Treats recipes already placed in a plan under construction as used on
    /// their planned date. Only affects the variety signal.
    pub fn with_planned(
        mut self,
        planned: &[(String, Date)],
        as_of: Date,
        config: &PreferenceConfig,
    ) -> Self {
        let recent_days = i64::from(config.recent_days);

        for (recipe_id, date) in planned
            .iter()
            .filter(|(_, date)| *date <= as_of && (as_of - *date).whole_days() < recent_days)
        {
            self.recently_used
                .entry(recipe_id.to_owned())
                .and_modify(|last| *last = (*last).max(*date))
                .or_insert(*date);
        }

        self
    }

    pub fn last_used(&self, recipe_id: &str) -> Option<Date> {
        self.recently_used.get(recipe_id).copied()
    }

    pub fn cuisine_usage_ratio(&self, cuisine: Option<CuisineType>) -> Option<f64> {
        cuisine
            .and_then(|c| self.cuisines.get(&c))
            .map(|stat| stat.usage_ratio)
    }

    pub fn completion_rate(&self, recipe_id: &str) -> Option<f64> {
        self.completion_rates.get(recipe_id).copied()
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.contains(recipe_id)
    }
}

/// Builds [`PreferenceSnapshot`]s from the meal history collaborator.
pub struct PreferenceLearner<'a, R: ?Sized> {
    repository: &'a R,
    config: &'a PreferenceConfig,
    monitor: &'a DegradationMonitor,
}

impl<'a, R: MealHistoryRepository + ?Sized> PreferenceLearner<'a, R> {
    pub fn new(
        repository: &'a R,
        config: &'a PreferenceConfig,
        monitor: &'a DegradationMonitor,
    ) -> Self {
        Self {
            repository,
            config,
            monitor,
        }
    }

    /// Reads the user's history once. A failed read yields an empty snapshot.
    pub async fn build_snapshot(&self, user_id: &str, as_of: Date) -> PreferenceSnapshot {
        let since = as_of.saturating_sub(Duration::days(i64::from(self.config.analysis_days)));

        match self.repository.meal_history(user_id, since).await {
            Ok(entries) => {
                let snapshot = PreferenceSnapshot::from_history(&entries, as_of, self.config);
                tracing::debug!(
                    user_id = %user_id,
                    entries = snapshot.analysed_entries,
                    favorites = snapshot.favorites.len(),
                    recently_used = snapshot.recently_used.len(),
                    "preference snapshot built"
                );
                snapshot
            }
            Err(err) => {
                tracing::error!(
                    user_id = %user_id,
                    err = %err,
                    "failed to read meal history, using neutral preferences"
                );
                self.monitor.record(Degradation::SnapshotFailure);
                PreferenceSnapshot::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealpick_shared::mealplan::MealType;
    use time::macros::date;

    const AS_OF: Date = date!(2025 - 03 - 31);

    fn entry(days_ago: i64, recipe_id: &str, cuisine: Option<CuisineType>, completed: bool) -> MealHistoryEntry {
        MealHistoryEntry {
            date: AS_OF - Duration::days(days_ago),
            meal_type: MealType::Dinner,
            recipe_id: recipe_id.to_owned(),
            cuisine,
            completed,
        }
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let snapshot = PreferenceSnapshot::from_history(&[], AS_OF, &PreferenceConfig::default());

        assert!(snapshot.is_empty());
        assert_eq!(snapshot, PreferenceSnapshot::empty());
    }

    #[test]
    fn test_cuisine_usage_and_completion() {
        let entries = vec![
            entry(20, "a", Some(CuisineType::Italian), true),
            entry(21, "b", Some(CuisineType::Italian), false),
            entry(22, "c", Some(CuisineType::Korean), true),
            entry(23, "d", None, true),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &PreferenceConfig::default());

        let italian = snapshot.cuisines[&CuisineType::Italian];
        assert_eq!(italian.uses, 2);
        assert_eq!(italian.usage_ratio, 0.5);
        assert_eq!(italian.completion_rate, 0.5);
        assert_eq!(snapshot.cuisine_usage_ratio(Some(CuisineType::Korean)), Some(0.25));
        assert_eq!(snapshot.cuisine_usage_ratio(Some(CuisineType::Thai)), None);
        assert_eq!(snapshot.cuisine_usage_ratio(None), None);
    }

    #[test]
    fn test_favorites_need_two_uses_and_high_completion() {
        let entries = vec![
            // 5/5 completed
            entry(30, "loved", None, true),
            entry(31, "loved", None, true),
            entry(32, "loved", None, true),
            entry(33, "loved", None, true),
            entry(34, "loved", None, true),
            // 4/5 completed, exactly 0.8
            entry(30, "liked", None, true),
            entry(31, "liked", None, true),
            entry(32, "liked", None, true),
            entry(33, "liked", None, true),
            entry(34, "liked", None, false),
            // 1/2 completed
            entry(40, "meh", None, true),
            entry(41, "meh", None, false),
            // single use
            entry(50, "once", None, true),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &PreferenceConfig::default());

        assert!(snapshot.is_favorite("loved"));
        assert!(snapshot.is_favorite("liked"));
        assert!(!snapshot.is_favorite("meh"));
        assert!(!snapshot.is_favorite("once"));
    }

    #[test]
    fn test_completion_map_excludes_single_attempts() {
        let entries = vec![
            entry(40, "meh", None, true),
            entry(41, "meh", None, false),
            entry(50, "once", None, false),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &PreferenceConfig::default());

        assert_eq!(snapshot.completion_rate("meh"), Some(0.5));
        assert_eq!(snapshot.completion_rate("once"), None, "untried, not zero-rated");
    }

    #[test]
    fn test_recently_used_window_is_fourteen_days() {
        let entries = vec![
            entry(0, "today", None, true),
            entry(13, "thirteen", None, true),
            entry(14, "fourteen", None, true),
            entry(5, "thirteen", None, true),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &PreferenceConfig::default());

        assert_eq!(snapshot.last_used("today"), Some(AS_OF));
        assert_eq!(
            snapshot.last_used("thirteen"),
            Some(AS_OF - Duration::days(5)),
            "latest use wins"
        );
        assert_eq!(snapshot.last_used("fourteen"), None);
    }

    #[test]
    fn test_entries_outside_analysis_window_ignored() {
        let entries = vec![
            entry(-1, "planned", Some(CuisineType::Thai), false),
            entry(91, "old", Some(CuisineType::Thai), true),
            entry(10, "kept", Some(CuisineType::French), true),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &PreferenceConfig::default());

        assert_eq!(snapshot.analysed_entries, 1);
        assert!(!snapshot.cuisines.contains_key(&CuisineType::Thai));
        assert_eq!(snapshot.last_used("planned"), None);
    }

    #[test]
    fn test_planned_recipes_count_as_recent() {
        let entries = vec![entry(10, "kept", None, true)];
        let config = PreferenceConfig::default();
        let planned = vec![
            ("monday".to_owned(), AS_OF - Duration::days(1)),
            ("tomorrow".to_owned(), AS_OF + Duration::days(1)),
        ];

        let snapshot = PreferenceSnapshot::from_history(&entries, AS_OF, &config)
            .with_planned(&planned, AS_OF, &config);

        assert_eq!(snapshot.last_used("monday"), Some(AS_OF - Duration::days(1)));
        assert_eq!(snapshot.last_used("tomorrow"), None);
        assert_eq!(snapshot.analysed_entries, 1);
        assert_eq!(snapshot.completion_rate("monday"), None);
    }
}
