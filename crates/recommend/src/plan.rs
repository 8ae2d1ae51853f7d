use mealpick_shared::mealplan::{MealHistoryEntry, MealType};
use mealpick_shared::recipe::Recipe;
use rand::seq::IndexedRandom;
use serde::Serialize;
use time::{Date, Duration};

use crate::context::ScoringContext;
use crate::error::RecommendError;
use crate::monitor::Degradation;
use crate::preference::PreferenceSnapshot;
use crate::repository::{AllergyRepository, MealHistoryRepository, RecipeFilters, RecipeRepository};
use crate::safety::filter_safe;
use crate::selector::{SelectionSource, Selector};
use crate::service::Recommender;

/// Current week plus the next four.
pub const MAX_PLAN_DAYS: u16 = 35;

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub user_id: String,
    pub start: Date,
    pub days: u16,
    pub meal_types: Vec<MealType>,
    pub filters: RecipeFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMeal {
    pub date: Date,
    pub meal_type: MealType,
    /// `None` when no safe recipe exists for this meal type.
    pub recipe_id: Option<String>,
    pub source: Option<SelectionSource>,
}

impl PlannedMeal {
    fn empty(date: Date, meal_type: MealType) -> Self {
        Self {
            date,
            meal_type,
            recipe_id: None,
            source: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recipe_id.is_none()
    }
}

impl<R> Recommender<R>
where
    R: RecipeRepository + AllergyRepository + MealHistoryRepository,
{
    /// Fills `days` consecutive days starting at `start`, one meal per meal type.
    ///
    /// Slots are filled in order. Each slot ranks a shortlist and picks one at
    /// random; earlier picks count as recent use for the slots after them.
    ///
    /// Rush hour is decided once from the clock at generation time and applies
    /// to every weekday slot of the plan; weekend detection follows each
    /// slot's own date.
    #[tracing::instrument(skip_all, fields(user_id = %request.user_id, start = %request.start, days = request.days))]
    pub async fn fill_plan(&self, request: PlanRequest) -> Result<Vec<PlannedMeal>, RecommendError> {
        if request.days == 0 || request.days > MAX_PLAN_DAYS {
            return Err(RecommendError::InvalidRequest(format!(
                "plan length must be between 1 and {MAX_PLAN_DAYS} days, got {}",
                request.days
            )));
        }

        if request.meal_types.is_empty() {
            return Err(RecommendError::InvalidRequest(
                "at least one meal type is required".to_owned(),
            ));
        }

        let allergens = self.user_allergens(&request.user_id).await?;

        let mut pools: Vec<(MealType, Vec<Recipe>)> = Vec::new();
        for meal_type in &request.meal_types {
            if pools.iter().any(|(t, _)| t == meal_type) {
                continue;
            }

            let candidates = self
                .repository
                .candidate_recipes(meal_type, &request.filters)
                .await
                .map_err(RecommendError::CandidatesUnavailable)?;

            let total = candidates.len();
            let safe = filter_safe(candidates, &allergens);
            self.monitor.record_rejections((total - safe.len()) as u64);

            pools.push((meal_type.clone(), safe));
        }

        let history = self.plan_history(&request.user_id, request.start).await;

        let preference = &self.config.preference;
        let shortlist_size = self.config.plan.shortlist_size;
        let selector = Selector::new(self.scorer.as_ref(), &self.monitor);
        let now = self.clock.now();

        let mut planned: Vec<(String, Date)> = Vec::new();
        let mut meals = Vec::with_capacity(usize::from(request.days) * request.meal_types.len());
        let mut rng = rand::rng();

        for offset in 0..request.days {
            let date = request.start + Duration::days(i64::from(offset));

            for meal_type in &request.meal_types {
                let pool = pools
                    .iter()
                    .find(|(t, _)| t == meal_type)
                    .map(|(_, recipes)| recipes.as_slice())
                    .unwrap_or_default();

                let snapshot = PreferenceSnapshot::from_history(&history, date, preference)
                    .with_planned(&planned, date, preference);
                let context = ScoringContext::build(now, date, meal_type.clone(), &self.config);

                let shortlist = selector.select_top(pool, &context, &snapshot, shortlist_size);

                let Some(pick) = shortlist.choose(&mut rng) else {
                    tracing::warn!(date = %date, meal_type = %meal_type, "no safe recipe for slot, leaving it empty");
                    meals.push(PlannedMeal::empty(date, meal_type.clone()));
                    continue;
                };

                planned.push((pick.recipe_id.to_owned(), date));
                meals.push(PlannedMeal {
                    date,
                    meal_type: meal_type.clone(),
                    recipe_id: Some(pick.recipe_id.to_owned()),
                    source: Some(pick.source),
                });
            }
        }

        let empty_slots = meals.iter().filter(|meal| meal.is_empty()).count();
        tracing::info!(slots = meals.len(), empty_slots = empty_slots, "meal plan filled");

        Ok(meals)
    }

    /// History feeding every slot of the plan. A failed read plans as for a new user.
    async fn plan_history(&self, user_id: &str, start: Date) -> Vec<MealHistoryEntry> {
        let since =
            start.saturating_sub(Duration::days(i64::from(self.config.preference.analysis_days)));

        match self.repository.meal_history(user_id, since).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(user_id = %user_id, err = %err, "failed to read meal history, planning without preferences");
                self.monitor.record(Degradation::SnapshotFailure);
                vec![]
            }
        }
    }
}
