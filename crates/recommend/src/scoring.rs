//! Multi-factor recipe scoring.
//!
//! Formula: `quality * 0.30 + variety * 0.25 + time_fit * 0.20 +
//! nutrition_fit * 0.15 + preference_fit * 0.10` with the weights taken from
//! [`ScoreWeights`]. Quality stays on its 0-5 scale while the other four
//! factors are 0-1, which lets quality dominate close calls.

use mealpick_shared::mealplan::MealType;
use mealpick_shared::recipe::Recipe;
use serde::Serialize;

use crate::config::{EngineConfig, ScoreWeights, TimeFitSchedules, TimeSchedule};
use crate::context::ScoringContext;
use crate::monitor::{Degradation, DegradationMonitor};
use crate::preference::PreferenceSnapshot;

pub const MAX_QUALITY: f64 = 5.0;
/// Nutrition targets are not matched yet. The slot keeps its weight so the
/// other four factors keep their relative importance.
pub const NEUTRAL_NUTRITION_FIT: f64 = 0.5;
pub const UNSEEN_CUISINE_RATIO: f64 = 0.3;
pub const UNTRIED_COMPLETION_RATE: f64 = 0.2;

const NEUTRAL_QUALITY: f64 = 2.5;
const NEUTRAL_FACTOR: f64 = 0.5;
const NEUTRAL_TOTAL: f64 = 2.5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScoreError {
    #[error("rating {0} is outside 0..=5")]
    InvalidRating(f64),

    #[error("{0} sub-score is not a finite number")]
    NonFinite(&'static str),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeScore {
    pub recipe_id: String,
    pub quality: f64,
    pub variety: f64,
    pub time_fit: f64,
    pub nutrition_fit: f64,
    pub preference_fit: f64,
    pub total: f64,
    pub breakdown: String,
    /// Set when scoring failed and the fixed neutral score was substituted.
    pub is_fallback: bool,
}

impl RecipeScore {
    /// Fixed score used when a recipe cannot be scored.
    pub fn neutral(recipe_id: impl Into<String>) -> Self {
        let mut score = Self {
            recipe_id: recipe_id.into(),
            quality: NEUTRAL_QUALITY,
            variety: NEUTRAL_FACTOR,
            time_fit: NEUTRAL_FACTOR,
            nutrition_fit: NEUTRAL_FACTOR,
            preference_fit: NEUTRAL_FACTOR,
            total: NEUTRAL_TOTAL,
            breakdown: String::new(),
            is_fallback: true,
        };
        score.breakdown = format!("{} (neutral fallback)", score.describe());
        score
    }

    fn describe(&self) -> String {
        format!(
            "quality={:.2} variety={:.2} time_fit={:.2} nutrition_fit={:.2} preference_fit={:.2} total={:.3}",
            self.quality,
            self.variety,
            self.time_fit,
            self.nutrition_fit,
            self.preference_fit,
            self.total
        )
    }
}

/// Scores one safety-filtered recipe for a slot.
///
/// Implementations must be thread-safe so candidates can be scored in
/// parallel, and must not panic: report problems through [`ScoreError`].
pub trait Scorer: Send + Sync {
    fn score(
        &self,
        recipe: &Recipe,
        context: &ScoringContext,
        snapshot: &PreferenceSnapshot,
    ) -> Result<RecipeScore, ScoreError>;
}

/// Production scorer: weighted sum of the five sub-scores.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: ScoreWeights,
    schedules: TimeFitSchedules,
}

impl WeightedScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            schedules: config.time_fit.clone(),
        }
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Scorer for WeightedScorer {
    fn score(
        &self,
        recipe: &Recipe,
        context: &ScoringContext,
        snapshot: &PreferenceSnapshot,
    ) -> Result<RecipeScore, ScoreError> {
        let quality = quality_score(recipe)?;
        let variety = variety_score(&recipe.id, context, snapshot);
        let time_fit = time_fit_score(recipe, context, &self.schedules);
        let nutrition_fit = nutrition_fit_score(recipe);
        let preference_fit = preference_fit_score(recipe, snapshot);

        for (name, value) in [
            ("variety", variety),
            ("time_fit", time_fit),
            ("preference_fit", preference_fit),
        ] {
            if !value.is_finite() {
                return Err(ScoreError::NonFinite(name));
            }
        }

        let total = quality * self.weights.quality
            + variety * self.weights.variety
            + time_fit * self.weights.time_fit
            + nutrition_fit * self.weights.nutrition_fit
            + preference_fit * self.weights.preference_fit;

        if !total.is_finite() {
            return Err(ScoreError::NonFinite("total"));
        }

        let mut score = RecipeScore {
            recipe_id: recipe.id.to_owned(),
            quality,
            variety,
            time_fit,
            nutrition_fit,
            preference_fit,
            total,
            breakdown: String::new(),
            is_fallback: false,
        };
        score.breakdown = score.describe();

        Ok(score)
    }
}

/// Scores `recipe`, substituting [`RecipeScore::neutral`] on failure so one
/// bad recipe never aborts the batch.
pub fn score_or_neutral(
    scorer: &dyn Scorer,
    recipe: &Recipe,
    context: &ScoringContext,
    snapshot: &PreferenceSnapshot,
    monitor: &DegradationMonitor,
) -> RecipeScore {
    match scorer.score(recipe, context, snapshot) {
        Ok(score) => {
            tracing::trace!(recipe_id = %recipe.id, breakdown = %score.breakdown, "recipe scored");
            score
        }
        Err(err) => {
            tracing::warn!(recipe_id = %recipe.id, err = %err, "failed to score recipe, using neutral score");
            monitor.record(Degradation::ScoringFailure);
            RecipeScore::neutral(&recipe.id)
        }
    }
}

/// `0.7 * rating + 0.2 * min(likes / 100, 1) + 0.1` (the last term only for
/// non-custom recipes), capped at 5. Missing rating or likes count as zero.
pub fn quality_score(recipe: &Recipe) -> Result<f64, ScoreError> {
    let rating = match recipe.average_rating {
        Some(rating) if !rating.is_finite() || !(0.0..=MAX_QUALITY).contains(&rating) => {
            return Err(ScoreError::InvalidRating(rating));
        }
        Some(rating) => rating,
        None => 0.0,
    };

    let popularity = (f64::from(recipe.likes.unwrap_or_default()) / 100.0).min(1.0);
    let curated = if recipe.is_custom { 0.0 } else { 0.1 };

    Ok((0.7 * rating + 0.2 * popularity + curated).min(MAX_QUALITY))
}

/// Step function on the days since this user last ate this recipe.
///
/// Buckets are half-open: 13 days scores 0.7, 14 days scores 1.0.
pub fn variety_score(
    recipe_id: &str,
    context: &ScoringContext,
    snapshot: &PreferenceSnapshot,
) -> f64 {
    let Some(last_used) = snapshot.last_used(recipe_id) else {
        return 1.0;
    };

    match (context.target_date - last_used).whole_days() {
        days if days < 1 => 0.0,
        days if days < 3 => 0.1,
        days if days < 7 => 0.3,
        days if days < 14 => 0.7,
        _ => 1.0,
    }
}

pub fn time_schedule<'a>(
    context: &ScoringContext,
    schedules: &'a TimeFitSchedules,
) -> &'a TimeSchedule {
    let rush = context.is_rush_hour && !context.is_weekend;

    match context.meal_type {
        MealType::Breakfast if rush => &schedules.breakfast_rush,
        MealType::Breakfast => &schedules.breakfast_relaxed,
        MealType::Lunch if rush => &schedules.lunch_rush,
        MealType::Lunch => &schedules.lunch_normal,
        MealType::Dinner if context.is_weekend => &schedules.dinner_weekend,
        MealType::Dinner => &schedules.dinner_weekday,
        MealType::Snack => &schedules.snack,
        MealType::Other(_) => &schedules.generic,
    }
}

pub fn time_fit_score(
    recipe: &Recipe,
    context: &ScoringContext,
    schedules: &TimeFitSchedules,
) -> f64 {
    time_schedule(context, schedules).score(recipe.total_time())
}

pub fn nutrition_fit_score(recipe: &Recipe) -> f64 {
    if let Some(facts) = recipe.nutrition.as_ref() {
        tracing::trace!(
            recipe_id = %recipe.id,
            calories_kcal = ?facts.calories_kcal,
            "nutrition facts present, no targets to match"
        );
    }

    NEUTRAL_NUTRITION_FIT
}

/// `0.6 * cuisine usage ratio + 0.4 * recipe completion rate`, with 0.3 for
/// an unseen cuisine and 0.2 for a recipe tried fewer than twice.
pub fn preference_fit_score(recipe: &Recipe, snapshot: &PreferenceSnapshot) -> f64 {
    let cuisine = snapshot
        .cuisine_usage_ratio(recipe.cuisine)
        .unwrap_or(UNSEEN_CUISINE_RATIO);
    let completion = snapshot
        .completion_rate(&recipe.id)
        .unwrap_or(UNTRIED_COMPLETION_RATE);

    0.6 * cuisine + 0.4 * completion
}
