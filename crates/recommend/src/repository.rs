//! Read-only collaborators the engine consumes.
//!
//! The engine never writes, and calls each collaborator at most once per
//! request.

use mealpick_shared::mealplan::{MealHistoryEntry, MealType};
use mealpick_shared::recipe::{Allergen, AllergenId, CuisineType, Recipe};
use time::Date;

/// Coarse criteria applied upstream of safety filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFilters {
    pub cuisine: Option<CuisineType>,
    /// Maximum prep + cook time in minutes.
    pub max_total_time: Option<u32>,
    pub include_custom: bool,
    pub limit: Option<u32>,
}

impl Default for RecipeFilters {
    fn default() -> Self {
        Self {
            cuisine: None,
            max_total_time: None,
            include_custom: true,
            limit: None,
        }
    }
}

#[async_trait::async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Candidate recipes of `meal_type`, with ingredients and allergen tags loaded.
    async fn candidate_recipes(
        &self,
        meal_type: &MealType,
        filters: &RecipeFilters,
    ) -> anyhow::Result<Vec<Recipe>>;
}

#[async_trait::async_trait]
pub trait AllergyRepository: Send + Sync {
    async fn user_allergen_ids(&self, user_id: &str) -> anyhow::Result<Vec<AllergenId>>;

    /// Exact, case-insensitive lookup of allergens by display name.
    async fn find_allergens_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Allergen>>;
}

#[async_trait::async_trait]
pub trait MealHistoryRepository: Send + Sync {
    /// Meals of `user_id` with a recipe assigned, dated on or after `since`.
    async fn meal_history(
        &self,
        user_id: &str,
        since: Date,
    ) -> anyhow::Result<Vec<MealHistoryEntry>>;
}
