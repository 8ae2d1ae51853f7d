use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mealpick_recommend::{
    AllergyRepository, EngineConfig, FixedClock, MealHistoryRepository, PreferenceSnapshot,
    RecipeFilters, RecipeRepository, RecipeScore, Recommender, ScoreError, Scorer, ScoringContext,
};
use mealpick_shared::mealplan::{MealHistoryEntry, MealType};
use mealpick_shared::recipe::{Allergen, AllergenId, CuisineType, Ingredient, IngredientUsage, Recipe};
use time::macros::datetime;
use time::Date;

#[allow(dead_code)]
pub const PEANUT: AllergenId = AllergenId(1);
#[allow(dead_code)]
pub const MILK: AllergenId = AllergenId(2);
#[allow(dead_code)]
pub const GLUTEN: AllergenId = AllergenId(3);

/// In-memory collaborators counting how often each one is read.
#[derive(Default)]
pub struct MemoryRepository {
    pub recipes: Vec<Recipe>,
    pub allergens: Vec<Allergen>,
    pub user_allergens: Vec<(String, AllergenId)>,
    pub history: Vec<(String, MealHistoryEntry)>,
    pub fail_allergies: bool,
    pub fail_history: bool,
    pub fail_recipes: bool,
    pub recipe_reads: AtomicUsize,
    pub allergy_reads: AtomicUsize,
    pub history_reads: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryRepository {
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            allergens: vec![
                Allergen {
                    id: PEANUT,
                    name: "Peanut".to_owned(),
                },
                Allergen {
                    id: MILK,
                    name: "Milk".to_owned(),
                },
                Allergen {
                    id: GLUTEN,
                    name: "Gluten".to_owned(),
                },
            ],
            ..Default::default()
        }
    }

    pub fn allergic(mut self, user_id: &str, allergen: AllergenId) -> Self {
        self.user_allergens.push((user_id.to_owned(), allergen));
        self
    }

    pub fn ate(mut self, user_id: &str, entry: MealHistoryEntry) -> Self {
        self.history.push((user_id.to_owned(), entry));
        self
    }

    pub fn reads(&self) -> (usize, usize, usize) {
        (
            self.recipe_reads.load(Ordering::SeqCst),
            self.allergy_reads.load(Ordering::SeqCst),
            self.history_reads.load(Ordering::SeqCst),
        )
    }
}

#[async_trait::async_trait]
impl RecipeRepository for MemoryRepository {
    async fn candidate_recipes(
        &self,
        meal_type: &MealType,
        filters: &RecipeFilters,
    ) -> anyhow::Result<Vec<Recipe>> {
        self.recipe_reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_recipes {
            anyhow::bail!("recipe store offline");
        }

        let limit = filters.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(self
            .recipes
            .iter()
            .filter(|r| &r.meal_type == meal_type)
            .filter(|r| filters.cuisine.is_none() || r.cuisine == filters.cuisine)
            .filter(|r| filters.max_total_time.is_none_or(|max| r.total_time() <= max))
            .filter(|r| filters.include_custom || !r.is_custom)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl AllergyRepository for MemoryRepository {
    async fn user_allergen_ids(&self, user_id: &str) -> anyhow::Result<Vec<AllergenId>> {
        self.allergy_reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_allergies {
            anyhow::bail!("allergy store offline");
        }

        Ok(self
            .user_allergens
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, id)| *id)
            .collect())
    }

    async fn find_allergens_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Allergen>> {
        Ok(self
            .allergens
            .iter()
            .filter(|a| names.iter().any(|n| a.name.eq_ignore_ascii_case(n)))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl MealHistoryRepository for MemoryRepository {
    async fn meal_history(
        &self,
        user_id: &str,
        since: Date,
    ) -> anyhow::Result<Vec<MealHistoryEntry>> {
        self.history_reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_history {
            anyhow::bail!("history store offline");
        }

        Ok(self
            .history
            .iter()
            .filter(|(user, entry)| user == user_id && entry.date >= since)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

/// Counts calls. Every recipe gets the same real score of 1.0.
#[allow(dead_code)]
#[derive(Default)]
pub struct SpyScorer {
    pub calls: AtomicUsize,
}

impl Scorer for SpyScorer {
    fn score(
        &self,
        recipe: &Recipe,
        _context: &ScoringContext,
        _snapshot: &PreferenceSnapshot,
    ) -> Result<RecipeScore, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut score = RecipeScore::neutral(&recipe.id);
        score.total = 1.0;
        score.is_fallback = false;
        Ok(score)
    }
}

#[allow(dead_code)]
pub struct FailingScorer;

impl Scorer for FailingScorer {
    fn score(
        &self,
        recipe: &Recipe,
        _context: &ScoringContext,
        _snapshot: &PreferenceSnapshot,
    ) -> Result<RecipeScore, ScoreError> {
        Err(ScoreError::Failed(format!("cannot score {}", recipe.id)))
    }
}

#[allow(dead_code)]
pub fn ingredient(name: &str, allergens: &[AllergenId]) -> IngredientUsage {
    IngredientUsage::new(Ingredient {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_owned(),
        allergens: allergens.to_vec(),
    })
}

#[allow(dead_code)]
pub fn recipe(id: &str, meal_type: MealType, ingredients: Vec<IngredientUsage>) -> Recipe {
    Recipe {
        id: id.to_owned(),
        name: format!("Recipe {id}"),
        cuisine: Some(CuisineType::French),
        meal_type,
        prep_time: Some(10),
        cook_time: Some(15),
        servings: Some(2),
        average_rating: Some(4.0),
        likes: Some(20),
        ingredients,
        ..Default::default()
    }
}

/// Wednesday evening in Paris, outside rush hours.
#[allow(dead_code)]
pub fn evening_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(datetime!(2025-01-22 19:00 +01:00)))
}

#[allow(dead_code)]
pub fn recommender(repository: MemoryRepository) -> anyhow::Result<Recommender<MemoryRepository>> {
    Ok(Recommender::new(repository, EngineConfig::default())?.with_clock(evening_clock()))
}
