use std::collections::HashMap;
use std::str::FromStr;

use mealpick_recommend::{AllergyRepository, MealHistoryRepository, RecipeFilters, RecipeRepository};
use mealpick_shared::mealplan::{MealHistoryEntry, MealType};
use mealpick_shared::recipe::{
    Allergen, AllergenId, CuisineType, Ingredient, IngredientUsage, NutritionFacts, Recipe,
};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};
use time::{Date, OffsetDateTime};

use crate::table::{
    self, IngredientAllergen, MealHistory, RecipeAllergen, RecipeIngredient, UserAllergy,
};

/// Unix timestamp of `date` at UTC midnight, the storage format of history days.
pub fn day_timestamp(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

pub fn date_from_day(day: i64) -> anyhow::Result<Date> {
    Ok(OffsetDateTime::from_unix_timestamp(day)?.date())
}

/// Fails on ids that do not fit: dropping one would hide an allergen from
/// the safety filter.
fn allergen_id(raw: i64) -> anyhow::Result<AllergenId> {
    match u32::try_from(raw) {
        Ok(id) => Ok(AllergenId(id)),
        Err(_) => {
            tracing::error!(allergen_id = raw, "allergen id out of range");
            anyhow::bail!("allergen id {raw} out of range")
        }
    }
}

/// `None` stays missing, anything that does not fit `T` is a defective row.
fn column<T: TryFrom<i64>>(
    recipe_id: &str,
    field: &str,
    raw: Option<i64>,
) -> anyhow::Result<Option<T>> {
    match raw {
        None => Ok(None),
        Some(value) => match T::try_from(value) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                tracing::error!(
                    recipe_id = %recipe_id,
                    column = field,
                    value = value,
                    "recipe column out of range"
                );
                anyhow::bail!("recipe {recipe_id}: {field} {value} out of range")
            }
        },
    }
}

#[derive(FromRow)]
struct RecipeRow {
    id: String,
    name: String,
    cuisine_type: Option<String>,
    meal_type: String,
    prep_time: Option<i64>,
    cook_time: Option<i64>,
    servings: Option<i64>,
    average_rating: Option<f64>,
    likes: Option<i64>,
    is_custom: bool,
    calories_kcal: Option<f64>,
    protein_g: Option<f64>,
    fat_g: Option<f64>,
    carbs_g: Option<f64>,
    sodium_mg: Option<f64>,
}

#[derive(FromRow)]
struct IngredientLineRow {
    recipe_id: String,
    ingredient_id: String,
    quantity: Option<f64>,
    unit: Option<String>,
    /// `None` when the referenced ingredient no longer exists.
    name: Option<String>,
}

#[derive(FromRow)]
struct IngredientAllergenRow {
    ingredient_id: String,
    allergen_id: i64,
}

#[derive(FromRow)]
struct RecipeAllergenRow {
    recipe_id: String,
    allergen_id: i64,
}

#[derive(FromRow)]
struct AllergenRow {
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct HistoryRow {
    day: i64,
    meal_type: String,
    recipe_id: String,
    completed: bool,
    cuisine_type: Option<String>,
}

fn parse_cuisine(raw: Option<String>) -> Option<CuisineType> {
    let raw = raw?;

    match CuisineType::from_str(&raw) {
        Ok(cuisine) => Some(cuisine),
        Err(_) => {
            tracing::debug!(cuisine = %raw, "unknown cuisine, treated as missing");
            None
        }
    }
}

fn parse_meal_type(raw: String) -> MealType {
    MealType::from_str(&raw).unwrap_or(MealType::Other(raw))
}

impl RecipeRow {
    fn into_recipe(
        self,
        ingredients: Vec<IngredientUsage>,
        allergens: Vec<AllergenId>,
    ) -> anyhow::Result<Recipe> {
        let nutrition = NutritionFacts {
            calories_kcal: self.calories_kcal,
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            carbs_g: self.carbs_g,
            sodium_mg: self.sodium_mg,
        };
        let has_nutrition = nutrition != NutritionFacts::default();

        Ok(Recipe {
            prep_time: column(&self.id, "prep_time", self.prep_time)?,
            cook_time: column(&self.id, "cook_time", self.cook_time)?,
            servings: column(&self.id, "servings", self.servings)?,
            likes: column(&self.id, "likes", self.likes)?,
            id: self.id,
            name: self.name,
            cuisine: parse_cuisine(self.cuisine_type),
            meal_type: parse_meal_type(self.meal_type),
            average_rating: self.average_rating,
            is_custom: self.is_custom,
            ingredients,
            allergens,
            nutrition: has_nutrition.then_some(nutrition),
        })
    }
}

/// SQLite implementation of every collaborator the engine reads from.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ingredient_lines(&self, recipe_ids: &[String]) -> anyhow::Result<Vec<IngredientLineRow>> {
        let statement = Query::select()
            .columns([
                (RecipeIngredient::Table, RecipeIngredient::RecipeId),
                (RecipeIngredient::Table, RecipeIngredient::IngredientId),
                (RecipeIngredient::Table, RecipeIngredient::Quantity),
                (RecipeIngredient::Table, RecipeIngredient::Unit),
            ])
            .column((table::Ingredient::Table, table::Ingredient::Name))
            .from(RecipeIngredient::Table)
            .left_join(
                table::Ingredient::Table,
                Expr::col((table::Ingredient::Table, table::Ingredient::Id))
                    .equals((RecipeIngredient::Table, RecipeIngredient::IngredientId)),
            )
            .and_where(
                Expr::col((RecipeIngredient::Table, RecipeIngredient::RecipeId))
                    .is_in(recipe_ids.iter().cloned()),
            )
            .order_by((RecipeIngredient::Table, RecipeIngredient::RecipeId), Order::Asc)
            .order_by((RecipeIngredient::Table, RecipeIngredient::Position), Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, IngredientLineRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn ingredient_allergens(
        &self,
        ingredient_ids: Vec<String>,
    ) -> anyhow::Result<HashMap<String, Vec<AllergenId>>> {
        if ingredient_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let statement = Query::select()
            .columns([IngredientAllergen::IngredientId, IngredientAllergen::AllergenId])
            .from(IngredientAllergen::Table)
            .and_where(Expr::col(IngredientAllergen::IngredientId).is_in(ingredient_ids))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, IngredientAllergenRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        let mut allergens: HashMap<String, Vec<AllergenId>> = HashMap::new();
        for row in rows {
            let id = allergen_id(row.allergen_id)?;
            allergens.entry(row.ingredient_id).or_default().push(id);
        }

        Ok(allergens)
    }

    async fn recipe_allergens(
        &self,
        recipe_ids: &[String],
    ) -> anyhow::Result<HashMap<String, Vec<AllergenId>>> {
        let statement = Query::select()
            .columns([RecipeAllergen::RecipeId, RecipeAllergen::AllergenId])
            .from(RecipeAllergen::Table)
            .and_where(Expr::col(RecipeAllergen::RecipeId).is_in(recipe_ids.iter().cloned()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, RecipeAllergenRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        let mut allergens: HashMap<String, Vec<AllergenId>> = HashMap::new();
        for row in rows {
            let id = allergen_id(row.allergen_id)?;
            allergens.entry(row.recipe_id).or_default().push(id);
        }

        Ok(allergens)
    }
}

#[async_trait::async_trait]
impl RecipeRepository for SqliteRepository {
    async fn candidate_recipes(
        &self,
        meal_type: &MealType,
        filters: &RecipeFilters,
    ) -> anyhow::Result<Vec<Recipe>> {
        let mut statement = Query::select()
            .columns([
                table::Recipe::Id,
                table::Recipe::Name,
                table::Recipe::CuisineType,
                table::Recipe::MealType,
                table::Recipe::PrepTime,
                table::Recipe::CookTime,
                table::Recipe::Servings,
                table::Recipe::AverageRating,
                table::Recipe::Likes,
                table::Recipe::IsCustom,
                table::Recipe::CaloriesKcal,
                table::Recipe::ProteinG,
                table::Recipe::FatG,
                table::Recipe::CarbsG,
                table::Recipe::SodiumMg,
            ])
            .from(table::Recipe::Table)
            .and_where(Expr::col(table::Recipe::MealType).eq(meal_type.as_str()))
            .order_by(table::Recipe::Id, Order::Asc)
            .to_owned();

        if let Some(cuisine) = filters.cuisine {
            statement.and_where(Expr::col(table::Recipe::CuisineType).eq(cuisine.to_string()));
        }

        if !filters.include_custom {
            statement.and_where(Expr::col(table::Recipe::IsCustom).eq(false));
        }

        if let Some(max) = filters.max_total_time {
            let prep = Func::coalesce([Expr::col(table::Recipe::PrepTime), Expr::val(0)]);
            let cook = Func::coalesce([Expr::col(table::Recipe::CookTime), Expr::val(0)]);
            statement.and_where(Expr::expr(prep).add(cook).lte(i64::from(max)));
        }

        if let Some(limit) = filters.limit {
            statement.limit(u64::from(limit));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(vec![]);
        }

        let recipe_ids: Vec<String> = rows.iter().map(|row| row.id.to_owned()).collect();
        let lines = self.ingredient_lines(&recipe_ids).await?;

        let mut ingredient_ids: Vec<String> =
            lines.iter().map(|line| line.ingredient_id.to_owned()).collect();
        ingredient_ids.sort();
        ingredient_ids.dedup();

        let ingredient_allergens = self.ingredient_allergens(ingredient_ids).await?;
        let mut recipe_allergens = self.recipe_allergens(&recipe_ids).await?;

        let mut usages: HashMap<String, Vec<IngredientUsage>> = HashMap::new();
        for line in lines {
            let ingredient = match line.name {
                Some(name) => Some(Ingredient {
                    allergens: ingredient_allergens
                        .get(&line.ingredient_id)
                        .cloned()
                        .unwrap_or_default(),
                    id: line.ingredient_id,
                    name,
                }),
                None => {
                    tracing::debug!(
                        recipe_id = %line.recipe_id,
                        ingredient_id = %line.ingredient_id,
                        "recipe references a missing ingredient"
                    );
                    None
                }
            };

            usages.entry(line.recipe_id).or_default().push(IngredientUsage {
                ingredient,
                quantity: line.quantity,
                unit: line.unit,
            });
        }

        let recipes = rows
            .into_iter()
            .map(|row| {
                let ingredients = usages.remove(&row.id).unwrap_or_default();
                let allergens = recipe_allergens.remove(&row.id).unwrap_or_default();
                row.into_recipe(ingredients, allergens)
            })
            .collect::<anyhow::Result<Vec<Recipe>>>()?;

        tracing::debug!(meal_type = %meal_type, count = recipes.len(), "candidate recipes loaded");

        Ok(recipes)
    }
}

#[async_trait::async_trait]
impl AllergyRepository for SqliteRepository {
    async fn user_allergen_ids(&self, user_id: &str) -> anyhow::Result<Vec<AllergenId>> {
        let statement = Query::select()
            .column(UserAllergy::AllergenId)
            .from(UserAllergy::Table)
            .and_where(Expr::col(UserAllergy::UserId).eq(user_id))
            .order_by(UserAllergy::AllergenId, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|(id,)| allergen_id(id)).collect()
    }

    async fn find_allergens_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Allergen>> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let lowered: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
        let statement = Query::select()
            .columns([table::Allergen::Id, table::Allergen::Name])
            .from(table::Allergen::Table)
            .and_where(Expr::expr(Func::lower(Expr::col(table::Allergen::Name))).is_in(lowered))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, AllergenRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Allergen {
                    id: allergen_id(row.id)?,
                    name: row.name,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MealHistoryRepository for SqliteRepository {
    async fn meal_history(
        &self,
        user_id: &str,
        since: Date,
    ) -> anyhow::Result<Vec<MealHistoryEntry>> {
        let statement = Query::select()
            .columns([
                (MealHistory::Table, MealHistory::Day),
                (MealHistory::Table, MealHistory::MealType),
                (MealHistory::Table, MealHistory::RecipeId),
                (MealHistory::Table, MealHistory::Completed),
            ])
            .column((table::Recipe::Table, table::Recipe::CuisineType))
            .from(MealHistory::Table)
            .left_join(
                table::Recipe::Table,
                Expr::col((table::Recipe::Table, table::Recipe::Id))
                    .equals((MealHistory::Table, MealHistory::RecipeId)),
            )
            .and_where(Expr::col((MealHistory::Table, MealHistory::UserId)).eq(user_id))
            .and_where(Expr::col((MealHistory::Table, MealHistory::Day)).gte(day_timestamp(since)))
            .order_by((MealHistory::Table, MealHistory::Day), Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, HistoryRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(MealHistoryEntry {
                    date: date_from_day(row.day)?,
                    meal_type: parse_meal_type(row.meal_type),
                    recipe_id: row.recipe_id,
                    cuisine: parse_cuisine(row.cuisine_type),
                    completed: row.completed,
                })
            })
            .collect()
    }
}
