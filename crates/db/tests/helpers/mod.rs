use std::{path::PathBuf, str::FromStr};

use mealpick_db::{SqliteRepository, day_timestamp, table};
use sea_query::{Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use time::Date;

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<SqliteRepository> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    mealpick_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(SqliteRepository::new(pool))
}

async fn execute(pool: &SqlitePool, statement: &sea_query::InsertStatement) -> anyhow::Result<()> {
    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

#[allow(dead_code)]
pub async fn create_allergen(pool: &SqlitePool, id: impl Into<i64>, name: &str) -> anyhow::Result<()> {
    let id: i64 = id.into();
    let statement = Query::insert()
        .into_table(table::Allergen::Table)
        .columns([table::Allergen::Id, table::Allergen::Name])
        .values_panic([id.into(), name.into()])
        .to_owned();

    execute(pool, &statement).await
}

#[allow(dead_code)]
pub async fn create_ingredient(
    pool: &SqlitePool,
    id: &str,
    allergens: &[i64],
) -> anyhow::Result<()> {
    let statement = Query::insert()
        .into_table(table::Ingredient::Table)
        .columns([table::Ingredient::Id, table::Ingredient::Name])
        .values_panic([id.into(), id.replace('-', " ").into()])
        .to_owned();
    execute(pool, &statement).await?;

    for allergen in allergens {
        let statement = Query::insert()
            .into_table(table::IngredientAllergen::Table)
            .columns([
                table::IngredientAllergen::IngredientId,
                table::IngredientAllergen::AllergenId,
            ])
            .values_panic([id.into(), (*allergen).into()])
            .to_owned();
        execute(pool, &statement).await?;
    }

    Ok(())
}

#[allow(dead_code)]
pub struct RecipeInput<'a> {
    pub id: &'a str,
    pub meal_type: &'a str,
    pub cuisine: Option<&'a str>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub rating: Option<f64>,
    pub likes: i64,
    pub is_custom: bool,
    pub ingredients: &'a [&'a str],
    pub allergens: &'a [u32],
}

impl Default for RecipeInput<'_> {
    fn default() -> Self {
        Self {
            id: "recipe",
            meal_type: "dinner",
            cuisine: Some("Italian"),
            prep_time: Some(10),
            cook_time: Some(20),
            rating: Some(4.0),
            likes: 25,
            is_custom: false,
            ingredients: &[],
            allergens: &[],
        }
    }
}

#[allow(dead_code)]
pub async fn create_recipe(pool: &SqlitePool, input: RecipeInput<'_>) -> anyhow::Result<()> {
    let statement = Query::insert()
        .into_table(table::Recipe::Table)
        .columns([
            table::Recipe::Id,
            table::Recipe::Name,
            table::Recipe::CuisineType,
            table::Recipe::MealType,
            table::Recipe::PrepTime,
            table::Recipe::CookTime,
            table::Recipe::AverageRating,
            table::Recipe::Likes,
            table::Recipe::IsCustom,
        ])
        .values_panic([
            input.id.into(),
            format!("Recipe {}", input.id).into(),
            input.cuisine.into(),
            input.meal_type.into(),
            input.prep_time.into(),
            input.cook_time.into(),
            input.rating.into(),
            input.likes.into(),
            input.is_custom.into(),
        ])
        .to_owned();
    execute(pool, &statement).await?;

    for (position, ingredient) in input.ingredients.iter().enumerate() {
        let statement = Query::insert()
            .into_table(table::RecipeIngredient::Table)
            .columns([
                table::RecipeIngredient::RecipeId,
                table::RecipeIngredient::Position,
                table::RecipeIngredient::IngredientId,
                table::RecipeIngredient::Quantity,
                table::RecipeIngredient::Unit,
            ])
            .values_panic([
                input.id.into(),
                (position as i64).into(),
                (*ingredient).into(),
                1.5f64.into(),
                "cup".into(),
            ])
            .to_owned();
        execute(pool, &statement).await?;
    }

    for allergen in input.allergens {
        let statement = Query::insert()
            .into_table(table::RecipeAllergen::Table)
            .columns([table::RecipeAllergen::RecipeId, table::RecipeAllergen::AllergenId])
            .values_panic([input.id.into(), (*allergen).into()])
            .to_owned();
        execute(pool, &statement).await?;
    }

    Ok(())
}

#[allow(dead_code)]
pub async fn create_user_allergy(
    pool: &SqlitePool,
    user_id: &str,
    allergen: impl Into<i64>,
) -> anyhow::Result<()> {
    let allergen: i64 = allergen.into();
    let statement = Query::insert()
        .into_table(table::UserAllergy::Table)
        .columns([table::UserAllergy::UserId, table::UserAllergy::AllergenId])
        .values_panic([user_id.into(), allergen.into()])
        .to_owned();

    execute(pool, &statement).await
}

#[allow(dead_code)]
pub async fn create_meal(
    pool: &SqlitePool,
    user_id: &str,
    date: Date,
    meal_type: &str,
    recipe_id: &str,
    completed: bool,
) -> anyhow::Result<()> {
    let statement = Query::insert()
        .into_table(table::MealHistory::Table)
        .columns([
            table::MealHistory::UserId,
            table::MealHistory::Day,
            table::MealHistory::MealType,
            table::MealHistory::RecipeId,
            table::MealHistory::Completed,
        ])
        .values_panic([
            user_id.into(),
            day_timestamp(date).into(),
            meal_type.into(),
            recipe_id.into(),
            completed.into(),
        ])
        .to_owned();

    execute(pool, &statement).await
}
