mod allergen;
mod ingredient;
mod ingredient_allergen;
mod meal_history;
mod recipe;
mod recipe_allergen;
mod recipe_ingredient;
mod user_allergy;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "mealpick",
    "m0001",
    vec_box![],
    vec_box![
        recipe::CreateTable,
        recipe::CreateIdx1,
        ingredient::CreateTable,
        recipe_ingredient::CreateTable,
        allergen::CreateTable,
        allergen::CreateUk1,
        ingredient_allergen::CreateTable,
        recipe_allergen::CreateTable,
        user_allergy::CreateTable,
        meal_history::CreateTable,
    ]
);
