mod allergen;

pub use allergen::*;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::mealplan::MealType;

#[derive(
    EnumString,
    VariantArray,
    Display,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CuisineType {
    American,
    Caribbean,
    Chinese,
    French,
    Indian,
    Italian,
    Japanese,
    Korean,
    Mediterranean,
    Mexican,
    Thai,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    /// Allergens carried by this ingredient. They apply to every recipe using it.
    pub allergens: Vec<AllergenId>,
}

/// An ingredient line of a recipe.
///
/// `ingredient` is `None` when the referenced ingredient could not be loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientUsage {
    pub ingredient: Option<Ingredient>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl IngredientUsage {
    pub fn new(ingredient: Ingredient) -> Self {
        Self {
            ingredient: Some(ingredient),
            quantity: None,
            unit: None,
        }
    }

    pub fn name(&self) -> &str {
        self.ingredient
            .as_ref()
            .map(|i| i.name.as_str())
            .unwrap_or("<missing ingredient>")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub cuisine: Option<CuisineType>,
    pub meal_type: MealType,
    pub prep_time: Option<u16>,
    pub cook_time: Option<u16>,
    pub servings: Option<u16>,
    /// Average user rating on a 0-5 scale.
    pub average_rating: Option<f64>,
    pub likes: Option<u32>,
    pub is_custom: bool,
    pub ingredients: Vec<IngredientUsage>,
    /// Allergens tagged directly on the recipe, independently of its ingredients.
    pub allergens: Vec<AllergenId>,
    pub nutrition: Option<NutritionFacts>,
}

impl Recipe {
    pub fn total_time(&self) -> u32 {
        u32::from(self.prep_time.unwrap_or_default()) + u32::from(self.cook_time.unwrap_or_default())
    }
}
