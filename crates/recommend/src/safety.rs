use std::collections::HashSet;

use mealpick_shared::recipe::{AllergenId, Recipe};

/// Where an offending allergen was found on a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllergenSource {
    /// Tagged on the recipe itself.
    Direct,
    /// Carried by the named ingredient.
    Ingredient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub allergen: AllergenId,
    pub source: AllergenSource,
}

/// Returns `true` when `recipe` contains none of the user's allergens.
///
/// # Business Rules
/// - **Empty profile**: a user without allergens can eat anything
/// - **Direct tags**: allergens tagged on the recipe are checked first
/// - **Ingredient tags**: every ingredient's allergens propagate to the recipe
/// - **Missing data**: an ingredient that could not be loaded contributes no
///   allergens. The check carries on with the remaining ingredients.
///
/// Rejections are logged with the offending ingredient and allergen id.
pub fn is_safe(recipe: &Recipe, user_allergens: &HashSet<AllergenId>) -> bool {
    let Some(rejection) = rejection_reason(recipe, user_allergens) else {
        return true;
    };

    match &rejection.source {
        AllergenSource::Direct => tracing::info!(
            recipe_id = %recipe.id,
            allergen_id = %rejection.allergen,
            source = "direct_tag",
            "recipe rejected by allergy safety filter"
        ),
        AllergenSource::Ingredient(ingredient) => tracing::info!(
            recipe_id = %recipe.id,
            allergen_id = %rejection.allergen,
            ingredient = %ingredient,
            "recipe rejected by allergy safety filter"
        ),
    }

    false
}

/// First allergen of `recipe` found in `user_allergens`, direct tags before ingredients.
pub fn rejection_reason(
    recipe: &Recipe,
    user_allergens: &HashSet<AllergenId>,
) -> Option<Rejection> {
    if user_allergens.is_empty() {
        return None;
    }

    if let Some(allergen) = recipe
        .allergens
        .iter()
        .find(|allergen| user_allergens.contains(allergen))
    {
        return Some(Rejection {
            allergen: *allergen,
            source: AllergenSource::Direct,
        });
    }

    for usage in &recipe.ingredients {
        let Some(ingredient) = usage.ingredient.as_ref() else {
            tracing::debug!(
                recipe_id = %recipe.id,
                "ingredient data missing, no allergen contribution"
            );
            continue;
        };

        if let Some(allergen) = ingredient
            .allergens
            .iter()
            .find(|allergen| user_allergens.contains(allergen))
        {
            return Some(Rejection {
                allergen: *allergen,
                source: AllergenSource::Ingredient(ingredient.name.to_owned()),
            });
        }
    }

    None
}

/// Keeps the recipes that pass [`is_safe`], in their original order.
pub fn filter_safe(recipes: Vec<Recipe>, user_allergens: &HashSet<AllergenId>) -> Vec<Recipe> {
    if user_allergens.is_empty() {
        return recipes;
    }

    recipes
        .into_iter()
        .filter(|recipe| is_safe(recipe, user_allergens))
        .collect()
}
