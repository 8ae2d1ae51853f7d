use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Recipe {
    Table,
    Id,
    Name,
    CuisineType,
    MealType,
    PrepTime,
    CookTime,
    Servings,
    AverageRating,
    Likes,
    IsCustom,
    CaloriesKcal,
    ProteinG,
    FatG,
    CarbsG,
    SodiumMg,
}

#[derive(Iden, Clone)]
pub enum Ingredient {
    Table,
    Id,
    Name,
}

#[derive(Iden, Clone)]
pub enum RecipeIngredient {
    Table,
    RecipeId,
    Position,
    IngredientId,
    Quantity,
    Unit,
}

#[derive(Iden, Clone)]
pub enum Allergen {
    Table,
    Id,
    Name,
}

#[derive(Iden, Clone)]
pub enum IngredientAllergen {
    Table,
    IngredientId,
    AllergenId,
}

#[derive(Iden, Clone)]
pub enum RecipeAllergen {
    Table,
    RecipeId,
    AllergenId,
}

#[derive(Iden, Clone)]
pub enum UserAllergy {
    Table,
    UserId,
    AllergenId,
}

#[derive(Iden, Clone)]
pub enum MealHistory {
    Table,
    UserId,
    Day,
    MealType,
    RecipeId,
    Completed,
}
