use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumString;
use time::Date;
use time::macros::format_description;

use crate::recipe::CuisineType;

#[derive(EnumString, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snack,
    /// Any meal type the engine has no dedicated heuristics for ("brunch", ...).
    #[strum(default)]
    Other(String),
}

impl MealType {
    pub fn as_str(&self) -> &str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Other(name) => name,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a `YYYY-MM-DD` calendar day.
pub fn parse_day(value: &str) -> crate::Result<Date> {
    Ok(Date::parse(
        value.trim(),
        format_description!("[year]-[month]-[day]"),
    )?)
}

/// A past meal of a user, as recorded in one of their meal plans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealHistoryEntry {
    pub date: Date,
    pub meal_type: MealType,
    pub recipe_id: String,
    /// Cuisine of the recipe at read time, `None` when unknown.
    pub cuisine: Option<CuisineType>,
    pub completed: bool,
}
