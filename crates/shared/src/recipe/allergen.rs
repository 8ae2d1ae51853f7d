use std::fmt;

use serde::{Deserialize, Serialize};

/// Allergens are always matched by id. Display names differ across locales and
/// synonyms ("peanut", "groundnut") so they never reach the safety filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllergenId(pub u32);

impl fmt::Display for AllergenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AllergenId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    pub id: AllergenId,
    pub name: String,
}
