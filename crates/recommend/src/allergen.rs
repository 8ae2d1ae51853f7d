//! Allergen name resolution.
//!
//! The safety filter only compares ids. Profiles or imports that carry
//! allergen names go through [`resolve_allergen_names`] first.

use std::collections::HashMap;

use serde::Serialize;

use mealpick_shared::recipe::AllergenId;

use crate::repository::AllergyRepository;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllergenResolution {
    pub ids: Vec<AllergenId>,
    /// Normalised names with no matching allergen.
    pub unresolved: Vec<String>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Maps display names to allergen ids with one repository query.
///
/// Names are trimmed and case-folded; blanks and duplicates are dropped.
/// Unknown names are returned in `unresolved`, never silently ignored.
pub async fn resolve_allergen_names<R: AllergyRepository + ?Sized>(
    repository: &R,
    names: &[String],
) -> anyhow::Result<AllergenResolution> {
    let mut wanted: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|name| normalize(name)) {
        if !name.is_empty() && !wanted.contains(&name) {
            wanted.push(name);
        }
    }

    if wanted.is_empty() {
        return Ok(AllergenResolution::default());
    }

    let known: HashMap<String, AllergenId> = repository
        .find_allergens_by_names(&wanted)
        .await?
        .into_iter()
        .map(|allergen| (normalize(&allergen.name), allergen.id))
        .collect();

    let mut resolution = AllergenResolution::default();
    for name in wanted {
        match known.get(&name) {
            Some(id) => resolution.ids.push(*id),
            None => resolution.unresolved.push(name),
        }
    }

    if !resolution.unresolved.is_empty() {
        tracing::warn!(
            unresolved = ?resolution.unresolved,
            "allergen names without a matching allergen"
        );
    }

    Ok(resolution)
}
