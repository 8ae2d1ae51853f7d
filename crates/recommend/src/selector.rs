use std::cmp::Ordering;

use mealpick_shared::recipe::Recipe;
use rand::seq::IndexedRandom;
use rayon::prelude::*;
use serde::Serialize;

use crate::context::ScoringContext;
use crate::monitor::{Degradation, DegradationMonitor};
use crate::preference::PreferenceSnapshot;
use crate::scoring::{RecipeScore, Scorer, score_or_neutral};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Single safe candidate, returned without scoring.
    Only,
    /// Best (or among the best) scored candidates.
    Ranked,
    /// Every candidate failed to score, picked at random.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub recipe_id: String,
    pub source: SelectionSource,
    /// Absent for [`SelectionSource::Only`] and [`SelectionSource::Fallback`].
    pub score: Option<RecipeScore>,
}

impl Selection {
    fn only(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id.to_owned(),
            source: SelectionSource::Only,
            score: None,
        }
    }

    fn fallback(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id.to_owned(),
            source: SelectionSource::Fallback,
            score: None,
        }
    }
}

/// Picks recipes among candidates that already passed the safety filter.
///
/// Candidates are scored in parallel, one scorer call each. Ties on the total
/// keep the earlier candidate. Neutral fallback scores rank after every
/// successfully scored candidate.
pub struct Selector<'a> {
    scorer: &'a dyn Scorer,
    monitor: &'a DegradationMonitor,
}

impl<'a> Selector<'a> {
    pub fn new(scorer: &'a dyn Scorer, monitor: &'a DegradationMonitor) -> Self {
        Self { scorer, monitor }
    }

    pub fn select_best(
        &self,
        candidates: &[Recipe],
        context: &ScoringContext,
        snapshot: &PreferenceSnapshot,
    ) -> Option<Selection> {
        self.select_top(candidates, context, snapshot, 1)
            .into_iter()
            .next()
    }

    /// Up to `n` selections, best first.
    pub fn select_top(
        &self,
        candidates: &[Recipe],
        context: &ScoringContext,
        snapshot: &PreferenceSnapshot,
        n: usize,
    ) -> Vec<Selection> {
        if n == 0 || candidates.is_empty() {
            return vec![];
        }

        if let [recipe] = candidates {
            tracing::debug!(recipe_id = %recipe.id, "single safe candidate, skipping scoring");
            return vec![Selection::only(recipe)];
        }

        let scores = self.score_all(candidates, context, snapshot);

        if scores.iter().all(|score| score.is_fallback) {
            self.monitor.record(Degradation::FallbackSelection);

            let mut rng = rand::rng();
            return candidates
                .choose_multiple(&mut rng, n)
                .map(Selection::fallback)
                .collect();
        }

        let mut ranked: Vec<RecipeScore> = scores;
        ranked.sort_by(compare_ranked);

        ranked
            .into_iter()
            .take(n)
            .map(|score| Selection {
                recipe_id: score.recipe_id.to_owned(),
                source: SelectionSource::Ranked,
                score: Some(score),
            })
            .collect()
    }

    /// Scores every candidate, in input order.
    pub fn score_all(
        &self,
        candidates: &[Recipe],
        context: &ScoringContext,
        snapshot: &PreferenceSnapshot,
    ) -> Vec<RecipeScore> {
        candidates
            .par_iter()
            .map(|recipe| score_or_neutral(self.scorer, recipe, context, snapshot, self.monitor))
            .collect()
    }
}

/// Real scores first, then by total descending. `sort_by` is stable so equal
/// totals keep input order.
fn compare_ranked(a: &RecipeScore, b: &RecipeScore) -> Ordering {
    a.is_fallback
        .cmp(&b.is_fallback)
        .then_with(|| b.total.total_cmp(&a.total))
}
