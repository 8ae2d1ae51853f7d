use std::collections::HashSet;
use std::sync::Arc;

use mealpick_shared::mealplan::MealType;
use mealpick_shared::recipe::{AllergenId, Recipe};
use time::Date;

use crate::config::EngineConfig;
use crate::context::{Clock, ScoringContext, SystemClock};
use crate::error::RecommendError;
use crate::monitor::DegradationMonitor;
use crate::preference::{PreferenceLearner, PreferenceSnapshot};
use crate::repository::{AllergyRepository, MealHistoryRepository, RecipeFilters, RecipeRepository};
use crate::safety::filter_safe;
use crate::scoring::{Scorer, WeightedScorer};
use crate::selector::{Selection, Selector};

/// Where a request's candidates come from.
#[derive(Debug, Clone)]
pub enum CandidatePool {
    /// Caller already holds the candidate recipes.
    Provided(Vec<Recipe>),
    /// Query the recipe repository for the request's meal type.
    Query(RecipeFilters),
}

#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub user_id: String,
    pub meal_type: MealType,
    pub target_date: Date,
    pub pool: CandidatePool,
}

/// Everything a selection needs, gathered with one read per collaborator.
pub(crate) struct Prepared {
    pub candidates: Vec<Recipe>,
    pub context: ScoringContext,
    pub snapshot: PreferenceSnapshot,
}

/// Allergy-safe meal recommendation for one user and one meal slot.
///
/// Read-only: the engine never writes to any collaborator.
pub struct Recommender<R> {
    pub(crate) repository: R,
    pub(crate) scorer: Arc<dyn Scorer>,
    pub(crate) config: Arc<EngineConfig>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) monitor: Arc<DegradationMonitor>,
}

impl<R> Recommender<R>
where
    R: RecipeRepository + AllergyRepository + MealHistoryRepository,
{
    pub fn new(repository: R, config: EngineConfig) -> Result<Self, RecommendError> {
        config.validate()?;

        Ok(Self {
            repository,
            scorer: Arc::new(WeightedScorer::new(&config)),
            config: Arc::new(config),
            clock: Arc::new(SystemClock),
            monitor: Arc::new(DegradationMonitor::new()),
        })
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<DegradationMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn monitor(&self) -> &Arc<DegradationMonitor> {
        &self.monitor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Best safe recipe for the slot.
    ///
    /// Fails with [`RecommendError::NoSafeCandidates`] when every candidate
    /// contains one of the user's allergens. Never returns an unsafe recipe.
    #[tracing::instrument(skip_all, fields(user_id = %request.user_id, meal_type = %request.meal_type, target_date = %request.target_date))]
    pub async fn recommend(&self, request: RecommendRequest) -> Result<Selection, RecommendError> {
        let prepared = self.prepare(request).await?;
        let selector = Selector::new(self.scorer.as_ref(), &self.monitor);

        let selection = selector
            .select_best(&prepared.candidates, &prepared.context, &prepared.snapshot)
            .ok_or(RecommendError::NoCandidates)?;

        tracing::info!(
            recipe_id = %selection.recipe_id,
            source = ?selection.source,
            total = selection.score.as_ref().map(|s| s.total),
            "recipe recommended"
        );

        Ok(selection)
    }

    /// Up to `top_n` safe recipes, best first.
    #[tracing::instrument(skip_all, fields(user_id = %request.user_id, meal_type = %request.meal_type, top_n = top_n))]
    pub async fn recommend_ranked(
        &self,
        request: RecommendRequest,
        top_n: usize,
    ) -> Result<Vec<Selection>, RecommendError> {
        if top_n == 0 {
            return Ok(vec![]);
        }

        let prepared = self.prepare(request).await?;
        let selector = Selector::new(self.scorer.as_ref(), &self.monitor);

        let ranked = selector.select_top(
            &prepared.candidates,
            &prepared.context,
            &prepared.snapshot,
            top_n,
        );

        tracing::info!(returned = ranked.len(), "ranked recommendations built");

        Ok(ranked)
    }

    async fn prepare(&self, request: RecommendRequest) -> Result<Prepared, RecommendError> {
        let RecommendRequest {
            user_id,
            meal_type,
            target_date,
            pool,
        } = request;

        let candidates = match pool {
            CandidatePool::Provided(recipes) => recipes,
            CandidatePool::Query(filters) => self
                .repository
                .candidate_recipes(&meal_type, &filters)
                .await
                .map_err(RecommendError::CandidatesUnavailable)?,
        };

        if candidates.is_empty() {
            return Err(RecommendError::NoCandidates);
        }

        let allergens = self.user_allergens(&user_id).await?;
        let candidates = self.filter_candidates(candidates, &allergens)?;

        // A lone safe candidate is returned without scoring, so skip the history read.
        let snapshot = if candidates.len() > 1 {
            PreferenceLearner::new(&self.repository, &self.config.preference, &self.monitor)
                .build_snapshot(&user_id, target_date)
                .await
        } else {
            PreferenceSnapshot::empty()
        };

        let context = ScoringContext::build(self.clock.now(), target_date, meal_type, &self.config);

        Ok(Prepared {
            candidates,
            context,
            snapshot,
        })
    }

    /// The user's allergen ids. A failed read is fatal: without the profile
    /// nothing can be proven safe.
    pub(crate) async fn user_allergens(
        &self,
        user_id: &str,
    ) -> Result<HashSet<AllergenId>, RecommendError> {
        let ids = self
            .repository
            .user_allergen_ids(user_id)
            .await
            .map_err(|err| {
                tracing::error!(user_id = %user_id, err = %err, "failed to read allergy profile");
                RecommendError::AllergyProfileUnavailable(err)
            })?;

        Ok(ids.into_iter().collect())
    }

    pub(crate) fn filter_candidates(
        &self,
        candidates: Vec<Recipe>,
        allergens: &HashSet<AllergenId>,
    ) -> Result<Vec<Recipe>, RecommendError> {
        let total = candidates.len();
        let safe = filter_safe(candidates, allergens);
        let rejected = total - safe.len();

        self.monitor.record_rejections(rejected as u64);
        tracing::debug!(total = total, rejected = rejected, "candidates filtered for allergens");

        if safe.is_empty() {
            tracing::warn!(candidates = total, "no safe candidate recipe");
            return Err(RecommendError::NoSafeCandidates { candidates: total });
        }

        Ok(safe)
    }
}
