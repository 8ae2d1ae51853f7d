pub mod allergen;
pub mod config;
pub mod context;
pub mod error;
pub mod monitor;
pub mod plan;
pub mod preference;
pub mod repository;
pub mod safety;
pub mod scoring;
pub mod selector;
pub mod service;

pub use allergen::{AllergenResolution, resolve_allergen_names};
pub use config::{ConfigError, EngineConfig, ScoreWeights};
pub use context::{Clock, FixedClock, ScoringContext, SystemClock, local_date};
pub use error::RecommendError;
pub use monitor::{Degradation, DegradationMonitor, DegradationReport};
pub use plan::{PlanRequest, PlannedMeal};
pub use preference::{PreferenceLearner, PreferenceSnapshot};
pub use repository::{AllergyRepository, MealHistoryRepository, RecipeFilters, RecipeRepository};
pub use safety::{filter_safe, is_safe};
pub use scoring::{RecipeScore, ScoreError, Scorer, WeightedScorer};
pub use selector::{Selection, SelectionSource, Selector};
pub use service::{CandidatePool, RecommendRequest, Recommender};
