// Core algorithm exports
pub mod category;
pub mod features;
pub mod filters;
pub mod insights;
pub mod matcher;
pub mod model;
pub mod ranker;
pub mod scoring;
pub mod selector;
pub mod weights;

pub use category::categorize;
pub use features::{feature_vector, FEATURE_COUNT, FEATURE_NAMES};
pub use insights::{generate_insights, Insights};
pub use matcher::{MatchError, MatchOptions, MatchResult, Matcher, DEFAULT_MAX_RESULTS};
pub use model::{ModelError, RankingModel};
pub use ranker::{LearnedRanker, Ranker, RuleRanker, ScoringPath};
pub use scoring::{calculate_dimension_scores, weighted_total};
pub use selector::select_diverse;
pub use weights::{FixedWeights, PersonalizedRanker, SoftmaxWeightPredictor, WeightPredictor};
