use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::features::{feature_matrix, FEATURE_COUNT, FEATURE_NAMES};
use crate::core::model::{ModelError, RankingModel};
use crate::core::scoring::weighted_total;
use crate::models::{DimensionScores, ProgramIndex, ScoringWeights, StudentProfile, University};

/// Which scoring path produced the total scores of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    Learned,
    Personalized,
    RuleBased,
}

impl fmt::Display for ScoringPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPath::Learned => f.write_str("learned"),
            ScoringPath::Personalized => f.write_str("personalized"),
            ScoringPath::RuleBased => f.write_str("rule_based"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("Inference failed: {0}")]
    Inference(#[from] ModelError),

    #[error("Ranker returned {found} scores for {expected} universities")]
    LengthMismatch { expected: usize, found: usize },
}

/// Everything a ranker may look at for one batch.
///
/// `dimensions[i]` belongs to `universities[i]`. `weights` are the configured
/// fixed weights, the ones the rule-based fallback uses.
pub struct RankingInput<'a> {
    pub student: &'a StudentProfile,
    pub universities: &'a [&'a University],
    pub programs: &'a ProgramIndex,
    pub dimensions: &'a [DimensionScores],
    pub weights: ScoringWeights,
    pub parallel: bool,
}

/// Produces one total score in [0, 100] per university
pub trait Ranker: Send + Sync {
    fn path(&self) -> ScoringPath;

    fn predict_batch(&self, input: &RankingInput<'_>) -> Result<Vec<f64>, RankerError>;
}

/// Weighted sum of the rule-based dimension scores
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleRanker;

impl RuleRanker {
    /// Infallible form used for fallback substitution
    pub fn totals(input: &RankingInput<'_>) -> Vec<f64> {
        input
            .dimensions
            .iter()
            .map(|scores| weighted_total(scores, &input.weights))
            .collect()
    }
}

impl Ranker for RuleRanker {
    fn path(&self) -> ScoringPath {
        ScoringPath::RuleBased
    }

    fn predict_batch(&self, input: &RankingInput<'_>) -> Result<Vec<f64>, RankerError> {
        Ok(Self::totals(input))
    }
}

/// Pre-trained ONNX regression model over the 37-value feature vector.
///
/// Read-only after construction, so one instance can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct LearnedRanker {
    model: RankingModel,
}

impl LearnedRanker {
    /// Wrap an in-memory model. Its width must match the feature extractor.
    pub fn from_model(model: RankingModel) -> Result<Self, ModelError> {
        if model.n_features() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                expected: FEATURE_COUNT,
                found: model.n_features(),
            });
        }
        Ok(Self { model })
    }

    /// Load artifacts from `model_dir` and check the recorded feature names
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, ModelError> {
        let model = RankingModel::load(model_dir.as_ref())?;
        let stored = &model.metadata().feature_names;

        if stored.len() != FEATURE_NAMES.len()
            || stored
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(stored, current)| stored != current)
        {
            return Err(ModelError::FeatureMismatch(format!(
                "model was trained on {} features that do not match the current {}-feature layout",
                stored.len(),
                FEATURE_COUNT
            )));
        }

        info!("Loaded learned ranker from {}", model_dir.as_ref().display());
        Self::from_model(model)
    }

    pub fn model(&self) -> &RankingModel {
        &self.model
    }
}

impl Ranker for LearnedRanker {
    fn path(&self) -> ScoringPath {
        ScoringPath::Learned
    }

    fn predict_batch(&self, input: &RankingInput<'_>) -> Result<Vec<f64>, RankerError> {
        let rows = feature_matrix(input.student, input.universities, input.programs, input.parallel);
        let features = Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i][j] as f32);
        let scores = self.model.predict(&features)?;

        if scores.len() != input.universities.len() {
            return Err(RankerError::LengthMismatch {
                expected: input.universities.len(),
                found: scores.len(),
            });
        }

        debug!("Learned ranker scored {} universities", scores.len());
        Ok(scores.iter().map(|s| s.clamp(0.0, 100.0)).collect())
    }
}
