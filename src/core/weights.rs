use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::features::{student_features, STUDENT_FEATURES};
use crate::core::model::ModelError;
use crate::core::ranker::{Ranker, RankerError, RankingInput, ScoringPath};
use crate::core::scoring::weighted_total;
use crate::models::{ScoringWeights, StudentProfile};

/// File name of the personalized weight model inside a model directory
pub const WEIGHT_MODEL_FILE: &str = "weight_predictor.json";

const DIMENSIONS: usize = 5;

/// Source of the dimension weights used for a student's rule-based total
pub trait WeightPredictor: Send + Sync + fmt::Debug {
    fn weights_for(&self, student: &StudentProfile) -> ScoringWeights;
}

/// The same weights for every student
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWeights(pub ScoringWeights);

impl WeightPredictor for FixedWeights {
    fn weights_for(&self, _student: &StudentProfile) -> ScoringWeights {
        self.0
    }
}

/// On-disk form: one row of student-feature coefficients per dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WeightArtifact {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Single linear layer over the student vector followed by softmax.
///
/// Produces five weights that sum to 1, in dimension order
/// academic, financial, program, location, characteristics.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxWeightPredictor {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl SoftmaxWeightPredictor {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, ModelError> {
        if weights.len() != DIMENSIONS || bias.len() != DIMENSIONS {
            return Err(ModelError::InvalidModel(format!(
                "weight predictor needs {} output rows, got {} rows and {} biases",
                DIMENSIONS,
                weights.len(),
                bias.len()
            )));
        }
        if let Some(row) = weights.iter().find(|r| r.len() != STUDENT_FEATURES) {
            return Err(ModelError::DimensionMismatch {
                expected: STUDENT_FEATURES,
                found: row.len(),
            });
        }
        if !weights.iter().flatten().chain(bias.iter()).all(|v| v.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        let flat: Vec<f64> = weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((DIMENSIONS, STUDENT_FEATURES), flat)
            .map_err(|e| ModelError::InvalidModel(e.to_string()))?;

        Ok(Self {
            weights,
            bias: Array1::from(bias),
        })
    }

    /// Load `weight_predictor.json` from a model directory
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, ModelError> {
        let path = model_dir.as_ref().join(WEIGHT_MODEL_FILE);
        if !path.exists() {
            return Err(ModelError::NotFound(path));
        }
        let artifact: WeightArtifact = serde_json::from_slice(&std::fs::read(&path)?)?;
        let predictor = Self::new(artifact.weights, artifact.bias)?;
        debug!("Loaded weight predictor from {}", path.display());
        Ok(predictor)
    }

    pub fn save<P: AsRef<Path>>(&self, model_dir: P) -> Result<(), ModelError> {
        std::fs::create_dir_all(model_dir.as_ref())?;
        let artifact = WeightArtifact {
            weights: self.weights.outer_iter().map(|row| row.to_vec()).collect(),
            bias: self.bias.to_vec(),
        };
        let path = model_dir.as_ref().join(WEIGHT_MODEL_FILE);
        std::fs::write(&path, serde_json::to_vec_pretty(&artifact)?)?;
        Ok(())
    }
}

impl WeightPredictor for SoftmaxWeightPredictor {
    fn weights_for(&self, student: &StudentProfile) -> ScoringWeights {
        let input = Array1::from(student_features(student).to_vec());
        let logits = self.weights.dot(&input) + &self.bias;

        let max = logits.fold(f64::NEG_INFINITY, |a, b| a.max(*b));
        let exp = logits.mapv(|l| (l - max).exp());
        let probs = &exp / exp.sum();

        ScoringWeights::from_array([probs[0], probs[1], probs[2], probs[3], probs[4]])
    }
}

/// Rule-based totals with per-student weights from a [`WeightPredictor`]
#[derive(Debug, Clone)]
pub struct PersonalizedRanker {
    predictor: Arc<dyn WeightPredictor>,
}

impl PersonalizedRanker {
    pub fn new(predictor: Arc<dyn WeightPredictor>) -> Self {
        Self { predictor }
    }

    /// Softmax predictor from `weight_predictor.json` in `model_dir`
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, ModelError> {
        let ranker = Self::new(Arc::new(SoftmaxWeightPredictor::load(model_dir.as_ref())?));
        info!("Loaded personalized weights from {}", model_dir.as_ref().display());
        Ok(ranker)
    }
}

impl Ranker for PersonalizedRanker {
    fn path(&self) -> ScoringPath {
        ScoringPath::Personalized
    }

    fn predict_batch(&self, input: &RankingInput<'_>) -> Result<Vec<f64>, RankerError> {
        let weights = self.predictor.weights_for(input.student);
        Ok(input
            .dimensions
            .iter()
            .map(|scores| weighted_total(scores, &weights))
            .collect())
    }
}
