//! ONNX ranking model used by the learned ranker.
//!
//! The offline trainer exports its gradient-boosted ranker to ONNX. A model
//! directory holds two artifacts:
//! - `ranker_model.onnx`: the exported graph, one `[batch, n_features]` float input
//! - `feature_metadata.json`: the ordered feature names the model was fit on
//!
//! Inference runs through tract and is a pure function of the artifact and
//! the input rows.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tract_onnx::prelude::*;

pub const MODEL_FILE: &str = "ranker_model.onnx";
pub const METADATA_FILE: &str = "feature_metadata.json";
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while persisting, loading or evaluating a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("Feature list mismatch: {0}")]
    FeatureMismatch(String),

    #[error("Expected {expected} features, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("ONNX inference failed: {0}")]
    Inference(String),

    #[error("Model produced a non-finite value")]
    NonFinite,
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Companion metadata recorded next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Loaded, optimized ONNX graph plus the bytes it was built from.
///
/// Read-only after construction; clones share the plan.
#[derive(Clone)]
pub struct RankingModel {
    plan: Arc<OnnxPlan>,
    bytes: Arc<[u8]>,
    metadata: ModelMetadata,
}

impl fmt::Debug for RankingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingModel")
            .field("bytes", &self.bytes.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl RankingModel {
    /// Build a model from raw ONNX bytes and its metadata
    pub fn from_bytes(bytes: Vec<u8>, metadata: ModelMetadata) -> Result<Self, ModelError> {
        if metadata.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: metadata.format_version,
            });
        }
        if metadata.feature_names.is_empty() {
            return Err(ModelError::FeatureMismatch("metadata lists no features".to_string()));
        }

        let plan = tract_onnx::onnx()
            .model_for_read(&mut bytes.as_slice())
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelError::InvalidModel(e.to_string()))?;

        Ok(Self {
            plan: Arc::new(plan),
            bytes: bytes.into(),
            metadata,
        })
    }

    /// Read both artifacts from `model_dir`
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, ModelError> {
        let dir = model_dir.as_ref();
        let model_path = dir.join(MODEL_FILE);
        let metadata_path = dir.join(METADATA_FILE);

        for path in [&model_path, &metadata_path] {
            if !path.exists() {
                return Err(ModelError::NotFound(path.clone()));
            }
        }

        let metadata: ModelMetadata = serde_json::from_slice(&std::fs::read(&metadata_path)?)?;
        let model = Self::from_bytes(std::fs::read(&model_path)?, metadata)?;

        debug!(
            "Loaded ranking model from {} ({} features)",
            dir.display(),
            model.n_features()
        );
        Ok(model)
    }

    /// Write the ONNX graph and its metadata into `model_dir`
    pub fn save<P: AsRef<Path>>(&self, model_dir: P) -> Result<(), ModelError> {
        let dir = model_dir.as_ref();
        std::fs::create_dir_all(dir)?;

        std::fs::write(dir.join(MODEL_FILE), &self.bytes)?;
        std::fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&self.metadata)?)?;

        info!("Saved ranking model to {}", dir.display());
        Ok(())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn n_features(&self) -> usize {
        self.metadata.feature_names.len()
    }

    /// Predict one score per row of a `[batch, n_features]` matrix
    pub fn predict(&self, features: &Array2<f32>) -> Result<Array1<f64>, ModelError> {
        let (batch_size, width) = features.dim();
        if width != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                found: width,
            });
        }
        if batch_size == 0 {
            return Ok(Array1::zeros(0));
        }

        let input = tract_ndarray::Array2::from_shape_fn((batch_size, width), |(i, j)| features[[i, j]]);
        let output = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let scores = output
            .first()
            .ok_or_else(|| ModelError::Inference("model produced no output".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(format!("output extraction failed: {}", e)))?
            .iter()
            .map(|v| f64::from(*v))
            .collect::<Array1<f64>>();

        if scores.len() != batch_size {
            return Err(ModelError::DimensionMismatch {
                expected: batch_size,
                found: scores.len(),
            });
        }
        if scores.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        Ok(scores)
    }
}

#[cfg(test)]
pub(crate) fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ranker")
}
