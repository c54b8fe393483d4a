use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::{MatchOptions, DEFAULT_MAX_RESULTS};
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default)]
    pub strict_country_filter: bool,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            strict_country_filter: false,
            parallel: default_parallel(),
        }
    }
}

impl MatchingSettings {
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            strict_country_filter: self.strict_country_filter,
            parallel: self.parallel,
        }
    }
}

fn default_limit() -> u16 { DEFAULT_MAX_RESULTS as u16 }
fn default_max_limit() -> u16 { 100 }
fn default_parallel() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_academic_weight")]
    pub academic: f64,
    #[serde(default = "default_financial_weight")]
    pub financial: f64,
    #[serde(default = "default_program_weight")]
    pub program: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_characteristics_weight")]
    pub characteristics: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            academic: default_academic_weight(),
            financial: default_financial_weight(),
            program: default_program_weight(),
            location: default_location_weight(),
            characteristics: default_characteristics_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            academic: config.academic,
            financial: config.financial,
            program: config.program,
            location: config.location,
            characteristics: config.characteristics,
        }
    }
}

fn default_academic_weight() -> f64 { 0.30 }
fn default_financial_weight() -> f64 { 0.25 }
fn default_program_weight() -> f64 { 0.20 }
fn default_location_weight() -> f64 { 0.15 }
fn default_characteristics_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSettings {
    /// Directory holding ranker_model.onnx and feature_metadata.json.
    /// Unset means rule-based scoring only.
    pub dir: Option<PathBuf>,
    /// Without a learned ranker, score with per-student weights from
    /// weight_predictor.json instead of the fixed weights
    #[serde(default)]
    pub personalized_weights: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// JSON snapshot with `universities` and `programs`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl LoggingSettings {
    /// LOG_LEVEL / LOG_FORMAT override the configured values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            if !format.trim().is_empty() {
                self.format = format;
            }
        }
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with UNIMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., UNIMATCH__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("UNIMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the short-form deployment variables on top of the loaded config.
/// MODEL_DIR and CATALOG_PATH win over UNIMATCH__MODEL__DIR and UNIMATCH__CATALOG__PATH.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let model_dir = env::var("MODEL_DIR")
        .or_else(|_| env::var("UNIMATCH__MODEL__DIR"))
        .ok();
    let catalog_path = env::var("CATALOG_PATH")
        .or_else(|_| env::var("UNIMATCH__CATALOG__PATH"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(dir) = model_dir.filter(|d| !d.trim().is_empty()) {
        builder = builder.set_override("model.dir", dir)?;
    }
    if let Some(path) = catalog_path.filter(|p| !p.trim().is_empty()) {
        builder = builder.set_override("catalog.path", path)?;
    }

    builder.build()
}
