use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{
    category::categorize,
    filters::retain_preferred_countries,
    insights::generate_insights,
    ranker::{LearnedRanker, Ranker, RankingInput, RuleRanker, ScoringPath},
    scoring::calculate_dimension_scores,
    selector::{select_diverse, ScoredUniversity},
    weights::PersonalizedRanker,
};
use crate::models::domain::round2;
use crate::models::{
    DimensionScores, ProgramIndex, Recommendation, ScoringWeights, StudentProfile, University,
};

/// Default number of recommendations per run
pub const DEFAULT_MAX_RESULTS: usize = 15;

/// Errors that reach the caller. Model failures never do.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{record} record has no identity")]
    MissingIdentity { record: &'static str },
}

/// Result of a recommendation run
#[derive(Debug)]
pub struct MatchResult {
    pub recommendations: Vec<Recommendation>,
    pub total_candidates: usize,
    pub scoring_path: ScoringPath,
}

/// Run-level switches
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Drop universities outside the student's preferred countries before scoring
    pub strict_country_filter: bool,
    /// Score universities on the rayon pool; results are identical either way
    pub parallel: bool,
}

/// Recommendation engine - runs the scoring and selection pipeline
///
/// # Pipeline Stages
/// 1. Catalog deduplication and optional country pre-filter
/// 2. Rule-based dimension scoring
/// 3. Total score from the configured ranker (rule fallback on failure)
/// 4. Categorization and diversified top-K selection
/// 5. Insight generation
#[derive(Clone)]
pub struct Matcher {
    ranker: Arc<dyn Ranker>,
    weights: ScoringWeights,
    options: MatchOptions,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("scoring_path", &self.ranker.path())
            .field("weights", &self.weights)
            .field("options", &self.options)
            .finish()
    }
}

impl Matcher {
    /// Rule-based engine with fixed weights
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            ranker: Arc::new(RuleRanker),
            weights,
            options: MatchOptions::default(),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Engine backed by the model in `model_dir`, degrading to rule-based scoring.
    ///
    /// A missing or unreadable model is logged here, once; the returned engine
    /// then uses the rule ranker with the given fixed weights for every call.
    pub fn from_model_dir(model_dir: Option<&Path>, weights: ScoringWeights) -> Self {
        let matcher = Self::new(weights);

        let Some(dir) = model_dir else {
            info!("No model directory configured - using rule-based scoring");
            return matcher;
        };

        match LearnedRanker::load(dir) {
            Ok(ranker) => matcher.with_ranker(Arc::new(ranker)),
            Err(e) => {
                warn!(
                    "Learned ranker unavailable ({}): {}. Falling back to rule-based scoring",
                    dir.display(),
                    e
                );
                matcher
            }
        }
    }

    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    /// Swap the rule ranker for per-student weights from `weight_predictor.json`.
    ///
    /// A loaded learned ranker is kept. Without a readable weight file the
    /// engine stays on fixed weights.
    pub fn with_personalized_weights(self, model_dir: Option<&Path>) -> Self {
        if self.ranker.path() != ScoringPath::RuleBased {
            return self;
        }
        let Some(dir) = model_dir else {
            return self;
        };

        match PersonalizedRanker::load(dir) {
            Ok(ranker) => self.with_ranker(Arc::new(ranker)),
            Err(e) => {
                warn!(
                    "Personalized weights unavailable ({}): {}. Using fixed weights",
                    dir.display(),
                    e
                );
                self
            }
        }
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Path the engine was configured with; a single run may still fall back
    pub fn scoring_path(&self) -> ScoringPath {
        self.ranker.path()
    }

    /// Generate up to `max_results` recommendations for a student
    ///
    /// # Arguments
    /// * `student` - The student profile being matched
    /// * `universities` - The full, already-loaded catalog
    /// * `programs` - Programs indexed by university id
    /// * `max_results` - Maximum number of recommendations to return
    ///
    /// # Returns
    /// MatchResult with recommendations grouped Safety, Match, Reach
    pub fn recommend(
        &self,
        student: &StudentProfile,
        universities: &[University],
        programs: &ProgramIndex,
        max_results: usize,
    ) -> Result<MatchResult, MatchError> {
        if student.id.trim().is_empty() {
            return Err(MatchError::MissingIdentity { record: "student" });
        }
        if universities.iter().any(|u| u.id.trim().is_empty()) {
            return Err(MatchError::MissingIdentity { record: "university" });
        }

        let total_candidates = universities.len();
        if universities.is_empty() {
            warn!("Empty catalog - no recommendations for student {}", student.id);
            return Ok(MatchResult {
                recommendations: Vec::new(),
                total_candidates,
                scoring_path: self.ranker.path(),
            });
        }

        // Stage 1: one entry per university id, first occurrence wins
        let mut seen = HashSet::with_capacity(universities.len());
        let mut pool: Vec<&University> = universities
            .iter()
            .filter(|u| seen.insert(u.id.as_str()))
            .collect();
        if pool.len() < total_candidates {
            debug!("Dropped {} duplicate universities", total_candidates - pool.len());
        }

        if self.options.strict_country_filter {
            let before = pool.len();
            pool = retain_preferred_countries(student, pool);
            debug!("Country filter: {} -> {} universities", before, pool.len());
        }

        // Stage 2: dimension scores, independent per university
        let score_one = |university: &&University| {
            calculate_dimension_scores(student, university, programs.programs_for(&university.id))
        };
        let dimensions: Vec<DimensionScores> = if self.options.parallel {
            pool.par_iter().map(score_one).collect()
        } else {
            pool.iter().map(score_one).collect()
        };

        // Stage 3: totals
        let input = RankingInput {
            student,
            universities: &pool,
            programs,
            dimensions: &dimensions,
            weights: self.weights,
            parallel: self.options.parallel,
        };
        let (totals, scoring_path) = self.totals(&input);

        // Stage 4: categorize and select
        let scored: Vec<ScoredUniversity<'_>> = pool
            .iter()
            .zip(dimensions.iter().zip(totals))
            .map(|(university, (scores, total_score))| ScoredUniversity {
                university,
                total_score,
                category: categorize(scores.academic),
                scores: *scores,
            })
            .collect();

        let selected = select_diverse(scored, max_results);

        // Stage 5: insights
        let recommendations: Vec<Recommendation> = selected
            .into_iter()
            .map(|item| {
                let insights = generate_insights(item.university, &item.scores);
                Recommendation {
                    student_id: student.id.clone(),
                    university_id: item.university.id.clone(),
                    university_name: item.university.name.clone(),
                    match_score: round2(item.total_score),
                    category: item.category,
                    academic_score: round2(item.scores.academic),
                    financial_score: round2(item.scores.financial),
                    program_score: round2(item.scores.program),
                    location_score: round2(item.scores.location),
                    characteristics_score: round2(item.scores.characteristics),
                    strengths: insights.strengths,
                    concerns: insights.concerns,
                }
            })
            .collect();

        info!(
            "Generated {} recommendations for student {} from {} universities ({})",
            recommendations.len(),
            student.id,
            total_candidates,
            scoring_path
        );

        Ok(MatchResult {
            recommendations,
            total_candidates,
            scoring_path,
        })
    }

    /// Ranker totals, or rule totals for this call if the ranker fails
    fn totals(&self, input: &RankingInput<'_>) -> (Vec<f64>, ScoringPath) {
        match self.ranker.predict_batch(input) {
            Ok(scores) if scores.len() == input.universities.len() => (scores, self.ranker.path()),
            Ok(scores) => {
                warn!(
                    "Ranker returned {} scores for {} universities. Using rule-based scores for this run",
                    scores.len(),
                    input.universities.len()
                );
                (RuleRanker::totals(input), ScoringPath::RuleBased)
            }
            Err(e) => {
                warn!("Ranker failed: {}. Using rule-based scores for this run", e);
                (RuleRanker::totals(input), ScoringPath::RuleBased)
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
