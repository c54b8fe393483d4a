use serde::{Deserialize, Serialize};
use crate::core::ScoringPath;
use crate::models::domain::{Category, Recommendation};

/// Recommendations grouped by category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationListResponse {
    #[serde(rename = "runId")]
    pub run_id: uuid::Uuid,
    pub total: usize,
    #[serde(rename = "safetySchools")]
    pub safety_schools: Vec<Recommendation>,
    #[serde(rename = "matchSchools")]
    pub match_schools: Vec<Recommendation>,
    #[serde(rename = "reachSchools")]
    pub reach_schools: Vec<Recommendation>,
    #[serde(rename = "scoringPath")]
    pub scoring_path: ScoringPath,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl RecommendationListResponse {
    pub fn grouped(
        recommendations: Vec<Recommendation>,
        scoring_path: ScoringPath,
        total_candidates: usize,
    ) -> Self {
        let total = recommendations.len();
        let mut safety_schools = Vec::new();
        let mut match_schools = Vec::new();
        let mut reach_schools = Vec::new();

        for recommendation in recommendations {
            match recommendation.category {
                Category::Safety => safety_schools.push(recommendation),
                Category::Match => match_schools.push(recommendation),
                Category::Reach => reach_schools.push(recommendation),
            }
        }

        Self {
            run_id: uuid::Uuid::new_v4(),
            total,
            safety_schools,
            match_schools,
            reach_schools,
            scoring_path,
            total_candidates,
            generated_at: chrono::Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "scoringPath")]
    pub scoring_path: ScoringPath,
    #[serde(rename = "catalogSize")]
    pub catalog_size: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
