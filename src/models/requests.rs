use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::StudentProfile;

/// Request to generate recommendations for a student
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRecommendationsRequest {
    #[validate(nested)]
    pub student: StudentProfile,
    #[validate(range(min = 1, max = 100))]
    #[serde(alias = "max_results", rename = "maxResults")]
    pub max_results: Option<u16>,
}
