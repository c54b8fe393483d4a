// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Category, DimensionScores, LocationType, PercentileBand, Program, ProgramIndex,
    Recommendation, ScoringWeights, SizeCategory, StudentProfile, University, UniversityType,
};
pub use requests::GenerateRecommendationsRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendationListResponse};
