use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{MatchError, Matcher};
use crate::models::{
    ErrorResponse, GenerateRecommendationsRequest, HealthResponse, RecommendationListResponse,
};
use crate::services::CatalogStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
    pub catalog: Arc<CatalogStore>,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations/generate", web::post().to(generate_recommendations));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.catalog.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scoring_path: state.matcher.scoring_path(),
        catalog_size: state.catalog.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate recommendations endpoint
///
/// POST /api/v1/recommendations/generate
///
/// Request body:
/// ```json
/// {
///   "student": { "id": "string", "gpa": 3.7, ... },
///   "maxResults": 15
/// }
/// ```
async fn generate_recommendations(
    state: web::Data<AppState>,
    req: web::Json<GenerateRecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request = req.into_inner();
    let limit = request
        .max_results
        .map(usize::from)
        .unwrap_or(state.default_limit)
        .min(state.max_limit);

    tracing::info!(
        "Generating recommendations for student: {}, limit: {}",
        request.student.id,
        limit
    );

    let matcher = Arc::clone(&state.matcher);
    let catalog = Arc::clone(&state.catalog);
    let student = request.student;

    // Scoring is CPU-bound
    let outcome = web::block(move || {
        matcher.recommend(&student, catalog.universities(), catalog.programs(), limit)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => HttpResponse::Ok().json(RecommendationListResponse::grouped(
            result.recommendations,
            result.scoring_path,
            result.total_candidates,
        )),
        Ok(Err(e @ MatchError::MissingIdentity { .. })) => {
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: "Missing identity".to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
        Err(e) => {
            tracing::error!("Recommendation task failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to generate recommendations".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
