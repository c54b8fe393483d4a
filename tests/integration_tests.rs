// Integration tests for unimatch

use ndarray::Array2;
use std::path::PathBuf;
use std::sync::Arc;
use unimatch::core::features::{feature_matrix, feature_names, FEATURE_COUNT};
use unimatch::core::weights::SoftmaxWeightPredictor;
use unimatch::core::{LearnedRanker, MatchOptions, Matcher, RankingModel, ScoringPath};
use unimatch::models::{Category, Program, ProgramIndex, ScoringWeights, StudentProfile, University};
use unimatch::services::CatalogStore;

fn create_student() -> StudentProfile {
    StudentProfile {
        id: "student_e2e".to_string(),
        gpa: Some(3.8),
        sat_total: Some(1450.0),
        max_budget_per_year: Some(40_000.0),
        intended_major: Some("Biology".to_string()),
        preferred_states: vec!["CA".to_string()],
        ..Default::default()
    }
}

fn university_a() -> University {
    University {
        id: "univ_a".to_string(),
        name: "Pacific State University".to_string(),
        gpa_average: Some(3.2),
        sat_math_25th: Some(600.0),
        sat_math_75th: Some(700.0),
        sat_ebrw_25th: Some(600.0),
        sat_ebrw_75th: Some(700.0),
        total_cost: Some(35_000.0),
        state: Some("CA".to_string()),
        ..Default::default()
    }
}

fn university_b() -> University {
    University {
        id: "univ_b".to_string(),
        name: "Empire Institute".to_string(),
        gpa_average: Some(3.9),
        sat_math_25th: Some(725.0),
        sat_math_75th: Some(775.0),
        sat_ebrw_25th: Some(725.0),
        sat_ebrw_75th: Some(775.0),
        total_cost: Some(70_000.0),
        state: Some("NY".to_string()),
        ..Default::default()
    }
}

fn programs() -> ProgramIndex {
    ProgramIndex::build(vec![Program {
        id: Some("p1".to_string()),
        university_id: "univ_a".to_string(),
        name: "Biology".to_string(),
        field: Some("Life Sciences".to_string()),
    }])
}

fn filler_catalog(n: usize) -> Vec<University> {
    (0..n)
        .map(|i| University {
            id: format!("filler_{:03}", i),
            name: format!("Filler College {}", i),
            gpa_average: Some(3.0 + (i % 10) as f64 * 0.1),
            total_cost: Some(20_000.0 + (i % 20) as f64 * 2_500.0),
            state: Some(if i % 3 == 0 { "CA" } else { "TX" }.to_string()),
            graduation_rate_4year: Some(0.6 + (i % 4) as f64 * 0.1),
            ..Default::default()
        })
        .collect()
}

fn fixture_model_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ranker")
}

#[test]
fn test_integration_end_to_end_scenario() {
    let matcher = Matcher::with_default_weights();
    let universities = vec![university_a(), university_b()];

    let result = matcher
        .recommend(&create_student(), &universities, &programs(), 10)
        .unwrap();
    assert_eq!(result.recommendations.len(), 2);

    let a = result
        .recommendations
        .iter()
        .find(|r| r.university_id == "univ_a")
        .unwrap();
    assert_eq!(a.category, Category::Safety);
    assert!(a.match_score > 80.0);
    assert_eq!(a.match_score, 87.75);
    assert_eq!(a.program_score, 95.0);

    let b = result
        .recommendations
        .iter()
        .find(|r| r.university_id == "univ_b")
        .unwrap();
    assert_ne!(b.category, Category::Safety);
    assert!(b
        .concerns
        .iter()
        .any(|c| c.contains("budget")));

    // Safety block comes first
    assert_eq!(result.recommendations[0].university_id, "univ_a");
}

#[test]
fn test_integration_fallback_idempotence() {
    let mut universities = filler_catalog(60);
    universities.push(university_a());
    universities.push(university_b());
    let student = create_student();

    let explicit = Matcher::new(ScoringWeights::default())
        .recommend(&student, &universities, &programs(), 15)
        .unwrap();

    let no_model = Matcher::from_model_dir(None, ScoringWeights::default())
        .recommend(&student, &universities, &programs(), 15)
        .unwrap();

    let empty_dir = tempfile::tempdir().unwrap();
    let missing = Matcher::from_model_dir(Some(empty_dir.path()), ScoringWeights::default());
    assert_eq!(missing.scoring_path(), ScoringPath::RuleBased);
    let missing = missing.recommend(&student, &universities, &programs(), 15).unwrap();

    let corrupt_dir = tempfile::tempdir().unwrap();
    std::fs::write(corrupt_dir.path().join("ranker_model.onnx"), "not a graph").unwrap();
    std::fs::write(corrupt_dir.path().join("feature_metadata.json"), "{}").unwrap();
    let corrupt = Matcher::from_model_dir(Some(corrupt_dir.path()), ScoringWeights::default())
        .recommend(&student, &universities, &programs(), 15)
        .unwrap();

    // a weight file alone does not change the fallback scores
    let weights_only_dir = tempfile::tempdir().unwrap();
    let mut bias = vec![0.0; 5];
    bias[3] = 5.0;
    SoftmaxWeightPredictor::new(vec![vec![0.0; 13]; 5], bias)
        .unwrap()
        .save(weights_only_dir.path())
        .unwrap();
    let weights_only = Matcher::from_model_dir(Some(weights_only_dir.path()), ScoringWeights::default());
    assert_eq!(weights_only.scoring_path(), ScoringPath::RuleBased);
    let weights_only = weights_only.recommend(&student, &universities, &programs(), 15).unwrap();

    assert_eq!(explicit.recommendations, no_model.recommendations);
    assert_eq!(explicit.recommendations, missing.recommendations);
    assert_eq!(explicit.recommendations, corrupt.recommendations);
    assert_eq!(explicit.recommendations, weights_only.recommendations);
}

#[test]
fn test_integration_model_round_trip() {
    let model = RankingModel::load(fixture_model_dir()).unwrap();
    assert_eq!(model.metadata().feature_names, feature_names());

    let dir = tempfile::tempdir().unwrap();
    model.save(dir.path()).unwrap();
    let reloaded = RankingModel::load(dir.path()).unwrap();
    assert_eq!(reloaded.metadata(), model.metadata());

    let student = create_student();
    let universities = filler_catalog(25);
    let refs: Vec<&University> = universities.iter().collect();
    let rows = feature_matrix(&student, &refs, &ProgramIndex::default(), false);
    let features = Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i][j] as f32);

    let first = model.predict(&features).unwrap();
    let second = reloaded.predict(&features).unwrap();
    assert_eq!(first.len(), 25);
    for (a, b) in first.iter().zip(second.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn test_integration_learned_path() {
    let dir = fixture_model_dir();
    let matcher = Matcher::from_model_dir(Some(dir.as_path()), ScoringWeights::default());
    assert_eq!(matcher.scoring_path(), ScoringPath::Learned);

    let universities = filler_catalog(40);
    let result = matcher
        .recommend(&create_student(), &universities, &ProgramIndex::default(), 10)
        .unwrap();

    assert_eq!(result.scoring_path, ScoringPath::Learned);
    assert!(!result.recommendations.is_empty());
    assert!(result
        .recommendations
        .iter()
        .all(|r| (0.0..=100.0).contains(&r.match_score)));

    // identical inputs, identical outputs
    let again = matcher
        .recommend(&create_student(), &universities, &ProgramIndex::default(), 10)
        .unwrap();
    assert_eq!(result.recommendations, again.recommendations);
}

#[test]
fn test_integration_shared_ranker_across_threads() {
    let ranker = Arc::new(LearnedRanker::load(fixture_model_dir()).unwrap());
    let matcher = Arc::new(
        Matcher::with_default_weights()
            .with_ranker(ranker)
            .with_options(MatchOptions { strict_country_filter: false, parallel: true }),
    );
    let universities = Arc::new(filler_catalog(50));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            let universities = Arc::clone(&universities);
            std::thread::spawn(move || {
                matcher
                    .recommend(&create_student(), &universities, &ProgramIndex::default(), 10)
                    .unwrap()
                    .recommendations
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_integration_catalog_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let snapshot = serde_json::json!({
        "universities": [university_a(), university_b()],
        "programs": [{ "university_id": "univ_a", "name": "Biology" }],
    });
    std::fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

    let catalog = CatalogStore::load(&path).await.unwrap();
    let result = Matcher::default()
        .recommend(&create_student(), catalog.universities(), catalog.programs(), 5)
        .unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.recommendations[0].university_id, "univ_a");
}
