// Unit tests for unimatch

use unimatch::core::{
    categorize,
    features::{feature_vector, student_features, FEATURE_COUNT},
    scoring::{academic_score, calculate_dimension_scores, financial_score, program_score, weighted_total},
    selector::{select_diverse, selection_targets, ScoredUniversity},
};
use unimatch::models::{
    Category, DimensionScores, Program, ScoringWeights, StudentProfile, University,
};

fn create_student() -> StudentProfile {
    StudentProfile {
        id: "student_1".to_string(),
        ..Default::default()
    }
}

fn create_university(id: &str) -> University {
    University {
        id: id.to_string(),
        name: format!("University {}", id),
        ..Default::default()
    }
}

fn program(university_id: &str, name: &str) -> Program {
    Program {
        id: None,
        university_id: university_id.to_string(),
        name: name.to_string(),
        field: None,
    }
}

#[test]
fn test_category_boundaries() {
    assert_eq!(categorize(80.0), Category::Safety);
    assert_eq!(categorize(79.9), Category::Match);
    assert_eq!(categorize(60.0), Category::Match);
    assert_eq!(categorize(59.9), Category::Reach);
}

#[test]
fn test_gpa_only_academic_score() {
    let student = StudentProfile { gpa: Some(3.5), ..create_student() };
    let university = University { gpa_average: Some(3.0), ..create_university("u1") };
    assert_eq!(academic_score(&student, &university), 90.0);
}

#[test]
fn test_budget_headroom_financial_score() {
    let student = StudentProfile { max_budget_per_year: Some(50_000.0), ..create_student() };
    let university = University { total_cost: Some(38_000.0), ..create_university("u1") };
    assert_eq!(financial_score(&student, &university), 95.0);
}

#[test]
fn test_major_substring_program_score() {
    let student = StudentProfile {
        intended_major: Some("Computer Science".to_string()),
        ..create_student()
    };
    let programs = vec![program("u1", "Computer Science (BSc)")];
    assert_eq!(program_score(&student, &programs), 95.0);
}

#[test]
fn test_program_score_without_match() {
    let student = StudentProfile {
        intended_major: Some("Nursing".to_string()),
        ..create_student()
    };
    assert_eq!(program_score(&student, &[program("u1", "History")]), 60.0);
    assert_eq!(program_score(&student, &[]), 60.0);
    assert_eq!(program_score(&create_student(), &[program("u1", "History")]), 70.0);
}

#[test]
fn test_weighted_total_default_weights() {
    let scores = DimensionScores {
        academic: 90.0,
        financial: 85.0,
        program: 95.0,
        location: 90.0,
        characteristics: 70.0,
    };
    let total = weighted_total(&scores, &ScoringWeights::default());
    assert!((total - 87.75).abs() < 1e-9);
}

#[test]
fn test_sparse_profile_is_neutral() {
    let scores = calculate_dimension_scores(&create_student(), &create_university("u1"), &[]);
    assert_eq!(scores.as_array(), [70.0; 5]);
}

#[test]
fn test_feature_vector_length() {
    let student = StudentProfile { gpa: Some(3.2), ..create_student() };
    let university = create_university("u1");
    let features = feature_vector(&student, &university, &[]);
    assert_eq!(features.len(), FEATURE_COUNT);
    assert!(features.iter().all(|v| v.is_finite()));
}

#[test]
fn test_student_features_normalized() {
    let student = StudentProfile {
        gpa: Some(4.0),
        sat_total: Some(1600.0),
        max_budget_per_year: Some(250_000.0),
        ..create_student()
    };
    let features = student_features(&student);
    assert_eq!(features[0], 1.0);
    assert_eq!(features[1], 1.0);
    // budget is capped
    assert_eq!(features[6], 1.0);
}

#[test]
fn test_selector_redistributes_into_match() {
    let universities: Vec<University> = (0..22)
        .map(|i| create_university(&format!("u{:02}", i)))
        .collect();
    let scores = DimensionScores {
        academic: 70.0,
        financial: 70.0,
        program: 70.0,
        location: 70.0,
        characteristics: 70.0,
    };
    let candidates: Vec<ScoredUniversity<'_>> = universities
        .iter()
        .enumerate()
        .map(|(i, university)| ScoredUniversity {
            university,
            total_score: 50.0 + i as f64,
            category: match i {
                0..=1 => Category::Safety,
                2..=11 => Category::Match,
                _ => Category::Reach,
            },
            scores,
        })
        .collect();

    let targets = selection_targets(10, 2, 10, 10);
    assert_eq!((targets.safety, targets.matches, targets.reach), (2, 6, 2));

    let selected = select_diverse(candidates, 10);
    let count = |c: Category| selected.iter().filter(|s| s.category == c).count();
    assert_eq!(selected.len(), 10);
    assert_eq!(count(Category::Safety), 2);
    assert_eq!(count(Category::Match), 6);
    assert_eq!(count(Category::Reach), 2);

    // highest-scoring Match universities are taken
    let match_ids: Vec<_> = selected
        .iter()
        .filter(|s| s.category == Category::Match)
        .map(|s| s.university.id.as_str())
        .collect();
    assert_eq!(match_ids, vec!["u11", "u10", "u09", "u08", "u07", "u06"]);
}
