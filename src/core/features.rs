//! Numeric feature vectors for the learned ranker.
//!
//! Layout: 13 student values, 14 university values, 10 interaction values.
//! [`FEATURE_NAMES`] is the ordered contract a persisted model is checked
//! against when it is loaded.

use rayon::prelude::*;

use crate::core::filters::{
    country_match, location_type_match, program_fit, size_match, state_match,
    university_type_match, ProgramFit,
};
use crate::models::domain::present;
use crate::models::{
    LocationType, Program, ProgramIndex, StudentProfile, University, UniversityType,
};

pub const STUDENT_FEATURES: usize = 13;
pub const UNIVERSITY_FEATURES: usize = 14;
pub const INTERACTION_FEATURES: usize = 10;
pub const FEATURE_COUNT: usize = STUDENT_FEATURES + UNIVERSITY_FEATURES + INTERACTION_FEATURES;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "student_gpa_norm",
    "student_sat_total_norm",
    "student_sat_math_norm",
    "student_sat_ebrw_norm",
    "student_act_norm",
    "student_class_percentile",
    "student_budget_norm",
    "student_need_aid",
    "student_career_focused",
    "student_research",
    "student_sports",
    "student_state_prefs",
    "student_country_prefs",
    "univ_acceptance_rate",
    "univ_gpa_avg_norm",
    "univ_sat_75th_norm",
    "univ_act_75th_norm",
    "univ_cost_norm",
    "univ_grad_rate",
    "univ_earnings_norm",
    "univ_rank_norm",
    "univ_size_norm",
    "univ_type_private",
    "univ_type_public",
    "univ_loc_urban",
    "univ_loc_suburban",
    "univ_loc_rural",
    "fit_gpa_diff",
    "fit_gpa_above",
    "fit_sat_percentile",
    "fit_cost_ratio",
    "fit_affordable",
    "fit_location_match",
    "fit_location_type_match",
    "fit_univ_type_match",
    "fit_program_match",
    "fit_size_match",
];

const NEUTRAL: f64 = 0.5;

/// Ordered feature names as owned strings, as stored in model metadata
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
}

#[inline]
fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[inline]
fn indicator(value: Option<bool>) -> f64 {
    value.map(flag).unwrap_or(NEUTRAL)
}

pub fn student_features(student: &StudentProfile) -> [f64; STUDENT_FEATURES] {
    let budget = present(student.max_budget_per_year).unwrap_or(0.0);

    [
        present(student.gpa).unwrap_or(0.0) / 4.0,
        student.effective_sat_total().unwrap_or(0.0) / 1600.0,
        present(student.sat_math).unwrap_or(0.0) / 800.0,
        present(student.sat_ebrw).unwrap_or(0.0) / 800.0,
        present(student.act_composite).unwrap_or(0.0) / 36.0,
        student.class_percentile().unwrap_or(NEUTRAL),
        (budget / 100_000.0).min(1.0),
        flag(student.need_financial_aid),
        flag(student.career_focused),
        flag(student.research_opportunities),
        flag(student.interested_in_sports),
        student.preferred_states.len() as f64 / 10.0,
        student.preferred_countries.len() as f64 / 10.0,
    ]
}

pub fn university_features(university: &University) -> [f64; UNIVERSITY_FEATURES] {
    let cost = university.effective_cost().unwrap_or(0.0);
    let earnings = present(university.median_earnings_10year).unwrap_or(0.0);
    let rank = university.global_rank.filter(|r| *r > 0).unwrap_or(1_000) as f64;
    let students = university.total_students.filter(|n| *n > 0).unwrap_or(10_000) as f64;

    [
        university.acceptance_rate.unwrap_or(NEUTRAL),
        university.gpa_average.unwrap_or(3.0) / 4.0,
        university.sat_75th_total() / 1600.0,
        university.act_composite_75th.unwrap_or(0.0) / 36.0,
        (cost / 100_000.0).min(1.0),
        university.graduation_rate_4year.unwrap_or(0.7),
        (earnings / 150_000.0).min(1.0),
        1.0 - (rank / 1_000.0).min(1.0),
        (students / 50_000.0).min(1.0),
        flag(university.university_type == Some(UniversityType::Private)),
        flag(university.university_type == Some(UniversityType::Public)),
        flag(university.location_type == Some(LocationType::Urban)),
        flag(university.location_type == Some(LocationType::Suburban)),
        flag(university.location_type == Some(LocationType::Rural)),
    ]
}

/// Program coverage mapped onto [0, 1]
pub fn program_fit_feature(fit: ProgramFit) -> f64 {
    match fit {
        ProgramFit::Exact => 1.0,
        ProgramFit::Field => 0.7,
        ProgramFit::Alternative => 0.6,
        ProgramFit::NoMatch => 0.3,
        ProgramFit::NoPrograms | ProgramFit::Unspecified => NEUTRAL,
    }
}

pub fn interaction_features(
    student: &StudentProfile,
    university: &University,
    programs: &[Program],
) -> [f64; INTERACTION_FEATURES] {
    let (gpa_gap, gpa_above) = match (present(student.gpa), present(university.gpa_average)) {
        (Some(gpa), Some(average)) => {
            let gap = gpa - average;
            (gap / 4.0, flag(gap > 0.0))
        }
        _ => (0.0, NEUTRAL),
    };

    let sat_position = student
        .effective_sat_total()
        .zip(university.sat_band())
        .and_then(|(sat, band)| band.position(sat))
        .map(|p| p.clamp(0.0, 1.0))
        .unwrap_or(NEUTRAL);

    let (cost_ratio, affordable) =
        match (present(student.max_budget_per_year), present(university.total_cost)) {
            (Some(budget), Some(cost)) => {
                let ratio = cost / budget;
                (ratio.min(2.0) / 2.0, flag(ratio <= 1.0))
            }
            _ => (NEUTRAL, NEUTRAL),
        };

    let mut location = 0.0;
    if state_match(student, university) == Some(true) {
        location += 0.5;
    }
    if country_match(student, university) == Some(true) {
        location += 0.5;
    }

    [
        gpa_gap,
        gpa_above,
        sat_position,
        cost_ratio,
        affordable,
        location,
        indicator(location_type_match(student, university)),
        indicator(university_type_match(student, university)),
        program_fit_feature(program_fit(student, programs)),
        indicator(size_match(student, university)),
    ]
}

/// Full 37-value vector for one student/university pair
pub fn feature_vector(
    student: &StudentProfile,
    university: &University,
    programs: &[Program],
) -> Vec<f64> {
    assemble(&student_features(student), university, student, programs)
}

#[inline]
fn assemble(
    student_part: &[f64; STUDENT_FEATURES],
    university: &University,
    student: &StudentProfile,
    programs: &[Program],
) -> Vec<f64> {
    let mut features = Vec::with_capacity(FEATURE_COUNT);
    features.extend_from_slice(student_part);
    features.extend_from_slice(&university_features(university));
    features.extend_from_slice(&interaction_features(student, university, programs));
    features
}

/// One row per university. The student vector is computed once.
pub fn feature_matrix(
    student: &StudentProfile,
    universities: &[&University],
    programs: &ProgramIndex,
    parallel: bool,
) -> Vec<Vec<f64>> {
    let student_part = student_features(student);
    let row = |university: &&University| {
        assemble(
            &student_part,
            university,
            student,
            programs.programs_for(&university.id),
        )
    };

    if parallel {
        universities.par_iter().map(row).collect()
    } else {
        universities.iter().map(row).collect()
    }
}
