use crate::core::filters::{
    country_match, location_type_match, program_fit, size_match, state_match,
    university_type_match, ProgramFit,
};
use crate::models::domain::present;
use crate::models::{DimensionScores, PercentileBand, Program, ScoringWeights, StudentProfile, University};

/// Score used for any dimension that lacks the data to judge fit
pub const NEUTRAL_SCORE: f64 = 70.0;

/// Calculate all five dimension scores for a student/university pair
///
/// Scoring formula (default weights):
/// total = (
///     academic * 0.30 +          # GPA, SAT, ACT, class rank vs. admitted class
///     financial * 0.25 +         # budget minus total cost
///     program * 0.20 +           # intended major / field coverage
///     location * 0.15 +          # state, country, setting preferences
///     characteristics * 0.10     # public/private, campus size
/// )
pub fn calculate_dimension_scores(
    student: &StudentProfile,
    university: &University,
    programs: &[Program],
) -> DimensionScores {
    DimensionScores {
        academic: academic_score(student, university),
        financial: financial_score(student, university),
        program: program_score(student, programs),
        location: location_score(student, university),
        characteristics: characteristics_score(student, university),
    }
}

/// Weighted total, clamped to [0, 100]
#[inline]
pub fn weighted_total(scores: &DimensionScores, weights: &ScoringWeights) -> f64 {
    let total = scores.academic * weights.academic
        + scores.financial * weights.financial
        + scores.program * weights.program
        + scores.location * weights.location
        + scores.characteristics * weights.characteristics;

    total.clamp(0.0, 100.0)
}

/// Average of the academic signals that have data; neutral when none do
pub fn academic_score(student: &StudentProfile, university: &University) -> f64 {
    let signals = [
        gpa_signal(student, university),
        student
            .effective_sat_total()
            .zip(university.sat_band())
            .map(|(sat, band)| band_signal(sat, band)),
        present(student.act_composite)
            .zip(university.act_band())
            .map(|(act, band)| band_signal(act, band)),
        student.class_percentile().map(class_rank_signal),
    ];

    let (sum, count) = signals
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        NEUTRAL_SCORE
    } else {
        sum / count as f64
    }
}

#[inline]
fn gpa_signal(student: &StudentProfile, university: &University) -> Option<f64> {
    let gap = present(student.gpa)? - present(university.gpa_average)?;
    Some(if gap >= 0.3 {
        90.0
    } else if gap >= 0.0 {
        75.0
    } else if gap >= -0.3 {
        60.0
    } else {
        40.0
    })
}

/// At or above the 75th percentile scores 90, inside the band 60..80, below it 40
#[inline]
fn band_signal(score: f64, band: PercentileBand) -> f64 {
    if score >= band.p75 {
        90.0
    } else if score >= band.p25 {
        let pct = band.position(score).unwrap_or(0.0);
        60.0 + pct * 20.0
    } else {
        40.0
    }
}

#[inline]
fn class_rank_signal(percentile: f64) -> f64 {
    if percentile >= 0.9 {
        90.0
    } else if percentile >= 0.75 {
        75.0
    } else if percentile >= 0.5 {
        60.0
    } else {
        50.0
    }
}

/// Banded on how far the budget exceeds the total cost
pub fn financial_score(student: &StudentProfile, university: &University) -> f64 {
    let (Some(budget), Some(cost)) = (
        present(student.max_budget_per_year),
        present(university.total_cost),
    ) else {
        return NEUTRAL_SCORE;
    };

    let headroom = budget - cost;
    if headroom >= 10_000.0 {
        95.0
    } else if headroom >= 0.0 {
        85.0
    } else if headroom >= -10_000.0 {
        65.0
    } else if headroom >= -20_000.0 {
        45.0
    } else {
        25.0
    }
}

pub fn program_score(student: &StudentProfile, programs: &[Program]) -> f64 {
    match program_fit(student, programs) {
        ProgramFit::Exact => 95.0,
        ProgramFit::Field => 80.0,
        ProgramFit::Alternative | ProgramFit::NoMatch | ProgramFit::NoPrograms => 60.0,
        ProgramFit::Unspecified => NEUTRAL_SCORE,
    }
}

pub fn location_score(student: &StudentProfile, university: &University) -> f64 {
    let mut score = NEUTRAL_SCORE;

    match state_match(student, university) {
        Some(true) => score += 20.0,
        Some(false) => score -= 10.0,
        None => {}
    }

    match country_match(student, university) {
        Some(true) => score += 10.0,
        Some(false) => score -= 20.0,
        None => {}
    }

    if location_type_match(student, university) == Some(true) {
        score += 10.0;
    }

    score.clamp(0.0, 100.0)
}

pub fn characteristics_score(student: &StudentProfile, university: &University) -> f64 {
    let mut score = NEUTRAL_SCORE;

    if university_type_match(student, university) == Some(true) {
        score += 15.0;
    }

    if size_match(student, university) == Some(true) {
        score += 15.0;
    }

    score.clamp(0.0, 100.0)
}
