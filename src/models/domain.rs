use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use validator::{Validate, ValidationError};

/// Returns the value only when it carries information (`Some(v)` with `v > 0`).
#[inline]
pub(crate) fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// Student profile as supplied by the profile store.
///
/// An empty `id` passes validation; the engine reports it as a missing identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_class_rank"))]
pub struct StudentProfile {
    pub id: String,
    #[validate(range(min = 0.0, max = 4.0))]
    #[serde(default)]
    pub gpa: Option<f64>,
    #[validate(range(min = 0.0, max = 1600.0))]
    #[serde(default)]
    pub sat_total: Option<f64>,
    #[validate(range(min = 0.0, max = 800.0))]
    #[serde(default)]
    pub sat_math: Option<f64>,
    #[validate(range(min = 0.0, max = 800.0))]
    #[serde(default)]
    pub sat_ebrw: Option<f64>,
    #[validate(range(min = 0.0, max = 36.0))]
    #[serde(default)]
    pub act_composite: Option<f64>,
    #[serde(default)]
    pub class_rank: Option<u32>,
    #[serde(default)]
    pub class_size: Option<u32>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub max_budget_per_year: Option<f64>,
    #[serde(default)]
    pub need_financial_aid: bool,
    #[serde(default)]
    pub career_focused: bool,
    #[serde(default)]
    pub research_opportunities: bool,
    #[serde(default)]
    pub interested_in_sports: bool,
    #[serde(default)]
    pub preferred_states: Vec<String>,
    #[serde(default)]
    pub preferred_countries: Vec<String>,
    #[serde(default)]
    pub location_type_preference: Option<LocationType>,
    #[serde(default)]
    pub preferred_university_type: Option<UniversityType>,
    #[serde(default)]
    pub preferred_size: Option<SizeCategory>,
    #[serde(default)]
    pub intended_major: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub alternative_majors: Vec<String>,
}

fn validate_class_rank(profile: &StudentProfile) -> Result<(), ValidationError> {
    match (profile.class_rank, profile.class_size) {
        (Some(rank), Some(size)) if size > 0 && rank > size => {
            Err(ValidationError::new("class_rank_exceeds_class_size"))
        }
        _ => Ok(()),
    }
}

impl StudentProfile {
    /// SAT total, derived from the section scores when only those are known
    pub fn effective_sat_total(&self) -> Option<f64> {
        present(self.sat_total).or_else(|| {
            match (present(self.sat_math), present(self.sat_ebrw)) {
                (Some(math), Some(ebrw)) => Some(math + ebrw),
                _ => None,
            }
        })
    }

    /// Share of the class ranked below the student, in [0, 1]
    pub fn class_percentile(&self) -> Option<f64> {
        match (self.class_rank, self.class_size) {
            (Some(rank), Some(size)) if rank > 0 && size > 0 => {
                let size = size as f64;
                Some(((size - rank as f64) / size).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }

    /// Intended major, ignoring blank input
    pub fn major(&self) -> Option<&str> {
        self.intended_major
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// University record from the catalog store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct University {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub acceptance_rate: Option<f64>,
    #[serde(default)]
    pub gpa_average: Option<f64>,
    #[serde(default)]
    pub sat_math_25th: Option<f64>,
    #[serde(default)]
    pub sat_math_75th: Option<f64>,
    #[serde(default)]
    pub sat_ebrw_25th: Option<f64>,
    #[serde(default)]
    pub sat_ebrw_75th: Option<f64>,
    #[serde(default)]
    pub act_composite_25th: Option<f64>,
    #[serde(default)]
    pub act_composite_75th: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub tuition_out_state: Option<f64>,
    #[serde(default)]
    pub graduation_rate_4year: Option<f64>,
    #[serde(default)]
    pub median_earnings_10year: Option<f64>,
    #[serde(default)]
    pub global_rank: Option<u32>,
    #[serde(default)]
    pub total_students: Option<u32>,
    #[serde(default)]
    pub university_type: Option<UniversityType>,
    #[serde(default)]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// 25th/75th percentile band of an admitted class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBand {
    pub p25: f64,
    pub p75: f64,
}

impl PercentileBand {
    /// Position of `score` inside the band; `None` when the band has no width
    pub fn position(&self, score: f64) -> Option<f64> {
        let width = self.p75 - self.p25;
        if width > 0.0 {
            Some((score - self.p25) / width)
        } else {
            None
        }
    }
}

impl University {
    /// Combined SAT band. Requires both 25th section scores and a positive 75th total.
    pub fn sat_band(&self) -> Option<PercentileBand> {
        let math_25 = present(self.sat_math_25th)?;
        let ebrw_25 = present(self.sat_ebrw_25th)?;
        let p75 = self.sat_math_75th.unwrap_or(0.0) + self.sat_ebrw_75th.unwrap_or(0.0);
        (p75 > 0.0).then_some(PercentileBand {
            p25: math_25 + ebrw_25,
            p75,
        })
    }

    /// SAT 75th total, zero when unknown
    pub fn sat_75th_total(&self) -> f64 {
        self.sat_math_75th.unwrap_or(0.0) + self.sat_ebrw_75th.unwrap_or(0.0)
    }

    pub fn act_band(&self) -> Option<PercentileBand> {
        let p25 = present(self.act_composite_25th)?;
        let p75 = present(self.act_composite_75th)?;
        Some(PercentileBand { p25, p75 })
    }

    /// Cost used by the feature vector: total cost, else out-of-state tuition
    pub fn effective_cost(&self) -> Option<f64> {
        present(self.total_cost).or_else(|| present(self.tuition_out_state))
    }

    pub fn size_category(&self) -> Option<SizeCategory> {
        self.total_students
            .filter(|n| *n > 0)
            .map(SizeCategory::from_enrollment)
    }
}

/// Academic program offered by a university
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub id: Option<String>,
    pub university_id: String,
    pub name: String,
    #[serde(default)]
    pub field: Option<String>,
}

/// Programs grouped by university id, built once per run
#[derive(Debug, Clone, Default)]
pub struct ProgramIndex {
    by_university: HashMap<String, Vec<Program>>,
}

impl ProgramIndex {
    pub fn build<I>(programs: I) -> Self
    where
        I: IntoIterator<Item = Program>,
    {
        let mut by_university: HashMap<String, Vec<Program>> = HashMap::new();
        for program in programs {
            if program.university_id.is_empty() {
                continue;
            }
            by_university
                .entry(program.university_id.clone())
                .or_default()
                .push(program);
        }
        Self { by_university }
    }

    pub fn programs_for(&self, university_id: &str) -> &[Program] {
        self.by_university
            .get(university_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of universities with at least one program
    pub fn university_count(&self) -> usize {
        self.by_university.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Safety,
    Match,
    Reach,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Safety => "Safety",
            Category::Match => "Match",
            Category::Reach => "Reach",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    Urban,
    Suburban,
    Rural,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniversityType {
    Public,
    Private,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
}

impl SizeCategory {
    /// Small < 5000, Medium 5000..=15000, Large > 15000 students
    pub fn from_enrollment(total_students: u32) -> Self {
        if total_students < 5_000 {
            SizeCategory::Small
        } else if total_students <= 15_000 {
            SizeCategory::Medium
        } else {
            SizeCategory::Large
        }
    }
}

/// Per-dimension fit scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub academic: f64,
    pub financial: f64,
    pub program: f64,
    pub location: f64,
    pub characteristics: f64,
}

impl DimensionScores {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.academic,
            self.financial,
            self.program,
            self.location,
            self.characteristics,
        ]
    }
}

/// Scoring weights for the five dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub academic: f64,
    pub financial: f64,
    pub program: f64,
    pub location: f64,
    pub characteristics: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            academic: 0.30,
            financial: 0.25,
            program: 0.20,
            location: 0.15,
            characteristics: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            academic: values[0],
            financial: values[1],
            program: values[2],
            location: values[3],
            characteristics: values[4],
        }
    }
}

/// Final recommendation handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub student_id: String,
    pub university_id: String,
    pub university_name: String,
    pub match_score: f64,
    pub category: Category,
    pub academic_score: f64,
    pub financial_score: f64,
    pub program_score: f64,
    pub location_score: f64,
    pub characteristics_score: f64,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// Rounds to two decimals
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_category_boundaries() {
        assert_eq!(SizeCategory::from_enrollment(4_999), SizeCategory::Small);
        assert_eq!(SizeCategory::from_enrollment(5_000), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_enrollment(15_000), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_enrollment(15_001), SizeCategory::Large);
    }

    #[test]
    fn test_sat_band_requires_lower_sections() {
        let mut university = University {
            id: "u".to_string(),
            sat_math_25th: Some(600.0),
            sat_math_75th: Some(700.0),
            sat_ebrw_75th: Some(700.0),
            ..Default::default()
        };
        assert!(university.sat_band().is_none());

        university.sat_ebrw_25th = Some(600.0);
        let band = university.sat_band().unwrap();
        assert_eq!(band.p25, 1200.0);
        assert_eq!(band.p75, 1400.0);
        assert_eq!(band.position(1300.0), Some(0.5));
    }

    #[test]
    fn test_effective_sat_total_from_sections() {
        let student = StudentProfile {
            id: "s".to_string(),
            sat_math: Some(720.0),
            sat_ebrw: Some(680.0),
            ..Default::default()
        };
        assert_eq!(student.effective_sat_total(), Some(1400.0));
    }

    #[test]
    fn test_student_validation() {
        let valid = StudentProfile {
            id: "s1".to_string(),
            gpa: Some(4.0),
            max_budget_per_year: Some(0.0),
            class_rank: Some(30),
            class_size: Some(30),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());
        assert!(StudentProfile::default().validate().is_ok());

        let invalid = [
            StudentProfile { gpa: Some(4.2), ..valid.clone() },
            StudentProfile { act_composite: Some(40.0), ..valid.clone() },
            StudentProfile { max_budget_per_year: Some(-1.0), ..valid.clone() },
            StudentProfile { class_rank: Some(31), ..valid.clone() },
        ];
        for student in invalid {
            assert!(student.validate().is_err(), "{:?}", student);
        }
    }

    #[test]
    fn test_class_percentile() {
        let student = StudentProfile {
            id: "s".to_string(),
            class_rank: Some(5),
            class_size: Some(100),
            ..Default::default()
        };
        assert_eq!(student.class_percentile(), Some(0.95));
    }

    #[test]
    fn test_program_index_groups_by_university() {
        let index = ProgramIndex::build(vec![
            Program { id: None, university_id: "a".into(), name: "Biology".into(), field: None },
            Program { id: None, university_id: "a".into(), name: "Physics".into(), field: None },
            Program { id: None, university_id: "b".into(), name: "Law".into(), field: None },
        ]);
        assert_eq!(index.programs_for("a").len(), 2);
        assert_eq!(index.programs_for("b").len(), 1);
        assert!(index.programs_for("c").is_empty());
        assert_eq!(index.university_count(), 2);
    }

    #[test]
    fn test_unknown_enum_values_deserialize() {
        let university: University = serde_json::from_str(
            r#"{"id": "x", "university_type": "For-Profit", "location_type": "Urban"}"#,
        )
        .unwrap();
        assert_eq!(university.university_type, Some(UniversityType::Other));
        assert_eq!(university.location_type, Some(LocationType::Urban));
    }
}
