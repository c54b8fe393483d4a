use crate::models::{Program, StudentProfile, University};

/// How well a university's programs cover the student's interests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFit {
    /// Intended major appears in a program name
    Exact,
    /// Field of study appears in a program's field
    Field,
    /// One of the alternative majors appears in a program name
    Alternative,
    /// Programs exist but none match
    NoMatch,
    /// University lists no programs
    NoPrograms,
    /// Student gave no intended major
    Unspecified,
}

#[inline]
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Classify program coverage, checking exact, field, then alternative matches
pub fn program_fit(student: &StudentProfile, programs: &[Program]) -> ProgramFit {
    let Some(major) = student.major() else {
        return ProgramFit::Unspecified;
    };

    if programs.is_empty() {
        return ProgramFit::NoPrograms;
    }

    if programs.iter().any(|p| contains_ci(&p.name, major)) {
        return ProgramFit::Exact;
    }

    if let Some(field) = student.field_of_study.as_deref().filter(|f| !f.trim().is_empty()) {
        let field = field.trim();
        if programs
            .iter()
            .any(|p| p.field.as_deref().is_some_and(|pf| contains_ci(pf, field)))
        {
            return ProgramFit::Field;
        }
    }

    let alternative_hit = student
        .alternative_majors
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .any(|alt| programs.iter().any(|p| contains_ci(&p.name, alt)));

    if alternative_hit {
        ProgramFit::Alternative
    } else {
        ProgramFit::NoMatch
    }
}

/// `None` when the student has no state preference or the university no state
#[inline]
pub fn state_match(student: &StudentProfile, university: &University) -> Option<bool> {
    let state = university.state.as_ref()?;
    if student.preferred_states.is_empty() {
        return None;
    }
    Some(student.preferred_states.contains(state))
}

#[inline]
pub fn country_match(student: &StudentProfile, university: &University) -> Option<bool> {
    let country = university.country.as_ref()?;
    if student.preferred_countries.is_empty() {
        return None;
    }
    Some(student.preferred_countries.contains(country))
}

#[inline]
pub fn location_type_match(student: &StudentProfile, university: &University) -> Option<bool> {
    let wanted = student.location_type_preference?;
    let actual = university.location_type?;
    Some(wanted == actual)
}

#[inline]
pub fn university_type_match(student: &StudentProfile, university: &University) -> Option<bool> {
    let wanted = student.preferred_university_type?;
    let actual = university.university_type?;
    Some(wanted == actual)
}

#[inline]
pub fn size_match(student: &StudentProfile, university: &University) -> Option<bool> {
    let wanted = student.preferred_size?;
    let actual = university.size_category()?;
    Some(wanted == actual)
}

/// Keep only universities in the student's preferred countries.
///
/// A student without country preferences keeps the whole catalog.
pub fn retain_preferred_countries<'a>(
    student: &StudentProfile,
    universities: Vec<&'a University>,
) -> Vec<&'a University> {
    if student.preferred_countries.is_empty() {
        return universities;
    }

    universities
        .into_iter()
        .filter(|u| {
            u.country
                .as_ref()
                .is_some_and(|c| student.preferred_countries.contains(c))
        })
        .collect()
}
