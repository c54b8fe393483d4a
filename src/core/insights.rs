use crate::models::domain::present;
use crate::models::{DimensionScores, University};

/// Human-readable strengths and concerns for one recommendation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// One statement per rule; a missing strength never becomes a concern
/// except for the academic and financial rules.
pub fn generate_insights(university: &University, scores: &DimensionScores) -> Insights {
    let mut insights = Insights::default();

    if scores.academic >= 80.0 {
        insights
            .strengths
            .push("Strong academic match - your credentials align well".to_string());
    } else if scores.academic < 50.0 {
        insights
            .concerns
            .push("Academics may be challenging - consider preparation".to_string());
    }

    if scores.financial >= 85.0 {
        insights
            .strengths
            .push("Excellent financial fit - within your budget".to_string());
    } else if scores.financial < 60.0 {
        insights
            .concerns
            .push("May exceed your budget - explore financial aid options".to_string());
    }

    if scores.program >= 90.0 {
        insights
            .strengths
            .push("Offers your intended major with strong programs".to_string());
    }

    if scores.location >= 80.0 {
        insights
            .strengths
            .push("Located in your preferred area".to_string());
    }

    if let Some(rate) = present(university.graduation_rate_4year).filter(|r| *r >= 0.8) {
        insights
            .strengths
            .push(format!("High graduation rate ({:.0}%)", rate * 100.0));
    }

    if let Some(earnings) = present(university.median_earnings_10year).filter(|e| *e >= 60_000.0) {
        insights.strengths.push(format!(
            "Strong career outcomes (${} median earnings)",
            format_thousands(earnings.round() as u64)
        ));
    }

    insights
}

/// 1234567 -> "1,234,567"
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(academic: f64, financial: f64, program: f64, location: f64) -> DimensionScores {
        DimensionScores {
            academic,
            financial,
            program,
            location,
            characteristics: 70.0,
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(60_000), "60,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_all_strengths() {
        let university = University {
            graduation_rate_4year: Some(0.85),
            median_earnings_10year: Some(72_500.0),
            ..Default::default()
        };
        let insights = generate_insights(&university, &scores(90.0, 95.0, 95.0, 90.0));

        assert_eq!(insights.strengths.len(), 6);
        assert!(insights.concerns.is_empty());
        assert!(insights.strengths.contains(&"High graduation rate (85%)".to_string()));
        assert!(insights
            .strengths
            .contains(&"Strong career outcomes ($72,500 median earnings)".to_string()));
    }

    #[test]
    fn test_concerns_only_for_academic_and_financial() {
        let insights = generate_insights(&University::default(), &scores(40.0, 25.0, 60.0, 40.0));
        assert!(insights.strengths.is_empty());
        assert_eq!(
            insights.concerns,
            vec![
                "Academics may be challenging - consider preparation".to_string(),
                "May exceed your budget - explore financial aid options".to_string(),
            ]
        );
    }

    #[test]
    fn test_middle_band_is_silent() {
        let insights = generate_insights(&University::default(), &scores(65.0, 70.0, 80.0, 70.0));
        assert_eq!(insights, Insights::default());
    }
}
