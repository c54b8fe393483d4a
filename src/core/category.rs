use crate::models::Category;

/// Academic score at or above which a university is a Safety
pub const SAFETY_THRESHOLD: f64 = 80.0;
/// Academic score at or above which a university is a Match
pub const MATCH_THRESHOLD: f64 = 60.0;

/// Category depends on the academic dimension only, never on the total score
#[inline]
pub fn categorize(academic_score: f64) -> Category {
    if academic_score >= SAFETY_THRESHOLD {
        Category::Safety
    } else if academic_score >= MATCH_THRESHOLD {
        Category::Match
    } else {
        Category::Reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(categorize(100.0), Category::Safety);
        assert_eq!(categorize(80.0), Category::Safety);
        assert_eq!(categorize(79.9), Category::Match);
        assert_eq!(categorize(60.0), Category::Match);
        assert_eq!(categorize(59.9), Category::Reach);
        assert_eq!(categorize(0.0), Category::Reach);
    }
}
