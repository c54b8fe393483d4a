use crate::models::{Category, DimensionScores, University};

/// A university after scoring and categorization
#[derive(Debug, Clone)]
pub struct ScoredUniversity<'a> {
    pub university: &'a University,
    pub total_score: f64,
    pub category: Category,
    pub scores: DimensionScores,
}

/// How many universities to take from each category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionTargets {
    pub safety: usize,
    pub matches: usize,
    pub reach: usize,
}

impl SelectionTargets {
    pub fn total(&self) -> usize {
        self.safety + self.matches + self.reach
    }
}

/// Targets for `k` results given the population of each category.
///
/// Aims for 40% Safety, 40% Match, 20% Reach (floored), each capped by its
/// population. Any shortfall goes to Safety first, then Match. Reach is
/// never backfilled.
pub fn selection_targets(k: usize, safety: usize, matches: usize, reach: usize) -> SelectionTargets {
    // floor(2k / 5) without overflowing for very large k
    let forty_percent = k / 5 * 2 + (k % 5) * 2 / 5;
    let mut targets = SelectionTargets {
        safety: forty_percent.min(safety),
        matches: forty_percent.min(matches),
        reach: (k / 5).min(reach),
    };

    let remaining = k.saturating_sub(targets.total());
    if remaining > 0 && safety > targets.safety {
        targets.safety += remaining.min(safety - targets.safety);
    }

    let remaining = k.saturating_sub(targets.total());
    if remaining > 0 && matches > targets.matches {
        targets.matches += remaining.min(matches - targets.matches);
    }

    targets
}

fn sort_by_score(bucket: &mut [ScoredUniversity<'_>]) {
    bucket.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.university.id.cmp(&b.university.id))
    });
}

/// Pick at most `k` universities with a diversified category mix.
///
/// Output is grouped Safety, then Match, then Reach; each block is ordered
/// by descending total score.
pub fn select_diverse(candidates: Vec<ScoredUniversity<'_>>, k: usize) -> Vec<ScoredUniversity<'_>> {
    let mut safety = Vec::new();
    let mut matches = Vec::new();
    let mut reach = Vec::new();

    for candidate in candidates {
        match candidate.category {
            Category::Safety => safety.push(candidate),
            Category::Match => matches.push(candidate),
            Category::Reach => reach.push(candidate),
        }
    }

    for bucket in [&mut safety, &mut matches, &mut reach] {
        sort_by_score(bucket);
    }

    let targets = selection_targets(k, safety.len(), matches.len(), reach.len());
    tracing::debug!(
        "Selection targets for k={}: safety={} match={} reach={}",
        k,
        targets.safety,
        targets.matches,
        targets.reach
    );

    safety.truncate(targets.safety);
    matches.truncate(targets.matches);
    reach.truncate(targets.reach);

    let mut selected = Vec::with_capacity(targets.total());
    selected.append(&mut safety);
    selected.append(&mut matches);
    selected.append(&mut reach);
    selected
}
