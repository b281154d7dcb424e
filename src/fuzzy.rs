use similar::TextDiff;

/// Similarity in `[0.0, 1.0]` between two strings.
pub trait StringSimilarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Character-level sequence ratio, `2 * matches / (len(a) + len(b))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl StringSimilarity for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        f64::from(TextDiff::from_chars(a, b).ratio())
    }
}

/// Index of the candidate closest to `word`, if its similarity reaches `cutoff`.
/// Ties keep the earlier candidate.
pub fn closest_match(
    strategy: &dyn StringSimilarity,
    word: &str,
    candidates: &[String],
    cutoff: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = strategy.similarity(word, candidate);
        if score < cutoff {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}
