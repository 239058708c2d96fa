use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Case-insensitive Jaro-Winkler similarity (0.0 = no match, 1.0 = identical).
pub fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
}

/// The candidate most similar to `value`, if it clears `threshold`.
/// Ties keep the earlier candidate.
pub fn closest_match<'a>(value: &str, candidates: &[&'a str], threshold: f64) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for &candidate in candidates {
        let score = similarity(value, candidate);
        if score >= threshold && best.map_or(true, |(_, b)| score > b) {
            best = Some((candidate, score));
        }
    }
    best.map(|(c, _)| c)
}
