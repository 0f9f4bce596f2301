//! Normalized string similarity for identifier matching
//!
//! Case-insensitive Levenshtein distance, normalized to [0.0, 1.0] as
//! `1 - distance / max(len)`. Used by the test-id recovery strategy to
//! rank candidate attribute values against the broken selector's token.

/// Compute similarity between two identifiers.
///
/// Returns 1.0 for two empty strings and for case-insensitive equality.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let a_len = a_lower.chars().count();
    let b_len = b_lower.chars().count();
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a_lower, &b_lower);
    1.0 - (distance as f64 / max_len as f64)
}

/// Character-level Levenshtein distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two-row optimisation.
    let mut prev = (0..=n).collect::<Vec<usize>>();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
