//! Edit-distance suggestions and identifier checks.

/// Closest candidate by Levenshtein distance, case-insensitive.
///
/// Nothing is suggested when the best distance exceeds half the longer of
/// the two strings.
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let needle = input.to_lowercase();
    let (best, dist) = candidates
        .iter()
        .map(|c| (*c, levenshtein(&needle, &c.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    (dist <= input.len().max(best.len()) / 2).then_some(best)
}

/// Levenshtein edit distance between two strings, two-row variant.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub(crate) fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}
