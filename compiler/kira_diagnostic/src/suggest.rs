//! "Did you mean" suggestions for undefined-symbol/undefined-type
//! diagnostics (SPEC_FULL.md §2, supplementing the distilled spec).

use levenshtein::levenshtein;

/// Find the candidate in `candidates` closest to `name` by edit distance,
/// if any is within distance 2. Returns `None` on an empty candidate list
/// or when nothing is close enough to be a plausible typo.
pub fn nearest_name<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein(name, candidate)))
        .filter(|&(_, distance)| distance <= 2 && distance > 0)
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_close_typo() {
        let candidates = ["length", "substring", "starts_with"];
        assert_eq!(nearest_name("lenght", candidates), Some("length"));
    }

    #[test]
    fn ignores_exact_matches() {
        let candidates = ["length"];
        assert_eq!(nearest_name("length", candidates), None);
    }

    #[test]
    fn ignores_distant_names() {
        let candidates = ["completely_unrelated_name"];
        assert_eq!(nearest_name("x", candidates), None);
    }
}
