//! Name similarity scoring

use strsim::normalized_levenshtein;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::NameMetric;

/// Indel ratio between two names, 1.0 for identical strings
///
/// `2 * lcs / (len_a + len_b)` over chars, where `lcs` is the length of the
/// longest common subsequence. Only insertions and deletions count, so a
/// name with an extra word scores higher than under plain Levenshtein.
/// Two empty names count as identical.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * longest_common_subsequence(&a, &b) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Fold a name for comparison
///
/// - Removes diacritics
/// - Drops punctuation
/// - Lowercases
/// - Collapses whitespace
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scores names with the configured metric, optionally folding them first
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMatcher {
    metric: NameMetric,
    normalize: bool,
}

impl NameMatcher {
    pub fn new(metric: NameMetric, normalize: bool) -> Self {
        Self { metric, normalize }
    }

    pub fn score(&self, a: &str, b: &str) -> f64 {
        if self.normalize {
            self.raw_score(&normalize_name(a), &normalize_name(b))
        } else {
            self.raw_score(a, b)
        }
    }

    fn raw_score(&self, a: &str, b: &str) -> f64 {
        match self.metric {
            NameMetric::Indel => name_similarity(a, b),
            NameMetric::Levenshtein => normalized_levenshtein(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_names() {
        assert_eq!(name_similarity("Farmacia Central", "Farmacia Central"), 1.0);
        assert_eq!(name_similarity("", ""), 1.0);
    }

    #[test]
    fn test_one_typo() {
        let score = name_similarity("Farmacia Central", "Farmacia Centrall");
        assert!(score >= 0.9, "got {score}");
    }

    #[test]
    fn test_unrelated_names() {
        assert!(name_similarity("Farmacia Central", "Kiosco El Sol") < 0.5);
    }

    #[test]
    fn test_case_sensitive_without_normalization() {
        assert!(name_similarity("PANADERIA", "panaderia") < 0.5);
        assert_eq!(NameMatcher::new(NameMetric::Indel, true).score("PANADERÍA", "panaderia"), 1.0);
    }

    #[test]
    fn test_added_word_scores_as_indel_ratio() {
        // lcs 11 over 28 chars
        let score = name_similarity("Kiosco Juan", "Kiosco Juan Perez");
        assert!((score - 22.0 / 28.0).abs() < 1e-12, "got {score}");
        assert!(score >= 0.7);

        let levenshtein = NameMatcher::new(NameMetric::Levenshtein, false)
            .score("Kiosco Juan", "Kiosco Juan Perez");
        assert!(levenshtein < 0.7, "got {levenshtein}");
    }

    #[test]
    fn test_indel_counts_chars_not_bytes() {
        assert_eq!(name_similarity("Óptica", "Óptica"), 1.0);
        assert!((name_similarity("Optica Vision", "Optica Visión") - 24.0 / 26.0).abs() < 1e-12);
        assert_eq!(name_similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Café;  del   Centro "), "cafe del centro");
        assert_eq!(normalize_name("Niño's Pizzería"), "ninos pizzeria");
    }
}
