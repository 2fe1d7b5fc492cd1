//! Cryptanalysis primitives
//!
//! Letter/bigram frequency tables, chi-squared, Shannon entropy,
//! Index of Coincidence, Kasiski examination. Pure functions, no state.

use std::collections::HashMap;

/// Relative frequencies of a-z in English prose.
pub const ENGLISH_FREQUENCIES: [f64; 26] = [
    0.082, 0.015, 0.028, 0.043, 0.127, 0.022, 0.020, 0.061, 0.070, 0.002, 0.008, 0.040, 0.024,
    0.067, 0.075, 0.019, 0.001, 0.060, 0.063, 0.091, 0.028, 0.010, 0.024, 0.002, 0.020, 0.001,
];

/// Canonical English letters ordered most to least frequent.
pub const ENGLISH_FREQUENCY_ORDER: &[u8; 26] = b"etaoinshrdlcumwfgypbvkjxqz";

/// Top 50 English bigrams with their relative frequencies.
pub const ENGLISH_BIGRAMS: [(&str, f64); 50] = [
    ("th", 0.0356),
    ("he", 0.0307),
    ("in", 0.0243),
    ("er", 0.0205),
    ("an", 0.0199),
    ("re", 0.0185),
    ("on", 0.0176),
    ("at", 0.0149),
    ("en", 0.0145),
    ("nd", 0.0135),
    ("ti", 0.0134),
    ("es", 0.0134),
    ("or", 0.0128),
    ("te", 0.0120),
    ("of", 0.0117),
    ("ed", 0.0117),
    ("is", 0.0113),
    ("it", 0.0112),
    ("al", 0.0109),
    ("ar", 0.0107),
    ("st", 0.0105),
    ("to", 0.0104),
    ("nt", 0.0104),
    ("ng", 0.0095),
    ("se", 0.0093),
    ("ha", 0.0093),
    ("as", 0.0087),
    ("ou", 0.0087),
    ("io", 0.0083),
    ("le", 0.0083),
    ("ve", 0.0083),
    ("co", 0.0079),
    ("me", 0.0079),
    ("de", 0.0076),
    ("hi", 0.0076),
    ("ri", 0.0073),
    ("ro", 0.0073),
    ("ic", 0.0070),
    ("ne", 0.0069),
    ("ea", 0.0069),
    ("ra", 0.0069),
    ("ce", 0.0065),
    ("li", 0.0062),
    ("ch", 0.0060),
    ("ll", 0.0058),
    ("be", 0.0058),
    ("ma", 0.0056),
    ("si", 0.0055),
    ("om", 0.0055),
    ("ur", 0.0054),
];

/// IoC of English prose vs. uniformly random letters.
pub const IOC_ENGLISH: f64 = 0.0667;
pub const IOC_RANDOM: f64 = 0.0385;

/// Chi-squared statistic between two equal-length distributions.
/// Buckets with zero expected value are skipped.
pub fn chi_squared(observed: &[f64], expected: &[f64]) -> f64 {
    observed
        .iter()
        .zip(expected.iter())
        .filter(|(_, &e)| e > 0.0)
        .map(|(&o, &e)| (o - e).powi(2) / e)
        .sum()
}

/// Counts of a-z in `text`, case-folded; non-letters are ignored.
pub fn letter_counts(text: &str) -> [u32; 26] {
    let mut counts = [0u32; 26];
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1;
        }
    }
    counts
}

/// Relative frequencies of a-z in `text`. All zeros when no letters.
pub fn letter_frequencies(text: &str) -> [f64; 26] {
    let counts = letter_counts(text);
    let total: u32 = counts.iter().sum();
    let mut freqs = [0.0f64; 26];
    if total > 0 {
        for (f, &c) in freqs.iter_mut().zip(counts.iter()) {
            *f = c as f64 / total as f64;
        }
    }
    freqs
}

/// Bigram counts over the case-folded, alpha-only view of `text`.
pub fn bigram_counts(text: &str) -> HashMap<String, usize> {
    let letters: Vec<char> = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut counts = HashMap::new();
    for window in letters.windows(2) {
        let bigram: String = window.iter().collect();
        *counts.entry(bigram).or_insert(0) += 1;
    }
    counts
}

/// Fraction of characters that are printable ASCII.
/// Tab, CR and LF count as printable.
pub fn printable_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let printable = text
        .chars()
        .filter(|&c| matches!(c, ' '..='~' | '\t' | '\r' | '\n'))
        .count();
    printable as f64 / text.chars().count() as f64
}

/// Shannon entropy in bits per character over the raw (non-folded) text.
pub fn shannon_entropy(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Index of Coincidence over the 26-letter counts.
/// English text ≈ 0.067, random letters ≈ 0.038. Returns 0 for fewer
/// than 2 letters.
pub fn index_of_coincidence(text: &str) -> f64 {
    let counts = letter_counts(text);
    let n: u64 = counts.iter().map(|&c| c as u64).sum();
    if n < 2 {
        return 0.0;
    }

    let sum: u64 = counts
        .iter()
        .map(|&c| c as u64 * (c as u64).saturating_sub(1))
        .sum();
    sum as f64 / (n * (n - 1)) as f64
}

/// Non-negative remainder of `a mod n`. Several cipher shifts subtract
/// before reducing, so the plain `%` operator is not enough.
pub fn mod_floor(a: i32, n: i32) -> i32 {
    ((a % n) + n) % n
}

/// Estimate repeating-key lengths via Kasiski examination.
///
/// Finds repeated trigrams in the alpha-only folded text, factorizes the
/// distances between occurrences, and ranks candidate lengths by factor
/// frequency (top 8). Falls back to lengths 2-10 when no trigram repeats.
pub fn kasiski_examination(text: &str) -> Vec<usize> {
    let letters: Vec<char> = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
    for i in 0..letters.len().saturating_sub(2) {
        let trigram: String = letters[i..i + 3].iter().collect();
        positions.entry(trigram).or_default().push(i);
    }

    let mut factor_counts: HashMap<usize, usize> = HashMap::new();
    for occurrences in positions.values().filter(|p| p.len() > 1) {
        for window in occurrences.windows(2) {
            let dist = window[1] - window[0];
            for factor in 2..=dist.min(20) {
                if dist % factor == 0 {
                    *factor_counts.entry(factor).or_insert(0) += 1;
                }
            }
        }
    }

    if factor_counts.is_empty() {
        return (2..=10).collect();
    }

    let mut ranked: Vec<(usize, usize)> = factor_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(8).map(|(len, _)| len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chi_squared_identical() {
        let dist = [0.25, 0.25, 0.5];
        assert!(chi_squared(&dist, &dist) < 1e-12);
    }

    #[test]
    fn test_chi_squared_skips_zero_expected() {
        let observed = [0.5, 0.5];
        let expected = [0.0, 0.5];
        assert!(chi_squared(&observed, &expected).is_finite());
    }

    #[test]
    fn test_letter_counts_folds_case() {
        let counts = letter_counts("AaBb!");
        assert_eq!(counts[0], 2);
        assert_eq!(counts[1], 2);
        assert_eq!(counts.iter().sum::<u32>(), 4);
    }

    #[test]
    fn test_printable_ratio() {
        assert_eq!(printable_ratio("hello\n"), 1.0);
        assert!(printable_ratio("ab\u{0}\u{1}") < 0.6);
        assert_eq!(printable_ratio(""), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_zero() {
        assert_eq!(shannon_entropy("aaaaaaaa"), 0.0);
    }

    #[test]
    fn test_entropy_english_range() {
        let e = shannon_entropy("the quick brown fox jumps over the lazy dog");
        assert!(e > 3.0 && e < 5.0, "entropy was {}", e);
    }

    #[test]
    fn test_ioc_english() {
        let english = "TO BE OR NOT TO BE THAT IS THE QUESTION WHETHER TIS NOBLER";
        let ioc = index_of_coincidence(english);
        assert!(ioc > 0.05 && ioc < 0.10, "IoC was {}", ioc);
    }

    #[test]
    fn test_ioc_short_input() {
        assert_eq!(index_of_coincidence("a"), 0.0);
        assert_eq!(index_of_coincidence("42 17"), 0.0);
    }

    #[test]
    fn test_mod_floor() {
        assert_eq!(mod_floor(-3, 26), 23);
        assert_eq!(mod_floor(29, 26), 3);
        assert_eq!(mod_floor(0, 26), 0);
    }

    #[test]
    fn test_kasiski_period_three() {
        // Repeated trigrams at distances that are multiples of 3.
        let text = "xyzabcxyzdefxyzghi".repeat(3);
        let lengths = kasiski_examination(&text);
        assert!(lengths.contains(&3), "lengths were {:?}", lengths);
    }

    #[test]
    fn test_kasiski_fallback_without_repeats() {
        let lengths = kasiski_examination("abcdefg");
        assert_eq!(lengths, (2..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_bigram_counts() {
        let counts = bigram_counts("The the!");
        assert_eq!(counts.get("th"), Some(&2));
        assert_eq!(counts.get("he"), Some(&2));
        // "et" spans the word boundary in the folded alpha-only view
        assert_eq!(counts.get("et"), Some(&1));
    }
}
