//! Plaintext quality scoring
//!
//! Combines dictionary coverage, letter/bigram frequency fit, entropy,
//! printable ratio and space frequency into a single English-likeness
//! score in [0,1]. The dictionary lookup is injected at construction so
//! callers can swap in a bigger word list without touching the scorer.

use crate::analysis::{
    bigram_counts, chi_squared, letter_counts, letter_frequencies, printable_ratio,
    shannon_entropy, ENGLISH_BIGRAMS, ENGLISH_FREQUENCIES,
};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Fixed weights of the composite score. Changing these changes every
/// ranked result, so they are frozen for compatibility.
const WEIGHT_DICTIONARY: f64 = 0.35;
const WEIGHT_FREQUENCY: f64 = 0.25;
const WEIGHT_BIGRAM: f64 = 0.15;
const WEIGHT_ENTROPY: f64 = 0.10;
const WEIGHT_PRINTABLE: f64 = 0.10;
const WEIGHT_SPACE: f64 = 0.05;

/// English prose averages ~4.0 bits/char and ~17% spaces.
const TARGET_ENTROPY: f64 = 4.0;
const TARGET_SPACE_FREQUENCY: f64 = 0.17;

/// Quality breakdown for a candidate plaintext. Every field is in [0,1];
/// `total` is the weighted combination and is never mutated after
/// construction.
#[derive(Debug, Clone, Serialize)]
pub struct PlaintextScore {
    pub total: f64,
    pub dictionary_word_ratio: f64,
    pub frequency_fit: f64,
    pub bigram_fit: f64,
    pub entropy_score: f64,
    pub printable_ratio: f64,
    pub space_score: f64,
}

/// Word-list lookup injected into the scorer.
pub trait WordLookup: Send + Sync {
    fn contains(&self, word: &str) -> bool;
}

/// Adapter for closure-based lookups.
pub struct WordFn<F>(pub F);

impl<F> WordLookup for WordFn<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn contains(&self, word: &str) -> bool {
        (self.0)(word)
    }
}

lazy_static! {
    static ref COMMON_WORDS: HashSet<&'static str> = COMMON_WORD_LIST.iter().copied().collect();
}

/// Built-in English word list. Small but weighted toward the words that
/// actually show up in recovered plaintexts and CTF flags.
pub struct EnglishWordlist;

impl WordLookup for EnglishWordlist {
    fn contains(&self, word: &str) -> bool {
        COMMON_WORDS.contains(word)
    }
}

/// Scores candidate plaintexts for English-likeness.
#[derive(Clone)]
pub struct PlaintextScorer {
    dictionary: Arc<dyn WordLookup>,
}

impl Default for PlaintextScorer {
    fn default() -> Self {
        Self::new(Arc::new(EnglishWordlist))
    }
}

impl PlaintextScorer {
    pub fn new(dictionary: Arc<dyn WordLookup>) -> Self {
        Self { dictionary }
    }

    pub fn score(&self, text: &str) -> PlaintextScore {
        let dictionary_word_ratio = self.dictionary_word_ratio(text);
        let frequency_fit = frequency_fit(text);
        let bigram_fit = bigram_fit(text);
        let entropy_score = entropy_score(text);
        let printable = printable_ratio(text);
        let space_score = space_score(text);

        let total = clamp01(
            WEIGHT_DICTIONARY * dictionary_word_ratio
                + WEIGHT_FREQUENCY * frequency_fit
                + WEIGHT_BIGRAM * bigram_fit
                + WEIGHT_ENTROPY * entropy_score
                + WEIGHT_PRINTABLE * printable
                + WEIGHT_SPACE * space_score,
        );

        PlaintextScore {
            total,
            dictionary_word_ratio,
            frequency_fit,
            bigram_fit,
            entropy_score,
            printable_ratio: printable,
            space_score,
        }
    }

    /// Character-weighted fraction of tokens found in the word list.
    fn dictionary_word_ratio(&self, text: &str) -> f64 {
        let mut matched = 0usize;
        let mut total = 0usize;

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let len = token.chars().count();
            total += len;
            if self.dictionary.contains(&token.to_lowercase()) {
                matched += len;
            }
        }

        if total == 0 {
            0.0
        } else {
            matched as f64 / total as f64
        }
    }
}

/// Chi-squared letter-frequency distance to English, normalized with
/// exp(-chi/3). Zero for fewer than 2 letters.
fn frequency_fit(text: &str) -> f64 {
    let letters: u32 = letter_counts(text).iter().sum();
    if letters < 2 {
        return 0.0;
    }

    let observed = letter_frequencies(text);
    let chi_per_letter = chi_squared(&observed, &ENGLISH_FREQUENCIES);
    clamp01((-chi_per_letter / 3.0).exp())
}

/// Weighted agreement with the top-50 English bigram distribution.
/// Zero when fewer than 5 bigrams are observed.
fn bigram_fit(text: &str) -> f64 {
    let counts = bigram_counts(text);
    let total: usize = counts.values().sum();
    if total < 5 {
        return 0.0;
    }

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for (bigram, expected) in ENGLISH_BIGRAMS.iter() {
        let observed = counts.get(*bigram).copied().unwrap_or(0) as f64 / total as f64;
        let fit = (1.0 - (observed - expected).abs() / expected).max(0.0);
        weighted += fit * expected;
        weight_sum += expected;
    }
    clamp01(weighted / weight_sum)
}

/// Peaks at the ~4.0 bits/char entropy of English prose.
fn entropy_score(text: &str) -> f64 {
    let entropy = shannon_entropy(text);
    (1.0 - (entropy - TARGET_ENTROPY).abs() / TARGET_ENTROPY).max(0.0)
}

/// Peaks at 17% space frequency.
fn space_score(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let spaces = text.chars().filter(|&c| c == ' ').count();
    let frequency = spaces as f64 / total as f64;
    (1.0 - (frequency - TARGET_SPACE_FREQUENCY).abs() / TARGET_SPACE_FREQUENCY).max(0.0)
}

/// Fuse detector confidence with decoded-plaintext quality.
pub fn final_confidence(detection_confidence: f64, quality: f64) -> f64 {
    clamp01(0.4 * detection_confidence + 0.6 * quality)
}

pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

const COMMON_WORD_LIST: &[&str] = &[
    // Function words
    "the", "be", "to", "of", "and", "a", "an", "in", "that", "have", "i", "it", "for", "not",
    "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they",
    "we", "say", "her", "she", "or", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make",
    "can", "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most", "us", "is", "was", "are", "been", "has", "had", "were", "said", "did", "having",
    "may", "am", "shall", "being", "does", "each", "few", "those", "such", "very", "too",
    "own", "same", "both", "between", "under", "never", "while", "where", "much", "before",
    "here", "through", "again", "off", "once", "why", "down", "still", "should", "must",
    // Common nouns and verbs
    "man", "woman", "child", "world", "life", "hand", "part", "eye", "place", "case", "week",
    "company", "system", "program", "question", "government", "number", "night", "point",
    "home", "water", "room", "mother", "area", "money", "story", "fact", "month", "lot",
    "right", "study", "book", "job", "word", "business", "issue", "side", "kind", "head",
    "house", "service", "friend", "father", "power", "hour", "game", "line", "end", "member",
    "law", "car", "city", "community", "name", "president", "team", "minute", "idea", "body",
    "information", "nothing", "ago", "lead", "social", "understand", "whether", "watch",
    "together", "follow", "around", "parent", "stop", "face", "anything", "create", "public",
    "already", "speak", "others", "read", "level", "allow", "add", "office", "spend", "door",
    "health", "person", "art", "sure", "war", "history", "party", "result", "change", "morning",
    "reason", "research", "girl", "boy", "guy", "moment", "air", "teacher", "force", "education",
    "letter", "north", "south", "east", "west", "left", "found", "keep", "begin", "seem",
    "help", "talk", "turn", "start", "show", "hear", "play", "run", "move", "live", "believe",
    "hold", "bring", "happen", "write", "provide", "sit", "stand", "lose", "pay", "meet",
    "include", "continue", "set", "learn", "lean", "call", "try", "ask", "need", "feel",
    "become", "leave", "put", "mean", "let", "great", "little", "own", "old", "big", "high",
    "different", "small", "large", "next", "early", "young", "important", "long", "last",
    "bad", "best", "better", "true", "free", "real", "open", "white", "black", "red", "blue",
    "green", "light", "dark", "strong", "full", "easy", "hard", "quick", "slow", "fast",
    // Test and CTF staples
    "hello", "quick", "brown", "fox", "jumps", "jump", "lazy", "dog", "cat", "test", "testing",
    "secret", "message", "attack", "defend", "defense", "wall", "castle", "gate", "dawn",
    "midnight", "noon", "enemy", "troops", "retreat", "advance", "victory", "cipher", "code",
    "key", "flag", "password", "admin", "user", "login", "crypto", "hidden", "treasure",
    "meet", "bridge", "river", "mountain", "forest", "island", "ship", "gold", "silver",
    "king", "queen", "knight", "sword", "shield", "tower", "guard", "spy", "agent", "mission",
    "plan", "target", "signal", "radio", "station", "base", "camp", "north", "wind", "rain",
    "fire", "earth", "stone", "tree", "bird", "fish", "horse", "wolf", "bear", "lion",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_scores_higher_than_noise() {
        let scorer = PlaintextScorer::default();
        let english = scorer.score("the quick brown fox jumps over the lazy dog");
        let noise = scorer.score("qzx jvk wpf mqt zzr xxj qqv kkz");
        assert!(
            english.total > noise.total + 0.2,
            "english {} vs noise {}",
            english.total,
            noise.total
        );
    }

    #[test]
    fn test_dictionary_ratio_full_match() {
        let scorer = PlaintextScorer::default();
        let score = scorer.score("hello world");
        assert!(
            score.dictionary_word_ratio > 0.99,
            "ratio was {}",
            score.dictionary_word_ratio
        );
    }

    #[test]
    fn test_all_components_clamped() {
        let scorer = PlaintextScorer::default();
        for text in ["", "a", "hello world", "\u{0}\u{1}\u{2}", "    ", "%%%%%%"] {
            let s = scorer.score(text);
            for v in [
                s.total,
                s.dictionary_word_ratio,
                s.frequency_fit,
                s.bigram_fit,
                s.entropy_score,
                s.printable_ratio,
                s.space_score,
            ] {
                assert!((0.0..=1.0).contains(&v), "component {} out of range for {:?}", v, text);
            }
        }
    }

    #[test]
    fn test_frequency_fit_needs_two_letters() {
        assert_eq!(frequency_fit("a"), 0.0);
        assert_eq!(frequency_fit("123"), 0.0);
    }

    #[test]
    fn test_bigram_fit_needs_five_bigrams() {
        assert_eq!(bigram_fit("abc"), 0.0);
    }

    #[test]
    fn test_final_confidence_clamped() {
        let mut x = -1.0;
        while x <= 2.0 {
            let mut y = -1.0;
            while y <= 2.0 {
                let fused = final_confidence(x, y);
                assert!((0.0..=1.0).contains(&fused));
                y += 0.25;
            }
            x += 0.25;
        }
    }

    #[test]
    fn test_final_confidence_formula() {
        let fused = final_confidence(0.5, 0.5);
        assert!((fused - 0.5).abs() < 1e-12);
        let fused = final_confidence(1.0, 0.0);
        assert!((fused - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_injected_dictionary() {
        let scorer = PlaintextScorer::new(Arc::new(WordFn(|word: &str| word == "zorblax")));
        let score = scorer.score("zorblax zorblax");
        assert!(score.dictionary_word_ratio > 0.99);
        let score = scorer.score("hello world");
        assert_eq!(score.dictionary_word_ratio, 0.0);
    }
}
