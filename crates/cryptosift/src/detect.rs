//! Cipher-type detection
//!
//! Two passes over the input: a format pass driven by charset and shape
//! (encodings, hash digests), then a statistical pass over alphabetic
//! text (index of coincidence and Kasiski hints for the classical
//! ciphers). Candidates for the same type are merged by keeping the
//! highest confidence.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::analysis::{
    index_of_coincidence, kasiski_examination, shannon_entropy, IOC_ENGLISH, IOC_RANDOM,
};
use crate::CipherType;

lazy_static! {
    static ref BASE64_RE: Regex = Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap();
    static ref BASE32_RE: Regex = Regex::new(r"^[A-Z2-7]+=*$").unwrap();
    static ref HEX_RE: Regex = Regex::new(r"^[0-9a-fA-F]+$").unwrap();
    static ref URL_ESCAPE_RE: Regex = Regex::new(r"%[0-9a-fA-F]{2}").unwrap();
    static ref MORSE_RE: Regex = Regex::new(r"^[.\-/\s]+$").unwrap();
    static ref BINARY_RE: Regex = Regex::new(r"^[01\s]+$").unwrap();
}

/// Midpoint between English and uniform-random index of coincidence,
/// used to split monoalphabetic from polyalphabetic material.
const IOC_MONO_THRESHOLD: f64 = (IOC_ENGLISH + IOC_RANDOM) / 2.0;
const IOC_MARGIN: f64 = 0.005;

/// Entropy in bits per char above which text reads as keyed binary
/// rather than any classical cipher.
const HIGH_ENTROPY: f64 = 5.0;

/// Minimum alphabetic fraction for the statistical pass to apply.
const MIN_ALPHA_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct DetectionCandidate {
    pub cipher_type: CipherType,
    pub confidence: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CipherDetector;

impl CipherDetector {
    pub fn new() -> Self {
        Self
    }

    /// Rank plausible cipher types for `input`, best first. Empty or
    /// whitespace-only input yields no candidates.
    pub fn detect(&self, input: &str) -> Vec<DetectionCandidate> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        self.detect_formats(trimmed, &mut candidates);
        self.detect_statistical(trimmed, &mut candidates);

        // Keep the strongest candidate per type.
        candidates.sort_by(|a, b| {
            a.cipher_type
                .id()
                .cmp(b.cipher_type.id())
                .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
        });
        candidates.dedup_by(|next, kept| next.cipher_type == kept.cipher_type);

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        tracing::debug!(
            input_len = trimmed.len(),
            candidates = candidates.len(),
            "detection complete"
        );
        candidates
    }

    fn detect_formats(&self, input: &str, out: &mut Vec<DetectionCandidate>) {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        if MORSE_RE.is_match(input) && (input.contains('.') || input.contains('-')) {
            out.push(candidate(CipherType::Morse, 0.9, "only Morse symbols"));
            return;
        }

        if BINARY_RE.is_match(input) && compact.len() >= 8 && compact.len() % 8 == 0 {
            out.push(candidate(
                CipherType::Binary,
                0.85,
                "binary digits in 8-bit groups",
            ));
            return;
        }

        if URL_ESCAPE_RE.is_match(input) {
            out.push(candidate(CipherType::Url, 0.85, "percent escapes present"));
        }

        if HEX_RE.is_match(&compact) && compact.len() % 2 == 0 && compact.len() >= 8 {
            match compact.len() {
                32 | 40 | 64 => out.push(candidate(
                    CipherType::Hash,
                    0.8,
                    "hex string of digest length",
                )),
                _ => out.push(candidate(CipherType::Hex, 0.7, "even-length hex string")),
            }
        }

        if BASE32_RE.is_match(&compact) && compact.len() >= 8 && compact.len() % 8 == 0 {
            out.push(candidate(CipherType::Base32, 0.7, "RFC 4648 base32 shape"));
        }

        if BASE64_RE.is_match(&compact) && compact.len() >= 8 && compact.len() % 4 == 0 {
            let confidence = if compact.ends_with('=') { 0.75 } else { 0.5 };
            out.push(candidate(CipherType::Base64, confidence, "base64 shape"));
        }
    }

    fn detect_statistical(&self, input: &str, out: &mut Vec<DetectionCandidate>) {
        let letters = input.chars().filter(|c| c.is_ascii_alphabetic()).count();
        let non_space = input.chars().filter(|c| !c.is_whitespace()).count();
        if non_space == 0 {
            return;
        }
        let alpha_ratio = letters as f64 / non_space as f64;

        if shannon_entropy(input) > HIGH_ENTROPY {
            out.push(candidate(
                CipherType::Xor,
                0.3,
                "high entropy for keyed binary",
            ));
        }

        // Transpositions permute characters without changing the
        // charset, so any alphanumeric-with-punctuation input long
        // enough for rows and rails qualifies even when digits dilute
        // the letter ratio.
        if input.chars().count() >= 10
            && input.chars().any(|c| c.is_ascii_alphanumeric())
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_punctuation() || c.is_whitespace())
        {
            out.push(candidate(CipherType::RailFence, 0.15, "transposable text"));
            out.push(candidate(CipherType::Columnar, 0.15, "transposable text"));
        }

        if alpha_ratio < MIN_ALPHA_RATIO || letters < 5 {
            return;
        }

        // Baseline guesses for any mostly-alphabetic input.
        out.push(candidate(CipherType::Rot13, 0.3, "alphabetic text"));
        out.push(candidate(CipherType::Caesar, 0.25, "alphabetic text"));
        out.push(candidate(CipherType::Atbash, 0.2, "alphabetic text"));
        out.push(candidate(CipherType::Vigenere, 0.17, "alphabetic text"));
        out.push(candidate(CipherType::Substitution, 0.15, "alphabetic text"));

        // IoC separates monoalphabetic from polyalphabetic material
        // once there is enough text to measure. Inside the margin
        // around the midpoint neither reading is trustworthy and the
        // baseline guesses stand.
        if letters < 20 {
            return;
        }
        let ioc = index_of_coincidence(input);
        if ioc > IOC_MONO_THRESHOLD + IOC_MARGIN {
            out.push(candidate(
                CipherType::Caesar,
                0.4,
                "monoalphabetic index of coincidence",
            ));
            out.push(candidate(
                CipherType::Substitution,
                0.35,
                "monoalphabetic index of coincidence",
            ));
            out.push(candidate(
                CipherType::Rot13,
                0.3,
                "monoalphabetic index of coincidence",
            ));
            out.push(candidate(
                CipherType::Atbash,
                0.25,
                "monoalphabetic index of coincidence",
            ));
        } else if ioc < IOC_MONO_THRESHOLD - IOC_MARGIN {
            let key_lengths = kasiski_examination(input).len();
            let confidence = (0.3 + 0.05 * key_lengths as f64).min(0.7);
            out.push(candidate(
                CipherType::Vigenere,
                confidence,
                "polyalphabetic index of coincidence",
            ));
        }
    }
}

/// One-shot detection with a default detector.
pub fn detect(input: &str) -> Vec<DetectionCandidate> {
    CipherDetector::new().detect(input)
}

fn candidate(cipher_type: CipherType, confidence: f64, reason: &str) -> DetectionCandidate {
    DetectionCandidate {
        cipher_type,
        confidence,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(detect("").is_empty());
        assert!(detect("   ").is_empty());
    }

    #[test]
    fn test_morse_wins() {
        let candidates = detect(".... . .-.. .-.. ---");
        assert_eq!(candidates[0].cipher_type, CipherType::Morse);
    }

    #[test]
    fn test_binary() {
        let candidates = detect("01001000 01101001");
        assert_eq!(candidates[0].cipher_type, CipherType::Binary);
    }

    #[test]
    fn test_padded_base64_outranks_unpadded() {
        let padded = detect("SGVsbG8gV29ybGQh"); // no '=' suffix here
        let b64 = padded
            .iter()
            .find(|c| c.cipher_type == CipherType::Base64)
            .unwrap();
        assert!(b64.confidence <= 0.5);

        let with_pad = detect("SGVsbG8gV29ybGQ=");
        let b64 = with_pad
            .iter()
            .find(|c| c.cipher_type == CipherType::Base64)
            .unwrap();
        assert!(b64.confidence >= 0.75);
    }

    #[test]
    fn test_digest_length_hex_reads_as_hash() {
        let candidates = detect("5f4dcc3b5aa765d61d8327deb882cf99");
        assert_eq!(candidates[0].cipher_type, CipherType::Hash);
        let candidates = detect("48656c6c6f20576f726c6448656c6c") ;
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Hex));
    }

    #[test]
    fn test_url_escapes() {
        let candidates = detect("Hello%20World%21");
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Url && c.confidence >= 0.85));
    }

    #[test]
    fn test_shifted_english_favors_monoalphabetic() {
        // ROT13 of ordinary prose keeps the uneven English letter
        // distribution (IoC well above the midpoint), so the IoC pass
        // should boost the shift ciphers. A pangram would not do: its
        // deliberately flat distribution reads as polyalphabetic.
        let candidates =
            detect("gb or be abg gb or gung vf gur dhrfgvba jurgure gvf aboyre");
        let caesar = candidates
            .iter()
            .find(|c| c.cipher_type == CipherType::Caesar)
            .unwrap();
        assert!(caesar.confidence >= 0.4);
        let vigenere = candidates
            .iter()
            .find(|c| c.cipher_type == CipherType::Vigenere)
            .unwrap();
        assert!(caesar.confidence > vigenere.confidence);
    }

    #[test]
    fn test_ambiguous_ioc_band_keeps_baseline_confidences() {
        // 13 distinct letters, 3 occurrences each: IoC = 78/1482 =
        // 0.0526, dead on the mono/poly midpoint, inside the +-0.005
        // margin. Neither statistical boost may fire.
        let text = "abcdefghijklm".repeat(3);
        let candidates = detect(&text);
        let caesar = candidates
            .iter()
            .find(|c| c.cipher_type == CipherType::Caesar)
            .unwrap();
        assert!((caesar.confidence - 0.25).abs() < 1e-9);
        let vigenere = candidates
            .iter()
            .find(|c| c.cipher_type == CipherType::Vigenere)
            .unwrap();
        assert!((vigenere.confidence - 0.17).abs() < 1e-9);
    }

    #[test]
    fn test_transposition_gate_is_charset_based() {
        // Digits dilute the letter ratio below the substitution
        // baseline, but transpositions still apply.
        let candidates = detect("attack-1234");
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::RailFence));
        assert!(!candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Caesar));

        // Too short for rows and rails; shift ciphers still apply.
        let candidates = detect("Khoor");
        assert!(!candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::RailFence));
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Caesar));
    }

    #[test]
    fn test_high_entropy_adds_xor_alongside_alphabetic_guesses() {
        // 62 distinct symbols each once: entropy = log2(62) > 5
        // bits/char, yet the text is mostly alphabetic.
        let input: String = ('a'..='z').chain('A'..='Z').chain('0'..='9').collect();
        let candidates = detect(&input);
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Xor));
        assert!(candidates
            .iter()
            .any(|c| c.cipher_type == CipherType::Rot13));
    }

    #[test]
    fn test_candidates_sorted_descending() {
        let candidates = detect("uryyb jbeyq naq rirelbar ryfr urer gbb");
        for pair in candidates.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_one_candidate_per_type() {
        let candidates = detect("gur dhvpx oebja sbk whzcf bire gur ynml qbt");
        let mut types: Vec<_> = candidates.iter().map(|c| c.cipher_type).collect();
        types.sort_by_key(|t| t.id());
        types.dedup();
        assert_eq!(types.len(), candidates.len());
    }
}
