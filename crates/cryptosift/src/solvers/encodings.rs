//! Encoding solvers: Base64, Base32, hex, binary, URL percent-encoding
//! and Morse. These are deterministic transforms rather than ciphers,
//! so each solver produces at most one candidate and rejects decodes
//! that do not look like text.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::{scored_result, CrackResult, Encrypted, Solver, SolverOptions};
use crate::analysis::printable_ratio;
use crate::score::PlaintextScorer;
use crate::{CipherType, Error, Result};

/// Decoded bytes must be mostly printable to count as a plausible
/// plaintext layer.
const MIN_PRINTABLE: f64 = 0.8;

fn accept(decoded: Vec<u8>) -> Option<String> {
    let text = String::from_utf8(decoded).ok()?;
    if text.is_empty() || printable_ratio(&text) < MIN_PRINTABLE {
        return None;
    }
    Some(text)
}

// ═══════════════════════════════════════════════════════════
// BASE64
// ═══════════════════════════════════════════════════════════

pub struct Base64Solver {
    scorer: PlaintextScorer,
}

impl Base64Solver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for Base64Solver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Base64
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        let decoded = match BASE64.decode(ciphertext.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match accept(decoded) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Base64,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: BASE64.encode(plaintext.as_bytes()),
            cipher_type: CipherType::Base64,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// BASE32 (RFC 4648 alphabet, '=' padded)
// ═══════════════════════════════════════════════════════════

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::new();
    for chunk in data.chunks(5) {
        let mut buf = [0u8; 5];
        buf[..chunk.len()].copy_from_slice(chunk);
        let bits = ((buf[0] as u64) << 32)
            | ((buf[1] as u64) << 24)
            | ((buf[2] as u64) << 16)
            | ((buf[3] as u64) << 8)
            | buf[4] as u64;

        // ceil(8n/5) output symbols for n input bytes
        let symbols = (chunk.len() * 8 + 4) / 5;
        for i in 0..8 {
            if i < symbols {
                let idx = ((bits >> (35 - 5 * i)) & 0x1f) as usize;
                out.push(BASE32_ALPHABET[idx] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let cleaned: Vec<u8> = text
        .trim()
        .bytes()
        .filter(|&b| b != b'=')
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(cleaned.len() * 5 / 8);
    for chunk in cleaned.chunks(8) {
        let mut bits: u64 = 0;
        for (i, &b) in chunk.iter().enumerate() {
            let value = BASE32_ALPHABET.iter().position(|&a| a == b)? as u64;
            bits |= value << (35 - 5 * i);
        }
        // n symbols carry floor(5n/8) whole bytes
        let bytes = chunk.len() * 5 / 8;
        for i in 0..bytes {
            out.push(((bits >> (32 - 8 * i)) & 0xff) as u8);
        }
    }
    Some(out)
}

pub struct Base32Solver {
    scorer: PlaintextScorer,
}

impl Base32Solver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for Base32Solver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Base32
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        match base32_decode(ciphertext).and_then(accept) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Base32,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: base32_encode(plaintext.as_bytes()),
            cipher_type: CipherType::Base32,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// HEX
// ═══════════════════════════════════════════════════════════

pub struct HexSolver {
    scorer: PlaintextScorer,
}

impl HexSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for HexSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Hex
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        let cleaned: String = ciphertext.chars().filter(|c| !c.is_whitespace()).collect();
        let decoded = match hex::decode(&cleaned) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match accept(decoded) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Hex,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: hex::encode(plaintext.as_bytes()),
            cipher_type: CipherType::Hex,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// BINARY (8-bit groups, whitespace tolerated)
// ═══════════════════════════════════════════════════════════

pub struct BinarySolver {
    scorer: PlaintextScorer,
}

impl BinarySolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for BinarySolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Binary
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        let cleaned: String = ciphertext.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty()
            || cleaned.len() % 8 != 0
            || !cleaned.bytes().all(|b| b == b'0' || b == b'1')
        {
            return Vec::new();
        }

        let decoded: Vec<u8> = cleaned
            .as_bytes()
            .chunks(8)
            .map(|bits| bits.iter().fold(0u8, |acc, &b| (acc << 1) | (b - b'0')))
            .collect();
        match accept(decoded) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Binary,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        let ciphertext = plaintext
            .as_bytes()
            .iter()
            .map(|b| format!("{:08b}", b))
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Encrypted {
            ciphertext,
            cipher_type: CipherType::Binary,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// URL PERCENT-ENCODING
// ═══════════════════════════════════════════════════════════

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn url_decode(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 >= bytes.len() {
                    return None;
                }
                let hi = hex_nibble(bytes[i + 1])?;
                let lo = hex_nibble(bytes[i + 2])?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Some(out)
}

fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub struct UrlSolver {
    scorer: PlaintextScorer,
}

impl UrlSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for UrlSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Url
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        // Without any escapes the "decode" would be the identity, which
        // just echoes the input back as a fake layer.
        if !ciphertext.contains('%') && !ciphertext.contains('+') {
            return Vec::new();
        }
        match url_decode(ciphertext).and_then(accept) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Url,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: url_encode(plaintext),
            cipher_type: CipherType::Url,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// MORSE
// ═══════════════════════════════════════════════════════════

const MORSE_TABLE: [(char, &str); 43] = [
    ('a', ".-"),
    ('b', "-..."),
    ('c', "-.-."),
    ('d', "-.."),
    ('e', "."),
    ('f', "..-."),
    ('g', "--."),
    ('h', "...."),
    ('i', ".."),
    ('j', ".---"),
    ('k', "-.-"),
    ('l', ".-.."),
    ('m', "--"),
    ('n', "-."),
    ('o', "---"),
    ('p', ".--."),
    ('q', "--.-"),
    ('r', ".-."),
    ('s', "..."),
    ('t', "-"),
    ('u', "..-"),
    ('v', "...-"),
    ('w', ".--"),
    ('x', "-..-"),
    ('y', "-.--"),
    ('z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('!', "-.-.--"),
    ('\'', ".----."),
    ('/', "-..-."),
    ('@', ".--.-."),
];

fn morse_for(c: char) -> Option<&'static str> {
    MORSE_TABLE
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, code)| *code)
}

fn char_for_morse(code: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, m)| *m == code)
        .map(|(ch, _)| *ch)
}

/// Letters separated by spaces, words by " / ".
fn morse_decode(text: &str) -> Option<String> {
    let mut out = String::new();
    for (i, word) in text.trim().split('/').enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for code in word.split_whitespace() {
            out.push(char_for_morse(code)?);
        }
    }
    if out.trim().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn morse_encode(text: &str) -> Result<String> {
    let mut words = Vec::new();
    for word in text.split_whitespace() {
        let mut codes = Vec::new();
        for c in word.chars() {
            let code = morse_for(c.to_ascii_lowercase())
                .ok_or_else(|| Error::EncodingFailed(format!("No Morse code for {:?}", c)))?;
            codes.push(code);
        }
        words.push(codes.join(" "));
    }
    Ok(words.join(" / "))
}

pub struct MorseSolver {
    scorer: PlaintextScorer,
}

impl MorseSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for MorseSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Morse
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        if !ciphertext
            .chars()
            .all(|c| matches!(c, '.' | '-' | '/' | ' ' | '\t' | '\n' | '\r'))
        {
            return Vec::new();
        }
        match morse_decode(ciphertext) {
            Some(plaintext) => vec![scored_result(
                &self.scorer,
                plaintext,
                CipherType::Morse,
                None,
                None,
            )],
            None => Vec::new(),
        }
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: morse_encode(plaintext)?,
            cipher_type: CipherType::Morse,
            key: None,
            details: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> PlaintextScorer {
        PlaintextScorer::default()
    }

    #[test]
    fn test_base64_decode() {
        let solver = Base64Solver::new(scorer());
        let results = solver.solve("SGVsbG8gV29ybGQ=", &SolverOptions::default());
        assert_eq!(results[0].plaintext, "Hello World");
    }

    #[test]
    fn test_base64_rejects_binary_payload() {
        let solver = Base64Solver::new(scorer());
        // Valid base64, but decodes to non-printable bytes.
        let garbage = BASE64.encode([0u8, 1, 2, 3, 255, 254, 253, 252]);
        assert!(solver.solve(&garbage, &SolverOptions::default()).is_empty());
    }

    #[test]
    fn test_base32_roundtrip() {
        assert_eq!(base32_encode(b"Hello"), "JBSWY3DP");
        assert_eq!(base32_encode(b"Hi"), "JBUQ====");
        assert_eq!(base32_decode("JBSWY3DP").unwrap(), b"Hello");
        assert_eq!(base32_decode("JBUQ====").unwrap(), b"Hi");
    }

    #[test]
    fn test_base32_solver() {
        let solver = Base32Solver::new(scorer());
        let results = solver.solve("JBSWY3DPEBLW64TMMQ======", &SolverOptions::default());
        assert_eq!(results[0].plaintext, "Hello World");
    }

    #[test]
    fn test_hex_decode() {
        let solver = HexSolver::new(scorer());
        let results = solver.solve("48656c6c6f20576f726c64", &SolverOptions::default());
        assert_eq!(results[0].plaintext, "Hello World");
    }

    #[test]
    fn test_hex_rejects_odd_length() {
        let solver = HexSolver::new(scorer());
        assert!(solver.solve("48656", &SolverOptions::default()).is_empty());
    }

    #[test]
    fn test_binary_decode() {
        let solver = BinarySolver::new(scorer());
        let results = solver.solve("01001000 01101001", &SolverOptions::default());
        assert_eq!(results[0].plaintext, "Hi");
    }

    #[test]
    fn test_binary_rejects_ragged_groups() {
        let solver = BinarySolver::new(scorer());
        assert!(solver.solve("0100100", &SolverOptions::default()).is_empty());
    }

    #[test]
    fn test_url_roundtrip() {
        let solver = UrlSolver::new(scorer());
        let enc = solver
            .encrypt("Hello World & more", &SolverOptions::default())
            .unwrap();
        assert_eq!(enc.ciphertext, "Hello%20World%20%26%20more");
        let results = solver.solve(&enc.ciphertext, &SolverOptions::default());
        assert_eq!(results[0].plaintext, "Hello World & more");
    }

    #[test]
    fn test_url_ignores_plain_text() {
        let solver = UrlSolver::new(scorer());
        assert!(solver.solve("no escapes here", &SolverOptions::default()).is_empty());
    }

    #[test]
    fn test_morse_roundtrip() {
        let solver = MorseSolver::new(scorer());
        let enc = solver.encrypt("HELLO WORLD", &SolverOptions::default()).unwrap();
        assert_eq!(
            enc.ciphertext,
            ".... . .-.. .-.. --- / .-- --- .-. .-.. -.."
        );
        let results = solver.solve(&enc.ciphertext, &SolverOptions::default());
        assert_eq!(results[0].plaintext, "hello world");
    }

    #[test]
    fn test_morse_rejects_unknown_sequence() {
        let solver = MorseSolver::new(scorer());
        assert!(solver
            .solve(".-.-.-.-.-.-.-.-.-", &SolverOptions::default())
            .is_empty());
    }
}
