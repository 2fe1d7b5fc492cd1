//! Classical substitution and transposition ciphers
//!
//! Caesar, ROT13, Atbash, Vigenère, monoalphabetic substitution,
//! Rail Fence, Columnar Transposition, Playfair. Shift math operates on
//! ASCII letter ranges only; everything else passes through with case
//! preserved.

use super::{rank_and_truncate, scored_result, CrackKey, CrackResult, Encrypted, Solver, SolverOptions};
use crate::analysis::{
    chi_squared, kasiski_examination, letter_counts, mod_floor, ENGLISH_FREQUENCIES,
    ENGLISH_FREQUENCY_ORDER,
};
use crate::score::PlaintextScorer;
use crate::{CipherType, Error, Result};

const DEFAULT_RESULTS: usize = 5;

fn shift_char(c: char, shift: i32) -> char {
    if c.is_ascii_lowercase() {
        (b'a' + mod_floor(c as i32 - 'a' as i32 + shift, 26) as u8) as char
    } else if c.is_ascii_uppercase() {
        (b'A' + mod_floor(c as i32 - 'A' as i32 + shift, 26) as u8) as char
    } else {
        c
    }
}

fn shift_text(text: &str, shift: i32) -> String {
    text.chars().map(|c| shift_char(c, shift)).collect()
}

fn numeric_key(options: &SolverOptions) -> Option<i32> {
    options
        .key
        .as_ref()
        .and_then(|k| k.as_text())
        .and_then(|s| s.trim().parse::<i32>().ok())
}

fn result_limit(options: &SolverOptions) -> usize {
    options.max_results.unwrap_or(DEFAULT_RESULTS)
}

// ═══════════════════════════════════════════════════════════
// CAESAR
// ═══════════════════════════════════════════════════════════

pub struct CaesarSolver {
    scorer: PlaintextScorer,
}

impl CaesarSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for CaesarSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Caesar
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        if let Some(shift) = numeric_key(options) {
            let shift = mod_floor(shift, 26);
            return vec![scored_result(
                &self.scorer,
                shift_text(ciphertext, -shift),
                CipherType::Caesar,
                Some(CrackKey::Number(shift as i64)),
                Some(format!("shift {}", shift)),
            )];
        }

        let results = (1..26)
            .map(|shift| {
                scored_result(
                    &self.scorer,
                    shift_text(ciphertext, -shift),
                    CipherType::Caesar,
                    Some(CrackKey::Number(shift as i64)),
                    Some(format!("shift {}", shift)),
                )
            })
            .collect();
        rank_and_truncate(results, result_limit(options))
    }

    fn encrypt(&self, plaintext: &str, options: &SolverOptions) -> Result<Encrypted> {
        let shift = mod_floor(numeric_key(options).unwrap_or(3), 26);
        Ok(Encrypted {
            ciphertext: shift_text(plaintext, shift),
            cipher_type: CipherType::Caesar,
            key: Some(CrackKey::Number(shift as i64)),
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// ROT13 / ATBASH (self-inverse, no brute force needed)
// ═══════════════════════════════════════════════════════════

pub struct Rot13Solver {
    scorer: PlaintextScorer,
}

impl Rot13Solver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for Rot13Solver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Rot13
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        vec![scored_result(
            &self.scorer,
            shift_text(ciphertext, 13),
            CipherType::Rot13,
            Some(CrackKey::Number(13)),
            None,
        )]
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: shift_text(plaintext, 13),
            cipher_type: CipherType::Rot13,
            key: Some(CrackKey::Number(13)),
            details: None,
        })
    }
}

fn atbash(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                (b'z' - (c as u8 - b'a')) as char
            } else if c.is_ascii_uppercase() {
                (b'Z' - (c as u8 - b'A')) as char
            } else {
                c
            }
        })
        .collect()
}

pub struct AtbashSolver {
    scorer: PlaintextScorer,
}

impl AtbashSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for AtbashSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Atbash
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, _options: &SolverOptions) -> Vec<CrackResult> {
        vec![scored_result(
            &self.scorer,
            atbash(ciphertext),
            CipherType::Atbash,
            None,
            None,
        )]
    }

    fn encrypt(&self, plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Ok(Encrypted {
            ciphertext: atbash(plaintext),
            cipher_type: CipherType::Atbash,
            key: None,
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// VIGENÈRE
// ═══════════════════════════════════════════════════════════

fn vigenere_apply(text: &str, key: &str, decrypt: bool) -> String {
    let key_shifts: Vec<i32> = key
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| (c.to_ascii_lowercase() as u8 - b'a') as i32)
        .collect();
    if key_shifts.is_empty() {
        return text.to_string();
    }

    let mut key_idx = 0;
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let shift = key_shifts[key_idx % key_shifts.len()];
                key_idx += 1;
                shift_char(c, if decrypt { -shift } else { shift })
            } else {
                c
            }
        })
        .collect()
}

/// Recover one key letter per column by minimizing chi-squared distance
/// to English letter frequencies over all 26 shifts.
fn recover_vigenere_key(letters: &[char], key_len: usize) -> String {
    (0..key_len)
        .map(|col| {
            let column: String = letters.iter().skip(col).step_by(key_len).collect();
            let mut best_shift = 0;
            let mut best_chi = f64::INFINITY;
            for shift in 0..26 {
                let decrypted: String = column.chars().map(|c| shift_char(c, -shift)).collect();
                let counts = letter_counts(&decrypted);
                let total: u32 = counts.iter().sum();
                if total == 0 {
                    continue;
                }
                let freqs: Vec<f64> =
                    counts.iter().map(|&c| c as f64 / total as f64).collect();
                let chi = chi_squared(&freqs, &ENGLISH_FREQUENCIES);
                if chi < best_chi {
                    best_chi = chi;
                    best_shift = shift;
                }
            }
            (b'a' + best_shift as u8) as char
        })
        .collect()
}

pub struct VigenereSolver {
    scorer: PlaintextScorer,
}

impl VigenereSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for VigenereSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Vigenere
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        if let Some(key) = options.key.as_ref().and_then(|k| k.as_text()) {
            if key.chars().any(|c| c.is_ascii_alphabetic()) {
                return vec![scored_result(
                    &self.scorer,
                    vigenere_apply(ciphertext, key, true),
                    CipherType::Vigenere,
                    Some(CrackKey::Text(key.to_string())),
                    None,
                )];
            }
            return Vec::new();
        }

        let letters: Vec<char> = ciphertext
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        if letters.len() < 10 {
            return Vec::new();
        }

        let results = kasiski_examination(ciphertext)
            .into_iter()
            .filter(|&len| len >= 2 && len < letters.len())
            .map(|key_len| {
                let key = recover_vigenere_key(&letters, key_len);
                scored_result(
                    &self.scorer,
                    vigenere_apply(ciphertext, &key, true),
                    CipherType::Vigenere,
                    Some(CrackKey::Text(key)),
                    Some(format!("kasiski key length {}", key_len)),
                )
            })
            .collect();
        rank_and_truncate(results, result_limit(options))
    }

    fn encrypt(&self, plaintext: &str, options: &SolverOptions) -> Result<Encrypted> {
        let key = options
            .key
            .as_ref()
            .and_then(|k| k.as_text())
            .ok_or_else(|| Error::MissingKey("Vigenère requires an alphabetic key".into()))?;
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidKey("Key must be non-empty alphabetic".into()));
        }
        Ok(Encrypted {
            ciphertext: vigenere_apply(plaintext, key, false),
            cipher_type: CipherType::Vigenere,
            key: Some(CrackKey::Text(key.to_string())),
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// MONOALPHABETIC SUBSTITUTION
// ═══════════════════════════════════════════════════════════

pub struct SubstitutionSolver {
    scorer: PlaintextScorer,
}

impl SubstitutionSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }

    /// Build the cipher->plain mapping from a 26-letter key alphabet
    /// where key[i] is the ciphertext letter for plaintext 'a'+i.
    fn mapping_from_key(key: &str) -> Option<[u8; 26]> {
        let letters: Vec<u8> = key
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase() as u8)
            .collect();
        if letters.len() != 26 {
            return None;
        }
        let mut seen = [false; 26];
        let mut reverse = [0u8; 26];
        for (plain, &cipher) in letters.iter().enumerate() {
            let idx = (cipher - b'a') as usize;
            if seen[idx] {
                return None;
            }
            seen[idx] = true;
            reverse[idx] = b'a' + plain as u8;
        }
        Some(reverse)
    }

    /// Heuristic starting point: pair ciphertext letters by observed
    /// frequency with the canonical English order. Not guaranteed
    /// correct, and no iterative refinement is attempted.
    fn mapping_from_frequencies(ciphertext: &str) -> [u8; 26] {
        let counts = letter_counts(ciphertext);
        let mut order: Vec<usize> = (0..26).collect();
        order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));

        let mut reverse = [0u8; 26];
        for (rank, &cipher_idx) in order.iter().enumerate() {
            reverse[cipher_idx] = ENGLISH_FREQUENCY_ORDER[rank];
        }
        reverse
    }

    fn apply(text: &str, reverse: &[u8; 26]) -> String {
        text.chars()
            .map(|c| {
                if c.is_ascii_lowercase() {
                    reverse[(c as u8 - b'a') as usize] as char
                } else if c.is_ascii_uppercase() {
                    reverse[(c as u8 - b'A') as usize].to_ascii_uppercase() as char
                } else {
                    c
                }
            })
            .collect()
    }
}

impl Solver for SubstitutionSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Substitution
    }

    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        if let Some(key) = options.key.as_ref().and_then(|k| k.as_text()) {
            return match Self::mapping_from_key(key) {
                Some(reverse) => vec![scored_result(
                    &self.scorer,
                    Self::apply(ciphertext, &reverse),
                    CipherType::Substitution,
                    Some(CrackKey::Text(key.to_string())),
                    Some("key alphabet".into()),
                )],
                None => Vec::new(),
            };
        }

        if !ciphertext.chars().any(|c| c.is_ascii_alphabetic()) {
            return Vec::new();
        }

        let reverse = Self::mapping_from_frequencies(ciphertext);
        vec![scored_result(
            &self.scorer,
            Self::apply(ciphertext, &reverse),
            CipherType::Substitution,
            None,
            Some("frequency-order heuristic, unrefined".into()),
        )]
    }
}

// ═══════════════════════════════════════════════════════════
// RAIL FENCE
// ═══════════════════════════════════════════════════════════

fn rail_fence_encrypt(text: &str, rails: usize) -> String {
    let mut fence: Vec<Vec<char>> = vec![Vec::new(); rails];
    let mut rail = 0usize;
    let mut direction = 1i32;

    for c in text.chars() {
        fence[rail].push(c);
        if rails > 1 {
            rail = (rail as i32 + direction) as usize;
            if rail == 0 || rail == rails - 1 {
                direction = -direction;
            }
        }
    }

    fence.into_iter().flatten().collect()
}

fn rail_fence_decrypt(text: &str, rails: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if rails < 2 || len == 0 {
        return text.to_string();
    }

    // Mark the zig-zag positions, fill rails in reading order, then
    // re-read along the zig-zag.
    let mut fence: Vec<Vec<Option<char>>> = vec![vec![None; len]; rails];
    let mut rail = 0usize;
    let mut direction = 1i32;
    for slot in 0..len {
        fence[rail][slot] = Some('\0');
        rail = (rail as i32 + direction) as usize;
        if rail == 0 || rail == rails - 1 {
            direction = -direction;
        }
    }

    let mut source = chars.into_iter();
    for row in fence.iter_mut() {
        for cell in row.iter_mut() {
            if cell.is_some() {
                *cell = source.next();
            }
        }
    }

    let mut result = String::with_capacity(len);
    let mut rail = 0usize;
    let mut direction = 1i32;
    for slot in 0..len {
        if let Some(c) = fence[rail][slot] {
            result.push(c);
        }
        rail = (rail as i32 + direction) as usize;
        if rail == 0 || rail == rails - 1 {
            direction = -direction;
        }
    }
    result
}

pub struct RailFenceSolver {
    scorer: PlaintextScorer,
}

impl RailFenceSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for RailFenceSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::RailFence
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        let len = ciphertext.chars().count();
        if len < 3 {
            return Vec::new();
        }

        if let Some(rails) = numeric_key(options) {
            if rails < 2 || rails as usize >= len {
                return Vec::new();
            }
            return vec![scored_result(
                &self.scorer,
                rail_fence_decrypt(ciphertext, rails as usize),
                CipherType::RailFence,
                Some(CrackKey::Number(rails as i64)),
                Some(format!("{} rails", rails)),
            )];
        }

        let max_rails = 10.min(len - 1);
        let results = (2..=max_rails)
            .map(|rails| {
                scored_result(
                    &self.scorer,
                    rail_fence_decrypt(ciphertext, rails),
                    CipherType::RailFence,
                    Some(CrackKey::Number(rails as i64)),
                    Some(format!("{} rails", rails)),
                )
            })
            .collect();
        rank_and_truncate(results, result_limit(options))
    }

    fn encrypt(&self, plaintext: &str, options: &SolverOptions) -> Result<Encrypted> {
        let rails = numeric_key(options).unwrap_or(3);
        if rails < 2 {
            return Err(Error::InvalidKey("Rails must be >= 2".into()));
        }
        Ok(Encrypted {
            ciphertext: rail_fence_encrypt(plaintext, rails as usize),
            cipher_type: CipherType::RailFence,
            key: Some(CrackKey::Number(rails as i64)),
            details: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// COLUMNAR TRANSPOSITION
// ═══════════════════════════════════════════════════════════

/// Column read order derived from a keyword: columns are read in the
/// alphabetical order of the keyword's letters (stable on ties).
fn keyword_permutation(keyword: &str) -> Vec<usize> {
    let letters: Vec<char> = keyword
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let mut order: Vec<usize> = (0..letters.len()).collect();
    order.sort_by(|&a, &b| letters[a].cmp(&letters[b]).then(a.cmp(&b)));
    order
}

fn columnar_encrypt(text: &str, permutation: &[usize]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let cols = permutation.len();
    let mut out = String::with_capacity(chars.len());
    for &col in permutation {
        let mut i = col;
        while i < chars.len() {
            out.push(chars[i]);
            i += cols;
        }
    }
    out
}

/// Invert `columnar_encrypt`. Chunk `i` of the ciphertext belongs to
/// original column `permutation[i]`; that column is one longer when
/// `len % cols > permutation[i]`.
fn columnar_decrypt(text: &str, permutation: &[usize]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let cols = permutation.len();
    if cols == 0 {
        return text.to_string();
    }
    let base = chars.len() / cols;
    let extra = chars.len() % cols;

    let mut columns: Vec<Vec<char>> = vec![Vec::new(); cols];
    let mut cursor = 0usize;
    for &col in permutation {
        let col_len = base + usize::from(col < extra);
        let end = (cursor + col_len).min(chars.len());
        columns[col] = chars[cursor..end].to_vec();
        cursor = end;
    }

    let mut out = String::with_capacity(chars.len());
    for row in 0..base + usize::from(extra > 0) {
        for column in &columns {
            if let Some(&c) = column.get(row) {
                out.push(c);
            }
        }
    }
    out
}

/// All permutations of 0..n (Heap's algorithm).
fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut items: Vec<usize> = (0..n).collect();
    let mut out = Vec::new();
    fn heap(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k {
            heap(k - 1, items, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
    }
    heap(n, &mut items, &mut out);
    out
}

/// Exhaustive permutation search stays tractable up to 7 columns (7! =
/// 5040); longer keys only try identity and reverse.
const MAX_EXHAUSTIVE_COLS: usize = 7;

pub struct ColumnarSolver {
    scorer: PlaintextScorer,
}

impl ColumnarSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for ColumnarSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Columnar
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        let len = ciphertext.chars().count();
        if len < 4 {
            return Vec::new();
        }

        if let Some(keyword) = options.key.as_ref().and_then(|k| k.as_text()) {
            let permutation = keyword_permutation(keyword);
            if permutation.len() < 2 {
                return Vec::new();
            }
            return vec![scored_result(
                &self.scorer,
                columnar_decrypt(ciphertext, &permutation),
                CipherType::Columnar,
                Some(CrackKey::Text(keyword.to_string())),
                Some(format!("columns {:?}", permutation)),
            )];
        }

        let mut results = Vec::new();
        for cols in 2..=10.min(len - 1) {
            let candidates: Vec<Vec<usize>> = if cols <= MAX_EXHAUSTIVE_COLS {
                permutations(cols)
            } else {
                vec![(0..cols).collect(), (0..cols).rev().collect()]
            };
            for permutation in candidates {
                let plaintext = columnar_decrypt(ciphertext, &permutation);
                results.push(scored_result(
                    &self.scorer,
                    plaintext,
                    CipherType::Columnar,
                    None,
                    Some(format!("columns {:?}", permutation)),
                ));
            }
        }
        rank_and_truncate(results, result_limit(options))
    }

    fn encrypt(&self, plaintext: &str, options: &SolverOptions) -> Result<Encrypted> {
        let keyword = options
            .key
            .as_ref()
            .and_then(|k| k.as_text())
            .ok_or_else(|| Error::MissingKey("Columnar transposition requires a keyword".into()))?;
        let permutation = keyword_permutation(keyword);
        if permutation.len() < 2 {
            return Err(Error::InvalidKey(
                "Keyword must contain at least 2 letters".into(),
            ));
        }
        Ok(Encrypted {
            ciphertext: columnar_encrypt(plaintext, &permutation),
            cipher_type: CipherType::Columnar,
            key: Some(CrackKey::Text(keyword.to_string())),
            details: Some(format!("columns {:?}", permutation)),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// PLAYFAIR
// ═══════════════════════════════════════════════════════════

/// 5x5 grid from a keyword; J merges into I.
fn playfair_grid(keyword: &str) -> [u8; 25] {
    let mut grid = [0u8; 25];
    let mut used = [false; 26];
    used[(b'j' - b'a') as usize] = true; // J shares I's cell
    let mut pos = 0;

    let keyword_letters = keyword
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| {
            let c = c.to_ascii_lowercase() as u8;
            if c == b'j' {
                b'i'
            } else {
                c
            }
        });
    for letter in keyword_letters.chain(b'a'..=b'z') {
        let idx = (letter - b'a') as usize;
        if letter == b'j' || used[idx] {
            continue;
        }
        used[idx] = true;
        grid[pos] = letter;
        pos += 1;
        if pos == 25 {
            break;
        }
    }
    grid
}

fn grid_position(grid: &[u8; 25], letter: u8) -> (usize, usize) {
    let letter = if letter == b'j' { b'i' } else { letter };
    let idx = grid.iter().position(|&g| g == letter).unwrap_or(0);
    (idx / 5, idx % 5)
}

/// Digraph transform; `dir` is +1 to encrypt, +4 (i.e. -1 mod 5) to
/// decrypt.
fn playfair_apply(letters: &[u8], grid: &[u8; 25], dir: usize) -> String {
    let mut out = String::with_capacity(letters.len());
    for pair in letters.chunks(2) {
        let (a, b) = (pair[0], pair[1]);
        let (row_a, col_a) = grid_position(grid, a);
        let (row_b, col_b) = grid_position(grid, b);

        let (na, nb) = if row_a == row_b {
            (
                grid[row_a * 5 + (col_a + dir) % 5],
                grid[row_b * 5 + (col_b + dir) % 5],
            )
        } else if col_a == col_b {
            (
                grid[((row_a + dir) % 5) * 5 + col_a],
                grid[((row_b + dir) % 5) * 5 + col_b],
            )
        } else {
            (grid[row_a * 5 + col_b], grid[row_b * 5 + col_a])
        };
        out.push(na.to_ascii_uppercase() as char);
        out.push(nb.to_ascii_uppercase() as char);
    }
    out
}

pub struct PlayfairSolver {
    scorer: PlaintextScorer,
}

impl PlayfairSolver {
    pub fn new(scorer: PlaintextScorer) -> Self {
        Self { scorer }
    }
}

impl Solver for PlayfairSolver {
    fn cipher_type(&self) -> CipherType {
        CipherType::Playfair
    }

    fn supports_encryption(&self) -> bool {
        true
    }

    /// Playfair cannot be cracked without its keyword; the key space is
    /// not reducible here, so no key means no results.
    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult> {
        let keyword = match options.key.as_ref().and_then(|k| k.as_text()) {
            Some(k) if k.chars().any(|c| c.is_ascii_alphabetic()) => k,
            _ => return Vec::new(),
        };

        let letters: Vec<u8> = ciphertext
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase() as u8)
            .collect();
        if letters.is_empty() || letters.len() % 2 != 0 {
            return Vec::new();
        }

        let grid = playfair_grid(keyword);
        vec![scored_result(
            &self.scorer,
            playfair_apply(&letters, &grid, 4),
            CipherType::Playfair,
            Some(CrackKey::Text(keyword.to_string())),
            Some("5x5 grid, J merged into I".into()),
        )]
    }

    fn encrypt(&self, plaintext: &str, options: &SolverOptions) -> Result<Encrypted> {
        let keyword = options
            .key
            .as_ref()
            .and_then(|k| k.as_text())
            .ok_or_else(|| Error::MissingKey("Playfair requires a keyword".into()))?;
        if !keyword.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidKey("Keyword must contain letters".into()));
        }

        // Standard digraph preparation: split doubles with X, pad to an
        // even length with X.
        let mut letters: Vec<u8> = Vec::new();
        for c in plaintext.chars().filter(|c| c.is_ascii_alphabetic()) {
            let c = c.to_ascii_lowercase() as u8;
            let c = if c == b'j' { b'i' } else { c };
            if letters.len() % 2 == 1 && letters.last() == Some(&c) {
                letters.push(b'x');
            }
            letters.push(c);
        }
        if letters.len() % 2 == 1 {
            letters.push(b'x');
        }
        if letters.is_empty() {
            return Err(Error::EmptyInput);
        }

        let grid = playfair_grid(keyword);
        Ok(Encrypted {
            ciphertext: playfair_apply(&letters, &grid, 1),
            cipher_type: CipherType::Playfair,
            key: Some(CrackKey::Text(keyword.to_string())),
            details: Some("5x5 grid, J merged into I".into()),
        })
    }
}
