//! Solver framework
//!
//! One `Solver` per cipher family. `solve` never fails: malformed input
//! or a hopeless key space yields an empty result list, so a failing
//! heuristic cannot abort the pipeline. Ciphers that can also encrypt
//! advertise it with `supports_encryption` and implement `encrypt`.

pub mod classical;
pub mod encodings;
pub mod modern;

pub use classical::{
    AtbashSolver, CaesarSolver, ColumnarSolver, PlayfairSolver, RailFenceSolver, Rot13Solver,
    SubstitutionSolver, VigenereSolver,
};
pub use encodings::{
    Base32Solver, Base64Solver, BinarySolver, HexSolver, MorseSolver, UrlSolver,
};
pub use modern::{AesSolver, HashLookupSolver, RsaSolver, XorSolver};

use crate::score::{PlaintextScore, PlaintextScorer};
use crate::{CipherType, Error, Result};
use serde::Serialize;

/// Key material supplied by the caller, either text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Text(String),
    Bytes(Vec<u8>),
}

impl KeyInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyInput::Text(s) => Some(s),
            KeyInput::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyInput::Text(s) => s.as_bytes(),
            KeyInput::Bytes(b) => b,
        }
    }
}

impl From<&str> for KeyInput {
    fn from(s: &str) -> Self {
        KeyInput::Text(s.to_string())
    }
}

impl From<Vec<u8>> for KeyInput {
    fn from(b: Vec<u8>) -> Self {
        KeyInput::Bytes(b)
    }
}

/// Per-invocation solver configuration, passed through unchanged from
/// the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    pub key: Option<KeyInput>,
    pub iv: Option<Vec<u8>>,
    pub max_results: Option<usize>,
}

impl SolverOptions {
    pub fn with_key(key: impl Into<KeyInput>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }
}

/// Key reported back in a crack result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CrackKey {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for CrackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrackKey::Number(n) => write!(f, "{}", n),
            CrackKey::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One decoding stage of a layered result, outermost first.
#[derive(Debug, Clone, Serialize)]
pub struct LayerInfo {
    pub cipher_type: CipherType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<CrackKey>,
}

/// Supplementary result data: quality breakdown, cipher-specific notes,
/// and the decoding layers for recursively unwrapped results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrackDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<PlaintextScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<LayerInfo>,
}

/// A candidate plaintext produced by a solver. `confidence` starts as
/// the solver's own quality estimate; the orchestrator overwrites it
/// with the fused detection+quality value.
#[derive(Debug, Clone, Serialize)]
pub struct CrackResult {
    pub plaintext: String,
    pub cipher_type: CipherType,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<CrackKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CrackDetails>,
}

impl CrackResult {
    pub fn details_mut(&mut self) -> &mut CrackDetails {
        self.details.get_or_insert_with(CrackDetails::default)
    }

    pub fn quality(&self) -> Option<f64> {
        self.details
            .as_ref()
            .and_then(|d| d.quality.as_ref())
            .map(|q| q.total)
    }
}

/// Output of a solver's `encrypt`.
#[derive(Debug, Clone, Serialize)]
pub struct Encrypted {
    pub ciphertext: String,
    pub cipher_type: CipherType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<CrackKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Contract implemented by every cipher solver.
pub trait Solver: Send + Sync {
    fn cipher_type(&self) -> CipherType;

    /// Whether `encrypt` is implemented.
    fn supports_encryption(&self) -> bool {
        false
    }

    /// Produce candidate plaintexts. Never fails; malformed input yields
    /// an empty list.
    fn solve(&self, ciphertext: &str, options: &SolverOptions) -> Vec<CrackResult>;

    fn encrypt(&self, _plaintext: &str, _options: &SolverOptions) -> Result<Encrypted> {
        Err(Error::EncryptionUnsupported(self.cipher_type()))
    }
}

/// Build a scored result: confidence is the quality total and the
/// breakdown is attached to `details`.
pub(crate) fn scored_result(
    scorer: &PlaintextScorer,
    plaintext: String,
    cipher_type: CipherType,
    key: Option<CrackKey>,
    method: Option<String>,
) -> CrackResult {
    let quality = scorer.score(&plaintext);
    CrackResult {
        plaintext,
        cipher_type,
        confidence: quality.total,
        key,
        details: Some(CrackDetails {
            quality: Some(quality),
            method,
            layers: Vec::new(),
        }),
    }
}

/// Sort by quality descending (stable) and keep the best `limit`.
pub(crate) fn rank_and_truncate(mut results: Vec<CrackResult>, limit: usize) -> Vec<CrackResult> {
    results.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
    results
}
