//! Orchestrator
//!
//! Runs detection, dispatches the matching solvers, fuses detection
//! confidence with plaintext quality, deduplicates, and recursively
//! unwraps layered encodings (base64-of-ROT13 and friends).

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::detect::{CipherDetector, DetectionCandidate};
use crate::registry::SolverRegistry;
use crate::score::{final_confidence, PlaintextScorer};
use crate::solvers::{CrackResult, Encrypted, KeyInput, LayerInfo, Solver, SolverOptions};
use crate::{CipherType, Error, Result};

/// Knobs for a single `crack` call.
#[derive(Debug, Clone)]
pub struct CrackOptions {
    pub key: Option<KeyInput>,
    pub iv: Option<Vec<u8>>,
    pub max_results: usize,
    /// How many nested encoding layers to unwrap.
    pub max_depth: usize,
    pub min_confidence: f64,
}

impl Default for CrackOptions {
    fn default() -> Self {
        Self {
            key: None,
            iv: None,
            max_results: 10,
            max_depth: 3,
            min_confidence: 0.01,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrackResponse {
    pub results: Vec<CrackResult>,
    pub candidates: Vec<DetectionCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Results at or below this confidence are assumed to possibly be an
/// intermediate layer and are fed back through detection.
const RECURSE_BELOW: f64 = 0.8;
/// How many of the top results to try unwrapping.
const RECURSE_TOP: usize = 3;
/// Result cap for inner crack calls.
const RECURSE_RESULTS: usize = 3;
/// Shorter intermediates are too ambiguous to recurse on.
const RECURSE_MIN_LEN: usize = 4;

pub struct CipherCracker {
    registry: RwLock<SolverRegistry>,
    detector: CipherDetector,
}

impl Default for CipherCracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherCracker {
    pub fn new() -> Self {
        Self::with_scorer(PlaintextScorer::default())
    }

    pub fn with_scorer(scorer: PlaintextScorer) -> Self {
        Self {
            registry: RwLock::new(SolverRegistry::with_builtins(&scorer)),
            detector: CipherDetector::new(),
        }
    }

    /// Registers (or replaces) a solver.
    pub fn register_solver(&self, solver: Arc<dyn Solver>) {
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .register(solver);
    }

    pub fn cipher_types(&self) -> Vec<CipherType> {
        self.read_registry().cipher_types()
    }

    pub fn encryptable_cipher_types(&self) -> Vec<CipherType> {
        self.read_registry().encryptable_types()
    }

    /// Detect plausible cipher types, run their solvers, and return
    /// deduplicated candidate plaintexts ranked by fused confidence.
    pub fn crack(&self, input: &str, options: &CrackOptions) -> CrackResponse {
        let mut warnings = Vec::new();
        let trimmed = input.trim();
        if !trimmed.is_empty() && trimmed.chars().count() < 20 {
            warnings.push(
                "input is shorter than 20 characters; results may be unreliable".to_string(),
            );
        }
        let candidates = self.detector.detect(input);
        if candidates.is_empty() {
            warnings.push("no cipher type detected for input".to_string());
            return CrackResponse {
                results: Vec::new(),
                candidates,
                warnings,
            };
        }

        let results = self.crack_at_depth(input, options, &candidates, 0, &mut warnings);
        tracing::info!(
            input_len = input.len(),
            results = results.len(),
            warnings = warnings.len(),
            "crack complete"
        );
        CrackResponse {
            results,
            candidates,
            warnings,
        }
    }

    /// Decrypt with a known cipher type. Results come back ranked by
    /// plaintext quality.
    pub fn decrypt(
        &self,
        input: &str,
        cipher_type: CipherType,
        options: &CrackOptions,
    ) -> Result<Vec<CrackResult>> {
        let solver = self
            .read_registry()
            .get(cipher_type)
            .ok_or(Error::UnregisteredCipher(cipher_type))?;
        Ok(solver.solve(input, &solver_options(options)))
    }

    pub fn encrypt(
        &self,
        plaintext: &str,
        cipher_type: CipherType,
        options: &CrackOptions,
    ) -> Result<Encrypted> {
        if plaintext.is_empty() {
            return Err(Error::EmptyInput);
        }
        let solver = self
            .read_registry()
            .get(cipher_type)
            .ok_or(Error::UnregisteredCipher(cipher_type))?;
        if !solver.supports_encryption() {
            return Err(Error::EncryptionUnsupported(cipher_type));
        }
        solver.encrypt(plaintext, &solver_options(options))
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, SolverRegistry> {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn crack_at_depth(
        &self,
        input: &str,
        options: &CrackOptions,
        candidates: &[DetectionCandidate],
        depth: usize,
        warnings: &mut Vec<String>,
    ) -> Vec<CrackResult> {
        let mut results = Vec::new();
        {
            let registry = self.read_registry();
            for candidate in candidates {
                let solver = match registry.get(candidate.cipher_type) {
                    Some(solver) => solver,
                    None => {
                        warnings.push(format!(
                            "no solver registered for detected type '{}'",
                            candidate.cipher_type
                        ));
                        continue;
                    }
                };
                for mut result in solver.solve(input, &solver_options(options)) {
                    if result.plaintext.trim().is_empty() {
                        continue;
                    }
                    // Fuse the detector's prior with the plaintext
                    // quality the solver measured.
                    result.confidence = final_confidence(candidate.confidence, result.confidence);
                    if result.confidence >= options.min_confidence {
                        results.push(result);
                    }
                }
            }
        }

        sort_by_confidence(&mut results);
        dedup_by_plaintext(&mut results);

        if depth + 1 < options.max_depth {
            let layered = self.unwrap_layers(&results, options, depth, warnings);
            results.extend(layered);
            sort_by_confidence(&mut results);
            dedup_by_plaintext(&mut results);
        }

        results.truncate(options.max_results);
        results
    }

    /// Feed promising intermediate plaintexts back through detection;
    /// an inner result that scores better than its parent becomes a
    /// layered result annotated with the full decode chain.
    fn unwrap_layers(
        &self,
        results: &[CrackResult],
        options: &CrackOptions,
        depth: usize,
        warnings: &mut Vec<String>,
    ) -> Vec<CrackResult> {
        let inner_options = CrackOptions {
            key: None,
            iv: None,
            max_results: RECURSE_RESULTS,
            ..options.clone()
        };

        let mut layered = Vec::new();
        for parent in results
            .iter()
            .take(RECURSE_TOP)
            .filter(|r| r.confidence <= RECURSE_BELOW && r.plaintext.trim().len() >= RECURSE_MIN_LEN)
        {
            let inner_candidates = self.detector.detect(&parent.plaintext);
            if inner_candidates.is_empty() {
                continue;
            }
            let inner_results = self.crack_at_depth(
                &parent.plaintext,
                &inner_options,
                &inner_candidates,
                depth + 1,
                warnings,
            );
            for inner in inner_results {
                if inner.confidence <= parent.confidence || inner.plaintext == parent.plaintext {
                    continue;
                }
                tracing::debug!(
                    outer = %parent.cipher_type,
                    inner = %inner.cipher_type,
                    depth,
                    "unwrapped layer"
                );
                layered.push(layered_result(parent, inner));
            }
        }
        layered
    }
}

fn solver_options(options: &CrackOptions) -> SolverOptions {
    SolverOptions {
        key: options.key.clone(),
        iv: options.iv.clone(),
        max_results: Some(options.max_results),
    }
}

/// Combine a parent result and the inner result recovered from its
/// plaintext. Layers run outermost first and always cover every stage.
fn layered_result(parent: &CrackResult, inner: CrackResult) -> CrackResult {
    let mut layers = vec![LayerInfo {
        cipher_type: parent.cipher_type,
        key: parent.key.clone(),
    }];
    let inner_layers = inner
        .details
        .as_ref()
        .map(|d| d.layers.clone())
        .unwrap_or_default();
    if inner_layers.is_empty() {
        layers.push(LayerInfo {
            cipher_type: inner.cipher_type,
            key: inner.key.clone(),
        });
    } else {
        layers.extend(inner_layers);
    }

    let mut result = CrackResult {
        plaintext: inner.plaintext,
        cipher_type: parent.cipher_type,
        confidence: inner.confidence,
        key: parent.key.clone(),
        details: inner.details,
    };
    result.details_mut().layers = layers;
    result
}

fn sort_by_confidence(results: &mut [CrackResult]) {
    results.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// First (best) result wins for identical trimmed plaintexts.
fn dedup_by_plaintext(results: &mut Vec<CrackResult>) {
    let mut seen = std::collections::HashSet::new();
    results.retain(|r| seen.insert(r.plaintext.trim().to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::CrackKey;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    fn cracker() -> CipherCracker {
        CipherCracker::new()
    }

    #[test]
    fn test_crack_rot13() {
        let response = cracker().crack("Uryyb Jbeyq", &CrackOptions::default());
        let hit = response
            .results
            .iter()
            .find(|r| r.plaintext == "Hello World")
            .expect("should recover Hello World");
        assert!(hit.confidence > 0.3);
    }

    #[test]
    fn test_crack_caesar_reports_shift() {
        let response = cracker().crack("Khoor Zruog", &CrackOptions::default());
        let hit = response
            .results
            .iter()
            .find(|r| r.plaintext == "Hello World")
            .expect("should recover Hello World");
        assert_eq!(hit.key, Some(CrackKey::Number(3)));
    }

    #[test]
    fn test_crack_base64() {
        let response = cracker().crack("SGVsbG8gV29ybGQ=", &CrackOptions::default());
        assert_eq!(response.results[0].plaintext, "Hello World");
        assert_eq!(response.results[0].cipher_type, CipherType::Base64);
    }

    #[test]
    fn test_crack_short_input_warns_but_still_solves() {
        let response = cracker().crack("Khoor", &CrackOptions::default());
        assert!(!response.results.is_empty());
        assert!(response
            .warnings
            .iter()
            .any(|w| w.contains("shorter than 20")));
    }

    #[test]
    fn test_crack_long_input_has_no_length_warning() {
        let response = cracker().crack(
            "gur dhvpx oebja sbk whzcf bire gur ynml qbt",
            &CrackOptions::default(),
        );
        assert!(!response.warnings.iter().any(|w| w.contains("shorter")));
    }

    #[test]
    fn test_crack_empty_input_warns() {
        let response = cracker().crack("   ", &CrackOptions::default());
        assert!(response.results.is_empty());
        assert!(!response.warnings.is_empty());
    }

    #[test]
    fn test_crack_unwraps_base64_of_rot13() {
        let outer = BASE64.encode("Uryyb Jbeyq");
        let response = cracker().crack(&outer, &CrackOptions::default());
        let hit = response
            .results
            .iter()
            .find(|r| r.plaintext == "Hello World")
            .expect("should unwrap both layers");
        let layers = &hit.details.as_ref().unwrap().layers;
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].cipher_type, CipherType::Base64);
        assert_eq!(layers[1].cipher_type, CipherType::Rot13);
    }

    #[test]
    fn test_crack_results_deduplicated() {
        // ROT13 and Caesar shift 13 produce the same plaintext; only
        // one copy may survive.
        let response = cracker().crack("Uryyb Jbeyq", &CrackOptions::default());
        let count = response
            .results
            .iter()
            .filter(|r| r.plaintext == "Hello World")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_crack_respects_max_results() {
        let options = CrackOptions {
            max_results: 2,
            ..Default::default()
        };
        let response = cracker().crack("Khoor Zruog", &options);
        assert!(response.results.len() <= 2);
    }

    #[test]
    fn test_crack_min_confidence_filters() {
        let options = CrackOptions {
            min_confidence: 0.99,
            ..Default::default()
        };
        let response = cracker().crack("Khoor Zruog", &options);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_decrypt_known_type() {
        let results = cracker()
            .decrypt("Uryyb Jbeyq", CipherType::Rot13, &CrackOptions::default())
            .unwrap();
        assert_eq!(results[0].plaintext, "Hello World");
    }

    #[test]
    fn test_decrypt_unregistered_type() {
        let cracker = CipherCracker::with_scorer(PlaintextScorer::default());
        {
            let mut registry = cracker.registry.write().unwrap();
            *registry = SolverRegistry::new();
        }
        assert!(matches!(
            cracker.decrypt("abc", CipherType::Playfair, &CrackOptions::default()),
            Err(Error::UnregisteredCipher(CipherType::Playfair))
        ));
    }

    #[test]
    fn test_encrypt_roundtrip_via_cracker() {
        let cracker = cracker();
        let options = CrackOptions {
            key: Some(KeyInput::Text("5".into())),
            ..Default::default()
        };
        let enc = cracker
            .encrypt("Hello World", CipherType::Caesar, &options)
            .unwrap();
        let results = cracker
            .decrypt(&enc.ciphertext, CipherType::Caesar, &options)
            .unwrap();
        assert_eq!(results[0].plaintext, "Hello World");
    }

    #[test]
    fn test_encrypt_empty_input() {
        assert!(matches!(
            cracker().encrypt("", CipherType::Caesar, &CrackOptions::default()),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_encrypt_unsupported_type() {
        assert!(matches!(
            cracker().encrypt("hello", CipherType::Hash, &CrackOptions::default()),
            Err(Error::EncryptionUnsupported(CipherType::Hash))
        ));
    }

    #[test]
    fn test_encryptable_types() {
        let types = cracker().encryptable_cipher_types();
        assert!(types.contains(&CipherType::Caesar));
        assert!(types.contains(&CipherType::Base64));
        assert!(!types.contains(&CipherType::Hash));
    }

    #[test]
    fn test_register_custom_solver() {
        struct Fixed;
        impl Solver for Fixed {
            fn cipher_type(&self) -> CipherType {
                CipherType::Atbash
            }
            fn solve(&self, _: &str, _: &SolverOptions) -> Vec<CrackResult> {
                vec![CrackResult {
                    plaintext: "fixed".into(),
                    cipher_type: CipherType::Atbash,
                    confidence: 1.0,
                    key: None,
                    details: None,
                }]
            }
        }

        let cracker = cracker();
        cracker.register_solver(Arc::new(Fixed));
        let results = cracker
            .decrypt("anything", CipherType::Atbash, &CrackOptions::default())
            .unwrap();
        assert_eq!(results[0].plaintext, "fixed");
    }
}
