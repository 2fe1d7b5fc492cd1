//! cryptosift: cipher identification and plaintext recovery
//!
//! Given an opaque string, guess what produced it and get the original
//! text back — without a key where the key space can be searched, with a
//! key where it cannot.
//!
//! # Modules
//! - `detect` - Auto-detect cipher/encoding types (pattern + statistics)
//! - `analysis` - Frequency analysis, IoC, chi-squared, Kasiski, entropy
//! - `score` - English-likeness scoring for candidate plaintexts
//! - `solvers` - Per-cipher solve/encrypt implementations (18 families)
//! - `registry` - CipherType -> Solver table
//! - `cracker` - Orchestrator: detect, solve, fuse, dedup, unwrap layers
//!
//! ```
//! use cryptosift::{CipherCracker, CrackOptions};
//!
//! let cracker = CipherCracker::new();
//! let response = cracker.crack("Uryyb Jbeyq", &CrackOptions::default());
//! assert!(response.results.iter().any(|r| r.plaintext == "Hello World"));
//! ```

pub mod analysis;
pub mod cracker;
pub mod detect;
pub mod registry;
pub mod score;
pub mod solvers;

pub use cracker::{CipherCracker, CrackOptions, CrackResponse};
pub use detect::{detect, CipherDetector, DetectionCandidate};
pub use registry::SolverRegistry;
pub use score::{final_confidence, PlaintextScore, PlaintextScorer, WordFn, WordLookup};
pub use solvers::{
    CrackDetails, CrackKey, CrackResult, Encrypted, KeyInput, LayerInfo, Solver, SolverOptions,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No solver registered for cipher type '{0}'")]
    UnregisteredCipher(CipherType),

    #[error("Cipher type '{0}' does not support encryption")]
    EncryptionUnsupported(CipherType),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Input is empty")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;

/// All supported cipher/encoding families.
///
/// Serialized as the lowercase identifier (`"caesar"`, `"base64"`, ...)
/// which doubles as the join key between detector candidates, registry
/// entries, and crack results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherType {
    // Classical
    Caesar,
    Rot13,
    Atbash,
    Vigenere,
    Substitution,
    RailFence,
    Columnar,
    Playfair,

    // Encodings
    Base64,
    Base32,
    Hex,
    Binary,
    Url,
    Morse,

    // Modern
    Xor,
    Hash,
    Aes,
    Rsa,
}

impl CipherType {
    /// Stable lowercase identifier.
    pub fn id(&self) -> &'static str {
        match self {
            CipherType::Caesar => "caesar",
            CipherType::Rot13 => "rot13",
            CipherType::Atbash => "atbash",
            CipherType::Vigenere => "vigenere",
            CipherType::Substitution => "substitution",
            CipherType::RailFence => "railfence",
            CipherType::Columnar => "columnar",
            CipherType::Playfair => "playfair",
            CipherType::Base64 => "base64",
            CipherType::Base32 => "base32",
            CipherType::Hex => "hex",
            CipherType::Binary => "binary",
            CipherType::Url => "url",
            CipherType::Morse => "morse",
            CipherType::Xor => "xor",
            CipherType::Hash => "hash",
            CipherType::Aes => "aes",
            CipherType::Rsa => "rsa",
        }
    }

    /// Human-readable name for UI display.
    pub fn name(&self) -> &'static str {
        match self {
            CipherType::Caesar => "Caesar Cipher",
            CipherType::Rot13 => "ROT13 Cipher",
            CipherType::Atbash => "Atbash Cipher",
            CipherType::Vigenere => "Vigenère Cipher",
            CipherType::Substitution => "Monoalphabetic Substitution",
            CipherType::RailFence => "Rail Fence Cipher",
            CipherType::Columnar => "Columnar Transposition",
            CipherType::Playfair => "Playfair Cipher",
            CipherType::Base64 => "Base64 Encoding",
            CipherType::Base32 => "Base32 Encoding",
            CipherType::Hex => "Hexadecimal",
            CipherType::Binary => "Binary",
            CipherType::Url => "URL Percent-Encoding",
            CipherType::Morse => "Morse Code",
            CipherType::Xor => "XOR Cipher",
            CipherType::Hash => "Hash Digest Lookup",
            CipherType::Aes => "AES-256-CBC",
            CipherType::Rsa => "RSA-OAEP",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            CipherType::Caesar | CipherType::Rot13 | CipherType::Atbash
            | CipherType::Substitution => "Substitution",

            CipherType::Vigenere | CipherType::Playfair => "Polyalphabetic",

            CipherType::RailFence | CipherType::Columnar => "Transposition",

            CipherType::Base64 | CipherType::Base32 | CipherType::Hex
            | CipherType::Binary | CipherType::Url | CipherType::Morse => "Encoding",

            CipherType::Xor | CipherType::Hash | CipherType::Aes | CipherType::Rsa => "Modern",
        }
    }
}

impl std::fmt::Display for CipherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_type_ids() {
        assert_eq!(CipherType::Caesar.id(), "caesar");
        assert_eq!(CipherType::RailFence.id(), "railfence");
        assert_eq!(CipherType::Aes.id(), "aes");
    }

    #[test]
    fn test_cipher_type_serde_roundtrip() {
        let json = serde_json::to_string(&CipherType::Vigenere).unwrap();
        assert_eq!(json, "\"vigenere\"");
        let back: CipherType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CipherType::Vigenere);
    }

    #[test]
    fn test_categories() {
        assert_eq!(CipherType::Caesar.category(), "Substitution");
        assert_eq!(CipherType::Base32.category(), "Encoding");
        assert_eq!(CipherType::Rsa.category(), "Modern");
    }
}
