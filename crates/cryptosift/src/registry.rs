//! Solver registry
//!
//! Maps each [`CipherType`] to the solver that handles it. Registering
//! a solver for a type that already has one replaces the old entry, so
//! callers can override any builtin.

use std::collections::HashMap;
use std::sync::Arc;

use crate::score::PlaintextScorer;
use crate::solvers::{
    AesSolver, AtbashSolver, Base32Solver, Base64Solver, BinarySolver, CaesarSolver,
    ColumnarSolver, HashLookupSolver, HexSolver, MorseSolver, PlayfairSolver, RailFenceSolver,
    Rot13Solver, RsaSolver, Solver, SubstitutionSolver, UrlSolver, VigenereSolver, XorSolver,
};
use crate::CipherType;

#[derive(Default)]
pub struct SolverRegistry {
    solvers: HashMap<CipherType, Arc<dyn Solver>>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every builtin solver, all sharing one
    /// scorer.
    pub fn with_builtins(scorer: &PlaintextScorer) -> Self {
        let mut registry = Self::new();
        let builtins: Vec<Arc<dyn Solver>> = vec![
            Arc::new(CaesarSolver::new(scorer.clone())),
            Arc::new(Rot13Solver::new(scorer.clone())),
            Arc::new(AtbashSolver::new(scorer.clone())),
            Arc::new(VigenereSolver::new(scorer.clone())),
            Arc::new(SubstitutionSolver::new(scorer.clone())),
            Arc::new(RailFenceSolver::new(scorer.clone())),
            Arc::new(ColumnarSolver::new(scorer.clone())),
            Arc::new(PlayfairSolver::new(scorer.clone())),
            Arc::new(Base64Solver::new(scorer.clone())),
            Arc::new(Base32Solver::new(scorer.clone())),
            Arc::new(HexSolver::new(scorer.clone())),
            Arc::new(BinarySolver::new(scorer.clone())),
            Arc::new(UrlSolver::new(scorer.clone())),
            Arc::new(MorseSolver::new(scorer.clone())),
            Arc::new(XorSolver::new(scorer.clone())),
            Arc::new(HashLookupSolver::new(scorer.clone())),
            Arc::new(AesSolver::new(scorer.clone())),
            Arc::new(RsaSolver::new(scorer.clone())),
        ];
        for solver in builtins {
            registry.register(solver);
        }
        registry
    }

    pub fn register(&mut self, solver: Arc<dyn Solver>) {
        let cipher_type = solver.cipher_type();
        if self.solvers.insert(cipher_type, solver).is_some() {
            tracing::debug!(%cipher_type, "replaced existing solver");
        }
    }

    pub fn get(&self, cipher_type: CipherType) -> Option<Arc<dyn Solver>> {
        self.solvers.get(&cipher_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    /// Registered types, sorted for stable output.
    pub fn cipher_types(&self) -> Vec<CipherType> {
        let mut types: Vec<CipherType> = self.solvers.keys().copied().collect();
        types.sort();
        types
    }

    /// Registered types whose solver can also encrypt, sorted.
    pub fn encryptable_types(&self) -> Vec<CipherType> {
        let mut types: Vec<CipherType> = self
            .solvers
            .iter()
            .filter(|(_, solver)| solver.supports_encryption())
            .map(|(&t, _)| t)
            .collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::{CrackResult, SolverOptions};

    #[test]
    fn test_builtins_cover_all_types() {
        let registry = SolverRegistry::with_builtins(&PlaintextScorer::default());
        assert_eq!(registry.len(), 18);
        for cipher_type in [
            CipherType::Caesar,
            CipherType::Vigenere,
            CipherType::Base64,
            CipherType::Hash,
            CipherType::Aes,
            CipherType::Rsa,
        ] {
            assert!(registry.get(cipher_type).is_some());
        }
    }

    #[test]
    fn test_encryptable_excludes_lookup_only() {
        let registry = SolverRegistry::with_builtins(&PlaintextScorer::default());
        let encryptable = registry.encryptable_types();
        assert!(encryptable.contains(&CipherType::Caesar));
        assert!(encryptable.contains(&CipherType::Base64));
        assert!(!encryptable.contains(&CipherType::Hash));
        assert!(!encryptable.contains(&CipherType::Rsa));
        assert!(!encryptable.contains(&CipherType::Substitution));
    }

    #[test]
    fn test_register_replaces() {
        struct Stub;
        impl Solver for Stub {
            fn cipher_type(&self) -> CipherType {
                CipherType::Caesar
            }
            fn solve(&self, _: &str, _: &SolverOptions) -> Vec<CrackResult> {
                Vec::new()
            }
        }

        let mut registry = SolverRegistry::with_builtins(&PlaintextScorer::default());
        let before = registry.len();
        registry.register(Arc::new(Stub));
        assert_eq!(registry.len(), before);
        assert!(registry
            .get(CipherType::Caesar)
            .map(|s| s.solve("khoor", &SolverOptions::default()).is_empty())
            .unwrap_or(false));
    }
}
