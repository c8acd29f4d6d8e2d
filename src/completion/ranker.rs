//! Candidate ordering

use super::candidate::{Candidate, CandidateKind};

/// Orders candidates by a fixed precedence:
/// 1. parameters first
/// 2. candidates from the analysis engine's internal modules last
/// 3. names starting with `_` after public ones
/// 4. `name_with_symbols`, case-insensitive
///
/// The sort is stable, so fully tied candidates keep their input order.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    internal_prefix: String,
}

impl CandidateRanker {
    /// # Arguments
    /// * `internal_prefix` - Module prefix of the engine's own bundled names
    pub fn new(internal_prefix: impl Into<String>) -> Self {
        Self {
            internal_prefix: internal_prefix.into(),
        }
    }

    /// Sort key of one candidate; smaller sorts first
    pub fn sort_key(&self, candidate: &Candidate) -> (bool, bool, bool, String) {
        (
            candidate.kind != CandidateKind::Parameter,
            !self.internal_prefix.is_empty()
                && candidate.module_name.starts_with(&self.internal_prefix),
            candidate.name.starts_with('_'),
            candidate.name_with_symbols.to_lowercase(),
        )
    }

    pub fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by_cached_key(|c| self.sort_key(c));
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranker() -> CandidateRanker {
        CandidateRanker::new("builtins")
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_parameters_first_regardless_of_name() {
        let input = vec![
            Candidate::new("aaa", CandidateKind::Function, "deker"),
            Candidate::new("zzz", CandidateKind::Parameter, "deker"),
            Candidate::new("_hidden", CandidateKind::Parameter, "deker"),
        ];
        let ranked = ranker().rank(input);
        assert_eq!(names(&ranked), ["zzz", "_hidden", "aaa"]);
    }

    #[test]
    fn test_internal_module_outranks_private_name() {
        let input = vec![
            Candidate::new("zzz", CandidateKind::Parameter, "builtins"),
            Candidate::new("_hidden", CandidateKind::Parameter, "deker"),
        ];
        let ranked = ranker().rank(input);
        assert_eq!(names(&ranked), ["_hidden", "zzz"]);
    }

    #[test]
    fn test_internal_modules_after_library() {
        let input = vec![
            Candidate::new("len", CandidateKind::Function, "builtins"),
            Candidate::new("use", CandidateKind::Function, "deker_shell"),
            Candidate::new("abs", CandidateKind::Function, "builtins.math"),
        ];
        let ranked = ranker().rank(input);
        assert_eq!(names(&ranked), ["use", "abs", "len"]);
    }

    #[test]
    fn test_private_after_public() {
        let input = vec![
            Candidate::new("_options", CandidateKind::Instance, "deker"),
            Candidate::new("uri", CandidateKind::Instance, "deker"),
        ];
        assert_eq!(names(&ranker().rank(input)), ["uri", "_options"]);
    }

    #[test]
    fn test_case_insensitive_alphabetical() {
        let input = vec![
            Candidate::new("beta", CandidateKind::Instance, "__main__"),
            Candidate::new("Alpha", CandidateKind::Instance, "__main__"),
            Candidate::new("alpha2", CandidateKind::Instance, "__main__"),
            Candidate::new("Gamma", CandidateKind::Instance, "__main__"),
        ];
        assert_eq!(
            names(&ranker().rank(input)),
            ["Alpha", "alpha2", "beta", "Gamma"]
        );
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let first = Candidate::new("same", CandidateKind::Instance, "__main__");
        let mut second = first.clone();
        second.complete = "me".to_string();
        let ranked = ranker().rank(vec![first.clone(), second.clone()]);
        assert_eq!(ranked, vec![first, second]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let input = vec![
            Candidate::new("print", CandidateKind::Function, "builtins"),
            Candidate::new("name", CandidateKind::Parameter, "deker"),
            Candidate::new("collection", CandidateKind::Instance, "deker_shell"),
            Candidate::new("_x", CandidateKind::Instance, "__main__"),
            Candidate::new("Client", CandidateKind::Class, "deker"),
        ];
        let once = ranker().rank(input);
        let twice = ranker().rank(once.clone());
        assert_eq!(once, twice);
    }
}
