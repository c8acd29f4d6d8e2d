//! Noise removal for raw candidates

use super::candidate::{Candidate, CandidateKind};

/// Name of the reflective class-hierarchy accessor, hidden like private names
pub const HIERARCHY_PROBE: &str = "mro";

/// Removes private, magic and redundant candidates.
///
/// Rules, in order:
/// 1. names starting with `_` (covers `__dunder__`) or equal to
///    [`HIERARCHY_PROBE`] are dropped
/// 2. once the request text calls one of the known top-level names
///    (`Client(`), every candidate except parameters is dropped
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    known_calls: Vec<String>,
}

impl CandidateFilter {
    /// # Arguments
    /// * `known_top_level_names` - Preset objects whose call form triggers rule 2
    pub fn new<I, S>(known_top_level_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known_calls: known_top_level_names
                .into_iter()
                .map(|name| format!("{}(", name.as_ref()))
                .collect(),
        }
    }

    /// Whether `name` is implementation noise
    pub fn is_noise(name: &str) -> bool {
        name.starts_with('_') || name == HIERARCHY_PROBE
    }

    /// Whether the request text already calls a known top-level name
    pub fn references_known(&self, request_text: &str) -> bool {
        self.known_calls
            .iter()
            .any(|call| request_text.contains(call.as_str()))
    }

    /// Apply both rules; order of the survivors is unchanged.
    pub fn filter(&self, candidates: Vec<Candidate>, request_text: &str) -> Vec<Candidate> {
        let params_only = self.references_known(request_text);
        candidates
            .into_iter()
            .filter(|c| !Self::is_noise(&c.name))
            .filter(|c| !params_only || c.kind == CandidateKind::Parameter)
            .collect()
    }
}
