//! Context-aware completion
//!
//! A completion event flows through four stages:
//!
//! 1. an [`AnalysisEngine`] produces raw [`Candidate`]s for the cursor
//! 2. [`CandidateFilter`] removes private and redundant names
//! 3. [`CandidateRanker`] orders what is left
//! 4. [`CompletionAdapter`] turns each candidate into a [`RankedCompletion`]
//!
//! [`CompletionPipeline`] wires the stages together. It never fails: engine
//! errors produce an empty result.

mod adapter;
mod analysis;
mod candidate;
mod filter;
mod ranker;

use std::sync::Arc;

use tracing::debug;

pub use adapter::{CompletionAdapter, RankedCompletion};
pub use analysis::{AnalysisEngine, ScopeAnalyzer};
pub use candidate::{Candidate, CandidateKind, CompletionRequest, StyleHint};
pub use filter::{CandidateFilter, HIERARCHY_PROBE};
pub use ranker::CandidateRanker;

use crate::runtime::SharedScope;

/// Top-level names whose call form restricts completion to parameters
pub const KNOWN_TOP_LEVEL_NAMES: &[&str] = &["Client", "Collection"];

/// Analysis, filtering, ranking and adaptation in one place
#[derive(Clone)]
pub struct CompletionPipeline {
    engine: Arc<dyn AnalysisEngine>,
    filter: CandidateFilter,
    ranker: CandidateRanker,
}

impl CompletionPipeline {
    /// Build a pipeline around an analysis engine
    ///
    /// # Arguments
    /// * `engine` - Candidate source; its internal module prefix drives ranking
    pub fn new(engine: Arc<dyn AnalysisEngine>) -> Self {
        let ranker = CandidateRanker::new(engine.internal_module_prefix());
        Self {
            engine,
            filter: CandidateFilter::new(KNOWN_TOP_LEVEL_NAMES),
            ranker,
        }
    }

    /// Pipeline over the interpreter's published scope
    pub fn for_scope(scope: SharedScope) -> Self {
        Self::new(Arc::new(ScopeAnalyzer::new(scope)))
    }

    /// Ranked completions for one request, best first
    pub fn complete(&self, request: &CompletionRequest) -> Vec<RankedCompletion> {
        let candidates = match self.engine.analyze(request) {
            Ok(candidates) => candidates,
            Err(e) => {
                debug!("No completions at ({}, {}): {}", request.row, request.column, e);
                return Vec::new();
            }
        };

        let filtered = self.filter.filter(candidates, &request.text);
        let ranked = self.ranker.rank(filtered);
        CompletionAdapter::adapt(ranked).collect()
    }
}

impl std::fmt::Debug for CompletionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPipeline")
            .field("filter", &self.filter)
            .field("ranker", &self.ranker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use crate::runtime::types::{BUILTINS_MODULE, CLIENT_MODULE, MAIN_MODULE, SHELL_MODULE};
    use crate::runtime::{ScopeSnapshot, TypeTag};

    /// Engine returning a fixed candidate list
    struct FixedEngine(Vec<Candidate>);

    impl AnalysisEngine for FixedEngine {
        fn analyze(&self, _: &CompletionRequest) -> Result<Vec<Candidate>, CompletionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingEngine;

    impl AnalysisEngine for FailingEngine {
        fn analyze(&self, _: &CompletionRequest) -> Result<Vec<Candidate>, CompletionError> {
            Err(CompletionError::Analysis("boom".to_string()))
        }
    }

    fn labels(completions: &[RankedCompletion]) -> Vec<&str> {
        completions
            .iter()
            .map(|c| c.display_label.as_str())
            .collect()
    }

    #[test]
    fn test_client_call_offers_only_parameters() {
        let engine = FixedEngine(vec![
            Candidate::new("uri", CandidateKind::Parameter, CLIENT_MODULE),
            Candidate::new("_conn", CandidateKind::Instance, MAIN_MODULE),
        ]);
        let pipeline = CompletionPipeline::new(Arc::new(engine));

        let completions = pipeline.complete(&CompletionRequest::new("Client(", 0, 7));
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].insertion_text, "uri=");
        assert_eq!(completions[0].display_suffix, "...");
        assert_eq!(completions[0].display_meta, CandidateKind::Parameter);
    }

    #[test]
    fn test_engine_failure_yields_nothing() {
        let pipeline = CompletionPipeline::new(Arc::new(FailingEngine));
        assert!(pipeline
            .complete(&CompletionRequest::new("x.", 0, 2))
            .is_empty());
    }

    #[test]
    fn test_out_of_range_cursor_yields_nothing() {
        let pipeline = CompletionPipeline::for_scope(SharedScope::new());
        assert!(pipeline
            .complete(&CompletionRequest::new("abc", 3, 0))
            .is_empty());
    }

    #[test]
    fn test_ranked_scope_completions() {
        let mut snapshot = ScopeSnapshot::new();
        snapshot.insert("print", TypeTag::Builtin(crate::runtime::Builtin::Print), BUILTINS_MODULE);
        snapshot.insert("collections", TypeTag::List, SHELL_MODULE);
        snapshot.insert("client", TypeTag::Client, SHELL_MODULE);
        snapshot.insert("Client", TypeTag::ClientClass, CLIENT_MODULE);
        snapshot.insert("_private", TypeTag::Int, MAIN_MODULE);
        let scope = SharedScope::new();
        scope.publish(snapshot);

        let pipeline = CompletionPipeline::for_scope(scope);
        let completions = pipeline.complete(&CompletionRequest::new("", 0, 0));
        assert_eq!(
            labels(&completions),
            ["client", "Client", "collections", "False", "None", "print", "True"]
        );
        assert_eq!(completions[0].display_suffix, "");
        assert_eq!(completions[5].display_suffix, "()");
    }

    #[test]
    fn test_member_completion_hides_magic() {
        let mut snapshot = ScopeSnapshot::new();
        snapshot.insert("client", TypeTag::Client, SHELL_MODULE);
        let scope = SharedScope::new();
        scope.publish(snapshot);

        let pipeline = CompletionPipeline::for_scope(scope);
        let completions = pipeline.complete(&CompletionRequest::new("client.", 0, 7));
        assert_eq!(
            labels(&completions),
            ["create_collection", "get_collection", "is_closed", "uri"]
        );
        assert!(completions.iter().all(|c| c.cursor_offset_delta == 0));
    }
}
