//! Candidate production
//!
//! [`ScopeAnalyzer`] works on the token stream of the text before the cursor,
//! so it tolerates half-typed input. It distinguishes two situations:
//!
//! - member access (`client.ge|`): the receiver chain left of the dot is
//!   resolved to a [`TypeTag`] using the published scope and the type
//!   registry, and the type's members are offered
//! - plain names (`cli|`, `Client(|`): keyword parameters of the enclosing
//!   call come first, then every visible binding, then literal keywords

use tracing::trace;

use super::candidate::{Candidate, CandidateKind, CompletionRequest, StyleHint};
use crate::error::CompletionError;
use crate::parser::{Lexer, Token, TokenKind};
use crate::runtime::types::{BUILTINS_MODULE, CLIENT_MODULE};
use crate::runtime::{Binding, Member, MemberKind, ScopeSnapshot, SharedScope, TypeTag};

/// Literal keywords offered after all bindings
const KEYWORDS: &[&str] = &["True", "False", "None"];

/// Source of raw completion candidates.
pub trait AnalysisEngine: Send + Sync {
    /// Candidates for the cursor position of `request`, unfiltered and unranked.
    fn analyze(&self, request: &CompletionRequest) -> Result<Vec<Candidate>, CompletionError>;

    /// Module prefix of names bundled with the engine itself
    fn internal_module_prefix(&self) -> &str {
        BUILTINS_MODULE
    }
}

/// Analyzer over the interpreter's published scope
#[derive(Debug, Clone, Default)]
pub struct ScopeAnalyzer {
    scope: SharedScope,
}

/// Intermediate state while walking a receiver chain
#[derive(Debug, Clone, Copy)]
enum Resolved {
    Value(TypeTag),
    /// Method looked up but not called yet
    Method(&'static Member),
}

impl Resolved {
    fn tag(self) -> TypeTag {
        match self {
            Resolved::Value(tag) => tag,
            Resolved::Method(_) => TypeTag::Method,
        }
    }
}

impl ScopeAnalyzer {
    pub fn new(scope: SharedScope) -> Self {
        Self { scope }
    }

    fn member_candidates(receiver: TypeTag, prefix: &str) -> Vec<Candidate> {
        receiver
            .members()
            .iter()
            .filter(|member| matches_prefix(member.name, prefix))
            .map(|member| {
                let kind = match member.kind {
                    MemberKind::Method => CandidateKind::Function,
                    MemberKind::Property => CandidateKind::Instance,
                };
                candidate(member.name, kind, member.module, prefix)
            })
            .collect()
    }

    fn name_candidates(scope: &ScopeSnapshot, tokens: &[Token], prefix: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        if let Some((params, module, given)) = call_context(scope, tokens) {
            candidates.extend(
                params
                    .iter()
                    .filter(|param| !given.contains(*param) && matches_prefix(param, prefix))
                    .map(|param| candidate(param, CandidateKind::Parameter, module, prefix)),
            );
        }

        candidates.extend(
            scope
                .iter()
                .filter(|binding| matches_prefix(&binding.name, prefix))
                .map(|binding| candidate(&binding.name, binding_kind(binding), binding.module, prefix)),
        );

        candidates.extend(
            KEYWORDS
                .iter()
                .filter(|keyword| matches_prefix(keyword, prefix))
                .map(|keyword| {
                    candidate(keyword, CandidateKind::Other, BUILTINS_MODULE, prefix)
                        .with_style(StyleHint::Keyword)
                }),
        );

        candidates
    }
}

impl AnalysisEngine for ScopeAnalyzer {
    fn analyze(&self, request: &CompletionRequest) -> Result<Vec<Candidate>, CompletionError> {
        let offset = cursor_offset(request)?;
        let before: String = request.text.chars().take(offset).collect();
        let mut tokens = Lexer::tokenize(&before);
        tokens.pop(); // Eof

        let mut prefix = String::new();
        if let Some(last) = tokens.last() {
            if last.span.end == offset {
                match &last.kind {
                    TokenKind::Ident(name) => prefix = name.clone(),
                    // inside a string (possibly unterminated) or number literal
                    TokenKind::Str { .. } | TokenKind::Int(_) | TokenKind::Float(_) => {
                        return Ok(Vec::new());
                    }
                    _ => {}
                }
            }
        }
        if !prefix.is_empty() {
            tokens.pop();
        }

        let scope = self.scope.snapshot();

        if matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Dot)) {
            let receiver_end = tokens.len() - 1;
            let receiver = &tokens[chain_start(&tokens[..receiver_end])..receiver_end];
            let tag = resolve_chain(&scope, receiver)
                .map(Resolved::tag)
                .ok_or_else(|| CompletionError::Analysis("cannot resolve receiver".to_string()))?;
            trace!("completing members of {} with prefix '{}'", tag.name(), prefix);
            return Ok(Self::member_candidates(tag, &prefix));
        }

        trace!("completing names with prefix '{}'", prefix);
        Ok(Self::name_candidates(&scope, &tokens, &prefix))
    }
}

/// Character offset of the cursor within the request text
fn cursor_offset(request: &CompletionRequest) -> Result<usize, CompletionError> {
    let out_of_range = || CompletionError::CursorOutOfRange {
        row: request.row,
        column: request.column,
    };

    let mut offset = 0;
    for (index, line) in request.text.split('\n').enumerate() {
        let width = line.chars().count();
        if index == request.row {
            return if request.column <= width {
                Ok(offset + request.column)
            } else {
                Err(out_of_range())
            };
        }
        offset += width + 1;
    }
    Err(out_of_range())
}

fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn candidate(name: &str, kind: CandidateKind, module: &str, prefix: &str) -> Candidate {
    Candidate::new(name, kind, module)
        .with_style(style_for(name, kind, module))
        .completing(prefix.chars().count())
}

fn style_for(name: &str, kind: CandidateKind, module: &str) -> StyleHint {
    if kind == CandidateKind::Parameter {
        StyleHint::Parameter
    } else if name.starts_with("__") {
        StyleHint::Magic
    } else if name.starts_with('_') {
        StyleHint::Private
    } else if module == BUILTINS_MODULE
        && matches!(kind, CandidateKind::Function | CandidateKind::Class)
    {
        StyleHint::Builtin
    } else {
        StyleHint::Plain
    }
}

fn binding_kind(binding: &Binding) -> CandidateKind {
    match binding.tag {
        TypeTag::Builtin(_) | TypeTag::Method => CandidateKind::Function,
        TypeTag::ClientClass | TypeTag::CollectionClass => CandidateKind::Class,
        _ => CandidateKind::Instance,
    }
}

/// Index of the first token of the receiver chain ending at `tokens.len()`
fn chain_start(tokens: &[Token]) -> usize {
    let mut start = tokens.len();
    while start > 0 {
        match &tokens[start - 1].kind {
            TokenKind::RParen | TokenKind::RBracket => match matching_open(tokens, start - 1) {
                Some(open) => start = open,
                None => break,
            },
            TokenKind::Ident(_)
            | TokenKind::Str { .. }
            | TokenKind::Int(_)
            | TokenKind::Float(_) => {
                start -= 1;
                if start > 0 && tokens[start - 1].kind == TokenKind::Dot {
                    start -= 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    start
}

fn matching_open(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for index in (0..=close).rev() {
        match tokens[index].kind {
            TokenKind::RParen | TokenKind::RBracket => depth += 1,
            TokenKind::LParen | TokenKind::LBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Resolve a receiver chain such as `client.get_collection('a').metadata`
fn resolve_chain(scope: &ScopeSnapshot, chain: &[Token]) -> Option<Resolved> {
    let first = chain.first()?;
    let mut index = 1;
    let mut current = match &first.kind {
        TokenKind::Ident(name) => match name.as_str() {
            "True" | "False" => Resolved::Value(TypeTag::Bool),
            "None" => Resolved::Value(TypeTag::NoneType),
            _ => Resolved::Value(scope.get(name)?.tag),
        },
        TokenKind::Str { .. } => Resolved::Value(TypeTag::Str),
        TokenKind::Int(_) => Resolved::Value(TypeTag::Int),
        TokenKind::Float(_) => Resolved::Value(TypeTag::Float),
        TokenKind::LBracket => {
            index = matching_close(chain, 0)? + 1;
            Resolved::Value(TypeTag::List)
        }
        _ => return None,
    };

    while index < chain.len() {
        match &chain[index].kind {
            TokenKind::Dot => {
                let TokenKind::Ident(name) = &chain.get(index + 1)?.kind else {
                    return None;
                };
                let member = current.tag().member(name)?;
                current = match member.kind {
                    MemberKind::Method => Resolved::Method(member),
                    MemberKind::Property => Resolved::Value(member.returns),
                };
                index += 2;
            }
            TokenKind::LParen => {
                current = match current {
                    Resolved::Method(member) => Resolved::Value(member.returns),
                    Resolved::Value(tag) => Resolved::Value(tag.call_result()?),
                };
                index = matching_close(chain, index)? + 1;
            }
            TokenKind::LBracket => {
                current = match current.tag() {
                    TypeTag::Json => Resolved::Value(TypeTag::Json),
                    TypeTag::Str => Resolved::Value(TypeTag::Str),
                    _ => return None,
                };
                index = matching_close(chain, index)? + 1;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Keyword parameters of the call enclosing the cursor, with the module they
/// belong to and the keywords already given.
///
/// Applies only directly after `(` or `,`.
fn call_context<'t>(
    scope: &ScopeSnapshot,
    tokens: &'t [Token],
) -> Option<(&'static [&'static str], &'static str, Vec<&'t str>)> {
    if !matches!(
        tokens.last()?.kind,
        TokenKind::LParen | TokenKind::Comma
    ) {
        return None;
    }

    let mut depth = 0usize;
    let mut open = None;
    for index in (0..tokens.len()).rev() {
        match tokens[index].kind {
            TokenKind::RParen | TokenKind::RBracket => depth += 1,
            TokenKind::LParen | TokenKind::LBracket if depth > 0 => depth -= 1,
            TokenKind::LParen => {
                open = Some(index);
                break;
            }
            TokenKind::LBracket => return None,
            _ => {}
        }
    }
    let open = open?;

    let callee = &tokens[chain_start(&tokens[..open])..open];
    let (params, module) = match resolve_chain(scope, callee)? {
        Resolved::Method(member) => (member.params, member.module),
        Resolved::Value(tag) => {
            let params = tag.call_params()?;
            let module = match tag {
                TypeTag::Builtin(builtin) => builtin.module(),
                _ => CLIENT_MODULE,
            };
            (params, module)
        }
    };

    let given = tokens[open + 1..]
        .windows(2)
        .filter_map(|pair| match (&pair[0].kind, &pair[1].kind) {
            (TokenKind::Ident(name), TokenKind::Equals) => Some(name.as_str()),
            _ => None,
        })
        .collect();

    Some((params, module, given))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::types::{MAIN_MODULE, SHELL_MODULE};
    use crate::runtime::Builtin;

    fn analyzer() -> ScopeAnalyzer {
        let mut snapshot = ScopeSnapshot::new();
        snapshot.insert("client", TypeTag::Client, SHELL_MODULE);
        snapshot.insert("collections", TypeTag::List, SHELL_MODULE);
        snapshot.insert("collection", TypeTag::Collection, SHELL_MODULE);
        for builtin in Builtin::ALL {
            snapshot.insert(builtin.name(), TypeTag::Builtin(builtin), builtin.module());
        }
        snapshot.insert("Client", TypeTag::ClientClass, CLIENT_MODULE);
        snapshot.insert("Collection", TypeTag::CollectionClass, CLIENT_MODULE);
        snapshot.insert("_conn", TypeTag::Client, MAIN_MODULE);

        let scope = SharedScope::new();
        scope.publish(snapshot);
        ScopeAnalyzer::new(scope)
    }

    fn analyze(text: &str) -> Vec<Candidate> {
        let request = CompletionRequest::at_byte_offset(text, text.len());
        analyzer().analyze(&request).unwrap()
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_member_completion_with_prefix() {
        let candidates = analyze("client.ge");
        assert_eq!(names(&candidates), ["get_collection"]);
        assert_eq!(candidates[0].kind, CandidateKind::Function);
        assert_eq!(candidates[0].complete, "t_collection");
    }

    #[test]
    fn test_member_completion_lists_all_members() {
        let candidates = analyze("client.");
        let listed = names(&candidates);
        assert!(listed.contains(&"uri"));
        assert!(listed.contains(&"__class__"));
        let magic = candidates.iter().find(|c| c.name == "__doc__").unwrap();
        assert_eq!(magic.style, StyleHint::Magic);
        assert_eq!(magic.module_name, BUILTINS_MODULE);
    }

    #[test]
    fn test_member_completion_through_calls() {
        let candidates = analyze("client.get_collection('a').me");
        assert_eq!(names(&candidates), ["metadata"]);

        let candidates = analyze("Client('file:///tmp').is_");
        assert_eq!(names(&candidates), ["is_closed"]);

        let candidates = analyze("'abc'.up");
        assert_eq!(names(&candidates), ["upper"]);
    }

    #[test]
    fn test_unresolved_receiver_is_error() {
        let request = CompletionRequest::new("nothing.x", 0, 9);
        assert!(matches!(
            analyzer().analyze(&request),
            Err(CompletionError::Analysis(_))
        ));
    }

    #[test]
    fn test_call_parameters_come_first() {
        let candidates = analyze("Client(");
        assert_eq!(candidates[0].name, "uri");
        assert_eq!(candidates[0].name_with_symbols, "uri=");
        assert_eq!(candidates[0].kind, CandidateKind::Parameter);
        assert_eq!(candidates[0].module_name, CLIENT_MODULE);
        assert!(names(&candidates).contains(&"_conn"));
        assert!(names(&candidates).contains(&"None"));
    }

    #[test]
    fn test_given_keywords_not_repeated() {
        let candidates = analyze("Client(uri='file:///tmp', workers=2, ");
        let params: Vec<&str> = candidates
            .iter()
            .filter(|c| c.kind == CandidateKind::Parameter)
            .map(|c| c.name.as_str())
            .collect();
        assert!(!params.contains(&"uri"));
        assert!(!params.contains(&"workers"));
        assert!(params.contains(&"memory_limit"));
    }

    #[test]
    fn test_method_parameters() {
        let candidates = analyze("client.create_collection(");
        assert_eq!(candidates[0].name, "name");
        assert_eq!(candidates[0].kind, CandidateKind::Parameter);
    }

    #[test]
    fn test_name_completion_case_insensitive() {
        let candidates = analyze("cl");
        assert_eq!(names(&candidates), ["client", "Client"]);
        assert_eq!(candidates[1].kind, CandidateKind::Class);
        assert_eq!(candidates[1].complete, "ient");

        let candidates = analyze("x = le");
        assert_eq!(names(&candidates), ["len"]);
        assert_eq!(candidates[0].style, StyleHint::Builtin);
    }

    #[test]
    fn test_no_candidates_inside_literals() {
        assert!(analyze("print('cli").is_empty());
        assert!(analyze("x = 12").is_empty());
    }

    #[test]
    fn test_multiline_cursor() {
        let request = CompletionRequest::new("x = 1\ncollection.na\ny", 1, 13);
        let candidates = analyzer().analyze(&request).unwrap();
        assert_eq!(names(&candidates), ["name"]);
    }

    #[test]
    fn test_cursor_out_of_range() {
        for (row, column) in [(0, 4), (1, 0)] {
            let request = CompletionRequest::new("abc", row, column);
            assert!(matches!(
                analyzer().analyze(&request),
                Err(CompletionError::CursorOutOfRange { .. })
            ));
        }
    }
}
