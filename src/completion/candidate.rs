use std::fmt;

/// Classification of a completion candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// Keyword argument of the enclosing call
    Parameter,
    Function,
    Class,
    Module,
    Instance,
    Other,
}

impl CandidateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateKind::Parameter => "param",
            CandidateKind::Function => "function",
            CandidateKind::Class => "class",
            CandidateKind::Module => "module",
            CandidateKind::Instance => "instance",
            CandidateKind::Other => "other",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display style chosen by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleHint {
    #[default]
    Plain,
    Builtin,
    Private,
    Magic,
    Keyword,
    Parameter,
}

/// One raw completion suggestion for a cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Identifier text
    pub name: String,
    /// Identifier plus decorations (`name=` for parameters)
    pub name_with_symbols: String,
    /// Text still to be typed after what is already under the cursor
    pub complete: String,
    pub kind: CandidateKind,
    /// Module the name originates from
    pub module_name: String,
    pub style: StyleHint,
}

impl Candidate {
    /// Candidate with nothing typed yet
    pub fn new(name: impl Into<String>, kind: CandidateKind, module_name: impl Into<String>) -> Self {
        let name = name.into();
        let name_with_symbols = match kind {
            CandidateKind::Parameter => format!("{name}="),
            _ => name.clone(),
        };
        Self {
            complete: name_with_symbols.clone(),
            name_with_symbols,
            name,
            kind,
            module_name: module_name.into(),
            style: StyleHint::Plain,
        }
    }

    pub fn with_style(mut self, style: StyleHint) -> Self {
        self.style = style;
        self
    }

    /// Account for `typed` characters already present before the cursor
    pub fn completing(mut self, typed: usize) -> Self {
        self.complete = self.name_with_symbols.chars().skip(typed).collect();
        self
    }
}

/// Input text and zero-based cursor position of one completion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub text: String,
    pub row: usize,
    pub column: usize,
}

impl CompletionRequest {
    pub fn new(text: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            text: text.into(),
            row,
            column,
        }
    }

    /// Request for a cursor at byte offset `pos` of `text`
    pub fn at_byte_offset(text: &str, pos: usize) -> Self {
        let before = text.get(..pos).unwrap_or(text);
        let row = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        Self::new(text, row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_symbols() {
        let candidate = Candidate::new("uri", CandidateKind::Parameter, "deker");
        assert_eq!(candidate.name_with_symbols, "uri=");
        assert_eq!(candidate.complete, "uri=");
        assert_eq!(candidate.completing(2).complete, "i=");
    }

    #[test]
    fn test_request_from_byte_offset() {
        let request = CompletionRequest::at_byte_offset("x = 1\nclient.ge", 15);
        assert_eq!((request.row, request.column), (1, 9));

        let request = CompletionRequest::at_byte_offset("é.", 3);
        assert_eq!((request.row, request.column), (0, 2));
    }
}
