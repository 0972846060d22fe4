use solcst_cst::{LexError, NodeId, Rule, TokenIndex, TokenStream};
use solcst_interface::Span;
use std::fmt;

/// The kind of a [`SyntaxError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// A token did not match what the rule required at that point.
    Recognition,
    /// None of the alternatives of a decision matched the upcoming tokens.
    NoViableAlternative,
    /// A semantic check inside the parser failed, such as the nesting limit.
    FailedPredicate,
    /// The lexer could not make sense of some characters.
    TokenRecognition,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recognition => "recognition error",
            Self::NoViableAlternative => "no viable alternative",
            Self::FailedPredicate => "failed predicate",
            Self::TokenRecognition => "token recognition error",
        })
    }
}

/// A syntax error recorded while lexing or parsing.
///
/// Errors never stop the parse; they are collected in
/// [`ParseOutput::errors`](crate::ParseOutput::errors).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {line}:{col} {message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// The rule whose routine raised the error. `None` for lexical errors.
    pub rule: Option<Rule>,
    /// The node that was being built.
    pub node: Option<NodeId>,
    /// The first token examined.
    pub start: TokenIndex,
    /// The offending token.
    pub stop: TokenIndex,
    /// Byte span of the offending token.
    pub span: Span,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 0-based column of the offending token, in characters.
    pub col: u32,
    pub message: String,
}

impl SyntaxError {
    /// Converts a lexical error.
    pub fn from_lex_error(error: &LexError, tokens: &TokenStream) -> Self {
        let token = tokens.get(error.token);
        Self {
            kind: SyntaxErrorKind::TokenRecognition,
            rule: None,
            node: None,
            start: error.token,
            stop: error.token,
            span: token.span,
            line: token.start.line,
            col: token.start.col,
            message: error.kind.to_string(),
        }
    }
}
