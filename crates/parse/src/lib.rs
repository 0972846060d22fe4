#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

pub mod lexer;
pub use lexer::{Lexer, classify, lex};

mod errors;
pub use errors::{SyntaxError, SyntaxErrorKind};

mod parser;
pub use parser::{Parser, ParserConfig};

// Convenience re-exports.
pub use solcst_cst as cst;
pub use solcst_interface as interface;

use solcst_cst::{Cst, Listener};

/// The result of parsing a file.
#[derive(Debug)]
pub struct ParseOutput {
    /// The tree. It is built even when errors were found.
    pub cst: Cst,
    /// Lexical and syntax errors, in source order.
    pub errors: Vec<SyntaxError>,
}

impl ParseOutput {
    /// Returns `true` if any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a whole source file.
pub fn parse_source(src: &str) -> ParseOutput {
    Parser::from_source(src).parse()
}

/// Parses a whole source file, notifying `listener` while the tree is built.
pub fn parse_source_with(src: &str, listener: &mut dyn Listener) -> ParseOutput {
    let mut parser = Parser::from_source(src);
    parser.add_parse_listener(listener);
    parser.parse()
}
