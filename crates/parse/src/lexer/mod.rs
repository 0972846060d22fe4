//! Solidity lexer.

use solcst_cst::{Channel, LexErrorKind, LineCol, TokenKind, TokenStream};
use solcst_interface::Span;
use std::sync::Arc;

mod cursor;
use cursor::token::{RawLiteralKind, RawTokenKind};
pub use cursor::{Cursor, is_id_continue, is_id_start, is_ident, is_whitespace, token};

/// Solidity lexer.
///
/// Converts a [`Cursor`]'s output from simple [`RawTokenKind`]s into [`LexedToken`]s, by
/// classifying words, validating literals and tracking line and column positions. Whitespace
/// is dropped; comments and unknown characters are kept on the hidden channel.
///
/// The last token produced is always a zero-width [`TokenKind::Eof`].
pub struct Lexer<'src> {
    /// Source text to tokenize.
    src: &'src str,

    /// Cursor for getting lexer tokens.
    cursor: Cursor<'src>,

    /// Byte offset of the next token.
    pos: usize,

    /// Line and column of the next token.
    line_col: LineCol,

    /// Whether the end marker has been produced.
    done: bool,
}

/// A token produced by the [`Lexer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexedToken {
    pub kind: TokenKind,
    pub channel: Channel,
    pub span: Span,
    pub start: LineCol,
    pub end: LineCol,
    /// The problem found in this token, if any.
    pub error: Option<LexErrorKind>,
}

impl<'src> Lexer<'src> {
    /// Creates a new `Lexer` for the given source string.
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            cursor: Cursor::new(src),
            pos: 0,
            line_col: LineCol { line: 1, col: 0 },
            done: false,
        }
    }

    /// Returns the next token, advancing the lexer.
    pub fn next_token(&mut self) -> LexedToken {
        loop {
            let raw = self.cursor.advance_token();
            let start = self.pos;
            let end = start + raw.len as usize;
            let text = &self.src[start..end];
            let start_lc = self.line_col;
            self.advance_line_col(text);
            self.pos = end;

            let (kind, channel, error) = match raw.kind {
                RawTokenKind::Whitespace => continue,
                RawTokenKind::LineComment => (TokenKind::LineComment, Channel::Hidden, None),
                RawTokenKind::BlockComment { terminated } => {
                    let error = (!terminated).then_some(LexErrorKind::UnterminatedBlockComment);
                    (TokenKind::BlockComment, Channel::Hidden, error)
                }
                RawTokenKind::Ident => (classify(text), Channel::Default, None),
                RawTokenKind::UnknownPrefix => {
                    let error = LexErrorKind::UnknownPrefix(text.to_string());
                    (classify(text), Channel::Default, Some(error))
                }
                RawTokenKind::Literal { kind } => {
                    let (kind, error) = cook_literal(kind, text);
                    (kind, Channel::Default, error)
                }
                RawTokenKind::Punct(kind) => (kind, Channel::Default, None),
                RawTokenKind::Unknown => {
                    let c = text.chars().next().unwrap_or_default();
                    (TokenKind::Unknown, Channel::Hidden, Some(LexErrorKind::UnknownCharacter(c)))
                }
                RawTokenKind::Eof => {
                    self.done = true;
                    (TokenKind::Eof, Channel::Default, None)
                }
            };
            return LexedToken {
                kind,
                channel,
                span: Span::from_range(start..end),
                start: start_lc,
                end: self.line_col,
                error,
            };
        }
    }

    /// Moves the line and column past `text`.
    fn advance_line_col(&mut self, text: &str) {
        match memchr::memrchr(b'\n', text.as_bytes()) {
            Some(last) => {
                let lines = memchr::memchr_iter(b'\n', text.as_bytes()).count() as u32;
                self.line_col.line += lines;
                self.line_col.col = text[last + 1..].chars().count() as u32;
            }
            None => self.line_col.col += text.chars().count() as u32,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexedToken;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { None } else { Some(self.next_token()) }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Splits `src` into a [`TokenStream`].
///
/// Lexing never fails: problems are recorded in [`TokenStream::errors`] and the offending
/// characters stay in the stream.
#[instrument(name = "lex", level = "debug", skip_all)]
pub fn lex(src: impl Into<Arc<str>>) -> TokenStream {
    let src: Arc<str> = src.into();
    let mut stream = TokenStream::new(Arc::clone(&src));
    for token in Lexer::new(&src) {
        let index = stream.push(token.kind, token.channel, token.span, token.start, token.end);
        if let Some(error) = token.error {
            stream.push_error(error, index);
        }
    }
    trace!(
        src.len = src.len(),
        tokens.len = stream.len(),
        tokens.default = stream.default_len(),
        errors = stream.errors().len(),
        "lexed"
    );
    stream
}

/// Classifies a word: keywords first, then type families, literals, units and reserved words.
pub fn classify(word: &str) -> TokenKind {
    if let Some(keyword) = TokenKind::keyword(word) {
        return keyword;
    }
    if let Some(family) = elementary_family(word) {
        return family;
    }
    match word {
        "true" | "false" => TokenKind::BooleanLiteral,
        "wei" | "gwei" | "szabo" | "finney" | "ether" | "seconds" | "minutes" | "hours" | "days"
        | "weeks" | "years" => TokenKind::NumberUnit,
        "final" | "in" | "inline" | "match" | "null" | "of" | "relocatable" | "static"
        | "typeof" => TokenKind::ReservedKeyword,
        _ => TokenKind::Identifier,
    }
}

/// `int`/`uint` with an optional size of 8..=256 in steps of 8, `bytes` with an optional size
/// of 1..=32, and `fixed`/`ufixed` with an optional `MxN` suffix.
fn elementary_family(word: &str) -> Option<TokenKind> {
    let size = |rest: &str| -> Option<u16> {
        if rest.starts_with('0') {
            return None;
        }
        rest.parse().ok()
    };
    if let Some(rest) = word.strip_prefix("uint") {
        return (rest.is_empty() || size(rest).is_some_and(|n| n % 8 == 0 && (8..=256).contains(&n)))
            .then_some(TokenKind::Uint);
    }
    if let Some(rest) = word.strip_prefix("int") {
        return (rest.is_empty() || size(rest).is_some_and(|n| n % 8 == 0 && (8..=256).contains(&n)))
            .then_some(TokenKind::Int);
    }
    if let Some(rest) = word.strip_prefix("bytes") {
        return (rest.is_empty() || size(rest).is_some_and(|n| (1..=32).contains(&n)))
            .then_some(TokenKind::Bytes);
    }
    let fixed_suffix = |rest: &str| {
        rest.is_empty()
            || rest.split_once('x').is_some_and(|(m, n)| {
                !m.is_empty()
                    && !n.is_empty()
                    && m.bytes().all(|b| b.is_ascii_digit())
                    && n.bytes().all(|b| b.is_ascii_digit())
            })
    };
    if let Some(rest) = word.strip_prefix("ufixed") {
        return fixed_suffix(rest).then_some(TokenKind::Ufixed);
    }
    if let Some(rest) = word.strip_prefix("fixed") {
        return fixed_suffix(rest).then_some(TokenKind::Fixed);
    }
    None
}

fn cook_literal(kind: RawLiteralKind, text: &str) -> (TokenKind, Option<LexErrorKind>) {
    let unterminated = kind.is_unterminated().then_some(LexErrorKind::UnterminatedString);
    match kind {
        RawLiteralKind::Int { hex: true, empty_int } => {
            (TokenKind::HexNumber, empty_int.then_some(LexErrorKind::EmptyNumber("0x")))
        }
        RawLiteralKind::Int { hex: false, .. } | RawLiteralKind::Rational => {
            (TokenKind::DecimalNumber, None)
        }
        RawLiteralKind::Version => (TokenKind::VersionLiteral, None),
        RawLiteralKind::Str { .. } | RawLiteralKind::UnicodeStr { .. } => {
            (TokenKind::StringLiteralFragment, unterminated)
        }
        RawLiteralKind::HexStr { terminated } => {
            let error = if terminated {
                // `hex` and the quotes.
                let content = &text[4..text.len() - 1];
                validate_hex(content).err().map(LexErrorKind::InvalidHexString)
            } else {
                unterminated
            };
            (TokenKind::HexLiteralFragment, error)
        }
    }
}

/// Checks the contents of a hex string: pairs of hex digits, optionally separated by single
/// underscores.
fn validate_hex(content: &str) -> Result<(), &'static str> {
    const UNDERSCORE: &str = "`_` is only allowed between pairs of hex digits";

    let mut odd = false;
    let mut prev_underscore = true;
    for c in content.chars() {
        match c {
            '_' if odd || prev_underscore => return Err(UNDERSCORE),
            '_' => prev_underscore = true,
            c if c.is_ascii_hexdigit() => {
                odd = !odd;
                prev_underscore = false;
            }
            _ => return Err("expected hex digits"),
        }
    }
    if odd {
        Err("odd number of hex digits")
    } else if prev_underscore && !content.is_empty() {
        Err(UNDERSCORE)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind as T;
    use expect_test::expect;
    use std::fmt::Write;

    fn default_kinds(src: &str) -> Vec<TokenKind> {
        let stream = lex(src);
        (0..stream.default_len()).map(|i| stream.default_kind(i)).collect()
    }

    #[test]
    fn classification() {
        assert_eq!(
            default_kinds("contract uint uint8 uint7 int256 int264 bytes bytes32 bytes33"),
            [
                T::Contract,
                T::Uint,
                T::Uint,
                T::Identifier,
                T::Int,
                T::Identifier,
                T::Bytes,
                T::Bytes,
                T::Identifier,
                T::Eof
            ]
        );
        assert_eq!(
            default_kinds("fixed ufixed128x18 fixed8 true false ether years typeof foo"),
            [
                T::Fixed,
                T::Ufixed,
                T::Identifier,
                T::BooleanLiteral,
                T::BooleanLiteral,
                T::NumberUnit,
                T::NumberUnit,
                T::ReservedKeyword,
                T::Identifier,
                T::Eof
            ]
        );
        assert_eq!(classify("uint08"), T::Identifier);
        assert_eq!(classify("payable"), T::Payable);
        assert_eq!(classify("leave"), T::Leave);
    }

    #[test]
    fn channels_and_positions() {
        let stream = lex("a // c\n  /* x\ny */ b");
        let tokens = stream.tokens();
        let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.channel)).collect();
        assert_eq!(kinds, [
            (T::Identifier, Channel::Default),
            (T::LineComment, Channel::Hidden),
            (T::BlockComment, Channel::Hidden),
            (T::Identifier, Channel::Default),
            (T::Eof, Channel::Default),
        ]);
        assert_eq!(tokens[0].start, LineCol { line: 1, col: 0 });
        assert_eq!(tokens[1].start, LineCol { line: 1, col: 2 });
        assert_eq!(tokens[2].start, LineCol { line: 2, col: 2 });
        assert_eq!(tokens[2].end, LineCol { line: 3, col: 4 });
        assert_eq!(tokens[3].start, LineCol { line: 3, col: 5 });
        assert_eq!(stream.text(tokens[3].index), "b");
        let eof = &tokens[4];
        assert!(eof.span.is_empty());
        assert_eq!(eof.span.lo().to_usize(), stream.src().len());
        assert_eq!(stream.hidden_left_of(tokens[3].index).len(), 2);
    }

    #[test]
    fn token_dump() {
        let stream = lex("pragma solidity ^0.8.20; // x");
        let mut actual = String::new();
        for token in stream.tokens() {
            let text = stream.text(token.index);
            writeln!(actual, "{:?} {:?} {text:?}", token.kind, token.channel).unwrap();
        }
        expect![[r#"
            Pragma Default "pragma"
            Identifier Default "solidity"
            Caret Default "^"
            VersionLiteral Default "0.8.20"
            Semi Default ";"
            LineComment Hidden "// x"
            Eof Default ""
        "#]]
        .assert_eq(&actual);
    }

    #[test]
    fn column_counts_characters() {
        let stream = lex("\"é\" x");
        let x = stream.get(stream.default_index(1));
        assert_eq!(x.start, LineCol { line: 1, col: 4 });
    }

    #[test]
    fn literals() {
        assert_eq!(
            default_kinds("1 0x1f 1.5e3 0.8.20 'a' unicode\"b\" hex\"00_ff\" 0.8"),
            [
                T::DecimalNumber,
                T::HexNumber,
                T::DecimalNumber,
                T::VersionLiteral,
                T::StringLiteralFragment,
                T::StringLiteralFragment,
                T::HexLiteralFragment,
                T::DecimalNumber,
                T::Eof
            ]
        );
        assert!(lex("hex\"00_ff\" hex\"\"").errors().is_empty());
    }

    #[test]
    fn errors() {
        let errors = |src: &str| -> Vec<LexErrorKind> {
            lex(src).errors().iter().map(|e| e.kind.clone()).collect()
        };
        assert_eq!(errors("a # b"), [LexErrorKind::UnknownCharacter('#')]);
        assert_eq!(errors("\"abc"), [LexErrorKind::UnterminatedString]);
        assert_eq!(errors("/* abc"), [LexErrorKind::UnterminatedBlockComment]);
        assert_eq!(errors("hex\"abc\""), [LexErrorKind::InvalidHexString("odd number of hex digits")]);
        assert_eq!(errors("hex\"zz\""), [LexErrorKind::InvalidHexString("expected hex digits")]);
        assert_eq!(errors("hex\"_00\"").len(), 1);
        assert_eq!(errors("hex\"0_0\"").len(), 1);
        assert_eq!(errors("foo\"x\""), [LexErrorKind::UnknownPrefix("foo".to_string())]);
        assert_eq!(errors("0x"), [LexErrorKind::EmptyNumber("0x")]);

        // The offending character stays in the stream, hidden from the parser.
        let stream = lex("a # b");
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.default_len(), 3);
        let unknown = stream.get(stream.errors()[0].token);
        assert_eq!(unknown.kind, T::Unknown);
        assert_eq!(unknown.channel, Channel::Hidden);
    }
}
