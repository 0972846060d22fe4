//! Low-level Solidity lexer.
//!
//! Splits source text into [`RawToken`]s: a kind and a length, with no interpretation of the
//! text. Keywords, literal validation and positions are handled by the [`Lexer`](super::Lexer).

use solcst_cst::TokenKind;
use std::str::Chars;

pub mod token;
use token::{RawLiteralKind, RawToken, RawTokenKind};

#[cfg(test)]
mod tests;

/// Returns `true` if `c` is considered a whitespace.
#[inline]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0C}')
}

/// Returns `true` if the given character is valid at the start of a Solidity identifier.
#[inline]
pub const fn is_id_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '$')
}

/// Returns `true` if the given character is valid in a Solidity identifier.
#[inline]
pub const fn is_id_continue(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$')
}

/// Returns `true` if the given string is a valid Solidity identifier.
///
/// An identifier has to start with a letter, a dollar-sign or an underscore and may
/// additionally contain numbers after the first symbol.
pub const fn is_ident(s: &str) -> bool {
    let [first, rest @ ..] = s.as_bytes() else {
        return false;
    };

    if !is_id_start(*first as char) {
        return false;
    }

    let mut i = 0;
    while i < rest.len() {
        if !is_id_continue(rest[i] as char) {
            return false;
        }
        i += 1;
    }

    true
}

const EOF_CHAR: char = '\0';

/// Peekable iterator over a char sequence.
///
/// Next characters can be peeked via `first` method,
/// and position can be shifted forward via `bump` method.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    len_remaining: usize,
    /// Iterator over chars. Slightly faster than a &str.
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor over the given input string slice.
    pub fn new(input: &'a str) -> Self {
        Cursor { len_remaining: input.len(), chars: input.chars() }
    }

    /// Parses a token from the input string.
    pub fn advance_token(&mut self) -> RawToken {
        let Some(first_char) = self.bump() else {
            return RawToken::EOF;
        };

        let token_kind = match first_char {
            // Slash, comment or block comment.
            '/' => match self.first() {
                '/' => self.line_comment(),
                '*' => self.block_comment(),
                _ => RawTokenKind::Punct(self.punct_eq(TokenKind::Slash, TokenKind::SlashEq)),
            },

            // Whitespace sequence.
            c if is_whitespace(c) => self.whitespace(),

            // Identifier (this should be checked after other variant that can start as identifier).
            c if is_id_start(c) => self.ident_or_prefixed_literal(c),

            // Numeric literal.
            c @ '0'..='9' => RawTokenKind::Literal { kind: self.number(c) },
            '.' if self.first().is_ascii_digit() => {
                self.eat_decimal_digits();
                self.eat_exponent();
                RawTokenKind::Literal { kind: RawLiteralKind::Rational }
            }

            // String literal.
            c @ ('\'' | '"') => {
                let terminated = self.eat_string(c);
                RawTokenKind::Literal { kind: RawLiteralKind::Str { terminated } }
            }

            c => match self.punct(c) {
                Some(kind) => RawTokenKind::Punct(kind),
                None => RawTokenKind::Unknown,
            },
        };
        let res = RawToken::new(token_kind, self.pos_within_token());
        self.reset_pos_within_token();
        res
    }

    /// Matches the longest punctuation token starting with `c`, which has already been eaten.
    fn punct(&mut self, c: char) -> Option<TokenKind> {
        use TokenKind::*;

        let kind = match c {
            ';' => Semi,
            ',' => Comma,
            '.' => Dot,
            '(' => OpenParen,
            ')' => CloseParen,
            '{' => OpenBrace,
            '}' => CloseBrace,
            '[' => OpenBracket,
            ']' => CloseBracket,
            '?' => Question,
            '~' => Tilde,
            ':' => self.punct_eq(Colon, ColonEq),
            '!' => self.punct_eq(Bang, Ne),
            '^' => self.punct_eq(Caret, CaretEq),
            '%' => self.punct_eq(Percent, PercentEq),
            '=' => match self.first() {
                '>' => self.bump_with(FatArrow),
                '=' => self.bump_with(EqEq),
                ':' => self.bump_with(EqColon),
                _ => Eq,
            },
            '<' => match self.first() {
                '<' => {
                    self.bump();
                    self.punct_eq(Shl, ShlEq)
                }
                '=' => self.bump_with(Le),
                _ => Lt,
            },
            '>' => match self.first() {
                '>' => {
                    self.bump();
                    self.punct_eq(Shr, ShrEq)
                }
                '=' => self.bump_with(Ge),
                _ => Gt,
            },
            '&' => match self.first() {
                '&' => self.bump_with(AndAnd),
                '=' => self.bump_with(AndEq),
                _ => And,
            },
            '|' => match self.first() {
                '|' => self.bump_with(OrOr),
                '=' => self.bump_with(OrEq),
                _ => Or,
            },
            '+' => match self.first() {
                '+' => self.bump_with(PlusPlus),
                '=' => self.bump_with(PlusEq),
                _ => Plus,
            },
            '-' => match self.first() {
                '-' => self.bump_with(MinusMinus),
                '=' => self.bump_with(MinusEq),
                _ => Minus,
            },
            '*' => match self.first() {
                '*' => self.bump_with(StarStar),
                '=' => self.bump_with(StarEq),
                _ => Star,
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Returns `with_eq` if the next character is `=`, eating it.
    fn punct_eq(&mut self, single: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.first() == '=' { self.bump_with(with_eq) } else { single }
    }

    fn bump_with<T>(&mut self, value: T) -> T {
        self.bump();
        value
    }

    fn line_comment(&mut self) -> RawTokenKind {
        debug_assert!(self.first() == '/');
        self.bump();
        self.eat_until(b'\n');
        RawTokenKind::LineComment
    }

    fn block_comment(&mut self) -> RawTokenKind {
        debug_assert!(self.first() == '*');
        self.bump();

        let mut terminated = false;
        while let Some(c) = self.bump() {
            if c == '*' && self.first() == '/' {
                terminated = true;
                self.bump();
                break;
            }
        }

        RawTokenKind::BlockComment { terminated }
    }

    fn whitespace(&mut self) -> RawTokenKind {
        self.eat_while(is_whitespace);
        RawTokenKind::Whitespace
    }

    fn ident_or_prefixed_literal(&mut self, first_char: char) -> RawTokenKind {
        // Check for potential prefixed literals.
        match first_char {
            // `hex"01234"`
            'h' => {
                if let Some(terminated) = self.maybe_string_prefix("hex") {
                    return RawTokenKind::Literal { kind: RawLiteralKind::HexStr { terminated } };
                }
            }
            // `unicode"abc"`
            'u' => {
                if let Some(terminated) = self.maybe_string_prefix("unicode") {
                    let kind = RawLiteralKind::UnicodeStr { terminated };
                    return RawTokenKind::Literal { kind };
                }
            }
            _ => {}
        }

        // Start is already eaten, eat the rest of identifier.
        self.eat_while(is_id_continue);
        // Known prefixes must have been handled earlier.
        // So if we see a prefix here, it is definitely an unknown prefix.
        match self.first() {
            '"' | '\'' => RawTokenKind::UnknownPrefix,
            _ => RawTokenKind::Ident,
        }
    }

    fn number(&mut self, first_digit: char) -> RawLiteralKind {
        if first_digit == '0' && matches!(self.first(), 'x' | 'X') {
            self.bump();
            let has_digits = self.eat_hexadecimal_digits();
            return RawLiteralKind::Int { hex: true, empty_int: !has_digits };
        }

        self.eat_decimal_digits();
        let mut kind = RawLiteralKind::Int { hex: false, empty_int: false };

        // Don't be greedy if this is actually an integer literal followed
        // by member access (`12.foo`).
        if self.first() == '.' && self.second().is_ascii_digit() {
            self.bump();
            self.eat_decimal_digits();
            kind = RawLiteralKind::Rational;

            // A third component makes it a version: `0.8.20`.
            if self.first() == '.' && self.second().is_ascii_digit() {
                self.bump();
                self.eat_while(|c| c.is_ascii_digit());
                return RawLiteralKind::Version;
            }
        }

        if self.eat_exponent() {
            kind = RawLiteralKind::Rational;
        }
        kind
    }

    fn maybe_string_prefix(&mut self, prefix: &str) -> Option<bool> {
        let prefix = &prefix[1..];
        let s = self.as_str();
        if s.starts_with(prefix) {
            let skip = prefix.len();
            let Some(&quote @ (b'"' | b'\'')) = s.as_bytes().get(skip) else { return None };
            self.ignore_bytes(skip);
            self.bump();
            Some(self.eat_string(quote as char))
        } else {
            None
        }
    }

    /// Eats a string until the given quote character. Returns `true` if the string was terminated.
    ///
    /// A line break ends an unterminated string and is not part of it; an escaped one is.
    fn eat_string(&mut self, quote: char) -> bool {
        debug_assert!(quote == '\'' || quote == '"', "Invalid quote character: {quote:?}");
        loop {
            match self.first() {
                c if c == quote => {
                    self.bump();
                    return true;
                }
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' | '\r' => return false,
                _ if self.is_eof() => return false,
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Eats characters for a decimal number. Returns `true` if any digits were encountered.
    fn eat_decimal_digits(&mut self) -> bool {
        let mut has_digits = false;
        loop {
            match self.first() {
                '_' if self.second().is_ascii_digit() => {
                    self.bump();
                }
                '0'..='9' => {
                    has_digits = true;
                    self.bump();
                }
                _ => break,
            }
        }
        has_digits
    }

    /// Eats characters for a hexadecimal number. Returns `true` if any digits were encountered.
    fn eat_hexadecimal_digits(&mut self) -> bool {
        let mut has_digits = false;
        loop {
            match self.first() {
                '_' if self.second().is_ascii_hexdigit() => {
                    self.bump();
                }
                '0'..='9' | 'a'..='f' | 'A'..='F' => {
                    has_digits = true;
                    self.bump();
                }
                _ => break,
            }
        }
        has_digits
    }

    /// Eats an exponent if one follows. Returns `true` if it did.
    ///
    /// `e` only starts an exponent when digits follow, optionally after a `-`; otherwise it
    /// starts the next token.
    fn eat_exponent(&mut self) -> bool {
        if !matches!(self.first(), 'e' | 'E') {
            return false;
        }
        let rest = self.as_str().as_bytes();
        let digits_at = if rest.get(1) == Some(&b'-') { 2 } else { 1 };
        if !rest.get(digits_at).is_some_and(u8::is_ascii_digit) {
            return false;
        }
        self.ignore_bytes(digits_at);
        self.eat_decimal_digits();
        true
    }

    /// Returns the remaining input as a string slice.
    pub fn as_str(&self) -> &'a str {
        self.chars.as_str()
    }

    /// Peeks the next symbol from the input stream without consuming it.
    /// If requested position doesn't exist, `EOF_CHAR` is returned.
    /// However, getting `EOF_CHAR` doesn't always mean actual end of file,
    /// it should be checked with `is_eof` method.
    fn first(&self) -> char {
        // `.next()` optimizes better than `.nth(0)`
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    /// Peeks the second symbol from the input stream without consuming it.
    fn second(&self) -> char {
        // `.next()` optimizes better than `.nth(1)`
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    /// Checks if there is nothing more to consume.
    fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Returns amount of already consumed symbols.
    fn pos_within_token(&self) -> u32 {
        (self.len_remaining - self.chars.as_str().len()) as u32
    }

    /// Resets the number of bytes consumed to 0.
    fn reset_pos_within_token(&mut self) {
        self.len_remaining = self.chars.as_str().len();
    }

    /// Moves to the next character.
    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Advances `n` bytes.
    fn ignore_bytes(&mut self, n: usize) {
        self.chars = self.as_str()[n..].chars();
    }

    /// Eats symbols while predicate returns true or until the end of file is reached.
    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while predicate(self.first()) && !self.is_eof() {
            self.bump();
        }
    }

    /// Eats symbols until the given byte is encountered or until the end of file is reached.
    fn eat_until(&mut self, byte: u8) {
        self.chars = match memchr::memchr(byte, self.as_str().as_bytes()) {
            Some(index) => self.as_str()[index..].chars(),
            None => "".chars(),
        };
    }
}

impl Iterator for Cursor<'_> {
    type Item = RawToken;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.advance_token();
        if token.kind == RawTokenKind::Eof { None } else { Some(token) }
    }
}

impl std::iter::FusedIterator for Cursor<'_> {}
