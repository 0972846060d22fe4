//! Raw, low-level tokens. Created using [`Cursor`](super::Cursor).

use solcst_cst::TokenKind;

/// A raw token: the kind and the length in bytes, nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawToken {
    /// The kind of token.
    pub kind: RawTokenKind,
    /// The length of the token in bytes.
    pub len: u32,
}

impl RawToken {
    /// The [`EOF`](RawTokenKind::Eof) token with length 0.
    pub const EOF: Self = Self::new(RawTokenKind::Eof, 0);

    /// Creates a new token.
    #[inline]
    pub const fn new(kind: RawTokenKind, len: u32) -> Self {
        Self { kind, len }
    }
}

/// Common lexeme types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawTokenKind {
    /// `// comment`
    LineComment,

    /// `/* block comment */`
    BlockComment { terminated: bool },

    /// Any whitespace character sequence.
    Whitespace,

    /// `ident` or `contract`
    ///
    /// At this step, keywords and type names are also considered identifiers.
    Ident,

    /// Examples: `123`, `0x123`, `1.5e3`, `0.8.20`, `"abc"`, `hex"00"`.
    ///
    /// See [`RawLiteralKind`] for more details.
    Literal { kind: RawLiteralKind },

    /// A fixed punctuation token, matched longest-first.
    Punct(TokenKind),

    /// An identifier directly followed by a quote, such as `abc"x"`.
    ///
    /// Only `hex` and `unicode` are valid string prefixes; they are lexed as literals.
    UnknownPrefix,

    /// Unknown token, not expected by the lexer, e.g. `#`.
    Unknown,

    /// End of input.
    Eof,
}

/// The literal types supported by the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawLiteralKind {
    /// `123`, `0x123`; empty_int: `0x`
    Int { hex: bool, empty_int: bool },
    /// `123.321`, `.5`, `1e-3`
    Rational,
    /// `0.8.20`
    Version,
    /// `"abc"`, `'abc'`
    Str { terminated: bool },
    /// `unicode"abc"`
    UnicodeStr { terminated: bool },
    /// `hex"abc"`
    HexStr { terminated: bool },
}

impl RawLiteralKind {
    /// Returns `true` if this is a quoted literal that is missing its closing quote.
    pub const fn is_unterminated(self) -> bool {
        matches!(
            self,
            Self::Str { terminated: false }
                | Self::UnicodeStr { terminated: false }
                | Self::HexStr { terminated: false }
        )
    }
}
