//! Solidity source code tokens and the token stream.

use index_vec::IndexVec;
use solcst_interface::Span;
use std::{fmt, sync::Arc};

index_vec::define_index_type! {
    /// The index of a token in its [`TokenStream`], counting tokens on every channel.
    pub struct TokenIndex = u32;
}

macro_rules! token_kinds {
    (
        punctuation { $( $p:ident = $ptext:literal, )* }
        keywords { $( $k:ident = $ktext:literal, )* }
        classes { $( $(#[$cattr:meta])* $c:ident = $cdesc:literal, )* }
    ) => {
        /// The kind of a token.
        ///
        /// Fixed tokens (punctuation and keywords) have a single spelling, returned by
        /// [`as_str`](Self::as_str). The remaining kinds are classes of spellings.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum TokenKind {
            $(
                #[doc = concat!("`", $ptext, "`")]
                $p,
            )*
            $(
                #[doc = concat!("`", $ktext, "`")]
                $k,
            )*
            $(
                $(#[$cattr])*
                $c,
            )*
        }

        impl TokenKind {
            /// Every token kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$p,)* $(Self::$k,)* $(Self::$c,)*];

            /// The number of token kinds.
            pub const COUNT: usize = Self::ALL.len();

            /// Returns the spelling of a fixed token, or the name of a token class.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$p => $ptext,)*
                    $(Self::$k => $ktext,)*
                    $(Self::$c => $cdesc,)*
                }
            }

            /// Returns `true` if this kind has exactly one spelling.
            pub const fn is_fixed(self) -> bool {
                !matches!(self, $(Self::$c)|*)
            }

            /// Returns `true` if this is a punctuation token.
            pub const fn is_punctuation(self) -> bool {
                matches!(self, $(Self::$p)|*)
            }

            /// Returns `true` if this is a keyword, including the contextual ones.
            pub const fn is_keyword(self) -> bool {
                matches!(self, $(Self::$k)|*)
            }

            /// Looks up the keyword spelled `s`.
            pub fn keyword(s: &str) -> Option<Self> {
                match s {
                    $($ktext => Some(Self::$k),)*
                    _ => None,
                }
            }
        }
    };
}

token_kinds! {
    punctuation {
        Semi = ";",
        Comma = ",",
        Dot = ".",
        OpenParen = "(",
        CloseParen = ")",
        OpenBrace = "{",
        CloseBrace = "}",
        OpenBracket = "[",
        CloseBracket = "]",
        Question = "?",
        Colon = ":",
        ColonEq = ":=",
        EqColon = "=:",
        FatArrow = "=>",
        Eq = "=",
        EqEq = "==",
        Ne = "!=",
        Lt = "<",
        Le = "<=",
        Gt = ">",
        Ge = ">=",
        Shl = "<<",
        Shr = ">>",
        ShlEq = "<<=",
        ShrEq = ">>=",
        Bang = "!",
        Tilde = "~",
        Caret = "^",
        CaretEq = "^=",
        And = "&",
        AndAnd = "&&",
        AndEq = "&=",
        Or = "|",
        OrOr = "||",
        OrEq = "|=",
        Plus = "+",
        PlusPlus = "++",
        PlusEq = "+=",
        Minus = "-",
        MinusMinus = "--",
        MinusEq = "-=",
        Star = "*",
        StarStar = "**",
        StarEq = "*=",
        Slash = "/",
        SlashEq = "/=",
        Percent = "%",
        PercentEq = "%=",
    }
    keywords {
        Pragma = "pragma",
        Import = "import",
        As = "as",
        From = "from",
        Abstract = "abstract",
        Contract = "contract",
        Interface = "interface",
        Library = "library",
        Is = "is",
        Error = "error",
        Using = "using",
        For = "for",
        Global = "global",
        Struct = "struct",
        Modifier = "modifier",
        Function = "function",
        Returns = "returns",
        Event = "event",
        Enum = "enum",
        Mapping = "mapping",
        Memory = "memory",
        Storage = "storage",
        Calldata = "calldata",
        If = "if",
        Else = "else",
        Try = "try",
        Catch = "catch",
        While = "while",
        Unchecked = "unchecked",
        Assembly = "assembly",
        Do = "do",
        Return = "return",
        Throw = "throw",
        Emit = "emit",
        Revert = "revert",
        Var = "var",
        Bool = "bool",
        String = "string",
        Byte = "byte",
        Address = "address",
        New = "new",
        After = "after",
        Delete = "delete",
        Let = "let",
        Switch = "switch",
        Case = "case",
        Default = "default",
        Leave = "leave",
        Break = "break",
        Continue = "continue",
        Callback = "callback",
        Type = "type",
        Constructor = "constructor",
        Fallback = "fallback",
        Receive = "receive",
        Payable = "payable",
        Pure = "pure",
        View = "view",
        Constant = "constant",
        External = "external",
        Internal = "internal",
        Private = "private",
        Public = "public",
        Virtual = "virtual",
        Override = "override",
        Immutable = "immutable",
        Transient = "transient",
        Indexed = "indexed",
        Anonymous = "anonymous",
    }
    classes {
        /// `int`, `int8` .. `int256`
        Int = "Int",
        /// `uint`, `uint8` .. `uint256`
        Uint = "Uint",
        /// `bytes`, `bytes1` .. `bytes32`
        Bytes = "Bytes",
        /// `fixed`, `fixedMxN`
        Fixed = "Fixed",
        /// `ufixed`, `ufixedMxN`
        Ufixed = "Ufixed",
        /// `true` or `false`
        BooleanLiteral = "BooleanLiteral",
        /// `1`, `1_000`, `.5`, `1.5e-3`
        DecimalNumber = "DecimalNumber",
        /// `0x1f`
        HexNumber = "HexNumber",
        /// `wei`, `gwei`, `ether`, `seconds`, ..
        NumberUnit = "NumberUnit",
        /// `hex"00ff"`
        HexLiteralFragment = "HexLiteralFragment",
        /// `"abc"`, `'abc'`, `unicode"abc"`
        StringLiteralFragment = "StringLiteralFragment",
        /// `0.8.20`
        VersionLiteral = "VersionLiteral",
        /// A name that is not a keyword.
        Identifier = "Identifier",
        /// A word reserved for future use, such as `typeof` or `static`.
        ReservedKeyword = "ReservedKeyword",
        /// `// ...`, on the hidden channel.
        LineComment = "LineComment",
        /// `/* ... */`, on the hidden channel.
        BlockComment = "BlockComment",
        /// Characters that do not start any token, on the hidden channel.
        Unknown = "Unknown",
        /// The end-of-input marker.
        Eof = "EOF",
    }
}

impl fmt::Display for TokenKind {
    /// Formats the kind for use in messages: fixed tokens are quoted, classes are described.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            return write!(f, "`{}`", self.as_str());
        }
        f.write_str(match self {
            Self::Int | Self::Uint | Self::Bytes | Self::Fixed | Self::Ufixed => "elementary type",
            Self::BooleanLiteral => "boolean literal",
            Self::DecimalNumber => "number",
            Self::HexNumber => "hex number",
            Self::NumberUnit => "number unit",
            Self::HexLiteralFragment => "hex string",
            Self::StringLiteralFragment => "string literal",
            Self::VersionLiteral => "version",
            Self::Identifier => "identifier",
            Self::ReservedKeyword => "reserved keyword",
            Self::LineComment | Self::BlockComment => "comment",
            Self::Unknown => "unknown token",
            _ => "end of file",
        })
    }
}

impl TokenKind {
    /// Returns `true` for the comment kinds.
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns `true` for the elementary numeric and byte type families.
    pub const fn is_elementary_family(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Bytes | Self::Fixed | Self::Ufixed)
    }
}

/// Which channel a token is on. The parser only ever sees [`Channel::Default`] tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    #[default]
    Default,
    /// Comments and unrecognized characters.
    Hidden,
}

/// A line and column position. Lines are 1-based, columns are 0-based and counted in characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A token. The text lives in the owning [`TokenStream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub channel: Channel,
    /// Byte range in the source.
    pub span: Span,
    /// Position of the first character.
    pub start: LineCol,
    /// Position just past the last character.
    pub end: LineCol,
    /// Index in the token stream.
    pub index: TokenIndex,
}

impl Token {
    /// Returns the token's text in `src`.
    #[inline]
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.to_range()]
    }

    /// Returns `true` if this token is seen by the parser.
    #[inline]
    pub fn is_default_channel(&self) -> bool {
        self.channel == Channel::Default
    }
}

/// A problem found while splitting source text into tokens.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("token recognition error at: '{0}'")]
    UnknownCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("invalid hex string literal: {0}")]
    InvalidHexString(&'static str),
    #[error("unknown string prefix `{0}`")]
    UnknownPrefix(String),
    #[error("missing digits after `{0}`")]
    EmptyNumber(&'static str),
}

/// A lexical error, anchored to the token it was found in.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub token: TokenIndex,
}

/// The complete token sequence of one source text.
///
/// Tokens on both channels are stored in source order; the parser addresses the default channel
/// through [`default_index`](Self::default_index). The last token is always [`TokenKind::Eof`].
#[derive(Clone)]
pub struct TokenStream {
    src: Arc<str>,
    tokens: IndexVec<TokenIndex, Token>,
    default_channel: Vec<TokenIndex>,
    errors: Vec<LexError>,
}

impl fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("len", &self.tokens.len())
            .field("default_len", &self.default_channel.len())
            .field("errors", &self.errors)
            .finish()
    }
}

impl TokenStream {
    /// Creates an empty stream over `src`. Tokens are appended with [`push`](Self::push).
    pub fn new(src: impl Into<Arc<str>>) -> Self {
        Self {
            src: src.into(),
            tokens: IndexVec::new(),
            default_channel: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Appends a token.
    pub fn push(
        &mut self,
        kind: TokenKind,
        channel: Channel,
        span: Span,
        start: LineCol,
        end: LineCol,
    ) -> TokenIndex {
        let index = self.tokens.next_idx();
        self.tokens.push(Token { kind, channel, span, start, end, index });
        if channel == Channel::Default {
            self.default_channel.push(index);
        }
        index
    }

    /// Records a lexical error.
    pub fn push_error(&mut self, kind: LexErrorKind, token: TokenIndex) {
        self.errors.push(LexError { kind, token });
    }

    /// Returns the source text.
    #[inline]
    pub fn src(&self) -> &Arc<str> {
        &self.src
    }

    /// Returns the number of tokens on all channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the stream has no tokens, not even the end marker.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the token at `index`.
    #[inline]
    pub fn get(&self, index: TokenIndex) -> &Token {
        &self.tokens[index]
    }

    /// Returns all tokens.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens.raw
    }

    /// Returns the text of the token at `index`.
    #[inline]
    pub fn text(&self, index: TokenIndex) -> &str {
        self.tokens[index].text(&self.src)
    }

    /// Returns the number of default-channel tokens, including the end marker.
    #[inline]
    pub fn default_len(&self) -> usize {
        self.default_channel.len()
    }

    /// Returns the stream index of the `n`th default-channel token. Positions past the end
    /// resolve to the end marker.
    #[inline]
    pub fn default_index(&self, n: usize) -> TokenIndex {
        match self.default_channel.get(n) {
            Some(&index) => index,
            None => self.eof(),
        }
    }

    /// Returns the kind of the `n`th default-channel token.
    #[inline]
    pub fn default_kind(&self, n: usize) -> TokenKind {
        self.tokens[self.default_index(n)].kind
    }

    /// Returns the index of the end marker.
    #[inline]
    pub fn eof(&self) -> TokenIndex {
        self.tokens.last_idx()
    }

    /// Returns the hidden-channel tokens directly before `index`, in source order.
    pub fn hidden_left_of(&self, index: TokenIndex) -> &[Token] {
        let end = index.index();
        let start = self.tokens.raw[..end]
            .iter()
            .rposition(Token::is_default_channel)
            .map_or(0, |i| i + 1);
        &self.tokens.raw[start..end]
    }

    /// Returns the lexical errors.
    #[inline]
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }
}
