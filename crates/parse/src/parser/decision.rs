//! Adaptive decisions.
//!
//! Where the next token does not determine which alternative of a rule applies, the parser
//! runs a cheap recognizer for each candidate over the upcoming tokens, without building
//! anything. The first candidate that recognizes its distinguishing prefix wins. If none does,
//! the candidate that got strictly furthest is taken and the real parse reports the precise
//! error; if there is no such candidate the decision fails with a
//! [`NoViableAlternative`](crate::SyntaxErrorKind::NoViableAlternative) error.
//!
//! Every decision has a horizon: the number of tokens its recognizers may examine. Skipping
//! over a bracketed group is free, and stops at the matching bracket or at the end of input, so
//! every simulation terminates.

use super::{
    ELEMENTARY_TYPE, IDENTIFIER, PResult, Parser, STATE_MUTABILITY, STORAGE_LOCATION,
};
use solcst_cst::{TokenKind as T, TokenKind, TokenSet, TokenStream};

/// A decision point of the grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    PragmaValue,
    ImportDirective,
    UsingForObject,
    SourceUnitItem,
    ContractPart,
    RevertStatement,
    SimpleStatement,
    AssemblyItem,
    AssemblyIdentifierOrList,
}

impl Decision {
    /// The default number of tokens the recognizers may examine.
    pub(crate) const fn horizon(self) -> usize {
        match self {
            Self::PragmaValue => 64,
            Self::ImportDirective | Self::RevertStatement => 2,
            Self::UsingForObject => 1,
            Self::SourceUnitItem | Self::ContractPart => 256,
            Self::SimpleStatement => 512,
            Self::AssemblyItem => 128,
            Self::AssemblyIdentifierOrList => 3,
        }
    }
}

/// Why a simulation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stop {
    /// A token did not fit the alternative.
    Mismatch,
    /// The horizon was reached before the alternative was recognized.
    Horizon,
}

pub(crate) type Sim = Result<(), Stop>;

/// A recognizer for one alternative.
pub(crate) type Alt = fn(&mut Lookahead<'_>) -> Sim;

/// A read-only cursor over the default-channel tokens, used to simulate alternatives.
pub(crate) struct Lookahead<'a> {
    tokens: &'a TokenStream,
    pos: usize,
    used: usize,
    horizon: usize,
}

impl<'a> Lookahead<'a> {
    pub(crate) fn new(tokens: &'a TokenStream, pos: usize, horizon: usize) -> Self {
        Self { tokens, pos, used: 0, horizon }
    }

    #[inline]
    pub(crate) fn peek(&self) -> TokenKind {
        self.tokens.default_kind(self.pos)
    }

    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens.default_kind(self.pos + n)
    }

    fn advance(&mut self) -> Sim {
        if self.used >= self.horizon {
            return Err(Stop::Horizon);
        }
        if self.peek() == T::Eof {
            return Err(Stop::Mismatch);
        }
        self.used += 1;
        self.pos += 1;
        Ok(())
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<bool, Stop> {
        if self.peek() != kind {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    pub(crate) fn eat_set(&mut self, set: TokenSet) -> Result<bool, Stop> {
        if !set.contains(self.peek()) {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Sim {
        if self.eat(kind)? { Ok(()) } else { Err(Stop::Mismatch) }
    }

    pub(crate) fn expect_set(&mut self, set: TokenSet) -> Sim {
        if self.eat_set(set)? { Ok(()) } else { Err(Stop::Mismatch) }
    }

    /// Skips a bracketed group starting at the current token, which must be an opening
    /// bracket.
    pub(crate) fn skip_group(&mut self) -> Sim {
        let Some(end) = skip_balanced(self.tokens, self.pos) else {
            return Err(Stop::Mismatch);
        };
        self.pos = end;
        Ok(())
    }

    /// Skips a bracketed group if the current token is `open`.
    fn skip_group_if(&mut self, open: TokenKind) -> Sim {
        if self.peek() == open { self.skip_group() } else { Ok(()) }
    }
}

/// Returns the position just past the bracket matching the opening bracket at `pos`, or
/// `None` if the input ends first.
pub(crate) fn skip_balanced(tokens: &TokenStream, pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = pos;
    loop {
        match tokens.default_kind(pos) {
            T::OpenParen | T::OpenBracket | T::OpenBrace => depth += 1,
            T::CloseParen | T::CloseBracket | T::CloseBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            T::Eof => return None,
            _ => {}
        }
        pos += 1;
    }
}

impl Parser<'_> {
    /// Picks one of `alts` for `decision` at the current token. Returns its index.
    pub(super) fn decide(&self, decision: Decision, alts: &[Alt]) -> PResult<usize> {
        let horizon = self.config.horizon.unwrap_or(decision.horizon());
        let mut best: Option<(usize, usize)> = None;
        let mut tied = false;
        let mut furthest = self.pos;
        for (i, alt) in alts.iter().enumerate() {
            let mut la = Lookahead::new(&self.tokens, self.pos, horizon);
            match alt(&mut la) {
                Ok(()) => return Ok(i),
                Err(Stop::Mismatch) => {
                    furthest = furthest.max(la.pos);
                    if la.pos == self.pos {
                        continue;
                    }
                    match best {
                        Some((_, reach)) if reach > la.pos => {}
                        Some((_, reach)) if reach == la.pos => tied = true,
                        _ => {
                            best = Some((i, la.pos));
                            tied = false;
                        }
                    }
                }
                Err(Stop::Horizon) => {
                    debug!(?decision, horizon, alt = i, "decision exhausted its horizon");
                    furthest = furthest.max(la.pos);
                }
            }
        }
        match best {
            Some((i, _)) if !tied => Ok(i),
            _ => Err(self.no_viable_alternative(self.pos, furthest)),
        }
    }

    /// Returns `true` if the `(` at the current token opens a parenthesized expression rather
    /// than a tuple: the group is not empty and has no top-level `,`.
    pub(super) fn is_parenthesized_expression(&self) -> bool {
        if self.look_ahead(1) == T::CloseParen {
            return false;
        }
        let mut depth = 0usize;
        let mut pos = self.pos;
        loop {
            match self.tokens.default_kind(pos) {
                T::OpenParen | T::OpenBracket | T::OpenBrace => depth += 1,
                T::CloseParen | T::CloseBracket | T::CloseBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return true;
                    }
                }
                T::Comma if depth == 1 => return false,
                T::Eof => return true,
                _ => {}
            }
            pos += 1;
        }
    }

    /// Returns the position of the `(` that opens the final argument list of the call starting
    /// at the current token, recognized as the group directly followed by `;`.
    pub(super) fn final_call_paren(&self) -> Option<usize> {
        let mut pos = self.pos;
        loop {
            match self.tokens.default_kind(pos) {
                T::OpenParen => {
                    let end = skip_balanced(&self.tokens, pos)?;
                    if self.tokens.default_kind(end) == T::Semi {
                        return Some(pos);
                    }
                    pos = end;
                }
                T::OpenBracket | T::OpenBrace => pos = skip_balanced(&self.tokens, pos)?,
                T::Semi | T::CloseParen | T::CloseBracket | T::CloseBrace | T::Eof => {
                    return None;
                }
                _ => pos += 1,
            }
        }
    }
}

// Recognizers shared by several decisions.

pub(crate) fn identifier(la: &mut Lookahead<'_>) -> Sim {
    la.expect_set(IDENTIFIER)
}

/// `typeName`, with any array suffixes.
pub(crate) fn type_name(la: &mut Lookahead<'_>) -> Sim {
    match la.peek() {
        T::Address if la.peek_nth(1) == T::Payable => {
            la.advance()?;
            la.advance()?;
        }
        k if ELEMENTARY_TYPE.contains(k) => la.advance()?,
        T::Mapping => {
            la.advance()?;
            if la.peek() != T::OpenParen {
                return Err(Stop::Mismatch);
            }
            la.skip_group()?;
        }
        T::Function => {
            la.advance()?;
            if la.peek() != T::OpenParen {
                return Err(Stop::Mismatch);
            }
            la.skip_group()?;
            while la.eat_set(STATE_MUTABILITY.with(T::Internal).with(T::External))? {}
            if la.eat(T::Returns)? {
                if la.peek() != T::OpenParen {
                    return Err(Stop::Mismatch);
                }
                la.skip_group()?;
            }
        }
        k if IDENTIFIER.contains(k) => {
            la.advance()?;
            while la.peek() == T::Dot {
                la.advance()?;
                identifier(la)?;
            }
        }
        _ => return Err(Stop::Mismatch),
    }
    while la.peek() == T::OpenBracket {
        la.skip_group()?;
    }
    Ok(())
}

/// `typeName storageLocation? identifier`
pub(crate) fn variable_declaration(la: &mut Lookahead<'_>) -> Sim {
    type_name(la)?;
    la.eat_set(STORAGE_LOCATION)?;
    identifier(la)
}

// Top level and contract members.

/// `functionDefinition`, up to its body or `;`.
pub(crate) fn function_definition(la: &mut Lookahead<'_>) -> Sim {
    match la.peek() {
        T::Function => {
            la.advance()?;
            la.eat_set(IDENTIFIER)?;
        }
        T::Constructor | T::Fallback | T::Receive => la.advance()?,
        _ => return Err(Stop::Mismatch),
    }
    if la.peek() != T::OpenParen {
        return Err(Stop::Mismatch);
    }
    la.skip_group()?;
    const MODIFIERS: TokenSet = STATE_MUTABILITY.union(TokenSet::new(&[
        T::External,
        T::Public,
        T::Internal,
        T::Private,
        T::Virtual,
    ]));
    loop {
        let kind = la.peek();
        if MODIFIERS.contains(kind) {
            la.advance()?;
        } else if kind == T::Override || IDENTIFIER.contains(kind) {
            la.advance()?;
            while la.peek() == T::Dot {
                la.advance()?;
                identifier(la)?;
            }
            la.skip_group_if(T::OpenParen)?;
        } else {
            break;
        }
    }
    if la.eat(T::Returns)? {
        if la.peek() != T::OpenParen {
            return Err(Stop::Mismatch);
        }
        la.skip_group()?;
    }
    la.expect_set(TokenSet::new(&[T::Semi, T::OpenBrace]))
}

/// `stateVariableDeclaration`, up to its initializer or `;`.
pub(crate) fn state_variable_declaration(la: &mut Lookahead<'_>) -> Sim {
    const MODIFIERS: TokenSet = TokenSet::new(&[
        T::Public,
        T::Internal,
        T::Private,
        T::Constant,
        T::Transient,
        T::Immutable,
    ]);
    type_name(la)?;
    loop {
        if la.eat_set(MODIFIERS)? {
            continue;
        }
        if la.eat(T::Override)? {
            la.skip_group_if(T::OpenParen)?;
            continue;
        }
        break;
    }
    identifier(la)?;
    la.expect_set(TokenSet::new(&[T::Eq, T::Semi]))
}

/// `fileLevelConstant`, up to its `=`.
pub(crate) fn file_level_constant(la: &mut Lookahead<'_>) -> Sim {
    type_name(la)?;
    la.expect(T::Constant)?;
    identifier(la)?;
    la.expect(T::Eq)
}

/// `customErrorDefinition`, up to its parameter list.
pub(crate) fn custom_error_definition(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Error)?;
    identifier(la)?;
    la.expect(T::OpenParen)
}

// Directives.

pub(crate) fn pragma_star(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Star)?;
    if la.peek() == T::Semi { Ok(()) } else { Err(Stop::Mismatch) }
}

/// `version` followed by `;`.
pub(crate) fn pragma_version(la: &mut Lookahead<'_>) -> Sim {
    const OPERATORS: TokenSet =
        TokenSet::new(&[T::Caret, T::Tilde, T::Ge, T::Gt, T::Lt, T::Le, T::Eq]);
    loop {
        la.eat_set(OPERATORS)?;
        la.expect_set(TokenSet::new(&[T::VersionLiteral, T::DecimalNumber]))?;
        if la.peek() == T::Semi {
            return Ok(());
        }
        la.eat(T::OrOr)?;
    }
}

pub(crate) fn pragma_expression(la: &mut Lookahead<'_>) -> Sim {
    la.expect_set(super::EXPRESSION_START)
}

pub(crate) fn import_path(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Import)?;
    la.expect(T::StringLiteralFragment)
}

pub(crate) fn import_symbol(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Import)?;
    la.expect_set(IDENTIFIER.with(T::Star))
}

pub(crate) fn import_braces(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Import)?;
    la.expect(T::OpenBrace)
}

pub(crate) fn using_single(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)
}

pub(crate) fn using_braces(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::OpenBrace)
}

// Statements.

/// `revert` followed by the name of an error.
pub(crate) fn revert_statement(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::Revert)?;
    identifier(la)
}

/// Always matches: the fallback alternative.
pub(crate) fn any(_la: &mut Lookahead<'_>) -> Sim {
    Ok(())
}

/// `variableDeclarationStatement`, up to the point where it can no longer be an expression.
pub(crate) fn variable_declaration_statement(la: &mut Lookahead<'_>) -> Sim {
    match la.peek() {
        T::Var => Ok(()),
        T::OpenParen => {
            la.advance()?;
            loop {
                match la.peek() {
                    T::Comma => la.advance()?,
                    T::CloseParen => break,
                    _ => {
                        variable_declaration(la)?;
                        if !matches!(la.peek(), T::Comma | T::CloseParen) {
                            return Err(Stop::Mismatch);
                        }
                    }
                }
            }
            la.expect(T::CloseParen)?;
            la.expect_set(TokenSet::new(&[T::Eq, T::Semi]))
        }
        _ => variable_declaration(la),
    }
}

pub(crate) fn expression_statement(la: &mut Lookahead<'_>) -> Sim {
    la.expect_set(super::EXPRESSION_START)
}

// Assembly.

pub(super) const ASSEMBLY_LITERAL: TokenSet = TokenSet::new(&[
    T::StringLiteralFragment,
    T::DecimalNumber,
    T::HexNumber,
    T::HexLiteralFragment,
    T::BooleanLiteral,
]);

/// `assemblyIdentifierOrList`
pub(crate) fn assembly_identifier_or_list(la: &mut Lookahead<'_>) -> Sim {
    if la.eat(T::OpenParen)? {
        identifier(la)?;
        while la.eat(T::Comma)? {
            identifier(la)?;
        }
        return la.expect(T::CloseParen);
    }
    identifier(la)?;
    if la.eat(T::Dot)? {
        return identifier(la);
    }
    while la.eat(T::Comma)? {
        identifier(la)?;
    }
    Ok(())
}

/// `assemblyExpression`
pub(crate) fn assembly_expression(la: &mut Lookahead<'_>) -> Sim {
    let kind = la.peek();
    if ASSEMBLY_LITERAL.contains(kind) {
        la.advance()?;
        while la.peek() == kind && matches!(kind, T::StringLiteralFragment | T::HexLiteralFragment)
        {
            la.advance()?;
        }
        if la.eat(T::Colon)? {
            identifier(la)?;
        }
        return Ok(());
    }
    if matches!(kind, T::Return | T::Byte) || IDENTIFIER.contains(kind) {
        la.advance()?;
        if la.peek() == T::Dot && IDENTIFIER.contains(kind) {
            la.advance()?;
            return identifier(la);
        }
        return la.skip_group_if(T::OpenParen);
    }
    Err(Stop::Mismatch)
}

pub(crate) fn assembly_assignment(la: &mut Lookahead<'_>) -> Sim {
    assembly_identifier_or_list(la)?;
    la.expect(T::ColonEq)
}

pub(crate) fn label_definition(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)?;
    la.expect(T::Colon)
}

pub(crate) fn assembly_stack_assignment(la: &mut Lookahead<'_>) -> Sim {
    assembly_expression(la)?;
    la.expect(T::EqColon)
}

/// A lone identifier item: not continued by a call or member access.
pub(crate) fn assembly_identifier(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)?;
    if matches!(la.peek(), T::OpenParen | T::Dot) { Err(Stop::Mismatch) } else { Ok(()) }
}

// `assemblyIdentifierOrList` alternatives.

pub(crate) fn single_identifier(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)?;
    if matches!(la.peek(), T::Comma | T::Dot) { Err(Stop::Mismatch) } else { Ok(()) }
}

pub(crate) fn member(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)?;
    la.expect(T::Dot)?;
    identifier(la)
}

pub(crate) fn identifier_list(la: &mut Lookahead<'_>) -> Sim {
    identifier(la)?;
    la.expect(T::Comma)
}

pub(crate) fn parenthesized_list(la: &mut Lookahead<'_>) -> Sim {
    la.expect(T::OpenParen)
}
