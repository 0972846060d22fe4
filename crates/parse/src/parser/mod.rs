use crate::{ParseOutput, SyntaxError, SyntaxErrorKind, lexer::lex};
use solcst_cst::{
    CstBuilder, Listener, NodeId, Rule, TokenKind, TokenSet, TokenStream, WalkEvent,
    listener::{dispatch_enter, dispatch_exit},
};
use std::fmt::{self, Write};

mod decision;
mod expr;
mod item;
mod lit;
mod recovery;
mod stmt;
mod ty;
mod yul;

use TokenKind as T;

/// Tokens accepted by the `identifier` rule: plain identifiers and the contextual keywords that
/// may be used as names.
pub(crate) const IDENTIFIER: TokenSet = TokenSet::new(&[
    T::From,
    T::Calldata,
    T::Receive,
    T::Callback,
    T::Revert,
    T::Error,
    T::Address,
    T::Global,
    T::Constructor,
    T::Payable,
    T::Leave,
    T::Identifier,
]);

/// Tokens that start an `elementaryTypeName`.
pub(crate) const ELEMENTARY_TYPE: TokenSet = TokenSet::new(&[
    T::Address,
    T::Bool,
    T::String,
    T::Var,
    T::Int,
    T::Uint,
    T::Byte,
    T::Bytes,
    T::Fixed,
    T::Ufixed,
]);

/// Tokens that start a `typeName`.
pub(crate) const TYPE_NAME_START: TokenSet =
    ELEMENTARY_TYPE.union(IDENTIFIER).with(T::Mapping).with(T::Function);

pub(crate) const STORAGE_LOCATION: TokenSet =
    TokenSet::new(&[T::Memory, T::Storage, T::Calldata]);

pub(crate) const STATE_MUTABILITY: TokenSet =
    TokenSet::new(&[T::Pure, T::Constant, T::View, T::Payable]);

/// Tokens that start an `expression`.
pub(crate) const EXPRESSION_START: TokenSet = TokenSet::new(&[
    T::New,
    T::OpenParen,
    T::OpenBracket,
    T::PlusPlus,
    T::MinusMinus,
    T::Plus,
    T::Minus,
    T::After,
    T::Delete,
    T::Bang,
    T::Tilde,
    T::BooleanLiteral,
    T::DecimalNumber,
    T::HexNumber,
    T::HexLiteralFragment,
    T::StringLiteralFragment,
    T::Type,
])
.union(TYPE_NAME_START);

/// Parser tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested rules. Going deeper raises a
    /// [`FailedPredicate`](SyntaxErrorKind::FailedPredicate) error.
    pub max_depth: usize,
    /// Overrides the lookahead horizon of every decision.
    pub horizon: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_depth: 256, horizon: None }
    }
}

/// An error raised inside a rule routine.
///
/// It is reported and recovered from at the boundary of the rule that raised it.
#[derive(Debug)]
pub(crate) struct PErr {
    kind: SyntaxErrorKind,
    message: String,
    /// Position of the first token examined.
    start: usize,
    /// Position of the offending token.
    stop: usize,
}

/// Parser result type.
pub(crate) type PResult<T = ()> = Result<T, PErr>;

/// Solidity parser.
///
/// Every grammar rule has a `parse_*` method that builds one node of the tree and returns its
/// id. Rule methods never fail: syntax errors are recorded and the parser resynchronizes, so a
/// tree is always produced.
pub struct Parser<'l> {
    /// The token stream.
    tokens: TokenStream,
    /// Position of the current token among the default-channel tokens.
    pos: usize,
    builder: CstBuilder,
    /// Parse listeners, notified in registration order on enter and in reverse order on exit.
    listeners: Vec<&'l mut dyn Listener>,
    errors: Vec<SyntaxError>,
    /// The rules being parsed, innermost last.
    rules: Vec<Rule>,
    /// Tokens that were checked for at the current position. Cleared after each `bump` call.
    expected: TokenSet,
    /// Set after an error is reported and cleared when a token is matched. Errors raised
    /// meanwhile are not reported.
    recovering: bool,
    /// Position and rule depth of the last recovery.
    last_error: Option<(usize, usize)>,
    /// Nesting level of left-recursive rules whose listener events are held back until the
    /// outermost one is complete.
    deferred: usize,
    /// Position at which expressions stop growing to the right.
    expression_limit: Option<usize>,
    config: ParserConfig,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("pos", &self.pos)
            .field("token", &self.token())
            .field("rules", &self.rules)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl<'l> Parser<'l> {
    /// Creates a new parser.
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            listeners: Vec::new(),
            errors: Vec::new(),
            rules: Vec::new(),
            expected: TokenSet::EMPTY,
            recovering: false,
            last_error: None,
            deferred: 0,
            expression_limit: None,
            config: ParserConfig::default(),
        }
    }

    /// Creates a new parser from a source code string.
    pub fn from_source(src: &str) -> Self {
        Self::new(lex(src))
    }

    /// Sets the parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a listener that is notified while the tree is built.
    pub fn add_parse_listener(&mut self, listener: &'l mut dyn Listener) {
        self.listeners.push(listener);
    }

    /// Removes all parse listeners.
    pub fn remove_parse_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Returns the token stream.
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Parses a whole source unit.
    pub fn parse(self) -> ParseOutput {
        self.parse_with(Self::parse_source_unit)
    }

    /// Runs the rule method `f` and finishes the tree with its node as the root.
    #[instrument(name = "parse", level = "debug", skip_all)]
    pub fn parse_with(mut self, f: impl FnOnce(&mut Self) -> NodeId) -> ParseOutput {
        f(&mut self);
        let Self { tokens, builder, errors: syntax_errors, .. } = self;
        let mut errors: Vec<SyntaxError> =
            tokens.errors().iter().map(|e| SyntaxError::from_lex_error(e, &tokens)).collect();
        errors.extend(syntax_errors);
        errors.sort_by_key(|e| e.stop);
        let cst = builder.finish(tokens);
        debug!(nodes = cst.len(), errors = errors.len(), "parsed");
        ParseOutput { cst, errors }
    }

    // Rule boundaries.

    /// Runs `f` as the body of a `rule` node. An error returned by `f` is reported, the parser
    /// resynchronizes, and the node is closed with what was parsed so far.
    pub(crate) fn with_rule(&mut self, rule: Rule, f: impl FnOnce(&mut Self) -> PResult) -> NodeId {
        let start = self.open_rule(rule);
        let res = self.check_depth().and_then(|()| f(self));
        if let Err(err) = res {
            self.recover_from(err);
        }
        self.close_rule(start)
    }

    /// Runs `f` with listener events held back, then replays the events of the node it
    /// returns. Used by the left-recursive rules, whose nodes are re-parented as they grow.
    pub(crate) fn deferring(&mut self, f: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        self.deferred += 1;
        let id = f(self);
        self.deferred -= 1;
        if self.deferred == 0 {
            self.replay(id);
        }
        id
    }

    /// Opens a `rule` node at the current token. Returns the start position.
    fn open_rule(&mut self, rule: Rule) -> usize {
        let start = self.pos;
        let id = self.builder.open(rule, self.tokens.default_index(start));
        self.rules.push(rule);
        self.fire_enter(id);
        start
    }

    /// Closes the current node and pops its rule.
    fn close_rule(&mut self, start: usize) -> NodeId {
        let id = self.close_node(start);
        self.rules.pop();
        id
    }

    /// Closes the current node, which started at position `start`, keeping its rule on the
    /// stack so the node can be wrapped.
    fn close_node(&mut self, start: usize) -> NodeId {
        let stop = (self.pos > start).then(|| self.tokens.default_index(self.pos - 1));
        let id = self.builder.close(stop);
        self.fire_exit(id);
        id
    }

    /// Wraps the closed node `inner` in a new node of the same rule.
    fn wrap(&mut self, inner: NodeId) -> NodeId {
        let rule = self.builder.view(&self.tokens).node(inner).rule();
        let id = self.builder.wrap(inner, rule);
        self.fire_enter(id);
        id
    }

    fn check_depth(&self) -> PResult {
        if self.rules.len() <= self.config.max_depth {
            return Ok(());
        }
        let rule = self.rules.last().map_or("", |r| r.name());
        Err(self.error_here(
            SyntaxErrorKind::FailedPredicate,
            format!("rule {rule} failed predicate: {{depth <= {}}}?", self.config.max_depth),
        ))
    }

    // Listener events.

    fn fire_enter(&mut self, id: NodeId) {
        if self.deferred > 0 || self.listeners.is_empty() {
            return;
        }
        let node = self.builder.view(&self.tokens).node(id);
        for listener in &mut self.listeners {
            dispatch_enter(&mut **listener, node);
        }
    }

    fn fire_exit(&mut self, id: NodeId) {
        if self.deferred > 0 || self.listeners.is_empty() {
            return;
        }
        let node = self.builder.view(&self.tokens).node(id);
        for listener in self.listeners.iter_mut().rev() {
            dispatch_exit(&mut **listener, node);
        }
    }

    fn fire_token(&mut self, pos: usize, error: bool) {
        if self.deferred > 0 || self.listeners.is_empty() {
            return;
        }
        let token = self.builder.view(&self.tokens).token(self.tokens.default_index(pos));
        for listener in &mut self.listeners {
            if error {
                listener.visit_error_token(token);
            } else {
                listener.visit_terminal(token);
            }
        }
    }

    /// Fires the events of the finished subtree `id`.
    fn replay(&mut self, id: NodeId) {
        if self.listeners.is_empty() {
            return;
        }
        let node = self.builder.view(&self.tokens).node(id);
        for event in node.preorder() {
            match event {
                WalkEvent::Enter(node) => {
                    for listener in &mut self.listeners {
                        dispatch_enter(&mut **listener, node);
                    }
                }
                WalkEvent::Exit(node) => {
                    for listener in self.listeners.iter_mut().rev() {
                        dispatch_exit(&mut **listener, node);
                    }
                }
                WalkEvent::Token(token) => {
                    for listener in &mut self.listeners {
                        listener.visit_terminal(token);
                    }
                }
                WalkEvent::ErrorToken(token) => {
                    for listener in &mut self.listeners {
                        listener.visit_error_token(token);
                    }
                }
            }
        }
    }

    // Tokens.

    /// Returns the kind of the current token.
    #[inline]
    pub(crate) fn token(&self) -> TokenKind {
        self.tokens.default_kind(self.pos)
    }

    /// Returns the kind of the token `dist` tokens ahead of the current one.
    ///
    /// [`Eof`](TokenKind::Eof) is returned if the look-ahead is any distance past the end of
    /// the tokens.
    #[inline]
    pub(crate) fn look_ahead(&self, dist: usize) -> TokenKind {
        self.tokens.default_kind(self.pos + dist)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.token() == T::Eof
    }

    /// Checks if the current token is `kind`, and returns `true` if so.
    ///
    /// This method will automatically add `kind` to the expected tokens if `kind` is not
    /// encountered.
    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        let is_present = self.token() == kind;
        if !is_present {
            self.expected = self.expected.with(kind);
        }
        is_present
    }

    /// Like [`check`](Self::check), for any kind in `set`.
    pub(crate) fn check_set(&mut self, set: TokenSet) -> bool {
        let is_present = set.contains(self.token());
        if !is_present {
            self.expected = self.expected.union(set);
        }
        is_present
    }

    /// Consumes a token `kind` if it exists. Returns whether the given token was present.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        let is_present = self.check(kind);
        if is_present {
            self.bump();
        }
        is_present
    }

    /// Consumes a token of any kind in `set` if it exists.
    pub(crate) fn eat_set(&mut self, set: TokenSet) -> bool {
        let is_present = self.check_set(set);
        if is_present {
            self.bump();
        }
        is_present
    }

    /// Expects and consumes the token `kind`.
    ///
    /// A single stray token in front of `kind` is skipped, and a missing `kind` in front of a
    /// token that the enclosing rules can continue with is assumed to be there; both are
    /// reported. Otherwise an error is returned.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult {
        if self.check(kind) {
            self.bump();
            return Ok(());
        }

        if self.look_ahead(1) == kind && !self.at_eof() {
            let message =
                format!("extraneous input {}, expected {kind}", self.describe(self.pos));
            self.report(self.error_here(SyntaxErrorKind::Recognition, message));
            self.bump_error();
            self.bump();
            return Ok(());
        }

        if self.recovery_set().contains(self.token()) {
            let message = format!("missing {kind} at {}", self.describe(self.pos));
            self.report(self.error_here(SyntaxErrorKind::Recognition, message));
            return Ok(());
        }

        self.unexpected()
    }

    /// Expects and consumes a token of any kind in `set`, skipping one stray token like
    /// [`expect`](Self::expect).
    pub(crate) fn expect_set(&mut self, set: TokenSet) -> PResult {
        if self.check_set(set) {
            self.bump();
            return Ok(());
        }
        if set.contains(self.look_ahead(1)) && !self.at_eof() {
            let message = format!(
                "extraneous input {}, expected {}",
                self.describe(self.pos),
                or_list(&kind_names(set))
            );
            self.report(self.error_here(SyntaxErrorKind::Recognition, message));
            self.bump_error();
            self.bump();
            return Ok(());
        }
        self.unexpected()
    }

    /// Advance the parser by one token, adding it to the current node.
    pub(crate) fn bump(&mut self) {
        let pos = self.pos;
        self.builder.token(self.tokens.default_index(pos));
        self.fire_token(pos, false);
        self.advance();
        self.recovering = false;
    }

    /// Advance the parser by one token, adding it to the current node as a skipped token.
    pub(crate) fn bump_error(&mut self) {
        if self.at_eof() {
            return;
        }
        let pos = self.pos;
        self.builder.error_token(self.tokens.default_index(pos));
        self.fire_token(pos, true);
        self.advance();
    }

    #[inline]
    fn advance(&mut self) {
        if self.pos < self.tokens.default_len() {
            self.pos += 1;
        }
        self.expected = TokenSet::EMPTY;
    }

    // Errors.

    /// Returns an "unexpected token" error in a [`PResult`] for the current token.
    pub(crate) fn unexpected<T>(&self) -> PResult<T> {
        Err(self.error_here(SyntaxErrorKind::Recognition, self.expected_message()))
    }

    /// Returns an "expected `what`" error in a [`PResult`] for the current token.
    pub(crate) fn unexpected_what<T>(&self, what: &str) -> PResult<T> {
        let message = format!("expected {what}, found {}", self.describe(self.pos));
        Err(self.error_here(SyntaxErrorKind::Recognition, message))
    }

    /// Creates an error at the current token.
    pub(crate) fn error_here(&self, kind: SyntaxErrorKind, message: String) -> PErr {
        PErr { kind, message, start: self.pos, stop: self.pos }
    }

    fn expected_message(&self) -> String {
        let found = self.describe(self.pos);
        let expected = kind_names(self.expected.iter().filter(|&k| k != self.token()).collect());
        match expected.len() {
            0 => format!("unexpected token: {found}"),
            1 => format!("expected {}, found {found}", expected[0]),
            len if len > 8 => format!("expected one of {len} possible tokens, found {found}"),
            _ => format!("expected one of {}, found {found}", or_list(&expected)),
        }
    }

    /// Describes the token at `pos` for messages: fixed tokens by their spelling, the others
    /// by their class and text.
    pub(crate) fn describe(&self, pos: usize) -> String {
        let kind = self.tokens.default_kind(pos);
        if kind.is_fixed() || kind == T::Eof {
            kind.to_string()
        } else {
            format!("{kind} `{}`", self.tokens.text(self.tokens.default_index(pos)))
        }
    }

    /// Records `err` unless an earlier error is still being recovered from, and marks the
    /// current node.
    pub(crate) fn report(&mut self, err: PErr) {
        self.builder.mark_error();
        if self.recovering {
            trace!(message = %err.message, "suppressed syntax error");
            return;
        }
        self.recovering = true;

        let start = self.tokens.default_index(err.start);
        let stop = self.tokens.default_index(err.stop);
        let token = self.tokens.get(stop);
        let error = SyntaxError {
            kind: err.kind,
            rule: self.rules.last().copied(),
            node: self.builder.current(),
            start,
            stop,
            span: token.span,
            line: token.start.line,
            col: token.start.col,
            message: err.message,
        };
        debug!(rule = ?error.rule, line = error.line, col = error.col, "{}", error.message);
        self.errors.push(error);
    }

    // Contexts.

    /// Runs `f` with expressions stopping before position `limit`.
    fn with_expression_limit<R>(
        &mut self,
        limit: Option<usize>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let old = std::mem::replace(&mut self.expression_limit, limit);
        let res = f(self);
        self.expression_limit = old;
        res
    }
}

/// Returns the display names of `set`, sorted and without duplicates.
fn kind_names(set: TokenSet) -> Vec<String> {
    let mut names: Vec<String> = set.iter().map(|k| k.to_string()).collect();
    names.sort();
    names.dedup();
    names
}

fn or_list<T: fmt::Display>(list: &[T]) -> String {
    let len = list.len();
    let mut s = String::with_capacity(16 * len);
    for (i, t) in list.iter().enumerate() {
        if i > 0 {
            let is_last = i == len - 1;
            s.push_str(if len > 2 && is_last {
                ", or "
            } else if len == 2 && is_last {
                " or "
            } else {
                ", "
            });
        }
        let _ = write!(s, "{t}");
    }
    s
}
