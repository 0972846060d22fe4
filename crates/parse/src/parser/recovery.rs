//! Error recovery.
//!
//! After an error the parser skips tokens until one that some rule on the stack can resume
//! at. Each rule contributes the tokens that typically follow or close it; the union over the
//! stack, plus the end of input, is the recovery set.

use super::{PErr, Parser};
use crate::SyntaxErrorKind;
use solcst_cst::{Rule, TokenKind as T, TokenSet};

/// Keywords that start a top-level item.
pub(super) const SOURCE_UNIT_KEYWORDS: TokenSet = TokenSet::new(&[
    T::Pragma,
    T::Import,
    T::Abstract,
    T::Contract,
    T::Interface,
    T::Library,
    T::Struct,
    T::Enum,
    T::Event,
    T::Type,
    T::Using,
    T::Function,
]);

/// Keywords that start a contract member.
pub(super) const CONTRACT_PART_KEYWORDS: TokenSet = TokenSet::new(&[
    T::Function,
    T::Modifier,
    T::Constructor,
    T::Fallback,
    T::Receive,
    T::Event,
    T::Struct,
    T::Enum,
    T::Using,
    T::Type,
]);

pub(super) const SEMI: TokenSet = TokenSet::new(&[T::Semi]);
pub(super) const CLOSE_BRACE: TokenSet = TokenSet::new(&[T::CloseBrace]);
const CLOSE_PAREN: TokenSet = TokenSet::new(&[T::CloseParen]);
const EXPRESSION_FOLLOW: TokenSet =
    TokenSet::new(&[T::CloseParen, T::CloseBracket, T::CloseBrace, T::Comma]);

/// Returns the tokens at which recovery inside `rule` stops.
fn sync_set(rule: Rule) -> TokenSet {
    use Rule::*;

    match rule {
        SourceUnit => SOURCE_UNIT_KEYWORDS.with(T::Eof),
        ContractDefinition => CONTRACT_PART_KEYWORDS.with(T::CloseBrace),
        Block | AssemblyBlock | EnumDefinition | UsingForObject => CLOSE_BRACE,
        StructDefinition => TokenSet::new(&[T::CloseBrace, T::Semi]),
        FunctionDefinition | ModifierDefinition | ModifierList => {
            TokenSet::new(&[T::OpenBrace, T::Semi])
        }
        ParameterList | EventParameterList | FunctionTypeParameterList | Mapping
        | IdentifierList | VariableDeclarationList | OverrideSpecifier => CLOSE_PAREN,
        Expression | PrimaryExpression | ExpressionList | TupleExpression | NameValueList
        | FunctionCallArguments | FunctionCall => EXPRESSION_FOLLOW,
        IfStatement | WhileStatement | ForStatement => CLOSE_PAREN,
        _ if terminator(rule).is_some() => SEMI,
        _ => TokenSet::EMPTY,
    }
}

/// Returns the token that ends `rule`. Recovery inside the rule itself consumes it.
fn terminator(rule: Rule) -> Option<T> {
    use Rule::*;

    match rule {
        PragmaDirective
        | ImportDirective
        | StateVariableDeclaration
        | FileLevelConstant
        | CustomErrorDefinition
        | TypeDefinition
        | UsingForDeclaration
        | EventDefinition
        | ExpressionStatement
        | VariableDeclarationStatement
        | ReturnStatement
        | ThrowStatement
        | EmitStatement
        | RevertStatement
        | ContinueStatement
        | BreakStatement
        | DoWhileStatement => Some(T::Semi),
        _ => None,
    }
}

impl Parser<'_> {
    /// Returns the tokens the rules on the stack can resume at.
    pub(super) fn recovery_set(&self) -> TokenSet {
        self.rules.iter().fold(TokenSet::new(&[T::Eof]), |set, &rule| set.union(sync_set(rule)))
    }

    /// Reports `err` and resynchronizes.
    pub(super) fn recover_from(&mut self, err: PErr) {
        self.report(err);
        self.recover();
    }

    /// Skips tokens until one in the recovery set.
    ///
    /// A second error at the same position forces one token to be skipped first, so that a
    /// loop that keeps failing on the same token still makes progress.
    pub(super) fn recover(&mut self) {
        let depth = self.rules.len();
        if let Some((pos, last_depth)) = self.last_error
            && pos == self.pos
            && depth >= last_depth
        {
            self.bump_error();
        }
        self.last_error = Some((self.pos, depth));

        let set = self.recovery_set();
        while !set.contains(self.token()) {
            self.bump_error();
        }

        if let Some(&rule) = self.rules.last()
            && terminator(rule) == Some(self.token())
        {
            self.bump();
        }
    }

    /// Resynchronizes at the start of a loop iteration: if the current token neither starts
    /// another element (`first`) nor ends the loop (`end`), it is reported and tokens are
    /// skipped until one that does, or one in the recovery set.
    pub(super) fn sync_loop(&mut self, first: TokenSet, end: TokenSet) {
        let kind = self.token();
        if kind == T::Eof || first.contains(kind) || end.contains(kind) {
            return;
        }
        let expected = first.union(end);
        let message = if expected.len() > 8 {
            format!("extraneous input {}", self.describe(self.pos))
        } else {
            format!(
                "extraneous input {}, expected {}",
                self.describe(self.pos),
                super::or_list(&super::kind_names(expected))
            )
        };
        self.report(self.error_here(SyntaxErrorKind::Recognition, message));

        let stop = expected.union(self.recovery_set());
        while !stop.contains(self.token()) {
            self.bump_error();
        }
    }

    /// Creates a "no viable alternative" error for the tokens from `start` to `stop`.
    pub(super) fn no_viable_alternative(&self, start: usize, stop: usize) -> PErr {
        let stop = stop.min(self.tokens.default_len().saturating_sub(1)).max(start);
        let mut text = String::new();
        for pos in start..=stop {
            let index = self.tokens.default_index(pos);
            if self.tokens.get(index).kind != T::Eof {
                text.push_str(self.tokens.text(index));
            }
        }
        PErr {
            kind: SyntaxErrorKind::NoViableAlternative,
            message: format!("no viable alternative at input '{text}'"),
            start,
            stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parser, SyntaxErrorKind, parse_source};

    #[test]
    fn recovery_set_follows_the_stack() {
        let mut p = Parser::from_source("");
        p.rules = vec![Rule::SourceUnit, Rule::ContractDefinition, Rule::Block];
        let set = p.recovery_set();
        assert!(set.contains(T::Eof));
        assert!(set.contains(T::CloseBrace));
        assert!(set.contains(T::Function));
        assert!(!set.contains(T::Semi));
        p.rules.push(Rule::ReturnStatement);
        assert!(p.recovery_set().contains(T::Semi));
    }

    #[test]
    fn statement_recovery_consumes_terminator() {
        let out = parse_source("contract C { function f() { uint x = 1 2 3; x = 4; } }");
        assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
        let error = &out.errors[0];
        assert_eq!(error.kind, SyntaxErrorKind::Recognition);
        assert_eq!(error.rule, Some(Rule::VariableDeclarationStatement));
        // A unit such as `ether` may still follow the number.
        assert_eq!(error.message, "expected one of `;` or number unit, found number `2`");

        let block = out.cst.root().contract_definition().unwrap().contract_part().unwrap();
        let block = block.function_definition().unwrap().block().unwrap();
        let statements: Vec<_> = block.statement_all().map(|s| s.text()).collect();
        assert_eq!(statements, ["uint x = 1 2 3;", "x = 4;"]);
        let declaration = |i: usize| {
            block.statement_at(i).unwrap().simple_statement().unwrap().child_nodes().next().unwrap()
        };
        assert_eq!(declaration(0).rule(), Rule::VariableDeclarationStatement);
        assert!(declaration(0).has_error());
        assert_eq!(declaration(1).rule(), Rule::ExpressionStatement);
        assert!(!declaration(1).has_error());
    }

    #[test]
    fn loop_sync_skips_junk() {
        let out = parse_source("contract C { ) ) uint x; }");
        assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
        assert!(out.errors[0].message.starts_with("extraneous input `)`"));
        let contract = out.cst.root().contract_definition().unwrap();
        assert_eq!(contract.contract_part_all().count(), 1);
        assert_eq!(contract.contract_part().unwrap().text(), "uint x;");
    }

    #[test]
    fn no_viable_alternative_text() {
        let p = Parser::from_source("a b c");
        let err = p.no_viable_alternative(0, 1);
        assert_eq!(err.message, "no viable alternative at input 'ab'");
        let err = p.no_viable_alternative(2, 10);
        assert_eq!(err.stop, 3);
        assert_eq!(err.message, "no viable alternative at input 'c'");
    }
}
