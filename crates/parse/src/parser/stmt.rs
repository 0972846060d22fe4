use super::{
    EXPRESSION_START, IDENTIFIER, Parser, TYPE_NAME_START,
    decision::{self, Decision},
    recovery::CLOSE_BRACE,
};
use solcst_cst::{NodeId, Rule, TokenKind as T, TokenSet};

/// Tokens that start a statement.
const STATEMENT_START: TokenSet = EXPRESSION_START.union(TokenSet::new(&[
    T::If,
    T::Try,
    T::While,
    T::For,
    T::OpenBrace,
    T::Assembly,
    T::Do,
    T::Continue,
    T::Break,
    T::Return,
    T::Throw,
    T::Emit,
    T::Unchecked,
]));

impl Parser<'_> {
    /// Parses `{ statement* }`.
    pub fn parse_block(&mut self) -> NodeId {
        self.with_rule(Rule::Block, |this| {
            this.expect(T::OpenBrace)?;
            loop {
                this.sync_loop(STATEMENT_START, CLOSE_BRACE);
                if !this.check_set(STATEMENT_START) {
                    break;
                }
                let pos = this.pos;
                this.parse_statement();
                if this.pos == pos {
                    this.bump_error();
                }
            }
            this.expect(T::CloseBrace)
        })
    }

    pub fn parse_statement(&mut self) -> NodeId {
        self.with_rule(Rule::Statement, |this| {
            match this.token() {
                T::If => {
                    this.parse_if_statement();
                }
                T::Try => {
                    this.parse_try_statement();
                }
                T::While => {
                    this.parse_while_statement();
                }
                T::For => {
                    this.parse_for_statement();
                }
                T::OpenBrace => {
                    this.parse_block();
                }
                T::Assembly => {
                    this.parse_inline_assembly_statement();
                }
                T::Do => {
                    this.parse_do_while_statement();
                }
                T::Continue => {
                    this.parse_continue_statement();
                }
                T::Break => {
                    this.parse_break_statement();
                }
                T::Return => {
                    this.parse_return_statement();
                }
                T::Throw => {
                    this.parse_throw_statement();
                }
                T::Emit => {
                    this.parse_emit_statement();
                }
                T::Unchecked => {
                    this.parse_unchecked_statement();
                }
                // `revert E(...)` or a call to the `revert` function.
                T::Revert => {
                    let alts: &[decision::Alt] = &[decision::revert_statement, decision::any];
                    if this.decide(Decision::RevertStatement, alts)? == 0 {
                        this.parse_revert_statement();
                    } else {
                        this.parse_simple_statement();
                    }
                }
                _ => {
                    this.parse_simple_statement();
                }
            }
            Ok(())
        })
    }

    pub fn parse_expression_statement(&mut self) -> NodeId {
        self.with_rule(Rule::ExpressionStatement, |this| {
            this.parse_expression();
            this.expect(T::Semi)
        })
    }

    pub fn parse_if_statement(&mut self) -> NodeId {
        self.with_rule(Rule::IfStatement, |this| {
            this.expect(T::If)?;
            this.expect(T::OpenParen)?;
            this.parse_expression();
            this.expect(T::CloseParen)?;
            this.parse_statement();
            if this.eat(T::Else) {
                this.parse_statement();
            }
            Ok(())
        })
    }

    /// Parses `try expr returns (...)? { ... } catch ...`.
    pub fn parse_try_statement(&mut self) -> NodeId {
        self.with_rule(Rule::TryStatement, |this| {
            this.expect(T::Try)?;
            this.parse_expression();
            if this.check(T::Returns) {
                this.parse_return_parameters();
            }
            this.parse_block();
            this.parse_catch_clause();
            while this.check(T::Catch) {
                this.parse_catch_clause();
            }
            Ok(())
        })
    }

    /// Parses `catch Error(string memory reason)? { ... }`.
    pub fn parse_catch_clause(&mut self) -> NodeId {
        self.with_rule(Rule::CatchClause, |this| {
            this.expect(T::Catch)?;
            if this.check_set(IDENTIFIER) {
                this.parse_identifier();
                this.parse_parameter_list();
            } else if this.check(T::OpenParen) {
                this.parse_parameter_list();
            }
            this.parse_block();
            Ok(())
        })
    }

    pub fn parse_while_statement(&mut self) -> NodeId {
        self.with_rule(Rule::WhileStatement, |this| {
            this.expect(T::While)?;
            this.expect(T::OpenParen)?;
            this.parse_expression();
            this.expect(T::CloseParen)?;
            this.parse_statement();
            Ok(())
        })
    }

    /// Parses a variable declaration or an expression, followed by `;`.
    pub fn parse_simple_statement(&mut self) -> NodeId {
        self.with_rule(Rule::SimpleStatement, |this| {
            let alts: &[decision::Alt] =
                &[decision::variable_declaration_statement, decision::expression_statement];
            if this.decide(Decision::SimpleStatement, alts)? == 0 {
                this.parse_variable_declaration_statement();
            } else {
                this.parse_expression_statement();
            }
            Ok(())
        })
    }

    pub fn parse_unchecked_statement(&mut self) -> NodeId {
        self.with_rule(Rule::UncheckedStatement, |this| {
            this.expect(T::Unchecked)?;
            this.parse_block();
            Ok(())
        })
    }

    /// Parses `for (init; condition; step) body`. Every header part may be empty.
    pub fn parse_for_statement(&mut self) -> NodeId {
        self.with_rule(Rule::ForStatement, |this| {
            this.expect(T::For)?;
            this.expect(T::OpenParen)?;
            if !this.eat(T::Semi) {
                this.parse_simple_statement();
            }
            if !this.eat(T::Semi) {
                this.parse_expression_statement();
            }
            if this.check_set(EXPRESSION_START) {
                this.parse_expression();
            }
            this.expect(T::CloseParen)?;
            this.parse_statement();
            Ok(())
        })
    }

    /// Parses `assembly "evmasm"? ("memory-safe")? { ... }`.
    pub fn parse_inline_assembly_statement(&mut self) -> NodeId {
        self.with_rule(Rule::InlineAssemblyStatement, |this| {
            this.expect(T::Assembly)?;
            this.eat(T::StringLiteralFragment);
            if this.eat(T::OpenParen) {
                this.parse_inline_assembly_statement_flag();
                this.expect(T::CloseParen)?;
            }
            this.parse_assembly_block();
            Ok(())
        })
    }

    pub fn parse_inline_assembly_statement_flag(&mut self) -> NodeId {
        self.with_rule(Rule::InlineAssemblyStatementFlag, |this| {
            this.parse_string_literal();
            Ok(())
        })
    }

    pub fn parse_do_while_statement(&mut self) -> NodeId {
        self.with_rule(Rule::DoWhileStatement, |this| {
            this.expect(T::Do)?;
            this.parse_statement();
            this.expect(T::While)?;
            this.expect(T::OpenParen)?;
            this.parse_expression();
            this.expect(T::CloseParen)?;
            this.expect(T::Semi)
        })
    }

    pub fn parse_continue_statement(&mut self) -> NodeId {
        self.with_rule(Rule::ContinueStatement, |this| {
            this.expect(T::Continue)?;
            this.expect(T::Semi)
        })
    }

    pub fn parse_break_statement(&mut self) -> NodeId {
        self.with_rule(Rule::BreakStatement, |this| {
            this.expect(T::Break)?;
            this.expect(T::Semi)
        })
    }

    pub fn parse_return_statement(&mut self) -> NodeId {
        self.with_rule(Rule::ReturnStatement, |this| {
            this.expect(T::Return)?;
            if this.check_set(EXPRESSION_START) {
                this.parse_expression();
            }
            this.expect(T::Semi)
        })
    }

    pub fn parse_throw_statement(&mut self) -> NodeId {
        self.with_rule(Rule::ThrowStatement, |this| {
            this.expect(T::Throw)?;
            this.expect(T::Semi)
        })
    }

    pub fn parse_emit_statement(&mut self) -> NodeId {
        self.with_rule(Rule::EmitStatement, |this| {
            this.expect(T::Emit)?;
            this.parse_function_call();
            this.expect(T::Semi)
        })
    }

    pub fn parse_revert_statement(&mut self) -> NodeId {
        self.with_rule(Rule::RevertStatement, |this| {
            this.expect(T::Revert)?;
            this.parse_function_call();
            this.expect(T::Semi)
        })
    }

    /// Parses a local variable declaration: `uint x = 1;`, `(uint a, , bool b) = f();` or the
    /// legacy `var (a, b) = f();`.
    pub fn parse_variable_declaration_statement(&mut self) -> NodeId {
        self.with_rule(Rule::VariableDeclarationStatement, |this| {
            if this.token() == T::Var && this.look_ahead(1) == T::OpenParen {
                this.bump();
                this.parse_identifier_list();
            } else if this.eat(T::OpenParen) {
                this.parse_variable_declaration_list();
                this.expect(T::CloseParen)?;
            } else {
                this.parse_variable_declaration();
            }
            if this.eat(T::Eq) {
                this.parse_expression();
            }
            this.expect(T::Semi)
        })
    }

    /// Parses declarations separated by commas, any of which may be left out.
    pub fn parse_variable_declaration_list(&mut self) -> NodeId {
        self.with_rule(Rule::VariableDeclarationList, |this| {
            if this.check_set(TYPE_NAME_START) {
                this.parse_variable_declaration();
            }
            while this.eat(T::Comma) {
                if this.check_set(TYPE_NAME_START) {
                    this.parse_variable_declaration();
                }
            }
            Ok(())
        })
    }

    /// Parses `(a, , b)`.
    pub fn parse_identifier_list(&mut self) -> NodeId {
        self.with_rule(Rule::IdentifierList, |this| {
            this.expect(T::OpenParen)?;
            loop {
                if this.check_set(IDENTIFIER) {
                    this.parse_identifier();
                }
                if !this.eat(T::Comma) {
                    break;
                }
            }
            this.expect(T::CloseParen)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Parser, SyntaxErrorKind};
    use solcst_cst::{NodeRef, Rule};

    /// Returns the node under a `statement` node.
    fn inner(statement: NodeRef<'_>) -> NodeRef<'_> {
        let node = statement.child_nodes().next().unwrap();
        if node.rule() == Rule::SimpleStatement { node.child_nodes().next().unwrap() } else { node }
    }

    fn statements(src: &str) -> Vec<Rule> {
        let out = Parser::from_source(src).parse_with(Parser::parse_block);
        assert!(out.errors.is_empty(), "{src}: {:?}", out.errors);
        out.cst.root().statement_all().map(|s| inner(s).rule()).collect()
    }

    #[test]
    fn statement_kinds() {
        let src = r#"{
            uint x = 1;
            x += 1;
            (uint a, , bool b) = f();
            (a, b) = (b, a);
            var (c, d) = g();
            if (x > 0) { x--; } else x++;
            while (true) break;
            do { continue; } while (false);
            for (uint i = 0; i < 10; i++) {}
            for (;;) {}
            unchecked { x = x * 2; }
            emit Transfer(a, b, x);
            revert Unauthorized(msg.sender);
            revert("no");
            return x;
            throw;
            assembly ("memory-safe") { let y := 1 }
            try this.f{gas: 1}() returns (uint v) {} catch Error(string memory r) {} catch {}
        }"#;
        assert_eq!(
            statements(src),
            [
                Rule::VariableDeclarationStatement,
                Rule::ExpressionStatement,
                Rule::VariableDeclarationStatement,
                Rule::ExpressionStatement,
                Rule::VariableDeclarationStatement,
                Rule::IfStatement,
                Rule::WhileStatement,
                Rule::DoWhileStatement,
                Rule::ForStatement,
                Rule::ForStatement,
                Rule::UncheckedStatement,
                Rule::EmitStatement,
                Rule::RevertStatement,
                Rule::ExpressionStatement,
                Rule::ReturnStatement,
                Rule::ThrowStatement,
                Rule::InlineAssemblyStatement,
                Rule::TryStatement,
            ]
        );
    }

    #[test]
    fn declarations_with_user_types() {
        assert_eq!(
            statements("{ Foo memory f; Lib.S[] storage s = x; Foo(f); a[i] = 1; }"),
            [
                Rule::VariableDeclarationStatement,
                Rule::VariableDeclarationStatement,
                Rule::ExpressionStatement,
                Rule::ExpressionStatement,
            ]
        );
    }

    #[test]
    fn emit_keeps_arguments_in_function_call() {
        let out = Parser::from_source("{ emit a.E{x: 1}(f(y), 2); }").parse_with(Parser::parse_block);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let emit = inner(out.cst.root().statement().unwrap());
        let call = emit.function_call().unwrap();
        assert_eq!(call.expression().unwrap().text(), "a.E{x: 1}");
        let args = call.function_call_arguments().unwrap();
        assert_eq!(args.text(), "f(y), 2");
        assert_eq!(args.expression_list().unwrap().expression_all().count(), 2);
    }

    #[test]
    fn try_with_block_after_call() {
        let out = Parser::from_source("{ try f() { } catch (bytes memory e) { } }")
            .parse_with(Parser::parse_block);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let try_ = inner(out.cst.root().statement().unwrap());
        assert_eq!(try_.expression().unwrap().text(), "f()");
        assert_eq!(try_.catch_clause_all().count(), 1);
    }

    #[test]
    fn return_with_extra_token() {
        let out = Parser::from_source("{ return 1 2; x = 3; }").parse_with(Parser::parse_block);
        assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
        let error = &out.errors[0];
        assert_eq!(error.kind, SyntaxErrorKind::Recognition);
        assert_eq!(error.rule, Some(Rule::ReturnStatement));
        assert_eq!(error.message, "extraneous input number `2`, expected `;`");
        let block = out.cst.root();
        assert_eq!(block.statement_all().count(), 2);
        assert_eq!(block.statement_at(1).unwrap().text(), "x = 3;");
    }
}
