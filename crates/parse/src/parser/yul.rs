//! Inline assembly.

use super::{
    IDENTIFIER, Parser,
    decision::{self, ASSEMBLY_LITERAL, Decision},
    recovery::CLOSE_BRACE,
};
use solcst_cst::{NodeId, Rule, TokenKind as T, TokenSet};

/// Tokens that start an assembly item.
const ASSEMBLY_ITEM_START: TokenSet = IDENTIFIER.union(ASSEMBLY_LITERAL).union(TokenSet::new(&[
    T::OpenBrace,
    T::OpenParen,
    T::Let,
    T::Switch,
    T::Function,
    T::For,
    T::If,
    T::Break,
    T::Continue,
    T::Assembly,
    T::Return,
    T::Byte,
]));

/// Tokens that continue an item starting with an identifier.
const IDENTIFIER_FOLLOW: TokenSet =
    TokenSet::new(&[T::ColonEq, T::Comma, T::Dot, T::Colon, T::OpenParen, T::EqColon]);

impl Parser<'_> {
    /// Parses `{ assemblyItem* }`.
    pub fn parse_assembly_block(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyBlock, |this| {
            this.expect(T::OpenBrace)?;
            loop {
                this.sync_loop(ASSEMBLY_ITEM_START, CLOSE_BRACE);
                if !this.check_set(ASSEMBLY_ITEM_START) {
                    break;
                }
                let pos = this.pos;
                this.parse_assembly_item();
                if this.pos == pos {
                    this.bump_error();
                }
            }
            this.expect(T::CloseBrace)
        })
    }

    pub fn parse_assembly_item(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyItem, |this| {
            match this.token() {
                T::OpenBrace => {
                    this.parse_assembly_block();
                }
                T::Let => {
                    this.parse_assembly_local_definition();
                }
                T::Switch => {
                    this.parse_assembly_switch();
                }
                T::Function => {
                    this.parse_assembly_function_definition();
                }
                T::For => {
                    this.parse_assembly_for();
                }
                T::If => {
                    this.parse_assembly_if();
                }
                T::Break | T::Continue => this.bump(),
                T::Leave if !IDENTIFIER_FOLLOW.contains(this.look_ahead(1)) => this.bump(),
                T::Assembly => {
                    this.parse_sub_assembly();
                }
                T::DecimalNumber | T::HexNumber if this.look_ahead(1) == T::NumberUnit => {
                    this.parse_number_literal();
                }
                _ => {
                    let alts: &[decision::Alt] = &[
                        decision::assembly_assignment,
                        decision::label_definition,
                        decision::assembly_stack_assignment,
                        decision::assembly_identifier,
                        decision::assembly_expression,
                    ];
                    match this.decide(Decision::AssemblyItem, alts)? {
                        0 => this.parse_assembly_assignment(),
                        1 => this.parse_label_definition(),
                        2 => this.parse_assembly_stack_assignment(),
                        3 => this.parse_identifier(),
                        _ => this.parse_assembly_expression(),
                    };
                }
            }
            Ok(())
        })
    }

    /// Parses a call, a literal or a member access.
    pub fn parse_assembly_expression(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyExpression, |this| {
            let kind = this.token();
            if ASSEMBLY_LITERAL.contains(kind) {
                this.parse_assembly_literal();
            } else if IDENTIFIER.contains(kind) && this.look_ahead(1) == T::Dot {
                this.parse_assembly_member();
            } else if matches!(kind, T::Return | T::Byte) || IDENTIFIER.contains(kind) {
                this.parse_assembly_call();
            } else {
                return this.unexpected_what("assembly expression");
            }
            Ok(())
        })
    }

    /// Parses `x.slot`.
    pub fn parse_assembly_member(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyMember, |this| {
            this.parse_identifier();
            this.expect(T::Dot)?;
            this.parse_identifier();
            Ok(())
        })
    }

    /// Parses a name with optional arguments: `mstore(0, x)`, `caller()`, `x`.
    pub fn parse_assembly_call(&mut self) -> NodeId {
        const KEYWORDS: TokenSet = TokenSet::new(&[T::Return, T::Address, T::Byte]);

        self.with_rule(Rule::AssemblyCall, |this| {
            if !this.eat_set(KEYWORDS) {
                this.parse_identifier();
            }
            if this.eat(T::OpenParen) {
                if !this.check(T::CloseParen) {
                    this.parse_assembly_expression();
                }
                while this.eat(T::Comma) {
                    this.parse_assembly_expression();
                }
                this.expect(T::CloseParen)?;
            }
            Ok(())
        })
    }

    /// Parses `let a, b := value`.
    pub fn parse_assembly_local_definition(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyLocalDefinition, |this| {
            this.expect(T::Let)?;
            this.parse_assembly_identifier_or_list();
            if this.eat(T::ColonEq) {
                this.parse_assembly_expression();
            }
            Ok(())
        })
    }

    pub fn parse_assembly_assignment(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyAssignment, |this| {
            this.parse_assembly_identifier_or_list();
            this.expect(T::ColonEq)?;
            this.parse_assembly_expression();
            Ok(())
        })
    }

    /// Parses the target of a definition or assignment: `x`, `x.slot`, `a, b` or `(a, b)`.
    pub fn parse_assembly_identifier_or_list(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyIdentifierOrList, |this| {
            let alts: &[decision::Alt] = &[
                decision::single_identifier,
                decision::member,
                decision::identifier_list,
                decision::parenthesized_list,
            ];
            match this.decide(Decision::AssemblyIdentifierOrList, alts)? {
                0 => {
                    this.parse_identifier();
                }
                1 => {
                    this.parse_assembly_member();
                }
                2 => {
                    this.parse_assembly_identifier_list();
                }
                _ => {
                    this.expect(T::OpenParen)?;
                    this.parse_assembly_identifier_list();
                    this.expect(T::CloseParen)?;
                }
            }
            Ok(())
        })
    }

    pub fn parse_assembly_identifier_list(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyIdentifierList, |this| {
            this.parse_identifier();
            while this.eat(T::Comma) {
                this.parse_identifier();
            }
            Ok(())
        })
    }

    /// Parses the legacy `value =: x`.
    pub fn parse_assembly_stack_assignment(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyStackAssignment, |this| {
            this.parse_assembly_expression();
            this.expect(T::EqColon)?;
            this.parse_identifier();
            Ok(())
        })
    }

    pub fn parse_label_definition(&mut self) -> NodeId {
        self.with_rule(Rule::LabelDefinition, |this| {
            this.parse_identifier();
            this.expect(T::Colon)
        })
    }

    /// Parses `switch value case ... default ...`.
    pub fn parse_assembly_switch(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblySwitch, |this| {
            this.expect(T::Switch)?;
            this.parse_assembly_expression();
            while this.check(T::Case) || this.check(T::Default) {
                this.parse_assembly_case();
            }
            Ok(())
        })
    }

    pub fn parse_assembly_case(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyCase, |this| {
            if this.eat(T::Case) {
                this.parse_assembly_literal();
            } else {
                this.expect(T::Default)?;
            }
            this.parse_assembly_block();
            Ok(())
        })
    }

    /// Parses `function f(a, b) -> r { ... }`.
    pub fn parse_assembly_function_definition(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyFunctionDefinition, |this| {
            this.expect(T::Function)?;
            this.parse_identifier();
            this.expect(T::OpenParen)?;
            if this.check_set(IDENTIFIER) {
                this.parse_assembly_typed_variable_list();
            }
            this.expect(T::CloseParen)?;
            if this.check(T::Minus) {
                this.parse_assembly_function_returns();
            }
            this.parse_assembly_block();
            Ok(())
        })
    }

    /// Parses `-> a, b`. The arrow is two tokens.
    pub fn parse_assembly_function_returns(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyFunctionReturns, |this| {
            this.expect(T::Minus)?;
            this.expect(T::Gt)?;
            this.parse_assembly_typed_variable_list();
            Ok(())
        })
    }

    /// Parses `for { init } condition { post } { body }`.
    pub fn parse_assembly_for(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyFor, |this| {
            this.expect(T::For)?;
            this.parse_assembly_block();
            this.parse_assembly_expression();
            this.parse_assembly_block();
            this.parse_assembly_block();
            Ok(())
        })
    }

    pub fn parse_assembly_if(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyIf, |this| {
            this.expect(T::If)?;
            this.parse_assembly_expression();
            this.parse_assembly_block();
            Ok(())
        })
    }

    /// Parses a literal with an optional type: `0x20`, `"abc"`, `true:bool`.
    pub fn parse_assembly_literal(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyLiteral, |this| {
            match this.token() {
                T::StringLiteralFragment => {
                    this.parse_string_literal();
                }
                T::HexLiteralFragment => {
                    this.parse_hex_literal();
                }
                T::DecimalNumber | T::HexNumber | T::BooleanLiteral => this.bump(),
                _ => return this.unexpected_what("literal"),
            }
            if this.check(T::Colon) {
                this.parse_assembly_type();
            }
            Ok(())
        })
    }

    /// Parses `a: t, b, c: t`. Each comma nests the rest of the list one level deeper.
    pub fn parse_assembly_typed_variable_list(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyTypedVariableList, |this| {
            this.parse_identifier();
            if this.check(T::Colon) {
                this.parse_assembly_type();
            }
            if this.eat(T::Comma) {
                this.parse_assembly_typed_variable_list();
            }
            Ok(())
        })
    }

    pub fn parse_assembly_type(&mut self) -> NodeId {
        self.with_rule(Rule::AssemblyType, |this| {
            this.expect(T::Colon)?;
            this.parse_identifier();
            Ok(())
        })
    }

    /// Parses a named sub-object: `assembly name { ... }`.
    pub fn parse_sub_assembly(&mut self) -> NodeId {
        self.with_rule(Rule::SubAssembly, |this| {
            this.expect(T::Assembly)?;
            this.parse_identifier();
            this.parse_assembly_block();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Parser;
    use solcst_cst::Rule;

    fn items(src: &str) -> Vec<Rule> {
        let out = Parser::from_source(src).parse_with(Parser::parse_assembly_block);
        assert!(out.errors.is_empty(), "{src}: {:?}", out.errors);
        out.cst
            .root()
            .assembly_item_all()
            .map(|item| item.child_nodes().next().map_or(Rule::AssemblyItem, |n| n.rule()))
            .collect()
    }

    #[test]
    fn item_kinds() {
        let src = r#"{
            let ptr := mload(0x40)
            ptr := add(ptr, 32)
            a, b := f()
            x.slot := 1
            mstore(ptr, caller())
            loop:
            1 =: y
            z
            leave
            break
            switch v case 0 { } default { revert(0, 0) }
            function f(a, b: u256) -> r { r := a }
            for { let i := 0 } lt(i, 10) { i := add(i, 1) } { }
            if iszero(x) { return(0, 32) }
            { }
            1 ether
        }"#;
        assert_eq!(
            items(src),
            [
                Rule::AssemblyLocalDefinition,
                Rule::AssemblyAssignment,
                Rule::AssemblyAssignment,
                Rule::AssemblyAssignment,
                Rule::AssemblyExpression,
                Rule::LabelDefinition,
                Rule::AssemblyStackAssignment,
                Rule::Identifier,
                Rule::AssemblyItem,
                Rule::AssemblyItem,
                Rule::AssemblySwitch,
                Rule::AssemblyFunctionDefinition,
                Rule::AssemblyFor,
                Rule::AssemblyIf,
                Rule::AssemblyBlock,
                Rule::NumberLiteral,
            ]
        );
    }

    #[test]
    fn leave_as_a_name() {
        let out = Parser::from_source("{ leave := 1 }").parse_with(Parser::parse_assembly_block);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let item = out.cst.root().assembly_item().unwrap();
        assert!(item.assembly_assignment().is_some());
    }

    #[test]
    fn identifier_targets() {
        let target = |src: &str| {
            let out = Parser::from_source(src).parse_with(Parser::parse_assembly_block);
            assert!(out.errors.is_empty(), "{src}: {:?}", out.errors);
            let item = out.cst.root().assembly_item().unwrap();
            let definition = item.assembly_local_definition().unwrap();
            let target = definition.assembly_identifier_or_list().unwrap();
            target.child_nodes().next().unwrap().rule()
        };
        assert_eq!(target("{ let x := 1 }"), Rule::Identifier);
        assert_eq!(target("{ let x.slot := 1 }"), Rule::AssemblyMember);
        assert_eq!(target("{ let a, b := f() }"), Rule::AssemblyIdentifierList);
        assert_eq!(target("{ let (a, b) := f() }"), Rule::AssemblyIdentifierList);
    }

    #[test]
    fn typed_variable_list_nests() {
        let out = Parser::from_source("{ function f(a, b, c) {} }")
            .parse_with(Parser::parse_assembly_block);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let function =
            out.cst.root().assembly_item().unwrap().assembly_function_definition().unwrap();
        let mut list = function.assembly_typed_variable_list();
        let mut depth = 0;
        while let Some(node) = list {
            depth += 1;
            list = node.assembly_typed_variable_list();
        }
        assert_eq!(depth, 3);
    }
}
