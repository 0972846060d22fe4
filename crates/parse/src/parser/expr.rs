use super::{EXPRESSION_START, IDENTIFIER, PResult, Parser, TYPE_NAME_START};
use solcst_cst::{NodeId, Rule, TokenKind as T, TokenKind};

/// Binding strength of prefix operators. Their operand only extends over postfix operators.
const PREFIX_PRECEDENCE: u8 = 15;

impl Parser<'_> {
    /// Parses an expression.
    ///
    /// Binary, ternary and postfix operators are parsed by precedence climbing: each operator
    /// wraps the expression parsed so far in a new `expression` node, so the tree nests
    /// operators that bind tighter deeper.
    pub fn parse_expression(&mut self) -> NodeId {
        self.deferring(|this| this.parse_expression_prec(0))
    }

    /// Parses an expression whose operators all bind tighter than `min_precedence`.
    fn parse_expression_prec(&mut self, min_precedence: u8) -> NodeId {
        let start = self.open_rule(Rule::Expression);
        if let Err(err) = self.check_depth().and_then(|()| self.parse_unary_expression()) {
            self.recover_from(err);
            return self.close_rule(start);
        }
        while let Some(precedence) = self.continuation_precedence() {
            if precedence <= min_precedence {
                break;
            }
            let lhs = self.close_node(start);
            self.wrap(lhs);
            if let Err(err) = self.parse_expression_continuation(precedence) {
                self.recover_from(err);
                break;
            }
        }
        self.close_rule(start)
    }

    /// Parses the first operand of an expression: a prefix operation, `new T`, a parenthesized
    /// expression or a primary expression.
    fn parse_unary_expression(&mut self) -> PResult {
        match self.token() {
            T::New => {
                self.bump();
                self.parse_type_name();
            }
            T::PlusPlus
            | T::MinusMinus
            | T::Plus
            | T::Minus
            | T::After
            | T::Delete
            | T::Bang
            | T::Tilde => {
                self.bump(); // unop
                self.parse_expression_prec(PREFIX_PRECEDENCE);
            }
            T::OpenParen if self.is_parenthesized_expression() => {
                self.bump();
                self.parse_expression();
                self.expect(T::CloseParen)?;
            }
            kind if EXPRESSION_START.contains(kind) => {
                self.parse_primary_expression();
            }
            _ => return self.unexpected_what("expression"),
        }
        Ok(())
    }

    /// Returns the precedence of the operator at the current token, if it continues an
    /// expression.
    fn continuation_precedence(&self) -> Option<u8> {
        if self.expression_limit == Some(self.pos) {
            return None;
        }
        match self.token() {
            // This may be a block, as in `try f() { ... }`.
            T::OpenBrace => (IDENTIFIER.contains(self.look_ahead(1))
                && self.look_ahead(2) == T::Colon)
                .then_some(16),
            kind => token_precedence(kind),
        }
    }

    /// Parses the operator at the current token and its operands, if any. The left-hand side
    /// has already been wrapped in the current node.
    fn parse_expression_continuation(&mut self, precedence: u8) -> PResult {
        let kind = self.token();
        self.bump(); // operator
        match kind {
            T::PlusPlus | T::MinusMinus => {}
            T::OpenBracket => {
                // expr[index] or expr[start:end]
                if !self.check(T::Colon) && !self.check(T::CloseBracket) {
                    self.parse_expression();
                }
                if self.eat(T::Colon) && !self.check(T::CloseBracket) {
                    self.parse_expression();
                }
                self.expect(T::CloseBracket)?;
            }
            T::Dot => {
                self.parse_identifier();
            }
            T::OpenBrace => {
                self.parse_name_value_list();
                self.expect(T::CloseBrace)?;
            }
            T::OpenParen => {
                self.parse_function_call_arguments();
                self.expect(T::CloseParen)?;
            }
            T::Question => {
                self.parse_expression_prec(0);
                self.expect(T::Colon)?;
                self.parse_expression_prec(precedence - 1);
            }
            _ => {
                let rhs_precedence =
                    if is_right_associative(kind) { precedence - 1 } else { precedence };
                self.parse_expression_prec(rhs_precedence);
            }
        }
        Ok(())
    }

    /// Parses a literal, a name, a tuple or a type used as a value.
    pub fn parse_primary_expression(&mut self) -> NodeId {
        self.with_rule(Rule::PrimaryExpression, |this| {
            match this.token() {
                T::BooleanLiteral | T::Type => this.bump(),
                T::DecimalNumber | T::HexNumber => {
                    this.parse_number_literal();
                }
                T::HexLiteralFragment => {
                    this.parse_hex_literal();
                }
                T::StringLiteralFragment => {
                    this.parse_string_literal();
                }
                kind if IDENTIFIER.contains(kind) => {
                    this.parse_identifier();
                    // `T[]` as a value, as in `abi.decode(data, (T[]))`.
                    if this.token() == T::OpenBracket && this.look_ahead(1) == T::CloseBracket {
                        this.bump();
                        this.bump();
                    }
                }
                T::OpenParen | T::OpenBracket => {
                    this.parse_tuple_expression();
                }
                kind if TYPE_NAME_START.contains(kind) => {
                    this.parse_type_name();
                }
                _ => return this.unexpected_what("expression"),
            }
            Ok(())
        })
    }

    /// Parses `(a, , b)` or an inline array `[a, b]`.
    pub fn parse_tuple_expression(&mut self) -> NodeId {
        self.with_rule(Rule::TupleExpression, |this| {
            if this.eat(T::OpenBracket) {
                if this.check_set(EXPRESSION_START) {
                    this.parse_expression();
                    while this.eat(T::Comma) {
                        this.parse_expression();
                    }
                }
                return this.expect(T::CloseBracket);
            }
            this.expect(T::OpenParen)?;
            if this.check_set(EXPRESSION_START) {
                this.parse_expression();
            }
            while this.eat(T::Comma) {
                if this.check_set(EXPRESSION_START) {
                    this.parse_expression();
                }
            }
            this.expect(T::CloseParen)
        })
    }

    /// Parses `expression (',' expression)*`.
    pub fn parse_expression_list(&mut self) -> NodeId {
        self.with_rule(Rule::ExpressionList, |this| {
            this.parse_expression();
            while this.eat(T::Comma) {
                this.parse_expression();
            }
            Ok(())
        })
    }

    /// Parses `name: value` pairs, allowing a trailing comma.
    pub fn parse_name_value_list(&mut self) -> NodeId {
        self.with_rule(Rule::NameValueList, |this| {
            this.parse_name_value();
            while this.eat(T::Comma) {
                if !this.check_set(IDENTIFIER) {
                    break;
                }
                this.parse_name_value();
            }
            Ok(())
        })
    }

    pub fn parse_name_value(&mut self) -> NodeId {
        self.with_rule(Rule::NameValue, |this| {
            this.parse_identifier();
            this.expect(T::Colon)?;
            this.parse_expression();
            Ok(())
        })
    }

    /// Parses the arguments between the parentheses of a call: positional or `{name: value}`.
    pub fn parse_function_call_arguments(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionCallArguments, |this| {
            if this.eat(T::OpenBrace) {
                if this.check_set(IDENTIFIER) {
                    this.parse_name_value_list();
                }
                return this.expect(T::CloseBrace);
            }
            if this.check_set(EXPRESSION_START) {
                this.parse_expression_list();
            }
            Ok(())
        })
    }

    /// Parses the call of an `emit` or `revert` statement.
    ///
    /// The callee stops before the argument list that ends the statement, which becomes part
    /// of this node instead of a call expression.
    pub fn parse_function_call(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionCall, |this| {
            let limit = this.final_call_paren();
            this.with_expression_limit(limit, Self::parse_expression);
            this.expect(T::OpenParen)?;
            this.parse_function_call_arguments();
            this.expect(T::CloseParen)
        })
    }
}

/// Returns the precedence of a binary, ternary or postfix operator.
fn token_precedence(kind: TokenKind) -> Option<u8> {
    use TokenKind::*;

    Some(match kind {
        PlusPlus | MinusMinus | OpenBracket | Dot | OpenParen => 16,
        StarStar => 14,
        Star | Slash | Percent => 13,
        Plus | Minus => 12,
        Shl | Shr => 11,
        And => 10,
        Caret => 9,
        Or => 8,
        Lt | Gt | Le | Ge => 7,
        EqEq | Ne => 6,
        AndAnd => 5,
        OrOr => 4,
        Question => 3,
        Eq | OrEq | CaretEq | AndEq | ShlEq | ShrEq | PlusEq | MinusEq | StarEq | SlashEq
        | PercentEq => 2,
        _ => return None,
    })
}

fn is_right_associative(kind: TokenKind) -> bool {
    token_precedence(kind) == Some(2) || matches!(kind, T::StarStar | T::Question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solcst_cst::{ChildRef, NodeRef};

    /// Renders an expression tree as `op(lhs, rhs)`, keeping leaves as source text.
    fn render(node: NodeRef<'_>) -> String {
        let children: Vec<ChildRef<'_>> = node.children().collect();
        match children.as_slice() {
            [ChildRef::Node(primary)] => primary.text().to_string(),
            [ChildRef::Node(lhs), ChildRef::Token(op), ChildRef::Node(rhs)]
                if lhs.rule() == Rule::Expression && rhs.rule() == Rule::Expression =>
            {
                format!("{}({}, {})", op.text(), render(*lhs), render(*rhs))
            }
            [ChildRef::Token(op), ChildRef::Node(operand)] => {
                format!("{}({})", op.text(), render(*operand))
            }
            _ => node.text().to_string(),
        }
    }

    fn expr(src: &str) -> String {
        let out = Parser::from_source(src).parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{src}: {:?}", out.errors);
        render(out.cst.root())
    }

    #[test]
    fn precedence() {
        assert_eq!(expr("1 + 2 * 3"), "+(1, *(2, 3))");
        assert_eq!(expr("1 * 2 + 3"), "+(*(1, 2), 3)");
        assert_eq!(expr("a || b && c == d"), "||(a, &&(b, ==(c, d)))");
        assert_eq!(expr("a | b ^ c & d << 1"), "|(a, ^(b, &(c, <<(d, 1))))");
        assert_eq!(expr("a < b == c > d"), "==(<(a, b), >(c, d))");
    }

    #[test]
    fn associativity() {
        assert_eq!(expr("a - b - c"), "-(-(a, b), c)");
        assert_eq!(expr("a = b = c"), "=(a, =(b, c))");
        assert_eq!(expr("a ** b ** c"), "**(a, **(b, c))");
        assert_eq!(expr("a += b * c"), "+=(a, *(b, c))");
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(expr("-a ** b"), "**(-(a), b)");
        assert_eq!(expr("!a && b"), "&&(!(a), b)");
        assert_eq!(expr("-a.b"), "-(a.b)");
        assert_eq!(expr("delete a[i]"), "delete(a[i])");
    }

    #[test]
    fn ternary() {
        let out = Parser::from_source("a ? b : c ? d : e").parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let root = out.cst.root();
        let branches: Vec<_> = root.expression_all().map(|e| e.text()).collect();
        assert_eq!(branches, ["a", "b", "c ? d : e"]);

        let out = Parser::from_source("x = c ? 1 : 2").parse_with(Parser::parse_expression);
        let root = out.cst.root();
        assert_eq!(root.expression_at(1).unwrap().text(), "c ? 1 : 2");
    }

    #[test]
    fn postfix() {
        let out = Parser::from_source("a.b(c)[d]++").parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let mut node = out.cst.root();
        let mut texts = Vec::new();
        while let Some(inner) = node.expression() {
            texts.push(node.text());
            node = inner;
        }
        texts.push(node.text());
        assert_eq!(texts, ["a.b(c)[d]++", "a.b(c)[d]", "a.b(c)", "a.b", "a"]);
    }

    #[test]
    fn call_options_and_slices() {
        let out = Parser::from_source("c.f{value: 1, gas: g,}(x)").parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let options = out.cst.root().expression().unwrap();
        assert_eq!(options.name_value_list().unwrap().name_value_all().count(), 2);

        let out = Parser::from_source("msg.data[4:]").parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert_eq!(out.cst.root().expression_all().count(), 2);
    }

    #[test]
    fn parentheses_and_tuples() {
        let out = Parser::from_source("(a + b) * c").parse_with(Parser::parse_expression);
        let lhs = out.cst.root().expression().unwrap();
        assert_eq!(lhs.child_count(), 3);
        assert!(lhs.primary_expression().is_none());
        assert_eq!(lhs.expression().unwrap().text(), "a + b");

        let out = Parser::from_source("(a, , b)").parse_with(Parser::parse_expression);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let tuple = out.cst.root().primary_expression().unwrap().tuple_expression().unwrap();
        assert_eq!(tuple.expression_all().count(), 2);

        let out = Parser::from_source("[1, 2, 3]").parse_with(Parser::parse_expression);
        let tuple = out.cst.root().primary_expression().unwrap().tuple_expression().unwrap();
        assert_eq!(tuple.expression_all().count(), 3);
    }

    #[test]
    fn primaries() {
        let primary = |src: &str| {
            let out = Parser::from_source(src).parse_with(Parser::parse_expression);
            assert!(out.errors.is_empty(), "{src}: {:?}", out.errors);
            let node = out.cst.root().primary_expression().unwrap();
            node.child_nodes().next().map(|n| n.rule())
        };
        assert_eq!(primary("payable"), Some(Rule::Identifier));
        assert_eq!(primary("true"), None);
        assert_eq!(primary("1 ether"), Some(Rule::NumberLiteral));
        assert_eq!(primary("uint256"), Some(Rule::TypeName));
        assert_eq!(primary("T[]"), Some(Rule::Identifier));
        assert_eq!(primary("hex'00'"), Some(Rule::HexLiteral));
    }

    #[test]
    fn new_expressions() {
        assert_eq!(expr("new uint[](n)"), "new uint[](n)");
        let out = Parser::from_source("new uint[](n)").parse_with(Parser::parse_expression);
        let new = out.cst.root().expression().unwrap();
        assert_eq!(new.type_name().unwrap().text(), "uint[]");
    }

    #[test]
    fn missing_operand() {
        let out = Parser::from_source("a + ").parse_with(Parser::parse_expression);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "expected expression, found end of file");
        assert_eq!(out.errors[0].rule, Some(Rule::Expression));
    }
}
