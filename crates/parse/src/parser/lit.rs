use super::{IDENTIFIER, Parser};
use solcst_cst::{NodeId, Rule, TokenKind as T};

impl Parser<'_> {
    /// Parses an identifier, or a contextual keyword used as one.
    pub fn parse_identifier(&mut self) -> NodeId {
        self.with_rule(Rule::Identifier, |this| {
            if this.eat_set(IDENTIFIER) { Ok(()) } else { this.unexpected_what("identifier") }
        })
    }

    /// Parses a number literal with an optional unit: `1 ether`, `0x1f`.
    pub fn parse_number_literal(&mut self) -> NodeId {
        self.with_rule(Rule::NumberLiteral, |this| {
            if !this.eat(T::DecimalNumber) && !this.eat(T::HexNumber) {
                return this.unexpected_what("number");
            }
            this.eat(T::NumberUnit);
            Ok(())
        })
    }

    /// Parses one or more adjacent string literal fragments.
    pub fn parse_string_literal(&mut self) -> NodeId {
        self.with_rule(Rule::StringLiteral, |this| {
            this.expect(T::StringLiteralFragment)?;
            while this.eat(T::StringLiteralFragment) {}
            Ok(())
        })
    }

    /// Parses one or more adjacent hex literal fragments.
    pub fn parse_hex_literal(&mut self) -> NodeId {
        self.with_rule(Rule::HexLiteral, |this| {
            this.expect(T::HexLiteralFragment)?;
            while this.eat(T::HexLiteralFragment) {}
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Parser;
    use solcst_cst::Rule;

    #[test]
    fn literals() {
        let out = Parser::from_source("1 ether").parse_with(Parser::parse_number_literal);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert_eq!(out.cst.to_string_tree(), "(numberLiteral 1 ether)");

        let out = Parser::from_source(r#""a" 'b'"#).parse_with(Parser::parse_string_literal);
        assert_eq!(out.cst.root().child_count(), 2);

        let out = Parser::from_source(r#"hex"00" hex'ff'"#).parse_with(Parser::parse_hex_literal);
        assert_eq!(out.cst.root().rule(), Rule::HexLiteral);
        assert_eq!(out.cst.root().child_count(), 2);
    }

    #[test]
    fn contextual_identifiers() {
        for name in ["payable", "from", "error", "revert", "leave", "address", "x"] {
            let out = Parser::from_source(name).parse_with(Parser::parse_identifier);
            assert!(out.errors.is_empty(), "{name}: {:?}", out.errors);
        }
        let out = Parser::from_source("contract").parse_with(Parser::parse_identifier);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "expected identifier, found `contract`");
        assert!(out.cst.root().has_error());
    }
}
