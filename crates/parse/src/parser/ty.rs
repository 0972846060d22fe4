use super::{
    ELEMENTARY_TYPE, IDENTIFIER, PResult, Parser, STATE_MUTABILITY, STORAGE_LOCATION,
    TYPE_NAME_START,
};
use solcst_cst::{NodeId, Rule, TokenKind as T, TokenSet};

impl Parser<'_> {
    /// Parses a type name, including any array suffixes: `uint[2][]`, `mapping(a => b)`,
    /// `function (uint) external returns (bool)`, `address payable`.
    ///
    /// The array suffixes make the rule left-recursive: each `[...]` wraps the type parsed so
    /// far in a new `typeName` node.
    pub fn parse_type_name(&mut self) -> NodeId {
        self.deferring(Self::parse_type_name_inner)
    }

    fn parse_type_name_inner(&mut self) -> NodeId {
        let start = self.open_rule(Rule::TypeName);
        if let Err(err) = self.check_depth().and_then(|()| self.parse_type_name_atom()) {
            self.recover_from(err);
            return self.close_rule(start);
        }
        while self.check(T::OpenBracket) {
            let inner = self.close_node(start);
            self.wrap(inner);
            self.bump(); // `[`
            if !self.check(T::CloseBracket) {
                self.parse_expression();
            }
            if let Err(err) = self.expect(T::CloseBracket) {
                self.recover_from(err);
                break;
            }
        }
        self.close_rule(start)
    }

    fn parse_type_name_atom(&mut self) -> PResult {
        match self.token() {
            T::Address if self.look_ahead(1) == T::Payable => {
                self.bump();
                self.bump();
            }
            kind if ELEMENTARY_TYPE.contains(kind) => {
                self.parse_elementary_type_name();
            }
            kind if IDENTIFIER.contains(kind) => {
                self.parse_user_defined_type_name();
            }
            T::Mapping => {
                self.parse_mapping();
            }
            T::Function => {
                self.parse_function_type_name();
            }
            _ => return self.unexpected_what("type name"),
        }
        Ok(())
    }

    /// Parses a built-in type: `address`, `bool`, `string`, `var`, `byte` or a member of the
    /// `int`, `uint`, `bytes`, `fixed` and `ufixed` families.
    pub fn parse_elementary_type_name(&mut self) -> NodeId {
        self.with_rule(Rule::ElementaryTypeName, |this| {
            if this.eat_set(ELEMENTARY_TYPE) {
                Ok(())
            } else {
                this.unexpected_what("elementary type name")
            }
        })
    }

    /// Parses a possibly qualified type name: `IERC20`, `Lib.Struct`.
    pub fn parse_user_defined_type_name(&mut self) -> NodeId {
        self.with_rule(Rule::UserDefinedTypeName, |this| {
            this.parse_identifier();
            while this.eat(T::Dot) {
                this.parse_identifier();
            }
            Ok(())
        })
    }

    pub fn parse_mapping_key(&mut self) -> NodeId {
        self.with_rule(Rule::MappingKey, |this| {
            match this.token() {
                kind if ELEMENTARY_TYPE.contains(kind) => {
                    this.parse_elementary_type_name();
                }
                kind if IDENTIFIER.contains(kind) => {
                    this.parse_user_defined_type_name();
                }
                _ => return this.unexpected_what("mapping key type"),
            }
            Ok(())
        })
    }

    /// Parses `mapping(Key name? => Value name?)`.
    pub fn parse_mapping(&mut self) -> NodeId {
        self.with_rule(Rule::Mapping, |this| {
            this.expect(T::Mapping)?;
            this.expect(T::OpenParen)?;
            this.parse_mapping_key();
            if this.check_set(IDENTIFIER) {
                this.parse_mapping_key_name();
            }
            this.expect(T::FatArrow)?;
            this.parse_type_name();
            if this.check_set(IDENTIFIER) {
                this.parse_mapping_value_name();
            }
            this.expect(T::CloseParen)
        })
    }

    pub fn parse_mapping_key_name(&mut self) -> NodeId {
        self.with_rule(Rule::MappingKeyName, |this| {
            this.parse_identifier();
            Ok(())
        })
    }

    pub fn parse_mapping_value_name(&mut self) -> NodeId {
        self.with_rule(Rule::MappingValueName, |this| {
            this.parse_identifier();
            Ok(())
        })
    }

    /// Parses a function type: `function (uint) external view returns (bool)`.
    pub fn parse_function_type_name(&mut self) -> NodeId {
        const ATTRIBUTES: TokenSet = STATE_MUTABILITY.with(T::Internal).with(T::External);

        self.with_rule(Rule::FunctionTypeName, |this| {
            this.expect(T::Function)?;
            this.parse_function_type_parameter_list();
            while this.check_set(ATTRIBUTES) {
                if this.check_set(STATE_MUTABILITY) {
                    this.parse_state_mutability();
                } else {
                    this.bump();
                }
            }
            if this.eat(T::Returns) {
                this.parse_function_type_parameter_list();
            }
            Ok(())
        })
    }

    pub fn parse_storage_location(&mut self) -> NodeId {
        self.with_rule(Rule::StorageLocation, |this| this.expect_set(STORAGE_LOCATION))
    }

    pub fn parse_state_mutability(&mut self) -> NodeId {
        self.with_rule(Rule::StateMutability, |this| this.expect_set(STATE_MUTABILITY))
    }

    /// Parses `typeName storageLocation? identifier`.
    pub fn parse_variable_declaration(&mut self) -> NodeId {
        self.with_rule(Rule::VariableDeclaration, |this| {
            this.parse_type_name();
            if this.check_set(STORAGE_LOCATION) {
                this.parse_storage_location();
            }
            this.parse_identifier();
            Ok(())
        })
    }

    // Parameter lists.

    /// Parses the parameters of a function, modifier, error or `returns` clause.
    pub fn parse_parameter_list(&mut self) -> NodeId {
        self.with_rule(Rule::ParameterList, |this| {
            this.parse_comma_list(Self::parse_parameter)
        })
    }

    /// Parses `typeName storageLocation? identifier?`.
    pub fn parse_parameter(&mut self) -> NodeId {
        self.with_rule(Rule::Parameter, |this| {
            this.parse_type_name();
            if this.check_set(STORAGE_LOCATION) {
                this.parse_storage_location();
            }
            if this.check_set(IDENTIFIER) {
                this.parse_identifier();
            }
            Ok(())
        })
    }

    pub fn parse_event_parameter_list(&mut self) -> NodeId {
        self.with_rule(Rule::EventParameterList, |this| {
            this.parse_comma_list(Self::parse_event_parameter)
        })
    }

    /// Parses `typeName indexed? identifier?`.
    pub fn parse_event_parameter(&mut self) -> NodeId {
        self.with_rule(Rule::EventParameter, |this| {
            this.parse_type_name();
            this.eat(T::Indexed);
            if this.check_set(IDENTIFIER) {
                this.parse_identifier();
            }
            Ok(())
        })
    }

    pub fn parse_function_type_parameter_list(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionTypeParameterList, |this| {
            this.parse_comma_list(Self::parse_function_type_parameter)
        })
    }

    /// Parses `typeName storageLocation?`.
    pub fn parse_function_type_parameter(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionTypeParameter, |this| {
            this.parse_type_name();
            if this.check_set(STORAGE_LOCATION) {
                this.parse_storage_location();
            }
            Ok(())
        })
    }

    /// Parses `'(' (item (',' item)*)? ')'` where every item starts with a type name.
    fn parse_comma_list(&mut self, mut item: impl FnMut(&mut Self) -> NodeId) -> PResult {
        self.expect(T::OpenParen)?;
        if self.check_set(TYPE_NAME_START) {
            item(self);
            while self.eat(T::Comma) {
                item(self);
            }
        }
        self.expect(T::CloseParen)
    }
}
