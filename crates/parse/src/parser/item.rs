use super::{
    IDENTIFIER, PResult, Parser, STATE_MUTABILITY, TYPE_NAME_START,
    decision::{self, Decision},
    recovery::{CLOSE_BRACE, CONTRACT_PART_KEYWORDS, SOURCE_UNIT_KEYWORDS},
};
use solcst_cst::{NodeId, Rule, TokenKind as T, TokenSet};

/// Tokens that start a contract member.
const CONTRACT_PART_START: TokenSet = CONTRACT_PART_KEYWORDS.union(TYPE_NAME_START);

/// Tokens that start a top-level item.
const SOURCE_UNIT_ITEM_START: TokenSet = SOURCE_UNIT_KEYWORDS.union(TYPE_NAME_START);

const VERSION_OPERATOR: TokenSet =
    TokenSet::new(&[T::Caret, T::Tilde, T::Ge, T::Gt, T::Lt, T::Le, T::Eq]);

const VERSION_CONSTRAINT_START: TokenSet =
    VERSION_OPERATOR.with(T::VersionLiteral).with(T::DecimalNumber);

const STATE_VARIABLE_MODIFIERS: TokenSet = TokenSet::new(&[
    T::Public,
    T::Internal,
    T::Private,
    T::Constant,
    T::Transient,
    T::Immutable,
]);

const VISIBILITY: TokenSet =
    TokenSet::new(&[T::External, T::Public, T::Internal, T::Private, T::Virtual]);

/// Tokens that start an element of a `modifierList`.
const MODIFIER_LIST_START: TokenSet =
    VISIBILITY.union(STATE_MUTABILITY).union(IDENTIFIER).with(T::Override);

const USER_DEFINABLE_OPERATORS: TokenSet = TokenSet::new(&[
    T::Or,
    T::And,
    T::Caret,
    T::Tilde,
    T::Plus,
    T::Minus,
    T::Star,
    T::Slash,
    T::Percent,
    T::EqEq,
    T::Ne,
    T::Lt,
    T::Gt,
    T::Le,
    T::Ge,
]);

impl Parser<'_> {
    /// Parses a whole file. The root node also holds the end-of-input marker.
    pub fn parse_source_unit(&mut self) -> NodeId {
        self.with_rule(Rule::SourceUnit, |this| {
            loop {
                this.sync_loop(SOURCE_UNIT_ITEM_START, TokenSet::EMPTY);
                if !this.check_set(SOURCE_UNIT_ITEM_START) {
                    break;
                }
                let pos = this.pos;
                if let Err(err) = this.parse_source_unit_item() {
                    this.recover_from(err);
                }
                if this.pos == pos {
                    this.bump_error();
                }
            }
            this.expect(T::Eof)
        })
    }

    fn parse_source_unit_item(&mut self) -> PResult {
        match self.token() {
            T::Pragma => {
                self.parse_pragma_directive();
            }
            T::Import => {
                self.parse_import_directive();
            }
            T::Abstract | T::Contract | T::Interface | T::Library => {
                self.parse_contract_definition();
            }
            T::Enum => {
                self.parse_enum_definition();
            }
            T::Event => {
                self.parse_event_definition();
            }
            T::Struct => {
                self.parse_struct_definition();
            }
            T::Type => {
                self.parse_type_definition();
            }
            T::Using => {
                self.parse_using_for_declaration();
            }
            T::Function if IDENTIFIER.contains(self.look_ahead(1)) => {
                self.parse_function_definition();
            }
            _ => {
                let alts: &[decision::Alt] = &[
                    decision::function_definition,
                    decision::file_level_constant,
                    decision::custom_error_definition,
                ];
                match self.decide(Decision::SourceUnitItem, alts)? {
                    0 => self.parse_function_definition(),
                    1 => self.parse_file_level_constant(),
                    _ => self.parse_custom_error_definition(),
                };
            }
        }
        Ok(())
    }

    // Directives.

    /// Parses `pragma name value;`.
    pub fn parse_pragma_directive(&mut self) -> NodeId {
        self.with_rule(Rule::PragmaDirective, |this| {
            this.expect(T::Pragma)?;
            this.parse_pragma_name();
            this.parse_pragma_value();
            this.expect(T::Semi)
        })
    }

    pub fn parse_pragma_name(&mut self) -> NodeId {
        self.with_rule(Rule::PragmaName, |this| {
            this.parse_identifier();
            Ok(())
        })
    }

    /// Parses `*`, a version requirement or an expression.
    pub fn parse_pragma_value(&mut self) -> NodeId {
        self.with_rule(Rule::PragmaValue, |this| {
            let alts: &[decision::Alt] =
                &[decision::pragma_star, decision::pragma_version, decision::pragma_expression];
            match this.decide(Decision::PragmaValue, alts)? {
                0 => this.bump(),
                1 => {
                    this.parse_version();
                }
                _ => {
                    this.parse_expression();
                }
            }
            Ok(())
        })
    }

    /// Parses a version requirement: `>=0.8.0 <0.9.0 || ^0.7.6`.
    pub fn parse_version(&mut self) -> NodeId {
        self.with_rule(Rule::Version, |this| {
            this.parse_version_constraint();
            loop {
                if this.eat(T::OrOr) || this.check_set(VERSION_CONSTRAINT_START) {
                    this.parse_version_constraint();
                } else {
                    break;
                }
            }
            Ok(())
        })
    }

    pub fn parse_version_operator(&mut self) -> NodeId {
        self.with_rule(Rule::VersionOperator, |this| this.expect_set(VERSION_OPERATOR))
    }

    pub fn parse_version_constraint(&mut self) -> NodeId {
        self.with_rule(Rule::VersionConstraint, |this| {
            if this.check_set(VERSION_OPERATOR) {
                this.parse_version_operator();
            }
            this.expect_set(TokenSet::new(&[T::VersionLiteral, T::DecimalNumber]))
        })
    }

    /// Parses one of the three forms of `import`.
    pub fn parse_import_directive(&mut self) -> NodeId {
        self.with_rule(Rule::ImportDirective, |this| {
            let alts: &[decision::Alt] =
                &[decision::import_path, decision::import_symbol, decision::import_braces];
            let alt = this.decide(Decision::ImportDirective, alts)?;
            this.expect(T::Import)?;
            match alt {
                // import "path" as x;
                0 => {
                    this.parse_import_path();
                    if this.eat(T::As) {
                        this.parse_identifier();
                    }
                }
                // import * as x from "path";
                1 => {
                    if !this.eat(T::Star) {
                        this.parse_identifier();
                    }
                    if this.eat(T::As) {
                        this.parse_identifier();
                    }
                    this.expect(T::From)?;
                    this.parse_import_path();
                }
                // import {a, b as c} from "path";
                _ => {
                    this.expect(T::OpenBrace)?;
                    this.parse_import_declaration();
                    while this.eat(T::Comma) {
                        this.parse_import_declaration();
                    }
                    this.expect(T::CloseBrace)?;
                    this.expect(T::From)?;
                    this.parse_import_path();
                }
            }
            this.expect(T::Semi)
        })
    }

    pub fn parse_import_declaration(&mut self) -> NodeId {
        self.with_rule(Rule::ImportDeclaration, |this| {
            this.parse_identifier();
            if this.eat(T::As) {
                this.parse_identifier();
            }
            Ok(())
        })
    }

    pub fn parse_import_path(&mut self) -> NodeId {
        self.with_rule(Rule::ImportPath, |this| this.expect(T::StringLiteralFragment))
    }

    // Contracts.

    /// Parses a contract, interface or library.
    pub fn parse_contract_definition(&mut self) -> NodeId {
        const KINDS: TokenSet = TokenSet::new(&[T::Contract, T::Interface, T::Library]);

        self.with_rule(Rule::ContractDefinition, |this| {
            this.eat(T::Abstract);
            this.expect_set(KINDS)?;
            this.parse_identifier();
            if this.eat(T::Is) {
                this.parse_inheritance_specifier();
                while this.eat(T::Comma) {
                    this.parse_inheritance_specifier();
                }
            }
            this.expect(T::OpenBrace)?;
            loop {
                this.sync_loop(CONTRACT_PART_START, CLOSE_BRACE);
                if !this.check_set(CONTRACT_PART_START) {
                    break;
                }
                let pos = this.pos;
                this.parse_contract_part();
                if this.pos == pos {
                    this.bump_error();
                }
            }
            this.expect(T::CloseBrace)
        })
    }

    /// Parses a base contract with optional constructor arguments: `Base(1, 2)`.
    pub fn parse_inheritance_specifier(&mut self) -> NodeId {
        self.with_rule(Rule::InheritanceSpecifier, |this| {
            this.parse_user_defined_type_name();
            if this.eat(T::OpenParen) {
                if this.check_set(super::EXPRESSION_START) {
                    this.parse_expression_list();
                }
                this.expect(T::CloseParen)?;
            }
            Ok(())
        })
    }

    /// Parses a member of a contract.
    pub fn parse_contract_part(&mut self) -> NodeId {
        self.with_rule(Rule::ContractPart, |this| {
            match this.token() {
                T::Using => {
                    this.parse_using_for_declaration();
                }
                T::Struct => {
                    this.parse_struct_definition();
                }
                T::Modifier => {
                    this.parse_modifier_definition();
                }
                T::Event => {
                    this.parse_event_definition();
                }
                T::Enum => {
                    this.parse_enum_definition();
                }
                T::Type => {
                    this.parse_type_definition();
                }
                T::Fallback => {
                    this.parse_function_definition();
                }
                T::Constructor | T::Receive if this.look_ahead(1) == T::OpenParen => {
                    this.parse_function_definition();
                }
                T::Function if IDENTIFIER.contains(this.look_ahead(1)) => {
                    this.parse_function_definition();
                }
                _ => {
                    let alts: &[decision::Alt] = &[
                        decision::state_variable_declaration,
                        decision::function_definition,
                        decision::custom_error_definition,
                    ];
                    match this.decide(Decision::ContractPart, alts)? {
                        0 => this.parse_state_variable_declaration(),
                        1 => this.parse_function_definition(),
                        _ => this.parse_custom_error_definition(),
                    };
                }
            }
            Ok(())
        })
    }

    /// Parses `Type modifiers name (= value)?;`.
    pub fn parse_state_variable_declaration(&mut self) -> NodeId {
        self.with_rule(Rule::StateVariableDeclaration, |this| {
            this.parse_type_name();
            loop {
                if this.eat_set(STATE_VARIABLE_MODIFIERS) {
                    continue;
                }
                if this.check(T::Override) {
                    this.parse_override_specifier();
                    continue;
                }
                break;
            }
            this.parse_identifier();
            if this.eat(T::Eq) {
                this.parse_expression();
            }
            this.expect(T::Semi)
        })
    }

    /// Parses `Type constant NAME = value;` outside of a contract.
    pub fn parse_file_level_constant(&mut self) -> NodeId {
        self.with_rule(Rule::FileLevelConstant, |this| {
            this.parse_type_name();
            this.expect(T::Constant)?;
            this.parse_identifier();
            this.expect(T::Eq)?;
            this.parse_expression();
            this.expect(T::Semi)
        })
    }

    /// Parses `error Name(params);`.
    pub fn parse_custom_error_definition(&mut self) -> NodeId {
        self.with_rule(Rule::CustomErrorDefinition, |this| {
            this.expect(T::Error)?;
            this.parse_identifier();
            this.parse_parameter_list();
            this.expect(T::Semi)
        })
    }

    /// Parses a user-defined value type: `type Price is uint128;`.
    pub fn parse_type_definition(&mut self) -> NodeId {
        self.with_rule(Rule::TypeDefinition, |this| {
            this.expect(T::Type)?;
            this.parse_identifier();
            this.expect(T::Is)?;
            this.parse_elementary_type_name();
            this.expect(T::Semi)
        })
    }

    /// Parses `using L for T global?;` and `using {f, g as +} for T;`.
    pub fn parse_using_for_declaration(&mut self) -> NodeId {
        self.with_rule(Rule::UsingForDeclaration, |this| {
            this.expect(T::Using)?;
            this.parse_using_for_object();
            this.expect(T::For)?;
            if !this.eat(T::Star) {
                this.parse_type_name();
            }
            this.eat(T::Global);
            this.expect(T::Semi)
        })
    }

    pub fn parse_using_for_object(&mut self) -> NodeId {
        self.with_rule(Rule::UsingForObject, |this| {
            let alts: &[decision::Alt] = &[decision::using_single, decision::using_braces];
            if this.decide(Decision::UsingForObject, alts)? == 0 {
                this.parse_user_defined_type_name();
                return Ok(());
            }
            this.expect(T::OpenBrace)?;
            this.parse_using_for_object_directive();
            while this.eat(T::Comma) {
                this.parse_using_for_object_directive();
            }
            this.expect(T::CloseBrace)
        })
    }

    pub fn parse_using_for_object_directive(&mut self) -> NodeId {
        self.with_rule(Rule::UsingForObjectDirective, |this| {
            this.parse_user_defined_type_name();
            if this.eat(T::As) {
                this.parse_user_definable_operators();
            }
            Ok(())
        })
    }

    pub fn parse_user_definable_operators(&mut self) -> NodeId {
        self.with_rule(Rule::UserDefinableOperators, |this| {
            this.expect_set(USER_DEFINABLE_OPERATORS)
        })
    }

    /// Parses a struct. Struct bodies need at least one member.
    pub fn parse_struct_definition(&mut self) -> NodeId {
        self.with_rule(Rule::StructDefinition, |this| {
            this.expect(T::Struct)?;
            this.parse_identifier();
            this.expect(T::OpenBrace)?;
            loop {
                this.sync_loop(TYPE_NAME_START, CLOSE_BRACE);
                if !this.check_set(TYPE_NAME_START) {
                    break;
                }
                let pos = this.pos;
                this.parse_variable_declaration();
                if let Err(err) = this.expect(T::Semi) {
                    this.recover_from(err);
                    this.eat(T::Semi);
                }
                if this.pos == pos {
                    this.bump_error();
                }
            }
            this.expect(T::CloseBrace)
        })
    }

    // Functions and modifiers.

    /// Parses a modifier: `modifier onlyOwner() virtual { _; }`.
    pub fn parse_modifier_definition(&mut self) -> NodeId {
        self.with_rule(Rule::ModifierDefinition, |this| {
            this.expect(T::Modifier)?;
            this.parse_identifier();
            if this.check(T::OpenParen) {
                this.parse_parameter_list();
            }
            loop {
                if this.eat(T::Virtual) {
                    continue;
                }
                if this.check(T::Override) {
                    this.parse_override_specifier();
                    continue;
                }
                break;
            }
            if this.check(T::OpenBrace) {
                this.parse_block();
                return Ok(());
            }
            this.expect(T::Semi)
        })
    }

    /// Parses the use of a modifier or base constructor in a function header.
    pub fn parse_modifier_invocation(&mut self) -> NodeId {
        self.with_rule(Rule::ModifierInvocation, |this| {
            this.parse_identifier();
            if this.eat(T::OpenParen) {
                if this.check_set(super::EXPRESSION_START) {
                    this.parse_expression_list();
                }
                this.expect(T::CloseParen)?;
            }
            Ok(())
        })
    }

    /// Parses a function, constructor, fallback or receive function.
    pub fn parse_function_definition(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionDefinition, |this| {
            this.parse_function_descriptor();
            this.parse_parameter_list();
            this.parse_modifier_list();
            if this.check(T::Returns) {
                this.parse_return_parameters();
            }
            if this.check(T::OpenBrace) {
                this.parse_block();
                return Ok(());
            }
            this.expect(T::Semi)
        })
    }

    /// Parses `function name?`, `constructor`, `fallback` or `receive`.
    pub fn parse_function_descriptor(&mut self) -> NodeId {
        self.with_rule(Rule::FunctionDescriptor, |this| {
            match this.token() {
                T::Function => {
                    this.bump();
                    if this.check_set(IDENTIFIER) {
                        this.parse_identifier();
                    }
                }
                T::Constructor | T::Fallback | T::Receive => this.bump(),
                _ => return this.unexpected_what("function"),
            }
            Ok(())
        })
    }

    pub fn parse_return_parameters(&mut self) -> NodeId {
        self.with_rule(Rule::ReturnParameters, |this| {
            this.expect(T::Returns)?;
            this.parse_parameter_list();
            Ok(())
        })
    }

    /// Parses the visibility, mutability, `virtual`, `override` and modifier invocations of a
    /// function header, in any order. Always produces a node, possibly empty.
    pub fn parse_modifier_list(&mut self) -> NodeId {
        self.with_rule(Rule::ModifierList, |this| {
            while this.check_set(MODIFIER_LIST_START) {
                match this.token() {
                    kind if VISIBILITY.contains(kind) => this.bump(),
                    kind if STATE_MUTABILITY.contains(kind) => {
                        this.parse_state_mutability();
                    }
                    T::Override => {
                        this.parse_override_specifier();
                    }
                    _ => {
                        this.parse_modifier_invocation();
                    }
                }
            }
            Ok(())
        })
    }

    /// Parses `override` with an optional list of bases.
    pub fn parse_override_specifier(&mut self) -> NodeId {
        self.with_rule(Rule::OverrideSpecifier, |this| {
            this.expect(T::Override)?;
            if this.eat(T::OpenParen) {
                this.parse_user_defined_type_name();
                while this.eat(T::Comma) {
                    this.parse_user_defined_type_name();
                }
                this.expect(T::CloseParen)?;
            }
            Ok(())
        })
    }

    // Events and enums.

    /// Parses `event Name(params) anonymous?;`.
    pub fn parse_event_definition(&mut self) -> NodeId {
        self.with_rule(Rule::EventDefinition, |this| {
            this.expect(T::Event)?;
            this.parse_identifier();
            this.parse_event_parameter_list();
            this.eat(T::Anonymous);
            this.expect(T::Semi)
        })
    }

    pub fn parse_enum_value(&mut self) -> NodeId {
        self.with_rule(Rule::EnumValue, |this| {
            this.parse_identifier();
            Ok(())
        })
    }

    /// Parses `enum Name { A, B }`.
    pub fn parse_enum_definition(&mut self) -> NodeId {
        self.with_rule(Rule::EnumDefinition, |this| {
            this.expect(T::Enum)?;
            this.parse_identifier();
            this.expect(T::OpenBrace)?;
            if this.check_set(IDENTIFIER) {
                this.parse_enum_value();
            }
            while this.eat(T::Comma) {
                this.parse_enum_value();
            }
            this.expect(T::CloseBrace)
        })
    }
}
