use std::fmt;

/// Invokes `$m!` with the table of grammar rules.
///
/// Each entry is `(Variant, grammarName, snake_name)`. The order is the order in which the rules
/// appear in the grammar, starting with `sourceUnit`.
#[macro_export]
macro_rules! for_each_rule {
    ($m:ident) => {
        $m! {
            (SourceUnit, sourceUnit, source_unit),
            (PragmaDirective, pragmaDirective, pragma_directive),
            (PragmaName, pragmaName, pragma_name),
            (PragmaValue, pragmaValue, pragma_value),
            (Version, version, version),
            (VersionOperator, versionOperator, version_operator),
            (VersionConstraint, versionConstraint, version_constraint),
            (ImportDeclaration, importDeclaration, import_declaration),
            (ImportDirective, importDirective, import_directive),
            (ImportPath, importPath, import_path),
            (ContractDefinition, contractDefinition, contract_definition),
            (InheritanceSpecifier, inheritanceSpecifier, inheritance_specifier),
            (ContractPart, contractPart, contract_part),
            (StateVariableDeclaration, stateVariableDeclaration, state_variable_declaration),
            (FileLevelConstant, fileLevelConstant, file_level_constant),
            (CustomErrorDefinition, customErrorDefinition, custom_error_definition),
            (TypeDefinition, typeDefinition, type_definition),
            (UsingForDeclaration, usingForDeclaration, using_for_declaration),
            (UsingForObject, usingForObject, using_for_object),
            (UsingForObjectDirective, usingForObjectDirective, using_for_object_directive),
            (UserDefinableOperators, userDefinableOperators, user_definable_operators),
            (StructDefinition, structDefinition, struct_definition),
            (ModifierDefinition, modifierDefinition, modifier_definition),
            (ModifierInvocation, modifierInvocation, modifier_invocation),
            (FunctionDefinition, functionDefinition, function_definition),
            (FunctionDescriptor, functionDescriptor, function_descriptor),
            (ReturnParameters, returnParameters, return_parameters),
            (ModifierList, modifierList, modifier_list),
            (EventDefinition, eventDefinition, event_definition),
            (EnumValue, enumValue, enum_value),
            (EnumDefinition, enumDefinition, enum_definition),
            (ParameterList, parameterList, parameter_list),
            (Parameter, parameter, parameter),
            (EventParameterList, eventParameterList, event_parameter_list),
            (EventParameter, eventParameter, event_parameter),
            (FunctionTypeParameterList, functionTypeParameterList, function_type_parameter_list),
            (FunctionTypeParameter, functionTypeParameter, function_type_parameter),
            (VariableDeclaration, variableDeclaration, variable_declaration),
            (TypeName, typeName, type_name),
            (UserDefinedTypeName, userDefinedTypeName, user_defined_type_name),
            (MappingKey, mappingKey, mapping_key),
            (Mapping, mapping, mapping),
            (MappingKeyName, mappingKeyName, mapping_key_name),
            (MappingValueName, mappingValueName, mapping_value_name),
            (FunctionTypeName, functionTypeName, function_type_name),
            (StorageLocation, storageLocation, storage_location),
            (StateMutability, stateMutability, state_mutability),
            (Block, block, block),
            (Statement, statement, statement),
            (ExpressionStatement, expressionStatement, expression_statement),
            (IfStatement, ifStatement, if_statement),
            (TryStatement, tryStatement, try_statement),
            (CatchClause, catchClause, catch_clause),
            (WhileStatement, whileStatement, while_statement),
            (SimpleStatement, simpleStatement, simple_statement),
            (UncheckedStatement, uncheckedStatement, unchecked_statement),
            (ForStatement, forStatement, for_statement),
            (InlineAssemblyStatement, inlineAssemblyStatement, inline_assembly_statement),
            (InlineAssemblyStatementFlag, inlineAssemblyStatementFlag, inline_assembly_statement_flag),
            (DoWhileStatement, doWhileStatement, do_while_statement),
            (ContinueStatement, continueStatement, continue_statement),
            (BreakStatement, breakStatement, break_statement),
            (ReturnStatement, returnStatement, return_statement),
            (ThrowStatement, throwStatement, throw_statement),
            (EmitStatement, emitStatement, emit_statement),
            (RevertStatement, revertStatement, revert_statement),
            (VariableDeclarationStatement, variableDeclarationStatement, variable_declaration_statement),
            (VariableDeclarationList, variableDeclarationList, variable_declaration_list),
            (IdentifierList, identifierList, identifier_list),
            (ElementaryTypeName, elementaryTypeName, elementary_type_name),
            (Expression, expression, expression),
            (PrimaryExpression, primaryExpression, primary_expression),
            (ExpressionList, expressionList, expression_list),
            (NameValueList, nameValueList, name_value_list),
            (NameValue, nameValue, name_value),
            (FunctionCallArguments, functionCallArguments, function_call_arguments),
            (FunctionCall, functionCall, function_call),
            (AssemblyBlock, assemblyBlock, assembly_block),
            (AssemblyItem, assemblyItem, assembly_item),
            (AssemblyExpression, assemblyExpression, assembly_expression),
            (AssemblyMember, assemblyMember, assembly_member),
            (AssemblyCall, assemblyCall, assembly_call),
            (AssemblyLocalDefinition, assemblyLocalDefinition, assembly_local_definition),
            (AssemblyAssignment, assemblyAssignment, assembly_assignment),
            (AssemblyIdentifierOrList, assemblyIdentifierOrList, assembly_identifier_or_list),
            (AssemblyIdentifierList, assemblyIdentifierList, assembly_identifier_list),
            (AssemblyStackAssignment, assemblyStackAssignment, assembly_stack_assignment),
            (LabelDefinition, labelDefinition, label_definition),
            (AssemblySwitch, assemblySwitch, assembly_switch),
            (AssemblyCase, assemblyCase, assembly_case),
            (AssemblyFunctionDefinition, assemblyFunctionDefinition, assembly_function_definition),
            (AssemblyFunctionReturns, assemblyFunctionReturns, assembly_function_returns),
            (AssemblyFor, assemblyFor, assembly_for),
            (AssemblyIf, assemblyIf, assembly_if),
            (AssemblyLiteral, assemblyLiteral, assembly_literal),
            (AssemblyTypedVariableList, assemblyTypedVariableList, assembly_typed_variable_list),
            (AssemblyType, assemblyType, assembly_type),
            (SubAssembly, subAssembly, sub_assembly),
            (TupleExpression, tupleExpression, tuple_expression),
            (NumberLiteral, numberLiteral, number_literal),
            (Identifier, identifier, identifier),
            (HexLiteral, hexLiteral, hex_literal),
            (OverrideSpecifier, overrideSpecifier, override_specifier),
            (StringLiteral, stringLiteral, string_literal),
        }
    };
}

macro_rules! define_rules {
    ($(($variant:ident, $name:ident, $snake:ident)),* $(,)?) => {
        /// A grammar rule. Every CST node is tagged with the rule that produced it.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum Rule {
            $(
                #[doc = concat!("`", stringify!($name), "`")]
                $variant,
            )*
        }

        impl Rule {
            /// Every rule, in grammar order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// The number of rules.
            pub const COUNT: usize = Self::ALL.len();

            /// Returns the rule's name as written in the grammar, e.g. `functionDefinition`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($name),)*
                }
            }

            /// Returns the rule's name in snake case, e.g. `function_definition`.
            pub const fn snake_name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($snake),)*
                }
            }

            /// Looks up a rule by its grammar name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($name) => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

crate::for_each_rule!(define_rules);

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
