//! Whole-file parses through the public API.

use expect_test::expect;
use solcst_cst::{ChildRef, Listener, NodeRef, Rule, TokenRef, WalkEvent, walk};
use solcst_parse::{Parser, ParserConfig, SyntaxErrorKind, parse_source, parse_source_with};

const TOKEN: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC20} from "./IERC20.sol";

/// A minimal token.
contract Token is IERC20 {
    mapping(address account => uint256) private _balances;
    uint256 public totalSupply;

    event Transfer(address indexed from, address indexed to, uint256 value);
    error InsufficientBalance(uint256 needed);

    constructor(uint256 supply) {
        _balances[msg.sender] = supply;
        totalSupply = supply;
    }

    function transfer(address to, uint256 amount) external returns (bool) {
        uint256 balance = _balances[msg.sender];
        if (balance < amount) revert InsufficientBalance(amount);
        unchecked {
            _balances[msg.sender] = balance - amount;
        }
        _balances[to] += amount;
        emit Transfer(msg.sender, to, amount);
        return true;
    }

    function balanceOf(address account) public view returns (uint256) {
        return _balances[account];
    }

    receive() external payable {}
}
"#;

#[test]
fn valid_file() {
    let out = parse_source(TOKEN);
    assert!(!out.has_errors(), "{:?}", out.errors);
    let root = out.cst.root();
    assert_eq!(root.rule(), Rule::SourceUnit);
    assert_eq!(root.pragma_directive().unwrap().text(), "pragma solidity ^0.8.20;");
    assert_eq!(root.import_directive().unwrap().import_path().unwrap().text(), "\"./IERC20.sol\"");

    let contract = root.contract_definition().unwrap();
    assert_eq!(contract.identifier().unwrap().text(), "Token");
    assert_eq!(contract.contract_part_all().count(), 8);
    let functions: Vec<_> = contract
        .contract_part_all()
        .filter_map(|part| part.function_definition())
        .map(|f| f.function_descriptor().unwrap().compact_text())
        .collect();
    assert_eq!(functions, ["constructor", "functiontransfer", "functionbalanceOf", "receive"]);
}

#[test]
fn root_covers_the_whole_stream() {
    let out = parse_source(TOKEN);
    let (start, stop) = out.cst.root().token_span().unwrap();
    let tokens = out.cst.tokens();
    assert_eq!(start, tokens.default_index(0));
    assert_eq!(stop, tokens.eof());
    assert_eq!(out.cst.root().to_string_tree().rsplit(' ').next(), Some("<EOF>)"));

    let out = parse_source("");
    assert!(!out.has_errors());
    expect!["(sourceUnit <EOF>)"].assert_eq(&out.cst.root().to_string_tree());
}

#[test]
fn contract_with_one_function() {
    let out = parse_source("contract C { function f() public { } }");
    assert!(!out.has_errors(), "{:?}", out.errors);
    expect![[r#"(sourceUnit (contractDefinition contract (identifier C) { (contractPart (functionDefinition (functionDescriptor function (identifier f)) (parameterList ( )) (modifierList public) (block { }))) }) <EOF>)"#]]
        .assert_eq(&out.cst.to_string_tree());

    let function = out.cst.root().contract_definition().unwrap().contract_part().unwrap();
    let function = function.function_definition().unwrap();
    assert_eq!(function.function_descriptor().unwrap().identifier().unwrap().text(), "f");
    assert_eq!(function.parameter_list().unwrap().parameter_all().count(), 0);
    let modifiers = function.modifier_list().unwrap();
    let visibility: Vec<_> = modifiers.children().map(|c| c.text()).collect();
    assert_eq!(visibility, ["public"]);
    assert_eq!(function.block().unwrap().statement_all().count(), 0);
}

/// Renders an expression tree as `op(lhs, rhs)`, keeping leaves as source text.
fn render(node: NodeRef<'_>) -> String {
    let children: Vec<ChildRef<'_>> = node.children().collect();
    match children.as_slice() {
        [ChildRef::Node(lhs), ChildRef::Token(op), ChildRef::Node(rhs)]
            if lhs.rule() == Rule::Expression && rhs.rule() == Rule::Expression =>
        {
            format!("{}({}, {})", op.text(), render(*lhs), render(*rhs))
        }
        _ => node.text().to_string(),
    }
}

fn first_expression(src: &str) -> String {
    let src = format!("contract C {{ function f() {{ {src}; }} }}");
    let out = parse_source(&src);
    assert!(!out.has_errors(), "{src}: {:?}", out.errors);
    let expression = out.cst.root().preorder().find_map(|event| match event {
        WalkEvent::Enter(node) if node.is(Rule::Expression) => Some(node),
        _ => None,
    });
    render(expression.unwrap())
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(first_expression("1 + 2 * 3"), "+(1, *(2, 3))");
    assert_eq!(first_expression("a = b = c"), "=(a, =(b, c))");
    assert_eq!(first_expression("a ** b ** c"), "**(a, **(b, c))");
    assert_eq!(first_expression("x = a + b << 2 >= c"), "=(x, >=(<<(+(a, b), 2), c))");
}

fn contains_error(node: NodeRef<'_>) -> bool {
    node.preorder().any(|event| matches!(event, WalkEvent::Enter(n) if n.has_error()))
}

#[test]
fn one_bad_statement() {
    let src = r#"
        contract C {
            uint before;
            function f() public {
                uint a = 1;
                a = a + * 2;
                a = 3;
            }
            function g() public {}
        }
    "#;
    let out = parse_source(src);
    assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
    let error = &out.errors[0];
    assert_eq!(error.line, 6);
    assert_eq!(error.message, "expected expression, found `*`");
    assert_eq!(error.rule, Some(Rule::Expression));

    let contract = out.cst.root().contract_definition().unwrap();
    let parts: Vec<_> = contract.contract_part_all().collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].text(), "uint before;");
    assert!(!contains_error(parts[0]));
    assert_eq!(parts[2].text(), "function g() public {}");
    assert!(!contains_error(parts[2]));

    let block = parts[1].function_definition().unwrap().block().unwrap();
    let statements: Vec<_> = block.statement_all().map(|s| s.text()).collect();
    assert_eq!(statements, ["uint a = 1;", "a = a + * 2;", "a = 3;"]);
    assert!(!contains_error(block.statement_at(0).unwrap()));
    assert!(contains_error(block.statement_at(1).unwrap()));
    assert!(!contains_error(block.statement_at(2).unwrap()));
    let error_node = out.cst.node(error.node.unwrap());
    assert!(error_node.ancestors().any(|n| n == block.statement_at(1).unwrap()));
}

#[test]
fn payable_as_a_name() {
    let src = "contract C { function f(uint payable) public { uint payable = 1; payable(x).transfer(payable); } }";
    let out = parse_source(src);
    assert!(!out.has_errors(), "{:?}", out.errors);
    let identifiers: Vec<_> = out
        .cst
        .root()
        .preorder()
        .filter_map(|event| match event {
            WalkEvent::Enter(node) if node.is(Rule::Identifier) => Some(node.text()),
            _ => None,
        })
        .filter(|text| *text == "payable")
        .collect();
    assert_eq!(identifiers.len(), 4);
}

#[derive(Default)]
struct Descriptors(Vec<String>);

impl Listener for Descriptors {
    fn exit_function_descriptor(&mut self, node: NodeRef<'_>) {
        self.0.push(node.text().to_string());
    }
}

#[test]
fn listener_subset() {
    let src = r#"
        contract C {
            constructor() {}
            modifier onlyOwner() { _; }
            function f() public {}
            function  g () external view returns (uint) { return 1; }
            fallback() external {}
            receive() external payable {}
            function() internal pure h;
        }
    "#;
    let mut listener = Descriptors::default();
    let out = parse_source_with(src, &mut listener);
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(listener.0, ["constructor", "function f", "function  g", "fallback", "receive"]);
}

/// Records every event as a line of text.
#[derive(Default)]
struct Recorder(Vec<String>);

impl Listener for Recorder {
    fn enter_every_rule(&mut self, node: NodeRef<'_>) {
        self.0.push(format!("enter {}", node.rule().name()));
    }

    fn exit_every_rule(&mut self, node: NodeRef<'_>) {
        self.0.push(format!("exit {} {:?}", node.rule().name(), node.text()));
    }

    fn visit_terminal(&mut self, token: TokenRef<'_>) {
        self.0.push(format!("token {}", token.text()));
    }

    fn visit_error_token(&mut self, token: TokenRef<'_>) {
        self.0.push(format!("error {}", token.text()));
    }
}

#[test]
fn parse_events_match_walk_events() {
    for src in [TOKEN, "contract C { function f() { x = a[1][2] + b * -c; uint[][] memory y; } }"] {
        let mut during = Recorder::default();
        let out = parse_source_with(src, &mut during);
        assert!(!out.has_errors(), "{:?}", out.errors);

        let mut after = Recorder::default();
        walk(&mut after, &out.cst);
        assert_eq!(during.0, after.0);
    }
}

#[test]
fn small_horizon() {
    let src = "contract C { uint x; }";
    let config = ParserConfig { horizon: Some(1), ..Default::default() };
    let out = Parser::from_source(src).with_config(config).parse();
    let error = out.errors.first().unwrap();
    assert_eq!(error.kind, SyntaxErrorKind::NoViableAlternative);
    assert_eq!(error.rule, Some(Rule::ContractPart));
    assert!(error.message.starts_with("no viable alternative at input 'uint"), "{}", error.message);

    let out = parse_source(src);
    assert!(!out.has_errors(), "{:?}", out.errors);
}

#[test]
fn nesting_limit() {
    let src = format!("contract C {{ uint x = {}1{}; }}", "(".repeat(64), ")".repeat(64));
    assert!(!parse_source(&src).has_errors());

    let config = ParserConfig { max_depth: 32, ..Default::default() };
    let out = Parser::from_source(&src).with_config(config).parse();
    assert!(out.has_errors());
    let error = &out.errors[0];
    assert_eq!(error.kind, SyntaxErrorKind::FailedPredicate);
    assert!(error.message.contains("failed predicate"), "{}", error.message);
    assert!(out.cst.root().contract_definition().is_some());
}
