//! Analysis listeners.
//!
//! Each listener tracks the function being parsed from the events of a few rules and reports,
//! when the function is complete, whether it breaks the listener's rule. Names are compared by
//! their compact text, with all whitespace removed: `restricted ( )` matches `restricted()`.

use crate::Findings;
use solcst_config::CheckKind;
use solcst_cst::{Listener, NodeRef, Rule, TokenKind as T};

/// A listener that collects findings about a single file.
pub trait FileListener: Listener + Send {
    fn findings(&self) -> &Findings;

    fn findings_mut(&mut self) -> &mut Findings;

    /// Drains the findings collected so far.
    fn take_findings(&mut self) -> String {
        self.findings_mut().take()
    }
}

/// Creates a fresh listener of the given kind for `file`.
pub fn new_listener(kind: CheckKind, file: &str) -> Box<dyn FileListener> {
    match kind {
        CheckKind::MissingVirtual => Box::new(MissingVirtual::new(file)),
        CheckKind::MissingRestricted => Box::new(MissingRestricted::new(file)),
        CheckKind::Unrestricted => Box::new(Unrestricted::new(file)),
    }
}

/// Base contracts whose public functions are meant to be overridden.
const UPGRADEABLE_BASES: &[&str] =
    &["Service", "Component", "InstanceLinkedComponent", "ComponentVerifyingService"];

/// Base contracts whose state-changing functions must be access managed.
const ACCESS_MANAGED_BASES: &[&str] = &[
    "Service",
    "AccessManagedUpgradeable",
    "AccessManaged",
    "ObjectManager",
    "Component",
    "InstanceLinkedComponent",
    "ComponentVerifyingService",
];

/// What is known about the function being parsed.
#[derive(Debug, Default)]
struct Function {
    public: bool,
    external: bool,
    is_virtual: bool,
    view: bool,
    pure: bool,
    restricted: bool,
    descriptor: String,
    modifiers: String,
}

impl Function {
    fn is_exposed(&self) -> bool {
        self.public || self.external
    }

    fn is_state_changing(&self) -> bool {
        !self.view && !self.pure
    }

    fn needs_restriction(&self) -> bool {
        self.is_exposed() && self.is_state_changing() && !self.restricted
    }

    fn exit_function_descriptor(&mut self, node: NodeRef<'_>) {
        self.descriptor = node.compact_text();
    }

    fn exit_modifier_list(&mut self, node: NodeRef<'_>) {
        self.public |= node.token(T::Public).is_some();
        self.external |= node.token(T::External).is_some();
        self.is_virtual |= node.token(T::Virtual).is_some();
        self.modifiers = node.compact_text();
    }

    fn exit_state_mutability(&mut self, node: NodeRef<'_>) {
        // Ignore the mutability of function types among the parameters.
        if !node.parent().is_some_and(|parent| parent.is(Rule::ModifierList)) {
            return;
        }
        self.view |= node.token(T::View).is_some();
        self.pure |= node.token(T::Pure).is_some();
    }

    fn exit_modifier_invocation(&mut self, node: NodeRef<'_>) {
        if node.compact_text() == "restricted()" {
            self.restricted = true;
        }
    }
}

/// Whether the contract being parsed inherits from one of a set of bases.
#[derive(Debug)]
struct Contract {
    bases: &'static [&'static str],
    relevant: bool,
}

impl Contract {
    const fn new(bases: &'static [&'static str]) -> Self {
        Self { bases, relevant: false }
    }

    fn exit_inheritance_specifier(&mut self, node: NodeRef<'_>) {
        if self.bases.contains(&node.compact_text().as_str()) {
            self.relevant = true;
        }
    }
}

/// Reports public and external functions of service and component contracts that are not
/// `virtual`.
#[derive(Debug)]
pub struct MissingVirtual {
    findings: Findings,
    contract: Contract,
    function: Function,
}

impl MissingVirtual {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            findings: Findings::new(file),
            contract: Contract::new(UPGRADEABLE_BASES),
            function: Function::default(),
        }
    }
}

impl Listener for MissingVirtual {
    fn enter_contract_definition(&mut self, _node: NodeRef<'_>) {
        self.contract.relevant = false;
    }

    fn exit_contract_definition(&mut self, _node: NodeRef<'_>) {
        self.contract.relevant = false;
    }

    fn exit_inheritance_specifier(&mut self, node: NodeRef<'_>) {
        self.contract.exit_inheritance_specifier(node);
    }

    fn enter_function_definition(&mut self, _node: NodeRef<'_>) {
        self.function = Function::default();
    }

    fn exit_function_definition(&mut self, _node: NodeRef<'_>) {
        let f = &self.function;
        if self.contract.relevant && f.is_exposed() && !f.is_virtual {
            trace!(file = self.findings.file(), function = %f.descriptor, "missing virtual");
            self.findings.push(format_args!(
                "Function '{}' |{}| missing virtual modifier",
                f.descriptor, f.modifiers
            ));
        }
    }

    fn exit_function_descriptor(&mut self, node: NodeRef<'_>) {
        self.function.exit_function_descriptor(node);
    }

    fn exit_modifier_list(&mut self, node: NodeRef<'_>) {
        self.function.exit_modifier_list(node);
    }
}

impl FileListener for MissingVirtual {
    fn findings(&self) -> &Findings {
        &self.findings
    }

    fn findings_mut(&mut self) -> &mut Findings {
        &mut self.findings
    }
}

/// Reports state-changing public and external functions of access-managed contracts that do not
/// invoke `restricted()`.
#[derive(Debug)]
pub struct MissingRestricted {
    findings: Findings,
    contract: Contract,
    function: Function,
}

impl MissingRestricted {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            findings: Findings::new(file),
            contract: Contract::new(ACCESS_MANAGED_BASES),
            function: Function::default(),
        }
    }
}

impl Listener for MissingRestricted {
    fn enter_contract_definition(&mut self, _node: NodeRef<'_>) {
        self.contract.relevant = false;
    }

    fn exit_contract_definition(&mut self, _node: NodeRef<'_>) {
        self.contract.relevant = false;
    }

    fn exit_inheritance_specifier(&mut self, node: NodeRef<'_>) {
        self.contract.exit_inheritance_specifier(node);
    }

    fn enter_function_definition(&mut self, _node: NodeRef<'_>) {
        self.function = Function::default();
    }

    fn exit_function_definition(&mut self, _node: NodeRef<'_>) {
        let f = &self.function;
        if self.contract.relevant && f.needs_restriction() {
            trace!(file = self.findings.file(), function = %f.descriptor, "missing restricted");
            self.findings.push(format_args!(
                "Function '{}' |{}| without restricted modifier",
                f.descriptor, f.modifiers
            ));
        }
    }

    fn exit_function_descriptor(&mut self, node: NodeRef<'_>) {
        self.function.exit_function_descriptor(node);
    }

    fn exit_modifier_list(&mut self, node: NodeRef<'_>) {
        self.function.exit_modifier_list(node);
    }

    fn exit_state_mutability(&mut self, node: NodeRef<'_>) {
        self.function.exit_state_mutability(node);
    }

    fn exit_modifier_invocation(&mut self, node: NodeRef<'_>) {
        self.function.exit_modifier_invocation(node);
    }
}

impl FileListener for MissingRestricted {
    fn findings(&self) -> &Findings {
        &self.findings
    }

    fn findings_mut(&mut self) -> &mut Findings {
        &mut self.findings
    }
}

/// Reports state-changing public and external functions that do not invoke `restricted()`, in
/// every contract. Each finding quotes the whole function without whitespace.
#[derive(Debug)]
pub struct Unrestricted {
    findings: Findings,
    function: Function,
}

impl Unrestricted {
    pub fn new(file: impl Into<String>) -> Self {
        Self { findings: Findings::new(file), function: Function::default() }
    }
}

impl Listener for Unrestricted {
    fn enter_function_definition(&mut self, _node: NodeRef<'_>) {
        self.function = Function::default();
    }

    fn exit_function_definition(&mut self, node: NodeRef<'_>) {
        if self.function.needs_restriction() {
            trace!(file = self.findings.file(), function = %self.function.descriptor, "unrestricted");
            let text = node.compact_text();
            self.findings.push(format_args!("Function {text} without restricted modifier"));
        }
    }

    fn exit_function_descriptor(&mut self, node: NodeRef<'_>) {
        self.function.exit_function_descriptor(node);
    }

    fn exit_modifier_list(&mut self, node: NodeRef<'_>) {
        self.function.exit_modifier_list(node);
    }

    fn exit_state_mutability(&mut self, node: NodeRef<'_>) {
        self.function.exit_state_mutability(node);
    }

    fn exit_modifier_invocation(&mut self, node: NodeRef<'_>) {
        self.function.exit_modifier_invocation(node);
    }
}

impl FileListener for Unrestricted {
    fn findings(&self) -> &Findings {
        &self.findings
    }

    fn findings_mut(&mut self) -> &mut Findings {
        &mut self.findings
    }
}
