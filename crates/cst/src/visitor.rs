//! The visitor protocol: a fold over a finished tree.

use crate::{ChildRef, NodeRef, Rule, TokenRef};

macro_rules! define_visitor {
    ($(($variant:ident, $name:ident, $snake:ident)),* $(,)?) => { paste::paste! {
        /// Computes a value per node.
        ///
        /// By default every `visit_*` method visits the children and folds their results with
        /// [`aggregate`](Self::aggregate), starting from [`default_output`](Self::default_output).
        #[allow(unused_variables)]
        pub trait Visitor {
            /// The value produced for each node.
            type Output;

            /// The initial value of a fold over children, and the value of a terminal.
            fn default_output(&mut self) -> Self::Output;

            /// Combines the value accumulated so far with the value of the next child.
            fn aggregate(&mut self, aggregate: Self::Output, next: Self::Output) -> Self::Output {
                next
            }

            /// Returns `false` to stop visiting the remaining children of `node`.
            fn should_visit_next_child(&mut self, node: NodeRef<'_>, current: &Self::Output) -> bool {
                true
            }

            /// Visits a matched token.
            fn visit_terminal(&mut self, token: TokenRef<'_>) -> Self::Output {
                self.default_output()
            }

            /// Visits a token skipped by error recovery.
            fn visit_error_token(&mut self, token: TokenRef<'_>) -> Self::Output {
                self.default_output()
            }

            /// Visits the children of `node` in order and folds their values.
            fn visit_children(&mut self, node: NodeRef<'_>) -> Self::Output {
                let mut result = self.default_output();
                for child in node.children() {
                    if !self.should_visit_next_child(node, &result) {
                        break;
                    }
                    let next = match child {
                        ChildRef::Node(child) => self.visit(child),
                        ChildRef::Token(token) => self.visit_terminal(token),
                        ChildRef::ErrorToken(token) => self.visit_error_token(token),
                    };
                    result = self.aggregate(result, next);
                }
                result
            }

            /// Dispatches to the `visit_*` method of the node's rule.
            fn visit(&mut self, node: NodeRef<'_>) -> Self::Output {
                match node.rule() {
                    $(Rule::$variant => self.[<visit_ $snake>](node),)*
                }
            }

            $(
                #[doc = concat!("Visits a `", stringify!($name), "` node.")]
                fn [<visit_ $snake>](&mut self, node: NodeRef<'_>) -> Self::Output {
                    self.visit_children(node)
                }
            )*
        }
    }};
}

crate::for_each_rule!(define_visitor);
