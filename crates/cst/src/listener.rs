//! The listener protocol: callbacks fired when rules are entered and exited.

use crate::{Cst, NodeRef, Rule, TokenRef, WalkEvent};

macro_rules! define_listener {
    ($(($variant:ident, $name:ident, $snake:ident)),* $(,)?) => { paste::paste! {
        /// Receives parse events.
        ///
        /// Every method has an empty default, so an implementor only overrides the events it is
        /// interested in. For a rule `B` nested in a rule `A` the order is `enter_a`, `enter_b`,
        /// `exit_b`, `exit_a`. [`enter_every_rule`](Self::enter_every_rule) fires before the
        /// per-rule `enter_*` callback and [`exit_every_rule`](Self::exit_every_rule) after the
        /// per-rule `exit_*` callback.
        ///
        /// Listeners can be attached to the parser, or run over a finished tree with [`walk`].
        #[allow(unused_variables)]
        pub trait Listener {
            /// Called when any rule is entered.
            fn enter_every_rule(&mut self, node: NodeRef<'_>) {}

            /// Called when any rule is exited.
            fn exit_every_rule(&mut self, node: NodeRef<'_>) {}

            /// Called for every matched token.
            fn visit_terminal(&mut self, token: TokenRef<'_>) {}

            /// Called for every token skipped by error recovery.
            fn visit_error_token(&mut self, token: TokenRef<'_>) {}

            $(
                #[doc = concat!("Called when a `", stringify!($name), "` node is entered.")]
                fn [<enter_ $snake>](&mut self, node: NodeRef<'_>) {}

                #[doc = concat!("Called when a `", stringify!($name), "` node is exited.")]
                fn [<exit_ $snake>](&mut self, node: NodeRef<'_>) {}
            )*
        }

        /// Fires the enter events for `node`.
        pub fn dispatch_enter<L: Listener + ?Sized>(listener: &mut L, node: NodeRef<'_>) {
            listener.enter_every_rule(node);
            match node.rule() {
                $(Rule::$variant => listener.[<enter_ $snake>](node),)*
            }
        }

        /// Fires the exit events for `node`.
        pub fn dispatch_exit<L: Listener + ?Sized>(listener: &mut L, node: NodeRef<'_>) {
            match node.rule() {
                $(Rule::$variant => listener.[<exit_ $snake>](node),)*
            }
            listener.exit_every_rule(node);
        }
    }};
}

crate::for_each_rule!(define_listener);

/// Replays the events of a finished tree to `listener`, in the order the parser fires them.
pub fn walk<L: Listener + ?Sized>(listener: &mut L, cst: &Cst) {
    walk_node(listener, cst.root());
}

/// Replays the events of the subtree rooted at `node`.
pub fn walk_node<L: Listener + ?Sized>(listener: &mut L, node: NodeRef<'_>) {
    for event in node.preorder() {
        match event {
            WalkEvent::Enter(node) => dispatch_enter(listener, node),
            WalkEvent::Exit(node) => dispatch_exit(listener, node),
            WalkEvent::Token(token) => listener.visit_terminal(token),
            WalkEvent::ErrorToken(token) => listener.visit_error_token(token),
        }
    }
}
