#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod token;
pub use token::{Channel, LexError, LexErrorKind, LineCol, Token, TokenIndex, TokenKind, TokenStream};

mod token_set;
pub use token_set::TokenSet;

mod rule;
pub use rule::Rule;

pub mod tree;
pub use tree::{
    Child, ChildRef, Cst, CstBuilder, Node, NodeId, NodeRef, Preorder, TokenRef, TreeView,
    WalkEvent,
};

mod node;

pub mod listener;
pub use listener::{Listener, walk};

pub mod visitor;
pub use visitor::Visitor;
