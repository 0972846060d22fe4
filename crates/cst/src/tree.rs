//! The concrete syntax tree arena.

use crate::{Rule, Token, TokenIndex, TokenKind, TokenStream};
use index_vec::{IndexSlice, IndexVec};
use smallvec::SmallVec;
use solcst_interface::Span;
use std::fmt::{self, Write as _};

index_vec::define_index_type! {
    /// The index of a node in its [`Cst`].
    pub struct NodeId = u32;
}

/// A child of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Child {
    /// A token matched by the grammar.
    Token(TokenIndex),
    /// A token consumed by error recovery.
    ErrorToken(TokenIndex),
    /// A sub-rule.
    Node(NodeId),
}

/// A rule node.
///
/// `start` is the first default-channel token at the position where the rule began; `stop` is the
/// last token the rule consumed, or `None` if it consumed nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub rule: Rule,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[Child; 4]>,
    pub start: TokenIndex,
    pub stop: Option<TokenIndex>,
    /// Whether a syntax error was recorded while this rule was being parsed.
    pub has_error: bool,
}

/// A finished concrete syntax tree, together with the tokens it was built from.
pub struct Cst {
    tokens: TokenStream,
    nodes: IndexVec<NodeId, Node>,
    root: NodeId,
}

impl fmt::Debug for Cst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cst")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl Cst {
    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> NodeRef<'_> {
        self.view().node(self.root)
    }

    /// Returns the node with the given id.
    #[inline]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        self.view().node(id)
    }

    /// Returns a borrowed view of the tree.
    #[inline]
    pub fn view(&self) -> TreeView<'_> {
        TreeView { nodes: &self.nodes, tokens: &self.tokens }
    }

    /// Returns the token stream.
    #[inline]
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Returns the source text.
    #[inline]
    pub fn src(&self) -> &str {
        self.tokens.src()
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        let view = self.view();
        self.nodes.indices().map(move |id| view.node(id))
    }

    /// Renders the whole tree as an s-expression. See [`NodeRef::to_string_tree`].
    pub fn to_string_tree(&self) -> String {
        self.root().to_string_tree()
    }
}

/// Incrementally builds a [`Cst`].
///
/// Nodes are attached to their parent when they are opened, so the tree is always connected and
/// can be inspected through [`view`](Self::view) while it is being built.
#[derive(Debug, Default)]
pub struct CstBuilder {
    nodes: IndexVec<NodeId, Node>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl CstBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a node for `rule` as the last child of the current node.
    pub fn open(&mut self, rule: Rule, start: TokenIndex) -> NodeId {
        let parent = self.current();
        let id = self.nodes.push(Node {
            rule,
            parent,
            children: SmallVec::new(),
            start,
            stop: None,
            has_error: false,
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(Child::Node(id)),
            None => {
                self.root.get_or_insert(id);
            }
        }
        self.stack.push(id);
        id
    }

    /// Closes the current node, recording the last token it consumed.
    ///
    /// # Panics
    ///
    /// Panics if no node is open.
    pub fn close(&mut self, stop: Option<TokenIndex>) -> NodeId {
        let id = self.stack.pop().expect("no open node to close");
        self.nodes[id].stop = stop;
        id
    }

    /// Opens a new `rule` node in place of the closed node `inner`, making `inner` its first
    /// child. This is how left-recursive rules grow their tree from the left.
    pub fn wrap(&mut self, inner: NodeId, rule: Rule) -> NodeId {
        debug_assert!(!self.stack.contains(&inner), "cannot wrap an open node");
        let parent = self.nodes[inner].parent;
        let start = self.nodes[inner].start;
        let mut children = SmallVec::new();
        children.push(Child::Node(inner));
        let id =
            self.nodes.push(Node { rule, parent, children, start, stop: None, has_error: false });
        self.nodes[inner].parent = Some(id);
        match parent {
            Some(parent) => {
                let slot = self.nodes[parent]
                    .children
                    .iter_mut()
                    .rev()
                    .find(|c| **c == Child::Node(inner))
                    .expect("wrapped node is not a child of its parent");
                *slot = Child::Node(id);
            }
            None => {
                if self.root == Some(inner) {
                    self.root = Some(id);
                }
            }
        }
        self.stack.push(id);
        id
    }

    /// Appends a matched token to the current node.
    pub fn token(&mut self, index: TokenIndex) {
        if let Some(id) = self.current() {
            self.nodes[id].children.push(Child::Token(index));
        }
    }

    /// Appends a token skipped by error recovery to the current node.
    pub fn error_token(&mut self, index: TokenIndex) {
        if let Some(id) = self.current() {
            self.nodes[id].children.push(Child::ErrorToken(index));
        }
    }

    /// Marks the current node as containing a syntax error.
    pub fn mark_error(&mut self) {
        if let Some(id) = self.current() {
            self.nodes[id].has_error = true;
        }
    }

    /// Marks `id` as containing a syntax error.
    pub fn mark_error_at(&mut self, id: NodeId) {
        self.nodes[id].has_error = true;
    }

    /// Returns the innermost open node.
    #[inline]
    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// Returns the number of open nodes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns a view over the nodes built so far.
    #[inline]
    pub fn view<'a>(&'a self, tokens: &'a TokenStream) -> TreeView<'a> {
        TreeView { nodes: &self.nodes, tokens }
    }

    /// Finishes the tree.
    ///
    /// # Panics
    ///
    /// Panics if nodes are still open or no node was ever opened.
    pub fn finish(self, tokens: TokenStream) -> Cst {
        assert!(self.stack.is_empty(), "{} nodes are still open", self.stack.len());
        let root = self.root.expect("empty tree");
        Cst { tokens, nodes: self.nodes, root }
    }
}

/// A borrowed view of a tree and its tokens.
#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    nodes: &'a IndexSlice<NodeId, [Node]>,
    tokens: &'a TokenStream,
}

impl<'a> TreeView<'a> {
    /// Returns the node with the given id.
    #[inline]
    pub fn node(self, id: NodeId) -> NodeRef<'a> {
        NodeRef { view: self, id }
    }

    /// Returns the token with the given index.
    #[inline]
    pub fn token(self, index: TokenIndex) -> TokenRef<'a> {
        TokenRef { tokens: self.tokens, index }
    }

    /// Returns the token stream.
    #[inline]
    pub fn tokens(self) -> &'a TokenStream {
        self.tokens
    }
}

/// A reference to a token in a token stream.
#[derive(Clone, Copy)]
pub struct TokenRef<'a> {
    tokens: &'a TokenStream,
    index: TokenIndex,
}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind(), self.text())
    }
}

impl<'a> TokenRef<'a> {
    /// Returns the token's index.
    #[inline]
    pub fn index(self) -> TokenIndex {
        self.index
    }

    /// Returns the token.
    #[inline]
    pub fn token(self) -> &'a Token {
        self.tokens.get(self.index)
    }

    /// Returns the token's kind.
    #[inline]
    pub fn kind(self) -> TokenKind {
        self.token().kind
    }

    /// Returns the token's text.
    #[inline]
    pub fn text(self) -> &'a str {
        self.tokens.text(self.index)
    }

    /// Returns the token's byte span.
    #[inline]
    pub fn span(self) -> Span {
        self.token().span
    }

    /// Returns the token's text as printed in s-expressions.
    fn display_text(self) -> String {
        if self.kind() == TokenKind::Eof {
            return "<EOF>".to_string();
        }
        escape_whitespace(self.text())
    }
}

/// A reference to a child of a node.
#[derive(Clone, Copy, Debug)]
pub enum ChildRef<'a> {
    Token(TokenRef<'a>),
    ErrorToken(TokenRef<'a>),
    Node(NodeRef<'a>),
}

impl<'a> ChildRef<'a> {
    /// Returns the node, if this child is a node.
    pub fn as_node(self) -> Option<NodeRef<'a>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) | Self::ErrorToken(_) => None,
        }
    }

    /// Returns the token, if this child is a matched token.
    pub fn as_token(self) -> Option<TokenRef<'a>> {
        match self {
            Self::Token(token) => Some(token),
            Self::ErrorToken(_) | Self::Node(_) => None,
        }
    }

    /// Returns the child's text.
    pub fn text(self) -> &'a str {
        match self {
            Self::Token(token) | Self::ErrorToken(token) => token.text(),
            Self::Node(node) => node.text(),
        }
    }
}

/// A reference to a node in a tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    view: TreeView<'a>,
    id: NodeId,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.rule(), self.id.index())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.view.nodes, other.view.nodes)
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    /// Returns the node's id.
    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Returns the underlying node.
    #[inline]
    pub fn node(self) -> &'a Node {
        &self.view.nodes[self.id]
    }

    /// Returns the tree view this node belongs to.
    #[inline]
    pub fn view(self) -> TreeView<'a> {
        self.view
    }

    /// Returns the node's rule.
    #[inline]
    pub fn rule(self) -> Rule {
        self.node().rule
    }

    /// Returns `true` if the node has the given rule.
    #[inline]
    pub fn is(self, rule: Rule) -> bool {
        self.rule() == rule
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        self.node().parent.map(|id| self.view.node(id))
    }

    /// Returns the ancestors of this node, innermost first.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Returns the number of ancestors.
    pub fn depth(self) -> usize {
        self.ancestors().count()
    }

    /// Returns `true` if a syntax error was recorded in this node.
    #[inline]
    pub fn has_error(self) -> bool {
        self.node().has_error
    }

    /// Returns the number of children.
    #[inline]
    pub fn child_count(self) -> usize {
        self.node().children.len()
    }

    /// Returns the `i`th child.
    pub fn child(self, i: usize) -> Option<ChildRef<'a>> {
        self.node().children.get(i).map(|&c| self.resolve(c))
    }

    /// Returns all children in grammar order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = ChildRef<'a>> + ExactSizeIterator {
        self.node().children.iter().map(move |&c| self.resolve(c))
    }

    /// Returns the child nodes, skipping tokens.
    pub fn child_nodes(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> {
        self.children().filter_map(ChildRef::as_node)
    }

    /// Returns the child nodes of the given rule.
    pub fn children_of(self, rule: Rule) -> impl Iterator<Item = NodeRef<'a>> {
        self.child_nodes().filter(move |n| n.rule() == rule)
    }

    /// Returns the `i`th child node of the given rule.
    pub fn child_of(self, rule: Rule, i: usize) -> Option<Self> {
        self.children_of(rule).nth(i)
    }

    /// Returns the matched tokens of the given kind among the direct children.
    pub fn tokens_of(self, kind: TokenKind) -> impl Iterator<Item = TokenRef<'a>> {
        self.children().filter_map(ChildRef::as_token).filter(move |t| t.kind() == kind)
    }

    /// Returns the first matched token of the given kind among the direct children.
    pub fn token(self, kind: TokenKind) -> Option<TokenRef<'a>> {
        self.tokens_of(kind).next()
    }

    /// Returns the first token among the direct children, matched or skipped.
    pub fn first_token(self) -> Option<TokenRef<'a>> {
        self.children().find_map(|c| match c {
            ChildRef::Token(t) | ChildRef::ErrorToken(t) => Some(t),
            ChildRef::Node(_) => None,
        })
    }

    /// Returns the covered token range, `start..=stop`, or `None` if the node consumed nothing.
    pub fn token_span(self) -> Option<(TokenIndex, TokenIndex)> {
        let node = self.node();
        node.stop.filter(|&stop| stop >= node.start).map(|stop| (node.start, stop))
    }

    /// Returns the covered byte range. Empty nodes have an empty span at their start token.
    pub fn span(self) -> Span {
        let tokens = self.view.tokens;
        match self.token_span() {
            Some((start, stop)) => tokens.get(start).span.to(tokens.get(stop).span),
            None => tokens.get(self.node().start).span.shrink_to_lo(),
        }
    }

    /// Returns the exact source text from the first to the last covered token, including any
    /// whitespace and comments in between.
    pub fn text(self) -> &'a str {
        match self.token_span() {
            Some(_) => &self.view.tokens.src()[self.span().to_range()],
            None => "",
        }
    }

    /// Returns the texts of the covered default-channel tokens, concatenated without separators.
    pub fn compact_text(self) -> String {
        let Some((start, stop)) = self.token_span() else { return String::new() };
        let tokens = self.view.tokens;
        let mut out = String::new();
        for token in &tokens.tokens()[start.index()..=stop.index()] {
            if token.is_default_channel() {
                out.push_str(token.text(tokens.src()));
            }
        }
        out
    }

    /// Iterates over the subtree in document order.
    pub fn preorder(self) -> Preorder<'a> {
        Preorder { stack: vec![Frame::Enter(self)] }
    }

    /// Renders the subtree as an s-expression: `(rule child child ...)`.
    ///
    /// A node without children prints as its bare rule name. Tokens print their text with
    /// whitespace escaped, and the end-of-input marker prints as `<EOF>`.
    pub fn to_string_tree(self) -> String {
        let mut out = String::new();
        let mut first = true;
        for event in self.preorder() {
            match event {
                WalkEvent::Enter(node) => {
                    if !first {
                        out.push(' ');
                    }
                    if node.child_count() == 0 {
                        out.push_str(node.rule().name());
                    } else {
                        let _ = write!(out, "({}", node.rule().name());
                    }
                }
                WalkEvent::Exit(node) => {
                    if node.child_count() != 0 {
                        out.push(')');
                    }
                }
                WalkEvent::Token(token) | WalkEvent::ErrorToken(token) => {
                    if !first {
                        out.push(' ');
                    }
                    out.push_str(&token.display_text());
                }
            }
            first = false;
        }
        out
    }

    /// Converts the subtree to JSON.
    ///
    /// Nodes become `{"rule", "span", "children"}` objects (with `"error": true` when an error was
    /// recorded), tokens become `{"kind", "text"}` objects and skipped tokens additionally carry
    /// `"skipped": true`.
    pub fn to_json(self) -> serde_json::Value {
        use serde_json::{Map, Value, json};

        let mut stack: Vec<Vec<Value>> = vec![Vec::new()];
        for event in self.preorder() {
            match event {
                WalkEvent::Enter(_) => stack.push(Vec::new()),
                WalkEvent::Exit(node) => {
                    let children = stack.pop().unwrap_or_default();
                    let span = node.span();
                    let mut obj = Map::new();
                    obj.insert("rule".into(), node.rule().name().into());
                    obj.insert("span".into(), json!([span.lo().to_u32(), span.hi().to_u32()]));
                    if node.has_error() {
                        obj.insert("error".into(), true.into());
                    }
                    obj.insert("children".into(), Value::Array(children));
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Value::Object(obj));
                    }
                }
                WalkEvent::Token(token) | WalkEvent::ErrorToken(token) => {
                    let mut obj = Map::new();
                    obj.insert("kind".into(), format!("{:?}", token.kind()).into());
                    obj.insert("text".into(), token.text().into());
                    if matches!(event, WalkEvent::ErrorToken(_)) {
                        obj.insert("skipped".into(), true.into());
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Value::Object(obj));
                    }
                }
            }
        }
        stack.pop().and_then(|mut roots| roots.pop()).unwrap_or(Value::Null)
    }

    fn resolve(self, child: Child) -> ChildRef<'a> {
        match child {
            Child::Token(index) => ChildRef::Token(self.view.token(index)),
            Child::ErrorToken(index) => ChildRef::ErrorToken(self.view.token(index)),
            Child::Node(id) => ChildRef::Node(self.view.node(id)),
        }
    }
}

/// An event produced by [`Preorder`].
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(NodeRef<'a>),
    Exit(NodeRef<'a>),
    Token(TokenRef<'a>),
    ErrorToken(TokenRef<'a>),
}

enum Frame<'a> {
    Enter(NodeRef<'a>),
    Exit(NodeRef<'a>),
    Child(ChildRef<'a>),
}

/// A depth-first traversal of a subtree that does not recurse, so arbitrarily deep trees (long
/// operator chains) can be walked.
pub struct Preorder<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.stack.pop()?;
        Some(match frame {
            Frame::Enter(node) | Frame::Child(ChildRef::Node(node)) => {
                self.stack.push(Frame::Exit(node));
                self.stack.extend(node.children().rev().map(Frame::Child));
                WalkEvent::Enter(node)
            }
            Frame::Exit(node) => WalkEvent::Exit(node),
            Frame::Child(ChildRef::Token(token)) => WalkEvent::Token(token),
            Frame::Child(ChildRef::ErrorToken(token)) => WalkEvent::ErrorToken(token),
        })
    }
}

fn escape_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{Channel, LineCol};
    use expect_test::expect;

    /// Lexes `src` by splitting on spaces; every word becomes an identifier except `;`.
    pub(crate) fn words(src: &str) -> TokenStream {
        let mut stream = TokenStream::new(src);
        let mut offset = 0;
        for word in src.split(' ') {
            if !word.is_empty() {
                let kind = match word {
                    ";" => TokenKind::Semi,
                    "+" => TokenKind::Plus,
                    _ => TokenKind::Identifier,
                };
                let start = LineCol { line: 1, col: offset as u32 };
                let end = LineCol { line: 1, col: (offset + word.len()) as u32 };
                stream.push(
                    kind,
                    Channel::Default,
                    Span::from_range(offset..offset + word.len()),
                    start,
                    end,
                );
            }
            offset += word.len() + 1;
        }
        let end = LineCol { line: 1, col: src.len() as u32 };
        stream.push(TokenKind::Eof, Channel::Default, Span::from_range(src.len()..src.len()), end, end);
        stream
    }

    fn t(i: usize) -> TokenIndex {
        TokenIndex::new(i)
    }

    /// Builds `(sourceUnit (expression (expression a) + b) ; <EOF>)` over `a + b ;`.
    pub(crate) fn sample() -> Cst {
        let tokens = words("a + b ;");
        let mut b = CstBuilder::new();
        b.open(Rule::SourceUnit, t(0));
        let lhs = b.open(Rule::Expression, t(0));
        b.token(t(0));
        b.close(Some(t(0)));
        b.wrap(lhs, Rule::Expression);
        b.token(t(1));
        b.token(t(2));
        b.close(Some(t(2)));
        b.token(t(3));
        b.open(Rule::Block, t(4));
        b.close(None);
        b.token(t(4));
        b.close(Some(t(4)));
        b.finish(tokens)
    }

    #[test]
    fn builder_wraps_in_place() {
        let cst = sample();
        let root = cst.root();
        assert_eq!(root.rule(), Rule::SourceUnit);
        assert_eq!(root.parent(), None);
        assert_eq!(root.child_count(), 4);

        let outer = root.child_nodes().next().unwrap();
        assert_eq!(outer.rule(), Rule::Expression);
        assert_eq!(outer.parent(), Some(root));
        assert_eq!(outer.token_span(), Some((t(0), t(2))));
        let inner = outer.child_nodes().next().unwrap();
        assert_eq!(inner.parent(), Some(outer));
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.text(), "a");
        assert_eq!(outer.text(), "a + b");
        assert_eq!(outer.compact_text(), "a+b");
        assert_eq!(outer.token(TokenKind::Plus).unwrap().text(), "+");
    }

    #[test]
    fn empty_node() {
        let cst = sample();
        let block = cst.root().children_of(Rule::Block).next().unwrap();
        assert_eq!(block.token_span(), None);
        assert_eq!(block.text(), "");
        assert_eq!(block.compact_text(), "");
        assert!(block.span().is_empty());
    }

    #[test]
    fn string_tree() {
        let cst = sample();
        expect!["(sourceUnit (expression (expression a) + b) ; block <EOF>)"]
            .assert_eq(&cst.to_string_tree());
    }

    #[test]
    fn json_tree() {
        let cst = sample();
        let json = cst.root().to_json();
        assert_eq!(json["rule"], "sourceUnit");
        assert_eq!(json["children"][0]["rule"], "expression");
        assert_eq!(json["children"][0]["children"][1]["kind"], "Plus");
        assert_eq!(json["children"][0]["span"], serde_json::json!([0, 5]));
        assert_eq!(json["children"][1]["text"], ";");
    }

    #[test]
    fn root_follows_wrap() {
        let tokens = words("a + b");
        let mut b = CstBuilder::new();
        let lhs = b.open(Rule::Expression, t(0));
        b.token(t(0));
        b.close(Some(t(0)));
        b.wrap(lhs, Rule::Expression);
        b.token(t(1));
        b.token(t(2));
        b.close(Some(t(2)));
        let cst = b.finish(tokens);
        assert_eq!(cst.root().text(), "a + b");
        assert_eq!(cst.root().child_count(), 3);
    }
}
