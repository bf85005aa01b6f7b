//! Positioned, parent-aware facade over green nodes.
//!
//! Red nodes are created on demand while navigating and are never cached by
//! their parents. A child owns its parent chain, not the other way around.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use razor_errors::RazorDiagnostic;
use text_size::{TextRange, TextSize};

use crate::{Annotated, GreenNode, SyntaxKind, SyntaxList};

mod iter;

pub use iter::{
    Children, ChildrenWithTokens, Preorder, PreorderWithTokens, WalkEvent, WalkEventWithTokens,
};

/// A node occurrence: a green node at a position under a parent.
#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

/// A token occurrence: a green token at a position under a parent.
#[derive(Clone)]
pub struct SyntaxToken {
    data: Arc<NodeData>,
}

struct NodeData {
    green: GreenNode,
    parent: Option<SyntaxNode>,
    position: TextSize,
    index: usize,
}

impl NodeData {
    fn new(
        green: GreenNode,
        parent: Option<SyntaxNode>,
        position: TextSize,
        index: usize,
    ) -> Arc<Self> {
        Arc::new(Self { green, parent, position, index })
    }

    #[inline]
    fn span(&self) -> TextRange {
        TextRange::at(self.position, self.green.width())
    }
}

impl Drop for NodeData {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = Arc::into_inner(node.data).and_then(|mut data| data.parent.take());
        }
    }
}

/// Walks both parent chains in lockstep.
fn same_occurrence(mut left: &Arc<NodeData>, mut right: &Arc<NodeData>) -> bool {
    loop {
        if Arc::ptr_eq(left, right) {
            return true;
        }
        if !GreenNode::ptr_eq(&left.green, &right.green)
            || left.position != right.position
            || left.index != right.index
        {
            return false;
        }
        match (&left.parent, &right.parent) {
            (Some(left_parent), Some(right_parent)) => {
                left = &left_parent.data;
                right = &right_parent.data;
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}

fn hash_occurrence<H: Hasher>(data: &NodeData, state: &mut H) {
    data.green.hash(state);
    data.position.hash(state);
    data.index.hash(state);
}

impl SyntaxNode {
    /// Wraps `green` as the root of a tree starting at offset zero.
    pub fn new_root(green: GreenNode) -> Self {
        Self::new(green, None, TextSize::new(0), 0)
    }

    #[track_caller]
    pub(crate) fn new(
        green: GreenNode,
        parent: Option<SyntaxNode>,
        position: TextSize,
        index: usize,
    ) -> Self {
        debug_assert!(!green.is_token(), "{:?} is a token", green.kind());
        Self { data: NodeData::new(green, parent, position, index) }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.data.parent.clone()
    }

    /// Absolute start offset in the source text.
    #[inline]
    pub fn position(&self) -> TextSize {
        self.data.position
    }

    #[inline]
    pub fn end_position(&self) -> TextSize {
        self.span().end()
    }

    #[inline]
    pub fn span(&self) -> TextRange {
        self.data.span()
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.green.width()
    }

    /// Slot index within the parent.
    #[inline]
    pub fn index(&self) -> usize {
        self.data.index
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.green.is_missing()
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.data.green.is_list()
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.data.green.contains_diagnostics()
    }

    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.data.green.contains_annotations()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.green.slot_count()
    }

    /// Returns the red child in slot `index`, `None` if the slot is empty.
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn slot(&self, index: usize) -> Option<SyntaxElement> {
        let green = self.data.green.slot(index)?;
        let position = self.position() + self.data.green.slot_offset(index);
        Some(green.create_red(Some(self.clone()), position, index))
    }

    /// Views slot `index` as a list, whatever its stored shape.
    #[track_caller]
    pub fn list_slot(&self, index: usize) -> SyntaxList {
        assert!(self.kind().is_list_slot(index), "slot {index} of {:?} is not a list", self.kind());
        SyntaxList::new(self.clone(), index)
    }

    /// Children including tokens. List slots are flattened into their
    /// elements and empty slots are skipped.
    pub fn children_with_tokens(&self) -> ChildrenWithTokens {
        ChildrenWithTokens::new(self.clone())
    }

    pub fn children(&self) -> Children {
        Children::new(self.children_with_tokens())
    }

    /// This node and its ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + Clone + use<> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    pub fn preorder(&self) -> Preorder {
        Preorder::new(self.clone())
    }

    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }

    pub fn descendants(&self) -> impl Iterator<Item = Self> + use<> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    pub fn descendant_tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEventWithTokens::Token(token) => Some(token),
            _ => None,
        })
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.descendant_tokens().next()
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        self.last_token_matching(|_| true)
    }

    pub fn first_token_matching(
        &self,
        mut predicate: impl FnMut(&SyntaxToken) -> bool,
    ) -> Option<SyntaxToken> {
        self.descendant_tokens().find(|token| predicate(token))
    }

    pub fn last_token_matching(
        &self,
        mut predicate: impl FnMut(&SyntaxToken) -> bool,
    ) -> Option<SyntaxToken> {
        let mut stack = vec![SyntaxElement::Node(self.clone())];
        while let Some(element) = stack.pop() {
            match element {
                SyntaxElement::Token(token) => {
                    if predicate(&token) {
                        return Some(token);
                    }
                }
                SyntaxElement::Node(node) => {
                    stack.extend((0..node.slot_count()).filter_map(|index| node.slot(index)));
                }
            }
        }
        None
    }

    /// Returns the non-empty tokens touching `offset`.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        if !self.span().contains_inclusive(offset) {
            return TokenAtOffset::None;
        }

        let mut found = Vec::with_capacity(2);
        let mut walk = self.preorder_with_tokens();
        while let Some(event) = walk.next() {
            match event {
                WalkEventWithTokens::EnterNode(node) if !node.span().contains_inclusive(offset) => {
                    walk.skip_subtree();
                }
                WalkEventWithTokens::Token(token)
                    if !token.span().is_empty() && token.span().contains_inclusive(offset) =>
                {
                    found.push(token);
                }
                _ => {}
            }
        }

        let mut found = found.into_iter();
        match (found.next(), found.next()) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(token), None) => TokenAtOffset::Single(token),
            _ => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element whose span contains `range`.
    #[track_caller]
    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        assert!(
            self.span().contains_range(range),
            "{range:?} is outside {:?}@{:?}",
            self.kind(),
            self.span()
        );

        let mut node = self.clone();
        loop {
            let child = node.children_with_tokens().find(|child| {
                let span = child.span();
                !span.is_empty() && span.contains_range(range)
            });
            match child {
                Some(SyntaxElement::Node(child)) => node = child,
                Some(SyntaxElement::Token(token)) => return SyntaxElement::Token(token),
                None => return SyntaxElement::Node(node),
            }
        }
    }

    pub fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Source text covered by this node.
    pub fn text(&self) -> String {
        self.data.green.to_string()
    }

    /// Every diagnostic in this subtree, in document order.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.data.green.collect_diagnostics()
    }

    /// Indented dump of the subtree, one element per line.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    // Infallible for `String`.
                    let _ = writeln!(out, "{:indent$}{node:?}", "", indent = depth * 2);
                    depth += 1;
                }
                WalkEventWithTokens::LeaveNode(_) => depth -= 1,
                WalkEventWithTokens::Token(token) => {
                    let _ = writeln!(out, "{:indent$}{token:?}", "", indent = depth * 2);
                }
            }
        }
        out
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        same_occurrence(&self.data, &other.data)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_occurrence(&self.data, state);
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.green.write_to(f)
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())?;
        if self.data.green.has_diagnostics_directly() {
            f.write_str(" (error)")?;
        }
        Ok(())
    }
}

impl Annotated for SyntaxNode {
    fn green(&self) -> &GreenNode {
        &self.data.green
    }

    /// Rewraps `green` at this node's parent, position and index. The old
    /// parent does not contain the new node.
    fn with_green(&self, green: GreenNode) -> Self {
        Self::new(green, self.parent(), self.position(), self.index())
    }
}

impl From<SyntaxNode> for GreenNode {
    fn from(node: SyntaxNode) -> Self {
        node.data.green.clone()
    }
}

impl From<&SyntaxNode> for GreenNode {
    fn from(node: &SyntaxNode) -> Self {
        node.data.green.clone()
    }
}

impl SyntaxToken {
    #[track_caller]
    pub(crate) fn new(
        green: GreenNode,
        parent: Option<SyntaxNode>,
        position: TextSize,
        index: usize,
    ) -> Self {
        debug_assert!(green.is_token(), "{:?} is not a token", green.kind());
        Self { data: NodeData::new(green, parent, position, index) }
    }

    /// Wraps a detached green token at offset zero.
    #[track_caller]
    pub fn new_root(green: GreenNode) -> Self {
        assert!(green.is_token(), "{:?} is not a token", green.kind());
        Self::new(green, None, TextSize::new(0), 0)
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.data.green.text()
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode> {
        self.data.parent.clone()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + Clone + use<> {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    #[inline]
    pub fn position(&self) -> TextSize {
        self.data.position
    }

    #[inline]
    pub fn end_position(&self) -> TextSize {
        self.span().end()
    }

    #[inline]
    pub fn span(&self) -> TextRange {
        self.data.span()
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.green.width()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.data.index
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.green.is_missing()
    }

    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.kind().is_trivia()
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.data.green.contains_diagnostics()
    }

    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.data.green.diagnostics()
    }

    /// The following token in document order. Zero-width tokens are skipped
    /// unless `include_zero_width` is set.
    pub fn next_token(&self, include_zero_width: bool) -> Option<Self> {
        self.next_token_matching(|token| include_zero_width || !token.span().is_empty())
    }

    pub fn prev_token(&self, include_zero_width: bool) -> Option<Self> {
        self.prev_token_matching(|token| include_zero_width || !token.span().is_empty())
    }

    pub fn next_token_matching(&self, mut predicate: impl FnMut(&Self) -> bool) -> Option<Self> {
        let mut current = SyntaxElement::Token(self.clone());
        loop {
            let parent = current.parent()?;
            for index in current.index() + 1..parent.slot_count() {
                if let Some(sibling) = parent.slot(index)
                    && let Some(token) = sibling.first_token_matching(&mut predicate)
                {
                    return Some(token);
                }
            }
            current = SyntaxElement::Node(parent);
        }
    }

    pub fn prev_token_matching(&self, mut predicate: impl FnMut(&Self) -> bool) -> Option<Self> {
        let mut current = SyntaxElement::Token(self.clone());
        loop {
            let parent = current.parent()?;
            for index in (0..current.index()).rev() {
                if let Some(sibling) = parent.slot(index)
                    && let Some(token) = sibling.last_token_matching(&mut predicate)
                {
                    return Some(token);
                }
            }
            current = SyntaxElement::Node(parent);
        }
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        same_occurrence(&self.data, &other.data)
    }
}

impl Eq for SyntaxToken {}

impl Hash for SyntaxToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_occurrence(&self.data, state);
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())?;
        if self.is_missing() {
            f.write_str(" (missing)")?;
        } else {
            write!(f, " {:?}", self.text())?;
        }
        if self.data.green.has_diagnostics_directly() {
            f.write_str(" (error)")?;
        }
        Ok(())
    }
}

impl Annotated for SyntaxToken {
    fn green(&self) -> &GreenNode {
        &self.data.green
    }

    fn with_green(&self, green: GreenNode) -> Self {
        Self::new(green, self.parent(), self.position(), self.index())
    }
}

impl From<SyntaxToken> for GreenNode {
    fn from(token: SyntaxToken) -> Self {
        token.data.green.clone()
    }
}

impl From<&SyntaxToken> for GreenNode {
    fn from(token: &SyntaxToken) -> Self {
        token.data.green.clone()
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => fmt::Display::fmt(node, f),
            Self::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// A child of a red node.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        self.green().kind()
    }

    pub fn green(&self) -> &GreenNode {
        match self {
            Self::Node(node) => node.green(),
            Self::Token(token) => token.green(),
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            Self::Node(node) => node.parent(),
            Self::Token(token) => token.parent(),
        }
    }

    pub fn position(&self) -> TextSize {
        match self {
            Self::Node(node) => node.position(),
            Self::Token(token) => token.position(),
        }
    }

    pub fn span(&self) -> TextRange {
        match self {
            Self::Node(node) => node.span(),
            Self::Token(token) => token.span(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Node(node) => node.index(),
            Self::Token(token) => token.index(),
        }
    }

    fn first_token_matching(
        &self,
        mut predicate: impl FnMut(&SyntaxToken) -> bool,
    ) -> Option<SyntaxToken> {
        match self {
            Self::Node(node) => node.first_token_matching(predicate),
            Self::Token(token) => predicate(token).then(|| token.clone()),
        }
    }

    fn last_token_matching(
        &self,
        mut predicate: impl FnMut(&SyntaxToken) -> bool,
    ) -> Option<SyntaxToken> {
        match self {
            Self::Node(node) => node.last_token_matching(predicate),
            Self::Token(token) => predicate(token).then(|| token.clone()),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            Self::None => TokenAtOffset::None,
            Self::Single(it) => TokenAtOffset::Single(f(it)),
            Self::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use pretty_assertions::assert_eq;
    use razor_errors::RazorDiagnostic;

    use super::*;
    use crate::{GreenList, SyntaxAnnotation};

    fn token(kind: SyntaxKind, text: &str) -> GreenNode {
        GreenNode::token(kind, text)
    }

    /// `<p>@(x)</p>` with the explicit expression's closing paren optional.
    fn sample(close: Option<GreenNode>) -> SyntaxNode {
        let open_markup = GreenNode::new(
            SyntaxKind::MARKUP_TEXT_LITERAL,
            [GreenList::new([token(SyntaxKind::TEXT, "<p>")]).into_slot()],
        );
        let body = GreenNode::new(
            SyntaxKind::CSHARP_EXPLICIT_EXPRESSION_BODY,
            [
                Some(token(SyntaxKind::LEFT_PAREN, "(")),
                Some(GreenNode::new(
                    SyntaxKind::CSHARP_CODE_BLOCK,
                    [GreenList::new([GreenNode::new(
                        SyntaxKind::CSHARP_EXPRESSION_LITERAL,
                        [GreenList::new([token(SyntaxKind::IDENTIFIER, "x")]).into_slot()],
                    )])
                    .into_slot()],
                )),
                close,
            ],
        );
        let expression = GreenNode::new(
            SyntaxKind::CSHARP_EXPLICIT_EXPRESSION,
            [
                Some(GreenNode::new(
                    SyntaxKind::CSHARP_TRANSITION,
                    [Some(token(SyntaxKind::TRANSITION, "@"))],
                )),
                Some(body),
            ],
        );
        let close_markup = GreenNode::new(
            SyntaxKind::MARKUP_TEXT_LITERAL,
            [GreenList::new([token(SyntaxKind::TEXT, "</"), token(SyntaxKind::TEXT, "p>")])
                .into_slot()],
        );
        let block = GreenNode::new(
            SyntaxKind::MARKUP_BLOCK,
            [GreenList::new([open_markup, expression, close_markup]).into_slot()],
        );
        SyntaxNode::new_root(GreenNode::new(
            SyntaxKind::RAZOR_DOCUMENT,
            [Some(block), Some(GreenNode::missing(SyntaxKind::EOF))],
        ))
    }

    fn complete() -> SyntaxNode {
        sample(Some(token(SyntaxKind::RIGHT_PAREN, ")")))
    }

    #[test]
    fn dump_flattens_lists() {
        expect![[r#"
            RAZOR_DOCUMENT@0..11
              MARKUP_BLOCK@0..11
                MARKUP_TEXT_LITERAL@0..3
                  TEXT@0..3 "<p>"
                CSHARP_EXPLICIT_EXPRESSION@3..7
                  CSHARP_TRANSITION@3..4
                    TRANSITION@3..4 "@"
                  CSHARP_EXPLICIT_EXPRESSION_BODY@4..7
                    LEFT_PAREN@4..5 "("
                    CSHARP_CODE_BLOCK@5..6
                      CSHARP_EXPRESSION_LITERAL@5..6
                        IDENTIFIER@5..6 "x"
                    RIGHT_PAREN@6..7 ")"
                MARKUP_TEXT_LITERAL@7..11
                  TEXT@7..9 "</"
                  TEXT@9..11 "p>"
              EOF@11..11 (missing)
        "#]]
        .assert_eq(&complete().debug_dump());
    }

    #[test]
    fn positions_follow_slot_offsets() {
        let root = complete();
        for node in root.descendants() {
            for index in 0..node.slot_count() {
                if let Some(child) = node.slot(index) {
                    assert_eq!(
                        child.position(),
                        node.position() + node.green().slot_offset(index),
                        "{child:?} in {node:?}"
                    );
                }
            }
        }
        assert_eq!(root.text(), "<p>@(x)</p>");
    }

    #[test]
    fn navigation_between_tokens() {
        let root = complete();
        let first = root.first_token().unwrap();
        assert_eq!(first.text(), "<p>");

        let texts: Vec<_> = std::iter::successors(Some(first), |token| token.next_token(false))
            .map(|token| token.text().to_owned())
            .collect();
        assert_eq!(texts, ["<p>", "@", "(", "x", ")", "</", "p>"]);

        let last = root.last_token().unwrap();
        assert!(last.is_missing());
        assert_eq!(last.prev_token(false).map(|token| token.text().to_owned()), Some("p>".into()));

        let closing = root.descendant_tokens().find(|token| token.text() == "p>").unwrap();
        assert_eq!(closing.next_token(false), None);
        assert!(closing.next_token(true).is_some_and(|token| token.kind() == SyntaxKind::EOF));
    }

    #[test]
    fn navigation_with_predicate() {
        let root = complete();
        let paren = root.descendant_tokens().find(|token| token.text() == "(").unwrap();

        let text = paren.next_token_matching(|token| token.kind() == SyntaxKind::TEXT);
        assert_eq!(text.unwrap().text(), "</");

        let transition = paren.prev_token_matching(|token| token.kind() == SyntaxKind::TRANSITION);
        assert_eq!(transition.unwrap().span(), TextRange::new(3.into(), 4.into()));
    }

    #[test]
    fn token_at_offset_reports_boundaries() {
        let root = complete();

        let TokenAtOffset::Between(left, right) = root.token_at_offset(4.into()) else {
            panic!("expected two tokens");
        };
        assert_eq!((left.text(), right.text()), ("@", "("));

        let single = root.token_at_offset(1.into()).right_biased().unwrap();
        assert_eq!(single.text(), "<p>");

        assert_eq!(root.token_at_offset(11.into()).count(), 1);
        assert!(matches!(root.token_at_offset(12.into()), TokenAtOffset::None));
    }

    #[test]
    fn covering_element_descends_to_smallest() {
        let root = complete();

        let element = root.covering_element(TextRange::new(5.into(), 6.into()));
        assert_eq!(element.kind(), SyntaxKind::IDENTIFIER);

        let element = root.covering_element(TextRange::new(4.into(), 7.into()));
        assert_eq!(element.kind(), SyntaxKind::CSHARP_EXPLICIT_EXPRESSION_BODY);

        let element = root.covering_element(TextRange::new(2.into(), 8.into()));
        assert_eq!(element.kind(), SyntaxKind::MARKUP_BLOCK);
    }

    #[test]
    fn occurrences_compare_by_position_and_parent() {
        let root = complete();
        let again: Vec<_> = root.descendant_tokens().collect();
        let first: Vec<_> = root.descendant_tokens().collect();
        assert_eq!(first, again);

        let other_tree = complete();
        assert_ne!(root, other_tree);
        assert!(root.green().is_equivalent_to(other_tree.green()));

        let x = root.descendant_tokens().find(|token| token.text() == "x").unwrap();
        assert_eq!(x.ancestors().last(), Some(root.clone()));
        assert_eq!(x.parent().unwrap().root(), root);
    }

    #[test]
    fn missing_closer_shows_in_dump() {
        let diagnostic = RazorDiagnostic::error(
            "RZ1006",
            "The explicit expression is missing a \")\" character.",
            TextRange::empty(6.into()),
        );
        let close = GreenNode::missing(SyntaxKind::RIGHT_PAREN)
            .set_diagnostics(std::slice::from_ref(&diagnostic));
        let root = sample(Some(close));

        assert_eq!(root.text(), "<p>@(x</p>");
        assert_eq!(root.diagnostics(), vec![diagnostic]);
        let missing = root.descendant_tokens().find(SyntaxToken::is_missing).unwrap();
        assert_eq!(format!("{missing:?}"), "RIGHT_PAREN@6..6 (missing) (error)");
    }

    #[test]
    fn red_annotation_keeps_position() {
        let root = complete();
        let x = root.descendant_tokens().find(|token| token.text() == "x").unwrap();
        let annotation = SyntaxAnnotation::new("test");
        let annotated = x.with_additional_annotation(annotation.clone());

        assert_eq!(annotated.position(), x.position());
        assert_eq!(annotated.parent(), x.parent());
        assert!(annotated.has_annotation(&annotation));
        assert!(!x.has_annotation(&annotation));
        assert_ne!(annotated, x);
    }

    #[test]
    fn deep_parent_chain_drops_iteratively() {
        let mut green = GreenNode::new(
            SyntaxKind::CSHARP_TRANSITION,
            [Some(token(SyntaxKind::TRANSITION, "@"))],
        );
        for _ in 0..100_000 {
            green = GreenNode::new(SyntaxKind::MARKUP_BLOCK, [Some(green)]);
        }
        let mut node = SyntaxNode::new_root(green);
        while let Some(SyntaxElement::Node(child)) = node.slot(0) {
            node = child;
        }
        assert_eq!(node.kind(), SyntaxKind::CSHARP_TRANSITION);
        drop(node);
    }
}
