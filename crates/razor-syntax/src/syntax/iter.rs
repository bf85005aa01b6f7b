use crate::{SyntaxElement, SyntaxNode, SyntaxToken};

/// Children of a node including tokens, with list slots flattened.
#[derive(Clone)]
pub struct ChildrenWithTokens {
    parent: SyntaxNode,
    next_slot: usize,
    active_list: Option<(SyntaxNode, usize)>,
}

impl ChildrenWithTokens {
    pub(super) fn new(parent: SyntaxNode) -> Self {
        Self { parent, next_slot: 0, active_list: None }
    }
}

impl Iterator for ChildrenWithTokens {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((list, next_element)) = &mut self.active_list {
                if *next_element < list.slot_count() {
                    let index = *next_element;
                    *next_element += 1;
                    match list.slot(index) {
                        Some(element) => return Some(element),
                        None => continue,
                    }
                }
                self.active_list = None;
            }

            if self.next_slot >= self.parent.slot_count() {
                return None;
            }
            let index = self.next_slot;
            self.next_slot += 1;

            match self.parent.slot(index) {
                Some(SyntaxElement::Node(list)) if list.is_list() => {
                    self.active_list = Some((list, 0));
                }
                Some(element) => return Some(element),
                None => {}
            }
        }
    }
}

/// Child nodes, skipping tokens.
#[derive(Clone)]
pub struct Children {
    inner: ChildrenWithTokens,
}

impl Children {
    pub(super) fn new(inner: ChildrenWithTokens) -> Self {
        Self { inner }
    }
}

impl Iterator for Children {
    type Item = SyntaxNode;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(SyntaxElement::into_node)
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder {
    inner: PreorderWithTokens,
}

impl Preorder {
    #[inline]
    pub(super) fn new(start: SyntaxNode) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    /// Skips the current subtree during traversal.
    #[inline]
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(SyntaxNode),
    Leave(SyntaxNode),
}

/// Preorder traversal over nodes and tokens. Uses an explicit stack, so
/// arbitrarily deep trees are safe to walk.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, ChildrenWithTokens)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    #[inline]
    pub(super) fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }

    /// Skips the subtree of the node that was just entered.
    #[inline]
    #[track_caller]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEventWithTokens;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root.clone(), root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        };
        match active_node.next() {
            Some(SyntaxElement::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(SyntaxElement::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkEventWithTokens {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}
