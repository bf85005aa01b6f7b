//! Rewriting a tree by replacing or inserting descendants.
//!
//! Only the ancestors on the path from the rewritten node to each target are
//! rebuilt. Every other subtree of the result is shared with the input.

use std::ops::Range;

use crate::{Annotated as _, GreenList, GreenNode, SyntaxElement, SyntaxNode, SyntaxToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplaceError {
    #[error("the target is not a descendant of the node being rewritten")]
    NotInTree,
    #[error("the target is not an element of a list")]
    NotInList,
}

enum ListEdit {
    Replace,
    InsertBefore,
    InsertAfter,
}

impl ListEdit {
    fn range(&self, index: usize) -> Range<usize> {
        match self {
            Self::Replace => index..index + 1,
            Self::InsertBefore => index..index,
            Self::InsertAfter => index + 1..index + 1,
        }
    }
}

impl SyntaxNode {
    /// Returns a new tree where `old` is replaced with `new`.
    ///
    /// Panics if `old` is not in this tree.
    #[track_caller]
    pub fn replace_node(&self, old: &SyntaxNode, new: impl Into<GreenNode>) -> Self {
        self.try_replace_node(old, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_replace_node(
        &self,
        old: &SyntaxNode,
        new: impl Into<GreenNode>,
    ) -> Result<Self, ReplaceError> {
        let new = new.into();
        if GreenNode::ptr_eq(old.green(), &new) {
            return Ok(self.clone());
        }
        self.replace_elements(vec![SyntaxElement::Node(old.clone())], |_| new.clone())
    }

    /// Replaces every node of `old` with the result of `replacement`, which
    /// receives the original node. When targets are nested the outermost
    /// one wins and the nodes inside it are not visited.
    #[track_caller]
    pub fn replace_nodes(
        &self,
        old: impl IntoIterator<Item = SyntaxNode>,
        replacement: impl FnMut(&SyntaxNode) -> GreenNode,
    ) -> Self {
        self.try_replace_nodes(old, replacement).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_replace_nodes(
        &self,
        old: impl IntoIterator<Item = SyntaxNode>,
        mut replacement: impl FnMut(&SyntaxNode) -> GreenNode,
    ) -> Result<Self, ReplaceError> {
        let targets = old.into_iter().map(SyntaxElement::Node).collect();
        self.replace_elements(targets, |element| match element {
            SyntaxElement::Node(node) => replacement(node),
            SyntaxElement::Token(token) => token.green().clone(),
        })
    }

    /// Replaces `old`, an element of a list, with zero or more nodes.
    #[track_caller]
    pub fn replace_node_with_many(
        &self,
        old: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        self.try_replace_node_with_many(old, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_replace_node_with_many(
        &self,
        old: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        self.edit_list(&SyntaxElement::Node(old.clone()), ListEdit::Replace, new)
    }

    #[track_caller]
    pub fn insert_nodes_before(
        &self,
        anchor: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        self.try_insert_nodes_before(anchor, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_insert_nodes_before(
        &self,
        anchor: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        self.edit_list(&SyntaxElement::Node(anchor.clone()), ListEdit::InsertBefore, new)
    }

    #[track_caller]
    pub fn insert_nodes_after(
        &self,
        anchor: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        self.try_insert_nodes_after(anchor, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_insert_nodes_after(
        &self,
        anchor: &SyntaxNode,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        self.edit_list(&SyntaxElement::Node(anchor.clone()), ListEdit::InsertAfter, new)
    }

    #[track_caller]
    pub fn replace_token(&self, old: &SyntaxToken, new: GreenNode) -> Self {
        self.try_replace_token(old, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_replace_token(
        &self,
        old: &SyntaxToken,
        new: GreenNode,
    ) -> Result<Self, ReplaceError> {
        if GreenNode::ptr_eq(old.green(), &new) {
            return Ok(self.clone());
        }
        self.replace_elements(vec![SyntaxElement::Token(old.clone())], |_| new.clone())
    }

    #[track_caller]
    pub fn replace_tokens(
        &self,
        old: impl IntoIterator<Item = SyntaxToken>,
        replacement: impl FnMut(&SyntaxToken) -> GreenNode,
    ) -> Self {
        self.try_replace_tokens(old, replacement).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_replace_tokens(
        &self,
        old: impl IntoIterator<Item = SyntaxToken>,
        mut replacement: impl FnMut(&SyntaxToken) -> GreenNode,
    ) -> Result<Self, ReplaceError> {
        let targets = old.into_iter().map(SyntaxElement::Token).collect();
        self.replace_elements(targets, |element| match element {
            SyntaxElement::Token(token) => replacement(token),
            SyntaxElement::Node(node) => node.green().clone(),
        })
    }

    #[track_caller]
    pub fn insert_tokens_before(
        &self,
        anchor: &SyntaxToken,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        self.try_insert_tokens_before(anchor, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_insert_tokens_before(
        &self,
        anchor: &SyntaxToken,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        self.edit_list(&SyntaxElement::Token(anchor.clone()), ListEdit::InsertBefore, new)
    }

    #[track_caller]
    pub fn insert_tokens_after(
        &self,
        anchor: &SyntaxToken,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        self.try_insert_tokens_after(anchor, new).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_insert_tokens_after(
        &self,
        anchor: &SyntaxToken,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        self.edit_list(&SyntaxElement::Token(anchor.clone()), ListEdit::InsertAfter, new)
    }

    /// Slot indices leading from `self` down to `element`.
    fn path_to(&self, element: &SyntaxElement) -> Result<Vec<usize>, ReplaceError> {
        let mut path = Vec::new();
        let mut current = element.clone();
        loop {
            if let SyntaxElement::Node(node) = &current
                && node == self
            {
                path.reverse();
                return Ok(path);
            }
            let parent = current.parent().ok_or(ReplaceError::NotInTree)?;
            path.push(current.index());
            current = SyntaxElement::Node(parent);
        }
    }

    fn replace_elements(
        &self,
        targets: Vec<SyntaxElement>,
        mut replacement: impl FnMut(&SyntaxElement) -> GreenNode,
    ) -> Result<Self, ReplaceError> {
        let mut edits = targets
            .into_iter()
            .map(|target| Ok((self.path_to(&target)?, target)))
            .collect::<Result<Vec<_>, ReplaceError>>()?;
        edits.sort_by(|(left, _), (right, _)| left.cmp(right));

        // A path sorts right after the paths that are its prefixes.
        let mut kept: Vec<(Vec<usize>, SyntaxElement)> = Vec::with_capacity(edits.len());
        for (path, target) in edits {
            if kept.last().is_some_and(|(outer, _)| path.starts_with(outer)) {
                continue;
            }
            kept.push((path, target));
        }

        let mut green = self.green().clone();
        for (path, target) in &kept {
            let new = replacement(target);
            green = match path.split_last() {
                None => new,
                Some((&last, ancestors)) => rebuild(&green, ancestors, last, Some(new)),
            };
        }

        tracing::debug!(targets = kept.len(), "replaced descendants");
        Ok(self.with_green(green))
    }

    fn edit_list(
        &self,
        anchor: &SyntaxElement,
        edit: ListEdit,
        new: impl IntoIterator<Item = GreenNode>,
    ) -> Result<Self, ReplaceError> {
        let path = self.path_to(anchor)?;
        if anchor.as_node().is_some_and(SyntaxNode::is_list) {
            return Err(ReplaceError::NotInList);
        }
        let parent = anchor.parent().ok_or(ReplaceError::NotInList)?;

        // Either the anchor is one of several elements held by a `LIST` node,
        // or it is the only element and sits directly in the list slot.
        let (slot_path, element_index) = if parent.is_list() {
            match path.split_last() {
                Some((&index, slot_path)) if !slot_path.is_empty() => (slot_path, index),
                _ => return Err(ReplaceError::NotInList),
            }
        } else if !path.is_empty() && parent.kind().is_list_slot(anchor.index()) {
            (path.as_slice(), 0)
        } else {
            return Err(ReplaceError::NotInList);
        };

        let Some((&slot, holder_path)) = slot_path.split_last() else {
            return Err(ReplaceError::NotInList);
        };
        let holder = descend(self.green(), holder_path);
        let list = GreenList::from_slot(holder.slot(slot)).splice(edit.range(element_index), new);

        tracing::debug!(slot, elements = list.len(), "rebuilt list");
        let green = rebuild(self.green(), holder_path, slot, list.into_slot());
        Ok(self.with_green(green))
    }
}

fn descend(root: &GreenNode, path: &[usize]) -> GreenNode {
    let mut node = root.clone();
    for &index in path {
        node = node.slot(index).cloned().expect("path follows present slots");
    }
    node
}

/// Rebuilds `root` with slot `slot` of the node at `ancestors` set to
/// `replacement`.
fn rebuild(
    root: &GreenNode,
    ancestors: &[usize],
    slot: usize,
    replacement: Option<GreenNode>,
) -> GreenNode {
    let mut spine = Vec::with_capacity(ancestors.len() + 1);
    let mut node = root.clone();
    for &index in ancestors {
        let child = node.slot(index).cloned().expect("path follows present slots");
        spine.push(node);
        node = child;
    }

    let mut rebuilt = node.with_slot(slot, replacement);
    for (parent, &index) in spine.iter().rev().zip(ancestors.iter().rev()) {
        rebuilt = parent.with_slot(index, Some(rebuilt));
    }
    rebuilt
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Annotated, SyntaxAnnotation, SyntaxKind};

    fn text(text: &str) -> GreenNode {
        GreenNode::token(SyntaxKind::TEXT, text)
    }

    fn literal(texts: &[&str]) -> GreenNode {
        GreenNode::new(
            SyntaxKind::MARKUP_TEXT_LITERAL,
            [GreenList::new(texts.iter().copied().map(text)).into_slot()],
        )
    }

    fn document(literals: Vec<GreenNode>) -> SyntaxNode {
        let block =
            GreenNode::new(SyntaxKind::MARKUP_BLOCK, [GreenList::new(literals).into_slot()]);
        SyntaxNode::new_root(GreenNode::new(
            SyntaxKind::RAZOR_DOCUMENT,
            [Some(block), Some(GreenNode::missing(SyntaxKind::EOF))],
        ))
    }

    fn literals(root: &SyntaxNode) -> Vec<SyntaxNode> {
        root.descendants().filter(|node| node.kind() == SyntaxKind::MARKUP_TEXT_LITERAL).collect()
    }

    #[test]
    fn replace_node_shares_untouched_subtrees() {
        let root = document(vec![literal(&["a"]), literal(&["b"]), literal(&["c"])]);
        let [first, second, third] = literals(&root).try_into().unwrap();

        let new_root = root.replace_node(&second, literal(&["B"]));
        assert_eq!(new_root.text(), "aBc");
        assert_eq!(root.text(), "abc");

        let new_literals = literals(&new_root);
        assert!(GreenNode::ptr_eq(new_literals[0].green(), first.green()));
        assert!(GreenNode::ptr_eq(new_literals[2].green(), third.green()));
        assert!(new_root.parent().is_none());
    }

    #[test]
    fn replace_with_same_green_is_identity() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let first = literals(&root).remove(0);

        let same = root.replace_node(&first, first.green().clone());
        assert!(GreenNode::ptr_eq(same.green(), root.green()));
    }

    #[test]
    fn replace_node_outside_tree_fails() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let other = document(vec![literal(&["a"]), literal(&["b"])]);
        let foreign = literals(&other).remove(0);

        assert_eq!(root.try_replace_node(&foreign, literal(&["x"])), Err(ReplaceError::NotInTree));
    }

    #[test]
    fn nested_targets_keep_outermost() {
        let root = document(vec![literal(&["a", "b"]), literal(&["c"])]);
        let block = root.children().next().unwrap();
        let first = literals(&root).remove(0);

        let mut seen = Vec::new();
        let new_root = root.replace_nodes([first, block.clone()], |node| {
            seen.push(node.kind());
            literal(&["z"])
        });

        assert_eq!(seen, [SyntaxKind::MARKUP_BLOCK]);
        assert_eq!(new_root.text(), "z");
    }

    #[test]
    fn replace_many_recollapses_the_list() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let second = literals(&root).remove(1);

        let shrunk = root.replace_node_with_many(&second, []);
        assert_eq!(shrunk.text(), "a");
        let block = shrunk.children().next().unwrap();
        let only = block.green().slot(0).unwrap();
        assert_eq!(only.kind(), SyntaxKind::MARKUP_TEXT_LITERAL);

        let only = literals(&shrunk).remove(0);
        let grown = shrunk.insert_nodes_after(&only, [literal(&["b"]), literal(&["c"])]);
        assert_eq!(grown.text(), "abc");
        assert!(grown.children().next().unwrap().green().slot(0).unwrap().is_list());

        let grown = grown.insert_nodes_before(&literals(&grown).remove(0), [literal(&["0"])]);
        assert_eq!(grown.text(), "0abc");
    }

    #[test]
    fn list_edits_require_list_elements() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let block = root.children().next().unwrap();

        assert_eq!(
            root.try_insert_nodes_before(&block, [literal(&["x"])]),
            Err(ReplaceError::NotInList)
        );
        assert_eq!(root.try_replace_node_with_many(&root, []), Err(ReplaceError::NotInList));
    }

    #[test]
    fn list_node_is_not_an_anchor() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let block = root.children().next().unwrap();
        let list = block.slot(0).and_then(SyntaxElement::into_node).unwrap();
        assert!(list.is_list());

        assert_eq!(
            root.try_insert_nodes_before(&list, [literal(&["x"])]),
            Err(ReplaceError::NotInList)
        );
        assert_eq!(root.try_insert_nodes_after(&list, []), Err(ReplaceError::NotInList));
        assert_eq!(
            root.try_replace_node_with_many(&list, [literal(&["x"])]),
            Err(ReplaceError::NotInList)
        );
        assert_eq!(root.text(), "ab");
    }

    #[test]
    fn token_edits() {
        let root = document(vec![literal(&["a", "b"]), literal(&["c"])]);
        let tokens: Vec<_> = root.descendant_tokens().collect();

        let replaced = root.replace_token(&tokens[1], text("B"));
        assert_eq!(replaced.text(), "aBc");

        let upper = root.replace_tokens(tokens.iter().cloned(), |token| {
            if token.is_missing() {
                token.green().clone()
            } else {
                text(&token.text().to_uppercase())
            }
        });
        assert_eq!(upper.text(), "ABC");

        let inserted = root.insert_tokens_before(&tokens[2], [text("-")]);
        assert_eq!(inserted.text(), "ab-c");

        let inserted = root.insert_tokens_after(&tokens[0], [text("1"), text("2")]);
        assert_eq!(inserted.text(), "a12bc");

        let eof = tokens.last().unwrap();
        assert_eq!(root.try_insert_tokens_after(eof, [text("x")]), Err(ReplaceError::NotInList));
    }

    #[test]
    fn replacement_keeps_root_annotations() {
        let annotation = SyntaxAnnotation::new("root");
        let root = document(vec![literal(&["a"]), literal(&["b"])])
            .with_additional_annotation(annotation.clone());
        let first = literals(&root).remove(0);

        let new_root = root.replace_node(&first, literal(&["x"]));
        assert!(new_root.has_annotation(&annotation));
    }

    #[test]
    fn replacing_a_subtree_root_rewraps_in_place() {
        let root = document(vec![literal(&["a"]), literal(&["b"])]);
        let second = literals(&root).remove(1);
        let token = second.first_token().unwrap();

        let new_second = second.replace_token(&token, text("x"));
        assert_eq!(new_second.text(), "x");
        assert_eq!(new_second.position(), second.position());
        assert_eq!(new_second.parent(), second.parent());
    }
}
