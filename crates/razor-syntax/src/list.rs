//! Homogeneous sequences stored in list slots.
//!
//! A list slot holds nothing for an empty list, the bare element for a
//! one-element list, and a `LIST` node only for two or more elements.
//! [`GreenList`] and [`SyntaxList`] hide that encoding behind a uniform
//! `len`/`get`/`iter` surface.

use std::ops::Range;

use crate::{GreenNode, SyntaxElement, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenList {
    Empty,
    Single(GreenNode),
    Many(GreenNode),
}

impl GreenList {
    /// Builds a list slot value, collapsing zero and one element lists.
    pub fn new(elements: impl IntoIterator<Item = GreenNode>) -> Self {
        let mut elements = elements.into_iter();
        let Some(first) = elements.next() else { return Self::Empty };
        let Some(second) = elements.next() else { return Self::Single(first) };

        let many = [first, second].into_iter().chain(elements);
        Self::Many(GreenNode::list(many))
    }

    /// Views the content of a list slot.
    pub fn from_slot(slot: Option<&GreenNode>) -> Self {
        match slot {
            None => Self::Empty,
            Some(node) if node.is_list() => Self::Many(node.clone()),
            Some(node) => Self::Single(node.clone()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many(list) => list.slot_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&GreenNode> {
        match self {
            Self::Empty => None,
            Self::Single(element) => (index == 0).then_some(element),
            Self::Many(list) => list.slots().nth(index).flatten(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GreenNode> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }

    /// The value to store in the owning node's slot.
    pub fn into_slot(self) -> Option<GreenNode> {
        match self {
            Self::Empty => None,
            Self::Single(node) | Self::Many(node) => Some(node),
        }
    }

    /// Returns a new list with `range` replaced by `replace_with`.
    #[track_caller]
    pub fn splice(
        &self,
        range: Range<usize>,
        replace_with: impl IntoIterator<Item = GreenNode>,
    ) -> Self {
        let mut elements: Vec<GreenNode> = self.iter().cloned().collect();
        elements.splice(range, replace_with);
        Self::new(elements)
    }
}

impl FromIterator<GreenNode> for GreenList {
    fn from_iter<T: IntoIterator<Item = GreenNode>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// A list slot of a red node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxList {
    parent: SyntaxNode,
    slot: usize,
}

impl SyntaxList {
    pub(crate) fn new(parent: SyntaxNode, slot: usize) -> Self {
        Self { parent, slot }
    }

    /// The node owning the list slot.
    pub fn parent(&self) -> &SyntaxNode {
        &self.parent
    }

    pub fn slot_index(&self) -> usize {
        self.slot
    }

    pub fn green(&self) -> GreenList {
        GreenList::from_slot(self.parent.green().slot(self.slot))
    }

    pub fn len(&self) -> usize {
        self.green().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<SyntaxElement> {
        match self.parent.slot(self.slot)? {
            SyntaxElement::Node(list) if list.is_list() => list.slot(index),
            element => (index == 0).then_some(element),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxElement> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::SyntaxKind;

    fn text(text: &str) -> GreenNode {
        GreenNode::token(SyntaxKind::TEXT, text)
    }

    #[test]
    fn collapses_short_lists() {
        assert_eq!(GreenList::new([]), GreenList::Empty);
        assert!(GreenList::new([]).into_slot().is_none());

        let single = text("a");
        let GreenList::Single(element) = GreenList::new([single.clone()]) else {
            panic!("expected a single element");
        };
        assert!(GreenNode::ptr_eq(&element, &single));

        let many = GreenList::new([text("a"), text("b")]);
        assert_eq!(many.len(), 2);
        assert!(many.clone().into_slot().is_some_and(|slot| slot.is_list()));
    }

    #[test]
    fn from_slot_round_trips_the_encoding() {
        let list = GreenList::new([text("a"), text("b"), text("c")]);
        let viewed = GreenList::from_slot(list.clone().into_slot().as_ref());

        assert_eq!(viewed, list);
        assert_eq!(viewed.iter().map(GreenNode::text).collect::<Vec<_>>(), ["a", "b", "c"]);
        assert!(viewed.get(3).is_none());
    }

    #[test]
    fn splice_recollapses() {
        let list = GreenList::new([text("a"), text("b")]);

        let shrunk = list.splice(0..1, []);
        assert!(matches!(shrunk, GreenList::Single(ref element) if element.text() == "b"));

        let emptied = shrunk.splice(0..1, []);
        assert_eq!(emptied, GreenList::Empty);

        let grown = emptied.splice(0..0, [text("x"), text("y"), text("z")]);
        assert_eq!(grown.len(), 3);
    }

    #[test]
    fn red_list_hides_the_collapse() {
        let single =
            GreenNode::new(SyntaxKind::MARKUP_TEXT_LITERAL, [GreenList::new([text("a")]).into_slot()]);
        let many = GreenNode::new(
            SyntaxKind::MARKUP_TEXT_LITERAL,
            [GreenList::new([text("a"), text("b")]).into_slot()],
        );

        let single = SyntaxNode::new_root(single).list_slot(0);
        assert_eq!(single.len(), 1);
        assert_eq!(single.get(0).map(|element| element.kind()), Some(SyntaxKind::TEXT));
        assert!(single.get(1).is_none());

        let many = SyntaxNode::new_root(many).list_slot(0);
        let texts: Vec<_> =
            many.iter().map(|element| element.into_token().unwrap().text().to_owned()).collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(many.get(1).unwrap().span().start(), 1.into());
    }
}
