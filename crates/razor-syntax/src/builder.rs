//! Bottom-up construction of green trees.

use razor_errors::RazorDiagnostic;

use crate::{Annotated as _, GreenList, GreenNode, SyntaxAnnotation, SyntaxKind};

#[derive(Debug, Clone, Copy)]
enum Opened {
    /// A node of this kind whose slots start at this index of `children`.
    Node(SyntaxKind, usize),
    List(usize),
}

/// Builds a green tree from a sequence of start/finish calls.
///
/// Every node slot is filled in order, either with a child or with an
/// explicit [`GreenBuilder::empty_slot`]. A list occupies exactly one slot of
/// its node however many elements it has.
#[derive(Default)]
pub struct GreenBuilder {
    children: Vec<Option<GreenNode>>,
    opened: Vec<Opened>,
}

impl Drop for GreenBuilder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `GreenBuilder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 64;
const DEFAULT_CHILDREN_LEN: usize = 256;

impl GreenBuilder {
    pub fn new() -> Self {
        Self {
            children: Vec::with_capacity(DEFAULT_CHILDREN_LEN),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
        }
    }

    #[track_caller]
    fn last_opened(&self) -> Opened {
        *self.opened.last().expect("no opened nodes?")
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        assert!(!kind.is_token() && !kind.is_list(), "{kind:?} cannot be started as a node");
        self.opened.push(Opened::Node(kind, self.children.len()));
    }

    #[track_caller]
    pub fn finish_node(&mut self) {
        let Opened::Node(kind, first_child) = self.last_opened() else {
            panic!("expected an opened node, found an opened list");
        };
        self.opened.pop();
        let node = GreenNode::new(kind, self.children.drain(first_child..));
        self.children.push(Some(node));
    }

    /// Starts a list in the next slot of the current node.
    #[track_caller]
    pub fn start_list(&mut self) {
        assert!(
            matches!(self.opened.last(), Some(Opened::Node(..))),
            "lists must be started directly inside a node"
        );
        self.opened.push(Opened::List(self.children.len()));
    }

    #[track_caller]
    pub fn finish_list(&mut self) {
        let Opened::List(first_child) = self.last_opened() else {
            panic!("expected an opened list, found an opened node");
        };
        self.opened.pop();
        let elements: Vec<GreenNode> = self.children.drain(first_child..).flatten().collect();
        self.children.push(GreenList::new(elements).into_slot());
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.children.push(Some(GreenNode::token(kind, text)));
    }

    /// Adds a zero-width token standing in for absent syntax.
    pub fn missing(&mut self, kind: SyntaxKind) {
        self.children.push(Some(GreenNode::missing(kind)));
    }

    /// Leaves the next slot of the current node empty.
    #[track_caller]
    pub fn empty_slot(&mut self) {
        assert!(
            matches!(self.opened.last(), Some(Opened::Node(..))),
            "list elements cannot be empty"
        );
        self.children.push(None);
    }

    /// Attaches `diagnostics` to the most recently added element.
    #[track_caller]
    pub fn attach_diagnostics(&mut self, diagnostics: &[RazorDiagnostic]) {
        let last = self
            .children
            .last_mut()
            .and_then(Option::as_mut)
            .expect("diagnostics must follow a token or a finished node");
        let mut merged = last.diagnostics();
        merged.extend_from_slice(diagnostics);
        *last = last.set_diagnostics(&merged);
    }

    /// Attaches `annotations` to the most recently added element.
    #[track_caller]
    pub fn attach_annotations(&mut self, annotations: &[SyntaxAnnotation]) {
        let last = self
            .children
            .last_mut()
            .and_then(Option::as_mut)
            .expect("annotations must follow a token or a finished node");
        *last = last.with_additional_annotations(annotations.iter().cloned());
    }

    /// Returns the single root node.
    #[track_caller]
    pub fn finish(mut self) -> GreenNode {
        assert!(self.opened.is_empty(), "unfinished nodes: {:?}", self.opened);
        assert_eq!(self.children.len(), 1, "expected exactly one root");
        self.children.pop().flatten().expect("the root must not be an empty slot")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use razor_errors::TextRange;

    use super::*;
    use crate::Annotated as _;

    #[test]
    fn builds_lists_with_collapse() {
        let mut builder = GreenBuilder::new();
        builder.start_node(SyntaxKind::MARKUP_BLOCK);
        builder.start_list();
        builder.start_node(SyntaxKind::MARKUP_TEXT_LITERAL);
        builder.start_list();
        builder.token(SyntaxKind::TEXT, "a");
        builder.finish_list();
        builder.finish_node();
        builder.start_node(SyntaxKind::MARKUP_TEXT_LITERAL);
        builder.start_list();
        builder.finish_list();
        builder.finish_node();
        builder.finish_list();
        builder.finish_node();
        let root = builder.finish();

        let list = root.slot(0).unwrap();
        assert!(list.is_list());
        assert_eq!(list.slot_count(), 2);
        let first = list.slot(0).unwrap();
        assert_eq!(first.slot(0).map(GreenNode::kind), Some(SyntaxKind::TEXT));
        assert!(list.slot(1).unwrap().slot(0).is_none());
        assert_eq!(root.to_string(), "a");
    }

    #[test]
    fn empty_slots_and_missing_tokens() {
        let diagnostic = RazorDiagnostic::error("RZ1006", "missing", TextRange::empty(1.into()));
        let mut builder = GreenBuilder::new();
        builder.start_node(SyntaxKind::CSHARP_EXPLICIT_EXPRESSION_BODY);
        builder.token(SyntaxKind::LEFT_PAREN, "(");
        builder.empty_slot();
        builder.missing(SyntaxKind::RIGHT_PAREN);
        builder.attach_diagnostics(std::slice::from_ref(&diagnostic));
        builder.finish_node();
        let root = builder.finish();

        assert_eq!(root.slot_count(), 3);
        assert!(root.slot(1).is_none());
        assert!(root.slot(2).unwrap().is_missing());
        assert_eq!(root.collect_diagnostics(), vec![diagnostic]);
    }

    #[test]
    fn annotations_attach_to_finished_nodes() {
        let annotation = SyntaxAnnotation::new("razor.directive");
        let mut builder = GreenBuilder::new();
        builder.start_node(SyntaxKind::MARKUP_BLOCK);
        builder.start_node(SyntaxKind::CSHARP_TRANSITION);
        builder.token(SyntaxKind::TRANSITION, "@");
        builder.finish_node();
        builder.attach_annotations(std::slice::from_ref(&annotation));
        builder.finish_node();
        let root = builder.finish();

        assert!(root.contains_annotations());
        assert!(!root.has_annotation(&annotation));
        assert!(root.slot(0).unwrap().has_annotation(&annotation));
    }

    #[test]
    #[should_panic(expected = "you should call `GreenBuilder::finish()`")]
    fn unfinished_builder_panics() {
        let mut builder = GreenBuilder::new();
        builder.start_node(SyntaxKind::MARKUP_BLOCK);
    }
}
