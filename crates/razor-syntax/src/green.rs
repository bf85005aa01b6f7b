//! Canonical, position-free, immutable syntax nodes.
//!
//! A [`GreenNode`] is either a token, which owns its text, or an interior
//! node, which owns a fixed number of optional slots. Nodes never change after
//! construction; every "with" operation builds a new node that shares the
//! untouched children by reference.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use razor_errors::RazorDiagnostic;
use text_size::TextSize;
use triomphe::Arc as GreenArc;

use crate::side_table::{ANNOTATIONS, DIAGNOSTICS};
use crate::{NodeFlags, SyntaxAnnotation, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Handle to an immutable green node. Cloning is a reference count bump.
///
/// `==` is identity. Use [`GreenNode::is_equivalent_to`] for structural
/// comparison.
#[derive(Clone)]
pub struct GreenNode {
    data: GreenArc<GreenNodeData>,
}

struct GreenNodeData {
    kind: SyntaxKind,
    flags: NodeFlags,
    width: TextSize,
    payload: Payload,
}

#[derive(Clone)]
enum Payload {
    Token(Box<str>),
    /// `offsets[i]` is the start of slot `i` relative to the node.
    Node { slots: Box<[Option<GreenNode>]>, offsets: Box<[TextSize]> },
}

impl GreenNode {
    /// Creates an interior node from its slots. `None` marks an absent
    /// optional child.
    ///
    /// Lists are built with [`GreenList::new`](crate::GreenList::new).
    #[track_caller]
    pub fn new(kind: SyntaxKind, slots: impl IntoIterator<Item = Option<GreenNode>>) -> Self {
        assert!(!kind.is_token(), "{kind:?} is a token kind");
        assert!(!kind.is_list(), "lists are built with `GreenList::new`");
        Self::interior(kind, slots.into_iter().collect(), None, None)
    }

    /// Creates a `LIST` node holding `elements` as-is. Only
    /// [`GreenList::new`](crate::GreenList::new) calls this, after it has
    /// collapsed short lists.
    pub(crate) fn list(elements: impl IntoIterator<Item = GreenNode>) -> Self {
        Self::interior(SyntaxKind::LIST, elements.into_iter().map(Some).collect(), None, None)
    }

    #[track_caller]
    pub fn token(kind: SyntaxKind, text: &str) -> Self {
        assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self::alloc(kind, NodeFlags::empty(), TextSize::of(text), Payload::Token(text.into()))
    }

    /// Creates a zero-width token standing in for expected but absent syntax.
    #[track_caller]
    pub fn missing(kind: SyntaxKind) -> Self {
        assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self::alloc(
            kind,
            NodeFlags::IS_MISSING | NodeFlags::CONTAINS_MISSING,
            TextSize::new(0),
            Payload::Token("".into()),
        )
    }

    fn interior(
        kind: SyntaxKind,
        slots: Box<[Option<GreenNode>]>,
        diagnostics: Option<Arc<[RazorDiagnostic]>>,
        annotations: Option<Arc<[SyntaxAnnotation]>>,
    ) -> Self {
        let mut flags = if kind.is_list() { NodeFlags::IS_LIST } else { NodeFlags::empty() };
        let mut width = TextSize::new(0);
        let mut offsets = Vec::with_capacity(slots.len());
        for slot in &slots {
            offsets.push(width);
            if let Some(child) = slot {
                width += child.width();
                flags |= child.flags() & NodeFlags::INHERITED;
            }
        }
        let payload = Payload::Node { slots, offsets: offsets.into_boxed_slice() };
        Self::with_side_tables(kind, flags, width, payload, diagnostics, annotations)
    }

    fn with_side_tables(
        kind: SyntaxKind,
        mut flags: NodeFlags,
        width: TextSize,
        payload: Payload,
        diagnostics: Option<Arc<[RazorDiagnostic]>>,
        annotations: Option<Arc<[SyntaxAnnotation]>>,
    ) -> Self {
        let diagnostics = diagnostics.filter(|it| !it.is_empty());
        let annotations = annotations.filter(|it| !it.is_empty());
        if diagnostics.is_some() {
            flags |= NodeFlags::CONTAINS_DIAGNOSTICS | NodeFlags::HAS_DIAGNOSTICS_DIRECTLY;
        }
        if annotations.is_some() {
            flags |= NodeFlags::CONTAINS_ANNOTATIONS | NodeFlags::HAS_ANNOTATIONS_DIRECTLY;
        }

        let node = Self::alloc(kind, flags, width, payload);
        if let Some(diagnostics) = diagnostics {
            DIAGNOSTICS.insert(node.key(), diagnostics);
        }
        if let Some(annotations) = annotations {
            ANNOTATIONS.insert(node.key(), annotations);
        }
        node
    }

    fn alloc(kind: SyntaxKind, flags: NodeFlags, width: TextSize, payload: Payload) -> Self {
        Self { data: GreenArc::new(GreenNodeData { kind, flags, width, payload }) }
    }

    /// Rebuilds this node with new side-table contents, keeping kind, text
    /// and children. Only the `*_DIRECTLY` bits and the `CONTAINS_*` bits they
    /// imply are recomputed.
    fn with_metadata(
        &self,
        diagnostics: Option<Arc<[RazorDiagnostic]>>,
        annotations: Option<Arc<[SyntaxAnnotation]>>,
    ) -> Self {
        let mut flags = self.flags()
            - (NodeFlags::CONTAINS_DIAGNOSTICS
                | NodeFlags::HAS_DIAGNOSTICS_DIRECTLY
                | NodeFlags::CONTAINS_ANNOTATIONS
                | NodeFlags::HAS_ANNOTATIONS_DIRECTLY);
        for child in self.slots().flatten() {
            flags |= child.flags()
                & (NodeFlags::CONTAINS_DIAGNOSTICS | NodeFlags::CONTAINS_ANNOTATIONS);
        }
        Self::with_side_tables(
            self.kind(),
            flags,
            self.width(),
            self.data.payload.clone(),
            diagnostics,
            annotations,
        )
    }

    /// Address of the shared allocation, used as the side-table key.
    #[inline]
    pub(crate) fn key(&self) -> usize {
        std::ptr::from_ref::<GreenNodeData>(&*self.data).addr()
    }

    /// Returns `true` if both handles point at the same node.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.key() == other.key()
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.data.flags
    }

    /// Total length of the text spanned by this node.
    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.width
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self.data.payload, Payload::Token(_))
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.flags().contains(NodeFlags::IS_LIST)
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags().contains(NodeFlags::IS_MISSING)
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.flags().contains(NodeFlags::CONTAINS_DIAGNOSTICS)
    }

    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.flags().contains(NodeFlags::CONTAINS_ANNOTATIONS)
    }

    #[inline]
    pub fn has_annotations_directly(&self) -> bool {
        self.flags().contains(NodeFlags::HAS_ANNOTATIONS_DIRECTLY)
    }

    #[inline]
    pub fn has_diagnostics_directly(&self) -> bool {
        self.flags().contains(NodeFlags::HAS_DIAGNOSTICS_DIRECTLY)
    }

    /// Token text, or `None` for interior nodes.
    #[inline]
    pub fn token_text(&self) -> Option<&str> {
        match &self.data.payload {
            Payload::Token(text) => Some(text),
            Payload::Node { .. } => None,
        }
    }

    #[track_caller]
    pub fn text(&self) -> &str {
        self.token_text()
            .unwrap_or_else(|| panic!("{:?} is not a token and has no text of its own", self.kind()))
    }

    #[inline]
    fn slot_array(&self) -> &[Option<GreenNode>] {
        match &self.data.payload {
            Payload::Token(_) => &[],
            Payload::Node { slots, .. } => slots,
        }
    }

    #[inline]
    fn offset_array(&self) -> &[TextSize] {
        match &self.data.payload {
            Payload::Token(_) => &[],
            Payload::Node { offsets, .. } => offsets,
        }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_array().len()
    }

    /// Returns the child in slot `index`, `None` if the slot is empty.
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn slot(&self, index: usize) -> Option<&GreenNode> {
        let slots = self.slot_array();
        assert!(
            index < slots.len(),
            "slot {index} out of range for {:?} with {} slots",
            self.kind(),
            slots.len()
        );
        slots[index].as_ref()
    }

    pub fn slots(&self) -> impl ExactSizeIterator<Item = Option<&GreenNode>> + DoubleEndedIterator + Clone + '_ {
        self.slot_array().iter().map(Option::as_ref)
    }

    /// Offset of slot `index` relative to the start of this node.
    #[track_caller]
    pub fn slot_offset(&self, index: usize) -> TextSize {
        let offsets = self.offset_array();
        assert!(index <= offsets.len(), "slot {index} out of range for {:?}", self.kind());
        offsets.get(index).copied().unwrap_or_else(|| self.width())
    }

    /// Returns the slot whose span contains `offset`, relative to the start
    /// of this node. Requires `0 <= offset < width`.
    #[track_caller]
    pub fn find_slot_index_containing_offset(&self, offset: TextSize) -> usize {
        assert!(
            offset < self.width(),
            "offset {offset:?} is outside {:?} of width {:?}",
            self.kind(),
            self.width()
        );

        // Empty and zero-width slots share their start with the slot that
        // follows them, so the last slot starting at or before `offset` is
        // the one that spans it.
        self.offset_array().partition_point(|&start| start <= offset) - 1
    }

    /// Returns a copy with slot `index` replaced, sharing every other child.
    /// Diagnostics and annotations attached to this node are carried over.
    #[track_caller]
    pub fn with_slot(&self, index: usize, child: Option<GreenNode>) -> Self {
        let mut slots: Box<[Option<GreenNode>]> = self.slot_array().into();
        assert!(index < slots.len(), "slot {index} out of range for {:?}", self.kind());
        slots[index] = child;
        self.with_slots(slots)
    }

    pub(crate) fn with_slots(&self, slots: Box<[Option<GreenNode>]>) -> Self {
        assert!(!self.is_token(), "{:?} is a token and has no slots", self.kind());
        Self::interior(self.kind(), slots, self.diagnostic_entry(), self.annotation_entry())
    }

    /// Returns a node identical to this one whose annotation set is exactly
    /// `annotations`. An empty slice clears it.
    pub fn set_annotations(&self, annotations: &[SyntaxAnnotation]) -> Self {
        self.with_metadata(self.diagnostic_entry(), Some(annotations.into()))
    }

    /// Returns a node identical to this one whose own diagnostics are exactly
    /// `diagnostics`. An empty slice clears them.
    pub fn set_diagnostics(&self, diagnostics: &[RazorDiagnostic]) -> Self {
        self.with_metadata(Some(diagnostics.into()), self.annotation_entry())
    }

    pub(crate) fn annotation_entry(&self) -> Option<Arc<[SyntaxAnnotation]>> {
        if !self.has_annotations_directly() {
            return None;
        }
        let entry = ANNOTATIONS.get(self.key()).unwrap_or_else(|| {
            panic!("{:?} is flagged with annotations but has no side-table entry", self.kind())
        });
        Some(entry)
    }

    pub(crate) fn diagnostic_entry(&self) -> Option<Arc<[RazorDiagnostic]>> {
        if !self.has_diagnostics_directly() {
            return None;
        }
        let entry = DIAGNOSTICS.get(self.key()).unwrap_or_else(|| {
            panic!("{:?} is flagged with diagnostics but has no side-table entry", self.kind())
        });
        Some(entry)
    }

    /// Annotations attached directly to this node.
    pub fn annotations(&self) -> Vec<SyntaxAnnotation> {
        self.annotation_entry().map(|entry| entry.to_vec()).unwrap_or_default()
    }

    /// Diagnostics attached directly to this node.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.diagnostic_entry().map(|entry| entry.to_vec()).unwrap_or_default()
    }

    /// Collects the diagnostics of this subtree in document order, skipping
    /// subtrees that contain none.
    pub fn collect_diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut diagnostics = Vec::new();
        if !self.contains_diagnostics() {
            return diagnostics;
        }

        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(entry) = node.diagnostic_entry() {
                diagnostics.extend(entry.iter().cloned());
            }
            stack.extend(node.slots().rev().flatten().filter(|child| child.contains_diagnostics()));
        }
        diagnostics
    }

    /// Structural comparison.
    ///
    /// A `LIST` holding a single element is equivalent to that element, so
    /// trees that differ only in how a one-element list is represented
    /// compare equal. Tokens compare by text; empty slots must line up.
    pub fn is_equivalent_to(&self, other: &GreenNode) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            let (left, right) = unwrap_singleton_lists(left, right);
            if Self::ptr_eq(left, right) {
                continue;
            }
            if left.kind() != right.kind()
                || left.width() != right.width()
                || left.slot_count() != right.slot_count()
                || left.is_missing() != right.is_missing()
                || left.token_text() != right.token_text()
            {
                return false;
            }
            for (left, right) in left.slots().zip(right.slots()) {
                match (left, right) {
                    (Some(left), Some(right)) => stack.push((left, right)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// Writes the text of every token under this node, without recursion.
    pub fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.data.payload {
                Payload::Token(text) => out.write_str(text)?,
                Payload::Node { slots, .. } => stack.extend(slots.iter().rev().flatten()),
            }
        }
        Ok(())
    }

    /// Wraps this node in a positioned facade.
    pub fn create_red(
        &self,
        parent: Option<SyntaxNode>,
        position: TextSize,
        index: usize,
    ) -> SyntaxElement {
        if self.is_token() {
            SyntaxElement::Token(SyntaxToken::new(self.clone(), parent, position, index))
        } else {
            SyntaxElement::Node(SyntaxNode::new(self.clone(), parent, position, index))
        }
    }
}

/// Looks through a one-element `LIST` on either side when the kinds differ.
fn unwrap_singleton_lists<'a>(
    mut left: &'a GreenNode,
    mut right: &'a GreenNode,
) -> (&'a GreenNode, &'a GreenNode) {
    if left.kind() == right.kind() {
        return (left, right);
    }
    if left.is_list()
        && left.slot_count() == 1
        && let Some(element) = left.slot(0)
    {
        left = element;
    }
    if right.is_list()
        && right.slot_count() == 1
        && let Some(element) = right.slot(0)
    {
        right = element;
    }
    (left, right)
}

impl Drop for GreenNodeData {
    fn drop(&mut self) {
        let key = std::ptr::from_ref::<Self>(self).addr();
        if self.flags.contains(NodeFlags::HAS_ANNOTATIONS_DIRECTLY) {
            ANNOTATIONS.remove(key);
        }
        if self.flags.contains(NodeFlags::HAS_DIAGNOSTICS_DIRECTLY) {
            DIAGNOSTICS.remove(key);
        }

        // Tear uniquely owned subtrees down iteratively so that dropping a
        // deeply nested tree cannot overflow the stack.
        let Payload::Node { slots, .. } = &mut self.payload else { return };
        let mut stack: Vec<GreenNode> = std::mem::take(slots).into_vec().into_iter().flatten().collect();
        while let Some(mut node) = stack.pop() {
            if let Some(data) = GreenArc::get_mut(&mut node.data)
                && let Payload::Node { slots, .. } = &mut data.payload
            {
                stack.extend(std::mem::take(slots).into_vec().into_iter().flatten());
            }
        }
    }
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Eq for GreenNode {}

impl Hash for GreenNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("GreenNode");
        debug.field("kind", &self.kind()).field("width", &self.width());
        match &self.data.payload {
            Payload::Token(text) => debug.field("text", text),
            Payload::Node { slots, .. } => debug.field("slots", &slots.len()),
        };
        if !self.flags().is_empty() {
            debug.field("flags", &self.flags());
        }
        debug.finish()
    }
}
