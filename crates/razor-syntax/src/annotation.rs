//! Identity-compared tags that carry out-of-band metadata between passes.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::GreenNode;

/// An opaque tag attached to a node or token.
///
/// Two annotations are equal only if they are the same instance: callers
/// create an annotation, attach it, and later look for nodes carrying exactly
/// that instance. Clones share the instance.
#[derive(Clone)]
pub struct SyntaxAnnotation {
    inner: triomphe::Arc<AnnotationInner>,
}

struct AnnotationInner {
    kind: Box<str>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl SyntaxAnnotation {
    pub fn new(kind: &str) -> Self {
        Self { inner: triomphe::Arc::new(AnnotationInner { kind: kind.into(), data: None }) }
    }

    pub fn with_data<T: Any + Send + Sync>(kind: &str, data: T) -> Self {
        Self {
            inner: triomphe::Arc::new(AnnotationInner {
                kind: kind.into(),
                data: Some(Arc::new(data)),
            }),
        }
    }

    pub fn kind(&self) -> &str {
        &self.inner.kind
    }

    /// Returns the payload if one was attached and it has type `T`.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.inner.data.as_deref()?.downcast_ref()
    }

    fn addr(&self) -> usize {
        std::ptr::from_ref::<AnnotationInner>(&*self.inner).addr()
    }
}

impl PartialEq for SyntaxAnnotation {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for SyntaxAnnotation {}

impl Hash for SyntaxAnnotation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for SyntaxAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxAnnotation")
            .field("kind", &self.kind())
            .field("has_data", &self.inner.data.is_some())
            .finish()
    }
}

/// Annotation queries and "with" operations shared by every syntax type.
///
/// Implementors only say how to reach their green node and how to rewrap a
/// replacement green node; everything else is delegated to the green layer.
/// Operations that change nothing return a clone of `self`, which for
/// reference-counted syntax types is the same instance.
pub trait Annotated: Clone {
    fn green(&self) -> &GreenNode;

    /// Rewraps `green` in the same position as `self`.
    fn with_green(&self, green: GreenNode) -> Self;

    fn with_additional_annotation(&self, annotation: SyntaxAnnotation) -> Self {
        self.with_additional_annotations([annotation])
    }

    fn with_additional_annotations<I>(&self, annotations: I) -> Self
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        let mut annotations = annotations.into_iter().peekable();
        if annotations.peek().is_none() {
            return self.clone();
        }

        let mut merged = self.green().annotations();
        let existing = merged.len();
        for annotation in annotations {
            if !merged.contains(&annotation) {
                merged.push(annotation);
            }
        }

        if merged.len() == existing {
            return self.clone();
        }
        self.with_green(self.green().set_annotations(&merged))
    }

    fn without_annotation(&self, annotation: &SyntaxAnnotation) -> Self {
        self.without_annotations(std::slice::from_ref(annotation))
    }

    fn without_annotations<'a, I>(&self, annotations: I) -> Self
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        if !self.has_any_annotations() {
            return self.clone();
        }

        let removed: Vec<&SyntaxAnnotation> = annotations.into_iter().collect();
        let existing = self.green().annotations();
        let kept: Vec<SyntaxAnnotation> =
            existing.iter().filter(|annotation| !removed.contains(annotation)).cloned().collect();

        if kept.len() == existing.len() {
            return self.clone();
        }
        self.with_green(self.green().set_annotations(&kept))
    }

    fn without_annotations_of_kind(&self, kind: &str) -> Self {
        if !self.has_annotations_of_kind(kind) {
            return self.clone();
        }

        let kept: Vec<SyntaxAnnotation> = self
            .green()
            .annotations()
            .into_iter()
            .filter(|annotation| annotation.kind() != kind)
            .collect();
        self.with_green(self.green().set_annotations(&kept))
    }

    /// Replaces the whole annotation set.
    fn with_annotations<I>(&self, annotations: I) -> Self
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        let mut unique: Vec<SyntaxAnnotation> = Vec::new();
        for annotation in annotations {
            if !unique.contains(&annotation) {
                unique.push(annotation);
            }
        }

        if unique.is_empty() && !self.has_any_annotations() {
            return self.clone();
        }
        self.with_green(self.green().set_annotations(&unique))
    }

    fn has_any_annotations(&self) -> bool {
        self.green().has_annotations_directly()
    }

    fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.has_any_annotations() && self.green().annotations().contains(annotation)
    }

    fn has_annotations_of_kind(&self, kind: &str) -> bool {
        self.has_any_annotations()
            && self.green().annotations().iter().any(|annotation| annotation.kind() == kind)
    }

    fn has_annotations_of_kinds(&self, kinds: &[&str]) -> bool {
        self.has_any_annotations()
            && self
                .green()
                .annotations()
                .iter()
                .any(|annotation| kinds.iter().any(|kind| *kind == annotation.kind()))
    }

    fn annotations(&self) -> Vec<SyntaxAnnotation> {
        self.green().annotations()
    }

    /// Lazily yields the annotations whose kind is `kind`.
    fn annotations_of_kind<'k>(&self, kind: &'k str) -> AnnotationsOfKind<'k> {
        AnnotationsOfKind { annotations: self.green().annotations().into_iter(), kind }
    }

    fn annotations_of_kinds(&self, kinds: &[&str]) -> Vec<SyntaxAnnotation> {
        self.green()
            .annotations()
            .into_iter()
            .filter(|annotation| kinds.iter().any(|kind| *kind == annotation.kind()))
            .collect()
    }

    /// Adds this element's annotations to `target`, typically a structural
    /// replacement for `self`. Returns `target` untouched if there is nothing
    /// to copy.
    fn copy_annotations_to<T: Annotated>(&self, target: T) -> T {
        if !self.has_any_annotations() {
            return target;
        }
        target.with_additional_annotations(self.annotations())
    }
}

/// Iterator returned by [`Annotated::annotations_of_kind`].
pub struct AnnotationsOfKind<'k> {
    annotations: std::vec::IntoIter<SyntaxAnnotation>,
    kind: &'k str,
}

impl Iterator for AnnotationsOfKind<'_> {
    type Item = SyntaxAnnotation;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.kind;
        self.annotations.find(|annotation| annotation.kind() == kind)
    }
}

impl Annotated for GreenNode {
    fn green(&self) -> &GreenNode {
        self
    }

    fn with_green(&self, green: GreenNode) -> Self {
        green
    }
}
