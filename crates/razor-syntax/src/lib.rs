//! Immutable, lossless syntax trees for Razor documents.
//!
//! Trees have two layers. The green layer ([`GreenNode`]) is position-free,
//! shared and never mutated; edits build new nodes that reuse untouched
//! subtrees. The red layer ([`SyntaxNode`], [`SyntaxToken`]) adds absolute
//! positions and parent links, and is created on demand while navigating.
//!
//! Diagnostics and annotations are rare, so they are kept in process-wide
//! side tables keyed by green node instead of in the nodes themselves.

mod annotation;
/// Typed views over red nodes.
pub mod ast;
mod builder;
mod cache;
mod flags;
mod green;
mod list;
mod replace;
mod side_table;
mod syntax;
mod syntax_kind;
mod visitor;

pub use annotation::{Annotated, AnnotationsOfKind, SyntaxAnnotation};
pub use builder::GreenBuilder;
pub use cache::{Checksum, WeakCache};
pub use flags::NodeFlags;
pub use green::GreenNode;
pub use list::{GreenList, SyntaxList};
pub use replace::ReplaceError;
pub use syntax::{
    Children, ChildrenWithTokens, NodeOrToken, Preorder, PreorderWithTokens, SyntaxElement,
    SyntaxNode, SyntaxToken, TokenAtOffset, WalkEvent, WalkEventWithTokens,
};
pub use syntax_kind::SyntaxKind;
pub use visitor::{SyntaxVisitor, walk};

pub use razor_errors::{RazorDiagnostic, TextRange, TextSize};
