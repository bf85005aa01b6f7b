//! Document IR: a flat, source-ordered list of the pieces a code generator
//! emits, lowered from a [`RazorSyntaxTree`].

mod lower;

use std::fmt;

use la_arena::{Arena, Idx};
use razor_parse::RazorSyntaxTree;
use razor_syntax::TextRange;

pub use crate::lower::Lowering;

pub type IrNodeId = Idx<IrNode>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrNode {
    pub kind: IrNodeKind,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrNodeKind {
    /// Markup emitted verbatim. Adjacent runs are merged.
    HtmlContent { content: String },
    /// `@expr` and `@(expr)`.
    CSharpExpression { code: String },
    /// The contents of `@{ ... }`.
    CSharpCode { code: String },
    Using { namespace: String },
    Directive { name: String, value: String },
    Comment { text: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentIr {
    pub nodes: Arena<IrNode>,
}

impl DocumentIr {
    pub fn iter(&self) -> impl Iterator<Item = (IrNodeId, &IrNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn usings(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().filter_map(|node| match &node.kind {
            IrNodeKind::Using { namespace } => Some(namespace.as_str()),
            _ => None,
        })
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn lower(tree: &RazorSyntaxTree) -> DocumentIr {
    let mut lowering = Lowering::new();
    lowering.lower_document(tree);
    lowering.finish()
}

impl fmt::Display for IrNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlContent { content } => write!(f, "html {content:?}"),
            Self::CSharpExpression { code } => write!(f, "expression {code:?}"),
            Self::CSharpCode { code } => write!(f, "code {code:?}"),
            Self::Using { namespace } => write!(f, "using {namespace:?}"),
            Self::Directive { name, value } => write!(f, "directive {name} {value:?}"),
            Self::Comment { text } => write!(f, "comment {text:?}"),
        }
    }
}

impl fmt::Display for DocumentIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes.values() {
            let start: u32 = node.span.start().into();
            let end: u32 = node.span.end().into();
            writeln!(f, "{start}..{end} {}", node.kind)?;
        }
        Ok(())
    }
}
