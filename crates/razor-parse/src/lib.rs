//! Parser for Razor documents.
//!
//! Parsing never fails: malformed input still produces a complete tree, with
//! zero-width missing tokens where syntax is absent and diagnostics attached
//! to the offending tokens and nodes.

use std::fmt;

use razor_errors::RazorDiagnostic;
use razor_syntax::{GreenNode, SyntaxNode, ast};

mod diagnostics;
mod grammar;
mod parser;

/// Annotation kind carried by every `RAZOR_DIRECTIVE` node. Its payload is
/// the [`DirectiveDescriptor`] the directive was parsed with.
pub const DIRECTIVE_ANNOTATION: &str = "razor.directive";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserOptions {
    /// Builds trees for editor tooling, keeping incomplete member accesses
    /// such as `@user.` intact.
    pub design_time: bool,
    /// Recognizes `@using`, `@code` and the other directives. When disabled
    /// they parse as implicit expressions.
    pub allow_directives: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { design_time: false, allow_directives: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Takes the rest of the line as its value.
    SingleLine { requires_value: bool },
    /// Takes a `{ ... }` block of C#.
    CodeBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectiveDescriptor {
    pub name: &'static str,
    pub kind: DirectiveKind,
}

/// The result of parsing one document.
///
/// Two trees are equal only if they share the same root green node, which
/// makes comparison cheap for query caching.
#[derive(Clone)]
pub struct RazorSyntaxTree {
    root: SyntaxNode,
    options: ParserOptions,
}

impl RazorSyntaxTree {
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn document(&self) -> ast::RazorDocument {
        use ast::AstNode as _;

        ast::RazorDocument::cast(self.root.clone())
            .expect("the parser always produces a RAZOR_DOCUMENT root")
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn text(&self) -> String {
        self.root.text()
    }

    /// Every diagnostic in the tree, in document order.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.root.diagnostics()
    }

    pub fn has_errors(&self) -> bool {
        self.root.contains_diagnostics() && self.diagnostics().iter().any(RazorDiagnostic::is_error)
    }
}

impl PartialEq for RazorSyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        GreenNode::ptr_eq(self.root.green(), other.root.green()) && self.options == other.options
    }
}

impl Eq for RazorSyntaxTree {}

impl fmt::Debug for RazorSyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorSyntaxTree")
            .field("root", &self.root)
            .field("options", &self.options)
            .finish()
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn parse(text: &str, options: &ParserOptions) -> RazorSyntaxTree {
    let mut parser = parser::Parser::new(text, *options);
    grammar::document(&mut parser);
    let root = SyntaxNode::new_root(parser.build_tree());

    if root.contains_diagnostics() {
        tracing::debug!(diagnostics = root.diagnostics().len(), "parsed with diagnostics");
    }

    RazorSyntaxTree { root, options: *options }
}
