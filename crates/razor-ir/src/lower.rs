use razor_parse::{DIRECTIVE_ANNOTATION, DirectiveDescriptor, DirectiveKind, RazorSyntaxTree};
use razor_syntax::ast::{
    AstNode as _, CSharpCodeBlock, CSharpExplicitExpression, CSharpImplicitExpression,
    CSharpStatement, CodeElement, MarkupTextLiteral, RazorCommentBlock, RazorDirective,
};
use razor_syntax::{Annotated as _, SyntaxNode, SyntaxVisitor, TextRange, walk};

use crate::{DocumentIr, IrNode, IrNodeId, IrNodeKind};

/// Walks a syntax tree and collects its IR in document order.
#[derive(Default)]
pub struct Lowering {
    ir: DocumentIr,
    last: Option<IrNodeId>,
}

impl Lowering {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lower_document(&mut self, tree: &RazorSyntaxTree) {
        self.lower_node(tree.root());
    }

    pub fn lower_node(&mut self, node: &SyntaxNode) {
        node.accept(self);
    }

    pub fn finish(self) -> DocumentIr {
        tracing::debug!(nodes = self.ir.len(), "lowered document");
        self.ir
    }

    fn push(&mut self, kind: IrNodeKind, span: TextRange) {
        self.last = Some(self.ir.nodes.alloc(IrNode { kind, span }));
    }

    fn push_html(&mut self, content: String, span: TextRange) {
        if content.is_empty() {
            return;
        }

        if let Some(last) = self.last {
            let node = &mut self.ir.nodes[last];
            if let IrNodeKind::HtmlContent { content: previous } = &mut node.kind
                && node.span.end() == span.start()
            {
                previous.push_str(&content);
                node.span = node.span.cover(span);
                return;
            }
        }

        self.push(IrNodeKind::HtmlContent { content }, span);
    }
}

impl SyntaxVisitor for Lowering {
    type Output = ();

    fn default_visit(&mut self, node: &SyntaxNode) {
        walk(self, node);
    }

    fn visit_markup_text_literal(&mut self, node: &MarkupTextLiteral) {
        self.push_html(node.content(), node.syntax().span());
    }

    fn visit_razor_comment_block(&mut self, node: &RazorCommentBlock) {
        let text = node.comment().map(|token| token.text().to_owned()).unwrap_or_default();
        self.push(IrNodeKind::Comment { text }, node.syntax().span());
    }

    fn visit_csharp_implicit_expression(&mut self, node: &CSharpImplicitExpression) {
        let code = node.body().and_then(|body| body.code());
        self.push(IrNodeKind::CSharpExpression { code: code_text(code) }, node.syntax().span());
    }

    fn visit_csharp_explicit_expression(&mut self, node: &CSharpExplicitExpression) {
        let code = node.body().and_then(|body| body.code());
        self.push(IrNodeKind::CSharpExpression { code: code_text(code) }, node.syntax().span());
    }

    fn visit_csharp_statement(&mut self, node: &CSharpStatement) {
        let code = node.body().and_then(|body| body.code());
        self.push(IrNodeKind::CSharpCode { code: code_text(code) }, node.syntax().span());
    }

    fn visit_razor_directive(&mut self, node: &RazorDirective) {
        let span = node.syntax().span();
        let code = node.body().and_then(|body| body.code());

        let descriptor = node
            .annotations_of_kind(DIRECTIVE_ANNOTATION)
            .find_map(|annotation| annotation.data::<DirectiveDescriptor>().copied());

        let kind = match descriptor {
            Some(DirectiveDescriptor { name: "using", .. }) => {
                IrNodeKind::Using { namespace: directive_value(code.as_ref(), true) }
            }
            Some(DirectiveDescriptor { name, kind }) => {
                let single_line = matches!(kind, DirectiveKind::SingleLine { .. });
                IrNodeKind::Directive {
                    name: name.to_owned(),
                    value: directive_value(code.as_ref(), single_line),
                }
            }
            None => {
                // Rewritten trees may drop the descriptor; fall back to the keyword.
                tracing::debug!(?span, "directive without descriptor");
                IrNodeKind::Directive {
                    name: node.name().unwrap_or_default(),
                    value: directive_value(code.as_ref(), true),
                }
            }
        };
        self.push(kind, span);
    }
}

fn code_text(code: Option<CSharpCodeBlock>) -> String {
    code.map_or_else(String::new, |code| code.code())
}

/// The statement literals of a directive. Block directives only keep what
/// follows the opening brace; single-line values are trimmed.
fn directive_value(code: Option<&CSharpCodeBlock>, single_line: bool) -> String {
    let Some(code) = code else {
        return String::new();
    };

    let mut in_value = single_line;
    let mut value = String::new();
    for element in code.elements() {
        match element {
            CodeElement::MetaCode(_) => in_value = true,
            CodeElement::StatementLiteral(literal) if in_value => {
                value.push_str(&literal.syntax().text());
            }
            _ => {}
        }
    }

    if single_line { value.trim().to_owned() } else { value }
}
