//! Kind-dispatched visitation of red trees.

use crate::ast::{
    AstNode as _, CSharpCodeBlock, CSharpExplicitExpression, CSharpExplicitExpressionBody,
    CSharpExpressionLiteral, CSharpImplicitExpression, CSharpImplicitExpressionBody,
    CSharpStatement, CSharpStatementBody, CSharpStatementLiteral, CSharpTransition, MarkupBlock,
    MarkupTextLiteral, RazorCommentBlock, RazorDirective, RazorDirectiveBody, RazorDocument,
    RazorMetaCode,
};
use crate::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// A visitor with one method per node kind.
///
/// Every method falls back to [`SyntaxVisitor::default_visit`]. Walkers that
/// want to descend call [`walk`] from there.
pub trait SyntaxVisitor {
    type Output: Default;

    fn default_visit(&mut self, _node: &SyntaxNode) -> Self::Output {
        Self::Output::default()
    }

    fn visit_token(&mut self, _token: &SyntaxToken) -> Self::Output {
        Self::Output::default()
    }

    /// Visits a `LIST` node. Only reached through [`SyntaxNode::accept`] on
    /// the list itself, since children iteration flattens lists.
    fn visit_list(&mut self, node: &SyntaxNode) -> Self::Output {
        self.default_visit(node)
    }

    fn visit_razor_document(&mut self, node: &RazorDocument) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_markup_block(&mut self, node: &MarkupBlock) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_markup_text_literal(&mut self, node: &MarkupTextLiteral) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_code_block(&mut self, node: &CSharpCodeBlock) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_transition(&mut self, node: &CSharpTransition) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_implicit_expression(
        &mut self,
        node: &CSharpImplicitExpression,
    ) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_implicit_expression_body(
        &mut self,
        node: &CSharpImplicitExpressionBody,
    ) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_explicit_expression(
        &mut self,
        node: &CSharpExplicitExpression,
    ) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_explicit_expression_body(
        &mut self,
        node: &CSharpExplicitExpressionBody,
    ) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_statement(&mut self, node: &CSharpStatement) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_statement_body(&mut self, node: &CSharpStatementBody) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_expression_literal(&mut self, node: &CSharpExpressionLiteral) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_csharp_statement_literal(&mut self, node: &CSharpStatementLiteral) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_razor_directive(&mut self, node: &RazorDirective) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_razor_directive_body(&mut self, node: &RazorDirectiveBody) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_razor_meta_code(&mut self, node: &RazorMetaCode) -> Self::Output {
        self.default_visit(node.syntax())
    }

    fn visit_razor_comment_block(&mut self, node: &RazorCommentBlock) -> Self::Output {
        self.default_visit(node.syntax())
    }
}

/// Wraps `node` in its typed view. The kind has already been matched.
fn typed<N: crate::ast::AstNode>(node: &SyntaxNode) -> N {
    N::cast(node.clone()).unwrap_or_else(|| unreachable!("kind was matched before casting"))
}

impl SyntaxNode {
    /// Dispatches to the visitor method for this node's kind.
    pub fn accept<V: SyntaxVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self.kind() {
            SyntaxKind::RAZOR_DOCUMENT => visitor.visit_razor_document(&typed(self)),
            SyntaxKind::MARKUP_BLOCK => visitor.visit_markup_block(&typed(self)),
            SyntaxKind::MARKUP_TEXT_LITERAL => visitor.visit_markup_text_literal(&typed(self)),
            SyntaxKind::CSHARP_CODE_BLOCK => visitor.visit_csharp_code_block(&typed(self)),
            SyntaxKind::CSHARP_TRANSITION => visitor.visit_csharp_transition(&typed(self)),
            SyntaxKind::CSHARP_IMPLICIT_EXPRESSION => {
                visitor.visit_csharp_implicit_expression(&typed(self))
            }
            SyntaxKind::CSHARP_IMPLICIT_EXPRESSION_BODY => {
                visitor.visit_csharp_implicit_expression_body(&typed(self))
            }
            SyntaxKind::CSHARP_EXPLICIT_EXPRESSION => {
                visitor.visit_csharp_explicit_expression(&typed(self))
            }
            SyntaxKind::CSHARP_EXPLICIT_EXPRESSION_BODY => {
                visitor.visit_csharp_explicit_expression_body(&typed(self))
            }
            SyntaxKind::CSHARP_STATEMENT => visitor.visit_csharp_statement(&typed(self)),
            SyntaxKind::CSHARP_STATEMENT_BODY => visitor.visit_csharp_statement_body(&typed(self)),
            SyntaxKind::CSHARP_EXPRESSION_LITERAL => {
                visitor.visit_csharp_expression_literal(&typed(self))
            }
            SyntaxKind::CSHARP_STATEMENT_LITERAL => {
                visitor.visit_csharp_statement_literal(&typed(self))
            }
            SyntaxKind::RAZOR_DIRECTIVE => visitor.visit_razor_directive(&typed(self)),
            SyntaxKind::RAZOR_DIRECTIVE_BODY => visitor.visit_razor_directive_body(&typed(self)),
            SyntaxKind::RAZOR_META_CODE => visitor.visit_razor_meta_code(&typed(self)),
            SyntaxKind::RAZOR_COMMENT_BLOCK => visitor.visit_razor_comment_block(&typed(self)),
            SyntaxKind::LIST => visitor.visit_list(self),
            _ => visitor.default_visit(self),
        }
    }
}

impl SyntaxElement {
    pub fn accept<V: SyntaxVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Node(node) => node.accept(visitor),
            Self::Token(token) => visitor.visit_token(token),
        }
    }
}

/// Visits the children of `node` in document order.
pub fn walk<V: SyntaxVisitor<Output = ()> + ?Sized>(visitor: &mut V, node: &SyntaxNode) {
    for child in node.children_with_tokens() {
        child.accept(visitor);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{GreenList, GreenNode};

    #[derive(Default)]
    struct KindCollector {
        kinds: Vec<SyntaxKind>,
        tokens: Vec<String>,
    }

    impl SyntaxVisitor for KindCollector {
        type Output = ();

        fn default_visit(&mut self, node: &SyntaxNode) {
            self.kinds.push(node.kind());
            walk(self, node);
        }

        fn visit_token(&mut self, token: &SyntaxToken) {
            self.tokens.push(token.text().to_owned());
        }

        fn visit_csharp_transition(&mut self, _node: &CSharpTransition) {
            self.kinds.push(SyntaxKind::CSHARP_TRANSITION);
        }
    }

    struct TextWidth;

    impl SyntaxVisitor for TextWidth {
        type Output = u32;

        fn default_visit(&mut self, node: &SyntaxNode) -> u32 {
            node.width().into()
        }

        fn visit_markup_text_literal(&mut self, node: &MarkupTextLiteral) -> u32 {
            node.tokens().count() as u32
        }
    }

    fn sample() -> SyntaxNode {
        let text = |text: &str| GreenNode::token(SyntaxKind::TEXT, text);
        let literal = GreenNode::new(
            SyntaxKind::MARKUP_TEXT_LITERAL,
            [GreenList::new([text("a"), text("b")]).into_slot()],
        );
        let transition = GreenNode::new(
            SyntaxKind::CSHARP_TRANSITION,
            [Some(GreenNode::token(SyntaxKind::TRANSITION, "@"))],
        );
        let block = GreenNode::new(
            SyntaxKind::MARKUP_BLOCK,
            [GreenList::new([literal, transition]).into_slot()],
        );
        SyntaxNode::new_root(GreenNode::new(
            SyntaxKind::RAZOR_DOCUMENT,
            [Some(block), Some(GreenNode::missing(SyntaxKind::EOF))],
        ))
    }

    #[test]
    fn walker_visits_in_document_order() {
        let mut collector = KindCollector::default();
        sample().accept(&mut collector);

        assert_eq!(
            collector.kinds,
            [
                SyntaxKind::RAZOR_DOCUMENT,
                SyntaxKind::MARKUP_BLOCK,
                SyntaxKind::MARKUP_TEXT_LITERAL,
                SyntaxKind::CSHARP_TRANSITION,
            ]
        );
        // The transition override does not descend.
        assert_eq!(collector.tokens, ["a", "b", ""]);
    }

    #[test]
    fn dispatch_returns_output() {
        let root = sample();
        assert_eq!(root.accept(&mut TextWidth), 3);

        let literal =
            root.descendants().find(|node| node.kind() == SyntaxKind::MARKUP_TEXT_LITERAL);
        assert_eq!(literal.unwrap().accept(&mut TextWidth), 2);

        let list = root.children().next().unwrap().slot(0).unwrap();
        assert!(list.as_node().is_some_and(SyntaxNode::is_list));
        assert_eq!(list.accept(&mut TextWidth), 3);
    }
}
