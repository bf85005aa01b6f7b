//! Typed views over red nodes.
//!
//! Slot layouts:
//!
//! | kind | slots |
//! |---|---|
//! | `RAZOR_DOCUMENT` | markup block, `EOF` |
//! | `MARKUP_BLOCK` | list of markup literals, code blocks and comments |
//! | `MARKUP_TEXT_LITERAL` | list of tokens |
//! | `CSHARP_CODE_BLOCK` | list of expressions, statements, directives, literals and meta code |
//! | `CSHARP_TRANSITION` | `@` |
//! | `CSHARP_IMPLICIT_EXPRESSION` | transition, body |
//! | `CSHARP_IMPLICIT_EXPRESSION_BODY` | code block |
//! | `CSHARP_EXPLICIT_EXPRESSION` | transition, body |
//! | `CSHARP_EXPLICIT_EXPRESSION_BODY` | `(`, code block, `)` |
//! | `CSHARP_STATEMENT` | transition, body |
//! | `CSHARP_STATEMENT_BODY` | `{`, code block, `}` |
//! | `CSHARP_EXPRESSION_LITERAL`, `CSHARP_STATEMENT_LITERAL`, `RAZOR_META_CODE` | list of tokens |
//! | `RAZOR_DIRECTIVE` | transition, body |
//! | `RAZOR_DIRECTIVE_BODY` | keyword meta code, code block |
//! | `RAZOR_COMMENT_BLOCK` | `@`, `*`, comment text, `*`, `@` |

use crate::SyntaxKind::*;
use crate::{Annotated, GreenNode, SyntaxKind, SyntaxNode, SyntaxToken};

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$attr:meta])* $name:ident, $kind:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }

        impl Annotated for $name {
            fn green(&self) -> &GreenNode {
                self.0.green()
            }

            fn with_green(&self, green: GreenNode) -> Self {
                debug_assert_eq!(green.kind(), $kind);
                Self(self.0.with_green(green))
            }
        }
    };
}

ast_node!(RazorDocument, RAZOR_DOCUMENT);
ast_node!(MarkupBlock, MARKUP_BLOCK);
ast_node!(MarkupTextLiteral, MARKUP_TEXT_LITERAL);
ast_node!(CSharpCodeBlock, CSHARP_CODE_BLOCK);
ast_node!(CSharpTransition, CSHARP_TRANSITION);
ast_node!(CSharpImplicitExpression, CSHARP_IMPLICIT_EXPRESSION);
ast_node!(CSharpImplicitExpressionBody, CSHARP_IMPLICIT_EXPRESSION_BODY);
ast_node!(CSharpExplicitExpression, CSHARP_EXPLICIT_EXPRESSION);
ast_node!(CSharpExplicitExpressionBody, CSHARP_EXPLICIT_EXPRESSION_BODY);
ast_node!(CSharpStatement, CSHARP_STATEMENT);
ast_node!(CSharpStatementBody, CSHARP_STATEMENT_BODY);
ast_node!(CSharpExpressionLiteral, CSHARP_EXPRESSION_LITERAL);
ast_node!(CSharpStatementLiteral, CSHARP_STATEMENT_LITERAL);
ast_node!(RazorDirective, RAZOR_DIRECTIVE);
ast_node!(RazorDirectiveBody, RAZOR_DIRECTIVE_BODY);
ast_node!(RazorMetaCode, RAZOR_META_CODE);
ast_node!(RazorCommentBlock, RAZOR_COMMENT_BLOCK);

fn child<N: AstNode>(parent: &SyntaxNode, slot: usize) -> Option<N> {
    parent.slot(slot)?.into_node().and_then(N::cast)
}

fn token(parent: &SyntaxNode, slot: usize) -> Option<SyntaxToken> {
    parent.slot(slot)?.into_token()
}

fn list_tokens(parent: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    let list = parent.list_slot(0);
    (0..list.len()).filter_map(move |index| list.get(index)?.into_token())
}

fn list_nodes(parent: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> + use<> {
    let list = parent.list_slot(0);
    (0..list.len()).filter_map(move |index| list.get(index)?.into_node())
}

impl RazorDocument {
    pub fn block(&self) -> Option<MarkupBlock> {
        child(&self.0, 0)
    }

    pub fn eof(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }
}

/// An element of a markup block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupElement {
    Text(MarkupTextLiteral),
    Code(CSharpCodeBlock),
    Comment(RazorCommentBlock),
}

impl AstNode for MarkupElement {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, MARKUP_TEXT_LITERAL | CSHARP_CODE_BLOCK | RAZOR_COMMENT_BLOCK)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            MARKUP_TEXT_LITERAL => Some(Self::Text(MarkupTextLiteral(syntax))),
            CSHARP_CODE_BLOCK => Some(Self::Code(CSharpCodeBlock(syntax))),
            RAZOR_COMMENT_BLOCK => Some(Self::Comment(RazorCommentBlock(syntax))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Text(it) => it.syntax(),
            Self::Code(it) => it.syntax(),
            Self::Comment(it) => it.syntax(),
        }
    }
}

impl MarkupBlock {
    pub fn elements(&self) -> impl Iterator<Item = MarkupElement> + use<> {
        list_nodes(&self.0).filter_map(MarkupElement::cast)
    }
}

impl MarkupTextLiteral {
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        list_tokens(&self.0)
    }

    /// The text this literal renders. The `@` of an `@@` escape is dropped.
    pub fn content(&self) -> String {
        self.tokens()
            .filter(|token| token.kind() != TRANSITION)
            .map(|token| token.text().to_owned())
            .collect()
    }

    pub fn is_escaped_transition(&self) -> bool {
        self.tokens().next().is_some_and(|token| token.kind() == TRANSITION)
    }
}

/// An element of a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeElement {
    ImplicitExpression(CSharpImplicitExpression),
    ExplicitExpression(CSharpExplicitExpression),
    Statement(CSharpStatement),
    Directive(RazorDirective),
    ExpressionLiteral(CSharpExpressionLiteral),
    StatementLiteral(CSharpStatementLiteral),
    MetaCode(RazorMetaCode),
}

impl AstNode for CodeElement {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            CSHARP_IMPLICIT_EXPRESSION
                | CSHARP_EXPLICIT_EXPRESSION
                | CSHARP_STATEMENT
                | RAZOR_DIRECTIVE
                | CSHARP_EXPRESSION_LITERAL
                | CSHARP_STATEMENT_LITERAL
                | RAZOR_META_CODE
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        let element = match syntax.kind() {
            CSHARP_IMPLICIT_EXPRESSION => {
                Self::ImplicitExpression(CSharpImplicitExpression(syntax))
            }
            CSHARP_EXPLICIT_EXPRESSION => {
                Self::ExplicitExpression(CSharpExplicitExpression(syntax))
            }
            CSHARP_STATEMENT => Self::Statement(CSharpStatement(syntax)),
            RAZOR_DIRECTIVE => Self::Directive(RazorDirective(syntax)),
            CSHARP_EXPRESSION_LITERAL => Self::ExpressionLiteral(CSharpExpressionLiteral(syntax)),
            CSHARP_STATEMENT_LITERAL => Self::StatementLiteral(CSharpStatementLiteral(syntax)),
            RAZOR_META_CODE => Self::MetaCode(RazorMetaCode(syntax)),
            _ => return None,
        };
        Some(element)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::ImplicitExpression(it) => it.syntax(),
            Self::ExplicitExpression(it) => it.syntax(),
            Self::Statement(it) => it.syntax(),
            Self::Directive(it) => it.syntax(),
            Self::ExpressionLiteral(it) => it.syntax(),
            Self::StatementLiteral(it) => it.syntax(),
            Self::MetaCode(it) => it.syntax(),
        }
    }
}

impl CSharpCodeBlock {
    pub fn elements(&self) -> impl Iterator<Item = CodeElement> + use<> {
        list_nodes(&self.0).filter_map(CodeElement::cast)
    }

    /// Concatenated text of the literals in this block.
    pub fn code(&self) -> String {
        self.0.text()
    }
}

impl CSharpTransition {
    pub fn transition(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }
}

impl CSharpImplicitExpression {
    pub fn transition(&self) -> Option<CSharpTransition> {
        child(&self.0, 0)
    }

    pub fn body(&self) -> Option<CSharpImplicitExpressionBody> {
        child(&self.0, 1)
    }
}

impl CSharpImplicitExpressionBody {
    pub fn code(&self) -> Option<CSharpCodeBlock> {
        child(&self.0, 0)
    }
}

impl CSharpExplicitExpression {
    pub fn transition(&self) -> Option<CSharpTransition> {
        child(&self.0, 0)
    }

    pub fn body(&self) -> Option<CSharpExplicitExpressionBody> {
        child(&self.0, 1)
    }
}

impl CSharpExplicitExpressionBody {
    pub fn open_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn code(&self) -> Option<CSharpCodeBlock> {
        child(&self.0, 1)
    }

    pub fn close_paren(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }
}

impl CSharpStatement {
    pub fn transition(&self) -> Option<CSharpTransition> {
        child(&self.0, 0)
    }

    pub fn body(&self) -> Option<CSharpStatementBody> {
        child(&self.0, 1)
    }
}

impl CSharpStatementBody {
    pub fn open_brace(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn code(&self) -> Option<CSharpCodeBlock> {
        child(&self.0, 1)
    }

    pub fn close_brace(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }
}

impl CSharpExpressionLiteral {
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        list_tokens(&self.0)
    }
}

impl CSharpStatementLiteral {
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        list_tokens(&self.0)
    }
}

impl RazorMetaCode {
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        list_tokens(&self.0)
    }
}

impl RazorDirective {
    pub fn transition(&self) -> Option<CSharpTransition> {
        child(&self.0, 0)
    }

    pub fn body(&self) -> Option<RazorDirectiveBody> {
        child(&self.0, 1)
    }

    /// The directive keyword, such as `using` or `code`.
    pub fn name(&self) -> Option<String> {
        let keyword = self.body()?.keyword()?;
        let token = keyword.tokens().find(|token| !token.is_trivia())?;
        Some(token.text().to_owned())
    }
}

impl RazorDirectiveBody {
    pub fn keyword(&self) -> Option<RazorMetaCode> {
        child(&self.0, 0)
    }

    pub fn code(&self) -> Option<CSharpCodeBlock> {
        child(&self.0, 1)
    }
}

impl RazorCommentBlock {
    pub fn start_transition(&self) -> Option<SyntaxToken> {
        token(&self.0, 0)
    }

    pub fn start_star(&self) -> Option<SyntaxToken> {
        token(&self.0, 1)
    }

    pub fn comment(&self) -> Option<SyntaxToken> {
        token(&self.0, 2)
    }

    pub fn end_star(&self) -> Option<SyntaxToken> {
        token(&self.0, 3)
    }

    pub fn end_transition(&self) -> Option<SyntaxToken> {
        token(&self.0, 4)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{GreenBuilder, SyntaxAnnotation};

    fn directive_document() -> SyntaxNode {
        let mut builder = GreenBuilder::new();
        builder.start_node(RAZOR_DOCUMENT);
        builder.start_node(MARKUP_BLOCK);
        builder.start_list();

        builder.start_node(CSHARP_CODE_BLOCK);
        builder.start_list();
        builder.start_node(RAZOR_DIRECTIVE);
        builder.start_node(CSHARP_TRANSITION);
        builder.token(TRANSITION, "@");
        builder.finish_node();
        builder.start_node(RAZOR_DIRECTIVE_BODY);
        builder.start_node(RAZOR_META_CODE);
        builder.start_list();
        builder.token(KEYWORD, "using");
        builder.finish_list();
        builder.finish_node();
        builder.start_node(CSHARP_CODE_BLOCK);
        builder.start_list();
        builder.start_node(CSHARP_STATEMENT_LITERAL);
        builder.start_list();
        builder.token(WHITESPACE, " ");
        builder.token(IDENTIFIER, "System");
        builder.finish_list();
        builder.finish_node();
        builder.finish_list();
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.finish_list();
        builder.finish_node();

        builder.start_node(MARKUP_TEXT_LITERAL);
        builder.start_list();
        builder.token(TRANSITION, "@");
        builder.token(TEXT, "@");
        builder.finish_list();
        builder.finish_node();

        builder.finish_list();
        builder.finish_node();
        builder.missing(EOF);
        builder.finish_node();
        SyntaxNode::new_root(builder.finish())
    }

    #[test]
    fn typed_accessors_follow_slots() {
        let document = RazorDocument::cast(directive_document()).unwrap();
        let elements: Vec<_> = document.block().unwrap().elements().collect();
        assert_eq!(elements.len(), 2);

        let MarkupElement::Code(code) = &elements[0] else { panic!("expected code") };
        let Some(CodeElement::Directive(directive)) = code.elements().next() else {
            panic!("expected a directive");
        };
        assert_eq!(directive.name().as_deref(), Some("using"));
        assert_eq!(directive.body().unwrap().code().unwrap().code(), " System");

        let MarkupElement::Text(text) = &elements[1] else { panic!("expected text") };
        assert!(text.is_escaped_transition());
        assert_eq!(text.content(), "@");
        assert!(document.eof().unwrap().is_missing());
    }

    #[test]
    fn cast_checks_kind() {
        let root = directive_document();
        assert!(MarkupBlock::cast(root.clone()).is_none());
        assert!(MarkupElement::cast(root).is_none());
    }

    #[test]
    fn wrappers_are_annotatable() {
        let document = RazorDocument::cast(directive_document()).unwrap();
        let annotation = SyntaxAnnotation::new("test");
        let annotated = document.with_additional_annotation(annotation.clone());

        assert!(annotated.has_annotation(&annotation));
        assert_eq!(annotated.syntax().text(), document.syntax().text());
    }
}
