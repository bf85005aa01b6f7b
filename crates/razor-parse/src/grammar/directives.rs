use razor_syntax::SyntaxAnnotation;
use razor_syntax::SyntaxKind::*;
use razor_tokenizer::Mode;
use text_size::TextRange;

use super::code::{balanced_content, code_block, literal};
use super::csharp_transition;
use crate::diagnostics;
use crate::parser::Parser;
use crate::{DIRECTIVE_ANNOTATION, DirectiveDescriptor, DirectiveKind};

const DIRECTIVES: &[DirectiveDescriptor] = &[
    DirectiveDescriptor { name: "using", kind: DirectiveKind::SingleLine { requires_value: true } },
    DirectiveDescriptor { name: "page", kind: DirectiveKind::SingleLine { requires_value: false } },
    DirectiveDescriptor {
        name: "inherits",
        kind: DirectiveKind::SingleLine { requires_value: true },
    },
    DirectiveDescriptor {
        name: "namespace",
        kind: DirectiveKind::SingleLine { requires_value: true },
    },
    DirectiveDescriptor { name: "code", kind: DirectiveKind::CodeBlock },
    DirectiveDescriptor { name: "functions", kind: DirectiveKind::CodeBlock },
];

pub(super) fn find(p: &Parser<'_>, name: &str) -> Option<DirectiveDescriptor> {
    if !p.options().allow_directives {
        return None;
    }
    DIRECTIVES.iter().find(|directive| directive.name == name).copied()
}

/// `@name value` or `@name { ... }`. The directive node is annotated with
/// its descriptor.
pub(super) fn directive(p: &mut Parser<'_>, directive: DirectiveDescriptor) {
    let m = p.start();
    csharp_transition(p);
    p.set_mode(Mode::Code);

    let body = p.start();
    let keyword_range = p.current_range();
    literal(p, RAZOR_META_CODE, |p| p.advance());

    code_block(p, |p| match directive.kind {
        DirectiveKind::SingleLine { requires_value } => {
            single_line_value(p, directive.name, requires_value, keyword_range);
        }
        DirectiveKind::CodeBlock => block_value(p, directive.name),
    });
    body.complete(p, RAZOR_DIRECTIVE_BODY);

    p.set_mode(Mode::Markup);
    m.complete(p, RAZOR_DIRECTIVE);
    p.annotate(SyntaxAnnotation::with_data(DIRECTIVE_ANNOTATION, directive));
}

/// The rest of the line, leading whitespace included.
fn single_line_value(
    p: &mut Parser<'_>,
    name: &str,
    requires_value: bool,
    keyword_range: TextRange,
) {
    let mut has_value = false;
    literal(p, CSHARP_STATEMENT_LITERAL, |p| {
        while !matches!(p.current(), NEW_LINE | EOF) {
            has_value |= !p.current().is_trivia();
            p.advance();
        }
    });

    if requires_value && !has_value {
        p.error(diagnostics::directive_expects_value(name, keyword_range));
    }
}

/// Optional whitespace, then `{ ... }` with the braces as meta code.
fn block_value(p: &mut Parser<'_>, name: &str) {
    if matches!(p.current(), WHITESPACE | NEW_LINE) {
        literal(p, CSHARP_STATEMENT_LITERAL, |p| {
            while matches!(p.current(), WHITESPACE | NEW_LINE) {
                p.advance();
            }
        });
    }

    if !p.at(LEFT_BRACE) {
        let span = p.current_range();
        literal(p, RAZOR_META_CODE, |p| {
            p.missing(LEFT_BRACE);
            p.error(diagnostics::directive_expects_block(name, span));
        });
        return;
    }

    let open_range = p.current_range();
    literal(p, RAZOR_META_CODE, |p| p.advance());

    let mut closed = false;
    literal(p, CSHARP_STATEMENT_LITERAL, |p| {
        closed = balanced_content(p, LEFT_BRACE, RIGHT_BRACE);
    });

    literal(p, RAZOR_META_CODE, |p| {
        if closed {
            p.advance();
        } else {
            p.missing(RIGHT_BRACE);
            p.error(diagnostics::missing_closer("code", '{', '}', open_range));
        }
    });
}
