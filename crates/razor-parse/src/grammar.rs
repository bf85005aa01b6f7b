use razor_syntax::SyntaxKind::*;
use razor_tokenizer::Mode;
use text_size::TextRange;

use crate::diagnostics;
use crate::parser::Parser;

mod code;
mod directives;

pub(crate) fn document(p: &mut Parser<'_>) {
    let m = p.start();
    markup_block(p);
    p.eof();
    m.complete(p, RAZOR_DOCUMENT);
}

fn markup_block(p: &mut Parser<'_>) {
    let m = p.start();
    let list = p.start_list();

    while !p.at(EOF) {
        if p.at(TRANSITION) {
            transition_element(p);
        } else {
            markup_text(p);
        }
    }

    list.complete(p);
    m.complete(p, MARKUP_BLOCK);
}

fn markup_text(p: &mut Parser<'_>) {
    let m = p.start();
    let list = p.start_list();

    while !p.at(EOF) && !p.at(TRANSITION) {
        p.advance();
    }

    list.complete(p);
    m.complete(p, MARKUP_TEXT_LITERAL);
}

/// Parses whatever follows an `@` in markup.
fn transition_element(p: &mut Parser<'_>) {
    // Code mode would read `@"` as a verbatim string, hiding an `@@` escape.
    if p.peek_after(Mode::Markup).kind == TRANSITION {
        escaped_transition(p);
        return;
    }

    let next = p.peek_after(Mode::Code);
    match next.kind {
        RAZOR_COMMENT_STAR => comment(p),
        LEFT_PAREN => code::explicit_expression(p),
        LEFT_BRACE => code::statement(p),
        IDENTIFIER | KEYWORD => match directives::find(p, p.text_of(next)) {
            Some(directive) => directives::directive(p, directive),
            None => code::implicit_expression(p),
        },
        _ => code::invalid_implicit_expression(p, next),
    }
}

/// `@@` is a literal `@`. The second one is recorded as text.
fn escaped_transition(p: &mut Parser<'_>) {
    let m = p.start();
    let list = p.start_list();

    p.advance();
    p.advance_as(TEXT);

    list.complete(p);
    m.complete(p, MARKUP_TEXT_LITERAL);
}

fn comment(p: &mut Parser<'_>) {
    let start = p.current_range().start();
    let m = p.start();

    p.advance();
    p.advance();
    p.set_mode(Mode::Comment);

    if p.at(RAZOR_COMMENT_LITERAL) {
        p.advance();
    } else {
        p.empty_slot();
    }

    if p.at(RAZOR_COMMENT_STAR) {
        p.advance();
        p.advance();
    } else {
        p.missing(RAZOR_COMMENT_STAR);
        p.error(diagnostics::unterminated_comment(TextRange::at(start, 2.into())));
        p.missing(TRANSITION);
    }

    p.set_mode(Mode::Markup);
    m.complete(p, RAZOR_COMMENT_BLOCK);
}

/// The `@` that opens a code construct.
fn csharp_transition(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    m.complete(p, CSHARP_TRANSITION);
}
