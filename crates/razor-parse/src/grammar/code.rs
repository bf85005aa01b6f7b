use razor_errors::RazorDiagnostic;
use razor_syntax::SyntaxKind::{self, *};
use razor_tokenizer::{Mode, Token};
use text_size::TextRange;

use super::csharp_transition;
use crate::diagnostics;
use crate::parser::Parser;

/// `@name.Member(args)[index]`
pub(super) fn implicit_expression(p: &mut Parser<'_>) {
    let m = p.start();
    csharp_transition(p);
    p.set_mode(Mode::Code);

    let body = p.start();
    code_block(p, |p| literal(p, CSHARP_EXPRESSION_LITERAL, implicit_tokens));
    body.complete(p, CSHARP_IMPLICIT_EXPRESSION_BODY);

    p.set_mode(Mode::Markup);
    m.complete(p, CSHARP_IMPLICIT_EXPRESSION);
}

fn implicit_tokens(p: &mut Parser<'_>) {
    debug_assert!(matches!(p.current(), IDENTIFIER | KEYWORD));
    p.advance();

    loop {
        match p.current() {
            DOT => {
                let next = p.peek_after(Mode::Code);
                if matches!(next.kind, IDENTIFIER | KEYWORD) {
                    p.advance();
                    p.advance();
                } else {
                    // Design-time trees keep a trailing `.` for completion.
                    if p.options().design_time {
                        p.advance();
                    }
                    return;
                }
            }
            LEFT_PAREN => balanced(p, LEFT_PAREN, RIGHT_PAREN),
            LEFT_BRACKET => balanced(p, LEFT_BRACKET, RIGHT_BRACKET),
            _ => return,
        }
    }
}

/// An `@` followed by something that cannot start code. The expression is
/// kept with a missing identifier so the tree stays complete.
pub(super) fn invalid_implicit_expression(p: &mut Parser<'_>, next: Token) {
    let m = p.start();
    csharp_transition(p);

    let body = p.start();
    code_block(p, |p| {
        literal(p, CSHARP_EXPRESSION_LITERAL, |p| {
            p.missing(IDENTIFIER);
            let diagnostic = match next.kind {
                EOF => diagnostics::end_of_file_after_transition(next.range),
                WHITESPACE | NEW_LINE => diagnostics::whitespace_after_transition(next.range),
                _ => diagnostics::invalid_code_block_start(p.text_of(next), next.range),
            };
            p.error(diagnostic);
        });
    });
    body.complete(p, CSHARP_IMPLICIT_EXPRESSION_BODY);

    m.complete(p, CSHARP_IMPLICIT_EXPRESSION);
}

/// `@( ... )`
pub(super) fn explicit_expression(p: &mut Parser<'_>) {
    let m = p.start();
    csharp_transition(p);
    p.set_mode(Mode::Code);

    let body = p.start();
    delimited_block(p, LEFT_PAREN, RIGHT_PAREN, CSHARP_EXPRESSION_LITERAL, "explicit expression");
    body.complete(p, CSHARP_EXPLICIT_EXPRESSION_BODY);

    p.set_mode(Mode::Markup);
    m.complete(p, CSHARP_EXPLICIT_EXPRESSION);
}

/// `@{ ... }`
pub(super) fn statement(p: &mut Parser<'_>) {
    let m = p.start();
    csharp_transition(p);
    p.set_mode(Mode::Code);

    let body = p.start();
    delimited_block(p, LEFT_BRACE, RIGHT_BRACE, CSHARP_STATEMENT_LITERAL, "code");
    body.complete(p, CSHARP_STATEMENT_BODY);

    p.set_mode(Mode::Markup);
    m.complete(p, CSHARP_STATEMENT);
}

/// Opener, a code block holding one `literal` node, closer. A missing
/// closer is reported against the opener.
fn delimited_block(
    p: &mut Parser<'_>,
    open: SyntaxKind,
    close: SyntaxKind,
    literal_kind: SyntaxKind,
    block_name: &str,
) {
    debug_assert!(p.at(open));
    let open_range = p.current_range();
    p.advance();

    let mut closed = false;
    code_block(p, |p| literal(p, literal_kind, |p| closed = balanced_content(p, open, close)));

    if closed {
        p.advance();
    } else {
        p.missing(close);
        p.error(missing_closer(block_name, open, close, open_range));
    }
}

/// A bracketed run kept as part of the surrounding literal.
fn balanced(p: &mut Parser<'_>, open: SyntaxKind, close: SyntaxKind) {
    let open_range = p.current_range();
    p.advance();

    if balanced_content(p, open, close) {
        p.advance();
    } else {
        p.missing(close);
        p.error(missing_closer("implicit expression", open, close, open_range));
    }
}

/// Consumes tokens up to the `close` that matches an already consumed
/// `open`. Returns `false` if the document ends first.
pub(super) fn balanced_content(p: &mut Parser<'_>, open: SyntaxKind, close: SyntaxKind) -> bool {
    let mut depth = 0u32;
    loop {
        match p.current() {
            EOF => return false,
            kind if kind == close && depth == 0 => return true,
            kind if kind == close => depth -= 1,
            kind if kind == open => depth += 1,
            _ => {}
        }
        p.advance();
    }
}

/// `CSHARP_CODE_BLOCK` whose list is filled by `elements`.
pub(super) fn code_block(p: &mut Parser<'_>, elements: impl FnOnce(&mut Parser<'_>)) {
    let m = p.start();
    let list = p.start_list();
    elements(p);
    list.complete(p);
    m.complete(p, CSHARP_CODE_BLOCK);
}

/// A literal node of `kind` whose token list is filled by `tokens`.
pub(super) fn literal(p: &mut Parser<'_>, kind: SyntaxKind, tokens: impl FnOnce(&mut Parser<'_>)) {
    let m = p.start();
    let list = p.start_list();
    tokens(p);
    list.complete(p);
    m.complete(p, kind);
}

fn missing_closer(
    block_name: &str,
    open: SyntaxKind,
    close: SyntaxKind,
    span: TextRange,
) -> RazorDiagnostic {
    diagnostics::missing_closer(block_name, delimiter(open), delimiter(close), span)
}

fn delimiter(kind: SyntaxKind) -> char {
    match kind {
        LEFT_PAREN => '(',
        RIGHT_PAREN => ')',
        LEFT_BRACE => '{',
        RIGHT_BRACE => '}',
        LEFT_BRACKET => '[',
        RIGHT_BRACKET => ']',
        _ => unreachable!("{kind:?} is not a delimiter"),
    }
}
