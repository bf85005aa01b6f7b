use drop_bomb::DropBomb;
use razor_errors::RazorDiagnostic;
use razor_syntax::{GreenBuilder, GreenNode, SyntaxAnnotation, SyntaxKind};
use razor_tokenizer::{Mode, Token, Tokenizer};
use text_size::TextRange;

use crate::ParserOptions;

pub(crate) struct Parser<'src> {
    text: &'src str,
    tokenizer: Tokenizer<'src>,
    current: Token,
    options: ParserOptions,
    events: Vec<Event>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(text: &'src str, options: ParserOptions) -> Self {
        let mut tokenizer = Tokenizer::new(text);
        let current = tokenizer.next_token();
        Self { text, tokenizer, current, options, events: Vec::new() }
    }

    pub(crate) fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.current.kind
    }

    pub(crate) fn current_range(&self) -> TextRange {
        self.current.range
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn text_of(&self, token: Token) -> &'src str {
        &self.text[token.range]
    }

    /// Lexes the token after the current one in `mode`, without consuming
    /// anything.
    pub(crate) fn peek_after(&self, mode: Mode) -> Token {
        let mut tokenizer = self.tokenizer.clone();
        tokenizer.reset(self.current.range.end(), mode);
        tokenizer.next_token()
    }

    /// Switches the tokenizer to `mode`, relexing the current token.
    pub(crate) fn set_mode(&mut self, mode: Mode) {
        if self.tokenizer.mode() != mode {
            self.tokenizer.reset(self.current.range.start(), mode);
            self.current = self.tokenizer.next_token();
        }
    }

    pub(crate) fn advance(&mut self) {
        let kind = self.current.kind;
        self.advance_as(kind);
    }

    /// Consumes the current token, recording it as `kind`.
    pub(crate) fn advance_as(&mut self, kind: SyntaxKind) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = std::mem::replace(&mut self.current, self.tokenizer.next_token());
        self.events.push(Event::Token(Token { kind, ..token }));
    }

    /// Consumes the final `EOF` token.
    pub(crate) fn eof(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF), "expected EOF, found {:?}", self.current.kind);
        self.events.push(Event::Token(self.current));
    }

    /// Records a zero-width stand-in for an absent token.
    pub(crate) fn missing(&mut self, kind: SyntaxKind) {
        self.events.push(Event::Missing(kind));
    }

    pub(crate) fn empty_slot(&mut self) {
        self.events.push(Event::EmptySlot);
    }

    /// Attaches `diagnostic` to the last token or completed node.
    pub(crate) fn error(&mut self, diagnostic: RazorDiagnostic) {
        self.events.push(Event::Diagnostic(diagnostic));
    }

    /// Attaches `annotation` to the last token or completed node.
    pub(crate) fn annotate(&mut self, annotation: SyntaxAnnotation) {
        self.events.push(Event::Annotation(annotation));
    }

    pub(crate) fn start(&mut self) -> Marker {
        let position = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(position)
    }

    pub(crate) fn start_list(&mut self) -> ListMarker {
        self.events.push(Event::StartList);
        ListMarker::new()
    }

    pub(crate) fn build_tree(self) -> GreenNode {
        let Parser { text, events, .. } = self;
        let mut builder = GreenBuilder::new();

        for event in events {
            match event {
                Event::Start(kind) => builder.start_node(kind),
                Event::Finish => builder.finish_node(),
                Event::StartList => builder.start_list(),
                Event::FinishList => builder.finish_list(),
                Event::Token(Token { kind, range }) => builder.token(kind, &text[range]),
                Event::Missing(kind) => builder.missing(kind),
                Event::EmptySlot => builder.empty_slot(),
                Event::Diagnostic(diagnostic) => {
                    builder.attach_diagnostics(std::slice::from_ref(&diagnostic));
                }
                Event::Annotation(annotation) => {
                    builder.attach_annotations(std::slice::from_ref(&annotation));
                }
            }
        }

        builder.finish()
    }
}

enum Event {
    Start(SyntaxKind),
    Finish,
    StartList,
    FinishList,
    Token(Token),
    Missing(SyntaxKind),
    EmptySlot,
    Diagnostic(RazorDiagnostic),
    Annotation(SyntaxAnnotation),
}

impl Event {
    const TOMBSTONE: Self = Self::Start(SyntaxKind::TOMBSTONE);
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(position: u32) -> Self {
        Self { position, bomb: DropBomb::new("Marker must be completed") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start(slot) => *slot = kind,
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
    }
}

/// An open list occupying one slot of the enclosing node.
pub(crate) struct ListMarker {
    bomb: DropBomb,
}

impl ListMarker {
    fn new() -> Self {
        Self { bomb: DropBomb::new("ListMarker must be completed") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        p.events.push(Event::FinishList);
    }
}
