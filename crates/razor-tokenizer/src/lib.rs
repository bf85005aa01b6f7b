//! Tokenizer for Razor documents.
//!
//! Razor mixes markup and C#, so the same text lexes differently depending on
//! where the parser is. The tokenizer is driven by a [`Mode`] that the parser
//! switches, rewinding to the start of the current token when it does.

mod cursor;

use cursor::{Cursor, EOF_CHAR};
pub use razor_syntax::SyntaxKind;
use razor_syntax::SyntaxKind::*;
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Text, whitespace, newlines and `@`.
    #[default]
    Markup,
    /// A small C# lexer: identifiers, keywords, strings and punctuation.
    Code,
    /// The inside of `@* ... *@`.
    Comment,
}

#[derive(Clone)]
pub struct Tokenizer<'src> {
    text: &'src str,
    cursor: Cursor<'src>,
    mode: Mode,
}

impl<'src> Tokenizer<'src> {
    pub fn new(text: &'src str) -> Self {
        Self { text, cursor: Cursor::new(text, EOF_CHAR), mode: Mode::Markup }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn source(&self) -> &'src str {
        self.text
    }

    pub fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    /// Continues lexing at `offset` in `mode`. `offset` must be a token
    /// boundary.
    pub fn reset(&mut self, offset: TextSize, mode: Mode) {
        let start = usize::from(offset);
        let previous = self.text[..start].chars().next_back().unwrap_or(EOF_CHAR);
        self.cursor = Cursor::new(&self.text[start..], previous);
        self.mode = mode;
    }

    fn range(&self) -> TextRange {
        let len = self.cursor.pos_within_token();
        TextRange::at(self.offset() - len, len)
    }

    fn token_text(&self) -> &'src str {
        &self.text[self.range()]
    }

    pub fn next_token(&mut self) -> Token {
        let kind = if self.cursor.is_eof() {
            EOF
        } else {
            match self.mode {
                Mode::Markup => self.markup(),
                Mode::Code => self.code(),
                Mode::Comment => self.comment(),
            }
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();
        Token { kind, range }
    }

    fn markup(&mut self) -> SyntaxKind {
        let previous = self.cursor.previous();

        match self.cursor.advance() {
            // `name@example.com` is text, not a transition.
            '@' if previous.is_ascii_alphanumeric()
                && self.cursor.peek().is_ascii_alphanumeric() =>
            {
                self.markup_text()
            }
            '@' => TRANSITION,
            '*' if previous == '@' => RAZOR_COMMENT_STAR,
            c if is_new_line(c) => self.new_line(c),
            c if is_whitespace(c) => {
                self.cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            _ => self.markup_text(),
        }
    }

    fn markup_text(&mut self) -> SyntaxKind {
        self.cursor.advance_while(|c| c != '@' && !c.is_whitespace());
        TEXT
    }

    fn code(&mut self) -> SyntaxKind {
        let previous = self.cursor.previous();

        match self.cursor.advance() {
            '@' if self.cursor.matches('"') => {
                self.cursor.advance();
                self.verbatim_string()
            }
            '@' => TRANSITION,
            '*' if previous == '@' => RAZOR_COMMENT_STAR,
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '.' => DOT,
            ';' => SEMICOLON,
            quote @ ('"' | '\'') => self.string(quote),
            c if is_new_line(c) => self.new_line(c),
            c if is_whitespace(c) => {
                self.cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            c if c == '_' || c.is_alphabetic() => {
                self.cursor.advance_while(is_identifier_char);
                if is_keyword(self.token_text()) {
                    KEYWORD
                } else {
                    IDENTIFIER
                }
            }
            c if c.is_ascii_digit() => {
                self.cursor.advance_while(is_identifier_char);
                TEXT
            }
            _ => {
                self.cursor.advance_while(is_operator);
                TEXT
            }
        }
    }

    fn comment(&mut self) -> SyntaxKind {
        let previous = self.cursor.previous();

        match self.cursor.peek() {
            '*' if self.cursor.second() == '@' => {
                self.cursor.advance();
                RAZOR_COMMENT_STAR
            }
            '@' if previous == '*' => {
                self.cursor.advance();
                TRANSITION
            }
            _ => {
                while !self.cursor.is_eof()
                    && !(self.cursor.matches('*') && self.cursor.second() == '@')
                {
                    self.cursor.advance();
                }
                RAZOR_COMMENT_LITERAL
            }
        }
    }

    fn new_line(&mut self, c: char) -> SyntaxKind {
        if c == '\r' && self.cursor.matches('\n') {
            self.cursor.advance();
        }
        NEW_LINE
    }

    /// Lexes the rest of a quoted literal. Unterminated literals stop at the
    /// end of the line.
    fn string(&mut self, quote: char) -> SyntaxKind {
        loop {
            match self.cursor.peek() {
                '\\' => {
                    self.cursor.advance();
                    if !is_new_line(self.cursor.peek()) {
                        self.cursor.advance();
                    }
                }
                c if c == quote => {
                    self.cursor.advance();
                    break;
                }
                c if is_new_line(c) => break,
                _ if self.cursor.is_eof() => break,
                _ => {
                    self.cursor.advance();
                }
            }
        }
        STRING_LITERAL
    }

    /// `@"..."`, where `""` is an escaped quote and newlines are allowed.
    fn verbatim_string(&mut self) -> SyntaxKind {
        while !self.cursor.is_eof() {
            if self.cursor.advance() == '"' {
                if !self.cursor.matches('"') {
                    break;
                }
                self.cursor.advance();
            }
        }
        STRING_LITERAL
    }
}

/// Lexes all of `text` in a single mode, ending with `EOF`.
pub fn tokenize(text: &str, mode: Mode) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text);
    tokenizer.mode = mode;
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        tokens.push(token);
        if token.kind == EOF {
            return tokens;
        }
    }
}

fn is_new_line(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_new_line(c)
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '<' | '>' | '=' | '!' | '&' | '|' | '^' | '~' | '?' | ':' | ','
    )
}

fn is_keyword(text: &str) -> bool {
    matches!(
        text,
        "as" | "await"
            | "bool"
            | "break"
            | "case"
            | "class"
            | "else"
            | "false"
            | "for"
            | "foreach"
            | "if"
            | "in"
            | "int"
            | "is"
            | "namespace"
            | "new"
            | "null"
            | "private"
            | "public"
            | "return"
            | "static"
            | "string"
            | "switch"
            | "this"
            | "true"
            | "typeof"
            | "using"
            | "var"
            | "void"
            | "while"
    )
}
