#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens.
    TEXT,
    WHITESPACE,
    NEW_LINE,
    TRANSITION,
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    DOT,
    SEMICOLON,
    IDENTIFIER,
    KEYWORD,
    STRING_LITERAL,
    RAZOR_COMMENT_STAR,
    RAZOR_COMMENT_LITERAL,
    /// Zero-width placeholder token.
    MARKER,
    EOF,

    // Nodes.
    RAZOR_DOCUMENT,
    MARKUP_BLOCK,
    MARKUP_TEXT_LITERAL,
    CSHARP_CODE_BLOCK,
    CSHARP_TRANSITION,
    CSHARP_IMPLICIT_EXPRESSION,
    CSHARP_IMPLICIT_EXPRESSION_BODY,
    CSHARP_EXPLICIT_EXPRESSION,
    CSHARP_EXPLICIT_EXPRESSION_BODY,
    CSHARP_STATEMENT,
    CSHARP_STATEMENT_BODY,
    CSHARP_EXPRESSION_LITERAL,
    CSHARP_STATEMENT_LITERAL,
    RAZOR_DIRECTIVE,
    RAZOR_DIRECTIVE_BODY,
    RAZOR_META_CODE,
    RAZOR_COMMENT_BLOCK,
    /// A list of two or more elements. Shorter lists are never wrapped.
    LIST,

    TOMBSTONE,
}

impl SyntaxKind {
    pub const fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEW_LINE)
    }

    pub const fn is_list(self) -> bool {
        matches!(self, Self::LIST)
    }

    /// Returns `true` if slot `index` of a node of this kind holds a list.
    ///
    /// An element found directly in such a slot is a one-element list.
    pub const fn is_list_slot(self, index: usize) -> bool {
        match self {
            Self::MARKUP_BLOCK
            | Self::MARKUP_TEXT_LITERAL
            | Self::CSHARP_CODE_BLOCK
            | Self::CSHARP_EXPRESSION_LITERAL
            | Self::CSHARP_STATEMENT_LITERAL
            | Self::RAZOR_META_CODE => index == 0,
            _ => false,
        }
    }
}
