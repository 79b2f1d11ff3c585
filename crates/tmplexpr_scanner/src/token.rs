//! Tokens produced by the scanner.

use std::fmt;
use tmplexpr_core::text::TextPos;

/// The closed keyword list. Any other identifier-shaped word is an identifier.
pub const KEYWORDS: &[&str] = &[
    "var",
    "let",
    "as",
    "null",
    "undefined",
    "true",
    "false",
    "if",
    "else",
    "this",
    "typeof",
    "void",
    "in",
];

/// Sub-kind of a string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTokenKind {
    /// A quoted string literal.
    Plain,
    /// Template text that is followed by a `${` interpolation.
    TemplateLiteralPart,
    /// Template text that closes the literal with a backtick.
    TemplateLiteralEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Single punctuation: `( ) [ ] { } , : ; .`
    Character(char),
    Identifier,
    PrivateIdentifier,
    Keyword,
    String(StringTokenKind),
    Operator,
    Number,
    RegExpBody,
    RegExpFlags,
    /// A lexical error; `str_value` carries the message.
    Error,
}

/// A scanned token. `start` and `end` are character indices into the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: TextPos,
    pub end: TextPos,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    pub fn new(kind: TokenKind, start: TextPos, end: TextPos, str_value: String) -> Self {
        Self {
            kind,
            start,
            end,
            num_value: 0.0,
            str_value,
        }
    }

    pub fn character(start: TextPos, end: TextPos, ch: char) -> Self {
        Self::new(TokenKind::Character(ch), start, end, ch.to_string())
    }

    pub fn number(start: TextPos, end: TextPos, value: f64) -> Self {
        Self {
            kind: TokenKind::Number,
            start,
            end,
            num_value: value,
            str_value: String::new(),
        }
    }

    pub fn string(start: TextPos, end: TextPos, value: String, kind: StringTokenKind) -> Self {
        Self::new(TokenKind::String(kind), start, end, value)
    }

    /// The end-of-input sentinel handed out by the parser past the last token.
    pub const fn eof() -> Self {
        Self {
            kind: TokenKind::Character(crate::char_codes::EOF),
            start: 0,
            end: 0,
            num_value: 0.0,
            str_value: String::new(),
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Character(crate::char_codes::EOF)
    }

    #[inline]
    pub fn is_character(&self, ch: char) -> bool {
        self.kind == TokenKind::Character(ch)
    }

    #[inline]
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    #[inline]
    pub fn is_private_identifier(&self) -> bool {
        self.kind == TokenKind::PrivateIdentifier
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.kind == TokenKind::Keyword
    }

    #[inline]
    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.is_keyword() && self.str_value == keyword
    }

    pub fn is_keyword_let(&self) -> bool {
        self.is_keyword_named("let")
    }

    pub fn is_keyword_as(&self) -> bool {
        self.is_keyword_named("as")
    }

    pub fn is_keyword_null(&self) -> bool {
        self.is_keyword_named("null")
    }

    pub fn is_keyword_undefined(&self) -> bool {
        self.is_keyword_named("undefined")
    }

    pub fn is_keyword_true(&self) -> bool {
        self.is_keyword_named("true")
    }

    pub fn is_keyword_false(&self) -> bool {
        self.is_keyword_named("false")
    }

    pub fn is_keyword_this(&self) -> bool {
        self.is_keyword_named("this")
    }

    pub fn is_keyword_typeof(&self) -> bool {
        self.is_keyword_named("typeof")
    }

    pub fn is_keyword_void(&self) -> bool {
        self.is_keyword_named("void")
    }

    pub fn is_keyword_in(&self) -> bool {
        self.is_keyword_named("in")
    }

    #[inline]
    pub fn is_operator(&self, operator: &str) -> bool {
        self.kind == TokenKind::Operator && self.str_value == operator
    }

    #[inline]
    pub fn is_any_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String(_))
    }

    #[inline]
    pub fn is_plain_string(&self) -> bool {
        self.kind == TokenKind::String(StringTokenKind::Plain)
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }

    #[inline]
    pub fn is_regexp_body(&self) -> bool {
        self.kind == TokenKind::RegExpBody
    }

    #[inline]
    pub fn is_regexp_flags(&self) -> bool {
        self.kind == TokenKind::RegExpFlags
    }

    #[inline]
    pub fn is_template_literal_part(&self) -> bool {
        self.kind == TokenKind::String(StringTokenKind::TemplateLiteralPart)
    }

    #[inline]
    pub fn is_template_literal_end(&self) -> bool {
        self.kind == TokenKind::String(StringTokenKind::TemplateLiteralEnd)
    }

    /// The `${` operator that opens a template interpolation.
    #[inline]
    pub fn is_template_literal_interpolation_start(&self) -> bool {
        self.is_operator("${")
    }

    /// Number of characters the token covers.
    pub fn len(&self) -> TextPos {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number => write!(f, "{}", self.num_value),
            _ => f.write_str(&self.str_value),
        }
    }
}
