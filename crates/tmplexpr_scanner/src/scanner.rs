//! The expression scanner.
//!
//! Converts expression text into a flat token list in one pass. Two pieces of
//! context make the scan more than a character-class switch:
//!
//! - A brace stack records whether each open `{` started an object literal or
//!   a template interpolation, so the matching `}` either stays a plain
//!   character token or resumes template text.
//! - A `/` starts a regular expression only where a value may begin, which is
//!   decided by looking at the previously emitted token.
//!
//! Lexical problems become an error token whose text is the full message.
//! Scanning stops at the first error token.

use crate::char_codes::*;
use crate::token::{StringTokenKind, Token, TokenKind, KEYWORDS};
use tmplexpr_core::text::TextPos;
use tmplexpr_diagnostics::messages;

/// What an open `{` on the brace stack belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceKind {
    Expression,
    Interpolation,
}

/// The scanner converts one expression into tokens.
pub struct Scanner {
    /// The source text, kept whole for error messages.
    source: String,
    /// The source characters; positions index into this.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
    brace_stack: Vec<BraceKind>,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            source: text.to_string(),
            text: text.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
            brace_stack: Vec::new(),
        }
    }

    /// Scan the whole input.
    pub fn scan(mut self) -> Vec<Token> {
        while let Some(token) = self.scan_token() {
            let is_error = token.is_error();
            self.tokens.push(token);
            if is_error {
                break;
            }
        }
        self.tokens
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[inline]
    fn current_char(&self) -> char {
        self.char_at(self.pos)
    }

    #[inline]
    fn char_at(&self, pos: usize) -> char {
        self.text.get(pos).copied().unwrap_or(EOF)
    }

    #[inline]
    fn advance(&mut self) {
        if self.pos < self.text.len() {
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        if start >= end {
            return String::new();
        }
        self.text[start..end].iter().collect()
    }

    #[inline]
    fn position(&self) -> TextPos {
        self.pos as TextPos
    }

    // ========================================================================
    // Token dispatch
    // ========================================================================

    fn scan_token(&mut self) -> Option<Token> {
        while !self.is_eof() && is_whitespace(self.current_char()) {
            self.pos += 1;
        }
        if self.is_eof() {
            return None;
        }

        let ch = self.current_char();
        let start = self.pos;

        if is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if is_digit(ch) {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            DOT => {
                self.advance();
                if is_digit(self.current_char()) {
                    self.scan_number(start)
                } else {
                    Token::character(start as TextPos, self.position(), DOT)
                }
            }
            OPEN_PAREN | CLOSE_PAREN | OPEN_BRACKET | CLOSE_BRACKET | COMMA | COLON
            | SEMICOLON => self.scan_character(start, ch),
            OPEN_BRACE => {
                self.brace_stack.push(BraceKind::Expression);
                self.scan_character(start, ch)
            }
            CLOSE_BRACE => self.scan_close_brace(start),
            SINGLE_QUOTE | DOUBLE_QUOTE => self.scan_string(),
            BACKTICK => {
                self.advance();
                self.scan_template_literal_part(start)
            }
            HASH => self.scan_private_identifier(),
            PLUS | MINUS | PERCENT | LESS_THAN | GREATER_THAN => {
                self.scan_complex_operator(start, ch, Some(EQUALS), None)
            }
            SLASH => {
                if self.is_start_of_regex() {
                    self.scan_regex(start)
                } else {
                    self.scan_complex_operator(start, SLASH, Some(EQUALS), None)
                }
            }
            CARET => self.scan_operator(start, "^"),
            ASTERISK => self.scan_star(start),
            QUESTION => self.scan_question(start),
            BANG | EQUALS => self.scan_complex_operator(start, ch, Some(EQUALS), Some(EQUALS)),
            AMPERSAND => self.scan_complex_operator(start, AMPERSAND, Some(AMPERSAND), Some(EQUALS)),
            BAR => self.scan_complex_operator(start, BAR, Some(BAR), Some(EQUALS)),
            _ => {
                self.advance();
                let message = messages::UNEXPECTED_CHARACTER.format(&[&ch.to_string()]);
                self.error(&message, 0)
            }
        };
        Some(token)
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::character(start as TextPos, self.position(), ch)
    }

    fn scan_operator(&mut self, start: usize, operator: &str) -> Token {
        self.advance();
        Token::new(
            TokenKind::Operator,
            start as TextPos,
            self.position(),
            operator.to_string(),
        )
    }

    /// Scan an operator of up to three characters. The second and third
    /// characters are each optional and checked independently.
    fn scan_complex_operator(
        &mut self,
        start: usize,
        one: char,
        two: Option<char>,
        three: Option<char>,
    ) -> Token {
        self.advance();
        let mut operator = String::from(one);
        if !self.is_eof() && two == Some(self.current_char()) {
            operator.push(self.current_char());
            self.advance();
        }
        if !self.is_eof() && three == Some(self.current_char()) {
            operator.push(self.current_char());
            self.advance();
        }
        Token::new(TokenKind::Operator, start as TextPos, self.position(), operator)
    }

    /// `*`, `**`, `**=` or `*=`
    fn scan_star(&mut self, start: usize) -> Token {
        self.advance();
        let mut operator = String::from("*");
        if self.current_char() == ASTERISK {
            operator.push('*');
            self.advance();
            if self.current_char() == EQUALS {
                operator.push('=');
                self.advance();
            }
        } else if self.current_char() == EQUALS {
            operator.push('=');
            self.advance();
        }
        Token::new(TokenKind::Operator, start as TextPos, self.position(), operator)
    }

    /// `?`, `??`, `??=` or `?.`
    fn scan_question(&mut self, start: usize) -> Token {
        self.advance();
        let mut operator = String::from("?");
        if self.current_char() == QUESTION {
            operator.push('?');
            self.advance();
            if self.current_char() == EQUALS {
                operator.push('=');
                self.advance();
            }
        } else if self.current_char() == DOT {
            operator.push('.');
            self.advance();
        }
        Token::new(TokenKind::Operator, start as TextPos, self.position(), operator)
    }

    fn scan_close_brace(&mut self, start: usize) -> Token {
        self.advance();
        if self.brace_stack.pop() == Some(BraceKind::Interpolation) {
            self.tokens
                .push(Token::character(start as TextPos, self.position(), CLOSE_BRACE));
            return self.scan_template_literal_part(self.pos);
        }
        Token::character(start as TextPos, self.position(), CLOSE_BRACE)
    }

    // ========================================================================
    // Words
    // ========================================================================

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        while !self.is_eof() && is_identifier_part(self.current_char()) {
            self.advance();
        }
        let text = self.slice(start, self.pos);
        let kind = if KEYWORDS.contains(&text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, start as TextPos, self.position(), text)
    }

    fn scan_private_identifier(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        if self.is_eof() || !is_identifier_start(self.current_char()) {
            let message = messages::INVALID_CHARACTER.format(&["#"]);
            return self.error(&message, -1);
        }
        while !self.is_eof() && is_identifier_part(self.current_char()) {
            self.advance();
        }
        let text = self.slice(start, self.pos);
        Token::new(
            TokenKind::PrivateIdentifier,
            start as TextPos,
            self.position(),
            text,
        )
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self, start: usize) -> Token {
        // A number entered through a leading `.` is never integral.
        let mut simple = self.pos == start;
        let mut has_separators = false;
        self.advance();
        loop {
            let ch = self.current_char();
            if self.is_eof() {
                break;
            } else if is_digit(ch) {
                // digits continue the literal
            } else if ch == UNDERSCORE {
                // Separators are only valid between two digits.
                let surrounded = self.pos > 0
                    && is_digit(self.char_at(self.pos - 1))
                    && is_digit(self.char_at(self.pos + 1));
                if !surrounded {
                    let message = messages::INVALID_NUMERIC_SEPARATOR.message;
                    return self.error(message, 0);
                }
                has_separators = true;
            } else if ch == DOT {
                simple = false;
            } else if is_exponent_start(ch) {
                self.advance();
                if is_exponent_sign(self.current_char()) {
                    self.advance();
                }
                if !is_digit(self.current_char()) {
                    let message = messages::INVALID_EXPONENT.message;
                    return self.error(message, -1);
                }
                simple = false;
            } else {
                break;
            }
            self.advance();
        }

        let mut text = self.slice(start, self.pos);
        if has_separators {
            text.retain(|c| c != UNDERSCORE);
        }
        let value = if simple {
            text.parse::<i64>()
                .map(|v| v as f64)
                .or_else(|_| text.parse::<f64>())
                .unwrap_or(0.0)
        } else {
            text.parse::<f64>().unwrap_or(0.0)
        };
        Token::number(start as TextPos, self.position(), value)
    }

    // ========================================================================
    // Strings and template literals
    // ========================================================================

    fn scan_string(&mut self) -> Token {
        let start = self.pos;
        let quote = self.current_char();
        self.advance();

        let mut buffer = String::new();
        let mut marker = self.pos;
        loop {
            if self.is_eof() {
                return self.error(messages::UNTERMINATED_QUOTE.message, 0);
            }
            let ch = self.current_char();
            if ch == quote {
                break;
            }
            if ch == BACKSLASH {
                buffer.push_str(&self.slice(marker, self.pos));
                if let Err(token) = self.scan_string_backslash(&mut buffer) {
                    return token;
                }
                marker = self.pos;
            } else {
                self.advance();
            }
        }

        buffer.push_str(&self.slice(marker, self.pos));
        self.advance();
        Token::string(
            start as TextPos,
            self.position(),
            buffer,
            StringTokenKind::Plain,
        )
    }

    /// Scan template text starting at `pos`. `start` is where the token begins,
    /// which is the backtick for the first segment.
    fn scan_template_literal_part(&mut self, start: usize) -> Token {
        let mut buffer = String::new();
        let mut marker = self.pos;

        loop {
            if self.is_eof() {
                return self.error(messages::UNTERMINATED_TEMPLATE_LITERAL.message, 0);
            }
            let ch = self.current_char();
            if ch == BACKTICK {
                break;
            }
            if ch == BACKSLASH {
                buffer.push_str(&self.slice(marker, self.pos));
                if let Err(token) = self.scan_string_backslash(&mut buffer) {
                    return token;
                }
                marker = self.pos;
            } else if ch == DOLLAR {
                let dollar = self.pos;
                self.advance();
                if !self.is_eof() && self.current_char() == OPEN_BRACE {
                    self.brace_stack.push(BraceKind::Interpolation);
                    buffer.push_str(&self.slice(marker, dollar));
                    self.tokens.push(Token::string(
                        start as TextPos,
                        dollar as TextPos,
                        buffer,
                        StringTokenKind::TemplateLiteralPart,
                    ));
                    self.advance();
                    return Token::new(
                        TokenKind::Operator,
                        dollar as TextPos,
                        self.position(),
                        "${".to_string(),
                    );
                }
            } else {
                self.advance();
            }
        }

        buffer.push_str(&self.slice(marker, self.pos));
        self.advance();
        Token::string(
            start as TextPos,
            self.position(),
            buffer,
            StringTokenKind::TemplateLiteralEnd,
        )
    }

    /// Decode one escape sequence; `pos` is on the backslash.
    fn scan_string_backslash(&mut self, buffer: &mut String) -> Result<(), Token> {
        self.advance();
        if self.current_char() == 'u' && !self.is_eof() {
            // Exactly four hex digits follow `\u`.
            if self.pos + 5 > self.text.len() {
                return Err(self.error(messages::INVALID_UNICODE_ESCAPE.message, 0));
            }
            let hex = self.slice(self.pos + 1, self.pos + 5);
            let decoded = if hex.chars().all(|c| c.is_ascii_hexdigit()) {
                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
            } else {
                None
            };
            let Some(decoded) = decoded else {
                let message = messages::INVALID_UNICODE_ESCAPE_SEQUENCE.format(&[&hex]);
                return Err(self.error(&message, 0));
            };
            buffer.push(decoded);
            self.pos += 5;
        } else {
            if !self.is_eof() {
                buffer.push(unescape(self.current_char()));
            }
            self.advance();
        }
        Ok(())
    }

    // ========================================================================
    // Regular expressions
    // ========================================================================

    /// A `/` starts a regex only after an operator, `(`, `[`, `,` or `:`, or
    /// at the very beginning. After `!` it depends on whether the `!` is a
    /// negation or a non-null assertion.
    fn is_start_of_regex(&self) -> bool {
        let Some(prev) = self.tokens.last() else {
            return true;
        };

        if prev.is_operator("!") {
            let before = self
                .tokens
                .len()
                .checked_sub(2)
                .and_then(|i| self.tokens.get(i));
            return match before {
                None => true,
                Some(token) => {
                    !token.is_identifier()
                        && !token.is_character(CLOSE_PAREN)
                        && !token.is_character(CLOSE_BRACKET)
                }
            };
        }

        prev.is_any_operator()
            || prev.is_character(OPEN_PAREN)
            || prev.is_character(OPEN_BRACKET)
            || prev.is_character(COMMA)
            || prev.is_character(COLON)
    }

    fn scan_regex(&mut self, token_start: usize) -> Token {
        self.advance();
        let text_start = self.pos;
        let mut in_escape = false;
        let mut in_character_class = false;

        loop {
            if self.is_eof() {
                return self.error(messages::UNTERMINATED_REGULAR_EXPRESSION.message, 0);
            }
            let ch = self.current_char();
            if in_escape {
                in_escape = false;
            } else if ch == BACKSLASH {
                in_escape = true;
            } else if ch == OPEN_BRACKET {
                in_character_class = true;
            } else if ch == CLOSE_BRACKET {
                in_character_class = false;
            } else if ch == SLASH && !in_character_class {
                break;
            }
            self.advance();
        }

        // The slashes are part of the span but not of the body text.
        let body = self.slice(text_start, self.pos);
        self.advance();
        let body_token = Token::new(
            TokenKind::RegExpBody,
            token_start as TextPos,
            self.position(),
            body,
        );

        if self.is_eof() || !is_ascii_letter(self.current_char()) {
            return body_token;
        }
        let flags_start = self.pos;
        while !self.is_eof() && is_ascii_letter(self.current_char()) {
            self.advance();
        }
        self.tokens.push(body_token);
        Token::new(
            TokenKind::RegExpFlags,
            flags_start as TextPos,
            self.position(),
            self.slice(flags_start, self.pos),
        )
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Build an error token anchored `offset` characters from the current
    /// position. The message embeds the anchor and the whole input.
    fn error(&self, message: &str, offset: i64) -> Token {
        let position = (self.pos as i64 + offset).max(0) as TextPos;
        let current = self.position();
        let text = messages::LEXER_ERROR.format(&[
            message,
            &position.to_string(),
            &self.source,
        ]);
        Token::new(
            TokenKind::Error,
            position.min(current),
            position.max(current),
            text,
        )
    }
}
