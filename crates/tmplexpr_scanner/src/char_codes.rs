//! Character constants and classes used by the scanner.

// Control and whitespace
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LINE_FEED: char = '\n';
pub const VERTICAL_TAB: char = '\u{000B}';
pub const FORM_FEED: char = '\u{000C}';
pub const CARRIAGE_RETURN: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

// Punctuation
pub const BANG: char = '!';
pub const DOUBLE_QUOTE: char = '"';
pub const HASH: char = '#';
pub const DOLLAR: char = '$';
pub const PERCENT: char = '%';
pub const AMPERSAND: char = '&';
pub const SINGLE_QUOTE: char = '\'';
pub const OPEN_PAREN: char = '(';
pub const CLOSE_PAREN: char = ')';
pub const ASTERISK: char = '*';
pub const PLUS: char = '+';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const DOT: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LESS_THAN: char = '<';
pub const EQUALS: char = '=';
pub const GREATER_THAN: char = '>';
pub const QUESTION: char = '?';
pub const OPEN_BRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const CLOSE_BRACKET: char = ']';
pub const CARET: char = '^';
pub const UNDERSCORE: char = '_';
pub const BACKTICK: char = '`';
pub const OPEN_BRACE: char = '{';
pub const BAR: char = '|';
pub const CLOSE_BRACE: char = '}';

/// Characters skipped between tokens: ASCII control characters, space, and NBSP.
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    ch <= SPACE || ch == NBSP
}

#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Identifiers are ASCII only: letters, `_` and `$`.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    is_ascii_letter(ch) || ch == UNDERSCORE || ch == DOLLAR
}

#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

#[inline]
pub fn is_exponent_start(ch: char) -> bool {
    ch == 'e' || ch == 'E'
}

#[inline]
pub fn is_exponent_sign(ch: char) -> bool {
    ch == MINUS || ch == PLUS
}

#[inline]
pub fn is_quote(ch: char) -> bool {
    ch == SINGLE_QUOTE || ch == DOUBLE_QUOTE || ch == BACKTICK
}

/// Decode the character following a backslash in a string literal.
pub fn unescape(ch: char) -> char {
    match ch {
        'n' => LINE_FEED,
        'f' => FORM_FEED,
        'r' => CARRIAGE_RETURN,
        't' => TAB,
        'v' => VERTICAL_TAB,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classes() {
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('_'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_part('1'));
        assert!(!is_identifier_start('é'));
    }

    #[test]
    fn test_whitespace_includes_nbsp() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\n'));
        assert!(is_whitespace(NBSP));
        assert!(!is_whitespace('a'));
    }
}
