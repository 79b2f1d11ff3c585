//! Text-level scanning that happens before tokenizing: splitting
//! interpolated text, finding interpolation delimiters outside string
//! literals, and stripping trailing `//` comments.
//!
//! All searches run on bytes; positions handed back to callers are
//! converted to character offsets so they line up with token positions.

use memchr::memmem;
use tmplexpr_core::text::TextPos;
use tmplexpr_scanner::char_codes::is_quote;

use crate::options::InterpolationConfig;

/// A run of text cut out of an interpolated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolationPiece<'s> {
    pub text: &'s str,
    /// Character offset where the piece starts, delimiters included.
    pub start: TextPos,
    /// Character offset where the piece ends, delimiters included.
    pub end: TextPos,
}

/// Interpolated text split at its delimiters.
///
/// `strings` always has one more entry than `expressions` unless the text
/// ends inside an unterminated interpolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitInterpolation<'s> {
    pub strings: Vec<InterpolationPiece<'s>>,
    pub expressions: Vec<InterpolationPiece<'s>>,
    /// Character offset of each expression's text, just after the start delimiter.
    pub offsets: Vec<TextPos>,
}

#[inline]
pub(crate) fn char_offset(text: &str, byte: usize) -> TextPos {
    text[..byte].chars().count() as TextPos
}

fn piece(input: &str, start: usize, end: usize) -> InterpolationPiece<'_> {
    InterpolationPiece {
        text: &input[start..end],
        start: char_offset(input, start),
        end: char_offset(input, end),
    }
}

/// Split `input` into literal strings and the expressions between `config`'s delimiters.
pub fn split_interpolation<'s>(input: &'s str, config: &InterpolationConfig) -> SplitInterpolation<'s> {
    let mut split = SplitInterpolation::default();
    if config.start.is_empty() || config.end.is_empty() {
        split.strings.push(piece(input, 0, input.len()));
        return split;
    }

    let finder = memmem::Finder::new(config.start.as_bytes());
    let mut i = 0;
    let mut last_string_start = 0;
    let mut at_interpolation = false;
    let mut extend_last_string = false;

    while i < input.len() {
        if !at_interpolation {
            let start = i;
            i = finder
                .find(&input.as_bytes()[i..])
                .map_or(input.len(), |found| i + found);
            split.strings.push(piece(input, start, i));
            last_string_start = start;
            at_interpolation = true;
        } else {
            let full_start = i;
            let expression_start = full_start + config.start.len();
            let Some(expression_end) = interpolation_end_index(input, &config.end, expression_start) else {
                // No closing delimiter: the rest is plain text.
                at_interpolation = false;
                extend_last_string = true;
                break;
            };
            let full_end = expression_end + config.end.len();
            split.expressions.push(InterpolationPiece {
                text: &input[expression_start..expression_end],
                start: char_offset(input, full_start),
                end: char_offset(input, full_end),
            });
            split.offsets.push(char_offset(input, expression_start));
            i = full_end;
            at_interpolation = false;
        }
    }

    if !at_interpolation {
        if extend_last_string {
            if let Some(last) = split.strings.last_mut() {
                *last = piece(input, last_string_start, input.len());
            }
        } else {
            split.strings.push(piece(input, i, input.len()));
        }
    }
    split
}

/// Byte position of the first interpolation start delimiter that has a
/// matching end delimiter, ignoring delimiters inside string literals.
pub(crate) fn find_interpolation(input: &str, config: &InterpolationConfig) -> Option<usize> {
    if config.start.is_empty() || config.end.is_empty() {
        return None;
    }
    let start = UnquotedChars::new(input, 0).find(|&i| input[i..].starts_with(config.start.as_str()))?;
    interpolation_end_index(input, &config.end, start + config.start.len()).map(|_| start)
}

/// Find `end` at or after byte `start`, skipping quoted text. After a `//`
/// comment the delimiter is taken wherever it appears.
fn interpolation_end_index(input: &str, end: &str, start: usize) -> Option<usize> {
    for i in UnquotedChars::new(input, start) {
        let rest = &input[i..];
        if rest.starts_with(end) {
            return Some(i);
        }
        if rest.starts_with("//") {
            return memmem::find(rest.as_bytes(), end.as_bytes()).map(|found| i + found);
        }
    }
    None
}

/// Byte positions of characters outside string literals.
///
/// A quote toggles the quoted state only when preceded by an even number
/// of backslashes.
struct UnquotedChars<'s> {
    chars: std::str::CharIndices<'s>,
    base: usize,
    quote: Option<char>,
    escapes: usize,
}

impl<'s> UnquotedChars<'s> {
    fn new(input: &'s str, start: usize) -> Self {
        Self {
            chars: input[start..].char_indices(),
            base: start,
            quote: None,
            escapes: 0,
        }
    }
}

impl Iterator for UnquotedChars<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        for (i, ch) in self.chars.by_ref() {
            let mut unquoted = None;
            if is_quote(ch) && self.quote.map_or(true, |q| q == ch) && self.escapes % 2 == 0 {
                self.quote = match self.quote {
                    Some(_) => None,
                    None => Some(ch),
                };
            } else if self.quote.is_none() {
                unquoted = Some(self.base + i);
            }
            self.escapes = if ch == '\\' { self.escapes + 1 } else { 0 };
            if unquoted.is_some() {
                return unquoted;
            }
        }
        None
    }
}

/// Byte position of a `//` comment outside string literals.
fn comment_start(input: &str) -> Option<usize> {
    let mut outer_quote: Option<char> = None;
    let mut chars = input.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        if ch == '/' && next == Some('/') && outer_quote.is_none() {
            return Some(i);
        }
        if outer_quote == Some(ch) {
            outer_quote = None;
        } else if outer_quote.is_none() && is_quote(ch) {
            outer_quote = Some(ch);
        }
    }
    None
}

/// Drop a trailing `//` comment. Returns the remaining text and whether a
/// comment was found.
pub fn strip_comments(input: &str) -> (&str, bool) {
    match comment_start(input) {
        Some(start) => (&input[..start], true),
        None => (input, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts<'s>(pieces: &[InterpolationPiece<'s>]) -> Vec<&'s str> {
        pieces.iter().map(|p| p.text).collect()
    }

    #[test]
    fn test_split_basic() {
        let split = split_interpolation("a {{ b }} c {{d}}", &InterpolationConfig::default());
        assert_eq!(texts(&split.strings), vec!["a ", " c ", ""]);
        assert_eq!(texts(&split.expressions), vec![" b ", "d"]);
        assert_eq!(split.offsets, vec![4, 14]);
        assert_eq!((split.expressions[0].start, split.expressions[0].end), (2, 9));
    }

    #[test]
    fn test_split_ignores_end_delimiter_in_quotes() {
        let split = split_interpolation("{{ '}}' }}!", &InterpolationConfig::default());
        assert_eq!(texts(&split.expressions), vec![" '}}' "]);
        assert_eq!(texts(&split.strings), vec!["", "!"]);
    }

    #[test]
    fn test_unterminated_interpolation_is_text() {
        let split = split_interpolation("a {{ b", &InterpolationConfig::default());
        assert!(split.expressions.is_empty());
        assert_eq!(texts(&split.strings), vec!["a {{ b"]);
    }

    #[test]
    fn test_positions_are_characters() {
        let split = split_interpolation("é{{x}}", &InterpolationConfig::default());
        assert_eq!(split.offsets, vec![3]);
        assert_eq!(split.expressions[0].end, 6);
    }

    #[test]
    fn test_custom_delimiters() {
        let config = InterpolationConfig {
            start: "[[".to_string(),
            end: "]]".to_string(),
        };
        let split = split_interpolation("{{a}} [[b]]", &config);
        assert_eq!(texts(&split.expressions), vec!["b"]);
    }

    #[test]
    fn test_strip_comments_respects_quotes() {
        assert_eq!(strip_comments("a // b"), ("a ", true));
        assert_eq!(strip_comments("'http://x' // y"), ("'http://x' ", true));
        assert_eq!(strip_comments("'//'"), ("'//'", false));
    }

    #[test]
    fn test_find_interpolation_skips_quoted() {
        let config = InterpolationConfig::default();
        assert_eq!(find_interpolation("a + {{b}}", &config), Some(4));
        assert_eq!(find_interpolation("'{{b}}'", &config), None);
        assert_eq!(find_interpolation("{{b", &config), None);
    }

    #[test]
    fn test_escaped_quote_keeps_string_open() {
        let split = split_interpolation(r#"{{ "a\"}}" }}"#, &InterpolationConfig::default());
        assert_eq!(texts(&split.expressions), vec![r#" "a\"}}" "#]);
    }
}
