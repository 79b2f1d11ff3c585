//! tmplexpr_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every problem found while scanning or parsing an expression is reported as
//! data: the scanner emits an error token, and the parser turns grammar
//! violations (and any error tokens it passes over) into [`ParserError`]s that
//! travel with the returned tree. Nothing here ever aborts a parse.

use miette::{LabeledSpan, SourceCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tmplexpr_core::text::TextPos;

/// A diagnostic message template with a stable code.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1003, 2004).
    pub code: u32,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

impl DiagnosticMessage {
    /// Fill the template's placeholders.
    pub fn format(&self, args: &[&str]) -> String {
        format_message(self.message, args)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
///
/// The template is scanned once, so placeholder text inside an argument is
/// copied through unchanged.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .and_then(|close| Some((close, after[..close].parse::<usize>().ok()?)))
            .and_then(|(close, index)| Some((close, *args.get(index)?)));
        match placeholder {
            Some((close, arg)) => {
                result.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Where inside the expression a diagnostic points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorAnchor {
    /// A zero-based character index into the expression text.
    Column(TextPos),
    /// Past the last token.
    EndOfExpression,
    /// The diagnostic concerns the expression as a whole.
    Unanchored,
}

impl fmt::Display for ErrorAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorAnchor::Column(index) => write!(f, " at column {} in ", index + 1),
            ErrorAnchor::EndOfExpression => write!(f, " at the end of the expression "),
            ErrorAnchor::Unanchored => write!(f, " "),
        }
    }
}

/// A diagnostic produced while parsing one expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("Parser Error: {message}{anchor}[{input}] in {location}")]
pub struct ParserError {
    /// The diagnostic code of the message template.
    pub code: u32,
    /// The resolved message text, without location decoration.
    pub message: String,
    /// The expression text the error was found in.
    pub input: String,
    /// Human-readable label for where the expression came from.
    pub location: String,
    pub anchor: ErrorAnchor,
    /// Absolute offset of the expression text within its document.
    pub absolute_offset: TextPos,
}

impl ParserError {
    pub fn new(
        message: &DiagnosticMessage,
        args: &[&str],
        input: &str,
        location: &str,
        anchor: ErrorAnchor,
        absolute_offset: TextPos,
    ) -> Self {
        Self::with_text(
            message.code,
            message.format(args),
            input,
            location,
            anchor,
            absolute_offset,
        )
    }

    /// Create an error whose text was already resolved by the caller.
    pub fn with_text(
        code: u32,
        message: String,
        input: &str,
        location: &str,
        anchor: ErrorAnchor,
        absolute_offset: TextPos,
    ) -> Self {
        Self {
            code,
            message,
            input: input.to_string(),
            location: location.to_string(),
            anchor,
            absolute_offset,
        }
    }

    /// The one-based column shown in the message, if anchored at a character.
    pub fn column(&self) -> Option<TextPos> {
        match self.anchor {
            ErrorAnchor::Column(index) => Some(index + 1),
            _ => None,
        }
    }

    /// The absolute document position of the anchor.
    pub fn position(&self) -> Option<TextPos> {
        match self.anchor {
            ErrorAnchor::Column(index) => Some(self.absolute_offset + index),
            ErrorAnchor::EndOfExpression => {
                Some(self.absolute_offset + self.input.chars().count() as TextPos)
            }
            ErrorAnchor::Unanchored => None,
        }
    }

    fn anchor_byte_offset(&self) -> Option<usize> {
        let index = match self.anchor {
            ErrorAnchor::Column(index) => index as usize,
            ErrorAnchor::EndOfExpression => return Some(self.input.len()),
            ErrorAnchor::Unanchored => return None,
        };
        Some(
            self.input
                .char_indices()
                .nth(index)
                .map_or(self.input.len(), |(offset, _)| offset),
        )
    }
}

impl miette::Diagnostic for ParserError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("tmplexpr::E{}", self.code)))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.input)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.anchor_byte_offset()?;
        Some(Box::new(std::iter::once(LabeledSpan::at_offset(
            offset,
            self.message.clone(),
        ))))
    }
}

/// The errors accumulated while parsing one expression.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollection {
    errors: Vec<ParserError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ParserError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn extend(&mut self, other: ErrorCollection) {
        self.errors.extend(other.errors);
    }

    /// Sort errors by document position, unanchored errors first.
    pub fn sort(&mut self) {
        self.errors.sort_by_key(|e| e.position());
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const LEXER_ERROR: DiagnosticMessage = diag!(1000, "Lexer Error: {0} at column {1} in expression [{2}]");
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!(1001, "Unexpected character [{0}]");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1002, "Invalid character [{0}]");
    pub const INVALID_NUMERIC_SEPARATOR: DiagnosticMessage = diag!(1003, "Invalid numeric separator");
    pub const INVALID_EXPONENT: DiagnosticMessage = diag!(1004, "Invalid exponent");
    pub const UNTERMINATED_QUOTE: DiagnosticMessage = diag!(1005, "Unterminated quote");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!(1006, "Invalid unicode escape");
    pub const INVALID_UNICODE_ESCAPE_SEQUENCE: DiagnosticMessage = diag!(1007, "Invalid unicode escape [\\u{0}]");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = diag!(1008, "Unterminated template literal");
    pub const UNTERMINATED_REGULAR_EXPRESSION: DiagnosticMessage = diag!(1009, "Unterminated regular expression");
    /// An error token reported by the parser; the token text is used verbatim.
    pub const LEXER_ERROR_TOKEN: DiagnosticMessage = diag!(1010, "{0}");

    // ========================================================================
    // Parser errors (2000-2099)
    // ========================================================================
    pub const UNEXPECTED_TOKEN_QUOTED: DiagnosticMessage = diag!(2001, "Unexpected token '{0}'");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(2002, "Unexpected token {0}");
    pub const UNEXPECTED_END_OF_EXPRESSION: DiagnosticMessage = diag!(2003, "Unexpected end of expression: {0}");
    pub const MISSING_EXPECTED: DiagnosticMessage = diag!(2004, "Missing expected {0}");
    pub const MISSING_CLOSING_PARENTHESES: DiagnosticMessage = diag!(2005, "Missing closing parentheses");
    pub const EXPECTED_IDENTIFIER_OR_KEYWORD: DiagnosticMessage = diag!(2006, "Unexpected {0}, expected identifier or keyword");
    pub const EXPECTED_IDENTIFIER_KEYWORD_OR_STRING: DiagnosticMessage = diag!(2007, "Unexpected {0}, expected identifier, keyword, or string");
    pub const PRIVATE_IDENTIFIERS_NOT_SUPPORTED: DiagnosticMessage = diag!(2008, "Private identifiers are not supported. Unexpected private identifier: {0}");
    pub const EXPECTED_IDENTIFIER_FOR_PROPERTY_ACCESS: DiagnosticMessage = diag!(2009, "Expected identifier for property access");
    pub const CONDITIONAL_REQUIRES_ALL_3_EXPRESSIONS: DiagnosticMessage = diag!(2010, "Conditional expression {0} requires all 3 expressions");
    pub const UNARY_BEFORE_EXPONENTIATION: DiagnosticMessage = diag!(2011, "Unary operator used immediately before exponentiation expression. Parenthesis must be used to disambiguate operator precedence");
    pub const SAFE_ACCESS_IN_ASSIGNMENT: DiagnosticMessage = diag!(2012, "The '?.' operator cannot be used in the assignment");
    pub const BINDINGS_CANNOT_CONTAIN_ASSIGNMENTS: DiagnosticMessage = diag!(2013, "Bindings cannot contain assignments");
    pub const BINDING_CANNOT_CONTAIN_CHAINED_EXPRESSION: DiagnosticMessage = diag!(2014, "Binding expression cannot contain chained expression");
    pub const PIPE_IN_ACTION_EXPRESSION: DiagnosticMessage = diag!(2015, "Cannot have a pipe in an action expression");
    pub const KEY_ACCESS_CANNOT_BE_EMPTY: DiagnosticMessage = diag!(2016, "Key access cannot be empty");
    pub const EMPTY_TEMPLATE_LITERAL_INTERPOLATION: DiagnosticMessage = diag!(2017, "Template literal interpolation cannot be empty");
    pub const EXPRESSION_TOO_DEEPLY_NESTED: DiagnosticMessage = diag!(2018, "Expression is too deeply nested");

    // ========================================================================
    // Regular expression literal errors (3000-3099)
    // ========================================================================
    pub const UNSUPPORTED_REGEX_FLAG: DiagnosticMessage = diag!(3001, "Unsupported regular expression flag \"{0}\". The supported flags are: \"d\", \"g\", \"i\", \"m\", \"s\", \"u\", \"v\", \"y\"");
    pub const DUPLICATE_REGEX_FLAG: DiagnosticMessage = diag!(3002, "Duplicate regular expression flag \"{0}\"");

    // ========================================================================
    // Interpolation and host binding errors (4000-4099)
    // ========================================================================
    pub const INTERPOLATION_IN_EXPRESSION: DiagnosticMessage = diag!(4001, "Got interpolation ({0}{1}) where expression was expected");
    pub const BLANK_INTERPOLATION: DiagnosticMessage = diag!(4002, "Blank expressions are not allowed in interpolated strings");
    pub const INTERPOLATION_ONLY_COMMENT: DiagnosticMessage = diag!(4003, "Interpolation expression cannot only contain a comment");
    pub const HOST_BINDING_CANNOT_CONTAIN: DiagnosticMessage = diag!(4004, "Host binding expression cannot contain {0}");
}
