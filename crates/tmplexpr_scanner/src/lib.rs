//! tmplexpr_scanner: Tokenizer for template expressions.
//!
//! Produces the complete token list for one expression up front:
//! - punctuation, identifiers, `#private` names and keywords
//! - numbers with `_` separators and exponents
//! - quoted strings and template literals with `${}` interpolations
//! - regular expression literals, told apart from division by context
//! - multi-character operators such as `?.`, `??=` and `**=`

pub mod char_codes;
mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{StringTokenKind, Token, TokenKind, KEYWORDS};

use tracing::trace;

/// Tokenize an expression. An error token, if any, is the last token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let tokens = Scanner::new(text).scan();
    trace!(len = text.len(), tokens = tokens.len(), "tokenized expression");
    tokens
}
