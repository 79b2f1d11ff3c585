//! tmplexpr_parser: Parser for template binding and action expressions.
//!
//! The [`Parser`] facade turns expression text into an arena-allocated tree
//! together with every error found along the way. It covers:
//! - actions (event handlers) and property bindings
//! - host bindings, which also reject pipes
//! - interpolated text such as `Hello {{ name }}!`
//! - the structural-directive microsyntax (`let item of items; index as i`)
//! - batch parsing of many bindings in parallel

mod interpolation;
mod options;
mod parse_ast;
mod parser;
mod precedence;

pub use interpolation::{split_interpolation, strip_comments, InterpolationPiece, SplitInterpolation};
pub use options::{InterpolationConfig, ParserOptions};
pub use parse_ast::{ParseContextFlags, ParseFlags};
pub use parser::{BatchParseResult, Parser};
pub use precedence::{get_binary_operator_precedence, OperatorPrecedence};
