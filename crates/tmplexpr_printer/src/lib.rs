//! tmplexpr_printer: AST to text output.
//!
//! Two renderings of an expression tree:
//! - [`serialize`] produces the canonical, whitespace-normalized form. It is
//!   stable under re-parsing and is what downstream tooling hashes and compares.
//! - [`Unparser`] produces a debug form for tests, with double-quoted strings
//!   and fully parenthesized pipes so that grouping is visible.

mod serializer;
mod unparser;

pub use serializer::{serialize, serialize_with_source, Serializer};
pub use unparser::{unparse, Unparser};

/// Render a numeric literal. Integral values print without a fraction.
///
/// Literals too large for `f64` scan as infinity and print as `1e999`, which
/// scans back to the same value. The scanner never produces NaN.
pub fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "1e999" } else { "-1e999" }.to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.0), "1234");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(f64::INFINITY), "1e999");
        assert_eq!(format_number(f64::NEG_INFINITY), "-1e999");
    }
}
