//! Operator precedence for binary operators.

use tmplexpr_scanner::Token;

/// Binary precedence levels, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    NullishCoalescing = 1,
    LogicalOr = 2,
    LogicalAnd = 3,
    Equality = 4,
    Relational = 5,
    Additive = 6,
    Multiplicative = 7,
    Exponentiation = 8,
    Invalid = 255,
}

impl OperatorPrecedence {
    /// `**` groups to the right; every other binary operator groups left.
    #[inline]
    pub fn is_right_associative(self) -> bool {
        self == OperatorPrecedence::Exponentiation
    }
}

/// Get the binary precedence of the operator a token spells.
pub fn get_binary_operator_precedence(token: &Token) -> OperatorPrecedence {
    if token.is_keyword_in() {
        return OperatorPrecedence::Relational;
    }
    if !token.is_any_operator() {
        return OperatorPrecedence::Invalid;
    }
    match token.str_value.as_str() {
        "??" => OperatorPrecedence::NullishCoalescing,
        "||" => OperatorPrecedence::LogicalOr,
        "&&" => OperatorPrecedence::LogicalAnd,
        "==" | "!=" | "===" | "!==" => OperatorPrecedence::Equality,
        "<" | ">" | "<=" | ">=" => OperatorPrecedence::Relational,
        "+" | "-" => OperatorPrecedence::Additive,
        "*" | "/" | "%" => OperatorPrecedence::Multiplicative,
        "**" => OperatorPrecedence::Exponentiation,
        _ => OperatorPrecedence::Invalid,
    }
}
