//! Operator, literal, and tag types carried by AST nodes.

use std::fmt;

/// Binary operators, including the assignment family accepted in actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponentiation,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    In,
    And,
    Or,
    NullishCoalescing,
    // Assignment operators
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    ExponentiationAssign,
    AndAssign,
    OrAssign,
    NullishCoalescingAssign,
}

impl BinaryOperator {
    /// The source lexeme of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Exponentiation => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::NullishCoalescing => "??",
            BinaryOperator::Assign => "=",
            BinaryOperator::AddAssign => "+=",
            BinaryOperator::SubtractAssign => "-=",
            BinaryOperator::MultiplyAssign => "*=",
            BinaryOperator::DivideAssign => "/=",
            BinaryOperator::RemainderAssign => "%=",
            BinaryOperator::ExponentiationAssign => "**=",
            BinaryOperator::AndAssign => "&&=",
            BinaryOperator::OrAssign => "||=",
            BinaryOperator::NullishCoalescingAssign => "??=",
        }
    }

    /// Look up the operator spelled by an operator or keyword token.
    pub fn from_token(text: &str) -> Option<Self> {
        let op = match text {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Remainder,
            "**" => BinaryOperator::Exponentiation,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "===" => BinaryOperator::StrictEqual,
            "!==" => BinaryOperator::StrictNotEqual,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanOrEqual,
            ">=" => BinaryOperator::GreaterThanOrEqual,
            "in" => BinaryOperator::In,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            "??" => BinaryOperator::NullishCoalescing,
            "=" => BinaryOperator::Assign,
            "+=" => BinaryOperator::AddAssign,
            "-=" => BinaryOperator::SubtractAssign,
            "*=" => BinaryOperator::MultiplyAssign,
            "/=" => BinaryOperator::DivideAssign,
            "%=" => BinaryOperator::RemainderAssign,
            "**=" => BinaryOperator::ExponentiationAssign,
            "&&=" => BinaryOperator::AndAssign,
            "||=" => BinaryOperator::OrAssign,
            "??=" => BinaryOperator::NullishCoalescingAssign,
            _ => return None,
        };
        Some(op)
    }

    #[inline]
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOperator::Assign
                | BinaryOperator::AddAssign
                | BinaryOperator::SubtractAssign
                | BinaryOperator::MultiplyAssign
                | BinaryOperator::DivideAssign
                | BinaryOperator::RemainderAssign
                | BinaryOperator::ExponentiationAssign
                | BinaryOperator::AndAssign
                | BinaryOperator::OrAssign
                | BinaryOperator::NullishCoalescingAssign
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operator lexeme is one of the assignment operators.
pub fn is_assignment_operation(text: &str) -> bool {
    BinaryOperator::from_token(text).is_some_and(BinaryOperator::is_assignment)
}

/// Prefix arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of a `LiteralPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(&'a str),
}

/// A key of an object literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralMapKey<'a> {
    pub key: &'a str,
    /// The key was written as a string literal.
    pub quoted: bool,
    /// `{a}` shorthand: the value is a read of the same name.
    pub is_shorthand_initialized: bool,
}

/// How a pipe name is resolved by downstream tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPipeType {
    /// Looked up by its registered name, e.g. `| async`.
    ReferencedByName,
    /// Referenced directly as a class symbol, e.g. `| AsyncPipe`.
    ReferencedDirectly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_lexemes_round_trip() {
        for text in ["+", "**", "!==", "in", "??", "=", "??=", "**=", "&&="] {
            let op = BinaryOperator::from_token(text).unwrap();
            assert_eq!(op.as_str(), text);
        }
        assert_eq!(BinaryOperator::from_token("^"), None);
        assert_eq!(BinaryOperator::from_token("?."), None);
    }

    #[test]
    fn test_assignment_family() {
        assert!(is_assignment_operation("="));
        assert!(is_assignment_operation("+="));
        assert!(is_assignment_operation("??="));
        assert!(!is_assignment_operation("=="));
        assert!(!is_assignment_operation("<="));
        assert!(!is_assignment_operation("|"));
    }
}
