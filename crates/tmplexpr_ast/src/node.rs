//! AST node definitions for template expressions.
//!
//! The node set is closed. Every node records its span inside the expression
//! text and its absolute span inside the enclosing document. Children are
//! arena-allocated references, so a tree is immutable once built and is
//! released together with its arena.

use crate::types::*;
use crate::visitor::AstVisitor;
use tmplexpr_core::text::{AbsoluteSourceSpan, ParseSpan, TextPos};
use tmplexpr_diagnostics::ParserError;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Location data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// Offsets within the parsed expression text.
    pub span: ParseSpan,
    /// Offsets within the enclosing document.
    pub source_span: AbsoluteSourceSpan,
}

impl NodeData {
    pub fn new(span: ParseSpan, source_span: AbsoluteSourceSpan) -> Self {
        Self { span, source_span }
    }
}

/// A reference to an arena-allocated node.
pub type AstRef<'a> = &'a Ast<'a>;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Expression Nodes
// ============================================================================

/// Any expression node.
#[derive(Debug, Clone, Copy)]
pub enum Ast<'a> {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ThisReceiver),
    Chain(Chain<'a>),
    Conditional(Conditional<'a>),
    PropertyRead(PropertyRead<'a>),
    SafePropertyRead(SafePropertyRead<'a>),
    KeyedRead(KeyedRead<'a>),
    SafeKeyedRead(SafeKeyedRead<'a>),
    BindingPipe(BindingPipe<'a>),
    LiteralPrimitive(LiteralPrimitive<'a>),
    LiteralArray(LiteralArray<'a>),
    LiteralMap(LiteralMap<'a>),
    Interpolation(Interpolation<'a>),
    Binary(Binary<'a>),
    Unary(Unary<'a>),
    PrefixNot(PrefixNot<'a>),
    TypeofExpression(TypeofExpression<'a>),
    VoidExpression(VoidExpression<'a>),
    NonNullAssert(NonNullAssert<'a>),
    Call(Call<'a>),
    SafeCall(SafeCall<'a>),
    TemplateLiteral(TemplateLiteral<'a>),
    TaggedTemplateLiteral(TaggedTemplateLiteral<'a>),
    ParenthesizedExpression(ParenthesizedExpression<'a>),
    RegularExpressionLiteral(RegularExpressionLiteral<'a>),
}

/// Placeholder inserted where an expression failed to parse.
#[derive(Debug, Clone, Copy)]
pub struct EmptyExpr {
    pub data: NodeData,
}

/// The implicit component context, as in `foo` meaning `this.foo`.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitReceiver {
    pub data: NodeData,
}

/// An explicit `this`.
#[derive(Debug, Clone, Copy)]
pub struct ThisReceiver {
    pub data: NodeData,
}

/// Which receiver a receiver node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverKind {
    Implicit,
    This,
}

/// `a; b; c` in an action.
#[derive(Debug, Clone, Copy)]
pub struct Chain<'a> {
    pub data: NodeData,
    pub expressions: NodeList<'a, AstRef<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Conditional<'a> {
    pub data: NodeData,
    pub condition: AstRef<'a>,
    pub true_exp: AstRef<'a>,
    pub false_exp: AstRef<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyRead<'a> {
    pub data: NodeData,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: AstRef<'a>,
    pub name: &'a str,
}

/// `a?.b`
#[derive(Debug, Clone, Copy)]
pub struct SafePropertyRead<'a> {
    pub data: NodeData,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: AstRef<'a>,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyedRead<'a> {
    pub data: NodeData,
    pub receiver: AstRef<'a>,
    pub key: AstRef<'a>,
}

/// `a?.[k]`
#[derive(Debug, Clone, Copy)]
pub struct SafeKeyedRead<'a> {
    pub data: NodeData,
    pub receiver: AstRef<'a>,
    pub key: AstRef<'a>,
}

/// `exp | name:arg1:arg2`
#[derive(Debug, Clone, Copy)]
pub struct BindingPipe<'a> {
    pub data: NodeData,
    pub exp: AstRef<'a>,
    pub name: &'a str,
    pub args: NodeList<'a, AstRef<'a>>,
    pub pipe_type: BindingPipeType,
    pub name_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct LiteralPrimitive<'a> {
    pub data: NodeData,
    pub value: LiteralValue<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct LiteralArray<'a> {
    pub data: NodeData,
    pub expressions: NodeList<'a, AstRef<'a>>,
}

/// An object literal. `keys` and `values` are parallel.
#[derive(Debug, Clone, Copy)]
pub struct LiteralMap<'a> {
    pub data: NodeData,
    pub keys: NodeList<'a, LiteralMapKey<'a>>,
    pub values: NodeList<'a, AstRef<'a>>,
}

/// Text with embedded expressions. `strings.len() == expressions.len() + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Interpolation<'a> {
    pub data: NodeData,
    pub strings: NodeList<'a, &'a str>,
    pub expressions: NodeList<'a, AstRef<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Binary<'a> {
    pub data: NodeData,
    pub operation: BinaryOperator,
    pub left: AstRef<'a>,
    pub right: AstRef<'a>,
}

/// Prefix `+x` or `-x`.
#[derive(Debug, Clone, Copy)]
pub struct Unary<'a> {
    pub data: NodeData,
    pub operator: UnaryOperator,
    pub expr: AstRef<'a>,
}

/// One side of the subtraction a [`Unary`] stands for.
#[derive(Debug, Clone, Copy)]
pub enum DesugaredOperand<'a> {
    /// The implicit literal `0`.
    Zero,
    Expression(AstRef<'a>),
}

impl<'a> Unary<'a> {
    /// The operands of the equivalent subtraction: `-x` is `0 - x` and `+x` is
    /// `x - 0`.
    pub fn desugar_operands(&self) -> (DesugaredOperand<'a>, DesugaredOperand<'a>) {
        match self.operator {
            UnaryOperator::Minus => (DesugaredOperand::Zero, DesugaredOperand::Expression(self.expr)),
            UnaryOperator::Plus => (DesugaredOperand::Expression(self.expr), DesugaredOperand::Zero),
        }
    }
}

/// `!x`
#[derive(Debug, Clone, Copy)]
pub struct PrefixNot<'a> {
    pub data: NodeData,
    pub expression: AstRef<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeofExpression<'a> {
    pub data: NodeData,
    pub expression: AstRef<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct VoidExpression<'a> {
    pub data: NodeData,
    pub expression: AstRef<'a>,
}

/// Postfix `x!`
#[derive(Debug, Clone, Copy)]
pub struct NonNullAssert<'a> {
    pub data: NodeData,
    pub expression: AstRef<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub data: NodeData,
    pub receiver: AstRef<'a>,
    pub args: NodeList<'a, AstRef<'a>>,
    /// Covers the text between the parentheses.
    pub argument_span: AbsoluteSourceSpan,
}

/// `f?.(x)`
#[derive(Debug, Clone, Copy)]
pub struct SafeCall<'a> {
    pub data: NodeData,
    pub receiver: AstRef<'a>,
    pub args: NodeList<'a, AstRef<'a>>,
    pub argument_span: AbsoluteSourceSpan,
}

/// A backtick string. `elements.len() == expressions.len() + 1` when the
/// literal is well formed.
#[derive(Debug, Clone, Copy)]
pub struct TemplateLiteral<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, TemplateLiteralElement<'a>>,
    pub expressions: NodeList<'a, AstRef<'a>>,
}

/// A run of literal text inside a template literal.
#[derive(Debug, Clone, Copy)]
pub struct TemplateLiteralElement<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

/// `` tag`text ${value}` ``
#[derive(Debug, Clone, Copy)]
pub struct TaggedTemplateLiteral<'a> {
    pub data: NodeData,
    pub tag: AstRef<'a>,
    pub template: &'a TemplateLiteral<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: AstRef<'a>,
}

/// `/body/flags`
#[derive(Debug, Clone, Copy)]
pub struct RegularExpressionLiteral<'a> {
    pub data: NodeData,
    pub body: &'a str,
    pub flags: Option<&'a str>,
}

// ============================================================================
// Ast Accessors
// ============================================================================

impl<'a> Ast<'a> {
    #[inline]
    pub fn data(&self) -> &NodeData {
        match self {
            Ast::EmptyExpr(n) => &n.data,
            Ast::ImplicitReceiver(n) => &n.data,
            Ast::ThisReceiver(n) => &n.data,
            Ast::Chain(n) => &n.data,
            Ast::Conditional(n) => &n.data,
            Ast::PropertyRead(n) => &n.data,
            Ast::SafePropertyRead(n) => &n.data,
            Ast::KeyedRead(n) => &n.data,
            Ast::SafeKeyedRead(n) => &n.data,
            Ast::BindingPipe(n) => &n.data,
            Ast::LiteralPrimitive(n) => &n.data,
            Ast::LiteralArray(n) => &n.data,
            Ast::LiteralMap(n) => &n.data,
            Ast::Interpolation(n) => &n.data,
            Ast::Binary(n) => &n.data,
            Ast::Unary(n) => &n.data,
            Ast::PrefixNot(n) => &n.data,
            Ast::TypeofExpression(n) => &n.data,
            Ast::VoidExpression(n) => &n.data,
            Ast::NonNullAssert(n) => &n.data,
            Ast::Call(n) => &n.data,
            Ast::SafeCall(n) => &n.data,
            Ast::TemplateLiteral(n) => &n.data,
            Ast::TaggedTemplateLiteral(n) => &n.data,
            Ast::ParenthesizedExpression(n) => &n.data,
            Ast::RegularExpressionLiteral(n) => &n.data,
        }
    }

    /// The span relative to the parsed expression text.
    #[inline]
    pub fn span(&self) -> ParseSpan {
        self.data().span
    }

    /// The span relative to the enclosing document.
    #[inline]
    pub fn source_span(&self) -> AbsoluteSourceSpan {
        self.data().source_span
    }

    /// The span of the name for name-bearing nodes.
    pub fn name_span(&self) -> Option<AbsoluteSourceSpan> {
        match self {
            Ast::PropertyRead(n) => Some(n.name_span),
            Ast::SafePropertyRead(n) => Some(n.name_span),
            Ast::BindingPipe(n) => Some(n.name_span),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty_expr(&self) -> bool {
        matches!(self, Ast::EmptyExpr(_))
    }

    /// The receiver variant, if this node is one.
    #[inline]
    pub fn receiver_kind(&self) -> Option<ReceiverKind> {
        match self {
            Ast::ImplicitReceiver(_) => Some(ReceiverKind::Implicit),
            Ast::ThisReceiver(_) => Some(ReceiverKind::This),
            _ => None,
        }
    }

    #[inline]
    pub fn is_receiver(&self) -> bool {
        self.receiver_kind().is_some()
    }

    /// A stable name for the node variant, for diagnostics and tests.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Ast::EmptyExpr(_) => "EmptyExpr",
            Ast::ImplicitReceiver(_) => "ImplicitReceiver",
            Ast::ThisReceiver(_) => "ThisReceiver",
            Ast::Chain(_) => "Chain",
            Ast::Conditional(_) => "Conditional",
            Ast::PropertyRead(_) => "PropertyRead",
            Ast::SafePropertyRead(_) => "SafePropertyRead",
            Ast::KeyedRead(_) => "KeyedRead",
            Ast::SafeKeyedRead(_) => "SafeKeyedRead",
            Ast::BindingPipe(_) => "BindingPipe",
            Ast::LiteralPrimitive(_) => "LiteralPrimitive",
            Ast::LiteralArray(_) => "LiteralArray",
            Ast::LiteralMap(_) => "LiteralMap",
            Ast::Interpolation(_) => "Interpolation",
            Ast::Binary(_) => "Binary",
            Ast::Unary(_) => "Unary",
            Ast::PrefixNot(_) => "PrefixNot",
            Ast::TypeofExpression(_) => "TypeofExpression",
            Ast::VoidExpression(_) => "VoidExpression",
            Ast::NonNullAssert(_) => "NonNullAssert",
            Ast::Call(_) => "Call",
            Ast::SafeCall(_) => "SafeCall",
            Ast::TemplateLiteral(_) => "TemplateLiteral",
            Ast::TaggedTemplateLiteral(_) => "TaggedTemplateLiteral",
            Ast::ParenthesizedExpression(_) => "ParenthesizedExpression",
            Ast::RegularExpressionLiteral(_) => "RegularExpressionLiteral",
        }
    }

    /// Dispatch to the visitor method matching this node's variant.
    pub fn visit<V>(&'a self, visitor: &mut V, cx: &mut V::Context) -> V::Output
    where
        V: AstVisitor<'a> + ?Sized,
    {
        match self {
            Ast::EmptyExpr(n) => visitor.visit_empty_expr(n, cx),
            Ast::ImplicitReceiver(n) => visitor.visit_implicit_receiver(n, cx),
            Ast::ThisReceiver(n) => visitor.visit_this_receiver(n, cx),
            Ast::Chain(n) => visitor.visit_chain(n, cx),
            Ast::Conditional(n) => visitor.visit_conditional(n, cx),
            Ast::PropertyRead(n) => visitor.visit_property_read(n, cx),
            Ast::SafePropertyRead(n) => visitor.visit_safe_property_read(n, cx),
            Ast::KeyedRead(n) => visitor.visit_keyed_read(n, cx),
            Ast::SafeKeyedRead(n) => visitor.visit_safe_keyed_read(n, cx),
            Ast::BindingPipe(n) => visitor.visit_pipe(n, cx),
            Ast::LiteralPrimitive(n) => visitor.visit_literal_primitive(n, cx),
            Ast::LiteralArray(n) => visitor.visit_literal_array(n, cx),
            Ast::LiteralMap(n) => visitor.visit_literal_map(n, cx),
            Ast::Interpolation(n) => visitor.visit_interpolation(n, cx),
            Ast::Binary(n) => visitor.visit_binary(n, cx),
            Ast::Unary(n) => visitor.visit_unary(n, cx),
            Ast::PrefixNot(n) => visitor.visit_prefix_not(n, cx),
            Ast::TypeofExpression(n) => visitor.visit_typeof_expression(n, cx),
            Ast::VoidExpression(n) => visitor.visit_void_expression(n, cx),
            Ast::NonNullAssert(n) => visitor.visit_non_null_assert(n, cx),
            Ast::Call(n) => visitor.visit_call(n, cx),
            Ast::SafeCall(n) => visitor.visit_safe_call(n, cx),
            Ast::TemplateLiteral(n) => visitor.visit_template_literal(n, cx),
            Ast::TaggedTemplateLiteral(n) => visitor.visit_tagged_template_literal(n, cx),
            Ast::ParenthesizedExpression(n) => visitor.visit_parenthesized_expression(n, cx),
            Ast::RegularExpressionLiteral(n) => {
                visitor.visit_regular_expression_literal(n, cx)
            }
        }
    }
}

// ============================================================================
// Parse Results
// ============================================================================

/// A parsed expression together with the text it came from.
#[derive(Debug, Clone)]
pub struct AstWithSource<'a> {
    pub ast: AstRef<'a>,
    pub source: &'a str,
    /// Human-readable label for where the expression came from.
    pub location: String,
    pub absolute_offset: TextPos,
    pub errors: Vec<ParserError>,
}

impl<'a> AstWithSource<'a> {
    /// Covers the whole source text.
    pub fn span(&self) -> ParseSpan {
        ParseSpan::new(0, self.source.chars().count() as TextPos)
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        self.span().to_absolute(self.absolute_offset)
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn visit<V>(&self, visitor: &mut V, cx: &mut V::Context) -> V::Output
    where
        V: AstVisitor<'a> + ?Sized,
    {
        self.ast.visit(visitor, cx)
    }
}

// ============================================================================
// Template Bindings
// ============================================================================

/// A key or value name in a structural directive's microsyntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateBindingIdentifier<'a> {
    pub source: &'a str,
    pub span: AbsoluteSourceSpan,
}

/// `let item = $implicit` or `index as i`. The value is absent for a bare
/// `let item`.
#[derive(Debug, Clone, Copy)]
pub struct VariableBinding<'a> {
    pub source_span: AbsoluteSourceSpan,
    pub key: TemplateBindingIdentifier<'a>,
    pub value: Option<TemplateBindingIdentifier<'a>>,
}

/// A directive input bound to an expression, such as `ngForOf: items`.
#[derive(Debug, Clone)]
pub struct ExpressionBinding<'a> {
    pub source_span: AbsoluteSourceSpan,
    pub key: TemplateBindingIdentifier<'a>,
    pub value: Option<AstWithSource<'a>>,
}

#[derive(Debug, Clone)]
pub enum TemplateBinding<'a> {
    Variable(VariableBinding<'a>),
    Expression(ExpressionBinding<'a>),
}

impl<'a> TemplateBinding<'a> {
    pub fn key(&self) -> &TemplateBindingIdentifier<'a> {
        match self {
            TemplateBinding::Variable(b) => &b.key,
            TemplateBinding::Expression(b) => &b.key,
        }
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        match self {
            TemplateBinding::Variable(b) => b.source_span,
            TemplateBinding::Expression(b) => b.source_span,
        }
    }
}

/// The bindings of one structural directive attribute.
#[derive(Debug, Clone)]
pub struct TemplateBindingParseResult<'a> {
    pub template_bindings: Vec<TemplateBinding<'a>>,
    pub errors: Vec<ParserError>,
}
