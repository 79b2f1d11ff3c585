//! Visitor traits for traversing expression trees.
//!
//! [`AstVisitor`] is the double-dispatch contract: [`Ast::visit`] calls the
//! method matching the node variant and returns whatever the visitor
//! produces. [`RecursiveAstVisitor`] is a pre-order walk whose default methods
//! descend into every child; implementors override only what they need.

use crate::node::*;

/// A visitor with one method per node variant.
pub trait AstVisitor<'a> {
    /// Opaque state threaded through a traversal.
    type Context;
    /// The value produced for each node.
    type Output;

    fn visit_empty_expr(&mut self, ast: &'a EmptyExpr, cx: &mut Self::Context) -> Self::Output;
    fn visit_implicit_receiver(&mut self, ast: &'a ImplicitReceiver, cx: &mut Self::Context) -> Self::Output;
    fn visit_this_receiver(&mut self, ast: &'a ThisReceiver, cx: &mut Self::Context) -> Self::Output;
    fn visit_chain(&mut self, ast: &'a Chain<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_conditional(&mut self, ast: &'a Conditional<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_property_read(&mut self, ast: &'a PropertyRead<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_safe_property_read(&mut self, ast: &'a SafePropertyRead<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_keyed_read(&mut self, ast: &'a KeyedRead<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_safe_keyed_read(&mut self, ast: &'a SafeKeyedRead<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_pipe(&mut self, ast: &'a BindingPipe<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_literal_primitive(&mut self, ast: &'a LiteralPrimitive<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_literal_array(&mut self, ast: &'a LiteralArray<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_literal_map(&mut self, ast: &'a LiteralMap<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_interpolation(&mut self, ast: &'a Interpolation<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_binary(&mut self, ast: &'a Binary<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_unary(&mut self, ast: &'a Unary<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_prefix_not(&mut self, ast: &'a PrefixNot<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_typeof_expression(&mut self, ast: &'a TypeofExpression<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_void_expression(&mut self, ast: &'a VoidExpression<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_non_null_assert(&mut self, ast: &'a NonNullAssert<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_call(&mut self, ast: &'a Call<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_safe_call(&mut self, ast: &'a SafeCall<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_template_literal(&mut self, ast: &'a TemplateLiteral<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_tagged_template_literal(&mut self, ast: &'a TaggedTemplateLiteral<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_parenthesized_expression(&mut self, ast: &'a ParenthesizedExpression<'a>, cx: &mut Self::Context) -> Self::Output;
    fn visit_regular_expression_literal(&mut self, ast: &'a RegularExpressionLiteral<'a>, cx: &mut Self::Context) -> Self::Output;
}

/// A pre-order traversal that visits every child node.
///
/// Every node passes through [`visit`](RecursiveAstVisitor::visit) before its
/// variant method runs, so overriding `visit` observes the whole tree in
/// root-to-leaf order. An override that still wants to descend calls
/// [`walk_ast`].
pub trait RecursiveAstVisitor<'a> {
    type Context;

    fn visit(&mut self, ast: &'a Ast<'a>, cx: &mut Self::Context) {
        walk_ast(self, ast, cx);
    }

    fn visit_all(&mut self, asts: NodeList<'a, AstRef<'a>>, cx: &mut Self::Context) {
        for ast in asts.iter().copied() {
            self.visit(ast, cx);
        }
    }

    fn visit_empty_expr(&mut self, _ast: &'a EmptyExpr, _cx: &mut Self::Context) {}

    fn visit_implicit_receiver(&mut self, _ast: &'a ImplicitReceiver, _cx: &mut Self::Context) {}

    fn visit_this_receiver(&mut self, _ast: &'a ThisReceiver, _cx: &mut Self::Context) {}

    fn visit_chain(&mut self, ast: &'a Chain<'a>, cx: &mut Self::Context) {
        self.visit_all(ast.expressions, cx);
    }

    fn visit_conditional(&mut self, ast: &'a Conditional<'a>, cx: &mut Self::Context) {
        self.visit(ast.condition, cx);
        self.visit(ast.true_exp, cx);
        self.visit(ast.false_exp, cx);
    }

    fn visit_property_read(&mut self, ast: &'a PropertyRead<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
    }

    fn visit_safe_property_read(&mut self, ast: &'a SafePropertyRead<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
    }

    fn visit_keyed_read(&mut self, ast: &'a KeyedRead<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
        self.visit(ast.key, cx);
    }

    fn visit_safe_keyed_read(&mut self, ast: &'a SafeKeyedRead<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
        self.visit(ast.key, cx);
    }

    fn visit_pipe(&mut self, ast: &'a BindingPipe<'a>, cx: &mut Self::Context) {
        self.visit(ast.exp, cx);
        self.visit_all(ast.args, cx);
    }

    fn visit_literal_primitive(&mut self, _ast: &'a LiteralPrimitive<'a>, _cx: &mut Self::Context) {}

    fn visit_literal_array(&mut self, ast: &'a LiteralArray<'a>, cx: &mut Self::Context) {
        self.visit_all(ast.expressions, cx);
    }

    fn visit_literal_map(&mut self, ast: &'a LiteralMap<'a>, cx: &mut Self::Context) {
        self.visit_all(ast.values, cx);
    }

    fn visit_interpolation(&mut self, ast: &'a Interpolation<'a>, cx: &mut Self::Context) {
        self.visit_all(ast.expressions, cx);
    }

    fn visit_binary(&mut self, ast: &'a Binary<'a>, cx: &mut Self::Context) {
        self.visit(ast.left, cx);
        self.visit(ast.right, cx);
    }

    fn visit_unary(&mut self, ast: &'a Unary<'a>, cx: &mut Self::Context) {
        self.visit(ast.expr, cx);
    }

    fn visit_prefix_not(&mut self, ast: &'a PrefixNot<'a>, cx: &mut Self::Context) {
        self.visit(ast.expression, cx);
    }

    fn visit_typeof_expression(&mut self, ast: &'a TypeofExpression<'a>, cx: &mut Self::Context) {
        self.visit(ast.expression, cx);
    }

    fn visit_void_expression(&mut self, ast: &'a VoidExpression<'a>, cx: &mut Self::Context) {
        self.visit(ast.expression, cx);
    }

    fn visit_non_null_assert(&mut self, ast: &'a NonNullAssert<'a>, cx: &mut Self::Context) {
        self.visit(ast.expression, cx);
    }

    fn visit_call(&mut self, ast: &'a Call<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
        self.visit_all(ast.args, cx);
    }

    fn visit_safe_call(&mut self, ast: &'a SafeCall<'a>, cx: &mut Self::Context) {
        self.visit(ast.receiver, cx);
        self.visit_all(ast.args, cx);
    }

    /// Elements and expressions are visited interleaved, in source order.
    fn visit_template_literal(&mut self, ast: &'a TemplateLiteral<'a>, cx: &mut Self::Context) {
        for (i, element) in ast.elements.iter().enumerate() {
            self.visit_template_literal_element(element, cx);
            if let Some(expression) = ast.expressions.get(i).copied() {
                self.visit(expression, cx);
            }
        }
    }

    fn visit_template_literal_element(
        &mut self,
        _ast: &'a TemplateLiteralElement<'a>,
        _cx: &mut Self::Context,
    ) {
    }

    fn visit_tagged_template_literal(&mut self, ast: &'a TaggedTemplateLiteral<'a>, cx: &mut Self::Context) {
        self.visit(ast.tag, cx);
        self.visit_template_literal(ast.template, cx);
    }

    fn visit_parenthesized_expression(&mut self, ast: &'a ParenthesizedExpression<'a>, cx: &mut Self::Context) {
        self.visit(ast.expression, cx);
    }

    fn visit_regular_expression_literal(
        &mut self,
        _ast: &'a RegularExpressionLiteral<'a>,
        _cx: &mut Self::Context,
    ) {
    }
}

/// Dispatch `ast` to the variant method of a [`RecursiveAstVisitor`].
pub fn walk_ast<'a, V>(visitor: &mut V, ast: &'a Ast<'a>, cx: &mut V::Context)
where
    V: RecursiveAstVisitor<'a> + ?Sized,
{
    match ast {
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
        Ast::RegularExpressionLiteral(n) => visitor.visit_regular_expression_literal(n, cx),
    }
}
