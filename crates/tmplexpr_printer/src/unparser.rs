//! Debug rendering of expression trees.
//!
//! Unlike the canonical serializer this form makes structure visible: pipes
//! are wrapped in parentheses, every chained expression is terminated with
//! `;`, and interpolations show their `{{ }}` delimiters. Receivers print
//! nothing at all, so `this.a` renders as `a`.

use crate::format_number;
use tmplexpr_ast::*;

/// Render an expression in the debug form.
pub fn unparse<'a>(ast: &'a Ast<'a>) -> String {
    Unparser::new().unparse(ast)
}

pub struct Unparser {
    expression: String,
}

impl Unparser {
    pub fn new() -> Self {
        Self {
            expression: String::new(),
        }
    }

    /// Render `ast`, reusing this unparser's buffer.
    pub fn unparse<'a>(&mut self, ast: &'a Ast<'a>) -> String {
        self.expression.clear();
        ast.visit(self, &mut ());
        std::mem::take(&mut self.expression)
    }

    #[inline]
    fn write(&mut self, text: &str) {
        self.expression.push_str(text);
    }

    fn print<'a>(&mut self, ast: &'a Ast<'a>) {
        ast.visit(self, &mut ());
    }

    fn print_args<'a>(&mut self, args: NodeList<'a, AstRef<'a>>) {
        for (i, arg) in args.iter().copied().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print(arg);
        }
    }

    fn write_double_quoted(&mut self, text: &str) {
        self.expression.push('"');
        self.expression.push_str(&text.replace('"', "\\\""));
        self.expression.push('"');
    }
}

impl Default for Unparser {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AstVisitor<'a> for Unparser {
    type Context = ();
    type Output = ();

    fn visit_empty_expr(&mut self, _ast: &'a EmptyExpr, _cx: &mut ()) {}

    fn visit_implicit_receiver(&mut self, _ast: &'a ImplicitReceiver, _cx: &mut ()) {}

    fn visit_this_receiver(&mut self, _ast: &'a ThisReceiver, _cx: &mut ()) {}

    fn visit_chain(&mut self, ast: &'a Chain<'a>, _cx: &mut ()) {
        for (i, expression) in ast.expressions.iter().copied().enumerate() {
            if i > 0 {
                self.write(" ");
            }
            self.print(expression);
            self.write(";");
        }
    }

    fn visit_conditional(&mut self, ast: &'a Conditional<'a>, _cx: &mut ()) {
        self.print(ast.condition);
        self.write(" ? ");
        self.print(ast.true_exp);
        self.write(" : ");
        self.print(ast.false_exp);
    }

    fn visit_property_read(&mut self, ast: &'a PropertyRead<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        if !ast.receiver.is_receiver() {
            self.write(".");
        }
        self.write(ast.name);
    }

    fn visit_safe_property_read(&mut self, ast: &'a SafePropertyRead<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("?.");
        self.write(ast.name);
    }

    fn visit_keyed_read(&mut self, ast: &'a KeyedRead<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("[");
        self.print(ast.key);
        self.write("]");
    }

    fn visit_safe_keyed_read(&mut self, ast: &'a SafeKeyedRead<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("?.[");
        self.print(ast.key);
        self.write("]");
    }

    fn visit_pipe(&mut self, ast: &'a BindingPipe<'a>, _cx: &mut ()) {
        self.write("(");
        self.print(ast.exp);
        self.write(" | ");
        self.write(ast.name);
        for arg in ast.args.iter().copied() {
            self.write(":");
            self.print(arg);
        }
        self.write(")");
    }

    fn visit_literal_primitive(&mut self, ast: &'a LiteralPrimitive<'a>, _cx: &mut ()) {
        match ast.value {
            LiteralValue::Null => self.write("null"),
            LiteralValue::Undefined => self.write("undefined"),
            LiteralValue::Boolean(value) => self.write(if value { "true" } else { "false" }),
            LiteralValue::Number(value) => self.write(&format_number(value)),
            LiteralValue::String(value) => self.write_double_quoted(value),
        }
    }

    fn visit_literal_array(&mut self, ast: &'a LiteralArray<'a>, _cx: &mut ()) {
        self.write("[");
        self.print_args(ast.expressions);
        self.write("]");
    }

    fn visit_literal_map(&mut self, ast: &'a LiteralMap<'a>, _cx: &mut ()) {
        self.write("{");
        for (i, (key, value)) in ast.keys.iter().zip(ast.values.iter().copied()).enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if key.quoted {
                self.write_double_quoted(key.key);
            } else {
                self.write(key.key);
            }
            self.write(": ");
            self.print(value);
        }
        self.write("}");
    }

    fn visit_interpolation(&mut self, ast: &'a Interpolation<'a>, _cx: &mut ()) {
        for (i, text) in ast.strings.iter().enumerate() {
            self.write(text);
            if let Some(expression) = ast.expressions.get(i).copied() {
                self.write("{{ ");
                self.print(expression);
                self.write(" }}");
            }
        }
    }

    fn visit_binary(&mut self, ast: &'a Binary<'a>, _cx: &mut ()) {
        self.print(ast.left);
        self.write(" ");
        self.write(ast.operation.as_str());
        self.write(" ");
        self.print(ast.right);
    }

    fn visit_unary(&mut self, ast: &'a Unary<'a>, _cx: &mut ()) {
        self.write(ast.operator.as_str());
        self.print(ast.expr);
    }

    fn visit_prefix_not(&mut self, ast: &'a PrefixNot<'a>, _cx: &mut ()) {
        self.write("!");
        self.print(ast.expression);
    }

    fn visit_typeof_expression(&mut self, ast: &'a TypeofExpression<'a>, _cx: &mut ()) {
        self.write("typeof ");
        self.print(ast.expression);
    }

    fn visit_void_expression(&mut self, ast: &'a VoidExpression<'a>, _cx: &mut ()) {
        self.write("void ");
        self.print(ast.expression);
    }

    fn visit_non_null_assert(&mut self, ast: &'a NonNullAssert<'a>, _cx: &mut ()) {
        self.print(ast.expression);
        self.write("!");
    }

    fn visit_call(&mut self, ast: &'a Call<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("(");
        self.print_args(ast.args);
        self.write(")");
    }

    fn visit_safe_call(&mut self, ast: &'a SafeCall<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("?.(");
        self.print_args(ast.args);
        self.write(")");
    }

    fn visit_template_literal(&mut self, ast: &'a TemplateLiteral<'a>, _cx: &mut ()) {
        self.write("`");
        for (i, element) in ast.elements.iter().enumerate() {
            self.write(element.text);
            if let Some(expression) = ast.expressions.get(i).copied() {
                self.write("${");
                self.print(expression);
                self.write("}");
            }
        }
        self.write("`");
    }

    fn visit_tagged_template_literal(&mut self, ast: &'a TaggedTemplateLiteral<'a>, cx: &mut ()) {
        self.print(ast.tag);
        self.visit_template_literal(ast.template, cx);
    }

    fn visit_parenthesized_expression(&mut self, ast: &'a ParenthesizedExpression<'a>, _cx: &mut ()) {
        self.write("(");
        self.print(ast.expression);
        self.write(")");
    }

    fn visit_regular_expression_literal(&mut self, ast: &'a RegularExpressionLiteral<'a>, _cx: &mut ()) {
        self.write("/");
        self.write(ast.body);
        self.write("/");
        if let Some(flags) = ast.flags {
            self.write(flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmplexpr_core::text::ParseSpan;
    use tmplexpr_core::ExpressionArena;

    fn data() -> NodeData {
        let span = ParseSpan::new(0, 0);
        NodeData::new(span, span.to_absolute(0))
    }

    #[test]
    fn test_chain_terminates_every_expression() {
        let arena = ExpressionArena::new();
        let one = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: data(),
            value: LiteralValue::Number(1.0),
        }));
        let text = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: data(),
            value: LiteralValue::String("a\"b"),
        }));
        let chain = Ast::Chain(Chain {
            data: data(),
            expressions: arena.alloc_slice([one as AstRef<'_>, text]),
        });
        assert_eq!(unparse(&chain), r#"1; "a\"b";"#);
    }

    #[test]
    fn test_interpolation_shows_delimiters() {
        let arena = ExpressionArena::new();
        let implicit = arena.alloc(Ast::ImplicitReceiver(ImplicitReceiver { data: data() }));
        let name = arena.alloc(Ast::PropertyRead(PropertyRead {
            data: data(),
            name_span: data().source_span,
            receiver: implicit,
            name: "name",
        }));
        let interpolation = Ast::Interpolation(Interpolation {
            data: data(),
            strings: arena.alloc_slice(["Hi ", "!"]),
            expressions: arena.alloc_slice([name as AstRef<'_>]),
        });
        let mut unparser = Unparser::new();
        assert_eq!(unparser.unparse(&interpolation), "Hi {{ name }}!");
        // The buffer is reset between calls.
        assert_eq!(unparser.unparse(&interpolation), "Hi {{ name }}!");
    }
}
