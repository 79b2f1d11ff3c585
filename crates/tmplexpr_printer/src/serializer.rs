//! Canonical serialization of expression trees.

use crate::format_number;
use tmplexpr_ast::*;

/// Serialize an expression to its canonical text.
pub fn serialize<'a>(ast: &'a Ast<'a>) -> String {
    let mut serializer = Serializer::new();
    serializer.print(ast);
    serializer.finish()
}

/// Serialize the tree of a parse result.
pub fn serialize_with_source(result: &AstWithSource<'_>) -> String {
    serialize(result.ast)
}

/// Writes the canonical form: single spaces around binary operators, `, `
/// between list items, `; ` between chained expressions, single-quoted
/// strings, and pipes as `exp | name:arg`.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(64),
        }
    }

    pub fn print<'a>(&mut self, ast: &'a Ast<'a>) {
        ast.visit(self, &mut ());
    }

    pub fn finish(self) -> String {
        self.output
    }

    #[inline]
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn print_list<'a>(&mut self, asts: NodeList<'a, AstRef<'a>>, separator: &str) {
        for (i, ast) in asts.iter().copied().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.print(ast);
        }
    }

    fn write_quoted(&mut self, text: &str) {
        self.output.push('\'');
        for ch in text.chars() {
            if ch == '\\' || ch == '\'' {
                self.output.push('\\');
            }
            self.output.push(ch);
        }
        self.output.push('\'');
    }

    /// Template text with `\`, `` ` `` and a `$` that starts `${` escaped.
    fn write_template_text(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            let escape = match ch {
                '\\' | '`' => true,
                '$' => chars.peek() == Some(&'{'),
                _ => false,
            };
            if escape {
                self.output.push('\\');
            }
            self.output.push(ch);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AstVisitor<'a> for Serializer {
    type Context = ();
    type Output = ();

    fn visit_empty_expr(&mut self, _ast: &'a EmptyExpr, _cx: &mut ()) {}

    fn visit_implicit_receiver(&mut self, _ast: &'a ImplicitReceiver, _cx: &mut ()) {}

    fn visit_this_receiver(&mut self, _ast: &'a ThisReceiver, _cx: &mut ()) {
        self.write("this");
    }

    fn visit_chain(&mut self, ast: &'a Chain<'a>, _cx: &mut ()) {
        self.print_list(ast.expressions, "; ");
    }

    fn visit_conditional(&mut self, ast: &'a Conditional<'a>, _cx: &mut ()) {
        self.print(ast.condition);
        self.write(" ? ");
        self.print(ast.true_exp);
        self.write(" : ");
        self.print(ast.false_exp);
    }

    fn visit_property_read(&mut self, ast: &'a PropertyRead<'a>, _cx: &mut ()) {
        if ast.receiver.receiver_kind() != Some(ReceiverKind::Implicit) {
            self.print(ast.receiver);
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
        self.print(ast.exp);
        self.write(" | ");
        self.write(ast.name);
        for arg in ast.args.iter().copied() {
            self.write(":");
            self.print(arg);
        }
    }

    fn visit_literal_primitive(&mut self, ast: &'a LiteralPrimitive<'a>, _cx: &mut ()) {
        match ast.value {
            LiteralValue::Null => self.write("null"),
            LiteralValue::Undefined => self.write("undefined"),
            LiteralValue::Boolean(value) => self.write(if value { "true" } else { "false" }),
            LiteralValue::Number(value) => self.write(&format_number(value)),
            LiteralValue::String(value) => self.write_quoted(value),
        }
    }

    fn visit_literal_array(&mut self, ast: &'a LiteralArray<'a>, _cx: &mut ()) {
        self.write("[");
        self.print_list(ast.expressions, ", ");
        self.write("]");
    }

    fn visit_literal_map(&mut self, ast: &'a LiteralMap<'a>, _cx: &mut ()) {
        self.write("{");
        for (i, (key, value)) in ast.keys.iter().zip(ast.values.iter().copied()).enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if key.quoted {
                self.write_quoted(key.key);
            } else {
                self.write(key.key);
            }
            self.write(": ");
            self.print(value);
        }
        self.write("}");
    }

    fn visit_interpolation(&mut self, ast: &'a Interpolation<'a>, _cx: &mut ()) {
        let count = ast.strings.len().max(ast.expressions.len());
        for i in 0..count {
            if let Some(text) = ast.strings.get(i) {
                self.write(text);
            }
            if let Some(expression) = ast.expressions.get(i).copied() {
                self.print(expression);
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
        self.print_list(ast.args, ", ");
        self.write(")");
    }

    fn visit_safe_call(&mut self, ast: &'a SafeCall<'a>, _cx: &mut ()) {
        self.print(ast.receiver);
        self.write("?.(");
        self.print_list(ast.args, ", ");
        self.write(")");
    }

    fn visit_template_literal(&mut self, ast: &'a TemplateLiteral<'a>, _cx: &mut ()) {
        self.write("`");
        for (i, element) in ast.elements.iter().enumerate() {
            self.write_template_text(element.text);
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

    fn data(start: u32, end: u32) -> NodeData {
        let span = ParseSpan::new(start, end);
        NodeData::new(span, span.to_absolute(0))
    }

    fn read<'a>(arena: &'a ExpressionArena, receiver: AstRef<'a>, name: &'a str) -> AstRef<'a> {
        arena.alloc(Ast::PropertyRead(PropertyRead {
            data: data(0, 0),
            name_span: data(0, 0).source_span,
            receiver,
            name,
        }))
    }

    #[test]
    fn test_this_receiver_is_written() {
        let arena = ExpressionArena::new();
        let this = arena.alloc(Ast::ThisReceiver(ThisReceiver { data: data(0, 4) }));
        let implicit = arena.alloc(Ast::ImplicitReceiver(ImplicitReceiver { data: data(0, 0) }));
        assert_eq!(serialize(read(&arena, this, "a")), "this.a");
        assert_eq!(serialize(read(&arena, implicit, "a")), "a");
    }

    #[test]
    fn test_strings_and_quoted_keys_escape_single_quotes() {
        let arena = ExpressionArena::new();
        let value = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: data(0, 0),
            value: LiteralValue::String("it's"),
        }));
        let keys = arena.alloc_slice([LiteralMapKey {
            key: "a'b",
            quoted: true,
            is_shorthand_initialized: false,
        }]);
        let values = arena.alloc_slice([value as AstRef<'_>]);
        let map = Ast::LiteralMap(LiteralMap { data: data(0, 0), keys, values });
        assert_eq!(serialize(&map), r"{'a\'b': 'it\'s'}");
    }

    #[test]
    fn test_backslashes_are_escaped() {
        let arena = ExpressionArena::new();
        let value = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: data(0, 0),
            value: LiteralValue::String(r"a\b"),
        }));
        let keys = arena.alloc_slice([LiteralMapKey {
            key: r"k\",
            quoted: true,
            is_shorthand_initialized: false,
        }]);
        let values = arena.alloc_slice([value as AstRef<'_>]);
        let map = Ast::LiteralMap(LiteralMap { data: data(0, 0), keys, values });
        assert_eq!(serialize(&map), r"{'k\\': 'a\\b'}");
    }

    #[test]
    fn test_pipe_arguments_follow_colons() {
        let arena = ExpressionArena::new();
        let implicit = arena.alloc(Ast::ImplicitReceiver(ImplicitReceiver { data: data(0, 0) }));
        let value = read(&arena, implicit, "value");
        let arg = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: data(0, 0),
            value: LiteralValue::Number(2.0),
        }));
        let pipe = Ast::BindingPipe(BindingPipe {
            data: data(0, 0),
            exp: value,
            name: "slice",
            args: arena.alloc_slice([arg as AstRef<'_>, arg]),
            pipe_type: BindingPipeType::ReferencedByName,
            name_span: data(0, 0).source_span,
        });
        assert_eq!(serialize(&pipe), "value | slice:2:2");
    }
}
