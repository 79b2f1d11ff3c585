//! Traversal of parsed trees with both visitor traits.

use pretty_assertions::assert_eq;
use tmplexpr_ast::*;
use tmplexpr_core::ExpressionArena;
use tmplexpr_parser::Parser;
use tmplexpr_tests::{init_tracing, render_report};

/// Collects every property name read, in source order.
#[derive(Default)]
struct PropertyNames {
    names: Vec<String>,
}

impl<'a> RecursiveAstVisitor<'a> for PropertyNames {
    type Context = ();

    fn visit_property_read(&mut self, ast: &'a PropertyRead<'a>, cx: &mut ()) {
        self.visit(ast.receiver, cx);
        self.names.push(ast.name.to_string());
    }

    fn visit_safe_property_read(&mut self, ast: &'a SafePropertyRead<'a>, cx: &mut ()) {
        self.visit(ast.receiver, cx);
        self.names.push(format!("?{}", ast.name));
    }
}

/// Counts nodes, threading the count through the context.
struct NodeCounter;

impl<'a> RecursiveAstVisitor<'a> for NodeCounter {
    type Context = usize;

    fn visit(&mut self, ast: &'a Ast<'a>, count: &mut usize) {
        *count += 1;
        walk_ast(self, ast, count);
    }
}

#[test]
fn test_recursive_visitor_reaches_every_read() {
    init_tracing();
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(
        &arena,
        "a.b(c)?.d + (e | f:g)[h] ? `${i}` : {j: k}",
        "test",
        0,
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let mut names = PropertyNames::default();
    names.visit(result.ast, &mut ());
    assert_eq!(names.names, vec!["a", "b", "c", "?d", "e", "g", "h", "i", "k"]);
}

#[test]
fn test_context_is_threaded_through_traversal() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, "a + b.c", "test", 0);
    let mut count = 0;
    NodeCounter.visit(result.ast, &mut count);
    // Binary, a, its receiver, b.c, b, its receiver.
    assert_eq!(count, 6);
}

#[test]
fn test_interpolation_children_are_visited() {
    let arena = ExpressionArena::new();
    let result = Parser::default()
        .parse_interpolation(&arena, "{{ a }} and {{ b.c }}", "test", 0)
        .unwrap();
    let mut names = PropertyNames::default();
    names.visit(result.ast, &mut ());
    assert_eq!(names.names, vec!["a", "b", "c"]);
}

#[test]
fn test_report_points_at_error() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, "a +", "test", 0);
    let report = render_report(&result.errors[0]);
    assert!(report.contains("tmplexpr::E2003"), "{}", report);
    assert!(report.contains("Unexpected end of expression"), "{}", report);
}
