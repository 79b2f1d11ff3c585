//! Parser integration tests.
//!
//! Verifies the trees, spans and diagnostics the parser produces for both
//! grammars, interpolations and template bindings.

use pretty_assertions::assert_eq;
use tmplexpr_ast::*;
use tmplexpr_core::text::{AbsoluteSourceSpan, ParseSpan};
use tmplexpr_core::ExpressionArena;
use tmplexpr_parser::{Parser, ParserOptions};
use tmplexpr_printer::{serialize, unparse};

/// Helper: parse an action and return its debug form and error messages.
fn action(source: &str) -> (String, Vec<String>) {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_action(&arena, source, "test", 0);
    (unparse(result.ast), result.errors.iter().map(|e| e.to_string()).collect())
}

/// Helper: parse a binding and return its debug form and error messages.
fn binding(source: &str) -> (String, Vec<String>) {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, source, "test", 0);
    (unparse(result.ast), result.errors.iter().map(|e| e.to_string()).collect())
}

/// Helper: assert an action parses cleanly back to itself.
fn check_action(source: &str) {
    let (unparsed, errors) = action(source);
    assert!(errors.is_empty(), "source: {}, errors: {:?}", source, errors);
    assert_eq!(unparsed, source);
}

/// Helper: assert a binding parses cleanly back to itself.
fn check_binding(source: &str) {
    let (unparsed, errors) = binding(source);
    assert!(errors.is_empty(), "source: {}, errors: {:?}", source, errors);
    assert_eq!(unparsed, source);
}

fn assert_has_error(errors: &[String], expected: &str) {
    assert!(
        errors.iter().any(|e| e.contains(expected)),
        "expected an error containing {:?}, got {:?}",
        expected,
        errors
    );
}

fn serialized_binding(source: &str) -> String {
    let arena = ExpressionArena::new();
    serialize(Parser::default().parse_binding(&arena, source, "test", 0).ast)
}

fn serialized_action(source: &str) -> String {
    let arena = ExpressionArena::new();
    serialize(Parser::default().parse_action(&arena, source, "test", 0).ast)
}

// ============================================================================
// Well-Formed Expressions
// ============================================================================

#[test]
fn test_parse_literals() {
    check_binding("1");
    check_binding("\"a\"");
    check_binding("null");
    check_binding("undefined");
    check_binding("true");
    check_binding("[1, 2]");
    check_binding("{a: 1, \"b\": 2}");
}

#[test]
fn test_parse_operators() {
    check_binding("a + b * c");
    check_binding("a ?? b || c");
    check_binding("-a");
    check_binding("!a");
    check_binding("typeof a === \"string\"");
    check_binding("void 0");
    check_binding("a in b");
    check_binding("a!");
    check_binding("a ? b : c");
}

#[test]
fn test_parse_member_access_and_calls() {
    check_binding("a.b.c");
    check_binding("a?.b");
    check_binding("a[0]");
    check_binding("a?.[0]");
    check_binding("f(1, 2)");
    check_binding("f?.(x)");
    check_binding("a.b(c).d");
}

#[test]
fn test_parse_actions() {
    check_action("a = 1");
    check_action("a.b = 1");
    check_action("a[0] += 1");
    check_action("a(); b();");
    let (unparsed, errors) = action("a = 1;");
    assert!(errors.is_empty());
    assert_eq!(unparsed, "a = 1");
}

#[test]
fn test_parse_template_literals() {
    check_binding("`hello`");
    check_binding("`hello ${name}!`");
    check_binding("tag`a${b}c`");
    let (unparsed, errors) = binding("`hello ${name | capitalize}!!!`");
    assert!(errors.is_empty());
    assert_eq!(unparsed, "`hello ${(name | capitalize)}!!!`");
}

#[test]
fn test_this_receiver_is_elided_in_debug_form() {
    let (unparsed, errors) = binding("this.a");
    assert!(errors.is_empty());
    assert_eq!(unparsed, "a");
}

#[test]
fn test_map_shorthand() {
    let (unparsed, errors) = binding("{a, b}");
    assert!(errors.is_empty());
    assert_eq!(unparsed, "{a: a, b: b}");
}

#[test]
fn test_regular_expressions() {
    check_binding("/abc/");
    check_binding("/abc/gi");
    let (_, errors) = binding("/abc/O");
    assert_has_error(&errors, "Unsupported regular expression flag \"O\"");
    let (_, errors) = binding("/abc/gig");
    assert_has_error(&errors, "Duplicate regular expression flag \"g\"");
}

// ============================================================================
// Error Recovery
// ============================================================================

#[test]
fn test_missing_member_name() {
    let (unparsed, errors) = action("a. = 1");
    assert_eq!(unparsed, "a. = 1");
    assert_has_error(&errors, "Expected identifier for property access at column 2");

    let (unparsed, errors) = binding("x.");
    assert_eq!(unparsed, "x.");
    assert_has_error(&errors, "Unexpected end of input, expected identifier or keyword");
}

#[test]
fn test_recovery_stops_at_assignment_in_keyed_write() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_action(&arena, "a[1 + = 1", "test", 0);
    assert_eq!(unparse(result.ast), "a[1 + ] = 1");
    let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Unexpected token =", "Missing expected ]"]);
}

#[test]
fn test_stray_assignment_after_expression() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_action(&arena, "(a[1] = b) = c = d", "test", 0);
    assert_eq!(serialize(result.ast), "(a[1] = b)");
    assert_eq!(result.errors.len(), 1);

    let result = Parser::default().parse_action(&arena, "a[1] = 1 = 2", "test", 0);
    assert_eq!(serialize(result.ast), "a[1] = 1");
    assert_eq!(result.errors.len(), 1);

    let result = Parser::default().parse_action(&arena, "a.a = 1 = 2", "test", 0);
    assert_eq!(serialize(result.ast), "a.a = 1");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().contains("Unexpected token '='"));
}

#[test]
fn test_missing_closing_bracket_is_inserted() {
    let (_, errors) = binding("a[1 + 2");
    assert_eq!(serialized_binding("a[1 + 2"), "a[1 + 2]");
    assert_has_error(&errors, "Missing expected ]");
}

#[test]
fn test_conditional_requires_all_parts() {
    let (_, errors) = binding("true?1");
    assert_has_error(&errors, "Conditional expression true?1 requires all 3 expressions");
}

#[test]
fn test_incomplete_pipes() {
    let cases = [
        ("a | b | ", "((a | b) | )"),
        ("a | | b", "((a | ) | b)"),
        (" | a | b", "(( | a) | b)"),
        ("a | b | c: ", "((a | b) | c:)"),
        ("a | b: | c", "((a | b:) | c)"),
        ("a | b: (a | ) + | c", "((a | b:((a | )) + ) | c)"),
    ];
    for (source, expected) in cases {
        let (unparsed, errors) = binding(source);
        assert_eq!(unparsed, expected, "source: {}", source);
        assert!(!errors.is_empty(), "source: {}", source);
    }
    let (_, errors) = binding("a | b | ");
    assert_has_error(&errors, "Unexpected end of input, expected identifier or keyword");
}

#[test]
fn test_pipe_in_action_is_reported() {
    let (_, errors) = action("a | b");
    assert_has_error(&errors, "Cannot have a pipe in an action expression");
}

#[test]
fn test_map_errors() {
    let (_, errors) = binding("{\"a-b\"}");
    assert_has_error(&errors, "Missing expected : at column 7");
    let (_, errors) = binding("{a.b}");
    assert_has_error(&errors, "Missing expected } at column 3");
    let (_, errors) = binding("{1234}");
    assert_has_error(&errors, " expected identifier, keyword, or string at column 2");
}

#[test]
fn test_private_identifier_is_rejected() {
    let (_, errors) = binding("#privateField");
    assert_has_error(
        &errors,
        "Private identifiers are not supported. Unexpected private identifier: #privateField at column 1",
    );
}

#[test]
fn test_safe_access_cannot_be_assigned() {
    let (_, errors) = action("a?.b = 1");
    assert_has_error(&errors, "The '?.' operator cannot be used in the assignment");
    let (_, errors) = action("a?.[0] = 1");
    assert_has_error(&errors, "The '?.' operator cannot be used in the assignment");
}

#[test]
fn test_empty_key_and_template_interpolation() {
    let (_, errors) = binding("a[]");
    assert_has_error(&errors, "Key access cannot be empty");
    let (_, errors) = binding("`a${}`");
    assert_has_error(&errors, "Template literal interpolation cannot be empty");
}

#[test]
fn test_unterminated_string_reports_lexer_error() {
    let (_, errors) = binding("\"a");
    assert_has_error(&errors, "Unterminated quote");
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn test_pipe_with_missing_name_spans() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, "foo | ", "test", 0);
    let Ast::BindingPipe(pipe) = result.ast else {
        panic!("expected a pipe, got {}", result.ast.kind_name());
    };
    assert_eq!(pipe.data.source_span, AbsoluteSourceSpan::new(0, 6));
    assert_eq!(pipe.name_span, AbsoluteSourceSpan::new(6, 6));
}

#[test]
fn test_empty_argument_span() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, "fn(1, )", "test", 0);
    let Ast::Call(call) = result.ast else {
        panic!("expected a call, got {}", result.ast.kind_name());
    };
    assert_eq!(call.args.len(), 2);
    assert!(call.args[1].is_empty_expr());
    assert_eq!(call.args[1].source_span(), AbsoluteSourceSpan::new(5, 6));
}

#[test]
fn test_absolute_offset_shifts_source_spans() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_binding(&arena, "a + b", "test", 10);
    assert_eq!(result.ast.span(), ParseSpan::new(0, 5));
    assert_eq!(result.ast.source_span(), AbsoluteSourceSpan::new(10, 15));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_serialize_bindings() {
    let cases = [
        ("+1234", "+1234"),
        ("1 * 2 ** 3", "1 * 2 ** 3"),
        ("foo(bar, )", "foo(bar, )"),
        ("foo?.(bar, )", "foo?.(bar, )"),
        (r"'Hello, \'World\'...'", r"'Hello, \'World\'...'"),
        ("void 0", "void 0"),
        ("foo in bar", "foo in bar"),
        ("!foo", "!foo"),
        ("foo!", "foo!"),
        ("foo?.[bar]", "foo?.[bar]"),
        ("{foo: bar, baz: test}", "{foo: bar, baz: test}"),
        ("this.a", "this.a"),
        ("a   |   b:1", "a | b:1"),
        ("1e999", "1e999"),
    ];
    for (source, expected) in cases {
        assert_eq!(serialized_binding(source), expected, "source: {}", source);
    }
}

#[test]
fn test_serialize_action_chain() {
    assert_eq!(serialized_action("1234; 4321"), "1234; 4321");
    assert_eq!(serialized_action("foo[bar] = baz"), "foo[bar] = baz");
}

#[test]
fn test_serialized_escapes_parse_back_unchanged() {
    let cases = [
        (r"'a\\b'", r"'a\\b'"),
        (r#""it's \\ ok""#, r"'it\'s \\ ok'"),
        (r"{'k\\': 1}", r"{'k\\': 1}"),
        (r"`a\`b`", r"`a\`b`"),
        (r"`\${x}`", r"`\${x}`"),
        (r"`a\\${x}\\`", r"`a\\${x}\\`"),
        (r"`$${x}$`", r"`$${x}$`"),
    ];
    for (source, expected) in cases {
        let first = serialized_binding(source);
        assert_eq!(first, expected, "source: {}", source);
        let (_, errors) = binding(&first);
        assert!(errors.is_empty(), "source: {}, errors: {:?}", first, errors);
        assert_eq!(serialized_binding(&first), first);
    }
}

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn test_parse_interpolation() {
    let arena = ExpressionArena::new();
    let result = Parser::default()
        .parse_interpolation(&arena, "Hello {{ name }}!", "test", 0)
        .unwrap();
    assert!(result.errors.is_empty());
    assert_eq!(unparse(result.ast), "Hello {{ name }}!");
    assert_eq!(serialize(result.ast), "Hello name!");
    let Ast::Interpolation(interpolation) = result.ast else {
        panic!("expected an interpolation");
    };
    assert_eq!(interpolation.expressions[0].span(), ParseSpan::new(9, 13));
    assert_eq!(interpolation.data.span, ParseSpan::new(0, 17));
}

#[test]
fn test_interpolation_errors() {
    let arena = ExpressionArena::new();
    let parser = Parser::default();
    let result = parser.parse_interpolation(&arena, "{{ }}", "test", 0).unwrap();
    assert_eq!(
        result.errors[0].message,
        "Blank expressions are not allowed in interpolated strings"
    );
    let result = parser.parse_interpolation(&arena, "{{ // c }}", "test", 0).unwrap();
    assert_eq!(
        result.errors[0].message,
        "Interpolation expression cannot only contain a comment"
    );
    let result = parser.parse_interpolation(&arena, "{{ a // comment }}", "test", 0).unwrap();
    assert!(result.errors.is_empty());
}

#[test]
fn test_parse_interpolation_expression() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_interpolation_expression(&arena, "a.b", "test", 0);
    let Ast::Interpolation(interpolation) = result.ast else {
        panic!("expected an interpolation");
    };
    assert_eq!(interpolation.strings, &["", ""]);
    assert_eq!(serialize(result.ast), "a.b");
}

// ============================================================================
// Template Bindings
// ============================================================================

#[test]
fn test_ng_for_microsyntax() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_template_bindings(
        &arena,
        "ngFor",
        "let item of items; index as i",
        "test",
        0,
        0,
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let keys: Vec<&str> = result.template_bindings.iter().map(|b| b.key().source).collect();
    assert_eq!(keys, vec!["ngFor", "item", "ngForOf", "i"]);

    let TemplateBinding::Expression(of) = &result.template_bindings[2] else {
        panic!("expected an expression binding");
    };
    let value = of.value.as_ref().unwrap();
    assert_eq!(value.source, "items");
    assert_eq!(value.absolute_offset, 12);

    let TemplateBinding::Variable(index) = &result.template_bindings[3] else {
        panic!("expected a variable binding");
    };
    assert_eq!(index.value.map(|v| v.source), Some("index"));
}

#[test]
fn test_let_with_value_and_dashed_key() {
    let arena = ExpressionArena::new();
    let result = Parser::default().parse_template_bindings(&arena, "dir", "let a = b; x-y: c", "test", 0, 0);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let keys: Vec<&str> = result.template_bindings.iter().map(|b| b.key().source).collect();
    assert_eq!(keys, vec!["dir", "a", "dirX-y"]);
}

// ============================================================================
// Options and Batches
// ============================================================================

#[test]
fn test_direct_pipe_references() {
    let arena = ExpressionArena::new();
    let parser = Parser::new(ParserOptions {
        supports_direct_pipe_references: true,
        ..ParserOptions::default()
    });
    let result = parser.parse_binding(&arena, "a | MyPipe", "test", 0);
    let Ast::BindingPipe(pipe) = result.ast else {
        panic!("expected a pipe");
    };
    assert_eq!(pipe.pipe_type, BindingPipeType::ReferencedDirectly);

    let result = parser.parse_binding(&arena, "a | myPipe", "test", 0);
    let Ast::BindingPipe(pipe) = result.ast else {
        panic!("expected a pipe");
    };
    assert_eq!(pipe.pipe_type, BindingPipeType::ReferencedByName);

    let result = Parser::default().parse_binding(&arena, "0 | Foo", "test", 0);
    let Ast::BindingPipe(pipe) = result.ast else {
        panic!("expected a pipe");
    };
    assert_eq!(pipe.pipe_type, BindingPipeType::ReferencedByName);
}

#[test]
fn test_batch_keeps_order() {
    let sources = ["a + b", "x |", "f(1)"];
    let results = Parser::default().parse_bindings_batch(&sources, "batch");
    let serialized: Vec<&str> = results.iter().map(|r| r.serialized.as_str()).collect();
    assert_eq!(serialized, vec!["a + b", "x | ", "f(1)"]);
    assert!(results[0].errors.is_empty());
    assert_eq!(results[1].errors.len(), 1);
}
