//! Property tests over generated well-formed expressions.

use proptest::prelude::*;
use tmplexpr_ast::*;
use tmplexpr_core::text::TextPos;
use tmplexpr_scanner::{tokenize, TokenKind};
use tmplexpr_tests::{parse, Mode};

fn identifier() -> impl Strategy<Value = String> {
    "x_[a-z]{0,3}"
}

/// Single-quoted string source built from escapes and plain text.
fn string_literal() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["a", "b", " ", r"\\", r"\'", r"\n", r"\u0041", "\"", "$", "`"]),
        0..6,
    )
    .prop_map(|pieces| format!("'{}'", pieces.concat()))
}

/// Template text without a live `${`.
fn template_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["a", " ", r"\`", r"\${", r"\\", "$", "}", "'"]),
        0..5,
    )
    .prop_map(|pieces| pieces.concat())
}

fn regex_literal() -> impl Strategy<Value = String> {
    ("[a-z]{1,3}", "[gimsuy]?").prop_map(|(body, flags)| format!("/{}/{}", body, flags))
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        identifier(),
        (0u32..10_000).prop_map(|n| n.to_string()),
        string_literal(),
        Just("null".to_string()),
        Just("true".to_string()),
        identifier().prop_map(|name| format!("this.{}", name)),
        template_text().prop_map(|text| format!("`{}`", text)),
        regex_literal(),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "&&", "||", "??", "==", "<"]),
                inner.clone()
            )
                .prop_map(|(left, op, right)| format!("{}  {} {}", left, op, right)),
            (prop::sample::select(vec!["!", "-", "typeof "]), inner.clone())
                .prop_map(|(op, operand)| format!("{}({})", op, operand)),
            (inner.clone(), identifier()).prop_map(|(receiver, name)| format!("({}).{}", receiver, name)),
            (inner.clone(), identifier()).prop_map(|(receiver, name)| format!("({})?.{}", receiver, name)),
            (inner.clone(), inner.clone()).prop_map(|(receiver, key)| format!("({})[ {} ]", receiver, key)),
            (identifier(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(callee, args)| format!("{}({})", callee, args.join(","))),
            (identifier(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(callee, args)| format!("{}?.({})", callee, args.join(","))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, f)| format!("({})?({}):({})", c, t, f)),
            prop::collection::vec(inner.clone(), 0..3).prop_map(|items| format!("[{}]", items.join(" , "))),
            (identifier(), inner.clone()).prop_map(|(key, value)| format!("{{{}:{}}}", key, value)),
            (inner.clone(), identifier(), prop::collection::vec(inner.clone(), 0..3)).prop_map(
                |(exp, name, args)| {
                    let args: String = args.iter().map(|arg| format!(":({})", arg)).collect();
                    format!("({} |{}{})", exp, name, args)
                }
            ),
            (template_text(), inner.clone(), template_text())
                .prop_map(|(head, exp, tail)| format!("`{}${{({})}}{}`", head, exp, tail)),
        ]
    })
}

/// Collects the span of every node along with its parent's span.
struct SpanCollector {
    spans: Vec<(TextPos, TextPos)>,
    parents: Vec<(TextPos, TextPos)>,
    nested: Vec<((TextPos, TextPos), (TextPos, TextPos))>,
}

impl SpanCollector {
    fn new() -> Self {
        Self {
            spans: Vec::new(),
            parents: Vec::new(),
            nested: Vec::new(),
        }
    }
}

impl<'a> RecursiveAstVisitor<'a> for SpanCollector {
    type Context = ();

    fn visit(&mut self, ast: &'a Ast<'a>, cx: &mut ()) {
        let span = ast.span();
        let span = (span.start, span.end);
        self.spans.push(span);
        if let Some(parent) = self.parents.last().copied() {
            self.nested.push((parent, span));
        }
        self.parents.push(span);
        walk_ast(self, ast, cx);
        self.parents.pop();
    }
}

proptest! {
    #[test]
    fn serialization_is_idempotent(source in expression()) {
        let first = parse(Mode::Binding, &source);
        prop_assert!(first.errors.is_empty(), "{}: {:?}", source, first.messages());
        let second = parse(Mode::Binding, &first.serialized);
        prop_assert!(second.errors.is_empty(), "{}: {:?}", first.serialized, second.messages());
        prop_assert_eq!(&second.serialized, &first.serialized);
    }

    #[test]
    fn tokens_reconstruct_their_text(source in expression()) {
        let chars: Vec<char> = source.chars().collect();
        let tokens = tokenize(&source);
        let mut previous_end = 0;
        for token in &tokens {
            prop_assert!(token.start <= token.end);
            prop_assert!(previous_end <= token.start);
            previous_end = token.end;
            if matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword | TokenKind::Operator) {
                let text: String = chars[token.start as usize..token.end as usize].iter().collect();
                prop_assert_eq!(&text, &token.str_value);
            }
        }
    }

    #[test]
    fn spans_stay_within_input(source in expression()) {
        let arena = tmplexpr_core::ExpressionArena::new();
        let result = tmplexpr_parser::Parser::default().parse_binding(&arena, &source, "prop", 0);
        let len = source.chars().count() as TextPos;
        let mut collector = SpanCollector::new();
        collector.visit(result.ast, &mut ());
        for (start, end) in collector.spans {
            prop_assert!(start <= end && end <= len, "span {}..{} in {:?}", start, end, source);
        }
        for (parent, child) in collector.nested {
            prop_assert!(
                parent.0 <= child.0 && child.1 <= parent.1,
                "child {:?} outside parent {:?} in {:?}",
                child,
                parent,
                source
            );
        }
    }
}
