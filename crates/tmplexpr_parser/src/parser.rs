//! The public parser facade.
//!
//! Every entry point copies its input into the caller's arena, so the
//! returned tree borrows only from the arena. Errors never abort a parse;
//! they are returned alongside the tree.

use rayon::prelude::*;
use tmplexpr_ast::*;
use tmplexpr_core::text::{AbsoluteSourceSpan, ParseSpan, TextPos};
use tmplexpr_core::ExpressionArena;
use tmplexpr_diagnostics::{messages, ErrorAnchor, ParserError};
use tmplexpr_printer::serialize_with_source;
use tmplexpr_scanner::tokenize;
use tracing::debug;

use crate::interpolation::{char_offset, find_interpolation, split_interpolation, strip_comments, SplitInterpolation};
use crate::options::ParserOptions;
use crate::parse_ast::{ParseAst, ParseFlags};

const UNKNOWN_LOCATION: &str = "(unknown)";

/// The outcome of parsing one source of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchParseResult {
    pub source: String,
    /// Canonical text of the parsed tree.
    pub serialized: String,
    pub errors: Vec<ParserError>,
}

/// Parses template expressions.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse an event handler: assignments and `;` chains are allowed, pipes are not.
    pub fn parse_action<'a>(
        &self,
        arena: &'a ExpressionArena,
        input: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> AstWithSource<'a> {
        self.parse_expression(arena, input, location, absolute_offset, ParseFlags::ACTION)
    }

    /// Parse a property binding: pipes are allowed, assignments and chains are not.
    pub fn parse_binding<'a>(
        &self,
        arena: &'a ExpressionArena,
        input: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> AstWithSource<'a> {
        self.parse_expression(arena, input, location, absolute_offset, ParseFlags::empty())
    }

    /// Parse a host binding, which additionally may not use pipes.
    pub fn parse_simple_binding<'a>(
        &self,
        arena: &'a ExpressionArena,
        input: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> AstWithSource<'a> {
        let mut result = self.parse_binding(arena, input, location, absolute_offset);
        let mut checker = SimpleExpressionChecker::default();
        checker.visit(result.ast, &mut ());
        if !checker.errors.is_empty() {
            let found = checker.errors.join(" ");
            let error = ParserError::new(
                &messages::HOST_BINDING_CANNOT_CONTAIN,
                &[&found],
                result.source,
                &result.location,
                ErrorAnchor::Unanchored,
                absolute_offset,
            );
            result.errors.push(error);
        }
        result
    }

    fn parse_expression<'a>(
        &self,
        arena: &'a ExpressionArena,
        input: &str,
        location: &str,
        absolute_offset: TextPos,
        flags: ParseFlags,
    ) -> AstWithSource<'a> {
        let input = arena.alloc_str(input);
        let location = arena.alloc_str(location_label(location));
        let mut errors = Vec::new();
        if let Some(error) = self.check_no_interpolation(input, location, absolute_offset) {
            errors.push(error);
        }

        let (source_to_lex, _) = strip_comments(input);
        let tokens = tokenize(source_to_lex);
        let mut parser = ParseAst::new(arena, input, location, absolute_offset, tokens)
            .with_flags(flags)
            .with_direct_pipe_references(self.options.supports_direct_pipe_references);
        let ast = parser.parse_chain();
        errors.extend(parser.into_errors());

        debug!(
            action = flags.contains(ParseFlags::ACTION),
            len = input.len(),
            errors = errors.len(),
            "parsed expression"
        );
        AstWithSource {
            ast,
            source: input,
            location: location.to_string(),
            absolute_offset,
            errors,
        }
    }

    fn check_no_interpolation(&self, input: &str, location: &str, absolute_offset: TextPos) -> Option<ParserError> {
        let config = &self.options.interpolation;
        let start = find_interpolation(input, config)?;
        Some(ParserError::new(
            &messages::INTERPOLATION_IN_EXPRESSION,
            &[&config.start, &config.end],
            input,
            location,
            ErrorAnchor::Column(char_offset(input, start)),
            absolute_offset,
        ))
    }

    /// Split text on the configured interpolation delimiters.
    pub fn split_interpolation<'s>(&self, input: &'s str) -> SplitInterpolation<'s> {
        split_interpolation(input, &self.options.interpolation)
    }

    /// Parse text with embedded `{{ }}` interpolations. Returns `None` when
    /// the text contains no interpolation.
    pub fn parse_interpolation<'a>(
        &self,
        arena: &'a ExpressionArena,
        input: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> Option<AstWithSource<'a>> {
        let input = arena.alloc_str(input);
        let location = arena.alloc_str(location_label(location));
        let split = self.split_interpolation(input);
        if split.expressions.is_empty() {
            return None;
        }

        let mut errors = Vec::new();
        let mut expressions = Vec::with_capacity(split.expressions.len());
        for (piece, &offset) in split.expressions.iter().zip(&split.offsets) {
            if piece.text.trim().is_empty() {
                errors.push(ParserError::new(
                    &messages::BLANK_INTERPOLATION,
                    &[],
                    input,
                    location,
                    ErrorAnchor::Column(piece.start),
                    absolute_offset,
                ));
            }

            let (source_to_lex, has_comment) = strip_comments(piece.text);
            if has_comment && source_to_lex.trim().is_empty() {
                errors.push(ParserError::new(
                    &messages::INTERPOLATION_ONLY_COMMENT,
                    &[],
                    input,
                    location,
                    ErrorAnchor::Column(piece.start),
                    absolute_offset,
                ));
                let span = ParseSpan::new(offset, offset);
                expressions.push(arena.alloc(Ast::EmptyExpr(EmptyExpr {
                    data: NodeData::new(span, span.to_absolute(absolute_offset)),
                })) as AstRef<'a>);
                continue;
            }

            let len = source_to_lex.chars().count() as TextPos;
            let mut parser = ParseAst::new(arena, input, location, absolute_offset, tokenize(source_to_lex))
                .with_offset(offset, len)
                .with_direct_pipe_references(self.options.supports_direct_pipe_references);
            expressions.push(parser.parse_chain());
            errors.extend(parser.into_errors());
        }

        let strings: Vec<&'a str> = split.strings.iter().map(|piece| piece.text).collect();
        debug!(
            expressions = expressions.len(),
            errors = errors.len(),
            "parsed interpolation"
        );
        Some(interpolation_result(arena, input, location, absolute_offset, strings, expressions, errors))
    }

    /// Parse a single expression that is known to be interpolated, such as
    /// the text of an `@if` condition, wrapping it as an interpolation with
    /// empty literal text on both sides.
    pub fn parse_interpolation_expression<'a>(
        &self,
        arena: &'a ExpressionArena,
        expression: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> AstWithSource<'a> {
        let input = arena.alloc_str(expression);
        let location = arena.alloc_str(location_label(location));
        let (source_to_lex, _) = strip_comments(input);
        let mut parser = ParseAst::new(arena, input, location, absolute_offset, tokenize(source_to_lex))
            .with_direct_pipe_references(self.options.supports_direct_pipe_references);
        let ast = parser.parse_chain();
        let errors = parser.into_errors();
        interpolation_result(arena, input, location, absolute_offset, vec!["", ""], vec![ast], errors)
    }

    /// Parse the microsyntax of a structural directive, e.g. the value of
    /// `*ngFor="let item of items; index as i"` under the key `ngFor`.
    pub fn parse_template_bindings<'a>(
        &self,
        arena: &'a ExpressionArena,
        template_key: &str,
        template_value: &str,
        location: &str,
        absolute_key_offset: TextPos,
        absolute_value_offset: TextPos,
    ) -> TemplateBindingParseResult<'a> {
        let value = arena.alloc_str(template_value);
        let location = arena.alloc_str(location_label(location));
        let key_len = template_key.chars().count() as TextPos;
        let key = TemplateBindingIdentifier {
            source: arena.alloc_str(template_key),
            span: AbsoluteSourceSpan::new(absolute_key_offset, absolute_key_offset + key_len),
        };

        let mut parser = ParseAst::new(arena, value, location, absolute_value_offset, tokenize(value))
            .with_direct_pipe_references(self.options.supports_direct_pipe_references);
        let template_bindings = parser.parse_template_bindings(key);
        let errors = parser.into_errors();
        debug!(
            key = template_key,
            bindings = template_bindings.len(),
            errors = errors.len(),
            "parsed template bindings"
        );
        TemplateBindingParseResult { template_bindings, errors }
    }

    /// Wrap plain attribute text as a string literal.
    pub fn wrap_literal_primitive<'a>(
        &self,
        arena: &'a ExpressionArena,
        value: &str,
        location: &str,
        absolute_offset: TextPos,
    ) -> AstWithSource<'a> {
        let source = arena.alloc_str(value);
        let span = ParseSpan::new(0, source.chars().count() as TextPos);
        let ast = arena.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: NodeData::new(span, span.to_absolute(absolute_offset)),
            value: LiteralValue::String(source),
        }));
        AstWithSource {
            ast,
            source,
            location: location_label(location).to_string(),
            absolute_offset,
            errors: Vec::new(),
        }
    }

    /// Parse many bindings in parallel. Results keep the order of `sources`.
    pub fn parse_bindings_batch<S>(&self, sources: &[S], location: &str) -> Vec<BatchParseResult>
    where
        S: AsRef<str> + Sync,
    {
        let results: Vec<BatchParseResult> = sources
            .par_iter()
            .map(|source| {
                let arena = ExpressionArena::new();
                let source = source.as_ref();
                let result = self.parse_binding(&arena, source, location, 0);
                BatchParseResult {
                    source: source.to_string(),
                    serialized: serialize_with_source(&result),
                    errors: result.errors,
                }
            })
            .collect();
        debug!(sources = results.len(), "parsed binding batch");
        results
    }
}

fn location_label(location: &str) -> &str {
    if location.is_empty() {
        UNKNOWN_LOCATION
    } else {
        location
    }
}

fn interpolation_result<'a>(
    arena: &'a ExpressionArena,
    input: &'a str,
    location: &str,
    absolute_offset: TextPos,
    strings: Vec<&'a str>,
    expressions: Vec<AstRef<'a>>,
    errors: Vec<ParserError>,
) -> AstWithSource<'a> {
    let span = ParseSpan::new(0, input.chars().count() as TextPos);
    let ast = arena.alloc(Ast::Interpolation(Interpolation {
        data: NodeData::new(span, span.to_absolute(absolute_offset)),
        strings: arena.alloc_slice(strings),
        expressions: arena.alloc_slice(expressions),
    }));
    AstWithSource {
        ast,
        source: input,
        location: location.to_string(),
        absolute_offset,
        errors,
    }
}

/// Finds constructs a host binding may not contain.
#[derive(Default)]
struct SimpleExpressionChecker {
    errors: Vec<&'static str>,
}

impl<'a> RecursiveAstVisitor<'a> for SimpleExpressionChecker {
    type Context = ();

    fn visit_pipe(&mut self, _ast: &'a BindingPipe<'a>, _cx: &mut ()) {
        self.errors.push("pipes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmplexpr_printer::unparse;

    #[test]
    fn test_empty_location_is_labelled() {
        let arena = ExpressionArena::new();
        let result = Parser::default().parse_binding(&arena, "a", "", 0);
        assert_eq!(result.location, "(unknown)");
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let arena = ExpressionArena::new();
        let result = Parser::default().parse_binding(&arena, "a // comment", "", 0);
        assert!(result.errors.is_empty());
        assert_eq!(unparse(result.ast), "a");
        assert_eq!(result.source, "a // comment");
    }

    #[test]
    fn test_interpolation_in_binding_is_reported() {
        let arena = ExpressionArena::new();
        let result = Parser::default().parse_binding(&arena, "{{a()}}", "", 0);
        assert_eq!(
            result.errors[0].message,
            "Got interpolation ({{}}) where expression was expected"
        );
        assert_eq!(result.errors[0].column(), Some(1));
    }

    #[test]
    fn test_simple_binding_rejects_pipes() {
        let arena = ExpressionArena::new();
        let result = Parser::default().parse_simple_binding(&arena, "a | b | c", "", 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Host binding expression cannot contain pipes"
        );
    }

    #[test]
    fn test_parse_interpolation_without_expressions() {
        let arena = ExpressionArena::new();
        assert!(Parser::default().parse_interpolation(&arena, "plain", "", 0).is_none());
    }

    #[test]
    fn test_wrap_literal_primitive() {
        let arena = ExpressionArena::new();
        let result = Parser::default().wrap_literal_primitive(&arena, "text", "", 7);
        assert_eq!(result.ast.source_span(), AbsoluteSourceSpan::new(7, 11));
        assert_eq!(unparse(result.ast), "\"text\"");
    }
}
