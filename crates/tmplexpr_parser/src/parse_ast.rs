//! The recursive-descent core shared by every parser entry point.
//!
//! A [`ParseAst`] walks the token list of one expression and builds
//! arena-allocated nodes. Grammar violations never abort the parse: each one
//! records a [`ParserError`] and a placeholder node takes the place of the
//! broken production. When the surrounding production cannot continue, the
//! parser skips ahead to the next token that can resume it.

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use tmplexpr_ast::*;
use tmplexpr_core::text::{AbsoluteSourceSpan, ParseSpan, TextPos};
use tmplexpr_core::ExpressionArena;
use tmplexpr_diagnostics::{messages, DiagnosticMessage, ErrorAnchor, ParserError};
use tmplexpr_scanner::Token;
use tracing::trace;

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};

/// Maximum nesting of sub-expressions before the parser gives up on a branch.
const MAX_RECURSION_DEPTH: u32 = 200;

const SUPPORTED_REGEX_FLAGS: &[char] = &['d', 'g', 'i', 'm', 's', 'u', 'v', 'y'];

static EOF_TOKEN: Token = Token::eof();

bitflags! {
    /// Grammar selection for one parse.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u8 {
        /// Event handler grammar: assignments and `;` chains, no pipes.
        const ACTION = 1 << 0;
    }
}

bitflags! {
    /// Properties of the position currently being parsed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseContextFlags: u8 {
        /// The value here may be written, so an assignment operator ends recovery.
        const WRITABLE = 1 << 0;
    }
}

pub(crate) struct ParseAst<'a> {
    arena: &'a ExpressionArena,
    /// Original expression text, used for error messages and source slices.
    input: &'a str,
    /// Length of the scanned text, which may be a slice of `input`.
    input_len: TextPos,
    location: &'a str,
    absolute_offset: TextPos,
    tokens: Vec<Token>,
    flags: ParseFlags,
    /// Added to token positions to get spans relative to `input`.
    offset: TextPos,
    supports_direct_pipe_references: bool,

    index: usize,
    rparens_expected: u32,
    rbrackets_expected: u32,
    rbraces_expected: u32,
    context: ParseContextFlags,
    recursion_depth: u32,
    errors: Vec<ParserError>,
}

impl<'a> ParseAst<'a> {
    pub fn new(
        arena: &'a ExpressionArena,
        input: &'a str,
        location: &'a str,
        absolute_offset: TextPos,
        tokens: Vec<Token>,
    ) -> Self {
        Self {
            arena,
            input,
            input_len: input.chars().count() as TextPos,
            location,
            absolute_offset,
            tokens,
            flags: ParseFlags::empty(),
            offset: 0,
            supports_direct_pipe_references: false,
            index: 0,
            rparens_expected: 0,
            rbrackets_expected: 0,
            rbraces_expected: 0,
            context: ParseContextFlags::empty(),
            recursion_depth: 0,
            errors: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Tokens were scanned from the `len` characters of the input starting at `offset`.
    pub fn with_offset(mut self, offset: TextPos, len: TextPos) -> Self {
        self.offset = offset;
        self.input_len = len;
        self
    }

    pub fn with_direct_pipe_references(mut self, enabled: bool) -> Self {
        self.supports_direct_pipe_references = enabled;
        self
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    // ========================================================================
    // Token Access
    // ========================================================================

    #[inline]
    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.index + offset).unwrap_or(&EOF_TOKEN)
    }

    #[inline]
    fn next(&self) -> &Token {
        self.peek(0)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    #[inline]
    fn advance(&mut self) {
        self.index += 1;
    }

    /// Position of the next token, or the end of the last one at the end.
    fn input_index(&self) -> TextPos {
        if self.at_eof() {
            self.current_end_index()
        } else {
            self.next().start + self.offset
        }
    }

    /// End of the last consumed token.
    fn current_end_index(&self) -> TextPos {
        if self.index > 0 {
            return self.tokens[self.index - 1].end + self.offset;
        }
        match self.tokens.first() {
            Some(first) => first.start + self.offset,
            None => self.input_len + self.offset,
        }
    }

    fn current_absolute_offset(&self) -> TextPos {
        self.absolute_offset + self.input_index()
    }

    fn span_to(&self, start: TextPos, artificial_end: Option<TextPos>) -> ParseSpan {
        let mut end = self.current_end_index();
        if let Some(artificial_end) = artificial_end {
            end = end.max(artificial_end);
        }
        // An expression that consumed no tokens ends before it starts.
        if start > end {
            ParseSpan::new(end, start)
        } else {
            ParseSpan::new(start, end)
        }
    }

    #[inline]
    fn span(&self, start: TextPos) -> ParseSpan {
        self.span_to(start, None)
    }

    #[inline]
    fn data(&self, start: TextPos) -> NodeData {
        self.node_data(self.span(start))
    }

    #[inline]
    fn node_data(&self, span: ParseSpan) -> NodeData {
        NodeData::new(span, span.to_absolute(self.absolute_offset))
    }

    /// Characters `start..end` of the original input.
    fn slice_input(&self, start: TextPos, end: TextPos) -> String {
        self.input
            .chars()
            .skip(start as usize)
            .take(end.saturating_sub(start) as usize)
            .collect()
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    #[inline]
    fn alloc(&self, ast: Ast<'a>) -> AstRef<'a> {
        self.arena.alloc(ast)
    }

    #[inline]
    fn alloc_list(&self, list: Vec<AstRef<'a>>) -> NodeList<'a, AstRef<'a>> {
        self.arena.alloc_slice(list)
    }

    fn empty_expr(&self, start: TextPos) -> AstRef<'a> {
        self.alloc(Ast::EmptyExpr(EmptyExpr {
            data: self.data(start),
        }))
    }

    fn implicit_receiver(&self, at: TextPos) -> AstRef<'a> {
        self.alloc(Ast::ImplicitReceiver(ImplicitReceiver {
            data: self.node_data(ParseSpan::empty(at)),
        }))
    }

    fn next_text(&self) -> &'a str {
        self.arena.alloc_str(&self.next().str_value)
    }

    // ========================================================================
    // Error Reporting
    // ========================================================================

    fn anchor_at_next(&self) -> ErrorAnchor {
        match self.tokens.get(self.index) {
            Some(token) => ErrorAnchor::Column(token.start + self.offset),
            None => ErrorAnchor::EndOfExpression,
        }
    }

    fn record(&mut self, code: u32, message: String, anchor: ErrorAnchor) {
        self.errors.push(ParserError::with_text(
            code,
            message,
            self.input,
            self.location,
            anchor,
            self.absolute_offset,
        ));
    }

    /// Record an error at the next token without moving.
    fn report(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let anchor = self.anchor_at_next();
        self.record(message.code, message.format(args), anchor);
    }

    /// Record an error at the next token and skip to a recovery point.
    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.report(message, args);
        self.skip();
    }

    fn error_private_identifier(&mut self, expected: Option<&str>) {
        let mut text = messages::PRIVATE_IDENTIFIERS_NOT_SUPPORTED.format(&[&self.next().to_string()]);
        if let Some(expected) = expected {
            text.push_str(", ");
            text.push_str(expected);
        }
        let anchor = self.anchor_at_next();
        self.record(messages::PRIVATE_IDENTIFIERS_NOT_SUPPORTED.code, text, anchor);
        self.skip();
    }

    fn pretty_print_next(&self) -> String {
        if self.at_eof() {
            "end of input".to_string()
        } else {
            format!("token {}", self.next())
        }
    }

    /// Skip tokens until one that lets an enclosing production resume.
    ///
    /// Stops at `;` and `|`, at a closing delimiter some caller is waiting
    /// for, and at an assignment operator where a value may be written.
    /// Scanner errors passed over on the way are recorded.
    fn skip(&mut self) {
        let first = self.index;
        while !self.at_eof() {
            let n = self.next();
            if n.is_character(';')
                || n.is_operator("|")
                || (self.rparens_expected > 0 && n.is_character(')'))
                || (self.rbraces_expected > 0 && n.is_character('}'))
                || (self.rbrackets_expected > 0 && n.is_character(']'))
                || (self.context.contains(ParseContextFlags::WRITABLE)
                    && n.is_any_operator()
                    && is_assignment_operation(&n.str_value))
            {
                break;
            }
            if n.is_error() {
                let message = n.str_value.clone();
                let anchor = ErrorAnchor::Column(n.start + self.offset);
                self.record(messages::LEXER_ERROR_TOKEN.code, message, anchor);
            }
            self.advance();
        }
        trace!(skipped = self.index - first, "recovered from parse error");
    }

    // ========================================================================
    // Token Expectations
    // ========================================================================

    fn consume_optional_character(&mut self, ch: char) -> bool {
        if self.next().is_character(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_optional_operator(&mut self, operator: &str) -> bool {
        if self.next().is_operator(operator) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_character(&mut self, ch: char) {
        if !self.consume_optional_character(ch) {
            self.error(&messages::MISSING_EXPECTED, &[&ch.to_string()]);
        }
    }

    fn next_is_assignment(&self) -> bool {
        let n = self.next();
        n.is_any_operator() && is_assignment_operation(&n.str_value)
    }

    fn expect_identifier_or_keyword(&mut self) -> Option<&'a str> {
        let n = self.next();
        if n.is_identifier() || n.is_keyword() {
            let text = self.next_text();
            self.advance();
            return Some(text);
        }
        if n.is_private_identifier() {
            self.error_private_identifier(Some("expected identifier or keyword"));
        } else {
            let found = self.pretty_print_next();
            self.error(&messages::EXPECTED_IDENTIFIER_OR_KEYWORD, &[&found]);
        }
        None
    }

    /// A map key or binding key. Returns `""` after reporting a bad token.
    fn expect_identifier_or_keyword_or_string(&mut self) -> &'a str {
        let n = self.next();
        if n.is_identifier() || n.is_keyword() || n.is_plain_string() {
            let text = self.next_text();
            self.advance();
            return text;
        }
        if n.is_private_identifier() {
            self.error_private_identifier(Some("expected identifier, keyword or string"));
        } else {
            let found = self.pretty_print_next();
            self.error(&messages::EXPECTED_IDENTIFIER_KEYWORD_OR_STRING, &[&found]);
        }
        ""
    }

    fn with_context<R>(&mut self, context: ParseContextFlags, parse: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.context;
        self.context |= context;
        let result = parse(self);
        self.context = previous;
        result
    }

    /// Run a nested production, refusing once the nesting limit is reached.
    fn nested(&mut self, start: TextPos, parse: impl FnOnce(&mut Self) -> AstRef<'a>) -> AstRef<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::EXPRESSION_TOO_DEEPLY_NESTED, &[]);
            return self.empty_expr(start);
        }
        self.recursion_depth += 1;
        let result = parse(self);
        self.recursion_depth -= 1;
        result
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse a whole expression: one or more `;`-separated statements.
    pub fn parse_chain(&mut self) -> AstRef<'a> {
        let mut expressions = Vec::new();
        let start = self.input_index();
        while !self.at_eof() {
            expressions.push(self.parse_pipe());

            if self.consume_optional_character(';') {
                if !self.flags.contains(ParseFlags::ACTION) {
                    self.error(&messages::BINDING_CANNOT_CONTAIN_CHAINED_EXPRESSION, &[]);
                }
                while self.consume_optional_character(';') {}
            } else if !self.at_eof() {
                let error_index = self.index;
                let found = self.next().to_string();
                self.error(&messages::UNEXPECTED_TOKEN_QUOTED, &[&found]);
                if self.index == error_index {
                    break;
                }
            }
        }

        match expressions.len() {
            0 => {
                let span = self.span_to(self.offset, Some(self.offset + self.input_len));
                self.alloc(Ast::EmptyExpr(EmptyExpr {
                    data: self.node_data(span),
                }))
            }
            1 => expressions[0],
            _ => self.alloc(Ast::Chain(Chain {
                data: self.data(start),
                expressions: self.alloc_list(expressions),
            })),
        }
    }

    fn parse_pipe(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        self.nested(start, Self::parse_pipe_unguarded)
    }

    fn parse_pipe_unguarded(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        let mut result = self.parse_expression();
        if !self.consume_optional_operator("|") {
            return result;
        }
        if self.flags.contains(ParseFlags::ACTION) {
            self.error(&messages::PIPE_IN_ACTION_EXPRESSION, &[]);
        }

        loop {
            let name_start = self.input_index();
            let (name, name_span, full_span_end) = match self.expect_identifier_or_keyword() {
                Some(name) => (name, self.span(name_start).to_absolute(self.absolute_offset), None),
                None => {
                    // The name is missing: the pipe ends where the next token begins.
                    let end = if self.at_eof() {
                        self.input_len + self.offset
                    } else {
                        self.next().start + self.offset
                    };
                    ("", ParseSpan::empty(end).to_absolute(self.absolute_offset), Some(end))
                }
            };

            let mut args = Vec::new();
            while self.consume_optional_character(':') {
                args.push(self.parse_expression());
            }

            let pipe_type = if self.supports_direct_pipe_references
                && name.starts_with(|c: char| c == '_' || c.is_ascii_uppercase())
            {
                BindingPipeType::ReferencedDirectly
            } else {
                BindingPipeType::ReferencedByName
            };

            let span = self.span_to(start, full_span_end);
            result = self.alloc(Ast::BindingPipe(BindingPipe {
                data: self.node_data(span),
                exp: result,
                name,
                args: self.alloc_list(args),
                pipe_type,
                name_span,
            }));

            if !self.consume_optional_operator("|") {
                break;
            }
        }
        result
    }

    #[inline]
    fn parse_expression(&mut self) -> AstRef<'a> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        let condition = self.parse_binary(OperatorPrecedence::Lowest);
        if !self.consume_optional_operator("?") {
            return condition;
        }

        let true_exp = self.parse_pipe();
        let false_exp = if self.consume_optional_character(':') {
            self.parse_pipe()
        } else {
            let end = self.input_index();
            let expression = self.slice_input(start, end);
            self.error(&messages::CONDITIONAL_REQUIRES_ALL_3_EXPRESSIONS, &[&expression]);
            self.empty_expr(start)
        };

        self.alloc(Ast::Conditional(Conditional {
            data: self.data(start),
            condition,
            true_exp,
            false_exp,
        }))
    }

    /// Precedence climbing over every binary operator tighter than `min_precedence`.
    fn parse_binary(&mut self, min_precedence: OperatorPrecedence) -> AstRef<'a> {
        let start = self.input_index();
        let mut result = self.parse_prefix();

        loop {
            let precedence = get_binary_operator_precedence(self.next());
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            let Some(operation) = BinaryOperator::from_token(&self.next().str_value) else {
                break;
            };

            let right = if precedence.is_right_associative() {
                if is_unary_like(result) {
                    self.report(&messages::UNARY_BEFORE_EXPONENTIATION, &[]);
                }
                self.advance();
                let right_start = self.input_index();
                self.nested(right_start, |p| p.parse_binary(OperatorPrecedence::Multiplicative))
            } else {
                self.advance();
                self.parse_binary(precedence)
            };

            result = self.alloc(Ast::Binary(Binary {
                data: self.data(start),
                operation,
                left: result,
                right,
            }));
        }
        result
    }

    fn parse_prefix(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        let n = self.next();

        if n.is_operator("+") || n.is_operator("-") {
            let operator = if n.is_operator("+") {
                UnaryOperator::Plus
            } else {
                UnaryOperator::Minus
            };
            self.advance();
            let expr = self.nested(start, Self::parse_prefix);
            return self.alloc(Ast::Unary(Unary {
                data: self.data(start),
                operator,
                expr,
            }));
        }

        if n.is_operator("!") {
            self.advance();
            let expression = self.nested(start, Self::parse_prefix);
            return self.alloc(Ast::PrefixNot(PrefixNot {
                data: self.data(start),
                expression,
            }));
        }

        if n.is_keyword_typeof() {
            self.advance();
            let expression = self.nested(start, Self::parse_prefix);
            return self.alloc(Ast::TypeofExpression(TypeofExpression {
                data: self.data(start),
                expression,
            }));
        }

        if n.is_keyword_void() {
            self.advance();
            let expression = self.nested(start, Self::parse_prefix);
            return self.alloc(Ast::VoidExpression(VoidExpression {
                data: self.data(start),
                expression,
            }));
        }

        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        let mut result = self.parse_primary();

        loop {
            result = if self.consume_optional_character('.') {
                self.parse_access_member(result, start, false)
            } else if self.consume_optional_operator("?.") {
                if self.consume_optional_character('(') {
                    self.parse_call(result, start, true)
                } else if self.consume_optional_character('[') {
                    self.parse_keyed_read_or_write(result, start, true)
                } else {
                    self.parse_access_member(result, start, true)
                }
            } else if self.consume_optional_character('[') {
                self.parse_keyed_read_or_write(result, start, false)
            } else if self.consume_optional_character('(') {
                self.parse_call(result, start, false)
            } else if self.consume_optional_operator("!") {
                self.alloc(Ast::NonNullAssert(NonNullAssert {
                    data: self.data(start),
                    expression: result,
                }))
            } else if self.next().is_template_literal_end() || self.next().is_template_literal_part() {
                let template = if self.next().is_template_literal_end() {
                    self.parse_no_interpolation_template_literal()
                } else {
                    self.parse_template_literal()
                };
                self.alloc(Ast::TaggedTemplateLiteral(TaggedTemplateLiteral {
                    data: self.data(start),
                    tag: result,
                    template: self.arena.alloc(template),
                }))
            } else {
                return result;
            };
        }
    }

    fn parse_primary(&mut self) -> AstRef<'a> {
        let start = self.input_index();

        if self.consume_optional_character('(') {
            self.rparens_expected += 1;
            let expression = self.parse_pipe();
            if !self.consume_optional_character(')') {
                self.error(&messages::MISSING_CLOSING_PARENTHESES, &[]);
                self.consume_optional_character(')');
            }
            self.rparens_expected -= 1;
            return self.alloc(Ast::ParenthesizedExpression(ParenthesizedExpression {
                data: self.data(start),
                expression,
            }));
        }

        let n = self.next();
        if n.is_keyword_null() {
            return self.parse_keyword_literal(start, LiteralValue::Null);
        }
        if n.is_keyword_undefined() {
            return self.parse_keyword_literal(start, LiteralValue::Undefined);
        }
        if n.is_keyword_true() {
            return self.parse_keyword_literal(start, LiteralValue::Boolean(true));
        }
        if n.is_keyword_false() {
            return self.parse_keyword_literal(start, LiteralValue::Boolean(false));
        }
        if n.is_keyword_this() {
            self.advance();
            return self.alloc(Ast::ThisReceiver(ThisReceiver {
                data: self.data(start),
            }));
        }

        if self.consume_optional_character('[') {
            self.rbrackets_expected += 1;
            let expressions = self.parse_expression_list(']');
            self.rbrackets_expected -= 1;
            self.expect_character(']');
            return self.alloc(Ast::LiteralArray(LiteralArray {
                data: self.data(start),
                expressions: self.alloc_list(expressions),
            }));
        }

        let n = self.next();
        if n.is_character('{') {
            return self.parse_literal_map();
        }
        if n.is_identifier() {
            let receiver = self.implicit_receiver(start);
            return self.parse_access_member(receiver, start, false);
        }
        if n.is_number() {
            let value = n.num_value;
            return self.parse_keyword_literal(start, LiteralValue::Number(value));
        }
        if n.is_template_literal_end() {
            let template = self.parse_no_interpolation_template_literal();
            return self.alloc(Ast::TemplateLiteral(template));
        }
        if n.is_template_literal_part() {
            let template = self.parse_template_literal();
            return self.alloc(Ast::TemplateLiteral(template));
        }
        if n.is_plain_string() {
            let value = self.next_text();
            return self.parse_keyword_literal(start, LiteralValue::String(value));
        }
        if n.is_private_identifier() {
            self.error_private_identifier(None);
            return self.empty_expr(start);
        }
        if n.is_regexp_body() {
            return self.parse_regular_expression_literal();
        }
        if n.is_error() {
            // `skip` records the scanner's message.
            self.skip();
            return self.empty_expr(start);
        }

        if self.at_eof() {
            let input = self.input;
            self.error(&messages::UNEXPECTED_END_OF_EXPRESSION, &[input]);
        } else {
            let found = self.next().to_string();
            self.error(&messages::UNEXPECTED_TOKEN, &[&found]);
        }
        self.empty_expr(start)
    }

    /// Consume a single-token literal.
    fn parse_keyword_literal(&mut self, start: TextPos, value: LiteralValue<'a>) -> AstRef<'a> {
        self.advance();
        self.alloc(Ast::LiteralPrimitive(LiteralPrimitive {
            data: self.data(start),
            value,
        }))
    }

    fn parse_expression_list(&mut self, terminator: char) -> Vec<AstRef<'a>> {
        let mut result = Vec::new();
        loop {
            if !self.next().is_character(terminator) {
                result.push(self.parse_pipe());
            } else {
                break;
            }
            if !self.consume_optional_character(',') {
                break;
            }
        }
        result
    }

    fn parse_literal_map(&mut self) -> AstRef<'a> {
        let start = self.input_index();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        self.expect_character('{');

        if !self.consume_optional_character('}') {
            self.rbraces_expected += 1;
            loop {
                let key_start = self.input_index();
                let quoted = self.next().is_plain_string();
                let key = self.expect_identifier_or_keyword_or_string();

                if quoted {
                    self.expect_character(':');
                    values.push(self.parse_pipe());
                    keys.push(LiteralMapKey {
                        key,
                        quoted,
                        is_shorthand_initialized: false,
                    });
                } else if self.consume_optional_character(':') {
                    values.push(self.parse_pipe());
                    keys.push(LiteralMapKey {
                        key,
                        quoted,
                        is_shorthand_initialized: false,
                    });
                } else {
                    // `{a}` reads `a` from the implicit receiver.
                    let data = self.data(key_start);
                    let receiver = self.implicit_receiver(key_start);
                    values.push(self.alloc(Ast::PropertyRead(PropertyRead {
                        data,
                        name_span: data.source_span,
                        receiver,
                        name: key,
                    })));
                    keys.push(LiteralMapKey {
                        key,
                        quoted,
                        is_shorthand_initialized: true,
                    });
                }

                if !self.consume_optional_character(',') || self.next().is_character('}') {
                    break;
                }
            }
            self.rbraces_expected -= 1;
            self.expect_character('}');
        }

        self.alloc(Ast::LiteralMap(LiteralMap {
            data: self.data(start),
            keys: self.arena.alloc_slice(keys),
            values: self.alloc_list(values),
        }))
    }

    fn parse_access_member(&mut self, receiver: AstRef<'a>, start: TextPos, is_safe: bool) -> AstRef<'a> {
        let name_start = self.input_index();
        let name = self.with_context(ParseContextFlags::WRITABLE, |p| {
            let name = p.expect_identifier_or_keyword().unwrap_or("");
            if name.is_empty() {
                let column = receiver.span().end.saturating_sub(p.offset);
                p.record(
                    messages::EXPECTED_IDENTIFIER_FOR_PROPERTY_ACCESS.code,
                    messages::EXPECTED_IDENTIFIER_FOR_PROPERTY_ACCESS.message.to_string(),
                    ErrorAnchor::Column(column),
                );
            }
            name
        });
        let name_span = self.span(name_start).to_absolute(self.absolute_offset);

        if is_safe {
            if self.next_is_assignment() {
                self.advance();
                self.error(&messages::SAFE_ACCESS_IN_ASSIGNMENT, &[]);
                return self.empty_expr(start);
            }
            return self.alloc(Ast::SafePropertyRead(SafePropertyRead {
                data: self.data(start),
                name_span,
                receiver,
                name,
            }));
        }

        if self.next_is_assignment() {
            let target = self.alloc(Ast::PropertyRead(PropertyRead {
                data: self.data(start),
                name_span,
                receiver,
                name,
            }));
            return self.parse_assignment(target, start);
        }

        self.alloc(Ast::PropertyRead(PropertyRead {
            data: self.data(start),
            name_span,
            receiver,
            name,
        }))
    }

    /// `target op value`, with the operator as the next token.
    ///
    /// Bindings cannot assign: the operator and the rest of the expression
    /// are skipped and the target read is returned on its own.
    fn parse_assignment(&mut self, target: AstRef<'a>, start: TextPos) -> AstRef<'a> {
        if !self.flags.contains(ParseFlags::ACTION) {
            self.advance();
            self.error(&messages::BINDINGS_CANNOT_CONTAIN_ASSIGNMENTS, &[]);
            return target;
        }
        let operator = BinaryOperator::from_token(&self.next().str_value).unwrap_or(BinaryOperator::Assign);
        self.advance();
        let value = self.parse_conditional();
        self.alloc(Ast::Binary(Binary {
            data: self.data(start),
            operation: operator,
            left: target,
            right: value,
        }))
    }

    fn parse_call(&mut self, receiver: AstRef<'a>, start: TextPos, is_safe: bool) -> AstRef<'a> {
        let argument_start = self.input_index();
        self.rparens_expected += 1;
        let args = self.parse_call_arguments();
        let argument_span = self
            .span_to(argument_start, Some(self.input_index()))
            .to_absolute(self.absolute_offset);
        self.expect_character(')');
        self.rparens_expected -= 1;

        let data = self.data(start);
        let args = self.alloc_list(args);
        if is_safe {
            self.alloc(Ast::SafeCall(SafeCall {
                data,
                receiver,
                args,
                argument_span,
            }))
        } else {
            self.alloc(Ast::Call(Call {
                data,
                receiver,
                args,
                argument_span,
            }))
        }
    }

    fn parse_call_arguments(&mut self) -> Vec<AstRef<'a>> {
        let mut args = Vec::new();
        if self.next().is_character(')') {
            return args;
        }
        loop {
            args.push(self.parse_pipe());
            if !self.consume_optional_character(',') {
                break;
            }
        }
        args
    }

    fn parse_keyed_read_or_write(&mut self, receiver: AstRef<'a>, start: TextPos, is_safe: bool) -> AstRef<'a> {
        self.with_context(ParseContextFlags::WRITABLE, |p| p.parse_keyed(receiver, start, is_safe))
    }

    fn parse_keyed(&mut self, receiver: AstRef<'a>, start: TextPos, is_safe: bool) -> AstRef<'a> {
        self.rbrackets_expected += 1;
        let key = self.parse_pipe();
        if key.is_empty_expr() {
            self.error(&messages::KEY_ACCESS_CANNOT_BE_EMPTY, &[]);
        }
        self.rbrackets_expected -= 1;
        self.expect_character(']');

        if self.next_is_assignment() {
            if is_safe {
                self.advance();
                self.error(&messages::SAFE_ACCESS_IN_ASSIGNMENT, &[]);
                return self.empty_expr(start);
            }
            let target = self.alloc(Ast::KeyedRead(KeyedRead {
                data: self.data(start),
                receiver,
                key,
            }));
            return self.parse_assignment(target, start);
        }

        let data = self.data(start);
        if is_safe {
            self.alloc(Ast::SafeKeyedRead(SafeKeyedRead { data, receiver, key }))
        } else {
            self.alloc(Ast::KeyedRead(KeyedRead { data, receiver, key }))
        }
    }

    // ========================================================================
    // Template and Regular Expression Literals
    // ========================================================================

    /// A template literal whose only token is its closing part.
    fn parse_no_interpolation_template_literal(&mut self) -> TemplateLiteral<'a> {
        let start = self.input_index();
        let text = self.next_text();
        self.advance();
        let data = self.data(start);
        TemplateLiteral {
            data,
            elements: self.arena.alloc_slice([TemplateLiteralElement { data, text }]),
            expressions: &[],
        }
    }

    fn parse_template_literal(&mut self) -> TemplateLiteral<'a> {
        let start = self.input_index();
        let mut elements = Vec::new();
        let mut expressions = Vec::new();

        while !self.at_eof() {
            let n = self.next();
            if n.is_template_literal_part() || n.is_template_literal_end() {
                let is_end = n.is_template_literal_end();
                let part_start = self.input_index();
                let text = self.next_text();
                self.advance();
                elements.push(TemplateLiteralElement {
                    data: self.data(part_start),
                    text,
                });
                if is_end {
                    break;
                }
            } else if n.is_template_literal_interpolation_start() {
                self.advance();
                self.rbraces_expected += 1;
                let expression = self.parse_pipe();
                if expression.is_empty_expr() {
                    self.error(&messages::EMPTY_TEMPLATE_LITERAL_INTERPOLATION, &[]);
                }
                expressions.push(expression);
                self.rbraces_expected -= 1;
            } else {
                self.advance();
            }
        }

        TemplateLiteral {
            data: self.data(start),
            elements: self.arena.alloc_slice(elements),
            expressions: self.alloc_list(expressions),
        }
    }

    fn parse_regular_expression_literal(&mut self) -> AstRef<'a> {
        let body_token_start = self.next().start;
        let mut end = self.next().end;
        let body = self.next_text();
        self.advance();

        let mut flags = None;
        if self.next().is_regexp_flags() {
            let flags_start = self.next().start + self.offset;
            end = self.next().end;
            let text = self.next_text();
            self.advance();
            self.validate_regex_flags(text, flags_start);
            flags = Some(text);
        }

        let span = self.span_to(body_token_start + self.offset, Some(end + self.offset));
        self.alloc(Ast::RegularExpressionLiteral(RegularExpressionLiteral {
            data: self.node_data(span),
            body,
            flags,
        }))
    }

    fn validate_regex_flags(&mut self, flags: &str, flags_start: TextPos) {
        let mut seen = FxHashSet::default();
        for (i, flag) in flags.chars().enumerate() {
            let anchor = ErrorAnchor::Column(flags_start + i as TextPos);
            let text = flag.to_string();
            if !SUPPORTED_REGEX_FLAGS.contains(&flag) {
                self.record(
                    messages::UNSUPPORTED_REGEX_FLAG.code,
                    messages::UNSUPPORTED_REGEX_FLAG.format(&[&text]),
                    anchor,
                );
            } else if !seen.insert(flag) {
                self.record(
                    messages::DUPLICATE_REGEX_FLAG.code,
                    messages::DUPLICATE_REGEX_FLAG.format(&[&text]),
                    anchor,
                );
            }
        }
    }

    // ========================================================================
    // Template Bindings
    // ========================================================================

    /// Parse the microsyntax of a structural directive such as
    /// `*ngFor="let item of items; index as i"`.
    ///
    /// `template_key` is the directive name. Its own binding comes first;
    /// keys of later expression bindings are prefixed with it, so `of`
    /// under `ngFor` becomes `ngForOf`.
    pub fn parse_template_bindings(&mut self, template_key: TemplateBindingIdentifier<'a>) -> Vec<TemplateBinding<'a>> {
        let mut bindings = self.parse_directive_keyword_bindings(template_key);

        while !self.at_eof() {
            let before = self.index;
            if let Some(binding) = self.parse_let_binding() {
                bindings.push(binding);
            } else {
                let mut key = self.expect_template_binding_key();
                if let Some(binding) = self.parse_as_binding(key) {
                    bindings.push(binding);
                } else {
                    key.source = self.prefixed_key(template_key.source, key.source);
                    bindings.extend(self.parse_directive_keyword_bindings(key));
                }
            }
            self.consume_statement_terminator();
            if self.index == before {
                self.advance();
            }
        }
        bindings
    }

    fn prefixed_key(&self, template_key: &str, key: &str) -> &'a str {
        let mut chars = key.chars();
        let mut prefixed = template_key.to_string();
        if let Some(first) = chars.next() {
            prefixed.extend(first.to_uppercase());
            prefixed.push_str(chars.as_str());
        }
        self.arena.alloc_str(&prefixed)
    }

    /// A possibly dashed key such as `ng-for-of`.
    fn expect_template_binding_key(&mut self) -> TemplateBindingIdentifier<'a> {
        let start = self.current_absolute_offset();
        let mut key = String::new();
        loop {
            key.push_str(self.expect_identifier_or_keyword_or_string());
            if !self.consume_optional_operator("-") {
                break;
            }
            key.push('-');
        }
        let end = start + key.chars().count() as TextPos;
        TemplateBindingIdentifier {
            source: self.arena.alloc_str(&key),
            span: AbsoluteSourceSpan::new(start, end),
        }
    }

    /// `key [:] expression [as alias]`.
    fn parse_directive_keyword_bindings(&mut self, key: TemplateBindingIdentifier<'a>) -> Vec<TemplateBinding<'a>> {
        let mut bindings = Vec::new();
        self.consume_optional_character(':');

        let value = self.get_directive_bound_target();
        let mut span_end = self.current_absolute_offset();
        if let Some(as_binding) = self.parse_as_binding(key) {
            bindings.push(as_binding);
        } else {
            self.consume_statement_terminator();
            span_end = self.current_absolute_offset();
        }

        let binding = TemplateBinding::Expression(ExpressionBinding {
            source_span: AbsoluteSourceSpan::new(key.span.start, span_end),
            key,
            value,
        });
        bindings.insert(0, binding);
        bindings
    }

    fn get_directive_bound_target(&mut self) -> Option<AstWithSource<'a>> {
        if self.at_eof() || self.next().is_keyword_as() || self.next().is_keyword_let() {
            return None;
        }
        let errors_before = self.errors.len();
        let ast = self.parse_pipe();
        let span = ast.span();
        let source = self.slice_input(span.start, span.end);
        Some(AstWithSource {
            ast,
            source: self.arena.alloc_str(&source),
            location: self.location.to_string(),
            absolute_offset: self.absolute_offset + span.start,
            errors: self.errors[errors_before..].to_vec(),
        })
    }

    /// `value as alias`, binding `alias` to the value of `value`.
    fn parse_as_binding(&mut self, value: TemplateBindingIdentifier<'a>) -> Option<TemplateBinding<'a>> {
        if !self.next().is_keyword_as() {
            return None;
        }
        self.advance();
        let key = self.expect_template_binding_key();
        self.consume_statement_terminator();
        Some(TemplateBinding::Variable(VariableBinding {
            source_span: AbsoluteSourceSpan::new(value.span.start, self.current_absolute_offset()),
            key,
            value: Some(value),
        }))
    }

    /// `let item` or `let i = index`.
    fn parse_let_binding(&mut self) -> Option<TemplateBinding<'a>> {
        if !self.next().is_keyword_let() {
            return None;
        }
        let span_start = self.current_absolute_offset();
        self.advance();
        let key = self.expect_template_binding_key();
        let value = if self.consume_optional_operator("=") {
            Some(self.expect_template_binding_key())
        } else {
            None
        };
        self.consume_statement_terminator();
        Some(TemplateBinding::Variable(VariableBinding {
            source_span: AbsoluteSourceSpan::new(span_start, self.current_absolute_offset()),
            key,
            value,
        }))
    }

    fn consume_statement_terminator(&mut self) {
        if !self.consume_optional_character(';') {
            self.consume_optional_character(',');
        }
    }
}

fn is_unary_like(ast: &Ast<'_>) -> bool {
    matches!(
        ast,
        Ast::Unary(_) | Ast::PrefixNot(_) | Ast::TypeofExpression(_) | Ast::VoidExpression(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmplexpr_printer::unparse;
    use tmplexpr_scanner::tokenize;

    fn parse<'a>(arena: &'a ExpressionArena, input: &'a str, flags: ParseFlags) -> (AstRef<'a>, Vec<ParserError>) {
        let mut parser = ParseAst::new(arena, input, "test", 0, tokenize(input)).with_flags(flags);
        let ast = parser.parse_chain();
        (ast, parser.into_errors())
    }

    fn messages_of(errors: &[ParserError]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_exponentiation_is_right_associative() {
        let arena = ExpressionArena::new();
        let (ast, errors) = parse(&arena, "2 ** 3 ** 2", ParseFlags::empty());
        assert!(errors.is_empty());
        let Ast::Binary(outer) = ast else {
            panic!("expected a binary node, got {}", ast.kind_name());
        };
        assert!(matches!(outer.left, Ast::LiteralPrimitive(_)));
        assert!(matches!(outer.right, Ast::Binary(_)));
    }

    #[test]
    fn test_additive_is_left_associative() {
        let arena = ExpressionArena::new();
        let (ast, _) = parse(&arena, "1 - 2 - 3", ParseFlags::empty());
        let Ast::Binary(outer) = ast else {
            panic!("expected a binary node");
        };
        assert!(matches!(outer.left, Ast::Binary(_)));
        assert_eq!(outer.data.span, ParseSpan::new(0, 9));
    }

    #[test]
    fn test_unary_before_exponentiation_is_reported() {
        let arena = ExpressionArena::new();
        let (ast, errors) = parse(&arena, "-2 ** 2", ParseFlags::empty());
        assert_eq!(unparse(ast), "-2 ** 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, messages::UNARY_BEFORE_EXPONENTIATION.code);
        assert_eq!(errors[0].column(), Some(4));
    }

    #[test]
    fn test_binding_assignment_keeps_only_the_target() {
        let arena = ExpressionArena::new();
        for (input, target) in [("a = b", "a"), ("a[0] = b", "a[0]"), ("a.b ??= c + d", "a.b")] {
            let (ast, errors) = parse(&arena, input, ParseFlags::empty());
            assert_eq!(unparse(ast), target, "input: {}", input);
            assert_eq!(messages_of(&errors), vec!["Bindings cannot contain assignments"]);
        }
    }

    #[test]
    fn test_chain_in_binding_is_reported() {
        let arena = ExpressionArena::new();
        let (_, errors) = parse(&arena, "a; b", ParseFlags::empty());
        assert_eq!(
            messages_of(&errors),
            vec!["Binding expression cannot contain chained expression"]
        );

        let (ast, errors) = parse(&arena, "a; b;", ParseFlags::ACTION);
        assert!(errors.is_empty());
        assert_eq!(unparse(ast), "a; b;");
    }

    #[test]
    fn test_empty_input_spans_whole_text() {
        let arena = ExpressionArena::new();
        let (ast, errors) = parse(&arena, "   ", ParseFlags::empty());
        assert!(errors.is_empty());
        assert!(ast.is_empty_expr());
        assert_eq!(ast.span(), ParseSpan::new(0, 3));
    }

    #[test]
    fn test_deep_nesting_is_refused() {
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let arena = ExpressionArena::new();
                let depth = MAX_RECURSION_DEPTH as usize + 50;
                let input = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
                let input = arena.alloc_str(&input);
                let (_, errors) = parse(&arena, input, ParseFlags::empty());
                errors
                    .iter()
                    .any(|e| e.code == messages::EXPRESSION_TOO_DEEPLY_NESTED.code)
            })
            .unwrap();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_regex_flags_are_validated() {
        let arena = ExpressionArena::new();
        let (ast, errors) = parse(&arena, "/a/gig", ParseFlags::empty());
        assert_eq!(unparse(ast), "/a/gig");
        assert_eq!(messages_of(&errors), vec!["Duplicate regular expression flag \"g\""]);
        assert_eq!(errors[0].column(), Some(6));
    }

    #[test]
    fn test_skip_stops_at_expected_closers() {
        let arena = ExpressionArena::new();
        let (ast, errors) = parse(&arena, "f(a b, c)", ParseFlags::empty());
        assert_eq!(unparse(ast), "f(a)");
        assert_eq!(
            messages_of(&errors),
            vec!["Missing expected )", "Unexpected token ')'"]
        );
    }
}
