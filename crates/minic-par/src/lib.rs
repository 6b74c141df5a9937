//! minic-par - Recursive-descent parser for the C subset.
//!
//! The parser consumes the lexer's token stream and builds the AST defined
//! in [`ast`]. It is a hand-written recursive-descent parser: one method per
//! grammar construct, with expression precedence handled by binding-power
//! climbing in [`expr`].
//!
//! # Error recovery
//!
//! Parsing is total. On a mismatch the parser records a diagnostic carrying
//! the offending token's span and keeps going — a missing `;` does not eat
//! the rest of the file. The top-level loop recovers from an unparseable
//! token by skipping exactly one token and retrying, so the returned
//! [`Program`](ast::Program) may contain partial subtrees (and
//! [`Expr::Error`](ast::Expr::Error) holes) alongside the diagnostics, but
//! it always comes back.
//!
//! Top-level classification needs one savepoint: after the declaration
//! specifiers and the declarator name, a `(` means function, anything else
//! means variable. The parser rewinds to the savepoint and hands off to the
//! dedicated method.

pub mod ast;
mod expr;
mod item;
mod stmt;

pub use expr::bp;

use minic_lex::{Token, TokenKind};
use minic_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Span};

use crate::ast::{Item, Program};

/// Result of a parse: the (possibly partial) AST plus all syntax errors.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<Diagnostic>,
}

/// Parses a token stream into a [`Program`].
///
/// Never panics: an unexpected internal fault is converted into a single
/// diagnostic and an empty program.
///
/// # Examples
///
/// ```
/// use minic_lex::lex;
/// use minic_par::parse;
///
/// let result = parse(lex("int main() { return 0; }"));
/// assert!(result.errors.is_empty());
/// assert_eq!(result.program.body.len(), 1);
/// ```
pub fn parse(tokens: Vec<Token>) -> ParseResult {
    let handler = Handler::new();
    let program = run_parser(tokens, &handler);
    ParseResult {
        program,
        errors: handler.take(),
    }
}

/// Parses into an existing handler; used by the driver to aggregate
/// diagnostics across stages.
pub fn run_parser(tokens: Vec<Token>, handler: &Handler) -> Program {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Parser::new(tokens, handler).parse_program()
    }));
    match result {
        Ok(program) => program,
        Err(payload) => {
            handler.emit(
                DiagnosticBuilder::error(format!("parser failed: {}", panic_message(&payload)))
                    .span(Span::DUMMY)
                    .code(DiagnosticCode::E_INTERNAL)
                    .build(),
            );
            Program {
                body: Vec::new(),
                span: Span::DUMMY,
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown internal error".to_string()
    }
}

/// Recursive-descent parser state.
pub struct Parser<'h> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'h Handler,
}

impl<'h> Parser<'h> {
    /// Creates a parser over `tokens`. Comment tokens are dropped here;
    /// everything else is kept.
    pub fn new(tokens: Vec<Token>, handler: &'h Handler) -> Self {
        let tokens = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        Self {
            tokens,
            pos: 0,
            handler,
        }
    }

    /// Parses the whole token stream.
    pub fn parse_program(&mut self) -> Program {
        let mut body: Vec<Item> = Vec::new();

        while !self.at_end() {
            let before = self.pos;
            if let Some(item) = self.parse_item() {
                body.push(item);
            }
            // An item parser that consumed nothing would loop forever;
            // skip the blocking token.
            if self.pos == before {
                self.error_here(
                    DiagnosticCode::E_PARSER_UNEXPECTED_TOKEN,
                    format!(
                        "Unexpected token '{}' at program level",
                        self.peek_value().unwrap_or_default()
                    ),
                );
                self.advance();
            }
        }

        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::DUMMY,
        };
        Program { body, span }
    }

    // =========================================================================
    // TOKEN STREAM PRIMITIVES
    // =========================================================================

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    pub(crate) fn peek_value(&self) -> Option<String> {
        self.peek().map(|t| t.value.clone())
    }

    /// Span of the current token, or of the last token at end of input.
    pub(crate) fn here(&self) -> Span {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::DUMMY)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// True if the current token has exactly this source text.
    pub(crate) fn check(&self, value: &str) -> bool {
        self.peek().is_some_and(|t| t.value == value)
    }

    pub(crate) fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Consumes the current token if it has this source text.
    pub(crate) fn eat(&mut self, value: &str) -> bool {
        if self.check(value) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the expected token or records a diagnostic without
    /// consuming anything, so the caller's context resynchronizes itself.
    pub(crate) fn expect(&mut self, value: &str) -> bool {
        if self.eat(value) {
            return true;
        }
        let (code, found) = match self.peek() {
            Some(t) => (
                DiagnosticCode::E_PARSER_EXPECTED_TOKEN,
                format!("'{}'", t.value),
            ),
            None => (DiagnosticCode::E_PARSER_UNEXPECTED_EOF, "end of input".into()),
        };
        self.error_here(code, format!("Expected '{}', got {}", value, found));
        false
    }

    /// Consumes an identifier token, or records a diagnostic.
    pub(crate) fn expect_identifier(&mut self) -> Option<ast::Ident> {
        if self.check_kind(TokenKind::Identifier) {
            let token = self.advance().unwrap();
            return Some(ast::Ident {
                name: token.value,
                span: token.span,
            });
        }
        let found = self
            .peek_value()
            .map(|v| format!("'{}'", v))
            .unwrap_or_else(|| "end of input".into());
        self.error_here(
            DiagnosticCode::E_PARSER_EXPECTED_TOKEN,
            format!("Expected identifier, got {}", found),
        );
        None
    }

    /// Savepoint for the function-vs-variable look-ahead.
    pub(crate) fn save(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, savepoint: usize) {
        self.pos = savepoint;
    }

    /// Records a syntax error at the current token.
    pub(crate) fn error_here(&self, code: DiagnosticCode, message: String) {
        let mut builder = DiagnosticBuilder::error(message)
            .span(self.here())
            .code(code);
        if let Some(token) = self.peek() {
            builder = builder.snippet(token.value.clone());
        }
        builder.emit(self.handler);
    }
}
