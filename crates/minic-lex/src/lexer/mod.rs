//! Core lexer: token dispatch and error reporting.
//!
//! The [`Lexer`] walks the source once. Each call to [`Lexer::next_token`]
//! skips whitespace, records the token start, then dispatches on the first
//! character to a specialized scanning method. The per-category methods live
//! in the submodules of this module.

mod comment;
mod ident;
mod number;
mod operator;
mod preprocessor;
mod string;

use minic_util::{DiagnosticBuilder, DiagnosticCode, Handler, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Single-pass scanner producing [`Token`]s.
pub struct Lexer<'src> {
    pub(crate) cursor: Cursor<'src>,
    handler: &'src Handler,
    /// Byte offset where the current token began.
    pub(crate) token_start: usize,
    token_line: u32,
    token_column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over `source`, reporting into `handler`.
    pub fn new(source: &'src str, handler: &'src Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Scans the entire input.
    pub fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Scans one token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.cursor.bump_while(|c| c.is_whitespace());

        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return None;
        }

        let token = match self.cursor.current() {
            '#' => self.lex_preprocessor(),
            '/' if self.cursor.peek(1) == '/' || self.cursor.peek(1) == '*' => self.lex_comment(),
            '"' => self.lex_string(),
            '\'' => self.lex_char(),
            '(' | ')' | '{' | '}' | '[' | ']' | ',' | ';' | ':' | '?' | '.' => {
                self.cursor.bump();
                self.finish(TokenKind::Punctuation)
            }
            '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '~' => {
                self.lex_operator()
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(),
            c if c.is_ascii_digit() => self.lex_number(),
            c => {
                self.report(
                    DiagnosticCode::E_LEXER_UNEXPECTED_CHAR,
                    format!("Unrecognized character '{}'", c),
                );
                self.cursor.bump();
                self.finish(TokenKind::Error)
            }
        };

        Some(token)
    }

    /// Builds a token of `kind` covering `token_start..position`.
    pub(crate) fn finish(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.cursor.slice_from(self.token_start), self.span())
    }

    /// Span of the token currently being scanned.
    pub(crate) fn span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_line,
            self.token_column,
        )
    }

    /// Reports a lexical error at the current token.
    pub(crate) fn report(&self, code: DiagnosticCode, message: String) {
        DiagnosticBuilder::error(message)
            .span(self.span())
            .code(code)
            .emit(self.handler);
    }
}
