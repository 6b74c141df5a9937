//! Operator lexing, multi-character forms first.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes an operator.
    ///
    /// Two-character forms (`==`, `!=`, `<=`, `>=`, `&&`, `||`, `++`, `--`,
    /// `<<`, `>>`, `->`) are tried before falling back to the single
    /// character. Maximal munch: `a+++b` lexes as `a ++ + b`.
    pub(crate) fn lex_operator(&mut self) -> Token {
        let first = self.cursor.current();
        self.cursor.bump();

        match first {
            '=' | '!' => {
                self.cursor.eat('=');
            }
            '<' => {
                // <= or <<
                let _ = self.cursor.eat('=') || self.cursor.eat('<');
            }
            '>' => {
                let _ = self.cursor.eat('=') || self.cursor.eat('>');
            }
            '&' => {
                self.cursor.eat('&');
            }
            '|' => {
                self.cursor.eat('|');
            }
            '+' => {
                self.cursor.eat('+');
            }
            '-' => {
                // -- or ->
                let _ = self.cursor.eat('-') || self.cursor.eat('>');
            }
            _ => {}
        }

        self.finish(TokenKind::Operator)
    }
}
