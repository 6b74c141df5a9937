//! Comment lexing.
//!
//! Comments are preserved as tokens rather than skipped; downstream
//! consumers that do not want them filter on [`TokenKind::Comment`].

use minic_util::DiagnosticCode;

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes a `//` line comment or a `/* */` block comment.
    ///
    /// Block comments do not nest (as in C). An unterminated block comment
    /// is reported and the token covers the rest of the input.
    pub(crate) fn lex_comment(&mut self) -> Token {
        self.cursor.bump(); // '/'

        if self.cursor.current() == '/' {
            self.cursor.bump_while(|c| c != '\n');
            return self.finish(TokenKind::Comment);
        }

        // Block comment.
        self.cursor.bump(); // '*'
        loop {
            if self.cursor.is_at_end() {
                self.report(
                    DiagnosticCode::E_LEXER_UNTERMINATED_COMMENT,
                    "Unterminated block comment".to_string(),
                );
                break;
            }
            if self.cursor.current() == '*' && self.cursor.peek(1) == '/' {
                self.cursor.bump();
                self.cursor.bump();
                break;
            }
            self.cursor.bump();
        }

        self.finish(TokenKind::Comment)
    }
}
