//! String and character literal lexing.

use minic_util::DiagnosticCode;

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes a double-quoted string literal.
    ///
    /// Escape-aware: a backslash always consumes the following character,
    /// so `"\""` and `"\\"` terminate where C says they do. The token value
    /// keeps the surrounding quotes. A string cut off by a newline or end
    /// of input is reported and the token covers what was consumed.
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor.bump(); // opening quote

        loop {
            match self.cursor.current() {
                '"' => {
                    self.cursor.bump();
                    return self.finish(TokenKind::StringLit);
                }
                '\\' => {
                    self.cursor.bump();
                    if !self.cursor.is_at_end() {
                        self.cursor.bump();
                    }
                }
                '\n' | '\0' => {
                    self.report(
                        DiagnosticCode::E_LEXER_UNTERMINATED_STRING,
                        "Unterminated string literal".to_string(),
                    );
                    return self.finish(TokenKind::StringLit);
                }
                _ => self.cursor.bump(),
            }
        }
    }

    /// Lexes a single-quoted character literal.
    ///
    /// Accepts one (possibly escaped) character between the quotes. The
    /// token value keeps the quotes.
    pub(crate) fn lex_char(&mut self) -> Token {
        self.cursor.bump(); // opening quote

        match self.cursor.current() {
            '\\' => {
                self.cursor.bump();
                if !self.cursor.is_at_end() {
                    self.cursor.bump();
                }
            }
            '\n' | '\0' => {
                self.report(
                    DiagnosticCode::E_LEXER_UNTERMINATED_STRING,
                    "Unterminated character literal".to_string(),
                );
                return self.finish(TokenKind::CharLit);
            }
            _ => self.cursor.bump(),
        }

        if !self.cursor.eat('\'') {
            self.report(
                DiagnosticCode::E_LEXER_UNTERMINATED_STRING,
                "Unterminated character literal".to_string(),
            );
        }
        self.finish(TokenKind::CharLit)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::Lexer;
    use minic_util::Handler;

    fn lex_one(source: &str) -> (TokenKind, String, bool) {
        let handler = Handler::new();
        let tokens = Lexer::new(source, &handler).run();
        (
            tokens[0].kind,
            tokens[0].value.clone(),
            handler.has_errors(),
        )
    }

    #[test]
    fn test_simple_string() {
        let (kind, value, errors) = lex_one("\"hello\"");
        assert_eq!(kind, TokenKind::StringLit);
        assert_eq!(value, "\"hello\"");
        assert!(!errors);
    }

    #[test]
    fn test_string_with_escapes() {
        let (kind, value, errors) = lex_one(r#""a\n\"b\"""#);
        assert_eq!(kind, TokenKind::StringLit);
        assert_eq!(value, r#""a\n\"b\"""#);
        assert!(!errors);
    }

    #[test]
    fn test_unterminated_string() {
        let (kind, _, errors) = lex_one("\"oops");
        assert_eq!(kind, TokenKind::StringLit);
        assert!(errors);
    }

    #[test]
    fn test_string_stops_at_newline() {
        let handler = Handler::new();
        let tokens = Lexer::new("\"a\nint", &handler).run();
        assert!(handler.has_errors());
        assert_eq!(tokens[1].value, "int");
    }

    #[test]
    fn test_char_literal() {
        let (kind, value, errors) = lex_one("'c'");
        assert_eq!(kind, TokenKind::CharLit);
        assert_eq!(value, "'c'");
        assert!(!errors);
    }

    #[test]
    fn test_escaped_char_literal() {
        let (kind, value, errors) = lex_one(r"'\n'");
        assert_eq!(kind, TokenKind::CharLit);
        assert_eq!(value, r"'\n'");
        assert!(!errors);
    }

    #[test]
    fn test_unterminated_char() {
        let (_, _, errors) = lex_one("'c");
        assert!(errors);
    }
}
