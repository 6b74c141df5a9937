//! Numeric literal lexing.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes an integer or decimal literal.
    ///
    /// Grammar: `[0-9]+ ('.' [0-9]+)?`. A dot not followed by a digit is
    /// left in the stream (so `5.` lexes as the number `5` and a `.`
    /// punctuation token).
    pub(crate) fn lex_number(&mut self) -> Token {
        self.cursor.bump_while(|c| c.is_ascii_digit());

        if self.cursor.current() == '.' && self.cursor.peek(1).is_ascii_digit() {
            self.cursor.bump();
            self.cursor.bump_while(|c| c.is_ascii_digit());
        }

        self.finish(TokenKind::Number)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::Lexer;
    use minic_util::Handler;

    fn lex_values(source: &str) -> Vec<(TokenKind, String)> {
        let handler = Handler::new();
        Lexer::new(source, &handler)
            .run()
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_integer() {
        assert_eq!(lex_values("42"), vec![(TokenKind::Number, "42".into())]);
    }

    #[test]
    fn test_zero() {
        assert_eq!(lex_values("0"), vec![(TokenKind::Number, "0".into())]);
    }

    #[test]
    fn test_decimal() {
        assert_eq!(lex_values("3.14"), vec![(TokenKind::Number, "3.14".into())]);
    }

    #[test]
    fn test_trailing_dot_is_not_consumed() {
        assert_eq!(
            lex_values("5."),
            vec![
                (TokenKind::Number, "5".into()),
                (TokenKind::Punctuation, ".".into()),
            ]
        );
    }

    #[test]
    fn test_number_then_identifier() {
        assert_eq!(
            lex_values("2x"),
            vec![
                (TokenKind::Number, "2".into()),
                (TokenKind::Identifier, "x".into()),
            ]
        );
    }
}
