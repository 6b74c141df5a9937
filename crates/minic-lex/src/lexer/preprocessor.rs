//! Preprocessor line lexing.
//!
//! Only the lexical shape is handled here: a `#` consumes the whole line
//! into one token. Interpreting `#include`/`#define` is the semantic
//! analyzer's job.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes a `#...` directive through end-of-line.
    ///
    /// The trailing newline is not part of the token.
    pub(crate) fn lex_preprocessor(&mut self) -> Token {
        self.cursor.bump_while(|c| c != '\n');
        self.finish(TokenKind::Preprocessor)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::TokenKind;
    use crate::Lexer;
    use minic_util::Handler;

    fn lex_all(source: &str) -> Vec<(TokenKind, String)> {
        let handler = Handler::new();
        Lexer::new(source, &handler)
            .run()
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_include_directive() {
        let tokens = lex_all("#include <stdio.h>\nint main() {}");
        assert_eq!(
            tokens[0],
            (TokenKind::Preprocessor, "#include <stdio.h>".to_string())
        );
        assert_eq!(tokens[1], (TokenKind::Type, "int".to_string()));
    }

    #[test]
    fn test_define_directive() {
        let tokens = lex_all("#define MAX 100");
        assert_eq!(
            tokens[0],
            (TokenKind::Preprocessor, "#define MAX 100".to_string())
        );
    }

    #[test]
    fn test_directive_at_end_of_input() {
        let tokens = lex_all("#pragma once");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, TokenKind::Preprocessor);
    }
}
