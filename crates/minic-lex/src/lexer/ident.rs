//! Identifier, keyword, type-name, and qualifier lexing.

use crate::token::{classify_word, Token};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes a word and classifies it.
    ///
    /// Words start with a letter or underscore and continue with
    /// alphanumerics or underscores. The resulting kind depends on the
    /// reserved-word tables: `int` is a type, `const` a qualifier,
    /// `while` a keyword, anything else an identifier.
    pub(crate) fn lex_word(&mut self) -> Token {
        self.cursor
            .bump_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let word = self.cursor.slice_from(self.token_start);
        self.finish(classify_word(word))
    }
}
