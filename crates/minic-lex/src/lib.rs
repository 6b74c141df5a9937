//! minic-lex - Lexical analysis for the C subset.
//!
//! The lexer is the first pipeline stage: it turns source text into a flat
//! sequence of classified [`Token`]s. Scanning is a single left-to-right
//! pass; every token records its exact source lexeme and a byte-accurate
//! [`Span`](minic_util::Span), so `source[token.span.start..token.span.end]`
//! always reproduces `token.value`.
//!
//! Two properties the rest of the pipeline relies on:
//!
//! - **Totality.** `lex` never fails. An unrecognized byte produces a
//!   diagnostic plus a one-byte [`TokenKind::Error`] token, and scanning
//!   resumes at the next byte. Unterminated strings and block comments are
//!   reported the same way.
//! - **Determinism.** Lexing the same source twice yields identical token
//!   sequences; there is no state outside the [`Lexer`] value itself.
//!
//! Comments are *kept* in the stream as [`TokenKind::Comment`] tokens (the
//! visual layers want them); token consumers that do not care simply skip
//! that kind. Preprocessor lines (`#...`) are consumed through end-of-line
//! into single [`TokenKind::Preprocessor`] tokens — the semantic analyzer
//! re-scans them for `#include`/`#define` meaning.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

use minic_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Span};

/// Tokenizes `source`, reporting lexical diagnostics into `handler`.
///
/// This is the pipeline entry point used by the driver. The token stream is
/// complete even in the presence of errors: bad input shows up as
/// [`TokenKind::Error`] tokens rather than truncating the stream.
pub fn tokenize(source: &str, handler: &Handler) -> Vec<Token> {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Lexer::new(source, handler).run()
    }));
    match result {
        Ok(tokens) => tokens,
        Err(payload) => {
            handler.emit(
                DiagnosticBuilder::error(format!("lexer failed: {}", panic_message(&payload)))
                    .span(Span::DUMMY)
                    .code(DiagnosticCode::E_INTERNAL)
                    .build(),
            );
            Vec::new()
        }
    }
}

/// Tokenizes `source` without an external handler.
///
/// Diagnostics are folded into the stream as error tokens, so nothing is
/// lost for callers that only look at tokens.
///
/// # Examples
///
/// ```
/// use minic_lex::{lex, TokenKind};
///
/// let tokens = lex("int x = 42;");
/// assert_eq!(tokens[0].kind, TokenKind::Type);
/// assert_eq!(tokens[0].value, "int");
/// ```
pub fn lex(source: &str) -> Vec<Token> {
    let handler = Handler::new();
    tokenize(source, &handler)
}

/// Tokenizes `source` and returns the diagnostics alongside the tokens.
pub fn lex_with_diagnostics(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let handler = Handler::new();
    let tokens = tokenize(source, &handler);
    (tokens, handler.take())
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown internal error".to_string()
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lexing_is_deterministic(source in ".{0,200}") {
            prop_assert_eq!(lex(&source), lex(&source));
        }

        #[test]
        fn spans_reconstruct_values(source in "[ -~\n]{0,200}") {
            for token in lex(&source) {
                prop_assert_eq!(&source[token.span.start..token.span.end], token.value.as_str());
            }
        }

        #[test]
        fn spans_are_ordered_and_disjoint(source in "[ -~\n]{0,200}") {
            let tokens = lex(&source);
            for pair in tokens.windows(2) {
                prop_assert!(pair[0].span.end <= pair[1].span.start);
            }
        }
    }
}
