//! Diagnostic reporting infrastructure.
//!
//! Stages never abort on bad input. Instead they push [`Diagnostic`]s into a
//! shared [`Handler`] and keep going, so one run surfaces as many problems as
//! it can find. Each diagnostic carries a severity [`Level`], a [`Span`], an
//! optional [`DiagnosticCode`], and optional prose (`description`, `snippet`)
//! for display layers that want more than the one-line message.
//!
//! # Examples
//!
//! ```
//! use minic_util::{DiagnosticBuilder, DiagnosticCode, Handler, Span};
//!
//! let handler = Handler::new();
//! DiagnosticBuilder::error("expected ';'")
//!     .span(Span::new(12, 13, 2, 7))
//!     .code(DiagnosticCode::E_PARSER_EXPECTED_TOKEN)
//!     .emit(&handler);
//!
//! assert!(handler.has_errors());
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::span::Span;

/// Diagnostic severity level.
///
/// `Error` blocks the downstream pipeline stages; `Warning` does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// A problem that prevents later stages from running.
    Error,
    /// A problem worth reporting that does not stop the pipeline.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A unique code identifying a diagnostic message.
///
/// Codes follow the format `{prefix}{number:04}`: "E" for errors, "W" for
/// warnings, with the thousands digit naming the stage that produced it
/// (1 lexer, 2 parser, 3 semantic, 4 codegen).
///
/// # Examples
///
/// ```
/// use minic_util::DiagnosticCode;
///
/// assert_eq!(DiagnosticCode::E_LEXER_UNEXPECTED_CHAR.as_str(), "E1001");
/// assert_eq!(DiagnosticCode::W_UNUSED_VARIABLE.prefix, "W");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// "E" for errors, "W" for warnings.
    pub prefix: &'static str,
    /// Numeric identifier, unique within the prefix.
    pub number: u32,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    /// The full code string, e.g. `"E1001"`.
    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // =========================================================================
    // LEXER (E1xxx)
    // =========================================================================

    /// E1001: unrecognized character in the input.
    pub const E_LEXER_UNEXPECTED_CHAR: Self = Self::new("E", 1001);
    /// E1002: string or character literal missing its closing quote.
    pub const E_LEXER_UNTERMINATED_STRING: Self = Self::new("E", 1002);
    /// E1003: block comment missing its closing `*/`.
    pub const E_LEXER_UNTERMINATED_COMMENT: Self = Self::new("E", 1003);

    // =========================================================================
    // PARSER (E2xxx)
    // =========================================================================

    /// E2001: the parser saw a token it cannot start a construct with.
    pub const E_PARSER_UNEXPECTED_TOKEN: Self = Self::new("E", 2001);
    /// E2002: a specific token was expected but something else was found.
    pub const E_PARSER_EXPECTED_TOKEN: Self = Self::new("E", 2002);
    /// E2003: the token stream ended mid-construct.
    pub const E_PARSER_UNEXPECTED_EOF: Self = Self::new("E", 2003);

    // =========================================================================
    // SEMANTIC (E3xxx / W3xxx)
    // =========================================================================

    /// E3001: a name was declared twice in the same scope.
    pub const E_SEM_REDECLARATION: Self = Self::new("E", 3001);
    /// E3002: a called function resolves to nothing.
    pub const E_SEM_UNDEFINED_FUNCTION: Self = Self::new("E", 3002);
    /// E3003: call argument count does not match the declaration.
    pub const E_SEM_ARITY_MISMATCH: Self = Self::new("E", 3003);
    /// E3004: incompatible types in an assignment or argument.
    pub const E_SEM_TYPE_MISMATCH: Self = Self::new("E", 3004);
    /// E3005: `break` or `continue` outside any loop.
    pub const E_SEM_OUTSIDE_LOOP: Self = Self::new("E", 3005);
    /// E3006: the program declares things but has no `main`.
    pub const E_SEM_MISSING_MAIN: Self = Self::new("E", 3006);
    /// E3007: a variable was read before any value was assigned to it.
    pub const E_SEM_UNINITIALIZED: Self = Self::new("E", 3007);
    /// E3008: an identifier reference resolves to nothing.
    pub const E_SEM_UNDEFINED_VARIABLE: Self = Self::new("E", 3008);
    /// W3001: a variable is declared but never read.
    pub const W_UNUSED_VARIABLE: Self = Self::new("W", 3001);

    // =========================================================================
    // CODEGEN (E4xxx)
    // =========================================================================

    /// E4001: an operator with no three-address counterpart.
    pub const E_GEN_UNSUPPORTED_OP: Self = Self::new("E", 4001);
    /// E4002: `break` or `continue` lowered outside any loop frame.
    pub const E_GEN_OUTSIDE_LOOP: Self = Self::new("E", 4002);

    // =========================================================================
    // INTERNAL (E9xxx)
    // =========================================================================

    /// E9001: a stage hit an unexpected internal fault and bailed out.
    pub const E_INTERNAL: Self = Self::new("E", 9001);
}

impl fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticCode({})", self.as_str())
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A diagnostic message with severity and location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// One-line message.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// Stable code for the message category.
    pub code: Option<DiagnosticCode>,
    /// Longer prose explaining the problem, when the one-liner is not enough.
    pub description: Option<String>,
    /// The offending source text, when the reporting stage had it at hand.
    pub snippet: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given level.
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            description: None,
            snippet: None,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// The line the diagnostic points at.
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.level, code, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Fluent builder for diagnostics.
///
/// # Examples
///
/// ```
/// use minic_util::{DiagnosticBuilder, DiagnosticCode, Handler, Span};
///
/// let handler = Handler::new();
/// DiagnosticBuilder::warning("Unused variable 'x'")
///     .span(Span::DUMMY)
///     .code(DiagnosticCode::W_UNUSED_VARIABLE)
///     .description("'x' is declared but its value is never read")
///     .emit(&handler);
/// ```
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    /// Starts building an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::error(message, Span::DUMMY),
        }
    }

    /// Starts building a warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::warning(message, Span::DUMMY),
        }
    }

    /// Sets the source location.
    pub fn span(mut self, span: Span) -> Self {
        self.diagnostic.span = span;
        self
    }

    /// Sets the diagnostic code.
    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.diagnostic.code = Some(code);
        self
    }

    /// Attaches a longer prose description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.diagnostic.description = Some(description.into());
        self
    }

    /// Attaches the offending source text.
    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.diagnostic.snippet = Some(snippet.into());
        self
    }

    /// Finishes building without emitting.
    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }

    /// Emits the diagnostic into `handler`.
    pub fn emit(self, handler: &Handler) {
        handler.emit(self.diagnostic);
    }
}

/// Collects diagnostics for one pipeline stage (or one whole run).
///
/// Interior mutability lets borrowing stages report without threading
/// `&mut` through every recursive call.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Returns true if any error-level diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// A snapshot of every diagnostic emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drains and returns every diagnostic, leaving the handler empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}
