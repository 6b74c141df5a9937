//! minic-util - Shared infrastructure for the minic pipeline.
//!
//! Every stage of the pipeline (lexer, parser, semantic analyzer, code
//! generator) reports through the same diagnostic machinery and locates
//! everything with the same [`Span`] type. This crate holds both, plus the
//! typed error enums for misuse of either.
//!
//! Diagnostics are collected, never thrown: a stage pushes into a [`Handler`]
//! and runs to completion, so a single invocation can surface many problems.
//! Severity [`Level::Error`] gates the next pipeline stage; [`Level::Warning`]
//! does not.

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use span::Span;

// Re-export the hash collections used across the pipeline.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
