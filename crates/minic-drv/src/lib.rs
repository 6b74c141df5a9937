//! minic-drv - Pipeline driver.
//!
//! Runs the four stages in order, aggregating diagnostics:
//!
//! ```text
//! source ──▶ [lex] ──▶ tokens ──▶ [parse] ──▶ AST ──▶ [analyze] ──▶ symbols
//!                                                          │
//!                                                          ▼
//!                                    TAC / optimized TAC / assembly ◀── [generate]
//! ```
//!
//! Gating follows diagnostic severity: any error-level diagnostic from a
//! stage stops the stages after it; warnings flow through. Every stage's
//! diagnostics end up in [`PipelineResult::diagnostics`], in pipeline
//! order, so a caller sees everything one run could find.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use minic_gen::CodegenOutput;
use minic_lex::Token;
use minic_par::ast::Program;
use minic_sem::SymbolInfo;
use minic_util::{Diagnostic, Handler, Level};

/// How far the pipeline should run and what the CLI prints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmitStage {
    /// Stop after the lexer.
    Tokens,
    /// Stop after the parser.
    Ast,
    /// Stop after semantic analysis.
    Symbols,
    /// Run everything, print the TAC.
    Tac,
    /// Run everything, print the assembly.
    Asm,
    /// Run everything, print every artifact.
    #[default]
    All,
}

/// Driver configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub emit: EmitStage,
    /// Print the unoptimized artifacts instead of the optimized ones.
    pub no_optimize: bool,
}

/// Errors of the driver itself (not of the compiled program).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: String,
        source: std::io::Error,
    },
}

/// Output of one pipeline run. Stages that were gated off (or not
/// requested) are `None`.
#[derive(Debug)]
pub struct PipelineResult {
    pub tokens: Vec<Token>,
    pub program: Option<Program>,
    pub symbols: Option<IndexMap<String, SymbolInfo>>,
    pub codegen: Option<CodegenOutput>,
    /// All diagnostics from all stages, in pipeline order.
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineResult {
    /// True if any stage reported an error-level diagnostic.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }
}

/// Runs the full pipeline with the default configuration.
///
/// # Examples
///
/// ```
/// let result = minic_drv::compile("int main() { return 0; }");
/// assert!(!result.has_errors());
/// assert!(result.codegen.is_some());
/// ```
pub fn compile(source: &str) -> PipelineResult {
    compile_with(source, &Config::default())
}

/// Reads `path` and runs the pipeline on its contents.
pub fn compile_file(path: &std::path::Path, config: &Config) -> Result<PipelineResult, DriverError> {
    let source = std::fs::read_to_string(path).map_err(|source| DriverError::ReadInput {
        path: path.display().to_string(),
        source,
    })?;
    Ok(compile_with(&source, config))
}

/// Runs the pipeline up to `config.emit`, gating on error severity.
pub fn compile_with(source: &str, config: &Config) -> PipelineResult {
    let handler = Handler::new();

    debug!(bytes = source.len(), "lexing");
    let tokens = minic_lex::tokenize(source, &handler);
    debug!(tokens = tokens.len(), "lexed");

    let mut result = PipelineResult {
        tokens,
        program: None,
        symbols: None,
        codegen: None,
        diagnostics: Vec::new(),
    };

    if config.emit == EmitStage::Tokens || handler.has_errors() {
        result.diagnostics = drain(&handler, source);
        return result;
    }

    debug!("parsing");
    let program = minic_par::run_parser(result.tokens.clone(), &handler);
    result.program = Some(program);

    if config.emit == EmitStage::Ast || handler.has_errors() {
        result.diagnostics = drain(&handler, source);
        return result;
    }

    debug!("semantic analysis");
    let table = {
        let program = result.program.as_ref().expect("parsed above");
        minic_sem::run_analyzer(program, source, &handler)
    };
    result.symbols = Some(table.display());

    if config.emit == EmitStage::Symbols || handler.has_errors() {
        result.diagnostics = drain(&handler, source);
        return result;
    }

    debug!("code generation");
    let output = {
        let program = result.program.as_ref().expect("parsed above");
        minic_gen::generate(program, &table)
    };
    for diagnostic in &output.errors {
        handler.emit(diagnostic.clone());
    }
    result.codegen = Some(output);

    result.diagnostics = drain(&handler, source);
    result
}

/// Drains the handler, filling in source snippets for diagnostics whose
/// reporting stage did not attach one.
fn drain(handler: &Handler, source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = handler.take();
    for diagnostic in &mut diagnostics {
        if diagnostic.snippet.is_none() && !diagnostic.span.is_empty() {
            diagnostic.snippet = diagnostic
                .span
                .slice(source)
                .ok()
                .map(|text| text.to_string());
        }
    }
    diagnostics
}
