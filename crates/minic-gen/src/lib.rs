//! minic-gen - Code generation for the C subset.
//!
//! The back end of the pipeline. From the (assumed error-free) AST and the
//! symbol table it produces four artifacts plus statistics:
//!
//! 1. raw three-address code ([`tac`], lowered by [`lower`]);
//! 2. optimized TAC (peephole fixed point, [`opt`]);
//! 3. an AT&T x86-64 assembly listing for each of the two sequences
//!    ([`asm`] — illustrative, operands stay symbolic);
//! 4. an opcode-annotated machine-code listing ([`encode`] — explicitly
//!    not a real encoder).
//!
//! Counters for temporaries, labels, and string literals are local to one
//! [`generate`] invocation, so generation is deterministic.

pub mod asm;
pub mod encode;
pub mod lower;
pub mod opt;
pub mod tac;

pub use lower::CodeGenerator;
pub use tac::{format_tac, Instr, Op};

use indexmap::IndexMap;
use minic_par::ast::Program;
use minic_sem::SymbolTable;
use minic_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Span};

/// Counters describing one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodegenStats {
    pub instruction_count: usize,
    pub optimized_instruction_count: usize,
    pub temp_variables: u32,
    pub labels: usize,
    pub optimization_passes: u32,
    pub included_headers: Vec<String>,
}

/// Everything the code generator produces.
#[derive(Debug)]
pub struct CodegenOutput {
    /// Raw TAC instruction sequence.
    pub tac: Vec<Instr>,
    /// Optimized TAC instruction sequence.
    pub optimized_tac: Vec<Instr>,
    /// Raw TAC as display text.
    pub intermediate_code: String,
    /// Optimized TAC as display text.
    pub optimized_code: String,
    /// Assembly emitted from the raw TAC.
    pub assembly_code: String,
    /// Assembly emitted from the optimized TAC.
    pub optimized_assembly_code: String,
    /// Opcode-annotated listing of the optimized assembly (illustrative).
    pub machine_code: String,
    /// `str{N}` label → quoted literal text, in interning order.
    pub string_literals: IndexMap<String, String>,
    pub statistics: CodegenStats,
    pub errors: Vec<Diagnostic>,
}

/// Generates all back-end artifacts for `program`.
///
/// `symbols` is the analyzer's table; it decides whether a `_start` stub
/// is emitted (a `main` function must exist). Never panics — internal
/// faults become a single `"code generator failed: ..."` diagnostic with
/// empty artifacts.
///
/// # Examples
///
/// ```
/// use minic_lex::lex;
/// use minic_par::parse;
/// use minic_sem::run_analyzer;
/// use minic_util::Handler;
///
/// let source = "int main() { return 0; }";
/// let parsed = parse(lex(source));
/// let handler = Handler::new();
/// let symbols = run_analyzer(&parsed.program, source, &handler);
///
/// let output = minic_gen::generate(&parsed.program, &symbols);
/// assert!(output.intermediate_code.contains("main:"));
/// ```
pub fn generate(program: &Program, symbols: &SymbolTable) -> CodegenOutput {
    let handler = Handler::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run_codegen(program, symbols, &handler)
    }));
    match result {
        Ok(mut output) => {
            output.errors = handler.take();
            output
        }
        Err(payload) => {
            handler.emit(
                DiagnosticBuilder::error(format!(
                    "code generator failed: {}",
                    panic_message(&payload)
                ))
                .span(Span::DUMMY)
                .code(DiagnosticCode::E_INTERNAL)
                .build(),
            );
            CodegenOutput {
                tac: Vec::new(),
                optimized_tac: Vec::new(),
                intermediate_code: String::new(),
                optimized_code: String::new(),
                assembly_code: String::new(),
                optimized_assembly_code: String::new(),
                machine_code: String::new(),
                string_literals: IndexMap::new(),
                statistics: CodegenStats::default(),
                errors: handler.take(),
            }
        }
    }
}

fn run_codegen(program: &Program, symbols: &SymbolTable, handler: &Handler) -> CodegenOutput {
    let lowered = CodeGenerator::new(handler).lower(program);
    let (optimized_tac, passes) = opt::optimize(&lowered.instrs);

    let has_main = symbols.lookup_function("main").is_some();
    let assembly_code = asm::generate_assembly(&lowered.instrs, &lowered.string_literals, has_main);
    let optimized_assembly_code =
        asm::generate_assembly(&optimized_tac, &lowered.string_literals, has_main);
    let machine_code = encode::annotate_machine_code(&optimized_assembly_code);

    let statistics = CodegenStats {
        instruction_count: lowered.instrs.len(),
        optimized_instruction_count: optimized_tac.len(),
        temp_variables: lowered.temp_variables,
        labels: lowered.instrs.iter().filter(|i| i.is_label()).count(),
        optimization_passes: passes,
        included_headers: lowered.included_headers.clone(),
    };

    CodegenOutput {
        intermediate_code: format_tac(&lowered.instrs),
        optimized_code: format_tac(&optimized_tac),
        tac: lowered.instrs,
        optimized_tac,
        assembly_code,
        optimized_assembly_code,
        machine_code,
        string_literals: lowered.string_literals,
        statistics,
        errors: Vec::new(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown internal error".to_string()
    }
}
