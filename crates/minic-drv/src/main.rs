//! minicc - CLI front end for the minic pipeline.
//!
//! Reads one C source file, runs the pipeline, and prints the requested
//! artifact. Diagnostics go to stderr; a non-zero exit code means the
//! program had errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use minic_drv::{compile_file, Config, EmitStage, PipelineResult};

/// A pedagogical C-subset compiler front end.
#[derive(Parser, Debug)]
#[command(name = "minicc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lex, parse, analyze, and lower a C subset to TAC and assembly")]
struct Cli {
    /// Source file to compile.
    file: PathBuf,

    /// Which artifact to print.
    #[arg(long, value_enum, default_value_t = Emit::All)]
    emit: Emit,

    /// Print unoptimized TAC/assembly instead of the optimized forms.
    #[arg(long)]
    no_optimize: bool,

    /// Enable debug logging (same as RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
    Symbols,
    Tac,
    Asm,
    All,
}

impl From<Emit> for EmitStage {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Tokens => EmitStage::Tokens,
            Emit::Ast => EmitStage::Ast,
            Emit::Symbols => EmitStage::Symbols,
            Emit::Tac => EmitStage::Tac,
            Emit::Asm => EmitStage::Asm,
            Emit::All => EmitStage::All,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config {
        emit: cli.emit.into(),
        no_optimize: cli.no_optimize,
    };
    let result = compile_file(&cli.file, &config)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    report_diagnostics(&result);
    print_artifacts(&result, &config, cli.emit);

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn report_diagnostics(result: &PipelineResult) {
    for diagnostic in &result.diagnostics {
        if diagnostic.span.line > 0 {
            eprintln!("{} (line {})", diagnostic, diagnostic.span.line);
        } else {
            eprintln!("{}", diagnostic);
        }
    }
    if result.error_count() > 0 {
        eprintln!(
            "{} error(s), {} warning(s)",
            result.error_count(),
            result.warning_count()
        );
    }
}

fn print_artifacts(result: &PipelineResult, config: &Config, emit: Emit) {
    match emit {
        Emit::Tokens => {
            for token in &result.tokens {
                println!(
                    "{}:{} {} {:?}",
                    token.span.line, token.span.column, token.kind, token.value
                );
            }
        }
        Emit::Ast => {
            if let Some(program) = &result.program {
                println!("{:#?}", program);
            }
        }
        Emit::Symbols => print_symbols(result),
        Emit::Tac => {
            if let Some(codegen) = &result.codegen {
                let text = if config.no_optimize {
                    &codegen.intermediate_code
                } else {
                    &codegen.optimized_code
                };
                print!("{}", text);
            }
        }
        Emit::Asm => {
            if let Some(codegen) = &result.codegen {
                let text = if config.no_optimize {
                    &codegen.assembly_code
                } else {
                    &codegen.optimized_assembly_code
                };
                print!("{}", text);
            }
        }
        Emit::All => {
            print_symbols(result);
            if let Some(codegen) = &result.codegen {
                println!("\n=== intermediate code ===");
                print!("{}", codegen.intermediate_code);
                println!("\n=== optimized code ({} passes) ===", codegen.statistics.optimization_passes);
                print!("{}", codegen.optimized_code);
                println!("\n=== assembly ===");
                print!(
                    "{}",
                    if config.no_optimize {
                        &codegen.assembly_code
                    } else {
                        &codegen.optimized_assembly_code
                    }
                );
                println!("\n=== statistics ===");
                println!(
                    "instructions: {} -> {}, temps: {}, labels: {}, headers: {:?}",
                    codegen.statistics.instruction_count,
                    codegen.statistics.optimized_instruction_count,
                    codegen.statistics.temp_variables,
                    codegen.statistics.labels,
                    codegen.statistics.included_headers,
                );
            }
        }
    }
}

fn print_symbols(result: &PipelineResult) {
    let Some(symbols) = &result.symbols else {
        return;
    };
    println!("=== symbols ===");
    for (key, info) in symbols {
        let mut details = format!("{} (scope {}, line {})", info.ty, info.scope, info.line);
        if let Some(params) = &info.params {
            details.push_str(&format!(", params [{}]", params.join(", ")));
        }
        if !info.initialized {
            details.push_str(", uninitialized");
        }
        println!("{:<24} {}", key, details);
    }
}
