//! Pipeline edge cases: recovery, gating, and hostile input.

use minic_drv::{compile, compile_with, Config, EmitStage};
use minic_util::Level;

#[test]
fn empty_source() {
    let result = compile("");
    assert!(!result.has_errors());
    assert!(result.tokens.is_empty());
    assert!(result.codegen.is_some());
    assert_eq!(
        result.codegen.as_ref().unwrap().statistics.instruction_count,
        0
    );
}

#[test]
fn whitespace_and_comments_only() {
    let result = compile("  /* nothing */  // here\n");
    assert!(!result.has_errors());
}

#[test]
fn lexical_garbage_reports_and_gates() {
    let result = compile("int x = @;");
    assert!(result.has_errors());
    // The lexer still produced the surrounding tokens.
    assert!(result.tokens.iter().any(|t| t.value == "x"));
    assert!(result.program.is_none());
}

#[test]
fn parser_survives_deeply_broken_input() {
    let result = compile("int main() { if (x { while } return ;;; }");
    assert!(result.has_errors());
    // Finite error list, parse completed.
    assert!(result.error_count() < 50);
    assert!(result.program.is_some());
}

#[test]
fn multiple_errors_surface_in_one_run() {
    let result = compile(
        "int main() { int a; int b = a; foo(); return bar; }",
    );
    let messages: Vec<&String> = result.diagnostics.iter().map(|d| &d.message).collect();
    assert!(messages.iter().any(|m| m.contains("used before initialization")));
    assert!(messages.iter().any(|m| m.contains("undefined function 'foo'")));
    assert!(messages.iter().any(|m| m.contains("Undefined variable 'bar'")));
}

#[test]
fn unused_warning_plus_clean_codegen() {
    let result = compile("int main() { int unused_one = 1; return 0; }");
    assert_eq!(result.error_count(), 0);
    assert_eq!(result.warning_count(), 1);
    // Warnings must not block the back end.
    let codegen = result.codegen.as_ref().unwrap();
    assert!(codegen.intermediate_code.contains("DECLARE unused_one"));
}

#[test]
fn missing_main_blocks_codegen() {
    let result = compile("int helper() { return 1; }");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.level == Level::Error && d.message == "No 'main' function found"));
    assert!(result.codegen.is_none());
}

#[test]
fn diagnostics_carry_lines_and_codes() {
    let result = compile("int main() {\n  foo();\n  return 0;\n}");
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.message.contains("foo"))
        .unwrap();
    assert_eq!(diag.span.line, 2);
    assert!(diag.code.is_some());
    assert!(diag.description.is_some());
}

#[test]
fn emit_stages_stop_where_asked() {
    let source = "int main() { return 0; }";

    let tokens_only = compile_with(
        source,
        &Config {
            emit: EmitStage::Tokens,
            ..Config::default()
        },
    );
    assert!(tokens_only.program.is_none());

    let ast_only = compile_with(
        source,
        &Config {
            emit: EmitStage::Ast,
            ..Config::default()
        },
    );
    assert!(ast_only.program.is_some());
    assert!(ast_only.symbols.is_none());
}

#[test]
fn scope_isolation_end_to_end() {
    let result = compile("int main() { { int inner = 1; } return inner; }");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message == "Undefined variable 'inner'"));
}

#[test]
fn nested_loops_break_targets_inner() {
    let result = compile(
        "int main() { while (1) { while (1) { break; } break; } return 0; }",
    );
    assert!(!result.has_errors());
    let tac = &result.codegen.as_ref().unwrap().tac;

    // Outer loop gets id 0, inner gets id 1; the first break (inner) must
    // target WHILE_END1, the second WHILE_END0.
    let targets: Vec<&str> = tac
        .iter()
        .filter(|i| i.op == minic_gen::Op::Goto)
        .filter_map(|i| i.result.as_deref())
        .filter(|t| t.starts_with("WHILE_END"))
        .collect();
    assert_eq!(targets, vec!["WHILE_END1", "WHILE_END0"]);
}

#[test]
fn repeated_runs_are_identical() {
    let source = r#"
int fib(int n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}

int main() {
    return fib(10);
}
"#;
    let first = compile(source);
    let second = compile(source);
    assert_eq!(first.diagnostics.len(), second.diagnostics.len());
    assert_eq!(
        first.codegen.as_ref().unwrap().optimized_code,
        second.codegen.as_ref().unwrap().optimized_code
    );
    assert_eq!(
        first.codegen.as_ref().unwrap().statistics,
        second.codegen.as_ref().unwrap().statistics
    );
}
