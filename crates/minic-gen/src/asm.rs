//! x86-64 AT&T assembly emission from TAC.
//!
//! Illustrative output: operands are the TAC places themselves (variable
//! names, temporaries) rather than allocated registers or stack slots, so
//! the text shows the *shape* of real assembly without being assemblable.
//! Numeric literals become immediates (`$5`); everything else stays
//! symbolic.

use indexmap::IndexMap;

use crate::tac::{Instr, Op};

/// Emits an assembly listing for `instrs`.
///
/// When any string literals exist, a `.data` section declares them first.
/// When `has_main` is set, a `_start` stub calls `main` and feeds its
/// return value to the `exit` syscall.
pub fn generate_assembly(
    instrs: &[Instr],
    string_literals: &IndexMap<String, String>,
    has_main: bool,
) -> String {
    let mut asm = AsmEmitter::new();

    if !string_literals.is_empty() {
        asm.directive(".section .data");
        for (label, value) in string_literals {
            asm.line(format!("{}: .string {}", label, value));
        }
        asm.blank();
    }

    asm.directive(".section .text");
    asm.directive(".globl _start");
    asm.blank();

    if has_main {
        asm.line("_start:".to_string());
        asm.ins("call main");
        asm.ins("movq %rax, %rdi");
        asm.ins("movq $60, %rax");
        asm.ins("syscall");
        asm.blank();
    }

    for instr in instrs {
        asm.emit(instr);
    }

    asm.finish()
}

struct AsmEmitter {
    lines: Vec<String>,
}

impl AsmEmitter {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn directive(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn line(&mut self, text: String) {
        self.lines.push(text);
    }

    fn ins(&mut self, text: impl Into<String>) {
        self.lines.push(format!("    {}", text.into()));
    }

    fn comment(&mut self, instr: &Instr) {
        self.lines.push(format!("    # {}", strip_line_number(instr)));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn emit(&mut self, instr: &Instr) {
        match instr.op {
            Op::Label => {
                if let Some(label) = &instr.label {
                    self.line(format!("{}:", label));
                }
            }
            Op::FunctionStart => {
                self.ins("pushq %rbp");
                self.ins("movq %rsp, %rbp");
            }
            Op::FunctionEnd => {
                self.ins("popq %rbp");
                self.ins("ret");
            }
            Op::Return => {
                if let Some(arg1) = &instr.arg1 {
                    self.ins(format!("movq {}, %rax", operand(arg1)));
                }
                self.ins("popq %rbp");
                self.ins("ret");
            }
            Op::Assign => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("movq {}, {}", operand(arg1), result));
                }
            }
            Op::Add | Op::Sub | Op::Mul | Op::And | Op::Or => {
                let mnemonic = match instr.op {
                    Op::Add => "addq",
                    Op::Sub => "subq",
                    Op::Mul => "imulq",
                    Op::And => "andq",
                    _ => "orq",
                };
                if let (Some(arg1), Some(arg2), Some(result)) =
                    (&instr.arg1, &instr.arg2, &instr.result)
                {
                    self.ins(format!("movq {}, %rax", operand(arg1)));
                    self.ins(format!("{} {}, %rax", mnemonic, operand(arg2)));
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::Div | Op::Mod => {
                if let (Some(arg1), Some(arg2), Some(result)) =
                    (&instr.arg1, &instr.arg2, &instr.result)
                {
                    self.ins(format!("movq {}, %rax", operand(arg1)));
                    self.ins("cqo");
                    self.ins(format!("idivq {}", operand(arg2)));
                    let source = if instr.op == Op::Div { "%rax" } else { "%rdx" };
                    self.ins(format!("movq {}, {}", source, result));
                }
            }
            Op::Eq | Op::Ne | Op::Lt | Op::Gt | Op::Le | Op::Ge => {
                let set = match instr.op {
                    Op::Eq => "sete",
                    Op::Ne => "setne",
                    Op::Lt => "setl",
                    Op::Gt => "setg",
                    Op::Le => "setle",
                    _ => "setge",
                };
                if let (Some(arg1), Some(arg2), Some(result)) =
                    (&instr.arg1, &instr.arg2, &instr.result)
                {
                    self.ins(format!("movq {}, %rax", operand(arg1)));
                    self.ins(format!("cmpq {}, %rax", operand(arg2)));
                    self.ins(format!("{} %al", set));
                    self.ins("movzbq %al, %rax");
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::Neg => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("movq {}, %rax", operand(arg1)));
                    self.ins("negq %rax");
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::Not => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("cmpq $0, {}", operand(arg1)));
                    self.ins("sete %al");
                    self.ins("movzbq %al, %rax");
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::Addr => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("leaq {}, %rax", arg1));
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::Deref => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("movq ({}), %rax", arg1));
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            Op::IfFalse => {
                if let (Some(arg1), Some(result)) = (&instr.arg1, &instr.result) {
                    self.ins(format!("cmpq $0, {}", operand(arg1)));
                    self.ins(format!("je {}", result));
                }
            }
            Op::Goto => {
                if let Some(result) = &instr.result {
                    self.ins(format!("jmp {}", result));
                }
            }
            Op::Call => {
                if let Some(arg1) = &instr.arg1 {
                    self.ins(format!("call {}", arg1));
                }
                if let Some(result) = &instr.result {
                    self.ins(format!("movq %rax, {}", result));
                }
            }
            // No machine counterpart: kept as comments so the listing
            // still tells the whole story.
            Op::Param | Op::ParamDecl | Op::Declare | Op::Include => self.comment(instr),
        }
    }
}

/// Formats a TAC place as an assembly operand: numeric literals become
/// immediates, everything else stays a symbolic name.
fn operand(place: &str) -> String {
    if place.parse::<f64>().is_ok() {
        format!("${}", place)
    } else {
        place.to_string()
    }
}

fn strip_line_number(instr: &Instr) -> String {
    let rendered = instr.to_string();
    match rendered.split_once(": ") {
        Some((_, rest)) => rest.to_string(),
        None => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_strings() -> IndexMap<String, String> {
        IndexMap::new()
    }

    #[test]
    fn test_start_stub_when_main_exists() {
        let asm = generate_assembly(&[Instr::label("main")], &no_strings(), true);
        assert!(asm.contains(".globl _start"));
        assert!(asm.contains("_start:"));
        assert!(asm.contains("    call main"));
        assert!(asm.contains("    movq %rax, %rdi"));
        assert!(asm.contains("    movq $60, %rax"));
        assert!(asm.contains("    syscall"));
    }

    #[test]
    fn test_no_stub_without_main() {
        let asm = generate_assembly(&[], &no_strings(), false);
        assert!(!asm.contains("_start:"));
        assert!(asm.contains(".globl _start"));
    }

    #[test]
    fn test_data_section_for_strings() {
        let mut strings = IndexMap::new();
        strings.insert("str0".to_string(), "\"hi\"".to_string());
        let asm = generate_assembly(&[], &strings, false);
        assert!(asm.contains(".section .data"));
        assert!(asm.contains("str0: .string \"hi\""));
    }

    #[test]
    fn test_no_data_section_without_strings() {
        let asm = generate_assembly(&[], &no_strings(), false);
        assert!(!asm.contains(".section .data"));
    }

    #[test]
    fn test_function_frame() {
        let instrs = vec![
            Instr::label("main"),
            Instr::new(Op::FunctionStart, Some("main".into()), None, None),
            Instr::new(Op::Return, Some("0".into()), None, None),
            Instr::new(Op::FunctionEnd, Some("main".into()), None, None),
        ];
        let asm = generate_assembly(&instrs, &no_strings(), true);
        assert!(asm.contains("main:"));
        assert!(asm.contains("    pushq %rbp"));
        assert!(asm.contains("    movq %rsp, %rbp"));
        assert!(asm.contains("    movq $0, %rax"));
        assert!(asm.contains("    popq %rbp"));
        assert!(asm.contains("    ret"));
    }

    #[test]
    fn test_arithmetic_shape() {
        let instrs = vec![Instr::new(
            Op::Add,
            Some("a".into()),
            Some("2".into()),
            Some("t0".into()),
        )];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    movq a, %rax"));
        assert!(asm.contains("    addq $2, %rax"));
        assert!(asm.contains("    movq %rax, t0"));
    }

    #[test]
    fn test_division_emits_cqo() {
        let instrs = vec![Instr::new(
            Op::Div,
            Some("a".into()),
            Some("b".into()),
            Some("t0".into()),
        )];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    cqo"));
        assert!(asm.contains("    idivq b"));
        assert!(asm.contains("    movq %rax, t0"));
    }

    #[test]
    fn test_modulo_takes_rdx() {
        let instrs = vec![Instr::new(
            Op::Mod,
            Some("a".into()),
            Some("b".into()),
            Some("t0".into()),
        )];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    movq %rdx, t0"));
    }

    #[test]
    fn test_comparison_setcc() {
        let instrs = vec![Instr::new(
            Op::Lt,
            Some("a".into()),
            Some("b".into()),
            Some("t0".into()),
        )];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    cmpq b, %rax"));
        assert!(asm.contains("    setl %al"));
        assert!(asm.contains("    movzbq %al, %rax"));
    }

    #[test]
    fn test_branching() {
        let instrs = vec![
            Instr::new(Op::IfFalse, Some("t0".into()), None, Some("IF_END0".into())),
            Instr::new(Op::Goto, None, None, Some("WHILE_START0".into())),
        ];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    cmpq $0, t0"));
        assert!(asm.contains("    je IF_END0"));
        assert!(asm.contains("    jmp WHILE_START0"));
    }

    #[test]
    fn test_call_moves_result() {
        let instrs = vec![Instr::new(
            Op::Call,
            Some("add".into()),
            Some("2".into()),
            Some("t0".into()),
        )];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    call add"));
        assert!(asm.contains("    movq %rax, t0"));
    }

    #[test]
    fn test_bookkeeping_ops_become_comments() {
        let instrs = vec![
            Instr::new(Op::Declare, Some("x".into()), None, None),
            Instr::new(Op::Param, Some("t0".into()), None, None),
            Instr::new(Op::Include, Some("stdio.h".into()), None, None),
        ];
        let asm = generate_assembly(&instrs, &no_strings(), false);
        assert!(asm.contains("    # DECLARE x"));
        assert!(asm.contains("    # PARAM t0"));
        assert!(asm.contains("    # INCLUDE stdio.h"));
    }
}
