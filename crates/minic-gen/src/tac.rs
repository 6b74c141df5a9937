//! Three-address code: instruction model and text rendering.
//!
//! Each instruction has at most one operation, up to two source operands,
//! and one destination. `LABEL` instructions carry only a label name.
//! Operands are plain strings: variable names, `t{N}` temporaries,
//! `str{N}` string labels, or literal text.

use std::fmt;

/// TAC operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Addr,
    Deref,
    IfFalse,
    Goto,
    Label,
    Call,
    Param,
    Return,
    Declare,
    ParamDecl,
    FunctionStart,
    FunctionEnd,
    Include,
}

impl Op {
    /// The rendered mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Assign => "ASSIGN",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::Neg => "NEG",
            Op::Not => "NOT",
            Op::Eq => "EQ",
            Op::Ne => "NE",
            Op::Lt => "LT",
            Op::Gt => "GT",
            Op::Le => "LE",
            Op::Ge => "GE",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Addr => "ADDR",
            Op::Deref => "DEREF",
            Op::IfFalse => "IF_FALSE",
            Op::Goto => "GOTO",
            Op::Label => "LABEL",
            Op::Call => "CALL",
            Op::Param => "PARAM",
            Op::Return => "RETURN",
            Op::Declare => "DECLARE",
            Op::ParamDecl => "PARAM_DECL",
            Op::FunctionStart => "FUNCTION_START",
            Op::FunctionEnd => "FUNCTION_END",
            Op::Include => "INCLUDE",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// One TAC instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Instr {
    pub op: Op,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
    pub result: Option<String>,
    /// Label name, for `LABEL` instructions only.
    pub label: Option<String>,
    /// Sequence number within the instruction list.
    pub line: u32,
}

impl Instr {
    /// A non-label instruction.
    pub fn new(
        op: Op,
        arg1: Option<String>,
        arg2: Option<String>,
        result: Option<String>,
    ) -> Self {
        Self {
            op,
            arg1,
            arg2,
            result,
            label: None,
            line: 0,
        }
    }

    /// A `LABEL` instruction.
    pub fn label(name: impl Into<String>) -> Self {
        Self {
            op: Op::Label,
            arg1: None,
            arg2: None,
            result: None,
            label: Some(name.into()),
            line: 0,
        }
    }

    pub fn is_label(&self) -> bool {
        self.op == Op::Label
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            return write!(f, "{}:", label);
        }
        write!(f, "{}: {}", self.line, self.op)?;
        if let Some(arg1) = &self.arg1 {
            write!(f, " {}", arg1)?;
        }
        if let Some(arg2) = &self.arg2 {
            write!(f, " {}", arg2)?;
        }
        if let Some(result) = &self.result {
            write!(f, " -> {}", result)?;
        }
        Ok(())
    }
}

/// Renders an instruction sequence as multi-line text: `label:` lines for
/// labels, `N: OP ARG1 ARG2 -> RESULT` for everything else.
pub fn format_tac(instrs: &[Instr]) -> String {
    let mut out = String::new();
    for instr in instrs {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

/// Rewrites the sequence numbers to match the current positions. Used
/// after optimization drops instructions.
pub fn renumber(instrs: &mut [Instr]) {
    for (index, instr) in instrs.iter_mut().enumerate() {
        instr.line = index as u32;
    }
}
