//! AST → TAC lowering.
//!
//! The generator walks the (assumed error-free) AST and appends
//! instructions. Every binary operation lands in a fresh `t{N}` temporary;
//! control flow uses the exact label discipline below, one counter id per
//! construct:
//!
//! - `if (c) S` → `IF_FALSE c → IF_END{n}; S; IF_END{n}:`
//! - `if (c) S else T` → `IF_FALSE c → IF_ELSE{n}; S; GOTO IF_END{n};
//!   IF_ELSE{n}:; T; IF_END{n}:`
//! - `while (c) S` → `WHILE_START{n}:; IF_FALSE c → WHILE_END{n}; S;
//!   GOTO WHILE_START{n}; WHILE_END{n}:`
//! - `for (i; c; u) S` → `i; FOR_START{n}:; IF_FALSE c → FOR_END{n}; S;
//!   FOR_CONTINUE{n}:; u; GOTO FOR_START{n}; FOR_END{n}:`
//!
//! A stack of loop frames gives `break`/`continue` their targets; outside
//! any loop they are diagnostics, not panics.

use indexmap::IndexMap;
use minic_util::{DiagnosticBuilder, DiagnosticCode, Handler, Span};

use minic_par::ast::{
    Block, Expr, ForInit, Function, Item, LiteralKind, Program, Stmt, UnOp, VariableDecl,
};

use crate::tac::{Instr, Op};

/// Labels of the enclosing loop, for `break`/`continue` lowering.
#[derive(Clone, Debug)]
struct LoopFrame {
    start: String,
    continue_label: String,
    end: String,
}

/// Stateful lowering context. Counters are per-invocation, so the same AST
/// always lowers to the same TAC.
pub struct CodeGenerator<'h> {
    handler: &'h Handler,
    instrs: Vec<Instr>,
    temp_counter: u32,
    label_counter: u32,
    string_literals: IndexMap<String, String>,
    string_counter: u32,
    loop_stack: Vec<LoopFrame>,
    included_headers: Vec<String>,
}

/// Everything the lowering pass produces.
pub struct Lowered {
    pub instrs: Vec<Instr>,
    pub string_literals: IndexMap<String, String>,
    pub temp_variables: u32,
    pub included_headers: Vec<String>,
}

impl<'h> CodeGenerator<'h> {
    pub fn new(handler: &'h Handler) -> Self {
        Self {
            handler,
            instrs: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
            string_literals: IndexMap::new(),
            string_counter: 0,
            loop_stack: Vec::new(),
            included_headers: Vec::new(),
        }
    }

    /// Lowers a whole program.
    pub fn lower(mut self, program: &Program) -> Lowered {
        for item in &program.body {
            self.gen_item(item);
        }
        crate::tac::renumber(&mut self.instrs);
        Lowered {
            instrs: self.instrs,
            string_literals: self.string_literals,
            temp_variables: self.temp_counter,
            included_headers: self.included_headers,
        }
    }

    fn emit(&mut self, op: Op, arg1: Option<String>, arg2: Option<String>, result: Option<String>) {
        let mut instr = Instr::new(op, arg1, arg2, result);
        instr.line = self.instrs.len() as u32;
        self.instrs.push(instr);
    }

    fn emit_label(&mut self, name: &str) {
        let mut instr = Instr::label(name);
        instr.line = self.instrs.len() as u32;
        self.instrs.push(instr);
    }

    fn new_temp(&mut self) -> String {
        let temp = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        temp
    }

    /// One id per control construct; the construct's whole label family
    /// shares it, which keeps every emitted label unique.
    fn new_label_id(&mut self) -> u32 {
        let id = self.label_counter;
        self.label_counter += 1;
        id
    }

    fn report(&self, code: DiagnosticCode, message: String, span: Span) {
        DiagnosticBuilder::error(message)
            .span(span)
            .code(code)
            .emit(self.handler);
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    fn gen_item(&mut self, item: &Item) {
        match item {
            Item::Include(include) => {
                self.included_headers.push(include.header.clone());
                self.emit(Op::Include, Some(include.header.clone()), None, None);
            }
            Item::Directive(_) | Item::Typedef(_) => {}
            Item::Variable(decl) => self.gen_var_decl(decl),
            Item::Function(function) => self.gen_function(function),
        }
    }

    fn gen_function(&mut self, function: &Function) {
        let Some(body) = &function.body else {
            return; // prototypes produce no code
        };
        let name = function.name.name.clone();

        self.emit_label(&name);
        self.emit(Op::FunctionStart, Some(name.clone()), None, None);
        for param in &function.params {
            self.emit(Op::ParamDecl, Some(param.name.name.clone()), None, None);
        }
        self.gen_block(body);
        self.emit(Op::FunctionEnd, Some(name), None, None);
    }

    fn gen_var_decl(&mut self, decl: &VariableDecl) {
        for declarator in &decl.declarators {
            let name = declarator.name.name.clone();
            self.emit(Op::Declare, Some(name.clone()), None, None);
            if let Some(init) = &declarator.init {
                let value = self.gen_expr(init);
                self.emit(Op::Assign, Some(value), None, Some(name));
            }
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn gen_block(&mut self, block: &Block) {
        for stmt in &block.body {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.gen_block(block),
            Stmt::Decl(decl) => self.gen_var_decl(decl),
            Stmt::Expr(s) => {
                self.gen_expr(&s.expression);
            }
            Stmt::Return(s) => {
                let value = s.argument.as_ref().map(|argument| self.gen_expr(argument));
                self.emit(Op::Return, value, None, None);
            }
            Stmt::If(s) => self.gen_if(s),
            Stmt::While(s) => self.gen_while(s),
            Stmt::For(s) => self.gen_for(s),
            Stmt::Break(span) => match self.loop_stack.last().cloned() {
                Some(frame) => self.emit(Op::Goto, None, None, Some(frame.end)),
                None => self.report(
                    DiagnosticCode::E_GEN_OUTSIDE_LOOP,
                    "'break' used outside of a loop".to_string(),
                    *span,
                ),
            },
            Stmt::Continue(span) => match self.loop_stack.last().cloned() {
                Some(frame) => self.emit(Op::Goto, None, None, Some(frame.continue_label)),
                None => self.report(
                    DiagnosticCode::E_GEN_OUTSIDE_LOOP,
                    "'continue' used outside of a loop".to_string(),
                    *span,
                ),
            },
            Stmt::Empty(_) => {}
        }
    }

    fn gen_if(&mut self, s: &minic_par::ast::IfStmt) {
        let condition = self.gen_expr(&s.test);
        let id = self.new_label_id();

        match &s.alternate {
            None => {
                let end = format!("IF_END{}", id);
                self.emit(Op::IfFalse, Some(condition), None, Some(end.clone()));
                self.gen_stmt(&s.consequent);
                self.emit_label(&end);
            }
            Some(alternate) => {
                let else_label = format!("IF_ELSE{}", id);
                let end = format!("IF_END{}", id);
                self.emit(Op::IfFalse, Some(condition), None, Some(else_label.clone()));
                self.gen_stmt(&s.consequent);
                self.emit(Op::Goto, None, None, Some(end.clone()));
                self.emit_label(&else_label);
                self.gen_stmt(alternate);
                self.emit_label(&end);
            }
        }
    }

    fn gen_while(&mut self, s: &minic_par::ast::WhileStmt) {
        let id = self.new_label_id();
        let start = format!("WHILE_START{}", id);
        let end = format!("WHILE_END{}", id);

        self.emit_label(&start);
        let condition = self.gen_expr(&s.test);
        self.emit(Op::IfFalse, Some(condition), None, Some(end.clone()));

        self.loop_stack.push(LoopFrame {
            start: start.clone(),
            continue_label: start.clone(),
            end: end.clone(),
        });
        self.gen_stmt(&s.body);
        self.loop_stack.pop();

        self.emit(Op::Goto, None, None, Some(start));
        self.emit_label(&end);
    }

    fn gen_for(&mut self, s: &minic_par::ast::ForStmt) {
        let id = self.new_label_id();
        let start = format!("FOR_START{}", id);
        let continue_label = format!("FOR_CONTINUE{}", id);
        let end = format!("FOR_END{}", id);

        match &s.init {
            Some(ForInit::Decl(decl)) => self.gen_var_decl(decl),
            Some(ForInit::Expr(expr)) => {
                self.gen_expr(expr);
            }
            None => {}
        }

        self.emit_label(&start);
        if let Some(test) = &s.test {
            let condition = self.gen_expr(test);
            self.emit(Op::IfFalse, Some(condition), None, Some(end.clone()));
        }

        self.loop_stack.push(LoopFrame {
            start: start.clone(),
            continue_label: continue_label.clone(),
            end: end.clone(),
        });
        self.gen_stmt(&s.body);
        self.loop_stack.pop();

        self.emit_label(&continue_label);
        if let Some(update) = &s.update {
            self.gen_expr(update);
        }
        self.emit(Op::Goto, None, None, Some(start));
        self.emit_label(&end);
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Lowers an expression and returns the place holding its value.
    fn gen_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(ident) => ident.name.clone(),
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Str => self.intern_string(&lit.value),
                _ => lit.value.clone(),
            },
            Expr::Binary(binary) => {
                let left = self.gen_expr(&binary.left);
                let right = self.gen_expr(&binary.right);
                let temp = self.new_temp();
                let op = Self::binop_to_op(binary.op);
                self.emit(op, Some(left), Some(right), Some(temp.clone()));
                temp
            }
            Expr::Unary(unary) => self.gen_unary(unary),
            Expr::Assign(assign) => {
                let value = self.gen_expr(&assign.value);
                match &assign.target {
                    Expr::Ident(ident) => {
                        let name = ident.name.clone();
                        self.emit(Op::Assign, Some(value), None, Some(name.clone()));
                        name
                    }
                    other => {
                        self.report(
                            DiagnosticCode::E_GEN_UNSUPPORTED_OP,
                            "Unsupported assignment target".to_string(),
                            other.span(),
                        );
                        value
                    }
                }
            }
            Expr::Call(call) => {
                for argument in &call.arguments {
                    let place = self.gen_expr(argument);
                    self.emit(Op::Param, Some(place), None, None);
                }
                let temp = self.new_temp();
                self.emit(
                    Op::Call,
                    Some(call.callee.name.clone()),
                    Some(call.arguments.len().to_string()),
                    Some(temp.clone()),
                );
                temp
            }
            Expr::Error(_) => "0".to_string(),
        }
    }

    fn gen_unary(&mut self, unary: &minic_par::ast::UnaryExpr) -> String {
        match unary.op {
            UnOp::Inc | UnOp::Dec => {
                let place = self.gen_expr(&unary.argument);
                let op = if unary.op == UnOp::Inc { Op::Add } else { Op::Sub };
                if unary.prefix {
                    // ++x: update in place, the value is the variable itself.
                    self.emit(
                        op,
                        Some(place.clone()),
                        Some("1".into()),
                        Some(place.clone()),
                    );
                    place
                } else {
                    // x++: save the old value first.
                    let temp = self.new_temp();
                    self.emit(Op::Assign, Some(place.clone()), None, Some(temp.clone()));
                    self.emit(op, Some(place.clone()), Some("1".into()), Some(place));
                    temp
                }
            }
            UnOp::Neg | UnOp::Not | UnOp::Addr | UnOp::Deref => {
                let argument = self.gen_expr(&unary.argument);
                let op = match unary.op {
                    UnOp::Neg => Op::Neg,
                    UnOp::Not => Op::Not,
                    UnOp::Addr => Op::Addr,
                    _ => Op::Deref,
                };
                let temp = self.new_temp();
                self.emit(op, Some(argument), None, Some(temp.clone()));
                temp
            }
            UnOp::BitNot => {
                self.report(
                    DiagnosticCode::E_GEN_UNSUPPORTED_OP,
                    "Unsupported operator '~'".to_string(),
                    unary.span,
                );
                self.gen_expr(&unary.argument)
            }
        }
    }

    fn binop_to_op(op: minic_par::ast::BinOp) -> Op {
        use minic_par::ast::BinOp;
        match op {
            BinOp::Add => Op::Add,
            BinOp::Sub => Op::Sub,
            BinOp::Mul => Op::Mul,
            BinOp::Div => Op::Div,
            BinOp::Mod => Op::Mod,
            BinOp::Eq => Op::Eq,
            BinOp::Ne => Op::Ne,
            BinOp::Lt => Op::Lt,
            BinOp::Gt => Op::Gt,
            BinOp::Le => Op::Le,
            BinOp::Ge => Op::Ge,
            BinOp::And => Op::And,
            BinOp::Or => Op::Or,
        }
    }

    fn intern_string(&mut self, quoted: &str) -> String {
        let label = format!("str{}", self.string_counter);
        self.string_counter += 1;
        self.string_literals.insert(label.clone(), quoted.to_string());
        label
    }
}
