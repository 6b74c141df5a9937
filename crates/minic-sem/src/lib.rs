//! minic-sem - Semantic analysis for the C subset.
//!
//! The analyzer consumes the AST plus the raw source text and produces the
//! symbol table and the semantic diagnostics. It runs in phases, each a
//! full traversal:
//!
//! 1. **Preprocessing** — seed the `builtin` scope with the standard-library
//!    signatures and regex-scan the source for `#include`/`#define`.
//! 2. **Symbol collection** — walk the AST tracking the scope stack,
//!    register every declaration, resolve every identifier read, track
//!    initialization, and record which symbols are actually read.
//! 3. **Type checking** — compute every expression's type bottom-up and
//!    check assignment/argument compatibility and call arity.
//! 4. **Final checks** — missing `main`, unused variables.
//!
//! Name resolution searches the scope chain innermost-outward, then the
//! `builtin` scope. Synthetic scope tags come from a per-invocation
//! counter, so the whole analysis is deterministic.
//!
//! Like every stage, analysis never throws: diagnostics accumulate in the
//! [`Handler`] and an unexpected internal fault becomes one
//! `"semantic analyzer failed: ..."` diagnostic.

pub mod builtins;
pub mod preprocess;
pub mod scope;
pub mod symbol;
pub mod types;

pub use scope::{ScopeStack, BUILTIN_SCOPE, GLOBAL_SCOPE, PREPROCESSOR_SCOPE};
pub use symbol::{Symbol, SymbolInfo, SymbolKind, SymbolTable};
pub use types::CType;

use indexmap::IndexMap;
use minic_par::ast::{
    Expr, ForInit, Function, Ident, Item, LiteralKind, Program, Stmt, UnOp, VariableDecl,
};
use minic_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level, Span};
use rustc_hash::FxHashSet;
use preprocess::PreprocessorEntry;

/// Result of semantic analysis: the display-friendly symbol table plus all
/// semantic diagnostics (errors and warnings).
#[derive(Debug)]
pub struct Analysis {
    pub symbols: IndexMap<String, SymbolInfo>,
    pub errors: Vec<Diagnostic>,
}

impl Analysis {
    /// True if any error-level diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|d| d.level == Level::Error)
    }
}

/// Analyzes `program`, returning the public symbol table and diagnostics.
///
/// # Examples
///
/// ```
/// use minic_lex::lex;
/// use minic_par::parse;
/// use minic_sem::analyze;
///
/// let result = parse(lex("int main() { return 0; }"));
/// let analysis = analyze(&result.program, "int main() { return 0; }");
/// assert!(analysis.symbols.contains_key("main"));
/// ```
pub fn analyze(program: &Program, source: &str) -> Analysis {
    let handler = Handler::new();
    let table = run_analyzer(program, source, &handler);
    Analysis {
        symbols: table.display(),
        errors: handler.take(),
    }
}

/// Analyzes into an existing handler and returns the full internal symbol
/// table; used by the driver, whose code generator wants the table itself.
pub fn run_analyzer(program: &Program, source: &str, handler: &Handler) -> SymbolTable {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut analyzer = SemanticAnalyzer::new(handler);
        analyzer.run(program, source);
        analyzer.table
    }));
    match result {
        Ok(table) => table,
        Err(payload) => {
            handler.emit(
                DiagnosticBuilder::error(format!(
                    "semantic analyzer failed: {}",
                    panic_message(&payload)
                ))
                .span(Span::DUMMY)
                .code(DiagnosticCode::E_INTERNAL)
                .build(),
            );
            SymbolTable::new()
        }
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

/// Analyzer state shared by the phases.
pub struct SemanticAnalyzer<'h> {
    handler: &'h Handler,
    table: SymbolTable,
    scopes: ScopeStack,
    /// Keys of symbols that were *read* (write-only left-hand sides do not
    /// count). Drives the unused-variable warning.
    uses: FxHashSet<String>,
    loop_depth: u32,
}

impl<'h> SemanticAnalyzer<'h> {
    pub fn new(handler: &'h Handler) -> Self {
        Self {
            handler,
            table: SymbolTable::new(),
            scopes: ScopeStack::new(),
            uses: FxHashSet::default(),
            loop_depth: 0,
        }
    }

    /// Runs all phases over `program`.
    pub fn run(&mut self, program: &Program, source: &str) {
        self.seed_preprocessor(source);

        for item in &program.body {
            self.collect_item(item);
        }

        // The type-checking walk re-derives scope names; a fresh stack
        // replays the same deterministic block-counter sequence.
        self.scopes = ScopeStack::new();
        for item in &program.body {
            self.check_item(item);
        }

        self.final_checks(program);
    }

    fn error(&self, code: DiagnosticCode, message: String, span: Span, description: &str) {
        DiagnosticBuilder::error(message)
            .span(span)
            .code(code)
            .description(description)
            .emit(self.handler);
    }

    // =========================================================================
    // PHASE P - PREPROCESSING
    // =========================================================================

    fn seed_preprocessor(&mut self, source: &str) {
        builtins::install(&mut self.table);

        for entry in preprocess::scan(source) {
            match entry {
                PreprocessorEntry::Include { header, line, .. } => {
                    let mut symbol = Symbol::variable(
                        &header,
                        CType::new("header"),
                        PREPROCESSOR_SCOPE,
                        line,
                        true,
                    );
                    symbol.kind = SymbolKind::Header;
                    self.table.insert(symbol);
                }
                PreprocessorEntry::Define { name, value, line } => {
                    let mut symbol =
                        Symbol::variable(&name, CType::int(), GLOBAL_SCOPE, line, true);
                    symbol.kind = SymbolKind::Macro;
                    symbol.value = if value.is_empty() { None } else { Some(value) };
                    self.table.insert(symbol);
                }
            }
        }
    }

    // =========================================================================
    // PHASE 1 - SYMBOL COLLECTION
    // =========================================================================

    fn collect_item(&mut self, item: &Item) {
        match item {
            Item::Function(function) => self.collect_function(function),
            Item::Variable(decl) => self.collect_var_decl(decl),
            Item::Typedef(typedef) => {
                let ty = CType::from_specifiers(&typedef.specifiers, false, false);
                let scope = self.scopes.current().to_string();
                if self.table.get(&scope, &typedef.name.name).is_some() {
                    self.report_redeclaration(&typedef.name.name, typedef.span);
                    return;
                }
                let mut symbol =
                    Symbol::variable(&typedef.name.name, ty, &scope, typedef.span.line, true);
                symbol.kind = SymbolKind::Typedef;
                self.table.insert(symbol);
            }
            Item::Include(_) | Item::Directive(_) => {}
        }
    }

    fn collect_function(&mut self, function: &Function) {
        let name = &function.name.name;
        let return_type =
            CType::from_specifiers(&function.return_type, function.pointer_return, false);
        let param_types: Vec<CType> = function
            .params
            .iter()
            .map(|p| CType::from_specifiers(&p.ty, p.pointer, p.array))
            .collect();

        let existing = self
            .table
            .get(GLOBAL_SCOPE, name)
            .map(|symbol| (symbol.kind, symbol.defined));
        match existing {
            None => {
                let mut symbol =
                    Symbol::function(name, return_type, param_types, function.span.line);
                symbol.defined = function.body.is_some();
                self.table.insert(symbol);
            }
            Some((SymbolKind::Function, was_defined)) => {
                // Prototype followed by definition is the normal C idiom;
                // repeated prototypes are tolerated too. Two bodies are not.
                if function.body.is_some() {
                    if was_defined {
                        self.report_redeclaration(name, function.span);
                    } else {
                        let mut symbol =
                            Symbol::function(name, return_type, param_types, function.span.line);
                        symbol.defined = true;
                        self.table.insert(symbol);
                    }
                }
            }
            Some(_) => self.report_redeclaration(name, function.span),
        }

        if let Some(body) = &function.body {
            self.scopes.push_named(name);
            for param in &function.params {
                let ty = CType::from_specifiers(&param.ty, param.pointer, param.array);
                let scope = self.scopes.current().to_string();
                if self.table.get(&scope, &param.name.name).is_some() {
                    self.report_redeclaration(&param.name.name, param.span);
                } else {
                    self.table.insert(Symbol::parameter(
                        &param.name.name,
                        ty,
                        &scope,
                        param.span.line,
                    ));
                }
            }
            for stmt in &body.body {
                self.collect_stmt(stmt);
            }
            self.scopes.pop();
        }
    }

    fn collect_var_decl(&mut self, decl: &VariableDecl) {
        for declarator in &decl.declarators {
            // The initializer is evaluated before the name exists, so
            // `int x = x;` reads an undeclared `x`.
            if let Some(init) = &declarator.init {
                self.collect_expr(init);
            }
            if let Some(size) = &declarator.array_size {
                self.collect_expr(size);
            }

            let ty = CType::from_specifiers(&decl.specifiers, declarator.pointer, declarator.array);
            let scope = self.scopes.current().to_string();
            if self.table.get(&scope, &declarator.name.name).is_some() {
                self.report_redeclaration(&declarator.name.name, declarator.span);
                continue;
            }

            let mut symbol = Symbol::variable(
                &declarator.name.name,
                ty,
                &scope,
                declarator.span.line,
                declarator.init.is_some(),
            );
            if let Some(Expr::Literal(lit)) = &declarator.init {
                symbol.value = Some(lit.value.clone());
            }
            self.table.insert(symbol);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.scopes.push_block();
                for stmt in &block.body {
                    self.collect_stmt(stmt);
                }
                self.scopes.pop();
            }
            Stmt::If(s) => {
                self.scopes.push_block();
                self.collect_expr(&s.test);
                self.collect_stmt(&s.consequent);
                if let Some(alternate) = &s.alternate {
                    self.collect_stmt(alternate);
                }
                self.scopes.pop();
            }
            Stmt::While(s) => {
                self.scopes.push_block();
                self.collect_expr(&s.test);
                self.loop_depth += 1;
                self.collect_stmt(&s.body);
                self.loop_depth -= 1;
                self.scopes.pop();
            }
            Stmt::For(s) => {
                self.scopes.push_block();
                match &s.init {
                    Some(ForInit::Decl(decl)) => self.collect_var_decl(decl),
                    Some(ForInit::Expr(expr)) => self.collect_expr(expr),
                    None => {}
                }
                if let Some(test) = &s.test {
                    self.collect_expr(test);
                }
                if let Some(update) = &s.update {
                    self.collect_expr(update);
                }
                self.loop_depth += 1;
                self.collect_stmt(&s.body);
                self.loop_depth -= 1;
                self.scopes.pop();
            }
            Stmt::Return(s) => {
                if let Some(argument) = &s.argument {
                    self.collect_expr(argument);
                }
            }
            Stmt::Expr(s) => self.collect_expr(&s.expression),
            Stmt::Decl(decl) => self.collect_var_decl(decl),
            Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.error(
                        DiagnosticCode::E_SEM_OUTSIDE_LOOP,
                        "'break' used outside of a loop".to_string(),
                        *span,
                        "break is only meaningful inside a while or for loop",
                    );
                }
            }
            Stmt::Continue(span) => {
                if self.loop_depth == 0 {
                    self.error(
                        DiagnosticCode::E_SEM_OUTSIDE_LOOP,
                        "'continue' used outside of a loop".to_string(),
                        *span,
                        "continue is only meaningful inside a while or for loop",
                    );
                }
            }
            Stmt::Empty(_) => {}
        }
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.read_identifier(ident),
            Expr::Literal(_) | Expr::Error(_) => {}
            Expr::Binary(binary) => {
                self.collect_expr(&binary.left);
                self.collect_expr(&binary.right);
            }
            Expr::Unary(unary) => {
                self.collect_expr(&unary.argument);
                // ++/-- writes its operand back.
                if matches!(unary.op, UnOp::Inc | UnOp::Dec) {
                    if let Expr::Ident(ident) = &unary.argument {
                        self.mark_initialized(&ident.name);
                    }
                }
            }
            Expr::Assign(assign) => {
                self.collect_expr(&assign.value);
                match &assign.target {
                    Expr::Ident(ident) => self.write_identifier(ident),
                    other => self.collect_expr(other),
                }
            }
            Expr::Call(call) => {
                for argument in &call.arguments {
                    self.collect_expr(argument);
                }
                // A call is a use of the function; undefined callees are
                // reported during type checking.
                if let Some(key) = self.resolve(&call.callee.name) {
                    self.uses.insert(key);
                }
            }
        }
    }

    /// Resolves `name` through the scope chain, then `builtin`.
    fn resolve(&self, name: &str) -> Option<String> {
        for scope in self.scopes.chain() {
            if self.table.get(scope, name).is_some() {
                return Some(SymbolTable::key(scope, name));
            }
        }
        if self.table.get(BUILTIN_SCOPE, name).is_some() {
            return Some(SymbolTable::key(BUILTIN_SCOPE, name));
        }
        None
    }

    fn read_identifier(&mut self, ident: &Ident) {
        let Some(key) = self.resolve(&ident.name) else {
            self.error(
                DiagnosticCode::E_SEM_UNDEFINED_VARIABLE,
                format!("Undefined variable '{}'", ident.name),
                ident.span,
                "no declaration for this name is visible in the current scope chain",
            );
            return;
        };
        self.uses.insert(key.clone());

        let symbol = self.table.get_by_key(&key).expect("resolved key exists");
        if symbol.kind == SymbolKind::Variable && !symbol.is_parameter && !symbol.initialized {
            self.error(
                DiagnosticCode::E_SEM_UNINITIALIZED,
                format!("Variable '{}' used before initialization", ident.name),
                ident.span,
                "the variable is read before any value has been assigned to it",
            );
        }
    }

    fn write_identifier(&mut self, ident: &Ident) {
        if self.resolve(&ident.name).is_none() {
            self.error(
                DiagnosticCode::E_SEM_UNDEFINED_VARIABLE,
                format!("Undefined variable '{}'", ident.name),
                ident.span,
                "no declaration for this name is visible in the current scope chain",
            );
            return;
        }
        self.mark_initialized(&ident.name);
    }

    fn mark_initialized(&mut self, name: &str) {
        if let Some(key) = self.resolve(name) {
            let (scope, name) = key.split_once(':').expect("key format");
            let (scope, name) = (scope.to_string(), name.to_string());
            if let Some(symbol) = self.table.get_mut(&scope, &name) {
                symbol.initialized = true;
            }
        }
    }

    fn report_redeclaration(&self, name: &str, span: Span) {
        self.error(
            DiagnosticCode::E_SEM_REDECLARATION,
            format!("Redeclaration of '{}'", name),
            span,
            "a symbol with this name already exists in the same scope",
        );
    }

    // =========================================================================
    // PHASE 2 - TYPE CHECKING
    // =========================================================================

    fn check_item(&mut self, item: &Item) {
        match item {
            Item::Function(function) => {
                if let Some(body) = &function.body {
                    self.scopes.push_named(&function.name.name);
                    for stmt in &body.body {
                        self.check_stmt(stmt);
                    }
                    self.scopes.pop();
                }
            }
            Item::Variable(decl) => self.check_var_decl(decl),
            _ => {}
        }
    }

    fn check_var_decl(&mut self, decl: &VariableDecl) {
        for declarator in &decl.declarators {
            let declared =
                CType::from_specifiers(&decl.specifiers, declarator.pointer, declarator.array);
            if let Some(init) = &declarator.init {
                if let Some(found) = self.expr_type(init) {
                    if !CType::compatible(&declared, &found) {
                        self.report_assign_mismatch(&declared, &found, declarator.span);
                    }
                }
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.scopes.push_block();
                for stmt in &block.body {
                    self.check_stmt(stmt);
                }
                self.scopes.pop();
            }
            Stmt::If(s) => {
                self.scopes.push_block();
                self.expr_type(&s.test);
                self.check_stmt(&s.consequent);
                if let Some(alternate) = &s.alternate {
                    self.check_stmt(alternate);
                }
                self.scopes.pop();
            }
            Stmt::While(s) => {
                self.scopes.push_block();
                self.expr_type(&s.test);
                self.check_stmt(&s.body);
                self.scopes.pop();
            }
            Stmt::For(s) => {
                self.scopes.push_block();
                match &s.init {
                    Some(ForInit::Decl(decl)) => self.check_var_decl(decl),
                    Some(ForInit::Expr(expr)) => {
                        self.expr_type(expr);
                    }
                    None => {}
                }
                if let Some(test) = &s.test {
                    self.expr_type(test);
                }
                if let Some(update) = &s.update {
                    self.expr_type(update);
                }
                self.check_stmt(&s.body);
                self.scopes.pop();
            }
            Stmt::Return(s) => {
                if let Some(argument) = &s.argument {
                    self.expr_type(argument);
                }
            }
            Stmt::Expr(s) => {
                self.expr_type(&s.expression);
            }
            Stmt::Decl(decl) => self.check_var_decl(decl),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
        }
    }

    /// Bottom-up expression typing. `None` means the type could not be
    /// determined (the cause was already reported); callers stay silent
    /// rather than cascade.
    fn expr_type(&mut self, expr: &Expr) -> Option<CType> {
        match expr {
            Expr::Literal(lit) => Some(match lit.kind {
                LiteralKind::Str => CType::char_ptr(),
                LiteralKind::Number if lit.value.contains('.') => CType::float(),
                LiteralKind::Number => CType::int(),
                LiteralKind::Char => CType::int(),
            }),
            Expr::Ident(ident) => {
                let key = self.resolve(&ident.name)?;
                self.table.get_by_key(&key).map(|s| s.ty.clone())
            }
            Expr::Binary(binary) => {
                let left = self.expr_type(&binary.left);
                let right = self.expr_type(&binary.right);
                if binary.op.is_comparison_or_logical() {
                    return Some(CType::int());
                }
                match (left, right) {
                    (Some(l), Some(r)) => {
                        // Pointer arithmetic keeps the pointer type.
                        if l.is_pointer() || l.is_array() {
                            Some(l.decayed())
                        } else if r.is_pointer() || r.is_array() {
                            Some(r.decayed())
                        } else {
                            Some(CType::promote(&l, &r))
                        }
                    }
                    (Some(one), None) | (None, Some(one)) => Some(one),
                    (None, None) => None,
                }
            }
            Expr::Unary(unary) => {
                let argument = self.expr_type(&unary.argument);
                match unary.op {
                    UnOp::Addr => Some(argument?.address_of()),
                    UnOp::Deref => Some(argument?.deref()),
                    UnOp::Not => Some(CType::int()),
                    _ => argument,
                }
            }
            Expr::Assign(assign) => {
                let value = self.expr_type(&assign.value);
                let target = self.expr_type(&assign.target);
                if let (Some(target), Some(value)) = (&target, &value) {
                    if !CType::compatible(target, value) {
                        self.report_assign_mismatch(target, value, assign.span);
                    }
                }
                target
            }
            Expr::Call(call) => self.check_call(call),
            Expr::Error(_) => Some(CType::int()),
        }
    }

    fn check_call(&mut self, call: &minic_par::ast::CallExpr) -> Option<CType> {
        let argument_types: Vec<Option<CType>> = call
            .arguments
            .iter()
            .map(|argument| self.expr_type(argument))
            .collect();

        let name = &call.callee.name;
        let Some(function) = self.table.lookup_function(name) else {
            self.error(
                DiagnosticCode::E_SEM_UNDEFINED_FUNCTION,
                format!("Call to undefined function '{}'", name),
                call.span,
                "the called name does not resolve to any declared or builtin function",
            );
            return None;
        };

        let params = function.params.clone().unwrap_or_default();
        let var_args = function.is_var_args;
        let return_type = function.ty.clone();

        if !var_args && call.arguments.len() != params.len() {
            self.error(
                DiagnosticCode::E_SEM_ARITY_MISMATCH,
                format!(
                    "Function '{}' called with {} arguments, but expected {}",
                    name,
                    call.arguments.len(),
                    params.len()
                ),
                call.span,
                "the argument count must match the declared parameter count",
            );
        }

        for (index, (param, argument)) in params.iter().zip(argument_types.iter()).enumerate() {
            if let Some(argument) = argument {
                if !CType::compatible(param, argument) {
                    self.error(
                        DiagnosticCode::E_SEM_TYPE_MISMATCH,
                        format!(
                            "Type mismatch: argument {} of '{}' expects '{}', got '{}'",
                            index + 1,
                            name,
                            param,
                            argument
                        ),
                        call.arguments[index].span(),
                        "the argument type is not compatible with the declared parameter type",
                    );
                }
            }
        }

        Some(return_type)
    }

    fn report_assign_mismatch(&self, target: &CType, source: &CType, span: Span) {
        self.error(
            DiagnosticCode::E_SEM_TYPE_MISMATCH,
            format!("Type mismatch: cannot assign '{}' to '{}'", source, target),
            span,
            "the value type is not compatible with the target type",
        );
    }

    // =========================================================================
    // PHASE 3 - FINAL CHECKS
    // =========================================================================

    fn final_checks(&mut self, program: &Program) {
        let declares_anything = program.body.iter().any(|item| {
            matches!(
                item,
                Item::Function(_) | Item::Variable(_) | Item::Typedef(_)
            )
        });
        let has_main = self
            .table
            .get(GLOBAL_SCOPE, "main")
            .is_some_and(|s| s.kind == SymbolKind::Function);

        if declares_anything && !has_main {
            self.error(
                DiagnosticCode::E_SEM_MISSING_MAIN,
                "No 'main' function found".to_string(),
                program.span,
                "an executable program needs a main entry point",
            );
        }

        let unused: Vec<(String, Span)> = self
            .table
            .iter()
            .filter(|(key, symbol)| {
                symbol.kind == SymbolKind::Variable
                    && !symbol.is_parameter
                    && symbol.scope != BUILTIN_SCOPE
                    && symbol.scope != PREPROCESSOR_SCOPE
                    && !self.uses.contains(*key)
            })
            .map(|(_, symbol)| {
                (
                    symbol.name.clone(),
                    Span::point(0, symbol.line, 1),
                )
            })
            .collect();

        for (name, span) in unused {
            DiagnosticBuilder::warning(format!("Unused variable '{}'", name))
                .span(span)
                .code(DiagnosticCode::W_UNUSED_VARIABLE)
                .description(format!("'{}' is declared but its value is never read", name))
                .emit(self.handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_util::Level;

    fn analyze_source(source: &str) -> Analysis {
        let parsed = minic_par::parse(minic_lex::lex(source));
        assert!(
            parsed.errors.is_empty(),
            "syntax errors in fixture: {:?}",
            parsed.errors
        );
        analyze(&parsed.program, source)
    }

    fn error_messages(analysis: &Analysis) -> Vec<String> {
        analysis
            .errors
            .iter()
            .filter(|d| d.level == Level::Error)
            .map(|d| d.message.clone())
            .collect()
    }

    fn warning_messages(analysis: &Analysis) -> Vec<String> {
        analysis
            .errors
            .iter()
            .filter(|d| d.level == Level::Warning)
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn test_minimal_main_is_clean() {
        let analysis = analyze_source("int main() { return 0; }");
        assert!(error_messages(&analysis).is_empty());
        assert!(warning_messages(&analysis).is_empty());
        assert_eq!(analysis.symbols.len(), 1);
        assert_eq!(analysis.symbols["main"].ty, "function");
    }

    #[test]
    fn test_uninitialized_read_is_error_not_unused() {
        let analysis = analyze_source("int x; int main() { return x; }");
        assert_eq!(
            error_messages(&analysis),
            vec!["Variable 'x' used before initialization"]
        );
        // x is read, so no unused warning.
        assert!(warning_messages(&analysis).is_empty());
    }

    #[test]
    fn test_unused_variable_warning() {
        let analysis = analyze_source("int main() { int x = 1; return 0; }");
        assert_eq!(warning_messages(&analysis), vec!["Unused variable 'x'"]);
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_parameters_are_never_unused_or_uninitialized() {
        let analysis = analyze_source("int id(int a) { return a; } int main() { return id(1); }");
        assert!(error_messages(&analysis).is_empty());
        assert!(warning_messages(&analysis).is_empty());

        let analysis = analyze_source("int f(int a) { return 0; } int main() { return f(1); }");
        assert!(warning_messages(&analysis).is_empty());
    }

    #[test]
    fn test_undefined_function_call() {
        let analysis = analyze_source("int main() { foo(); return 0; }");
        assert_eq!(
            error_messages(&analysis),
            vec!["Call to undefined function 'foo'"]
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let analysis =
            analyze_source("int add(int a, int b) { return a + b; } int main() { return add(1); }");
        assert_eq!(
            error_messages(&analysis),
            vec!["Function 'add' called with 1 arguments, but expected 2"]
        );
    }

    #[test]
    fn test_varargs_skip_arity_check() {
        let analysis =
            analyze_source("int main() { printf(\"%d %d\", 1, 2); return 0; }");
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_builtin_resolution() {
        let analysis = analyze_source("int main() { putchar(65); return 0; }");
        assert!(error_messages(&analysis).is_empty());
        // Builtins never appear in the display table.
        assert!(!analysis.symbols.contains_key("putchar"));
    }

    #[test]
    fn test_type_mismatch_in_assignment() {
        let analysis = analyze_source("int main() { int x = \"hello\"; return x; }");
        assert_eq!(
            error_messages(&analysis),
            vec!["Type mismatch: cannot assign 'char*' to 'int'"]
        );
    }

    #[test]
    fn test_numeric_widening_is_compatible() {
        let analysis = analyze_source("int main() { double d = 1; float f = 2.5; return 0; }");
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_argument_type_mismatch() {
        let analysis = analyze_source(
            "int twice(int n) { return n * 2; } int main() { return twice(\"no\"); }",
        );
        assert_eq!(
            error_messages(&analysis),
            vec!["Type mismatch: argument 1 of 'twice' expects 'int', got 'char*'"]
        );
    }

    #[test]
    fn test_redeclaration_same_scope() {
        let analysis = analyze_source("int main() { int x = 1; int x = 2; return x; }");
        assert_eq!(error_messages(&analysis), vec!["Redeclaration of 'x'"]);
    }

    #[test]
    fn test_shadowing_in_inner_scope_is_fine() {
        let analysis =
            analyze_source("int main() { int x = 1; { int x = 2; return x; } }");
        assert!(error_messages(&analysis).is_empty());
        // Both declarations exist under different scope keys.
        let shadows = analysis
            .symbols
            .keys()
            .filter(|k| k.ends_with(".x") || *k == "x")
            .count();
        assert_eq!(shadows, 2);
    }

    #[test]
    fn test_scope_isolation() {
        // A block-scoped variable is not visible after the block closes.
        let analysis =
            analyze_source("int main() { { int inner = 1; } return inner; }");
        assert!(error_messages(&analysis)
            .iter()
            .any(|m| m == "Undefined variable 'inner'"));
    }

    #[test]
    fn test_missing_main() {
        let analysis = analyze_source("int helper() { return 1; }");
        assert!(error_messages(&analysis)
            .iter()
            .any(|m| m == "No 'main' function found"));
    }

    #[test]
    fn test_empty_program_needs_no_main() {
        let analysis = analyze_source("");
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_break_outside_loop() {
        let analysis = analyze_source("int main() { break; return 0; }");
        assert!(error_messages(&analysis)
            .iter()
            .any(|m| m == "'break' used outside of a loop"));
    }

    #[test]
    fn test_break_inside_loop_is_fine() {
        let analysis =
            analyze_source("int main() { while (1) { break; } return 0; }");
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_prototype_then_definition() {
        let analysis = analyze_source(
            "int add(int a, int b); int add(int a, int b) { return a + b; } int main() { return add(1, 2); }",
        );
        assert!(error_messages(&analysis).is_empty());
    }

    #[test]
    fn test_two_definitions_is_redeclaration() {
        let analysis = analyze_source(
            "int f() { return 1; } int f() { return 2; } int main() { return f(); }",
        );
        assert_eq!(error_messages(&analysis), vec!["Redeclaration of 'f'"]);
    }

    #[test]
    fn test_assignment_initializes() {
        let analysis = analyze_source("int main() { int x; x = 5; return x; }");
        assert!(error_messages(&analysis).is_empty());
        assert!(warning_messages(&analysis).is_empty());
    }

    #[test]
    fn test_write_only_lhs_is_not_a_use() {
        let analysis = analyze_source("int main() { int x; x = 5; return 0; }");
        assert_eq!(warning_messages(&analysis), vec!["Unused variable 'x'"]);
    }

    #[test]
    fn test_defines_become_global_macros() {
        let source = "#define MAX 100\nint main() { return 0; }";
        let analysis = analyze_source(source);
        assert_eq!(analysis.symbols["MAX"].ty, "macro");
        assert_eq!(analysis.symbols["MAX"].value.as_deref(), Some("100"));
        // Macros do not trigger unused warnings.
        assert!(warning_messages(&analysis).is_empty());
    }

    #[test]
    fn test_includes_are_hidden_from_display() {
        let source = "#include <stdio.h>\nint main() { return 0; }";
        let analysis = analyze_source(source);
        assert!(!analysis.symbols.contains_key("stdio.h"));
    }

    #[test]
    fn test_for_loop_variable_scoping() {
        let analysis = analyze_source(
            "int main() { for (int i = 0; i < 3; i = i + 1) { } return 0; }",
        );
        assert!(error_messages(&analysis).is_empty());
        // The loop variable lives in a synthetic block scope.
        assert!(analysis.symbols.keys().any(|k| k.ends_with(".i")));
    }

    #[test]
    fn test_symbol_line_numbers() {
        let analysis = analyze_source("int main() {\n  int y = 2;\n  return y;\n}");
        let y_key = analysis
            .symbols
            .keys()
            .find(|k| k.ends_with(".y"))
            .unwrap()
            .clone();
        assert_eq!(analysis.symbols[&y_key].line, 2);
    }

    #[test]
    fn test_deterministic_scope_tags() {
        let source = "int main() { { int a = 1; } { int b = 2; } return 0; }";
        let first = analyze_source(source);
        let second = analyze_source(source);
        let first_keys: Vec<&String> = first.symbols.keys().collect();
        let second_keys: Vec<&String> = second.symbols.keys().collect();
        assert_eq!(first_keys, second_keys);
    }

    #[test]
    fn test_internal_symbol_table_for_driver() {
        let parsed = minic_par::parse(minic_lex::lex("int main() { return 0; }"));
        let handler = Handler::new();
        let table = run_analyzer(&parsed.program, "int main() { return 0; }", &handler);
        assert!(table.lookup_function("main").is_some());
        assert!(table.lookup_function("printf").is_some());
    }
}
