//! AST node definitions.
//!
//! The tree is a closed sum type: every node kind the parser can produce is
//! listed here, and traversals are exhaustive `match`es over these enums.
//! Every node carries a [`Span`]; a parent's span covers all of its
//! children.

use std::fmt;

use minic_util::Span;

/// AST root: the whole translation unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub body: Vec<Item>,
    pub span: Span,
}

/// Top-level construct.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// `#include <...>` or `#include "..."`.
    Include(Include),
    /// Any other `#...` line.
    Directive(Directive),
    /// `typedef <specifiers> name;`
    Typedef(Typedef),
    /// Function declaration (prototype) or definition.
    Function(Function),
    /// File-scope variable declaration.
    Variable(VariableDecl),
}

impl Item {
    /// Span of the item, whichever variant it is.
    pub fn span(&self) -> Span {
        match self {
            Item::Include(i) => i.span,
            Item::Directive(d) => d.span,
            Item::Typedef(t) => t.span,
            Item::Function(f) => f.span,
            Item::Variable(v) => v.span,
        }
    }
}

/// `#include` directive.
#[derive(Clone, Debug, PartialEq)]
pub struct Include {
    /// Header name without the delimiters, e.g. `stdio.h`.
    pub header: String,
    /// True for `<...>`, false for `"..."`.
    pub system: bool,
    pub span: Span,
}

/// A preprocessor line that is not an include, kept verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub text: String,
    pub span: Span,
}

/// `typedef` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Typedef {
    pub specifiers: DeclSpecifiers,
    pub name: Ident,
    pub span: Span,
}

/// Function declaration or definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub return_type: DeclSpecifiers,
    /// True when the declarator was `T *name(...)`.
    pub pointer_return: bool,
    pub params: Vec<Param>,
    /// `None` for a prototype.
    pub body: Option<Block>,
    pub span: Span,
}

/// Function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: DeclSpecifiers,
    pub pointer: bool,
    pub array: bool,
    pub span: Span,
}

/// Variable declaration: specifiers plus one or more declarators.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub specifiers: DeclSpecifiers,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// One declarator of a variable declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub pointer: bool,
    pub array: bool,
    /// Size expression inside `[...]`, when present.
    pub array_size: Option<Expr>,
    /// Initializer after `=`, when present.
    pub init: Option<Expr>,
    pub span: Span,
}

/// Declaration specifiers: one or more type names, qualifiers, and
/// struct/union/enum references, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclSpecifiers {
    pub specifiers: Vec<Specifier>,
    pub span: Span,
}

impl DeclSpecifiers {
    /// The type-specifier names joined in source order, e.g. `unsigned int`.
    pub fn type_name(&self) -> String {
        let names: Vec<&str> = self
            .specifiers
            .iter()
            .filter(|s| !matches!(s.kind, SpecifierKind::Qualifier))
            .map(|s| s.name.as_str())
            .collect();
        names.join(" ")
    }

    /// The qualifier names in source order.
    pub fn qualifiers(&self) -> Vec<String> {
        self.specifiers
            .iter()
            .filter(|s| matches!(s.kind, SpecifierKind::Qualifier))
            .map(|s| s.name.clone())
            .collect()
    }
}

/// A single declaration specifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Specifier {
    pub kind: SpecifierKind,
    /// `int`, `const`, or the tag name of a struct/union/enum.
    pub name: String,
    pub span: Span,
}

/// Kind of declaration specifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Primitive type name.
    Type,
    /// `const`, `volatile`, `static`, `extern`.
    Qualifier,
    /// `struct X`, `union X`, `enum X`.
    Complex(ComplexKind),
}

/// Tag kind for complex specifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplexKind {
    Struct,
    Union,
    Enum,
}

impl fmt::Display for ComplexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexKind::Struct => write!(f, "struct"),
            ComplexKind::Union => write!(f, "union"),
            ComplexKind::Enum => write!(f, "enum"),
        }
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

/// Statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
    Break(Span),
    Continue(Span),
    /// Local variable declaration.
    Decl(VariableDecl),
    /// Lone `;`.
    Empty(Span),
}

impl Stmt {
    /// Span of the statement, whichever variant it is.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) | Stmt::Empty(span) => *span,
            Stmt::Decl(d) => d.span,
        }
    }
}

/// `{ ... }` block.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `if` with optional `else`. An `else if` chain is a nested `IfStmt` in
/// `alternate`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
    pub span: Span,
}

/// `while` loop.
#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `for` loop. Every header slot is optional.
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Init slot of a `for` header.
#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Decl(VariableDecl),
    Expr(Expr),
}

/// `return` with optional argument.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub argument: Option<Expr>,
    pub span: Span,
}

/// Expression statement.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprStmt {
    pub expression: Expr,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Assign(Box<AssignExpr>),
    Call(Box<CallExpr>),
    /// Placeholder produced by error recovery where an expression was
    /// required but could not be parsed. Downstream stages treat it as
    /// an opaque `int`-typed hole.
    Error(Span),
}

impl Expr {
    /// Span of the expression, whichever variant it is.
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(i) => i.span,
            Expr::Literal(l) => l.span,
            Expr::Binary(b) => b.span,
            Expr::Unary(u) => u.span,
            Expr::Assign(a) => a.span,
            Expr::Call(c) => c.span,
            Expr::Error(span) => *span,
        }
    }
}

/// Identifier reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Literal value, kept as its source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    /// Exact source text; strings and chars keep their quotes.
    pub value: String,
    pub kind: LiteralKind,
    pub span: Span,
}

/// Kind of literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    Str,
    Char,
}

/// Binary operation.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

/// Binary operator. Only the operators in the precedence ladder exist;
/// bitwise and shift tokens are rejected at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// The source symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    /// True for `== != < > <= >= && ||`, whose result type is `int`.
    pub fn is_comparison_or_logical(&self) -> bool {
        !matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Unary operation; `prefix` distinguishes `++x` from `x++`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub argument: Expr,
    pub prefix: bool,
    pub span: Span,
}

/// Unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `~`
    BitNot,
    /// `++`
    Inc,
    /// `--`
    Dec,
    /// `&`
    Addr,
    /// `*`
    Deref,
}

impl UnOp {
    /// The source symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::BitNot => "~",
            UnOp::Inc => "++",
            UnOp::Dec => "--",
            UnOp::Addr => "&",
            UnOp::Deref => "*",
        }
    }
}

/// Assignment. Right-associative and lower than every binary operator.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignExpr {
    /// Operator text; only `=` is produced today.
    pub op: String,
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

/// Function call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Ident,
    pub arguments: Vec<Expr>,
    pub span: Span,
}
