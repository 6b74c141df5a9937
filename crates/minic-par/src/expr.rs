//! Expression parsing by binding-power climbing.
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 0 | `=` | Right |
//! | 1 | `\|\|` | Left |
//! | 2 | `&&` | Left |
//! | 3 | `==`, `!=` | Left |
//! | 4 | `<`, `>`, `<=`, `>=` | Left |
//! | 5 | `+`, `-` | Left |
//! | 6 | `*`, `/`, `%` | Left |
//!
//! Left associativity falls out of re-entering the climb with `left_bp + 1`
//! as the minimum; assignment recurses into itself at the same level
//! instead, making it right-associative. Prefix operators bind tighter
//! than all of the above, postfix `++`/`--` and calls tighter still.

use minic_lex::TokenKind;
use minic_util::DiagnosticCode;

use crate::ast::{
    AssignExpr, BinOp, BinaryExpr, CallExpr, Expr, Ident, Literal, LiteralKind, UnOp, UnaryExpr,
};
use crate::Parser;

/// Binding power levels. Higher binds tighter; left-associative operators
/// re-enter the climb at `bp + 1`.
pub mod bp {
    /// Start of an expression.
    pub const MIN: u8 = 0;
    /// `||`
    pub const LOGICAL_OR: u8 = 2;
    /// `&&`
    pub const LOGICAL_AND: u8 = 4;
    /// `==`, `!=`
    pub const EQUALITY: u8 = 6;
    /// `<`, `>`, `<=`, `>=`
    pub const RELATIONAL: u8 = 8;
    /// `+`, `-`
    pub const ADDITIVE: u8 = 10;
    /// `*`, `/`, `%`
    pub const MULTIPLICATIVE: u8 = 12;
}

/// Binding powers and operator for an infix token, or `None` if the token
/// is not a binary operator.
fn infix_binding_power(value: &str) -> Option<(u8, u8, BinOp)> {
    let (left, op) = match value {
        "||" => (bp::LOGICAL_OR, BinOp::Or),
        "&&" => (bp::LOGICAL_AND, BinOp::And),
        "==" => (bp::EQUALITY, BinOp::Eq),
        "!=" => (bp::EQUALITY, BinOp::Ne),
        "<" => (bp::RELATIONAL, BinOp::Lt),
        ">" => (bp::RELATIONAL, BinOp::Gt),
        "<=" => (bp::RELATIONAL, BinOp::Le),
        ">=" => (bp::RELATIONAL, BinOp::Ge),
        "+" => (bp::ADDITIVE, BinOp::Add),
        "-" => (bp::ADDITIVE, BinOp::Sub),
        "*" => (bp::MULTIPLICATIVE, BinOp::Mul),
        "/" => (bp::MULTIPLICATIVE, BinOp::Div),
        "%" => (bp::MULTIPLICATIVE, BinOp::Mod),
        _ => return None,
    };
    Some((left, left + 1, op))
}

fn prefix_op(value: &str) -> Option<UnOp> {
    match value {
        "!" => Some(UnOp::Not),
        "-" => Some(UnOp::Neg),
        "~" => Some(UnOp::BitNot),
        "++" => Some(UnOp::Inc),
        "--" => Some(UnOp::Dec),
        "&" => Some(UnOp::Addr),
        "*" => Some(UnOp::Deref),
        _ => None,
    }
}

impl<'h> Parser<'h> {
    /// Parses a full expression (assignment level).
    ///
    /// Returns `None` after reporting if no expression can start here; the
    /// offending token is left in the stream for the caller to recover on.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    /// Assignment is right-associative: `a = b = c` parses as `a = (b = c)`.
    fn parse_assignment(&mut self) -> Option<Expr> {
        let target = self.parse_binary(bp::MIN)?;

        if self.check("=") {
            self.advance();
            let value = self
                .parse_assignment()
                .unwrap_or_else(|| Expr::Error(self.here()));
            let span = target.span().to(value.span());
            return Some(Expr::Assign(Box::new(AssignExpr {
                op: "=".to_string(),
                target,
                value,
                span,
            })));
        }

        Some(target)
    }

    /// The climbing loop: consume infix operators while their left binding
    /// power is at least `min_bp`.
    fn parse_binary(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;

        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Operator {
                break;
            }
            let Some((left_bp, right_bp, op)) = infix_binding_power(&token.value) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.advance();

            let rhs = self
                .parse_binary(right_bp)
                .unwrap_or_else(|| Expr::Error(self.here()));
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(Box::new(BinaryExpr {
                op,
                left: lhs,
                right: rhs,
                span,
            }));
        }

        Some(lhs)
    }

    /// Prefix operators, then postfix.
    fn parse_unary(&mut self) -> Option<Expr> {
        if self.check_kind(TokenKind::Operator) {
            let value = self.peek_value().unwrap_or_default();
            if let Some(op) = prefix_op(&value) {
                let start = self.here();
                self.advance();
                let argument = self
                    .parse_unary()
                    .unwrap_or_else(|| Expr::Error(self.here()));
                let span = start.to(argument.span());
                return Some(Expr::Unary(Box::new(UnaryExpr {
                    op,
                    argument,
                    prefix: true,
                    span,
                })));
            }
        }

        self.parse_postfix()
    }

    /// Postfix `++`/`--` on a primary expression.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            let op = if self.check("++") {
                UnOp::Inc
            } else if self.check("--") {
                UnOp::Dec
            } else {
                break;
            };
            let end = self.here();
            self.advance();
            let span = expr.span().to(end);
            expr = Expr::Unary(Box::new(UnaryExpr {
                op,
                argument: expr,
                prefix: false,
                span,
            }));
        }

        Some(expr)
    }

    /// Literals, identifiers, calls, and parenthesized expressions.
    fn parse_primary(&mut self) -> Option<Expr> {
        let Some(token) = self.peek() else {
            self.error_here(
                DiagnosticCode::E_PARSER_UNEXPECTED_EOF,
                "Expected expression, got end of input".to_string(),
            );
            return None;
        };
        let kind = token.kind;
        let value = token.value.clone();

        match kind {
            TokenKind::Number | TokenKind::StringLit | TokenKind::CharLit => {
                let token = self.advance().unwrap();
                let kind = match kind {
                    TokenKind::Number => LiteralKind::Number,
                    TokenKind::StringLit => LiteralKind::Str,
                    _ => LiteralKind::Char,
                };
                Some(Expr::Literal(Literal {
                    value: token.value,
                    kind,
                    span: token.span,
                }))
            }
            TokenKind::Identifier => {
                let token = self.advance().unwrap();
                let ident = Ident {
                    name: token.value,
                    span: token.span,
                };
                if self.check("(") {
                    return Some(self.parse_call(ident));
                }
                Some(Expr::Ident(ident))
            }
            TokenKind::Punctuation if value == "(" => {
                self.advance();
                let inner = self.expr_or_error();
                self.expect(")");
                Some(inner)
            }
            _ => {
                self.error_here(
                    DiagnosticCode::E_PARSER_UNEXPECTED_TOKEN,
                    format!("Expected expression, got '{}'", value),
                );
                None
            }
        }
    }

    /// Argument list of a call; the callee identifier is already consumed.
    fn parse_call(&mut self, callee: Ident) -> Expr {
        self.expect("(");
        let mut arguments = Vec::new();

        if !self.check(")") {
            loop {
                match self.parse_expr() {
                    Some(arg) => arguments.push(arg),
                    None => {
                        arguments.push(Expr::Error(self.here()));
                        break;
                    }
                }
                if !self.eat(",") {
                    break;
                }
            }
        }

        let end = self.here();
        self.expect(")");
        let span = callee.span.to(end);
        Expr::Call(Box::new(CallExpr {
            callee,
            arguments,
            span,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Item, Stmt};
    use crate::parse;

    /// Parses `int f() { return <expr>; }` and returns the expression.
    fn parse_expr_source(source: &str) -> Expr {
        let wrapped = format!("int f() {{ return {}; }}", source);
        let result = parse(minic_lex::lex(&wrapped));
        assert!(
            result.errors.is_empty(),
            "unexpected errors in {:?}: {:?}",
            source,
            result.errors
        );
        match result.program.body.into_iter().next().unwrap() {
            Item::Function(f) => match f.body.unwrap().body.into_iter().next().unwrap() {
                Stmt::Return(r) => r.argument.unwrap(),
                other => panic!("expected return, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn assert_binary(expr: &Expr, op: BinOp) -> (&Expr, &Expr) {
        match expr {
            Expr::Binary(b) => {
                assert_eq!(b.op, op, "expected {:?} at {:?}", op, b.op);
                (&b.left, &b.right)
            }
            other => panic!("expected binary {:?}, got {:?}", op, other),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        // a + b * c == a + (b * c)
        let expr = parse_expr_source("a + b * c");
        let (left, right) = assert_binary(&expr, BinOp::Add);
        assert!(matches!(left, Expr::Ident(_)));
        assert_binary(right, BinOp::Mul);
    }

    #[test]
    fn test_left_associativity() {
        // a - b - c == (a - b) - c
        let expr = parse_expr_source("a - b - c");
        let (left, right) = assert_binary(&expr, BinOp::Sub);
        assert_binary(left, BinOp::Sub);
        assert!(matches!(right, Expr::Ident(_)));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (a + b) * c
        let expr = parse_expr_source("(a + b) * c");
        let (left, _) = assert_binary(&expr, BinOp::Mul);
        assert_binary(left, BinOp::Add);
    }

    #[test]
    fn test_comparison_below_additive() {
        // a + b < c * d == (a + b) < (c * d)
        let expr = parse_expr_source("a + b < c * d");
        let (left, right) = assert_binary(&expr, BinOp::Lt);
        assert_binary(left, BinOp::Add);
        assert_binary(right, BinOp::Mul);
    }

    #[test]
    fn test_logical_ladder() {
        // a || b && c == a || (b && c)
        let expr = parse_expr_source("a || b && c");
        let (_, right) = assert_binary(&expr, BinOp::Or);
        assert_binary(right, BinOp::And);
    }

    #[test]
    fn test_equality_vs_relational() {
        // a < b == c < d parses as (a < b) == (c < d)
        let expr = parse_expr_source("a < b == c < d");
        let (left, right) = assert_binary(&expr, BinOp::Eq);
        assert_binary(left, BinOp::Lt);
        assert_binary(right, BinOp::Lt);
    }

    #[test]
    fn test_assignment_right_associative() {
        let expr = parse_expr_source("a = b = c");
        match expr {
            Expr::Assign(outer) => {
                assert!(matches!(outer.target, Expr::Ident(_)));
                assert!(matches!(outer.value, Expr::Assign(_)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_lower_than_binary() {
        // a = b + c assigns the whole sum.
        let expr = parse_expr_source("a = b + c");
        match expr {
            Expr::Assign(assign) => {
                assert_binary(&assign.value, BinOp::Add);
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_unary() {
        let expr = parse_expr_source("-x");
        match expr {
            Expr::Unary(u) => {
                assert_eq!(u.op, UnOp::Neg);
                assert!(u.prefix);
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        // -a * b == (-a) * b
        let expr = parse_expr_source("-a * b");
        let (left, _) = assert_binary(&expr, BinOp::Mul);
        assert!(matches!(left, Expr::Unary(_)));
    }

    #[test]
    fn test_not_and_logical() {
        // !a && b == (!a) && b
        let expr = parse_expr_source("!a && b");
        let (left, _) = assert_binary(&expr, BinOp::And);
        assert!(matches!(left, Expr::Unary(_)));
    }

    #[test]
    fn test_address_and_deref() {
        let expr = parse_expr_source("&x");
        match &expr {
            Expr::Unary(u) => assert_eq!(u.op, UnOp::Addr),
            other => panic!("expected unary, got {:?}", other),
        }
        let expr = parse_expr_source("*p");
        match &expr {
            Expr::Unary(u) => assert_eq!(u.op, UnOp::Deref),
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_and_postfix_increment() {
        let pre = parse_expr_source("++i");
        match &pre {
            Expr::Unary(u) => {
                assert_eq!(u.op, UnOp::Inc);
                assert!(u.prefix);
            }
            other => panic!("expected unary, got {:?}", other),
        }

        let post = parse_expr_source("i++");
        match &post {
            Expr::Unary(u) => {
                assert_eq!(u.op, UnOp::Inc);
                assert!(!u.prefix);
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_call_no_arguments() {
        let expr = parse_expr_source("getchar()");
        match expr {
            Expr::Call(call) => {
                assert_eq!(call.callee.name, "getchar");
                assert!(call.arguments.is_empty());
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_call_with_arguments() {
        let expr = parse_expr_source("add(1, x * 2)");
        match expr {
            Expr::Call(call) => {
                assert_eq!(call.arguments.len(), 2);
                assert_binary(&call.arguments[1], BinOp::Mul);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_kinds() {
        assert!(matches!(
            parse_expr_source("3.5"),
            Expr::Literal(Literal {
                kind: LiteralKind::Number,
                ..
            })
        ));
        assert!(matches!(
            parse_expr_source("\"s\""),
            Expr::Literal(Literal {
                kind: LiteralKind::Str,
                ..
            })
        ));
        assert!(matches!(
            parse_expr_source("'c'"),
            Expr::Literal(Literal {
                kind: LiteralKind::Char,
                ..
            })
        ));
    }
}
