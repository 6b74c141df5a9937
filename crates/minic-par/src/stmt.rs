//! Statement parsing.

use crate::ast::{
    Block, Expr, ExprStmt, ForInit, ForStmt, IfStmt, ReturnStmt, Stmt, WhileStmt,
};
use crate::Parser;

impl<'h> Parser<'h> {
    /// Parses a `{ ... }` block.
    ///
    /// The loop carries an anti-stall guard: if a statement parser reports
    /// and consumes nothing, the blocking token is skipped so the block
    /// always terminates.
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.here();
        self.expect("{");

        let mut body = Vec::new();
        while !self.at_end() && !self.check("}") {
            let before = self.save();
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            }
            if self.save() == before {
                self.advance();
            }
        }

        let end = self.here();
        self.expect("}");
        Block {
            body,
            span: start.to(end),
        }
    }

    /// Parses one statement, or `None` after reporting when the current
    /// token cannot start one.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if self.check("{") {
            return Some(Stmt::Block(self.parse_block()));
        }
        if self.check("if") {
            return Some(self.parse_if());
        }
        if self.check("while") {
            return Some(self.parse_while());
        }
        if self.check("for") {
            return Some(self.parse_for());
        }
        if self.check("return") {
            return Some(self.parse_return());
        }
        if self.check("break") {
            let span = self.here();
            self.advance();
            let end = self.here();
            self.expect(";");
            return Some(Stmt::Break(span.to(end)));
        }
        if self.check("continue") {
            let span = self.here();
            self.advance();
            let end = self.here();
            self.expect(";");
            return Some(Stmt::Continue(span.to(end)));
        }
        if self.check(";") {
            let span = self.here();
            self.advance();
            return Some(Stmt::Empty(span));
        }
        if self.starts_declaration() {
            return self.parse_variable().map(Stmt::Decl);
        }

        // Expression statement.
        let expression = self.parse_expr()?;
        let end = self.here();
        self.expect(";");
        let span = expression.span().to(end);
        Some(Stmt::Expr(ExprStmt { expression, span }))
    }

    fn parse_if(&mut self) -> Stmt {
        let start = self.here();
        self.advance(); // if
        self.expect("(");
        let test = self.expr_or_error();
        self.expect(")");

        let consequent = Box::new(self.stmt_or_empty());
        let mut end = consequent.span();

        let alternate = if self.eat("else") {
            let stmt = self.stmt_or_empty();
            end = stmt.span();
            Some(Box::new(stmt))
        } else {
            None
        };

        Stmt::If(IfStmt {
            test,
            consequent,
            alternate,
            span: start.to(end),
        })
    }

    fn parse_while(&mut self) -> Stmt {
        let start = self.here();
        self.advance(); // while
        self.expect("(");
        let test = self.expr_or_error();
        self.expect(")");

        let body = Box::new(self.stmt_or_empty());
        let end = body.span();
        Stmt::While(WhileStmt {
            test,
            body,
            span: start.to(end),
        })
    }

    fn parse_for(&mut self) -> Stmt {
        let start = self.here();
        self.advance(); // for
        self.expect("(");

        // Init: declaration (consumes its own ';'), expression, or empty.
        let init = if self.eat(";") {
            None
        } else if self.starts_declaration() {
            self.parse_variable().map(ForInit::Decl)
        } else {
            let expr = self.parse_expr().map(ForInit::Expr);
            self.expect(";");
            expr
        };

        let test = if self.check(";") {
            None
        } else {
            self.parse_expr()
        };
        self.expect(";");

        let update = if self.check(")") {
            None
        } else {
            self.parse_expr()
        };
        self.expect(")");

        let body = Box::new(self.stmt_or_empty());
        let end = body.span();
        Stmt::For(ForStmt {
            init,
            test,
            update,
            body,
            span: start.to(end),
        })
    }

    fn parse_return(&mut self) -> Stmt {
        let start = self.here();
        self.advance(); // return

        let argument = if self.check(";") {
            None
        } else {
            self.parse_expr()
        };
        let end = self.here();
        self.expect(";");

        Stmt::Return(ReturnStmt {
            argument,
            span: start.to(end),
        })
    }

    /// A required expression slot: on failure the diagnostic is already
    /// recorded, so fill the hole and keep parsing.
    pub(crate) fn expr_or_error(&mut self) -> Expr {
        self.parse_expr()
            .unwrap_or_else(|| Expr::Error(self.here()))
    }

    /// A required statement slot.
    fn stmt_or_empty(&mut self) -> Stmt {
        let here = self.here();
        self.parse_statement().unwrap_or(Stmt::Empty(here))
    }
}
