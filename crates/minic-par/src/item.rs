//! Top-level item parsing: preprocessor lines, typedefs, functions, and
//! file-scope variables.
//!
//! Classification works on the first token. Declarations need one quiet
//! look-ahead: from a savepoint the parser skips the specifiers and the
//! declarator name without reporting, checks whether `(` follows, rewinds,
//! and dispatches to the function or variable path.

use minic_lex::TokenKind;
use minic_util::DiagnosticCode;

use crate::ast::{
    ComplexKind, DeclSpecifiers, Declarator, Directive, Expr, Function, Include, Item, Param,
    Specifier, SpecifierKind, Typedef, VariableDecl,
};
use crate::Parser;

impl<'h> Parser<'h> {
    /// Parses one top-level item, or returns `None` (without reporting) if
    /// the current token cannot start one.
    pub(crate) fn parse_item(&mut self) -> Option<Item> {
        if self.check_kind(TokenKind::Preprocessor) {
            return Some(self.parse_directive());
        }
        if self.check("typedef") {
            return self.parse_typedef().map(Item::Typedef);
        }
        if self.starts_declaration() {
            return self.parse_function_or_variable();
        }
        None
    }

    /// True if the current token can begin declaration specifiers.
    pub(crate) fn starts_declaration(&self) -> bool {
        self.check_kind(TokenKind::Type)
            || self.check_kind(TokenKind::Qualifier)
            || self.check("struct")
            || self.check("union")
            || self.check("enum")
    }

    /// Parses a preprocessor token into an `Include` or a raw `Directive`.
    fn parse_directive(&mut self) -> Item {
        let token = self.advance().unwrap();
        let text = token.value.trim_end().to_string();

        if let Some(rest) = text.strip_prefix("#include") {
            let rest = rest.trim();
            let header = if rest.starts_with('<') && rest.ends_with('>') {
                Some((rest[1..rest.len() - 1].to_string(), true))
            } else if rest.starts_with('"') && rest.ends_with('"') && rest.len() >= 2 {
                Some((rest[1..rest.len() - 1].to_string(), false))
            } else {
                None
            };
            if let Some((header, system)) = header {
                return Item::Include(Include {
                    header,
                    system,
                    span: token.span,
                });
            }
        }

        Item::Directive(Directive {
            text,
            span: token.span,
        })
    }

    /// Parses `typedef <specifiers> name;`.
    fn parse_typedef(&mut self) -> Option<Typedef> {
        let start = self.here();
        self.advance(); // typedef

        let specifiers = self.parse_decl_specifiers();
        let name = self.expect_identifier()?;
        let end = self.here();
        self.expect(";");

        Some(Typedef {
            specifiers,
            name,
            span: start.to(end),
        })
    }

    /// Decides function vs. variable with a quiet savepoint probe, then
    /// parses the chosen form from the savepoint.
    fn parse_function_or_variable(&mut self) -> Option<Item> {
        let savepoint = self.save();

        self.skip_specifiers_quietly();
        self.eat("*");
        let is_function = self.check_kind(TokenKind::Identifier)
            && self.peek_ahead(1).is_some_and(|t| t.value == "(");
        self.restore(savepoint);

        if is_function {
            self.parse_function().map(Item::Function)
        } else {
            self.parse_variable().map(Item::Variable)
        }
    }

    /// Skips over declaration specifiers without reporting anything.
    fn skip_specifiers_quietly(&mut self) {
        loop {
            if self.check_kind(TokenKind::Type) || self.check_kind(TokenKind::Qualifier) {
                self.advance();
            } else if self.check("struct") || self.check("union") || self.check("enum") {
                self.advance();
                if self.check_kind(TokenKind::Identifier) {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    /// Parses declaration specifiers: one or more type names, qualifiers,
    /// or struct/union/enum tags.
    pub(crate) fn parse_decl_specifiers(&mut self) -> DeclSpecifiers {
        let start = self.here();
        let mut specifiers = Vec::new();

        loop {
            if self.check_kind(TokenKind::Type) {
                let token = self.advance().unwrap();
                specifiers.push(Specifier {
                    kind: SpecifierKind::Type,
                    name: token.value,
                    span: token.span,
                });
            } else if self.check_kind(TokenKind::Qualifier) {
                let token = self.advance().unwrap();
                specifiers.push(Specifier {
                    kind: SpecifierKind::Qualifier,
                    name: token.value,
                    span: token.span,
                });
            } else if self.check("struct") || self.check("union") || self.check("enum") {
                let keyword = self.advance().unwrap();
                let complex = match keyword.value.as_str() {
                    "struct" => ComplexKind::Struct,
                    "union" => ComplexKind::Union,
                    _ => ComplexKind::Enum,
                };
                match self.expect_identifier() {
                    Some(tag) => specifiers.push(Specifier {
                        kind: SpecifierKind::Complex(complex),
                        name: tag.name,
                        span: keyword.span.to(tag.span),
                    }),
                    None => break,
                }
            } else {
                break;
            }
        }

        if specifiers.is_empty() {
            self.error_here(
                DiagnosticCode::E_PARSER_EXPECTED_TOKEN,
                format!(
                    "Expected type specifier, got '{}'",
                    self.peek_value().unwrap_or_default()
                ),
            );
        }

        let span = match (specifiers.first(), specifiers.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => start,
        };
        DeclSpecifiers { specifiers, span }
    }

    /// Parses a function declaration or definition.
    fn parse_function(&mut self) -> Option<Function> {
        let start = self.here();
        let return_type = self.parse_decl_specifiers();
        let pointer_return = self.eat("*");
        let name = self.expect_identifier()?;

        self.expect("(");
        let params = self.parse_params();
        self.expect(")");

        let (body, end) = if self.check("{") {
            let block = self.parse_block();
            let end = block.span;
            (Some(block), end)
        } else {
            let end = self.here();
            self.expect(";");
            (None, end)
        };

        Some(Function {
            name,
            return_type,
            pointer_return,
            params,
            body,
            span: start.to(end),
        })
    }

    /// Parses the parameter list between the parentheses. `()` and
    /// `(void)` both mean no parameters.
    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();

        if self.check(")") {
            return params;
        }
        if self.check("void") && self.peek_ahead(1).is_some_and(|t| t.value == ")") {
            self.advance();
            return params;
        }

        loop {
            if !self.starts_declaration() {
                self.error_here(
                    DiagnosticCode::E_PARSER_EXPECTED_TOKEN,
                    format!(
                        "Expected parameter type, got '{}'",
                        self.peek_value().unwrap_or_default()
                    ),
                );
                break;
            }

            let start = self.here();
            let ty = self.parse_decl_specifiers();
            let pointer = self.eat("*");
            let Some(name) = self.expect_identifier() else {
                break;
            };
            let mut array = false;
            let mut end = name.span;
            if self.eat("[") {
                array = true;
                if !self.check("]") {
                    // Parameter array sizes are parsed and dropped; the
                    // declarator decays to a pointer anyway.
                    let _ = self.parse_expr();
                }
                end = self.here();
                self.expect("]");
            }

            params.push(Param {
                name,
                ty,
                pointer,
                array,
                span: start.to(end),
            });

            if !self.eat(",") {
                break;
            }
        }

        params
    }

    /// Parses a variable declaration (one or more declarators) including
    /// the trailing `;`.
    pub(crate) fn parse_variable(&mut self) -> Option<VariableDecl> {
        let start = self.here();
        let specifiers = self.parse_decl_specifiers();
        let mut declarators = Vec::new();

        loop {
            let decl_start = self.here();
            let pointer = self.eat("*");
            let Some(name) = self.expect_identifier() else {
                break;
            };

            let mut array = false;
            let mut array_size = None;
            let mut end = name.span;
            if self.eat("[") {
                array = true;
                if !self.check("]") {
                    array_size = self.parse_expr();
                }
                end = self.here();
                self.expect("]");
            }

            let init = if self.eat("=") {
                let value = self
                    .parse_expr()
                    .unwrap_or_else(|| Expr::Error(self.here()));
                end = value.span();
                Some(value)
            } else {
                None
            };

            declarators.push(Declarator {
                name,
                pointer,
                array,
                array_size,
                init,
                span: decl_start.to(end),
            });

            if !self.eat(",") {
                break;
            }
        }

        let end = self.here();
        self.expect(";");

        if declarators.is_empty() {
            return None;
        }
        Some(VariableDecl {
            specifiers,
            declarators,
            span: start.to(end),
        })
    }
}
