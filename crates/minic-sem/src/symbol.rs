//! Symbols and the symbol table.
//!
//! The table maps `"<scope>:<name>"` keys to [`Symbol`]s in declaration
//! order. No two symbols share a key; attempting to declare the same name
//! twice in one scope is how redeclaration errors surface.

use indexmap::IndexMap;

use crate::scope::{BUILTIN_SCOPE, GLOBAL_SCOPE, PREPROCESSOR_SCOPE};
use crate::types::CType;

/// What a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Typedef,
    /// A `#define`d macro.
    Macro,
    /// A `#include`d header.
    Header,
}

/// A resolved declaration.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// For variables, the declared type; for functions, the return type.
    pub ty: CType,
    /// Scope the symbol was declared in.
    pub scope: String,
    /// Declaration line (1-based).
    pub line: u32,
    /// True once a value has definitely been assigned.
    pub initialized: bool,
    pub is_parameter: bool,
    /// Parameter types, for functions.
    pub params: Option<Vec<CType>>,
    /// True for variadic functions (`printf`).
    pub is_var_args: bool,
    /// True once a function symbol has seen a body.
    pub defined: bool,
    /// Macro replacement text or a literal initializer, when there is one.
    pub value: Option<String>,
}

impl Symbol {
    /// A variable symbol.
    pub fn variable(name: &str, ty: CType, scope: &str, line: u32, initialized: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            ty,
            scope: scope.to_string(),
            line,
            initialized,
            is_parameter: false,
            params: None,
            is_var_args: false,
            defined: false,
            value: None,
        }
    }

    /// A parameter symbol: always initialized.
    pub fn parameter(name: &str, ty: CType, scope: &str, line: u32) -> Self {
        Self {
            is_parameter: true,
            initialized: true,
            ..Self::variable(name, ty, scope, line, true)
        }
    }

    /// A function symbol in the global scope.
    pub fn function(name: &str, return_type: CType, params: Vec<CType>, line: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Function,
            ty: return_type,
            scope: GLOBAL_SCOPE.to_string(),
            line,
            initialized: true,
            is_parameter: false,
            params: Some(params),
            is_var_args: false,
            defined: false,
            value: None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.ty.is_pointer()
    }

    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }
}

/// Display-friendly projection of a symbol, keyed for the public API.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolInfo {
    /// `"function"` for functions, otherwise the type display string.
    pub ty: String,
    pub return_type: Option<String>,
    pub scope: String,
    pub line: u32,
    pub initialized: bool,
    pub params: Option<Vec<String>>,
    pub is_array: bool,
    pub is_pointer: bool,
    pub value: Option<String>,
}

/// Symbol table: `"<scope>:<name>"` → [`Symbol`], in declaration order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table key for a scope/name pair.
    pub fn key(scope: &str, name: &str) -> String {
        format!("{}:{}", scope, name)
    }

    /// Inserts a symbol, returning the previous occupant of the key if the
    /// `(scope, name)` pair was already taken.
    pub fn insert(&mut self, symbol: Symbol) -> Option<Symbol> {
        let key = Self::key(&symbol.scope, &symbol.name);
        self.symbols.insert(key, symbol)
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&Symbol> {
        self.symbols.get(&Self::key(scope, name))
    }

    pub fn get_mut(&mut self, scope: &str, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(&Self::key(scope, name))
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Symbol> {
        self.symbols.get(key)
    }

    /// Looks up a function by name: scope chain order does not matter for
    /// functions, which live in `global` or `builtin`.
    pub fn lookup_function(&self, name: &str) -> Option<&Symbol> {
        self.get(GLOBAL_SCOPE, name)
            .or_else(|| self.get(BUILTIN_SCOPE, name))
            .filter(|s| s.kind == SymbolKind::Function)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The display projection: `"<scope>.<name>"` keys (bare `<name>` for
    /// globals), omitting the `builtin` and `preprocessor` scopes, in
    /// declaration order.
    pub fn display(&self) -> IndexMap<String, SymbolInfo> {
        let mut out = IndexMap::new();
        for symbol in self.symbols.values() {
            if symbol.scope == BUILTIN_SCOPE || symbol.scope == PREPROCESSOR_SCOPE {
                continue;
            }
            let key = if symbol.scope == GLOBAL_SCOPE {
                symbol.name.clone()
            } else {
                format!("{}.{}", symbol.scope, symbol.name)
            };
            let (ty, return_type) = match symbol.kind {
                SymbolKind::Function => ("function".to_string(), Some(symbol.ty.to_string())),
                SymbolKind::Macro => ("macro".to_string(), None),
                SymbolKind::Typedef => ("typedef".to_string(), None),
                _ => (symbol.ty.to_string(), None),
            };
            out.insert(
                key,
                SymbolInfo {
                    ty,
                    return_type,
                    scope: symbol.scope.clone(),
                    line: symbol.line,
                    initialized: symbol.initialized,
                    params: symbol
                        .params
                        .as_ref()
                        .map(|ps| ps.iter().map(|p| p.to_string()).collect()),
                    is_array: symbol.is_array(),
                    is_pointer: symbol.is_pointer(),
                    value: symbol.value.clone(),
                },
            );
        }
        out
    }
}
