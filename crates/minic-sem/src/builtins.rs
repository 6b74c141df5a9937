//! Seeded standard-library signatures.
//!
//! The analyzer does not read real headers; instead a fixed table of the
//! functions the subset's programs actually call is installed into the
//! `builtin` scope before any user code is examined. Resolution falls back
//! to this scope last, so user definitions shadow builtins.

use crate::scope::BUILTIN_SCOPE;
use crate::symbol::{Symbol, SymbolTable};
use crate::types::CType;

struct BuiltinSig {
    name: &'static str,
    returns: fn() -> CType,
    params: fn() -> Vec<CType>,
    var_args: bool,
}

const BUILTINS: &[BuiltinSig] = &[
    BuiltinSig {
        name: "printf",
        returns: CType::int,
        params: || vec![CType::char_ptr()],
        var_args: true,
    },
    BuiltinSig {
        name: "scanf",
        returns: CType::int,
        params: || vec![CType::char_ptr()],
        var_args: true,
    },
    BuiltinSig {
        name: "malloc",
        returns: || CType::void().pointer(),
        params: || vec![CType::int()],
        var_args: false,
    },
    BuiltinSig {
        name: "free",
        returns: CType::void,
        params: || vec![CType::void().pointer()],
        var_args: false,
    },
    BuiltinSig {
        name: "strcpy",
        returns: CType::char_ptr,
        params: || vec![CType::char_ptr(), CType::char_ptr()],
        var_args: false,
    },
    BuiltinSig {
        name: "strlen",
        returns: CType::int,
        params: || vec![CType::char_ptr()],
        var_args: false,
    },
    BuiltinSig {
        name: "puts",
        returns: CType::int,
        params: || vec![CType::char_ptr()],
        var_args: false,
    },
    BuiltinSig {
        name: "putchar",
        returns: CType::int,
        params: || vec![CType::int()],
        var_args: false,
    },
    BuiltinSig {
        name: "getchar",
        returns: CType::int,
        params: Vec::new,
        var_args: false,
    },
    BuiltinSig {
        name: "fopen",
        returns: || CType::void().pointer(),
        params: || vec![CType::char_ptr(), CType::char_ptr()],
        var_args: false,
    },
    BuiltinSig {
        name: "fclose",
        returns: CType::int,
        params: || vec![CType::void().pointer()],
        var_args: false,
    },
    BuiltinSig {
        name: "exit",
        returns: CType::void,
        params: || vec![CType::int()],
        var_args: false,
    },
    BuiltinSig {
        name: "memcpy",
        returns: || CType::void().pointer(),
        params: || vec![CType::void().pointer(), CType::void().pointer(), CType::int()],
        var_args: false,
    },
    BuiltinSig {
        name: "memset",
        returns: || CType::void().pointer(),
        params: || vec![CType::void().pointer(), CType::int(), CType::int()],
        var_args: false,
    },
];

/// Installs the builtin signatures into `table` under the `builtin` scope.
pub fn install(table: &mut SymbolTable) {
    for sig in BUILTINS {
        let mut symbol = Symbol::function(sig.name, (sig.returns)(), (sig.params)(), 0);
        symbol.scope = BUILTIN_SCOPE.to_string();
        symbol.is_var_args = sig.var_args;
        symbol.defined = true;
        table.insert(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_installed() {
        let mut table = SymbolTable::new();
        install(&mut table);
        for name in [
            "printf", "scanf", "malloc", "free", "strcpy", "strlen", "puts", "putchar",
            "getchar", "fopen", "fclose", "exit", "memcpy", "memset",
        ] {
            assert!(
                table.get(BUILTIN_SCOPE, name).is_some(),
                "missing builtin {}",
                name
            );
        }
    }

    #[test]
    fn test_variadic_flags() {
        let mut table = SymbolTable::new();
        install(&mut table);
        assert!(table.get(BUILTIN_SCOPE, "printf").unwrap().is_var_args);
        assert!(table.get(BUILTIN_SCOPE, "scanf").unwrap().is_var_args);
        assert!(!table.get(BUILTIN_SCOPE, "malloc").unwrap().is_var_args);
    }

    #[test]
    fn test_signatures() {
        let mut table = SymbolTable::new();
        install(&mut table);

        let malloc = table.get(BUILTIN_SCOPE, "malloc").unwrap();
        assert_eq!(malloc.ty.to_string(), "void*");
        assert_eq!(malloc.params.as_ref().unwrap().len(), 1);

        let getchar = table.get(BUILTIN_SCOPE, "getchar").unwrap();
        assert!(getchar.params.as_ref().unwrap().is_empty());
        assert_eq!(getchar.ty.to_string(), "int");

        let memcpy = table.get(BUILTIN_SCOPE, "memcpy").unwrap();
        assert_eq!(memcpy.params.as_ref().unwrap().len(), 3);
    }
}
