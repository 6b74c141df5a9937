//! The C type model used for checking.
//!
//! Types are flat: a base name (possibly multi-word, `unsigned int`), a
//! pointer depth, an array flag, and leading qualifiers. That is enough for
//! the subset — there are no function pointers or nested array types to
//! represent.

use std::fmt;

use minic_par::ast::{DeclSpecifiers, SpecifierKind};

/// A C type.
///
/// # Examples
///
/// ```
/// use minic_sem::CType;
///
/// let ty = CType::new("char").pointer();
/// assert_eq!(ty.to_string(), "char*");
/// assert!(ty.is_pointer());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CType {
    /// Leading qualifiers in source order (`const`, `volatile`, ...).
    pub qualifiers: Vec<String>,
    /// Base type name; multi-word for things like `unsigned int`.
    pub base: String,
    /// Pointer depth: `char*` is 1, `char**` is 2.
    pub pointers: u8,
    /// True for `T name[...]` declarators.
    pub array: bool,
}

/// Words that make a base type numeric.
const NUMERIC_WORDS: &[&str] = &[
    "int", "char", "float", "double", "short", "long", "unsigned", "signed",
];

impl CType {
    /// A plain (unqualified, non-pointer) type.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            qualifiers: Vec::new(),
            base: base.into(),
            pointers: 0,
            array: false,
        }
    }

    /// `int` — the default type of most expressions.
    pub fn int() -> Self {
        Self::new("int")
    }

    /// `float`.
    pub fn float() -> Self {
        Self::new("float")
    }

    /// `void`.
    pub fn void() -> Self {
        Self::new("void")
    }

    /// `char*` — the type of string literals.
    pub fn char_ptr() -> Self {
        Self::new("char").pointer()
    }

    /// Builds the declared type out of parsed specifiers and declarator
    /// flags.
    pub fn from_specifiers(specifiers: &DeclSpecifiers, pointer: bool, array: bool) -> Self {
        let mut base_words = Vec::new();
        let mut qualifiers = Vec::new();
        for spec in &specifiers.specifiers {
            match spec.kind {
                SpecifierKind::Qualifier => qualifiers.push(spec.name.clone()),
                SpecifierKind::Type => base_words.push(spec.name.clone()),
                SpecifierKind::Complex(kind) => {
                    base_words.push(format!("{} {}", kind, spec.name));
                }
            }
        }
        let base = if base_words.is_empty() {
            "int".to_string()
        } else {
            base_words.join(" ")
        };
        Self {
            qualifiers,
            base,
            pointers: u8::from(pointer),
            array,
        }
    }

    /// Adds one level of pointer indirection.
    pub fn pointer(mut self) -> Self {
        self.pointers += 1;
        self
    }

    /// True for any pointer depth (arrays are not pointers until decayed).
    pub fn is_pointer(&self) -> bool {
        self.pointers > 0
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn is_void(&self) -> bool {
        self.base == "void" && self.pointers == 0 && !self.array
    }

    /// True for non-pointer, non-array types built from numeric words.
    /// `char` counts: it is an integer type in C.
    pub fn is_numeric(&self) -> bool {
        !self.is_pointer()
            && !self.array
            && !self.base.is_empty()
            && self
                .base
                .split_whitespace()
                .all(|word| NUMERIC_WORDS.contains(&word))
    }

    /// Promotion rank along `double > float > long > int`; everything
    /// narrower than `int` promotes to `int`.
    pub fn rank(&self) -> u8 {
        if self.base.contains("double") {
            4
        } else if self.base.contains("float") {
            3
        } else if self.base.contains("long") {
            2
        } else {
            1
        }
    }

    /// The wider of two numeric types.
    pub fn promote(a: &CType, b: &CType) -> CType {
        let winner = if a.rank() >= b.rank() { a } else { b };
        winner.strip_qualifiers()
    }

    /// The same type without qualifiers.
    pub fn strip_qualifiers(&self) -> CType {
        CType {
            qualifiers: Vec::new(),
            base: self.base.clone(),
            pointers: self.pointers,
            array: self.array,
        }
    }

    /// Array-to-pointer decay: `T[]` becomes `T*`, anything else is
    /// unchanged.
    pub fn decayed(&self) -> CType {
        if self.array {
            CType {
                qualifiers: Vec::new(),
                base: self.base.clone(),
                pointers: self.pointers + 1,
                array: false,
            }
        } else {
            self.strip_qualifiers()
        }
    }

    /// Strips one level of indirection (`*p`). Returns the same type when
    /// there is nothing to strip.
    pub fn deref(&self) -> CType {
        let mut ty = self.strip_qualifiers();
        if ty.array {
            ty.array = false;
        } else if ty.pointers > 0 {
            ty.pointers -= 1;
        }
        ty
    }

    /// One more level of indirection (`&x`).
    pub fn address_of(&self) -> CType {
        let mut ty = self.strip_qualifiers();
        ty.array = false;
        ty.pointers += 1;
        ty
    }

    /// Assignment/argument compatibility.
    ///
    /// Broader than equality: qualifiers are ignored, any two numeric
    /// types are compatible, arrays decay, and `void*` is a wildcard on
    /// either side of a pointer pair. Pointer pairs otherwise require
    /// compatible pointee types.
    pub fn compatible(target: &CType, source: &CType) -> bool {
        let t = target.decayed();
        let s = source.decayed();

        if t == s {
            return true;
        }
        if t.is_numeric() && s.is_numeric() {
            return true;
        }
        if t.is_pointer() && s.is_pointer() {
            if (t.base == "void" && t.pointers == 1) || (s.base == "void" && s.pointers == 1) {
                return true;
            }
            return Self::compatible(&t.deref(), &s.deref());
        }
        false
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qualifier in &self.qualifiers {
            write!(f, "{} ", qualifier)?;
        }
        write!(f, "{}", self.base)?;
        for _ in 0..self.pointers {
            write!(f, "*")?;
        }
        if self.array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
