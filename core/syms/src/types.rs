//! Type descriptions shared by symbols and the package type registry.

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::kind::SymKind;
use crate::symbol::Scopes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeKind {
    #[default]
    Unknown,
    Basic,
    Named,
    Struct,
    Interface,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Func,
    Tuple,
}

/// A named element of a composite type: a struct field, a parameter or a
/// return value. `name` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEl {
    pub name: String,
    pub ty: String,
}

impl TypeEl {
    #[must_use]
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }
}

impl Display for TypeEl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.name, self.ty)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub kind: TypeKind,
    /// Owning package (and any enclosing type). Builtins have none.
    pub scopes: Scopes,
    /// Fields of a struct, element type(s) of a pointer, slice, map or chan.
    pub els: Vec<TypeEl>,
    pub params: Vec<TypeEl>,
    pub returns: Vec<TypeEl>,
}

impl Type {
    #[must_use]
    pub fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_package(mut self, pkg: &str) -> Self {
        self.scopes.insert(SymKind::Package, pkg);
        self
    }

    #[must_use]
    pub fn with_el(mut self, name: &str, ty: &str) -> Self {
        self.els.push(TypeEl::new(name, ty));
        self
    }

    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.scopes.package()
    }

    #[must_use]
    pub fn el_by_name(&self, name: &str) -> Option<&TypeEl> {
        self.els.iter().find(|e| e.name == name)
    }

    /// Parameter list without parentheses: `a int, b string`.
    #[must_use]
    pub fn arg_string(&self) -> String {
        join(&self.params)
    }

    /// `int` for one unnamed result, `(int, error)` for several, empty for
    /// none.
    #[must_use]
    pub fn return_string(&self) -> String {
        match self.returns.as_slice() {
            [] => String::new(),
            [one] if one.name.is_empty() => one.ty.clone(),
            many => format!("({})", join(many)),
        }
    }

    /// Signature display: `(a int) (int, error)`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("({}) {}", self.arg_string(), self.return_string())
            .trim_end()
            .to_string()
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Func => write!(f, "{}{}", self.name, self.signature()),
            TypeKind::Struct if !self.els.is_empty() => {
                write!(f, "{} {{{}}}", self.name, join(&self.els))
            }
            _ => write!(f, "{}", self.name),
        }
    }
}

fn join(els: &[TypeEl]) -> String {
    els.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prefixes `pkg.` to the base name of `ty`, after any pointer, slice or
/// array markers: `*Foo` in `bar` becomes `*bar.Foo`. Already qualified
/// names are returned unchanged.
#[must_use]
pub fn qualify_type(pkg: &str, ty: &str) -> String {
    let base_at = prefix_len(ty);
    let (prefix, base) = ty.split_at(base_at);
    if pkg.is_empty() || base.is_empty() || base.contains('.') {
        return ty.to_string();
    }
    format!("{prefix}{pkg}.{base}")
}

/// Type name as seen from package `pkg`: qualified with its own package when
/// that differs, bare otherwise.
#[must_use]
pub fn type_name_for_pkg(ty: &Type, pkg: &str) -> String {
    match ty.package() {
        Some(owner) if owner != pkg => qualify_type(owner, &ty.name),
        _ => ty.name.clone(),
    }
}

fn prefix_len(ty: &str) -> usize {
    let b = ty.as_bytes();
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'*' => i += 1,
            b'[' => match ty[i..].find(']') {
                Some(close) => i += close + 1,
                None => break,
            },
            _ => break,
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_after_markers() {
        assert_eq!(qualify_type("bar", "Foo"), "bar.Foo");
        assert_eq!(qualify_type("bar", "*Foo"), "*bar.Foo");
        assert_eq!(qualify_type("bar", "[]*Foo"), "[]*bar.Foo");
        assert_eq!(qualify_type("bar", "[4]Foo"), "[4]bar.Foo");
        assert_eq!(qualify_type("bar", "baz.Foo"), "baz.Foo");
    }

    #[test]
    fn qualification_depends_on_package() {
        let ty = Type::new("Point", TypeKind::Struct).in_package("geom");
        assert_eq!(type_name_for_pkg(&ty, "geom"), "Point");
        assert_eq!(type_name_for_pkg(&ty, "main"), "geom.Point");
        let builtin = Type::new("int", TypeKind::Basic);
        assert_eq!(type_name_for_pkg(&builtin, "main"), "int");
    }

    #[test]
    fn signatures() {
        let mut f = Type::new("func Div", TypeKind::Func);
        f.params = vec![TypeEl::new("a", "int"), TypeEl::new("b", "int")];
        assert_eq!(f.signature(), "(a int, b int)");
        f.returns = vec![TypeEl::new("", "int")];
        assert_eq!(f.signature(), "(a int, b int) int");
        f.returns.push(TypeEl::new("", "error"));
        assert_eq!(f.return_string(), "(int, error)");
    }
}
