use core::fmt;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use pi_lex::Region;
use serde::{Deserialize, Serialize};

use crate::kind::SymKind;

/// Display form of [`SymType::Error`].
pub const TYPE_ERR: &str = "<err>";

/// Inference state of a symbol's type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymType {
    /// Not attempted yet.
    #[default]
    Unprocessed,
    Resolved(String),
    /// A best-effort name (e.g. `Struct.field` for a field of an unknown
    /// struct). Shown like a resolved type, but inference tries again.
    Tentative(String),
    /// Inference was attempted and failed. Ordinary inference never touches
    /// the symbol again.
    Error,
}

impl SymType {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SymType::Unprocessed => "",
            SymType::Resolved(n) | SymType::Tentative(n) => n,
            SymType::Error => TYPE_ERR,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, SymType::Error)
    }

    /// Resolved or tentative with a non-empty name.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, SymType::Resolved(n) | SymType::Tentative(n) if !n.is_empty())
    }

    /// States ordinary inference will (re)process.
    #[must_use]
    pub fn needs_inference(&self) -> bool {
        matches!(self, SymType::Unprocessed | SymType::Tentative(_))
    }
}

impl Display for SymType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Enclosing scopes of a symbol or type, keyed by scope kind: e.g.
/// `{Package: "main", Struct: "Point"}` for a field of `main.Point`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scopes(pub BTreeMap<SymKind, String>);

impl Scopes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, kind: SymKind, name: &str) -> Self {
        self.0.insert(kind, name.to_string());
        self
    }

    pub fn insert(&mut self, kind: SymKind, name: &str) {
        self.0.insert(kind, name.to_string());
    }

    #[must_use]
    pub fn get(&self, kind: SymKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    /// First scope whose kind falls in the sub-category `cat`.
    #[must_use]
    pub fn sub_cat(&self, cat: SymKind) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.sub_cat() == cat)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.get(SymKind::Package)
    }
}

/// A named entity found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: u32,
    pub name: String,
    pub kind: SymKind,
    pub ty: SymType,
    /// Extra display text, e.g. a function signature.
    pub detail: String,
    pub scopes: Scopes,
    /// Defining AST node.
    pub ast: Option<u32>,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    pub filename: String,
    pub region: Region,
}

impl Symbol {
    #[must_use]
    pub fn new(name: &str, kind: SymKind) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            kind,
            ty: SymType::Unprocessed,
            detail: String::new(),
            scopes: Scopes::new(),
            ast: None,
            parent: None,
            children: Vec::new(),
            filename: String::new(),
            region: Region::default(),
        }
    }

    #[must_use]
    pub fn with_ast(mut self, ast: u32) -> Self {
        self.ast = Some(ast);
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Scopes) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_region(mut self, filename: &str, region: Region) -> Self {
        self.filename = filename.to_string();
        self.region = region;
        self
    }

    /// Names that inference never attempts: empty or `_`-prefixed.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty() || self.name.starts_with('_')
    }

    /// `Scope.Name` using the innermost type scope, or the bare name.
    #[must_use]
    pub fn label(&self) -> String {
        match self.scopes.sub_cat(SymKind::Type) {
            Some(scope) if self.kind != SymKind::Package => format!("{scope}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)?;
        if !self.ty.name().is_empty() {
            write!(f, " {}", self.ty)?;
        }
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}
