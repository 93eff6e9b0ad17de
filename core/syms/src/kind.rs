use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// What a named entity is. Kinds group into sub-categories
/// ([`SymKind::sub_cat`]) that inference dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymKind {
    Package,
    Import,
    Var,
    VarGlobal,
    /// A method's bound receiver.
    VarClass,
    VarParam,
    Field,
    Constant,
    Function,
    Method,
    Type,
    Struct,
    Interface,
}

impl SymKind {
    #[must_use]
    pub const fn sub_cat(self) -> SymKind {
        match self {
            SymKind::Var | SymKind::VarGlobal | SymKind::VarClass | SymKind::VarParam => {
                SymKind::Var
            }
            SymKind::Function | SymKind::Method => SymKind::Function,
            SymKind::Type | SymKind::Struct | SymKind::Interface => SymKind::Type,
            other => other,
        }
    }

    /// Kinds that introduce a scope for the symbols nested in them.
    #[must_use]
    pub const fn is_scope(self) -> bool {
        matches!(
            self,
            SymKind::Package
                | SymKind::Function
                | SymKind::Method
                | SymKind::Type
                | SymKind::Struct
                | SymKind::Interface
        )
    }
}

impl Display for SymKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymKind::Package => "package",
            SymKind::Import => "import",
            SymKind::Var => "var",
            SymKind::VarGlobal => "global",
            SymKind::VarClass => "receiver",
            SymKind::VarParam => "param",
            SymKind::Field => "field",
            SymKind::Constant => "const",
            SymKind::Function => "func",
            SymKind::Method => "method",
            SymKind::Type => "type",
            SymKind::Struct => "struct",
            SymKind::Interface => "interface",
        };
        write!(f, "{s}")
    }
}
