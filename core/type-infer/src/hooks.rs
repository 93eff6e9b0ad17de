//! The language-specific half of inference.

use pi_syms::Type;
use serde::{Deserialize, Serialize};

use crate::infer::TypeInfer;

/// Per-language type resolution that the generic dispatch calls into.
pub trait TypeHooks: Send + Sync {
    /// The type called `name` as seen from the package being inferred:
    /// builtins, types of that package, then imported packages.
    fn find_type_name(&self, cx: &TypeInfer<'_>, name: &str) -> Option<Type>;

    /// Type of the type-expression or value-expression subtree at `node`.
    /// May resolve other symbols through [`TypeInfer::ensure_resolved`].
    fn type_from_ast(&self, cx: &mut TypeInfer<'_>, node: u32) -> Option<Type>;

    /// Parameter and return lists of the function declared at `node`. The
    /// caller names and registers the type.
    fn func_type_from_ast(&self, cx: &mut TypeInfer<'_>, node: u32) -> Option<Type>;
}

/// AST node names the generic dispatch looks for. Matching is by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeNames {
    /// A for-each binding; the ranged expression is its second child.
    pub for_range: String,
    pub const_spec: String,
    /// A name leaf, skipped when looking for a constant's value.
    pub name: String,
    /// Trailing annotation on a type declaration, skipped when looking for
    /// the declared type.
    pub field_tag: String,
}

impl Default for NodeNames {
    fn default() -> Self {
        Self {
            for_range: "ForRange".to_string(),
            const_spec: "ConstSpec".to_string(),
            name: "Name".to_string(),
            field_tag: "FieldTag".to_string(),
        }
    }
}
