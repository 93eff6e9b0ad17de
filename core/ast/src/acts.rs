use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// How a successful rule match is folded into the tree under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AstAct {
    /// The match leaves no trace in the tree; its children attach to the
    /// current node.
    #[default]
    NoAst,
    /// Append a new child node named after the rule.
    AddAst,
    /// Merge the match into an existing node: the innermost anchor if there is
    /// one, otherwise the current node.
    SubAst,
    /// Like `AddAst`, and record the new node as an anchor in the enclosing
    /// rule's scope.
    AnchorAst,
    /// Like `AnchorAst`, but only the first anchor of that name in the scope
    /// is kept.
    AnchorFirstAst,
}

impl AstAct {
    #[must_use]
    pub const fn creates_node(self) -> bool {
        matches!(
            self,
            AstAct::AddAst | AstAct::AnchorAst | AstAct::AnchorFirstAst
        )
    }
}

impl Display for AstAct {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
