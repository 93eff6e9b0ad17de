#![warn(clippy::pedantic)]
//! Syntax trees for the pi parsing framework.
//!
//! Trees are stored in an index-addressed [`Arena`]; parents, children and
//! symbol back-references are plain `u32` ids. Trees are built by replaying
//! rule [`AstAct`]s through an [`AstBuilder`] and are read-only afterwards,
//! except for [`Arena::annotate`], which type inference uses to attach types
//! without changing the shape of the tree.

pub mod acts;
pub mod anchors;
pub mod arena;
pub mod builder;
pub mod errors;

pub use acts::AstAct;
pub use anchors::Anchors;
pub use arena::{Arena, AstNode};
pub use builder::{AstBuilder, Scope};
pub use errors::AstError;
