#![warn(clippy::pedantic)]
//! Symbols and types for the pi parsing framework.
//!
//! A [`SymbolTable`] is an arena of [`Symbol`]s for one source unit; symbols
//! point at their defining AST nodes by id and at each other by id. Types are
//! registered per package in a [`TypeRegistry`] that many pipelines can read
//! at once.

pub mod errors;
pub mod kind;
pub mod registry;
pub mod symbol;
pub mod table;
pub mod types;

pub use errors::SymError;
pub use kind::SymKind;
pub use registry::{PackageTypes, TypeRegistry};
pub use symbol::{Scopes, SymType, Symbol, TYPE_ERR};
pub use table::SymbolTable;
pub use types::{Type, TypeEl, TypeKind, qualify_type, type_name_for_pkg};
