#![warn(clippy::pedantic)]
//! Symbol type inference for the pi parsing framework.
//!
//! [`TypeInfer`] walks a populated [`pi_syms::SymbolTable`] and assigns a type
//! to every named entity, dispatching on the symbol kind to find the AST
//! subtree that carries the type. The language supplies the parts that read
//! its own syntax through [`TypeHooks`].
//!
//! Types whose owning package differs from the package being inferred are
//! stored qualified (`geom.Point`); same-package types are stored bare.
//! Failures never surface as errors: the symbol gets the
//! [`pi_syms::SymType::Error`] sentinel and is not attempted again.

pub mod cancel;
pub mod errors;
pub mod hooks;
pub mod infer;

pub use cancel::CancelToken;
pub use errors::InferError;
pub use hooks::{NodeNames, TypeHooks};
pub use infer::{InferReport, TypeInfer};
