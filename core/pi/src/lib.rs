#![warn(clippy::pedantic)]
//! Language support hub for the pi parsing framework.
//!
//! This crate ties the engine crates together behind one plugin contract:
//!
//! ```text
//! source → pi-lex → tokens → pi-parse (+ pi-ast actions) → AST
//!        → Lang::populate_symbols → SymbolTable → pi-type-infer → typed symbols
//!        → Lang::complete_line / lookup / complete_edit
//! ```
//!
//! - [`Lang`] is the capability set a language provides: rule trees, type
//!   hooks, symbol population and the three editor entry points.
//! - [`LangSupport`] is the process-wide registry, keyed by [`Supported`]
//!   and carrying each language's [`LangProps`].
//! - [`FileStates`] holds the double-buffered state of one source unit.
//! - [`pipeline`] runs the passes; [`PiConfig`] configures them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pi::{FileStates, LangSupport, PiConfig, Supported, pipeline};
//! use pi_syms::TypeRegistry;
//!
//! fn run(src: &str) -> anyhow::Result<()> {
//!     let lang = LangSupport::global().lang(Supported::Go)?;
//!     let fss = FileStates::new("main.go", Supported::Go, Arc::new(TypeRegistry::new()));
//!     let report = pipeline::process(&fss, lang.as_ref(), src, &PiConfig::default(), None)?;
//!     println!("{} symbols", report.symbols);
//!     Ok(())
//! }
//! ```

pub mod complete;
pub mod config;
pub mod diag;
pub mod errors;
pub mod file_state;
pub mod lang;
pub mod pipeline;
pub mod props;
pub mod registry;

pub use complete::{Completion, Edit, Lookup, Matches};
pub use config::{LangOverride, PiConfig, RecoveryMode};
pub use diag::Diagnostic;
pub use errors::LangError;
pub use file_state::{FileState, FileStates};
pub use lang::{GrammarLang, Lang};
pub use props::{LangFlags, LangProps, Supported, std_lang_props};
pub use registry::LangSupport;
