//! Lex, parse, populate symbols, infer types.
//!
//! A single source unit goes through [`process`]. Projects go through
//! [`process_files`], which runs the two halves separately: every file is
//! parsed and populated first, so types declared anywhere in a package are
//! registered before any file is inferred.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pi_syms::{SymType, TypeRegistry};
use pi_type_infer::{CancelToken, InferReport, TypeHooks, TypeInfer};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PiConfig;
use crate::diag::Diagnostic;
use crate::errors::LangError;
use crate::file_state::{FileState, FileStates};
use crate::lang::Lang;
use crate::props::Supported;
use crate::registry::LangSupport;

/// Summary of one pipeline pass over a source unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub pkg: String,
    pub tokens: usize,
    pub nodes: usize,
    pub symbols: usize,
    /// Parse errors recovered from.
    pub diagnostics: Vec<Diagnostic>,
    pub infer: Option<InferReport>,
}

/// Runs the whole pipeline over `src` and publishes the result in `fss`,
/// including the partial result of a failed pass.
///
/// # Errors
///
/// Returns the lex or parse failure, or a cancellation during inference.
pub fn process(
    fss: &FileStates,
    lang: &dyn Lang,
    src: &str,
    config: &PiConfig,
    cancel: Option<&CancelToken>,
) -> anyhow::Result<FileReport> {
    let result = {
        let mut proc = fss.start_proc(src);
        parse_and_populate(&mut proc, lang, fss.types(), config).and_then(|()| {
            let infer = infer_types(&mut proc, lang, fss.types(), config, cancel)?;
            Ok(FileReport {
                infer,
                ..summarize(&proc)
            })
        })
    };
    fss.end_proc();
    result.with_context(|| format!("processing {}", fss.filename()))
}

/// Lexes and parses `fs.src`, then populates `fs.syms`.
///
/// # Errors
///
/// Returns the lex error or the unrecovered parse error; it is also recorded
/// in `fs.errors`.
pub fn parse_and_populate(
    fs: &mut FileState,
    lang: &dyn Lang,
    types: &TypeRegistry,
    config: &PiConfig,
) -> anyhow::Result<()> {
    let released = types.release(&fs.filename);
    if released > 0 {
        debug!(file = %fs.filename, released, "stale types released");
    }
    parse(fs, lang, config)?;
    lang.populate_symbols(fs, types);
    debug!(file = %fs.filename, symbols = fs.syms.len(), "symbols populated");
    Ok(())
}

/// Lexes and parses `fs.src` with the recovery policy from `config`.
///
/// # Errors
///
/// Returns the lex error or the unrecovered parse error.
pub fn parse(fs: &mut FileState, lang: &dyn Lang, config: &PiConfig) -> anyhow::Result<()> {
    let parser = lang
        .parser()
        .ok_or_else(|| LangError::NoParser(lang.sup().to_string()))?;
    let lexed = match parser.lex(&fs.src) {
        Ok(lexed) => lexed,
        Err(err) => {
            fs.errors.push(Diagnostic::from(&err));
            return Err(err.into());
        }
    };
    fs.lex = lexed.clone();
    let recovery = config.recovery_policy(lang);
    let out = match parser.parse_lexed(&fs.src, lexed, recovery.as_ref()) {
        Ok(out) => out,
        Err(err) => {
            fs.tokens = fs.lex.significant();
            fs.errors.push(Diagnostic::from(&err));
            return Err(err.into());
        }
    };
    fs.errors.extend(out.errors.iter().map(Diagnostic::from));
    fs.lex = out.lex;
    fs.tokens = out.tokens;
    fs.ast = out.ast;
    fs.stats = Some(out.stats);
    Ok(())
}

/// Infers symbol types and annotates each symbol's AST node with its type.
/// Languages without type hooks are left as populated.
///
/// # Errors
///
/// Returns the cancellation error; symbols inferred before it keep their
/// types.
pub fn infer_types(
    fs: &mut FileState,
    lang: &dyn Lang,
    types: &TypeRegistry,
    config: &PiConfig,
    cancel: Option<&CancelToken>,
) -> anyhow::Result<Option<InferReport>> {
    let Some(hooks) = lang.type_hooks() else {
        return Ok(None);
    };
    let result = run_infer(fs, hooks, lang, types, config, cancel);
    annotate(fs);
    if config.trace_types {
        trace_unresolved(fs);
    }
    Ok(Some(result?))
}

fn run_infer(
    fs: &mut FileState,
    hooks: &dyn TypeHooks,
    lang: &dyn Lang,
    types: &TypeRegistry,
    config: &PiConfig,
    cancel: Option<&CancelToken>,
) -> anyhow::Result<InferReport> {
    let pkg = fs.pkg.clone();
    let mut infer = TypeInfer::new(&fs.ast, &mut fs.syms, types, &pkg, hooks)
        .with_owner(&fs.filename)
        .with_names(lang.node_names())
        .with_fun_internal(config.fun_internal);
    if let Some(cancel) = cancel {
        infer = infer.with_cancel(cancel);
    }
    let report = infer.infer_all()?;
    debug!(file = %fs.filename, ?report, "types inferred");
    Ok(report)
}

fn annotate(fs: &mut FileState) {
    let typed: Vec<(u32, String)> = fs
        .syms
        .walk()
        .into_iter()
        .filter_map(|id| fs.syms.get(id))
        .filter(|s| s.ty.is_known())
        .filter_map(|s| s.ast.map(|node| (node, s.ty.name().to_string())))
        .collect();
    for (node, ty) in typed {
        fs.ast.annotate(node, &ty);
    }
}

fn trace_unresolved(fs: &FileState) {
    for id in fs.syms.walk() {
        let Some(sym) = fs.syms.get(id) else {
            continue;
        };
        if sym.ty == SymType::Error {
            info!(file = %fs.filename, symbol = %sym.name, kind = %sym.kind, "type unresolved");
        }
    }
}

fn summarize(fs: &FileState) -> FileReport {
    FileReport {
        filename: fs.filename.clone(),
        pkg: fs.pkg.clone(),
        tokens: fs.lex.tokens.len(),
        nodes: fs.ast.len(),
        symbols: fs.syms.walk().len(),
        diagnostics: fs.errors.clone(),
        infer: None,
    }
}

/// One file of a [`process_files`] run.
pub struct Processed {
    pub states: FileStates,
    pub report: anyhow::Result<FileReport>,
}

/// Runs the pipeline over every file in `paths` whose language has a plugin
/// in `support`; other files are skipped. All files share `types`.
///
/// Failures are per file. The cancel token is checked between files.
///
/// # Errors
///
/// Returns [`LangError::Cancelled`] when cancelled.
pub fn process_files(
    support: &LangSupport,
    paths: &[PathBuf],
    types: &Arc<TypeRegistry>,
    config: &PiConfig,
    cancel: Option<&CancelToken>,
) -> anyhow::Result<Vec<Processed>> {
    let mut files = Vec::new();
    for (i, path) in paths.iter().enumerate() {
        check_cancel(cancel, paths.len() - i)?;
        let Some(sup) = Supported::from_filename(&path.to_string_lossy()) else {
            debug!(path = %path.display(), "skipping file of unknown language");
            continue;
        };
        let lang = match support.lang(sup) {
            Ok(lang) => lang,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping file");
                continue;
            }
        };
        let filename = path.to_string_lossy().to_string();
        let states = FileStates::new(&filename, sup, Arc::clone(types));
        let parsed = std::fs::read_to_string(path)
            .with_context(|| format!("reading {filename}"))
            .and_then(|src| {
                let mut proc = states.start_proc(&src);
                parse_and_populate(&mut proc, lang.as_ref(), types, config)
            });
        if let Err(err) = &parsed {
            warn!(file = %filename, error = %err, "parse failed");
        }
        files.push((lang, states, parsed));
    }

    let total = files.len();
    let mut out = Vec::with_capacity(total);
    for (i, (lang, states, parsed)) in files.into_iter().enumerate() {
        check_cancel(cancel, total - i)?;
        let report = parsed.and_then(|()| {
            let mut proc = states.proc();
            let infer = infer_types(&mut proc, lang.as_ref(), types, config, cancel)?;
            Ok(FileReport {
                infer,
                ..summarize(&proc)
            })
        });
        states.end_proc();
        out.push(Processed {
            report: report.with_context(|| format!("processing {}", states.filename())),
            states,
        });
    }
    Ok(out)
}

fn check_cancel(cancel: Option<&CancelToken>, remaining: usize) -> Result<(), LangError> {
    if cancel.is_some_and(CancelToken::is_cancelled) {
        debug!(remaining, "pipeline cancelled");
        return Err(LangError::Cancelled { remaining });
    }
    Ok(())
}
