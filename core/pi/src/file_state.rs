//! Per source unit parse state.
//!
//! [`FileStates`] double-buffers a [`FileState`]: the pipeline fills the
//! `proc` buffer while completion and lookup keep reading the last finished
//! `done` buffer, and [`FileStates::end_proc`] swaps them.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use pi_ast::Arena;
use pi_lex::{LexOutput, Token};
use pi_parse::ParseStats;
use pi_syms::{SymbolTable, TypeRegistry};

use crate::diag::Diagnostic;
use crate::props::Supported;

/// Everything one pipeline pass produced for a source unit.
#[derive(Debug, Clone)]
pub struct FileState {
    pub filename: String,
    pub sup: Supported,
    pub src: String,
    pub lex: LexOutput,
    /// Significant tokens; AST token spans index into these.
    pub tokens: Vec<Token>,
    pub ast: Arena,
    pub syms: SymbolTable,
    /// Package the unit declares; empty when the language has none.
    pub pkg: String,
    pub errors: Vec<Diagnostic>,
    pub stats: Option<ParseStats>,
}

impl FileState {
    #[must_use]
    pub fn new(filename: &str, sup: Supported, src: &str) -> Self {
        Self {
            filename: filename.to_string(),
            sup,
            src: src.to_string(),
            lex: LexOutput::default(),
            tokens: Vec::new(),
            ast: Arena::default(),
            syms: SymbolTable::new(),
            pkg: String::new(),
            errors: Vec::new(),
            stats: None,
        }
    }

    /// Source line `line` (zero-based) without its newline.
    #[must_use]
    pub fn line(&self, line: u32) -> &str {
        self.src.lines().nth(line as usize).unwrap_or("")
    }
}

pub struct FileStates {
    filename: String,
    sup: Supported,
    types: Arc<TypeRegistry>,
    done: RwLock<FileState>,
    proc: Mutex<FileState>,
}

impl FileStates {
    #[must_use]
    pub fn new(filename: &str, sup: Supported, types: Arc<TypeRegistry>) -> Self {
        Self {
            filename: filename.to_string(),
            sup,
            types,
            done: RwLock::new(FileState::new(filename, sup, "")),
            proc: Mutex::new(FileState::new(filename, sup, "")),
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn sup(&self) -> Supported {
        self.sup
    }

    /// Package type registry shared with the other units of the project.
    #[must_use]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// The last finished pass.
    pub fn done(&self) -> RwLockReadGuard<'_, FileState> {
        self.done.read()
    }

    /// Resets the processing buffer to `src` and hands it to the caller.
    pub fn start_proc(&self, src: &str) -> MutexGuard<'_, FileState> {
        let mut proc = self.proc.lock();
        *proc = FileState::new(&self.filename, self.sup, src);
        proc
    }

    /// The processing buffer as left by the last [`FileStates::start_proc`].
    pub fn proc(&self) -> MutexGuard<'_, FileState> {
        self.proc.lock()
    }

    /// Publishes the processing buffer as the done state. Any guard from
    /// [`FileStates::start_proc`] must be dropped first.
    pub fn end_proc(&self) {
        let mut proc = self.proc.lock();
        let mut done = self.done.write();
        std::mem::swap(&mut *proc, &mut *done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_changes_only_on_end_proc() {
        let fss = FileStates::new("a.go", Supported::Go, Arc::new(TypeRegistry::new()));
        {
            let mut proc = fss.start_proc("package a\n");
            proc.pkg = "a".into();
        }
        assert!(fss.done().src.is_empty());
        fss.end_proc();
        assert_eq!(fss.done().pkg, "a");
        assert_eq!(fss.done().line(0), "package a");
    }
}
