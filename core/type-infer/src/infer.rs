//! Symbol type inference.
//!
//! Every symbol moves at most once from `Unprocessed` to `Resolved` or
//! `Error` per pass (`Tentative` names are retried on later passes). The
//! walk is depth first over the symbol tree; each symbol is dispatched on its
//! kind to find the AST subtree that determines its type, and the language's
//! [`TypeHooks`] turn that subtree into a [`Type`].
//!
//! Symbols may depend on symbols declared later. Hooks resolve such a
//! dependency on demand with [`TypeInfer::ensure_resolved`], so results do not
//! depend on declaration order. A symbol already being inferred is never
//! re-entered, which keeps cyclic declarations finite.

use pi_ast::Arena;
use pi_syms::{
    Scopes, SymKind, SymType, SymbolTable, Type, TypeKind, TypeRegistry, type_name_for_pkg,
};
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::errors::InferError;
use crate::hooks::{NodeNames, TypeHooks};

/// Outcome counts of an [`TypeInfer::infer_all`] run over reachable symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InferReport {
    pub symbols: usize,
    pub resolved: usize,
    pub tentative: usize,
    pub errors: usize,
    pub unprocessed: usize,
}

pub struct TypeInfer<'a> {
    ast: &'a Arena,
    syms: &'a mut SymbolTable,
    types: &'a TypeRegistry,
    pkg: String,
    owner: String,
    hooks: &'a dyn TypeHooks,
    names: NodeNames,
    fun_internal: bool,
    cancel: Option<&'a CancelToken>,
    in_progress: FxHashSet<u32>,
    current: Vec<u32>,
}

impl<'a> TypeInfer<'a> {
    /// Inference over `syms` (built from `ast`) for package `pkg`.
    #[must_use]
    pub fn new(
        ast: &'a Arena,
        syms: &'a mut SymbolTable,
        types: &'a TypeRegistry,
        pkg: &str,
        hooks: &'a dyn TypeHooks,
    ) -> Self {
        Self {
            ast,
            syms,
            types,
            pkg: pkg.to_string(),
            owner: String::new(),
            hooks,
            names: NodeNames::default(),
            fun_internal: false,
            cancel: None,
            in_progress: FxHashSet::default(),
            current: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: NodeNames) -> Self {
        self.names = names;
        self
    }

    /// Keep function-local symbols. Off by default: function symbols lose
    /// their children once inferred.
    #[must_use]
    pub fn with_fun_internal(mut self, fun_internal: bool) -> Self {
        self.fun_internal = fun_internal;
        self
    }

    /// Registers function types on behalf of `owner`, see
    /// [`TypeRegistry::release`].
    #[must_use]
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = owner.to_string();
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: &'a CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn ast(&self) -> &'a Arena {
        self.ast
    }

    #[must_use]
    pub fn syms(&self) -> &SymbolTable {
        &*self.syms
    }

    pub fn syms_mut(&mut self) -> &mut SymbolTable {
        &mut *self.syms
    }

    #[must_use]
    pub fn types(&self) -> &'a TypeRegistry {
        self.types
    }

    #[must_use]
    pub fn pkg(&self) -> &str {
        &self.pkg
    }

    #[must_use]
    pub fn names(&self) -> &NodeNames {
        &self.names
    }

    /// Symbol currently being inferred, if any.
    #[must_use]
    pub fn current(&self) -> Option<u32> {
        self.current.last().copied()
    }

    /// Resolves `name` from the symbol being inferred outward.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.syms.lookup(name, self.current())
    }

    /// Display name of `ty` from the package being inferred.
    #[must_use]
    pub fn qualify(&self, ty: &Type) -> String {
        type_name_for_pkg(ty, &self.pkg)
    }

    /// Infers every reachable symbol. Top-level symbols (and the direct
    /// children of package symbols) are cancellation checkpoints.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::Cancelled`] when the cancel token fires; symbols
    /// inferred before that keep their types.
    pub fn infer_all(&mut self) -> Result<InferReport, InferError> {
        let mut units = Vec::new();
        for &root in self.syms.roots() {
            match self.syms.get(root).map(|s| s.kind) {
                Some(SymKind::Package) => units.extend_from_slice(self.syms.children(root)),
                Some(_) => units.push(root),
                None => {}
            }
        }
        for (i, &id) in units.iter().enumerate() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                debug!(done = i, remaining = units.len() - i, "type inference cancelled");
                return Err(InferError::Cancelled {
                    remaining: units.len() - i,
                });
            }
            self.infer_symbol_type(id);
        }
        Ok(self.report())
    }

    /// Counts type states over reachable symbols, packages excluded.
    #[must_use]
    pub fn report(&self) -> InferReport {
        let mut report = InferReport::default();
        for id in self.syms.walk() {
            let Some(sym) = self.syms.get(id) else {
                continue;
            };
            if matches!(sym.kind, SymKind::Package | SymKind::Import) {
                continue;
            }
            report.symbols += 1;
            match sym.ty {
                SymType::Unprocessed => report.unprocessed += 1,
                SymType::Resolved(_) => report.resolved += 1,
                SymType::Tentative(_) => report.tentative += 1,
                SymType::Error => report.errors += 1,
            }
        }
        report
    }

    /// Infers the type of symbol `id`, then of its children. Function
    /// symbols drop their children instead unless function-internal detail
    /// was requested.
    pub fn infer_symbol_type(&mut self, id: u32) {
        let Some(sym) = self.syms.get(id) else {
            return;
        };
        let kind = sym.kind;
        if sym.is_anonymous() {
            self.set_type(id, SymType::Error);
            return;
        }
        if sym.ty.needs_inference() && !self.in_progress.contains(&id) {
            if let Some(node) = sym.ast {
                self.in_progress.insert(id);
                self.current.push(id);
                let ty = self.infer_own(id, kind, node);
                self.current.pop();
                self.in_progress.remove(&id);
                if let Some(ty) = ty {
                    self.set_type(id, ty);
                }
            }
        }
        if !self.fun_internal && kind.sub_cat() == SymKind::Function {
            self.syms.clear_children(id);
            return;
        }
        let children = self.syms.children(id).to_vec();
        for child in children {
            if child != id {
                self.infer_symbol_type(child);
            }
        }
    }

    /// Makes sure `id` has been through inference once. Returns whether it
    /// now has a usable type. A symbol left untyped by the attempt is marked
    /// `Error`, so this never tries the same symbol twice.
    pub fn ensure_resolved(&mut self, id: u32) -> bool {
        if self.in_progress.contains(&id) {
            return false;
        }
        let Some(sym) = self.syms.get(id) else {
            return false;
        };
        if sym.ty == SymType::Unprocessed {
            let saved = self.fun_internal;
            self.fun_internal = true;
            self.infer_symbol_type(id);
            self.fun_internal = saved;
        }
        let Some(sym) = self.syms.get(id) else {
            return false;
        };
        match &sym.ty {
            SymType::Error => {
                trace!(symbol = %sym.name, kind = %sym.kind, "source symbol has type err");
                false
            }
            ty if !ty.is_known() => {
                trace!(symbol = %sym.name, kind = %sym.kind, "source symbol left untyped");
                self.set_type(id, SymType::Error);
                false
            }
            _ => true,
        }
    }

    /// Type name of a resolved symbol, or `None`.
    #[must_use]
    pub fn type_of(&self, id: u32) -> Option<&str> {
        self.syms
            .get(id)
            .filter(|s| s.ty.is_known())
            .map(|s| s.ty.name())
    }

    fn set_type(&mut self, id: u32, ty: SymType) {
        let Some(sym) = self.syms.get_mut(id) else {
            return;
        };
        if sym.ty.is_error() {
            return;
        }
        sym.ty = ty;
    }

    fn infer_own(&mut self, id: u32, kind: SymKind, node: u32) -> Option<SymType> {
        let (name, scopes) = {
            let sym = self.syms.get(id)?;
            (sym.name.clone(), sym.scopes.clone())
        };
        match kind {
            SymKind::Field => self.infer_field(&name, &scopes),
            SymKind::VarClass => scopes
                .sub_cat(SymKind::Type)
                .map(|t| SymType::Resolved(t.to_string())),
            k if k.sub_cat() == SymKind::Var => {
                let target = if self.ast.name(node).starts_with(&self.names.for_range) {
                    self.ast.child(node, 1)
                } else {
                    self.ast.last_child(node)
                };
                Some(self.resolve_subtree(&name, target))
            }
            SymKind::Constant => {
                if !self.ast.name(node).starts_with(&self.names.const_spec) {
                    trace!(symbol = %name, node = self.ast.name(node), "constant is not a const spec");
                    return None;
                }
                let value = self.const_value(node);
                Some(self.resolve_subtree(&name, value))
            }
            k if k.sub_cat() == SymKind::Type => {
                let hooks = self.hooks;
                if let Some(ty) = hooks.find_type_name(self, &name) {
                    return Some(SymType::Resolved(self.qualify(&ty)));
                }
                let n = self.ast.children(node).len();
                let mut target = self.ast.last_child(node);
                if target.is_some_and(|t| self.ast.name(t) == self.names.field_tag) {
                    target = n.checked_sub(2).and_then(|i| self.ast.child(node, i));
                }
                Some(self.resolve_subtree(&name, target))
            }
            SymKind::Function | SymKind::Method => self.infer_func(id, kind, &name, &scopes, node),
            _ => None,
        }
    }

    fn infer_field(&mut self, name: &str, scopes: &Scopes) -> Option<SymType> {
        let owner = scopes.get(SymKind::Struct)?.to_string();
        let hooks = self.hooks;
        if let Some(el) = hooks
            .find_type_name(self, &owner)
            .and_then(|st| st.el_by_name(name).cloned())
        {
            if !el.ty.is_empty() {
                return Some(SymType::Resolved(el.ty));
            }
        }
        Some(SymType::Tentative(format!("{owner}.{name}")))
    }

    fn infer_func(
        &mut self,
        id: u32,
        kind: SymKind,
        name: &str,
        scopes: &Scopes,
        node: u32,
    ) -> Option<SymType> {
        let hooks = self.hooks;
        let mut ftyp = hooks.func_type_from_ast(self, node)?;
        ftyp.name = match scopes.sub_cat(SymKind::Type) {
            Some(recv) if kind == SymKind::Method => format!("func {recv}.{name}"),
            _ => format!("func {name}"),
        };
        ftyp.kind = TypeKind::Func;
        ftyp.scopes.insert(SymKind::Package, &self.pkg);
        let detail = ftyp.signature();
        let type_name = ftyp.name.clone();
        self.types.add_owned(&self.owner, &self.pkg, ftyp);
        if let Some(sym) = self.syms.get_mut(id) {
            sym.detail = detail;
        }
        Some(SymType::Resolved(type_name))
    }

    /// The value expression of a const spec: its first child, or the child
    /// after a leading name. A spec with no value repeats the value of the
    /// first spec in its group.
    fn const_value(&self, node: u32) -> Option<u32> {
        let own = self.ast.child(node, 0).and_then(|first| {
            if self.ast.name(first) == self.names.name {
                self.ast.next_sibling(first)
            } else {
                Some(first)
            }
        });
        if own.is_some() {
            return own;
        }
        let group = self.ast.find_parent_node(node)?;
        let first_spec = self.ast.child(group, 0).filter(|s| *s != node)?;
        self.ast.child(first_spec, 0).and_then(|first| {
            if self.ast.name(first) == self.names.name {
                self.ast.next_sibling(first)
            } else {
                Some(first)
            }
        })
    }

    fn resolve_subtree(&mut self, symbol: &str, target: Option<u32>) -> SymType {
        let Some(target) = target else {
            trace!(symbol, "no type subtree");
            return SymType::Error;
        };
        let hooks = self.hooks;
        match hooks.type_from_ast(self, target) {
            Some(ty) if !ty.name.is_empty() => SymType::Resolved(self.qualify(&ty)),
            _ => {
                trace!(
                    symbol,
                    path = %self.ast.path_unique(target),
                    tree = %self.ast.write_tree(target),
                    "type not resolved from ast"
                );
                SymType::Error
            }
        }
    }
}
