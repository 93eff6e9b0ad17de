//! Symbol table.
//!
//! Symbols live in one index-addressed arena per source unit. Nesting is
//! expressed with parent/children ids, so a function's locals are children of
//! the function symbol and struct fields are children of the struct. Lookup
//! walks from a starting symbol outward through its parents, then falls back
//! to the top level.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::SymError;
use crate::kind::SymKind;
use crate::symbol::Symbol;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
    roots: Vec<u32>,
    #[serde(skip)]
    by_name: FxHashMap<String, Vec<u32>>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols ever added, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.syms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }

    /// Adds `sym` under `parent` (or at the top level) and returns its id.
    /// Ids start at 1.
    ///
    /// # Errors
    ///
    /// Returns [`SymError::EmptyName`] for a nameless symbol and
    /// [`SymError::UnknownSymbol`] when `parent` does not exist.
    pub fn add(&mut self, mut sym: Symbol, parent: Option<u32>) -> Result<u32, SymError> {
        if sym.name.is_empty() {
            return Err(SymError::EmptyName(sym.kind));
        }
        if let Some(p) = parent {
            if self.get(p).is_none() {
                return Err(SymError::UnknownSymbol(p));
            }
        }
        let id = u32::try_from(self.syms.len() + 1).unwrap_or(u32::MAX);
        sym.id = id;
        sym.parent = parent;
        self.by_name.entry(sym.name.clone()).or_default().push(id);
        self.syms.push(sym);
        match parent.and_then(|p| self.get_mut(p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Symbol> {
        id.checked_sub(1).and_then(|i| self.syms.get(i as usize))
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Symbol> {
        id.checked_sub(1).and_then(|i| self.syms.get_mut(i as usize))
    }

    /// Top-level symbols in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[u32] {
        &self.roots
    }

    #[must_use]
    pub fn children(&self, id: u32) -> &[u32] {
        self.get(id).map_or(&[], |s| s.children.as_slice())
    }

    /// Direct child of `id` named `name`.
    #[must_use]
    pub fn child_by_name(&self, id: u32, name: &str) -> Option<u32> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.get(*c).is_some_and(|s| s.name == name))
    }

    /// Top-level symbol named `name`; package symbols are searched through.
    #[must_use]
    pub fn find_top(&self, name: &str) -> Option<u32> {
        for &root in &self.roots {
            let Some(sym) = self.get(root) else {
                continue;
            };
            if sym.name == name && sym.kind != SymKind::Package {
                return Some(root);
            }
            if sym.kind == SymKind::Package {
                if let Some(hit) = self.child_by_name(root, name) {
                    return Some(hit);
                }
            }
        }
        None
    }

    /// Resolves `name` as seen from symbol `from`: children of `from` and of
    /// each enclosing symbol, innermost first, then the top level.
    #[must_use]
    pub fn lookup(&self, name: &str, from: Option<u32>) -> Option<u32> {
        let mut cur = from;
        while let Some(id) = cur {
            if let Some(hit) = self.child_by_name(id, name) {
                return Some(hit);
            }
            cur = self.get(id).and_then(|s| s.parent);
        }
        self.find_top(name)
    }

    /// Resolves a dotted path such as `Point.X` or `fmt.Println` from the top
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`SymError::PathNotFound`] when any segment is missing.
    pub fn lookup_path(&self, path: &str) -> Result<u32, SymError> {
        let not_found = || SymError::PathNotFound(path.to_string());
        let mut segs = path.split('.');
        let first = segs.next().ok_or_else(not_found)?;
        let mut cur = self.find_top(first).ok_or_else(not_found)?;
        for seg in segs {
            cur = self.child_by_name(cur, seg).ok_or_else(not_found)?;
        }
        Ok(cur)
    }

    /// Every attached symbol with this exact name, in insertion order.
    #[must_use]
    pub fn by_name(&self, name: &str) -> &[u32] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Attached symbols whose name starts with `prefix`, sorted by name.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .by_name
            .iter()
            .filter(|(n, _)| n.starts_with(prefix))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        out.sort_by(|a, b| self.name(*a).cmp(self.name(*b)).then(a.cmp(b)));
        out
    }

    #[must_use]
    pub fn name(&self, id: u32) -> &str {
        self.get(id).map_or("", |s| s.name.as_str())
    }

    /// Detaches every descendant of `id`. Detached symbols stay in the arena
    /// (ids remain valid) but are no longer reachable by name or from `id`.
    pub fn clear_children(&mut self, id: u32) {
        let kids = match self.get_mut(id) {
            Some(sym) => std::mem::take(&mut sym.children),
            None => return,
        };
        for kid in kids {
            self.clear_children(kid);
            let Some(name) = self.get(kid).map(|s| s.name.clone()) else {
                continue;
            };
            if let Some(ids) = self.by_name.get_mut(&name) {
                ids.retain(|x| *x != kid);
            }
        }
    }

    /// Rebuilds the name index, e.g. after deserialization.
    pub fn reindex(&mut self) {
        self.by_name.clear();
        let mut stack: Vec<u32> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(sym) = id.checked_sub(1).and_then(|i| self.syms.get(i as usize)) else {
                continue;
            };
            self.by_name.entry(sym.name.clone()).or_default().push(id);
            stack.extend(sym.children.iter().rev().copied());
        }
    }

    /// Reachable symbols, depth first from the roots.
    #[must_use]
    pub fn walk(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack: Vec<u32> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (SymbolTable, u32, u32, u32) {
        let mut t = SymbolTable::new();
        let pkg = t.add(Symbol::new("main", SymKind::Package), None).unwrap();
        let f = t.add(Symbol::new("run", SymKind::Function), Some(pkg)).unwrap();
        let x = t.add(Symbol::new("x", SymKind::Var), Some(f)).unwrap();
        (t, pkg, f, x)
    }

    #[test]
    fn lookup_walks_outward() {
        let (t, _, f, x) = table();
        assert_eq!(t.lookup("x", Some(f)), Some(x));
        assert_eq!(t.lookup("run", Some(x)), Some(f));
        assert_eq!(t.lookup("x", None), None);
        assert_eq!(t.lookup_path("run.x").ok(), Some(x));
        assert!(t.lookup_path("run.y").is_err());
    }

    #[test]
    fn cleared_children_are_unreachable() {
        let (mut t, _, f, x) = table();
        t.clear_children(f);
        assert!(t.children(f).is_empty());
        assert!(t.by_name("x").is_empty());
        assert!(t.get(x).is_some());
        assert_eq!(t.walk().len(), 2);
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut t = SymbolTable::new();
        assert!(t.add(Symbol::new("", SymKind::Var), None).is_err());
        assert!(t.add(Symbol::new("a", SymKind::Var), Some(7)).is_err());
    }
}
