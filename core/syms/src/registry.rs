//! Package type registry.
//!
//! Types are registered once per package and referenced by name afterwards.
//! The registry is shared by every pipeline that touches a package: reads
//! take a shared lock on the package, and registration takes that package's
//! write lock, so writers to different packages never contend.
//!
//! Types may be registered on behalf of an owner, usually the source file
//! that declares them. [`TypeRegistry::release`] drops everything an owner
//! registered so a re-scanned file does not see its own stale declarations.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::types::Type;

pub type PackageTypes = Arc<RwLock<FxHashMap<String, Type>>>;

#[derive(Debug, Default)]
pub struct TypeRegistry {
    packages: RwLock<FxHashMap<String, PackageTypes>>,
    /// `(pkg, name)` keys registered by each owner.
    owners: Mutex<FxHashMap<String, Vec<(String, String)>>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The type map of `pkg`, created empty on first use.
    pub fn package(&self, pkg: &str) -> PackageTypes {
        if let Some(types) = self.packages.read().get(pkg) {
            return Arc::clone(types);
        }
        Arc::clone(self.packages.write().entry(pkg.to_string()).or_default())
    }

    /// Registers `ty` in `pkg` unless a type of that name is already there.
    /// Returns whether it was added.
    pub fn add(&self, pkg: &str, ty: Type) -> bool {
        let types = self.package(pkg);
        let mut types = types.write();
        if types.contains_key(&ty.name) {
            return false;
        }
        types.insert(ty.name.clone(), ty);
        true
    }

    /// [`TypeRegistry::add`], remembering `owner` as the type's source when
    /// it was added. An empty owner registers the type unowned.
    pub fn add_owned(&self, owner: &str, pkg: &str, ty: Type) -> bool {
        let name = ty.name.clone();
        if !self.add(pkg, ty) {
            return false;
        }
        if !owner.is_empty() {
            self.owners
                .lock()
                .entry(owner.to_string())
                .or_default()
                .push((pkg.to_string(), name));
        }
        true
    }

    /// Removes every type `owner` registered. Returns how many were removed.
    pub fn release(&self, owner: &str) -> usize {
        let Some(keys) = self.owners.lock().remove(owner) else {
            return 0;
        };
        let packages = self.packages.read();
        keys.iter()
            .filter(|(pkg, name)| {
                packages
                    .get(pkg)
                    .is_some_and(|types| types.write().remove(name).is_some())
            })
            .count()
    }

    #[must_use]
    pub fn get(&self, pkg: &str, name: &str) -> Option<Type> {
        let types = self.packages.read().get(pkg).map(Arc::clone)?;
        types.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, pkg: &str, name: &str) -> bool {
        self.packages
            .read()
            .get(pkg)
            .is_some_and(|types| types.read().contains_key(name))
    }

    /// Number of types registered in `pkg`.
    #[must_use]
    pub fn len(&self, pkg: &str) -> usize {
        self.packages
            .read()
            .get(pkg)
            .map_or(0, |types| types.read().len())
    }

    #[must_use]
    pub fn packages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.packages.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops every type of `pkg`, e.g. before the package is re-scanned.
    pub fn clear_package(&self, pkg: &str) {
        if let Some(types) = self.packages.read().get(pkg) {
            types.write().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::types::TypeKind;

    #[test]
    fn registered_once() {
        let reg = TypeRegistry::new();
        assert!(reg.add("main", Type::new("func f", TypeKind::Func)));
        assert!(!reg.add("main", Type::new("func f", TypeKind::Basic)));
        assert_eq!(reg.get("main", "func f").map(|t| t.kind), Some(TypeKind::Func));
        assert_eq!(reg.len("main"), 1);
        assert!(reg.get("other", "func f").is_none());
    }

    #[test]
    fn release_drops_only_owned_types() {
        let reg = TypeRegistry::new();
        assert!(reg.add_owned("a.go", "main", Type::new("T", TypeKind::Struct)));
        assert!(reg.add_owned("b.go", "main", Type::new("U", TypeKind::Struct)));
        assert!(!reg.add_owned("b.go", "main", Type::new("T", TypeKind::Basic)));
        assert!(reg.add("main", Type::new("V", TypeKind::Named)));

        assert_eq!(reg.release("a.go"), 1);
        assert!(!reg.contains("main", "T"));
        assert!(reg.contains("main", "U"));
        assert!(reg.contains("main", "V"));
        assert_eq!(reg.release("a.go"), 0);

        assert!(reg.add_owned("a.go", "main", Type::new("T", TypeKind::Named)));
        assert_eq!(reg.get("main", "T").map(|t| t.kind), Some(TypeKind::Named));
    }

    #[test]
    fn concurrent_registration() {
        let reg = Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || {
                    for j in 0..50 {
                        reg.add(&format!("p{}", i % 2), Type::new(&format!("T{j}"), TypeKind::Named));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.len("p0"), 50);
        assert_eq!(reg.len("p1"), 50);
        assert_eq!(reg.packages(), vec!["p0".to_string(), "p1".to_string()]);
    }
}
