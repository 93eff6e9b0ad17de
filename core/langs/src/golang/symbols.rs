//! Symbol population for Go.
//!
//! Top-level declarations become children of the package symbol; methods
//! attach to their receiver type when it is declared in the same file.
//! Parameters and locals (including those of nested function literals) are
//! children of their function. Struct, interface and named types are also
//! registered in the package's type registry so that other files can see
//! their fields.

use pi::FileState;
use pi_ast::Arena;
use pi_syms::{Scopes, SymKind, Symbol, SymbolTable, Type, TypeKind, TypeRegistry};
use tracing::debug;

use crate::golang::types::{signature_text, type_text};

struct Populate<'a> {
    ast: &'a Arena,
    syms: &'a mut SymbolTable,
    filename: &'a str,
    pkg: String,
}

/// Fills `fs.syms` and `fs.pkg` from `fs.ast`.
pub(crate) fn populate(fs: &mut FileState, types: &TypeRegistry) {
    let Some(root) = fs.ast.root() else {
        return;
    };
    let pkg = fs
        .ast
        .child_by_name(root, "PackageClause")
        .and_then(|c| fs.ast.child_by_name(c, "Name"))
        .map(|n| fs.ast.src(n).to_string())
        .unwrap_or_default();
    let mut p = Populate {
        ast: &fs.ast,
        syms: &mut fs.syms,
        filename: &fs.filename,
        pkg: pkg.clone(),
    };
    p.file(root, types);
    fs.pkg = pkg;
}

fn child_names(ast: &Arena, node: u32) -> Vec<(u32, &str)> {
    ast.children(node)
        .iter()
        .filter(|c| ast.name(**c) == "Name")
        .map(|c| (*c, ast.src(*c)))
        .collect()
}

fn children_named<'a>(ast: &'a Arena, node: u32, name: &'a str) -> impl Iterator<Item = u32> + 'a {
    ast.children(node)
        .iter()
        .copied()
        .filter(move |c| ast.name(*c) == name)
}

impl Populate<'_> {
    fn scopes(&self) -> Scopes {
        if self.pkg.is_empty() {
            Scopes::new()
        } else {
            Scopes::new().with(SymKind::Package, &self.pkg)
        }
    }

    fn add(
        &mut self,
        name: &str,
        kind: SymKind,
        node: u32,
        scopes: Scopes,
        parent: Option<u32>,
    ) -> Option<u32> {
        if name == "_" {
            return None;
        }
        let region = self.ast.find_node(node).map(|n| n.region).unwrap_or_default();
        let sym = Symbol::new(name, kind)
            .with_ast(node)
            .with_scopes(scopes)
            .with_region(self.filename, region);
        match self.syms.add(sym, parent) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "symbol skipped");
                None
            }
        }
    }

    fn file(&mut self, root: u32, types: &TypeRegistry) {
        let ast = self.ast;
        let pkg_sym = match ast.child_by_name(root, "PackageClause") {
            Some(clause) if !self.pkg.is_empty() => {
                let pkg = self.pkg.clone();
                self.add(&pkg, SymKind::Package, clause, Scopes::new(), None)
            }
            _ => None,
        };
        let decls = ast.children(root).to_vec();
        for &decl in &decls {
            match ast.name(decl) {
                "ImportDecl" => self.imports(decl, pkg_sym),
                "ConstDecl" => self.consts(decl, pkg_sym),
                "VarDecl" => self.vars(decl, SymKind::VarGlobal, pkg_sym),
                "TypeDecl" => self.types(decl, pkg_sym, types),
                "FuncDecl" => self.func(decl, pkg_sym),
                _ => {}
            }
        }
        for &decl in &decls {
            if ast.name(decl) == "MethodDecl" {
                self.method(decl, pkg_sym);
            }
        }
    }

    fn imports(&mut self, decl: u32, parent: Option<u32>) {
        let ast = self.ast;
        for spec in children_named(ast, decl, "ImportSpec") {
            let Some(path_node) = ast.child_by_name(spec, "ImportPath") else {
                continue;
            };
            let path = ast.src(path_node).trim_matches('"');
            let name = ast
                .child_by_name(spec, "Name")
                .map_or_else(|| path.rsplit('/').next().unwrap_or(path), |n| ast.src(n));
            let scopes = self.scopes();
            if let Some(id) = self.add(name, SymKind::Import, spec, scopes, parent) {
                if let Some(sym) = self.syms.get_mut(id) {
                    sym.detail = path.to_string();
                }
            }
        }
    }

    fn consts(&mut self, decl: u32, parent: Option<u32>) {
        let ast = self.ast;
        for spec in children_named(ast, decl, "ConstSpec") {
            if let Some(name) = ast.child_by_name(spec, "Name") {
                let scopes = self.scopes();
                self.add(ast.src(name), SymKind::Constant, spec, scopes, parent);
            }
        }
    }

    fn vars(&mut self, decl: u32, kind: SymKind, parent: Option<u32>) {
        let ast = self.ast;
        for spec in children_named(ast, decl, "VarSpec") {
            for (_, name) in child_names(ast, spec) {
                let scopes = self.scopes();
                self.add(name, kind, spec, scopes, parent);
            }
        }
    }

    fn types(&mut self, decl: u32, parent: Option<u32>, types: &TypeRegistry) {
        let ast = self.ast;
        for spec in children_named(ast, decl, "TypeSpec") {
            let (Some(name_node), Some(def)) = (ast.child_by_name(spec, "Name"), ast.last_child(spec)) else {
                continue;
            };
            let name = ast.src(name_node);
            let (kind, ty) = match ast.name(def) {
                "StructType" => (SymKind::Struct, self.struct_type(name, def)),
                "InterfaceType" => (SymKind::Interface, self.interface_type(name, def)),
                _ => (
                    SymKind::Type,
                    Type::new(name, TypeKind::Named).with_el("", &type_text(ast, def)),
                ),
            };
            let ty = if self.pkg.is_empty() { ty } else { ty.in_package(&self.pkg) };
            types.add_owned(self.filename, &self.pkg, ty);
            let scopes = self.scopes();
            let Some(id) = self.add(name, kind, spec, scopes, parent) else {
                continue;
            };
            match kind {
                SymKind::Struct => self.fields(name, def, id),
                SymKind::Interface => self.interface_methods(name, def, id),
                _ => {}
            }
        }
    }

    fn struct_type(&self, name: &str, def: u32) -> Type {
        let ast = self.ast;
        let mut ty = Type::new(name, TypeKind::Struct);
        for field in children_named(ast, def, "Field") {
            if let Some(embedded) = ast.child_by_name(field, "Embedded") {
                let text: String = ast.src(embedded).split_whitespace().collect();
                let base = text.trim_start_matches('*');
                let base = base.rsplit('.').next().unwrap_or(base);
                ty = ty.with_el(base, &text);
                continue;
            }
            let Some(type_node) = ast
                .children(field)
                .iter()
                .copied()
                .find(|c| !matches!(ast.name(*c), "Name" | "FieldTag"))
            else {
                continue;
            };
            let field_ty = type_text(ast, type_node);
            for (_, fname) in child_names(ast, field) {
                ty = ty.with_el(fname, &field_ty);
            }
        }
        ty
    }

    fn interface_type(&self, name: &str, def: u32) -> Type {
        let ast = self.ast;
        let mut ty = Type::new(name, TypeKind::Interface);
        for spec in children_named(ast, def, "MethodSpec") {
            if let Some(m) = ast.child_by_name(spec, "Name") {
                ty = ty.with_el(ast.src(m), &format!("func{}", signature_text(ast, spec)));
            }
        }
        ty
    }

    fn fields(&mut self, owner: &str, def: u32, parent: u32) {
        let ast = self.ast;
        let scopes = self.scopes().with(SymKind::Struct, owner);
        for field in children_named(ast, def, "Field") {
            let names: Vec<&str> = match ast.child_by_name(field, "Embedded") {
                Some(embedded) => {
                    let src = ast.src(embedded).trim_start_matches('*').trim();
                    vec![src.rsplit('.').next().unwrap_or(src)]
                }
                None => child_names(ast, field).into_iter().map(|(_, n)| n).collect(),
            };
            for name in names {
                self.add(name, SymKind::Field, field, scopes.clone(), Some(parent));
            }
        }
    }

    fn interface_methods(&mut self, owner: &str, def: u32, parent: u32) {
        let ast = self.ast;
        let scopes = self.scopes().with(SymKind::Interface, owner);
        for spec in children_named(ast, def, "MethodSpec") {
            if let Some(m) = ast.child_by_name(spec, "Name") {
                self.add(ast.src(m), SymKind::Method, spec, scopes.clone(), Some(parent));
            }
        }
    }

    fn func(&mut self, decl: u32, parent: Option<u32>) {
        let ast = self.ast;
        let Some(name) = ast.child_by_name(decl, "Name") else {
            return;
        };
        let scopes = self.scopes();
        if let Some(id) = self.add(ast.src(name), SymKind::Function, decl, scopes, parent) {
            self.func_body(decl, id);
        }
    }

    fn method(&mut self, decl: u32, pkg_sym: Option<u32>) {
        let ast = self.ast;
        let (Some(recv), Some(name)) = (
            ast.child_by_name(decl, "Receiver"),
            ast.child_by_name(decl, "Name"),
        ) else {
            return;
        };
        let Some(recv_type) = ast.last_child(recv) else {
            return;
        };
        let recv_text = type_text(ast, recv_type);
        let base = recv_text.trim_start_matches('*').to_string();
        let scopes = self.scopes().with(SymKind::Type, &base);
        let owner = pkg_sym
            .and_then(|p| self.syms.child_by_name(p, &base))
            .or_else(|| self.syms.find_top(&base))
            .filter(|id| {
                self.syms
                    .get(*id)
                    .is_some_and(|s| s.kind.sub_cat() == SymKind::Type)
            })
            .or(pkg_sym);
        let Some(id) = self.add(ast.src(name), SymKind::Method, decl, scopes.clone(), owner) else {
            return;
        };
        if let Some(r) = ast.child_by_name(recv, "Name") {
            self.add(ast.src(r), SymKind::VarClass, recv, scopes, Some(id));
        }
        self.func_body(decl, id);
    }

    /// Parameters, named results and locals of the function at `decl`.
    fn func_body(&mut self, decl: u32, func: u32) {
        let ast = self.ast;
        for list in ["Params", "Results"] {
            if let Some(node) = ast.child_by_name(decl, list) {
                let kind = if list == "Params" { SymKind::VarParam } else { SymKind::Var };
                self.params(node, kind, func);
            }
        }
        if let Some(body) = ast.child_by_name(decl, "Block") {
            self.locals(body, func);
        }
    }

    /// In `a, b int` only `b` carries a `Name`; `a` is parsed as a type and
    /// shares the declaration of the next named parameter.
    fn params(&mut self, list: u32, kind: SymKind, func: u32) {
        let ast = self.ast;
        let decls: Vec<u32> = children_named(ast, list, "ParamDecl").collect();
        if !decls.iter().any(|d| ast.child_by_name(*d, "Name").is_some()) {
            return;
        }
        let scopes = self.scopes();
        let mut pending: Vec<&str> = Vec::new();
        for d in decls {
            match ast.child_by_name(d, "Name") {
                Some(n) => {
                    for p in pending.drain(..) {
                        self.add(p, kind, d, scopes.clone(), Some(func));
                    }
                    self.add(ast.src(n), kind, d, scopes.clone(), Some(func));
                }
                None => {
                    if let Some(t) = ast.last_child(d) {
                        pending.push(ast.src(t));
                    }
                }
            }
        }
    }

    fn locals(&mut self, node: u32, func: u32) {
        let ast = self.ast;
        for &child in ast.children(node) {
            let scopes = self.scopes();
            match ast.name(child) {
                "DefineStmt" | "TypeSwitchGuard" => {
                    for (_, name) in child_names(ast, child) {
                        self.add(name, SymKind::Var, child, scopes.clone(), Some(func));
                    }
                }
                "VarDecl" => self.vars(child, SymKind::Var, Some(func)),
                "ConstDecl" => self.consts(child, Some(func)),
                "ForRangeStmt" => {
                    if let Some(vars) = ast.child_by_name(child, "RangeVars") {
                        for (_, name) in child_names(ast, vars) {
                            self.add(name, SymKind::Var, child, scopes.clone(), Some(func));
                        }
                    }
                }
                _ => {}
            }
            self.locals(child, func);
        }
    }
}
