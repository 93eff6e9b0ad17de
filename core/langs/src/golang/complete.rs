//! Completion, lookup and edits for Go.

use pi::complete::{edit_word, seed_matches};
use pi::{Completion, Edit, FileState, FileStates, Lookup, Matches};
use pi_lex::Pos;
use pi_lex::text::last_scoped_string;
use pi_syms::{SymKind, Symbol, SymbolTable, Type, TypeKind, TypeRegistry};
use tracing::trace;

use crate::golang::lexer::{BASIC_TYPES, BUILTIN_FUNCS, keywords};
use crate::golang::types::{find_type, parse_type};

/// What the part of a dotted path before the last `.` denotes.
#[derive(Debug)]
enum Target {
    Package(String),
    /// A type name used as such: only its methods are reachable.
    Type(Type),
    Value(Type),
}

fn icon(kind: SymKind) -> &'static str {
    match kind {
        SymKind::Package | SymKind::Import => "package",
        SymKind::Function | SymKind::Method => "function",
        SymKind::Type | SymKind::Struct | SymKind::Interface => "type",
        SymKind::Field => "field",
        SymKind::Constant => "const",
        _ => "var",
    }
}

fn sym_completion(sym: &Symbol) -> Completion {
    let desc = match sym.kind {
        SymKind::Import => sym.detail.clone(),
        _ => sym.ty.name().to_string(),
    };
    Completion::new(&sym.name, icon(sym.kind))
        .label(&sym.label())
        .desc(&desc)
}

/// Innermost function or method whose region contains `pos`.
fn scope_at(syms: &SymbolTable, pos: Pos) -> Option<u32> {
    syms.walk()
        .into_iter()
        .filter_map(|id| syms.get(id))
        .filter(|s| s.kind.sub_cat() == SymKind::Function)
        .filter(|s| s.region.start <= pos && pos <= s.region.end)
        .max_by_key(|s| s.region.start)
        .map(|s| s.id)
}

/// Whether `id` is reachable by bare name from `scope`: package level, or a
/// local of `scope`.
fn visible(syms: &SymbolTable, id: u32, scope: Option<u32>) -> bool {
    let Some(sym) = syms.get(id) else {
        return false;
    };
    match sym.parent {
        None => true,
        Some(p) if Some(p) == scope => true,
        Some(p) => syms.get(p).is_some_and(|s| s.kind == SymKind::Package),
    }
}

fn import_package(sym: &Symbol) -> String {
    sym.detail
        .rsplit('/')
        .next()
        .filter(|p| !p.is_empty())
        .unwrap_or(&sym.name)
        .to_string()
}

fn resolve_head(fs: &FileState, types: &TypeRegistry, scope: Option<u32>, head: &str) -> Option<Target> {
    let pkg = fs.pkg.as_str();
    let mut parts = head.split('.');
    let first = parts.next()?;
    let mut target = match fs.syms.lookup(first, scope).and_then(|id| fs.syms.get(id)) {
        Some(sym) if sym.kind == SymKind::Import => Target::Package(import_package(sym)),
        Some(sym) if sym.kind.sub_cat() == SymKind::Type => {
            Target::Type(find_type(types, pkg, &sym.name)?)
        }
        Some(sym) if sym.ty.is_known() => Target::Value(parse_type(types, pkg, pkg, sym.ty.name())),
        Some(_) => return None,
        None if types.packages().iter().any(|p| p == first) => Target::Package(first.to_string()),
        None => Target::Type(find_type(types, pkg, first)?),
    };
    for part in parts {
        target = step(types, pkg, target, part)?;
    }
    Some(target)
}

fn deref(types: &TypeRegistry, pkg: &str, ty: Type) -> Type {
    match (ty.kind, ty.els.first()) {
        (TypeKind::Pointer, Some(el)) => parse_type(types, pkg, pkg, &el.ty),
        _ => ty,
    }
}

fn step(types: &TypeRegistry, pkg: &str, target: Target, part: &str) -> Option<Target> {
    match target {
        Target::Package(p) => {
            if let Some(ty) = types.get(&p, part) {
                return Some(Target::Type(ty));
            }
            let func = types.get(&p, &format!("func {part}"))?;
            let ret = func.returns.first()?;
            Some(Target::Value(parse_type(types, pkg, &p, &ret.ty)))
        }
        Target::Type(_) => None,
        Target::Value(ty) => {
            let ty = deref(types, pkg, ty);
            let owner = ty.package().unwrap_or(pkg).to_string();
            if let Some(el) = ty.el_by_name(part) {
                return Some(Target::Value(parse_type(types, pkg, &owner, &el.ty)));
            }
            let method = types.get(&owner, &format!("func {}.{part}", ty.name))?;
            let ret = method.returns.first()?;
            Some(Target::Value(parse_type(types, pkg, &owner, &ret.ty)))
        }
    }
}

fn methods_of(types: &TypeRegistry, owner: &str, base: &str) -> Vec<Completion> {
    let prefix = format!("func {base}.");
    types
        .package(owner)
        .read()
        .iter()
        .filter_map(|(name, ty)| {
            let method = name.strip_prefix(&prefix)?;
            Some(Completion::new(method, "function").desc(&ty.signature()))
        })
        .collect()
}

fn members(types: &TypeRegistry, pkg: &str, target: Target) -> Vec<Completion> {
    match target {
        Target::Package(p) => types
            .package(&p)
            .read()
            .iter()
            .filter_map(|(name, ty)| match name.strip_prefix("func ") {
                Some(f) if f.contains('.') => None,
                Some(f) => Some(Completion::new(f, "function").desc(&ty.signature())),
                None => Some(Completion::new(name, "type")),
            })
            .collect(),
        Target::Type(ty) => {
            let owner = ty.package().unwrap_or(pkg).to_string();
            methods_of(types, &owner, &ty.name)
        }
        Target::Value(ty) => {
            let ty = deref(types, pkg, ty);
            let owner = ty.package().unwrap_or(pkg).to_string();
            let mut out = methods_of(types, &owner, &ty.name);
            let el_icon = if ty.kind == TypeKind::Interface { "function" } else { "field" };
            if matches!(ty.kind, TypeKind::Struct | TypeKind::Interface) {
                out.extend(
                    ty.els
                        .iter()
                        .filter(|el| !el.name.is_empty())
                        .map(|el| Completion::new(&el.name, el_icon).desc(&el.ty)),
                );
            }
            out
        }
    }
}

pub(crate) fn complete_line(fss: &FileStates, text: &str, pos: Pos) -> Matches {
    let seed = last_scoped_string(text);
    let done = fss.done();
    let types = fss.types().as_ref();
    let scope = scope_at(&done.syms, pos);
    if let Some((head, tail)) = seed.rsplit_once('.') {
        let mut matches = Matches {
            seed: tail.to_string(),
            matches: Vec::new(),
        };
        match resolve_head(&done, types, scope, head) {
            Some(target) => {
                trace!(head, ?target, "completing members");
                matches.matches = members(types, &done.pkg, target)
                    .into_iter()
                    .filter(|c| c.text.starts_with(tail))
                    .collect();
            }
            None => trace!(head, "unresolved completion head"),
        }
        matches.rank();
        return matches;
    }
    let mut matches = Matches {
        seed: seed.to_string(),
        matches: Vec::new(),
    };
    if seed.is_empty() {
        return matches;
    }
    matches.matches.extend(seed_matches(seed, keywords().iter().copied(), "keyword"));
    matches.matches.extend(seed_matches(seed, BASIC_TYPES.iter().copied(), "type"));
    matches.matches.extend(seed_matches(seed, BUILTIN_FUNCS.iter().copied(), "function"));
    matches.matches.extend(
        done.syms
            .with_prefix(seed)
            .into_iter()
            .filter(|id| visible(&done.syms, *id, scope))
            .filter_map(|id| done.syms.get(id))
            .map(sym_completion),
    );
    matches.rank();
    matches
}

fn definition(fs: &FileState, sym: &Symbol) -> Lookup {
    let start = sym.region.start.line;
    let end = sym.region.end.line.max(start) + 1;
    let text = (start..end).map(|l| fs.line(l)).collect::<Vec<_>>().join("\n");
    Lookup {
        filename: sym.filename.clone(),
        text,
        start_line: start,
        end_line: end,
    }
}

pub(crate) fn lookup(fss: &FileStates, text: &str, pos: Pos) -> Lookup {
    let seed = last_scoped_string(text);
    let done = fss.done();
    let types = fss.types().as_ref();
    let scope = scope_at(&done.syms, pos);
    let found = match seed.rsplit_once('.') {
        Some((head, name)) => {
            let owner = match resolve_head(&done, types, scope, head) {
                Some(Target::Type(ty) | Target::Value(ty)) => deref(types, &done.pkg, ty).name,
                _ => return Lookup::default(),
            };
            done.syms
                .by_name(name)
                .iter()
                .filter_map(|id| done.syms.get(*id))
                .find(|s| s.scopes.sub_cat(SymKind::Type) == Some(owner.as_str()))
        }
        None => done.syms.lookup(seed, scope).and_then(|id| done.syms.get(id)),
    };
    found.map_or_else(Lookup::default, |sym| definition(&done, sym))
}

/// Functions get `()` appended unless the call parentheses are already
/// there.
pub(crate) fn complete_edit(line: &str, cursor: usize, completion: &Completion) -> Edit {
    let after = line.get(cursor..).unwrap_or("");
    let mut edit = edit_word(after, completion);
    let rest = after.get(edit.forward_delete..).unwrap_or("");
    if completion.icon == "function" && !rest.starts_with('(') {
        edit.new_text.push_str("()");
    }
    edit
}
