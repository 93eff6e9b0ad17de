//! Go type resolution.
//!
//! Type names are handled as display strings (`*geom.Point`, `map[string]int`)
//! relative to a package. [`parse_type`] turns such a string back into a
//! [`Type`], looking named types up in the registry, and the expression
//! evaluator folds AST subtrees into types.

use pi_ast::Arena;
use pi_lex::text::is_letter_or_digit;
use pi_syms::{SymKind, Type, TypeEl, TypeKind, TypeRegistry, type_name_for_pkg};
use pi_type_infer::{TypeHooks, TypeInfer};
use tracing::trace;

use crate::golang::lexer::{BASIC_TYPES, BUILTIN_FUNCS};

/// Depth limit for embedded-field promotion.
const MAX_EMBED_DEPTH: usize = 3;

/// [`TypeHooks`] for Go.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoTypes;

impl TypeHooks for GoTypes {
    fn find_type_name(&self, cx: &TypeInfer<'_>, name: &str) -> Option<Type> {
        find_type(cx.types(), cx.pkg(), name)
    }

    fn type_from_ast(&self, cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
        if let Some(ty) = positional(cx, node) {
            return Some(ty);
        }
        let ty = node_type(cx, node)?;
        let ast = cx.ast();
        let variadic = ast
            .find_parent_node(node)
            .filter(|p| ast.name(*p) == "ParamDecl")
            .and_then(|p| ast.child_by_name(p, "Ellipsis"))
            .is_some();
        if variadic {
            let here = cx.pkg().to_string();
            return Some(parse_type(cx.types(), &here, &here, &format!("[]{}", display(&ty, &here))));
        }
        Some(ty)
    }

    fn func_type_from_ast(&self, cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
        Some(signature_type(cx, node))
    }
}

fn basic(name: &str) -> Type {
    let kind = if matches!(name, "error" | "any") {
        TypeKind::Interface
    } else {
        TypeKind::Basic
    };
    Type::new(name, kind)
}

fn display(ty: &Type, here: &str) -> String {
    type_name_for_pkg(ty, here)
}

/// Builtins, then `pkg.Name` in that package, then `name` in `pkg`.
#[must_use]
pub fn find_type(types: &TypeRegistry, pkg: &str, name: &str) -> Option<Type> {
    if BASIC_TYPES.contains(&name) {
        return Some(basic(name));
    }
    if let Some((owner, base)) = name.split_once('.') {
        return types.get(owner, base);
    }
    types.get(pkg, name)
}

/// Index of the `]` matching the `[` at the start of `s`.
fn close_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits at top-level commas.
fn split_list(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            ',' if depth == 0 => {
                out.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}

/// A parameter or result entry, `name T` or just `T`.
fn list_el(entry: &str) -> TypeEl {
    if let Some((name, ty)) = entry.split_once(' ') {
        let ident = name.chars().all(is_letter_or_digit);
        if ident && !matches!(name, "func" | "map" | "chan" | "struct" | "interface") {
            return TypeEl::new(name, ty.trim());
        }
    }
    TypeEl::new("", entry)
}

fn parse_func(s: &str) -> Type {
    let mut ty = Type::new(s, TypeKind::Func);
    let Some(open) = s.find('(') else {
        return ty;
    };
    let Some(close) = close_bracket(&s[open..]).map(|c| c + open) else {
        return ty;
    };
    ty.params = split_list(&s[open + 1..close]).into_iter().map(list_el).collect();
    let rest = s[close + 1..].trim();
    ty.returns = if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        split_list(inner).into_iter().map(list_el).collect()
    } else if rest.is_empty() {
        Vec::new()
    } else {
        vec![TypeEl::new("", rest)]
    };
    ty
}

fn composite(name: String, kind: TypeKind, els: &[&str]) -> Type {
    let mut ty = Type::new(&name, kind);
    ty.els = els.iter().map(|e| TypeEl::new("", e)).collect();
    ty
}

/// Parses the type string `s`, written in package `owner`, into a type whose
/// display name is correct from package `here`. Element names of composite
/// types are stored as seen from `here`.
#[must_use]
pub fn parse_type(types: &TypeRegistry, here: &str, owner: &str, s: &str) -> Type {
    let s = s.trim();
    let sub = |t: &str| display(&parse_type(types, here, owner, t), here);
    if let Some(rest) = s.strip_prefix('*') {
        let el = sub(rest);
        return composite(format!("*{el}"), TypeKind::Pointer, &[&el]);
    }
    if let Some(rest) = s.strip_prefix("[]") {
        let el = sub(rest);
        return composite(format!("[]{el}"), TypeKind::Slice, &[&el]);
    }
    if let Some(rest) = s.strip_prefix("...") {
        let el = sub(rest);
        return composite(format!("[]{el}"), TypeKind::Slice, &[&el]);
    }
    if s.starts_with('[') {
        if let Some(close) = close_bracket(s) {
            let el = sub(&s[close + 1..]);
            return composite(format!("{}{el}", &s[..=close]), TypeKind::Array, &[&el]);
        }
    }
    if let Some(rest) = s.strip_prefix("map").filter(|r| r.starts_with('[')) {
        if let Some(close) = close_bracket(rest) {
            let key = sub(&rest[1..close]);
            let val = sub(&rest[close + 1..]);
            return composite(format!("map[{key}]{val}"), TypeKind::Map, &[&key, &val]);
        }
    }
    for dir in ["<-chan ", "chan<- ", "chan "] {
        if let Some(rest) = s.strip_prefix(dir) {
            let el = sub(rest);
            return composite(format!("{dir}{el}"), TypeKind::Chan, &[&el]);
        }
    }
    if s.starts_with("func(") {
        return parse_func(s);
    }
    if s.starts_with("struct{") || s.starts_with("struct {") {
        return Type::new(s, TypeKind::Struct);
    }
    if s.starts_with("interface{") || s.starts_with("interface {") {
        return Type::new(s, TypeKind::Interface);
    }
    if s.starts_with('(') {
        let inner = s.trim_start_matches('(').trim_end_matches(')');
        let mut tuple = Type::new(s, TypeKind::Tuple);
        tuple.els = split_list(inner).into_iter().map(list_el).collect();
        return tuple;
    }
    if BASIC_TYPES.contains(&s) {
        return basic(s);
    }
    let (pkg, base) = s.split_once('.').unwrap_or((owner, s));
    match types.get(pkg, base) {
        Some(ty) => ty,
        None if pkg.is_empty() => Type::new(base, TypeKind::Named),
        None => Type::new(base, TypeKind::Named).in_package(pkg),
    }
}

/// Source-level spelling of a type subtree, e.g. `map[string]*Rule`.
#[must_use]
pub fn type_text(ast: &Arena, node: u32) -> String {
    let child = |i: usize| ast.child(node, i).map(|c| type_text(ast, c)).unwrap_or_default();
    match ast.name(node) {
        "TypeName" => ast.src(node).split_whitespace().collect(),
        "PtrType" => format!("*{}", child(0)),
        "SliceType" => format!("[]{}", child(0)),
        "ArrayType" => {
            let n = ast.children(node).len();
            let len = if n > 1 {
                ast.child(node, 0).map_or(String::new(), |c| compact(ast.src(c)))
            } else {
                "...".to_string()
            };
            let el = ast.last_child(node).map(|c| type_text(ast, c)).unwrap_or_default();
            format!("[{len}]{el}")
        }
        "MapType" => format!("map[{}]{}", child(0), child(1)),
        "ChanType" => {
            let src = ast.src(node);
            let dir = if src.starts_with("<-") {
                "<-chan "
            } else if src.trim_start_matches("chan").trim_start().starts_with("<-") {
                "chan<- "
            } else {
                "chan "
            };
            format!("{dir}{}", child(0))
        }
        "FuncType" => format!("func{}", signature_text(ast, node)),
        "StructType" if ast.children(node).is_empty() => "struct{}".to_string(),
        "InterfaceType" if ast.children(node).is_empty() => "interface{}".to_string(),
        _ => compact(ast.src(node)),
    }
}

fn compact(src: &str) -> String {
    src.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `(int, string) error` from the `Params` and `Results` children of `node`.
#[must_use]
pub fn signature_text(ast: &Arena, node: u32) -> String {
    let list = |n: u32| -> Vec<String> {
        ast.children(n)
            .iter()
            .map(|d| {
                if ast.name(*d) != "ParamDecl" {
                    return type_text(ast, *d);
                }
                let ty = ast.last_child(*d).map(|t| type_text(ast, t)).unwrap_or_default();
                if ast.child_by_name(*d, "Ellipsis").is_some() {
                    format!("...{ty}")
                } else {
                    ty
                }
            })
            .collect()
    };
    let params = ast.child_by_name(node, "Params").map(list).unwrap_or_default();
    let results_node = ast.child_by_name(node, "Results");
    let results = results_node.map(list).unwrap_or_default();
    let bare = results_node
        .and_then(|r| ast.child(r, 0))
        .is_some_and(|c| ast.name(c) != "ParamDecl");
    let results = match results.as_slice() {
        [] => String::new(),
        [one] if bare => format!(" {one}"),
        many => format!(" ({})", many.join(", ")),
    };
    format!("({}){results}", params.join(", "))
}

/// Parameters of a `Params` or `Results` list. In `a, b int` the grammar
/// sees a type-only `a` and a named `b int`; when any entry is named, the
/// type-only entries are names sharing the type of the next named entry.
fn param_els(cx: &mut TypeInfer<'_>, list: u32) -> Vec<TypeEl> {
    let ast = cx.ast();
    let here = cx.pkg().to_string();
    let decls: Vec<u32> = ast
        .children(list)
        .iter()
        .copied()
        .filter(|d| ast.name(*d) == "ParamDecl")
        .collect();
    let named = decls.iter().any(|d| ast.child_by_name(*d, "Name").is_some());
    let mut out: Vec<TypeEl> = Vec::with_capacity(decls.len());
    let mut pending: Vec<String> = Vec::new();
    for d in decls {
        let ty_node = ast.last_child(d);
        let mut ty = ty_node
            .and_then(|t| node_type(cx, t))
            .map_or_else(|| ty_node.map(|t| type_text(ast, t)).unwrap_or_default(), |t| display(&t, &here));
        if ast.child_by_name(d, "Ellipsis").is_some() {
            ty = format!("...{ty}");
        }
        match ast.child_by_name(d, "Name") {
            Some(n) => {
                for p in pending.drain(..) {
                    out.push(TypeEl::new(&p, &ty));
                }
                out.push(TypeEl::new(ast.src(n), &ty));
            }
            None if named => pending.push(ty_node.map(|t| ast.src(t).to_string()).unwrap_or_default()),
            None => out.push(TypeEl::new("", &ty)),
        }
    }
    out
}

/// Function type of a declaration, method spec or literal.
fn signature_type(cx: &mut TypeInfer<'_>, node: u32) -> Type {
    let ast = cx.ast();
    let mut ty = Type::new("", TypeKind::Func);
    if let Some(params) = ast.child_by_name(node, "Params") {
        ty.params = param_els(cx, params);
    }
    if let Some(results) = ast.child_by_name(node, "Results") {
        ty.returns = match ast.child(results, 0) {
            Some(first) if ast.name(first) != "ParamDecl" => {
                let here = cx.pkg().to_string();
                node_type(cx, first)
                    .map(|t| vec![TypeEl::new("", &display(&t, &here))])
                    .unwrap_or_default()
            }
            _ => param_els(cx, results),
        };
    }
    ty
}

/// Multi-name bindings: `a, b := 1, "x"`, `v, ok := m[k]` and
/// `for k, v := range xs` take their own part of the value.
fn positional(cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
    let ast = cx.ast();
    let parent = ast.find_parent_node(node)?;
    let sym = cx.syms().get(cx.current()?)?;
    let name = sym.name.clone();
    let here = cx.pkg().to_string();
    match ast.name(parent) {
        "VarSpec" | "DefineStmt" => {
            let names: Vec<&str> = ast
                .children(parent)
                .iter()
                .filter(|c| ast.name(**c) == "Name")
                .map(|c| ast.src(*c))
                .collect();
            let values: Vec<u32> = ast
                .children(parent)
                .iter()
                .copied()
                .filter(|c| matches!(ast.name(*c), "Expr"))
                .collect();
            if names.len() < 2 || values.is_empty() {
                return None;
            }
            let idx = names.iter().position(|n| *n == name)?;
            if values.len() == names.len() {
                return node_type(cx, values[idx]);
            }
            let value = *values.first()?;
            if names.len() == 2 && is_comma_ok(ast, value) {
                return if idx == 1 { Some(basic("bool")) } else { node_type(cx, value) };
            }
            let tuple = node_type(cx, value)?;
            let el = tuple.els.get(idx)?;
            Some(parse_type(cx.types(), &here, &here, &el.ty))
        }
        "ForRangeStmt" => {
            let vars = ast.child_by_name(parent, "RangeVars")?;
            let idx = ast
                .children(vars)
                .iter()
                .position(|c| ast.src(*c) == name)?;
            let ranged = node_type(cx, node)?;
            let el = |i: usize| ranged.els.get(i).map(|e| e.ty.clone());
            let ty = match (ranged.kind, idx) {
                (TypeKind::Map, i) => el(i)?,
                (TypeKind::Chan, 0) => el(0)?,
                (TypeKind::Slice | TypeKind::Array, 1) => el(0)?,
                (TypeKind::Basic, 1) if ranged.name == "string" => "rune".to_string(),
                (TypeKind::Basic, 0) if ranged.name != "string" => ranged.name.clone(),
                (_, 0) => "int".to_string(),
                _ => return None,
            };
            Some(parse_type(cx.types(), &here, &here, &ty))
        }
        _ => None,
    }
}

/// `m[k]`, `x.(T)` and `<-ch` yield a second boolean in a two-name binding.
fn is_comma_ok(ast: &Arena, expr: u32) -> bool {
    let Some(inner) = ast.child(expr, 0) else {
        return false;
    };
    match ast.name(inner) {
        "PrimaryExpr" => ast
            .last_child(inner)
            .is_some_and(|s| matches!(ast.name(s), "Index" | "TypeAssert")),
        "UnaryExpr" => ast.child(inner, 0).is_some_and(|op| ast.src(op) == "<-"),
        _ => false,
    }
}

/// Type of the value or type expression at `node`.
pub(crate) fn node_type(cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
    let ast = cx.ast();
    let here = cx.pkg().to_string();
    let first = ast.child(node, 0);
    match ast.name(node) {
        "Expr" | "CondExpr" => expr_type(cx, node),
        "ExprStmt" | "Key" | "ParenExpr" | "Element" => node_type(cx, ast.last_child(node)?),
        "PrimaryExpr" => primary_type(cx, node),
        "UnaryExpr" => {
            let op = ast.src(first?);
            let operand = node_type(cx, ast.child(node, 1)?)?;
            match op {
                "!" => Some(basic("bool")),
                "<-" => operand.els.first().map(|e| parse_type(cx.types(), &here, &here, &e.ty)),
                _ => Some(operand),
            }
        }
        "DerefExpr" => {
            let ptr = node_type(cx, first?)?;
            match ptr.kind {
                TypeKind::Pointer => ptr.els.first().map(|e| parse_type(cx.types(), &here, &here, &e.ty)),
                // `*T` in type position.
                _ => Some(parse_type(cx.types(), &here, &here, &format!("*{}", display(&ptr, &here)))),
            }
        }
        "AddrExpr" => {
            let target = node_type(cx, first?)?;
            Some(parse_type(cx.types(), &here, &here, &format!("*{}", display(&target, &here))))
        }
        "IntLit" => Some(basic("int")),
        "FloatLit" => Some(basic("float64")),
        "ImagLit" => Some(basic("complex128")),
        "StrLit" => Some(basic("string")),
        "CharLit" => Some(basic("rune")),
        "BoolLit" => Some(basic("bool")),
        "Name" => operand_val(cx, node).and_then(Val::into_type),
        "CompositeLit" => node_type(cx, first?),
        "FuncLit" => {
            let mut ty = signature_type(cx, node);
            ty.name = format!("func{}", ty.signature());
            Some(ty)
        }
        "TypeName" | "PtrType" | "SliceType" | "ArrayType" | "MapType" | "ChanType"
        | "FuncType" | "StructType" | "InterfaceType" => {
            Some(parse_type(cx.types(), &here, &here, &type_text(ast, node)))
        }
        other => {
            trace!(node = other, "no type rule for node");
            None
        }
    }
}

/// Literal operands are untyped constants; they take the type of the other
/// operand. Ranked so that `1 + 2.5` is a float.
fn literal_rank(ast: &Arena, mut node: u32) -> Option<u8> {
    loop {
        match ast.name(node) {
            "IntLit" => return Some(1),
            "CharLit" => return Some(2),
            "FloatLit" => return Some(3),
            "ImagLit" => return Some(4),
            "Expr" | "PrimaryExpr" | "ParenExpr" if ast.children(node).len() == 1 => {
                node = ast.child(node, 0)?;
            }
            _ => return None,
        }
    }
}

fn expr_type(cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
    let ast = cx.ast();
    let kids = ast.children(node);
    if let [only] = kids {
        return node_type(cx, *only);
    }
    let ops: Vec<&str> = kids
        .iter()
        .filter(|k| ast.name(**k) == "BinOp")
        .map(|k| ast.src(*k))
        .collect();
    if ops
        .iter()
        .any(|op| matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||"))
    {
        return Some(basic("bool"));
    }
    let operands: Vec<u32> = kids
        .iter()
        .copied()
        .filter(|k| ast.name(*k) != "BinOp")
        .collect();
    if ops.iter().all(|op| matches!(*op, "<<" | ">>")) {
        return node_type(cx, *operands.first()?);
    }
    let mut untyped: Option<(u8, u32)> = None;
    for o in operands {
        match literal_rank(ast, o) {
            Some(rank) => {
                if untyped.is_none_or(|(r, _)| rank > r) {
                    untyped = Some((rank, o));
                }
            }
            None => {
                if let Some(ty) = node_type(cx, o) {
                    return Some(ty);
                }
            }
        }
    }
    node_type(cx, untyped?.1)
}

/// Intermediate value while folding a primary expression's suffixes.
enum Val {
    Value(Type),
    /// A type used as an operand: a conversion or `make` argument.
    TypeExpr(Type),
    Package(String),
    Builtin(String),
}

impl Val {
    fn into_type(self) -> Option<Type> {
        match self {
            Val::Value(t) | Val::TypeExpr(t) => Some(t),
            Val::Package(_) | Val::Builtin(_) => None,
        }
    }
}

fn symbol_type(cx: &mut TypeInfer<'_>, id: u32) -> Option<Type> {
    if !cx.ensure_resolved(id) {
        return None;
    }
    let name = cx.type_of(id)?.to_string();
    let here = cx.pkg().to_string();
    if name.starts_with("func ") {
        return cx.types().get(&here, &name);
    }
    Some(parse_type(cx.types(), &here, &here, &name))
}

fn operand_val(cx: &mut TypeInfer<'_>, node: u32) -> Option<Val> {
    let ast = cx.ast();
    let here = cx.pkg().to_string();
    if ast.name(node) != "Name" {
        return match ast.name(node) {
            "TypeName" | "SliceType" | "ArrayType" | "MapType" | "ChanType" | "InterfaceType" => {
                node_type(cx, node).map(Val::TypeExpr)
            }
            _ => node_type(cx, node).map(Val::Value),
        };
    }
    let name = ast.src(node);
    if let Some(id) = cx.lookup(name) {
        let sym = cx.syms().get(id)?;
        let kind = sym.kind;
        // Aliased imports are registered under the package's own name.
        let imported = sym.detail.rsplit('/').next().filter(|p| !p.is_empty()).unwrap_or(name).to_string();
        return match kind {
            SymKind::Import => Some(Val::Package(imported)),
            SymKind::Package => None,
            k if k.sub_cat() == SymKind::Type => Some(Val::TypeExpr(
                find_type(cx.types(), &here, name)
                    .unwrap_or_else(|| Type::new(name, TypeKind::Named).in_package(&here)),
            )),
            _ => symbol_type(cx, id).map(Val::Value),
        };
    }
    match name {
        "iota" => return Some(Val::Value(basic("int"))),
        "nil" => return None,
        _ => {}
    }
    if BUILTIN_FUNCS.contains(&name) {
        return Some(Val::Builtin(name.to_string()));
    }
    if let Some(ty) = find_type(cx.types(), &here, name) {
        return Some(Val::TypeExpr(ty));
    }
    if cx.types().len(name) > 0 {
        return Some(Val::Package(name.to_string()));
    }
    None
}

fn primary_type(cx: &mut TypeInfer<'_>, node: u32) -> Option<Type> {
    let ast = cx.ast();
    let (first, suffixes) = ast.children(node).split_first()?;
    let mut cur = operand_val(cx, *first)?;
    for &s in suffixes {
        cur = apply_suffix(cx, cur, s)?;
    }
    cur.into_type()
}

fn apply_suffix(cx: &mut TypeInfer<'_>, cur: Val, suffix: u32) -> Option<Val> {
    let ast = cx.ast();
    let here = cx.pkg().to_string();
    match ast.name(suffix) {
        "Selector" => {
            let field = ast.src(ast.child(suffix, 0)?);
            match cur {
                Val::Package(pkg) => package_member(cx.types(), &pkg, field),
                Val::Value(ty) => select(cx, &ty, field, 0).map(Val::Value),
                Val::TypeExpr(_) | Val::Builtin(_) => None,
            }
        }
        "Call" => match cur {
            Val::Builtin(name) => builtin_call(cx, &name, suffix),
            Val::TypeExpr(ty) => Some(Val::Value(ty)),
            Val::Value(ty) if ty.kind == TypeKind::Func => {
                let owner = ty.package().unwrap_or(&here).to_string();
                match ty.returns.as_slice() {
                    [] => None,
                    [one] => Some(Val::Value(parse_type(cx.types(), &here, &owner, &one.ty))),
                    many => {
                        let mut tuple = Type::new("", TypeKind::Tuple);
                        tuple.els = many
                            .iter()
                            .map(|r| {
                                let t = parse_type(cx.types(), &here, &owner, &r.ty);
                                TypeEl::new(&r.name, &display(&t, &here))
                            })
                            .collect();
                        let names: Vec<&str> = tuple.els.iter().map(|e| e.ty.as_str()).collect();
                        tuple.name = format!("({})", names.join(", "));
                        Some(Val::Value(tuple))
                    }
                }
            }
            _ => None,
        },
        "Index" => {
            let Val::Value(ty) = cur else {
                return None;
            };
            let slicing = ast.src(suffix).contains(':');
            let el = |i: usize| ty.els.get(i).map(|e| parse_type(cx.types(), &here, &here, &e.ty));
            let out = match ty.kind {
                _ if slicing => Some(ty.clone()),
                TypeKind::Slice | TypeKind::Array => el(0),
                TypeKind::Map => el(1),
                TypeKind::Pointer => el(0).and_then(|arr| {
                    arr.els
                        .first()
                        .map(|e| parse_type(cx.types(), &here, &here, &e.ty))
                }),
                TypeKind::Basic if ty.name == "string" => Some(basic("byte")),
                _ => None,
            };
            out.map(Val::Value)
        }
        "TypeAssert" => {
            let target = ast.child(suffix, 0)?;
            if ast.src(target) == "type" {
                return Some(cur);
            }
            node_type(cx, target).map(Val::Value)
        }
        _ => None,
    }
}

fn package_member(types: &TypeRegistry, pkg: &str, member: &str) -> Option<Val> {
    if let Some(ty) = types.get(pkg, member) {
        return Some(Val::TypeExpr(ty));
    }
    let mut func = types.get(pkg, &format!("func {member}"))?;
    if func.package().is_none() {
        func.scopes.insert(SymKind::Package, pkg);
    }
    Some(Val::Value(func))
}

/// Field or method `name` of a value of type `ty`, through one pointer and
/// embedded fields.
fn select(cx: &mut TypeInfer<'_>, ty: &Type, name: &str, depth: usize) -> Option<Type> {
    let here = cx.pkg().to_string();
    let ty = if ty.kind == TypeKind::Pointer {
        parse_type(cx.types(), &here, &here, &ty.els.first()?.ty)
    } else {
        ty.clone()
    };
    let owner = ty.package().unwrap_or(&here).to_string();
    let base = ty.name.rsplit('.').next().unwrap_or(&ty.name).to_string();
    let def = if ty.kind == TypeKind::Struct && !ty.els.is_empty() {
        Some(ty.clone())
    } else {
        cx.types().get(&owner, &base)
    };
    if let Some(el) = def.as_ref().and_then(|d| d.el_by_name(name)) {
        return Some(parse_type(cx.types(), &here, &owner, &el.ty));
    }
    if let Some(method) = method_type(cx, &owner, &base, name) {
        return Some(method);
    }
    if depth >= MAX_EMBED_DEPTH {
        return None;
    }
    for el in def.map(|d| d.els).unwrap_or_default() {
        let embedded = el.ty.trim_start_matches('*');
        if embedded.rsplit('.').next() == Some(el.name.as_str()) {
            let inner = parse_type(cx.types(), &here, &owner, &el.ty);
            if let Some(hit) = select(cx, &inner, name, depth + 1) {
                return Some(hit);
            }
        }
    }
    None
}

/// Method `name` of `owner.base`. Methods are registered as their symbols
/// are inferred, so an unregistered one is inferred on demand.
fn method_type(cx: &mut TypeInfer<'_>, owner: &str, base: &str, name: &str) -> Option<Type> {
    let key = format!("func {base}.{name}");
    if let Some(mut ty) = cx.types().get(owner, &key) {
        if ty.package().is_none() {
            ty.scopes.insert(SymKind::Package, owner);
        }
        return Some(ty);
    }
    if owner != cx.pkg() {
        return None;
    }
    let id = cx.syms().by_name(name).iter().copied().find(|id| {
        cx.syms().get(*id).is_some_and(|s| {
            s.kind == SymKind::Method && s.scopes.sub_cat(SymKind::Type) == Some(base)
        })
    })?;
    if !cx.ensure_resolved(id) {
        return None;
    }
    cx.types().get(owner, &key)
}

fn builtin_call(cx: &mut TypeInfer<'_>, name: &str, call: u32) -> Option<Val> {
    let here = cx.pkg().to_string();
    let ty = match name {
        "len" | "cap" | "copy" => basic("int"),
        "complex" => basic("complex128"),
        "real" | "imag" => basic("float64"),
        "recover" => basic("any"),
        "append" | "make" | "max" | "min" => {
            let arg = cx.ast().child(call, 0)?;
            node_type(cx, arg)?
        }
        "new" => {
            let arg = cx.ast().child(call, 0)?;
            let target = node_type(cx, arg)?;
            parse_type(cx.types(), &here, &here, &format!("*{}", display(&target, &here)))
        }
        _ => return None,
    };
    Some(Val::Value(ty))
}
