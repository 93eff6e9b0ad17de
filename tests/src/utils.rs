use std::path::PathBuf;
use std::sync::Arc;

use pi::{FileStates, Lang, PiConfig, Supported, pipeline};
use pi_parse::Parser;
use pi_syms::{SymType, TypeRegistry};

pub(crate) fn get_test_data_path() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    manifest_dir.join("test_data")
}

pub(crate) fn read_test_file(rel: &str) -> String {
    std::fs::read_to_string(get_test_data_path().join(rel)).unwrap()
}

pub(crate) fn lang(sup: Supported) -> Arc<dyn Lang> {
    pi_langs::global().lang(sup).unwrap()
}

/// The calculator language loaded from `grammars/calc.json`.
pub(crate) fn calc_parser() -> Parser {
    Parser::from_json(&read_test_file("grammars/calc.json")).unwrap()
}

pub(crate) fn config(fun_internal: bool) -> PiConfig {
    PiConfig {
        fun_internal,
        ..PiConfig::default()
    }
}

/// Runs the whole pipeline over one Go source and returns its states.
pub(crate) fn process_go(src: &str, fun_internal: bool) -> FileStates {
    let fss = FileStates::new("test.go", Supported::Go, Arc::new(TypeRegistry::new()));
    pipeline::process(&fss, lang(Supported::Go).as_ref(), src, &config(fun_internal), None)
        .unwrap();
    fss
}

/// Type of the first reachable symbol called `name`.
pub(crate) fn symbol_type(fss: &FileStates, name: &str) -> Option<SymType> {
    let done = fss.done();
    done.syms
        .walk()
        .into_iter()
        .filter_map(|id| done.syms.get(id))
        .find(|s| s.name == name)
        .map(|s| s.ty.clone())
}

/// Name of the resolved type of `name`, or a description of why there is
/// none, for readable assertion failures.
pub(crate) fn type_name(fss: &FileStates, name: &str) -> String {
    match symbol_type(fss, name) {
        Some(SymType::Resolved(ty)) => ty,
        Some(other) => format!("<{other:?}>"),
        None => "<missing>".to_string(),
    }
}

/// Resolved type of the symbol at dotted `path`, e.g. `main.c`.
pub(crate) fn path_type(fss: &FileStates, path: &str) -> String {
    let done = fss.done();
    let id = done.syms.lookup_path(path).unwrap();
    match &done.syms.get(id).unwrap().ty {
        SymType::Resolved(ty) => ty.clone(),
        other => format!("<{other:?}>"),
    }
}
