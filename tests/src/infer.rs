/// Type inference through the Go plugin: declaration-order independence,
/// field fallbacks, function-internal detail, sticky errors, and types
/// shared between the files of a project.
#[cfg(test)]
mod infer_tests {
    use std::sync::Arc;

    use pi::{Supported, pipeline};
    use pi_ast::Arena;
    use pi_langs::golang::GoTypes;
    use pi_lex::Region;
    use pi_syms::{Scopes, SymKind, SymType, Symbol, SymbolTable, Type, TypeKind, TypeRegistry};
    use pi_type_infer::TypeInfer;

    use crate::utils::{
        config, get_test_data_path, path_type, process_go, read_test_file, symbol_type, type_name,
    };

    fn consts() -> pi::FileStates {
        process_go(&read_test_file("go/scenarios/consts.go"), true)
    }

    #[test]
    fn constants_resolve_in_any_order() {
        let fss = consts();
        assert_eq!(type_name(&fss, "y"), "int");
        assert_eq!(type_name(&fss, "x"), "int");

        let swapped = process_go("package c\n\nconst (\n\tx = 1 + 2\n\ty = x * 3\n)\n", false);
        assert_eq!(type_name(&swapped, "x"), "int");
        assert_eq!(type_name(&swapped, "y"), "int");
    }

    #[test]
    fn globals_take_their_value_or_declared_type() {
        let fss = consts();
        assert_eq!(type_name(&fss, "m"), "map[string]Pair");
        assert_eq!(type_name(&fss, "ratio"), "float64");
        assert_eq!(type_name(&fss, "flag"), "bool");
    }

    #[test]
    fn locals_follow_their_expressions() {
        let fss = consts();
        assert_eq!(type_name(&fss, "k"), "string");
        assert_eq!(type_name(&fss, "p"), "Pair");
        assert_eq!(type_name(&fss, "found"), "bool");
        assert_eq!(type_name(&fss, "v"), "int");
        assert_eq!(type_name(&fss, "s"), "[]int");
        assert_eq!(type_name(&fss, "e"), "int");
    }

    #[test]
    fn functions_record_their_signature() {
        let fss = consts();
        let done = fss.done();
        let id = done.syms.find_top("lookup").unwrap();
        let sym = done.syms.get(id).unwrap();
        assert_eq!(sym.ty, SymType::Resolved("func lookup".to_string()));
        assert_eq!(sym.detail, "(k string) (Pair, bool)");
        assert!(fss.types().contains("calc", "func lookup"));
    }

    #[test]
    fn function_internals_only_on_request() {
        let src = read_test_file("go/scenarios/consts.go");

        let bare = process_go(&src, false);
        let done = bare.done();
        let lookup = done.syms.find_top("lookup").unwrap();
        assert!(done.syms.children(lookup).is_empty());
        assert!(done.syms.by_name("found").is_empty());
        drop(done);

        let full = process_go(&src, true);
        let done = full.done();
        let lookup = done.syms.find_top("lookup").unwrap();
        for local in ["k", "p", "found", "v", "s", "e"] {
            assert!(done.syms.child_by_name(lookup, local).is_some(), "{local}");
        }
        assert!(done.syms.child_by_name(lookup, "_").is_none());
    }

    #[test]
    fn struct_fields_are_typed_from_the_registry() {
        let fss = consts();
        let done = fss.done();
        let pair = done.syms.find_top("Pair").unwrap();
        let value = done.syms.child_by_name(pair, "Value").unwrap();
        assert_eq!(done.syms.get(value).unwrap().ty.name(), "int");
        assert_eq!(done.syms.get(value).unwrap().label(), "Pair.Value");
        let registered = fss.types().get("calc", "Pair").unwrap();
        assert_eq!(registered.kind, TypeKind::Struct);
        assert_eq!(registered.el_by_name("Key").unwrap().ty, "string");
    }

    /// A field whose struct is not registered gets a `Struct.field` name
    /// that a later pass replaces once the struct is known.
    #[test]
    fn unknown_struct_field_is_tentative() {
        let mut ast = Arena::default();
        let node = ast.add_node("FieldDecl", None, Region::default(), "f int".to_string(), (0, 0));
        let mut syms = SymbolTable::new();
        let scopes = Scopes::new()
            .with(SymKind::Package, "p")
            .with(SymKind::Struct, "Ghost");
        let id = syms
            .add(Symbol::new("f", SymKind::Field).with_ast(node).with_scopes(scopes), None)
            .unwrap();
        let types = TypeRegistry::new();

        TypeInfer::new(&ast, &mut syms, &types, "p", &GoTypes).infer_symbol_type(id);
        assert_eq!(syms.get(id).unwrap().ty, SymType::Tentative("Ghost.f".to_string()));

        types.add(
            "p",
            Type::new("Ghost", TypeKind::Struct).in_package("p").with_el("f", "int"),
        );
        TypeInfer::new(&ast, &mut syms, &types, "p", &GoTypes).infer_symbol_type(id);
        assert_eq!(syms.get(id).unwrap().ty, SymType::Resolved("int".to_string()));
    }

    #[test]
    fn errors_are_sticky() {
        let fss = process_go("package p\n\nvar bad = missing\n", false);
        assert_eq!(symbol_type(&fss, "bad"), Some(SymType::Error));

        let done = fss.done();
        let mut syms = done.syms.clone();
        let pkg = syms.roots()[0];
        let mut missing = Symbol::new("missing", SymKind::VarGlobal);
        missing.ty = SymType::Resolved("int".to_string());
        syms.add(missing, Some(pkg)).unwrap();

        let report = TypeInfer::new(&done.ast, &mut syms, fss.types(), "p", &GoTypes)
            .infer_all()
            .unwrap();
        let bad = syms.find_top("bad").unwrap();
        assert_eq!(syms.get(bad).unwrap().ty, SymType::Error);
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn project_files_share_types() {
        let root = get_test_data_path().join("go/project");
        let paths = vec![root.join("geom/point.go"), root.join("main/main.go")];
        let types = Arc::new(TypeRegistry::new());
        let files =
            pipeline::process_files(pi_langs::global(), &paths, &types, &config(true), None)
                .unwrap();
        assert_eq!(files.len(), 2);
        for file in &files {
            assert!(file.report.is_ok(), "{:?}", file.report.as_ref().err());
            assert_eq!(file.states.sup(), Supported::Go);
        }

        assert!(types.contains("geom", "Point"));
        assert!(types.contains("geom", "func Point.Add"));
        assert!(types.contains("main", "Counter"));

        let (geom, main) = (&files[0].states, &files[1].states);
        assert_eq!(type_name(geom, "w"), "float64");
        assert_eq!(type_name(geom, "q"), "Point");

        assert_eq!(type_name(main, "Pi"), "float64");
        assert_eq!(type_name(main, "names"), "[]string");
        assert_eq!(type_name(main, "origin"), "*geom.Point");
        assert_eq!(path_type(main, "main.c"), "*Counter");
        assert_eq!(path_type(main, "Counter.Inc.c"), "Counter");
        assert_eq!(type_name(main, "n"), "int");
        assert_eq!(type_name(main, "p"), "geom.Point");
        assert_eq!(type_name(main, "i"), "int");
        assert_eq!(type_name(main, "name"), "string");
        assert_eq!(type_name(main, "ok"), "bool");
    }

    #[test]
    fn inferred_types_annotate_the_tree() {
        let fss = consts();
        let done = fss.done();
        let id = done.syms.find_top("ratio").unwrap();
        let node = done.syms.get(id).unwrap().ast.unwrap();
        let annotated = done.ast.find_node(node).unwrap().annotation.as_deref();
        assert_eq!(annotated, Some("float64"));
    }
}
