#[cfg(test)]
mod pipeline_tests {
    use std::sync::Arc;

    use assert_fs::prelude::*;
    use pi::{FileStates, LangError, LangSupport, PiConfig, RecoveryMode, Supported, pipeline};
    use pi_lex::Pos;
    use pi_syms::TypeRegistry;
    use pi_type_infer::{CancelToken, InferError};

    use crate::utils::{config, get_test_data_path, lang, read_test_file};

    const BROKEN: &str = "package p\n\nfunc ) {\n\nfunc ok() {}\n";

    fn go_states(name: &str) -> FileStates {
        FileStates::new(name, Supported::Go, Arc::new(TypeRegistry::new()))
    }

    #[test]
    fn report_counts_one_pass() {
        let fss = go_states("consts.go");
        let src = read_test_file("go/scenarios/consts.go");
        let report = pipeline::process(&fss, lang(Supported::Go).as_ref(), &src, &config(false), None)
            .unwrap();
        assert_eq!(report.filename, "consts.go");
        assert_eq!(report.pkg, "calc");
        assert!(report.tokens > 0 && report.nodes > 0, "{report:?}");
        assert!(report.symbols > 0);
        assert!(report.diagnostics.is_empty());
        let infer = report.infer.unwrap();
        assert!(infer.symbols < report.symbols, "package symbols are not counted");
        assert!(infer.resolved > 0);
        assert_eq!(infer.unprocessed, 0);

        let done = fss.done();
        assert_eq!(done.src, src);
        assert_eq!(done.syms.walk().len(), report.symbols);
    }

    #[test]
    fn configured_resync_reports_diagnostics() {
        let cfg = PiConfig::from_toml_str("recovery = \"resync\"\nmax_parse_errors = 5\n").unwrap();
        assert_eq!(cfg.recovery, RecoveryMode::Resync);
        let fss = go_states("broken.go");
        let report = pipeline::process(&fss, lang(Supported::Go).as_ref(), BROKEN, &cfg, None).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].pos.line, 2);
        assert!(fss.done().syms.find_top("ok").is_some());
    }

    #[test]
    fn failed_pass_is_still_published() {
        let fss = go_states("p.go");
        let go = lang(Supported::Go);
        pipeline::process(&fss, go.as_ref(), "package p\n\nfunc ok() {}\n", &config(false), None)
            .unwrap();
        assert!(fss.done().errors.is_empty());

        let err = pipeline::process(&fss, go.as_ref(), BROKEN, &config(false), None).unwrap_err();
        assert!(format!("{err:#}").contains("p.go"), "{err:#}");
        let done = fss.done();
        assert_eq!(done.src, BROKEN);
        assert_eq!(done.errors.len(), 1);
        assert_eq!(done.errors[0].offset, BROKEN.find(')').unwrap());
        assert_eq!(done.errors[0].pos, Pos::new(2, 5));
    }

    #[test]
    fn reprocessing_replaces_edited_types() {
        let fss = go_states("t.go");
        let go = lang(Supported::Go);
        let before = "package p\n\ntype T struct {\n\ta int\n}\n\nfunc g() int { return 0 }\n";
        pipeline::process(&fss, go.as_ref(), before, &config(false), None).unwrap();
        let t = fss.types().get("p", "T").unwrap();
        assert_eq!(t.el_by_name("a").unwrap().ty, "int");

        let after = "package p\n\ntype T struct {\n\ta string\n}\n\nfunc g() string { return \"\" }\n";
        pipeline::process(&fss, go.as_ref(), after, &config(false), None).unwrap();
        let t = fss.types().get("p", "T").unwrap();
        assert_eq!(t.el_by_name("a").unwrap().ty, "string");
        let g = fss.types().get("p", "func g").unwrap();
        assert!(g.returns.iter().any(|r| r.ty == "string"), "{g:?}");

        let done = fss.done();
        let t = done.syms.find_top("T").unwrap();
        let a = done.syms.child_by_name(t, "a").unwrap();
        assert_eq!(done.syms.get(a).unwrap().ty.name(), "string");
    }

    #[test]
    fn cancelled_inference_keeps_populated_symbols() {
        let token = CancelToken::new();
        token.cancel();
        let fss = go_states("consts.go");
        let src = read_test_file("go/scenarios/consts.go");
        let err = pipeline::process(&fss, lang(Supported::Go).as_ref(), &src, &config(false), Some(&token))
            .unwrap_err();
        assert!(
            matches!(err.downcast_ref::<InferError>(), Some(InferError::Cancelled { .. })),
            "{err:#}"
        );
        assert!(fss.done().syms.find_top("ratio").is_some());
    }

    #[test]
    fn cancelled_project_stops_before_the_first_file() {
        let root = get_test_data_path().join("go/project");
        let paths = vec![root.join("geom/point.go"), root.join("main/main.go")];
        let token = CancelToken::new();
        token.cancel();
        let types = Arc::new(TypeRegistry::new());
        let err = pipeline::process_files(pi_langs::global(), &paths, &types, &config(false), Some(&token))
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<LangError>(),
            Some(&LangError::Cancelled { remaining: 2 })
        );
        assert!(!types.contains("geom", "Point"));
    }

    #[test]
    fn json_language_runs_through_the_pipeline() {
        let support = LangSupport::with_std_props();
        support
            .register_json(Supported::Lua, &read_test_file("grammars/calc.json"))
            .unwrap();

        let temp = assert_fs::TempDir::new().unwrap();
        let script = temp.child("calc.lua");
        script.write_str("let count = 1;\nlet col = count * 2;\n").unwrap();
        let skipped = temp.child("main.go");
        skipped.write_str("package main\n").unwrap();

        let paths = vec![script.path().to_path_buf(), skipped.path().to_path_buf()];
        let types = Arc::new(TypeRegistry::new());
        let files = pipeline::process_files(&support, &paths, &types, &PiConfig::default(), None).unwrap();
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.states.sup(), Supported::Lua);
        let report = file.report.as_ref().unwrap();
        assert!(report.infer.is_none());
        assert_eq!(report.symbols, 0);
        assert!(report.nodes > 0);

        let lua = support.lang(Supported::Lua).unwrap();
        let m = lua.complete_line(&file.states, "let x = co", Pos::new(2, 10));
        assert_eq!(m.seed, "co");
        let texts: Vec<&str> = m.matches.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["col", "count"]);
        assert!(lua.lookup(&file.states, "co", Pos::default()).is_empty());
    }

    #[test]
    fn unregistered_languages_are_not_supported() {
        let support = LangSupport::with_std_props();
        assert_eq!(
            support.lang(Supported::Go).err(),
            Some(LangError::NoParser("Go".to_string()))
        );
        assert!(support.parsed_langs().is_empty());
    }
}
