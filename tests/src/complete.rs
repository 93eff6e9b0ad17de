/// Completion and lookup through the plugins, over real project files.
#[cfg(test)]
mod complete_tests {
    use std::sync::Arc;

    use assert_fs::prelude::*;
    use pi::{FileStates, Matches, Supported, pipeline};
    use pi_lex::Pos;
    use pi_syms::TypeRegistry;

    use crate::utils::{config, get_test_data_path, lang};

    /// Inside `main` in `main/main.go`.
    const IN_MAIN: Pos = Pos::new(30, 1);
    /// Inside `Counter.Inc`.
    const IN_INC: Pos = Pos::new(20, 1);

    fn main_file() -> FileStates {
        let root = get_test_data_path().join("go/project");
        let paths = vec![root.join("geom/point.go"), root.join("main/main.go")];
        let types = Arc::new(TypeRegistry::new());
        let mut files =
            pipeline::process_files(pi_langs::global(), &paths, &types, &config(true), None)
                .unwrap();
        files.pop().unwrap().states
    }

    fn texts(m: &Matches) -> Vec<&str> {
        m.matches.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn package_members_come_from_the_registry() {
        let go = lang(Supported::Go);
        let fss = main_file();
        let m = go.complete_line(&fss, "\tp := geom.N", IN_MAIN);
        assert_eq!(m.seed, "N");
        assert_eq!(texts(&m), ["New"]);
        assert_eq!(m.matches[0].icon, "function");

        let types = go.complete_line(&fss, "\tvar r geom.", IN_MAIN);
        for name in ["Point", "Rect", "Shape", "New"] {
            assert!(texts(&types).contains(&name), "{name} in {:?}", texts(&types));
        }
        assert!(!texts(&types).contains(&"Add"));
    }

    #[test]
    fn methods_through_a_pointer() {
        let go = lang(Supported::Go);
        let fss = main_file();
        let m = go.complete_line(&fss, "\tc.I", IN_MAIN);
        assert_eq!(texts(&m), ["Inc"]);

        let fields = go.complete_line(&fss, "\tc.h", IN_MAIN);
        assert_eq!(texts(&fields), ["hits"]);
        assert_eq!(fields.matches[0].icon, "field");
    }

    #[test]
    fn bare_names_include_keywords_and_globals() {
        let go = lang(Supported::Go);
        let fss = main_file();
        assert_eq!(texts(&go.complete_line(&fss, "\tret", IN_MAIN)), ["return"]);

        let m = go.complete_line(&fss, "\tx := or", IN_MAIN);
        assert_eq!(texts(&m), ["origin"]);
        assert_eq!(m.matches[0].desc, "*geom.Point");
    }

    #[test]
    fn locals_are_visible_only_in_their_function() {
        let go = lang(Supported::Go);
        let fss = main_file();
        assert_eq!(texts(&go.complete_line(&fss, "\tna", IN_MAIN)), ["name", "names"]);
        assert_eq!(texts(&go.complete_line(&fss, "\tna", IN_INC)), ["names"]);
    }

    #[test]
    fn empty_seed_offers_nothing() {
        let go = lang(Supported::Go);
        let fss = main_file();
        assert!(go.complete_line(&fss, "\tx := ", IN_MAIN).is_empty());
    }

    #[test]
    fn lookup_finds_definitions() {
        let go = lang(Supported::Go);
        let fss = main_file();

        let origin = go.lookup(&fss, "\tx := origin", IN_MAIN);
        assert!(origin.filename.ends_with("main.go"), "{}", origin.filename);
        assert_eq!(origin.start_line, 9);
        assert_eq!(origin.text, "var origin = geom.New(0, 0)");

        let inc = go.lookup(&fss, "\tn := c.Inc", IN_MAIN);
        assert_eq!((inc.start_line, inc.end_line), (18, 22));
        assert!(inc.text.starts_with("func (c *Counter) Inc(key string) int {"));

        assert!(go.lookup(&fss, "\tx := nowhere", IN_MAIN).is_empty());
    }

    #[test]
    fn chosen_functions_get_call_parens() {
        let go = lang(Supported::Go);
        let fss = main_file();
        let line = "\tp := geom.N";
        let m = go.complete_line(&fss, line, IN_MAIN);
        let edit = go.complete_edit(&fss, line, line.len(), &m.matches[0], &m.seed);
        assert_eq!(edit.new_text, "New()");
        assert_eq!(edit.forward_delete, 0);
    }

    fn tex_doc(temp: &assert_fs::TempDir) -> FileStates {
        let doc = temp.child("doc.tex");
        doc.write_str("\\section{Intro}\n").unwrap();
        FileStates::new(
            &doc.path().to_string_lossy(),
            Supported::TeX,
            Arc::new(TypeRegistry::new()),
        )
    }

    #[test]
    fn cites_complete_from_sibling_bib_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.copy_from(get_test_data_path().join("tex"), &["*.bib"])
            .unwrap();
        let tex = lang(Supported::TeX);
        let fss = tex_doc(&temp);

        let m = tex.complete_line(&fss, r"as in \cite{kn", Pos::default());
        assert_eq!(m.seed, "kn");
        assert_eq!(texts(&m), ["knuth84"]);
        assert_eq!(m.matches[0].icon, "cite");
        assert_eq!(m.matches[0].desc, "Donald E. Knuth (1984): Literate Programming");

        let all = tex.complete_line(&fss, r"\shortcite{", Pos::default());
        assert_eq!(texts(&all), ["knuth84", "lamport94"]);
    }

    #[test]
    fn cite_lookup_returns_the_entry() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.copy_from(get_test_data_path().join("tex"), &["*.bib"])
            .unwrap();
        let tex = lang(Supported::TeX);
        let fss = tex_doc(&temp);

        let found = tex.lookup(&fss, r"see \cite{lamport94", Pos::default());
        assert!(found.filename.ends_with("refs.bib"), "{}", found.filename);
        assert_eq!(found.start_line, 6);
        assert!(found.text.starts_with("@book{lamport94,"));
        assert!(tex.lookup(&fss, r"see \cite{nobody", Pos::default()).is_empty());
    }

    #[test]
    fn cites_without_bib_files_are_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        let tex = lang(Supported::TeX);
        let fss = tex_doc(&temp);
        let m = tex.complete_line(&fss, r"\cite{kn", Pos::default());
        assert_eq!(m.seed, "kn");
        assert!(m.is_empty());
    }
}
