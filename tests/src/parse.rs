#[cfg(test)]
mod parse_tests {
    use pi_ast::{Arena, AstAct};
    use pi_langs::golang::{go_grammar, go_lexer, go_resync};
    use pi_lex::TokenCat;
    use pi_parse::{Abandon, Grammar, ParseError, ParseRule, Parser};

    use crate::utils::calc_parser;

    fn child_names(ast: &Arena, id: u32) -> Vec<&str> {
        ast.children(id).iter().map(|c| ast.name(*c)).collect()
    }

    /// Sources of every node named `name` under `id`, in tree order.
    fn sources_named<'a>(ast: &'a Arena, id: u32, name: &str) -> Vec<&'a str> {
        let mut out = Vec::new();
        for &c in ast.children(id) {
            if ast.name(c) == name {
                out.push(ast.src(c));
            }
            out.extend(sources_named(ast, c, name));
        }
        out
    }

    #[test]
    fn json_grammar_builds_tree() {
        let out = calc_parser().parse("let x = 1 + y;", &Abandon).unwrap();
        let ast = &out.ast;
        let root = ast.root().unwrap();
        assert_eq!(ast.name(root), "Program");
        assert_eq!(child_names(ast, root), ["Let"]);
        let stmt = ast.children(root)[0];
        assert_eq!(child_names(ast, stmt), ["Name", "Expr"]);
        let expr = ast.child_by_name(stmt, "Expr").unwrap();
        assert_eq!(ast.src(expr), "1 + y");
        assert_eq!(child_names(ast, expr), ["Num", "Op", "Var"]);
        assert!(out.errors.is_empty());
    }

    #[test]
    fn references_nest_recursively() {
        let out = calc_parser().parse("let z = (x * 2) - 1;", &Abandon).unwrap();
        let ast = &out.ast;
        let stmt = ast.children(ast.root().unwrap())[0];
        let expr = ast.child_by_name(stmt, "Expr").unwrap();
        assert_eq!(child_names(ast, expr), ["Paren", "Op", "Num"]);
        let paren = ast.child(expr, 0).unwrap();
        let inner = ast.child_by_name(paren, "Expr").unwrap();
        assert_eq!(ast.src(inner), "x * 2");
        assert_eq!(child_names(ast, inner), ["Var", "Op", "Num"]);
    }

    #[test]
    fn off_rules_are_never_attempted() {
        let parser = calc_parser();
        let legacy = parser.grammar().rule_id("Legacy").unwrap();
        assert_eq!(parser.grammar().off_rules(), [legacy]);
        let out = parser.parse("let a = 1; let b = a;", &Abandon).unwrap();
        assert_eq!(out.stats.attempts("Legacy"), 0);
        assert_eq!(out.stats.attempts_by_id(legacy), 0);
        assert!(out.stats.attempts("Let") >= 2);
    }

    #[test]
    fn first_declared_alternative_wins() {
        let lexer = calc_parser().lexer().clone();
        let root = ParseRule::seq("Prog").children([
            ParseRule::seq("Bare").children([ParseRule::cat("Name", TokenCat::Name)]),
            ParseRule::seq("Assign").children([
                ParseRule::cat("Name", TokenCat::Name),
                ParseRule::text("=", "="),
                ParseRule::cat("Num", TokenCat::Literal),
            ]),
        ]);
        let parser = Parser::new(lexer, Grammar::new(root).unwrap());
        let err = parser.parse("x = 1", &Abandon).unwrap_err();
        assert!(
            matches!(&err, ParseError::ParseNoMatch { found, offset: 2, .. } if found == "="),
            "{err}"
        );
    }

    #[test]
    fn structural_rules_share_their_parents_anchors() {
        let name = || ParseRule::cat("Name", TokenCat::Name).act(AstAct::AnchorFirstAst);
        let root = ParseRule::seq("File").children([ParseRule::seq("VarSpec")
            .act(AstAct::AddAst)
            .children([
                ParseRule::text("var", "var"),
                ParseRule::seq("")
                    .children([name(), ParseRule::repeat("", 0).children([ParseRule::text(",", ","), name()])]),
                ParseRule::cat("Type", TokenCat::Name).act(AstAct::SubAst),
            ])]);
        let parser = Parser::new(go_lexer().unwrap(), Grammar::new(root).unwrap());
        let out = parser.parse("var a, b T", &Abandon).unwrap();
        let ast = &out.ast;
        let spec = ast.children(ast.root().unwrap())[0];
        assert_eq!(child_names(ast, spec), ["Name", "Name"]);
        let names = ast.children(spec);
        assert_eq!(ast.src(names[0]), "a, b T");
        assert_eq!(ast.src(names[1]), "b");
        assert_eq!(ast.src(spec), "var a, b T");
    }

    #[test]
    fn dangling_reference_is_malformed() {
        let json = r#"{"lexer": {"name": "L"}, "grammar": {"name": "G", "children": [{"name": "X", "kind": {"Ref": "Missing"}}]}}"#;
        let err = Parser::from_json(json).unwrap_err();
        assert!(matches!(&err, ParseError::MalformedGrammar(m) if m.contains("Missing")), "{err}");
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = Parser::from_json("{\"lexer\": ").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn error_inside_a_function_body_is_reported_where_it_is() {
        let parser = Parser::new(go_lexer().unwrap(), go_grammar().unwrap());
        let src = "package p\n\nfunc f() {\n\tx := 1\n\tx = = 2\n}\n";
        let err = parser.parse(src, &Abandon).unwrap_err();
        let ParseError::ParseNoMatch { offset, pos, found, rule_chain } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(*offset, src.find("= =").unwrap() + 2);
        assert_eq!(found, "=");
        assert_eq!(pos.line, 4);
        assert!(rule_chain.starts_with("File > FuncDecl"), "{rule_chain}");
        assert!(rule_chain.contains("AssignStmt"), "{rule_chain}");
    }

    #[test]
    fn deref_on_a_new_line_starts_a_statement() {
        let parser = Parser::new(go_lexer().unwrap(), go_grammar().unwrap());
        let src = "package p\n\nfunc f(a int, p *int) {\n\tx := a\n\t*p = 3\n\t_ = x * a\n}\n";
        let out = parser.parse(src, &Abandon).unwrap();
        let ast = &out.ast;
        let root = ast.root().unwrap();
        assert_eq!(child_names(ast, root), ["PackageClause", "FuncDecl"]);
        assert_eq!(sources_named(ast, root, "DefineStmt"), ["x := a"]);
        assert_eq!(sources_named(ast, root, "AssignStmt"), ["*p = 3", "_ = x * a"]);
        assert_eq!(sources_named(ast, root, "DerefExpr"), ["*p"]);
        assert_eq!(sources_named(ast, root, "BinOp"), ["*"]);
    }

    #[test]
    fn resync_skips_to_next_declaration() {
        let parser = Parser::new(go_lexer().unwrap(), go_grammar().unwrap());
        let src = "package p\n\nfunc ) {\n\nfunc ok() {}\n";
        let out = parser.parse(src, &go_resync()).unwrap();
        assert_eq!(out.errors.len(), 1);
        let ParseError::ParseNoMatch { pos, found, .. } = &out.errors[0] else {
            panic!("unexpected error {:?}", out.errors[0]);
        };
        assert_eq!(found, ")");
        assert_eq!(pos.line, 2);
        let root = out.ast.root().unwrap();
        assert_eq!(child_names(&out.ast, root), ["PackageClause", "FuncDecl"]);

        let err = parser.parse(src, &Abandon).unwrap_err();
        assert_eq!(err.offset(), Some(src.find(')').unwrap()));
    }

    #[test]
    fn parse_is_deterministic() {
        let parser = Parser::new(go_lexer().unwrap(), go_grammar().unwrap());
        let src = crate::utils::read_test_file("go/scenarios/consts.go");
        let a = parser.parse(&src, &Abandon).unwrap();
        let b = parser.parse(&src, &Abandon).unwrap();
        let root = a.ast.root().unwrap();
        assert_eq!(a.ast.write_tree(root), b.ast.write_tree(root));
        assert_eq!(a.stats, b.stats);
    }
}
