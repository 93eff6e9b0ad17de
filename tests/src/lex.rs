#[cfg(test)]
mod lex_tests {
    use pi_langs::golang::go_lexer;
    use pi_langs::tex::tex_lexer;
    use pi_lex::{LexError, TokenKind, lex, relex_from_line};
    use proptest::prelude::*;

    use crate::utils::calc_parser;

    fn significant(src: &str) -> Vec<(TokenKind, String)> {
        let out = lex(&go_lexer().unwrap(), src).unwrap();
        out.significant()
            .iter()
            .map(|t| (t.kind, t.text(src).to_string()))
            .collect()
    }

    #[test]
    fn prefix_star_at_operand_start() {
        let toks = significant("*p");
        assert_eq!(
            toks,
            [
                (TokenKind::OpPtrDeref, "*".to_string()),
                (TokenKind::Name, "p".to_string())
            ]
        );
    }

    #[test]
    fn infix_star_between_operands() {
        let toks = significant("a*p");
        assert_eq!(
            toks,
            [
                (TokenKind::Name, "a".to_string()),
                (TokenKind::OpMathMul, "*".to_string()),
                (TokenKind::Name, "p".to_string())
            ]
        );
    }

    #[test]
    fn nested_block_comment_is_one_token() {
        let src = "/* outer /* inner */ still-outer */x";
        let out = lex(&go_lexer().unwrap(), src).unwrap();
        assert_eq!(out.tokens.len(), 2);
        let comment = out.tokens[0];
        assert_eq!(comment.kind, TokenKind::CommentMultiline);
        assert_eq!(comment.text(src), "/* outer /* inner */ still-outer */");
        assert_eq!(out.tokens[1].text(src), "x");
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        let src = "a /* never closed\nb";
        let out = lex(&go_lexer().unwrap(), src).unwrap();
        let last = out.tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::CommentMultiline);
        assert_eq!(last.end, src.len());
    }

    #[test]
    fn positions_are_line_and_column() {
        let src = "package p\n\nvar x = 1";
        let out = lex(&go_lexer().unwrap(), src).unwrap();
        let x = out.tokens.iter().find(|t| t.text(src) == "x").unwrap();
        assert_eq!((x.pos.line, x.pos.col), (2, 4));
        assert_eq!(x.pos.to_string(), "3:5");
    }

    #[test]
    fn unknown_character_stops_the_lexer() {
        let err = lex(&go_lexer().unwrap(), "a @ b").unwrap_err();
        assert!(matches!(err, LexError::LexNoMatch { offset: 2, .. }), "{err}");
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn json_lexer_maps_keywords() {
        let parser = calc_parser();
        let src = "let letter = 4;";
        let out = parser.lex(src).unwrap();
        let kinds: Vec<TokenKind> = out.significant().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::Keyword,
                TokenKind::Name,
                TokenKind::OpAsgnAssign,
                TokenKind::LitNumInteger,
                TokenKind::PunctSepSemicolon
            ]
        );
    }

    #[test]
    fn tex_escapes_are_text() {
        let src = r"50\% off % note";
        let out = lex(&tex_lexer().unwrap(), src).unwrap();
        let texts: Vec<(TokenKind, &str)> = out
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::TextWhitespace)
            .map(|t| (t.kind, t.text(src)))
            .collect();
        assert_eq!(
            texts,
            [
                (TokenKind::LitNumInteger, "50"),
                (TokenKind::Text, r"\%"),
                (TokenKind::Text, "off"),
                (TokenKind::Comment, "% note"),
            ]
        );
    }

    #[test]
    fn relex_after_edit_matches_full_pass() {
        let g = go_lexer().unwrap();
        let old = "package p\n/* a\nb */\nvar x = 1\nvar y = 2\n";
        let new = "package p\n/* a\nb */\nvar x = 1\nvar yy = 3 * x\n";
        let prev = lex(&g, old).unwrap();
        let relexed = relex_from_line(&g, new, &prev, 4).unwrap();
        assert_eq!(relexed, lex(&g, new).unwrap());
    }

    proptest! {
        #[test]
        fn tex_tokens_cover_any_input(src in "\\PC{0,64}") {
            let out = lex(&tex_lexer().unwrap(), &src).unwrap();
            prop_assert_eq!(out.reconstruct(&src), src.clone());
            let mut at = 0;
            for t in &out.tokens {
                prop_assert_eq!(t.start, at);
                prop_assert!(t.end > t.start);
                at = t.end;
            }
        }

        #[test]
        fn go_tokens_cover_input(src in "[a-z0-9 \n+*/=(){};.,:<>!&|-]{0,80}") {
            let out = lex(&go_lexer().unwrap(), &src).unwrap();
            prop_assert_eq!(out.reconstruct(&src), src);
        }

        #[test]
        fn relex_equals_full_lex(
            head in proptest::collection::vec("[a-z0-9 +*/=(){}]{0,12}", 1..6),
            old_tail in proptest::collection::vec("[a-z0-9 +*/=(){}]{0,12}", 0..4),
            new_tail in proptest::collection::vec("[a-z0-9 +*/=(){}]{0,12}", 0..4),
        ) {
            let g = go_lexer().unwrap();
            let line = u32::try_from(head.len()).unwrap();
            let kept: String = head.iter().map(|l| format!("{l}\n")).collect();
            let old = format!("{kept}{}", old_tail.join("\n"));
            let new = format!("{kept}{}", new_tail.join("\n"));
            let prev = lex(&g, &old).unwrap();
            let relexed = relex_from_line(&g, &new, &prev, line).unwrap();
            prop_assert_eq!(relexed, lex(&g, &new).unwrap());
        }
    }
}
