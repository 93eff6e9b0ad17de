//! Lexer and grammar rule trees for TeX.
//!
//! The grammar only recovers document structure: commands with their
//! `[...]` and `{...}` arguments, and brace groups. Everything else is text.

use pi_ast::AstAct;
use pi_lex::{LexAct, LexError, LexGrammar, LexRule, Matches, TokenCat, TokenKind};
use pi_parse::{Grammar, ParseError, ParseRule, RuleKind};

/// Characters that a backslash escapes rather than starting a command.
const ESCAPED: &[&str] = &["\\\\", "\\%", "\\{", "\\}", "\\$", "\\&", "\\#", "\\_", "\\ "];

fn op(text: &str, kind: TokenKind) -> LexRule {
    LexRule::new(text).string(text).token(kind).act(LexAct::Next)
}

/// Rule tree for TeX source.
///
/// # Errors
///
/// Propagates validation errors of the tree.
pub fn tex_lexer() -> Result<LexGrammar, LexError> {
    let mut rules = vec![
        LexRule::new("Space")
            .matches(Matches::WhiteSpace)
            .token(TokenKind::TextWhitespace)
            .act(LexAct::Next),
        LexRule::new("Comment")
            .string("%")
            .token(TokenKind::Comment)
            .act(LexAct::Eol),
    ];
    rules.extend(ESCAPED.iter().map(|e| op(e, TokenKind::Text)));
    rules.extend([
        LexRule::new("Command")
            .string("\\")
            .token(TokenKind::Keyword)
            .act(LexAct::Next)
            .act(LexAct::Name),
        op("{", TokenKind::PunctGpLBrace),
        op("}", TokenKind::PunctGpRBrace),
        op("[", TokenKind::PunctGpLBrack),
        op("]", TokenKind::PunctGpRBrack),
        LexRule::new("Number")
            .matches(Matches::Digit)
            .token(TokenKind::LitNumInteger)
            .act(LexAct::Number),
        LexRule::new("Word")
            .matches(Matches::Letter)
            .token(TokenKind::Text)
            .act(LexAct::Name),
        LexRule::new("Other")
            .matches(Matches::AnyRune)
            .token(TokenKind::Text)
            .act(LexAct::Next),
    ]);
    LexGrammar::new(LexRule::new("TeX").children(rules))
}

fn tok(text: &str) -> ParseRule {
    ParseRule::text(text, text)
}

fn text() -> [ParseRule; 2] {
    [
        ParseRule::cat("Text", TokenCat::Text),
        ParseRule::cat("Number", TokenCat::Literal),
    ]
}

fn arg() -> ParseRule {
    let content = ParseRule::alt("Content")
        .children([ParseRule::to("Command"), ParseRule::to("Arg")])
        .children(text())
        .children([tok("["), tok("]")]);
    ParseRule::seq("Arg").act(AstAct::AddAst).children([
        tok("{"),
        ParseRule::repeat("", 0).children([content]),
        tok("}"),
    ])
}

fn opt_arg() -> ParseRule {
    let content = ParseRule::alt("")
        .children([ParseRule::to("Command"), ParseRule::to("Arg")])
        .children(text());
    ParseRule::seq("OptArg").act(AstAct::AddAst).children([
        tok("["),
        ParseRule::repeat("", 0).children([content]),
        tok("]"),
    ])
}

fn command() -> ParseRule {
    ParseRule::seq("Command").act(AstAct::AddAst).children([
        ParseRule::kind("CmdName", TokenKind::Keyword).act(AstAct::AddAst),
        ParseRule::repeat("", 0).children([ParseRule::alt("").children([opt_arg(), arg()])]),
    ])
}

/// The TeX rule tree.
#[must_use]
pub fn tex_rules() -> ParseRule {
    ParseRule::new("Document", RuleKind::Seq)
        .children([command(), ParseRule::to("Arg")])
        .children(text())
        .children([tok("["), tok("]")])
}

/// # Errors
///
/// Returns [`ParseError::MalformedGrammar`] if a reference is dangling.
pub fn tex_grammar() -> Result<Grammar, ParseError> {
    Grammar::new(tex_rules())
}

#[cfg(test)]
mod tests {
    use pi_lex::lex;

    use super::*;

    fn toks(src: &str) -> Vec<(TokenKind, String)> {
        let g = tex_lexer().unwrap();
        let out = lex(&g, src).unwrap();
        out.significant()
            .iter()
            .map(|t| (t.kind, t.text(src).to_string()))
            .collect()
    }

    #[test]
    fn commands_are_keywords() {
        let t = toks(r"\section{Intro} text");
        assert_eq!(t[0], (TokenKind::Keyword, r"\section".to_string()));
        assert_eq!(t[1].0, TokenKind::PunctGpLBrace);
        assert_eq!(t[2], (TokenKind::Text, "Intro".to_string()));
    }

    #[test]
    fn escaped_percent_is_not_a_comment() {
        let t = toks(r"50\% done % note");
        let texts: Vec<&str> = t.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(texts, ["50", r"\%", "done"]);
    }

    #[test]
    fn grammar_references_resolve() {
        let g = tex_grammar().unwrap();
        assert!(g.rule_id("Arg").is_some());
        assert!(g.rule_id("Command").is_some());
    }
}
