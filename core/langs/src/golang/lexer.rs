//! Lexical rules for Go.

use pi_lex::{LexAct, LexError, LexGrammar, LexRule, Matches, TokenKind};

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

pub(crate) const BASIC_TYPES: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
    "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64",
    "uintptr", "any",
];

pub(crate) const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

pub(crate) fn keywords() -> &'static [&'static str] {
    KEYWORDS
}

fn op(text: &str, kind: TokenKind) -> LexRule {
    LexRule::new(text).string(text).token(kind).act(LexAct::Next)
}

fn names() -> LexRule {
    let mut rule = LexRule::new("Name")
        .matches(Matches::Letter)
        .token(TokenKind::Name)
        .act(LexAct::Name);
    for kw in KEYWORDS {
        rule = rule.keyword(kw, TokenKind::Keyword);
    }
    for ty in BASIC_TYPES {
        rule = rule.keyword(ty, TokenKind::KeywordType);
    }
    for f in BUILTIN_FUNCS.iter().chain(&["nil", "iota"]) {
        rule = rule.keyword(f, TokenKind::NameBuiltin);
    }
    rule.keyword("true", TokenKind::LitBool)
        .keyword("false", TokenKind::LitBool)
}

/// Keywords after which an operator starts an operand.
const PREFIX_AFTER: &[&str] = &[
    "return", "case", "range", "go", "defer", "chan", "if", "for", "switch", "else",
];

/// What may follow a pointer type in a declaration: the end of a parameter,
/// field, result or spec, a struct tag or a comment.
const DECL_END: &str = ")],;={}`\"/";

/// `*` after something that ends an operand is multiplication; anywhere else
/// it is a dereference or pointer type. `&` is split the same way.
///
/// A line break ends the statement before it, so an operator that starts a
/// line is always a prefix. After a name, `p *T` spaced like a declaration
/// and followed by the end of one is a pointer type; `a * b` and `a*b` are
/// not.
fn star_or_amp(text: &str, infix: TokenKind, prefix: TokenKind) -> LexRule {
    let behind = |name: &str, m: Matches, s: &str| LexRule::new(name).matches(m).string(s).reverse();
    let leaf = |rule: LexRule, kind: TokenKind| rule.token(kind).act(LexAct::Next);
    let operand_end = |name: &str, m: Matches, s: &str| {
        if prefix != TokenKind::OpPtrDeref {
            return leaf(behind(name, m, s), infix);
        }
        let decl_type = LexRule::new("DeclType")
            .matches(Matches::TypeRef)
            .string(DECL_END)
            .offset(1);
        behind(name, m, s)
            .child(behind("Spaced", Matches::WhiteSpace, "").child(leaf(decl_type, prefix)))
            .child(leaf(LexRule::new("Infix").string(text), infix))
    };
    let mut rule = LexRule::new(text)
        .string(text)
        .token(prefix)
        .act(LexAct::Next)
        .child(leaf(behind("AfterLineBreak", Matches::LineBreak, ""), prefix));
    for kw in PREFIX_AFTER {
        rule = rule.child(leaf(behind("AfterKeyword", Matches::StrName, kw), prefix));
    }
    rule = rule
        .child(leaf(behind("AfterSliceType", Matches::String, "[]"), prefix))
        .child(operand_end("AfterName", Matches::Letter, ""))
        .child(operand_end("AfterNumber", Matches::Digit, ""))
        .child(operand_end("AfterParen", Matches::String, ")"))
        .child(operand_end("AfterBrack", Matches::String, "]"));
    for quote in ["\"", "'", "`"] {
        rule = rule.child(leaf(behind("AfterQuote", Matches::String, quote), infix));
    }
    rule.child(leaf(LexRule::new("Prefix").string(text), prefix))
}

/// Rule tree for Go source.
///
/// # Errors
///
/// Propagates validation errors of the tree.
pub fn go_lexer() -> Result<LexGrammar, LexError> {
    let root = LexRule::new("Go").children([
        LexRule::new("Space")
            .matches(Matches::WhiteSpace)
            .token(TokenKind::TextWhitespace)
            .act(LexAct::Next),
        LexRule::new("LineComment")
            .string("//")
            .token(TokenKind::Comment)
            .act(LexAct::Eol),
        LexRule::new("BlockComment")
            .string("/*")
            .token(TokenKind::CommentMultiline)
            .until("*/", true),
        LexRule::new("RawString")
            .string("`")
            .token(TokenKind::LitStrBacktick)
            .act(LexAct::QuotedRaw),
        LexRule::new("String")
            .string("\"")
            .token(TokenKind::LitStr)
            .act(LexAct::Quoted),
        LexRule::new("Rune")
            .string("'")
            .token(TokenKind::LitStrSingle)
            .act(LexAct::Quoted),
        LexRule::new("Number")
            .matches(Matches::Digit)
            .token(TokenKind::LitNumInteger)
            .act(LexAct::Number),
        names(),
        LexRule::new("Period")
            .string(".")
            .token(TokenKind::PunctSepPeriod)
            .act(LexAct::Next)
            .child(op("...", TokenKind::PunctSepEllipsis))
            .child(
                LexRule::new("Fraction")
                    .matches(Matches::Digit)
                    .offset(1)
                    .token(TokenKind::LitNumFloat)
                    .act(LexAct::Number),
            )
            .child(op(".", TokenKind::PunctSepPeriod)),
        op(":=", TokenKind::OpAsgnDefine),
        op(":", TokenKind::PunctSepColon),
        op("==", TokenKind::OpRelEqual),
        op("=", TokenKind::OpAsgnAssign),
        op("!=", TokenKind::OpRelNotEqual),
        op("!", TokenKind::OpLogNot),
        op("<-", TokenKind::OpAsgnArrow),
        op("<<", TokenKind::OpBitShiftLeft),
        op("<=", TokenKind::OpRelLtEq),
        op("<", TokenKind::OpRelLess),
        op(">>", TokenKind::OpBitShiftRight),
        op(">=", TokenKind::OpRelGtEq),
        op(">", TokenKind::OpRelGreater),
        op("&&", TokenKind::OpLogAnd),
        op("&^", TokenKind::OpBitAndNot),
        star_or_amp("&", TokenKind::OpBitAnd, TokenKind::OpPtrAddr),
        op("||", TokenKind::OpLogOr),
        op("|", TokenKind::OpBitOr),
        op("++", TokenKind::OpAsgnInc),
        op("+=", TokenKind::OpAsgnAdd),
        op("+", TokenKind::OpMathAdd),
        op("--", TokenKind::OpAsgnDec),
        op("-=", TokenKind::OpAsgnSub),
        op("-", TokenKind::OpMathSub),
        op("*=", TokenKind::OpAsgnMul),
        star_or_amp("*", TokenKind::OpMathMul, TokenKind::OpPtrDeref),
        op("/=", TokenKind::OpAsgnDiv),
        op("/", TokenKind::OpMathDiv),
        op("%", TokenKind::OpMathRem),
        op("^", TokenKind::OpBitXor),
        op("(", TokenKind::PunctGpLParen),
        op(")", TokenKind::PunctGpRParen),
        op("[", TokenKind::PunctGpLBrack),
        op("]", TokenKind::PunctGpRBrack),
        op("{", TokenKind::PunctGpLBrace),
        op("}", TokenKind::PunctGpRBrace),
        op(",", TokenKind::PunctSepComma),
        op(";", TokenKind::PunctSepSemicolon),
    ]);
    LexGrammar::new(root)
}

#[cfg(test)]
mod tests {
    use pi_lex::lex;

    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        let g = go_lexer().unwrap();
        let out = lex(&g, src).unwrap();
        out.significant()
            .iter()
            .map(|t| (t.kind, t.text(src).to_string()))
            .collect()
    }

    #[test]
    fn keywords_and_types() {
        let toks = kinds("func f() int { return nil }");
        assert_eq!(toks[0].0, TokenKind::Keyword);
        assert_eq!(toks[1].0, TokenKind::Name);
        assert_eq!(toks[4].0, TokenKind::KeywordType);
        assert_eq!(toks[7].0, TokenKind::NameBuiltin);
    }

    #[test]
    fn star_after_return_is_prefix() {
        let toks = kinds("return *p");
        assert_eq!(toks[1].0, TokenKind::OpPtrDeref);
        let toks = kinds("x := 25 * *p");
        assert_eq!(toks[3].0, TokenKind::OpMathMul);
        assert_eq!(toks[4].0, TokenKind::OpPtrDeref);
        let toks = kinds("var rs []*Rule");
        assert_eq!(toks[4].0, TokenKind::OpPtrDeref);
    }

    #[test]
    fn star_in_declarations_is_a_pointer_type() {
        for (src, at) in [
            ("var p *T", 2),
            ("func f(p *T) {}", 4),
            ("type L struct { next *L }", 5),
            ("func (c *geom.Counter) Get() *int {", 3),
            ("type N struct {\n\tnext *N\n\tval int\n}", 5),
        ] {
            let toks = kinds(src);
            assert_eq!(toks[at], (TokenKind::OpPtrDeref, "*".to_string()), "{src}");
        }
    }

    #[test]
    fn star_after_an_operand_multiplies() {
        for (src, at) in [("x := a * p", 3), ("x := a*b", 3), ("x := 'a' * 2", 3), ("s := `a` * 2", 3)] {
            let toks = kinds(src);
            assert_eq!(toks[at], (TokenKind::OpMathMul, "*".to_string()), "{src}");
        }
        let toks = kinds("x := a & mask");
        assert_eq!(toks[3].0, TokenKind::OpBitAnd);
    }

    #[test]
    fn star_starting_a_statement_is_prefix() {
        let toks = kinds("if *p > 0 {}");
        assert_eq!(toks[1].0, TokenKind::OpPtrDeref);
        let toks = kinds("x := a\n\t*p = 3");
        assert_eq!(toks[3], (TokenKind::OpPtrDeref, "*".to_string()));
        let toks = kinds("n := a\n&x");
        assert_eq!(toks[3].0, TokenKind::OpPtrAddr);
    }

    #[test]
    fn fractions_and_ellipsis() {
        let toks = kinds("f(a...) + .5");
        assert!(toks.iter().any(|(k, t)| *k == TokenKind::PunctSepEllipsis && t == "..."));
        assert!(toks.iter().any(|(k, t)| *k == TokenKind::LitNumFloat && t == ".5"));
    }
}
