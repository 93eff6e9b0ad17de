//! Grammar for Go.
//!
//! Shared rules (`Expr`, `Type`, `Block`, ...) are declared once, at their
//! first use, and referenced by name everywhere else. Only the top-level
//! declarations are children of the root.
//!
//! Expressions come in two variants. The ordinary one reads `T{...}` as a
//! composite literal. The `CondExpr` variant, used in `if`, `for` and `switch`
//! headers, never does, so the `{` that follows the header opens the body.

use pi_ast::AstAct;
use pi_lex::{TokenCat, TokenKind};
use pi_parse::{Grammar, ParseError, ParseRule, Resync, RuleKind};

const BIN_OPS: &[&str] = &[
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "|", "^", "/", "%", "<<", ">>", "&^",
];

/// `*` and `&` are binary only as the lexer classified them; a dereference
/// starting the next statement is not a continuation of this one.
const BIN_OP_KINDS: &[TokenKind] = &[TokenKind::OpMathMul, TokenKind::OpBitAnd];

const UN_OPS: &[&str] = &["-", "+", "!", "^", "<-"];

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/="];

fn tok(text: &str) -> ParseRule {
    ParseRule::text(text, text)
}

fn node(name: &str) -> ParseRule {
    ParseRule::seq(name).act(AstAct::AddAst)
}

fn seq(children: impl IntoIterator<Item = ParseRule>) -> ParseRule {
    ParseRule::seq("").children(children)
}

fn alt(children: impl IntoIterator<Item = ParseRule>) -> ParseRule {
    ParseRule::alt("").children(children)
}

fn opt(children: impl IntoIterator<Item = ParseRule>) -> ParseRule {
    ParseRule::opt("").children(children)
}

fn many(children: impl IntoIterator<Item = ParseRule>) -> ParseRule {
    ParseRule::repeat("", 0).children(children)
}

fn semi() -> ParseRule {
    opt([tok(";")])
}

fn name(node_name: &str) -> ParseRule {
    ParseRule::cat(node_name, TokenCat::Name).act(AstAct::AddAst)
}

fn lit(node_name: &str, kind: TokenKind) -> ParseRule {
    ParseRule::kind(node_name, kind).act(AstAct::AddAst)
}

fn to(target: &str) -> ParseRule {
    ParseRule::to(target)
}

/// `a, b, c`: one `Name` node each.
fn name_list() -> ParseRule {
    let first = || ParseRule::cat("Name", TokenCat::Name).act(AstAct::AnchorFirstAst);
    seq([first(), many([tok(","), first()])])
}

/// `( Spec* )` for grouped declarations.
fn group(spec: &str) -> ParseRule {
    seq([tok("("), many([to(spec)]), tok(")")])
}

fn package_clause() -> ParseRule {
    node("PackageClause").children([tok("package"), name("Name"), semi()])
}

fn import_decl() -> ParseRule {
    let spec = node("ImportSpec").children([
        opt([name("Name")]),
        lit("ImportPath", TokenKind::LitStr),
        semi(),
    ]);
    node("ImportDecl").children([tok("import"), alt([group("ImportSpec"), spec]), semi()])
}

fn const_decl() -> ParseRule {
    let spec = node("ConstSpec").children([
        name("Name"),
        opt([opt([to("Type")]), tok("="), expr_list()]),
        semi(),
    ]);
    node("ConstDecl").children([tok("const"), alt([group("ConstSpec"), spec]), semi()])
}

fn var_decl() -> ParseRule {
    let spec = node("VarSpec").children([
        name_list(),
        alt([
            seq([type_rule(), opt([tok("="), to("ExprList")])]),
            seq([tok("="), to("ExprList")]),
        ]),
        semi(),
    ]);
    node("VarDecl").children([tok("var"), alt([group("VarSpec"), spec]), semi()])
}

fn type_decl() -> ParseRule {
    let spec = node("TypeSpec").children([name("Name"), opt([tok("=")]), to("Type"), semi()]);
    node("TypeDecl").children([tok("type"), alt([group("TypeSpec"), spec]), semi()])
}

fn method_decl() -> ParseRule {
    let receiver = node("Receiver").children([
        tok("("),
        alt([seq([name("Name"), to("Type")]), to("Type")]),
        tok(")"),
    ]);
    node("MethodDecl").children([
        tok("func"),
        receiver,
        name("Name"),
        signature(),
        opt([block()]),
        semi(),
    ])
}

fn func_decl() -> ParseRule {
    node("FuncDecl").children([
        tok("func"),
        name("Name"),
        to("Signature"),
        opt([to("Block")]),
        semi(),
    ])
}

// Types.

fn type_rule() -> ParseRule {
    let type_ref = ParseRule::alt("TypeRef").children([
        lit("TypeName", TokenKind::KeywordType),
        seq([
            ParseRule::cat("TypeName", TokenCat::Name).act(AstAct::AnchorAst),
            opt([ParseRule::seq("Qual")
                .act(AstAct::SubAst)
                .children([tok("."), ParseRule::cat("", TokenCat::Name)])]),
        ]),
    ]);
    ParseRule::alt("Type").children([
        type_ref,
        node("PtrType").children([tok("*"), to("Type")]),
        ParseRule::seq("SliceType")
            .act(AstAct::AddAst)
            .children([tok("["), tok("]"), to("Type")]),
        node("ArrayType").children([
            tok("["),
            alt([to("Expr"), tok("...")]),
            tok("]"),
            to("Type"),
        ]),
        node("MapType").children([tok("map"), tok("["), to("Type"), tok("]"), to("Type")]),
        node("ChanType").children([
            alt([
                seq([tok("chan"), opt([tok("<-")])]),
                seq([tok("<-"), tok("chan")]),
            ]),
            to("Type"),
        ]),
        node("FuncType").children([tok("func"), to("Signature")]),
        struct_type(),
        interface_type(),
        seq([tok("("), to("Type"), tok(")")]),
    ])
}

fn struct_type() -> ParseRule {
    let tag = alt([
        lit("FieldTag", TokenKind::LitStrBacktick),
        lit("FieldTag", TokenKind::LitStr),
    ]);
    let field = node("Field").children([
        alt([
            seq([name_list(), to("Type")]),
            node("Embedded").children([opt([tok("*")]), to("TypeRef")]),
        ]),
        opt([tag]),
        semi(),
    ]);
    node("StructType").children([tok("struct"), tok("{"), many([field]), tok("}")])
}

fn interface_type() -> ParseRule {
    let method = node("MethodSpec").children([name("Name"), to("Signature"), semi()]);
    let embedded = node("Embedded").children([to("TypeRef"), semi()]);
    node("InterfaceType").children([
        tok("interface"),
        tok("{"),
        many([alt([method, embedded])]),
        tok("}"),
    ])
}

fn ellipsis() -> ParseRule {
    ParseRule::text("Ellipsis", "...").act(AstAct::AddAst)
}

fn param_list(first: ParseRule) -> ParseRule {
    opt([first, many([tok(","), to("ParamDecl")]), opt([tok(",")])])
}

fn signature() -> ParseRule {
    let param = node("ParamDecl").children([alt([
        seq([name("Name"), opt([ellipsis()]), to("Type")]),
        seq([opt([ellipsis()]), to("Type")]),
    ])]);
    let params = node("Params").children([tok("("), param_list(param), tok(")")]);
    let results = alt([
        node("Results").children([tok("("), param_list(to("ParamDecl")), tok(")")]),
        node("Results").children([to("Type")]),
    ]);
    ParseRule::seq("Signature").children([params, opt([results])])
}

// Expressions.

fn expr_list() -> ParseRule {
    ParseRule::seq("ExprList").children([expr(false), many([tok(","), to("Expr")])])
}

/// `Expr` or, for statement headers, `CondExpr`. Both are a flat list of
/// operands separated by `BinOp` nodes.
fn expr(hdr: bool) -> ParseRule {
    let (head, unary_name) = if hdr {
        ("CondExpr", "HdrUnary")
    } else {
        ("Expr", "Unary")
    };
    let bin_op = if hdr {
        to("BinOp")
    } else {
        ParseRule::alt("BinOp").children(
            BIN_OPS
                .iter()
                .map(|op| ParseRule::text("BinOp", op))
                .chain(BIN_OP_KINDS.iter().map(|kind| ParseRule::kind("BinOp", *kind)))
                .map(|op| op.act(AstAct::AddAst)),
        )
    };
    node(head).children([unary(hdr, unary_name), many([bin_op, to(unary_name)])])
}

fn unary(hdr: bool, rule_name: &str) -> ParseRule {
    let un_op = alt(UN_OPS
        .iter()
        .map(|op| ParseRule::text("UnOp", op).act(AstAct::AddAst)));
    ParseRule::alt(rule_name).children([
        node("UnaryExpr").children([un_op, to(rule_name)]),
        node("DerefExpr").children([ParseRule::kind("*", TokenKind::OpPtrDeref), to(rule_name)]),
        node("AddrExpr").children([ParseRule::kind("&", TokenKind::OpPtrAddr), to(rule_name)]),
        primary(hdr),
    ])
}

fn primary(hdr: bool) -> ParseRule {
    let suffix = if hdr { to("Suffix") } else { suffix() };
    node("PrimaryExpr").children([operand(hdr), many([suffix])])
}

fn suffix() -> ParseRule {
    let assert_ty = alt([
        to("Type"),
        ParseRule::text("TypeName", "type").act(AstAct::AddAst),
    ]);
    ParseRule::alt("Suffix").children([
        node("Selector").children([tok("."), name("Name")]),
        node("TypeAssert").children([tok("."), tok("("), assert_ty, tok(")")]),
        node("Index").children([
            tok("["),
            opt([to("Expr")]),
            opt([tok(":"), opt([to("Expr")])]),
            tok("]"),
        ]),
        node("Call").children([
            tok("("),
            opt([to("ExprList"), opt([ellipsis()]), opt([tok(",")])]),
            tok(")"),
        ]),
    ])
}

fn operand(hdr: bool) -> ParseRule {
    ParseRule::alt("Operand").children([
        lit("IntLit", TokenKind::LitNumInteger),
        lit("FloatLit", TokenKind::LitNumFloat),
        lit("ImagLit", TokenKind::LitNumImag),
        lit("StrLit", TokenKind::LitStr),
        lit("StrLit", TokenKind::LitStrBacktick),
        lit("CharLit", TokenKind::LitStrSingle),
        lit("BoolLit", TokenKind::LitBool),
        node("FuncLit").children([tok("func"), to("Signature"), to("Block")]),
        composite_lit(hdr),
        node("ParenExpr").children([tok("("), to("Expr"), tok(")")]),
        lit("TypeName", TokenKind::KeywordType),
        name("Name"),
        to("SliceType"),
        to("ArrayType"),
        to("MapType"),
        to("ChanType"),
        to("InterfaceType"),
    ])
}

fn composite_lit(hdr: bool) -> ParseRule {
    let mut lit_type = alt([
        to("SliceType"),
        to("ArrayType"),
        to("MapType"),
        to("StructType"),
    ]);
    if !hdr {
        lit_type = lit_type.child(to("TypeRef"));
    }
    let value = if hdr { to("LitValue") } else { lit_value() };
    node("CompositeLit").children([lit_type, value])
}

fn lit_value() -> ParseRule {
    let part = || alt([to("Expr"), to("LitValue")]);
    let element = node("Element").children([opt([node("Key").child(part()), tok(":")]), part()]);
    ParseRule::seq("LitValue").act(AstAct::AddAst).children([
        tok("{"),
        opt([element, many([tok(","), to("Element")]), opt([tok(",")])]),
        tok("}"),
    ])
}

// Statements.

fn block() -> ParseRule {
    ParseRule::seq("Block")
        .act(AstAct::AddAst)
        .children([tok("{"), many([stmt()]), tok("}")])
}

fn stmt() -> ParseRule {
    ParseRule::alt("Stmt").children([
        to("ConstDecl"),
        to("VarDecl"),
        to("TypeDecl"),
        node("ReturnStmt").children([tok("return"), opt([to("ExprList")]), semi()]),
        if_stmt(),
        for_range_stmt(),
        for_stmt(),
        switch_stmt(),
        select_stmt(),
        node("GoStmt").children([tok("go"), to("Expr"), semi()]),
        node("DeferStmt").children([tok("defer"), to("Expr"), semi()]),
        node("BreakStmt").children([tok("break"), semi()]),
        node("ContinueStmt").children([tok("continue"), semi()]),
        node("GotoStmt").children([tok("goto"), name("Label"), semi()]),
        node("FallthroughStmt").children([tok("fallthrough"), semi()]),
        seq([to("Block"), semi()]),
        node("LabeledStmt").children([name("Label"), tok(":"), opt([to("Stmt")])]),
        seq([simple_stmt(), semi()]),
        tok(";"),
    ])
}

fn simple_stmt() -> ParseRule {
    let assign_op = alt(ASSIGN_OPS
        .iter()
        .map(|op| ParseRule::text("AssignOp", op).act(AstAct::AddAst)));
    ParseRule::alt("SimpleStmt").children([
        node("DefineStmt").children([name_list(), tok(":="), to("ExprList")]),
        node("AssignStmt").children([to("ExprList"), assign_op, to("ExprList")]),
        node("IncDecStmt").children([to("Expr"), alt([tok("++"), tok("--")])]),
        node("SendStmt").children([to("Expr"), tok("<-"), to("Expr")]),
        node("ExprStmt").child(to("Expr")),
    ])
}

fn if_stmt() -> ParseRule {
    ParseRule::seq("IfStmt").act(AstAct::AddAst).children([
        tok("if"),
        opt([to("SimpleStmt"), tok(";")]),
        expr(true),
        to("Block"),
        opt([tok("else"), alt([to("IfStmt"), to("Block")])]),
        semi(),
    ])
}

/// `for k, v := range xs { ... }`. The ranged expression is always the
/// second child, after `RangeVars`.
fn for_range_stmt() -> ParseRule {
    let vars = node("RangeVars").children([name_list(), alt([tok(":="), tok("=")])]);
    node("ForRangeStmt").children([
        tok("for"),
        opt([vars]),
        tok("range"),
        to("CondExpr"),
        to("Block"),
        semi(),
    ])
}

fn for_stmt() -> ParseRule {
    let clause = seq([
        opt([to("SimpleStmt")]),
        tok(";"),
        opt([to("CondExpr")]),
        tok(";"),
        opt([to("SimpleStmt")]),
    ]);
    node("ForStmt").children([
        tok("for"),
        opt([alt([clause, to("CondExpr")])]),
        to("Block"),
        semi(),
    ])
}

fn switch_stmt() -> ParseRule {
    let guard = node("TypeSwitchGuard").children([name("Name"), tok(":="), to("CondExpr")]);
    let case = node("CaseClause").children([
        alt([seq([tok("case"), to("ExprList")]), tok("default")]),
        tok(":"),
        many([to("Stmt")]),
    ]);
    node("SwitchStmt").children([
        tok("switch"),
        opt([to("SimpleStmt"), tok(";")]),
        opt([alt([guard, to("CondExpr")])]),
        tok("{"),
        many([case]),
        tok("}"),
        semi(),
    ])
}

fn select_stmt() -> ParseRule {
    let comm = node("CommClause").children([
        alt([seq([tok("case"), to("SimpleStmt")]), tok("default")]),
        tok(":"),
        many([to("Stmt")]),
    ]);
    node("SelectStmt").children([tok("select"), tok("{"), many([comm]), tok("}"), semi()])
}

/// The Go rule tree. Top-level alternatives are tried in this order.
#[must_use]
pub fn go_rules() -> ParseRule {
    ParseRule::new("File", RuleKind::Seq).children([
        package_clause(),
        import_decl(),
        const_decl(),
        var_decl(),
        type_decl(),
        method_decl(),
        func_decl(),
        tok(";"),
    ])
}

/// # Errors
///
/// Returns [`ParseError::MalformedGrammar`] if a reference is dangling.
pub fn go_grammar() -> Result<Grammar, ParseError> {
    Grammar::new(go_rules())
}

/// Resynchronizes at the next top-level declaration keyword.
#[must_use]
pub fn go_resync() -> Resync {
    Resync::new(&[], &["func", "type", "var", "const", "import"])
}
