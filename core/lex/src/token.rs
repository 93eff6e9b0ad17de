//! Token kinds and tokens.
//!
//! [`TokenKind`] is a closed set of classifier categories. Each kind belongs to a
//! coarse [`TokenCat`] that grammars can match against when the exact kind does
//! not matter (e.g. "any literal").

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::pos::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenCat {
    None,
    Keyword,
    Name,
    Literal,
    Operator,
    Punctuation,
    Comment,
    Text,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TokenKind {
    #[default]
    None,
    Error,
    Eof,

    Keyword,
    KeywordType,

    Name,
    NameBuiltin,
    NameTag,

    LitStr,
    LitStrBacktick,
    LitStrSingle,
    LitNumInteger,
    LitNumFloat,
    LitNumImag,
    LitBool,

    OpMathAdd,
    OpMathSub,
    OpMathMul,
    OpMathDiv,
    OpMathRem,
    OpBitAnd,
    OpBitOr,
    OpBitXor,
    OpBitShiftLeft,
    OpBitShiftRight,
    OpBitAndNot,
    OpLogAnd,
    OpLogOr,
    OpLogNot,
    OpRelEqual,
    OpRelNotEqual,
    OpRelLess,
    OpRelGreater,
    OpRelLtEq,
    OpRelGtEq,
    OpAsgnAssign,
    OpAsgnDefine,
    OpAsgnInc,
    OpAsgnDec,
    OpAsgnArrow,
    OpAsgnAdd,
    OpAsgnSub,
    OpAsgnMul,
    OpAsgnDiv,
    /// Prefix `*`: pointer dereference or pointer type.
    OpPtrDeref,
    /// Prefix `&`: address-of.
    OpPtrAddr,

    PunctGpLParen,
    PunctGpRParen,
    PunctGpLBrack,
    PunctGpRBrack,
    PunctGpLBrace,
    PunctGpRBrace,
    PunctSepComma,
    PunctSepPeriod,
    PunctSepSemicolon,
    PunctSepColon,
    PunctSepEllipsis,

    Comment,
    CommentMultiline,

    Text,
    TextWhitespace,
}

impl TokenKind {
    #[must_use]
    pub const fn cat(self) -> TokenCat {
        use TokenKind as K;
        match self {
            K::None | K::Eof => TokenCat::None,
            K::Error => TokenCat::Error,
            K::Keyword | K::KeywordType => TokenCat::Keyword,
            K::Name | K::NameBuiltin | K::NameTag => TokenCat::Name,
            K::LitStr
            | K::LitStrBacktick
            | K::LitStrSingle
            | K::LitNumInteger
            | K::LitNumFloat
            | K::LitNumImag
            | K::LitBool => TokenCat::Literal,
            K::OpMathAdd
            | K::OpMathSub
            | K::OpMathMul
            | K::OpMathDiv
            | K::OpMathRem
            | K::OpBitAnd
            | K::OpBitOr
            | K::OpBitXor
            | K::OpBitShiftLeft
            | K::OpBitShiftRight
            | K::OpBitAndNot
            | K::OpLogAnd
            | K::OpLogOr
            | K::OpLogNot
            | K::OpRelEqual
            | K::OpRelNotEqual
            | K::OpRelLess
            | K::OpRelGreater
            | K::OpRelLtEq
            | K::OpRelGtEq
            | K::OpAsgnAssign
            | K::OpAsgnDefine
            | K::OpAsgnInc
            | K::OpAsgnDec
            | K::OpAsgnArrow
            | K::OpAsgnAdd
            | K::OpAsgnSub
            | K::OpAsgnMul
            | K::OpAsgnDiv
            | K::OpPtrDeref
            | K::OpPtrAddr => TokenCat::Operator,
            K::PunctGpLParen
            | K::PunctGpRParen
            | K::PunctGpLBrack
            | K::PunctGpRBrack
            | K::PunctGpLBrace
            | K::PunctGpRBrace
            | K::PunctSepComma
            | K::PunctSepPeriod
            | K::PunctSepSemicolon
            | K::PunctSepColon
            | K::PunctSepEllipsis => TokenCat::Punctuation,
            K::Comment | K::CommentMultiline => TokenCat::Comment,
            K::Text | K::TextWhitespace => TokenCat::Text,
        }
    }

    /// Literal numbers of any flavor.
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(
            self,
            TokenKind::LitNumInteger | TokenKind::LitNumFloat | TokenKind::LitNumImag
        )
    }

    /// Trivia is kept in the token sequence (so spans reproduce the input) but
    /// is invisible to the parser.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self.cat(), TokenCat::Comment)
            || matches!(self, TokenKind::TextWhitespace | TokenKind::Eof)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A classified slice of the source.
///
/// `start..end` are byte offsets into the source string. `rule` is the
/// preorder id of the lexical rule that produced the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub pos: Pos,
    pub rule: u32,
}

impl Token {
    #[must_use]
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end]
    }

    /// Position just past the last character of the token.
    #[must_use]
    pub fn end_pos(&self, src: &str) -> Pos {
        let mut pos = self.pos;
        for c in self.text(src).chars() {
            if c == '\n' {
                pos.line += 1;
                pos.col = 0;
            } else {
                pos.col += 1;
            }
        }
        pos
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
