//! Token types for the Tops lexer.
//!
//! Defines [`TokenKind`] covering every Tops lexeme and [`Token`],
//! which pairs a kind with a source [`Span`].

use std::fmt;
use tops_types::Span;

/// All 15 reserved identifiers in Tops.
///
/// These cannot be used as user-defined names. The lexer recognises each
/// one and emits a specific keyword token instead of [`TokenKind::Ident`].
pub const ALL_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "default", "else", "eswitch", "false", "if", "loop", "new",
    "return", "this", "throw", "true", "try",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the Tops lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the Tops language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals & identifiers ───────────────────────────────

    /// Unsigned integer literal: `42`
    Int(i64),
    /// User-defined identifier (including type names like `int4`).
    Ident(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `break`
    Break,
    /// `case`
    Case,
    /// `catch`
    Catch,
    /// `default`
    Default,
    /// `else`
    Else,
    /// `eswitch`
    Eswitch,
    /// `false`
    False,
    /// `if`
    If,
    /// `loop`
    Loop,
    /// `new`
    New,
    /// `return`
    Return,
    /// `this`
    This,
    /// `throw`
    Throw,
    /// `true`
    True,
    /// `try`
    Try,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semi,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,

    // ── Operators ────────────────────────────────────────────

    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&` — tokenized, but rejected by the condition lowering.
    AndAnd,
    /// `||` — tokenized, but rejected by the condition lowering.
    OrOr,

    // ── Special ──────────────────────────────────────────────

    /// A character the lexer could not place. Kept in the stream so the
    /// parser's recovery can skip over it with a diagnostic.
    Unknown(char),
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Break
                | Self::Case
                | Self::Catch
                | Self::Default
                | Self::Else
                | Self::Eswitch
                | Self::False
                | Self::If
                | Self::Loop
                | Self::New
                | Self::Return
                | Self::This
                | Self::Throw
                | Self::True
                | Self::Try
        )
    }

    /// Map an identifier's text to its keyword kind, if reserved.
    pub fn keyword(text: &str) -> Option<Self> {
        match text {
            "break" => Some(Self::Break),
            "case" => Some(Self::Case),
            "catch" => Some(Self::Catch),
            "default" => Some(Self::Default),
            "else" => Some(Self::Else),
            "eswitch" => Some(Self::Eswitch),
            "false" => Some(Self::False),
            "if" => Some(Self::If),
            "loop" => Some(Self::Loop),
            "new" => Some(Self::New),
            "return" => Some(Self::Return),
            "this" => Some(Self::This),
            "throw" => Some(Self::Throw),
            "true" => Some(Self::True),
            "try" => Some(Self::Try),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Break => write!(f, "break"),
            Self::Case => write!(f, "case"),
            Self::Catch => write!(f, "catch"),
            Self::Default => write!(f, "default"),
            Self::Else => write!(f, "else"),
            Self::Eswitch => write!(f, "eswitch"),
            Self::False => write!(f, "false"),
            Self::If => write!(f, "if"),
            Self::Loop => write!(f, "loop"),
            Self::New => write!(f, "new"),
            Self::Return => write!(f, "return"),
            Self::This => write!(f, "this"),
            Self::Throw => write!(f, "throw"),
            Self::True => write!(f, "true"),
            Self::Try => write!(f, "try"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::Semi => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Colon => write!(f, ":"),
            Self::Assign => write!(f, "="),
            Self::Plus => write!(f, "+"),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::Unknown(ch) => write!(f, "{ch}"),
            Self::Eof => write!(f, "<eof>"),
        }
    }
}
