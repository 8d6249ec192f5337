//! Core parser infrastructure: token cursor, diagnostics, recovery helpers.

use tops_lexer::token::{Token, TokenKind};
use tops_types::ast::FunctionDef;
use tops_types::{Diagnostic, SourceFile, Span, Stage};

/// Hard cap on statements parsed per function body.
///
/// Guards against runaway loops on pathological input; when hit, the
/// enclosing block is marked `capped` and codegen emits a safety-break
/// comment.
pub const MAX_BODY_STATEMENTS: usize = 1000;

/// The Tops parser.
///
/// Consumes a token stream produced by the lexer and builds a
/// [`FunctionDef`]. Body-level problems are collected as diagnostics
/// with recovery; only a malformed signature aborts the parse.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected parse-stage diagnostics.
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Statements parsed so far across the whole body.
    pub(crate) statements_parsed: usize,
    /// Configurable statement cap (defaults to [`MAX_BODY_STATEMENTS`]).
    pub(crate) statement_cap: usize,
}

/// Result of a successful parse.
pub struct ParseResult {
    pub function: FunctionDef,
    /// Degraded-tier findings (dropped parameters, skipped statements, ...).
    pub diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            diagnostics: Vec::new(),
            statements_parsed: 0,
            statement_cap: MAX_BODY_STATEMENTS,
        }
    }

    /// Override the statement cap (tests and hostile-input callers).
    pub fn with_statement_cap(mut self, cap: usize) -> Self {
        self.statement_cap = cap;
        self
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        // Lexed streams always end with Eof; the fallback additionally
        // covers a caller-supplied empty stream.
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        let idx = self.pos + n;
        self.tokens
            .get(idx)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Eat an optional statement terminator.
    pub(crate) fn eat_semi(&mut self) {
        self.eat(&TokenKind::Semi);
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    /// Record a parse-stage diagnostic at the given span.
    pub(crate) fn diag(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics
            .push(Diagnostic::new(Stage::Parse, message, span));
    }

    /// The source line under a span, for fatal-error context.
    pub(crate) fn source_line(&self, span: Span) -> String {
        self.source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string()
    }

    /// The source name supplied by the caller.
    pub(crate) fn source_name(&self) -> &str {
        &self.source_file.name
    }

    // ── Recovery ──────────────────────────────────────────────────────────────

    /// Skip tokens up to and including the next top-level `;`, or up to
    /// (not including) a top-level `}` / Eof. Returns the skipped
    /// tokens' rendered text for the diagnostic.
    pub(crate) fn synchronize(&mut self) -> String {
        let mut skipped = Vec::new();
        let mut depth = 0u32;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::LBrace => {
                    depth += 1;
                    skipped.push(self.advance().kind.to_string());
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    skipped.push(self.advance().kind.to_string());
                }
                _ => skipped.push(self.advance().kind.to_string()),
            }
        }
        skipped.join(" ")
    }

    /// Skip a balanced `{ ... }` region whose opening brace has already
    /// been consumed. Used when the statement cap fires mid-body.
    pub(crate) fn skip_to_block_end(&mut self) {
        let mut depth = 1u32;
        while !self.at_end() && depth > 0 {
            match self.peek_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.advance();
            }
        }
    }
}
