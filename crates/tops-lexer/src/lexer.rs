//! Core Tops lexer — converts source text to a token stream.
//!
//! Tops is small: identifiers, unsigned integer literals, 15 keywords,
//! a handful of operators. Whitespace is insignificant. There are no
//! string literals and no comments. Unknown characters are kept in the
//! stream as [`TokenKind::Unknown`] with a lex-stage diagnostic, so
//! downstream recovery can skip them without the lexer ever failing.

use tops_types::{Diagnostic, SourceFile, Span, Stage};

use crate::token::{Token, TokenKind};

/// The Tops lexer.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected lex-stage diagnostics.
    diagnostics: Vec<Diagnostic>,
}

/// Result of lexing: tokens + any diagnostics collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Degraded-tier findings (unknown characters).
    pub diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Lex the entire source into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            diagnostics: self.diagnostics,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token.
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.at_end() {
            return Token::new(TokenKind::Eof, Span::point(self.line, self.col));
        }

        let start_line = self.line;
        let start_col = self.col;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Token::new(TokenKind::Eof, Span::point(self.line, self.col)),
        };

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b';' => TokenKind::Semi,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,
            b'+' => TokenKind::Plus,

            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    self.unknown(ch as char, start_line, start_col)
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    self.unknown(ch as char, start_line, start_col)
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    self.unknown(ch as char, start_line, start_col)
                }
            }

            b'0'..=b'9' => self.scan_number(ch),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(ch),

            other => self.unknown(other as char, start_line, start_col),
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Scan an unsigned integer literal.
    fn scan_number(&mut self, first: u8) -> TokenKind {
        let mut value = i64::from(first - b'0');
        while let Some(ch @ b'0'..=b'9') = self.peek() {
            self.advance();
            // Saturate rather than wrap on absurd literals.
            value = value
                .saturating_mul(10)
                .saturating_add(i64::from(ch - b'0'));
        }
        TokenKind::Int(value)
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self, first: u8) -> TokenKind {
        let mut text = String::new();
        text.push(first as char);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
                text.push(ch as char);
            } else {
                break;
            }
        }
        TokenKind::keyword(&text).unwrap_or(TokenKind::Ident(text))
    }

    /// Record an unknown-character diagnostic and keep the character in
    /// the stream for the parser's recovery to skip.
    fn unknown(&mut self, ch: char, line: u32, col: u32) -> TokenKind {
        self.diagnostics.push(Diagnostic::new(
            Stage::Lex,
            format!("unexpected character '{ch}'"),
            Span::point(line, col),
        ));
        TokenKind::Unknown(ch)
    }
}
