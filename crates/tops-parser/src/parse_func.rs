//! Function signature parsing — the fatal half of the error model.
//!
//! `<ReturnType> <FuncName> ( [this][, <Type> <Name>]* ) { body }`
//!
//! A signature that cannot be parsed aborts the whole compile: without a
//! name and parameter list there is nothing to emit. Individual
//! malformed parameter entries, by contrast, are dropped with a
//! diagnostic so the rest of the function still compiles.

use crate::parser::{ParseResult, Parser};
use tops_lexer::token::TokenKind;
use tops_types::ast::{FunctionDef, Param};
use tops_types::{ErrorCode, TopsError};

impl<'src> Parser<'src> {
    /// Parse one complete function definition.
    pub fn parse(mut self) -> tops_types::Result<ParseResult> {
        let start = self.current_span();

        let return_type = self.expect_signature_ident("return type")?;
        let name = self.expect_signature_ident("function name")?;

        if !self.eat(&TokenKind::LParen) {
            return Err(self.fatal(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '(' after function name, got '{}'", self.peek_kind()),
            ));
        }

        let (has_this, params) = self.parse_params()?;

        if !self.eat(&TokenKind::LBrace) {
            return Err(self.fatal(
                ErrorCode::MALFORMED_SIGNATURE,
                format!("expected '{{' to open function body, got '{}'", self.peek_kind()),
            ));
        }

        let body_start = self.current_span();
        let (stmts, capped, closed) = self.parse_stmts_until_rbrace();
        if !closed {
            return Err(self.fatal(
                ErrorCode::UNCLOSED_BODY,
                "function body is never closed",
            ));
        }
        let body_span = body_start.merge(self.previous_span());
        self.eat_semi();

        if !self.at_end() {
            let span = self.current_span();
            self.diag(
                format!("trailing input after function body: '{}'", self.peek_kind()),
                span,
            );
        }

        let span = start.merge(self.previous_span());
        Ok(ParseResult {
            function: FunctionDef {
                return_type,
                name,
                has_this,
                params,
                body: tops_types::ast::Block {
                    stmts,
                    capped,
                    span: body_span,
                },
                span,
            },
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    /// Expect a plain identifier in signature position.
    fn expect_signature_ident(&mut self, what: &str) -> tops_types::Result<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.fatal(
                ErrorCode::MALFORMED_SIGNATURE,
                format!("expected {what}, got '{other}'"),
            )),
        }
    }

    /// Parse the parameter list up to and including `)`.
    ///
    /// `this` is only honored as the first entry. Entries that are not
    /// `<type> <name>` are dropped with a diagnostic — never silently,
    /// since a silently shifted parameter index corrupts every
    /// `local.get` after it.
    fn parse_params(&mut self) -> tops_types::Result<(bool, Vec<Param>)> {
        let mut has_this = false;
        let mut params = Vec::new();
        let mut first = true;

        if self.eat(&TokenKind::RParen) {
            return Ok((has_this, params));
        }

        loop {
            let entry_span = self.current_span();
            match self.peek_kind().clone() {
                TokenKind::This if first => {
                    self.advance();
                    has_this = true;
                }
                TokenKind::This => {
                    self.advance();
                    self.diag("'this' is only valid as the first parameter; entry dropped", entry_span);
                }
                TokenKind::Ident(ty) => {
                    self.advance();
                    match self.peek_kind().clone() {
                        TokenKind::Ident(name) => {
                            let span = entry_span.merge(self.current_span());
                            self.advance();
                            params.push(Param { ty, name, span });
                        }
                        other => {
                            self.diag(
                                format!("malformed parameter entry '{ty} {other}' dropped"),
                                entry_span,
                            );
                            self.skip_param_entry();
                        }
                    }
                }
                TokenKind::Eof => {
                    return Err(self.fatal(
                        ErrorCode::MALFORMED_SIGNATURE,
                        "parameter list is never closed",
                    ));
                }
                other => {
                    self.diag(format!("malformed parameter entry '{other}' dropped"), entry_span);
                    self.advance();
                    self.skip_param_entry();
                }
            }
            first = false;

            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if self.eat(&TokenKind::RParen) {
                return Ok((has_this, params));
            }
            // Neither ',' nor ')': skip forward inside the entry.
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::LBrace => {
                    return Err(self.fatal(
                        ErrorCode::MALFORMED_SIGNATURE,
                        "parameter list is never closed",
                    ));
                }
                _ => {
                    let span = self.current_span();
                    self.diag(
                        format!("unexpected '{}' in parameter list; skipped", self.peek_kind()),
                        span,
                    );
                    self.advance();
                }
            }
        }
    }

    /// Skip the rest of a malformed parameter entry (to `,` or `)`).
    fn skip_param_entry(&mut self) {
        while !matches!(
            self.peek_kind(),
            TokenKind::Comma | TokenKind::RParen | TokenKind::LBrace | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    /// Build a fatal signature error at the current position.
    fn fatal(&self, code: ErrorCode, message: impl Into<String>) -> TopsError {
        let span = self.current_span();
        TopsError::new(
            self.source_name(),
            code,
            message,
            span,
            self.source_line(span),
        )
    }
}
