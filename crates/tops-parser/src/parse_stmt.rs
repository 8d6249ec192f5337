//! Statement parsing — the body driver and the four control constructs.
//!
//! The driver dispatches on the leading token: `if`, `eswitch`, `loop`,
//! `try`, then the simple statements. Whatever cannot be classified is
//! consumed up to the next statement boundary into `Stmt::Unrecognized`,
//! guaranteeing forward progress; a hard statement cap stops pathological
//! input.

use crate::parser::Parser;
use tops_lexer::token::TokenKind;
use tops_types::ast::*;

impl<'src> Parser<'src> {
    /// Parse statements until the matching `}` (consumed) or Eof.
    ///
    /// Returns `(stmts, capped, closed)` — `closed` is false when the
    /// block ran into Eof instead of `}`.
    pub(crate) fn parse_stmts_until_rbrace(&mut self) -> (Vec<Stmt>, bool, bool) {
        let mut stmts = Vec::new();
        let mut capped = false;
        loop {
            if self.eat(&TokenKind::RBrace) {
                return (stmts, capped, true);
            }
            if self.at_end() {
                return (stmts, capped, false);
            }
            if self.statements_parsed >= self.statement_cap {
                let span = self.current_span();
                self.diag(
                    format!("statement cap ({}) reached; remaining body skipped", self.statement_cap),
                    span,
                );
                capped = true;
                self.skip_to_block_end();
                continue;
            }
            self.statements_parsed += 1;
            let stmt = self.parse_statement();
            stmts.push(stmt);
        }
    }

    /// Parse a nested block `{ ... }`. Returns `None` (with a
    /// diagnostic already recorded by the caller) if `{` is absent.
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        if !self.eat(&TokenKind::LBrace) {
            return None;
        }
        let (stmts, capped, closed) = self.parse_stmts_until_rbrace();
        if !closed {
            let span = self.current_span();
            self.diag("block is never closed", span);
        }
        Some(Block {
            stmts,
            capped,
            span: start.merge(self.previous_span()),
        })
    }

    /// Parse a single statement. A bare `;` comes back as `Stmt::Empty`.
    pub(crate) fn parse_statement(&mut self) -> Stmt {
        match self.peek_kind() {
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Eswitch => self.parse_eswitch_stmt(),
            TokenKind::Loop => self.parse_loop_stmt(),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.eat_semi();
                Stmt::Break(BreakStmt { span })
            }
            TokenKind::Throw => {
                let start = self.advance().span;
                let value = self.parse_expression();
                let span = start.merge(self.previous_span());
                self.eat_semi();
                Stmt::Throw(ThrowStmt { value, span })
            }
            TokenKind::Return => {
                let start = self.advance().span;
                let value = if self.check(&TokenKind::Semi) || self.check(&TokenKind::RBrace) {
                    None
                } else {
                    Some(self.parse_expression())
                };
                let span = start.merge(self.previous_span());
                self.eat_semi();
                Stmt::Return(ReturnStmt { value, span })
            }
            TokenKind::Semi => {
                self.advance();
                Stmt::Empty
            }
            TokenKind::Ident(_) | TokenKind::This => self.parse_simple_stmt(),
            _ => self.unrecognized_stmt(),
        }
    }

    // ── Simple statements ─────────────────────────────────────────────────────

    /// Declaration, member store, or plain assignment — classified by
    /// lookahead, falling through to `Stmt::Unrecognized`.
    fn parse_simple_stmt(&mut self) -> Stmt {
        let start = self.current_span();

        // `<Type> <name> = <expr>;`
        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.look_ahead(1), TokenKind::Ident(_))
            && matches!(self.look_ahead(2), TokenKind::Assign)
        {
            let ty = self.ident_text();
            let name = self.ident_text();
            self.advance(); // `=`
            let value = self.parse_expression();
            let span = start.merge(self.previous_span());
            self.eat_semi();
            return Stmt::Decl(DeclStmt { ty, name, value, span });
        }

        // `<base>.<prop> = <expr>;`
        if matches!(self.peek_kind(), TokenKind::Ident(_) | TokenKind::This)
            && matches!(self.look_ahead(1), TokenKind::Dot)
            && matches!(self.look_ahead(2), TokenKind::Ident(_))
            && matches!(self.look_ahead(3), TokenKind::Assign)
        {
            let base = self.base_text();
            self.advance(); // `.`
            let prop = self.ident_text();
            self.advance(); // `=`
            let value = self.parse_expression();
            let span = start.merge(self.previous_span());
            self.eat_semi();
            return Stmt::Assign(AssignStmt {
                target: AssignTarget::Member { base, prop },
                value,
                span,
            });
        }

        // `<name> = <expr>;`
        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.look_ahead(1), TokenKind::Assign)
        {
            let name = self.ident_text();
            self.advance(); // `=`
            let value = self.parse_expression();
            let span = start.merge(self.previous_span());
            self.eat_semi();
            return Stmt::Assign(AssignStmt {
                target: AssignTarget::Local(name),
                value,
                span,
            });
        }

        self.unrecognized_stmt()
    }

    /// Consume up to the next statement boundary into an
    /// `Stmt::Unrecognized`, recording a diagnostic.
    fn unrecognized_stmt(&mut self) -> Stmt {
        let start = self.current_span();
        let raw = self.synchronize();
        let span = start.merge(self.previous_span());
        self.diag(format!("unrecognized statement skipped: '{raw}'"), span);
        Stmt::Unrecognized(UnrecognizedStmt { raw, span })
    }

    // ── If / else-if / else ───────────────────────────────────────────────────

    fn parse_if_stmt(&mut self) -> Stmt {
        match self.parse_if_chain() {
            Some(if_stmt) => Stmt::If(if_stmt),
            None => self.malformed("if"),
        }
    }

    /// `if ( cond ) { ... }` with optional `else if` chain / `else`.
    fn parse_if_chain(&mut self) -> Option<IfStmt> {
        let start = self.current_span();
        self.advance(); // `if`
        if !self.eat(&TokenKind::LParen) {
            return None;
        }
        let cond = self.parse_condition();
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if_chain()?)))
            } else {
                Some(ElseBranch::Else(self.parse_block()?))
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        self.eat_semi();
        Some(IfStmt {
            cond,
            then_block,
            else_branch,
            span,
        })
    }

    // ── eswitch ───────────────────────────────────────────────────────────────

    fn parse_eswitch_stmt(&mut self) -> Stmt {
        match self.parse_eswitch() {
            Some(stmt) => Stmt::Eswitch(stmt),
            None => self.malformed("eswitch"),
        }
    }

    /// `eswitch ( enumVar ) { case E.member: ...; default: ...; }`
    fn parse_eswitch(&mut self) -> Option<EswitchStmt> {
        let start = self.current_span();
        self.advance(); // `eswitch`
        if !self.eat(&TokenKind::LParen) {
            return None;
        }
        let scrutinee = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return None,
        };
        if !self.eat(&TokenKind::RParen) || !self.eat(&TokenKind::LBrace) {
            return None;
        }

        let mut cases = Vec::new();
        let mut default = None;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            match self.peek_kind() {
                TokenKind::Case => {
                    let case_start = self.current_span();
                    self.advance();
                    let path_base = match self.peek_kind().clone() {
                        TokenKind::Ident(name) => {
                            self.advance();
                            name
                        }
                        _ => {
                            let span = self.current_span();
                            self.diag("malformed case path; entry skipped", span);
                            self.skip_case_body();
                            continue;
                        }
                    };
                    if !self.eat(&TokenKind::Dot) {
                        let span = self.current_span();
                        self.diag("malformed case path; entry skipped", span);
                        self.skip_case_body();
                        continue;
                    }
                    let member = match self.peek_kind().clone() {
                        TokenKind::Ident(name) => {
                            self.advance();
                            name
                        }
                        _ => {
                            let span = self.current_span();
                            self.diag("malformed case path; entry skipped", span);
                            self.skip_case_body();
                            continue;
                        }
                    };
                    if !self.eat(&TokenKind::Colon) {
                        let span = self.current_span();
                        self.diag("expected ':' after case path; entry skipped", span);
                        self.skip_case_body();
                        continue;
                    }
                    let action = self.parse_case_action();
                    cases.push(EswitchCase {
                        path_base,
                        member,
                        action,
                        span: case_start.merge(self.previous_span()),
                    });
                }
                TokenKind::Default => {
                    self.advance();
                    if !self.eat(&TokenKind::Colon) {
                        let span = self.current_span();
                        self.diag("expected ':' after default; entry skipped", span);
                        self.skip_case_body();
                        continue;
                    }
                    default = Some(self.parse_case_action());
                }
                _ => {
                    let span = self.current_span();
                    let raw = self.skip_case_body();
                    self.diag(format!("unexpected eswitch entry skipped: '{raw}'"), span);
                }
            }
        }
        if !self.eat(&TokenKind::RBrace) {
            return None;
        }
        let span = start.merge(self.previous_span());
        self.eat_semi();
        Some(EswitchStmt {
            scrutinee,
            cases,
            default,
            span,
        })
    }

    /// Classify one arm body. Supported: exactly `return <literal>;`.
    /// Anything richer is an unimplemented extension and is kept as raw
    /// text for the per-entry diagnostic comment.
    fn parse_case_action(&mut self) -> CaseAction {
        // Supported shape first, so we don't disturb the token cursor
        // beyond the arm.
        if self.check(&TokenKind::Return) {
            let lit = match self.look_ahead(1) {
                TokenKind::True => Some(CaseLiteral::True),
                TokenKind::False => Some(CaseLiteral::False),
                TokenKind::Int(n) => Some(CaseLiteral::Int(*n)),
                _ => None,
            };
            if let Some(lit) = lit {
                let terminated = matches!(
                    self.look_ahead(2),
                    TokenKind::Semi | TokenKind::Case | TokenKind::Default | TokenKind::RBrace
                );
                if terminated {
                    self.advance(); // `return`
                    self.advance(); // literal
                    self.eat_semi();
                    return CaseAction::Return(lit);
                }
            }
        }
        let raw = self.skip_case_body();
        CaseAction::Unsupported(raw)
    }

    /// Skip an arm body up to the next `case` / `default` / `}`.
    fn skip_case_body(&mut self) -> String {
        let mut skipped = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            skipped.push(self.advance().kind.to_string());
        }
        skipped.join(" ")
    }

    // ── loop ──────────────────────────────────────────────────────────────────

    fn parse_loop_stmt(&mut self) -> Stmt {
        match self.parse_loop() {
            Some(stmt) => Stmt::Loop(stmt),
            None => self.malformed("loop"),
        }
    }

    /// `loop ( <init-stmt>; ) { body }` — exactly one initializer.
    fn parse_loop(&mut self) -> Option<LoopStmt> {
        let start = self.current_span();
        self.advance(); // `loop`
        if !self.eat(&TokenKind::LParen) {
            return None;
        }
        let init = self.parse_statement();
        if !self.eat(&TokenKind::RParen) {
            return None;
        }
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.eat_semi();
        Some(LoopStmt {
            init: Box::new(init),
            body,
            span,
        })
    }

    // ── try / catch ───────────────────────────────────────────────────────────

    fn parse_try_stmt(&mut self) -> Stmt {
        match self.parse_try() {
            Some(stmt) => Stmt::Try(stmt),
            None => self.malformed("try"),
        }
    }

    /// `try { body } catch ( Type var ) { body }` — one catch clause.
    fn parse_try(&mut self) -> Option<TryStmt> {
        let start = self.current_span();
        self.advance(); // `try`
        let body = self.parse_block()?;
        if !self.eat(&TokenKind::Catch) || !self.eat(&TokenKind::LParen) {
            return None;
        }
        let catch_type = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return None,
        };
        let catch_var = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return None,
        };
        if !self.eat(&TokenKind::RParen) {
            return None;
        }
        let catch_body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        self.eat_semi();
        Some(TryStmt {
            body,
            catch_type,
            catch_var,
            catch_body,
            span,
        })
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// A construct parser failed mid-structure: record a diagnostic,
    /// resynchronize, and degrade to `Stmt::Unrecognized`.
    fn malformed(&mut self, construct: &str) -> Stmt {
        let start = self.current_span();
        let skipped = self.synchronize();
        let span = start.merge(self.previous_span());
        self.diag(
            format!("malformed {construct} statement; skipped '{skipped}'"),
            span,
        );
        Stmt::Unrecognized(UnrecognizedStmt {
            raw: format!("malformed {construct}: {skipped}"),
            span,
        })
    }

    /// Consume an `Ident` token and return its text. Callers must have
    /// verified the kind by lookahead.
    pub(crate) fn ident_text(&mut self) -> String {
        match self.advance().kind {
            TokenKind::Ident(name) => name,
            other => other.to_string(),
        }
    }

    /// Consume an `Ident`-or-`this` base token and return its text.
    fn base_text(&mut self) -> String {
        match self.advance().kind {
            TokenKind::Ident(name) => name,
            TokenKind::This => "this".to_string(),
            other => other.to_string(),
        }
    }
}
