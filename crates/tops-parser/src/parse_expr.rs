//! Expression and condition parsing.
//!
//! The expression grammar is deliberately tiny: literals, locals,
//! single-level member access, `new ClassName(...)`, and one level of
//! `+`. Anything else becomes `Expr::Unparsed` — lowering turns it into
//! a diagnostic comment with a typed zero placeholder, so expression
//! trouble never stops the body driver.

use crate::parser::Parser;
use tops_lexer::token::TokenKind;
use tops_types::ast::{CmpOp, Cond, Expr};

impl<'src> Parser<'src> {
    /// Parse one expression up to a statement boundary.
    pub(crate) fn parse_expression(&mut self) -> Expr {
        let lhs = match self.parse_primary() {
            Some(expr) => expr,
            None => return self.unparsed_expr(),
        };

        if self.eat(&TokenKind::Plus) {
            let lhs_span = lhs.span();
            let rhs = match self.parse_primary() {
                Some(expr) => expr,
                None => return self.unparsed_expr_from(lhs_span),
            };
            // Only one level of addition is supported; a longer chain
            // falls back to the unparsed path whole.
            if self.check(&TokenKind::Plus) {
                return self.unparsed_expr_from(lhs_span);
            }
            let span = lhs_span.merge(rhs.span());
            return Expr::Add {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }

        // A dangling non-boundary token means the expression is richer
        // than the grammar; degrade the whole thing.
        if !self.at_expr_boundary() {
            return self.unparsed_expr_from(lhs.span());
        }
        lhs
    }

    /// Parse a primary operand, or `None` without consuming a boundary
    /// token.
    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Some(Expr::Int(n, span))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::Bool(true, span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Bool(false, span))
            }
            TokenKind::This => {
                self.advance();
                self.parse_member_tail("this".to_string(), span)
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.parse_member_tail(name, span)
            }
            TokenKind::New => {
                self.advance();
                let class = match self.peek_kind().clone() {
                    TokenKind::Ident(name) => {
                        self.advance();
                        name
                    }
                    _ => return None,
                };
                if !self.eat(&TokenKind::LParen) {
                    return None;
                }
                let args_raw = self.collect_balanced_parens();
                let span = span.merge(self.previous_span());
                Some(Expr::New {
                    class,
                    args_raw,
                    span,
                })
            }
            _ => None,
        }
    }

    /// After a base identifier: optional `.prop`. Nested access
    /// (`a.b.c`) is out of scope and degrades to `Expr::Unparsed`.
    fn parse_member_tail(&mut self, base: String, start: tops_types::Span) -> Option<Expr> {
        if !self.check(&TokenKind::Dot) {
            // Bare `this` resolves like any other local (index 0).
            return Some(Expr::Ident(base, start));
        }
        self.advance(); // `.`
        let prop = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return None,
        };
        if self.check(&TokenKind::Dot) {
            // `a.b.c` — single-level only.
            return None;
        }
        let span = start.merge(self.previous_span());
        Some(Expr::Member { base, prop, span })
    }

    /// Collect the raw text inside an already-opened `(`, consuming the
    /// matching `)`.
    fn collect_balanced_parens(&mut self) -> String {
        let mut depth = 1u32;
        let mut raw = Vec::new();
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                _ => {}
            }
            raw.push(self.advance().kind.to_string());
        }
        raw.join(" ")
    }

    /// Whether the cursor sits on a token that legitimately ends an
    /// expression.
    fn at_expr_boundary(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Semi
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::Comma
                | TokenKind::Eof
        )
    }

    /// Consume to the statement boundary and wrap as `Expr::Unparsed`.
    fn unparsed_expr(&mut self) -> Expr {
        let span = self.current_span();
        self.unparsed_expr_from(span)
    }

    /// As [`Self::unparsed_expr`], but extending an already-consumed span.
    fn unparsed_expr_from(&mut self, start: tops_types::Span) -> Expr {
        let mut raw = Vec::new();
        while !self.at_expr_boundary() {
            raw.push(self.advance().kind.to_string());
        }
        let span = start.merge(self.previous_span());
        Expr::Unparsed {
            raw: raw.join(" "),
            span,
        }
    }

    // ── Conditions ────────────────────────────────────────────────────────────

    /// Parse an `if` condition after its `(`, consuming the closing `)`.
    ///
    /// Grammar: `lhs [op rhs]` with op ∈ `< <= > >= == !=` and operands
    /// restricted to locals, integer literals, `true`, `false`.
    /// `&&`/`||` are recognized tokens but intentionally unsupported.
    pub(crate) fn parse_condition(&mut self) -> Cond {
        let start = self.current_span();
        let lhs = match self.parse_cond_operand() {
            Some(expr) => expr,
            None => return self.unsupported_cond(start),
        };

        let op = match self.peek_kind() {
            TokenKind::RParen => {
                self.advance();
                return Cond::Value(lhs);
            }
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::Le => Some(CmpOp::Le),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::Ge => Some(CmpOp::Ge),
            TokenKind::EqEq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::Ne),
            _ => None,
        };
        let Some(op) = op else {
            return self.unsupported_cond(start);
        };
        self.advance(); // operator

        let rhs = match self.parse_cond_operand() {
            Some(expr) => expr,
            None => return self.unsupported_cond(start),
        };
        if !self.eat(&TokenKind::RParen) {
            // `a < b && ...` and similar — finish out the parens.
            return self.unsupported_cond(start);
        }
        let span = start.merge(self.previous_span());
        Cond::Cmp { lhs, op, rhs, span }
    }

    /// A condition operand: local, integer literal, `true`, or `false`.
    fn parse_cond_operand(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Some(Expr::Int(n, span))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::Bool(true, span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Bool(false, span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Some(Expr::Ident(name, span))
            }
            _ => None,
        }
    }

    /// Consume the rest of the condition parens and produce
    /// `Cond::Unsupported` with the raw text.
    fn unsupported_cond(&mut self, start: tops_types::Span) -> Cond {
        let mut depth = 1u32;
        let mut raw = Vec::new();
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                _ => {}
            }
            raw.push(self.advance().kind.to_string());
        }
        let span = start.merge(self.previous_span());
        Cond::Unsupported {
            raw: raw.join(" "),
            span,
        }
    }
}
