//! Tops parser: converts a token stream into a [`tops_types::ast::FunctionDef`].
//!
//! The parser follows a two-tier failure model: a function
//! signature that cannot be parsed is the one fatal error; everything
//! inside the body degrades to `Stmt::Unrecognized` nodes and
//! parse-stage diagnostics while the statement driver keeps moving.

mod parse_expr;
mod parse_func;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_BODY_STATEMENTS};
