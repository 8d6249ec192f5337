use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numeric error code (E100–E199: fatal syntax errors).
///
/// Only malformed function signatures are fatal; everything else the
/// compiler encounters degrades to a [`Diagnostic`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// Function signature does not match `<Type> <name> ( params ) { body }`.
    pub const MALFORMED_SIGNATURE: Self = Self(100);
    /// A specific token was required inside the signature and missing.
    pub const UNEXPECTED_TOKEN: Self = Self(101);
    /// The function body's `{` was never closed.
    pub const UNCLOSED_BODY: Self = Self(102);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A fatal Tops compilation error.
///
/// Raised only when no function can be emitted at all — in practice,
/// when the signature cannot be parsed. Per-statement problems never
/// produce this type; they become [`Diagnostic`]s embedded in the
/// output WAT as comments.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{source_name}:{span}: {code} {message}")]
pub struct TopsError {
    /// The function/source name the caller supplied.
    pub source_name: String,
    /// Error code (e.g., E100).
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
}

impl TopsError {
    /// Create a new fatal error.
    pub fn new(
        source_name: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            code,
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }
}

/// The compiler stage a diagnostic was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lex,
    Parse,
    Lower,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex => write!(f, "lex"),
            Self::Parse => write!(f, "parse"),
            Self::Lower => write!(f, "lower"),
        }
    }
}

/// A degraded-tier finding.
///
/// Diagnostics mark places where the compiler kept going with a
/// placeholder instead of failing: unknown identifiers, unsupported
/// operators, malformed construct interiors, and so on. Lowering
/// diagnostics are additionally embedded in the emitted WAT as `;;`
/// comments; this structured form is what callers and tests inspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a diagnostic with a source location.
    pub fn new(stage: Stage, message: impl Into<String>, span: Span) -> Self {
        Self {
            stage,
            message: message.into(),
            span: Some(span),
        }
    }

    /// Create a diagnostic with no usable location (lowering-time findings).
    pub fn unspanned(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            span: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "[{}] {}: {}", self.stage, span, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}
