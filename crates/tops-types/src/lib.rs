//! Shared types for the Tops compiler.
//!
//! This crate defines the AST node types, source spans, the two-tier
//! error/diagnostic model, and the caller-supplied class-layout metadata
//! used across all compiler stages.

mod error;
mod span;
pub mod ast;
pub mod meta;

pub use error::{Diagnostic, ErrorCode, Stage, TopsError};
pub use meta::{ClassInfo, GlobalInfo, PropertyInfo};
pub use span::{SourceFile, Span};

/// Result type used throughout the Tops compiler.
pub type Result<T> = std::result::Result<T, TopsError>;
