//! Tops WAT code generator: lowers a parsed [`tops_types::ast::FunctionDef`]
//! to a WebAssembly Text Format function definition.
//!
//! # Architecture
//!
//! Lowering is a single pass over the AST, writing through a structured
//! line builder ([`builder::WatBuilder`]) into this output shape:
//!
//! ```text
//! (func $<Class>_<name> (param $this i32) (param $<p> <t>)* (result <t>)?
//!   <local declarations>
//!   <instructions>
//! ) ;; end func $<Class>_<name>
//! ```
//!
//! Lowering is infallible by design: every recognized-but-unresolvable
//! situation (unknown identifier, unsupported operator, malformed
//! construct interior, missing eswitch default, `break` outside a loop)
//! degrades to an inline `;;` comment plus a best-effort placeholder, and
//! is also recorded in a structured diagnostics sink on the returned
//! [`CompiledFunction`]. The only fatal error in the pipeline — a
//! malformed signature — is raised by the parser before codegen runs.

pub mod builder;
pub mod compiler;
pub mod context;
pub mod expr;
pub mod stmt;
pub mod types;

pub use compiler::{compile, CompiledFunction};
pub use types::{wat_value_type, WatType};
