//! Function assembly: signature line, locals, body, closing line.

use serde::Serialize;
use tops_types::ast::FunctionDef;
use tops_types::{ClassInfo, Diagnostic, GlobalInfo};

use crate::builder::WatBuilder;
use crate::context::FuncContext;
use crate::stmt::emit_block;
use crate::types::{wat_value_type, WatType};

/// The WAT text produced for one function, plus the degraded-tier
/// findings that were embedded in it as comments.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledFunction {
    /// The exported name, `<ClassName>_<funcName>`.
    pub name: String,
    /// Complete `(func ...)` definition, newline-terminated.
    pub wat: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lower one parsed function to WAT text.
///
/// Never fails: parse-level fatality was already decided upstream, and
/// every lowering problem degrades to an inline comment plus a
/// placeholder. Reads `owner`/`global` only; all mutable state lives in
/// a per-call context, so concurrent compiles against the same
/// metadata are safe.
pub fn compile(func: &FunctionDef, owner: &ClassInfo, global: &GlobalInfo) -> CompiledFunction {
    let wat_func_name = format!("{}_{}", owner.class_name, func.name);
    let mut ctx = FuncContext::new(&wat_func_name, &func.return_type, owner, global);

    let mut signature = format!("(func ${wat_func_name}");
    if func.has_this {
        signature.push_str(" (param $this i32)");
        ctx.add_param("this", WatType::I32, Some(&owner.class_name));
    }
    for param in &func.params {
        match wat_value_type(&param.ty) {
            Some(wat_type) => {
                signature.push_str(&format!(" (param ${} {wat_type})", param.name));
                ctx.add_param(&param.name, wat_type, Some(&param.ty));
            }
            None => {
                // void has no value representation, so the parameter
                // cannot occupy a slot. Dropping it silently would
                // shift the indices of everything after it unnoticed.
                ctx.diag_silent(format!(
                    "parameter '{}' has type '{}' with no WAT value type, dropped",
                    param.name, param.ty
                ));
            }
        }
    }
    if let Some(result) = ctx.return_wat_type() {
        signature.push_str(&format!(" (result {result})"));
    }

    let mut body = WatBuilder::with_indent(1);
    emit_block(&func.body, &mut ctx, &mut body, None);

    let mut out = String::new();
    out.push_str(&signature);
    out.push('\n');
    // WAT requires all locals declared before the first instruction.
    for decl in &ctx.local_decls {
        out.push_str("  ");
        out.push_str(decl);
        out.push('\n');
    }
    for line in body.into_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(") ;; end func ${wat_func_name}\n"));

    CompiledFunction {
        name: wat_func_name,
        wat: out,
        diagnostics: ctx.diagnostics,
    }
}
