//! Expression lowering: member access resolution and operand emission.

use tops_types::ast::Expr;

use crate::builder::WatBuilder;
use crate::context::FuncContext;
use crate::types::{wat_value_type, WatType};

/// Resolve a single-level `base.prop` member access.
///
/// `base` must be `this` or a known local whose declared Tops type is a
/// registered class; `prop` must be a property of that class. On
/// success emits the base address (`local.get` + constant offset +
/// `i32.add`) and — unless `for_store` — the typed load, returning the
/// property's WAT type. Returns `None` without emitting anything when
/// the path does not resolve, so callers can fall back to plain
/// identifier or literal handling.
pub fn resolve_member_access(
    base: &str,
    prop: &str,
    ctx: &mut FuncContext<'_>,
    w: &mut WatBuilder,
    for_store: bool,
) -> Option<WatType> {
    let class = if base == "this" {
        ctx.member_this
    } else {
        let class_name = ctx.local(base)?.tops_type.clone()?;
        ctx.global.classes.get(&class_name)?
    };
    let info = class.property(prop)?;
    let wat_type = wat_value_type(&info.ty).unwrap_or(WatType::I32);
    let offset = info.offset;

    w.line(format!("(local.get ${base})"));
    w.line(format!("(i32.const {offset})"));
    w.line("(i32.add)");
    if !for_store {
        w.line(format!("({})", wat_type.load_instr()));
    }
    Some(wat_type)
}

/// Lower an expression to exactly one value on the stack.
///
/// Every failure path degrades to a diagnostic comment plus a typed
/// zero placeholder, so the stack shape stays predictable for the
/// enclosing statement.
pub fn emit_value(expr: &Expr, ctx: &mut FuncContext<'_>, w: &mut WatBuilder, expected: WatType) {
    match expr {
        Expr::Int(n, _) => w.line(format!("({expected}.const {n})")),
        Expr::Bool(b, _) => w.line(format!("(i32.const {})", i32::from(*b))),
        Expr::Ident(name, _) => {
            if ctx.has_local(name) {
                w.line(format!("(local.get ${name})"));
            } else {
                ctx.diag(w, format!("ERROR: unknown local '{name}'"));
                emit_placeholder(w, expected);
            }
        }
        Expr::Member { base, prop, .. } => {
            if resolve_member_access(base, prop, ctx, w, false).is_none() {
                ctx.diag(w, format!("ERROR: cannot resolve member access '{base}.{prop}'"));
                emit_placeholder(w, expected);
            }
        }
        Expr::Add { lhs, rhs, .. } => {
            emit_value(lhs, ctx, w, expected);
            emit_value(rhs, ctx, w, expected);
            w.line(format!("({expected}.add)"));
        }
        Expr::New { class, .. } => {
            ctx.diag(
                w,
                format!("ERROR: 'new {class}(...)' is only supported after 'throw'"),
            );
            emit_placeholder(w, expected);
        }
        Expr::Unparsed { raw, .. } => {
            ctx.diag(w, format!("expression needs parsing: {raw}"));
            emit_placeholder(w, expected);
        }
    }
}

/// The best-effort zero value substituted where lowering could not
/// produce the real one.
pub fn emit_placeholder(w: &mut WatBuilder, expected: WatType) {
    w.line(format!("({expected}.const 0)"));
}
