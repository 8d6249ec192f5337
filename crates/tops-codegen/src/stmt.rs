//! Statement lowering: AST statements to WAT instruction lines.
//!
//! Every path through this module keeps going. Anything that cannot be
//! lowered faithfully turns into a `;;` diagnostic comment (mirrored in
//! the context's structured sink) plus a placeholder value where the
//! stack shape demands one. The only fatal errors in the pipeline
//! happen earlier, in signature parsing.

use std::collections::BTreeMap;

use tops_types::ast::{
    AssignStmt, AssignTarget, Block, CaseAction, CaseLiteral, CmpOp, Cond, ElseBranch, EswitchStmt,
    Expr, IfStmt, LoopStmt, ReturnStmt, Stmt, ThrowStmt, TryStmt,
};

use crate::builder::WatBuilder;
use crate::context::FuncContext;
use crate::expr::{emit_placeholder, emit_value, resolve_member_access};
use crate::types::{wat_value_type, WatType};

// ══════════════════════════════════════════════════════════════════════════════
// Block & dispatch
// ══════════════════════════════════════════════════════════════════════════════

/// Lower a block's statements in order. `loop_exit` is the innermost
/// enclosing loop's exit label; it is shadowed (not mutated) when a
/// nested loop opens, so `break` always targets the nearest loop.
pub fn emit_block(
    block: &Block,
    ctx: &mut FuncContext<'_>,
    w: &mut WatBuilder,
    loop_exit: Option<&str>,
) {
    for stmt in &block.stmts {
        emit_stmt(stmt, ctx, w, loop_exit);
    }
    if block.capped {
        ctx.diag(w, "safety break: statement cap reached, body truncated");
    }
}

fn emit_stmt(stmt: &Stmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder, loop_exit: Option<&str>) {
    match stmt {
        Stmt::If(s) => emit_if(s, ctx, w, loop_exit),
        Stmt::Eswitch(s) => emit_eswitch(s, ctx, w),
        Stmt::Loop(s) => emit_loop(s, ctx, w, loop_exit),
        Stmt::Try(s) => emit_try(s, ctx, w, loop_exit),
        Stmt::Decl(s) => {
            let wat_type = wat_value_type(&s.ty).unwrap_or(WatType::I32);
            ctx.declare_local(&s.name, wat_type, Some(&s.ty));
            emit_value(&s.value, ctx, w, wat_type);
            w.line(format!("(local.set ${})", s.name));
        }
        Stmt::Assign(s) => emit_assign(s, ctx, w),
        Stmt::Return(s) => emit_return(s, ctx, w),
        Stmt::Break(_) => match loop_exit {
            Some(label) => w.line(format!("(br ${label})")),
            None => ctx.diag(w, "ERROR: 'break' outside of a loop"),
        },
        Stmt::Throw(s) => emit_throw(s, ctx, w),
        Stmt::Unrecognized(s) => ctx.diag(w, format!("Unrecognized statement: {}", s.raw)),
        Stmt::Empty => {}
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Simple statements
// ══════════════════════════════════════════════════════════════════════════════

fn emit_assign(s: &AssignStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) {
    match &s.target {
        AssignTarget::Local(name) => {
            let wat_type = match ctx.local(name) {
                Some(info) => info.wat_type,
                None => {
                    ctx.diag(w, format!("ERROR: assignment to unknown local '{name}'"));
                    emit_value(&s.value, ctx, w, WatType::I32);
                    w.line("(drop)");
                    return;
                }
            };
            emit_value(&s.value, ctx, w, wat_type);
            w.line(format!("(local.set ${name})"));
        }
        AssignTarget::Member { base, prop } => {
            // Address first, then the value, then the typed store.
            match resolve_member_access(base, prop, ctx, w, true) {
                Some(wat_type) => {
                    emit_value(&s.value, ctx, w, wat_type);
                    w.line(format!("({})", wat_type.store_instr()));
                }
                None => {
                    ctx.diag(w, format!("ERROR: cannot resolve store target '{base}.{prop}'"));
                }
            }
        }
    }
}

fn emit_return(s: &ReturnStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) {
    if let Some(value) = &s.value {
        let expected = ctx.return_wat_type().unwrap_or(WatType::I32);
        emit_value(value, ctx, w, expected);
        if ctx.is_void() {
            w.line("(drop) ;; Drop value for void return");
        }
    }
    w.line("(return)");
}

fn emit_throw(s: &ThrowStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) {
    if let Expr::New { class, .. } = &s.value {
        // Allocation is not implemented; throw the class's tag with a
        // placeholder payload so catch-by-class still routes correctly.
        w.line(format!("(i32.const 0) ;; placeholder allocation for new {class}"));
        w.line(format!("(throw $tops_class_{class}_error_tag)"));
    } else {
        emit_value(&s.value, ctx, w, WatType::I32);
        w.line("(throw $tops_int4_error_tag)");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// If / else-if / else
// ══════════════════════════════════════════════════════════════════════════════

fn emit_if(s: &IfStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder, loop_exit: Option<&str>) {
    emit_cond(&s.cond, ctx, w);
    w.open("(if");
    w.open("(then");
    emit_block(&s.then_block, ctx, w, loop_exit);
    w.close();
    if let Some(branch) = &s.else_branch {
        w.open("(else");
        match branch {
            // else-if chains nest as an else arm holding a fresh if.
            ElseBranch::ElseIf(inner) => emit_if(inner, ctx, w, loop_exit),
            ElseBranch::Else(block) => emit_block(block, ctx, w, loop_exit),
        }
        w.close();
    }
    w.close();
}

fn emit_cond(cond: &Cond, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) {
    match cond {
        Cond::Value(expr) => emit_value(expr, ctx, w, WatType::I32),
        Cond::Cmp { lhs, op, rhs, .. } => {
            emit_value(lhs, ctx, w, WatType::I32);
            emit_value(rhs, ctx, w, WatType::I32);
            w.line(format!("({})", cmp_instr(*op)));
        }
        Cond::Unsupported { raw, .. } => {
            ctx.diag(w, format!("ERROR: unsupported condition: {raw}"));
            emit_placeholder(w, WatType::I32);
        }
    }
}

fn cmp_instr(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Lt => "i32.lt_s",
        CmpOp::Le => "i32.le_s",
        CmpOp::Gt => "i32.gt_s",
        CmpOp::Ge => "i32.ge_s",
        CmpOp::Eq => "i32.eq",
        CmpOp::Ne => "i32.ne",
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Loop
// ══════════════════════════════════════════════════════════════════════════════

fn emit_loop(s: &LoopStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder, loop_exit: Option<&str>) {
    let (exit_label, repeat_label) = ctx.next_loop_labels();
    // The initializer is an ordinary statement and runs once, outside
    // the loop. It still sees the OUTER loop's exit label: a `break`
    // initializer would be nonsense, but it must not capture ours.
    emit_stmt(&s.init, ctx, w, loop_exit);
    w.open(format!("(block ${exit_label}"));
    w.open(format!("(loop ${repeat_label}"));
    // No condition check: the loop repeats until the body breaks out.
    emit_block(&s.body, ctx, w, Some(exit_label.as_str()));
    w.line(format!("(br ${repeat_label})"));
    w.close();
    w.close();
}

// ══════════════════════════════════════════════════════════════════════════════
// Try / catch
// ══════════════════════════════════════════════════════════════════════════════

fn emit_try(s: &TryStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder, loop_exit: Option<&str>) {
    let tag = exception_tag(&s.catch_type, ctx, w);
    // The try block's result mirrors the function's return type; the
    // body is not analyzed for whether every path actually produces it.
    match ctx.return_wat_type() {
        Some(t) => w.open(format!("(try (result {t})")),
        None => w.open("(try"),
    }
    w.open("(do");
    emit_block(&s.body, ctx, w, loop_exit);
    w.close();
    w.open(format!("(catch ${tag}"));
    ctx.declare_local(&s.catch_var, WatType::I32, Some(&s.catch_type));
    w.line(format!("(local.set ${})", s.catch_var));
    emit_block(&s.catch_body, ctx, w, loop_exit);
    w.close();
    w.close();
}

/// Tag name for a catch clause: `int4` uses the shared scalar tag,
/// registered classes get a per-class tag, anything else degrades to
/// the scalar tag with a diagnostic.
fn exception_tag(catch_type: &str, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) -> String {
    if catch_type == "int4" {
        "tops_int4_error_tag".to_string()
    } else if ctx.global.classes.contains_key(catch_type) {
        format!("tops_class_{catch_type}_error_tag")
    } else {
        ctx.diag(w, format!("ERROR: unknown exception type '{catch_type}', catching as int4"));
        "tops_int4_error_tag".to_string()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Eswitch
// ══════════════════════════════════════════════════════════════════════════════

fn emit_eswitch(s: &EswitchStmt, ctx: &mut FuncContext<'_>, w: &mut WatBuilder) {
    let var = &s.scrutinee;

    let Some(prop) = ctx.member_this.property(var).cloned() else {
        eswitch_failed(ctx, w, format!("ERROR: Enum var '{var}' not found in class properties. ESWITCH FAILED."));
        return;
    };
    let Some(enum_def) = ctx.global.enums.get(&prop.ty).cloned() else {
        eswitch_failed(
            ctx,
            w,
            format!(
                "ERROR: Enum definition for type '{}' (of var '{var}') not found. ESWITCH FAILED.",
                prop.ty
            ),
        );
        return;
    };

    // Validate and collect parsable case arms, keyed by enum value so
    // the emitted block order is deterministic.
    let mut arms: BTreeMap<i64, (String, CaseLiteral)> = BTreeMap::new();
    for case in &s.cases {
        if case.path_base != *var {
            ctx.diag(
                w,
                format!(
                    "ERROR: eswitch case path '{}.{}' does not match switched enum '{var}'. Case skipped.",
                    case.path_base, case.member
                ),
            );
            continue;
        }
        let Some(&value) = enum_def.get(&case.member) else {
            ctx.diag(
                w,
                format!(
                    "ERROR: Enum member '{}' not found in enum '{}'. Case skipped.",
                    case.member, prop.ty
                ),
            );
            continue;
        };
        if value < 0 {
            ctx.diag(
                w,
                format!("ERROR: Invalid enum value {value} for {var}.{}. Case skipped.", case.member),
            );
            continue;
        }
        match &case.action {
            CaseAction::Return(lit) => {
                arms.insert(value, (case.member.clone(), *lit));
            }
            CaseAction::Unsupported(raw) => {
                ctx.diag(
                    w,
                    format!("ERROR: eswitch case for '{var}.{}' has unparsable code: {raw}. Case skipped.", case.member),
                );
            }
        }
    }

    let default_lit = match &s.default {
        Some(CaseAction::Return(lit)) => *lit,
        other => {
            if let Some(CaseAction::Unsupported(raw)) = other {
                ctx.diag(w, format!("ERROR: eswitch default case has unparsable code: {raw}."));
            }
            eswitch_failed(
                ctx,
                w,
                format!(
                    "ERROR: eswitch for '{var}' is missing a parsable default case. ESWITCH FAILED."
                ),
            );
            return;
        }
    };

    let max_value = enum_def.values().copied().max().unwrap_or(-1);
    if max_value < 0 {
        eswitch_failed(
            ctx,
            w,
            format!("ERROR: Could not determine max enum value for '{}'. ESWITCH FAILED.", prop.ty),
        );
        return;
    }

    let label_base = format!("eswitch_{}_{var}", ctx.wat_func_name);
    let default_label = format!("{label_base}_default");
    // Dense jump table over 0..=max; gaps redirect to default.
    let table_labels: Vec<String> = (0..=max_value)
        .map(|v| {
            if arms.contains_key(&v) {
                format!("{label_base}_case_{v}")
            } else {
                default_label.clone()
            }
        })
        .collect();

    w.comment(format!("eswitch ({var})"));
    w.line("(local.get $this)");
    w.line(format!("(i32.const {})", prop.offset));
    w.line("(i32.add)");
    w.line(format!("(i32.load) ;; Load enum value for {var} (type {})", prop.ty));
    let joined: Vec<String> = table_labels.iter().map(|l| format!("${l}")).collect();
    w.line(format!("(br_table {} ${default_label}) ;; Jump table", joined.join(" ")));

    for (value, (member, lit)) in &arms {
        w.open(format!("(block ${label_base}_case_{value} ;; {var}.{member} (value {value})"));
        w.line(case_const(*lit));
        w.line("(return)");
        w.close();
    }
    w.open(format!("(block ${default_label} ;; default case for {var}"));
    w.line(case_const(default_lit));
    w.line("(return)");
    w.close();
    w.line("(unreachable) ;; After eswitch, as all paths should return");
}

fn case_const(lit: CaseLiteral) -> String {
    match lit {
        CaseLiteral::True => "(i32.const 1)".to_string(),
        CaseLiteral::False => "(i32.const 0)".to_string(),
        CaseLiteral::Int(n) => format!("(i32.const {n})"),
    }
}

/// The whole-construct fallback: diagnostic plus a zero return, so the
/// function stays well-formed even though this path is flagged broken.
fn eswitch_failed(ctx: &mut FuncContext<'_>, w: &mut WatBuilder, message: String) {
    ctx.diag(w, message);
    w.line("(i32.const 0)");
    w.line("(return)");
}
