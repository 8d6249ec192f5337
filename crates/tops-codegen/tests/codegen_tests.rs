//! Codegen tests for Tops → WAT lowering.
//!
//! Covers: the exact output shape for member access, void-return drop
//! rules, loop labels and nested break resolution, try/catch exception
//! tags, the eswitch branch table, degraded-path diagnostics, and
//! output determinism. Straight-line and structured-control outputs are
//! additionally run through a WAT assembler to prove syntactic
//! validity.

use tops_codegen::CompiledFunction;
use tops_lexer::Lexer;
use tops_parser::Parser;
use tops_types::{ClassInfo, GlobalInfo, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn compile(source: &str, owner: &ClassInfo, global: &GlobalInfo) -> CompiledFunction {
    let sf = SourceFile::new("test.tops", source);
    let lexed = Lexer::new(&sf).lex();
    let parsed = Parser::new(lexed.tokens, &sf)
        .parse()
        .expect("parse should succeed");
    tops_codegen::compile(&parsed.function, owner, global)
}

fn point() -> ClassInfo {
    ClassInfo::new("Point")
        .with_property("x", "int4", 0)
        .with_property("y", "int4", 4)
}

/// Wrap one function's WAT in a minimal module and assemble it.
fn assert_valid_wat(func_wat: &str) {
    let module = format!("(module\n(memory 1)\n{func_wat})\n");
    if let Err(err) = wat::parse_str(&module) {
        panic!("emitted WAT does not assemble: {err}\n---\n{module}");
    }
}

// ─────────────────────────────────────────────────────────────────────
// Function shape & member access
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_member_load_golden_output() {
    let owner = point();
    let global = GlobalInfo::default();
    let out = compile("int4 getX(this) { return this.x; }", &owner, &global);
    assert_eq!(out.name, "Point_getX");
    assert_eq!(
        out.wat,
        "(func $Point_getX (param $this i32) (result i32)\n\
         \x20 (local.get $this)\n\
         \x20 (i32.const 0)\n\
         \x20 (i32.add)\n\
         \x20 (i32.load)\n\
         \x20 (return)\n\
         ) ;; end func $Point_getX\n"
    );
    assert!(out.diagnostics.is_empty());
    assert_valid_wat(&out.wat);
}

#[test]
fn test_second_property_uses_its_offset() {
    let owner = point();
    let out = compile(
        "int4 getY(this) { return this.y; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(i32.const 4)"));
    assert!(out.wat.contains("(i32.load)"));
}

#[test]
fn test_parameters_in_signature_and_addition() {
    let owner = point();
    let out = compile(
        "int4 sum(this, int4 a, int4 b) { return a + b; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out
        .wat
        .starts_with("(func $Point_sum (param $this i32) (param $a i32) (param $b i32) (result i32)"));
    assert!(out.wat.contains("(local.get $a)\n  (local.get $b)\n  (i32.add)"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_int8_return_uses_i64() {
    let owner = point();
    let out = compile(
        "int8 big(this) { return 5; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(result i64)"));
    assert!(out.wat.contains("(i64.const 5)"));
}

#[test]
fn test_int8_addition_uses_i64_add() {
    let owner = point();
    let out = compile(
        "int8 sum(this, int8 a, int8 b) { int8 t = a + b; return t; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(local $t i64)"));
    assert!(out.wat.contains("(local.get $a)\n  (local.get $b)\n  (i64.add)"));
    assert!(!out.wat.contains("(i32.add)"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_member_access_through_class_typed_local() {
    let owner = point();
    let global = GlobalInfo::default().with_class(point());
    let out = compile(
        "int4 f(this, Point p) { return p.x; }",
        &owner,
        &global,
    );
    assert!(out.wat.contains("(local.get $p)"));
    assert!(out.wat.contains("(i32.const 0)\n  (i32.add)\n  (i32.load)"));
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_member_store_sequence() {
    let owner = point();
    let out = compile(
        "void setX(this, int4 v) { this.x = v; return; }",
        &owner,
        &GlobalInfo::default(),
    );
    // Address, then value, then the typed store.
    assert!(out.wat.contains(
        "(local.get $this)\n  (i32.const 0)\n  (i32.add)\n  (local.get $v)\n  (i32.store)"
    ));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_member_store_of_addition() {
    let owner = point();
    let out = compile(
        "void bump(this, int4 d) { this.y = this.y + d; return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(
        "(local.get $this)\n  (i32.const 4)\n  (i32.add)\n  \
         (local.get $this)\n  (i32.const 4)\n  (i32.add)\n  (i32.load)\n  \
         (local.get $d)\n  (i32.add)\n  (i32.store)"
    ));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_local_declarations_precede_instructions() {
    let owner = point();
    let out = compile(
        "void f(this) { int4 a = 1; int4 b = 2; a = a + b; return; }",
        &owner,
        &GlobalInfo::default(),
    );
    let decl_a = out.wat.find("(local $a i32)").expect("local a declared");
    let decl_b = out.wat.find("(local $b i32)").expect("local b declared");
    let first_instr = out.wat.find("(i32.const 1)").expect("init emitted");
    assert!(decl_a < first_instr);
    assert!(decl_b < first_instr);
    assert_valid_wat(&out.wat);
}

// ─────────────────────────────────────────────────────────────────────
// Return rules
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_int_return_has_no_drop() {
    let owner = point();
    let out = compile(
        "int4 f(this) { return 42; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(i32.const 42)\n  (return)"));
    assert!(!out.wat.contains("(drop)"));
}

#[test]
fn test_void_return_with_value_drops_it() {
    let owner = point();
    let out = compile(
        "void f(this) { return this.x; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out
        .wat
        .contains("(drop) ;; Drop value for void return\n  (return)"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_unknown_identifier_degrades_to_placeholder() {
    let owner = point();
    let out = compile(
        "int4 f(this) { return mystery; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; ERROR: unknown local 'mystery'"));
    assert!(out.wat.contains("(i32.const 0)\n  (return)"));
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].message.contains("mystery"));
}

#[test]
fn test_unknown_member_path_degrades() {
    let owner = point();
    let out = compile(
        "int4 f(this) { return this.z; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; ERROR: cannot resolve member access 'this.z'"));
    assert!(out.wat.contains("(i32.const 0)"));
}

// ─────────────────────────────────────────────────────────────────────
// If / else
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else_lowering() {
    let owner = point();
    let out = compile(
        "int4 f(this, int4 a) { if (a < 10) { return 1; } else { return 2; } }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(local.get $a)\n  (i32.const 10)\n  (i32.lt_s)"));
    assert!(out.wat.contains("(if\n    (then"));
    assert!(out.wat.contains("(else"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_comparison_operator_table() {
    let owner = point();
    let cases = [
        ("==", "(i32.eq)"),
        ("!=", "(i32.ne)"),
        ("<", "(i32.lt_s)"),
        ("<=", "(i32.le_s)"),
        (">", "(i32.gt_s)"),
        (">=", "(i32.ge_s)"),
    ];
    for (op, instr) in cases {
        let out = compile(
            &format!("void f(this, int4 a) {{ if (a {op} 1) {{ return; }} return; }}"),
            &owner,
            &GlobalInfo::default(),
        );
        assert!(out.wat.contains(instr), "operator {op} missing {instr}");
    }
}

#[test]
fn test_else_if_chain_nests() {
    let owner = point();
    let out = compile(
        "int4 f(this, int4 a) { if (a == 1) { return 1; } else if (a == 2) { return 2; } else { return 3; } }",
        &owner,
        &GlobalInfo::default(),
    );
    // The else arm holds a fresh if with its own then/else.
    assert!(out.wat.contains("(else\n      (local.get $a)\n      (i32.const 2)\n      (i32.eq)\n      (if"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_boolean_operator_condition_degrades() {
    let owner = point();
    let out = compile(
        "void f(this, int4 a, int4 b) { if (a < 1 && b > 2) { return; } return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; ERROR: unsupported condition"));
    // A false placeholder keeps the if well-formed.
    assert!(out.wat.contains("(i32.const 0)\n  (if"));
    assert_valid_wat(&out.wat);
}

// ─────────────────────────────────────────────────────────────────────
// Loops & break
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_loop_block_structure_and_labels() {
    let owner = point();
    let out = compile(
        "void f(this) { loop (int4 i = 0;) { if (i > 9) { break; } i = i + 1; } return; }",
        &owner,
        &GlobalInfo::default(),
    );
    // Initializer runs once, before the block/loop pair.
    let init = out.wat.find("(local.set $i)").expect("init");
    let block = out.wat.find("(block $loop_exit_0").expect("block");
    assert!(init < block);
    assert!(out.wat.contains("(loop $loop_repeat_0"));
    assert!(out.wat.contains("(br $loop_exit_0)"));
    // Unconditional repeat at the end of the body.
    assert!(out.wat.contains("(br $loop_repeat_0)"));
    assert_valid_wat(&out.wat);
}

#[test]
fn test_nested_loops_break_to_innermost_exit() {
    let owner = point();
    let out = compile(
        "void f(this) { loop (int4 i = 0;) { loop (int4 j = 0;) { if (j > 1) { break; } j = j + 1; } if (i > 1) { break; } i = i + 1; } return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(block $loop_exit_0"));
    assert!(out.wat.contains("(block $loop_exit_1"));
    // The inner loop's break appears inside the inner block and targets
    // loop_exit_1; the outer one targets loop_exit_0.
    let inner_break = out.wat.find("(br $loop_exit_1)").expect("inner break");
    let outer_break = out.wat.find("(br $loop_exit_0)").expect("outer break");
    assert!(inner_break < outer_break);
    assert_valid_wat(&out.wat);
}

#[test]
fn test_break_in_nested_loop_initializer_targets_outer_loop() {
    // The initializer runs before the inner loop's labels exist, so a
    // break there belongs to the enclosing loop.
    let owner = point();
    let out = compile(
        "void f(this) { loop (int4 i = 0;) { loop (break;) { return; } } return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(!out.wat.contains("ERROR: 'break' outside of a loop"));
    let outer_break = out.wat.find("(br $loop_exit_0)").expect("outer break");
    let inner_block = out.wat.find("(block $loop_exit_1").expect("inner block");
    assert!(outer_break < inner_block);
    assert_valid_wat(&out.wat);
}

#[test]
fn test_break_outside_loop_is_diagnosed_not_emitted() {
    let owner = point();
    let out = compile("void f(this) { break; return; }", &owner, &GlobalInfo::default());
    assert!(out.wat.contains(";; ERROR: 'break' outside of a loop"));
    assert!(!out.wat.contains("(br $"));
    assert_eq!(out.diagnostics.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Try / catch & throw
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_try_catch_int4_tag_and_binding() {
    let owner = point();
    let out = compile(
        "int4 f(this) { try { return this.x; } catch (int4 err) { return 0; } }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(try (result i32)"));
    assert!(out.wat.contains("(do"));
    assert!(out.wat.contains("(catch $tops_int4_error_tag"));
    // Caught value binds into a declared local.
    assert!(out.wat.contains("(local $err i32)"));
    assert!(out.wat.contains("(local.set $err)"));
}

#[test]
fn test_try_in_void_function_has_no_result() {
    let owner = point();
    let out = compile(
        "void f(this) { try { return; } catch (int4 err) { return; } }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(try\n"));
    assert!(!out.wat.contains("(try (result"));
}

#[test]
fn test_catch_by_known_class_uses_class_tag() {
    let owner = point();
    let global = GlobalInfo::default().with_class(ClassInfo::new("MyError"));
    let out = compile(
        "void f(this) { try { return; } catch (MyError e) { return; } }",
        &owner,
        &global,
    );
    assert!(out.wat.contains("(catch $tops_class_MyError_error_tag"));
}

#[test]
fn test_catch_by_unknown_type_degrades_to_int4_tag() {
    let owner = point();
    let out = compile(
        "void f(this) { try { return; } catch (Mystery e) { return; } }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; ERROR: unknown exception type 'Mystery'"));
    assert!(out.wat.contains("(catch $tops_int4_error_tag"));
}

#[test]
fn test_throw_value_uses_int4_tag() {
    let owner = point();
    let out = compile("void f(this) { throw 7; }", &owner, &GlobalInfo::default());
    assert!(out.wat.contains("(i32.const 7)\n  (throw $tops_int4_error_tag)"));
}

#[test]
fn test_throw_new_class_uses_class_tag() {
    let owner = point();
    let out = compile(
        "void f(this) { throw new MyError(1); }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains("(throw $tops_class_MyError_error_tag)"));
    assert!(out.wat.contains("placeholder allocation for new MyError"));
}

// ─────────────────────────────────────────────────────────────────────
// eswitch
// ─────────────────────────────────────────────────────────────────────

fn warm_owner() -> ClassInfo {
    ClassInfo::new("Pixel").with_property("colorType", "ColorTypes", 8)
}

fn warm_global() -> GlobalInfo {
    GlobalInfo::default().with_enum("ColorTypes", [("red", 0), ("green", 1), ("blue", 2)])
}

const IS_WARM: &str = "bool isWarm(this) { eswitch (colorType) { case colorType.red: return true; case colorType.green: return true; case colorType.blue: return false; default: return false; } }";

#[test]
fn test_eswitch_branch_table() {
    let out = compile(IS_WARM, &warm_owner(), &warm_global());
    // Scrutinee loads from its member offset.
    assert!(out.wat.contains(";; eswitch (colorType)"));
    assert!(out.wat.contains("(local.get $this)\n  (i32.const 8)\n  (i32.add)"));
    assert!(out
        .wat
        .contains("(i32.load) ;; Load enum value for colorType (type ColorTypes)"));
    // Dense table: one entry per enum value 0..=2, then the default.
    assert!(out.wat.contains(
        "(br_table $eswitch_Pixel_isWarm_colorType_case_0 \
         $eswitch_Pixel_isWarm_colorType_case_1 \
         $eswitch_Pixel_isWarm_colorType_case_2 \
         $eswitch_Pixel_isWarm_colorType_default) ;; Jump table"
    ));
    // Each case block returns its literal.
    assert!(out.wat.contains(
        "(block $eswitch_Pixel_isWarm_colorType_case_0 ;; colorType.red (value 0)\n    (i32.const 1)\n    (return)"
    ));
    assert!(out.wat.contains(
        "(block $eswitch_Pixel_isWarm_colorType_case_2 ;; colorType.blue (value 2)\n    (i32.const 0)\n    (return)"
    ));
    assert!(out.wat.contains(
        "(block $eswitch_Pixel_isWarm_colorType_default ;; default case for colorType\n    (i32.const 0)\n    (return)"
    ));
    assert!(out.wat.contains("(unreachable) ;; After eswitch, as all paths should return"));
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_eswitch_gap_redirects_to_default() {
    let owner = warm_owner();
    let global =
        GlobalInfo::default().with_enum("ColorTypes", [("red", 0), ("green", 1), ("blue", 2)]);
    let out = compile(
        "bool f(this) { eswitch (colorType) { case colorType.red: return true; case colorType.blue: return true; default: return false; } }",
        &owner,
        &global,
    );
    // Index 1 has no case; its table slot points at default.
    assert!(out.wat.contains(
        "(br_table $eswitch_Pixel_f_colorType_case_0 \
         $eswitch_Pixel_f_colorType_default \
         $eswitch_Pixel_f_colorType_case_2 \
         $eswitch_Pixel_f_colorType_default) ;; Jump table"
    ));
}

#[test]
fn test_eswitch_missing_default_fails_construct() {
    let out = compile(
        "bool f(this) { eswitch (colorType) { case colorType.red: return true; } }",
        &warm_owner(),
        &warm_global(),
    );
    assert!(out
        .wat
        .contains("missing a parsable default case. ESWITCH FAILED."));
    assert!(!out.wat.contains("(br_table"));
    // Lenient fallback: flagged invalid but still returns a zero.
    assert!(out.wat.contains("(i32.const 0)\n  (return)"));
    assert!(!out.diagnostics.is_empty());
}

#[test]
fn test_eswitch_unknown_scrutinee_fails_construct() {
    let out = compile(
        "bool f(this) { eswitch (shape) { case shape.round: return true; default: return false; } }",
        &warm_owner(),
        &warm_global(),
    );
    assert!(out
        .wat
        .contains("ERROR: Enum var 'shape' not found in class properties. ESWITCH FAILED."));
    assert!(!out.wat.contains("(br_table"));
}

#[test]
fn test_eswitch_unknown_member_skips_case() {
    let out = compile(
        "bool f(this) { eswitch (colorType) { case colorType.purple: return true; case colorType.red: return true; default: return false; } }",
        &warm_owner(),
        &warm_global(),
    );
    assert!(out
        .wat
        .contains("ERROR: Enum member 'purple' not found in enum 'ColorTypes'. Case skipped."));
    // The good case still makes it into the table.
    assert!(out.wat.contains("$eswitch_Pixel_f_colorType_case_0"));
}

#[test]
fn test_eswitch_mismatched_case_path_skips_case() {
    let out = compile(
        "bool f(this) { eswitch (colorType) { case other.red: return true; default: return false; } }",
        &warm_owner(),
        &warm_global(),
    );
    assert!(out.wat.contains(
        "ERROR: eswitch case path 'other.red' does not match switched enum 'colorType'. Case skipped."
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Degraded paths & determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unrecognized_statement_becomes_comment() {
    let owner = point();
    let out = compile(
        "void f(this) { + + +; return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; Unrecognized statement:"));
    assert!(out.wat.contains("(return)"));
}

#[test]
fn test_unparsed_expression_becomes_comment_with_placeholder() {
    let owner = point();
    let out = compile(
        "int4 f(this, int4 a) { return a + a + a; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(out.wat.contains(";; expression needs parsing:"));
    assert!(out.wat.contains("(i32.const 0)\n  (return)"));
}

#[test]
fn test_void_typed_parameter_dropped_with_diagnostic() {
    let owner = point();
    let out = compile(
        "void f(this, void nothing, int4 a) { return; }",
        &owner,
        &GlobalInfo::default(),
    );
    assert!(!out.wat.contains("$nothing"));
    assert!(out.wat.contains("(param $a i32)"));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.message.contains("nothing")));
}

#[test]
fn test_compilation_is_deterministic() {
    let source =
        "void f(this) { loop (int4 i = 0;) { if (i > 3) { break; } i = i + 1; } return; }";
    let owner = point();
    let global = warm_global();
    let first = compile(source, &owner, &global);
    let second = compile(source, &owner, &global);
    assert_eq!(first.wat, second.wat);
}

#[test]
fn test_eswitch_output_is_deterministic() {
    let first = compile(IS_WARM, &warm_owner(), &warm_global());
    let second = compile(IS_WARM, &warm_owner(), &warm_global());
    assert_eq!(first.wat, second.wat);
}
