//! Tops compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Tops Source → Lexer → Parser → AST → WAT Codegen → WAT text
//! ```
//!
//! Two entry points:
//! - [`compile_function`] — one function definition string to one WAT
//!   function, failing only on a malformed signature.
//! - [`compile_class`] — every member function registered on a
//!   [`ClassInfo`], where a fatal error fails only that function, never
//!   the batch.
//!
//! Degraded-tier findings from all three stages are merged, in stage
//! order, into the result's `diagnostics` so callers can inspect them
//! structurally instead of scraping `;;` comments out of the WAT text.

use serde::Serialize;
use tops_codegen::CompiledFunction;
use tops_lexer::Lexer;
use tops_parser::Parser;
use tops_types::{ClassInfo, Diagnostic, GlobalInfo, SourceFile, TopsError};

/// The outcome of compiling one function: its WAT text plus every
/// diagnostic collected across lexing, parsing, and lowering.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCompilation {
    /// The emitted WAT function name, `<ClassName>_<funcName>`.
    pub name: String,
    /// Complete `(func ...)` definition, newline-terminated.
    pub wat: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile one Tops function definition against its owning class.
///
/// `source_name` labels the input in fatal error messages (a file name
/// or a `Class.method` path). The one fatal outcome is a signature the
/// parser cannot recognize; everything else degrades into diagnostics
/// and the function still compiles.
pub fn compile_function(
    source: &str,
    source_name: &str,
    owner: &ClassInfo,
    global: &GlobalInfo,
) -> tops_types::Result<FunctionCompilation> {
    let source_file = SourceFile::new(source_name, source);

    let lexed = Lexer::new(&source_file).lex();
    let parsed = Parser::new(lexed.tokens, &source_file).parse()?;
    let compiled: CompiledFunction = tops_codegen::compile(&parsed.function, owner, global);

    let mut diagnostics = lexed.diagnostics;
    diagnostics.extend(parsed.diagnostics);
    diagnostics.extend(compiled.diagnostics);

    Ok(FunctionCompilation {
        name: compiled.name,
        wat: compiled.wat,
        diagnostics,
    })
}

/// The outcome of compiling a whole class: per-function results in
/// member-name order, with fatal failures isolated per function.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ClassCompilation {
    pub class_name: String,
    /// Successfully compiled functions, ordered by member name.
    pub functions: Vec<FunctionCompilation>,
    /// Functions whose signature could not be parsed: `(member name,
    /// error)` pairs, ordered by member name.
    pub failures: Vec<(String, TopsError)>,
}

impl ClassCompilation {
    /// Concatenate every compiled function's WAT text, in member-name
    /// order, separated by blank lines.
    pub fn wat(&self) -> String {
        self.functions
            .iter()
            .map(|f| f.wat.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compile every member function registered on `owner`.
///
/// Functions are compiled in sorted member-name order so output is
/// deterministic regardless of map iteration order. A fatal error in
/// one function lands in `failures` and the rest of the batch still
/// compiles.
pub fn compile_class(owner: &ClassInfo, global: &GlobalInfo) -> ClassCompilation {
    let mut members: Vec<(&String, &String)> = owner.member_functions.iter().collect();
    members.sort_by_key(|(name, _)| name.as_str());

    let mut result = ClassCompilation {
        class_name: owner.class_name.clone(),
        ..ClassCompilation::default()
    };
    for (member_name, source) in members {
        let source_name = format!("{}.{member_name}", owner.class_name);
        match compile_function(source, &source_name, owner, global) {
            Ok(compiled) => result.functions.push(compiled),
            Err(err) => result.failures.push((member_name.clone(), err)),
        }
    }
    result
}
