//! Per-function lowering context (the compilation's FuncDetails).
//!
//! Created fresh for each function compile and discarded once the WAT
//! string is assembled — no state survives across functions except the
//! caller-owned, read-only [`ClassInfo`]/[`GlobalInfo`].

use std::collections::HashMap;

use tops_types::{ClassInfo, Diagnostic, GlobalInfo, Stage};

use crate::builder::WatBuilder;
use crate::types::{wat_value_type, WatType};

/// One entry in the locals table.
#[derive(Debug, Clone)]
pub struct LocalInfo {
    pub wat_type: WatType,
    /// The declared Tops type, when known. Used to resolve member
    /// access through class-typed locals.
    pub tops_type: Option<String>,
    pub is_param: bool,
    /// Parameter index (left-to-right, `this` always 0). `None` for
    /// body-declared locals, which WAT indexes implicitly.
    pub index: Option<u32>,
}

/// Mutable compilation context threaded through every lowering call for
/// one function.
///
/// The innermost loop's exit label is deliberately NOT stored here: it
/// is passed down the lowering recursion as `Option<&str>`, so entering
/// a nested loop shadows rather than overwrites it and `break` always
/// targets the innermost enclosing loop.
pub struct FuncContext<'a> {
    /// `<ClassName>_<funcName>`.
    pub wat_func_name: String,
    /// Declared Tops return type, taken at face value.
    pub tops_return_type: String,
    /// The owning class's layout.
    pub member_this: &'a ClassInfo,
    /// Enum and class registry for this compilation.
    pub global: &'a GlobalInfo,
    /// WAT local declarations, appended to (never removed) in first-use
    /// order; exactly one entry per distinct local name.
    pub local_decls: Vec<String>,
    /// Structured degraded-tier findings, mirroring the `;;` comments
    /// embedded in the output.
    pub diagnostics: Vec<Diagnostic>,
    locals: HashMap<String, LocalInfo>,
    next_param_index: u32,
    next_loop_label: u32,
}

impl<'a> FuncContext<'a> {
    /// Create a fresh context for one function compile.
    pub fn new(
        wat_func_name: impl Into<String>,
        tops_return_type: impl Into<String>,
        member_this: &'a ClassInfo,
        global: &'a GlobalInfo,
    ) -> Self {
        Self {
            wat_func_name: wat_func_name.into(),
            tops_return_type: tops_return_type.into(),
            member_this,
            global,
            local_decls: Vec::new(),
            diagnostics: Vec::new(),
            locals: HashMap::new(),
            next_param_index: 0,
            next_loop_label: 0,
        }
    }

    /// The function's WAT result type (`None` for void).
    pub fn return_wat_type(&self) -> Option<WatType> {
        wat_value_type(&self.tops_return_type)
    }

    /// Whether the function is declared `void`.
    pub fn is_void(&self) -> bool {
        self.tops_return_type == "void"
    }

    /// Register a parameter. Indices are assigned left-to-right in call
    /// order; `this` must be registered first when present.
    pub fn add_param(&mut self, name: &str, wat_type: WatType, tops_type: Option<&str>) {
        let index = self.next_param_index;
        self.next_param_index += 1;
        self.locals.insert(
            name.to_string(),
            LocalInfo {
                wat_type,
                tops_type: tops_type.map(str::to_string),
                is_param: true,
                index: Some(index),
            },
        );
    }

    /// Register a body-declared local, idempotently: re-declaring an
    /// existing name adds no second WAT declaration.
    pub fn declare_local(&mut self, name: &str, wat_type: WatType, tops_type: Option<&str>) {
        if self.locals.contains_key(name) {
            return;
        }
        self.local_decls
            .push(format!("(local ${name} {wat_type})"));
        self.locals.insert(
            name.to_string(),
            LocalInfo {
                wat_type,
                tops_type: tops_type.map(str::to_string),
                is_param: false,
                index: None,
            },
        );
    }

    /// Look up a local or parameter.
    pub fn local(&self, name: &str) -> Option<&LocalInfo> {
        self.locals.get(name)
    }

    /// Whether `name` is a known local or parameter.
    pub fn has_local(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    /// Allocate the next loop's label pair. The counter is per-function
    /// and deterministic, so identical input compiles to identical WAT.
    pub fn next_loop_labels(&mut self) -> (String, String) {
        let n = self.next_loop_label;
        self.next_loop_label += 1;
        (format!("loop_exit_{n}"), format!("loop_repeat_{n}"))
    }

    /// Record a degraded-tier finding and embed it as a comment.
    pub fn diag(&mut self, w: &mut WatBuilder, message: impl Into<String>) {
        let message = message.into();
        w.comment(&message);
        self.diagnostics
            .push(Diagnostic::unspanned(Stage::Lower, message));
    }

    /// Record a finding in the structured sink only (no comment slot
    /// available, e.g. signature-level parameter problems).
    pub fn diag_silent(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::unspanned(Stage::Lower, message));
    }
}
