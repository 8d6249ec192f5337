//! AST node types for the Tops language.
//!
//! Every node carries a [`Span`] for diagnostics. Recursive types are
//! boxed to keep enum sizes reasonable. The grammar is deliberately
//! small: Tops statements are `;`-terminated, control structures use
//! balanced `{ }`, and expressions are restricted to literals, locals,
//! single-level member access, and one level of `+`.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Function definition
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Tops function definition:
/// `<ReturnType> <name> ( [this][, <Type> <name>]* ) { statements }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Declared Tops return type (`void`, `int4`, ...), taken at face value.
    pub return_type: String,
    /// The bare function name; codegen prefixes the owning class name.
    pub name: String,
    /// Whether the signature declared a leading implicit `this` parameter.
    pub has_this: bool,
    /// Explicit parameters, in left-to-right signature order.
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// A parameter: `<type> <name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: String,
    pub name: String,
    pub span: Span,
}

/// A statement block: `{ stmts... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    /// Set when the parser's statement cap stopped the block early;
    /// codegen emits a safety-break comment for it.
    pub capped: bool,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A Tops statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    If(IfStmt),
    Eswitch(EswitchStmt),
    Loop(LoopStmt),
    Try(TryStmt),
    Decl(DeclStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Throw(ThrowStmt),
    /// A statement the parser could not classify. Carries the raw token
    /// text; lowering emits it as a diagnostic comment and moves on.
    Unrecognized(UnrecognizedStmt),
    /// A bare `;` — consumed, produces nothing.
    Empty,
}

/// `if ( cond ) { ... } [else if ... | else { ... }]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Cond,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

/// The else arm of an [`IfStmt`].
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// `else if (...) { ... }` — chains by re-entering the if parser.
    ElseIf(Box<IfStmt>),
    /// Trailing `else { ... }`.
    Else(Block),
}

/// `eswitch ( enumVar ) { case E.member: ...; default: ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct EswitchStmt {
    /// The switched-on variable; must name a property of the enclosing
    /// class whose declared type is a known enum.
    pub scrutinee: String,
    pub cases: Vec<EswitchCase>,
    /// The `default:` arm. Required; lowering degrades when absent.
    pub default: Option<CaseAction>,
    pub span: Span,
}

/// One `case E.member:` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct EswitchCase {
    /// The enum path's left segment (`E` in `case E.member:`); must
    /// match the scrutinee.
    pub path_base: String,
    /// The enum member name.
    pub member: String,
    pub action: CaseAction,
    pub span: Span,
}

/// What an eswitch arm does. Arm bodies are currently restricted to a
/// single `return <literal>;` — anything richer is an unimplemented
/// extension and degrades to a per-entry diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseAction {
    Return(CaseLiteral),
    Unsupported(String),
}

/// The literal returned by a supported eswitch arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaseLiteral {
    True,
    False,
    Int(i64),
}

/// `loop ( <init-stmt>; ) { body }`
///
/// Contract: the emitted loop has NO automatic condition check. It
/// repeats unconditionally; termination is entirely the body's
/// responsibility via `if` + `break`. The initializer runs once,
/// before the loop is entered.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopStmt {
    pub init: Box<Stmt>,
    pub body: Block,
    pub span: Span,
}

/// `try { body } catch ( ExceptionType exceptionVar ) { body }`
///
/// Exactly one catch clause is supported.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub catch_type: String,
    pub catch_var: String,
    pub catch_body: Block,
    pub span: Span,
}

/// `<Type> <name> = <expr>;` — declaration with initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub ty: String,
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `<target> = <expr>;`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Plain local: `x = ...`
    Local(String),
    /// Single-level member store: `this.x = ...` / `p.x = ...`
    Member { base: String, prop: String },
}

/// `return [expr];`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Bare `break;`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

/// `throw <expr>;`
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: Span,
}

/// A statement run the parser could not classify.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedStmt {
    pub raw: String,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions & conditions
// ══════════════════════════════════════════════════════════════════════════════

/// A Tops expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Unsigned integer literal.
    Int(i64, Span),
    /// `true` / `false`.
    Bool(bool, Span),
    /// A bare identifier, resolved against locals at lowering time.
    Ident(String, Span),
    /// Single-level member access: `this.x` / `p.x`.
    Member {
        base: String,
        prop: String,
        span: Span,
    },
    /// One level of addition: `a + b`.
    Add {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    /// `new ClassName(args)`. Only meaningful after `throw`; the
    /// argument text is kept verbatim for diagnostics.
    New {
        class: String,
        args_raw: String,
        span: Span,
    },
    /// An expression outside the supported grammar. Lowering emits a
    /// diagnostic comment plus a typed zero placeholder.
    Unparsed { raw: String, span: Span },
}

impl Expr {
    /// Source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Int(_, span) | Self::Bool(_, span) | Self::Ident(_, span) => *span,
            Self::Member { span, .. }
            | Self::Add { span, .. }
            | Self::New { span, .. }
            | Self::Unparsed { span, .. } => *span,
        }
    }
}

/// An `if` condition: `lhs [op rhs]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// Bare truthy operand (nonzero i32).
    Value(Expr),
    /// Comparison of two operands.
    Cmp {
        lhs: Expr,
        op: CmpOp,
        rhs: Expr,
        span: Span,
    },
    /// A condition using `&&`/`||` — recognized but intentionally
    /// unsupported; lowers to a diagnostic plus a false placeholder.
    Unsupported { raw: String, span: Span },
}

/// Comparison operators allowed in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}
