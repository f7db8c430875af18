//! AST node types for the pseudocode language.
//!
//! Every node carries a [`Span`] so runtime errors can point back at source.
//! Procedure, function and record bodies sit behind [`Rc`] because the
//! interpreter keeps them alive in its callable and type tables after the
//! statement that defined them has finished running.

use crate::Span;
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: the statements of the main block.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Block,
    pub span: Span,
}

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Types
// ══════════════════════════════════════════════════════════════════════════════

/// The built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Date,
}

impl PrimitiveType {
    /// Map an upper-case type keyword to its primitive.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "INTEGER" => Self::Integer,
            "REAL" => Self::Real,
            "BOOLEAN" => Self::Boolean,
            "CHAR" => Self::Char,
            "STRING" => Self::String,
            "DATE" => Self::Date,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Boolean => "BOOLEAN",
            Self::Char => "CHAR",
            Self::String => "STRING",
            Self::Date => "DATE",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A type as written in source: a primitive keyword or a user type name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
    Primitive(PrimitiveType, Span),
    Named(Ident),
}

impl TypeName {
    pub fn span(&self) -> Span {
        match self {
            Self::Primitive(_, span) => *span,
            Self::Named(ident) => ident.span,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p, _) => write!(f, "{p}"),
            Self::Named(ident) => f.write_str(&ident.name),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `DECLARE a, b : T`
    Declare { names: Vec<Ident>, ty: TypeName },
    /// `DECLARE a : ARRAY[1:10, 0:3] OF T`
    ArrayDeclare {
        names: Vec<Ident>,
        dims: Vec<DimBounds>,
        elem: TypeName,
    },
    /// `CONSTANT name = expr`
    Constant { name: Ident, value: Expr },
    /// `TYPE Name = ...` or a `TYPE ... ENDTYPE` record
    TypeDef(TypeDef),
    /// `target <- value`
    Assign { target: AccessPath, value: Expr },
    /// `target <- ^source`
    PointerAssign { target: AccessPath, source: AccessPath },
    /// `IF ... THEN ... {ELSE IF ...} [ELSE ...] ENDIF`
    If {
        branches: Vec<CondBranch>,
        otherwise: Option<Block>,
    },
    /// `CASE OF name ... ENDCASE`
    Case { subject: Ident, arms: Vec<CaseArm> },
    While { cond: Expr, body: Block },
    /// `REPEAT body UNTIL cond`
    Repeat { body: Block, cond: Expr },
    For {
        var: Ident,
        start: Expr,
        stop: Expr,
        step: Option<Expr>,
        body: Block,
    },
    Procedure(Rc<RoutineDecl>),
    Function(Rc<RoutineDecl>),
    /// `CALL name(args)`
    Call { name: Ident, args: Vec<Expr> },
    Return(Expr),
    Break,
    Continue,
    /// `OUTPUT a, b, ...`
    Output(Vec<Expr>),
    /// `INPUT target`
    Input(AccessPath),
    OpenFile { file: Expr, mode: FileMode },
    ReadFile { file: Expr, target: Ident },
    WriteFile { file: Expr, value: Expr },
    CloseFile(Expr),
    /// A bare expression evaluated for its value.
    Expr(Expr),
}

/// One `lower:upper` pair of an array declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DimBounds {
    pub lower: Expr,
    pub upper: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondBranch {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub pattern: CasePattern,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CasePattern {
    Value(Expr),
    Range { lower: Expr, upper: Expr },
    Otherwise,
}

/// `TYPE Name ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: Ident,
    pub body: TypeDefBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefBody {
    /// `TYPE Day = (Mon, Tue, Wed)`
    Enum(Vec<Ident>),
    /// `TYPE IntPtr = ^INTEGER`
    Pointer(TypeName),
    /// `TYPE Point` + DECLARE lines + `ENDTYPE`
    Composite(Rc<Block>),
}

/// A procedure or function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDecl {
    pub name: Ident,
    pub params: Vec<ParamDecl>,
    /// `None` for procedures.
    pub returns: Option<TypeName>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: Ident,
    pub ty: TypeName,
    pub by_ref: bool,
}

/// Access mode requested by `OPENFILE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Append => "APPEND",
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Access Paths
// ══════════════════════════════════════════════════════════════════════════════

/// A storage location as written: `a`, `p^`, `r.field`, `m[i, j]`, composed freely.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPath {
    pub kind: AccessKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessKind {
    Name(Ident),
    Deref(Box<AccessPath>),
    Member {
        base: Box<AccessPath>,
        member: Ident,
    },
    Index {
        base: Box<AccessPath>,
        indices: Vec<Expr>,
    },
}

impl AccessPath {
    pub fn name(ident: Ident) -> Self {
        let span = ident.span;
        Self {
            kind: AccessKind::Name(ident),
            span,
        }
    }

    /// The identifier when this path is a bare name.
    pub fn as_name(&self) -> Option<&Ident> {
        match &self.kind {
            AccessKind::Name(ident) => Some(ident),
            _ => None,
        }
    }

    /// The leftmost identifier of the path.
    pub fn root(&self) -> &Ident {
        match &self.kind {
            AccessKind::Name(ident) => ident,
            AccessKind::Deref(base)
            | AccessKind::Member { base, .. }
            | AccessKind::Index { base, .. } => base.root(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The access path when this expression is a plain storage reference.
    pub fn as_access(&self) -> Option<&AccessPath> {
        match &self.kind {
            ExprKind::Access(path) => Some(path),
            ExprKind::Paren(inner) => inner.as_access(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntegerLit(i64),
    RealLit(f64),
    BoolLit(bool),
    CharLit(char),
    StringLit(String),
    /// `dd/mm/yyyy`, validated at evaluation time.
    DateLit { day: u32, month: u32, year: i32 },
    Access(AccessPath),
    /// `name(args)`
    Call { name: Ident, args: Vec<Expr> },
    /// `INTEGER(expr)` and friends.
    Cast {
        target: PrimitiveType,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    IntDiv,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
    Concat,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::IntDiv
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "MOD",
            Self::IntDiv => "DIV",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "&",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Neg => "-",
            Self::Not => "NOT",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, col: u32) -> Ident {
        Ident::new(name, Span::point(1, col))
    }

    #[test]
    fn root_of_nested_path() {
        // p^.next[1]
        let p = AccessPath::name(ident("p", 1));
        let deref = AccessPath {
            kind: AccessKind::Deref(Box::new(p)),
            span: Span::new(1, 1, 1, 2),
        };
        let member = AccessPath {
            kind: AccessKind::Member {
                base: Box::new(deref),
                member: ident("next", 4),
            },
            span: Span::new(1, 1, 1, 7),
        };
        let index = AccessPath {
            kind: AccessKind::Index {
                base: Box::new(member),
                indices: vec![Expr::new(ExprKind::IntegerLit(1), Span::point(1, 9))],
            },
            span: Span::new(1, 1, 1, 10),
        };
        assert_eq!(index.root().name, "p");
        assert!(index.as_name().is_none());
    }

    #[test]
    fn paren_unwraps_to_access() {
        let path = AccessPath::name(ident("x", 2));
        let expr = Expr::new(
            ExprKind::Paren(Box::new(Expr::new(ExprKind::Access(path), Span::point(1, 2)))),
            Span::new(1, 1, 1, 3),
        );
        assert_eq!(expr.as_access().and_then(|p| p.as_name()).map(|i| i.name.as_str()), Some("x"));
    }

    #[test]
    fn primitive_keywords_round_trip() {
        for p in [
            PrimitiveType::Integer,
            PrimitiveType::Real,
            PrimitiveType::Boolean,
            PrimitiveType::Char,
            PrimitiveType::String,
            PrimitiveType::Date,
        ] {
            assert_eq!(PrimitiveType::from_keyword(p.keyword()), Some(p));
        }
        assert_eq!(PrimitiveType::from_keyword("integer"), None);
    }

    #[test]
    fn operator_classes() {
        assert!(BinOp::IntDiv.is_arithmetic());
        assert!(BinOp::LessEq.is_comparison());
        assert!(!BinOp::Concat.is_arithmetic());
        assert_eq!(BinOp::NotEq.to_string(), "<>");
    }
}
