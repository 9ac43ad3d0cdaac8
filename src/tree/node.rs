//! Syntax node types

use super::decl::{DeclId, Ty};
use crate::syntax::Span;
use smallvec::{smallvec, SmallVec};

/// Index of a node in a [`SyntaxTree`](super::SyntaxTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Children of a node, in execution order
pub type Children = SmallVec<[NodeId; 4]>;

/// Binary operators the analysis distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Short-circuit `&&`
    And,
    /// Short-circuit `||`
    Or,
    Eq,
    NotEq,
    /// Arithmetic, relational, null-coalescing, ...
    Other,
}

/// Prefix operators the analysis distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Not,
    Other,
}

/// A node of the resolved syntax tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    /// Static type, when the resolver could determine one
    pub ty: Option<Ty>,
}

/// Syntax node kinds - one closed set for expressions, statements and
/// routine boundaries.
#[derive(Debug, Clone)]
pub enum NodeKind {
    // === Leaves ===
    BoolLiteral(bool),
    /// Any other literal (number, string, null)
    Literal,
    /// Opaque pattern in a case clause
    Pattern,

    // === Names ===
    /// Simple name lookup
    Identifier { name: String, decl: Option<DeclId> },
    /// `target.name`, both prefixed identifiers and property accesses
    PropertyAccess {
        target: NodeId,
        name: String,
        decl: Option<DeclId>,
    },

    // === Wrappers ===
    Paren(NodeId),
    /// `expr!`
    NullAssert(NodeId),
    /// `name: value` argument
    Named { name: String, value: NodeId },
    /// `is` / `as` type test or cast
    Cast(NodeId),
    /// `expr++`, `expr--`
    Postfix(NodeId),
    /// `...expr` in a collection literal
    Spread(NodeId),

    // === Operators ===
    Prefix { op: PrefixOp, operand: NodeId },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Assign { target: NodeId, value: NodeId },
    Index { target: NodeId, index: NodeId },

    // === Suspension ===
    /// Suspension point
    Await(NodeId),

    // === Invocations ===
    /// `target.name(args)` or a plain `name(args)` call
    MethodCall {
        target: Option<NodeId>,
        name: String,
        decl: Option<DeclId>,
        args: Vec<NodeId>,
    },
    /// Instance creation; `decl` is the constructor
    New {
        decl: Option<DeclId>,
        args: Vec<NodeId>,
    },
    /// Invocation of a function-valued expression
    Invoke { callee: NodeId, args: Vec<NodeId> },

    // === Compound expressions ===
    /// Any other expression whose children evaluate left to right:
    /// collection literals, map entries, string interpolation, cascades
    Compound(Vec<NodeId>),
    Throw(NodeId),
    Rethrow,
    SwitchExpr { scrutinee: NodeId, cases: Vec<NodeId> },
    SwitchExprCase {
        pattern: NodeId,
        guard: Option<NodeId>,
        value: NodeId,
    },
    /// `case pattern when guard` attached to an `if`
    CaseClause { pattern: NodeId, guard: Option<NodeId> },

    // === Statements ===
    Block(Vec<NodeId>),
    ExprStmt(NodeId),
    VarDecl {
        decl: Option<DeclId>,
        init: Option<NodeId>,
    },
    /// If statement, also used for `if` elements in collection literals
    If {
        cond: NodeId,
        case: Option<NodeId>,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While { cond: NodeId, body: NodeId },
    Do { body: NodeId, cond: NodeId },
    /// C-style loop, also used for `for` elements in collection literals
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        updaters: Vec<NodeId>,
        body: NodeId,
    },
    ForIn { iterable: NodeId, body: NodeId },
    Switch { scrutinee: NodeId, members: Vec<NodeId> },
    /// `case` or `default` member; a default member has no pattern
    SwitchMember {
        pattern: Option<NodeId>,
        guard: Option<NodeId>,
        body: Vec<NodeId>,
    },
    Try {
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch { body: NodeId },
    Return(Option<NodeId>),
    Break,
    Continue,
    Labeled(NodeId),

    // === Routines ===
    /// Anonymous function literal
    Lambda { body: NodeId },
    FunctionDecl { decl: Option<DeclId>, body: NodeId },
    /// Routine boundary: the body of a function, method or lambda
    FunctionBody { body: NodeId },
    /// Compilation unit
    Unit(Vec<NodeId>),
}

impl NodeKind {
    /// Children in execution order of a single pass (a `for` loop yields
    /// its updaters after the body)
    pub fn children(&self) -> Children {
        match self {
            NodeKind::BoolLiteral(_)
            | NodeKind::Literal
            | NodeKind::Pattern
            | NodeKind::Identifier { .. }
            | NodeKind::Rethrow
            | NodeKind::Break
            | NodeKind::Continue => SmallVec::new(),

            NodeKind::PropertyAccess { target, .. } => smallvec![*target],

            NodeKind::Paren(inner)
            | NodeKind::NullAssert(inner)
            | NodeKind::Cast(inner)
            | NodeKind::Postfix(inner)
            | NodeKind::Spread(inner)
            | NodeKind::Await(inner)
            | NodeKind::Throw(inner)
            | NodeKind::ExprStmt(inner)
            | NodeKind::Labeled(inner) => smallvec![*inner],

            NodeKind::Named { value, .. } => smallvec![*value],
            NodeKind::Prefix { operand, .. } => smallvec![*operand],
            NodeKind::Binary { left, right, .. } => smallvec![*left, *right],
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => smallvec![*cond, *then_expr, *else_expr],
            NodeKind::Assign { target, value } => smallvec![*target, *value],
            NodeKind::Index { target, index } => smallvec![*target, *index],

            NodeKind::MethodCall { target, args, .. } => {
                target.iter().chain(args.iter()).copied().collect()
            }
            NodeKind::New { args, .. } => args.iter().copied().collect(),
            NodeKind::Invoke { callee, args } => {
                std::iter::once(*callee).chain(args.iter().copied()).collect()
            }

            NodeKind::Compound(items) | NodeKind::Block(items) | NodeKind::Unit(items) => {
                items.iter().copied().collect()
            }
            NodeKind::SwitchExpr { scrutinee, cases } => {
                std::iter::once(*scrutinee).chain(cases.iter().copied()).collect()
            }
            NodeKind::SwitchExprCase {
                pattern,
                guard,
                value,
            } => std::iter::once(*pattern)
                .chain(*guard)
                .chain(std::iter::once(*value))
                .collect(),
            NodeKind::CaseClause { pattern, guard } => {
                std::iter::once(*pattern).chain(*guard).collect()
            }

            NodeKind::VarDecl { init, .. } => init.iter().copied().collect(),
            NodeKind::Return(value) => value.iter().copied().collect(),
            NodeKind::If {
                cond,
                case,
                then_branch,
                else_branch,
            } => std::iter::once(*cond)
                .chain(*case)
                .chain(std::iter::once(*then_branch))
                .chain(*else_branch)
                .collect(),
            NodeKind::While { cond, body } => smallvec![*cond, *body],
            NodeKind::Do { body, cond } => smallvec![*body, *cond],
            NodeKind::For {
                init,
                cond,
                updaters,
                body,
            } => init
                .iter()
                .copied()
                .chain(*cond)
                .chain(std::iter::once(*body))
                .chain(updaters.iter().copied())
                .collect(),
            NodeKind::ForIn { iterable, body } => smallvec![*iterable, *body],
            NodeKind::Switch { scrutinee, members } => {
                std::iter::once(*scrutinee).chain(members.iter().copied()).collect()
            }
            NodeKind::SwitchMember {
                pattern,
                guard,
                body,
            } => pattern
                .iter()
                .copied()
                .chain(*guard)
                .chain(body.iter().copied())
                .collect(),
            NodeKind::Try {
                body,
                catches,
                finally,
            } => std::iter::once(*body)
                .chain(catches.iter().copied())
                .chain(*finally)
                .collect(),
            NodeKind::Catch { body } => smallvec![*body],

            NodeKind::Lambda { body }
            | NodeKind::FunctionDecl { body, .. }
            | NodeKind::FunctionBody { body } => smallvec![*body],
        }
    }

    /// Loops whose body may run again after the reference
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. }
                | NodeKind::Do { .. }
                | NodeKind::For { .. }
                | NodeKind::ForIn { .. }
        )
    }

    /// Routine boundary the walk never crosses
    pub fn is_routine_boundary(&self) -> bool {
        matches!(self, NodeKind::FunctionBody { .. })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::BoolLiteral(_) => "bool-literal",
            NodeKind::Literal => "literal",
            NodeKind::Pattern => "pattern",
            NodeKind::Identifier { .. } => "identifier",
            NodeKind::PropertyAccess { .. } => "property-access",
            NodeKind::Paren(_) => "paren",
            NodeKind::NullAssert(_) => "null-assert",
            NodeKind::Named { .. } => "named",
            NodeKind::Cast(_) => "cast",
            NodeKind::Postfix(_) => "postfix",
            NodeKind::Spread(_) => "spread",
            NodeKind::Prefix { .. } => "prefix",
            NodeKind::Binary { .. } => "binary",
            NodeKind::Conditional { .. } => "conditional",
            NodeKind::Assign { .. } => "assign",
            NodeKind::Index { .. } => "index",
            NodeKind::Await(_) => "await",
            NodeKind::MethodCall { .. } => "method-call",
            NodeKind::New { .. } => "new",
            NodeKind::Invoke { .. } => "invoke",
            NodeKind::Compound(_) => "compound",
            NodeKind::Throw(_) => "throw",
            NodeKind::Rethrow => "rethrow",
            NodeKind::SwitchExpr { .. } => "switch-expr",
            NodeKind::SwitchExprCase { .. } => "switch-expr-case",
            NodeKind::CaseClause { .. } => "case-clause",
            NodeKind::Block(_) => "block",
            NodeKind::ExprStmt(_) => "expr-stmt",
            NodeKind::VarDecl { .. } => "var-decl",
            NodeKind::If { .. } => "if",
            NodeKind::While { .. } => "while",
            NodeKind::Do { .. } => "do",
            NodeKind::For { .. } => "for",
            NodeKind::ForIn { .. } => "for-in",
            NodeKind::Switch { .. } => "switch",
            NodeKind::SwitchMember { .. } => "switch-member",
            NodeKind::Try { .. } => "try",
            NodeKind::Catch { .. } => "catch",
            NodeKind::Return(_) => "return",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::Labeled(_) => "labeled",
            NodeKind::Lambda { .. } => "lambda",
            NodeKind::FunctionDecl { .. } => "function-decl",
            NodeKind::FunctionBody { .. } => "function-body",
            NodeKind::Unit(_) => "unit",
        }
    }
}
