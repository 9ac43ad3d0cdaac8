//! Branch termination
//!
//! A statement terminates control when execution can never fall through to
//! the statement after it. Defined recursively:
//! - `return`, `break`, `continue`, `throw` and `rethrow` terminate
//! - an expression statement terminates when its expression throws
//! - a block terminates when its last statement does
//! - an `if` terminates when both branches do (a missing `else` falls through)
//! - a labeled statement terminates when the labeled statement does
//! - a `try` terminates when its `finally` does, or when the body and every
//!   `catch` do

use super::{NodeId, NodeKind, SyntaxTree};

/// Whether `node` unconditionally exits the enclosing sequence
pub fn terminates(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.kind(node) {
        NodeKind::Return(_)
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Throw(_)
        | NodeKind::Rethrow => true,

        NodeKind::ExprStmt(expr) | NodeKind::Paren(expr) => {
            matches!(
                tree.kind(*expr),
                NodeKind::Throw(_) | NodeKind::Rethrow | NodeKind::Paren(_)
            ) && terminates(tree, *expr)
        }

        NodeKind::Block(stmts) => stmts.last().is_some_and(|last| terminates(tree, *last)),

        NodeKind::Labeled(stmt) => terminates(tree, *stmt),

        NodeKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => terminates(tree, *then_branch) && terminates(tree, *else_branch),
        NodeKind::If {
            else_branch: None, ..
        } => false,

        NodeKind::Try {
            body,
            catches,
            finally,
        } => {
            finally.is_some_and(|f| terminates(tree, f))
                || (terminates(tree, *body) && catches.iter().all(|c| terminates(tree, *c)))
        }
        NodeKind::Catch { body } => terminates(tree, *body),

        _ => false,
    }
}
