//! Recognizing capability-typed expressions

use crate::config::TypeName;
use crate::tree::{NodeId, SyntaxTree, Ty};

/// Decides whether an expression's static type is the protected capability
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    capability: &'a TypeName,
}

impl<'a> Classifier<'a> {
    pub fn new(capability: &'a TypeName) -> Self {
        Classifier { capability }
    }

    /// Whether `node` is typed as the capability. Nullable types are rejected
    /// when `skip_nullable` is set; untyped nodes never qualify.
    pub fn is_capability(&self, tree: &SyntaxTree, node: NodeId, skip_nullable: bool) -> bool {
        tree.ty(node)
            .is_some_and(|ty| self.is_capability_type(tree, ty, skip_nullable))
    }

    pub fn is_capability_type(&self, tree: &SyntaxTree, ty: &Ty, skip_nullable: bool) -> bool {
        if skip_nullable && ty.is_nullable() {
            return false;
        }
        ty.class()
            .is_some_and(|class| self.capability.matches(tree.decl(class)))
    }
}
