//! Binding a capability reference to the liveness accessor that guards it

use crate::config::TypeName;
use crate::tree::{DeclId, DeclKind, SyntaxTree};

/// Finds the boolean getter a reference must be checked against.
///
/// A capability read through a getter of the host type (or a subclass) is
/// guarded by the host's own liveness getter. Everything else is guarded by
/// the liveness getter declared on the capability type.
#[derive(Debug, Clone, Copy)]
pub struct AccessorResolver<'a> {
    capability: &'a TypeName,
    host: &'a TypeName,
    liveness: &'a str,
}

impl<'a> AccessorResolver<'a> {
    pub fn new(capability: &'a TypeName, host: &'a TypeName, liveness: &'a str) -> Self {
        AccessorResolver {
            capability,
            host,
            liveness,
        }
    }

    /// Accessor for a reference resolving to `binding`, or `None` when no
    /// liveness getter can be found
    pub fn resolve(&self, tree: &SyntaxTree, binding: Option<DeclId>) -> Option<DeclId> {
        binding
            .and_then(|decl| self.host_accessor(tree, decl))
            .or_else(|| self.capability_accessor(tree))
    }

    fn host_accessor(&self, tree: &SyntaxTree, binding: DeclId) -> Option<DeclId> {
        let decl = tree.decl(binding);
        if decl.kind != DeclKind::Getter {
            return None;
        }
        let owner = decl.owner?;
        if !tree.is_subclass_of(owner, |class| self.host.matches(class)) {
            return None;
        }
        tree.find_member(owner, self.liveness)
    }

    fn capability_accessor(&self, tree: &SyntaxTree) -> Option<DeclId> {
        let class = tree.find_class(&self.capability.scope, &self.capability.name)?;
        tree.find_member(class, self.liveness)
    }
}
