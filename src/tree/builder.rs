//! Bottom-up construction of a [`SyntaxTree`]
//!
//! Resolvers add children before their parents. Adding a node adopts its
//! children, so parent links never need to be patched by hand.

use super::decl::{Decl, DeclId, Ty};
use super::node::{Node, NodeId, NodeKind};
use super::SyntaxTree;
use crate::syntax::Span;

#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    decls: Vec<Decl>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration
    pub fn declare(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    /// Add an untyped node with a synthetic span
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.push(kind, Span::synthetic(), None)
    }

    pub fn add_typed(&mut self, kind: NodeKind, ty: Ty) -> NodeId {
        self.push(kind, Span::synthetic(), Some(ty))
    }

    pub fn add_at(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.push(kind, span, None)
    }

    pub fn push(&mut self, kind: NodeKind, span: Span, ty: Option<Ty>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.children() {
            // A node is adopted once; a later parent wins.
            if let Some(node) = self.nodes.get_mut(child.index()) {
                node.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            ty,
        });
        id
    }

    pub fn set_type(&mut self, id: NodeId, ty: Ty) {
        self.nodes[id.index()].ty = Some(ty);
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree::from_parts(self.nodes, self.decls)
    }
}
