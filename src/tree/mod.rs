//! Resolved syntax tree
//!
//! The checker consumes a tree that an upstream parser and resolver have
//! already produced: every node carries its parent, its span and (where the
//! resolver knew it) its static type, and every name carries the declaration
//! it resolves to. Nodes live in an arena and are addressed by [`NodeId`], so
//! per-walk state can be kept in plain vectors indexed by node.
//!
//! Trees are immutable once [`TreeBuilder::finish`] returns.

mod builder;
mod decl;
pub mod exits;
mod node;

pub use builder::TreeBuilder;
pub use decl::{Decl, DeclId, DeclKind, Param, Ty};
pub use node::{BinaryOp, Children, Node, NodeId, NodeKind, PrefixOp};

use crate::syntax::Span;
use rustc_hash::{FxHashMap, FxHashSet};

/// An immutable, resolved syntax tree together with its declarations
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    decls: Vec<Decl>,
    roots: Vec<NodeId>,
    /// (scope, name) -> class declaration
    classes: FxHashMap<(String, String), DeclId>,
    /// class -> member declarations
    members: FxHashMap<DeclId, Vec<DeclId>>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, decls: Vec<Decl>) -> Self {
        let roots = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| NodeId(i as u32))
            .collect();

        let mut classes = FxHashMap::default();
        let mut members: FxHashMap<DeclId, Vec<DeclId>> = FxHashMap::default();
        for (i, decl) in decls.iter().enumerate() {
            let id = DeclId(i as u32);
            if decl.kind == DeclKind::Class {
                classes
                    .entry((decl.scope.clone(), decl.name.clone()))
                    .or_insert(id);
            }
            if let Some(owner) = decl.owner {
                members.entry(owner).or_default().push(id);
            }
        }

        SyntaxTree {
            nodes,
            decls,
            roots,
            classes,
            members,
        }
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent, in creation order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn span(&self, id: NodeId) -> &Span {
        &self.node(id).span
    }

    pub fn ty(&self, id: NodeId) -> Option<&Ty> {
        self.node(id).ty.as_ref()
    }

    /// Children in execution order
    pub fn children(&self, id: NodeId) -> Children {
        self.kind(id).children()
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    /// All nodes reachable from the roots, parents before children
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        order
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The declaration a name-like node resolves to. Calls resolve to the
    /// invoked routine, whose return type is the type of the call.
    pub fn binding_of(&self, id: NodeId) -> Option<DeclId> {
        match self.kind(id) {
            NodeKind::Identifier { decl, .. }
            | NodeKind::PropertyAccess { decl, .. }
            | NodeKind::MethodCall { decl, .. }
            | NodeKind::New { decl, .. } => *decl,
            NodeKind::Paren(inner) | NodeKind::NullAssert(inner) => self.binding_of(*inner),
            _ => None,
        }
    }

    /// Literal boolean value, looking through parentheses
    pub fn bool_value(&self, id: NodeId) -> Option<bool> {
        match self.kind(id) {
            NodeKind::BoolLiteral(value) => Some(*value),
            NodeKind::Paren(inner) => self.bool_value(*inner),
            _ => None,
        }
    }

    /// Strip parentheses and null assertions
    pub fn skip_parens_and_assertions(&self, mut id: NodeId) -> NodeId {
        loop {
            match self.kind(id) {
                NodeKind::Paren(inner) | NodeKind::NullAssert(inner) => id = *inner,
                _ => return id,
            }
        }
    }

    /// Class declared with `name` in `scope`
    pub fn find_class(&self, scope: &str, name: &str) -> Option<DeclId> {
        self.classes
            .get(&(scope.to_string(), name.to_string()))
            .copied()
    }

    /// Whether `class` is, or transitively extends, a class matching `pred`
    pub fn is_subclass_of(&self, class: DeclId, pred: impl Fn(&Decl) -> bool) -> bool {
        self.superclasses(class).into_iter().any(|c| pred(self.decl(c)))
    }

    /// Getter or field named `name` on `class` or its supertypes, nearest first
    pub fn find_member(&self, class: DeclId, name: &str) -> Option<DeclId> {
        self.superclasses(class).into_iter().find_map(|c| {
            self.members.get(&c)?.iter().copied().find(|m| {
                let decl = self.decl(*m);
                decl.name == name && matches!(decl.kind, DeclKind::Getter | DeclKind::Field)
            })
        })
    }

    /// `class` followed by its supertypes in breadth-first order
    fn superclasses(&self, class: DeclId) -> Vec<DeclId> {
        let mut seen = FxHashSet::default();
        let mut order = vec![class];
        seen.insert(class);
        let mut i = 0;
        while i < order.len() {
            for sup in &self.decl(order[i]).supertypes {
                if seen.insert(*sup) {
                    order.push(*sup);
                }
            }
            i += 1;
        }
        order
    }
}
