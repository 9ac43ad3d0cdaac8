//! Deferred-execution callbacks
//!
//! Some library routines take a function literal and run it later, after the
//! routine that created it may have returned and its capability may have
//! gone stale. The table lists those routines and which arguments they
//! defer. A capability used inside such a literal without a guard of its
//! own is a violation even though no `await` is in sight.

use crate::tree::{Decl, DeclId, NodeId, NodeKind, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A routine whose callback arguments run deferred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedFunction {
    /// Scope (library) that declares the routine
    pub scope: String,
    /// Owning class; absent for top-level functions
    #[serde(default)]
    pub owner: Option<String>,
    /// Routine name; absent for the unnamed constructor
    #[serde(default)]
    pub name: Option<String>,
    /// Deferred positional arguments, zero-based
    #[serde(default)]
    pub positional: BTreeSet<usize>,
    /// Deferred named arguments
    #[serde(default)]
    pub named: BTreeSet<String>,
}

impl ProtectedFunction {
    pub fn new(scope: impl Into<String>, owner: Option<&str>, name: Option<&str>) -> Self {
        ProtectedFunction {
            scope: scope.into(),
            owner: owner.map(str::to_string),
            name: name.map(str::to_string),
            positional: BTreeSet::new(),
            named: BTreeSet::new(),
        }
    }

    pub fn with_positional(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.positional.extend(indices);
        self
    }

    pub fn with_named<'s>(mut self, names: impl IntoIterator<Item = &'s str>) -> Self {
        self.named.extend(names.into_iter().map(str::to_string));
        self
    }

    /// Whether `decl` is the routine this entry describes
    pub fn describes(&self, tree: &SyntaxTree, decl: &Decl) -> bool {
        if decl.scope != self.scope || decl.name != self.name.as_deref().unwrap_or("") {
            return false;
        }
        match (&self.owner, decl.owner) {
            (None, None) => true,
            (Some(owner), Some(class)) => tree.decl(class).name == *owner,
            _ => false,
        }
    }

    pub fn protects(&self, slot: ArgSlot<'_>) -> bool {
        match slot {
            ArgSlot::Positional(index) => self.positional.contains(&index),
            ArgSlot::Named(name) => self.named.contains(name),
        }
    }
}

/// Where an argument sits in a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSlot<'a> {
    /// Index among the positional (non-named) arguments
    Positional(usize),
    Named(&'a str),
}

/// Lookup table of deferring routines
#[derive(Debug, Clone, Default)]
pub struct DeferredTable {
    entries: Vec<ProtectedFunction>,
}

impl DeferredTable {
    pub fn new(entries: Vec<ProtectedFunction>) -> Self {
        DeferredTable { entries }
    }

    /// Timers, futures, streams and microtasks of the `async` scope
    pub fn defaults() -> Self {
        let future = Some("Future");
        let timer = Some("Timer");
        DeferredTable::new(vec![
            ProtectedFunction::new("async", future, None).with_positional([0]),
            ProtectedFunction::new("async", future, Some("microtask")).with_positional([0]),
            ProtectedFunction::new("async", future, Some("sync")).with_positional([0]),
            ProtectedFunction::new("async", future, Some("delayed")).with_positional([1]),
            ProtectedFunction::new("async", timer, None).with_positional([1]),
            ProtectedFunction::new("async", timer, Some("periodic")).with_positional([1]),
            ProtectedFunction::new("async", future, Some("then"))
                .with_positional([0])
                .with_named(["onError"]),
            ProtectedFunction::new("async", future, Some("catchError")).with_positional([0]),
            ProtectedFunction::new("async", future, Some("whenComplete")).with_positional([0]),
            ProtectedFunction::new("async", future, Some("timeout")).with_named(["onTimeout"]),
            ProtectedFunction::new("async", Some("Stream"), Some("listen"))
                .with_positional([0])
                .with_named(["onError", "onDone"]),
            ProtectedFunction::new("async", None, Some("scheduleMicrotask")).with_positional([0]),
        ])
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ProtectedFunction>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[ProtectedFunction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an argument in `slot` of a call to `decl` runs deferred
    pub fn matches(&self, tree: &SyntaxTree, decl: DeclId, slot: ArgSlot<'_>) -> bool {
        let decl = tree.decl(decl);
        self.entries
            .iter()
            .any(|entry| entry.protects(slot) && entry.describes(tree, decl))
    }

    /// The call that defers the function literal owning `body`, if any.
    ///
    /// `body` is a routine boundary reached by a guard walk. It qualifies
    /// when its function literal is passed directly (or as a named
    /// argument) in a protected slot of a call to a table entry.
    pub fn protected_call(&self, tree: &SyntaxTree, body: NodeId) -> Option<NodeId> {
        let lambda = tree.parent(body)?;
        if !matches!(tree.kind(lambda), NodeKind::Lambda { .. }) {
            return None;
        }

        let mut arg = lambda;
        let mut call = tree.parent(lambda)?;
        if let NodeKind::Named { .. } = tree.kind(call) {
            arg = call;
            call = tree.parent(call)?;
        }

        let (decl, args) = match tree.kind(call) {
            NodeKind::MethodCall {
                decl: Some(decl),
                args,
                ..
            }
            | NodeKind::New {
                decl: Some(decl),
                args,
            } => (*decl, args),
            _ => return None,
        };

        let slot = match tree.kind(arg) {
            NodeKind::Named { name, .. } => ArgSlot::Named(name),
            _ => {
                let index = args
                    .iter()
                    .filter(|a| !matches!(tree.kind(**a), NodeKind::Named { .. }))
                    .position(|a| *a == arg)?;
                ArgSlot::Positional(index)
            }
        };

        self.matches(tree, decl, slot).then_some(call)
    }
}
