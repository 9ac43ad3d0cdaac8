//! The guarded-capability-use rule
//!
//! For each call, instance creation, invocation or property access, finds
//! the capability references it uses, resolves the liveness accessor each
//! one must be checked against, and walks backwards from the reference to
//! see whether a check or a suspension comes first.

use super::diagnostics::{DiagnosticSink, GuardCode};
use crate::capability::{AccessorResolver, Classifier};
use crate::config::CheckerConfig;
use crate::deferred::DeferredTable;
use crate::guard::{self, WalkOutcome};
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use smallvec::SmallVec;
use tracing::debug;

type Candidates = SmallVec<[NodeId; 4]>;

#[derive(Debug, Clone)]
pub struct GuardedUseRule {
    config: CheckerConfig,
    deferred: DeferredTable,
}

impl Default for GuardedUseRule {
    fn default() -> Self {
        GuardedUseRule::new(CheckerConfig::default())
    }
}

impl GuardedUseRule {
    pub fn new(config: CheckerConfig) -> Self {
        let deferred = config.deferred_table();
        GuardedUseRule { config, deferred }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn deferred(&self) -> &DeferredTable {
        &self.deferred
    }

    /// Node kinds the host should hand to [`GuardedUseRule::check_node`]
    pub fn interested_in(kind: &NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::MethodCall { .. }
                | NodeKind::New { .. }
                | NodeKind::Invoke { .. }
                | NodeKind::PropertyAccess { .. }
        )
    }

    /// Check every capability reference `node` uses. Returns the number of
    /// diagnostics reported.
    pub fn check_node(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
        sink: &mut dyn DiagnosticSink,
    ) -> usize {
        let mut reported = 0;
        for reference in self.candidates(tree, node) {
            if self.check_reference(tree, reference, sink) {
                reported += 1;
            }
        }
        reported
    }

    fn classifier(&self) -> Classifier<'_> {
        Classifier::new(&self.config.capability)
    }

    /// Capability references used directly by `node`
    pub fn candidates(&self, tree: &SyntaxTree, node: NodeId) -> Candidates {
        let classifier = self.classifier();
        let mut found = Candidates::new();
        match tree.kind(node) {
            NodeKind::MethodCall { target, args, .. } => {
                if let Some(target) = target {
                    if classifier.is_capability(tree, *target, true) {
                        found.push(*target);
                    }
                }
                self.argument_candidates(tree, node, args, &mut found);
            }
            NodeKind::New { args, .. } | NodeKind::Invoke { args, .. } => {
                self.argument_candidates(tree, node, args, &mut found);
            }
            NodeKind::PropertyAccess { target, name, .. } => {
                if *name != self.config.liveness && classifier.is_capability(tree, *target, true)
                {
                    found.push(*target);
                }
            }
            _ => {}
        }
        found
    }

    fn argument_candidates(
        &self,
        tree: &SyntaxTree,
        call: NodeId,
        args: &[NodeId],
        found: &mut Candidates,
    ) {
        let classifier = self.classifier();
        let callee = tree.binding_of(call).map(|decl| tree.decl(decl));
        let mut position = 0;
        for arg in args {
            let (value, param) = match tree.kind(*arg) {
                NodeKind::Named { name, value } => {
                    (*value, callee.and_then(|decl| decl.named_param(name)))
                }
                _ => {
                    let param = callee.and_then(|decl| decl.positional_param(position));
                    position += 1;
                    (*arg, param)
                }
            };
            let value = tree.skip_parens_and_assertions(value);
            let passed_as_capability = param
                .and_then(|p| p.ty.as_ref())
                .is_some_and(|ty| classifier.is_capability_type(tree, ty, false));
            if passed_as_capability || classifier.is_capability(tree, value, false) {
                found.push(value);
            }
        }
    }

    /// Walk from one reference and report at most one diagnostic. Returns
    /// whether one was reported.
    fn check_reference(
        &self,
        tree: &SyntaxTree,
        reference: NodeId,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        let resolver = AccessorResolver::new(
            &self.config.capability,
            &self.config.host,
            &self.config.liveness,
        );
        let Some(accessor) = resolver.resolve(tree, tree.binding_of(reference)) else {
            debug!(node = reference.0, "no liveness accessor; skipping");
            return false;
        };

        let walk = guard::evaluate(tree, reference, accessor, &self.config.liveness);
        let (code, at) = match walk.outcome {
            WalkOutcome::Unguarded(_) if walk.unrelated_guard => {
                (GuardCode::WrongGuardUse, reference)
            }
            WalkOutcome::Unguarded(_) => (GuardCode::UnguardedUse, reference),
            WalkOutcome::Boundary(body) => match self.deferred.protected_call(tree, body) {
                Some(call) => (GuardCode::UnguardedUse, call),
                None => return false,
            },
            WalkOutcome::Guarded(_) | WalkOutcome::Detached => return false,
        };

        debug!(
            node = reference.0,
            code = code.id(),
            levels = walk.levels.len(),
            "guarded-use violation"
        );
        sink.report(code.at(tree.span(at)));
        true
    }
}
