//! Backward, syntax-directed guard analysis
//!
//! Starting at a reference node, the walk moves to the parent and asks for
//! the parent's guard state *with respect to the child it came from*. Each
//! construct combines the states of the children that execute before that
//! child (or, for the enclosing sequence, before the following statement):
//!
//! - a guard found at any level stops the walk: the reference is safe
//! - asynchrony found at any level stops the walk: the reference is exposed
//! - a routine boundary stops the walk without a verdict
//!
//! Children that execute after the reference are never polled, except in
//! loops, where later parts of a pass run again before the reference does.

use super::state::GuardState;
use crate::tree::{exits, BinaryOp, Children, DeclId, NodeId, NodeKind, PrefixOp, SyntaxTree};
use smallvec::SmallVec;
use tracing::trace;

/// Where a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// This ancestor guards the reference
    Guarded(NodeId),
    /// This ancestor exposes an unguarded suspension before the reference
    Unguarded(NodeId),
    /// Reached the innermost routine boundary (a function body) without a
    /// verdict
    Boundary(NodeId),
    /// Ran out of parents before any routine boundary
    Detached,
}

/// Result of one walk from one reference for one accessor
#[derive(Debug, Clone)]
pub struct GuardWalk {
    pub reference: NodeId,
    /// State of every ancestor visited, innermost first
    pub levels: Vec<(NodeId, GuardState)>,
    /// A liveness check by name was seen that resolved to another declaration
    pub unrelated_guard: bool,
    pub outcome: WalkOutcome,
    cache: Vec<Option<GuardState>>,
}

impl GuardWalk {
    /// State of the last ancestor visited
    pub fn final_state(&self) -> GuardState {
        self.levels
            .last()
            .map_or(GuardState::None, |(_, state)| *state)
    }

    /// Memoized state of a node, if the walk computed one
    pub fn cached(&self, node: NodeId) -> Option<GuardState> {
        self.cache.get(node.index()).copied().flatten()
    }

    pub fn is_guarded(&self) -> bool {
        matches!(self.outcome, WalkOutcome::Guarded(_))
    }

    pub fn is_unguarded(&self) -> bool {
        matches!(self.outcome, WalkOutcome::Unguarded(_))
    }
}

/// Walk from `reference` towards the innermost routine boundary, looking for
/// a check of `accessor` (a boolean declaration called `liveness_name`).
///
/// Every call gets its own memo cache and unrelated-guard flag, so walks over
/// the same tree are independent.
pub fn evaluate(
    tree: &SyntaxTree,
    reference: NodeId,
    accessor: DeclId,
    liveness_name: &str,
) -> GuardWalk {
    let mut visitor = StateVisitor {
        tree,
        accessor,
        liveness_name,
        reference,
        cache: vec![None; tree.len()],
        unrelated_guard: false,
    };
    let mut levels = Vec::new();
    let mut child = reference;

    let outcome = loop {
        if tree.kind(child).is_routine_boundary() {
            break WalkOutcome::Boundary(child);
        }
        let Some(parent) = tree.parent(child) else {
            break WalkOutcome::Detached;
        };

        visitor.reference = child;
        let state = visitor.state_of(parent);
        trace!(
            node = parent.0,
            kind = tree.kind(parent).name(),
            %state,
            "guard level"
        );
        levels.push((parent, state));

        if state.is_guard() {
            break WalkOutcome::Guarded(parent);
        }
        if state.is_async() {
            break WalkOutcome::Unguarded(parent);
        }
        child = parent;
    };

    GuardWalk {
        reference,
        levels,
        unrelated_guard: visitor.unrelated_guard,
        outcome,
        cache: visitor.cache,
    }
}

struct StateVisitor<'t> {
    tree: &'t SyntaxTree,
    accessor: DeclId,
    liveness_name: &'t str,
    /// The child of the node under evaluation that the walk came from
    reference: NodeId,
    cache: Vec<Option<GuardState>>,
    unrelated_guard: bool,
}

impl<'t> StateVisitor<'t> {
    fn state_of(&mut self, node: NodeId) -> GuardState {
        if let Some(state) = self.cache[node.index()] {
            return state;
        }
        let state = self.compute(node);
        self.cache[node.index()] = Some(state);
        state
    }

    fn opt_state(&mut self, node: Option<NodeId>) -> GuardState {
        node.map_or(GuardState::None, |n| self.state_of(n))
    }

    fn compute(&mut self, node: NodeId) -> GuardState {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::BoolLiteral(_)
            | NodeKind::Literal
            | NodeKind::Pattern
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Rethrow => GuardState::None,

            NodeKind::Identifier { name, decl } => self.identifier(name, *decl),
            NodeKind::PropertyAccess { target, name, decl } => {
                if *target == self.reference {
                    return GuardState::None;
                }
                let target = self.state_of(*target).async_only();
                target.then(self.identifier(name, *decl))
            }

            NodeKind::Paren(inner)
            | NodeKind::NullAssert(inner)
            | NodeKind::Cast(inner)
            | NodeKind::Postfix(inner)
            | NodeKind::Spread(inner)
            | NodeKind::ExprStmt(inner)
            | NodeKind::Labeled(inner)
            | NodeKind::Named { value: inner, .. }
            | NodeKind::Catch { body: inner } => self.pass_through(*inner),
            NodeKind::VarDecl { init, .. } => match init {
                Some(init) => self.pass_through(*init),
                None => GuardState::None,
            },

            NodeKind::Prefix {
                op: PrefixOp::Not,
                operand,
            } => {
                if *operand == self.reference {
                    GuardState::None
                } else {
                    self.state_of(*operand).negate()
                }
            }
            NodeKind::Binary { op, left, right } => self.binary(node, *op, *left, *right),
            NodeKind::Assign { target, value } => {
                self.in_order(&[(Some(*target), false), (Some(*value), true)])
            }

            NodeKind::Await(inner) => {
                // The awaited expression runs before the suspension.
                if *inner == self.reference {
                    GuardState::None
                } else {
                    GuardState::Asynchronous
                }
            }

            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.if_like(*cond, None, *then_expr, Some(*else_expr)),
            NodeKind::If {
                cond,
                case,
                then_branch,
                else_branch,
            } => self.if_like(*cond, *case, *then_branch, *else_branch),
            NodeKind::CaseClause { pattern, guard } => {
                if *pattern == self.reference {
                    GuardState::None
                } else if *guard == Some(self.reference) {
                    self.state_of(*pattern).async_only()
                } else {
                    self.opt_state(*guard)
                }
            }

            NodeKind::Block(stmts) => self.sequence(stmts, tree.parent(node)),

            NodeKind::While { cond, body } => {
                if *cond == self.reference {
                    // After one iteration the body runs before the condition.
                    self.state_of(*body).async_only()
                } else if *body == self.reference {
                    self.loop_condition(Some(*cond))
                } else {
                    // The body may never run: only asynchrony escapes.
                    self.state_of(*cond)
                        .async_only()
                        .or_else(|| self.state_of(*body).async_only())
                }
            }
            NodeKind::Do { body, cond } => {
                if *body == self.reference {
                    self.state_of(*cond).async_only()
                } else if *cond == self.reference {
                    self.state_of(*body).async_only()
                } else {
                    self.state_of(*cond)
                        .async_only()
                        .or_else(|| self.state_of(*body).async_only())
                }
            }
            NodeKind::For {
                init,
                cond,
                updaters,
                body,
            } => self.for_loop(init, *cond, updaters, *body),
            NodeKind::ForIn { iterable, body } => {
                self.in_order(&[(Some(*iterable), false), (Some(*body), false)])
            }

            NodeKind::Switch { scrutinee, members } => self.switch(*scrutinee, members),
            NodeKind::SwitchMember {
                pattern,
                guard,
                body,
            } => self.switch_member(node, *pattern, *guard, body),
            NodeKind::SwitchExprCase {
                pattern,
                guard,
                value,
            } => self.switch_expr_case(*pattern, *guard, *value),

            NodeKind::Try {
                body,
                catches,
                finally,
            } => self.try_stmt(*body, catches, *finally),

            // Code inside a nested routine does not run here.
            NodeKind::Lambda { .. }
            | NodeKind::FunctionDecl { .. }
            | NodeKind::FunctionBody { .. } => GuardState::None,

            NodeKind::Prefix {
                op: PrefixOp::Other,
                ..
            }
            | NodeKind::Index { .. }
            | NodeKind::MethodCall { .. }
            | NodeKind::New { .. }
            | NodeKind::Invoke { .. }
            | NodeKind::Compound(_)
            | NodeKind::Throw(_)
            | NodeKind::Return(_)
            | NodeKind::SwitchExpr { .. }
            | NodeKind::Unit(_) => self.async_before_reference(node),
        }
    }

    fn identifier(&mut self, name: &str, decl: Option<DeclId>) -> GuardState {
        if name != self.liveness_name {
            return GuardState::None;
        }
        if decl == Some(self.accessor) {
            GuardState::PositiveGuard
        } else {
            self.unrelated_guard = true;
            GuardState::None
        }
    }

    fn pass_through(&mut self, inner: NodeId) -> GuardState {
        if inner == self.reference {
            GuardState::None
        } else {
            self.state_of(inner)
        }
    }

    /// Fallback for constructs that neither guard nor suspend
    fn async_before_reference(&mut self, node: NodeId) -> GuardState {
        let children: Children = self.tree.children(node);
        self.async_if_any(&children)
    }

    /// Asynchronous if any of `nodes` before the reference is; nodes after
    /// the reference are never polled.
    fn async_if_any(&mut self, nodes: &[NodeId]) -> GuardState {
        let end = nodes
            .iter()
            .position(|n| *n == self.reference)
            .unwrap_or(nodes.len());
        for node in &nodes[..end] {
            if self.state_of(*node).is_async() {
                return GuardState::Asynchronous;
            }
        }
        GuardState::None
    }

    /// Walk backwards through `items` (in execution order) from the item
    /// before the reference, or from the last item when the reference follows
    /// all of them. The first asynchronous item decides; a guard decides only
    /// when its item is allowed to guard the reference.
    fn in_order(&mut self, items: &[(Option<NodeId>, bool)]) -> GuardState {
        let reference = Some(self.reference);
        let end = items
            .iter()
            .position(|(n, _)| *n == reference)
            .unwrap_or(items.len());
        for (node, can_guard) in items[..end].iter().rev() {
            let Some(node) = node else {
                continue;
            };
            let state = self.state_of(*node);
            if state.is_async() {
                return GuardState::Asynchronous;
            }
            if *can_guard && !state.is_none() {
                return state;
            }
        }
        GuardState::None
    }

    /// What a loop condition says about the body it admits: only asynchrony
    /// and a positive check carry over.
    fn loop_condition(&mut self, cond: Option<NodeId>) -> GuardState {
        match self.opt_state(cond) {
            GuardState::Asynchronous => GuardState::Asynchronous,
            GuardState::PositiveGuard => GuardState::PositiveGuard,
            _ => GuardState::None,
        }
    }

    /// A pass runs `cond`, `body`, then `updaters`; the initializers run once
    /// before the first pass.
    fn for_loop(
        &mut self,
        init: &[NodeId],
        cond: Option<NodeId>,
        updaters: &[NodeId],
        body: NodeId,
    ) -> GuardState {
        if init.contains(&self.reference) {
            return self.async_if_any(init);
        }
        if cond == Some(self.reference) {
            // Later passes reach the condition through the body and updaters.
            return self
                .async_if_any(updaters)
                .or_else(|| self.state_of(body).async_only())
                .or_else(|| self.async_if_any(init));
        }
        if body == self.reference {
            return self
                .loop_condition(cond)
                .or_else(|| self.async_if_any(updaters))
                .or_else(|| self.async_if_any(init));
        }
        if let Some(index) = updaters.iter().position(|u| *u == self.reference) {
            let items: SmallVec<[(Option<NodeId>, bool); 8]> = std::iter::once(body)
                .chain(updaters[..index].iter().copied())
                .map(|n| (Some(n), true))
                .collect();
            let state = self.in_order(&items);
            if !state.is_none() {
                return state;
            }
            return self
                .loop_condition(cond)
                .or_else(|| self.async_if_any(&updaters[index + 1..]))
                .or_else(|| self.async_if_any(init));
        }

        // The reference follows the loop, which may not run at all.
        self.async_if_any(init)
            .or_else(|| self.opt_state(cond).async_only())
            .or_else(|| self.state_of(body).async_only())
            .or_else(|| self.async_if_any(updaters))
    }

    fn in_order_guardable(&mut self, nodes: &[NodeId]) -> GuardState {
        let items: SmallVec<[(Option<NodeId>, bool); 8]> =
            nodes.iter().map(|n| (Some(*n), true)).collect();
        self.in_order(&items)
    }

    /// Statements of a block or switch member
    fn sequence(&mut self, stmts: &[NodeId], owner: Option<NodeId>) -> GuardState {
        if let Some(index) = stmts.iter().position(|s| *s == self.reference) {
            let preceding = self.in_order_guardable(&stmts[..index]);
            if !preceding.is_none() {
                return preceding;
            }
            if owner.is_some_and(|o| self.tree.kind(o).is_loop()) {
                // Statements after the reference run again before the next
                // iteration reaches it.
                return self.in_order_guardable(&stmts[index + 1..]).async_only();
            }
            return GuardState::None;
        }

        for stmt in stmts.iter().rev() {
            let state = self.state_of(*stmt);
            if !state.is_none() {
                return state;
            }
        }
        GuardState::None
    }

    fn binary(&mut self, node: NodeId, op: BinaryOp, left: NodeId, right: NodeId) -> GuardState {
        if op == BinaryOp::Other {
            return self.async_before_reference(node);
        }
        if left == self.reference {
            return GuardState::None;
        }
        if right == self.reference {
            // The right operand only runs when the left one let it.
            return match (op, self.state_of(left)) {
                (_, GuardState::Asynchronous) => GuardState::Asynchronous,
                (BinaryOp::And, GuardState::PositiveGuard) => GuardState::PositiveGuard,
                (BinaryOp::Or, GuardState::NegativeGuard) => GuardState::NegativeGuard,
                _ => GuardState::None,
            };
        }

        let left_state = self.state_of(left);
        let right_state = self.state_of(right);
        match op {
            BinaryOp::And => left_state.then(right_state),
            BinaryOp::Or => left_state.either(right_state),
            BinaryOp::Eq | BinaryOp::NotEq => {
                let equal = op == BinaryOp::Eq;
                if left_state.is_async() || right_state.is_async() {
                    GuardState::Asynchronous
                } else if left_state.is_guard() {
                    self.tree
                        .bool_value(right)
                        .map_or(GuardState::None, |lit| left_state.compare(lit, equal))
                } else if right_state.is_guard() {
                    self.tree
                        .bool_value(left)
                        .map_or(GuardState::None, |lit| right_state.compare(lit, equal))
                } else {
                    GuardState::None
                }
            }
            BinaryOp::Other => GuardState::None,
        }
    }

    fn if_like(
        &mut self,
        cond: NodeId,
        case: Option<NodeId>,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> GuardState {
        if cond == self.reference {
            return GuardState::None;
        }
        let cond_state = self.state_of(cond);
        if case == Some(self.reference) {
            return match cond_state {
                GuardState::Asynchronous | GuardState::PositiveGuard => cond_state,
                _ => GuardState::None,
            };
        }

        let condition = cond_state.then(self.opt_state(case));
        if then_branch == self.reference {
            return match condition {
                GuardState::Asynchronous | GuardState::PositiveGuard => condition,
                _ => GuardState::None,
            };
        }
        if else_branch == Some(self.reference) {
            return match condition {
                GuardState::Asynchronous => GuardState::Asynchronous,
                GuardState::NegativeGuard => GuardState::PositiveGuard,
                _ => GuardState::None,
            };
        }

        // The reference follows the whole construct.
        let then_state = self.state_of(then_branch);
        let else_state = self.opt_state(else_branch);
        let then_exits = exits::terminates(self.tree, then_branch);
        let else_exits = else_branch.is_some_and(|e| exits::terminates(self.tree, e));

        if then_state == GuardState::NegativeGuard
            && (else_state == GuardState::NegativeGuard || else_exits)
        {
            return GuardState::NegativeGuard;
        }
        if else_state == GuardState::NegativeGuard && then_exits {
            return GuardState::NegativeGuard;
        }
        if then_state.is_async() && !then_exits {
            return GuardState::Asynchronous;
        }
        if else_state.is_async() && !else_exits {
            return GuardState::Asynchronous;
        }
        if condition.is_async() {
            return GuardState::Asynchronous;
        }
        if condition == GuardState::PositiveGuard && else_exits {
            return GuardState::NegativeGuard;
        }
        if condition == GuardState::NegativeGuard && then_exits {
            return GuardState::NegativeGuard;
        }
        GuardState::None
    }

    fn switch(&mut self, scrutinee: NodeId, members: &[NodeId]) -> GuardState {
        if scrutinee == self.reference {
            return GuardState::None;
        }
        let Some(index) = members.iter().position(|m| *m == self.reference) else {
            // Member bodies may not run: only asynchrony escapes the switch.
            return self
                .state_of(scrutinee)
                .async_only()
                .or_else(|| self.async_if_any(members));
        };

        // Control reaches the member through its own clause or by falling
        // through empty members before it.
        let tree = self.tree;
        let mut all_positive = true;
        for (offset, member) in members[..=index].iter().rev().enumerate() {
            let NodeKind::SwitchMember {
                pattern,
                guard,
                body,
            } = tree.kind(*member)
            else {
                all_positive = false;
                break;
            };
            if offset > 0 && !body.is_empty() {
                break;
            }
            let clause = self
                .opt_state(*pattern)
                .async_only()
                .then(self.opt_state(*guard));
            if clause.is_async() {
                return GuardState::Asynchronous;
            }
            if clause != GuardState::PositiveGuard {
                all_positive = false;
            }
        }
        if all_positive {
            GuardState::PositiveGuard
        } else {
            self.state_of(scrutinee).async_only()
        }
    }

    fn switch_member(
        &mut self,
        member: NodeId,
        pattern: Option<NodeId>,
        guard: Option<NodeId>,
        body: &[NodeId],
    ) -> GuardState {
        if pattern == Some(self.reference) {
            return GuardState::None;
        }
        if guard == Some(self.reference) {
            return self.opt_state(pattern).async_only();
        }
        let statements = self.sequence(body, Some(member));
        if !statements.is_none() {
            return statements;
        }
        if body.contains(&self.reference) {
            // Clauses, including fallthrough, are resolved by the switch.
            return GuardState::None;
        }
        self.opt_state(pattern)
            .async_only()
            .then(self.opt_state(guard))
            .async_only()
    }

    fn switch_expr_case(
        &mut self,
        pattern: NodeId,
        guard: Option<NodeId>,
        value: NodeId,
    ) -> GuardState {
        if pattern == self.reference {
            return GuardState::None;
        }
        if guard == Some(self.reference) {
            return self.state_of(pattern).async_only();
        }
        let guard_state = self.opt_state(guard);
        if value == self.reference {
            return match guard_state {
                GuardState::Asynchronous | GuardState::PositiveGuard => guard_state,
                _ => GuardState::None,
            };
        }
        guard_state
            .async_only()
            .or_else(|| self.state_of(value).async_only())
    }

    fn try_stmt(&mut self, body: NodeId, catches: &[NodeId], finally: Option<NodeId>) -> GuardState {
        if body == self.reference {
            return GuardState::None;
        }
        if catches.contains(&self.reference) {
            // Nothing in the body is known to have run.
            return self.state_of(body).async_only();
        }
        let regions: SmallVec<[NodeId; 4]> = std::iter::once(body)
            .chain(catches.iter().copied())
            .collect();
        if finally == Some(self.reference) {
            return self.async_if_any(&regions);
        }
        // Only the finally block is certain to have run after the statement.
        self.opt_state(finally)
            .or_else(|| self.async_if_any(&regions))
    }
}
