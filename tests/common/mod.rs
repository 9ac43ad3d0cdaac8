//! Shared tree-building helpers for the liveguard test suite.
//!
//! Resolvers normally produce the tree; tests build it by hand with a
//! small library of declarations that mirrors a UI toolkit: a `Context`
//! capability with a `mounted` getter, a `State` host whose `context`
//! getter hands out contexts, an unrelated `Other.mounted`, and the
//! deferring routines of the `async` scope.

#![allow(dead_code)]

use liveguard::lint::{Diagnostic, LintConfig, Linter};
use liveguard::syntax::Span;
use liveguard::tree::{
    BinaryOp, Decl, DeclId, DeclKind, NodeId, NodeKind, Param, PrefixOp, SyntaxTree, TreeBuilder,
    Ty,
};
use liveguard::CheckerConfig;

pub struct Fixture {
    pub b: TreeBuilder,
    pub context_class: DeclId,
    pub context_mounted: DeclId,
    pub state_class: DeclId,
    pub state_mounted: DeclId,
    pub state_context: DeclId,
    pub other_mounted: DeclId,
    pub context_param: DeclId,
    /// `consume(value)`: takes anything
    pub consume: DeclId,
    /// `accept(Context context)`
    pub accept: DeclId,
    /// `run(callback)`: calls back immediately
    pub run: DeclId,
    pub future_then: DeclId,
    pub future_delayed: DeclId,
    pub timer_periodic: DeclId,
    pub stream_listen: DeclId,
    pub schedule_microtask: DeclId,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        let mut b = TreeBuilder::new();
        let method = DeclKind::Method { is_static: false };

        let context_class = b.declare(Decl::class("Context", "ui"));
        let context_mounted =
            b.declare(Decl::new("mounted", DeclKind::Getter, "ui").owned_by(context_class));
        let state_class = b.declare(Decl::class("State", "ui"));
        let state_mounted =
            b.declare(Decl::new("mounted", DeclKind::Getter, "ui").owned_by(state_class));
        let page_state = b.declare(Decl::class("PageState", "app").extends(state_class));
        let state_context = b.declare(
            Decl::new("context", DeclKind::Getter, "ui")
                .owned_by(page_state)
                .typed(Ty::interface(context_class)),
        );
        let other_class = b.declare(Decl::class("Other", "app"));
        let other_mounted =
            b.declare(Decl::new("mounted", DeclKind::Getter, "app").owned_by(other_class));
        let context_param = b.declare(
            Decl::new("context", DeclKind::Parameter, "app").typed(Ty::interface(context_class)),
        );
        let consume = b.declare(
            Decl::new("consume", DeclKind::Function, "app")
                .with_param(Param::positional("value", Some(Ty::Dynamic)))
                .with_param(Param::positional("extra", Some(Ty::Dynamic))),
        );
        let accept = b.declare(
            Decl::new("accept", DeclKind::Function, "app")
                .with_param(Param::positional("context", Some(Ty::interface(context_class)))),
        );
        let run = b.declare(
            Decl::new("run", DeclKind::Function, "app")
                .with_param(Param::positional("callback", Some(Ty::Function))),
        );

        let future = b.declare(Decl::class("Future", "async"));
        let future_then = b.declare(Decl::new("then", method, "async").owned_by(future));
        let future_delayed =
            b.declare(Decl::new("delayed", DeclKind::Constructor, "async").owned_by(future));
        let timer = b.declare(Decl::class("Timer", "async"));
        let timer_periodic =
            b.declare(Decl::new("periodic", DeclKind::Constructor, "async").owned_by(timer));
        let stream = b.declare(Decl::class("Stream", "async"));
        let stream_listen = b.declare(Decl::new("listen", method, "async").owned_by(stream));
        let schedule_microtask =
            b.declare(Decl::new("scheduleMicrotask", DeclKind::Function, "async"));

        Fixture {
            b,
            context_class,
            context_mounted,
            state_class,
            state_mounted,
            state_context,
            other_mounted,
            context_param,
            consume,
            accept,
            run,
            future_then,
            future_delayed,
            timer_periodic,
            stream_listen,
            schedule_microtask,
        }
    }

    pub fn finish(self) -> SyntaxTree {
        self.b.finish()
    }

    pub fn at(&mut self, node: NodeId, line: u32) -> NodeId {
        self.b.set_span(node, Span::new(0, 0, line, 1));
        node
    }

    // Capability references and uses

    /// The `context` parameter
    pub fn context(&mut self) -> NodeId {
        let ty = Ty::interface(self.context_class);
        self.b.add_typed(
            NodeKind::Identifier {
                name: "context".to_string(),
                decl: Some(self.context_param),
            },
            ty,
        )
    }

    /// The `context` getter of a `State` subclass
    pub fn host_context(&mut self) -> NodeId {
        let ty = Ty::interface(self.context_class);
        self.b.add_typed(
            NodeKind::Identifier {
                name: "context".to_string(),
                decl: Some(self.state_context),
            },
            ty,
        )
    }

    /// `consume(context);` with the reference on `line`
    pub fn use_at(&mut self, line: u32) -> NodeId {
        let reference = self.context();
        self.at(reference, line);
        let call = self.call(self.consume, None, vec![reference]);
        self.stmt(call)
    }

    /// `consume(context)` as an expression, reference on `line`
    pub fn use_expr_at(&mut self, line: u32) -> NodeId {
        let reference = self.context();
        self.at(reference, line);
        self.call(self.consume, None, vec![reference])
    }

    /// `consume(context);` through the host getter
    pub fn host_use_at(&mut self, line: u32) -> NodeId {
        let reference = self.host_context();
        self.at(reference, line);
        let call = self.call(self.consume, None, vec![reference]);
        self.stmt(call)
    }

    // Liveness checks

    /// `context.mounted`
    pub fn live(&mut self) -> NodeId {
        let target = self.context();
        self.b.add(NodeKind::PropertyAccess {
            target,
            name: "mounted".to_string(),
            decl: Some(self.context_mounted),
        })
    }

    /// `mounted` inside a `State` subclass
    pub fn host_live(&mut self) -> NodeId {
        self.b.add(NodeKind::Identifier {
            name: "mounted".to_string(),
            decl: Some(self.state_mounted),
        })
    }

    /// `other.mounted`
    pub fn other_live(&mut self) -> NodeId {
        let target = self.b.add(NodeKind::Identifier {
            name: "other".to_string(),
            decl: None,
        });
        self.b.add(NodeKind::PropertyAccess {
            target,
            name: "mounted".to_string(),
            decl: Some(self.other_mounted),
        })
    }

    /// `if (!check) return;`
    pub fn bail_unless(&mut self, check: NodeId) -> NodeId {
        let cond = self.not(check);
        let ret = self.ret();
        self.if_then(cond, vec![ret])
    }

    /// `if (!context.mounted) return;`
    pub fn bail_unless_live(&mut self) -> NodeId {
        let live = self.live();
        self.bail_unless(live)
    }

    // Expressions

    pub fn lit(&mut self, value: bool) -> NodeId {
        self.b.add(NodeKind::BoolLiteral(value))
    }

    /// An opaque boolean
    pub fn flag(&mut self) -> NodeId {
        self.b.add(NodeKind::Identifier {
            name: "flag".to_string(),
            decl: None,
        })
    }

    pub fn value(&mut self) -> NodeId {
        self.b.add(NodeKind::Literal)
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.b.add(NodeKind::Prefix {
            op: PrefixOp::Not,
            operand,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.b.add(NodeKind::Binary { op, left, right })
    }

    pub fn and(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(BinaryOp::And, left, right)
    }

    pub fn or(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(BinaryOp::Or, left, right)
    }

    pub fn await_(&mut self, inner: NodeId) -> NodeId {
        self.b.add(NodeKind::Await(inner))
    }

    /// `await something`
    pub fn suspend(&mut self) -> NodeId {
        let inner = self.value();
        self.await_(inner)
    }

    pub fn call(&mut self, decl: DeclId, target: Option<NodeId>, args: Vec<NodeId>) -> NodeId {
        let name = self.b.decl(decl).name.clone();
        self.b.add(NodeKind::MethodCall {
            target,
            name,
            decl: Some(decl),
            args,
        })
    }

    pub fn new_(&mut self, decl: DeclId, args: Vec<NodeId>) -> NodeId {
        self.b.add(NodeKind::New {
            decl: Some(decl),
            args,
        })
    }

    pub fn named(&mut self, name: &str, value: NodeId) -> NodeId {
        self.b.add(NodeKind::Named {
            name: name.to_string(),
            value,
        })
    }

    pub fn lambda(&mut self, stmts: Vec<NodeId>) -> NodeId {
        let block = self.block(stmts);
        let body = self.b.add(NodeKind::FunctionBody {
            body: block,
        });
        self.b.add(NodeKind::Lambda { body })
    }

    // Statements

    pub fn stmt(&mut self, expr: NodeId) -> NodeId {
        self.b.add(NodeKind::ExprStmt(expr))
    }

    /// `await something;`
    pub fn gap(&mut self) -> NodeId {
        let suspend = self.suspend();
        self.stmt(suspend)
    }

    /// A statement that neither suspends nor checks
    pub fn noop(&mut self) -> NodeId {
        let value = self.value();
        self.stmt(value)
    }

    pub fn ret(&mut self) -> NodeId {
        self.b.add(NodeKind::Return(None))
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.b.add(NodeKind::Block(stmts))
    }

    pub fn if_then(&mut self, cond: NodeId, then: Vec<NodeId>) -> NodeId {
        let then_branch = self.block(then);
        self.b.add(NodeKind::If {
            cond,
            case: None,
            then_branch,
            else_branch: None,
        })
    }

    pub fn if_else(&mut self, cond: NodeId, then: Vec<NodeId>, otherwise: Vec<NodeId>) -> NodeId {
        let then_branch = self.block(then);
        let else_branch = self.block(otherwise);
        self.b.add(NodeKind::If {
            cond,
            case: None,
            then_branch,
            else_branch: Some(else_branch),
        })
    }

    pub fn while_(&mut self, cond: NodeId, body: Vec<NodeId>) -> NodeId {
        let body = self.block(body);
        self.b.add(NodeKind::While { cond, body })
    }

    pub fn do_while(&mut self, body: Vec<NodeId>, cond: NodeId) -> NodeId {
        let body = self.block(body);
        self.b.add(NodeKind::Do { body, cond })
    }

    pub fn for_(&mut self, cond: Option<NodeId>, body: Vec<NodeId>) -> NodeId {
        self.for_with(cond, vec![], body)
    }

    /// `for (; cond; updaters) { body }`
    pub fn for_with(
        &mut self,
        cond: Option<NodeId>,
        updaters: Vec<NodeId>,
        body: Vec<NodeId>,
    ) -> NodeId {
        let body = self.block(body);
        self.b.add(NodeKind::For {
            init: vec![],
            cond,
            updaters,
            body,
        })
    }

    pub fn for_in(&mut self, iterable: NodeId, body: Vec<NodeId>) -> NodeId {
        let body = self.block(body);
        self.b.add(NodeKind::ForIn { iterable, body })
    }

    pub fn try_(
        &mut self,
        body: Vec<NodeId>,
        catches: Vec<Vec<NodeId>>,
        finally: Option<Vec<NodeId>>,
    ) -> NodeId {
        let body = self.block(body);
        let catches = catches
            .into_iter()
            .map(|stmts| {
                let body = self.block(stmts);
                self.b.add(NodeKind::Catch { body })
            })
            .collect();
        let finally = finally.map(|stmts| self.block(stmts));
        self.b.add(NodeKind::Try {
            body,
            catches,
            finally,
        })
    }

    /// `case _ when guard:` followed by `body`; `default:` when neither a
    /// pattern nor a guard is given
    pub fn member(&mut self, pattern: bool, guard: Option<NodeId>, body: Vec<NodeId>) -> NodeId {
        let pattern = pattern.then(|| self.b.add(NodeKind::Pattern));
        self.b.add(NodeKind::SwitchMember {
            pattern,
            guard,
            body,
        })
    }

    pub fn switch(&mut self, members: Vec<NodeId>) -> NodeId {
        let scrutinee = self.value();
        self.b.add(NodeKind::Switch { scrutinee, members })
    }

    /// An async function body; the root of the tree
    pub fn function(&mut self, stmts: Vec<NodeId>) -> NodeId {
        let block = self.block(stmts);
        self.b.add(NodeKind::FunctionBody {
            body: block,
        })
    }
}

/// Run the default linter over `tree`
pub fn lint(tree: &SyntaxTree) -> Vec<Diagnostic> {
    lint_with(tree, CheckerConfig::default())
}

pub fn lint_with(tree: &SyntaxTree, config: CheckerConfig) -> Vec<Diagnostic> {
    let mut linter = Linter::new(LintConfig::default(), config);
    linter.lint_tree(tree);
    linter.diagnostics().to_vec()
}

/// Reported lines, in report order
pub fn lines(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics
        .iter()
        .filter_map(|d| d.location.as_ref().map(|s| s.line))
        .collect()
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}
