//! # liveguard - Guarded Capability Use Checker
//!
//! Some handles stay valid only while their owner is alive. Once a routine
//! suspends, the owner may have gone away, so every use of such a handle
//! after a suspension point must be preceded by a check of the owner's
//! liveness flag. liveguard finds the uses that are not.
//!
//! ## Quick Start
//!
//! ```
//! use liveguard::lint::{Diagnostic, GuardedUseRule};
//! use liveguard::tree::{Decl, DeclKind, NodeKind, TreeBuilder, Ty};
//!
//! // `f() async { await x; context.size; }`
//! let mut b = TreeBuilder::new();
//! let context = b.declare(Decl::class("Context", "ui"));
//! b.declare(Decl::new("mounted", DeclKind::Getter, "ui").owned_by(context));
//!
//! let x = b.add(NodeKind::Literal);
//! let gap = b.add(NodeKind::Await(x));
//! let gap = b.add(NodeKind::ExprStmt(gap));
//! let reference = b.add_typed(
//!     NodeKind::Identifier { name: "context".into(), decl: None },
//!     Ty::interface(context),
//! );
//! let access = b.add(NodeKind::PropertyAccess {
//!     target: reference,
//!     name: "size".into(),
//!     decl: None,
//! });
//! let use_stmt = b.add(NodeKind::ExprStmt(access));
//! let block = b.add(NodeKind::Block(vec![gap, use_stmt]));
//! b.add(NodeKind::FunctionBody { body: block });
//! let tree = b.finish();
//!
//! let rule = GuardedUseRule::default();
//! let mut found: Vec<Diagnostic> = Vec::new();
//! rule.check_node(&tree, access, &mut found);
//! assert_eq!(found[0].code, "G001");
//! ```
//!
//! ## Architecture
//!
//! An upstream resolver builds a [`tree::SyntaxTree`]. For every node the
//! rule is interested in:
//!
//! 1. **Classifier** - pick out references typed as the capability
//! 2. **Accessor resolver** - bind each reference to the liveness getter
//!    that guards it
//! 3. **Guard analysis** - walk backwards from the reference until a guard,
//!    a suspension or the routine boundary
//! 4. **Deferred table** - at the boundary, check whether the routine is a
//!    callback some library runs later
//!
//! Names, scopes and the deferred table come from [`config::CheckerConfig`].

pub mod capability;
pub mod config;
pub mod deferred;
pub mod error;
pub mod guard;
pub mod lint;
pub mod syntax;
pub mod tree;

pub use config::CheckerConfig;
pub use error::{ConfigError, Result};
pub use guard::{evaluate, GuardState, GuardWalk, WalkOutcome};
pub use lint::{Diagnostic, GuardedUseRule, Linter};
pub use tree::{SyntaxTree, TreeBuilder};
