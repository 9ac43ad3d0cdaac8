//! Linting infrastructure
//!
//! Diagnostic types, the guarded-use rule, and a bundled host that runs the
//! rule over a whole tree.

pub mod diagnostics;
pub mod formatting;
pub mod linter;
pub mod rule;

pub use diagnostics::{Diagnostic, DiagnosticSink, GuardCode, Severity};
pub use linter::{LintConfig, Linter, OutputFormat};
pub use rule::GuardedUseRule;
