//! Source positions shared by the syntax tree and diagnostics

mod span;

pub use span::Span;
