//! Guard-state analysis
//!
//! Decides whether a reference node is reached only after a successful
//! liveness check, by walking backwards from the reference through its
//! ancestors. See [`evaluate`].

mod analyzer;
mod state;

pub use analyzer::{evaluate, GuardWalk, WalkOutcome};
pub use state::GuardState;
