//! Capability references and the accessors that guard them

mod accessor;
mod classify;

pub use accessor::AccessorResolver;
pub use classify::Classifier;
