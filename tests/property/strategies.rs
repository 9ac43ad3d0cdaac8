//! Proptest strategies for guard states and straight-line function bodies.

#![allow(dead_code)]

use liveguard::GuardState;
use proptest::prelude::*;

pub fn arb_state() -> impl Strategy<Value = GuardState> {
    prop_oneof![
        Just(GuardState::None),
        Just(GuardState::Asynchronous),
        Just(GuardState::PositiveGuard),
        Just(GuardState::NegativeGuard),
    ]
}

/// One statement of a generated function body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `await x;`
    Gap,
    /// `if (!context.mounted) return;`
    Bail,
    /// `if (!other.mounted) return;`
    WrongBail,
    /// A statement that neither suspends nor checks
    Noop,
    /// `consume(context);`
    Use,
}

pub fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Gap),
        2 => Just(Step::Bail),
        1 => Just(Step::WrongBail),
        2 => Just(Step::Noop),
        4 => Just(Step::Use),
    ]
}

pub fn arb_body() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(arb_step(), 0..24)
}
