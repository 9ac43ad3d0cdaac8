//! Guard states and the ways sub-results combine

use std::fmt;

/// Verdict of a subtree with respect to one reference node and one liveness
/// accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GuardState {
    /// Nothing relevant
    #[default]
    None,
    /// Contains a suspension point that no later check covers
    Asynchronous,
    /// Reached only when the liveness flag is true
    PositiveGuard,
    /// Code continuing past this point is reached only when the liveness
    /// flag was found true; the failing path has already been split off
    NegativeGuard,
}

impl GuardState {
    pub fn is_none(self) -> bool {
        matches!(self, GuardState::None)
    }

    pub fn is_async(self) -> bool {
        matches!(self, GuardState::Asynchronous)
    }

    /// Positive or negative guard
    pub fn is_guard(self) -> bool {
        matches!(self, GuardState::PositiveGuard | GuardState::NegativeGuard)
    }

    /// Keep asynchrony, drop guards
    pub fn async_only(self) -> GuardState {
        if self.is_async() {
            GuardState::Asynchronous
        } else {
            GuardState::None
        }
    }

    /// `self` if it says anything, otherwise `other`
    pub fn or_else(self, other: impl FnOnce() -> GuardState) -> GuardState {
        if self.is_none() {
            other()
        } else {
            self
        }
    }

    /// Logical negation
    pub fn negate(self) -> GuardState {
        match self {
            GuardState::PositiveGuard => GuardState::NegativeGuard,
            GuardState::NegativeGuard => GuardState::PositiveGuard,
            other => other,
        }
    }

    /// Sequential composition: `self` is evaluated before `later`.
    ///
    /// Used for `&&` and for an `if` condition followed by its case clause.
    pub fn then(self, later: GuardState) -> GuardState {
        match (self, later) {
            (GuardState::None, _) => later,
            (_, GuardState::None) => self,
            (_, GuardState::Asynchronous) => GuardState::Asynchronous,
            (GuardState::Asynchronous, _) => later,
            (GuardState::PositiveGuard, _) => GuardState::PositiveGuard,
            (GuardState::NegativeGuard, _) => GuardState::NegativeGuard,
        }
    }

    /// Short-circuit `||` of two operands, seen from after the expression.
    ///
    /// Asynchrony on either side dominates. A positive guard survives only
    /// when both sides agree; one negatively guarded side is enough, since
    /// the whole expression is true whenever that side is.
    pub fn either(self, other: GuardState) -> GuardState {
        match (self, other) {
            (GuardState::Asynchronous, _) | (_, GuardState::Asynchronous) => {
                GuardState::Asynchronous
            }
            (GuardState::PositiveGuard, GuardState::PositiveGuard) => GuardState::PositiveGuard,
            (GuardState::NegativeGuard, _) | (_, GuardState::NegativeGuard) => {
                GuardState::NegativeGuard
            }
            _ => GuardState::None,
        }
    }

    /// `operand == literal` (or `!=` when `equal` is false) where the operand
    /// is a guard. Non-guards carry no information through a comparison.
    pub fn compare(self, literal: bool, equal: bool) -> GuardState {
        if !self.is_guard() {
            return GuardState::None;
        }
        if literal == equal {
            self
        } else {
            self.negate()
        }
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardState::None => write!(f, "none"),
            GuardState::Asynchronous => write!(f, "asynchronous"),
            GuardState::PositiveGuard => write!(f, "positive-guard"),
            GuardState::NegativeGuard => write!(f, "negative-guard"),
        }
    }
}
