//! Fixed-point inference over the relation graph and additive laws.
//!
//! Starting from a set of known values, the engine repeatedly binds every
//! label that exactly one relation or law determines, until the target is
//! known, nothing changes, or the step budget runs out. Values are `f64`;
//! the integer world ends at discovery.

pub mod engine;

use std::fmt;

use serde::Serialize;

use crate::triad::Role;

pub use engine::{InferResult, InferenceEngine};

/// Step budget used when a query does not name one.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Label of the multiplicative identity, known as 1.0 in every solve.
pub const UNIT_LABEL: &str = "1";

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveOutcome {
    /// The target is known.
    Resolved,
    /// An iteration bound nothing new; the target stays unknown.
    Stalled,
    /// The step budget ran out before the target was bound.
    BudgetExhausted,
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveOutcome::Resolved => "resolved",
            SolveOutcome::Stalled => "stalled",
            SolveOutcome::BudgetExhausted => "budget exhausted",
        };
        f.write_str(s)
    }
}

/// Why a label became known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum DerivationKind {
    /// Supplied by the caller.
    Seed,
    /// The identity [`UNIT_LABEL`], seeded before the first step.
    Unit,
    /// The label is itself a number.
    Literal,
    /// Rearranged from a relation, solving for `role`.
    Multiplicative { equation: String, role: Role },
    /// Total of an additive law from all of its parts.
    AdditiveSum { law: String },
    /// Missing part of an additive law from its total and the other parts.
    AdditiveDifference { law: String },
}

impl fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationKind::Seed => f.write_str("seed"),
            DerivationKind::Unit => f.write_str("unit"),
            DerivationKind::Literal => f.write_str("literal"),
            DerivationKind::Multiplicative { equation, role } => write!(f, "{equation} [{role}]"),
            DerivationKind::AdditiveSum { law } => write!(f, "sum of \"{law}\""),
            DerivationKind::AdditiveDifference { law } => write!(f, "difference in \"{law}\""),
        }
    }
}

/// One binding made during a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub label: String,
    pub value: f64,
    /// Iteration that produced the binding; seeds are step 0.
    pub step: usize,
    pub kind: DerivationKind,
}

/// Full account of one solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub target: String,
    pub value: Option<f64>,
    /// Iteration in which the solve terminated.
    pub iterations: usize,
    pub outcome: SolveOutcome,
    /// Bindings in the order they were made.
    pub derivations: Vec<Derivation>,
}

impl SolveReport {
    pub fn is_resolved(&self) -> bool {
        self.outcome == SolveOutcome::Resolved
    }

    /// The derivation that bound `label`, if any.
    pub fn derivation_of(&self, label: &str) -> Option<&Derivation> {
        self.derivations.iter().find(|d| d.label == label)
    }
}
