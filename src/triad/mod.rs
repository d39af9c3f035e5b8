//! Triads: balanced four-quantity multiplicative relations.
//!
//! A triad over the ordered quantities `(C1, C2, C3, C4)` carries minimal
//! co-prime coefficients `(a, b)` with
//!
//! ```text
//! a · C2 · C3 = b · C1 · C4
//! ```
//!
//! - [`solver`]: the exact integer core for one fixed role order
//! - [`search`]: the 24-permutation search for the simplest role order

pub mod search;
pub mod solver;

use std::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::rational::Simplicity;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Position of a quantity inside a triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    C1,
    C2,
    C3,
    C4,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::C1, Role::C2, Role::C3, Role::C4];

    pub fn index(self) -> usize {
        match self {
            Role::C1 => 0,
            Role::C2 => 1,
            Role::C3 => 2,
            Role::C4 => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.index() + 1)
    }
}

/// A raw observed value, as handed over by an upstream extractor.
///
/// Only non-negative whole numbers are usable; everything else is rejected
/// with [`DiscoveryError::InvalidInput`] when converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedValue {
    Integer(i64),
    /// Whole numbers above `i64::MAX`; tried before `Float` so they stay exact.
    Unsigned(u64),
    Float(f64),
    /// Decimal digits, for values too large for a TOML/JSON integer.
    Text(String),
}

impl ObservedValue {
    pub fn to_biguint(&self) -> DiscoveryResult<BigUint> {
        match self {
            ObservedValue::Integer(v) => u64::try_from(*v)
                .map(BigUint::from)
                .map_err(|_| DiscoveryError::invalid(format!("negative value {v}"))),
            ObservedValue::Unsigned(v) => Ok(BigUint::from(*v)),
            ObservedValue::Float(v) => {
                if !v.is_finite() || v.fract() != 0.0 {
                    return Err(DiscoveryError::invalid(format!("non-integer value {v}")));
                }
                if *v < 0.0 {
                    return Err(DiscoveryError::invalid(format!("negative value {v}")));
                }
                // Whole, finite and non-negative: the u128 path covers every
                // float below 2^128, larger ones go through their decimal form.
                match v.to_u128() {
                    Some(n) => Ok(BigUint::from(n)),
                    None => format!("{v:.0}")
                        .parse::<BigUint>()
                        .map_err(|e| DiscoveryError::invalid(format!("value {v}: {e}"))),
                }
            }
            ObservedValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.starts_with('-') {
                    return Err(DiscoveryError::invalid(format!("negative value {trimmed}")));
                }
                trimmed
                    .parse::<BigUint>()
                    .map_err(|_| DiscoveryError::invalid(format!("\"{trimmed}\" is not an integer")))
            }
        }
    }
}

impl From<u64> for ObservedValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => ObservedValue::Integer(i),
            Err(_) => ObservedValue::Unsigned(v),
        }
    }
}

/// Four observed values paired with the labels of the quantities they measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadruple {
    values: [BigUint; 4],
    labels: [String; 4],
}

impl Quadruple {
    pub fn new(values: [BigUint; 4], labels: [String; 4]) -> Self {
        Self { values, labels }
    }

    /// Convenience constructor for small literal observations.
    pub fn from_u64(values: [u64; 4], labels: [&str; 4]) -> Self {
        Self {
            values: values.map(BigUint::from),
            labels: labels.map(str::to_string),
        }
    }

    /// Build from untyped upstream input, checking arity and value domain.
    pub fn from_observed(values: &[ObservedValue], labels: &[String]) -> DiscoveryResult<Self> {
        if values.len() != 4 || labels.len() != 4 {
            return Err(DiscoveryError::invalid(format!(
                "expected 4 values and 4 labels, got {} and {}",
                values.len(),
                labels.len()
            )));
        }
        let converted = values
            .iter()
            .map(ObservedValue::to_biguint)
            .collect::<DiscoveryResult<Vec<_>>>()?;
        let values: [BigUint; 4] = converted
            .try_into()
            .map_err(|_| DiscoveryError::invalid("expected exactly 4 values"))?;
        let labels: [String; 4] = [
            labels[0].clone(),
            labels[1].clone(),
            labels[2].clone(),
            labels[3].clone(),
        ];
        Ok(Self { values, labels })
    }

    pub fn values(&self) -> &[BigUint; 4] {
        &self.values
    }

    pub fn labels(&self) -> &[String; 4] {
        &self.labels
    }

    /// Reorder values and labels together: position `i` takes entry `order[i]`.
    pub fn permuted(&self, order: [usize; 4]) -> Self {
        Self {
            values: order.map(|i| self.values[i].clone()),
            labels: order.map(|i| self.labels[i].clone()),
        }
    }
}

/// An accepted (or acceptable) triad over labelled quantities.
///
/// Immutable once built: the graph hands out clones, never mutable access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    labels: [String; 4],
    a: BigUint,
    b: BigUint,
    simplicity: Simplicity,
}

impl Relation {
    pub fn new(labels: [String; 4], a: BigUint, b: BigUint) -> Self {
        let simplicity = Simplicity::from_coefficients(&a, &b);
        Self {
            labels,
            a,
            b,
            simplicity,
        }
    }

    pub fn labels(&self) -> &[String; 4] {
        &self.labels
    }

    pub fn label(&self, role: Role) -> &str {
        &self.labels[role.index()]
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn simplicity(&self) -> &Simplicity {
        &self.simplicity
    }

    /// Simplicity as a float, for thresholds and display.
    pub fn k(&self) -> f64 {
        self.simplicity.as_f64()
    }

    /// The `[C1, C2, C3]` labels that identify a relation's branch node.
    pub fn branch_labels(&self) -> [String; 3] {
        [self.labels[0].clone(), self.labels[1].clone(), self.labels[2].clone()]
    }

    /// Display label of the branch node: `"C1,C2,C3"`.
    pub fn branch_key(&self) -> String {
        format!("{},{},{}", self.labels[0], self.labels[1], self.labels[2])
    }

    /// Printable form `C1·C4 = a/b·C2·C3`.
    pub fn equation(&self) -> String {
        let [c1, c2, c3, c4] = &self.labels;
        format!("{c1}·{c4} = {}/{}·{c2}·{c3}", self.a, self.b)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (K={})", self.equation(), self.simplicity)
    }
}

/// The winning role order for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The relation over the reordered labels.
    pub relation: Relation,
    /// Observed values in the winning role order.
    pub values: [BigUint; 4],
    /// `permutation[i]` is the input position placed in role `C(i+1)`.
    pub permutation: [usize; 4],
}

impl Discovery {
    pub fn k(&self) -> f64 {
        self.relation.k()
    }

    pub fn simplicity(&self) -> &Simplicity {
        self.relation.simplicity()
    }
}
