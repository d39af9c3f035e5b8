//! Dimensional guard: unit consistency of candidate relations.
//!
//! Physical dimensions are exponent vectors over the fixed basis
//! mass, length, time, current, temperature (`M, L, T, I, Θ`); multiplying
//! quantities adds their vectors. A relation `C1·C4 = a/b·C2·C3` is balanced
//! when `dim(C1) + dim(C4) == dim(C2) + dim(C3)`.
//!
//! The guard is permissive on unknown labels: if any of the four labels has
//! no entry in the [`UnitTable`], the relation passes. Unit checking augments
//! discovery, it never blocks a relation it cannot judge.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Div, Mul};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Names of the basis dimensions, in vector order.
pub const BASIS: [&str; 5] = ["M", "L", "T", "I", "Θ"];

/// Exponent vector over `[M, L, T, I, Θ]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimension(pub [i32; 5]);

impl Dimension {
    pub const ONE: Dimension = Dimension([0, 0, 0, 0, 0]);
    pub const MASS: Dimension = Dimension([1, 0, 0, 0, 0]);
    pub const LENGTH: Dimension = Dimension([0, 1, 0, 0, 0]);
    pub const TIME: Dimension = Dimension([0, 0, 1, 0, 0]);
    pub const CURRENT: Dimension = Dimension([0, 0, 0, 1, 0]);
    pub const TEMPERATURE: Dimension = Dimension([0, 0, 0, 0, 1]);

    pub fn powi(self, power: i32) -> Dimension {
        Dimension(self.0.map(|e| e * power))
    }

    pub fn is_dimensionless(self) -> bool {
        self == Dimension::ONE
    }
}

impl Mul for Dimension {
    type Output = Dimension;

    fn mul(self, rhs: Dimension) -> Dimension {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o += r;
        }
        Dimension(out)
    }
}

impl Div for Dimension {
    type Output = Dimension;

    fn div(self, rhs: Dimension) -> Dimension {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "[1]");
        }
        for (name, exp) in BASIS.iter().zip(self.0) {
            match exp {
                0 => {}
                1 => write!(f, "[{name}]")?,
                _ => write!(f, "[{name}]^{exp}")?,
            }
        }
        Ok(())
    }
}

/// Derived dimensions used by the built-in table.
pub mod derived {
    use super::Dimension;

    pub fn acceleration() -> Dimension {
        Dimension::LENGTH / Dimension::TIME.powi(2)
    }

    pub fn velocity_squared() -> Dimension {
        (Dimension::LENGTH / Dimension::TIME).powi(2)
    }

    pub fn force() -> Dimension {
        Dimension::MASS * acceleration()
    }

    pub fn energy() -> Dimension {
        force() * Dimension::LENGTH
    }

    pub fn volt() -> Dimension {
        energy() / (Dimension::CURRENT * Dimension::TIME)
    }

    pub fn ohm() -> Dimension {
        volt() / Dimension::CURRENT
    }
}

/// Immutable label → dimension map, built once and shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTable {
    entries: HashMap<String, Dimension>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classical-mechanics and circuit quantities.
    pub fn physics() -> Self {
        use self::derived::*;
        let energy = energy();
        let entries = [
            ("1", Dimension::ONE),
            ("m", Dimension::MASS),
            ("m1", Dimension::MASS),
            ("m2", Dimension::MASS),
            ("a", acceleration()),
            ("F", force()),
            ("d", Dimension::LENGTH),
            ("x", Dimension::LENGTH),
            ("r", Dimension::LENGTH),
            ("W", energy),
            ("KE", energy),
            ("PE", energy),
            ("2KE", energy),
            ("E_total", energy),
            ("v2", velocity_squared()),
            ("V", volt()),
            ("I", Dimension::CURRENT),
            ("R", ohm()),
            ("k", force() / Dimension::LENGTH),
            (
                "G",
                Dimension::LENGTH.powi(3) / (Dimension::MASS * Dimension::TIME.powi(2)),
            ),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(label, dim)| (label.to_string(), dim))
                .collect(),
        }
    }

    /// Add or replace entries, returning the extended table.
    pub fn with_entries(mut self, extra: impl IntoIterator<Item = (String, Dimension)>) -> Self {
        self.entries.extend(extra);
        self
    }

    pub fn get(&self, label: &str) -> Option<Dimension> {
        self.entries.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by label.
    pub fn entries(&self) -> Vec<(&str, Dimension)> {
        let mut out: Vec<(&str, Dimension)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

/// Unit-consistency check applied to a winning role order.
#[derive(Debug, Clone, Default)]
pub struct DimensionalGuard {
    table: Option<Arc<UnitTable>>,
}

impl DimensionalGuard {
    /// A guard with no table: every relation passes.
    pub fn permissive() -> Self {
        Self { table: None }
    }

    pub fn new(table: Arc<UnitTable>) -> Self {
        Self { table: Some(table) }
    }

    pub fn table(&self) -> Option<&UnitTable> {
        self.table.as_deref()
    }

    /// `dim(C1)·dim(C4) == dim(C2)·dim(C3)`, or `true` if any label is unmapped.
    pub fn is_balanced<S: AsRef<str>>(&self, labels: &[S; 4]) -> bool {
        let Some(table) = &self.table else {
            return true;
        };
        let dims: Vec<Dimension> = labels
            .iter()
            .filter_map(|l| table.get(l.as_ref()))
            .collect();
        let &[u1, u2, u3, u4] = dims.as_slice() else {
            return true;
        };
        u1 * u4 == u2 * u3
    }
}
