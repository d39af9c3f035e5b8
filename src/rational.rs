//! Exact rational reduction over unbounded integers.
//!
//! Everything here is integer arithmetic on [`BigUint`]: concept values are
//! products of many discrete factors and overflow silently in fixed-width
//! types, so no floating point enters until [`Simplicity::as_f64`].

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::RationalError;

/// Result type for rational operations.
pub type RationalResult<T> = std::result::Result<T, RationalError>;

/// A non-negative ratio in lowest terms.
///
/// The denominator is always non-zero; a zero numerator is stored as `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ratio {
    numerator: BigUint,
    denominator: BigUint,
}

impl Ratio {
    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    /// Split into `(numerator, denominator)`.
    pub fn into_parts(self) -> (BigUint, BigUint) {
        (self.numerator, self.denominator)
    }

    /// Simplicity of the relation these terms describe as coefficients `a/b`.
    pub fn simplicity(&self) -> Simplicity {
        Simplicity::from_coefficients(&self.numerator, &self.denominator)
    }

    /// True if the ratio is a whole number.
    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Reduce `numerator / denominator` to co-prime terms with the same ratio.
pub fn reduce(numerator: &BigUint, denominator: &BigUint) -> RationalResult<Ratio> {
    if denominator.is_zero() {
        return Err(RationalError::DivisionByZero {
            numerator: numerator.to_string(),
        });
    }
    if numerator.is_zero() {
        return Ok(Ratio {
            numerator: BigUint::zero(),
            denominator: BigUint::one(),
        });
    }
    let g = numerator.gcd(denominator);
    Ok(Ratio {
        numerator: numerator / &g,
        denominator: denominator / &g,
    })
}

/// GCD of every value in the slice. `gcd_all(&[])` and an all-zero slice give 0.
pub fn gcd_all(values: &[BigUint]) -> BigUint {
    values
        .iter()
        .fold(BigUint::zero(), |acc, v| acc.gcd(v))
}

/// Simplicity `K = 1/(a·b)` of a relation with coefficients `(a, b)`.
///
/// Kept exact so that the permutation search compares candidates without
/// rounding. `Zero` is the explicit value for `a = 0`, where `1/(a·b)` is
/// undefined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Simplicity {
    Zero,
    /// `1/n` with `n >= 1`.
    Reciprocal(BigUint),
}

impl Simplicity {
    pub fn from_coefficients(a: &BigUint, b: &BigUint) -> Self {
        if a.is_zero() || b.is_zero() {
            Simplicity::Zero
        } else {
            Simplicity::Reciprocal(a * b)
        }
    }

    /// `K = 1`: the relation needs no balancing coefficients.
    pub fn is_exact(&self) -> bool {
        matches!(self, Simplicity::Reciprocal(n) if n.is_one())
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Simplicity::Zero => 0.0,
            Simplicity::Reciprocal(n) => n.to_f64().map(|d| 1.0 / d).unwrap_or(0.0),
        }
    }
}

impl Ord for Simplicity {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Simplicity::Zero, Simplicity::Zero) => Ordering::Equal,
            (Simplicity::Zero, _) => Ordering::Less,
            (_, Simplicity::Zero) => Ordering::Greater,
            // Smaller product, larger K.
            (Simplicity::Reciprocal(a), Simplicity::Reciprocal(b)) => b.cmp(a),
        }
    }
}

impl PartialOrd for Simplicity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Simplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Simplicity::Zero => write!(f, "0"),
            Simplicity::Reciprocal(n) if n.is_one() => write!(f, "1"),
            Simplicity::Reciprocal(n) => write!(f, "1/{n}"),
        }
    }
}
