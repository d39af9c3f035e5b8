//! The exact integer core: balancing coefficients for one fixed role order.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::DiscoveryError;
use crate::rational::{self, Simplicity};

use super::DiscoveryResult;

/// Coefficients `(a, b)` balancing one ordered quadruple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub a: BigUint,
    pub b: BigUint,
    pub simplicity: Simplicity,
    /// Shared GCD divided out of the inputs before solving.
    pub gcd: BigUint,
}

/// A fourth quantity produced from three inputs and known coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub c4: BigUint,
    pub simplicity: Simplicity,
}

/// Stateless solver for `a · C2 · C3 = b · C1 · C4`.
pub struct QuadrupleSolver;

impl QuadrupleSolver {
    /// Minimal co-prime `(a, b)` with `a/b = (C1·C4)/(C2·C3)`.
    ///
    /// The four inputs are first divided by their shared GCD. Fails with
    /// [`DiscoveryError::InvalidInput`] when C2 or C3 is zero afterwards.
    pub fn discover(
        c1: &BigUint,
        c2: &BigUint,
        c3: &BigUint,
        c4: &BigUint,
    ) -> DiscoveryResult<Balance> {
        let mut gcd = rational::gcd_all(&[c1.clone(), c2.clone(), c3.clone(), c4.clone()]);
        if gcd.is_zero() {
            gcd = BigUint::one();
        }
        let (c1n, c2n, c3n, c4n) = (c1 / &gcd, c2 / &gcd, c3 / &gcd, c4 / &gcd);

        if c2n.is_zero() || c3n.is_zero() {
            return Err(DiscoveryError::invalid(
                "C2 or C3 is zero after normalization",
            ));
        }

        let ratio = rational::reduce(&(c1n * c4n), &(c2n * c3n))?;
        let simplicity = ratio.simplicity();
        let (a, b) = ratio.into_parts();
        Ok(Balance {
            a,
            b,
            simplicity,
            gcd,
        })
    }

    /// [`discover`](Self::discover) over a value array in role order.
    pub fn discover_ordered(values: &[BigUint; 4]) -> DiscoveryResult<Balance> {
        let [c1, c2, c3, c4] = values;
        Self::discover(c1, c2, c3, c4)
    }

    /// Generative mode: `C4 = a·C2·C3 / (b·C1)`, which must come out whole.
    pub fn generate(
        c1: &BigUint,
        c2: &BigUint,
        c3: &BigUint,
        a: &BigUint,
        b: &BigUint,
    ) -> DiscoveryResult<Generated> {
        if b.is_zero() || c1.is_zero() {
            return Err(DiscoveryError::invalid(
                "division by zero in generative mode (b or C1 is zero)",
            ));
        }
        let numerator = a * c2 * c3;
        let denominator = b * c1;
        let (c4, remainder) = numerator.div_rem(&denominator);
        if !remainder.is_zero() {
            return Err(DiscoveryError::IrreducibleResult {
                numerator: numerator.to_string(),
                denominator: denominator.to_string(),
            });
        }
        Ok(Generated {
            c4,
            simplicity: Simplicity::from_coefficients(a, b),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn discover(c: [u64; 4]) -> DiscoveryResult<Balance> {
        QuadrupleSolver::discover(&big(c[0]), &big(c[1]), &big(c[2]), &big(c[3]))
    }

    #[test]
    fn newton_second_law_is_exact() {
        // F = m·a with F=20, m=10, a=2: F·1 = m·a
        let bal = discover([20, 10, 2, 1]).unwrap();
        assert_eq!((bal.a.clone(), bal.b.clone()), (big(1), big(1)));
        assert!(bal.simplicity.is_exact());
        assert_eq!(bal.gcd, big(1));
    }

    #[test]
    fn coefficients_are_coprime_and_normalised() {
        let bal = discover([40, 20, 6, 4]).unwrap();
        // 40·4 / (20·6) = 160/120 = 4/3
        assert_eq!((bal.a.clone(), bal.b.clone()), (big(4), big(3)));
        assert_eq!(bal.gcd, big(2));
        assert_eq!(bal.simplicity.to_string(), "1/12");
    }

    #[test]
    fn zero_divisor_roles_are_invalid() {
        assert!(matches!(
            discover([5, 0, 3, 2]),
            Err(DiscoveryError::InvalidInput { .. })
        ));
        assert!(matches!(
            discover([5, 3, 0, 2]),
            Err(DiscoveryError::InvalidInput { .. })
        ));
        assert!(matches!(
            discover([0, 0, 0, 0]),
            Err(DiscoveryError::InvalidInput { .. })
        ));
    }

    #[test]
    fn zero_product_gives_zero_simplicity() {
        let bal = discover([0, 4, 6, 9]).unwrap();
        assert_eq!(bal.a, big(0));
        assert_eq!(bal.b, big(1));
        assert_eq!(bal.simplicity, Simplicity::Zero);
    }

    #[test]
    fn balancing_identity_holds_exactly() {
        for c1 in 0..7u64 {
            for c2 in 1..7u64 {
                for c3 in 1..7u64 {
                    for c4 in 0..7u64 {
                        let bal = discover([c1, c2, c3, c4]).unwrap();
                        assert_eq!(
                            &bal.a * big(c2) * big(c3),
                            &bal.b * big(c1) * big(c4),
                            "({c1}, {c2}, {c3}, {c4})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn large_products_do_not_overflow() {
        // Products of the first primes exceed u64 quickly.
        let primes: [u64; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
        let p: BigUint = primes.iter().map(|&p| big(p)).product();
        let q = &p * big(53) * big(59);
        let bal = QuadrupleSolver::discover(&q, &p, &(big(53) * big(59)), &big(1)).unwrap();
        assert!(bal.simplicity.is_exact());
    }

    #[test]
    fn generate_produces_integer_fourth() {
        let g = QuadrupleSolver::generate(&big(1), &big(10), &big(2), &big(1), &big(1)).unwrap();
        assert_eq!(g.c4, big(20));
        assert!(g.simplicity.is_exact());
    }

    #[test]
    fn generate_rejects_irreducible_and_zero_divisor() {
        let err = QuadrupleSolver::generate(&big(3), &big(5), &big(2), &big(1), &big(1)).unwrap_err();
        assert!(matches!(err, DiscoveryError::IrreducibleResult { .. }));

        let err = QuadrupleSolver::generate(&big(0), &big(5), &big(2), &big(1), &big(1)).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput { .. }));

        let err = QuadrupleSolver::generate(&big(3), &big(5), &big(2), &big(1), &big(0)).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput { .. }));
    }
}
