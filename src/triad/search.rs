//! Permutation search: the simplest role order for one observation.
//!
//! Every one of the 24 assignments of the four labelled values to the roles
//! `(C1, C2, C3, C4)` is solved with [`QuadrupleSolver`]; the assignment with
//! the largest simplicity K wins. Ties go to the first order in the fixed
//! lexicographic enumeration, so the search is deterministic and the
//! parallel variant picks the same winner as the serial one.

use rayon::prelude::*;

use crate::error::DiscoveryError;

use super::solver::QuadrupleSolver;
use super::{Discovery, Quadruple, Relation};

/// All 24 orders of `[0, 1, 2, 3]`, lexicographic.
pub fn role_orders() -> [[usize; 4]; 24] {
    let mut orders = [[0usize; 4]; 24];
    let mut n = 0;
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                for l in 0..4 {
                    if i != j && i != k && i != l && j != k && j != l && k != l {
                        orders[n] = [i, j, k, l];
                        n += 1;
                    }
                }
            }
        }
    }
    orders
}

/// Stateless searcher over role orders.
pub struct PermutationSearcher;

impl PermutationSearcher {
    /// Best role order, or `None` if every order is invalid.
    pub fn search(quadruple: &Quadruple) -> Option<Discovery> {
        let mut best: Option<Discovery> = None;
        for order in role_orders() {
            let Some(candidate) = Self::evaluate(quadruple, order) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => candidate.simplicity() > current.simplicity(),
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }

    /// Same result as [`search`](Self::search), evaluating orders with rayon.
    pub fn search_par(quadruple: &Quadruple) -> Option<Discovery> {
        let orders = role_orders();
        orders
            .par_iter()
            .enumerate()
            .filter_map(|(rank, order)| Self::evaluate(quadruple, *order).map(|d| (rank, d)))
            .reduce_with(|x, y| {
                let y_wins = match y.1.simplicity().cmp(x.1.simplicity()) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => y.0 < x.0,
                };
                if y_wins { y } else { x }
            })
            .map(|(_, discovery)| discovery)
    }

    fn evaluate(quadruple: &Quadruple, order: [usize; 4]) -> Option<Discovery> {
        let ordered = quadruple.permuted(order);
        match QuadrupleSolver::discover_ordered(ordered.values()) {
            Ok(balance) => {
                let relation = Relation::new(ordered.labels().clone(), balance.a, balance.b);
                Some(Discovery {
                    relation,
                    values: ordered.values().clone(),
                    permutation: order,
                })
            }
            Err(DiscoveryError::InvalidInput { reason }) => {
                tracing::debug!(?order, %reason, "skipping role order");
                None
            }
            Err(e) => {
                tracing::debug!(?order, error = %e, "role order failed");
                None
            }
        }
    }
}
