//! Inference engine: multiplicative rearrangement + additive closure.
//!
//! Each iteration runs two passes over read-only inputs:
//!
//! 1. **Multiplicative**: for every relation, bind numerically literal labels,
//!    then solve the one unknown role if exactly one role is unknown.
//! 2. **Additive**: for every law, sum the parts into an unknown total, or
//!    recover the single missing part from a known total.
//!
//! Bindings are never overwritten, so the known set only grows and the loop
//! reaches a fixed point within one iteration per distinct label.

use std::collections::HashMap;
use std::sync::Arc;

use num_traits::ToPrimitive;

use crate::additive::{AdditiveLaw, AdditiveLawRegistry};
use crate::error::InferError;
use crate::graph::{RelationGraph, parse_literal};
use crate::triad::{Relation, Role};

use super::{Derivation, DerivationKind, SolveOutcome, SolveReport, UNIT_LABEL};

/// Result type for inference operations.
pub type InferResult<T> = std::result::Result<T, InferError>;

/// Stateless inference engine. Per-solve state lives in [`SolveContext`].
pub struct InferenceEngine {
    graph: Arc<RelationGraph>,
    laws: Arc<AdditiveLawRegistry>,
}

/// Per-solve mutable state: the known-value set and its bindings log.
struct SolveContext {
    known: HashMap<String, f64>,
    derivations: Vec<Derivation>,
}

impl SolveContext {
    /// Seeds are the caller's inputs plus `"1" = 1.0`, which overrides any
    /// input of the same name.
    fn new(inputs: &HashMap<String, f64>) -> Self {
        let mut seeds: Vec<(&String, &f64)> = inputs
            .iter()
            .filter(|(label, _)| label.as_str() != UNIT_LABEL)
            .collect();
        seeds.sort_by(|a, b| a.0.cmp(b.0));
        let mut derivations: Vec<Derivation> = seeds
            .into_iter()
            .map(|(label, &value)| Derivation {
                label: label.clone(),
                value,
                step: 0,
                kind: DerivationKind::Seed,
            })
            .collect();
        derivations.push(Derivation {
            label: UNIT_LABEL.to_string(),
            value: 1.0,
            step: 0,
            kind: DerivationKind::Unit,
        });

        let mut known = inputs.clone();
        known.insert(UNIT_LABEL.to_string(), 1.0);
        Self { known, derivations }
    }

    fn get(&self, label: &str) -> Option<f64> {
        self.known.get(label).copied()
    }

    fn is_known(&self, label: &str) -> bool {
        self.known.contains_key(label)
    }

    /// Bind `label` unless it is already known. Returns true on a new binding.
    fn bind(&mut self, label: &str, value: f64, step: usize, kind: DerivationKind) -> bool {
        if self.is_known(label) {
            return false;
        }
        tracing::debug!(step, label, value, via = %kind, "deduced");
        self.known.insert(label.to_string(), value);
        self.derivations.push(Derivation {
            label: label.to_string(),
            value,
            step,
            kind,
        });
        true
    }
}

impl InferenceEngine {
    pub fn new(graph: Arc<RelationGraph>, laws: Arc<AdditiveLawRegistry>) -> Self {
        Self { graph, laws }
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn laws(&self) -> &AdditiveLawRegistry {
        &self.laws
    }

    /// Value of `target` given `inputs`, or `None` if it cannot be deduced
    /// within `max_steps` iterations.
    pub fn solve(&self, inputs: &HashMap<String, f64>, target: &str, max_steps: usize) -> Option<f64> {
        self.solve_traced(inputs, target, max_steps).value
    }

    /// Like [`solve`](Self::solve), but reports how the value was reached.
    pub fn solve_traced(
        &self,
        inputs: &HashMap<String, f64>,
        target: &str,
        max_steps: usize,
    ) -> SolveReport {
        let relations = self.graph.relations();
        let mut ctx = SolveContext::new(inputs);
        let mut iterations = 0;
        let mut stalled = false;

        for step in 1..=max_steps {
            iterations = step;
            if ctx.is_known(target) {
                break;
            }

            let mut changed = false;
            for relation in &relations {
                changed |= self.multiplicative_step(&mut ctx, relation, step);
            }
            for law in self.laws.iter() {
                changed |= additive_step(&mut ctx, law, step);
            }

            if !changed {
                stalled = true;
                break;
            }
        }

        let value = ctx.get(target);
        let outcome = match (value, stalled) {
            (Some(_), _) => SolveOutcome::Resolved,
            (None, true) => SolveOutcome::Stalled,
            (None, false) => SolveOutcome::BudgetExhausted,
        };
        tracing::info!(label = target, %outcome, steps = iterations, ?value, "solve finished");

        SolveReport {
            target: target.to_string(),
            value,
            iterations,
            outcome,
            derivations: ctx.derivations,
        }
    }

    /// Bind literal labels of `relation`, then solve its single unknown role.
    fn multiplicative_step(&self, ctx: &mut SolveContext, relation: &Relation, step: usize) -> bool {
        let mut changed = false;
        for label in relation.labels() {
            if let Some(value) = parse_literal(label) {
                changed |= ctx.bind(label, value, step, DerivationKind::Literal);
            }
        }

        let mut unknown = Role::ALL
            .into_iter()
            .filter(|&role| !ctx.is_known(relation.label(role)));
        let (Some(role), None) = (unknown.next(), unknown.next()) else {
            return changed;
        };

        match solve_role(relation, role, |label| ctx.get(label)) {
            Ok(value) => {
                let kind = DerivationKind::Multiplicative {
                    equation: relation.equation(),
                    role,
                };
                changed |= ctx.bind(relation.label(role), value, step, kind);
            }
            Err(err) => {
                tracing::debug!(step, equation = %relation.equation(), %err, "relation skipped");
            }
        }
        changed
    }
}

/// Both additive branches for one law.
fn additive_step(ctx: &mut SolveContext, law: &AdditiveLaw, step: usize) -> bool {
    let mut changed = false;

    if !ctx.is_known(&law.total) && law.parts.iter().all(|p| ctx.is_known(p)) {
        let total: f64 = law.parts.iter().filter_map(|p| ctx.get(p)).sum();
        changed |= ctx.bind(
            &law.total,
            total,
            step,
            DerivationKind::AdditiveSum {
                law: law.name.clone(),
            },
        );
    }

    if let Some(total) = ctx.get(&law.total) {
        let mut missing = law.parts.iter().filter(|p| !ctx.is_known(p));
        if let (Some(part), None) = (missing.next(), missing.next()) {
            let known_sum: f64 = law.parts.iter().filter_map(|p| ctx.get(p)).sum();
            changed |= ctx.bind(
                part,
                total - known_sum,
                step,
                DerivationKind::AdditiveDifference {
                    law: law.name.clone(),
                },
            );
        }
    }
    changed
}

/// Rearrange `a·C2·C3 = b·C1·C4` for `role`, reading the other three values
/// through `value_of`.
///
/// - `C1 = a·C2·C3 / (b·C4)`
/// - `C4 = a·C2·C3 / (b·C1)`
/// - `C2 = b·C1·C4 / (a·C3)`
/// - `C3 = b·C1·C4 / (a·C2)`
pub fn solve_role(
    relation: &Relation,
    role: Role,
    value_of: impl Fn(&str) -> Option<f64>,
) -> InferResult<f64> {
    let a = relation.a().to_f64().unwrap_or(f64::INFINITY);
    let b = relation.b().to_f64().unwrap_or(f64::INFINITY);
    let v = |r: Role| value_of(relation.label(r)).unwrap_or(f64::NAN);

    let (numerator, divisor) = match role {
        Role::C1 => (a * v(Role::C2) * v(Role::C3), b * v(Role::C4)),
        Role::C4 => (a * v(Role::C2) * v(Role::C3), b * v(Role::C1)),
        Role::C2 => (b * v(Role::C1) * v(Role::C4), a * v(Role::C3)),
        Role::C3 => (b * v(Role::C1) * v(Role::C4), a * v(Role::C2)),
    };
    if divisor == 0.0 {
        return Err(InferError::DivisionByZero {
            label: relation.label(role).to_string(),
        });
    }
    Ok(numerator / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_MIN_K;
    use crate::infer::DEFAULT_MAX_STEPS;
    use crate::triad::Quadruple;

    fn inputs(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn engine_with(observations: &[([u64; 4], [&str; 4])], laws: AdditiveLawRegistry) -> InferenceEngine {
        let graph = RelationGraph::new();
        for (values, labels) in observations {
            assert!(graph.add_relation(&Quadruple::from_u64(*values, *labels), DEFAULT_MIN_K).is_accepted());
        }
        InferenceEngine::new(Arc::new(graph), Arc::new(laws))
    }

    fn relation(labels: [&str; 4], a: u32, b: u32) -> Relation {
        Relation::new(labels.map(str::to_string), a.into(), b.into())
    }

    #[test]
    fn chains_two_relations() {
        let engine = engine_with(
            &[
                ([20, 10, 2, 1], ["F", "m", "a", "1"]),
                ([50, 5, 10, 1], ["W", "F", "d", "1"]),
            ],
            AdditiveLawRegistry::new(),
        );
        let report = engine.solve_traced(&inputs(&[("m", 10.0), ("a", 2.0), ("d", 5.0)]), "W", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(100.0));
        assert_eq!(report.outcome, SolveOutcome::Resolved);
        assert!(report.iterations <= 2);

        let f = report.derivation_of("F").unwrap();
        assert_eq!(f.value, 20.0);
        assert!(matches!(f.kind, DerivationKind::Multiplicative { role: Role::C1, .. }));
        assert_eq!(report.derivation_of("1").unwrap().kind, DerivationKind::Unit);
        assert_eq!(report.derivation_of("m").unwrap().kind, DerivationKind::Seed);
    }

    #[test]
    fn known_target_returns_immediately() {
        let engine = engine_with(&[], AdditiveLawRegistry::new());
        let report = engine.solve_traced(&inputs(&[("x", 4.0)]), "x", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(4.0));
        assert_eq!(report.iterations, 1);
        // the input and the unit seed
        assert_eq!(report.derivations.len(), 2);
    }

    #[test]
    fn unreachable_target_stalls() {
        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        let report = engine.solve_traced(&inputs(&[("m", 10.0)]), "F", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, None);
        assert_eq!(report.outcome, SolveOutcome::Stalled);
        // "1" is seeded, so the first iteration already finds nothing new
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn zero_budget_only_checks_inputs() {
        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        let report = engine.solve_traced(&inputs(&[("m", 10.0), ("a", 2.0)]), "F", 0);
        assert_eq!(report.value, None);
        assert_eq!(report.outcome, SolveOutcome::BudgetExhausted);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn energy_conservation_sums_and_differences() {
        let engine = engine_with(&[], AdditiveLawRegistry::with_builtin());
        assert_eq!(
            engine.solve(&inputs(&[("KE", 25.0), ("PE", 200.0)]), "E_total", DEFAULT_MAX_STEPS),
            Some(225.0)
        );

        let report = engine.solve_traced(&inputs(&[("KE", 25.0), ("E_total", 225.0)]), "PE", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(200.0));
        assert!(matches!(
            report.derivation_of("PE").unwrap().kind,
            DerivationKind::AdditiveDifference { .. }
        ));
    }

    #[test]
    fn multiplicative_round_trip() {
        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        assert_eq!(engine.solve(&inputs(&[("m", 2.0), ("a", 3.0)]), "F", DEFAULT_MAX_STEPS), Some(6.0));
        assert_eq!(engine.solve(&inputs(&[("F", 6.0), ("a", 3.0)]), "m", DEFAULT_MAX_STEPS), Some(2.0));
    }

    #[test]
    fn additive_round_trip() {
        let mut laws = AdditiveLawRegistry::new();
        laws.register(AdditiveLaw::new("pair", ["p1", "p2"], "t")).unwrap();
        let engine = engine_with(&[], laws);
        assert_eq!(engine.solve(&inputs(&[("p1", 3.0), ("p2", 4.0)]), "t", DEFAULT_MAX_STEPS), Some(7.0));
        assert_eq!(engine.solve(&inputs(&[("t", 7.0), ("p1", 3.0)]), "p2", DEFAULT_MAX_STEPS), Some(4.0));
    }

    #[test]
    fn chain_terminates_within_label_count() {
        // x1 → x2 → … → x6 with x_{i+1} = two · x_i
        let graph = RelationGraph::new();
        for i in 1..6u64 {
            let q = Quadruple::from_u64([2 * i, i, 2, 1], [&format!("x{}", i + 1), &format!("x{i}"), "two", "1"]);
            assert!(graph.add_relation(&q, DEFAULT_MIN_K).is_accepted());
        }
        let engine = InferenceEngine::new(Arc::new(graph), Arc::new(AdditiveLawRegistry::new()));
        let labels = engine.graph().quantity_labels().len();
        let report = engine.solve_traced(&inputs(&[("x1", 1.0), ("two", 2.0)]), "x6", 100);
        assert_eq!(report.value, Some(32.0));
        assert!(report.iterations <= labels);
    }

    #[test]
    fn every_role_rearrangement_recovers_the_value() {
        // 2·3·5 = 1·6·5 with a = 1, b = 1: C1·C4 = C2·C3
        let r = relation(["p", "q", "s", "t"], 1, 1);
        let values = inputs(&[("p", 6.0), ("q", 3.0), ("s", 10.0), ("t", 5.0)]);
        for role in Role::ALL {
            let solved = solve_role(&r, role, |l| values.get(l).copied()).unwrap();
            assert_eq!(solved, values[r.label(role)], "role {role}");
        }

        // non-trivial coefficients: 3·C2·C3 = 2·C1·C4
        let r = relation(["p", "q", "s", "t"], 3, 2);
        let values = inputs(&[("p", 9.0), ("q", 4.0), ("s", 3.0), ("t", 2.0)]);
        for role in Role::ALL {
            let solved = solve_role(&r, role, |l| values.get(l).copied()).unwrap();
            assert!((solved - values[r.label(role)]).abs() < 1e-12, "role {role}");
        }
    }

    #[test]
    fn zero_divisor_is_an_error_and_skipped_by_solve() {
        let r = relation(["p", "q", "s", "t"], 1, 1);
        let values = inputs(&[("q", 3.0), ("s", 10.0), ("t", 0.0)]);
        let err = solve_role(&r, Role::C1, |l| values.get(l).copied()).unwrap_err();
        assert!(matches!(err, InferError::DivisionByZero { ref label } if label == "p"));

        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        // solving m = F·1/a with a = 0 skips the relation instead of failing
        let report = engine.solve_traced(&inputs(&[("F", 20.0), ("a", 0.0)]), "m", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, None);
        assert_eq!(report.outcome, SolveOutcome::Stalled);
    }

    #[test]
    fn repeated_unknown_label_is_not_solved() {
        // a label in two roles counts as two unknown roles
        let graph = RelationGraph::new();
        graph.offer(
            crate::triad::Discovery {
                relation: relation(["x", "x", "y", "z"], 1, 1),
                values: [1u32, 1, 1, 1].map(Into::into),
                permutation: [0, 1, 2, 3],
            },
            0.0,
        );
        let engine = InferenceEngine::new(Arc::new(graph), Arc::new(AdditiveLawRegistry::new()));
        assert_eq!(engine.solve(&inputs(&[("y", 2.0), ("z", 3.0)]), "x", DEFAULT_MAX_STEPS), None);
    }

    #[test]
    fn values_are_never_overwritten() {
        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        // inconsistent seeds: the relation has nothing unknown, so F keeps its input value
        let report = engine.solve_traced(
            &inputs(&[("F", 7.0), ("m", 10.0), ("a", 2.0), ("1", 1.0)]),
            "F",
            DEFAULT_MAX_STEPS,
        );
        assert_eq!(report.value, Some(7.0));
    }

    #[test]
    fn unit_is_seeded_without_any_relation() {
        let mut laws = AdditiveLawRegistry::new();
        laws.register(AdditiveLaw::new("increment", ["x", "1"], "y")).unwrap();
        let engine = engine_with(&[], laws);

        let report = engine.solve_traced(&inputs(&[("x", 2.0)]), "y", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(3.0));
        assert_eq!(report.outcome, SolveOutcome::Resolved);

        let report = engine.solve_traced(&HashMap::new(), "1", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(1.0));
        assert_eq!(report.iterations, 1);
        assert_eq!(report.derivation_of("1").unwrap().kind, DerivationKind::Unit);
    }

    #[test]
    fn unit_overrides_a_conflicting_input() {
        let engine = engine_with(&[([20, 10, 2, 1], ["F", "m", "a", "1"])], AdditiveLawRegistry::new());
        let report = engine.solve_traced(&inputs(&[("m", 10.0), ("a", 2.0), ("1", 5.0)]), "F", DEFAULT_MAX_STEPS);
        assert_eq!(report.value, Some(20.0));
        let unit = report.derivation_of("1").unwrap();
        assert_eq!((unit.value, unit.step), (1.0, 0));
        assert_eq!(report.derivations.iter().filter(|d| d.label == "1").count(), 1);
    }
}
