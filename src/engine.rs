//! Engine facade: top-level API for the triadic system.
//!
//! The `Engine` owns the relation graph and the additive law registry and
//! applies the configured threshold, guard and step budget. Discovery and
//! solving are separate phases: the graph and laws are only read while a
//! solve runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use num_bigint::BigUint;
use rayon::prelude::*;

use crate::additive::{AdditiveLaw, AdditiveLawRegistry};
use crate::config::EngineConfig;
use crate::error::{GraphError, TriadicResult};
use crate::export::GraphExport;
use crate::graph::{RelationGraph, Verdict};
use crate::infer::{InferenceEngine, SolveReport};
use crate::triad::search::PermutationSearcher;
use crate::triad::solver::{Generated, QuadrupleSolver};
use crate::triad::{ObservedValue, Quadruple};

/// The triadic relation discovery and inference engine.
pub struct Engine {
    config: EngineConfig,
    graph: Arc<RelationGraph>,
    /// Copy-on-write: solves take a snapshot, registration swaps in a new one.
    laws: RwLock<Arc<AdditiveLawRegistry>>,
}

impl Engine {
    /// Create an engine with the built-in energy conservation law registered.
    pub fn new(config: EngineConfig) -> TriadicResult<Self> {
        config.validate()?;
        let guard = config.guard();
        tracing::info!(
            min_k = config.discovery.min_k,
            parallel = config.discovery.parallel,
            max_steps = config.inference.max_steps,
            units = guard.table().map(|t| t.len()).unwrap_or(0),
            "initializing triadic engine"
        );
        Ok(Self {
            graph: Arc::new(RelationGraph::with_guard(guard)),
            laws: RwLock::new(Arc::new(AdditiveLawRegistry::with_builtin())),
            config,
        })
    }

    /// Search one observation and offer the winner to the graph.
    pub fn add_observation(&self, quadruple: &Quadruple) -> Verdict {
        self.graph.add_relation(quadruple, self.config.discovery.min_k)
    }

    /// [`add_observation`](Self::add_observation) from untyped upstream input.
    pub fn observe(&self, values: &[ObservedValue], labels: &[String]) -> TriadicResult<Verdict> {
        if labels.len() != 4 {
            return Err(GraphError::LabelArity {
                expected: 4,
                actual: labels.len(),
            }
            .into());
        }
        let quadruple = Quadruple::from_observed(values, labels)?;
        Ok(self.add_observation(&quadruple))
    }

    /// Discover many observations. Searches run on the rayon pool when
    /// `discovery.parallel` is set; insertion is always serial, in input order.
    pub fn discover_batch(&self, candidates: &[Quadruple]) -> Vec<Verdict> {
        let min_k = self.config.discovery.min_k;
        let searched: Vec<_> = if self.config.discovery.parallel {
            candidates.par_iter().map(PermutationSearcher::search).collect()
        } else {
            candidates.iter().map(PermutationSearcher::search).collect()
        };

        let verdicts: Vec<Verdict> = candidates
            .iter()
            .zip(searched)
            .map(|(candidate, found)| match found {
                Some(discovery) => self.graph.offer(discovery, min_k),
                None => {
                    tracing::debug!(labels = ?candidate.labels(), reason = "no valid order", "candidate rejected");
                    Verdict::NoValidOrder
                }
            })
            .collect();

        let accepted = verdicts.iter().filter(|v| v.is_accepted()).count();
        tracing::info!(candidates = candidates.len(), accepted, "batch discovery finished");
        verdicts
    }

    /// Generative mode: the exact `C4` for three inputs and known coefficients.
    pub fn generate(
        &self,
        c1: &BigUint,
        c2: &BigUint,
        c3: &BigUint,
        a: &BigUint,
        b: &BigUint,
    ) -> TriadicResult<Generated> {
        Ok(QuadrupleSolver::generate(c1, c2, c3, a, b)?)
    }

    pub fn register_law(&self, law: AdditiveLaw) -> TriadicResult<()> {
        let mut laws = self.laws.write().expect("law registry lock poisoned");
        Arc::make_mut(&mut laws).register(law)?;
        Ok(())
    }

    pub fn remove_law(&self, name: &str) -> TriadicResult<AdditiveLaw> {
        let mut laws = self.laws.write().expect("law registry lock poisoned");
        Ok(Arc::make_mut(&mut laws).remove(name)?)
    }

    /// Snapshot of the registered laws.
    pub fn laws(&self) -> Arc<AdditiveLawRegistry> {
        Arc::clone(&self.laws.read().expect("law registry lock poisoned"))
    }

    /// An inference engine over the current graph and law snapshot.
    pub fn inference(&self) -> InferenceEngine {
        InferenceEngine::new(Arc::clone(&self.graph), self.laws())
    }

    /// Solve for `target`; `max_steps` falls back to `inference.max_steps`.
    pub fn solve(
        &self,
        inputs: &HashMap<String, f64>,
        target: &str,
        max_steps: Option<usize>,
    ) -> Option<f64> {
        self.solve_traced(inputs, target, max_steps).value
    }

    pub fn solve_traced(
        &self,
        inputs: &HashMap<String, f64>,
        target: &str,
        max_steps: Option<usize>,
    ) -> SolveReport {
        let budget = max_steps.unwrap_or(self.config.inference.max_steps);
        self.inference().solve_traced(inputs, target, budget)
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn export(&self) -> GraphExport {
        self.graph.export()
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            relations: self.graph.relation_count(),
            nodes: self.graph.node_count(),
            quantities: self.graph.quantity_labels().len(),
            laws: self.laws().len(),
            min_k: self.config.discovery.min_k,
            unit_entries: self.graph.guard().table().map(|t| t.len()).unwrap_or(0),
        }
    }
}

/// Summary information about the engine state.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub relations: usize,
    pub nodes: usize,
    pub quantities: usize,
    pub laws: usize,
    pub min_k: f64,
    pub unit_entries: usize,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "triadic engine info")?;
        writeln!(f, "  relations:    {}", self.relations)?;
        writeln!(f, "  nodes:        {}", self.nodes)?;
        writeln!(f, "  quantities:   {}", self.quantities)?;
        writeln!(f, "  laws:         {}", self.laws)?;
        writeln!(f, "  min K:        {}", self.min_k)?;
        writeln!(f, "  unit entries: {}", self.unit_entries)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .finish()
    }
}
