//! Relation graph: accepted triads stored as directed edges.
//!
//! Each accepted [`Relation`] becomes one edge from a synthetic branch node
//! keyed `"C1,C2,C3"` to the node of its `C4` label. Quantities are only
//! referenced by label; their values live in the solver's working set.
//!
//! - **Storage**: `petgraph` for structure, `DashMap` for label → node lookups
//! - **Acceptance**: permutation search, then threshold, then the
//!   [`DimensionalGuard`], all under the graph's write lock
//! - **Analytics** ([`analytics`]): label co-occurrence degree and components

pub mod analytics;

use std::sync::RwLock;

use dashmap::DashMap;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::export::{GraphExport, NodeExport, RelationExport};
use crate::triad::search::PermutationSearcher;
use crate::triad::{Discovery, Quadruple, Relation, Role};
use crate::units::DimensionalGuard;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Default acceptance threshold: near-exact relations only.
pub const DEFAULT_MIN_K: f64 = 0.9;

/// Parse a label that is itself a number, such as `"1"` or `"2.5"`.
pub fn parse_literal(label: &str) -> Option<f64> {
    label
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NodeKind {
    /// A numerically literal label; its value is the label itself.
    Constant(f64),
    /// A named quantity.
    Variable,
    /// The synthetic `"C1,C2,C3"` source of a relation edge.
    Branch,
}

impl NodeKind {
    /// Classify a quantity label.
    pub fn of_label(label: &str) -> Self {
        match parse_literal(label) {
            Some(v) => NodeKind::Constant(v),
            None => NodeKind::Variable,
        }
    }
}

/// Node weight: a label and its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub label: String,
    pub kind: NodeKind,
}

/// Outcome of offering a candidate to the graph.
///
/// Rejections are ordinary results of exploratory discovery, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A new edge was inserted.
    Accepted(Relation),
    /// An edge with the same branch and target existed; its payload was replaced.
    Replaced(Relation),
    /// The best role order is less simple than the threshold.
    BelowThreshold { relation: Relation, min_k: f64 },
    /// The best role order is dimensionally inconsistent.
    DimensionMismatch(Relation),
    /// Every role order put a zero in a divisor role.
    NoValidOrder,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_) | Verdict::Replaced(_))
    }

    /// Short snake_case name of the verdict.
    pub fn status(&self) -> &'static str {
        match self {
            Verdict::Accepted(_) => "accepted",
            Verdict::Replaced(_) => "replaced",
            Verdict::BelowThreshold { .. } => "below_threshold",
            Verdict::DimensionMismatch(_) => "dimension_mismatch",
            Verdict::NoValidOrder => "no_valid_order",
        }
    }

    pub fn relation(&self) -> Option<&Relation> {
        match self {
            Verdict::Accepted(r)
            | Verdict::Replaced(r)
            | Verdict::BelowThreshold { relation: r, .. }
            | Verdict::DimensionMismatch(r) => Some(r),
            Verdict::NoValidOrder => None,
        }
    }
}

/// Directed graph of accepted relations.
pub struct RelationGraph {
    graph: RwLock<DiGraph<GraphNode, Relation>>,
    /// Quantity label → NodeIndex mapping for O(1) node lookups.
    node_index: DashMap<String, NodeIndex>,
    /// Branch nodes by their `[C1, C2, C3]` labels; the joined display key is
    /// ambiguous once a label contains a comma.
    branch_index: DashMap<[String; 3], NodeIndex>,
    guard: DimensionalGuard,
}

impl RelationGraph {
    /// An empty graph whose guard accepts everything.
    pub fn new() -> Self {
        Self::with_guard(DimensionalGuard::permissive())
    }

    pub fn with_guard(guard: DimensionalGuard) -> Self {
        Self {
            graph: RwLock::new(DiGraph::new()),
            node_index: DashMap::new(),
            branch_index: DashMap::new(),
            guard,
        }
    }

    pub fn guard(&self) -> &DimensionalGuard {
        &self.guard
    }

    /// Ensure a node exists for `label`. Caller holds the write lock.
    fn ensure_node(
        &self,
        graph: &mut DiGraph<GraphNode, Relation>,
        label: &str,
        kind: NodeKind,
    ) -> NodeIndex {
        if let Some(idx) = self.node_index.get(label) {
            return *idx.value();
        }
        let idx = graph.add_node(GraphNode {
            label: label.to_string(),
            kind,
        });
        self.node_index.insert(label.to_string(), idx);
        idx
    }

    /// Ensure the branch node for `relation` exists. Caller holds the write lock.
    fn ensure_branch(&self, graph: &mut DiGraph<GraphNode, Relation>, relation: &Relation) -> NodeIndex {
        let key = relation.branch_labels();
        if let Some(idx) = self.branch_index.get(&key) {
            return *idx.value();
        }
        let idx = graph.add_node(GraphNode {
            label: relation.branch_key(),
            kind: NodeKind::Branch,
        });
        self.branch_index.insert(key, idx);
        idx
    }

    /// Search the observation's role orders and insert the winner if it clears
    /// `min_k` and the dimensional guard.
    pub fn add_relation(&self, quadruple: &Quadruple, min_k: f64) -> Verdict {
        match PermutationSearcher::search(quadruple) {
            Some(discovery) => self.offer(discovery, min_k),
            None => {
                tracing::debug!(labels = ?quadruple.labels(), reason = "no valid order", "candidate rejected");
                Verdict::NoValidOrder
            }
        }
    }

    /// Threshold, guard and insert an already-searched candidate.
    ///
    /// The whole sequence runs under the write lock so concurrent callers
    /// cannot interleave between the checks and the insertion.
    pub fn offer(&self, discovery: Discovery, min_k: f64) -> Verdict {
        let relation = discovery.relation;
        let mut graph = self.graph.write().expect("graph lock poisoned");

        if relation.k() < min_k {
            tracing::debug!(
                equation = %relation.equation(),
                k = relation.k(),
                min_k,
                reason = "threshold",
                "candidate rejected"
            );
            return Verdict::BelowThreshold { relation, min_k };
        }
        if !self.guard.is_balanced(relation.labels()) {
            tracing::debug!(equation = %relation.equation(), reason = "dimension", "candidate rejected");
            return Verdict::DimensionMismatch(relation);
        }

        for label in relation.labels() {
            self.ensure_node(&mut graph, label, NodeKind::of_label(label));
        }
        let branch = self.ensure_branch(&mut graph, &relation);
        let target = self.ensure_node(&mut graph, relation.label(Role::C4), NodeKind::Variable);

        let replaced = graph.find_edge(branch, target).is_some();
        graph.update_edge(branch, target, relation.clone());

        tracing::info!(equation = %relation.equation(), k = %relation.simplicity(), replaced, "relation accepted");
        if replaced {
            Verdict::Replaced(relation)
        } else {
            Verdict::Accepted(relation)
        }
    }

    /// All relations in insertion order.
    pub fn relations(&self) -> Vec<Relation> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.edge_weights().cloned().collect()
    }

    /// Relations mentioning `label` in any role.
    pub fn relations_with(&self, label: &str) -> Vec<Relation> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph
            .edge_weights()
            .filter(|r| r.labels().iter().any(|l| l == label))
            .cloned()
            .collect()
    }

    /// Relations whose `C4` is `label`.
    pub fn relations_into(&self, label: &str) -> GraphResult<Vec<Relation>> {
        let idx = self.node(label)?;
        let graph = self.graph.read().expect("graph lock poisoned");
        Ok(graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.weight().clone())
            .collect())
    }

    /// Node weights, in insertion order.
    pub fn nodes(&self) -> Vec<GraphNode> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.node_weights().cloned().collect()
    }

    /// Kind of the quantity node `label`. Branch nodes are not looked up by label.
    pub fn node_kind(&self, label: &str) -> GraphResult<NodeKind> {
        let idx = self.node(label)?;
        let graph = self.graph.read().expect("graph lock poisoned");
        graph
            .node_weight(idx)
            .map(|n| n.kind)
            .ok_or_else(|| GraphError::NodeNotFound {
                label: label.to_string(),
            })
    }

    fn node(&self, label: &str) -> GraphResult<NodeIndex> {
        self.node_index
            .get(label)
            .map(|idx| *idx.value())
            .ok_or_else(|| GraphError::NodeNotFound {
                label: label.to_string(),
            })
    }

    pub fn has_node(&self, label: &str) -> bool {
        self.node_index.contains_key(label)
    }

    /// Quantity and branch nodes together.
    pub fn node_count(&self) -> usize {
        self.node_index.len() + self.branch_index.len()
    }

    pub fn relation_count(&self) -> usize {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.edge_count()
    }

    /// Distinct quantity labels (branch nodes excluded).
    pub fn quantity_labels(&self) -> Vec<String> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph
            .node_weights()
            .filter(|n| n.kind != NodeKind::Branch)
            .map(|n| n.label.clone())
            .collect()
    }

    /// Read-only snapshot for serialisation or rendering by a collaborator.
    pub fn export(&self) -> GraphExport {
        let graph = self.graph.read().expect("graph lock poisoned");
        let nodes = graph
            .node_weights()
            .map(|n| NodeExport {
                label: n.label.clone(),
                kind: n.kind,
            })
            .collect();
        let relations = graph
            .edge_references()
            .filter_map(|e| {
                let source = graph.node_weight(e.source())?;
                let target = graph.node_weight(e.target())?;
                Some(RelationExport::new(&source.label, &target.label, e.weight()))
            })
            .collect();
        GraphExport { nodes, relations }
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RelationGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationGraph")
            .field("nodes", &self.node_count())
            .field("relations", &self.relation_count())
            .finish()
    }
}
