//! Graph analytics over label co-occurrence.
//!
//! Two quantity labels are neighbours when some relation mentions both. The
//! functions here project the relation graph onto that undirected view and
//! return structured results sorted by relevance (degree desc, size desc).

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use super::RelationGraph;

/// Undirected co-occurrence projection of a relation graph.
fn co_occurrence(graph: &RelationGraph) -> (UnGraph<String, ()>, HashMap<String, usize>) {
    let mut projection: UnGraph<String, ()> = UnGraph::new_undirected();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();
    let mut participation: HashMap<String, usize> = HashMap::new();

    for relation in graph.relations() {
        let mut nodes = Vec::with_capacity(4);
        let mut seen_in_relation: Vec<&str> = Vec::with_capacity(4);
        for label in relation.labels() {
            let idx = *index
                .entry(label.clone())
                .or_insert_with(|| projection.add_node(label.clone()));
            if !seen_in_relation.contains(&label.as_str()) {
                seen_in_relation.push(label);
                *participation.entry(label.clone()).or_default() += 1;
            }
            nodes.push(idx);
        }
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                if a != b {
                    projection.update_edge(a, b, ());
                }
            }
        }
    }
    (projection, participation)
}

// ---------------------------------------------------------------------------
// Degree
// ---------------------------------------------------------------------------

/// Degree metrics for a single label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDegree {
    pub label: String,
    /// Number of relations mentioning the label.
    pub relations: usize,
    /// Number of distinct labels it shares a relation with.
    pub neighbours: usize,
}

/// Degree of every quantity label. Sorted by neighbours desc, then label.
pub fn label_degrees(graph: &RelationGraph) -> Vec<LabelDegree> {
    let (projection, participation) = co_occurrence(graph);
    let mut results: Vec<LabelDegree> = projection
        .node_indices()
        .map(|idx| {
            let label = projection[idx].clone();
            let relations = participation.get(&label).copied().unwrap_or(0);
            LabelDegree {
                neighbours: projection.neighbors(idx).count(),
                relations,
                label,
            }
        })
        .collect();
    results.sort_by(|a, b| b.neighbours.cmp(&a.neighbours).then_with(|| a.label.cmp(&b.label)));
    results
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// A connected group of labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Component identifier (arbitrary, for display).
    pub id: usize,
    /// Member labels, sorted.
    pub members: Vec<String>,
    pub size: usize,
}

/// Connected components of the co-occurrence view. Sorted by size desc.
pub fn components(graph: &RelationGraph) -> Vec<Component> {
    let (projection, _) = co_occurrence(graph);
    let mut uf = UnionFind::<usize>::new(projection.node_count());
    for edge in projection.raw_edges() {
        uf.union(edge.source().index(), edge.target().index());
    }

    let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
    for idx in projection.node_indices() {
        groups
            .entry(uf.find(idx.index()))
            .or_default()
            .push(projection[idx].clone());
    }

    let mut members: Vec<Vec<String>> = groups
        .into_values()
        .map(|mut m| {
            m.sort();
            m
        })
        .collect();
    members.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    members
        .into_iter()
        .enumerate()
        .map(|(id, members)| Component {
            id,
            size: members.len(),
            members,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline topology numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologySummary {
    pub labels: usize,
    pub relations: usize,
    pub components: usize,
    pub largest_component: usize,
    pub average_degree: f64,
    /// Edges present over edges possible in the co-occurrence view.
    pub density: f64,
}

pub fn summarize(graph: &RelationGraph) -> TopologySummary {
    let (projection, _) = co_occurrence(graph);
    let n = projection.node_count();
    let e = projection.edge_count();
    let comps = components(graph);
    let (average_degree, density) = if n < 2 {
        (0.0, 0.0)
    } else {
        (
            2.0 * e as f64 / n as f64,
            2.0 * e as f64 / (n as f64 * (n as f64 - 1.0)),
        )
    };
    TopologySummary {
        labels: n,
        relations: graph.relation_count(),
        components: comps.len(),
        largest_component: comps.first().map(|c| c.size).unwrap_or(0),
        average_degree,
        density,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_MIN_K;
    use crate::triad::Quadruple;

    fn mechanics() -> RelationGraph {
        let g = RelationGraph::new();
        g.add_relation(&Quadruple::from_u64([20, 10, 2, 1], ["F", "m", "a", "1"]), DEFAULT_MIN_K);
        g.add_relation(&Quadruple::from_u64([50, 5, 10, 1], ["W", "F", "d", "1"]), DEFAULT_MIN_K);
        g.add_relation(&Quadruple::from_u64([6, 2, 3, 1], ["V", "I", "R", "one"]), DEFAULT_MIN_K);
        g
    }

    #[test]
    fn degrees_rank_hubs_first() {
        let degrees = label_degrees(&mechanics());
        // F and "1" each share a relation with the other five mechanics labels
        assert_eq!(degrees[0].neighbours, 5);
        assert_eq!(degrees[0].label, "1");
        let f = degrees.iter().find(|d| d.label == "F").unwrap();
        assert_eq!(f.relations, 2);
        let v = degrees.iter().find(|d| d.label == "V").unwrap();
        assert_eq!(v.neighbours, 3);
    }

    #[test]
    fn components_split_mechanics_from_circuits() {
        let comps = components(&mechanics());
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].members, vec!["1", "F", "W", "a", "d", "m"]);
        assert_eq!(comps[1].size, 4);
    }

    #[test]
    fn summary_of_empty_graph() {
        let s = summarize(&RelationGraph::new());
        assert_eq!(s.labels, 0);
        assert_eq!(s.components, 0);
        assert_eq!(s.density, 0.0);
    }

    #[test]
    fn summary_counts() {
        let s = summarize(&mechanics());
        assert_eq!(s.labels, 10);
        assert_eq!(s.relations, 3);
        assert_eq!(s.largest_component, 6);
        assert!(s.density > 0.0 && s.density <= 1.0);
    }
}
