//! Export types for serializing engine state.
//!
//! These types give collaborators a label-resolved, format-neutral view of
//! the relation graph. Big-integer coefficients are exported as decimal
//! strings so no precision is lost in JSON.

use serde::{Deserialize, Serialize};

use crate::graph::NodeKind;
use crate::triad::Relation;

/// Exported graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Exported relation edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationExport {
    /// Branch node label, `"C1,C2,C3"`.
    pub source: String,
    /// `C4` label.
    pub target: String,
    /// Labels in role order `[C1, C2, C3, C4]`.
    pub triad: [String; 4],
    pub a: String,
    pub b: String,
    /// Exact simplicity, e.g. `"1"` or `"1/6"`.
    pub simplicity: String,
    pub k: f64,
    pub equation: String,
}

impl RelationExport {
    pub fn new(source: &str, target: &str, relation: &Relation) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            triad: relation.labels().clone(),
            a: relation.a().to_string(),
            b: relation.b().to_string(),
            simplicity: relation.simplicity().to_string(),
            k: relation.k(),
            equation: relation.equation(),
        }
    }
}

/// Snapshot of a whole relation graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub relations: Vec<RelationExport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_export_serializes_to_json() {
        let relation = Relation::new(
            ["F", "m", "a", "1"].map(str::to_string),
            1u32.into(),
            1u32.into(),
        );
        let export = RelationExport::new("F,m,a", "1", &relation);
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["source"], "F,m,a");
        assert_eq!(json["triad"][3], "1");
        assert_eq!(json["simplicity"], "1");
        assert_eq!(json["k"], 1.0);
    }

    #[test]
    fn node_kind_is_flattened() {
        let node = NodeExport {
            label: "2".into(),
            kind: NodeKind::Constant(2.0),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "constant");
        assert_eq!(json["value"], 2.0);

        let back: NodeExport = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
