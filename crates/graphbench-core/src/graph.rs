//! In-memory graph model used as benchmark input.
//!
//! A [`Graph`] is a homogeneous, directed graph over node indices `0..num_nodes`
//! with an optional fixed-width feature vector per node. Nodes have no
//! identity beyond their index; every on-disk or on-wire representation
//! derives its node key from the index via [`node_label`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every node label in dumps and tensor stores.
pub const NODE_LABEL_PREFIX: &str = "N";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised when a graph violates its structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge references a node index outside `0..num_nodes`
    #[error("edge {index} ({source_node} -> {target_node}) leaves node range 0..{num_nodes}")]
    EdgeOutOfRange {
        index: usize,
        source_node: usize,
        target_node: usize,
        num_nodes: usize,
    },

    /// Feature matrix row count differs from the node count
    #[error("feature matrix has {rows} rows but the graph has {num_nodes} nodes")]
    FeatureRowCount { rows: usize, num_nodes: usize },

    /// A feature row has the wrong width
    #[error("feature row {node} has width {width}, expected {dim}")]
    FeatureWidth { node: usize, width: usize, dim: usize },

    /// Feature dimension of zero
    #[error("feature dimension must be greater than zero")]
    EmptyFeatureDim,
}

// ============================================================================
// Node labels
// ============================================================================

/// Label used for node `index` in dumps and tensor stores (`N<index>`).
pub fn node_label(index: usize) -> String {
    format!("{NODE_LABEL_PREFIX}{index}")
}

/// Inverse of [`node_label`]. Returns `None` for anything that is not `N<digits>`.
pub fn parse_node_label(label: &str) -> Option<usize> {
    let digits = label.strip_prefix(NODE_LABEL_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// Features
// ============================================================================

/// Dense per-node feature vectors sharing one width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// Width of every row
    pub dim: usize,

    /// One row per node, in node-index order
    pub rows: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    /// Create a feature matrix, checking that every row has width `dim`.
    pub fn new(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self, GraphError> {
        if dim == 0 {
            return Err(GraphError::EmptyFeatureDim);
        }
        if let Some((node, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(GraphError::FeatureWidth {
                node,
                width: row.len(),
                dim,
            });
        }
        Ok(Self { dim, rows })
    }

    /// Feature row for a node.
    pub fn row(&self, node: usize) -> Option<&[f32]> {
        self.rows.get(node).map(Vec::as_slice)
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Directed graph with optional node features.
///
/// Construct through [`Graph::new`] so the invariants hold: every edge
/// endpoint is a valid node index and the feature matrix, if any, has one
/// row per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    num_nodes: usize,
    edges: Vec<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    features: Option<FeatureMatrix>,
}

impl Graph {
    /// Build a validated graph.
    pub fn new(
        num_nodes: usize,
        edges: Vec<(usize, usize)>,
        features: Option<FeatureMatrix>,
    ) -> Result<Self, GraphError> {
        let graph = Self {
            num_nodes,
            edges,
            features,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Graph without features.
    pub fn topology(num_nodes: usize, edges: Vec<(usize, usize)>) -> Result<Self, GraphError> {
        Self::new(num_nodes, edges, None)
    }

    /// Re-check the structural invariants.
    ///
    /// Needed after deserializing, since serde bypasses [`Graph::new`].
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, &(source_node, target_node)) in self.edges.iter().enumerate() {
            if source_node >= self.num_nodes || target_node >= self.num_nodes {
                return Err(GraphError::EdgeOutOfRange {
                    index,
                    source_node,
                    target_node,
                    num_nodes: self.num_nodes,
                });
            }
        }

        if let Some(ref features) = self.features {
            if features.rows.len() != self.num_nodes {
                return Err(GraphError::FeatureRowCount {
                    rows: features.rows.len(),
                    num_nodes: self.num_nodes,
                });
            }
            if features.dim == 0 {
                return Err(GraphError::EmptyFeatureDim);
            }
            if let Some((node, row)) = features
                .rows
                .iter()
                .enumerate()
                .find(|(_, r)| r.len() != features.dim)
            {
                return Err(GraphError::FeatureWidth {
                    node,
                    width: row.len(),
                    dim: features.dim,
                });
            }
        }

        Ok(())
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Node features, if any.
    pub fn features(&self) -> Option<&FeatureMatrix> {
        self.features.as_ref()
    }

    /// Feature width, or zero for a topology-only graph.
    pub fn feature_dim(&self) -> usize {
        self.features.as_ref().map_or(0, |f| f.dim)
    }

    /// Outgoing adjacency lists, preserving edge order per source node.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.num_nodes];
        for &(source, target) in &self.edges {
            adjacency[source].push(target);
        }
        adjacency
    }

    /// Whether the directed edge `source -> target` exists.
    pub fn has_edge(&self, source: usize, target: usize) -> bool {
        self.edges.iter().any(|&(s, t)| s == source && t == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_label_roundtrip() {
        assert_eq!(node_label(0), "N0");
        assert_eq!(node_label(42), "N42");
        assert_eq!(parse_node_label("N42"), Some(42));
        assert_eq!(parse_node_label(&node_label(7)), Some(7));
    }

    #[test]
    fn test_parse_node_label_rejects_garbage() {
        assert_eq!(parse_node_label("N"), None);
        assert_eq!(parse_node_label("M3"), None);
        assert_eq!(parse_node_label("N-3"), None);
        assert_eq!(parse_node_label("N3x"), None);
        assert_eq!(parse_node_label(""), None);
    }

    #[test]
    fn test_graph_rejects_out_of_range_edge() {
        let err = Graph::topology(3, vec![(0, 1), (1, 3)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::EdgeOutOfRange {
                index: 1,
                source_node: 1,
                target_node: 3,
                num_nodes: 3,
            }
        );
    }

    #[test]
    fn test_graph_rejects_feature_row_mismatch() {
        let features = FeatureMatrix::new(2, vec![vec![0.0, 1.0]]).unwrap();
        let err = Graph::new(2, vec![], Some(features)).unwrap_err();
        assert!(matches!(
            err,
            GraphError::FeatureRowCount {
                rows: 1,
                num_nodes: 2
            }
        ));
    }

    #[test]
    fn test_feature_matrix_rejects_ragged_rows() {
        let err = FeatureMatrix::new(2, vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            GraphError::FeatureWidth {
                node: 1,
                width: 1,
                dim: 2
            }
        );
        assert_eq!(
            FeatureMatrix::new(0, vec![]).unwrap_err(),
            GraphError::EmptyFeatureDim
        );
    }

    #[test]
    fn test_neighbors_preserve_edge_order() {
        let graph = Graph::topology(3, vec![(0, 2), (1, 0), (0, 1)]).unwrap();
        let adjacency = graph.neighbors();
        assert_eq!(adjacency[0], vec![2, 1]);
        assert_eq!(adjacency[1], vec![0]);
        assert!(adjacency[2].is_empty());
        assert!(graph.has_edge(1, 0));
        assert!(!graph.has_edge(0, 0));
    }

    #[test]
    fn test_deserialized_graph_is_revalidated() {
        let json = r#"{"num_nodes": 2, "edges": [[0, 5]]}"#;
        let graph: Graph = serde_json::from_str(json).unwrap();
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_feature_dim() {
        let features = FeatureMatrix::new(3, vec![vec![0.0; 3]; 2]).unwrap();
        let graph = Graph::new(2, vec![(0, 1)], Some(features)).unwrap();
        assert_eq!(graph.feature_dim(), 3);
        assert_eq!(graph.features().unwrap().row(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(Graph::topology(1, vec![]).unwrap().feature_dim(), 0);
    }
}
