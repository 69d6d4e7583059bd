//! Seed-and-expand neighbourhood sampling over an in-memory graph.
//!
//! This is the reference behaviour the database-backed sampler is compared
//! against: pick a random batch of seed nodes, then for every hop of the
//! fan-out schedule draw up to `fan_out[hop]` distinct outgoing neighbours of
//! each node discovered in the previous hop.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Subgraph returned by one sampling call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampledSubgraph {
    /// Global node indices; seeds first, then nodes in discovery order
    pub node_ids: Vec<usize>,

    /// Edges as positions into `node_ids` (`(source, target)`)
    pub edges: Vec<(usize, usize)>,

    /// Feature rows aligned with `node_ids`, when fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Vec<f32>>>,
}

impl SampledSubgraph {
    /// Number of sampled nodes.
    pub fn num_nodes(&self) -> usize {
        self.node_ids.len()
    }

    /// Edges translated back to global node indices.
    pub fn global_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .map(|&(s, t)| (self.node_ids[s], self.node_ids[t]))
    }
}

/// Neighbourhood sampler over a fixed graph.
pub struct NeighborSampler {
    adjacency: Vec<Vec<usize>>,
    rng: StdRng,
}

impl NeighborSampler {
    /// Sampler seeded from OS entropy.
    pub fn new(graph: &Graph) -> Self {
        Self::from_adjacency(graph.neighbors(), StdRng::from_entropy())
    }

    /// Deterministic sampler for reproducible runs.
    pub fn with_seed(graph: &Graph, seed: u64) -> Self {
        Self::from_adjacency(graph.neighbors(), StdRng::seed_from_u64(seed))
    }

    /// Sampler over a prebuilt adjacency list.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>, rng: StdRng) -> Self {
        Self { adjacency, rng }
    }

    /// Number of nodes in the underlying graph.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Draw `num_seeds` distinct seeds (capped at the node count) and expand
    /// them hop by hop following `fan_out`.
    pub fn sample(&mut self, num_seeds: usize, fan_out: &[usize]) -> SampledSubgraph {
        let num_nodes = self.adjacency.len();
        let seed_count = num_seeds.min(num_nodes);

        let mut node_ids: Vec<usize> =
            index::sample(&mut self.rng, num_nodes, seed_count).into_vec();
        let mut position: HashMap<usize, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();
        let mut edges = Vec::new();
        let mut frontier = node_ids.clone();

        for &fan in fan_out {
            let mut next_frontier = Vec::new();
            for &node in &frontier {
                let neighbors = &self.adjacency[node];
                let take = fan.min(neighbors.len());
                if take == 0 {
                    continue;
                }
                for pick in index::sample(&mut self.rng, neighbors.len(), take) {
                    let neighbor = neighbors[pick];
                    let neighbor_pos = *position.entry(neighbor).or_insert_with(|| {
                        node_ids.push(neighbor);
                        next_frontier.push(neighbor);
                        node_ids.len() - 1
                    });
                    edges.push((position[&node], neighbor_pos));
                }
            }
            frontier = next_frontier;
        }

        SampledSubgraph {
            node_ids,
            edges,
            features: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ring(n: usize) -> Graph {
        let edges = (0..n).flat_map(|i| [(i, (i + 1) % n), ((i + 1) % n, i)]).collect();
        Graph::topology(n, edges).unwrap()
    }

    #[test]
    fn test_sample_is_consistent_with_graph() {
        let graph = ring(10);
        let mut sampler = NeighborSampler::with_seed(&graph, 7);

        for _ in 0..20 {
            let batch = sampler.sample(4, &[2, 2]);
            let unique: HashSet<_> = batch.node_ids.iter().collect();
            assert_eq!(unique.len(), batch.node_ids.len());
            assert!(batch.node_ids.iter().all(|&n| n < 10));
            for (s, t) in batch.global_edges() {
                assert!(graph.has_edge(s, t), "edge {s}->{t} not in graph");
            }
        }
    }

    #[test]
    fn test_seed_count_capped_at_node_count() {
        let graph = Graph::topology(3, vec![]).unwrap();
        let mut sampler = NeighborSampler::with_seed(&graph, 1);
        let batch = sampler.sample(64, &[5, 5]);
        assert_eq!(batch.num_nodes(), 3);
        assert!(batch.edges.is_empty());
    }

    #[test]
    fn test_fan_out_bounds_edges_per_node() {
        // Star: node 0 points at every other node
        let edges = (1..20).map(|i| (0, i)).collect();
        let graph = Graph::topology(20, edges).unwrap();
        let mut sampler =
            NeighborSampler::from_adjacency(graph.neighbors(), StdRng::seed_from_u64(3));

        let batch = sampler.sample(20, &[3]);
        let from_center = batch
            .global_edges()
            .filter(|&(s, _)| s == 0)
            .count();
        assert_eq!(from_center, 3);
    }

    #[test]
    fn test_seeded_sampler_is_deterministic() {
        let graph = ring(50);
        let a = NeighborSampler::with_seed(&graph, 99).sample(8, &[2, 2]);
        let b = NeighborSampler::with_seed(&graph, 99).sample(8, &[2, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::topology(0, vec![]).unwrap();
        let batch = NeighborSampler::with_seed(&graph, 0).sample(4, &[2]);
        assert_eq!(batch, SampledSubgraph::default());
    }
}
