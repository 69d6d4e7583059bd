//! Synthetic benchmark graphs and their on-disk cache.
//!
//! Random graphs are generated once per parameter set and cached as JSON under
//! the data directory (`N{nodes}.D{degree}.F{features}.json`) so repeated
//! benchmark runs operate on the identical graph.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::graph::{FeatureMatrix, Graph, GraphError};

/// Errors from graph generation and the graph cache.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Invalid generation parameters
    #[error("invalid graph parameters: {0}")]
    InvalidSpec(String),

    /// Cache file could not be read or written
    #[error("graph cache I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache file is not a valid graph
    #[error("invalid cached graph '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Graph could not be encoded for the cache
    #[error("failed to encode graph for '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Graph failed validation
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl GenerateError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Parameters of a random graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomGraphSpec {
    /// Average number of nodes
    pub avg_num_nodes: usize,

    /// Average out-degree per node
    pub avg_degree: usize,

    /// Feature width (0 for a topology-only graph)
    pub num_features: usize,

    /// RNG seed, making generation reproducible
    pub seed: Option<u64>,
}

impl RandomGraphSpec {
    pub fn new(avg_num_nodes: usize, avg_degree: usize, num_features: usize) -> Self {
        Self {
            avg_num_nodes,
            avg_degree,
            num_features,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// File name of the cached graph for these parameters.
    pub fn cache_file_name(&self) -> String {
        format!(
            "N{}.D{}.F{}.json",
            self.avg_num_nodes, self.avg_degree, self.num_features
        )
    }

    /// Database name conventionally used for graphs of these parameters.
    pub fn database_name(&self) -> String {
        format!(
            "Fake_N{}_D{}_F{}",
            self.avg_num_nodes, self.avg_degree, self.num_features
        )
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if self.avg_num_nodes == 0 {
            return Err(GenerateError::InvalidSpec(
                "avg_num_nodes must be greater than zero".to_string(),
            ));
        }
        if self.avg_degree >= self.avg_num_nodes.max(2) {
            return Err(GenerateError::InvalidSpec(format!(
                "avg_degree {} must be smaller than avg_num_nodes {}",
                self.avg_degree, self.avg_num_nodes
            )));
        }
        Ok(())
    }
}

/// Generate an undirected random graph (every edge stored in both directions).
///
/// The node count is drawn uniformly from `[avg/2, 3*avg/2]`, each node draws
/// an undirected degree around `avg_degree / 2` and links to random partners
/// other than itself. Features are uniform in `[0, 1)`.
pub fn random_graph(spec: &RandomGraphSpec) -> Result<Graph, GenerateError> {
    spec.validate()?;

    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let low = (spec.avg_num_nodes / 2).max(1);
    let high = (spec.avg_num_nodes + spec.avg_num_nodes / 2).max(low);
    let num_nodes = rng.gen_range(low..=high).max(spec.avg_degree + 1);

    let mut edges = Vec::with_capacity(num_nodes * spec.avg_degree);
    let half_degree = spec.avg_degree / 2;
    for source in 0..num_nodes {
        let degree = if half_degree == 0 {
            usize::from(spec.avg_degree > 0 && rng.gen_bool(0.5))
        } else {
            rng.gen_range(0..=2 * half_degree)
        };
        for _ in 0..degree {
            let mut target = rng.gen_range(0..num_nodes - 1);
            if target >= source {
                target += 1;
            }
            edges.push((source, target));
            edges.push((target, source));
        }
    }

    let features = if spec.num_features > 0 {
        let rows = (0..num_nodes)
            .map(|_| (0..spec.num_features).map(|_| rng.gen::<f32>()).collect())
            .collect();
        Some(FeatureMatrix::new(spec.num_features, rows)?)
    } else {
        None
    };

    debug!(
        "Generated random graph: {} nodes, {} edges, {} features",
        num_nodes,
        edges.len(),
        spec.num_features
    );
    Ok(Graph::new(num_nodes, edges, features)?)
}

/// Load a graph from a JSON file and validate it.
pub fn load_graph(path: &Path) -> Result<Graph, GenerateError> {
    let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    let graph: Graph = serde_json::from_str(&content).map_err(|e| GenerateError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    graph.validate()?;
    Ok(graph)
}

/// Save a graph as JSON.
pub fn save_graph(graph: &Graph, path: &Path) -> Result<(), GenerateError> {
    let content = serde_json::to_string(graph).map_err(|e| GenerateError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, content).map_err(|e| GenerateError::io(path, e))
}

/// Return the cached graph for `spec`, generating and caching it on first use.
pub fn load_or_generate(data_dir: &Path, spec: &RandomGraphSpec) -> Result<Graph, GenerateError> {
    std::fs::create_dir_all(data_dir).map_err(|e| GenerateError::io(data_dir, e))?;
    let path = data_dir.join(spec.cache_file_name());

    if path.exists() {
        debug!("Loading cached graph from {:?}", path);
        return load_graph(&path);
    }

    let graph = random_graph(spec)?;
    save_graph(&graph, &path)?;
    info!(
        "Cached random graph at {:?} ({} nodes, {} edges)",
        path,
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_random_graph_shape() {
        let spec = RandomGraphSpec::new(100, 10, 5).with_seed(42);
        let graph = random_graph(&spec).unwrap();

        assert!(graph.num_nodes() >= 50 && graph.num_nodes() <= 150);
        assert_eq!(graph.feature_dim(), 5);
        assert_eq!(graph.num_edges() % 2, 0);
        // Undirected: every edge has its reverse
        for &(s, t) in graph.edges().iter().take(50) {
            assert!(graph.has_edge(t, s));
            assert_ne!(s, t);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let spec = RandomGraphSpec::new(30, 4, 2).with_seed(9);
        assert_eq!(random_graph(&spec).unwrap(), random_graph(&spec).unwrap());
    }

    #[test]
    fn test_topology_only() {
        let spec = RandomGraphSpec::new(10, 2, 0).with_seed(1);
        assert!(random_graph(&spec).unwrap().features().is_none());
    }

    #[test]
    fn test_invalid_spec() {
        assert!(random_graph(&RandomGraphSpec::new(0, 0, 0)).is_err());
        assert!(random_graph(&RandomGraphSpec::new(5, 10, 0)).is_err());
    }

    #[test]
    fn test_cache_reuses_existing_graph() {
        let temp = TempDir::new().unwrap();
        let first = load_or_generate(temp.path(), &RandomGraphSpec::new(20, 2, 3)).unwrap();
        assert!(temp.path().join("N20.D2.F3.json").exists());

        // Unseeded, so only the cache can make these equal
        let second = load_or_generate(temp.path(), &RandomGraphSpec::new(20, 2, 3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_graph_rejects_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, r#"{"num_nodes": 1, "edges": [[0, 3]]}"#).unwrap();
        assert!(matches!(
            load_graph(&path).unwrap_err(),
            GenerateError::Graph(GraphError::EdgeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_save_graph_failures_are_not_decode_errors() {
        let temp = TempDir::new().unwrap();
        let graph = random_graph(&RandomGraphSpec::new(10, 2, 0)).unwrap();

        // A directory in place of the cache file
        let err = save_graph(&graph, temp.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));

        let source = serde_json::from_str::<Graph>("[").unwrap_err();
        let err = GenerateError::Encode {
            path: temp.path().join("g.json"),
            source,
        };
        assert!(err.to_string().starts_with("failed to encode graph for"));
    }

    #[test]
    fn test_names() {
        let spec = RandomGraphSpec::new(100, 10, 5);
        assert_eq!(spec.cache_file_name(), "N100.D10.F5.json");
        assert_eq!(spec.database_name(), "Fake_N100_D10_F5");
    }
}
