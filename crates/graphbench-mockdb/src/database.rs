//! On-disk mock database.
//!
//! A database directory holds the bulk-loaded topology (`graph.json`) and the
//! tensor stores written through client sessions (`tensors.json`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use graphbench_backend::protocol::{Request, Response};
use graphbench_core::{parse_node_label, read_dump, DumpError, Graph, GraphError, NeighborSampler};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Topology file inside a database directory.
pub const GRAPH_FILE: &str = "graph.json";

/// Tensor store file inside a database directory.
pub const TENSOR_FILE: &str = "tensors.json";

/// Errors from the mock database.
#[derive(Error, Debug)]
pub enum MockDbError {
    /// Target directory already exists
    #[error("database directory '{0}' already exists")]
    Exists(PathBuf),

    /// File could not be read or written
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for its contents
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Dump could not be parsed
    #[error(transparent)]
    Dump(#[from] DumpError),

    /// Dump describes an invalid graph
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl MockDbError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Bulk-load `dump` into a new database directory `db_dir`.
pub fn create_database(dump: &Path, db_dir: &Path) -> Result<Graph, MockDbError> {
    if db_dir.exists() {
        return Err(MockDbError::Exists(db_dir.to_path_buf()));
    }

    let graph = read_dump(dump)?.into_graph()?;
    std::fs::create_dir_all(db_dir).map_err(|e| MockDbError::io(db_dir, e))?;
    write_json(&db_dir.join(GRAPH_FILE), &graph)?;

    info!(
        "Loaded {} nodes and {} edges into {:?}",
        graph.num_nodes(),
        graph.num_edges(),
        db_dir
    );
    Ok(graph)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MockDbError> {
    let content = serde_json::to_string(value).map_err(|e| MockDbError::json(path, e))?;
    std::fs::write(path, content).map_err(|e| MockDbError::io(path, e))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MockDbError> {
    let content = std::fs::read_to_string(path).map_err(|e| MockDbError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| MockDbError::json(path, e))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TensorStore {
    dim: usize,
    values: BTreeMap<String, Vec<f32>>,
}

/// A database opened by the mock server.
pub struct MockDatabase {
    dir: PathBuf,
    graph: Graph,
    sampler: NeighborSampler,
    stores: BTreeMap<String, TensorStore>,
}

impl MockDatabase {
    /// Open the database in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MockDbError> {
        let dir = dir.into();
        let graph: Graph = read_json(&dir.join(GRAPH_FILE))?;
        graph.validate()?;

        let tensor_path = dir.join(TENSOR_FILE);
        let stores = if tensor_path.exists() {
            read_json(&tensor_path)?
        } else {
            BTreeMap::new()
        };

        debug!(
            "Opened {:?}: {} nodes, {} tensor stores",
            dir,
            graph.num_nodes(),
            stores.len()
        );
        let sampler = NeighborSampler::new(&graph);
        Ok(Self {
            dir,
            graph,
            sampler,
            stores,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Write tensor stores back to disk.
    pub fn persist(&self) -> Result<(), MockDbError> {
        write_json(&self.dir.join(TENSOR_FILE), &self.stores)
    }

    /// Apply one request. `Close` is handled by the connection loop.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::CreateTensorStore { name, dim } => {
                if self.stores.contains_key(&name) {
                    return Response::error(format!("tensor store '{name}' already exists"));
                }
                if dim == 0 {
                    return Response::error("tensor store dimension must be positive");
                }
                self.stores.insert(
                    name,
                    TensorStore {
                        dim,
                        values: BTreeMap::new(),
                    },
                );
                Response::Ok
            }
            Request::PutTensor { store, key, values } => {
                let num_nodes = self.graph.num_nodes();
                let Some(tensors) = self.stores.get_mut(&store) else {
                    return Response::error(format!("tensor store '{store}' not found"));
                };
                if values.len() != tensors.dim {
                    return Response::error(format!(
                        "tensor '{key}' has width {}, store '{store}' expects {}",
                        values.len(),
                        tensors.dim
                    ));
                }
                if !parse_node_label(&key).is_some_and(|node| node < num_nodes) {
                    return Response::error(format!("unknown node '{key}'"));
                }
                tensors.values.insert(key, values);
                Response::Ok
            }
            Request::GetTensors { store, keys } => {
                let Some(tensors) = self.stores.get(&store) else {
                    return Response::error(format!("tensor store '{store}' not found"));
                };
                let mut values = Vec::with_capacity(keys.len());
                for key in &keys {
                    match tensors.values.get(key) {
                        Some(row) => values.push(row.clone()),
                        None => return Response::error(format!("no tensor for '{key}'")),
                    }
                }
                Response::Tensors { values }
            }
            Request::Subgraph { num_seeds, fan_out } => Response::Subgraph {
                subgraph: self.sampler.sample(num_seeds, &fan_out),
            },
            Request::Close => Response::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbench_core::GraphDumpWriter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn loaded(temp: &TempDir) -> MockDatabase {
        let graph = Graph::topology(3, vec![(0, 1), (1, 2), (2, 0)]).unwrap();
        let dump = temp.path().join("g.milldb");
        GraphDumpWriter::new().write(&graph, &dump).unwrap();
        let db_dir = temp.path().join("g");
        assert_eq!(create_database(&dump, &db_dir).unwrap(), graph);
        MockDatabase::open(&db_dir).unwrap()
    }

    #[test]
    fn test_create_refuses_existing_directory() {
        let temp = TempDir::new().unwrap();
        let dump = temp.path().join("g.milldb");
        std::fs::write(&dump, "N0\n").unwrap();

        let err = create_database(&dump, temp.path()).unwrap_err();
        assert!(matches!(err, MockDbError::Exists(_)));
    }

    #[test]
    fn test_create_rejects_malformed_dump() {
        let temp = TempDir::new().unwrap();
        let dump = temp.path().join("g.milldb");
        std::fs::write(&dump, "N0\nN0->N7 :T\n").unwrap();

        let err = create_database(&dump, &temp.path().join("g")).unwrap_err();
        assert!(matches!(err, MockDbError::Graph(_)));
    }

    #[test]
    fn test_tensor_store_roundtrip_and_persist() {
        let temp = TempDir::new().unwrap();
        let mut db = loaded(&temp);

        assert_eq!(
            db.handle(Request::CreateTensorStore {
                name: "feat".to_string(),
                dim: 2
            }),
            Response::Ok
        );
        for node in 0..3 {
            let response = db.handle(Request::PutTensor {
                store: "feat".to_string(),
                key: format!("N{node}"),
                values: vec![node as f32, 1.0],
            });
            assert_eq!(response, Response::Ok);
        }
        db.persist().unwrap();

        let mut reopened = MockDatabase::open(temp.path().join("g")).unwrap();
        let response = reopened.handle(Request::GetTensors {
            store: "feat".to_string(),
            keys: vec!["N2".to_string(), "N0".to_string()],
        });
        assert_eq!(
            response,
            Response::Tensors {
                values: vec![vec![2.0, 1.0], vec![0.0, 1.0]]
            }
        );
    }

    #[test]
    fn test_tensor_errors() {
        let temp = TempDir::new().unwrap();
        let mut db = loaded(&temp);
        db.handle(Request::CreateTensorStore {
            name: "feat".to_string(),
            dim: 2,
        });

        let cases = vec![
            Request::CreateTensorStore {
                name: "feat".to_string(),
                dim: 2,
            },
            Request::PutTensor {
                store: "feat".to_string(),
                key: "N0".to_string(),
                values: vec![1.0],
            },
            Request::PutTensor {
                store: "feat".to_string(),
                key: "N9".to_string(),
                values: vec![1.0, 2.0],
            },
            Request::GetTensors {
                store: "missing".to_string(),
                keys: vec![],
            },
            Request::GetTensors {
                store: "feat".to_string(),
                keys: vec!["N1".to_string()],
            },
        ];
        for request in cases {
            let response = db.handle(request.clone());
            assert!(
                matches!(response, Response::Error { .. }),
                "{request:?} should fail"
            );
        }
    }

    #[test]
    fn test_subgraph_uses_loaded_topology() {
        let temp = TempDir::new().unwrap();
        let mut db = loaded(&temp);

        let Response::Subgraph { subgraph } = db.handle(Request::Subgraph {
            num_seeds: 2,
            fan_out: vec![1],
        }) else {
            panic!("expected subgraph response");
        };
        assert!(subgraph.num_nodes() >= 2);
        for (s, t) in subgraph.global_edges() {
            assert!(db.graph().has_edge(s, t));
        }
    }
}
