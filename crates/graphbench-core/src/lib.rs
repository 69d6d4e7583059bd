//! graphbench Core - Graph model and benchmark primitives
//!
//! This crate provides the backend-independent pieces of the benchmark harness:
//! - In-memory graph model with optional node features
//! - Bulk-load dump serialization (`N<i>` node lines, `N<s>->N<t> :T` edge lines)
//! - Random graph generation with an on-disk cache
//! - In-memory neighbourhood sampling used as the baseline
//! - Timing statistics and the benchmark report block

pub mod dump;
pub mod generate;
pub mod graph;
pub mod sampler;
pub mod stats;

// Re-exports for convenience
pub use dump::{parse_dump, read_dump, DumpError, GraphDumpWriter, ParsedDump, DEFAULT_RELATION};
pub use generate::{load_or_generate, random_graph, GenerateError, RandomGraphSpec};
pub use graph::{node_label, parse_node_label, FeatureMatrix, Graph, GraphError, NODE_LABEL_PREFIX};
pub use sampler::{NeighborSampler, SampledSubgraph};
pub use stats::TimingStats;
