//! Bulk-load dump format.
//!
//! The bulk loader consumes a line-oriented text file describing topology only:
//!
//! ```text
//! N0
//! N1
//! N0->N1 :T
//! ```
//!
//! Node lines come first in index order, followed by one line per edge in the
//! graph's edge order. Feature vectors are never part of the dump; they are
//! uploaded through the tensor store once the server is running.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::graph::{node_label, parse_node_label, Graph};

/// Relation token used for the single edge type of homogeneous graphs.
pub const DEFAULT_RELATION: &str = "T";

/// Errors produced while writing or reading a dump.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Destination could not be created or written
    #[error("failed to write dump '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a dump failed
    #[error("failed to read dump: {0}")]
    Read(#[from] std::io::Error),

    /// A line does not follow the dump grammar
    #[error("malformed dump line {line}: '{content}'")]
    Malformed { line: usize, content: String },
}

impl DumpError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn malformed(line: usize, content: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            content: content.into(),
        }
    }
}

/// Serializes a [`Graph`] into the bulk loader's text grammar.
#[derive(Debug, Clone)]
pub struct GraphDumpWriter {
    relation: String,
}

impl Default for GraphDumpWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphDumpWriter {
    /// Writer using [`DEFAULT_RELATION`].
    pub fn new() -> Self {
        Self {
            relation: DEFAULT_RELATION.to_string(),
        }
    }

    /// Writer using a custom relation token.
    pub fn with_relation(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
        }
    }

    /// Relation token written on every edge line.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Write the dump to `destination`, replacing any existing file.
    pub fn write(&self, graph: &Graph, destination: &Path) -> Result<PathBuf, DumpError> {
        let file = File::create(destination).map_err(|e| DumpError::io(destination, e))?;
        let mut writer = BufWriter::new(file);

        self.write_to(graph, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| DumpError::io(destination, e))?;

        debug!(
            "Wrote dump {:?} ({} nodes, {} edges)",
            destination,
            graph.num_nodes(),
            graph.num_edges()
        );
        Ok(destination.to_path_buf())
    }

    /// Write the dump to any writer.
    pub fn write_to<W: Write>(&self, graph: &Graph, out: &mut W) -> std::io::Result<()> {
        for node in 0..graph.num_nodes() {
            writeln!(out, "{}", node_label(node))?;
        }
        for &(source, target) in graph.edges() {
            writeln!(
                out,
                "{}->{} :{}",
                node_label(source),
                node_label(target),
                self.relation
            )?;
        }
        Ok(())
    }

    /// Render the dump into a string.
    pub fn render(&self, graph: &Graph) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(graph, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Topology recovered from a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDump {
    /// Number of node lines
    pub node_count: usize,

    /// Edges as node indices, in file order
    pub edges: Vec<(usize, usize)>,

    /// Relation token of the edge lines (None when there are no edges)
    pub relation: Option<String>,
}

impl ParsedDump {
    /// Convert into a topology-only [`Graph`].
    pub fn into_graph(self) -> Result<Graph, crate::graph::GraphError> {
        Graph::topology(self.node_count, self.edges)
    }
}

/// Parse a dump produced by [`GraphDumpWriter`].
///
/// Node lines must be `N0, N1, ...` in order and precede all edge lines.
pub fn parse_dump<R: BufRead>(reader: R) -> Result<ParsedDump, DumpError> {
    let mut node_count = 0usize;
    let mut edges = Vec::new();
    let mut relation: Option<String> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((endpoints, rel)) = trimmed.split_once(" :") {
            let (source, target) = endpoints
                .split_once("->")
                .ok_or_else(|| DumpError::malformed(line_no, trimmed))?;
            let source = parse_node_label(source.trim())
                .ok_or_else(|| DumpError::malformed(line_no, trimmed))?;
            let target = parse_node_label(target.trim())
                .ok_or_else(|| DumpError::malformed(line_no, trimmed))?;

            match relation {
                Some(ref existing) if existing != rel => {
                    return Err(DumpError::malformed(line_no, trimmed));
                }
                None => relation = Some(rel.to_string()),
                _ => {}
            }
            edges.push((source, target));
        } else {
            // Node lines after the first edge line are out of grammar
            if !edges.is_empty() || parse_node_label(trimmed) != Some(node_count) {
                return Err(DumpError::malformed(line_no, trimmed));
            }
            node_count += 1;
        }
    }

    Ok(ParsedDump {
        node_count,
        edges,
        relation,
    })
}

/// Parse a dump file from disk.
pub fn read_dump(path: &Path) -> Result<ParsedDump, DumpError> {
    let file = File::open(path)?;
    parse_dump(std::io::BufReader::new(file))
}
