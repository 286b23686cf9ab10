//! Error types for graph construction and cost-field queries.

use thiserror::Error;

/// Result type for cost-field operations.
pub type PathResult<T> = Result<T, PathError>;

/// Errors raised by graph queries, layers and fields at run time.
///
/// Unreachable nodes are not an error: they report a cost of
/// `f32::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    /// A node index outside `[0, node_count)` was passed in.
    #[error("node index {node} out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: usize, node_count: usize },
}

/// Errors raised while building a [`Graph`](crate::Graph).
///
/// Building fails before any graph is returned, so a partially-built graph is
/// never observable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BuildError {
    /// A triangle references a vertex past the end of the vertex list.
    #[error("triangle {triangle} references vertex {vertex} ({vertex_count} vertices)")]
    VertexOutOfRange {
        triangle: usize,
        vertex: usize,
        vertex_count: usize,
    },
    /// An adjacency record references a triangle past the end of the list.
    #[error(
        "adjacency record {record} references triangle {triangle} ({triangle_count} triangles)"
    )]
    TriangleOutOfRange {
        record: usize,
        triangle: usize,
        triangle_count: usize,
    },
    /// A connection endpoint is not a node of the graph under construction.
    #[error("node index {node} out of range ({node_count} nodes)")]
    NodeOutOfRange { node: usize, node_count: usize },
    /// A node position has a NaN or infinite component.
    #[error("node {node} has a non-finite position")]
    NonFinite { node: usize },
    /// A connection length is negative or not finite.
    #[error("connection {from} -> {to} has invalid length {length}")]
    InvalidLength { from: usize, to: usize, length: f32 },
    /// The node list and the per-node connection lists differ in length.
    #[error("{nodes} nodes but {lists} connection lists")]
    ConnectionListMismatch { nodes: usize, lists: usize },
    /// A connection is stored in the list of a node other than its origin.
    #[error("connection from {from} stored in the list of node {node}")]
    MisplacedConnection { node: usize, from: usize },
    /// A connection has no reverse connection of the same length.
    #[error("connection {from} -> {to} has no matching reverse connection")]
    MissingReverse { from: usize, to: usize },
}
