use navfield_core::{Bounds, Vec3};

#[cfg(feature = "serde")]
use crate::builder::check_length;
#[cfg(feature = "serde")]
use crate::error::BuildError;
use crate::error::{PathError, PathResult};
use crate::neighbors::Neighbors;

/// A graph node: a surface vertex or a triangle centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub position: Vec3,
}

/// A directed, weighted link between two nodes.
///
/// Every undirected edge is stored as two connections (`a -> b` and
/// `b -> a`) with the same length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    /// Euclidean distance between the endpoints. Finite and `>= 0`.
    pub length: f32,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An immutable undirected weighted graph.
///
/// Node indices are dense (`0..node_count()`) and stable for the lifetime of
/// the graph. Built by [`GraphBuilder`](crate::GraphBuilder); shared between
/// cost fields through an `Arc`.
///
/// With the `serde` feature, deserialized graphs are checked for the same
/// invariants the builder guarantees; violations are reported as a
/// [`BuildError`](crate::BuildError).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGraph"))]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Vec<Connection>>,
}

/// Unchecked wire form of a [`Graph`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGraph {
    nodes: Vec<Node>,
    connections: Vec<Vec<Connection>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGraph> for Graph {
    type Error = BuildError;

    fn try_from(raw: RawGraph) -> Result<Self, BuildError> {
        let RawGraph { nodes, connections } = raw;
        let node_count = nodes.len();
        if connections.len() != node_count {
            return Err(BuildError::ConnectionListMismatch {
                nodes: node_count,
                lists: connections.len(),
            });
        }
        if let Some(node) = nodes.iter().position(|n| !n.position.is_finite()) {
            return Err(BuildError::NonFinite { node });
        }
        for (node, list) in connections.iter().enumerate() {
            for c in list {
                if c.from != node {
                    return Err(BuildError::MisplacedConnection { node, from: c.from });
                }
                if c.to >= node_count {
                    return Err(BuildError::NodeOutOfRange {
                        node: c.to,
                        node_count,
                    });
                }
                check_length(c.from, c.to, c.length)?;
            }
        }
        for list in &connections {
            for c in list {
                let reversed = connections[c.to]
                    .iter()
                    .any(|r| r.to == c.from && r.length == c.length);
                if !reversed {
                    return Err(BuildError::MissingReverse {
                        from: c.from,
                        to: c.to,
                    });
                }
            }
        }
        Ok(Self { nodes, connections })
    }
}

impl Graph {
    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed connections (twice the number of undirected edges).
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(Vec::len).sum()
    }

    /// Whether the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in index order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Fail with [`PathError::NodeOutOfRange`] unless `node` is a valid index.
    #[inline]
    pub fn check_node(&self, node: usize) -> PathResult<()> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(PathError::NodeOutOfRange {
                node,
                node_count: self.nodes.len(),
            })
        }
    }

    /// Position of `node`.
    pub fn position(&self, node: usize) -> PathResult<Vec3> {
        self.check_node(node)?;
        Ok(self.nodes[node].position)
    }

    /// Outgoing connections of `node`, in insertion order.
    pub fn connections(&self, node: usize) -> PathResult<&[Connection]> {
        self.check_node(node)?;
        Ok(&self.connections[node])
    }

    /// Read-only adjacency of `node` as `(to, length)` pairs.
    pub fn neighbors(&self, node: usize) -> PathResult<Neighbors<'_>> {
        Ok(Neighbors::new(self.connections(node)?))
    }

    /// Unchecked connection slice for the solvers' inner loops.
    #[inline]
    pub(crate) fn connections_of(&self, node: usize) -> &[Connection] {
        &self.connections[node]
    }

    /// Index of the node closest to `position` (Euclidean), or `None` for an
    /// empty graph. Ties go to the lowest index.
    pub fn nearest_node(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, n) in self.nodes.iter().enumerate() {
            let d = n.position.distance_squared(position);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Axis-aligned bounds of all node positions, `None` for an empty graph.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().map(|n| n.position))
    }
}
