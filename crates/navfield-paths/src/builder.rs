use std::time::Instant;

use navfield_core::{SurfaceMesh, Triangle, TriangleAdjacency, Vec3};

use crate::error::BuildError;
use crate::graph::{Connection, Graph, Node};

/// Builds an immutable [`Graph`].
///
/// Two ways in: [`build`](Self::build) / [`from_mesh`](Self::from_mesh)
/// convert a triangulated surface in one go, while
/// [`add_node`](Self::add_node) / [`connect`](Self::connect) /
/// [`finish`](Self::finish) assemble an arbitrary graph by hand.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    connections: Vec<Vec<Connection>>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            connections: Vec::with_capacity(nodes),
        }
    }

    /// Number of nodes added so far.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, position: Vec3) -> Result<usize, BuildError> {
        let node = self.nodes.len();
        if !position.is_finite() {
            return Err(BuildError::NonFinite { node });
        }
        self.nodes.push(Node { position });
        self.connections.push(Vec::new());
        Ok(node)
    }

    /// Connect `a` and `b` in both directions with their Euclidean distance
    /// as length. Returns the length.
    ///
    /// Fails with [`BuildError::InvalidLength`] if the distance overflows `f32`.
    pub fn connect(&mut self, a: usize, b: usize) -> Result<f32, BuildError> {
        self.check(a)?;
        self.check(b)?;
        let length = self.nodes[a].position.distance(self.nodes[b].position);
        check_length(a, b, length)?;
        self.push_pair(a, b, length);
        Ok(length)
    }

    /// Connect `a` and `b` in both directions with an explicit length.
    pub fn connect_with_length(
        &mut self,
        a: usize,
        b: usize,
        length: f32,
    ) -> Result<(), BuildError> {
        self.check(a)?;
        self.check(b)?;
        check_length(a, b, length)?;
        self.push_pair(a, b, length);
        Ok(())
    }

    /// Freeze the graph.
    pub fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            connections: self.connections,
        }
    }

    /// Convert a triangulated surface into a graph.
    ///
    /// Node layout: one node per vertex (same index), then one node per
    /// triangle placed at its centroid (index `vertices.len() + t`).
    ///
    /// Connections:
    /// 1. every triangle edge, vertex to vertex;
    /// 2. a spoke from every triangle centroid to each of its vertices;
    /// 3. centroid to centroid for adjacency records with
    ///    `shared_vertices >= 2` (triangles sharing a full edge).
    ///
    /// Edges shared by two triangles are emitted once per triangle. All
    /// indices are validated before anything is built.
    pub fn build(
        vertices: &[Vec3],
        triangles: &[Triangle],
        adjacency: &[TriangleAdjacency],
    ) -> Result<Graph, BuildError> {
        let started = Instant::now();
        validate(vertices, triangles, adjacency)?;

        let centroid_base = vertices.len();
        let mut b = Self::with_capacity(vertices.len() + triangles.len());
        for &v in vertices {
            b.add_node(v)?;
        }
        for tri in triangles {
            b.add_node(tri.center)?;
        }

        for (t, tri) in triangles.iter().enumerate() {
            let center = centroid_base + t;
            for j in 0..3 {
                let from = tri.indices[j];
                let to = tri.indices[(j + 1) % 3];
                b.connect(from, to)?;
                b.connect(center, from)?;
            }
        }

        for adj in adjacency.iter().filter(|a| a.shared_vertices >= 2) {
            b.connect(centroid_base + adj.triangle_a, centroid_base + adj.triangle_b)?;
        }

        let graph = b.finish();
        log::debug!(
            "graph built: {} nodes ({} vertices, {} centroids), {} connections in {:?}",
            graph.node_count(),
            vertices.len(),
            triangles.len(),
            graph.connection_count(),
            started.elapsed()
        );
        Ok(graph)
    }

    /// [`build`](Self::build) from a preprocessed [`SurfaceMesh`].
    pub fn from_mesh(mesh: &SurfaceMesh) -> Result<Graph, BuildError> {
        Self::build(&mesh.vertices, &mesh.triangles, &mesh.adjacency)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check(&self, node: usize) -> Result<(), BuildError> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(BuildError::NodeOutOfRange {
                node,
                node_count: self.nodes.len(),
            })
        }
    }

    fn push_pair(&mut self, a: usize, b: usize, length: f32) {
        self.connections[a].push(Connection {
            from: a,
            to: b,
            length,
        });
        self.connections[b].push(Connection {
            from: b,
            to: a,
            length,
        });
    }
}

pub(crate) fn check_length(from: usize, to: usize, length: f32) -> Result<(), BuildError> {
    if length.is_finite() && length >= 0.0 {
        Ok(())
    } else {
        Err(BuildError::InvalidLength { from, to, length })
    }
}

fn validate(
    vertices: &[Vec3],
    triangles: &[Triangle],
    adjacency: &[TriangleAdjacency],
) -> Result<(), BuildError> {
    for (t, tri) in triangles.iter().enumerate() {
        if let Some(&vertex) = tri.indices.iter().find(|&&v| v >= vertices.len()) {
            return Err(BuildError::VertexOutOfRange {
                triangle: t,
                vertex,
                vertex_count: vertices.len(),
            });
        }
    }
    for (record, adj) in adjacency.iter().enumerate() {
        for triangle in [adj.triangle_a, adj.triangle_b] {
            if triangle >= triangles.len() {
                return Err(BuildError::TriangleOutOfRange {
                    record,
                    triangle,
                    triangle_count: triangles.len(),
                });
            }
        }
    }
    Ok(())
}
