//! Triangulated walkable surfaces.
//!
//! A [`SurfaceMesh`] is the cleaned-up form of a raw triangulation handed out
//! by a host engine: coincident vertices are welded, every triangle knows its
//! centroid, and triangles touching each other are listed in
//! [`TriangleAdjacency`] records. It is the input of the graph builder in
//! `navfield-paths`.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::geom::{Bounds, Vec3};

/// Raw vertices closer than this (squared distance) are welded together.
pub const WELD_DISTANCE_SQUARED: f32 = 0.001;

/// Errors raised while preprocessing a raw triangulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A triangle index points past the end of the vertex list.
    #[error("triangle index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange { index: usize, vertex_count: usize },
    /// The index list length is not a multiple of three.
    #[error("index count {count} is not a multiple of 3")]
    IncompleteTriangle { count: usize },
    /// A vertex has a NaN or infinite component.
    #[error("vertex {index} is not finite: {position}")]
    NonFiniteVertex { index: usize, position: Vec3 },
}

/// One triangle of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// Indices into [`SurfaceMesh::vertices`].
    pub indices: [usize; 3],
    /// Mean of the three vertex positions.
    pub center: Vec3,
}

/// Two triangles that share at least one vertex.
///
/// `shared_vertices >= 2` means the triangles share a full edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleAdjacency {
    pub triangle_a: usize,
    pub triangle_b: usize,
    pub shared_vertices: usize,
}

/// A welded triangle soup with precomputed centroids and adjacency.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<Triangle>,
    pub adjacency: Vec<TriangleAdjacency>,
}

impl SurfaceMesh {
    /// Preprocess a raw triangulation (`indices` taken three at a time).
    ///
    /// Vertices within [`WELD_DISTANCE_SQUARED`] of an earlier kept vertex are
    /// merged into the lowest-indexed such vertex, so the resulting vertex
    /// list holds distinct positions only.
    pub fn from_triangulation(
        raw_vertices: &[Vec3],
        indices: &[u32],
    ) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle {
                count: indices.len(),
            });
        }
        if let Some((index, &position)) = raw_vertices
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(MeshError::NonFiniteVertex { index, position });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= raw_vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index: bad as usize,
                vertex_count: raw_vertices.len(),
            });
        }

        let (vertices, remap) = weld(raw_vertices);

        let triangles: Vec<Triangle> = indices
            .chunks_exact(3)
            .map(|tri| {
                let idx = [
                    remap[tri[0] as usize],
                    remap[tri[1] as usize],
                    remap[tri[2] as usize],
                ];
                Triangle {
                    indices: idx,
                    center: Vec3::centroid(vertices[idx[0]], vertices[idx[1]], vertices[idx[2]]),
                }
            })
            .collect();

        let adjacency = triangle_adjacency(vertices.len(), &triangles);

        log::debug!(
            "surface mesh: {} raw vertices welded to {}, {} triangles, {} adjacencies",
            raw_vertices.len(),
            vertices.len(),
            triangles.len(),
            adjacency.len()
        );

        Ok(Self {
            vertices,
            triangles,
            adjacency,
        })
    }

    /// A flat grid on the XZ plane with `cols × rows` quads, each split into
    /// two triangles along the same diagonal.
    pub fn plane(cols: usize, rows: usize, spacing: f32) -> Self {
        let stride = cols + 1;
        let mut vertices = Vec::with_capacity(stride * (rows + 1));
        for z in 0..=rows {
            for x in 0..=cols {
                vertices.push(Vec3::new(x as f32 * spacing, 0.0, z as f32 * spacing));
            }
        }

        let mut triangles = Vec::with_capacity(cols * rows * 2);
        for z in 0..rows {
            for x in 0..cols {
                let i0 = z * stride + x;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                for idx in [[i0, i2, i1], [i1, i2, i3]] {
                    triangles.push(Triangle {
                        indices: idx,
                        center: Vec3::centroid(
                            vertices[idx[0]],
                            vertices[idx[1]],
                            vertices[idx[2]],
                        ),
                    });
                }
            }
        }

        let adjacency = triangle_adjacency(vertices.len(), &triangles);
        Self {
            vertices,
            triangles,
            adjacency,
        }
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Weld raw vertices. Returns the kept vertices and, for each raw vertex, the
/// index of the kept vertex it maps to.
///
/// Kept vertices are bucketed on a grid whose cell edge equals the weld
/// radius, so only the 27 surrounding cells need checking. Cell keys of huge
/// coordinates saturate at the `i64` range; the distance test still decides.
fn weld(raw: &[Vec3]) -> (Vec<Vec3>, Vec<usize>) {
    let cell = WELD_DISTANCE_SQUARED.sqrt();
    let key = |p: Vec3| {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };

    let mut kept: Vec<Vec3> = Vec::new();
    let mut remap = Vec::with_capacity(raw.len());
    let mut buckets: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();

    for &p in raw {
        let (kx, ky, kz) = key(p);
        let mut found: Option<usize> = None;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbor = (
                        kx.saturating_add(dx),
                        ky.saturating_add(dy),
                        kz.saturating_add(dz),
                    );
                    let Some(bucket) = buckets.get(&neighbor) else {
                        continue;
                    };
                    for &k in bucket {
                        if kept[k].distance_squared(p) < WELD_DISTANCE_SQUARED
                            && found.is_none_or(|f| k < f)
                        {
                            found = Some(k);
                        }
                    }
                }
            }
        }
        let target = match found {
            Some(k) => k,
            None => {
                kept.push(p);
                let k = kept.len() - 1;
                buckets.entry((kx, ky, kz)).or_default().push(k);
                k
            }
        };
        remap.push(target);
    }

    (kept, remap)
}

/// Every pair `a < b` of triangles sharing at least one vertex, ordered by
/// `(a, b)`. `shared_vertices` counts equal index pairs between the two
/// triangles.
fn triangle_adjacency(vertex_count: usize, triangles: &[Triangle]) -> Vec<TriangleAdjacency> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (t, tri) in triangles.iter().enumerate() {
        for &v in &tri.indices {
            if incident[v].last() != Some(&t) {
                incident[v].push(t);
            }
        }
    }

    let mut out = Vec::new();
    let mut shared: BTreeMap<usize, usize> = BTreeMap::new();
    for (a, tri) in triangles.iter().enumerate() {
        shared.clear();
        for &v in &tri.indices {
            for &b in &incident[v] {
                if b > a {
                    shared.entry(b).or_insert(0);
                }
            }
        }
        for (&b, count) in shared.iter_mut() {
            let other = &triangles[b].indices;
            *count = tri
                .indices
                .iter()
                .map(|i| other.iter().filter(|j| *j == i).count())
                .sum();
        }
        out.extend(shared.iter().map(|(&b, &count)| TriangleAdjacency {
            triangle_a: a,
            triangle_b: b,
            shared_vertices: count,
        }));
    }
    out
}
