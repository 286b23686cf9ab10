//! **navfield-core**: geometry and surface types shared across the
//! *navfield* crates.
//!
//! This crate provides the foundational types used by the cost-field engine:
//! a 3D vector, axis-aligned bounds, and the welded triangle surface that the
//! graph builder consumes.

pub mod geom;
pub mod mesh;

pub use geom::{Bounds, Vec3};
pub use mesh::{MeshError, SurfaceMesh, Triangle, TriangleAdjacency, WELD_DISTANCE_SQUARED};
