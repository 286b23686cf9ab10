//! Incremental shortest-path cost fields over static navigation graphs.
//!
//! This crate turns a triangulated walkable surface into a weighted graph and
//! maintains, tick by tick, the cost of reaching one moving source from every
//! node:
//!
//! - [`GraphBuilder`] converts vertices, triangles and triangle adjacency into
//!   an immutable [`Graph`] (vertex nodes plus centroid nodes);
//! - [`ShortestPathLayer`] is a Dijkstra run that can be suspended after any
//!   number of steps and resumed later;
//! - [`LayeredCostField`] stacks three layers so queries are always answerable
//!   while the exact field converges under a fixed per-tick budget;
//! - [`shortest_costs`] computes the whole field in one call.
//!
//! Graphs are shared through `Arc`, so any number of fields can run over the
//! same graph.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use navfield_core::{SurfaceMesh, Vec3};
//! use navfield_paths::{GraphBuilder, LayeredCostField};
//!
//! let mesh = SurfaceMesh::plane(8, 8, 1.0);
//! let graph = Arc::new(GraphBuilder::from_mesh(&mesh).unwrap());
//! let mut field = LayeredCostField::new(graph.clone());
//!
//! let source = graph.nearest_node(Vec3::new(4.0, 0.0, 4.0)).unwrap();
//! field.update(source).unwrap();
//! assert_eq!(field.cost_at(source).unwrap(), 0.0);
//! ```

mod builder;
pub mod dijkstra;
mod error;
mod field;
mod frontier;
mod graph;
mod layer;
mod neighbors;
mod traits;

pub use builder::GraphBuilder;
pub use dijkstra::shortest_costs;
pub use error::{BuildError, PathError, PathResult};
pub use field::{FieldConfig, LayeredCostField};
pub use graph::{Connection, Graph, Node};
pub use layer::ShortestPathLayer;
pub use neighbors::Neighbors;
pub use traits::{CostField, downhill};
