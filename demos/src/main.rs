//! Headless chase demo.
//!
//! A target wanders across a walled courtyard; a chaser follows it by always
//! stepping to the cheapest neighboring node of a [`LayeredCostField`] that
//! is updated once per tick with the target's nearest node.
//!
//! Run: `RUST_LOG=info cargo run --bin chase`
//! (`RUST_LOG=navfield_paths=debug` also shows graph stats and layer swaps.)

use std::error::Error;
use std::sync::Arc;

use navfield_core::{SurfaceMesh, Vec3};
use navfield_paths::{FieldConfig, GraphBuilder, LayeredCostField};
use rand::{Rng, SeedableRng};

const COLS: usize = 24;
const ROWS: usize = 24;
const TICKS: u64 = 900;
const DT: f32 = 1.0 / 30.0;
const TARGET_SPEED: f32 = 2.0;
const CHASER_SPEED: f32 = 2.5;
/// Squared distance at which a mover counts as arrived.
const ARRIVE: f32 = 0.1;

/// Whether the unit cell at `(x, z)` is blocked. A wall runs across the
/// middle row with a gap near the east edge.
fn is_wall(x: usize, z: usize) -> bool {
    z == ROWS / 2 && x < COLS - 4
}

/// Triangle soup for the courtyard: every open cell contributes its own four
/// corners, so shared corners are duplicated and left to the mesh welder.
fn courtyard() -> (Vec<Vec3>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for z in 0..ROWS {
        for x in 0..COLS {
            if is_wall(x, z) {
                continue;
            }
            let base = vertices.len() as u32;
            let (fx, fz) = (x as f32, z as f32);
            vertices.push(Vec3::new(fx, 0.0, fz));
            vertices.push(Vec3::new(fx + 1.0, 0.0, fz));
            vertices.push(Vec3::new(fx, 0.0, fz + 1.0));
            vertices.push(Vec3::new(fx + 1.0, 0.0, fz + 1.0));
            indices.extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
        }
    }
    (vertices, indices)
}

struct Mover {
    position: Vec3,
    destination: Option<Vec3>,
    speed: f32,
}

impl Mover {
    fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            speed,
        }
    }

    fn advance(&mut self) {
        if let Some(dest) = self.destination {
            self.position = self.position.move_towards(dest, self.speed * DT);
            if self.position.distance_squared(dest) < ARRIVE {
                self.destination = None;
            }
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let (raw_vertices, indices) = courtyard();
    let mesh = SurfaceMesh::from_triangulation(&raw_vertices, &indices)?;
    log::info!(
        "courtyard: {} raw vertices welded to {}, {} triangles",
        raw_vertices.len(),
        mesh.vertices.len(),
        mesh.triangles.len()
    );

    let graph = Arc::new(GraphBuilder::from_mesh(&mesh)?);
    let bounds = graph.bounds().ok_or("courtyard graph is empty")?;
    log::info!(
        "graph: {} nodes spanning {} around {}",
        graph.node_count(),
        bounds.size(),
        bounds.center()
    );
    let mut field = LayeredCostField::with_config(
        graph.clone(),
        FieldConfig {
            top_layer_iterations: 60,
            sub_layer_iterations: 40,
            top_layer_cost_limit: None,
        },
    );

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut target = Mover::new(Vec3::new(COLS as f32 - 1.0, 0.0, ROWS as f32 - 1.0), TARGET_SPEED);
    let mut chaser = Mover::new(Vec3::new(1.0, 0.0, 1.0), CHASER_SPEED);
    let mut closest = f32::INFINITY;

    for tick in 1..=TICKS {
        if target.destination.is_none() {
            let waypoint = rng.random_range(0..mesh.vertices.len());
            target.destination = Some(mesh.vertices[waypoint]);
        }
        target.advance();

        let source = graph.nearest_node(target.position).ok_or("courtyard graph is empty")?;
        field.update(source)?;

        if chaser.destination.is_none() {
            let here = graph.nearest_node(chaser.position).ok_or("courtyard graph is empty")?;
            let next = field.downhill(here)?;
            chaser.destination = Some(graph.position(next)?);
        }
        chaser.advance();
        if !bounds.contains(chaser.position) {
            log::warn!("tick {tick}: chaser left the courtyard at {}", chaser.position);
        }

        let gap = chaser.position.distance(target.position);
        closest = closest.min(gap);
        if tick % 60 == 0 {
            let here = graph.nearest_node(chaser.position).ok_or("courtyard graph is empty")?;
            log::info!(
                "tick {tick}: target {} chaser {} gap {gap:.2} cost {:.2} swaps {}",
                target.position,
                chaser.position,
                field.cost_at(here)?,
                field.swaps()
            );
        }
    }

    println!(
        "{} ticks over {} nodes: {} full passes, closest approach {closest:.2}",
        field.ticks(),
        graph.node_count(),
        field.swaps()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
