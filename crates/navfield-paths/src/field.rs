//! The layered, time-sliced cost field.
//!
//! [`LayeredCostField`] runs three [`ShortestPathLayer`]s at different paces so
//! that a cost toward a moving source can be queried at any tick while the
//! exact answer is still being computed:
//!
//! - the **top** layer restarts at the current source every tick and settles
//!   at most `top_layer_iterations` nodes: exact, fresh costs close to the
//!   source;
//! - the **edit** sub layer is never restarted mid-run and settles at most
//!   `sub_layer_iterations` nodes per tick, amortizing a full Dijkstra run
//!   over many ticks;
//! - the **stable** sub layer holds the last completed run and answers
//!   everything the other two cannot.
//!
//! When the edit layer converges the two sub layers swap roles and the new
//! edit layer restarts at the then-current source.

use std::sync::Arc;

use crate::error::PathResult;
use crate::graph::Graph;
use crate::layer::ShortestPathLayer;
use crate::traits::{CostField, downhill};

/// Per-tick work budgets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldConfig {
    /// Nodes the top layer settles per tick, after restarting at the source.
    pub top_layer_iterations: usize,
    /// Nodes the edit sub layer settles per tick.
    pub sub_layer_iterations: usize,
    /// Optional expansion limit for the top layer (see
    /// [`ShortestPathLayer::set_cost_limit`]).
    pub top_layer_cost_limit: Option<f32>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            top_layer_iterations: 50,
            sub_layer_iterations: 10,
            top_layer_cost_limit: None,
        }
    }
}

/// An always-queryable, eventually exact cost field toward one moving source.
///
/// Drive it with [`update`](Self::update) once per tick; query it with
/// [`cost_at`](Self::cost_at) at any time.
#[derive(Debug, Clone)]
pub struct LayeredCostField {
    graph: Arc<Graph>,
    config: FieldConfig,
    top: ShortestPathLayer,
    sub: [ShortestPathLayer; 2],
    /// Index into `sub` of the edit layer; the stable layer is the other one.
    edit: usize,
    sub_layers_initialized: bool,
    ticks: u64,
    swaps: u64,
}

impl LayeredCostField {
    /// Create a field over `graph` with the default [`FieldConfig`].
    pub fn new(graph: Arc<Graph>) -> Self {
        Self::with_config(graph, FieldConfig::default())
    }

    /// Create a field over `graph` with the given budgets.
    pub fn with_config(graph: Arc<Graph>, config: FieldConfig) -> Self {
        let mut top = ShortestPathLayer::new(graph.clone());
        top.set_cost_limit(config.top_layer_cost_limit);
        Self {
            sub: [
                ShortestPathLayer::new(graph.clone()),
                ShortestPathLayer::new(graph.clone()),
            ],
            top,
            graph,
            config,
            edit: 0,
            sub_layers_initialized: false,
            ticks: 0,
            swaps: 0,
        }
    }

    /// Advance the field by one tick with the source at `source`.
    ///
    /// Fails, without touching any state, if `source` is out of range.
    pub fn update(&mut self, source: usize) -> PathResult<()> {
        self.graph.check_node(source)?;

        if !self.sub_layers_initialized {
            self.sub[0].reset(source)?;
            self.sub[1].reset(source)?;
            self.sub_layers_initialized = true;
        }

        self.top.reset(source)?;
        let top_steps = self.top.step_many(self.config.top_layer_iterations);

        let edit = &mut self.sub[self.edit];
        let sub_steps = edit.step_many(self.config.sub_layer_iterations);
        if edit.is_converged() {
            let finished = edit.source();
            let settled = edit.settled_count();
            self.edit = 1 - self.edit;
            self.sub[self.edit].reset(source)?;
            self.swaps += 1;
            log::debug!(
                "cost field swap #{}: run from {:?} settled {} nodes; restarting at {}",
                self.swaps,
                finished,
                settled,
                source
            );
        }

        self.ticks += 1;
        log::trace!(
            "cost field tick {}: source {}, top settled {}, edit settled {} ({} total)",
            self.ticks,
            source,
            top_steps,
            sub_steps,
            self.sub[self.edit].settled_count()
        );
        Ok(())
    }

    /// Best available cost of `node` toward the source.
    ///
    /// Resolution order: the top layer if `node` is settled there, else the
    /// edit layer if settled there, else whatever the stable layer holds.
    /// Returns `f32::INFINITY` for nodes no layer has reached (including every
    /// node before the first [`update`](Self::update)).
    pub fn cost_at(&self, node: usize) -> PathResult<f32> {
        self.graph.check_node(node)?;
        if let Some(cost) = self.top.fixed_cost(node) {
            return Ok(cost);
        }
        if let Some(cost) = self.edit_layer().fixed_cost(node) {
            return Ok(cost);
        }
        Ok(self.stable_layer().raw_cost(node))
    }

    /// The neighbor of `node` one step closer to the source, or `node` itself
    /// if no neighbor is cheaper. See [`downhill`].
    pub fn downhill(&self, node: usize) -> PathResult<usize> {
        downhill(self, node)
    }

    /// The graph the field runs over.
    #[inline]
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Current budgets.
    #[inline]
    pub fn config(&self) -> FieldConfig {
        self.config
    }

    /// Replace the budgets. Takes effect on the next [`update`](Self::update);
    /// runs in progress continue.
    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = config;
        self.top.set_cost_limit(config.top_layer_cost_limit);
    }

    /// Number of completed [`update`](Self::update) calls.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of edit/stable swaps so far, i.e. completed full runs.
    #[inline]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Whether the first [`update`](Self::update) has seeded the sub layers.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.sub_layers_initialized
    }

    /// The per-tick restarting layer.
    #[inline]
    pub fn top_layer(&self) -> &ShortestPathLayer {
        &self.top
    }

    /// The sub layer currently making incremental progress.
    #[inline]
    pub fn edit_layer(&self) -> &ShortestPathLayer {
        &self.sub[self.edit]
    }

    /// The sub layer holding the last completed run.
    #[inline]
    pub fn stable_layer(&self) -> &ShortestPathLayer {
        &self.sub[1 - self.edit]
    }
}

impl CostField for LayeredCostField {
    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn cost_at(&self, node: usize) -> PathResult<f32> {
        LayeredCostField::cost_at(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphBuilder;
    use crate::dijkstra::shortest_costs;
    use crate::error::PathError;
    use navfield_core::{SurfaceMesh, Vec3};

    /// `w × h` grid of unit-spaced nodes with 4-way connections.
    fn grid(w: usize, h: usize) -> Arc<Graph> {
        let mut b = GraphBuilder::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                b.add_node(Vec3::new(x as f32, 0.0, y as f32)).unwrap();
            }
        }
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if x + 1 < w {
                    b.connect(i, i + 1).unwrap();
                }
                if y + 1 < h {
                    b.connect(i, i + w).unwrap();
                }
            }
        }
        Arc::new(b.finish())
    }

    /// A 3×3 grid (nodes 0..9) plus an isolated pair (9, 10).
    fn grid_with_island() -> Arc<Graph> {
        let mut b = GraphBuilder::new();
        for y in 0..3 {
            for x in 0..3 {
                b.add_node(Vec3::new(x as f32, 0.0, y as f32)).unwrap();
            }
        }
        for y in 0..3 {
            for x in 0..3 {
                let i = y * 3 + x;
                if x + 1 < 3 {
                    b.connect(i, i + 1).unwrap();
                }
                if y + 1 < 3 {
                    b.connect(i, i + 3).unwrap();
                }
            }
        }
        let p = b.add_node(Vec3::new(50.0, 0.0, 50.0)).unwrap();
        let q = b.add_node(Vec3::new(51.0, 0.0, 50.0)).unwrap();
        b.connect(p, q).unwrap();
        Arc::new(b.finish())
    }

    fn config(top: usize, sub: usize) -> FieldConfig {
        FieldConfig {
            top_layer_iterations: top,
            sub_layer_iterations: sub,
            top_layer_cost_limit: None,
        }
    }

    #[test]
    fn default_budgets() {
        let c = FieldConfig::default();
        assert_eq!(c.top_layer_iterations, 50);
        assert_eq!(c.sub_layer_iterations, 10);
        assert_eq!(c.top_layer_cost_limit, None);
    }

    #[test]
    fn queries_before_first_update_are_infinite() {
        let field = LayeredCostField::new(grid(3, 3));
        assert!(!field.is_initialized());
        for n in 0..9 {
            assert_eq!(field.cost_at(n), Ok(f32::INFINITY));
        }
    }

    #[test]
    fn first_tick_seeds_both_sub_layers() {
        let mut field = LayeredCostField::with_config(grid(10, 10), config(0, 0));
        field.update(42).unwrap();
        assert!(field.is_initialized());
        assert_eq!(field.edit_layer().source(), Some(42));
        assert_eq!(field.stable_layer().source(), Some(42));
        assert_eq!(field.stable_layer().settled_count(), 0);
        // Only the freshly reset stable layer answers: source 0, rest infinite.
        assert_eq!(field.cost_at(42), Ok(0.0));
        assert_eq!(field.cost_at(41), Ok(f32::INFINITY));
    }

    #[test]
    fn top_layer_fixes_source_on_first_tick() {
        let g = grid(40, 25);
        assert_eq!(g.node_count(), 1000);
        let mut field = LayeredCostField::with_config(g, config(50, 10));
        field.update(0).unwrap();
        assert_eq!(field.top_layer().is_fixed(0), Ok(true));
        assert_eq!(field.cost_at(0), Ok(0.0));
        assert_eq!(field.top_layer().settled_count(), 50);
        assert_eq!(field.edit_layer().settled_count(), 10);
    }

    #[test]
    fn stationary_source_converges_after_budgeted_ticks() {
        let g = grid(40, 25);
        let reference = shortest_costs(&g, 123).unwrap();
        let mut field = LayeredCostField::with_config(g.clone(), config(50, 10));

        let ticks = g.node_count().div_ceil(10);
        for tick in 1..=ticks {
            field.update(123).unwrap();
            if tick < ticks {
                assert_eq!(field.swaps(), 0, "tick {tick}");
            }
        }
        assert_eq!(field.swaps(), 1);
        assert_eq!(field.ticks(), 100);
        let stable = field.stable_layer();
        assert!(stable.is_converged());
        assert_eq!(stable.settled_count(), 1000);
        assert_eq!(stable.costs(), reference.as_slice());
        for n in 0..g.node_count() {
            assert_eq!(field.cost_at(n), Ok(reference[n]), "node {n}");
        }
        // The new edit layer restarted at the source.
        assert_eq!(field.edit_layer().source(), Some(123));
        assert_eq!(field.edit_layer().settled_count(), 0);
    }

    #[test]
    fn stable_layer_is_fresh_or_converged_every_tick() {
        let g = grid(12, 12);
        let mut field = LayeredCostField::with_config(g.clone(), config(5, 7));
        let path: Vec<usize> = (0..300).map(|t| (t * 7) % g.node_count()).collect();
        for (tick, &source) in path.iter().enumerate() {
            field.update(source).unwrap();
            let stable = field.stable_layer();
            if field.swaps() == 0 {
                assert_eq!(stable.settled_count(), 0, "tick {tick}");
                assert_eq!(stable.source(), Some(path[0]));
            } else {
                assert!(stable.is_converged(), "tick {tick}");
                assert_eq!(stable.settled_count(), g.node_count(), "tick {tick}");
            }
        }
        assert!(field.swaps() > 0);
    }

    #[test]
    fn converged_stable_layer_is_exact_for_its_own_source() {
        let g = grid(8, 8);
        let mut field = LayeredCostField::with_config(g.clone(), config(3, 9));
        let mut checked = 0;
        let mut last_swaps = 0;
        for tick in 0..200 {
            field.update((tick * 5) % 64).unwrap();
            if field.swaps() != last_swaps {
                last_swaps = field.swaps();
                let stable = field.stable_layer();
                let Some(src) = stable.source() else {
                    panic!("stable layer without a source");
                };
                let reference = shortest_costs(&g, src).unwrap();
                assert_eq!(stable.costs(), reference.as_slice());
                checked += 1;
            }
        }
        assert!(checked >= 2);
    }

    #[test]
    fn swap_restarts_edit_layer_at_current_source() {
        let g = grid(6, 6);
        let mut field = LayeredCostField::with_config(g.clone(), config(2, 5));
        let mut swap_ticks = 0;
        for tick in 0..120 {
            let source = (tick * 11 + 3) % g.node_count();
            let swaps_before = field.swaps();
            field.update(source).unwrap();
            if field.swaps() != swaps_before {
                swap_ticks += 1;
                assert_eq!(field.edit_layer().source(), Some(source), "tick {tick}");
                assert_eq!(field.edit_layer().settled_count(), 0, "tick {tick}");
                assert_ne!(field.stable_layer().source(), Some(source), "tick {tick}");
            }
        }
        assert!(swap_ticks >= 10);
    }

    #[test]
    fn sub_layers_lag_behind_a_moving_source() {
        let g = grid(20, 20);
        let mut field = LayeredCostField::with_config(g, config(10, 10));
        field.update(0).unwrap();
        field.update(399).unwrap();
        // The in-flight run still targets the source it started from.
        assert_eq!(field.edit_layer().source(), Some(0));
        assert_eq!(field.top_layer().source(), Some(399));
        assert_eq!(field.cost_at(399), Ok(0.0));
    }

    #[test]
    fn query_precedence_top_then_edit_then_stable() {
        let g = grid(30, 1);
        let mut field = LayeredCostField::with_config(g, config(3, 5));
        field.update(0).unwrap();
        field.update(0).unwrap();
        // Top covers 0..3, edit covers 0..10, stable is freshly reset.
        field.update(29).unwrap();
        // Top restarted at 29: node 28 is one step away.
        assert_eq!(field.cost_at(28), Ok(1.0));
        // Edit run from 0 has settled nodes 0..15.
        assert_eq!(field.edit_layer().settled_count(), 15);
        assert_eq!(field.cost_at(5), Ok(5.0));
        assert_eq!(field.cost_at(14), Ok(14.0));
        // Nobody has node 20 settled; the fresh stable layer has it at infinity.
        assert_eq!(field.cost_at(20), Ok(f32::INFINITY));
    }

    #[test]
    fn out_of_range_update_fails_without_state_change() {
        let mut field = LayeredCostField::new(grid(3, 3));
        assert_eq!(
            field.update(9),
            Err(PathError::NodeOutOfRange {
                node: 9,
                node_count: 9,
            })
        );
        assert!(!field.is_initialized());
        assert_eq!(field.ticks(), 0);
        field.update(4).unwrap();
        assert!(field.update(100).is_err());
        assert_eq!(field.ticks(), 1);
        assert_eq!(field.top_layer().source(), Some(4));
    }

    #[test]
    fn out_of_range_query_fails() {
        let mut field = LayeredCostField::new(grid(3, 3));
        field.update(0).unwrap();
        assert!(field.cost_at(9).is_err());
        assert!(field.downhill(9).is_err());
    }

    #[test]
    fn disconnected_nodes_stay_infinite_forever() {
        let g = grid_with_island();
        let mut field = LayeredCostField::with_config(g.clone(), config(4, 2));
        for tick in 0..100 {
            field.update(tick % 9).unwrap();
            for n in 0..9 {
                assert!(field.cost_at(n).is_ok());
            }
            assert_eq!(field.cost_at(9), Ok(f32::INFINITY));
            assert_eq!(field.cost_at(10), Ok(f32::INFINITY));
        }
    }

    #[test]
    fn every_valid_query_succeeds_over_lifetime() {
        let g = Arc::new(GraphBuilder::from_mesh(&SurfaceMesh::plane(5, 5, 1.0)).unwrap());
        let mut field = LayeredCostField::with_config(g.clone(), config(6, 4));
        for tick in 0..150 {
            let source = (tick * 13) % g.node_count();
            field.update(source).unwrap();
            for n in 0..g.node_count() {
                let c = field.cost_at(n).unwrap();
                assert!(c >= 0.0);
            }
        }
    }

    #[test]
    fn downhill_walks_to_the_source() {
        let g = Arc::new(GraphBuilder::from_mesh(&SurfaceMesh::plane(6, 6, 1.0)).unwrap());
        let source = g.nearest_node(Vec3::new(5.0, 0.0, 5.0)).unwrap();
        let mut field = LayeredCostField::new(g.clone());
        // Run until a full pass has completed for the stationary source.
        while field.swaps() == 0 {
            field.update(source).unwrap();
        }
        let mut node = g.nearest_node(Vec3::ZERO).unwrap();
        let mut hops = 0;
        loop {
            let next = field.downhill(node).unwrap();
            if next == node {
                break;
            }
            assert!(field.cost_at(next).unwrap() < field.cost_at(node).unwrap());
            node = next;
            hops += 1;
            assert!(hops < g.node_count());
        }
        assert_eq!(node, source);
    }

    #[test]
    fn top_layer_cost_limit_is_applied() {
        let g = grid(30, 1);
        let mut field = LayeredCostField::with_config(
            g,
            FieldConfig {
                top_layer_iterations: 50,
                sub_layer_iterations: 0,
                top_layer_cost_limit: Some(2.0),
            },
        );
        field.update(0).unwrap();
        assert!(field.top_layer().is_converged());
        assert_eq!(field.top_layer().settled_count(), 4);
        assert_eq!(field.cost_at(3), Ok(3.0));
        assert_eq!(field.cost_at(4), Ok(f32::INFINITY));

        field.set_config(config(50, 0));
        field.update(0).unwrap();
        assert_eq!(field.cost_at(4), Ok(4.0));
        assert_eq!(field.top_layer().cost_limit(), None);
    }

    #[test]
    fn fields_share_one_graph() {
        let g = grid(5, 5);
        let mut a = LayeredCostField::new(g.clone());
        let mut b = LayeredCostField::new(g.clone());
        a.update(0).unwrap();
        b.update(24).unwrap();
        assert_eq!(a.cost_at(0), Ok(0.0));
        assert_eq!(b.cost_at(24), Ok(0.0));
        assert_eq!(a.cost_at(24), Ok(8.0));
        assert_eq!(b.cost_at(0), Ok(8.0));
        assert!(Arc::ptr_eq(a.graph(), b.graph()));
    }
}
