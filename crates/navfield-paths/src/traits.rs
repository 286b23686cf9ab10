use crate::error::PathResult;
use crate::graph::Graph;

/// Anything that assigns a cost toward a source to every node of a graph.
pub trait CostField {
    /// The graph the costs are defined over.
    fn graph(&self) -> &Graph;

    /// Cost of `node`; `f32::INFINITY` if unreached. Fails only for an
    /// out-of-range index.
    fn cost_at(&self, node: usize) -> PathResult<f32>;
}

/// The neighbor of `node` with the strictly lowest cost, or `node` itself when
/// no neighbor is cheaper. Ties go to the first connection.
///
/// A neighbor that only ties the current cost is not taken, so the walk stops
/// at the source and on unreached (`f32::INFINITY`) plateaus. Repeatedly
/// following `downhill` walks toward the field's source.
pub fn downhill<F: CostField + ?Sized>(field: &F, node: usize) -> PathResult<usize> {
    let mut best = node;
    let mut best_cost = f32::INFINITY;
    for (to, _) in field.graph().neighbors(node)? {
        let cost = field.cost_at(to)?;
        if cost < best_cost {
            best_cost = cost;
            best = to;
        }
    }
    if best_cost < field.cost_at(node)? {
        Ok(best)
    } else {
        Ok(node)
    }
}
