use std::sync::Arc;

use crate::error::PathResult;
use crate::frontier::Frontier;
use crate::graph::Graph;
use crate::traits::CostField;

/// A restartable, steppable single-source Dijkstra solver.
///
/// State is kept as flat arrays indexed by node and owned by the layer, so a
/// run can be suspended between any two [`step`](Self::step) calls and
/// resumed later without losing anything: the only "suspension" is not
/// calling `step`.
///
/// A fresh layer has no source, an empty frontier (it reports converged) and
/// every cost at `f32::INFINITY`.
#[derive(Debug, Clone)]
pub struct ShortestPathLayer {
    graph: Arc<Graph>,
    costs: Vec<f32>,
    fixed: Vec<bool>,
    predecessor: Vec<Option<usize>>,
    frontier: Frontier,
    source: Option<usize>,
    settled: usize,
    cost_limit: Option<f32>,
}

impl ShortestPathLayer {
    /// Create an idle layer over `graph`.
    pub fn new(graph: Arc<Graph>) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            costs: vec![f32::INFINITY; n],
            fixed: vec![false; n],
            predecessor: vec![None; n],
            frontier: Frontier::new(n),
            source: None,
            settled: 0,
            cost_limit: None,
        }
    }

    /// The graph this layer runs over.
    #[inline]
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Stop expanding past `limit`: nodes whose cost exceeds it are still
    /// settled but their connections are not relaxed. `None` (the default)
    /// runs to full convergence.
    ///
    /// Takes effect from the next step; it does not restart the run.
    pub fn set_cost_limit(&mut self, limit: Option<f32>) {
        self.cost_limit = limit;
    }

    /// The current expansion limit.
    #[inline]
    pub fn cost_limit(&self) -> Option<f32> {
        self.cost_limit
    }

    /// Restart the run from `source`.
    ///
    /// Every cost goes back to infinity, nothing is fixed, and the frontier
    /// holds only `source` at cost 0. The source itself is settled by the
    /// first [`step`](Self::step).
    pub fn reset(&mut self, source: usize) -> PathResult<()> {
        self.graph.check_node(source)?;
        self.costs.fill(f32::INFINITY);
        self.fixed.fill(false);
        self.predecessor.fill(None);
        self.frontier.clear();
        self.settled = 0;

        self.costs[source] = 0.0;
        self.frontier.upsert(source, 0.0);
        self.source = Some(source);
        Ok(())
    }

    /// Settle the cheapest frontier node and relax its connections.
    ///
    /// Returns the settled node, or `None` if the layer had already
    /// converged (in which case nothing changes).
    pub fn step(&mut self) -> Option<usize> {
        let u = self.frontier.pop()?;
        self.fixed[u] = true;
        self.settled += 1;

        let cost_u = self.costs[u];
        if self.cost_limit.is_some_and(|limit| cost_u > limit) {
            return Some(u);
        }

        for c in self.graph.connections_of(u) {
            let v = c.to;
            if self.fixed[v] {
                continue;
            }
            let candidate = cost_u + c.length;
            if candidate < self.costs[v] {
                self.costs[v] = candidate;
                self.predecessor[v] = Some(u);
                self.frontier.upsert(v, candidate);
            }
        }
        Some(u)
    }

    /// Step up to `budget` times, stopping early on convergence. Returns the
    /// number of nodes settled.
    ///
    /// `step_many(a)` followed by `step_many(b)` leaves the layer in exactly
    /// the same state as `step_many(a + b)`.
    pub fn step_many(&mut self, budget: usize) -> usize {
        let mut taken = 0;
        while taken < budget && self.step().is_some() {
            taken += 1;
        }
        taken
    }

    /// Whether the frontier is empty: every node reachable from the source
    /// (within the cost limit) is settled.
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.frontier.is_empty()
    }

    /// The source of the current run, `None` before the first reset.
    #[inline]
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    /// Number of nodes settled in the current run.
    #[inline]
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Number of discovered but unsettled nodes.
    #[inline]
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// The node the next [`step`](Self::step) will settle.
    #[inline]
    pub fn next_to_settle(&self) -> Option<usize> {
        self.frontier.peek()
    }

    /// Best known cost of `node` in this run. Final once `node` is fixed.
    pub fn cost_at(&self, node: usize) -> PathResult<f32> {
        self.graph.check_node(node)?;
        Ok(self.costs[node])
    }

    /// Whether `node` is settled in this run.
    pub fn is_fixed(&self, node: usize) -> PathResult<bool> {
        self.graph.check_node(node)?;
        Ok(self.fixed[node])
    }

    /// Whether `node` is discovered but not yet settled.
    pub fn is_open(&self, node: usize) -> PathResult<bool> {
        self.graph.check_node(node)?;
        Ok(self.frontier.contains(node))
    }

    /// The node that last lowered `node`'s cost, `None` for the source and
    /// for undiscovered nodes.
    pub fn predecessor(&self, node: usize) -> PathResult<Option<usize>> {
        self.graph.check_node(node)?;
        Ok(self.predecessor[node])
    }

    /// All costs, indexed by node.
    #[inline]
    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    /// Shortest path from the source to `node` (both included), following
    /// predecessors. `None` unless `node` is fixed.
    pub fn path_to(&self, node: usize) -> PathResult<Option<Vec<usize>>> {
        self.graph.check_node(node)?;
        if !self.fixed[node] {
            return Ok(None);
        }
        let mut path = vec![node];
        let mut cur = node;
        while let Some(prev) = self.predecessor[cur] {
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        Ok(Some(path))
    }

    /// Unchecked accessors for the field's query path.
    #[inline]
    pub(crate) fn fixed_cost(&self, node: usize) -> Option<f32> {
        self.fixed[node].then_some(self.costs[node])
    }

    #[inline]
    pub(crate) fn raw_cost(&self, node: usize) -> f32 {
        self.costs[node]
    }
}

impl CostField for ShortestPathLayer {
    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn cost_at(&self, node: usize) -> PathResult<f32> {
        ShortestPathLayer::cost_at(self, node)
    }
}
