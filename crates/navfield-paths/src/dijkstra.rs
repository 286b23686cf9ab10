use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::PathResult;
use crate::graph::Graph;

/// Heap entry ordered by cost for use in `BinaryHeap`.
#[derive(Clone, Copy, Debug)]
struct NodeRef {
    idx: usize,
    cost: f32,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest cost first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute the full single-source cost field in one call.
///
/// Classic lazy-deletion Dijkstra: stale heap entries are skipped when
/// popped. Unreachable nodes keep `f32::INFINITY`. This is the all-at-once
/// counterpart of stepping a [`ShortestPathLayer`](crate::ShortestPathLayer)
/// to convergence and yields identical costs.
pub fn shortest_costs(graph: &Graph, source: usize) -> PathResult<Vec<f32>> {
    graph.check_node(source)?;

    let mut costs = vec![f32::INFINITY; graph.node_count()];
    let mut closed = vec![false; graph.node_count()];
    let mut open = BinaryHeap::new();

    costs[source] = 0.0;
    open.push(NodeRef {
        idx: source,
        cost: 0.0,
    });

    while let Some(current) = open.pop() {
        let ci = current.idx;
        if closed[ci] {
            continue;
        }
        closed[ci] = true;
        let current_cost = costs[ci];

        for c in graph.connections_of(ci) {
            if closed[c.to] {
                continue;
            }
            let tentative = current_cost + c.length;
            if tentative < costs[c.to] {
                costs[c.to] = tentative;
                open.push(NodeRef {
                    idx: c.to,
                    cost: tentative,
                });
            }
        }
    }

    Ok(costs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphBuilder;
    use crate::error::PathError;
    use navfield_core::Vec3;

    #[test]
    fn costs_on_a_square_with_diagonal() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let c = b.add_node(Vec3::new(3.0, 0.0, 0.0)).unwrap();
        let d = b.add_node(Vec3::new(3.0, 4.0, 0.0)).unwrap();
        let e = b.add_node(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        b.connect(a, c).unwrap();
        b.connect(c, d).unwrap();
        b.connect(d, e).unwrap();
        b.connect(e, a).unwrap();
        b.connect(a, d).unwrap();
        let g = b.finish();
        let costs = shortest_costs(&g, a).unwrap();
        assert_eq!(costs, vec![0.0f32, 3.0, 5.0, 4.0]);
    }

    #[test]
    fn unreachable_stays_infinite() {
        let mut b = GraphBuilder::new();
        b.add_node(Vec3::ZERO).unwrap();
        b.add_node(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let g = b.finish();
        assert_eq!(shortest_costs(&g, 1).unwrap(), vec![f32::INFINITY, 0.0]);
    }

    #[test]
    fn source_out_of_range() {
        let g = GraphBuilder::new().finish();
        assert_eq!(
            shortest_costs(&g, 0),
            Err(PathError::NodeOutOfRange {
                node: 0,
                node_count: 0,
            })
        );
    }
}
