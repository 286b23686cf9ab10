use std::iter::FusedIterator;
use std::slice;

use crate::graph::Connection;

/// Iterator over a node's adjacency, yielding `(to, length)` pairs.
///
/// Returned by [`Graph::neighbors`](crate::Graph::neighbors). Consumers doing
/// gradient descent over a cost field walk this to find a cheaper neighbor.
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    inner: slice::Iter<'a, Connection>,
}

impl<'a> Neighbors<'a> {
    pub(crate) fn new(connections: &'a [Connection]) -> Self {
        Self {
            inner: connections.iter(),
        }
    }
}

impl Iterator for Neighbors<'_> {
    type Item = (usize, f32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|c| (c.to, c.length))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Neighbors<'_> {}

impl FusedIterator for Neighbors<'_> {}
