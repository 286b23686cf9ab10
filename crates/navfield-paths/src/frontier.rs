//! Indexed binary min-heap used as a layer's open set.
//!
//! Entries are ordered by `(cost, seq)` where `seq` is a per-frontier insertion
//! counter. Re-keying a node takes a fresh `seq`, so among equal costs the
//! most recently (re)inserted node comes last. This reproduces the output of
//! a sorted list with "remove, then insert after all entries of equal cost"
//! semantics at O(log n) per operation.

use std::cmp::Ordering;

const ABSENT: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
struct Entry {
    node: usize,
    cost: f32,
    seq: u64,
}

impl Entry {
    #[inline]
    fn precedes(&self, other: &Self) -> bool {
        match self.cost.total_cmp(&other.cost) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.seq < other.seq,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Frontier {
    heap: Vec<Entry>,
    /// node -> position in `heap`, `ABSENT` when not queued.
    slot: Vec<usize>,
    next_seq: u64,
}

impl Frontier {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            heap: Vec::new(),
            slot: vec![ABSENT; node_count],
            next_seq: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, node: usize) -> bool {
        self.slot[node] != ABSENT
    }

    /// Drop every entry. Only touches slots of queued nodes.
    pub(crate) fn clear(&mut self) {
        for e in &self.heap {
            self.slot[e.node] = ABSENT;
        }
        self.heap.clear();
        self.next_seq = 0;
    }

    /// Queue `node` at `cost`, or move it to `cost` if already queued.
    ///
    /// Callers only ever lower a queued node's cost, but the heap restores
    /// order in either direction.
    pub(crate) fn upsert(&mut self, node: usize, cost: f32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = Entry { node, cost, seq };
        match self.slot[node] {
            ABSENT => {
                self.heap.push(entry);
                let i = self.heap.len() - 1;
                self.slot[node] = i;
                self.sift_up(i);
            }
            i => {
                self.heap[i] = entry;
                let i = self.sift_up(i);
                self.sift_down(i);
            }
        }
    }

    /// Remove and return the node with the lowest `(cost, seq)`.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);
        let top = self.heap.pop()?;
        self.slot[top.node] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top.node)
    }

    /// The node `pop` would return, without removing it.
    pub(crate) fn peek(&self) -> Option<usize> {
        self.heap.first().map(|e| e.node)
    }

    // -----------------------------------------------------------------------
    // Heap maintenance
    // -----------------------------------------------------------------------

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slot[self.heap[a].node] = a;
        self.slot[self.heap[b].node] = b;
    }

    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.heap[right].precedes(&self.heap[left]) {
                right
            } else {
                left
            };
            if !self.heap[child].precedes(&self.heap[i]) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
    }
}
