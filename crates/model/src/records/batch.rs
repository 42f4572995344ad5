use crate::records::row::PerformanceRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId {
    pub worker: usize,
    pub seq: u64,
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}-b{}", self.worker, self.seq)
    }
}

/// Rows accumulated by a single worker until they are committed together.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: BatchId,
    pub rows: Vec<PerformanceRow>,
    capacity: usize,
}

impl Batch {
    pub fn new(id: BatchId, capacity: usize) -> Self {
        Batch {
            id,
            rows: Vec::with_capacity(capacity.min(64 * 1024)),
            capacity,
        }
    }

    pub fn push(&mut self, row: PerformanceRow) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }
}
