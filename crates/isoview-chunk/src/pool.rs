use isoview_cell::CellRef;

use crate::grid::{CellGrid, ChunkDims};

pub const DEFAULT_POOL_CAPACITY: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated: u64,
    pub reused: u64,
    pub discarded: u64,
    pub free: usize,
}

/// Bounded free list of cell grids for one chunk size.
///
/// Returned grids keep their cells, so a chunk built on a reused grid only replaces
/// the slots whose block id differs.
pub struct ChunkBufferPool {
    dims: ChunkDims,
    capacity: usize,
    sentinel: CellRef,
    free: Vec<CellGrid>,
    allocated: u64,
    reused: u64,
    discarded: u64,
}

impl ChunkBufferPool {
    pub fn new(dims: ChunkDims, capacity: usize, sentinel: CellRef) -> Self {
        Self {
            dims,
            capacity,
            sentinel,
            free: Vec::with_capacity(capacity),
            allocated: 0,
            reused: 0,
            discarded: 0,
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sentinel(&self) -> &CellRef {
        &self.sentinel
    }

    /// A free grid if one is pooled, else a new one filled with the sentinel.
    pub fn obtain(&mut self) -> CellGrid {
        if let Some(grid) = self.free.pop() {
            self.reused += 1;
            log::debug!("reusing chunk grid ({} left in pool)", self.free.len());
            return grid;
        }
        self.allocated += 1;
        CellGrid::new(self.dims, &self.sentinel)
    }

    pub fn free(&mut self, grid: CellGrid) {
        if grid.dims() != self.dims {
            log::warn!(
                "dropping chunk grid of size {:?}, pool holds {:?}",
                grid.dims(),
                self.dims
            );
            self.discarded += 1;
            return;
        }
        if self.free.len() >= self.capacity {
            self.discarded += 1;
            return;
        }
        self.free.push(grid);
    }

    /// Drops every pooled grid.
    pub fn clear(&mut self) {
        self.discarded += self.free.len() as u64;
        self.free.clear();
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated,
            reused: self.reused,
            discarded: self.discarded,
            free: self.free.len(),
        }
    }
}
