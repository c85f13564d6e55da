use isoview_cell::CellRef;

/// Columns of halo on each side of the core along x.
pub const HALO_X: usize = 1;
/// Rows of halo on each side of the core along y. Two rows keep the covered walk
/// (`y - 2`) inside the grid.
pub const HALO_Y: usize = 2;

/// Core size of a chunk in blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDims {
    pub blocks_x: usize,
    pub blocks_y: usize,
    pub blocks_z: usize,
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::new(10, 40, 10)
    }
}

impl ChunkDims {
    pub const fn new(blocks_x: usize, blocks_y: usize, blocks_z: usize) -> Self {
        Self {
            blocks_x,
            blocks_y,
            blocks_z,
        }
    }

    #[inline]
    pub fn grid_x(&self) -> usize {
        self.blocks_x + 2 * HALO_X
    }

    #[inline]
    pub fn grid_y(&self) -> usize {
        self.blocks_y + 2 * HALO_Y
    }

    #[inline]
    pub fn grid_z(&self) -> usize {
        self.blocks_z
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.grid_x() * self.grid_y() * self.grid_z()
    }
}

/// Padded cell buffer. Slots start out as the sentinel.
#[derive(Clone, Debug)]
pub struct CellGrid {
    dims: ChunkDims,
    slots: Vec<CellRef>,
}

impl CellGrid {
    pub fn new(dims: ChunkDims, sentinel: &CellRef) -> Self {
        Self {
            dims,
            slots: vec![sentinel.clone(); dims.volume()],
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dims.grid_y() + y) * self.dims.grid_x() + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &CellRef {
        &self.slots[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, cell: CellRef) {
        let i = self.idx(x, y, z);
        self.slots[i] = cell;
    }

    pub fn slots(&self) -> &[CellRef] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
