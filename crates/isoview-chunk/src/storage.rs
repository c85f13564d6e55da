use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use isoview_blocks::MapSource;
use isoview_cell::{Camera, CellLookup, CellRef, RenderContext};
use isoview_geom::Coord;

use crate::chunk::RenderChunk;
use crate::grid::ChunkDims;
use crate::pool::{ChunkBufferPool, PoolStats};

/// Loaded render chunks keyed by chunk coordinate.
///
/// Lookups resolve to the chunk that owns the coordinate in its core, so every map
/// position has exactly one canonical cell here.
pub struct RenderStorage {
    dims: ChunkDims,
    pool: ChunkBufferPool,
    chunks: HashMap<(i32, i32), RenderChunk>,
}

impl RenderStorage {
    pub fn new(dims: ChunkDims, pool_capacity: usize, ctx: &RenderContext) -> Self {
        Self {
            dims,
            pool: ChunkBufferPool::new(dims, pool_capacity, ctx.sentinel().clone()),
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Chunk holding `coord` in its core.
    pub fn chunk_of(&self, coord: Coord) -> (i32, i32) {
        (
            coord.x.div_euclid(self.dims.blocks_x as i32),
            coord.y.div_euclid(self.dims.blocks_y as i32),
        )
    }

    /// Builds the chunk unless it is already loaded. A new chunk invalidates every covered
    /// list, since cells along its border may now resolve neighbours inside it.
    pub fn load(&mut self, chunk_x: i32, chunk_y: i32, map: &dyn MapSource, ctx: &RenderContext) -> &RenderChunk {
        match self.chunks.entry((chunk_x, chunk_y)) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let chunk = RenderChunk::new(chunk_x, chunk_y, &mut self.pool, map, ctx);
                ctx.mark_content_changed();
                e.insert(chunk)
            }
        }
    }

    /// Returns the chunk's grid to the pool. Covered lists pointing into it are
    /// invalidated.
    pub fn unload(&mut self, chunk_x: i32, chunk_y: i32, ctx: &RenderContext) -> bool {
        match self.chunks.remove(&(chunk_x, chunk_y)) {
            Some(chunk) => {
                chunk.dispose(&mut self.pool);
                ctx.mark_content_changed();
                true
            }
            None => false,
        }
    }

    /// Unloads every chunk further than `radius` chunks from `center`.
    pub fn retain_around(&mut self, center: (i32, i32), radius: i32, ctx: &RenderContext) -> usize {
        let far: Vec<(i32, i32)> = self
            .chunks
            .keys()
            .copied()
            .filter(|(x, y)| (x - center.0).abs() > radius || (y - center.1).abs() > radius)
            .collect();
        for (x, y) in &far {
            self.unload(*x, *y, ctx);
        }
        far.len()
    }

    /// Re-syncs every loaded chunk with the map. Returns the replaced slot count.
    pub fn refresh(&mut self, map: &dyn MapSource, ctx: &RenderContext) -> usize {
        self.chunks
            .values_mut()
            .map(|chunk| chunk.init_data(map, ctx))
            .sum()
    }

    pub fn chunk(&self, chunk_x: i32, chunk_y: i32) -> Option<&RenderChunk> {
        self.chunks.get(&(chunk_x, chunk_y))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &RenderChunk> {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sentinel above and below the map, `None` where no chunk is loaded.
    pub fn get_cell(&self, coord: Coord) -> Option<CellRef> {
        if coord.z < 0 || coord.z >= self.dims.blocks_z as i32 {
            return Some(self.pool.sentinel().clone());
        }
        let (cx, cy) = self.chunk_of(coord);
        self.chunks.get(&(cx, cy))?.get_cell(coord).cloned()
    }

    pub fn reset_clipping(&self) {
        for chunk in self.chunks.values() {
            chunk.reset_clipping();
        }
    }

    pub fn clear_covered_entities(&self) {
        for chunk in self.chunks.values() {
            chunk.clear_covered_entities();
        }
    }

    pub fn reset_camera_access(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.set_camera_access(false);
        }
    }

    /// Core cells the camera should draw. Marks the chunks that contributed.
    pub fn cells_in_frustum(&mut self, camera: &dyn Camera) -> Vec<CellRef> {
        let mut out = Vec::new();
        for chunk in self.chunks.values_mut() {
            let before = out.len();
            out.extend(
                chunk
                    .iter(0, usize::MAX)
                    .filter(|c| c.borrow().should_be_rendered(camera))
                    .cloned(),
            );
            if out.len() > before {
                chunk.set_camera_access(true);
            }
        }
        out
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Unloads everything and empties the pool.
    pub fn clear(&mut self, ctx: &RenderContext) {
        if !self.chunks.is_empty() {
            ctx.mark_content_changed();
        }
        for (_, chunk) in self.chunks.drain() {
            chunk.dispose(&mut self.pool);
        }
        self.pool.clear();
    }
}

impl CellLookup for RenderStorage {
    fn cell_at(&self, coord: Coord) -> Option<CellRef> {
        self.get_cell(coord)
    }

    fn layers(&self) -> i32 {
        self.dims.blocks_z as i32
    }
}
