use isoview_blocks::MapSource;
use isoview_cell::light::Side;
use isoview_cell::{CellLookup, CellRef, RenderContext, new_cell_at};
use isoview_geom::Coord;

use crate::grid::{CellGrid, ChunkDims, HALO_X, HALO_Y};
use crate::pool::ChunkBufferPool;

/// Top side level under a block two layers up.
pub const SHADOW_NEAR: f32 = 0.8;
/// Top side level under a block three layers up.
pub const SHADOW_FAR: f32 = 0.92;

/// Render cells of one map chunk, padded by a halo that mirrors the neighbours.
pub struct RenderChunk {
    chunk_x: i32,
    chunk_y: i32,
    top_left_x: i32,
    top_left_y: i32,
    grid: CellGrid,
    sentinel: CellRef,
    camera_access: bool,
}

impl RenderChunk {
    /// Takes a grid from `pool` and fills it from `map`.
    pub fn new(
        chunk_x: i32,
        chunk_y: i32,
        pool: &mut ChunkBufferPool,
        map: &dyn MapSource,
        ctx: &RenderContext,
    ) -> Self {
        let dims = pool.dims();
        let mut chunk = Self {
            chunk_x,
            chunk_y,
            top_left_x: chunk_x * dims.blocks_x as i32,
            top_left_y: chunk_y * dims.blocks_y as i32,
            grid: pool.obtain(),
            sentinel: pool.sentinel().clone(),
            camera_access: false,
        };
        chunk.init_data(map, ctx);
        chunk
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.grid.dims()
    }

    #[inline]
    fn slot_coord(&self, lx: usize, ly: usize, z: usize) -> Coord {
        Coord::new(
            self.top_left_x + lx as i32 - HALO_X as i32,
            self.top_left_y + ly as i32 - HALO_Y as i32,
            z as i32,
        )
    }

    /// Syncs every slot, halo included, with the map and recomputes the drop shadows.
    ///
    /// Cells whose id still matches are kept and only get their value, coordinate and
    /// clipping refreshed. Returns how many slots were replaced or moved; when that is
    /// non-zero the context version is bumped so covered lists rebuild.
    pub fn init_data(&mut self, map: &dyn MapSource, ctx: &RenderContext) -> usize {
        let dims = self.grid.dims();
        let mut changed = 0;
        for z in 0..dims.grid_z() {
            for ly in 0..dims.grid_y() {
                for lx in 0..dims.grid_x() {
                    let coord = self.slot_coord(lx, ly, z);
                    let block = map.block_packed(coord);
                    let slot = self.grid.get(lx, ly, z);
                    let keep = !slot.is_sentinel() && slot.borrow().id() == block.id();
                    if !keep {
                        self.grid
                            .set(lx, ly, z, CellRef::new(new_cell_at(ctx, block.id(), block.value(), coord)));
                        changed += 1;
                        continue;
                    }
                    if let Some(mut cell) = slot.edit() {
                        if cell.value() != block.value() {
                            cell.set_value(block.value());
                        }
                        if cell.coord() != coord {
                            cell.set_coord(coord);
                            changed += 1;
                        }
                        cell.set_unclipped();
                    }
                }
            }
        }
        for z in 0..dims.grid_z() {
            for ly in 0..dims.grid_y() {
                for lx in 0..dims.grid_x() {
                    self.shade_slot(lx, ly, z, ctx);
                }
            }
        }
        if changed > 0 {
            ctx.mark_content_changed();
        }
        changed
    }

    /// Recomputes the drop shadow of one core cell. Indices are core-local; out of
    /// range indices are ignored.
    pub fn reset_shading_for(&self, x: usize, y: usize, z: usize, ctx: &RenderContext) {
        let dims = self.grid.dims();
        if x < dims.blocks_x && y < dims.blocks_y && z < dims.blocks_z {
            self.shade_slot(x + HALO_X, y + HALO_Y, z, ctx);
        }
    }

    fn shade_slot(&self, lx: usize, ly: usize, z: usize, ctx: &RenderContext) {
        let layers = self.grid.dims().grid_z();
        let transparent = |dz: usize| self.grid.get(lx, ly, z + dz).borrow().is_transparent(ctx);

        let mut top = None;
        if z + 2 < layers && transparent(1) {
            if !transparent(2) {
                top = Some(SHADOW_NEAR);
            } else if z + 3 < layers && !transparent(3) {
                top = Some(SHADOW_FAR);
            }
        }

        let Some(mut cell) = self.grid.get(lx, ly, z).edit() else {
            return;
        };
        cell.set_light_level(1.0);
        if let Some(level) = top {
            cell.set_light_level_side(level, Side::Top);
        }
    }

    /// Sentinel for layers outside the chunk, `None` outside the padded footprint.
    pub fn get_cell(&self, coord: Coord) -> Option<&CellRef> {
        let dims = self.grid.dims();
        if coord.z < 0 || coord.z >= dims.grid_z() as i32 {
            return Some(&self.sentinel);
        }
        let lx = coord.x - self.top_left_x + HALO_X as i32;
        let ly = coord.y - self.top_left_y + HALO_Y as i32;
        if lx < 0 || ly < 0 || lx >= dims.grid_x() as i32 || ly >= dims.grid_y() as i32 {
            return None;
        }
        Some(self.grid.get(lx as usize, ly as usize, coord.z as usize))
    }

    pub fn get_cell_xyz(&self, x: i32, y: i32, z: i32) -> Option<&CellRef> {
        self.get_cell(Coord::new(x, y, z))
    }

    /// Core-local index access.
    pub fn get_cell_by_index(&self, x: usize, y: usize, z: usize) -> Option<&CellRef> {
        let dims = self.grid.dims();
        (x < dims.blocks_x && y < dims.blocks_y && z < dims.blocks_z)
            .then(|| self.grid.get(x + HALO_X, y + HALO_Y, z))
    }

    /// Whether the coordinate belongs to the core of this chunk.
    pub fn contains(&self, coord: Coord) -> bool {
        let dims = self.grid.dims();
        coord.x >= self.top_left_x
            && coord.x < self.top_left_x + dims.blocks_x as i32
            && coord.y >= self.top_left_y
            && coord.y < self.top_left_y + dims.blocks_y as i32
            && coord.z >= 0
            && coord.z < dims.blocks_z as i32
    }

    /// Core cells in layers `start_z..=limit_z`, bottom layer first.
    pub fn iter(&self, start_z: usize, limit_z: usize) -> impl Iterator<Item = &CellRef> + '_ {
        let dims = self.grid.dims();
        let end = limit_z.saturating_add(1).min(dims.blocks_z);
        (start_z.min(end)..end).flat_map(move |z| {
            (0..dims.blocks_y).flat_map(move |y| {
                (0..dims.blocks_x).map(move |x| self.grid.get(x + HALO_X, y + HALO_Y, z))
            })
        })
    }

    pub fn reset_clipping(&self) {
        for slot in self.grid.slots() {
            if let Some(mut cell) = slot.edit() {
                cell.set_unclipped();
            }
        }
    }

    pub fn clear_covered_entities(&self) {
        for slot in self.grid.slots() {
            if let Some(mut cell) = slot.edit() {
                cell.clear_covered_entities();
            }
        }
    }

    /// Whether a camera used this chunk this frame.
    #[inline]
    pub fn camera_access(&self) -> bool {
        self.camera_access
    }

    #[inline]
    pub fn set_camera_access(&mut self, access: bool) {
        self.camera_access = access;
    }

    #[inline]
    pub fn top_left_x(&self) -> i32 {
        self.top_left_x
    }

    #[inline]
    pub fn top_left_y(&self) -> i32 {
        self.top_left_y
    }

    #[inline]
    pub fn chunk_x(&self) -> i32 {
        self.chunk_x
    }

    #[inline]
    pub fn chunk_y(&self) -> i32 {
        self.chunk_y
    }

    /// Hands the grid back to the pool. Its cells stay in place for the next user.
    pub fn dispose(self, pool: &mut ChunkBufferPool) {
        pool.free(self.grid);
    }
}

impl CellLookup for RenderChunk {
    fn cell_at(&self, coord: Coord) -> Option<CellRef> {
        self.get_cell(coord).cloned()
    }

    fn layers(&self) -> i32 {
        self.grid.dims().grid_z() as i32
    }
}
