use isoview_geom::Coord;

use crate::types::{FULL_HEALTH, Health, PackedBlock};

/// Read access to the authoritative block map.
pub trait MapSource {
    /// Packed block at `coord`. Positions outside the map read as air.
    fn block_packed(&self, coord: Coord) -> PackedBlock;

    /// Health of the block at `coord`. The default reads the packed health byte and
    /// treats 0 as unset, i.e. full health: destroyed blocks are air, not zero-health
    /// blocks. Maps that need a real zero override this.
    fn health(&self, coord: Coord) -> Health {
        match self.block_packed(coord).health() {
            0 => FULL_HEALTH,
            h => h,
        }
    }
}

/// Map with no blocks at all. Every cell reads as air at full health.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyMap;

impl MapSource for EmptyMap {
    fn block_packed(&self, _coord: Coord) -> PackedBlock {
        PackedBlock::AIR
    }

    fn health(&self, _coord: Coord) -> Health {
        FULL_HEALTH
    }
}
