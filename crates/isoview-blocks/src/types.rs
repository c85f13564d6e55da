pub type BlockId = u8;
pub type BlockValue = u8;
/// Block health in the range `0..=100`.
pub type Health = u8;

/// Number of distinct block ids.
pub const OBJECT_TYPES: usize = 124;
/// Number of distinct values per id.
pub const VALUES: usize = 64;
pub const FULL_HEALTH: Health = 100;

pub const AIR: BlockId = 0;
pub const GRASS: BlockId = 1;
pub const DIRT: BlockId = 2;
pub const STONE: BlockId = 3;
pub const INVISIBLE_WALL: BlockId = 4;
pub const SAND: BlockId = 8;
pub const WATER: BlockId = 9;
/// Highest id with hard-coded behaviour. Larger ids go through the classifier.
pub const LAST_BUILTIN: BlockId = WATER;

/// A map cell as stored by the map: id in bits 0-7, value in 8-15, health in 16-23.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedBlock(pub u32);

impl PackedBlock {
    pub const AIR: PackedBlock = PackedBlock(0);

    #[inline]
    pub const fn new(id: BlockId, value: BlockValue, health: Health) -> Self {
        PackedBlock(id as u32 | (value as u32) << 8 | (health as u32) << 16)
    }

    /// Full-health block.
    #[inline]
    pub const fn block(id: BlockId, value: BlockValue) -> Self {
        Self::new(id, value, FULL_HEALTH)
    }

    #[inline]
    pub const fn id(self) -> BlockId {
        (self.0 & 0xFF) as BlockId
    }

    #[inline]
    pub const fn value(self) -> BlockValue {
        ((self.0 >> 8) & 0xFF) as BlockValue
    }

    #[inline]
    pub const fn health(self) -> Health {
        ((self.0 >> 16) & 0xFF) as Health
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        self.id() == AIR
    }
}
