use crate::light::Side;

/// Ambient occlusion flags. Byte 0 belongs to the left side, byte 1 to the top and
/// byte 2 to the right side. Inside a byte, bits 0-7 mark the neighbour directions
/// clockwise from the back corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AoFlags(pub u32);

impl AoFlags {
    /// Number of used bits, one byte per side.
    pub const BITS: u8 = 24;

    /// Bit index of `direction` (0-7) on `side`.
    #[inline]
    pub fn bit(side: Side, direction: u8) -> u8 {
        side.code() as u8 * 8 + (direction & 7)
    }

    /// Copy with `bit` set or cleared. Indices of [`AoFlags::BITS`] and above name no
    /// side and leave the flags unchanged.
    #[inline]
    pub fn with(self, bit: u8, on: bool) -> AoFlags {
        if bit >= Self::BITS {
            return self;
        }
        let mask = 1u32 << bit;
        if on {
            AoFlags(self.0 | mask)
        } else {
            AoFlags(self.0 & !mask)
        }
    }

    /// Always `false` for indices of [`AoFlags::BITS`] and above.
    #[inline]
    pub fn get(self, bit: u8) -> bool {
        bit < Self::BITS && self.0 & (1u32 << bit) != 0
    }

    #[inline]
    pub fn side_byte(self, side: Side) -> u8 {
        (self.0 >> (side.code() * 8)) as u8
    }
}

/// One bit per side; a cell is skipped only when all three are set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Clipping(pub u8);

impl Clipping {
    pub const ALL: u8 = 0b111;

    #[inline]
    pub fn set(&mut self, side: Side) {
        self.0 |= 1 << side.code();
    }

    #[inline]
    pub fn is_side_clipped(self, side: Side) -> bool {
        self.0 & (1 << side.code()) != 0
    }

    #[inline]
    pub fn is_clipped(self) -> bool {
        self.0 == Self::ALL
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}
