//! Packed per-vertex lighting.
//!
//! Every side of a cell has four vertices, each holding one `u32` with three 10-bit
//! channels: red in bits 20-29, green in 10-19, blue in 0-9. A stored level of 512
//! is unit brightness, so the encoding spans 0 to about 2x.

/// Visible face of a block sprite.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left = 0,
    Top = 1,
    Right = 2,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Left, Side::Top, Side::Right];

    #[inline]
    pub fn code(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    #[inline]
    pub fn shift(self) -> u32 {
        20 - 10 * self as u32
    }
}

pub const VERTICES: usize = 4;
pub const CHANNEL_MASK: u32 = 0x3FF;
pub const CHANNEL_MAX: u32 = 1023;
/// Stored level of unit brightness.
pub const UNIT_LEVEL: u32 = 512;
/// Every channel at unit brightness.
pub const NEUTRAL_LIGHT: u32 = UNIT_LEVEL << 20 | UNIT_LEVEL << 10 | UNIT_LEVEL;

/// Quantize a brightness factor (0 to 2) into a 10-bit channel level.
#[inline]
pub fn encode_level(level: f32) -> u32 {
    if level <= 0.0 || level.is_nan() {
        return 0;
    }
    ((level * UNIT_LEVEL as f32) as u32).min(CHANNEL_MAX)
}

#[inline]
pub fn decode_level(raw: u32) -> f32 {
    (raw & CHANNEL_MASK) as f32 / 511.0
}

/// Same level in all three channels.
#[inline]
pub fn grey_word(level: f32) -> u32 {
    let l = encode_level(level);
    l << 20 | l << 10 | l
}

#[inline]
pub fn channel_of(word: u32, channel: Channel) -> u32 {
    (word >> channel.shift()) & CHANNEL_MASK
}

/// Light words for the three sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLight {
    words: [[u32; VERTICES]; 3],
}

impl Default for CellLight {
    fn default() -> Self {
        Self::neutral()
    }
}

impl CellLight {
    pub const fn neutral() -> Self {
        Self {
            words: [[NEUTRAL_LIGHT; VERTICES]; 3],
        }
    }

    #[inline]
    pub fn word(&self, side: Side, vertex: usize) -> u32 {
        self.words[side.code()][vertex]
    }

    #[inline]
    pub fn side_words(&self, side: Side) -> [u32; VERTICES] {
        self.words[side.code()]
    }

    pub fn set_all(&mut self, level: f32) {
        let w = grey_word(level);
        for side in self.words.iter_mut() {
            side.fill(w);
        }
    }

    pub fn set_side(&mut self, level: f32, side: Side) {
        self.words[side.code()].fill(grey_word(level));
    }

    pub fn set_vertex(&mut self, level: f32, side: Side, vertex: usize) {
        self.words[side.code()][vertex] = grey_word(level);
    }

    /// ORs the level into one channel. The channel must be zero beforehand for the
    /// result to equal `level`; see [`CellLight::clear_channel`].
    pub fn merge_channel(&mut self, level: f32, side: Side, channel: Channel, vertex: usize) {
        self.words[side.code()][vertex] |= encode_level(level) << channel.shift();
    }

    /// Adds in raw units, saturating at 1023, and ORs the sum back. Accumulation
    /// primitive for light spreading passes that start from a cleared channel.
    pub fn add_channel(&mut self, level: f32, side: Side, channel: Channel, vertex: usize) {
        let word = &mut self.words[side.code()][vertex];
        let sum = (channel_of(*word, channel) + encode_level(level)).min(CHANNEL_MAX);
        *word |= sum << channel.shift();
    }

    pub fn clear_channel(&mut self, side: Side, channel: Channel, vertex: usize) {
        self.words[side.code()][vertex] &= !(CHANNEL_MASK << channel.shift());
    }

    pub fn reset(&mut self) {
        *self = Self::neutral();
    }

    #[inline]
    pub fn level(&self, side: Side, vertex: usize, channel: Channel) -> f32 {
        decode_level(channel_of(self.word(side, vertex), channel))
    }

    /// Vertex 0 of every side, averaged. For coarse consumers such as entity tinting.
    pub fn average(&self, channel: Channel) -> f32 {
        Side::ALL
            .iter()
            .map(|&s| self.level(s, 0, channel))
            .sum::<f32>()
            / 3.0
    }
}
