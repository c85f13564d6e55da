//! Sprite lookup with fallbacks.
//!
//! Block sides are named `b{id}-{value}-{side}`, flat sprites `{category}{id}-{value}`.
//! A missing side falls back to the air sprite of the same side, then to `error`.

use hashbrown::HashMap;
use isoview_blocks::{BlockId, BlockValue};
use isoview_geom::{VIEW_DEPTH2, VIEW_DEPTH4};

use crate::light::Side;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegionId(pub u32);

/// Texture atlas provided by the asset layer.
pub trait SpriteAtlas {
    fn find_region(&self, name: &str) -> Option<RegionId>;

    /// RGBA of the pixel at `(dx, dy)` relative to the region origin.
    fn sample(&self, region: RegionId, dx: i32, dy: i32) -> Option<[f32; 4]>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    Unavailable,
    Missing { name: String },
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasError::Unavailable => write!(f, "no spritesheet loaded"),
            AtlasError::Missing { name } => {
                write!(f, "sprite '{}' not found and the sheet has no fallback or 'error' sprite", name)
            }
        }
    }
}

impl std::error::Error for AtlasError {}

/// Caches resolved regions and representing colours per `(id, value)`.
pub struct BlockSprites {
    atlas: Option<Box<dyn SpriteAtlas>>,
    sides: HashMap<(BlockId, BlockValue, Side), RegionId>,
    flats: HashMap<(char, BlockId, BlockValue), RegionId>,
    colors: HashMap<(BlockId, BlockValue), [f32; 4]>,
}

impl BlockSprites {
    pub fn new(atlas: Option<Box<dyn SpriteAtlas>>) -> Self {
        Self {
            atlas,
            sides: HashMap::new(),
            flats: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    pub fn has_atlas(&self) -> bool {
        self.atlas.is_some()
    }

    fn atlas(&self) -> Result<&dyn SpriteAtlas, AtlasError> {
        self.atlas.as_deref().ok_or(AtlasError::Unavailable)
    }

    fn resolve(atlas: &dyn SpriteAtlas, name: &str, fallback: &str) -> Result<RegionId, AtlasError> {
        if let Some(r) = atlas.find_region(name) {
            return Ok(r);
        }
        log::debug!("sprite {name} not found, using {fallback}");
        atlas
            .find_region(fallback)
            .or_else(|| atlas.find_region("error"))
            .ok_or_else(|| AtlasError::Missing {
                name: name.to_string(),
            })
    }

    pub fn block_sprite(&mut self, id: BlockId, value: BlockValue, side: Side) -> Result<RegionId, AtlasError> {
        if let Some(r) = self.sides.get(&(id, value, side)) {
            return Ok(*r);
        }
        let atlas = self.atlas()?;
        let code = side.code();
        let region = Self::resolve(atlas, &format!("b{id}-{value}-{code}"), &format!("b0-0-{code}"))?;
        self.sides.insert((id, value, side), region);
        Ok(region)
    }

    pub fn sprite(&mut self, category: char, id: BlockId, value: BlockValue) -> Result<RegionId, AtlasError> {
        if let Some(r) = self.flats.get(&(category, id, value)) {
            return Ok(*r);
        }
        let atlas = self.atlas()?;
        let region = Self::resolve(atlas, &format!("{category}{id}-{value}"), &format!("{category}0-0"))?;
        self.flats.insert((category, id, value), region);
        Ok(region)
    }

    /// Whether the sheet has a dedicated sprite, so no error sprite would be drawn.
    pub fn is_sprite_defined(&self, id: BlockId, value: BlockValue, has_sides: bool) -> bool {
        let Some(atlas) = self.atlas.as_deref() else {
            return false;
        };
        let name = if has_sides {
            format!("b{id}-{value}-0")
        } else {
            format!("b{id}-{value}")
        };
        id != 0 && atlas.find_region(&name).is_some()
    }

    /// Colour standing in for the block on minimaps and particles, sampled once from
    /// the top side (or the flat sprite). Transparent black when nothing can be sampled.
    pub fn representing_color(&mut self, id: BlockId, value: BlockValue, has_sides: bool) -> [f32; 4] {
        if let Some(c) = self.colors.get(&(id, value)) {
            return *c;
        }
        let sampled = if has_sides {
            self.block_sprite(id, value, Side::Top)
                .ok()
                .and_then(|r| self.atlas.as_deref()?.sample(r, VIEW_DEPTH2, VIEW_DEPTH4))
        } else {
            self.sprite('b', id, value)
                .ok()
                .and_then(|r| self.atlas.as_deref()?.sample(r, VIEW_DEPTH2, VIEW_DEPTH2))
        };
        match sampled {
            Some(c) => {
                self.colors.insert((id, value), c);
                c
            }
            None => [0.0; 4],
        }
    }

    /// Drops every cached lookup, e.g. after the atlas was reloaded.
    pub fn clear(&mut self) {
        self.sides.clear();
        self.flats.clear();
        self.colors.clear();
    }
}
