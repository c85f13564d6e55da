//! View-side cell state: packed lighting, occlusion flags, covered lists and drawing.
#![forbid(unsafe_code)]

pub mod cell;
pub mod context;
pub mod covered;
pub mod flags;
pub mod light;
pub mod render;
pub mod sprites;

#[cfg(test)]
mod tests;

pub use cell::{CellBehavior, CellKind, CellRef, LiquidSurface, RenderCell, new_cell, new_cell_at};
pub use context::{CellClassifier, RenderContext, RenderSettings};
pub use covered::{CellLookup, CoveredEntity, Drawable};
pub use flags::{AoFlags, Clipping};
pub use light::{CellLight, Channel, NEUTRAL_LIGHT, Side};
pub use render::{Camera, SideDraw, SideSprite, SpriteBatch, SpriteDraw};
pub use sprites::{AtlasError, BlockSprites, RegionId, SpriteAtlas};
