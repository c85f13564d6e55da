//! Turning a cell into draw commands.

use isoview_blocks::{Health, MapSource};
use isoview_blocks::types::FULL_HEALTH;
use isoview_geom::{Coord, GAME_DIAGLENGTH2, GAME_EDGELENGTH, Point, VIEW_HEIGHT, VIEW_HEIGHT2, VIEW_WIDTH2};

use crate::cell::{CellKind, RenderCell};
use crate::context::RenderContext;
use crate::flags::AoFlags;
use crate::light::{Channel, Side, VERTICES};
use crate::sprites::{AtlasError, BlockSprites, RegionId};

/// Sprite category and id of the damage overlay sheet.
pub const DAMAGE_CATEGORY: char = 'e';
pub const DAMAGE_SPRITE_ID: u8 = 3;
pub const DAMAGE_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.7];
pub const LIQUID_ALPHA: f32 = 0.8;
const STATIC_SHADE: f32 = 0.25;
const GREY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

pub trait Camera {
    fn in_view_frustum(&self, coord: Coord) -> bool;

    /// Row index of the lowest visible front border, used by the fog falloff.
    fn visible_front_border_high(&self) -> i32;
}

/// One block side with per-vertex colours.
#[derive(Clone, Debug, PartialEq)]
pub struct SideDraw {
    pub region: RegionId,
    pub side: Side,
    pub x: i32,
    pub y: i32,
    pub vertex_colors: [[f32; 3]; VERTICES],
    pub tint: [f32; 4],
    pub ao: u8,
}

/// A flat sprite: side-less blocks and damage overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteDraw {
    pub region: RegionId,
    pub x: i32,
    pub y: i32,
    pub color: [f32; 4],
}

/// Receives draw commands in paint order.
pub trait SpriteBatch {
    fn draw_side(&mut self, draw: &SideDraw);
    fn draw_sprite(&mut self, draw: &SpriteDraw);
}

/// Cached per-side sprite state of a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SideSprite {
    region: RegionId,
    side: Side,
    ao: AoFlags,
    x: i32,
    y: i32,
}

impl SideSprite {
    pub fn new(region: RegionId, side: Side, ao: AoFlags) -> Self {
        Self { region, side, ao, x: 0, y: 0 }
    }

    pub fn set_ao_flags(&mut self, ao: AoFlags) {
        self.ao = ao;
    }

    pub fn ao_flags(&self) -> AoFlags {
        self.ao
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Overlay step for a health value, `None` at full health.
pub fn damage_tier(health: Health) -> Option<u8> {
    match health {
        h if h >= FULL_HEALTH => None,
        h if h <= 25 => Some(2),
        h if h <= 50 => Some(1),
        _ => Some(0),
    }
}

impl RenderCell {
    pub fn should_be_rendered(&self, camera: &dyn Camera) -> bool {
        self.id != 0 && !self.is_clipped() && !self.hidden && camera.in_view_frustum(self.coord)
    }

    /// Cached sprite of one side, present once that side was drawn.
    pub fn side_sprite(&self, side: Side) -> Option<&SideSprite> {
        self.sprites[side.code()].as_ref()
    }

    /// Draws the unclipped sides (top, left, right) or the flat sprite of a side-less
    /// block. Fails only when the sprite sheet cannot provide any region at all.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        camera: &dyn Camera,
        map: &dyn MapSource,
        sprites: &mut BlockSprites,
        batch: &mut dyn SpriteBatch,
    ) -> Result<(), AtlasError> {
        if self.hidden {
            return Ok(());
        }
        if !self.has_sides(ctx) {
            return self.render_flat(ctx, sprites, batch);
        }
        let health = map.health(self.coord);
        for side in [Side::Top, Side::Left, Side::Right] {
            if !self.clipping.is_side_clipped(side) {
                self.render_side(ctx, camera, side, health, sprites, batch)?;
            }
        }
        Ok(())
    }

    fn side_tint(&self, ctx: &RenderContext, camera: &dyn Camera, side: Side) -> [f32; 4] {
        let settings = ctx.settings();
        let mut tint = if settings.fog {
            let dist = camera.visible_front_border_high() - self.coord.y - 18;
            let f = (0.025 * dist as f32).exp() - 1.0;
            [0.5 + 0.3 * f, 0.5 + 0.4 * f, 0.5 + f, 1.0]
        } else {
            GREY
        };
        if settings.static_shade {
            let delta = match side {
                Side::Left => STATIC_SHADE,
                Side::Right => -STATIC_SHADE,
                Side::Top => 0.0,
            };
            for c in &mut tint[..3] {
                *c += delta;
            }
        }
        if matches!(self.kind, CellKind::Liquid(_)) {
            tint[3] = LIQUID_ALPHA;
        }
        tint
    }

    fn render_side(
        &mut self,
        ctx: &RenderContext,
        camera: &dyn Camera,
        side: Side,
        health: Health,
        sprites: &mut BlockSprites,
        batch: &mut dyn SpriteBatch,
    ) -> Result<(), AtlasError> {
        let (id, value) = self.sprite();
        if id == 0 {
            return Ok(());
        }
        let region = sprites.block_sprite(id, value, side)?;

        let mut x = self.coord.view_x() - VIEW_WIDTH2;
        let mut y = self.coord.view_y() - VIEW_HEIGHT2;
        match side {
            Side::Right => x += VIEW_WIDTH2,
            Side::Top => {
                y += VIEW_HEIGHT;
                if let CellKind::Liquid(surface) = &self.kind {
                    y += surface.wave_offset();
                }
            }
            Side::Left => {}
        }

        let ao = self.ao;
        let sprite = self.sprites[side.code()].get_or_insert_with(|| SideSprite::new(region, side, ao));
        sprite.region = region;
        sprite.x = x;
        sprite.y = y;

        let mut vertex_colors = [[0.0; 3]; VERTICES];
        for (v, rgb) in vertex_colors.iter_mut().enumerate() {
            for ch in Channel::ALL {
                rgb[ch as usize] = self.light.level(side, v, ch) / 2.0;
            }
        }

        batch.draw_side(&SideDraw {
            region,
            side,
            x,
            y,
            vertex_colors,
            tint: self.side_tint(ctx, camera, side),
            ao: ao.side_byte(side),
        });
        ctx.count_draw_call();

        if let Some(tier) = damage_tier(health) {
            self.render_damage_overlay(ctx, side, tier, sprites, batch)?;
        }
        Ok(())
    }

    fn render_damage_overlay(
        &self,
        ctx: &RenderContext,
        side: Side,
        tier: u8,
        sprites: &mut BlockSprites,
        batch: &mut dyn SpriteBatch,
    ) -> Result<(), AtlasError> {
        let offset = match side {
            Side::Left => Point::new(-(GAME_DIAGLENGTH2 / 2) as f32, 0.0, 0.0),
            Side::Top => Point::new(0.0, 0.0, GAME_EDGELENGTH as f32),
            Side::Right => Point::new((GAME_DIAGLENGTH2 / 2) as f32, 0.0, 0.0),
        };
        let at = self.coord.to_point() + offset;
        let value = 3 * tier + side.code() as u8;
        let region = sprites.sprite(DAMAGE_CATEGORY, DAMAGE_SPRITE_ID, value)?;
        batch.draw_sprite(&SpriteDraw {
            region,
            x: at.view_x() - VIEW_WIDTH2,
            y: at.view_y() - VIEW_HEIGHT2,
            color: DAMAGE_COLOR,
        });
        ctx.count_draw_call();
        Ok(())
    }

    fn render_flat(
        &self,
        ctx: &RenderContext,
        sprites: &mut BlockSprites,
        batch: &mut dyn SpriteBatch,
    ) -> Result<(), AtlasError> {
        let (id, value) = self.sprite();
        if id == 0 {
            return Ok(());
        }
        let region = sprites.sprite('b', id, value)?;
        batch.draw_sprite(&SpriteDraw {
            region,
            x: self.coord.view_x() - VIEW_WIDTH2,
            y: self.coord.view_y() - VIEW_HEIGHT2,
            color: [self.light_r() / 2.0, self.light_g() / 2.0, self.light_b() / 2.0, 1.0],
        });
        ctx.count_draw_call();
        Ok(())
    }
}
