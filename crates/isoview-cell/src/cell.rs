use std::borrow::Cow;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use isoview_blocks::types::{AIR, INVISIBLE_WALL, WATER};
use isoview_blocks::{BlockId, BlockValue};
use isoview_geom::Coord;

use crate::context::RenderContext;
use crate::covered::{CoveredEntity, Drawable};
use crate::flags::{AoFlags, Clipping};
use crate::light::{CellLight, Channel, Side};
use crate::render::SideSprite;

/// Radians per second of the liquid surface wave.
const WAVE_SPEED: f32 = 1.5;

/// Cosmetic behaviour attached to custom cells.
pub trait CellBehavior: fmt::Debug {
    /// Called once per frame for cells a camera can see.
    fn update(&mut self, _dt: f32) {}

    /// Sprite drawn instead of the logical id and value.
    fn sprite(&self) -> Option<(BlockId, BlockValue)> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiquidSurface {
    pub phase: f32,
}

impl LiquidSurface {
    /// Vertical offset of the surface in pixels.
    #[inline]
    pub fn wave_offset(&self) -> i32 {
        (self.phase.sin() * 3.0) as i32
    }
}

#[derive(Debug)]
pub enum CellKind {
    Plain,
    Liquid(LiquidSurface),
    Custom(Box<dyn CellBehavior>),
}

/// View-side state of one map position.
#[derive(Debug)]
pub struct RenderCell {
    pub(crate) id: BlockId,
    pub(crate) value: BlockValue,
    pub(crate) coord: Coord,
    pub(crate) light: CellLight,
    pub(crate) ao: AoFlags,
    pub(crate) clipping: Clipping,
    pub(crate) hidden: bool,
    pub(crate) kind: CellKind,
    pub(crate) covered: Vec<Drawable>,
    pub(crate) covered_entities: Vec<Rc<dyn CoveredEntity>>,
    pub(crate) merged: Vec<Drawable>,
    pub(crate) rebuilt_version: Option<u64>,
    pub(crate) sprites: [Option<SideSprite>; 3],
}

impl RenderCell {
    /// Plain cell with value 0. Prefer [`new_cell`], which picks the right variant.
    pub fn new(id: BlockId) -> Self {
        Self::with_value(id, 0)
    }

    pub fn with_value(id: BlockId, value: BlockValue) -> Self {
        Self::with_kind(id, value, CellKind::Plain)
    }

    pub fn with_kind(id: BlockId, value: BlockValue, kind: CellKind) -> Self {
        Self {
            id,
            value,
            coord: Coord::default(),
            light: CellLight::neutral(),
            ao: AoFlags::default(),
            clipping: Clipping::default(),
            hidden: false,
            kind,
            covered: Vec::new(),
            covered_entities: Vec::new(),
            merged: Vec::new(),
            rebuilt_version: None,
            sprites: [None, None, None],
        }
    }

    pub fn liquid(id: BlockId, value: BlockValue) -> Self {
        Self::with_kind(id, value, CellKind::Liquid(LiquidSurface::default()))
    }

    pub fn custom(id: BlockId, value: BlockValue, behavior: Box<dyn CellBehavior>) -> Self {
        Self::with_kind(id, value, CellKind::Custom(behavior))
    }

    pub fn at(mut self, coord: Coord) -> Self {
        self.coord = coord;
        self
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn value(&self) -> BlockValue {
        self.value
    }

    /// Only change this together with the map copy of the block.
    #[inline]
    pub fn set_value(&mut self, value: BlockValue) {
        self.value = value;
    }

    #[inline]
    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    #[inline]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    #[inline]
    pub fn set_coord(&mut self, coord: Coord) {
        self.coord = coord;
    }

    pub fn sprite_id(&self) -> BlockId {
        self.sprite().0
    }

    pub fn sprite_value(&self) -> BlockValue {
        self.sprite().1
    }

    pub(crate) fn sprite(&self) -> (BlockId, BlockValue) {
        match &self.kind {
            CellKind::Custom(b) => b.sprite().unwrap_or((self.id, self.value)),
            _ => (self.id, self.value),
        }
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_obstacle(&self, ctx: &RenderContext) -> bool {
        ctx.is_obstacle(self.id, self.value)
    }

    /// Can light pass through? Uses the sprite because transparency is a view property.
    pub fn is_transparent(&self, ctx: &RenderContext) -> bool {
        if self.id == AIR {
            return true;
        }
        let (id, value) = self.sprite();
        ctx.is_transparent(id, value)
    }

    pub fn is_indestructible(&self, ctx: &RenderContext) -> bool {
        ctx.is_indestructible(self.id, self.value)
    }

    /// Three-sided block, or a single flat sprite?
    pub fn has_sides(&self, ctx: &RenderContext) -> bool {
        if self.id == AIR {
            return false;
        }
        let (id, value) = self.sprite();
        ctx.has_sides(id, value)
    }

    pub fn is_liquid(&self, ctx: &RenderContext) -> bool {
        if self.id == AIR {
            return false;
        }
        ctx.is_liquid(self.id, self.value)
    }

    pub fn name<'a>(&self, ctx: &'a RenderContext) -> Cow<'a, str> {
        ctx.block_name(self.id, self.value)
    }

    /// Hides the cells behind and below it.
    pub fn hiding_past_block(&self, ctx: &RenderContext) -> bool {
        self.has_sides(ctx) && !self.is_transparent(ctx)
    }

    // --- lighting ---

    #[inline]
    pub fn light(&self) -> &CellLight {
        &self.light
    }

    /// Every side, vertex and channel. `level` is a factor in 0..=2.
    pub fn set_light_level(&mut self, level: f32) {
        self.light.set_all(level);
    }

    pub fn set_light_level_side(&mut self, level: f32, side: Side) {
        self.light.set_side(level, side);
    }

    pub fn set_light_level_vertex(&mut self, level: f32, side: Side, vertex: usize) {
        self.light.set_vertex(level, side, vertex);
    }

    /// ORs into one channel of one vertex without clearing it first. Call
    /// [`RenderCell::clear_light_channel`] before when the channel must be replaced.
    pub fn set_light_level_channel(&mut self, level: f32, side: Side, channel: Channel, vertex: usize) {
        self.light.merge_channel(level, side, channel, vertex);
    }

    /// Accumulates into a channel that started from zero this pass.
    pub fn add_light_level(&mut self, level: f32, side: Side, channel: Channel, vertex: usize) {
        self.light.add_channel(level, side, channel, vertex);
    }

    pub fn clear_light_channel(&mut self, side: Side, channel: Channel, vertex: usize) {
        self.light.clear_channel(side, channel, vertex);
    }

    /// Back to the neutral baseline, before static and ambient contributions.
    pub fn reset_light(&mut self) {
        self.light.reset();
    }

    /// Normalized level in `0.0..=~2.0`.
    #[inline]
    pub fn light_level(&self, side: Side, vertex: usize, channel: Channel) -> f32 {
        self.light.level(side, vertex, channel)
    }

    pub fn light_r(&self) -> f32 {
        self.light.average(Channel::Red)
    }

    pub fn light_g(&self) -> f32 {
        self.light.average(Channel::Green)
    }

    pub fn light_b(&self) -> f32 {
        self.light.average(Channel::Blue)
    }

    // --- ambient occlusion ---

    #[inline]
    pub fn ao_flags(&self) -> AoFlags {
        self.ao
    }

    pub fn set_ao_flag(&mut self, bit: u8, on: bool) {
        self.set_ao_flags(self.ao.with(bit, on));
    }

    /// Cached side sprites only hear about the flags when the word changes.
    pub fn set_ao_flags(&mut self, flags: AoFlags) {
        if flags != self.ao {
            for sprite in self.sprites.iter_mut().flatten() {
                sprite.set_ao_flags(flags);
            }
        }
        self.ao = flags;
    }

    // --- clipping ---

    #[inline]
    pub fn clipping(&self) -> Clipping {
        self.clipping
    }

    /// True only when every side is clipped.
    #[inline]
    pub fn is_clipped(&self) -> bool {
        self.clipping.is_clipped()
    }

    pub fn set_clipped_left(&mut self) {
        self.clipping.set(Side::Left);
    }

    pub fn set_clipped_top(&mut self) {
        self.clipping.set(Side::Top);
    }

    pub fn set_clipped_right(&mut self) {
        self.clipping.set(Side::Right);
    }

    pub fn set_unclipped(&mut self) {
        self.clipping.clear();
    }

    /// Cosmetic update. Only called for cells a camera covers.
    pub fn update(&mut self, dt: f32) {
        match &mut self.kind {
            CellKind::Plain => {}
            CellKind::Liquid(surface) => {
                surface.phase = (surface.phase + dt * WAVE_SPEED) % std::f32::consts::TAU;
            }
            CellKind::Custom(b) => b.update(dt),
        }
    }
}

impl fmt::Display for RenderCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} id: {} value: {}", self.coord, self.id, self.value)
    }
}

/// Builds the right cell variant for `(id, value)`.
///
/// Air and the invisible wall are hidden, water becomes a liquid surface, other ids
/// ask the classifier for a custom instance and fall back to the plain model.
pub fn new_cell(ctx: &RenderContext, id: BlockId, value: BlockValue) -> RenderCell {
    new_cell_at(ctx, id, value, Coord::default())
}

pub fn new_cell_at(ctx: &RenderContext, id: BlockId, value: BlockValue, coord: Coord) -> RenderCell {
    if id == AIR || id == INVISIBLE_WALL {
        let mut cell = RenderCell::with_value(id, value).at(coord);
        cell.set_hidden(true);
        return cell;
    }
    if id == WATER {
        return RenderCell::liquid(id, value).at(coord);
    }
    let custom = ctx
        .classifier()
        .and_then(|c| c.new_instance(id, value, coord))
        .filter(|cell| {
            let ok = cell.id == id;
            if !ok {
                log::warn!(
                    "classifier returned a cell with id {} for id {}; using the plain model",
                    cell.id,
                    id
                );
            }
            ok
        });
    match custom {
        Some(cell) => cell.at(coord),
        None => RenderCell::with_value(id, value).at(coord),
    }
}

/// Shared handle to a cell.
///
/// Chunk grids, covered lists and storages all point at the same cell through these.
/// The sentinel handle stands in for missing cells and never hands out `RefMut`.
#[derive(Clone)]
pub struct CellRef {
    inner: Rc<RefCell<RenderCell>>,
    sentinel: bool,
}

impl CellRef {
    pub fn new(cell: RenderCell) -> Self {
        Self {
            inner: Rc::new(RefCell::new(cell)),
            sentinel: false,
        }
    }

    pub(crate) fn sentinel() -> Self {
        let mut air = RenderCell::new(AIR);
        air.set_hidden(true);
        Self {
            inner: Rc::new(RefCell::new(air)),
            sentinel: true,
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, RenderCell> {
        self.inner.borrow()
    }

    /// `None` for the sentinel, or while the cell is already borrowed.
    pub fn edit(&self) -> Option<RefMut<'_, RenderCell>> {
        if self.sentinel {
            return None;
        }
        self.inner.try_borrow_mut().ok()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &CellRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity key, stable while any handle to the cell is alive.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sentinel {
            return f.write_str("CellRef(sentinel)");
        }
        match self.inner.try_borrow() {
            Ok(cell) => write!(f, "CellRef({cell})"),
            Err(_) => f.write_str("CellRef(<borrowed>)"),
        }
    }
}
