use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use isoview_blocks::types::{AIR, INVISIBLE_WALL, PackedBlock, STONE, WATER};
use isoview_blocks::{BlockClassifier, BlockId, BlockValue, EmptyMap, Health, MapSource};
use isoview_geom::Coord;

use crate::cell::{CellBehavior, CellKind, CellRef, RenderCell, new_cell, new_cell_at};
use crate::context::{CellClassifier, RenderContext, RenderSettings};
use crate::covered::{CellLookup, CoveredEntity, Drawable};
use crate::flags::AoFlags;
use crate::light::{Channel, NEUTRAL_LIGHT, Side};
use crate::render::{Camera, SideDraw, SpriteBatch, SpriteDraw};
use crate::sprites::{AtlasError, BlockSprites, RegionId, SpriteAtlas};

struct Grid {
    cells: HashMap<Coord, CellRef>,
    layers: i32,
}

impl Grid {
    fn filled(ctx: &RenderContext, w: i32, h: i32, layers: i32) -> Self {
        let mut cells = HashMap::new();
        for z in 0..layers {
            for y in 0..h {
                for x in 0..w {
                    let c = Coord::new(x, y, z);
                    cells.insert(c, CellRef::new(new_cell_at(ctx, STONE, 0, c)));
                }
            }
        }
        Self { cells, layers }
    }

    fn get(&self, x: i32, y: i32, z: i32) -> &CellRef {
        &self.cells[&Coord::new(x, y, z)]
    }
}

impl CellLookup for Grid {
    fn cell_at(&self, coord: Coord) -> Option<CellRef> {
        self.cells.get(&coord).cloned()
    }

    fn layers(&self) -> i32 {
        self.layers
    }
}

#[derive(Debug)]
struct Marker(f32);

impl CoveredEntity for Marker {
    fn depth(&self) -> f32 {
        self.0
    }
}

struct Sheet(HashMap<String, RegionId>);

impl Sheet {
    fn with(names: &[&str]) -> Self {
        Sheet(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.to_string(), RegionId(i as u32)))
                .collect(),
        )
    }
}

impl SpriteAtlas for Sheet {
    fn find_region(&self, name: &str) -> Option<RegionId> {
        self.0.get(name).copied()
    }

    fn sample(&self, region: RegionId, _dx: i32, _dy: i32) -> Option<[f32; 4]> {
        Some([region.0 as f32, 0.0, 0.0, 1.0])
    }
}

#[derive(Default)]
struct Recorder {
    sides: Vec<SideDraw>,
    sprites: Vec<SpriteDraw>,
}

impl SpriteBatch for Recorder {
    fn draw_side(&mut self, draw: &SideDraw) {
        self.sides.push(draw.clone());
    }

    fn draw_sprite(&mut self, draw: &SpriteDraw) {
        self.sprites.push(draw.clone());
    }
}

struct Everything;

impl Camera for Everything {
    fn in_view_frustum(&self, _coord: Coord) -> bool {
        true
    }

    fn visible_front_border_high(&self) -> i32 {
        0
    }
}

struct Nothing;

impl Camera for Nothing {
    fn in_view_frustum(&self, _coord: Coord) -> bool {
        false
    }

    fn visible_front_border_high(&self) -> i32 {
        0
    }
}

struct Worn(Health);

impl MapSource for Worn {
    fn block_packed(&self, _coord: Coord) -> PackedBlock {
        PackedBlock::new(STONE, 0, self.0)
    }
}

/// Stores bare ids without a health byte.
struct Bare;

impl MapSource for Bare {
    fn block_packed(&self, _coord: Coord) -> PackedBlock {
        PackedBlock(STONE as u32)
    }
}

#[derive(Debug)]
struct Flicker;

impl CellBehavior for Flicker {
    fn sprite(&self) -> Option<(BlockId, BlockValue)> {
        Some((21, 0))
    }
}

struct Torches;

impl BlockClassifier for Torches {
    fn is_obstacle(&self, _id: BlockId, _value: BlockValue) -> bool {
        false
    }
    fn is_transparent(&self, _id: BlockId, _value: BlockValue) -> bool {
        true
    }
    fn is_liquid(&self, _id: BlockId, _value: BlockValue) -> bool {
        false
    }
    fn is_indestructible(&self, id: BlockId, _value: BlockValue) -> bool {
        id == 20
    }
    fn has_sides(&self, id: BlockId, _value: BlockValue) -> bool {
        id != 20 && id != 21
    }
    fn name(&self, _id: BlockId, _value: BlockValue) -> Cow<'_, str> {
        Cow::Borrowed("torch")
    }
}

impl CellClassifier for Torches {
    fn new_instance(&self, id: BlockId, value: BlockValue, _coord: Coord) -> Option<RenderCell> {
        match id {
            20 => Some(RenderCell::custom(id, value, Box::new(Flicker))),
            30 => Some(RenderCell::new(31)),
            _ => None,
        }
    }
}

fn stone_sheet() -> BlockSprites {
    BlockSprites::new(Some(Box::new(Sheet::with(&[
        "b3-0-0", "b3-0-1", "b3-0-2", "b0-0-0", "b0-0-1", "b0-0-2", "e3-0", "e3-1", "e3-2", "e3-3",
        "e3-4", "e3-5", "e3-6", "e3-7", "e3-8", "b9-0-0", "b9-0-1", "b9-0-2", "b21-0", "error",
    ]))))
}

#[test]
fn air_and_invisible_wall_are_hidden_and_sideless() {
    let ctx = RenderContext::default();
    for id in [AIR, INVISIBLE_WALL] {
        let cell = new_cell(&ctx, id, 0);
        assert!(cell.is_hidden());
        assert!(!cell.has_sides(&ctx));
        assert!(cell.is_transparent(&ctx));
        assert!(!cell.hiding_past_block(&ctx));
    }
}

#[test]
fn water_becomes_a_liquid_surface() {
    let ctx = RenderContext::default();
    let mut cell = new_cell(&ctx, WATER, 0);
    assert!(matches!(cell.kind(), CellKind::Liquid(_)));
    assert!(cell.is_liquid(&ctx));
    assert!(!cell.is_obstacle(&ctx));
    cell.update(0.5);
    match cell.kind() {
        CellKind::Liquid(s) => assert!(s.phase > 0.0),
        other => panic!("expected liquid, got {other:?}"),
    }
}

#[test]
fn classifier_hands_out_custom_cells() {
    let ctx = RenderContext::with_classifier(Torches, RenderSettings::default());
    let torch = new_cell(&ctx, 20, 0);
    assert!(matches!(torch.kind(), CellKind::Custom(_)));
    assert_eq!(torch.id(), 20);
    assert_eq!(torch.sprite_id(), 21);
    assert!(torch.is_indestructible(&ctx));
    assert_eq!(torch.name(&ctx), "torch");

    let plain = new_cell(&ctx, 25, 0);
    assert!(matches!(plain.kind(), CellKind::Plain));
}

#[test]
fn mismatched_custom_id_falls_back_to_plain() {
    let ctx = RenderContext::with_classifier(Torches, RenderSettings::default());
    let cell = new_cell_at(&ctx, 30, 2, Coord::new(1, 2, 3));
    assert_eq!(cell.id(), 30);
    assert_eq!(cell.value(), 2);
    assert_eq!(cell.coord(), Coord::new(1, 2, 3));
    assert!(matches!(cell.kind(), CellKind::Plain));
}

#[test]
fn custom_ids_without_classifier_use_safe_defaults() {
    let ctx = RenderContext::default();
    let cell = new_cell(&ctx, 50, 0);
    assert!(cell.is_obstacle(&ctx));
    assert!(!cell.is_transparent(&ctx));
    assert!(!cell.is_liquid(&ctx));
    assert!(!cell.is_indestructible(&ctx));
    assert!(cell.has_sides(&ctx));
    assert_eq!(cell.name(&ctx), "undefined");
}

#[test]
fn reset_light_restores_neutral_words() {
    let mut cell = RenderCell::new(STONE);
    cell.set_light_level(0.3);
    cell.set_light_level_channel(1.7, Side::Top, Channel::Red, 2);
    cell.reset_light();
    let once = cell.light().clone();
    cell.reset_light();
    assert_eq!(&once, cell.light());
    for side in Side::ALL {
        assert_eq!(cell.light().side_words(side), [NEUTRAL_LIGHT; 4]);
    }
}

#[test]
fn side_and_vertex_setters_leave_other_words_alone() {
    let mut cell = RenderCell::new(STONE);
    cell.set_light_level_side(0.5, Side::Right);
    cell.set_light_level_vertex(0.25, Side::Left, 3);
    assert_eq!(cell.light().word(Side::Top, 0), NEUTRAL_LIGHT);
    assert_eq!(cell.light().word(Side::Left, 2), NEUTRAL_LIGHT);
    assert!((cell.light_level(Side::Right, 1, Channel::Blue) - 0.5).abs() <= 1.0 / 511.0);
    assert!((cell.light_level(Side::Left, 3, Channel::Green) - 0.25).abs() <= 1.0 / 511.0);
}

#[test]
fn channel_replace_needs_a_clear_first() {
    let mut cell = RenderCell::new(STONE);
    cell.clear_light_channel(Side::Top, Channel::Red, 0);
    cell.set_light_level_channel(0.5, Side::Top, Channel::Red, 0);
    assert!((cell.light_level(Side::Top, 0, Channel::Red) - 0.5).abs() <= 1.0 / 511.0);
    assert!((cell.light_level(Side::Top, 0, Channel::Green) - 1.0).abs() <= 2.0 / 511.0);
}

#[test]
fn ao_changes_reach_cached_side_sprites() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell_at(&ctx, STONE, 0, Coord::new(2, 2, 0));
    cell.render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");

    let bit = AoFlags::bit(Side::Top, 5);
    cell.set_ao_flag(bit, true);
    assert!(cell.ao_flags().get(bit));
    for side in Side::ALL {
        let sprite = cell.side_sprite(side).expect("sprite cached");
        assert_eq!(sprite.ao_flags(), cell.ao_flags());
    }
    cell.set_ao_flag(bit, false);
    assert_eq!(cell.side_sprite(Side::Left).map(|s| s.ao_flags()), Some(AoFlags(0)));
}

#[test]
fn should_be_rendered_needs_every_condition() {
    let ctx = RenderContext::default();
    let mut cell = new_cell_at(&ctx, STONE, 0, Coord::new(0, 0, 0));
    assert!(cell.should_be_rendered(&Everything));
    assert!(!cell.should_be_rendered(&Nothing));

    cell.set_clipped_left();
    cell.set_clipped_right();
    assert!(cell.should_be_rendered(&Everything));
    cell.set_clipped_top();
    assert!(!cell.should_be_rendered(&Everything));
    cell.set_unclipped();
    assert!(cell.should_be_rendered(&Everything));

    cell.set_hidden(true);
    assert!(!cell.should_be_rendered(&Everything));
    assert!(!new_cell(&ctx, AIR, 0).should_be_rendered(&Everything));
}

#[test]
fn covered_walk_order_and_stability() {
    let ctx = RenderContext::default();
    let grid = Grid::filled(&ctx, 5, 8, 3);
    let origin = grid.get(2, 4, 1).clone();
    let mut cell = origin.edit().expect("not the sentinel");

    let expected = [
        (2, 4, 0),
        (2, 3, 0),
        (1, 3, 0),
        (2, 2, 0),
        (2, 2, 1),
        (2, 3, 1),
        (1, 3, 1),
        (1, 3, 2),
        (2, 3, 2),
    ];
    let first: Vec<Drawable> = cell.covered(&grid, &ctx).to_vec();
    assert_eq!(first.len(), expected.len());
    for (d, (x, y, z)) in first.iter().zip(expected) {
        let c = d.as_cell().expect("block");
        assert!(c.ptr_eq(grid.get(x, y, z)), "expected ({x}, {y}, {z})");
    }

    let second = cell.covered(&grid, &ctx);
    assert_eq!(second.len(), first.len());
    assert!(second.iter().zip(&first).all(|(a, b)| a.same_as(b)));
}

#[test]
fn covered_walk_skips_missing_layers() {
    let ctx = RenderContext::default();
    let grid = Grid::filled(&ctx, 5, 8, 2);
    let bottom = grid.get(2, 5, 0).clone();
    let mut cell = bottom.edit().expect("cell");
    // odd row: back-right moves one column right
    assert_eq!(cell.covered(&grid, &ctx).len(), 5);

    let top = grid.get(2, 5, 1).clone();
    let mut cell = top.edit().expect("cell");
    assert_eq!(cell.covered(&grid, &ctx).len(), 7);
}

#[test]
fn content_change_triggers_rebuild() {
    let ctx = RenderContext::default();
    let mut grid = Grid::filled(&ctx, 5, 8, 1);
    let origin = grid.get(2, 4, 0).clone();
    let mut cell = origin.edit().expect("cell");
    assert!(cell.needs_covered_rebuild(&ctx));
    let before = cell.covered(&grid, &ctx)[0].clone();
    assert!(!cell.needs_covered_rebuild(&ctx));

    let replacement = CellRef::new(RenderCell::new(STONE).at(Coord::new(2, 2, 0)));
    grid.cells.insert(Coord::new(2, 2, 0), replacement.clone());
    assert!(cell.covered(&grid, &ctx)[0].same_as(&before));

    ctx.mark_content_changed();
    assert!(cell.needs_covered_rebuild(&ctx));
    let after = &cell.covered(&grid, &ctx)[0];
    assert!(after.as_cell().is_some_and(|c| c.ptr_eq(&replacement)));
}

#[test]
fn entities_are_sorted_and_prepended() {
    let ctx = RenderContext::default();
    let grid = Grid::filled(&ctx, 5, 8, 1);
    let origin = grid.get(2, 4, 0).clone();
    let mut cell = origin.edit().expect("cell");
    let blocks = cell.covered(&grid, &ctx).to_vec();

    let odd: Rc<dyn CoveredEntity> = Rc::new(Marker(f32::NAN));
    let far: Rc<dyn CoveredEntity> = Rc::new(Marker(9.0));
    let tie_a: Rc<dyn CoveredEntity> = Rc::new(Marker(1.0));
    let tie_b: Rc<dyn CoveredEntity> = Rc::new(Marker(1.0));
    for e in [&odd, &far, &tie_a, &tie_b] {
        cell.add_covered_entity(Rc::clone(e));
    }
    assert_eq!(cell.covered_entity_count(), 4);

    let merged = cell.covered(&grid, &ctx).to_vec();
    assert_eq!(merged.len(), blocks.len() + 4);
    assert!(merged[4..].iter().zip(&blocks).all(|(a, b)| a.same_as(b)));
    let pos = |e: &Rc<dyn CoveredEntity>| {
        let d = Drawable::Entity(Rc::clone(e));
        merged.iter().position(|m| m.same_as(&d))
    };
    assert_eq!(pos(&tie_a), Some(0));
    assert_eq!(pos(&tie_b), Some(1));
    assert_eq!(pos(&far), Some(2));
    assert_eq!(pos(&odd), Some(3));

    cell.clear_covered_entities();
    let plain = cell.covered(&grid, &ctx);
    assert_eq!(plain.len(), blocks.len());
}

#[test]
fn sentinel_refuses_edits() {
    let ctx = RenderContext::default();
    assert!(ctx.sentinel().is_sentinel());
    assert!(ctx.sentinel().edit().is_none());
    assert_eq!(ctx.sentinel().borrow().id(), AIR);
    assert!(ctx.sentinel().borrow().is_hidden());

    let cell = CellRef::new(RenderCell::new(STONE));
    let held = cell.edit();
    assert!(held.is_some());
    assert!(cell.edit().is_none());
}

#[test]
fn full_health_block_draws_three_sides() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell_at(&ctx, STONE, 0, Coord::new(1, 2, 0));
    cell.render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");

    assert_eq!(ctx.draw_calls(), 3);
    let order: Vec<Side> = batch.sides.iter().map(|d| d.side).collect();
    assert_eq!(order, [Side::Top, Side::Left, Side::Right]);
    assert!(batch.sprites.is_empty());
    for d in &batch.sides {
        for rgb in d.vertex_colors {
            for c in rgb {
                assert!((c - 0.5).abs() < 0.01);
            }
        }
        assert_eq!(d.tint, [0.5, 0.5, 0.5, 1.0]);
    }
    let left = &batch.sides[1];
    let right = &batch.sides[2];
    assert_eq!(right.x - left.x, isoview_geom::VIEW_WIDTH2);

    assert_eq!(ctx.advance_frame(), 3);
    assert_eq!(ctx.draw_calls(), 0);
}

#[test]
fn clipped_sides_are_skipped() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell(&ctx, STONE, 0);
    cell.set_clipped_top();
    cell.set_clipped_right();
    cell.render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");
    assert_eq!(batch.sides.len(), 1);
    assert_eq!(batch.sides[0].side, Side::Left);
    assert_eq!(ctx.draw_calls(), 1);
}

#[test]
fn damage_overlay_per_side() {
    for (health, tier) in [(99, 0u8), (50, 1), (10, 2)] {
        let ctx = RenderContext::default();
        let mut sprites = stone_sheet();
        let mut batch = Recorder::default();
        let mut cell = new_cell(&ctx, STONE, 0);
        cell.render(&ctx, &Everything, &Worn(health), &mut sprites, &mut batch)
            .expect("render");
        assert_eq!(batch.sides.len(), 3);
        assert_eq!(batch.sprites.len(), 3);
        assert_eq!(ctx.draw_calls(), 6);
        // overlay regions were registered in value order at index 6
        let values: Vec<u32> = batch.sprites.iter().map(|s| s.region.0 - 6).collect();
        let t = tier as u32;
        assert_eq!(values, [3 * t + 1, 3 * t, 3 * t + 2]);
        assert!(batch.sprites.iter().all(|s| s.color == [0.5, 0.5, 0.5, 0.7]));
    }
}

#[test]
fn map_without_health_draws_no_overlay() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell(&ctx, STONE, 0);
    cell.render(&ctx, &Everything, &Bare, &mut sprites, &mut batch)
        .expect("render");
    assert_eq!(batch.sides.len(), 3);
    assert!(batch.sprites.is_empty());
}

#[test]
fn hidden_cells_draw_nothing() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell(&ctx, STONE, 0);
    cell.set_hidden(true);
    cell.render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");
    assert!(batch.sides.is_empty());
    assert_eq!(ctx.draw_calls(), 0);
}

#[test]
fn sideless_custom_cell_draws_one_flat_sprite() {
    let ctx = RenderContext::with_classifier(Torches, RenderSettings::default());
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut torch = new_cell(&ctx, 20, 0);
    torch
        .render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");
    assert!(batch.sides.is_empty());
    assert_eq!(batch.sprites.len(), 1);
    assert_eq!(ctx.draw_calls(), 1);
}

#[test]
fn liquid_sides_are_translucent() {
    let ctx = RenderContext::default();
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut water = new_cell(&ctx, WATER, 0);
    water
        .render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");
    assert_eq!(batch.sides.len(), 3);
    assert!(batch.sides.iter().all(|d| d.tint[3] < 1.0));
}

#[test]
fn static_shade_brightens_left_and_darkens_right() {
    let ctx = RenderContext::new(RenderSettings {
        fog: false,
        static_shade: true,
    });
    let mut sprites = stone_sheet();
    let mut batch = Recorder::default();
    let mut cell = new_cell(&ctx, STONE, 0);
    cell.render(&ctx, &Everything, &EmptyMap, &mut sprites, &mut batch)
        .expect("render");
    assert_eq!(batch.sides[0].tint[0], 0.5);
    assert_eq!(batch.sides[1].tint[0], 0.75);
    assert_eq!(batch.sides[2].tint[0], 0.25);
}

#[test]
fn missing_sprites_fall_back_then_fail() {
    let ctx = RenderContext::default();
    let mut batch = Recorder::default();

    let mut fallback = BlockSprites::new(Some(Box::new(Sheet::with(&["b0-0-0", "b0-0-1", "b0-0-2"]))));
    let mut cell = new_cell(&ctx, 50, 0);
    cell.render(&ctx, &Everything, &EmptyMap, &mut fallback, &mut batch)
        .expect("fallback sprites");
    assert_eq!(batch.sides[0].region, RegionId(1));

    let mut only_error = BlockSprites::new(Some(Box::new(Sheet::with(&["error"]))));
    assert_eq!(only_error.block_sprite(50, 0, Side::Left).ok(), Some(RegionId(0)));

    let mut empty = BlockSprites::new(Some(Box::new(Sheet::with(&[]))));
    let err = cell
        .render(&ctx, &Everything, &EmptyMap, &mut empty, &mut batch)
        .unwrap_err();
    assert!(matches!(err, AtlasError::Missing { .. }));

    let mut none = BlockSprites::new(None);
    let err = cell
        .render(&ctx, &Everything, &EmptyMap, &mut none, &mut batch)
        .unwrap_err();
    assert!(matches!(err, AtlasError::Unavailable));
}

#[test]
fn sprite_queries() {
    let mut sprites = stone_sheet();
    assert!(sprites.is_sprite_defined(STONE, 0, true));
    assert!(!sprites.is_sprite_defined(STONE, 1, true));
    assert!(!sprites.is_sprite_defined(AIR, 0, true));
    assert!(!BlockSprites::new(None).is_sprite_defined(STONE, 0, true));

    let top = sprites.representing_color(STONE, 0, true);
    assert_eq!(top, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(BlockSprites::new(None).representing_color(STONE, 0, true), [0.0; 4]);
}
