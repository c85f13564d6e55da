use hashbrown::{HashMap, HashSet};
use isoview_blocks::BlockRegistry;
use isoview_blocks::types::{DIRT, GRASS, SAND, STONE, WATER};
use isoview_cell::render::{DAMAGE_CATEGORY, DAMAGE_SPRITE_ID};
use isoview_cell::{RegionId, SideDraw, SpriteAtlas, SpriteBatch, SpriteDraw};

/// Sprite sheet without textures: every known sprite name maps to a region with a flat
/// colour.
pub struct ProceduralAtlas {
    regions: HashMap<String, RegionId>,
    colors: Vec<[f32; 4]>,
}

impl ProceduralAtlas {
    pub fn for_registry(registry: &BlockRegistry) -> Self {
        let mut atlas = Self {
            regions: HashMap::new(),
            colors: Vec::new(),
        };
        atlas.add("error", [1.0, 0.0, 1.0, 1.0]);
        for side in 0..3 {
            atlas.add(&format!("b0-0-{side}"), [0.0, 0.0, 0.0, 0.0]);
        }
        for (id, color) in [
            (GRASS, [0.3, 0.7, 0.2, 1.0]),
            (DIRT, [0.5, 0.35, 0.2, 1.0]),
            (STONE, [0.55, 0.55, 0.55, 1.0]),
            (SAND, [0.9, 0.85, 0.6, 1.0]),
            (WATER, [0.2, 0.4, 0.9, 0.8]),
        ] {
            atlas.add_block(id, 0, color);
        }
        for t in registry.iter() {
            let shade = t.id as f32 / 124.0;
            let color = [shade, 1.0 - shade, 0.5, 1.0];
            let named = t.value_names.iter().enumerate().filter(|(v, n)| *v == 0 || n.is_some());
            for (value, _) in named {
                atlas.add_block(t.id, value as u8, color);
                atlas.add(&format!("b{}-{value}", t.id), color);
            }
        }
        for value in 0..9 {
            atlas.add(&format!("{DAMAGE_CATEGORY}{DAMAGE_SPRITE_ID}-{value}"), [0.1, 0.1, 0.1, 0.7]);
        }
        log::info!("procedural atlas with {} regions", atlas.colors.len());
        atlas
    }

    fn add(&mut self, name: &str, color: [f32; 4]) {
        let region = RegionId(self.colors.len() as u32);
        self.colors.push(color);
        self.regions.insert(name.to_string(), region);
    }

    fn add_block(&mut self, id: u8, value: u8, color: [f32; 4]) {
        for side in 0..3 {
            self.add(&format!("b{id}-{value}-{side}"), color);
        }
    }
}

impl SpriteAtlas for ProceduralAtlas {
    fn find_region(&self, name: &str) -> Option<RegionId> {
        self.regions.get(name).copied()
    }

    fn sample(&self, region: RegionId, _dx: i32, _dy: i32) -> Option<[f32; 4]> {
        self.colors.get(region.0 as usize).copied()
    }
}

/// Batch that only tallies what it would submit.
#[derive(Default, Debug)]
pub struct CountingBatch {
    pub sides: usize,
    pub sprites: usize,
    regions: HashSet<RegionId>,
}

impl CountingBatch {
    /// Distinct regions touched since the last reset, i.e. texture binds a real batch
    /// would need at most.
    pub fn distinct_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn reset(&mut self) {
        self.sides = 0;
        self.sprites = 0;
        self.regions.clear();
    }
}

impl SpriteBatch for CountingBatch {
    fn draw_side(&mut self, draw: &SideDraw) {
        self.sides += 1;
        self.regions.insert(draw.region);
    }

    fn draw_sprite(&mut self, draw: &SpriteDraw) {
        self.sprites += 1;
        self.regions.insert(draw.region);
    }
}
