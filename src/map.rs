use fastnoise_lite::{FastNoiseLite, NoiseType};
use isoview_blocks::types::{AIR, DIRT, FULL_HEALTH, GRASS, SAND, STONE, WATER};
use isoview_blocks::{BlockId, Health, MapSource, PackedBlock};
use isoview_geom::Coord;

/// Heightmap terrain with a water level, generated once from noise.
pub struct NoiseMap {
    width: i32,
    rows: i32,
    layers: i32,
    blocks: Vec<PackedBlock>,
}

impl NoiseMap {
    pub fn generate(width: i32, rows: i32, layers: i32, seed: i32, water_level: i32, frequency: f32) -> Self {
        let mut terrain = FastNoiseLite::with_seed(seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(frequency));
        let mut wear = FastNoiseLite::with_seed(seed ^ 41_337);
        wear.set_noise_type(Some(NoiseType::OpenSimplex2));
        wear.set_frequency(Some(frequency * 3.0));

        let mut map = Self {
            width,
            rows,
            layers,
            blocks: vec![PackedBlock::AIR; (width * rows * layers).max(0) as usize],
        };
        for y in 0..rows {
            for x in 0..width {
                // rows are half a tile apart on screen
                let (fx, fy) = (x as f32, y as f32 * 0.5);
                let n = (terrain.get_noise_2d(fx, fy) + 1.0) * 0.5;
                let height = 1 + (n * (layers - 2) as f32) as i32;
                let worn = wear.get_noise_2d(fx, fy);
                let health: Health = if worn > 0.6 {
                    20
                } else if worn > 0.45 {
                    60
                } else {
                    FULL_HEALTH
                };
                for z in 0..layers {
                    let id = Self::column_block(z, height, water_level);
                    if id != AIR {
                        let h = if z == height - 1 { health } else { FULL_HEALTH };
                        map.set(Coord::new(x, y, z), PackedBlock::new(id, 0, h));
                    }
                }
            }
        }
        log::info!("generated {width}x{rows}x{layers} noise map (seed {seed})");
        map
    }

    fn column_block(z: i32, height: i32, water_level: i32) -> BlockId {
        if z < height - 2 {
            STONE
        } else if z < height - 1 {
            DIRT
        } else if z == height - 1 {
            if z < water_level { SAND } else { GRASS }
        } else if z < water_level {
            WATER
        } else {
            AIR
        }
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let inside = (0..self.width).contains(&coord.x)
            && (0..self.rows).contains(&coord.y)
            && (0..self.layers).contains(&coord.z);
        inside.then(|| ((coord.z * self.rows + coord.y) * self.width + coord.x) as usize)
    }

    /// Writes a block. Returns `false` outside the map.
    pub fn set(&mut self, coord: Coord, block: PackedBlock) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.blocks[i] = block;
                true
            }
            None => false,
        }
    }

    /// Top non-air layer of a column.
    pub fn surface(&self, x: i32, y: i32) -> Option<i32> {
        (0..self.layers)
            .rev()
            .find(|&z| !self.block_packed(Coord::new(x, y, z)).is_air())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn layers(&self) -> i32 {
        self.layers
    }
}

impl MapSource for NoiseMap {
    fn block_packed(&self, coord: Coord) -> PackedBlock {
        self.index(coord)
            .map_or(PackedBlock::AIR, |i| self.blocks[i])
    }
}
