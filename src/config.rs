use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use isoview_chunk::{ChunkDims, DEFAULT_POOL_CAPACITY};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkConfig {
    pub blocks_x: usize,
    pub blocks_y: usize,
    pub blocks_z: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        let d = ChunkDims::default();
        Self {
            blocks_x: d.blocks_x,
            blocks_y: d.blocks_y,
            blocks_z: d.blocks_z,
        }
    }
}

impl ChunkConfig {
    pub fn dims(&self) -> ChunkDims {
        ChunkDims::new(self.blocks_x, self.blocks_y, self.blocks_z)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub seed: i32,
    /// Map size in chunks along x and y.
    pub chunks_x: i32,
    pub chunks_y: i32,
    pub water_level: i32,
    pub frequency: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            chunks_x: 6,
            chunks_y: 4,
            water_level: 2,
            frequency: 0.04,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub chunk: ChunkConfig,
    pub map: MapConfig,
    pub pool_capacity: usize,
    /// Chunks kept loaded around the camera, in each direction.
    pub view_radius: i32,
    pub frames: u32,
    pub fog: bool,
    pub static_shade: bool,
    /// Custom block types. Relative paths resolve against the config file.
    pub blocks_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            map: MapConfig::default(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            view_radius: 1,
            frames: 120,
            fog: false,
            static_shade: true,
            blocks_file: None,
        }
    }
}

impl AppConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)?;
        let mut cfg = Self::from_toml_str(&s)?;
        if let (Some(blocks), Some(dir)) = (cfg.blocks_file.as_mut(), path.parent()) {
            if blocks.is_relative() {
                *blocks = dir.join(&*blocks);
            }
        }
        Ok(cfg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: AppConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        let c = &self.chunk;
        if c.blocks_x == 0 || c.blocks_y == 0 || c.blocks_z == 0 {
            return Err(format!("chunk size must be positive, got {}x{}x{}", c.blocks_x, c.blocks_y, c.blocks_z).into());
        }
        if c.blocks_y % 2 != 0 {
            return Err(format!("chunk blocks_y must be even to keep row parity, got {}", c.blocks_y).into());
        }
        if self.view_radius < 0 {
            return Err(format!("view_radius must not be negative, got {}", self.view_radius).into());
        }
        Ok(())
    }
}
