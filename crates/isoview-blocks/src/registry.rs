use std::borrow::Cow;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::classify::BlockClassifier;
use super::config::{BlockDef, BlocksConfig, VariantDef};
use super::types::{BlockId, BlockValue, LAST_BUILTIN, OBJECT_TYPES, VALUES};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockFlags {
    pub obstacle: bool,
    pub transparent: bool,
    pub liquid: bool,
    pub indestructible: bool,
    pub sides: bool,
}

impl BlockFlags {
    /// Flags of a configured block with nothing set explicitly.
    pub const SOLID: BlockFlags = BlockFlags {
        obstacle: true,
        transparent: false,
        liquid: false,
        indestructible: false,
        sides: true,
    };

    fn from_def(def: &BlockDef) -> Self {
        let base = Self::SOLID;
        BlockFlags {
            obstacle: def.obstacle.unwrap_or(base.obstacle),
            transparent: def.transparent.unwrap_or(base.transparent),
            liquid: def.liquid.unwrap_or(base.liquid),
            indestructible: def.indestructible.unwrap_or(base.indestructible),
            sides: def.sides.unwrap_or(base.sides),
        }
    }

    fn with_variant(self, v: &VariantDef) -> Self {
        BlockFlags {
            obstacle: v.obstacle.unwrap_or(self.obstacle),
            transparent: v.transparent.unwrap_or(self.transparent),
            liquid: v.liquid.unwrap_or(self.liquid),
            indestructible: v.indestructible.unwrap_or(self.indestructible),
            sides: v.sides.unwrap_or(self.sides),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    // Precomputed per value (index = value), overrides already applied
    pub per_value: Vec<BlockFlags>,
    pub value_names: Vec<Option<String>>,
}

impl BlockType {
    #[inline]
    pub fn flags(&self, value: BlockValue) -> BlockFlags {
        self.per_value
            .get(value as usize)
            .copied()
            .unwrap_or(BlockFlags::SOLID)
    }

    pub fn name_for(&self, value: BlockValue) -> &str {
        self.value_names
            .get(value as usize)
            .and_then(|n| n.as_deref())
            .unwrap_or(&self.name)
    }
}

/// Classifier for custom ids, configured from a TOML file.
#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<Option<BlockType>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks: vec![None; OBJECT_TYPES],
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize).and_then(|b| b.as_ref())
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .flatten()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    /// Registered custom types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.blocks.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::new();
        for def in cfg.blocks.into_iter() {
            if def.id <= LAST_BUILTIN || def.id as usize >= OBJECT_TYPES {
                return Err(format!(
                    "block '{}' has id {}; custom ids must be in {}..{}",
                    def.name,
                    def.id,
                    LAST_BUILTIN + 1,
                    OBJECT_TYPES
                )
                .into());
            }
            if reg.get(def.id).is_some() {
                return Err(format!("block id {} defined twice", def.id).into());
            }
            let base = BlockFlags::from_def(&def);
            let mut per_value = vec![base; VALUES];
            let mut value_names = vec![None; VALUES];
            for v in &def.variants {
                let slot = v.value as usize;
                if slot >= VALUES {
                    return Err(format!(
                        "block '{}' variant value {} out of range 0..{}",
                        def.name, v.value, VALUES
                    )
                    .into());
                }
                per_value[slot] = base.with_variant(v);
                value_names[slot] = v.name.clone();
            }
            let id = def.id;
            reg.blocks[id as usize] = Some(BlockType {
                id,
                name: def.name,
                per_value,
                value_names,
            });
        }
        log::info!("block registry loaded: {} custom block type(s)", reg.len());
        Ok(reg)
    }

    #[inline]
    fn flags(&self, id: BlockId, value: BlockValue) -> Option<BlockFlags> {
        self.get(id).map(|t| t.flags(value))
    }
}

// Unknown custom ids behave like plain solid blocks.
impl BlockClassifier for BlockRegistry {
    fn is_obstacle(&self, id: BlockId, value: BlockValue) -> bool {
        self.flags(id, value).unwrap_or(BlockFlags::SOLID).obstacle
    }

    fn is_transparent(&self, id: BlockId, value: BlockValue) -> bool {
        self.flags(id, value).unwrap_or(BlockFlags::SOLID).transparent
    }

    fn is_liquid(&self, id: BlockId, value: BlockValue) -> bool {
        self.flags(id, value).unwrap_or(BlockFlags::SOLID).liquid
    }

    fn is_indestructible(&self, id: BlockId, value: BlockValue) -> bool {
        self.flags(id, value).unwrap_or(BlockFlags::SOLID).indestructible
    }

    fn has_sides(&self, id: BlockId, value: BlockValue) -> bool {
        self.flags(id, value).unwrap_or(BlockFlags::SOLID).sides
    }

    fn name(&self, id: BlockId, value: BlockValue) -> Cow<'_, str> {
        match self.get(id) {
            Some(t) => Cow::Borrowed(t.name_for(value)),
            None => Cow::Borrowed("undefined"),
        }
    }
}
