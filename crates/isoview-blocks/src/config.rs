use serde::Deserialize;

// Top-level blocks config file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub obstacle: Option<bool>,
    #[serde(default)]
    pub transparent: Option<bool>,
    #[serde(default)]
    pub liquid: Option<bool>,
    #[serde(default)]
    pub indestructible: Option<bool>,
    // `false` renders the block as a single flat sprite
    #[serde(default)]
    pub sides: Option<bool>,
    // Per-value overrides; unset fields inherit from the block
    #[serde(default)]
    pub variants: Vec<VariantDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VariantDef {
    pub value: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub obstacle: Option<bool>,
    #[serde(default)]
    pub transparent: Option<bool>,
    #[serde(default)]
    pub liquid: Option<bool>,
    #[serde(default)]
    pub indestructible: Option<bool>,
    #[serde(default)]
    pub sides: Option<bool>,
}
