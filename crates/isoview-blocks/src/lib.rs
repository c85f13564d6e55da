//! Block ids, static classification and the map contract.
#![forbid(unsafe_code)]

pub mod classify;
pub mod config;
pub mod map;
pub mod registry;
pub mod types;

pub use classify::BlockClassifier;
pub use map::{EmptyMap, MapSource};
pub use registry::BlockRegistry;
pub use types::{BlockId, BlockValue, Health, PackedBlock};
