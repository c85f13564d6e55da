//! Chunked, padded storage of render cells and the pool backing it.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod grid;
pub mod pool;
pub mod storage;

pub use chunk::{RenderChunk, SHADOW_FAR, SHADOW_NEAR};
pub use grid::{CellGrid, ChunkDims, HALO_X, HALO_Y};
pub use pool::{ChunkBufferPool, DEFAULT_POOL_CAPACITY, PoolStats};
pub use storage::RenderStorage;
