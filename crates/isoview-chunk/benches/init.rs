use criterion::{Criterion, black_box, criterion_group, criterion_main};

use isoview_blocks::MapSource;
use isoview_blocks::types::{GRASS, PackedBlock, STONE};
use isoview_cell::RenderContext;
use isoview_chunk::{ChunkBufferPool, ChunkDims, DEFAULT_POOL_CAPACITY, RenderChunk};
use isoview_geom::Coord;

struct Terraces;

impl MapSource for Terraces {
    fn block_packed(&self, coord: Coord) -> PackedBlock {
        let h = (coord.x / 3 + coord.y / 5).rem_euclid(6);
        match coord.z {
            z if z < h => PackedBlock::block(STONE, 0),
            z if z == h => PackedBlock::block(GRASS, 0),
            _ => PackedBlock::AIR,
        }
    }
}

fn bench_init_fresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_init");
    let ctx = RenderContext::default();
    let dims = ChunkDims::default();
    group.bench_function("fresh_grid_10x40x10", |b| {
        b.iter(|| {
            let mut pool = ChunkBufferPool::new(dims, DEFAULT_POOL_CAPACITY, ctx.sentinel().clone());
            black_box(RenderChunk::new(0, 0, &mut pool, &Terraces, &ctx));
        })
    });
    group.finish();
}

fn bench_init_pooled(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_init");
    let ctx = RenderContext::default();
    let dims = ChunkDims::default();
    let mut pool = ChunkBufferPool::new(dims, DEFAULT_POOL_CAPACITY, ctx.sentinel().clone());
    let mut cx = 0;
    group.bench_function("pooled_grid_10x40x10", |b| {
        b.iter(|| {
            cx += 1;
            let chunk = RenderChunk::new(cx % 8, 0, &mut pool, &Terraces, &ctx);
            black_box(chunk.top_left_x());
            chunk.dispose(&mut pool);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_init_fresh, bench_init_pooled);
criterion_main!(benches);
