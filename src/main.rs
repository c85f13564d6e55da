mod batch;
mod camera;
mod config;
mod map;

use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use isoview_blocks::{BlockRegistry, PackedBlock};
use isoview_blocks::types::STONE;
use isoview_cell::{BlockSprites, CoveredEntity, Drawable, RenderContext, RenderSettings};
use isoview_chunk::RenderStorage;
use isoview_geom::Coord;

use batch::{CountingBatch, ProceduralAtlas};
use camera::ViewCamera;
use config::AppConfig;
use map::NoiseMap;

#[derive(Parser, Debug)]
#[command(name = "isoview", about = "Headless isometric render-cell driver")]
struct Args {
    #[arg(long, default_value = "assets/isoview.toml")]
    config: PathBuf,
    #[arg(long)]
    frames: Option<u32>,
    #[arg(long)]
    seed: Option<i32>,
    #[arg(long)]
    fog: Option<bool>,
    #[arg(long)]
    static_shade: Option<bool>,
    #[arg(long)]
    view_radius: Option<i32>,
    /// Drop a block onto the map every this many frames (0 disables edits).
    #[arg(long, default_value_t = 30)]
    edit_every: u32,
}

/// Stand-in for a moving actor, standing on the surface under the camera.
#[derive(Debug)]
struct Actor {
    at: Coord,
}

impl CoveredEntity for Actor {
    fn depth(&self) -> f32 {
        self.at.to_point().depth()
    }
}

/// Registers an actor with the surface block of column `(x, y)`, so it is painted just
/// before that block. Returns where the actor stands.
fn place_actor(storage: &RenderStorage, map: &NoiseMap, x: i32, y: i32) -> Option<Coord> {
    let top = map.surface(x, y)?;
    let ground = Coord::new(x, y, top);
    let cell = storage.get_cell(ground)?;
    let mut c = cell.edit()?;
    c.add_covered_entity(Rc::new(Actor { at: ground.above() }));
    Some(ground.above())
}

const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = if args.config.exists() {
        AppConfig::load_from_path(&args.config)?
    } else {
        log::warn!("config {} not found, using defaults", args.config.display());
        AppConfig::default()
    };
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }
    if let Some(seed) = args.seed {
        cfg.map.seed = seed;
    }
    if let Some(fog) = args.fog {
        cfg.fog = fog;
    }
    if let Some(shade) = args.static_shade {
        cfg.static_shade = shade;
    }
    if let Some(r) = args.view_radius {
        cfg.view_radius = r;
    }

    let registry = match &cfg.blocks_file {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::new(),
    };
    let atlas = ProceduralAtlas::for_registry(&registry);
    let flower = registry.id_by_name("flower");
    let ctx = RenderContext::with_classifier(
        registry,
        RenderSettings {
            fog: cfg.fog,
            static_shade: cfg.static_shade,
        },
    );

    let dims = cfg.chunk.dims();
    let (bx, by) = (dims.blocks_x as i32, dims.blocks_y as i32);
    let mut map = NoiseMap::generate(
        cfg.map.chunks_x * bx,
        cfg.map.chunks_y * by,
        dims.blocks_z as i32,
        cfg.map.seed,
        cfg.map.water_level,
        cfg.map.frequency,
    );
    let mut storage = RenderStorage::new(dims, cfg.pool_capacity, &ctx);
    let mut sprites = BlockSprites::new(Some(Box::new(atlas)));
    let mut batch = CountingBatch::default();
    let mut camera = ViewCamera::new(bx / 2, map.rows() / 2, bx, by / 2);

    let mut total_calls = 0;
    for frame in 0..cfg.frames {
        // sweep right and wrap around
        camera.pan(1, 0);
        if camera.center_x >= map.width() {
            camera.center_x = 0;
        }

        if args.edit_every > 0 && frame > 0 && frame % args.edit_every == 0 {
            let (x, y) = (camera.center_x, camera.center_y);
            let id = match flower {
                Some(id) if (frame / args.edit_every) % 2 == 0 => id,
                _ => STONE,
            };
            if let Some(top) = map.surface(x, y) {
                let at = Coord::new(x, y, top + 1);
                if map.set(at, PackedBlock::block(id, 0)) {
                    let changed = storage.refresh(&map, &ctx);
                    log::debug!("placed {} at {at}, {changed} slot(s) changed", ctx.block_name(id, 0));
                }
            }
        }

        let (ccx, ccy) = storage.chunk_of(Coord::new(camera.center_x, camera.center_y, 0));
        let r = cfg.view_radius;
        storage.retain_around((ccx, ccy), r, &ctx);
        for cy in (ccy - r).max(0)..=(ccy + r).min(cfg.map.chunks_y - 1) {
            for cx in (ccx - r).max(0)..=(ccx + r).min(cfg.map.chunks_x - 1) {
                storage.load(cx, cy, &map, &ctx);
            }
        }

        storage.reset_clipping();
        storage.clear_covered_entities();
        storage.reset_camera_access();

        let visible = storage.cells_in_frustum(&camera);
        camera::clip(&visible, &storage, &ctx);
        let visible: Vec<_> = visible
            .into_iter()
            .filter(|c| c.borrow().should_be_rendered(&camera))
            .collect();

        place_actor(&storage, &map, camera.center_x, camera.center_y);

        batch.reset();
        let mut entities = 0;
        for item in camera::draw_order(&visible, &storage, &ctx, &camera) {
            match item {
                Drawable::Cell(cell) => {
                    if let Some(mut c) = cell.edit() {
                        c.update(FRAME_DT);
                        c.render(&ctx, &camera, &map, &mut sprites, &mut batch)?;
                    }
                }
                Drawable::Entity(_) => entities += 1,
            }
        }

        let calls = ctx.advance_frame();
        total_calls += calls;
        log::debug!(
            "frame {frame}: {} cells, {entities} entities, {calls} draw calls, {} sides, {} sprites, {} regions",
            visible.len(),
            batch.sides,
            batch.sprites,
            batch.distinct_regions()
        );
    }

    let stats = storage.pool_stats();
    log::info!(
        "{} frames over {} layers, {} draw calls; {} chunks loaded; pool allocated {} reused {} discarded {}",
        cfg.frames,
        map.layers(),
        total_calls,
        storage.len(),
        stats.allocated,
        stats.reused,
        stats.discarded
    );
    Ok(())
}
