use hashbrown::HashSet;
use isoview_cell::{Camera, CellLookup, CellRef, Drawable, RenderContext};
use isoview_geom::{Coord, Neighbor};

/// Axis-aligned window over the map, measured in tiles.
#[derive(Clone, Copy, Debug)]
pub struct ViewCamera {
    pub center_x: i32,
    pub center_y: i32,
    pub half_width: i32,
    pub half_rows: i32,
}

impl ViewCamera {
    pub fn new(center_x: i32, center_y: i32, half_width: i32, half_rows: i32) -> Self {
        Self {
            center_x,
            center_y,
            half_width,
            half_rows,
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.center_x += dx;
        self.center_y += dy;
    }
}

impl Camera for ViewCamera {
    fn in_view_frustum(&self, coord: Coord) -> bool {
        // higher layers are drawn further up the screen, which reaches rows further front
        let y = coord.y - 2 * coord.z;
        (coord.x - self.center_x).abs() <= self.half_width && (y - self.center_y).abs() <= self.half_rows
    }

    fn visible_front_border_high(&self) -> i32 {
        self.center_y + self.half_rows
    }
}

/// Marks sides hidden behind an opaque block in front or on top.
///
/// Clipping was reset for this frame before the call.
pub fn clip(cells: &[CellRef], lookup: &dyn CellLookup, ctx: &RenderContext) {
    let hides = |coord: Coord| {
        lookup
            .cell_at(coord)
            .is_some_and(|c| !c.is_sentinel() && c.borrow().hiding_past_block(ctx))
    };
    for cell in cells {
        let coord = cell.borrow().coord();
        let top = hides(coord.above());
        let left = hides(coord.neighbor(Neighbor::FrontLeft));
        let right = hides(coord.neighbor(Neighbor::FrontRight));
        if let Some(mut c) = cell.edit() {
            if top {
                c.set_clipped_top();
            }
            if left {
                c.set_clipped_left();
            }
            if right {
                c.set_clipped_right();
            }
        }
    }
}

struct Frame {
    item: Drawable,
    pending: Vec<Drawable>,
    next: usize,
}

fn key(d: &Drawable) -> usize {
    match d {
        Drawable::Cell(c) => c.addr(),
        Drawable::Entity(e) => std::rc::Rc::as_ptr(e) as *const () as usize,
    }
}

/// Drawables covered by `d` that still need painting.
fn pending(d: &Drawable, lookup: &dyn CellLookup, ctx: &RenderContext, camera: &dyn Camera) -> Vec<Drawable> {
    let Drawable::Cell(cell) = d else {
        return Vec::new();
    };
    let Some(mut c) = cell.edit() else {
        return Vec::new();
    };
    c.covered(lookup, ctx)
        .iter()
        .filter(|item| match item {
            Drawable::Cell(other) => other.borrow().should_be_rendered(camera),
            Drawable::Entity(_) => true,
        })
        .cloned()
        .collect()
}

/// Back-to-front paint order: a depth-first walk that emits everything a cell
/// covers before the cell itself. Each drawable appears once.
pub fn draw_order(
    visible: &[CellRef],
    lookup: &dyn CellLookup,
    ctx: &RenderContext,
    camera: &dyn Camera,
) -> Vec<Drawable> {
    let mut seen = HashSet::with_capacity(visible.len());
    let mut out = Vec::with_capacity(visible.len());
    for root in visible {
        let root = Drawable::Cell(root.clone());
        if !seen.insert(key(&root)) {
            continue;
        }
        let mut stack = vec![Frame {
            pending: pending(&root, lookup, ctx, camera),
            item: root,
            next: 0,
        }];
        loop {
            let Some(top) = stack.last_mut() else {
                break;
            };
            if top.next < top.pending.len() {
                let child = top.pending[top.next].clone();
                top.next += 1;
                if seen.insert(key(&child)) {
                    stack.push(Frame {
                        pending: pending(&child, lookup, ctx, camera),
                        item: child,
                        next: 0,
                    });
                }
            } else if let Some(done) = stack.pop() {
                out.push(done.item);
            }
        }
    }
    out
}
