//! Covered lists: what has to be painted before a cell.

use std::fmt;
use std::rc::Rc;

use isoview_geom::{Coord, Neighbor};

use crate::cell::{CellRef, RenderCell};
use crate::context::RenderContext;

/// Resolves coordinates to cells for the covered walk.
pub trait CellLookup {
    fn cell_at(&self, coord: Coord) -> Option<CellRef>;

    /// Number of z layers.
    fn layers(&self) -> i32;
}

/// Entity sharing a cell's draw slot for one frame.
pub trait CoveredEntity: fmt::Debug {
    /// Back-to-front sort key, ascending.
    fn depth(&self) -> f32;
}

/// Something the renderer paints.
#[derive(Clone, Debug)]
pub enum Drawable {
    Cell(CellRef),
    Entity(Rc<dyn CoveredEntity>),
}

impl Drawable {
    /// Identity, not equality of content.
    pub fn same_as(&self, other: &Drawable) -> bool {
        match (self, other) {
            (Drawable::Cell(a), Drawable::Cell(b)) => a.ptr_eq(b),
            (Drawable::Entity(a), Drawable::Entity(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    pub fn as_cell(&self) -> Option<&CellRef> {
        match self {
            Drawable::Cell(c) => Some(c),
            Drawable::Entity(_) => None,
        }
    }
}

impl RenderCell {
    /// Adds an entity for depth sorting this frame.
    pub fn add_covered_entity(&mut self, entity: Rc<dyn CoveredEntity>) {
        self.covered_entities.push(entity);
    }

    /// The caller clears entities every frame.
    pub fn clear_covered_entities(&mut self) {
        self.covered_entities.clear();
    }

    pub fn covered_entity_count(&self) -> usize {
        self.covered_entities.len()
    }

    /// Whether the next [`RenderCell::covered`] call rebuilds the block list.
    pub fn needs_covered_rebuild(&self, ctx: &RenderContext) -> bool {
        self.rebuilt_version
            .is_none_or(|v| v < ctx.content_version())
    }

    /// Drawables that must be painted before this cell: pending entities sorted by
    /// depth, followed by the covered neighbour cells. The sort is stable and puts
    /// NaN depths last.
    ///
    /// The neighbour list is rebuilt only after the content version moved. With no
    /// entities the stored list is returned as is.
    pub fn covered(&mut self, lookup: &dyn CellLookup, ctx: &RenderContext) -> &[Drawable] {
        if self.needs_covered_rebuild(ctx) {
            self.rebuild_covered(lookup, ctx);
        }
        if self.covered_entities.is_empty() {
            return &self.covered;
        }
        self.covered_entities
            .sort_by(|a, b| a.depth().total_cmp(&b.depth()));
        self.merged.clear();
        self.merged.extend(
            self.covered_entities
                .iter()
                .map(|e| Drawable::Entity(Rc::clone(e))),
        );
        self.merged.extend(self.covered.iter().cloned());
        &self.merged
    }

    fn rebuild_covered(&mut self, lookup: &dyn CellLookup, ctx: &RenderContext) {
        let origin = self.coord;
        let push = |coord: Coord, out: &mut Vec<Drawable>| {
            if let Some(cell) = lookup.cell_at(coord) {
                out.push(Drawable::Cell(cell));
            }
        };
        let covered = &mut self.covered;
        covered.clear();

        if origin.z > 0 {
            let down = origin.below();
            push(down, covered);
            push(down.neighbor(Neighbor::BackRight), covered);
            push(down.neighbor(Neighbor::BackLeft), covered);
            push(down.neighbor(Neighbor::Back), covered);
        }

        push(origin.neighbor(Neighbor::Back), covered);
        push(origin.neighbor(Neighbor::BackRight), covered);
        push(origin.neighbor(Neighbor::BackLeft), covered);

        // A taller block one row back still sits behind this one.
        if origin.z < lookup.layers() - 1 {
            let up = origin.above();
            push(up.neighbor(Neighbor::BackLeft), covered);
            push(up.neighbor(Neighbor::BackRight), covered);
        }

        self.rebuilt_version = Some(ctx.content_version());
    }
}
