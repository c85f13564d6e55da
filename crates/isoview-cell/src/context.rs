use std::borrow::Cow;
use std::cell::Cell;

use isoview_blocks::classify;
use isoview_blocks::registry::BlockRegistry;
use isoview_blocks::{BlockClassifier, BlockId, BlockValue};
use isoview_geom::Coord;

use crate::cell::{CellRef, RenderCell};

/// Classifier that may also hand out specialised cells for custom ids.
pub trait CellClassifier: BlockClassifier {
    /// Cell with custom behaviour, or `None` to use the plain model.
    fn new_instance(&self, _id: BlockId, _value: BlockValue, _coord: Coord) -> Option<RenderCell> {
        None
    }
}

impl CellClassifier for BlockRegistry {}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    /// Tint sides with distance fog instead of flat grey.
    pub fog: bool,
    /// Brighten left sides and darken right sides independent of lighting.
    pub static_shade: bool,
}

/// Process-wide render state shared by every cell and chunk.
///
/// Single-threaded: counters use `Cell`, so the context is neither `Send` nor `Sync`.
/// Covered lists compare their build version against [`RenderContext::content_version`].
pub struct RenderContext {
    classifier: Option<Box<dyn CellClassifier>>,
    sentinel: CellRef,
    settings: RenderSettings,
    content_version: Cell<u64>,
    frame: Cell<u64>,
    draw_calls: Cell<u64>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl RenderContext {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            classifier: None,
            sentinel: CellRef::sentinel(),
            settings,
            content_version: Cell::new(0),
            frame: Cell::new(0),
            draw_calls: Cell::new(0),
        }
    }

    pub fn with_classifier(classifier: impl CellClassifier + 'static, settings: RenderSettings) -> Self {
        Self {
            classifier: Some(Box::new(classifier)),
            ..Self::new(settings)
        }
    }

    #[inline]
    pub fn classifier(&self) -> Option<&dyn CellClassifier> {
        self.classifier.as_deref()
    }

    #[inline]
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    /// Shared air cell for uninitialised or out-of-range slots. Never mutable.
    #[inline]
    pub fn sentinel(&self) -> &CellRef {
        &self.sentinel
    }

    #[inline]
    pub fn content_version(&self) -> u64 {
        self.content_version.get()
    }

    /// Invalidates every covered list. One counter covers the whole map.
    pub fn mark_content_changed(&self) {
        self.content_version.set(self.content_version.get() + 1);
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Starts a new frame and returns the draw calls of the finished one.
    pub fn advance_frame(&self) -> u64 {
        self.frame.set(self.frame.get() + 1);
        self.draw_calls.replace(0)
    }

    #[inline]
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls.get()
    }

    #[inline]
    pub(crate) fn count_draw_call(&self) {
        self.draw_calls.set(self.draw_calls.get() + 1);
    }

    pub fn is_obstacle(&self, id: BlockId, value: BlockValue) -> bool {
        classify::is_obstacle(self.classifier(), id, value)
    }

    pub fn is_transparent(&self, id: BlockId, value: BlockValue) -> bool {
        classify::is_transparent(self.classifier(), id, value)
    }

    pub fn is_liquid(&self, id: BlockId, value: BlockValue) -> bool {
        classify::is_liquid(self.classifier(), id, value)
    }

    pub fn is_indestructible(&self, id: BlockId, value: BlockValue) -> bool {
        classify::is_indestructible(self.classifier(), id, value)
    }

    pub fn has_sides(&self, id: BlockId, value: BlockValue) -> bool {
        classify::has_sides(self.classifier(), id, value)
    }

    pub fn block_name(&self, id: BlockId, value: BlockValue) -> Cow<'_, str> {
        classify::name(self.classifier(), id, value)
    }
}
