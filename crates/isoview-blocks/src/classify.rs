//! Static classification of `(id, value)` pairs.
//!
//! Ids up to [`LAST_BUILTIN`] have fixed behaviour. Larger ids are answered by an
//! optional [`BlockClassifier`]; without one the defaults below apply.

use std::borrow::Cow;

use crate::types::{AIR, BlockId, BlockValue, INVISIBLE_WALL, LAST_BUILTIN, WATER};

/// Classification for custom block ids. Answers must depend only on `(id, value)`.
pub trait BlockClassifier {
    fn is_obstacle(&self, id: BlockId, value: BlockValue) -> bool;
    fn is_transparent(&self, id: BlockId, value: BlockValue) -> bool;
    fn is_liquid(&self, id: BlockId, value: BlockValue) -> bool;
    fn is_indestructible(&self, id: BlockId, value: BlockValue) -> bool;
    fn has_sides(&self, id: BlockId, value: BlockValue) -> bool;
    fn name(&self, id: BlockId, value: BlockValue) -> Cow<'_, str>;
}

#[inline]
fn custom<C: BlockClassifier + ?Sized>(c: Option<&C>, id: BlockId) -> Option<&C> {
    if id > LAST_BUILTIN { c } else { None }
}

pub fn is_obstacle<C: BlockClassifier + ?Sized>(c: Option<&C>, id: BlockId, value: BlockValue) -> bool {
    if let Some(c) = custom(c, id) {
        return c.is_obstacle(id, value);
    }
    id != AIR && id != WATER
}

pub fn is_transparent<C: BlockClassifier + ?Sized>(
    c: Option<&C>,
    id: BlockId,
    value: BlockValue,
) -> bool {
    if id == AIR || id == WATER || id == INVISIBLE_WALL {
        return true;
    }
    custom(c, id).is_some_and(|c| c.is_transparent(id, value))
}

pub fn is_liquid<C: BlockClassifier + ?Sized>(c: Option<&C>, id: BlockId, value: BlockValue) -> bool {
    match custom(c, id) {
        Some(c) => c.is_liquid(id, value),
        None => id == WATER,
    }
}

pub fn is_indestructible<C: BlockClassifier + ?Sized>(
    c: Option<&C>,
    id: BlockId,
    value: BlockValue,
) -> bool {
    custom(c, id).is_some_and(|c| c.is_indestructible(id, value))
}

pub fn has_sides<C: BlockClassifier + ?Sized>(c: Option<&C>, id: BlockId, value: BlockValue) -> bool {
    if id == AIR || id == INVISIBLE_WALL {
        return false;
    }
    match custom(c, id) {
        Some(c) => c.has_sides(id, value),
        None => true,
    }
}

pub fn name<C: BlockClassifier + ?Sized>(c: Option<&C>, id: BlockId, value: BlockValue) -> Cow<'_, str> {
    if id <= LAST_BUILTIN {
        return Cow::Borrowed(builtin_name(id));
    }
    match c {
        Some(c) => c.name(id, value),
        None => Cow::Borrowed("undefined"),
    }
}

fn builtin_name(id: BlockId) -> &'static str {
    match id {
        0 => "air",
        1 => "grass",
        2 => "dirt",
        3 => "stone",
        4 => "invisible obstacle",
        8 => "sand",
        9 => "water",
        _ => "undefined",
    }
}
