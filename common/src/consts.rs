//! Tuning constants shared by the track graph and the AI.

/// Relative bearings smaller than this count as driving straight.
pub const MAX_STRAIGHT_ANGLE: f32 = 0.1;

/// How far above the highest corner of a quad a point may be and still be on it.
pub const QUAD_MAX_HEIGHT_ABOVE: f32 = 5.0;

/// How far below the lowest corner of a quad a point may be and still be on it.
pub const QUAD_MAX_HEIGHT_BELOW: f32 = 1.0;

/// Radius within which a kart touches an item.
pub const ITEM_HIT_RADIUS: f32 = 1.0;

/// Lateral offset of an item's avoidance points from the item.
pub const ITEM_AVOIDANCE_OFFSET: f32 = 2.5;

/// Hard cap for every per-tick sampling loop.
pub const MAX_ITERATIONS: usize = 1000;
