//! Seams toward the owning world/simulation model.
//!
//! The supervisor never owns game rules or physics. Everything it needs from
//! the simulation (the bot's own status, spatial index queries, toroidal
//! coordinate unwrapping, bot names) comes in through [`ArenaQuery`], and
//! everything it hands back out of band goes through [`LogSink`].

use std::ops::Sub;

/// Two-dimensional field coordinate or offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn norm(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Self-status block copied into shared memory each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelfStatus {
    pub segment_radius: f32,
    pub mass: f32,
    pub sight_radius: f32,
    pub consume_radius: f32,
    pub start_frame: u32,
    pub current_frame: u32,
    pub speed: f32,
    pub max_step_angle: f32,
    pub consumed_natural_food: f32,
    pub consumed_food_hunted_by_self: f32,
    pub consumed_food_hunted_by_others: f32,
}

/// One food item reported by the spatial food index.
#[derive(Clone, Copy, Debug)]
pub struct FoodSighting {
    /// Absolute field position.
    pub pos: Vec2,
    pub value: f32,
}

/// One snake segment reported by the spatial segment index.
#[derive(Clone, Copy, Debug)]
pub struct SegmentSighting {
    /// Absolute field position.
    pub pos: Vec2,
    /// Segment radius of the owning snake.
    pub radius: f32,
    /// Unique id of the owning bot.
    pub owner: u64,
    /// Index of the segment within the owning snake.
    pub index: u32,
}

/// Read-only view of the world as seen from one bot.
///
/// The spatial queries are coarse prefilters: they may return items outside
/// the requested radius, and they enumerate in index order, not by distance.
/// The snapshot serializer applies the authoritative distance filters.
pub trait ArenaQuery {
    /// Unique id of the supervised bot.
    fn self_id(&self) -> u64;

    /// Current self-status block.
    fn self_status(&self) -> SelfStatus;

    /// Absolute position of the bot's head.
    fn head_position(&self) -> Vec2;

    /// Current heading, in radians.
    fn heading(&self) -> f32;

    /// Largest segment radius present anywhere on the field.
    fn largest_segment_radius(&self) -> f32;

    /// Food items near `center`, in index enumeration order.
    fn food_in_range(&self, center: Vec2, radius: f32) -> Vec<FoodSighting>;

    /// Snake segments near `center`, in index enumeration order.
    fn segments_in_range(&self, center: Vec2, radius: f32) -> Vec<SegmentSighting>;

    /// Shortest-path offset for `delta` on the wrapped (edge-connected) field.
    fn unwrap_offset(&self, delta: Vec2) -> Vec2;

    /// Display name for a bot id, for the shared-memory bot list.
    fn bot_name(&self, id: u64) -> String;
}

/// Receiver for log lines relayed out of the isolated process.
pub trait LogSink {
    fn append_line(&mut self, line: &str);
}

impl LogSink for Vec<String> {
    fn append_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}
