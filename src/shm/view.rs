//! Typed view over the raw sensor region buffer.
//!
//! All reads and writes go through explicit little-endian field codecs at the
//! offsets defined in [`super::layout`]. The view works on any byte buffer of
//! region size, which lets tests exercise the exact wire layout without a
//! mapping.

use crate::shm::layout::{
    get_f32, get_u32, get_u64, put_f32, put_u32, put_u64, BOT_COUNT_OFF, BOT_ENTRY_BYTES,
    BOT_NAME_BYTES, BOT_OFF, COLORS_OFF, COLOR_COUNT_OFF, COLOR_ENTRY_BYTES, FOOD_COUNT_OFF,
    FOOD_ENTRY_BYTES, FOOD_OFF, LAYOUT_VERSION, LOG_BYTES, LOG_OFF, REGION_BYTES,
    SEGMENT_COUNT_OFF, SEGMENT_ENTRY_BYTES, SEGMENT_OFF, SELF_OFF, VERSION_OFF,
};
use crate::world::SelfStatus;

/// Food list entry in bot-relative polar form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodEntry {
    pub x: f32,
    pub y: f32,
    pub value: f32,
    pub dir: f32,
    pub dist: f32,
}

/// Segment list entry in bot-relative polar form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentEntry {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dir: f32,
    pub dist: f32,
    pub bot_id: u64,
    pub index: u32,
    pub is_self: bool,
}

/// Bot list entry.
#[derive(Clone, Debug, PartialEq)]
pub struct BotEntry {
    pub id: u64,
    pub name: String,
}

/// Typed accessor over a sensor region buffer.
pub struct SensorView<'a> {
    buf: &'a mut [u8],
}

impl<'a> SensorView<'a> {
    /// Wraps a buffer. The buffer must span the whole region layout.
    pub fn new(buf: &'a mut [u8]) -> Self {
        assert!(
            buf.len() >= REGION_BYTES,
            "sensor buffer smaller than region layout"
        );
        Self { buf }
    }

    pub fn stamp_version(&mut self) {
        put_u32(self.buf, VERSION_OFF, LAYOUT_VERSION);
    }

    pub fn version(&self) -> u32 {
        get_u32(self.buf, VERSION_OFF)
    }

    /// One neutral gray entry, overwritten by the bot at init if it cares.
    pub fn set_default_palette(&mut self) {
        self.set_color_count(1);
        self.set_color(0, 0x80, 0x80, 0x80);
    }

    pub fn set_color_count(&mut self, n: u32) {
        put_u32(self.buf, COLOR_COUNT_OFF, n);
    }

    pub fn color_count(&self) -> u32 {
        get_u32(self.buf, COLOR_COUNT_OFF)
    }

    pub fn set_color(&mut self, i: usize, r: u8, g: u8, b: u8) {
        let off = COLORS_OFF + i * COLOR_ENTRY_BYTES;
        self.buf[off] = r;
        self.buf[off + 1] = g;
        self.buf[off + 2] = b;
    }

    pub fn color(&self, i: usize) -> (u8, u8, u8) {
        let off = COLORS_OFF + i * COLOR_ENTRY_BYTES;
        (self.buf[off], self.buf[off + 1], self.buf[off + 2])
    }

    pub fn write_self_status(&mut self, s: &SelfStatus) {
        let b = &mut *self.buf;
        put_f32(b, SELF_OFF, s.segment_radius);
        put_f32(b, SELF_OFF + 4, s.mass);
        put_f32(b, SELF_OFF + 8, s.sight_radius);
        put_f32(b, SELF_OFF + 12, s.consume_radius);
        put_u32(b, SELF_OFF + 16, s.start_frame);
        put_u32(b, SELF_OFF + 20, s.current_frame);
        put_f32(b, SELF_OFF + 24, s.speed);
        put_f32(b, SELF_OFF + 28, s.max_step_angle);
        put_f32(b, SELF_OFF + 32, s.consumed_natural_food);
        put_f32(b, SELF_OFF + 36, s.consumed_food_hunted_by_self);
        put_f32(b, SELF_OFF + 40, s.consumed_food_hunted_by_others);
    }

    pub fn self_status(&self) -> SelfStatus {
        let b = &*self.buf;
        SelfStatus {
            segment_radius: get_f32(b, SELF_OFF),
            mass: get_f32(b, SELF_OFF + 4),
            sight_radius: get_f32(b, SELF_OFF + 8),
            consume_radius: get_f32(b, SELF_OFF + 12),
            start_frame: get_u32(b, SELF_OFF + 16),
            current_frame: get_u32(b, SELF_OFF + 20),
            speed: get_f32(b, SELF_OFF + 24),
            max_step_angle: get_f32(b, SELF_OFF + 28),
            consumed_natural_food: get_f32(b, SELF_OFF + 32),
            consumed_food_hunted_by_self: get_f32(b, SELF_OFF + 36),
            consumed_food_hunted_by_others: get_f32(b, SELF_OFF + 40),
        }
    }

    pub fn write_food(&mut self, entries: &[FoodEntry]) {
        debug_assert!(entries.len() <= crate::shm::layout::FOOD_MAX);
        put_u32(self.buf, FOOD_COUNT_OFF, entries.len() as u32);
        for (i, e) in entries.iter().enumerate() {
            let off = FOOD_OFF + i * FOOD_ENTRY_BYTES;
            put_f32(self.buf, off, e.x);
            put_f32(self.buf, off + 4, e.y);
            put_f32(self.buf, off + 8, e.value);
            put_f32(self.buf, off + 12, e.dir);
            put_f32(self.buf, off + 16, e.dist);
        }
    }

    pub fn food_count(&self) -> u32 {
        get_u32(self.buf, FOOD_COUNT_OFF)
    }

    pub fn food(&self, i: usize) -> FoodEntry {
        let off = FOOD_OFF + i * FOOD_ENTRY_BYTES;
        FoodEntry {
            x: get_f32(self.buf, off),
            y: get_f32(self.buf, off + 4),
            value: get_f32(self.buf, off + 8),
            dir: get_f32(self.buf, off + 12),
            dist: get_f32(self.buf, off + 16),
        }
    }

    pub fn write_segments(&mut self, entries: &[SegmentEntry]) {
        debug_assert!(entries.len() <= crate::shm::layout::SEGMENT_MAX);
        put_u32(self.buf, SEGMENT_COUNT_OFF, entries.len() as u32);
        for (i, e) in entries.iter().enumerate() {
            let off = SEGMENT_OFF + i * SEGMENT_ENTRY_BYTES;
            put_f32(self.buf, off, e.x);
            put_f32(self.buf, off + 4, e.y);
            put_f32(self.buf, off + 8, e.radius);
            put_f32(self.buf, off + 12, e.dir);
            put_f32(self.buf, off + 16, e.dist);
            put_u64(self.buf, off + 20, e.bot_id);
            put_u32(self.buf, off + 28, e.index);
            self.buf[off + 32] = e.is_self as u8;
        }
    }

    pub fn segment_count(&self) -> u32 {
        get_u32(self.buf, SEGMENT_COUNT_OFF)
    }

    pub fn segment(&self, i: usize) -> SegmentEntry {
        let off = SEGMENT_OFF + i * SEGMENT_ENTRY_BYTES;
        SegmentEntry {
            x: get_f32(self.buf, off),
            y: get_f32(self.buf, off + 4),
            radius: get_f32(self.buf, off + 8),
            dir: get_f32(self.buf, off + 12),
            dist: get_f32(self.buf, off + 16),
            bot_id: get_u64(self.buf, off + 20),
            index: get_u32(self.buf, off + 28),
            is_self: self.buf[off + 32] != 0,
        }
    }

    pub fn write_bots(&mut self, entries: &[BotEntry]) {
        debug_assert!(entries.len() <= crate::shm::layout::BOT_MAX);
        put_u32(self.buf, BOT_COUNT_OFF, entries.len() as u32);
        for (i, e) in entries.iter().enumerate() {
            let off = BOT_OFF + i * BOT_ENTRY_BYTES;
            put_u64(self.buf, off, e.id);
            let name_buf = &mut self.buf[off + 8..off + 8 + BOT_NAME_BYTES];
            name_buf.fill(0);
            let bytes = e.name.as_bytes();
            let n = bytes.len().min(BOT_NAME_BYTES);
            name_buf[..n].copy_from_slice(&bytes[..n]);
        }
    }

    pub fn bot_count(&self) -> u32 {
        get_u32(self.buf, BOT_COUNT_OFF)
    }

    pub fn bot(&self, i: usize) -> BotEntry {
        let off = BOT_OFF + i * BOT_ENTRY_BYTES;
        let name_buf = &self.buf[off + 8..off + 8 + BOT_NAME_BYTES];
        let end = name_buf.iter().position(|&b| b == 0).unwrap_or(BOT_NAME_BYTES);
        BotEntry {
            id: get_u64(self.buf, off),
            name: String::from_utf8_lossy(&name_buf[..end]).into_owned(),
        }
    }

    /// A leading NUL means "nothing to report"; written before every STEP.
    pub fn clear_log_head(&mut self) {
        self.buf[LOG_OFF] = 0;
    }

    pub fn log_bytes(&self) -> &[u8] {
        &self.buf[LOG_OFF..LOG_OFF + LOG_BYTES]
    }

    /// Places raw text into the log buffer, truncated to capacity.
    /// This is the isolated process's side of the contract; the supervisor
    /// only ever clears and reads.
    pub fn write_log(&mut self, text: &[u8]) {
        let n = text.len().min(LOG_BYTES);
        self.buf[LOG_OFF..LOG_OFF + n].copy_from_slice(&text[..n]);
    }
}
