//! Versioned binary layout of the shared sensor region.
//!
//! All multi-byte fields are little-endian at fixed offsets. Both sides of
//! the process boundary validate [`LAYOUT_VERSION`] instead of trusting a
//! compiler's struct layout. Every list is a count followed by a fixed-
//! capacity array; entries `[0, count)` are valid and `count` never exceeds
//! the capacity.

/// Bumped whenever any offset or capacity below changes.
pub const LAYOUT_VERSION: u32 = 1;

/// Palette capacity.
pub const COLOR_MAX: usize = 8;
/// Food list capacity.
pub const FOOD_MAX: usize = 1024;
/// Segment list capacity.
pub const SEGMENT_MAX: usize = 1024;
/// Bot list capacity.
pub const BOT_MAX: usize = 128;
/// Fixed width of a bot name, zero-padded.
pub const BOT_NAME_BYTES: usize = 64;
/// Capacity of the append text log buffer.
pub const LOG_BYTES: usize = 1024;

pub const VERSION_OFF: usize = 0;

pub const COLOR_COUNT_OFF: usize = 4;
pub const COLORS_OFF: usize = 8;
/// One byte each for r, g, b.
pub const COLOR_ENTRY_BYTES: usize = 3;

pub const SELF_OFF: usize = COLORS_OFF + COLOR_MAX * COLOR_ENTRY_BYTES;
/// Eleven 4-byte fields, see [`crate::world::SelfStatus`].
pub const SELF_BYTES: usize = 44;

pub const FOOD_COUNT_OFF: usize = SELF_OFF + SELF_BYTES;
pub const FOOD_OFF: usize = FOOD_COUNT_OFF + 4;
/// x, y, value, dir, dist as five f32.
pub const FOOD_ENTRY_BYTES: usize = 20;

pub const SEGMENT_COUNT_OFF: usize = FOOD_OFF + FOOD_MAX * FOOD_ENTRY_BYTES;
pub const SEGMENT_OFF: usize = SEGMENT_COUNT_OFF + 4;
/// x, y, radius, dir, dist (f32), owner id (u64), segment index (u32),
/// self flag (u8).
pub const SEGMENT_ENTRY_BYTES: usize = 33;

pub const BOT_COUNT_OFF: usize = SEGMENT_OFF + SEGMENT_MAX * SEGMENT_ENTRY_BYTES;
pub const BOT_OFF: usize = BOT_COUNT_OFF + 4;
pub const BOT_ENTRY_BYTES: usize = 8 + BOT_NAME_BYTES;

pub const LOG_OFF: usize = BOT_OFF + BOT_MAX * BOT_ENTRY_BYTES;

/// Total size of the region file and mapping.
pub const REGION_BYTES: usize = LOG_OFF + LOG_BYTES;

pub(crate) fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(buf[off..off + 4].try_into().unwrap())
}

pub(crate) fn put_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u64(buf: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(buf[off..off + 8].try_into().unwrap())
}

pub(crate) fn put_f32(buf: &mut [u8], off: usize, v: f32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_f32(buf: &[u8], off: usize) -> f32 {
    f32::from_le_bytes(buf[off..off + 4].try_into().unwrap())
}
