//! Shared sensor region
//!
//! A fixed-size file mapped read-write into both the supervisor and the
//! isolated process. The byte layout is explicit and versioned ([`layout`]),
//! accessed only through a typed view over the raw buffer ([`view`]), never
//! through a language-native aggregate assumed to match memory directly.

pub mod layout;
pub mod region;
pub mod view;

pub use region::SensorRegion;
pub use view::{BotEntry, FoodEntry, SegmentEntry, SensorView};
