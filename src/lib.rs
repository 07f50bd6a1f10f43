//! botbox: supervision of untrusted competitor bots in isolated processes
//!
//! One [`BotSupervisor`] per bot owns three resources with the same lifetime:
//! a file-backed shared sensor region, a SOCK_SEQPACKET control channel and
//! the containerized bot process. The simulation pushes a bounded,
//! bot-relative world snapshot into the region each tick, requests a steering
//! decision over the channel under a strict deadline, and relays whatever the
//! bot logged.
//!
//! # Architecture
//!
//! - [`shm`]: versioned binary layout, file-backed mapping, typed view
//! - [`ipc`]: seqpacket channel and the fixed-size request/response records
//! - [`snapshot`]: per-tick world serialization into the region
//! - [`logrelay`]: draining the region's text log into line sinks
//! - [`process`]: launcher spawn, graceful stop, exit reaping
//! - [`supervisor`]: lifecycle orchestration and the INIT/STEP exchanges
//! - [`world`]: query seams toward the owning simulation
//! - [`config`]: supervision parameters and bot name sanitization
//! - [`types`]: error severities and the step decision
//!
//! # Design Principles
//!
//! 1. **No partial online state** - a bot is fully online or torn down
//! 2. **Fixed worst case** - bounded lists, fixed-size records, deadlines
//! 3. **Explicit layout** - little-endian fields at versioned offsets, never
//!    a compiler's struct layout
//! 4. **The simulation never blocks on a bot** - every wait has a deadline,
//!    every send requires immediate writability

pub mod config;
pub mod ipc;
pub mod logrelay;
pub mod process;
pub mod shm;
pub mod snapshot;
pub mod supervisor;
pub mod types;
pub mod world;

pub use config::{sanitize_name, BotConfig};
pub use supervisor::BotSupervisor;
pub use types::{ExchangeError, SetupError, StepDecision, FALLBACK_COLOR};
pub use world::{ArenaQuery, FoodSighting, LogSink, SegmentSighting, SelfStatus, Vec2};
