//! Error and result types shared across the crate.
//!
//! Two severities exist. [`SetupError`] is fatal: a bot that fails directory,
//! shared-memory, channel or process setup never comes online and there is no
//! partial-online state. [`ExchangeError`] is operational: a single protocol
//! exchange failed and the caller decides whether that means "skip this tick"
//! or "remove this bot". Nothing at this layer retries automatically.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Packed `0xRRGGBB` color shown for bots that declare an empty palette.
pub const FALLBACK_COLOR: u32 = 0x00EC_25A2;

/// Steering decision returned by a successful STEP exchange.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDecision {
    /// Requested change of heading, in radians.
    pub delta_angle: f32,
    /// Whether the bot wants to boost this tick.
    pub boost: bool,
}

/// Fatal failures while bringing a bot online or tearing it down.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("failed to set up bot directory: {0}")]
    Directory(io::Error),

    #[error("failed to set up shared memory: {0}")]
    SharedMemory(io::Error),

    #[error("failed to set up control channel: {0}")]
    Channel(io::Error),

    #[error("failed to start bot process: {0}")]
    Spawn(io::Error),

    #[error("error while waiting for bot process to connect: {0}")]
    Accept(io::Error),

    #[error("timeout while waiting for bot process to connect")]
    ConnectTimeout,

    #[error("error while stopping bot process: {0}")]
    Stop(io::Error),
}

/// Per-exchange failures reported from `init` and `step`.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("bot is not online: {0}")]
    NotOnline(&'static str),

    #[error("control channel is not ready for write")]
    NotWritable,

    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("short read: got {got} of {expected} bytes")]
    ShortRead { got: usize, expected: usize },

    #[error("timed out after {0:?} waiting for bot reply")]
    Timeout(Duration),

    #[error("bot replied with error status {0}")]
    BotError(u32),

    #[error("bot declared {declared} colors, capacity is {capacity}")]
    PaletteOverflow { declared: usize, capacity: usize },

    #[error("channel IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for fatal setup operations.
pub type Result<T, E = SetupError> = std::result::Result<T, E>;
