//! Supervisor configuration and bot name sanitization.
//!
//! The configuration is an explicit value handed to [`crate::BotSupervisor`]
//! at construction; loading it from files or flags is the caller's business.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Maximum length of a sanitized bot name.
pub const NAME_MAX_CHARS: usize = 32;

/// Name used when the display name sanitizes to nothing.
const FALLBACK_NAME: &str = "unnamed";

/// Per-bot supervision configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Base directory holding one private subdirectory per bot.
    pub ipc_dir: PathBuf,
    /// External launcher invoked with {image, sanitized name, container name}.
    pub launcher: PathBuf,
    /// Container runtime program used for the graceful stop invocation.
    pub runtime: String,
    /// Grace period handed to `<runtime> stop --time=<secs>`.
    pub stop_grace_secs: u32,
    /// How long to wait for the spawned process to connect.
    pub connect_timeout: Duration,
    /// Reply deadline for the INIT exchange.
    pub init_timeout: Duration,
    /// Reply deadline for a STEP exchange. Shorter than the connect wait.
    pub step_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            ipc_dir: PathBuf::from("/run/botbox"),
            launcher: PathBuf::from("/usr/local/bin/botbox-launch"),
            runtime: "docker".to_string(),
            stop_grace_secs: 1,
            connect_timeout: Duration::from_secs(10),
            init_timeout: Duration::from_secs(2),
            step_timeout: Duration::from_millis(100),
        }
    }
}

/// Filter a display name down to a safe filesystem/identifier form.
///
/// Output contains only `[a-z0-9+_-]`, is at most [`NAME_MAX_CHARS`] long and
/// never empty. Runs of disallowed characters collapse into a single `_`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::new();
    let mut last_was_filler = false;

    for c in raw.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '_' | '-') {
            out.push(c);
            last_was_filler = false;
        } else if !last_was_filler {
            out.push('_');
            last_was_filler = true;
        }
    }

    out.truncate(NAME_MAX_CHARS);

    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}
