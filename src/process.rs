//! Spawning, stopping and reaping the isolated bot process.
//!
//! The launcher and the container runtime are opaque external collaborators;
//! this module only ever hands them positional arguments and waits on their
//! exits. The bot's own abnormal exit is logged, never escalated.

use crate::config::BotConfig;
use crate::types::{Result, SetupError};
use log::{info, warn};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

/// Handle to one spawned launcher process and its container.
#[derive(Debug)]
pub struct BotProcess {
    child: Child,
    container: String,
    name: String,
    stopped: bool,
}

impl BotProcess {
    /// Invokes the external launcher with {image, sanitized name, container
    /// name}. The container name combines the sanitized name, the bot id and
    /// the spawn time so restarts never collide.
    pub fn spawn(
        config: &BotConfig,
        image: &str,
        clean_name: &str,
        bot_id: u64,
    ) -> Result<Self> {
        let spawn_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let container = format!("botbox_{}_{}_{}", clean_name, bot_id, spawn_time);

        let child = Command::new(&config.launcher)
            .arg(image)
            .arg(clean_name)
            .arg(&container)
            .spawn()
            .map_err(SetupError::Spawn)?;

        info!(
            "[{}] launched container {} (launcher pid {})",
            clean_name,
            container,
            child.id()
        );

        Ok(Self {
            child,
            container,
            name: clean_name.to_string(),
            stopped: false,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// Graceful-then-forced shutdown. If the process already exited (checked
    /// non-blocking), the explicit stop is skipped; otherwise the runtime's
    /// stop operation runs with a short grace period and both exits are
    /// awaited. Idempotent.
    pub fn stop(&mut self, runtime: &str, grace_secs: u32) -> Result<()> {
        if self.stopped {
            return Ok(());
        }

        match self.child.try_wait().map_err(SetupError::Stop)? {
            Some(status) => {
                info!(
                    "[{}] process already exited, skipping '{} stop'",
                    self.name, runtime
                );
                self.log_exit(status);
            }
            None => {
                let stop_status = Command::new(runtime)
                    .arg("stop")
                    .arg(format!("--time={}", grace_secs))
                    .arg(&self.container)
                    .status()
                    .map_err(SetupError::Stop)?;

                if stop_status.success() {
                    info!("[{}] '{} stop' completed", self.name, runtime);
                } else {
                    warn!(
                        "[{}] '{} stop' exited with unexpected status: {}",
                        self.name, runtime, stop_status
                    );
                }

                let status = self.child.wait().map_err(SetupError::Stop)?;
                self.log_exit(status);
            }
        }

        self.stopped = true;
        Ok(())
    }

    fn log_exit(&self, status: ExitStatus) {
        if let Some(code) = status.code() {
            info!("[{}] bot exited with code {}", self.name, code);
        } else if let Some(sig) = status.signal() {
            warn!("[{}] bot terminated by signal {}", self.name, sig);
        } else {
            warn!(
                "[{}] bot terminated with unexpected status: {}",
                self.name, status
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> BotConfig {
        BotConfig {
            launcher: PathBuf::from("/bin/true"),
            runtime: "/bin/true".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn container_name_carries_name_and_id() {
        let process = BotProcess::spawn(&test_config(), "img", "tester", 42).unwrap();
        assert!(process.container_name().starts_with("botbox_tester_42_"));
    }

    #[test]
    fn container_names_differ_across_bots() {
        let a = BotProcess::spawn(&test_config(), "img", "dup", 1).unwrap();
        let b = BotProcess::spawn(&test_config(), "img", "dup", 2).unwrap();
        assert_ne!(a.container_name(), b.container_name());
    }

    #[test]
    fn stop_skips_runtime_for_exited_process_and_is_idempotent() {
        let mut process = BotProcess::spawn(&test_config(), "img", "gone", 7).unwrap();
        // launcher is /bin/true, so the process exits on its own
        std::thread::sleep(std::time::Duration::from_millis(50));
        // runtime program does not exist; the stop must not need it
        process.stop("/nonexistent/runtime", 1).unwrap();
        process.stop("/nonexistent/runtime", 1).unwrap();
    }

    #[test]
    fn spawn_failure_is_fatal() {
        let mut config = test_config();
        config.launcher = PathBuf::from("/nonexistent/launcher");
        let err = BotProcess::spawn(&config, "img", "ghost", 1).unwrap_err();
        assert!(matches!(err, SetupError::Spawn(_)));
    }
}
