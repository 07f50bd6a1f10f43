//! Per-bot supervision: one isolated process, one shared region, one channel.
//!
//! The supervisor owns the full lifecycle. `startup` brings every resource
//! online or cleans up whatever partially came up, so a caller only ever sees
//! a fully online bot or a fatal [`SetupError`](crate::types::SetupError).
//! After that, `init` runs once
//! and `step` runs once per tick; their failures are [`ExchangeError`]s and
//! leave the bot online so the caller can decide its fate.

use crate::config::{sanitize_name, BotConfig};
use crate::ipc::{ControlChannel, Request, Response, RESPONSE_BYTES};
use crate::logrelay;
use crate::process::BotProcess;
use crate::shm::layout::COLOR_MAX;
use crate::shm::SensorRegion;
use crate::snapshot;
use crate::types::{ExchangeError, Result, StepDecision, FALLBACK_COLOR};
use crate::world::{ArenaQuery, LogSink};
use log::{info, warn};
use std::path::PathBuf;

/// Supervises one competitor bot.
pub struct BotSupervisor {
    config: BotConfig,
    image: String,
    bot_id: u64,
    clean_name: String,
    dir: PathBuf,
    region: Option<SensorRegion>,
    channel: Option<ControlChannel>,
    process: Option<BotProcess>,
    colors: Vec<u32>,
}

impl BotSupervisor {
    /// Prepares a supervisor for the given bot. Nothing is created yet;
    /// call [`startup`](Self::startup) to bring the bot online.
    pub fn new(config: BotConfig, image: &str, display_name: &str, bot_id: u64) -> Self {
        let clean_name = sanitize_name(display_name);
        let dir = config.ipc_dir.join(&clean_name);
        Self {
            config,
            image: image.to_string(),
            bot_id,
            clean_name,
            dir,
            region: None,
            channel: None,
            process: None,
            colors: Vec::new(),
        }
    }

    /// Sanitized identifier used for the directory and the container name.
    pub fn clean_name(&self) -> &str {
        &self.clean_name
    }

    /// Palette captured by the last successful INIT, as packed `0xRRGGBB`.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub fn is_online(&self) -> bool {
        self.region.is_some()
            && self.process.is_some()
            && self.channel.as_ref().is_some_and(|c| c.is_connected())
    }

    /// Brings the bot fully online: region, channel, process, connection.
    /// On any failure everything that came up is torn down again before the
    /// error is returned.
    pub fn startup(&mut self) -> Result<()> {
        if let Err(e) = self.bring_online() {
            warn!("[{}] startup failed, cleaning up: {}", self.clean_name, e);
            if let Err(stop_err) = self.shutdown() {
                warn!(
                    "[{}] cleanup after failed startup also failed: {}",
                    self.clean_name, stop_err
                );
            }
            return Err(e);
        }
        info!("[{}] bot online", self.clean_name);
        Ok(())
    }

    fn bring_online(&mut self) -> Result<()> {
        self.region = Some(SensorRegion::create(&self.dir)?);
        self.channel = Some(ControlChannel::bind(&self.dir)?);
        self.process = Some(BotProcess::spawn(
            &self.config,
            &self.image,
            &self.clean_name,
            self.bot_id,
        )?);

        // channel was just set above
        if let Some(channel) = self.channel.as_mut() {
            channel.accept_within(self.config.connect_timeout)?;
        }
        Ok(())
    }

    /// Runs the one-time INIT exchange and captures the bot's palette from
    /// the shared region. An empty declared palette maps to the fallback
    /// color; declaring more colors than the region holds is an error.
    pub fn init(&mut self) -> Result<(), ExchangeError> {
        let channel = self
            .channel
            .as_ref()
            .ok_or(ExchangeError::NotOnline("control channel not set up"))?;
        if self.process.is_none() {
            return Err(ExchangeError::NotOnline("bot process not running"));
        }
        let region = self
            .region
            .as_mut()
            .ok_or(ExchangeError::NotOnline("shared memory not set up"))?;

        channel.send_exact(&Request::Init.encode())?;

        let mut buf = [0u8; RESPONSE_BYTES];
        channel.recv_exact(&mut buf, self.config.init_timeout)?;
        if let Response::Error(kind) = Response::decode(&buf) {
            return Err(ExchangeError::BotError(kind));
        }

        let view = region.view();
        let declared = view.color_count() as usize;
        if declared == 0 {
            self.colors = vec![FALLBACK_COLOR];
        } else if declared > COLOR_MAX {
            return Err(ExchangeError::PaletteOverflow {
                declared,
                capacity: COLOR_MAX,
            });
        } else {
            self.colors = (0..declared)
                .map(|i| {
                    let (r, g, b) = view.color(i);
                    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
                })
                .collect();
        }

        info!(
            "[{}] init complete, {} color(s)",
            self.clean_name,
            self.colors.len()
        );
        Ok(())
    }

    /// One tick: snapshot the world, run the STEP exchange, relay the bot's
    /// log lines. The log is drained after any received reply, also an error
    /// reply, so diagnostics from a failing bot still reach the sink.
    pub fn step(
        &mut self,
        world: &dyn ArenaQuery,
        sink: &mut dyn LogSink,
    ) -> Result<StepDecision, ExchangeError> {
        let channel = self
            .channel
            .as_ref()
            .ok_or(ExchangeError::NotOnline("control channel not set up"))?;
        if self.process.is_none() {
            return Err(ExchangeError::NotOnline("bot process not running"));
        }
        let region = self
            .region
            .as_mut()
            .ok_or(ExchangeError::NotOnline("shared memory not set up"))?;

        {
            let mut view = region.view();
            snapshot::fill(&mut view, world);
        }

        channel.send_exact(&Request::Step.encode())?;

        let mut buf = [0u8; RESPONSE_BYTES];
        channel.recv_exact(&mut buf, self.config.step_timeout)?;

        logrelay::drain(region.view().log_bytes(), sink);

        match Response::decode(&buf) {
            Response::Ok { delta_angle, boost } => Ok(StepDecision { delta_angle, boost }),
            Response::Error(kind) => Err(ExchangeError::BotError(kind)),
        }
    }

    /// Tears the bot down: channel first so the process sees the socket go
    /// away, then the graceful stop, then the mapping. Idempotent.
    pub fn shutdown(&mut self) -> Result<()> {
        self.channel = None;

        let result = match self.process.as_mut() {
            Some(process) => process.stop(&self.config.runtime, self.config.stop_grace_secs),
            None => Ok(()),
        };
        self.process = None;
        self.region = None;

        result
    }
}

impl Drop for BotSupervisor {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("[{}] shutdown during drop failed: {}", self.clean_name, e);
        }
    }
}
