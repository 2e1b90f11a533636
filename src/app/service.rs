//! Application service: the hexagonal core.
//!
//! [`AppService`] decides what each dimmer channel should be doing and keeps
//! the latest sensor picture for telemetry.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  BrightnessSource ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  ClimatePort ───────▶ │       AppService       │
//!       DimmerPort ◀──  │ auto/manual · mains    │
//!                       └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::dimmer::clamp_percent;
use crate::sensors::climate::ClimateReading;
use crate::sensors::light::LightReading;

use super::commands::AppCommand;
use super::events::{AppEvent, ChannelTelemetry, MAX_CHANNELS, TelemetryData};
use super::mains::{MainsMonitor, MainsTransition};
use super::ports::{BrightnessSource, ClimatePort, DimmerPort, EventSink};

/// Where a channel takes its brightness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Follow the light sensor.
    Auto,
    /// Fixed percentage set by a command.
    Manual(u8),
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    channels: usize,
    modes: [ChannelMode; MAX_CHANNELS],
    /// Brightness last handed to the dimmer, per channel.
    applied: [u8; MAX_CHANNELS],
    last_light: Option<LightReading>,
    last_climate: Option<ClimateReading>,
    mains: MainsMonitor,
    tick_count: u64,
}

impl AppService {
    /// Construct the service for `channels` dimmer outputs (capped at
    /// [`MAX_CHANNELS`]).  Every channel starts in automatic mode.
    pub fn new(config: SystemConfig, channels: usize) -> Self {
        let mains = MainsMonitor::new(config.mains_loss_ticks);
        Self {
            config,
            channels: channels.min(MAX_CHANNELS),
            modes: [ChannelMode::Auto; MAX_CHANNELS],
            applied: [0; MAX_CHANNELS],
            last_light: None,
            last_climate: None,
            mains,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            channels: self.channels,
        });
        info!("AppService started with {} dimmer channels", self.channels);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Sample the light sensor, push each channel's target into the dimmer
    /// and check the zero-cross signal is still alive.
    pub fn brightness_tick(
        &mut self,
        hw: &mut (impl BrightnessSource + DimmerPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        let reading = hw.sample_light();
        self.last_light = Some(reading);

        for channel in 0..self.channels {
            let target = match self.modes[channel] {
                ChannelMode::Auto => reading.brightness,
                ChannelMode::Manual(percent) => percent,
            };
            self.apply(&*hw, channel, target, sink);
        }

        match self.mains.observe(hw.zero_cross_count()) {
            Some(MainsTransition::Lost) => {
                warn!("Mains lost: no zero-cross edge for {} ticks", self.config.mains_loss_ticks);
                sink.emit(&AppEvent::MainsLost);
            }
            Some(MainsTransition::Restored) => {
                info!("Mains restored");
                sink.emit(&AppEvent::MainsRestored);
            }
            None => {}
        }
    }

    /// Poll the climate sensor.  Blocks for the Modbus receive window(s).
    pub fn sensor_tick(&mut self, hw: &mut impl ClimatePort, sink: &mut impl EventSink) {
        let reading = hw.read_climate();
        for (quantity, error) in reading.failures() {
            warn!("Climate sensor {} read failed: {}", quantity, error);
            sink.emit(&AppEvent::SensorReadFailed { quantity, error });
        }
        self.last_climate = Some(reading);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  Returns `false` when the command named
    /// a channel that does not exist (nothing changes).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &impl DimmerPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match cmd {
            AppCommand::SetManualBrightness { channel, percent } => {
                if channel >= self.channels {
                    warn!("Manual brightness for unknown channel {}", channel);
                    return false;
                }
                let percent = clamp_percent(percent);
                self.modes[channel] = ChannelMode::Manual(percent);
                info!("Channel {} manual at {}%", channel, percent);
                self.apply(hw, channel, percent, sink);
            }
            AppCommand::ResumeAuto { channel } => {
                if channel >= self.channels {
                    warn!("Resume auto for unknown channel {}", channel);
                    return false;
                }
                self.resume_auto(hw, channel, sink);
            }
            AppCommand::ResumeAutoAll => {
                for channel in 0..self.channels {
                    self.resume_auto(hw, channel, sink);
                }
            }
        }
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the latest readings and the dimmer.
    pub fn build_telemetry(&self, hw: &impl DimmerPort) -> TelemetryData {
        let mut channels = heapless::Vec::new();
        for channel in 0..self.channels {
            // Capacity is MAX_CHANNELS and self.channels never exceeds it.
            let _ = channels.push(ChannelTelemetry {
                percent: hw.brightness(channel).unwrap_or(0),
                auto: self.modes[channel] == ChannelMode::Auto,
            });
        }

        let climate = self.last_climate.as_ref();
        TelemetryData {
            temperature_c: climate.and_then(|c| c.temperature_c.ok()),
            humidity_pct: climate.and_then(|c| c.humidity_pct.ok()),
            light_level: self.last_light.map(|l| l.level),
            channels,
            mains_present: self.mains.is_present(),
            zero_cross_edges: hw.zero_cross_count(),
            tick_count: self.tick_count,
        }
    }

    pub fn mode(&self, channel: usize) -> Option<ChannelMode> {
        self.modes[..self.channels].get(channel).copied()
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    pub fn mains_present(&self) -> bool {
        self.mains.is_present()
    }

    pub fn last_climate(&self) -> Option<&ClimateReading> {
        self.last_climate.as_ref()
    }

    /// Brightness ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn resume_auto(&mut self, hw: &impl DimmerPort, channel: usize, sink: &mut impl EventSink) {
        self.modes[channel] = ChannelMode::Auto;
        // Without a sample yet, the next brightness tick picks it up.
        if let Some(reading) = self.last_light {
            self.apply(hw, channel, reading.brightness, sink);
        }
    }

    fn apply(&mut self, hw: &impl DimmerPort, channel: usize, target: u8, sink: &mut impl EventSink) {
        let Some(applied) = hw.set_brightness(channel, i32::from(target)) else {
            return;
        };
        if applied != self.applied[channel] {
            debug!("Channel {} brightness {}% -> {}%", channel, self.applied[channel], applied);
            self.applied[channel] = applied;
            sink.emit(&AppEvent::BrightnessChanged {
                channel,
                percent: applied,
            });
        }
    }
}
