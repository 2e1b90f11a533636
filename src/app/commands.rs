//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (a console, a
//! remote dashboard) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Pin a channel to a fixed brightness, overriding the light sensor.
    /// `percent` is clamped to 0–100.
    SetManualBrightness { channel: usize, percent: i32 },

    /// Return one channel to automatic brightness.
    ResumeAuto { channel: usize },

    /// Return every channel to automatic brightness.
    ResumeAutoAll,
}
