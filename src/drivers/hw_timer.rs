//! Periodic application ticks using ESP-IDF's esp_timer API.
//!
//! Creates periodic timers that push events into the lock-free SPSC queue.
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call push_event() which uses atomics.

use crate::config::SystemConfig;

#[cfg(target_os = "espidf")]
use super::hw_init::HwInitError;
#[cfg(target_os = "espidf")]
use crate::events::{Event, push_event};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

/// Tick periods in microseconds, derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPeriods {
    pub brightness_us: u64,
    pub sensor_poll_us: u64,
    pub telemetry_us: u64,
}

impl TickPeriods {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            brightness_us: u64::from(config.brightness_interval_ms) * 1_000,
            sensor_poll_us: u64::from(config.sensor_poll_interval_ms) * 1_000,
            telemetry_us: u64::from(config.telemetry_interval_secs) * 1_000_000,
        }
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn brightness_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::BrightnessTick);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sensor_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::SensorPollTick);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn telemetry_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::TelemetryTick);
}

#[cfg(target_os = "espidf")]
unsafe fn start_periodic(
    name: &'static core::ffi::CStr,
    callback: unsafe extern "C" fn(*mut core::ffi::c_void),
    period_us: u64,
) -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(callback),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();
    let ret = unsafe { esp_timer_create(&args, &mut handle) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::TimerFailed(ret));
    }
    let ret = unsafe { esp_timer_start_periodic(handle, period_us) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::TimerFailed(ret));
    }
    Ok(())
}

/// Start the brightness, sensor-poll and telemetry tick timers.
///
/// The timers run for the lifetime of the firmware; their handles are not
/// kept.
#[cfg(target_os = "espidf")]
pub fn start_timers(config: &SystemConfig) -> Result<(), HwInitError> {
    let periods = TickPeriods::from_config(config);
    // SAFETY: called once from the main task; the callbacks only call
    // push_event(), which is lock-free.
    unsafe {
        start_periodic(c"brightness", brightness_tick_cb, periods.brightness_us)?;
        start_periodic(c"sensor", sensor_tick_cb, periods.sensor_poll_us)?;
        start_periodic(c"telemetry", telemetry_tick_cb, periods.telemetry_us)?;
    }
    info!(
        "hw_timer: brightness@{}ms sensor@{}ms telemetry@{}s started",
        config.brightness_interval_ms, config.sensor_poll_interval_ms, config.telemetry_interval_secs
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_config: &SystemConfig) -> Result<(), super::hw_init::HwInitError> {
    log::info!("hw_timer(sim): timers not started");
    Ok(())
}
