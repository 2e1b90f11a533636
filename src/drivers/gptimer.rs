//! One-shot alarm on an ESP32-S3 general-purpose timer.
//!
//! Each dimmer channel owns one GPTimer running at 1 MHz (1 tick = 1 µs).
//! The timer free-runs; arming resets the count to zero and sets a
//! non-reloading alarm `delay_us` ticks ahead, so it fires exactly once per
//! accepted zero-cross.  Arming is done from the zero-cross ISR, which is
//! why only ISR-callable driver functions appear in
//! [`OneShotTimer::arm_one_shot`].

use core::ffi::c_void;

use esp_idf_svc::sys::*;

use super::hw_init::HwInitError;
use crate::dimmer::OneShotTimer;

/// Alarm callback: `(timer, event data, user_ctx) -> high-priority task woken`.
pub type AlarmCallback =
    unsafe extern "C" fn(gptimer_handle_t, *const gptimer_alarm_event_data_t, *mut c_void) -> bool;

pub struct GpTimer {
    handle: gptimer_handle_t,
}

impl GpTimer {
    /// Placeholder so a `[GpTimer; N]` can be built before configuration.
    pub const fn unconfigured() -> Self {
        Self {
            handle: core::ptr::null_mut(),
        }
    }

    /// Allocate the timer at 1 MHz, register `on_alarm` with `ctx`, then
    /// enable and start counting.  The alarm stays idle until armed.
    ///
    /// # Safety
    ///
    /// `ctx` must stay valid for the lifetime of the firmware and be used by
    /// `on_alarm` only.
    pub unsafe fn configure(&mut self, on_alarm: AlarmCallback, ctx: *mut c_void) -> Result<(), HwInitError> {
        let cfg = gptimer_config_t {
            clk_src: soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: 1_000_000,
            ..Default::default()
        };
        let ret = unsafe { gptimer_new_timer(&cfg, &mut self.handle) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }

        let callbacks = gptimer_event_callbacks_t {
            on_alarm: Some(on_alarm),
        };
        let ret = unsafe { gptimer_register_event_callbacks(self.handle, &callbacks, ctx) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }

        let ret = unsafe { gptimer_enable(self.handle) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
        let ret = unsafe { gptimer_start(self.handle) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
        Ok(())
    }
}

impl OneShotTimer for GpTimer {
    fn arm_one_shot(&mut self, delay_us: u32) {
        if self.handle.is_null() {
            return;
        }
        let alarm = gptimer_alarm_config_t {
            alarm_count: u64::from(delay_us),
            reload_count: 0,
            ..Default::default()
        };
        // SAFETY: the handle was created, enabled and started in
        // `configure`; both calls are documented as ISR-safe.  The count is
        // reset first so the new alarm lies ahead of it.
        unsafe {
            gptimer_set_raw_count(self.handle, 0);
            gptimer_set_alarm_action(self.handle, &alarm);
        }
    }
}
