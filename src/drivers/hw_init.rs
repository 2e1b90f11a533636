//! One-shot hardware peripheral initialization.
//!
//! Configures the light-sensor ADC channel, the triac gate outputs, the
//! zero-cross input and the per-channel GPTimers using raw ESP-IDF sys
//! calls. Called once from `main()` before the event loop starts.
//!
//! The UART and the RS-485 direction pin are owned through esp-idf-hal
//! drivers in `main()` instead; nothing here touches them.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::dimmer::DimmerBank;
use crate::error::Error;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    TimerFailed(i32),
    NoSuchChannel(usize),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::TimerFailed(rc) => write!(f, "timer setup failed (rc={})", rc),
            Self::NoSuchChannel(ch) => write!(f, "dimmer channel {} does not exist", ch),
        }
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Error::Init(match e {
            HwInitError::AdcInitFailed(_) => "ADC",
            HwInitError::GpioConfigFailed(_) => "GPIO",
            HwInitError::IsrInstallFailed(_) => "GPIO ISR service",
            HwInitError::TimerFailed(_) => "timer",
            HwInitError::NoSuchChannel(_) => "dimmer channel",
        })
    }
}

/// ADC1 channel wired to the light sensor (GPIO5 on the ESP32-S3).
pub const ADC1_CH_LIGHT: u32 = 4;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_adc()?;
    }
    info!("hw_init: peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// app-task ADC read path.  `init_adc()` completes before the event loop
/// starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_LIGHT, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=light)", ADC1_CH_LIGHT);
    Ok(())
}

/// Raw 12-bit reading; 0 if the conversion fails.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded app-task access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn config_gpio(pin: i32, mode: gpio_mode_t, pull_up: bool, intr: gpio_int_type_t) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: intr,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

/// Drive an output pin.  Safe in ISR context (single register write).
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Dimmer: gates, zero-cross ISR, GPTimers ───────────────────

#[cfg(target_os = "espidf")]
type GateEmitter = crate::dimmer::TriacPulseEmitter<'static, super::gate::GatePin, esp_idf_hal::delay::Ets>;

#[cfg(target_os = "espidf")]
type Scheduler<const N: usize> = crate::dimmer::ZeroCrossScheduler<'static, super::gptimer::GpTimer, N>;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn gate_alarm_isr(
    _timer: gptimer_handle_t,
    _edata: *const gptimer_alarm_event_data_t,
    user_ctx: *mut core::ffi::c_void,
) -> bool {
    // SAFETY: user_ctx is the leaked emitter registered for this timer
    // only; no other context dereferences it.
    let emitter = unsafe { &mut *user_ctx.cast::<GateEmitter>() };
    emitter.on_timer_expired();
    false
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn zero_cross_isr<const N: usize>(arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a counter read; safe in ISR context.
    let now_us = unsafe { esp_timer_get_time() } as u64;
    // SAFETY: arg is the leaked scheduler; only this ISR dereferences it.
    let scheduler = unsafe { &mut *arg.cast::<Scheduler<N>>() };
    scheduler.on_zero_cross(now_us);
}

/// Bring the dimmer up on hardware.
///
/// Gate pins become outputs driven low, the zero-cross pin an input with
/// pull-up and a rising-edge interrupt, and each channel gets a 1 MHz
/// GPTimer whose alarm fires that channel's gate pulse.  The scheduler and
/// emitters are leaked: they live as long as the firmware.
#[cfg(target_os = "espidf")]
pub fn init_dimmer<const N: usize>(
    bank: &'static DimmerBank<N>,
    gate_gpios: [i32; N],
    zero_cross_gpio: i32,
) -> Result<(), HwInitError> {
    use super::gate::GatePin;
    use super::gptimer::GpTimer;
    use esp_idf_hal::delay::Ets;

    // SAFETY: called once from main() before any dimmer interrupt is
    // enabled; every pointer handed to an ISR is leaked and never freed.
    unsafe {
        for &gpio in &gate_gpios {
            config_gpio(gpio, gpio_mode_t_GPIO_MODE_OUTPUT, false, gpio_int_type_t_GPIO_INTR_DISABLE)?;
            gpio_set_level(gpio, 0);
        }

        let mut timers: [GpTimer; N] = core::array::from_fn(|_| GpTimer::unconfigured());
        for (channel, timer) in timers.iter_mut().enumerate() {
            let emitter = bank
                .emitter(channel, GatePin::new(gate_gpios[channel]), Ets)
                .ok_or(HwInitError::NoSuchChannel(channel))?;
            let ctx = Box::into_raw(Box::new(emitter));
            timer.configure(gate_alarm_isr, ctx.cast())?;
        }

        config_gpio(
            zero_cross_gpio,
            gpio_mode_t_GPIO_MODE_INPUT,
            true,
            gpio_int_type_t_GPIO_INTR_POSEDGE,
        )?;

        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        let scheduler = Box::into_raw(Box::new(bank.scheduler(timers)));
        let ret = gpio_isr_handler_add(zero_cross_gpio, Some(zero_cross_isr::<N>), scheduler.cast());
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(zero_cross_gpio);
    }

    info!(
        "hw_init: dimmer ready ({} channels, zero-cross on GPIO{})",
        N, zero_cross_gpio
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_dimmer<const N: usize>(
    _bank: &'static DimmerBank<N>,
    _gate_gpios: [i32; N],
    _zero_cross_gpio: i32,
) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): dimmer ISR wiring skipped");
    Ok(())
}
