//! GPIO / peripheral pin assignments for the Phasedim controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Pins driven through raw ESP-IDF calls are plain
//! `i32` GPIO numbers; pins owned by `esp-idf-hal` drivers (UART, RS-485
//! direction) are taken from `Peripherals` in `main.rs` and mirrored here
//! for documentation.

// ---------------------------------------------------------------------------
// Dimmer (phase-cut triac outputs + mains zero-cross sense)
// ---------------------------------------------------------------------------

/// Digital input: zero-cross detector output, pulled up, rising edge per
/// mains half-cycle.
pub const ZERO_CROSS_GPIO: i32 = 14;
/// Digital output: triac gate for lamp channel 1 (active HIGH).
pub const DIMMER_1_GPIO: i32 = 13;
/// Digital output: triac gate for lamp channel 2 (active HIGH).
pub const DIMMER_2_GPIO: i32 = 12;

/// Gate outputs indexed by dimmer channel id.
pub const DIMMER_GATE_GPIOS: [i32; DIMMER_CHANNELS] = [DIMMER_1_GPIO, DIMMER_2_GPIO];

/// Number of physical dimmer outputs on the board.
pub const DIMMER_CHANNELS: usize = 2;

// ---------------------------------------------------------------------------
// Light sensor (MDL-07 analog output, ADC1)
// ---------------------------------------------------------------------------

/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const LIGHT_ADC_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// RS-485 climate sensor link (UART1 + MAX485 DE/RE)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = transmit (DE asserted), LOW = receive.
pub const RS485_DIR_GPIO: i32 = 4;
/// UART1 TX towards the transceiver DI pin.
pub const RS485_TX_GPIO: i32 = 17;
/// UART1 RX from the transceiver RO pin.
pub const RS485_RX_GPIO: i32 = 18;
