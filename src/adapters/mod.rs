//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `hardware` | BrightnessSource   | Light sensor ADC             |
//! |            | DimmerPort         | Shared `DimmerBank`          |
//! |            | ClimatePort        | Modbus climate sensor        |
//! | `log_sink` | EventSink          | Serial log output            |
//! | `time`     | MonotonicClock     | ESP32 system timer           |
//! | `uart`     | SerialPort         | ESP-IDF UART driver (target) |

pub mod hardware;
pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
