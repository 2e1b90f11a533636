//! Phasedim firmware: main entry point.
//!
//! Hexagonal architecture with interrupt-driven dimming and an
//! event-driven application task.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              LogEventSink    Esp32TimeAdapter │
//! │  (Brightness+Dimmer+Climate)  (EventSink)     (MonotonicClock) │
//! │  UartSerial + PinDriver ──▶ Rs485Transport ──▶ ModbusMaster    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  auto/manual brightness · climate poll · mains monitor │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Interrupts: zero-cross ISR → GPTimer alarms → gate pulses     │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_svc::hal::units::Hertz;
use log::{info, warn};

use phasedim::adapters::hardware::HardwareAdapter;
use phasedim::adapters::log_sink::LogEventSink;
use phasedim::adapters::time::Esp32TimeAdapter;
use phasedim::adapters::uart::UartSerial;
use phasedim::app::events::AppEvent;
use phasedim::app::ports::EventSink;
use phasedim::app::service::AppService;
use phasedim::config::SystemConfig;
use phasedim::dimmer::{DimmerBank, DimmerTiming};
use phasedim::events::{self, Event};
use phasedim::modbus::{ChecksumPolicy, ModbusMaster, Rs485Transport, TurnaroundTiming};
use phasedim::pins::{self, DIMMER_CHANNELS};
use phasedim::sensors::climate::ClimateSensor;
use phasedim::sensors::light::LightSensor;
use phasedim::drivers;

/// Shared with the zero-cross and gate-pulse interrupt handlers.
static DIMMERS: DimmerBank<DIMMER_CHANNELS> = DimmerBank::new(DimmerTiming::NOMINAL_50HZ);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Phasedim v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow!("{e}"))?;
    if config.dimmer != *DIMMERS.timing() {
        warn!("Configured dimmer timing differs from the compiled-in bank; using the bank's");
    }

    // ── 3. Peripherals + dimmer interrupts ────────────────────
    drivers::hw_init::init_peripherals().map_err(|e| anyhow!("HAL init failed: {e}"))?;
    drivers::hw_init::init_dimmer(&DIMMERS, pins::DIMMER_GATE_GPIOS, pins::ZERO_CROSS_GPIO)
        .map_err(|e| anyhow!("dimmer init failed: {e}"))?;

    // ── 4. RS-485 Modbus link ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.modbus_baud)),
    )?;
    let direction = PinDriver::output(peripherals.pins.gpio4)?;
    let transport = Rs485Transport::new(
        UartSerial::new(uart),
        direction,
        FreeRtos,
        Esp32TimeAdapter::new(),
        TurnaroundTiming::from_config(&config),
    );
    let policy = if config.modbus_verify_crc {
        ChecksumPolicy::Verify
    } else {
        ChecksumPolicy::Ignore
    };
    let master = ModbusMaster::new(transport, config.modbus_slave_id, policy);
    info!(
        "Modbus: slave 0x{:02X} @ {} baud on UART1 (TX=GPIO{}, RX=GPIO{}, DE=GPIO{})",
        config.modbus_slave_id,
        config.modbus_baud,
        pins::RS485_TX_GPIO,
        pins::RS485_RX_GPIO,
        pins::RS485_DIR_GPIO
    );

    // ── 5. Construct adapters + app service ───────────────────
    let climate = ClimateSensor::new(master, config.temperature_register, config.humidity_register);
    let mut hw = HardwareAdapter::new(&DIMMERS, LightSensor::new(), climate);
    let mut log_sink = LogEventSink::new();

    let mut app = AppService::new(config.clone(), DIMMER_CHANNELS);
    app.start(&mut log_sink);

    drivers::hw_timer::start_timers(&config).map_err(|e| anyhow!("tick timers: {e}"))?;

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        events::drain_events(|event| match event {
            Event::BrightnessTick => app.brightness_tick(&mut hw, &mut log_sink),
            Event::SensorPollTick => app.sensor_tick(&mut hw, &mut log_sink),
            Event::TelemetryTick => {
                let t = app.build_telemetry(&hw);
                log_sink.emit(&AppEvent::Telemetry(t));
            }
        });
        FreeRtos::delay_ms(10);
    }
}
