//! Marionette - animatronic prop firmware
//!
//! One image per board. The dispatcher drives blink choreography for four
//! workers over a shared serial bus; each worker renders eye and mouth
//! animations on two WS2812 matrices. Role and address are fixed at build
//! time from prop.toml.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use marionette_core::animation::FrameStore;
use marionette_core::choreography::{BlinkScript, Cadence, Choreographer};
use marionette_core::config::Role;
use marionette_hal::OutputPin;
use marionette_hal_rp2040::{PixelString, StatusLed, UartBusRx, UartBusTx};
use marionette_protocol::Address;

mod channels;
mod tasks;

/// Node configuration compiled from prop.toml
mod node_config {
    use marionette_core::config::{BusConfig, ChoreographyConfig, NodeConfig, PlaybackConfig, Role};
    use marionette_protocol::Address;

    include!(concat!(env!("OUT_DIR"), "/node_config.rs"));
}

/// Embedded animation blobs, in frame store order
mod assets {
    use marionette_core::animation::{Asset, EYE_GEOMETRY, MOUTH_GEOMETRY};

    include!(concat!(env!("OUT_DIR"), "/assets.rs"));
}

use node_config::{BUS, CHOREOGRAPHY, NODE, PLAYBACK};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Shared read-only by every task once populated
static FRAME_STORE: StaticCell<FrameStore<'static>> = StaticCell::new();

static WS2812_PROGRAM: StaticCell<PioWs2812Program<'static, PIO0>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!(
        "Marionette firmware starting as {} at {}",
        NODE.role.name(),
        NODE.address.name()
    );

    let p = embassy_rp::init(Default::default());

    let store: &'static FrameStore<'static> = FRAME_STORE.init(load_assets());
    info!("{} animations loaded", store.len());

    let mut led = StatusLed::new(Output::new(p.PIN_25, Level::Low));
    boot_blink(&mut led, NODE.role).await;

    // Serial bus on UART0 (GP0 TX, GP1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BUS.baud;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", BUS.baud);

    unwrap!(spawner.spawn(tasks::watchdog_task(Watchdog::new(p.WATCHDOG))));

    match NODE.role {
        Role::Dispatcher => {
            unwrap!(spawner.spawn(tasks::bus_tx_task(UartBusTx::new(tx), BUS.packet_gap_ms)));

            let script = BlinkScript::from_store(store, PLAYBACK.tick_hz);
            info!(
                "Blink script: idle={} blink={} mouth={} hold={} ms",
                script.eye_idle, script.eye_blink, script.mouth_idle, script.blink_hold_ms
            );

            for address in Address::WORKERS {
                let seed = Cadence::seed_for(address.to_byte(), Instant::now().as_micros());
                let cadence = Cadence::new(
                    seed,
                    CHOREOGRAPHY.min_delay_ms,
                    CHOREOGRAPHY.max_delay_ms,
                );
                let choreographer = Choreographer::new(address, script, cadence);
                unwrap!(spawner.spawn(tasks::choreographer_task(choreographer)));
            }
        }
        Role::Worker => {
            // Eye matrix on GP2, mouth matrix on GP3, one PIO state machine each
            let Pio {
                mut common,
                sm0,
                sm1,
                ..
            } = Pio::new(p.PIO0, Irqs);
            let program = WS2812_PROGRAM.init(PioWs2812Program::new(&mut common));

            let eye: tasks::EyeString = PixelString::new(PioWs2812::new(
                &mut common,
                sm0,
                p.DMA_CH0,
                p.PIN_2,
                program,
            ));
            let mouth: tasks::MouthString = PixelString::new(PioWs2812::new(
                &mut common,
                sm1,
                p.DMA_CH1,
                p.PIN_3,
                program,
            ));

            unwrap!(spawner.spawn(tasks::playback_task(store, eye, mouth, PLAYBACK.tick_hz)));
            unwrap!(spawner.spawn(tasks::bus_rx_task(
                UartBusRx::new(rx),
                led,
                NODE.address,
                BUS.rx_timeout(),
            )));

            if PLAYBACK.autonomous_blink {
                let seed = Cadence::seed_for(NODE.address.to_byte(), Instant::now().as_micros());
                let cadence = Cadence::new(seed, PLAYBACK.blink_min_ms, PLAYBACK.blink_max_ms);
                unwrap!(spawner.spawn(tasks::blink_timer_task(cadence)));
            }
        }
    }

    info!("All tasks spawned, firmware running");
}

/// Decode the embedded assets into the frame store
///
/// A broken blob is left out; playback falls back to what did load.
fn load_assets() -> FrameStore<'static> {
    let mut store = FrameStore::new();

    for asset in assets::ASSETS.iter() {
        match store.load(asset) {
            Ok(id) => debug!("Loaded '{}' as id {}", asset.name, id),
            Err(e) => error!("Failed to load '{}': {:?}", asset.name, e),
        }
    }

    store
}

/// Show the role on the status LED: dispatcher 2 slow blinks, worker 5 fast
async fn boot_blink(led: &mut impl OutputPin, role: Role) {
    let (count, period_ms) = match role {
        Role::Dispatcher => (2, 200),
        Role::Worker => (5, 40),
    };

    for _ in 0..count {
        led.set_high();
        Timer::after_millis(period_ms).await;
        led.set_low();
        Timer::after_millis(period_ms).await;
    }
}
