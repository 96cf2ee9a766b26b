//! Autonomous blink timer
//!
//! Optional on workers: fires the blink overlay at random intervals
//! without waiting for the dispatcher.

use defmt::*;
use embassy_time::Timer;

use marionette_core::choreography::Cadence;

use crate::channels::BLINK_TRIGGER;

#[embassy_executor::task]
pub async fn blink_timer_task(mut cadence: Cadence) {
    info!(
        "Blink timer started ({}..={} ms)",
        cadence.min_ms(),
        cadence.max_ms()
    );

    loop {
        Timer::after_millis(u64::from(cadence.next_delay_ms())).await;
        BLINK_TRIGGER.signal(());
    }
}
