//! Choreographer task
//!
//! One instance per worker address, each with its own random pacing.

use defmt::*;
use embassy_time::Timer;

use marionette_core::choreography::{Choreographer, Step};

use crate::channels::{heartbeat, BUS_TX, LIVENESS};

/// Choreographer task - runs the blink cycle for one worker
#[embassy_executor::task(pool_size = 4)]
pub async fn choreographer_task(mut choreographer: Choreographer) {
    info!(
        "Choreographer started for {}",
        choreographer.address().name()
    );

    let mut cycles = choreographer.cycles();

    loop {
        match choreographer.next_step() {
            Step::Send(packet) => BUS_TX.send(packet).await,
            Step::Sleep(ms) => {
                // Fed ahead of the sleep so a stalled loop trips the watchdog
                LIVENESS.signal(());
                Timer::after_millis(u64::from(ms)).await;
            }
        }

        if choreographer.cycles() != cycles {
            cycles = choreographer.cycles();
            let total = heartbeat();
            trace!(
                "{} cycle {} (heartbeat {})",
                choreographer.address().name(),
                cycles,
                total
            );
        }
    }
}
