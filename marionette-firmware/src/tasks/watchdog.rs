//! Hardware watchdog
//!
//! Fed whenever a main loop reports liveness. If every loop stalls for
//! longer than the timeout the board resets instead of freezing the prop.

use defmt::*;
use embassy_rp::watchdog::Watchdog;
use embassy_time::Duration;

use crate::channels::LIVENESS;

/// Reset after this long without liveness (RP2040 maximum is ~8.3 s)
const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(8);

#[embassy_executor::task]
pub async fn watchdog_task(mut watchdog: Watchdog) {
    info!("Watchdog started ({} ms)", WATCHDOG_TIMEOUT.as_millis());

    watchdog.pause_on_debug(true);
    watchdog.start(WATCHDOG_TIMEOUT);

    loop {
        LIVENESS.wait().await;
        watchdog.feed();
    }
}
