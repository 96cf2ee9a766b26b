//! Playback task
//!
//! Owns the worker's scheduler. Display requests and blink triggers are
//! applied between ticks, then both strings render and advance.

use defmt::*;
use embassy_futures::join::join;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::Grb;
use embassy_time::{Duration, Ticker};

use marionette_core::animation::{FrameStore, EYE_GEOMETRY, MOUTH_GEOMETRY};
use marionette_core::playback::{RequestOutcome, Scheduler, TickReport, Transition};
use marionette_hal_rp2040::PixelString;

use crate::channels::{BLINK_TRIGGER, LIVENESS, PLAYBACK_CMD};

pub const EYE_LEDS: usize = EYE_GEOMETRY.leds();
pub const MOUTH_LEDS: usize = MOUTH_GEOMETRY.leds();

/// Eye matrix on PIO0 state machine 0
pub type EyeString = PixelString<'static, PIO0, 0, EYE_LEDS, Grb>;

/// Mouth matrix on PIO0 state machine 1
pub type MouthString = PixelString<'static, PIO0, 1, MOUTH_LEDS, Grb>;

/// Playback task - renders both channels at `tick_hz`
#[embassy_executor::task]
pub async fn playback_task(
    store: &'static FrameStore<'static>,
    mut eye: EyeString,
    mut mouth: MouthString,
    tick_hz: u32,
) {
    let mut scheduler = Scheduler::new(store);
    info!(
        "Playback task started: eye '{}', mouth '{}' at {} Hz",
        scheduler.eye().current().name(),
        scheduler.mouth().current().name(),
        tick_hz
    );

    let mut ticker = Ticker::every(Duration::from_hz(u64::from(tick_hz)));

    loop {
        while let Ok(request) = PLAYBACK_CMD.try_receive() {
            let applied = scheduler.apply(request);
            for (channel, outcome) in [("eye", applied.eye), ("mouth", applied.mouth)] {
                if let RequestOutcome::InvalidIndex(id) = outcome {
                    warn!("Invalid {} animation id {}", channel, id);
                }
            }
        }

        if BLINK_TRIGGER.try_take().is_some() && scheduler.trigger_blink() {
            debug!("Blink");
        }

        let report = scheduler.tick(&mut eye, &mut mouth);
        join(eye.flush(), mouth.flush()).await;
        log_report(&scheduler, report);

        let stats = scheduler.stats();
        if stats.ticks % u64::from(tick_hz) == 0 {
            LIVENESS.signal(());
            trace!("Playback stats: {:?}", stats);
        }

        ticker.next().await;
    }
}

fn log_report(scheduler: &Scheduler<'_>, report: TickReport) {
    if !report.eye_written || !report.mouth_written {
        trace!(
            "Frame write failed: eye={} mouth={}",
            report.eye_written,
            report.mouth_written
        );
    }

    if let Some(transition) = report.eye_transition {
        log_transition("eye", scheduler.eye().current().name(), transition);
    }
    if let Some(transition) = report.mouth_transition {
        log_transition("mouth", scheduler.mouth().current().name(), transition);
    }
}

fn log_transition(channel: &str, name: &str, transition: Transition) {
    match transition {
        Transition::Promoted => debug!("{} now playing '{}'", channel, name),
        Transition::OverlayFinished => trace!("{} blink done, back to '{}'", channel, name),
    }
}
