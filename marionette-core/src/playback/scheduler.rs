//! Dual-channel playback scheduler
//!
//! Owns the eye and mouth playback states of one worker. Display requests
//! and blink triggers are applied between ticks by the task that owns the
//! scheduler, so rendering never races with command ingestion.

use super::channel::{ChannelPlayback, RequestOutcome, Transition};
use crate::animation::{names, Animation, FrameStore};
use crate::traits::PixelOutput;

/// Animation ids requested for both channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayRequest {
    pub eye: u8,
    pub mouth: u8,
}

/// Per-channel outcome of a display request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Applied {
    pub eye: RequestOutcome,
    pub mouth: RequestOutcome,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Eye frame reached the LEDs
    pub eye_written: bool,
    /// Mouth frame reached the LEDs
    pub mouth_written: bool,
    pub eye_transition: Option<Transition>,
    pub mouth_transition: Option<Transition>,
}

/// Playback counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackStats {
    pub ticks: u64,
    pub eye_write_failures: u32,
    pub mouth_write_failures: u32,
    /// Requested ids outside the frame store
    pub invalid_ids: u32,
    /// Blink overlays started
    pub blinks: u32,
}

/// Playback scheduler for one worker
#[derive(Debug)]
pub struct Scheduler<'a> {
    store: &'a FrameStore<'a>,
    eye: ChannelPlayback<'a>,
    mouth: ChannelPlayback<'a>,
    /// Eye animation a blink overlay may interrupt
    eye_idle: &'a Animation<'a>,
    eye_blink: Option<&'a Animation<'a>>,
    stats: PlaybackStats,
}

impl<'a> Scheduler<'a> {
    /// Start both channels on their idle animations
    ///
    /// Missing idle animations fall back to the first stored animation, or
    /// to the empty placeholder when the store is empty.
    pub fn new(store: &'a FrameStore<'a>) -> Self {
        let eye_idle = store.resolve_or_fallback(names::EYE_IDLE);
        let mouth_idle = store.resolve_or_fallback(names::MOUTH_IDLE);

        Self {
            store,
            eye: ChannelPlayback::new(eye_idle),
            mouth: ChannelPlayback::new(mouth_idle),
            eye_idle,
            eye_blink: store.find(names::EYE_BLINK),
            stats: PlaybackStats::default(),
        }
    }

    /// Queue new animations for both channels
    ///
    /// Channels are validated independently: an out-of-range id drops only
    /// that channel's update.
    pub fn apply(&mut self, request: DisplayRequest) -> Applied {
        let store = self.store;

        let eye = match store.get(request.eye) {
            Some(animation) => self.eye.request(animation),
            None => RequestOutcome::InvalidIndex(request.eye),
        };
        let mouth = match store.get(request.mouth) {
            Some(animation) => self.mouth.request(animation),
            None => RequestOutcome::InvalidIndex(request.mouth),
        };

        for outcome in [eye, mouth] {
            if matches!(outcome, RequestOutcome::InvalidIndex(_)) {
                self.stats.invalid_ids = self.stats.invalid_ids.saturating_add(1);
            }
        }

        Applied { eye, mouth }
    }

    /// Start a blink overlay on the eye channel
    ///
    /// Only fires while the eye is showing its idle animation. Returns true
    /// if the overlay started.
    pub fn trigger_blink(&mut self) -> bool {
        let Some(blink) = self.eye_blink else {
            return false;
        };

        if self.eye.is_blink_overlay()
            || self.eye.is_playing(blink)
            || !self.eye.is_playing(self.eye_idle)
        {
            return false;
        }

        self.eye.start_overlay(blink);
        self.stats.blinks = self.stats.blinks.saturating_add(1);
        true
    }

    /// Render the current frame of each channel, then advance both
    ///
    /// Write failures are counted and otherwise ignored.
    pub fn tick<E, M>(&mut self, eye_out: &mut E, mouth_out: &mut M) -> TickReport
    where
        E: PixelOutput,
        M: PixelOutput,
    {
        let eye_written = eye_out.write_frame(self.eye.frame()).is_ok();
        if !eye_written {
            self.stats.eye_write_failures = self.stats.eye_write_failures.saturating_add(1);
        }

        let mouth_written = mouth_out.write_frame(self.mouth.frame()).is_ok();
        if !mouth_written {
            self.stats.mouth_write_failures = self.stats.mouth_write_failures.saturating_add(1);
        }

        self.stats.ticks = self.stats.ticks.saturating_add(1);

        TickReport {
            eye_written,
            mouth_written,
            eye_transition: self.eye.advance(),
            mouth_transition: self.mouth.advance(),
        }
    }

    pub fn eye(&self) -> &ChannelPlayback<'a> {
        &self.eye
    }

    pub fn mouth(&self) -> &ChannelPlayback<'a> {
        &self.mouth
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Asset, FrameGeometry};
    use crate::choreography::{BlinkScript, Cadence, Choreographer, Step};
    use crate::traits::PixelError;
    use marionette_protocol::{Address, Packet, PacketReceiver, WorkerCommand};

    const ONE_LED: FrameGeometry = FrameGeometry::new(1, 1);

    /// Blob whose frame `i` is the single pixel `[tag, i, 0]`
    fn blob(tag: u8, frames: u32) -> Vec<u8> {
        let mut data = frames.to_le_bytes().to_vec();
        for i in 0..frames {
            data.extend_from_slice(&[tag, i as u8, 0]);
        }
        data
    }

    fn store_of<'a>(entries: &[(&'a str, &'a Vec<u8>)]) -> FrameStore<'a> {
        let mut store = FrameStore::new();
        for &(name, blob) in entries {
            store
                .load(&Asset {
                    name,
                    geometry: ONE_LED,
                    blob: blob.as_slice(),
                })
                .unwrap();
        }
        store
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl PixelOutput for Recorder {
        type Error = PixelError;

        fn write_frame(&mut self, rgb: &[u8]) -> Result<(), PixelError> {
            if self.fail {
                return Err(PixelError::Transfer);
            }
            self.frames.push(rgb.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_starts_on_idle_animations() {
        let eye = blob(1, 4);
        let mouth = blob(2, 2);
        let store = store_of(&[(names::MOUTH_IDLE, &mouth), (names::EYE_IDLE, &eye)]);
        let scheduler = Scheduler::new(&store);

        assert_eq!(scheduler.eye().current().name(), names::EYE_IDLE);
        assert_eq!(scheduler.mouth().current().name(), names::MOUTH_IDLE);
    }

    #[test]
    fn test_transition_only_at_loop_boundary() {
        let a = blob(1, 10);
        let b = blob(2, 2);
        let store = store_of(&[(names::EYE_IDLE, &a), ("b", &b)]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        for _ in 0..37 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        assert_eq!(scheduler.eye().frame_counter(), 37);

        let applied = scheduler.apply(DisplayRequest { eye: 1, mouth: 0 });
        assert_eq!(applied.eye, RequestOutcome::Queued);
        assert_eq!(applied.mouth, RequestOutcome::Unchanged);

        eye.frames.clear();
        for _ in 0..3 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        // Frames 7, 8, 9 of the old animation finish the loop undisturbed
        assert_eq!(eye.frames, vec![vec![1, 7, 0], vec![1, 8, 0], vec![1, 9, 0]]);
        assert_eq!(scheduler.eye().current().name(), "b");
        assert_eq!(scheduler.eye().frame_counter(), 0);

        scheduler.tick(&mut eye, &mut mouth);
        assert_eq!(eye.frames.last(), Some(&vec![2, 0, 0]));
    }

    #[test]
    fn test_invalid_index_drops_only_that_channel() {
        let data: Vec<Vec<u8>> = (0..5).map(|tag| blob(tag, 2)).collect();
        let store = store_of(&[
            (names::EYE_IDLE, &data[0]),
            (names::MOUTH_IDLE, &data[1]),
            ("c", &data[2]),
            ("d", &data[3]),
            ("e", &data[4]),
        ]);
        let mut scheduler = Scheduler::new(&store);

        let applied = scheduler.apply(DisplayRequest { eye: 255, mouth: 4 });
        assert_eq!(applied.eye, RequestOutcome::InvalidIndex(255));
        assert_eq!(applied.mouth, RequestOutcome::Queued);
        assert!(scheduler.eye().queued().is_none());
        assert_eq!(scheduler.mouth().queued().map(|a| a.name()), Some("e"));
        assert_eq!(scheduler.stats().invalid_ids, 1);
    }

    #[test]
    fn test_blink_overlay_restores_idle() {
        let idle = blob(1, 4);
        let blink = blob(2, 3);
        let store = store_of(&[(names::EYE_IDLE, &idle), (names::EYE_BLINK, &blink)]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        scheduler.tick(&mut eye, &mut mouth);
        assert!(scheduler.trigger_blink());
        assert_eq!(scheduler.eye().current().name(), names::EYE_BLINK);
        assert_eq!(scheduler.eye().frame_counter(), 0);

        // Already blinking
        assert!(!scheduler.trigger_blink());

        for _ in 0..3 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        assert_eq!(scheduler.eye().current().name(), names::EYE_IDLE);
        assert_eq!(scheduler.eye().frame_counter(), 0);
        assert!(!scheduler.eye().is_blink_overlay());
        assert_eq!(scheduler.stats().blinks, 1);
    }

    #[test]
    fn test_blink_ignored_away_from_idle() {
        let idle = blob(1, 2);
        let blink = blob(2, 2);
        let other = blob(3, 2);
        let store = store_of(&[
            (names::EYE_IDLE, &idle),
            (names::EYE_BLINK, &blink),
            ("other", &other),
        ]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        scheduler.apply(DisplayRequest { eye: 2, mouth: 0 });
        scheduler.tick(&mut eye, &mut mouth);
        scheduler.tick(&mut eye, &mut mouth);
        assert_eq!(scheduler.eye().current().name(), "other");
        assert!(!scheduler.trigger_blink());
    }

    #[test]
    fn test_blink_needs_blink_animation() {
        let idle = blob(1, 2);
        let store = store_of(&[(names::EYE_IDLE, &idle)]);
        let mut scheduler = Scheduler::new(&store);
        assert!(!scheduler.trigger_blink());
    }

    #[test]
    fn test_request_during_overlay_replaces_resume() {
        let idle = blob(1, 4);
        let blink = blob(2, 2);
        let other = blob(3, 2);
        let store = store_of(&[
            (names::EYE_IDLE, &idle),
            (names::EYE_BLINK, &blink),
            ("other", &other),
        ]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        scheduler.trigger_blink();
        scheduler.apply(DisplayRequest { eye: 2, mouth: 0 });
        scheduler.tick(&mut eye, &mut mouth);
        scheduler.tick(&mut eye, &mut mouth);
        assert_eq!(scheduler.eye().current().name(), "other");
    }

    #[test]
    fn test_dispatched_blink_stays() {
        let idle = blob(1, 4);
        let blink = blob(2, 3);
        let store = store_of(&[(names::EYE_IDLE, &idle), (names::EYE_BLINK, &blink)]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        let bytes = Packet::display(Address::Worker0, 1, 0).encode();
        let mut receiver = PacketReceiver::new();
        let packet = receiver.feed_bytes(&bytes, 0).unwrap().unwrap();
        let command = WorkerCommand::for_address(&packet, Address::Worker0)
            .unwrap()
            .unwrap();
        let WorkerCommand::DisplayAnim { eye: e, mouth: m } = command else {
            panic!("expected DisplayAnim, got {command:?}");
        };
        scheduler.apply(DisplayRequest { eye: e, mouth: m });

        for _ in 0..4 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        assert_eq!(scheduler.eye().current().name(), names::EYE_BLINK);

        for _ in 0..30 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        assert_eq!(scheduler.eye().current().name(), names::EYE_BLINK);
        assert!(!scheduler.eye().is_blink_overlay());
    }

    #[test]
    fn test_choreographed_blink_plays_and_restores_idle() {
        const TICK_HZ: u32 = 47;

        let idle = blob(1, 8);
        let blink = blob(2, 6);
        let mouth_idle = blob(3, 4);
        let store = store_of(&[
            (names::EYE_IDLE, &idle),
            (names::EYE_BLINK, &blink),
            (names::MOUTH_IDLE, &mouth_idle),
        ]);
        let script = BlinkScript::from_store(&store, TICK_HZ);
        let mut choreographer =
            Choreographer::new(Address::Worker2, script, Cadence::new(7, 2000, 6000));

        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        let mut elapsed_ms = 0u64;
        let mut ticks = 0u64;
        let mut seen: Vec<&str> = Vec::new();

        while choreographer.cycles() < 3 {
            match choreographer.next_step() {
                Step::Send(packet) => {
                    if let Ok(Some(WorkerCommand::DisplayAnim { eye: e, mouth: m })) =
                        WorkerCommand::for_address(&packet, Address::Worker2)
                    {
                        scheduler.apply(DisplayRequest { eye: e, mouth: m });
                    }
                }
                Step::Sleep(ms) => {
                    elapsed_ms += u64::from(ms);
                    while ticks < elapsed_ms * u64::from(TICK_HZ) / 1000 {
                        scheduler.tick(&mut eye, &mut mouth);
                        ticks += 1;
                        let name = scheduler.eye().current().name();
                        if seen.last() != Some(&name) {
                            seen.push(name);
                        }
                    }
                }
            }
        }

        // Let the final restore land
        for _ in 0..TICK_HZ {
            scheduler.tick(&mut eye, &mut mouth);
            let name = scheduler.eye().current().name();
            if seen.last() != Some(&name) {
                seen.push(name);
            }
        }

        let (i, b) = (names::EYE_IDLE, names::EYE_BLINK);
        assert_eq!(seen, vec![i, b, i, b, i, b, i]);
        assert!(eye.frames.iter().any(|f| f[0] == 2));
        assert_eq!(scheduler.mouth().current().name(), names::MOUTH_IDLE);
    }

    #[test]
    fn test_write_failure_still_advances() {
        let a = blob(1, 3);
        let store = store_of(&[(names::EYE_IDLE, &a)]);
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut mouth = Recorder::default();

        let report = scheduler.tick(&mut eye, &mut mouth);
        assert!(!report.eye_written);
        assert!(report.mouth_written);
        scheduler.tick(&mut eye, &mut mouth);

        assert_eq!(scheduler.eye().frame_counter(), 2);
        assert_eq!(scheduler.stats().eye_write_failures, 2);
        assert_eq!(scheduler.stats().ticks, 2);
    }

    #[test]
    fn test_empty_store_renders_placeholder() {
        let store = FrameStore::new();
        let mut scheduler = Scheduler::new(&store);
        let mut eye = Recorder::default();
        let mut mouth = Recorder::default();

        for _ in 0..3 {
            scheduler.tick(&mut eye, &mut mouth);
        }
        assert!(eye.frames.iter().all(|f| f.is_empty()));
        assert_eq!(
            scheduler.apply(DisplayRequest { eye: 0, mouth: 0 }).eye,
            RequestOutcome::InvalidIndex(0)
        );
    }
}
