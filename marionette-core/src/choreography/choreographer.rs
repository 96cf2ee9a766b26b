//! Dispatcher choreography for one worker
//!
//! The choreographer is a pure step generator: the firmware task performs
//! each [`Step`] (queue a packet or sleep) and asks for the next one. After
//! an initial idle packet the cycle is rest, blink, hold, restore idle.

use marionette_protocol::{Address, Packet};

use super::cadence::Cadence;
use crate::animation::{names, FrameStore};

/// One action for the dispatcher task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Queue a packet on the bus writer
    Send(Packet),
    /// Wait before the next step
    Sleep(u32),
}

/// Animation ids and timing used by the blink cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkScript {
    pub eye_idle: u8,
    pub eye_blink: u8,
    pub mouth_idle: u8,
    /// Wait between the blink and restore packets
    ///
    /// Long enough for the idle loop to reach its boundary and promote the
    /// blink, plus one blink loop, so the restore request never arrives while
    /// the blink is still waiting in the queue.
    pub blink_hold_ms: u32,
}

impl BlinkScript {
    /// Resolve ids from the dispatcher's copy of the frame store
    ///
    /// Workers load the same assets in the same order, so ids match. A
    /// missing animation maps to id 0.
    pub fn from_store(store: &FrameStore<'_>, tick_hz: u32) -> Self {
        let id = |name: &str| store.index_of(name).unwrap_or(0);
        let idle_frames = store.resolve_or_fallback(names::EYE_IDLE).frame_count();
        let blink_frames = store.resolve_or_fallback(names::EYE_BLINK).frame_count();

        Self {
            eye_idle: id(names::EYE_IDLE),
            eye_blink: id(names::EYE_BLINK),
            mouth_idle: id(names::MOUTH_IDLE),
            blink_hold_ms: hold_ms(idle_frames + blink_frames, tick_hz),
        }
    }
}

/// Time to play `frame_count` frames at `tick_hz`, rounded up
pub fn hold_ms(frame_count: usize, tick_hz: u32) -> u32 {
    let tick_hz = u64::from(tick_hz.max(1));
    let ms = (frame_count as u64 * 1000).div_ceil(tick_hz);
    u32::try_from(ms).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Rest,
    Blink,
    Hold,
    Restore,
}

/// Blink cycle generator for one worker address
#[derive(Debug, Clone)]
pub struct Choreographer {
    address: Address,
    script: BlinkScript,
    cadence: Cadence,
    phase: Phase,
    cycles: u32,
}

impl Choreographer {
    pub fn new(address: Address, script: BlinkScript, cadence: Cadence) -> Self {
        Self {
            address,
            script,
            cadence,
            phase: Phase::Init,
            cycles: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Completed blink cycles
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Produce the next step of the cycle
    pub fn next_step(&mut self) -> Step {
        let s = self.script;
        match self.phase {
            Phase::Init => {
                self.phase = Phase::Rest;
                Step::Send(Packet::display(self.address, s.eye_idle, s.mouth_idle))
            }
            Phase::Rest => {
                self.phase = Phase::Blink;
                Step::Sleep(self.cadence.next_delay_ms())
            }
            Phase::Blink => {
                self.phase = Phase::Hold;
                Step::Send(Packet::display(self.address, s.eye_blink, s.mouth_idle))
            }
            Phase::Hold => {
                self.phase = Phase::Restore;
                Step::Sleep(s.blink_hold_ms)
            }
            Phase::Restore => {
                self.phase = Phase::Rest;
                self.cycles = self.cycles.wrapping_add(1);
                Step::Send(Packet::display(self.address, s.eye_idle, s.mouth_idle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Asset, FrameGeometry};

    const ONE_LED: FrameGeometry = FrameGeometry::new(1, 1);

    fn blob(frames: u32) -> Vec<u8> {
        let mut data = frames.to_le_bytes().to_vec();
        data.resize(4 + frames as usize * 3, 0x20);
        data
    }

    fn script() -> BlinkScript {
        BlinkScript {
            eye_idle: 0,
            eye_blink: 1,
            mouth_idle: 2,
            blink_hold_ms: 149,
        }
    }

    #[test]
    fn test_hold_rounds_up() {
        assert_eq!(hold_ms(3, 47), 64);
        assert_eq!(hold_ms(47, 47), 1000);
        assert_eq!(hold_ms(3, 0), 3000);
    }

    #[test]
    fn test_script_from_store() {
        let idle = blob(4);
        let blink = blob(3);
        let mouth = blob(2);
        let mut store = FrameStore::new();
        for (name, data) in [
            (names::EYE_IDLE, &idle),
            (names::EYE_BLINK, &blink),
            (names::MOUTH_IDLE, &mouth),
        ] {
            store
                .load(&Asset {
                    name,
                    geometry: ONE_LED,
                    blob: data.as_slice(),
                })
                .unwrap();
        }

        assert_eq!(BlinkScript::from_store(&store, 47), script());
    }

    #[test]
    fn test_script_from_empty_store() {
        let store = FrameStore::new();
        let s = BlinkScript::from_store(&store, 47);
        assert_eq!((s.eye_idle, s.eye_blink, s.mouth_idle), (0, 0, 0));
        assert_eq!(s.blink_hold_ms, hold_ms(2, 47));
    }

    #[test]
    fn test_cycle_sequence() {
        let mut c = Choreographer::new(Address::Worker1, script(), Cadence::new(1, 2000, 6000));

        assert_eq!(c.next_step(), Step::Send(Packet::display(Address::Worker1, 0, 2)));
        for cycle in 1..=3 {
            match c.next_step() {
                Step::Sleep(ms) => assert!((2000..=6000).contains(&ms)),
                other => panic!("expected rest, got {other:?}"),
            }
            assert_eq!(c.next_step(), Step::Send(Packet::display(Address::Worker1, 1, 2)));
            assert_eq!(c.next_step(), Step::Sleep(149));
            assert_eq!(c.next_step(), Step::Send(Packet::display(Address::Worker1, 0, 2)));
            assert_eq!(c.cycles(), cycle);
        }
    }

    #[test]
    fn test_workers_rest_independently() {
        let rests = |address: Address| {
            let seed = Cadence::seed_for(address.to_byte(), 12_345);
            let mut c = Choreographer::new(address, script(), Cadence::new(seed, 2000, 6000));
            (0..40)
                .filter_map(|_| match c.next_step() {
                    Step::Sleep(ms) if ms != 149 => Some(ms),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_ne!(rests(Address::Worker0), rests(Address::Worker1));
    }
}
