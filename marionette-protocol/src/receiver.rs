//! Byte-stream packet receiver
//!
//! Turns an arbitrary serial byte stream into validated packets. The
//! receiver has two states:
//!
//! - `SeekHeader`: bytes are discarded until the header byte shows up
//! - `Filling`: bytes are appended positionally until the packet is complete
//!
//! A header-valued byte inside a packet window is payload, not a new packet.
//! Only once the whole window has been consumed and has failed its checksum
//! are the remaining bytes of that window rescanned for a header.

use crate::packet::{Packet, PacketError, RawPacket, HEADER, PACKET_LEN};

/// Default age after which a partial packet is discarded
///
/// A full packet takes about 1.6 ms at 38400 baud.
pub const DEFAULT_RX_TIMEOUT_MS: u32 = 50;

/// Receiver counters for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Packets that passed checksum validation
    pub packets: u32,
    /// Complete windows that failed checksum validation
    pub checksum_errors: u32,
    /// Bytes dropped while seeking a header, outside any packet window
    pub discarded_bytes: u32,
    /// Partial packets dropped by the receive timeout
    pub timeouts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    /// Waiting for HEADER byte
    SeekHeader,
    /// Got HEADER, collecting the rest of the window
    Filling,
}

/// State machine for receiving packets
#[derive(Debug, Clone)]
pub struct PacketReceiver {
    state: RxState,
    buffer: RawPacket,
    fill: usize,
    /// Time the current window's header arrived
    started_at_ms: u32,
    timeout_ms: Option<u32>,
    stats: RxStats,
}

impl Default for PacketReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketReceiver {
    /// Create a receiver with the default partial-packet timeout
    pub fn new() -> Self {
        Self::with_timeout(Some(DEFAULT_RX_TIMEOUT_MS))
    }

    /// Create a receiver with a custom timeout, or `None` to wait forever
    /// for an abandoned packet to complete
    pub fn with_timeout(timeout_ms: Option<u32>) -> Self {
        Self {
            state: RxState::SeekHeader,
            buffer: [0; PACKET_LEN],
            fill: 0,
            started_at_ms: 0,
            timeout_ms,
            stats: RxStats::default(),
        }
    }

    /// Reset to SeekHeader with an empty buffer
    pub fn reset(&mut self) {
        self.state = RxState::SeekHeader;
        self.buffer = [0; PACKET_LEN];
        self.fill = 0;
    }

    /// Receiver counters
    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// Returns true while a partial packet is buffered
    pub fn is_filling(&self) -> bool {
        self.state == RxState::Filling
    }

    /// Drop a stale partial packet
    ///
    /// Call periodically while the line is idle. Returns true if a partial
    /// packet was discarded.
    pub fn poll_timeout(&mut self, now_ms: u32) -> bool {
        let Some(timeout_ms) = self.timeout_ms else {
            return false;
        };

        if self.state == RxState::Filling && now_ms.wrapping_sub(self.started_at_ms) >= timeout_ms
        {
            self.stats.timeouts = self.stats.timeouts.saturating_add(1);
            self.reset();
            return true;
        }
        false
    }

    /// Feed a single byte to the receiver
    ///
    /// Returns `Ok(Some(packet))` when a complete valid packet is received,
    /// `Ok(None)` when more bytes are needed, or `Err` when a complete
    /// window failed validation. The receiver is always ready for the next
    /// byte afterwards.
    pub fn feed(&mut self, byte: u8, now_ms: u32) -> Result<Option<Packet>, PacketError> {
        self.poll_timeout(now_ms);

        if !self.step(byte, now_ms) {
            return Ok(None);
        }

        let window = self.buffer;
        self.reset();

        match Packet::decode(&window) {
            Ok(packet) => {
                self.stats.packets = self.stats.packets.saturating_add(1);
                Ok(Some(packet))
            }
            Err(e) => {
                self.stats.checksum_errors = self.stats.checksum_errors.saturating_add(1);
                // The window is fully consumed; its tail may hold the next header.
                // A tail is shorter than a packet, so this can never complete one.
                // Its bytes were counted with the failed window, not as discards.
                let discarded = self.stats.discarded_bytes;
                for &tail_byte in &window[1..] {
                    self.step(tail_byte, now_ms);
                }
                self.stats.discarded_bytes = discarded;
                Err(e)
            }
        }
    }

    /// Feed multiple bytes to the receiver
    ///
    /// Returns the first complete packet found, if any.
    /// Remaining bytes after a complete packet are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8], now_ms: u32) -> Result<Option<Packet>, PacketError> {
        for &byte in bytes {
            if let Some(packet) = self.feed(byte, now_ms)? {
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }

    /// Advance the framing state by one byte. Returns true when the window is full.
    fn step(&mut self, byte: u8, now_ms: u32) -> bool {
        match self.state {
            RxState::SeekHeader => {
                if byte == HEADER {
                    self.buffer[0] = byte;
                    self.fill = 1;
                    self.started_at_ms = now_ms;
                    self.state = RxState::Filling;
                } else {
                    self.stats.discarded_bytes = self.stats.discarded_bytes.saturating_add(1);
                }
                false
            }
            RxState::Filling => {
                if let Some(slot) = self.buffer.get_mut(self.fill) {
                    *slot = byte;
                    self.fill += 1;
                }
                self.fill >= PACKET_LEN
            }
        }
    }
}
