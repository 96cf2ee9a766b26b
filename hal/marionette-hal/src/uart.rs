//! Serial bus abstractions
//!
//! The bus is a plain byte stream. Framing and validation live in
//! `marionette-protocol`; these traits only move bytes.

/// Bus transmitter
pub trait BusTx {
    /// Error type for transmit operations
    type Error;

    /// Write all bytes, blocking until they are queued
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until queued bytes have left the transmitter
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Bus receiver
pub trait BusRx {
    /// Error type for receive operations
    type Error;

    /// Returns true if at least one byte can be read without blocking
    fn bytes_available(&mut self) -> Result<bool, Self::Error>;

    /// Read one byte, blocking until it arrives
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// Read bytes into `buf` while they are available without blocking
///
/// Returns the number of bytes read, which is zero on an idle line.
pub fn read_available<R: BusRx>(rx: &mut R, buf: &mut [u8]) -> Result<usize, R::Error> {
    let mut n = 0;
    for slot in buf.iter_mut() {
        if !rx.bytes_available()? {
            break;
        }
        *slot = rx.read_byte()?;
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct MockRx {
        pending: VecDeque<u8>,
    }

    impl BusRx for MockRx {
        type Error = ();

        fn bytes_available(&mut self) -> Result<bool, ()> {
            Ok(!self.pending.is_empty())
        }

        fn read_byte(&mut self) -> Result<u8, ()> {
            self.pending.pop_front().ok_or(())
        }
    }

    #[test]
    fn test_read_available_stops_when_idle() {
        let mut rx = MockRx {
            pending: VecDeque::from(vec![0xAA, 0x01, 0x03]),
        };
        let mut buf = [0u8; 8];
        assert_eq!(read_available(&mut rx, &mut buf), Ok(3));
        assert_eq!(&buf[..3], &[0xAA, 0x01, 0x03]);
        assert_eq!(read_available(&mut rx, &mut buf), Ok(0));
    }

    #[test]
    fn test_read_available_respects_buffer() {
        let mut rx = MockRx {
            pending: (0..10).collect(),
        };
        let mut buf = [0u8; 4];
        assert_eq!(read_available(&mut rx, &mut buf), Ok(4));
        assert_eq!(rx.pending.len(), 6);
    }
}
