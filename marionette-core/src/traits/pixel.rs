//! Pixel string output trait

/// Errors that can occur when writing a frame to a pixel string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelError {
    /// Frame is longer than the string or not whole RGB triplets
    FrameSize { max: usize, actual: usize },
    /// Transfer to the LEDs failed
    Transfer,
}

/// A string of individually addressable RGB LEDs
///
/// The scheduler hands each channel one flat RGB buffer per tick.
pub trait PixelOutput {
    /// Error type for write operations
    type Error;

    /// Write one frame (`[r, g, b, r, g, b, ...]`) to the string
    fn write_frame(&mut self, rgb: &[u8]) -> Result<(), Self::Error>;
}

impl<T: PixelOutput + ?Sized> PixelOutput for &mut T {
    type Error = T::Error;

    fn write_frame(&mut self, rgb: &[u8]) -> Result<(), Self::Error> {
        (**self).write_frame(rgb)
    }
}
