//! WS2812 pixel strings on PIO
//!
//! The scheduler renders synchronously, so a frame is staged into a local
//! buffer by `write_frame` and pushed to the LEDs by the async `flush`.

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::ws2812::{PioWs2812, RgbColorOrder};
use marionette_core::traits::{PixelError, PixelOutput};
use smart_leds::RGB8;

/// One LED string of `N` pixels driven by PIO state machine `S`
pub struct PixelString<'d, P: Instance, const S: usize, const N: usize, ORDER: RgbColorOrder> {
    driver: PioWs2812<'d, P, S, N, ORDER>,
    staged: [RGB8; N],
    dirty: bool,
}

impl<'d, P: Instance, const S: usize, const N: usize, ORDER: RgbColorOrder>
    PixelString<'d, P, S, N, ORDER>
{
    pub fn new(driver: PioWs2812<'d, P, S, N, ORDER>) -> Self {
        Self {
            driver,
            staged: [RGB8::default(); N],
            dirty: false,
        }
    }

    /// Push the staged frame to the LEDs if one was staged since the last push
    pub async fn flush(&mut self) {
        if self.dirty {
            self.driver.write(&self.staged).await;
            self.dirty = false;
        }
    }
}

impl<'d, P: Instance, const S: usize, const N: usize, ORDER: RgbColorOrder> PixelOutput
    for PixelString<'d, P, S, N, ORDER>
{
    type Error = PixelError;

    fn write_frame(&mut self, rgb: &[u8]) -> Result<(), PixelError> {
        // Shorter frames light the start of the string and blank the rest
        if rgb.len() > N * 3 || rgb.len() % 3 != 0 {
            return Err(PixelError::FrameSize {
                max: N * 3,
                actual: rgb.len(),
            });
        }

        let mut chunks = rgb.chunks_exact(3);
        for pixel in self.staged.iter_mut() {
            *pixel = match chunks.next() {
                Some(c) => RGB8::new(c[0], c[1], c[2]),
                None => RGB8::default(),
            };
        }
        self.dirty = true;
        Ok(())
    }
}
