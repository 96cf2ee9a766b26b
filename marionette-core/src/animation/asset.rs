//! Embedded animation blob decoding
//!
//! Blob format:
//! - FRAME COUNT (4 bytes): little-endian u32
//! - FRAMES (frame_count * width * height * 3 bytes): RGB triplets, row order

use super::clip::Animation;

/// Size of the frame count prefix
const COUNT_PREFIX_LEN: usize = 4;

/// Errors that can occur while decoding an animation blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetError {
    /// Blob is shorter than the frame count prefix
    TooShort,
    /// Blob declares zero frames
    NoFrames,
    /// Blob size does not match the declared frame count
    LengthMismatch { expected: usize, actual: usize },
}

/// LED matrix dimensions an animation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

impl FrameGeometry {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of LEDs in one frame
    pub const fn leds(&self) -> usize {
        self.width * self.height
    }

    /// Bytes in one RGB frame
    pub const fn bytes_per_frame(&self) -> usize {
        self.leds() * 3
    }
}

/// Eye matrix: 16x16
pub const EYE_GEOMETRY: FrameGeometry = FrameGeometry::new(16, 16);

/// Mouth matrix: 32x16
pub const MOUTH_GEOMETRY: FrameGeometry = FrameGeometry::new(32, 16);

/// Decode an animation blob
///
/// The returned animation borrows its frames from `blob`.
pub fn load_animation<'a>(
    blob: &'a [u8],
    geometry: FrameGeometry,
    name: &'a str,
) -> Result<Animation<'a>, AssetError> {
    let (prefix, frames) = blob
        .split_first_chunk::<COUNT_PREFIX_LEN>()
        .ok_or(AssetError::TooShort)?;

    let frame_count = u32::from_le_bytes(*prefix) as usize;
    if frame_count == 0 {
        return Err(AssetError::NoFrames);
    }

    let expected = frame_count
        .checked_mul(geometry.bytes_per_frame())
        .and_then(|len| len.checked_add(COUNT_PREFIX_LEN))
        .unwrap_or(usize::MAX);
    if blob.len() != expected {
        return Err(AssetError::LengthMismatch {
            expected,
            actual: blob.len(),
        });
    }

    // Length was checked above, so this only fails for zero-sized geometry
    Animation::from_frames(name, geometry.bytes_per_frame(), frames).ok_or(AssetError::NoFrames)
}
