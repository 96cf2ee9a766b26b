//! A single named animation

/// A named, ordered sequence of equally sized RGB frames
///
/// Frames borrow one contiguous buffer (the embedded asset blob), so an
/// animation is cheap to share: every task holds `&Animation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation<'a> {
    name: &'a str,
    frame_len: usize,
    frame_count: usize,
    data: &'a [u8],
}

/// Single-frame, zero-pixel animation used when nothing else is available
static PLACEHOLDER: Animation<'static> = Animation {
    name: "",
    frame_len: 0,
    frame_count: 1,
    data: &[],
};

impl<'a> Animation<'a> {
    /// Build an animation over `data`, split into frames of `frame_len` bytes
    ///
    /// Returns `None` unless `data` holds at least one whole frame and no
    /// partial trailing frame.
    pub fn from_frames(name: &'a str, frame_len: usize, data: &'a [u8]) -> Option<Self> {
        if frame_len == 0 || data.is_empty() || data.len() % frame_len != 0 {
            return None;
        }

        Some(Self {
            name,
            frame_len,
            frame_count: data.len() / frame_len,
            data,
        })
    }

    /// The shared empty placeholder
    pub fn placeholder() -> &'static Animation<'static> {
        &PLACEHOLDER
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Number of frames (always at least 1)
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Bytes per frame (`leds * 3`)
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Frame at `index`, wrapping around the loop
    pub fn frame(&self, index: usize) -> &'a [u8] {
        let start = (index % self.frame_count) * self.frame_len;
        self.data
            .get(start..start + self.frame_len)
            .unwrap_or(&[])
    }
}
