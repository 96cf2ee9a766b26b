//! Playback state of one LED channel
//!
//! Queued animations are promoted only when the playing animation completes
//! a loop. A blink overlay is the exception: it preempts immediately and
//! hands back to the animation it interrupted once it has played through.

use crate::animation::Animation;

/// Why the playing animation changed during [`ChannelPlayback::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Queued animation promoted at a loop boundary
    Promoted,
    /// Blink overlay finished and playback resumed
    OverlayFinished,
}

/// Result of requesting an animation on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestOutcome {
    /// Will play from the next loop boundary
    Queued,
    /// Already playing; nothing changed
    Unchanged,
    /// Id does not exist in the frame store
    InvalidIndex(u8),
}

/// Per-channel playback state
#[derive(Debug, Clone)]
pub struct ChannelPlayback<'a> {
    current: &'a Animation<'a>,
    queued: Option<&'a Animation<'a>>,
    frame_counter: u64,
    /// Animation to resume while a blink overlay is playing
    resume: Option<&'a Animation<'a>>,
}

fn same(a: &Animation<'_>, b: &Animation<'_>) -> bool {
    core::ptr::eq(a, b)
}

impl<'a> ChannelPlayback<'a> {
    pub fn new(initial: &'a Animation<'a>) -> Self {
        Self {
            current: initial,
            queued: None,
            frame_counter: 0,
            resume: None,
        }
    }

    /// Animation currently rendering
    pub fn current(&self) -> &'a Animation<'a> {
        self.current
    }

    /// Animation waiting for the next loop boundary
    pub fn queued(&self) -> Option<&'a Animation<'a>> {
        self.queued
    }

    /// Ticks since the current animation started
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn is_blink_overlay(&self) -> bool {
        self.resume.is_some()
    }

    /// Returns true if `animation` is the one rendering
    pub fn is_playing(&self, animation: &Animation<'_>) -> bool {
        same(self.current, animation)
    }

    /// Request an animation
    ///
    /// A different animation is queued for the next loop boundary, replacing
    /// any older pending request. Requesting the playing animation is a
    /// no-op and leaves a pending request in place.
    pub fn request(&mut self, animation: &'a Animation<'a>) -> RequestOutcome {
        if same(self.current, animation) {
            RequestOutcome::Unchanged
        } else {
            self.queued = Some(animation);
            RequestOutcome::Queued
        }
    }

    /// Switch to `overlay` immediately, resuming the current animation once
    /// the overlay has played one full loop
    pub fn start_overlay(&mut self, overlay: &'a Animation<'a>) {
        if self.resume.is_none() {
            self.resume = Some(self.current);
        }
        self.current = overlay;
        self.frame_counter = 0;
    }

    /// Frame to render this tick
    pub fn frame(&self) -> &'a [u8] {
        let count = self.current.frame_count() as u64;
        self.current.frame((self.frame_counter % count) as usize)
    }

    /// Step past the frame just rendered and apply any due transition
    pub fn advance(&mut self) -> Option<Transition> {
        self.frame_counter = self.frame_counter.saturating_add(1);
        let count = self.current.frame_count() as u64;

        if let Some(resume) = self.resume {
            if self.frame_counter < count {
                return None;
            }
            // The overlay ends on its own loop boundary, so a pending
            // request takes over from here instead of the resumed animation.
            self.resume = None;
            let next = self.queued.take().unwrap_or(resume);
            self.switch_to(next);
            return Some(Transition::OverlayFinished);
        }

        if self.frame_counter % count == 0 {
            if let Some(next) = self.queued.take() {
                self.switch_to(next);
                return Some(Transition::Promoted);
            }
        }
        None
    }

    fn switch_to(&mut self, animation: &'a Animation<'a>) {
        self.current = animation;
        self.frame_counter = 0;
    }
}
