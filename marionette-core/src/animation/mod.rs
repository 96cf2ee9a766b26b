//! Animations and the frame store
//!
//! Animations are decoded once at boot from embedded blobs and never change
//! afterwards. The store's insertion order defines the animation ids used
//! on the wire.

pub mod asset;
pub mod clip;
pub mod store;

pub use asset::{load_animation, AssetError, FrameGeometry, EYE_GEOMETRY, MOUTH_GEOMETRY};
pub use clip::Animation;
pub use store::{Asset, FrameStore, StoreError, MAX_ANIMATIONS};

/// Names of the animations the firmware ships with, in boot order
pub mod names {
    pub const EYE_IDLE: &str = "eye_idle";
    pub const EYE_BLINK: &str = "eye_blink";
    pub const MOUTH_IDLE: &str = "mouth_idle";
    pub const NIFRI: &str = "nifri";
    pub const SPINNY_LAMBDA: &str = "spinnylambda";
}
