//! Frame store (animation registry)
//!
//! Populated once at boot, then shared read-only with every task. An
//! animation's position in the store is its id on the wire, so entries are
//! only ever appended before the first task starts.

use heapless::Vec;

use super::asset::{load_animation, AssetError, FrameGeometry};
use super::clip::Animation;

/// Maximum number of animations in the store
pub const MAX_ANIMATIONS: usize = 16;

/// Errors that can occur while populating the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Asset blob could not be decoded
    Asset(AssetError),
    /// Store already holds `MAX_ANIMATIONS` entries
    Full,
}

impl From<AssetError> for StoreError {
    fn from(e: AssetError) -> Self {
        StoreError::Asset(e)
    }
}

/// An embedded animation blob waiting to be decoded
#[derive(Debug, Clone, Copy)]
pub struct Asset<'a> {
    pub name: &'a str,
    pub geometry: FrameGeometry,
    pub blob: &'a [u8],
}

/// Ordered, append-only collection of animations
#[derive(Debug, Clone, Default)]
pub struct FrameStore<'a> {
    animations: Vec<Animation<'a>, MAX_ANIMATIONS>,
}

impl<'a> FrameStore<'a> {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            animations: Vec::new(),
        }
    }

    /// Append an already decoded animation, returning its id
    pub fn push(&mut self, animation: Animation<'a>) -> Result<u8, StoreError> {
        let id = self.animations.len() as u8;
        self.animations
            .push(animation)
            .map_err(|_| StoreError::Full)?;
        Ok(id)
    }

    /// Decode an asset blob and append it, returning its id
    ///
    /// A blob that fails to decode is not added; ids of later animations
    /// shift down accordingly.
    pub fn load(&mut self, asset: &Asset<'a>) -> Result<u8, StoreError> {
        let animation = load_animation(asset.blob, asset.geometry, asset.name)?;
        self.push(animation)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Animation with the given wire id
    pub fn get(&self, id: u8) -> Option<&Animation<'a>> {
        self.animations.get(id as usize)
    }

    /// Wire id of the animation with the given name
    pub fn index_of(&self, name: &str) -> Option<u8> {
        self.animations
            .iter()
            .position(|anim| anim.name() == name)
            .map(|i| i as u8)
    }

    /// Animation with the given name
    pub fn find(&self, name: &str) -> Option<&Animation<'a>> {
        self.index_of(name).and_then(|id| self.get(id))
    }

    /// Named animation, else the first one, else the empty placeholder
    ///
    /// Playback must never block on a missing asset.
    pub fn resolve_or_fallback(&self, name: &str) -> &Animation<'a> {
        self.find(name)
            .or_else(|| self.animations.first())
            .unwrap_or(Animation::placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::asset::FrameGeometry;

    const ONE_LED: FrameGeometry = FrameGeometry::new(1, 1);

    fn blob(frames: u32) -> Vec<u8, 64> {
        let mut data = Vec::new();
        data.extend_from_slice(&frames.to_le_bytes()).unwrap();
        for _ in 0..frames * 3 {
            data.push(0x10).unwrap();
        }
        data
    }

    fn asset<'a>(name: &'a str, blob: &'a [u8]) -> Asset<'a> {
        Asset {
            name,
            geometry: ONE_LED,
            blob,
        }
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let idle = blob(4);
        let blink = blob(3);
        let mut store = FrameStore::new();

        let a = store.load(&asset("idle", &idle)).unwrap();
        let b = store.load(&asset("blink", &blink)).unwrap();

        assert_eq!((a, b), (0, 1));
        assert_eq!(store.index_of("blink"), Some(1));
        assert_eq!(store.get(1).map(|a| a.frame_count()), Some(3));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_broken_asset_is_absent() {
        let good = blob(2);
        let mut store = FrameStore::new();

        let result = store.load(&asset("bad", &[1, 2]));
        assert_eq!(result, Err(StoreError::Asset(AssetError::TooShort)));

        store.load(&asset("good", &good)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.index_of("good"), Some(0));
        assert!(store.find("bad").is_none());
    }

    #[test]
    fn test_fallback_chain() {
        let empty = FrameStore::new();
        assert_eq!(empty.resolve_or_fallback("eye_idle").frame_count(), 1);
        assert!(empty.resolve_or_fallback("eye_idle").frame(0).is_empty());

        let data = blob(2);
        let mut store = FrameStore::new();
        store.load(&asset("other", &data)).unwrap();
        assert_eq!(store.resolve_or_fallback("eye_idle").name(), "other");
        assert_eq!(store.resolve_or_fallback("other").name(), "other");
    }

    #[test]
    fn test_store_full() {
        let data = blob(1);
        let mut store = FrameStore::new();
        for _ in 0..MAX_ANIMATIONS {
            store.load(&asset("x", &data)).unwrap();
        }
        let result = store.load(&asset("x", &data));
        assert_eq!(result, Err(StoreError::Full));
    }
}
