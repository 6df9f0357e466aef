pub mod arena;

use std::sync::mpsc::Sender;

use compact_str::CompactString;

pub use self::arena::{Album, AlbumId, PhotoLibrary, PhotoRef};
use crate::session::SessionEvent;

/// Opaque handle to a decoded/cached image, as handed out by the image side
/// (a URL, a cache key, a texture name...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub CompactString);

impl ImageHandle {
    pub fn new(key: &str) -> Self {
        Self(CompactString::new(key))
    }
}

/// Geometry and identity of one photo. Supplied by the data provider, read-only here.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    /// Stable provider identifier
    pub id: CompactString,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// Present once the backing image has been resolved.
    pub image: Option<ImageHandle>,
}

impl PhotoRecord {
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: CompactString::new(id),
            width,
            height,
            image: None,
        }
    }

    pub fn with_image(mut self, handle: ImageHandle) -> Self {
        self.image = Some(handle);
        self
    }

    /// Width / height. Degenerate dimensions are treated as square.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn is_portrait(&self) -> bool {
        self.aspect_ratio() < 1.0
    }
}

/// Source of additional album contents.
///
/// Answers are delivered asynchronously as [`SessionEvent::PhotosLoaded`] on
/// `reply`; an implementation that has the data at hand may send before returning.
pub trait PhotoProvider {
    fn request_more(&mut self, album: AlbumId, loaded: usize, reply: Sender<SessionEvent>);
}

/// Resolves image handles for photos that do not carry one yet.
///
/// Answers are delivered as [`SessionEvent::ImageResolved`] carrying the same
/// `epoch` that was passed in, so the session can drop answers for a layout it
/// has since discarded. Stalled requests simply never answer.
pub trait ImageResolver {
    fn resolve(&mut self, photo: PhotoRef, record: &PhotoRecord, epoch: u64, reply: Sender<SessionEvent>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_handles_degenerate_sizes() {
        assert!((PhotoRecord::new("a", 400, 300).aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(PhotoRecord::new("b", 0, 300).aspect_ratio(), 1.0);
        assert!(PhotoRecord::new("c", 300, 400).is_portrait());
        assert!(!PhotoRecord::new("d", 300, 300).is_portrait());
    }
}
