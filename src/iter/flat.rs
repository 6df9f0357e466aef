use super::PhotoIter;
use crate::photos::{AlbumId, PhotoLibrary, PhotoRef};

/// Every photo of a single album, in order.
#[derive(Debug, Clone)]
pub struct FlatIter {
    album: AlbumId,
    position: usize,
}

impl FlatIter {
    pub fn new(album: AlbumId) -> Self {
        Self { album, position: 0 }
    }

    fn loaded(&self, library: &PhotoLibrary) -> usize {
        library.album_at(self.album.index()).map_or(0, |a| a.len())
    }
}

impl PhotoIter for FlatIter {
    fn next(&mut self, library: &PhotoLibrary, consume: bool) -> Option<PhotoRef> {
        if self.position >= self.loaded(library) {
            return None;
        }
        let photo = PhotoRef::new(self.album, self.position);
        if consume {
            self.position += 1;
        }
        Some(photo)
    }

    fn next_row(&mut self, _library: &PhotoLibrary) {}

    fn remaining(&mut self, library: &PhotoLibrary) -> usize {
        self.loaded(library).saturating_sub(self.position)
    }

    fn wants_more(&mut self, library: &PhotoLibrary) -> Option<AlbumId> {
        library
            .album_at(self.album.index())
            .filter(|a| a.is_partial())
            .map(|_| self.album)
    }

    fn name(&self) -> &'static str {
        "flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::test_support::{album, library};

    #[test]
    fn peek_is_side_effect_free() {
        let lib = library(&[4]);
        let mut it = FlatIter::new(AlbumId(0));
        let before = it.remaining(&lib);
        let first = it.peek(&lib);
        for _ in 0..5 {
            assert_eq!(it.peek(&lib), first);
        }
        assert_eq!(it.remaining(&lib), before);
    }

    #[test]
    fn consuming_counts_down_to_exhaustion() {
        let lib = library(&[3]);
        let mut it = FlatIter::new(AlbumId(0));
        for expected in (0..3).rev() {
            assert!(it.next(&lib, true).is_some());
            assert_eq!(it.remaining(&lib), expected);
        }
        for _ in 0..3 {
            assert!(it.next(&lib, true).is_none());
            assert_eq!(it.remaining(&lib), 0);
        }
        it.next_row(&lib);
        assert_eq!(it.remaining(&lib), 0);
    }

    #[test]
    fn resumes_after_album_is_extended() {
        let mut lib = library(&[0]);
        lib.add_album(album("grow", 2).with_expected(4));
        let id = AlbumId(1);
        let mut it = FlatIter::new(id);
        while it.next(&lib, true).is_some() {}
        assert_eq!(it.wants_more(&lib), Some(id));

        let more = album("more", 2).photos;
        lib.extend_album(id, more);
        assert_eq!(it.remaining(&lib), 2);
        assert_eq!(it.next(&lib, true), Some(PhotoRef::new(id, 2)));
        assert_eq!(it.wants_more(&lib), None);
    }

    #[test]
    fn missing_album_is_just_empty() {
        let lib = library(&[]);
        let mut it = FlatIter::new(AlbumId(3));
        assert_eq!(it.remaining(&lib), 0);
        assert!(it.peek(&lib).is_none());
    }
}
