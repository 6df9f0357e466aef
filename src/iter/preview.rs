use rand::rngs::StdRng;

use super::{draw_window, first_pending, needs_loading, PhotoIter};
use crate::photos::{AlbumId, PhotoLibrary, PhotoRef};

/// A random-sized window of each album, one album per row.
///
/// The window is drawn once per album, the first time the album is looked at,
/// and kept until `next_row`. An album still loading with fewer than `max` photos
/// gets no window yet: the iterator parks on it with nothing remaining and names it
/// in `wants_more` until the provider has extended it.
#[derive(Debug, Clone)]
pub struct PreviewIter {
    album: usize,
    taken: usize,
    window: Option<usize>,
    min: usize,
    max: usize,
    rng: StdRng,
}

impl PreviewIter {
    pub fn new(min: usize, max: usize, rng: StdRng) -> Self {
        let min = min.max(1);
        Self {
            album: 0,
            taken: 0,
            window: None,
            min,
            max: max.max(min),
            rng,
        }
    }

    /// Skip forward over empty albums, then make sure the current album has a window.
    /// Returns (album index, window); the window is 0 while the album is parked.
    fn settle(&mut self, library: &PhotoLibrary) -> Option<(usize, usize)> {
        let index = first_pending(library, self.album)?;
        if index != self.album {
            self.album = index;
            self.taken = 0;
            self.window = None;
        }
        let count = library.album_at(index)?.len();
        let window = match self.window {
            Some(w) => w,
            None if needs_loading(library, index, self.max) => return Some((index, 0)),
            None => {
                let w = draw_window(&mut self.rng, count, self.min, self.max);
                tracing::debug!("Preview window for album {}: {} of {} photos", index, w, count);
                self.window = Some(w);
                w
            }
        };
        Some((index, window))
    }
}

impl PhotoIter for PreviewIter {
    fn next(&mut self, library: &PhotoLibrary, consume: bool) -> Option<PhotoRef> {
        let (index, window) = self.settle(library)?;
        if self.taken >= window {
            return None;
        }
        let photo = PhotoRef::new(AlbumId(index as u32), self.taken);
        if consume {
            self.taken += 1;
        }
        Some(photo)
    }

    fn next_row(&mut self, library: &PhotoLibrary) {
        if let Some((index, _)) = self.settle(library) {
            self.album = index + 1;
        }
        self.taken = 0;
        self.window = None;
    }

    fn remaining(&mut self, library: &PhotoLibrary) -> usize {
        self.settle(library)
            .map_or(0, |(_, window)| window.saturating_sub(self.taken))
    }

    fn has_row_boundaries(&self) -> bool {
        true
    }

    fn wants_more(&mut self, library: &PhotoLibrary) -> Option<AlbumId> {
        let (index, _) = self.settle(library)?;
        if self.window.is_some() {
            return None;
        }
        needs_loading(library, index, self.max).then_some(AlbumId(index as u32))
    }

    fn name(&self) -> &'static str {
        "preview"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::test_support::{album, library};
    use rand::SeedableRng;

    fn iter(min: usize, max: usize) -> PreviewIter {
        PreviewIter::new(min, max, StdRng::seed_from_u64(11))
    }

    #[test]
    fn window_is_stable_within_an_album() {
        let lib = library(&[20, 20]);
        let mut it = iter(2, 8);
        let window = it.remaining(&lib);
        assert!((2..=8).contains(&window));
        for _ in 0..10 {
            assert_eq!(it.remaining(&lib), window);
            assert_eq!(it.peek(&lib), Some(PhotoRef::new(AlbumId(0), 0)));
        }
        it.next(&lib, true);
        assert_eq!(it.remaining(&lib), window - 1);
    }

    #[test]
    fn stops_at_the_window_then_moves_on() {
        let lib = library(&[10, 0, 0, 10]);
        let mut it = iter(3, 3);
        let row: Vec<_> = std::iter::from_fn(|| it.next(&lib, true)).collect();
        assert_eq!(row.len(), 3);
        assert!(it.peek(&lib).is_none());
        assert_eq!(it.remaining(&lib), 0);

        it.next_row(&lib);
        assert_eq!(it.peek(&lib), Some(PhotoRef::new(AlbumId(3), 0)));
        assert_eq!(it.remaining(&lib), 3);

        it.next_row(&lib);
        assert_eq!(it.remaining(&lib), 0);
        assert!(it.next(&lib, true).is_none());
    }

    #[test]
    fn small_albums_show_everything() {
        let lib = library(&[1, 2]);
        let mut it = iter(3, 6);
        assert_eq!(it.remaining(&lib), 1);
        it.next_row(&lib);
        assert_eq!(it.remaining(&lib), 2);
    }

    #[test]
    fn next_row_mid_album_skips_the_rest() {
        let lib = library(&[10, 4]);
        let mut it = iter(5, 5);
        it.next(&lib, true);
        it.next_row(&lib);
        assert_eq!(it.peek(&lib), Some(PhotoRef::new(AlbumId(1), 0)));
        assert_eq!(it.remaining(&lib), 4);
    }

    #[test]
    fn parks_on_a_loading_album_until_it_grows() {
        let mut lib = PhotoLibrary::new();
        let id = lib.add_album(album("loading", 1).with_expected(10));
        lib.add_album(album("done", 4));
        let mut it = iter(3, 5);

        assert_eq!(it.remaining(&lib), 0);
        assert!(it.peek(&lib).is_none());
        assert_eq!(it.wants_more(&lib), Some(id));

        let more = album("more", 4).photos;
        lib.extend_album(id, more);
        let window = it.remaining(&lib);
        assert!((3..=5).contains(&window));
        assert_eq!(it.wants_more(&lib), None);
        assert_eq!(it.peek(&lib), Some(PhotoRef::new(id, 0)));
    }

    #[test]
    fn empty_loading_album_is_not_skipped() {
        let mut lib = PhotoLibrary::new();
        let id = lib.add_album(album("empty", 0).with_expected(6));
        lib.add_album(album("next", 4));
        let mut it = iter(2, 5);
        assert_eq!(it.wants_more(&lib), Some(id));

        lib.mark_complete(id);
        assert_eq!(it.wants_more(&lib), None);
        assert_eq!(it.peek(&lib), Some(PhotoRef::new(AlbumId(1), 0)));
    }
}
