//! Photo iterators: which photos feed the layout, in what order, grouped into which rows.
//!
//! All four traversal strategies share [`PhotoIter`], so the session never needs to
//! know which view it is laying out. Iterators never own the library; every call
//! borrows it, which lets the provider extend albums in place between calls.

pub mod cluster;
pub mod flat;
pub mod preview;
pub mod summary;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::photos::{AlbumId, PhotoLibrary, PhotoRef};

pub use self::cluster::ClusterIter;
pub use self::flat::FlatIter;
pub use self::preview::PreviewIter;
pub use self::summary::SummaryIter;

/// Common contract of the photo iterators.
///
/// `peek` and `remaining` may cache per-row state (a preview window, say) but never
/// move the cursor. Running past the end yields `None`, never a panic.
pub trait PhotoIter {
    /// Next photo of the current row. Advances the cursor only when `consume` is set.
    fn next(&mut self, library: &PhotoLibrary, consume: bool) -> Option<PhotoRef>;

    /// Next photo without advancing.
    fn peek(&mut self, library: &PhotoLibrary) -> Option<PhotoRef> {
        self.next(library, false)
    }

    /// Move past the current row boundary (album, day). No-op for flat streams.
    fn next_row(&mut self, library: &PhotoLibrary);

    /// Photos left before the next row boundary, or until exhaustion for flat streams.
    fn remaining(&mut self, library: &PhotoLibrary) -> usize;

    /// Whether `next_row` separates groups of photos that must each fill their rows.
    fn has_row_boundaries(&self) -> bool {
        false
    }

    /// Album whose not-yet-loaded photos this iterator would consume next, if any.
    fn wants_more(&mut self, library: &PhotoLibrary) -> Option<AlbumId>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// The four ways of looking at one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every photo of one album, in order
    Everything { album: AlbumId },
    /// One representative photo per album
    Summary,
    /// Between `min` and `max` photos per album, one album per row
    Preview { min: usize, max: usize },
    /// Albums sharing a day interleaved into one row, at least two photos each
    Days { max: usize },
}

impl View {
    /// Build a fresh iterator for this view. The seed fixes every window draw, so
    /// rebuilding with the same seed reproduces the same rows.
    pub fn iterator(&self, seed: u64) -> Box<dyn PhotoIter> {
        match *self {
            View::Everything { album } => Box::new(FlatIter::new(album)),
            View::Summary => Box::new(SummaryIter::new()),
            View::Preview { min, max } => {
                Box::new(PreviewIter::new(min, max, StdRng::seed_from_u64(seed)))
            }
            View::Days { max } => Box::new(ClusterIter::new(max, StdRng::seed_from_u64(seed))),
        }
    }
}

/// Uniform window size in `[min(floor, count), min(max, count)]`.
pub(crate) fn draw_window<R: Rng + ?Sized>(rng: &mut R, count: usize, floor: usize, max: usize) -> usize {
    let lo = floor.min(count);
    let hi = max.max(floor).min(count);
    if lo >= hi {
        return hi;
    }
    rng.random_range(lo..=hi)
}

/// First non-empty album at or after `from`.
pub(crate) fn first_non_empty(library: &PhotoLibrary, from: usize) -> Option<usize> {
    (from..library.len()).find(|&i| library.album_at(i).is_some_and(|a| !a.is_empty()))
}

/// First album at or after `from` that has photos or may still get some.
pub(crate) fn first_pending(library: &PhotoLibrary, from: usize) -> Option<usize> {
    (from..library.len())
        .find(|&i| library.album_at(i).is_some_and(|a| !a.is_empty() || a.is_partial()))
}

/// Whether a windowed iterator must wait for more photos before sizing the album's
/// window: the album is still loading and holds fewer than `max` photos.
pub(crate) fn needs_loading(library: &PhotoLibrary, index: usize, max: usize) -> bool {
    library
        .album_at(index)
        .is_some_and(|a| a.is_partial() && a.len() < max)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_respects_bounds_and_small_albums() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let w = draw_window(&mut rng, 10, 2, 5);
            assert!((2..=5).contains(&w));
        }
        assert_eq!(draw_window(&mut rng, 1, 2, 5), 1);
        assert_eq!(draw_window(&mut rng, 0, 2, 5), 0);
        assert_eq!(draw_window(&mut rng, 3, 3, 1), 3);
    }

    #[test]
    fn every_view_tolerates_an_empty_library() {
        let lib = PhotoLibrary::new();
        let views = [
            View::Summary,
            View::Preview { min: 1, max: 3 },
            View::Days { max: 4 },
        ];
        for view in views {
            let mut it = view.iterator(7);
            assert_eq!(it.remaining(&lib), 0);
            assert!(it.peek(&lib).is_none());
            it.next_row(&lib);
            assert!(it.next(&lib, true).is_none());
        }
    }
}
