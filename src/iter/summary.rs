use super::{first_non_empty, PhotoIter};
use crate::photos::{AlbumId, PhotoLibrary, PhotoRef};

/// One representative photo per non-empty album.
#[derive(Debug, Clone, Default)]
pub struct SummaryIter {
    album: usize,
}

impl SummaryIter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhotoIter for SummaryIter {
    fn next(&mut self, library: &PhotoLibrary, consume: bool) -> Option<PhotoRef> {
        let index = first_non_empty(library, self.album)?;
        let cover = library.album_at(index)?.cover_index()?;
        if consume {
            self.album = index + 1;
        }
        Some(PhotoRef::new(AlbumId(index as u32), cover))
    }

    fn next_row(&mut self, _library: &PhotoLibrary) {}

    /// Albums left, not photos.
    fn remaining(&mut self, library: &PhotoLibrary) -> usize {
        (self.album..library.len())
            .filter(|&i| library.album_at(i).is_some_and(|a| !a.is_empty()))
            .count()
    }

    // Covers arrive with the album listing itself.
    fn wants_more(&mut self, _library: &PhotoLibrary) -> Option<AlbumId> {
        None
    }

    fn name(&self) -> &'static str {
        "summary"
    }
}
