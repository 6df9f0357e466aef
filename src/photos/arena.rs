use compact_str::CompactString;

use super::{ImageHandle, PhotoRecord};

/// Index into the library's album arena. Uses u32 like every other handle in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumId(pub u32);

impl AlbumId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle to one photo: album + position inside that album.
/// Stays valid when the album is extended, since photos are only ever appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoRef {
    pub album: AlbumId,
    pub index: u32,
}

impl PhotoRef {
    pub fn new(album: AlbumId, index: usize) -> Self {
        Self {
            album,
            index: index as u32,
        }
    }
}

/// One album: an ordered, append-only run of photos.
#[derive(Debug, Clone)]
pub struct Album {
    /// Display title
    pub title: CompactString,
    /// Loaded photos, in provider order
    pub photos: Vec<PhotoRecord>,
    /// Total number of photos the provider knows about (>= photos.len()).
    pub expected: usize,
    /// Day key for day clustering. Consecutive albums with the same key share a row.
    pub day: Option<i32>,
    /// Representative photo for summary views (defaults to the first photo).
    pub cover: Option<usize>,
}

impl Album {
    pub fn new(title: &str, photos: Vec<PhotoRecord>) -> Self {
        let expected = photos.len();
        Self {
            title: CompactString::new(title),
            photos,
            expected,
            day: None,
            cover: None,
        }
    }

    pub fn with_day(mut self, day: i32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_cover(mut self, cover: usize) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Declare that the provider holds more photos than are loaded so far.
    pub fn with_expected(mut self, expected: usize) -> Self {
        self.expected = expected.max(self.photos.len());
        self
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Whether the provider can still deliver more photos for this album.
    pub fn is_partial(&self) -> bool {
        self.photos.len() < self.expected
    }

    /// Index of the representative photo, or None for an empty album.
    pub fn cover_index(&self) -> Option<usize> {
        if self.photos.is_empty() {
            return None;
        }
        Some(self.cover.filter(|&c| c < self.photos.len()).unwrap_or(0))
    }
}

/// All albums of one collection, stored in a flat arena.
/// The layout engine only reads records; the provider side appends.
#[derive(Debug, Clone, Default)]
pub struct PhotoLibrary {
    albums: Vec<Album>,
}

impl PhotoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an album. Returns its ID.
    pub fn add_album(&mut self, album: Album) -> AlbumId {
        let id = AlbumId(self.albums.len() as u32);
        self.albums.push(album);
        id
    }

    /// Get an album by ID.
    pub fn album(&self, id: AlbumId) -> &Album {
        &self.albums[id.index()]
    }

    /// Album by arena position, for iterators that walk the arena in order.
    pub fn album_at(&self, index: usize) -> Option<&Album> {
        self.albums.get(index)
    }

    /// Resolve a photo handle.
    pub fn photo(&self, photo: PhotoRef) -> &PhotoRecord {
        &self.albums[photo.album.index()].photos[photo.index as usize]
    }

    /// Like [`photo`](Self::photo) but tolerant of handles from another library.
    pub fn get_photo(&self, photo: PhotoRef) -> Option<&PhotoRecord> {
        self.albums
            .get(photo.album.index())
            .and_then(|a| a.photos.get(photo.index as usize))
    }

    /// Append freshly loaded photos to an album in place.
    /// Existing `PhotoRef`s stay valid.
    pub fn extend_album(&mut self, id: AlbumId, photos: Vec<PhotoRecord>) -> usize {
        let album = &mut self.albums[id.index()];
        let added = photos.len();
        album.photos.extend(photos);
        album.expected = album.expected.max(album.photos.len());
        tracing::debug!(
            "Album {:?} '{}' extended by {} photos ({} / {} loaded)",
            id,
            album.title,
            added,
            album.photos.len(),
            album.expected
        );
        added
    }

    /// Declare an album fully loaded, whatever it expected before.
    pub fn mark_complete(&mut self, id: AlbumId) {
        let album = &mut self.albums[id.index()];
        album.expected = album.photos.len();
    }

    /// Attach a resolved image to a record. Used by providers that resolve eagerly.
    pub fn set_image(&mut self, photo: PhotoRef, handle: ImageHandle) {
        if let Some(record) = self
            .albums
            .get_mut(photo.album.index())
            .and_then(|a| a.photos.get_mut(photo.index as usize))
        {
            record.image = Some(handle);
        }
    }

    /// Number of albums.
    pub fn len(&self) -> usize {
        self.albums.len()
    }

    /// Whether there are no albums at all.
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Total loaded photos across all albums.
    pub fn photo_count(&self) -> usize {
        self.albums.iter().map(Album::len).sum()
    }

    /// Iterate over (id, album) pairs in arena order.
    pub fn albums(&self) -> impl Iterator<Item = (AlbumId, &Album)> {
        self.albums
            .iter()
            .enumerate()
            .map(|(i, a)| (AlbumId(i as u32), a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Vec<PhotoRecord> {
        (0..n)
            .map(|i| PhotoRecord::new(&format!("p{i}"), 4, 3))
            .collect()
    }

    #[test]
    fn extend_keeps_existing_refs_valid() {
        let mut lib = PhotoLibrary::new();
        let id = lib.add_album(Album::new("a", photos(2)).with_expected(5));
        let first = PhotoRef::new(id, 1);
        assert!(lib.album(id).is_partial());

        lib.extend_album(id, photos(3));
        assert_eq!(lib.photo(first).id, "p1");
        assert_eq!(lib.album(id).len(), 5);
        assert!(!lib.album(id).is_partial());
    }

    #[test]
    fn cover_falls_back_to_first_photo() {
        let album = Album::new("a", photos(3)).with_cover(7);
        assert_eq!(album.cover_index(), Some(0));
        let album = Album::new("a", photos(3)).with_cover(2);
        assert_eq!(album.cover_index(), Some(2));
        assert_eq!(Album::new("empty", Vec::new()).cover_index(), None);
    }
}
