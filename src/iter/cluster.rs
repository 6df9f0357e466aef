use rand::rngs::StdRng;

use super::{draw_window, first_pending, needs_loading, PhotoIter};
use crate::photos::{AlbumId, PhotoLibrary, PhotoRef};

/// Smallest window per album in a day cluster.
const CLUSTER_FLOOR: usize = 2;

/// Albums of one day and the window drawn for each of them.
#[derive(Debug, Clone)]
struct Cluster {
    /// (album index, window) for every non-empty member, in order
    members: Vec<(usize, usize)>,
    /// Arena index just past the cluster
    end: usize,
}

impl Cluster {
    fn total(&self) -> usize {
        self.members.iter().map(|&(_, w)| w).sum()
    }

    /// Map a flat offset inside the cluster to (album index, photo index).
    fn locate(&self, mut offset: usize) -> Option<(usize, usize)> {
        for &(album, window) in &self.members {
            if offset < window {
                return Some((album, offset));
            }
            offset -= window;
        }
        None
    }
}

/// Consecutive albums sharing a day are laid out as one row, each contributing a
/// window of at least two photos (or its full count when smaller).
///
/// Windows are only drawn once every member can fill one. While a member is still
/// loading with fewer than `max` photos the iterator parks before the cluster.
#[derive(Debug, Clone)]
pub struct ClusterIter {
    start: usize,
    emitted: usize,
    cluster: Option<Cluster>,
    max: usize,
    rng: StdRng,
}

impl ClusterIter {
    pub fn new(max: usize, rng: StdRng) -> Self {
        Self {
            start: 0,
            emitted: 0,
            cluster: None,
            max: max.max(CLUSTER_FLOOR),
            rng,
        }
    }

    /// Arena range `first..end` of the cluster starting at or after `self.start`.
    fn span(&self, library: &PhotoLibrary) -> Option<(usize, usize)> {
        let first = first_pending(library, self.start)?;
        let day = library.album_at(first)?.day;
        let mut end = first + 1;
        while let Some(album) = library.album_at(end) {
            if day.is_none() || album.day != day {
                break;
            }
            end += 1;
        }
        Some((first, end))
    }

    /// First member of the upcoming cluster that is still waiting for photos.
    fn loading_member(&self, library: &PhotoLibrary) -> Option<usize> {
        let (first, end) = self.span(library)?;
        (first..end).find(|&album| needs_loading(library, album, self.max))
    }

    fn ensure_cluster(&mut self, library: &PhotoLibrary) -> Option<&Cluster> {
        if self.cluster.is_none() {
            let (first, end) = self.span(library)?;
            if self.loading_member(library).is_some() {
                return None;
            }

            let mut members = Vec::new();
            for index in first..end {
                let count = library.album_at(index).map_or(0, |a| a.len());
                if count > 0 {
                    let window = draw_window(&mut self.rng, count, CLUSTER_FLOOR, self.max);
                    members.push((index, window));
                }
            }

            tracing::debug!(
                "Day cluster {:?}: albums {}..{}, {} members",
                library.album_at(first).and_then(|a| a.day),
                first,
                end,
                members.len()
            );
            self.cluster = Some(Cluster { members, end });
        }
        self.cluster.as_ref()
    }
}

impl PhotoIter for ClusterIter {
    fn next(&mut self, library: &PhotoLibrary, consume: bool) -> Option<PhotoRef> {
        let emitted = self.emitted;
        let (album, index) = self.ensure_cluster(library)?.locate(emitted)?;
        if consume {
            self.emitted += 1;
        }
        Some(PhotoRef::new(AlbumId(album as u32), index))
    }

    fn next_row(&mut self, library: &PhotoLibrary) {
        let end = match &self.cluster {
            Some(cluster) => Some(cluster.end),
            None => self.span(library).map(|(_, end)| end),
        };
        if let Some(end) = end {
            self.start = end;
        }
        self.cluster = None;
        self.emitted = 0;
    }

    fn remaining(&mut self, library: &PhotoLibrary) -> usize {
        let emitted = self.emitted;
        self.ensure_cluster(library)
            .map_or(0, |c| c.total().saturating_sub(emitted))
    }

    fn has_row_boundaries(&self) -> bool {
        true
    }

    fn wants_more(&mut self, library: &PhotoLibrary) -> Option<AlbumId> {
        if self.cluster.is_some() {
            return None;
        }
        self.loading_member(library).map(|album| AlbumId(album as u32))
    }

    fn name(&self) -> &'static str {
        "days"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::test_support::album;
    use crate::photos::PhotoLibrary;
    use rand::SeedableRng;

    fn day_library() -> PhotoLibrary {
        let mut lib = PhotoLibrary::new();
        lib.add_album(album("mon-a", 5).with_day(1));
        lib.add_album(album("mon-b", 1).with_day(1));
        lib.add_album(album("mon-empty", 0).with_day(1));
        lib.add_album(album("tue", 6).with_day(2));
        lib.add_album(album("undated", 3));
        lib.add_album(album("undated-2", 3));
        lib
    }

    #[test]
    fn same_day_albums_share_a_row() {
        let lib = day_library();
        let mut it = ClusterIter::new(3, StdRng::seed_from_u64(5));

        let total = it.remaining(&lib);
        // mon-a contributes 2..=3, mon-b its single photo
        assert!((3..=4).contains(&total));
        let row: Vec<_> = std::iter::from_fn(|| it.next(&lib, true)).collect();
        assert_eq!(row.len(), total);
        assert_eq!(row.first().map(|p| p.album), Some(AlbumId(0)));
        assert_eq!(row.last().map(|p| p.album), Some(AlbumId(1)));

        it.next_row(&lib);
        assert!(it.peek(&lib).is_some_and(|p| p.album == AlbumId(3)));
        let tue = it.remaining(&lib);
        assert!((2..=3).contains(&tue));
    }

    #[test]
    fn undated_albums_stand_alone() {
        let lib = day_library();
        let mut it = ClusterIter::new(6, StdRng::seed_from_u64(9));
        it.next_row(&lib);
        it.next_row(&lib);
        assert!(it.peek(&lib).is_some_and(|p| p.album == AlbumId(4)));
        let row: Vec<_> = std::iter::from_fn(|| it.next(&lib, true)).collect();
        assert!(row.iter().all(|p| p.album == AlbumId(4)));

        it.next_row(&lib);
        assert!(it.peek(&lib).is_some_and(|p| p.album == AlbumId(5)));
        it.next_row(&lib);
        assert_eq!(it.remaining(&lib), 0);
        assert!(it.peek(&lib).is_none());
    }

    #[test]
    fn windows_hold_until_next_row() {
        let lib = day_library();
        let mut it = ClusterIter::new(6, StdRng::seed_from_u64(1));
        let first = it.remaining(&lib);
        for _ in 0..10 {
            assert_eq!(it.remaining(&lib), first);
        }
        it.next(&lib, true);
        assert_eq!(it.remaining(&lib), first - 1);
    }

    #[test]
    fn waits_for_every_member_of_the_day() {
        let mut lib = PhotoLibrary::new();
        lib.add_album(album("wed-a", 4).with_day(3));
        let loading = lib.add_album(album("wed-b", 1).with_day(3).with_expected(9));
        lib.add_album(album("thu", 3).with_day(4));
        let mut it = ClusterIter::new(4, StdRng::seed_from_u64(2));

        assert_eq!(it.remaining(&lib), 0);
        assert!(it.peek(&lib).is_none());
        assert_eq!(it.wants_more(&lib), Some(loading));

        lib.extend_album(loading, album("more", 5).photos);
        let total = it.remaining(&lib);
        assert!((4..=8).contains(&total));
        assert_eq!(it.wants_more(&lib), None);
        let row: Vec<_> = std::iter::from_fn(|| it.next(&lib, true)).collect();
        assert!(row.iter().any(|p| p.album == loading));
        assert!(row.iter().all(|p| p.album.index() < 2));
    }
}
