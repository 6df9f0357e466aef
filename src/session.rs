use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::iter::{PhotoIter, View};
use crate::layout::render::{GeometryNode, ImageFit, Rect};
use crate::layout::template::Catalog;
use crate::layout::{self, LayoutConfig, LayoutMode, RenderedRow};
use crate::photos::{AlbumId, ImageHandle, ImageResolver, PhotoLibrary, PhotoProvider, PhotoRecord, PhotoRef};
use crate::visibility::{TriggerId, VisibilityMonitor};

/// Layout session state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing laid out yet
    Empty,
    /// Rows are being produced
    Filling,
    /// Everything loaded is laid out; more data may arrive via the load-more trigger
    WaitingForMore,
    /// Iterator exhausted and nothing pending
    Done,
}

/// Messages delivered to a session by its collaborators.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A load-more region came near the viewport
    NearViewport { trigger: TriggerId, epoch: u64 },
    /// The provider answered a load-more request
    PhotosLoaded { album: AlbumId, photos: Vec<PhotoRecord> },
    /// An image handle became available for a photo
    ImageResolved {
        epoch: u64,
        photo: PhotoRef,
        handle: ImageHandle,
    },
}

/// What a viewport resize did to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Same row capacity: geometry kept, only pixel positions move
    Repositioned,
    /// Row capacity changed: geometry discarded and rebuilt
    Rebuilt,
}

/// What the render surface should show.
#[derive(Debug)]
pub enum Page<'a> {
    /// Nothing to show at all
    Placeholder,
    Rows(&'a [RenderedRow]),
}

/// Display state of one tile's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileState {
    Pending,
    Ready(ImageHandle),
}

/// One photo tile in page pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub photo: PhotoRef,
    pub rect: Rect,
    pub fit: ImageFit,
    pub depth: u16,
    pub row: usize,
    /// Touches the right edge of its row
    pub row_end: bool,
    pub state: TileState,
}

/// The flattened, pixel-space result (tiles + fast lookup).
#[derive(Debug)]
pub struct MosaicLayout {
    pub epoch: u64,
    /// Pixels per group unit
    pub unit_px: f32,
    pub tiles: Vec<Tile>,
    /// photo → index into `tiles`
    pub photo_to_tile: HashMap<PhotoRef, usize>,
    /// Total page height (px)
    pub height: f32,
}

impl MosaicLayout {
    /// Photo under the given page position.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<PhotoRef> {
        self.tiles
            .iter()
            .find(|t| t.rect.contains(x, y))
            .map(|t| t.photo)
    }

    pub fn tile(&self, photo: PhotoRef) -> Option<&Tile> {
        self.photo_to_tile.get(&photo).map(|&i| &self.tiles[i])
    }
}

/// One presented view of a collection: owns its iterator, its geometry and its
/// load-more bookkeeping. Nothing here is shared with other sessions.
pub struct LayoutSession {
    pub phase: SessionPhase,
    view: View,
    mode: LayoutMode,
    config: LayoutConfig,
    catalog: Arc<Catalog>,
    seed: u64,

    // Data
    library: PhotoLibrary,
    iter: Box<dyn PhotoIter>,
    rng: StdRng,

    // Geometry
    rows: Vec<RenderedRow>,
    next_y: f32,
    viewport_width: f32,
    groups_per_row: u32,
    /// Bumped on every rebuild; async answers carrying another epoch are stale.
    epoch: u64,

    // Async plumbing
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    page_started: bool,
    trigger: Option<TriggerId>,
    /// Unit-space region the pending trigger watches
    trigger_region: Option<Rect>,
    request: Option<AlbumId>,
    resolved: HashMap<PhotoRef, ImageHandle>,
    resolving: HashSet<PhotoRef>,
}

impl LayoutSession {
    pub fn new(
        library: PhotoLibrary,
        view: View,
        mode: LayoutMode,
        config: LayoutConfig,
        catalog: Arc<Catalog>,
        seed: u64,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            phase: SessionPhase::Empty,
            view,
            mode,
            config,
            catalog,
            seed,
            library,
            iter: view.iterator(seed),
            rng: StdRng::seed_from_u64(seed),
            rows: Vec::new(),
            next_y: 0.0,
            viewport_width: 0.0,
            groups_per_row: 1,
            epoch: 0,
            events_tx,
            events_rx,
            page_started: false,
            trigger: None,
            trigger_region: None,
            request: None,
            resolved: HashMap::new(),
            resolving: HashSet::new(),
        }
    }

    /// Sender for collaborators that answer asynchronously.
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    pub fn library(&self) -> &PhotoLibrary {
        &self.library
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a handle taken at `epoch` still refers to the current geometry.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    pub fn groups_per_row(&self) -> u32 {
        self.groups_per_row
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Pixels per group unit at the current viewport width.
    pub fn unit_px(&self) -> f32 {
        if self.groups_per_row == 0 {
            return 0.0;
        }
        self.viewport_width / self.groups_per_row as f32
    }

    /// Lay out everything currently loaded for a viewport of the given width.
    pub fn start(&mut self, viewport_width: f32, monitor: &mut dyn VisibilityMonitor) {
        self.viewport_width = viewport_width;
        self.groups_per_row = layout::groups_per_row(viewport_width, self.mode, &self.config);
        tracing::info!(
            "Starting {} layout: {:.0}px wide, {} groups per row, {} albums / {} photos",
            self.iter.name(),
            viewport_width,
            self.groups_per_row,
            self.library.len(),
            self.library.photo_count()
        );
        self.fill(monitor);
    }

    /// Produce rows until the iterator runs dry, then settle the phase.
    fn fill(&mut self, monitor: &mut dyn VisibilityMonitor) {
        self.phase = SessionPhase::Filling;
        let must_fit = self.iter.has_row_boundaries();

        loop {
            if self.iter.remaining(&self.library) == 0 {
                // A boundary iterator waiting on a loading album stays parked on it.
                if !self.iter.has_row_boundaries() || self.iter.wants_more(&self.library).is_some() {
                    break;
                }
                self.iter.next_row(&self.library);
                if self.iter.remaining(&self.library) == 0 {
                    break;
                }
            }

            let Some(row) = layout::render_row(
                &self.catalog,
                self.iter.as_mut(),
                &self.library,
                self.groups_per_row,
                self.rows.len(),
                self.next_y,
                must_fit,
                &self.config,
                &mut self.rng,
            ) else {
                break;
            };

            self.next_y = row.y + row.height;
            let bounds = row.bounds();
            self.rows.push(row);

            // One trigger per page-load, on its first row.
            if !self.page_started {
                self.page_started = true;
                if self.has_more_to_load() {
                    self.arm_trigger(bounds, monitor);
                }
            }
        }

        self.settle(monitor);
    }

    /// Decide between WaitingForMore and Done once the iterator is dry.
    fn settle(&mut self, monitor: &mut dyn VisibilityMonitor) {
        if self.iter.wants_more(&self.library).is_some()
            && self.trigger.is_none()
            && self.request.is_none()
        {
            // Nothing armed for this page (no rows, or an earlier trigger fired
            // before the iterator reached the partial album): watch the page bottom.
            let bottom = Rect::new(
                0.0,
                self.next_y,
                self.groups_per_row as f32,
                self.config.row_height_ratio,
            );
            self.arm_trigger(bottom, monitor);
        }

        let previous = self.phase;
        self.phase = if self.trigger.is_some() || self.request.is_some() {
            SessionPhase::WaitingForMore
        } else {
            SessionPhase::Done
        };
        if previous != self.phase {
            tracing::info!(
                "Session {:?}: {} rows, epoch {}",
                self.phase,
                self.rows.len(),
                self.epoch
            );
        }
    }

    /// Whether the iterator itself will ask the provider for more photos.
    fn has_more_to_load(&mut self) -> bool {
        self.iter.wants_more(&self.library).is_some()
    }

    fn arm_trigger(&mut self, region: Rect, monitor: &mut dyn VisibilityMonitor) {
        if let Some(old) = self.trigger.take() {
            monitor.cancel(old);
        }
        let px = region.scaled(self.unit_px());
        let id = monitor.register(px, self.config.trigger_scale, self.epoch, self.sender());
        tracing::debug!("Armed load-more trigger {:?} at y={:.0}", id, px.y);
        self.trigger = Some(id);
        // Remember the region so a reposition can move it.
        self.trigger_region = Some(region);
    }

    /// Handle a viewport width change.
    pub fn resize(&mut self, viewport_width: f32, monitor: &mut dyn VisibilityMonitor) -> ResizeOutcome {
        let groups = layout::groups_per_row(viewport_width, self.mode, &self.config);
        self.viewport_width = viewport_width;

        if groups == self.groups_per_row && self.phase != SessionPhase::Empty {
            if let Some(region) = self.trigger_region {
                self.arm_trigger(region, monitor);
            }
            tracing::debug!("Resize to {:.0}px keeps {} groups per row", viewport_width, groups);
            return ResizeOutcome::Repositioned;
        }

        tracing::info!(
            "Resize to {:.0}px: {} -> {} groups per row, rebuilding",
            viewport_width,
            self.groups_per_row,
            groups
        );
        self.groups_per_row = groups;
        self.rebuild(monitor);
        ResizeOutcome::Rebuilt
    }

    /// Throw away all geometry and lay out again from the first photo.
    fn rebuild(&mut self, monitor: &mut dyn VisibilityMonitor) {
        if let Some(old) = self.trigger.take() {
            monitor.cancel(old);
        }
        self.trigger_region = None;
        self.epoch += 1;
        self.rows.clear();
        self.next_y = 0.0;
        self.page_started = false;
        self.resolving.clear();
        self.iter = self.view.iterator(self.seed);
        self.rng = StdRng::seed_from_u64(self.seed);
        self.fill(monitor);
    }

    /// Drain every queued event. Returns how many were handled.
    pub fn poll_events(
        &mut self,
        monitor: &mut dyn VisibilityMonitor,
        provider: &mut dyn PhotoProvider,
    ) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event, monitor, provider);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        monitor: &mut dyn VisibilityMonitor,
        provider: &mut dyn PhotoProvider,
    ) {
        match event {
            SessionEvent::NearViewport { trigger, epoch } => {
                if epoch != self.epoch || self.trigger != Some(trigger) {
                    tracing::debug!("Dropping stale trigger {:?} (epoch {})", trigger, epoch);
                    return;
                }
                self.trigger = None;
                self.trigger_region = None;

                match self.iter.wants_more(&self.library) {
                    Some(album) if self.request.is_none() => {
                        let loaded = self.library.album(album).len();
                        tracing::info!("Requesting more photos for album {:?} ({} loaded)", album, loaded);
                        self.request = Some(album);
                        provider.request_more(album, loaded, self.sender());
                    }
                    _ => {}
                }
                self.settle(monitor);
            }
            SessionEvent::PhotosLoaded { album, photos } => {
                if album.index() >= self.library.len() {
                    tracing::warn!("Photos delivered for unknown album {:?}", album);
                    return;
                }
                if self.request == Some(album) {
                    self.request = None;
                }
                if self.library.extend_album(album, photos) == 0 {
                    // Empty answer: the provider has nothing more for this album.
                    self.library.mark_complete(album);
                }
                self.page_started = false;
                self.fill(monitor);
            }
            SessionEvent::ImageResolved {
                epoch,
                photo,
                handle,
            } => {
                if !self.is_current(epoch) {
                    tracing::debug!("Dropping image for {:?} from stale epoch {}", photo, epoch);
                    return;
                }
                self.resolving.remove(&photo);
                self.resolved.insert(photo, handle);
            }
        }
    }

    /// Ask `resolver` for every displayed photo that has no image yet.
    /// Returns how many requests went out.
    pub fn request_images(&mut self, resolver: &mut dyn ImageResolver) -> usize {
        let mut sent = 0;
        for row in &self.rows {
            for group in &row.groups {
                for leaf in group.leaves() {
                    let Some(photo) = leaf.photo else { continue };
                    let record = self.library.photo(photo);
                    if record.image.is_some()
                        || self.resolved.contains_key(&photo)
                        || !self.resolving.insert(photo)
                    {
                        continue;
                    }
                    resolver.resolve(photo, record, self.epoch, self.events_tx.clone());
                    sent += 1;
                }
            }
        }
        sent
    }

    pub fn tile_state(&self, photo: PhotoRef) -> TileState {
        let handle = self
            .library
            .get_photo(photo)
            .and_then(|r| r.image.clone())
            .or_else(|| self.resolved.get(&photo).cloned());
        match handle {
            Some(h) => TileState::Ready(h),
            None => TileState::Pending,
        }
    }

    /// What to show: rows, or the placeholder when there is nothing at all.
    pub fn page(&self) -> Page<'_> {
        if self.rows.is_empty() && self.phase == SessionPhase::Done {
            Page::Placeholder
        } else {
            Page::Rows(&self.rows)
        }
    }

    /// Flatten the geometry into pixel-space tiles at the current width.
    pub fn mosaic(&self) -> MosaicLayout {
        let unit_px = self.unit_px();
        let mut tiles = Vec::with_capacity(self.library.photo_count().min(1024));
        let mut photo_to_tile = HashMap::with_capacity(tiles.capacity());

        for row in &self.rows {
            for group in &row.groups {
                collect_tiles(group, row.index, unit_px, self, &mut tiles, &mut photo_to_tile);
            }
        }

        MosaicLayout {
            epoch: self.epoch,
            unit_px,
            tiles,
            photo_to_tile,
            height: self.next_y * unit_px,
        }
    }
}

fn collect_tiles(
    node: &GeometryNode,
    row: usize,
    unit_px: f32,
    session: &LayoutSession,
    tiles: &mut Vec<Tile>,
    photo_to_tile: &mut HashMap<PhotoRef, usize>,
) {
    if let (Some(photo), Some(fit)) = (node.photo, node.fit) {
        photo_to_tile.insert(photo, tiles.len());
        tiles.push(Tile {
            photo,
            rect: node.rect.scaled(unit_px),
            fit: fit.scaled(unit_px),
            depth: node.depth,
            row,
            row_end: node.last_in_row,
            state: session.tile_state(photo),
        });
    }
    for child in &node.children {
        collect_tiles(child, row, unit_px, session, tiles, photo_to_tile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::test_support::{album, library};
    use crate::layout::template::BUILTIN_CATALOG;
    use crate::photos::Album;
    use crate::visibility::ViewportMonitor;

    struct NoProvider;

    impl PhotoProvider for NoProvider {
        fn request_more(&mut self, _album: AlbumId, _loaded: usize, _reply: Sender<SessionEvent>) {}
    }

    /// Serves batches of `batch` photos until `total` are loaded.
    struct BatchProvider {
        total: usize,
        batch: usize,
        requests: usize,
    }

    impl PhotoProvider for BatchProvider {
        fn request_more(&mut self, album: AlbumId, loaded: usize, reply: Sender<SessionEvent>) {
            self.requests += 1;
            let n = self.total.saturating_sub(loaded).min(self.batch);
            let photos = (loaded..loaded + n)
                .map(|i| PhotoRecord::new(&format!("more-{i}"), 3, 4))
                .collect();
            let _ = reply.send(SessionEvent::PhotosLoaded { album, photos });
        }
    }

    #[derive(Default)]
    struct RecordingResolver {
        asked: Vec<(PhotoRef, u64)>,
    }

    impl ImageResolver for RecordingResolver {
        fn resolve(&mut self, photo: PhotoRef, _record: &PhotoRecord, epoch: u64, _reply: Sender<SessionEvent>) {
            self.asked.push((photo, epoch));
        }
    }

    fn session(lib: PhotoLibrary, view: View) -> LayoutSession {
        LayoutSession::new(
            lib,
            view,
            LayoutMode::Rows,
            LayoutConfig::default(),
            Arc::new(BUILTIN_CATALOG.clone()),
            11,
        )
    }

    fn tall_monitor() -> ViewportMonitor {
        ViewportMonitor::new(Rect::new(0.0, 0.0, 1000.0, 4000.0))
    }

    fn laid_out(s: &LayoutSession) -> usize {
        s.rows().iter().map(|r| r.consumed).sum()
    }

    #[test]
    fn empty_library_shows_placeholder() {
        let mut s = session(PhotoLibrary::new(), View::Summary);
        assert_eq!(s.phase, SessionPhase::Empty);
        s.start(800.0, &mut tall_monitor());
        assert_eq!(s.phase, SessionPhase::Done);
        assert!(matches!(s.page(), Page::Placeholder));
        assert!(s.mosaic().tiles.is_empty());
    }

    #[test]
    fn complete_album_is_laid_out_entirely() {
        let mut s = session(library(&[23]), View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        s.start(1000.0, &mut monitor);

        assert_eq!(s.phase, SessionPhase::Done);
        assert_eq!(s.groups_per_row(), 5);
        assert_eq!(laid_out(&s), 23);
        assert_eq!(monitor.pending(), 0);
        assert!(matches!(s.page(), Page::Rows(rows) if !rows.is_empty()));

        let mosaic = s.mosaic();
        assert_eq!(mosaic.tiles.len(), 23);
        for (i, tile) in mosaic.tiles.iter().enumerate() {
            assert_eq!(tile.photo, PhotoRef::new(AlbumId(0), i));
            assert_eq!(tile.state, TileState::Pending);
        }
    }

    #[test]
    fn same_capacity_resize_only_moves_tiles() {
        let mut s = session(library(&[15]), View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        s.start(400.0, &mut monitor);
        let before = s.mosaic();

        assert_eq!(s.resize(420.0, &mut monitor), ResizeOutcome::Repositioned);
        assert_eq!(s.epoch(), 0);
        let after = s.mosaic();

        assert_eq!(before.tiles.len(), after.tiles.len());
        let k = after.unit_px / before.unit_px;
        assert!((k - 1.05).abs() < 1e-4);
        for (a, b) in before.tiles.iter().zip(&after.tiles) {
            assert_eq!(a.photo, b.photo);
            assert!((a.rect.x * k - b.rect.x).abs() < 1e-2);
            assert!((a.rect.w * k - b.rect.w).abs() < 1e-2);
        }
    }

    #[test]
    fn capacity_change_rebuilds_from_scratch() {
        let mut s = session(library(&[15]), View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        s.start(400.0, &mut monitor);

        assert_eq!(s.resize(1000.0, &mut monitor), ResizeOutcome::Rebuilt);
        assert_eq!(s.epoch(), 1);
        assert!(!s.is_current(0));
        assert_eq!(s.groups_per_row(), 5);
        assert_eq!(laid_out(&s), 15);
        assert!(s.rows().iter().all(|r| r.units <= 5));
    }

    #[test]
    fn load_more_chain_runs_until_album_complete() {
        let mut lib = PhotoLibrary::new();
        lib.add_album(Album::new("a", library(&[2]).album(AlbumId(0)).photos.clone()).with_expected(10));
        let mut s = session(lib, View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        let mut provider = BatchProvider {
            total: 10,
            batch: 4,
            requests: 0,
        };

        s.start(360.0, &mut monitor);
        assert_eq!(s.phase, SessionPhase::WaitingForMore);
        assert_eq!(laid_out(&s), 2);

        let handled = s.poll_events(&mut monitor, &mut provider);
        assert_eq!(handled, 4);
        assert_eq!(provider.requests, 2);
        assert_eq!(s.phase, SessionPhase::Done);
        assert_eq!(s.library().album(AlbumId(0)).len(), 10);
        assert_eq!(laid_out(&s), 10);
    }

    #[test]
    fn empty_answer_completes_the_album() {
        let base = library(&[3]);
        let mut lib = PhotoLibrary::new();
        lib.add_album(base.album(AlbumId(0)).clone().with_expected(50));
        let mut s = session(lib, View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        let mut provider = BatchProvider {
            total: 3,
            batch: 4,
            requests: 0,
        };

        s.start(360.0, &mut monitor);
        s.poll_events(&mut monitor, &mut provider);
        assert_eq!(provider.requests, 1);
        assert_eq!(s.phase, SessionPhase::Done);
        assert!(!s.library().album(AlbumId(0)).is_partial());
    }

    #[test]
    fn trigger_waits_for_scroll() {
        let mut lib = PhotoLibrary::new();
        lib.add_album(Album::new("a", library(&[6]).album(AlbumId(0)).photos.clone()).with_expected(12));
        let mut s = session(lib, View::Everything { album: AlbumId(0) });
        // Viewport far below the first row: nothing fires yet.
        let mut monitor = ViewportMonitor::new(Rect::new(0.0, 20_000.0, 360.0, 600.0));
        let mut provider = NoProvider;

        s.start(360.0, &mut monitor);
        assert_eq!(monitor.pending(), 1);
        assert_eq!(s.poll_events(&mut monitor, &mut provider), 0);

        assert_eq!(monitor.scroll_to(0.0), 1);
        assert_eq!(s.poll_events(&mut monitor, &mut provider), 1);
        assert_eq!(s.phase, SessionPhase::WaitingForMore);
    }

    #[test]
    fn stale_images_are_dropped_after_rebuild() {
        let mut s = session(library(&[6]), View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();
        let mut resolver = RecordingResolver::default();
        s.start(400.0, &mut monitor);

        assert_eq!(s.request_images(&mut resolver), 6);
        assert_eq!(s.request_images(&mut resolver), 0);
        let (photo, old_epoch) = resolver.asked[0];

        s.resize(1000.0, &mut monitor);
        let tx = s.sender();
        tx.send(SessionEvent::ImageResolved {
            epoch: old_epoch,
            photo,
            handle: ImageHandle::new("old"),
        })
        .unwrap();
        s.poll_events(&mut monitor, &mut NoProvider);
        assert_eq!(s.tile_state(photo), TileState::Pending);

        assert_eq!(s.request_images(&mut resolver), 6);
        tx.send(SessionEvent::ImageResolved {
            epoch: s.epoch(),
            photo,
            handle: ImageHandle::new("new"),
        })
        .unwrap();
        s.poll_events(&mut monitor, &mut NoProvider);
        assert_eq!(s.tile_state(photo), TileState::Ready(ImageHandle::new("new")));
        assert_eq!(s.mosaic().tile(photo).map(|t| &t.state), Some(&TileState::Ready(ImageHandle::new("new"))));
    }

    #[test]
    fn hit_test_finds_the_tile_under_the_cursor() {
        let mut s = session(library(&[8]), View::Everything { album: AlbumId(0) });
        s.start(720.0, &mut tall_monitor());
        let mosaic = s.mosaic();
        let tile = &mosaic.tiles[3];
        let (cx, cy) = (tile.rect.x + tile.rect.w / 2.0, tile.rect.y + tile.rect.h / 2.0);
        assert_eq!(mosaic.hit_test(cx, cy), Some(tile.photo));
        assert_eq!(mosaic.hit_test(-5.0, -5.0), None);
    }

    fn tiles_of(s: &LayoutSession, album: AlbumId) -> usize {
        s.mosaic().tiles.iter().filter(|t| t.photo.album == album).count()
    }

    #[test]
    fn preview_waits_for_a_loading_album_then_lays_it_out() {
        let mut lib = PhotoLibrary::new();
        let loading = lib.add_album(album("a", 1).with_expected(10));
        let done = lib.add_album(album("b", 5));
        let mut s = session(lib, View::Preview { min: 3, max: 5 });
        let mut monitor = tall_monitor();
        let mut provider = BatchProvider {
            total: 10,
            batch: 4,
            requests: 0,
        };

        s.start(360.0, &mut monitor);
        assert_eq!(s.phase, SessionPhase::WaitingForMore);
        assert!(s.rows().is_empty());

        s.poll_events(&mut monitor, &mut provider);
        assert_eq!(provider.requests, 1);
        assert_eq!(s.phase, SessionPhase::Done);
        assert_eq!(s.library().album(loading).len(), 5);
        assert!((3..=5).contains(&tiles_of(&s, loading)));
        assert!((3..=5).contains(&tiles_of(&s, done)));
        // Rows of the loaded album come first.
        assert_eq!(s.mosaic().tiles[0].photo, PhotoRef::new(loading, 0));
    }

    #[test]
    fn day_cluster_waits_for_every_member() {
        let mut lib = PhotoLibrary::new();
        let morning = lib.add_album(album("morning", 4).with_day(5));
        let evening = lib.add_album(album("evening", 1).with_day(5).with_expected(8));
        let mut s = session(lib, View::Days { max: 6 });
        let mut monitor = tall_monitor();
        let mut provider = BatchProvider {
            total: 8,
            batch: 4,
            requests: 0,
        };

        s.start(720.0, &mut monitor);
        assert_eq!(s.phase, SessionPhase::WaitingForMore);

        let handled = s.poll_events(&mut monitor, &mut provider);
        assert_eq!(handled, 4);
        assert_eq!(provider.requests, 2);
        assert_eq!(s.phase, SessionPhase::Done);
        assert!(tiles_of(&s, morning) >= 2);
        assert!(tiles_of(&s, evening) >= 2);
    }

    #[test]
    fn loading_albums_outside_the_view_arm_nothing() {
        let mut lib = PhotoLibrary::new();
        lib.add_album(album("shown", 6));
        lib.add_album(album("elsewhere", 2).with_expected(10));
        let mut s = session(lib, View::Everything { album: AlbumId(0) });
        let mut monitor = tall_monitor();

        s.start(360.0, &mut monitor);
        assert_eq!(s.phase, SessionPhase::Done);
        assert_eq!(monitor.pending(), 0);
        assert_eq!(s.poll_events(&mut monitor, &mut NoProvider), 0);
    }
}

