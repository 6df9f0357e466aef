/// Diagnostic tool to verify library → session → mosaic pipeline
use mosaic_rs::layout::render::Rect;
use mosaic_rs::photos::{ImageHandle, ImageResolver, PhotoProvider};
use mosaic_rs::session::SessionEvent;
use mosaic_rs::{
    Album, AlbumId, LayoutSession, MosaicConfig, Page, PhotoLibrary, PhotoRecord, PhotoRef, View,
    ViewportMonitor,
};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Hands out synthetic photos in fixed-size batches.
struct SyntheticProvider {
    batch: usize,
}

impl PhotoProvider for SyntheticProvider {
    fn request_more(&mut self, album: AlbumId, loaded: usize, reply: Sender<SessionEvent>) {
        let photos = (loaded..loaded + self.batch)
            .map(|i| synthetic_photo(album.0 as usize, i))
            .collect();
        if reply.send(SessionEvent::PhotosLoaded { album, photos }).is_err() {
            tracing::debug!("Session gone, dropping photos for album {:?}", album);
        }
    }
}

/// Resolves every image immediately to a fake cache key.
struct InstantResolver;

impl ImageResolver for InstantResolver {
    fn resolve(&mut self, photo: PhotoRef, record: &PhotoRecord, epoch: u64, reply: Sender<SessionEvent>) {
        let handle = ImageHandle::new(&format!("cache/{}", record.id));
        if reply.send(SessionEvent::ImageResolved { epoch, photo, handle }).is_err() {
            tracing::debug!("Session gone, dropping image for {:?}", photo);
        }
    }
}

fn synthetic_photo(album: usize, i: usize) -> PhotoRecord {
    let (w, h) = match (album * 7 + i) % 5 {
        0 | 3 => (4032, 3024),
        1 => (3024, 4032),
        2 => (1920, 1080),
        _ => (2048, 2048),
    };
    PhotoRecord::new(&format!("{album}-{i}"), w, h)
}

fn synthetic_library() -> PhotoLibrary {
    let mut library = PhotoLibrary::new();
    let sizes = [(14, 30), (3, 3), (0, 0), (9, 9), (25, 60), (6, 6)];
    for (a, &(loaded, expected)) in sizes.iter().enumerate() {
        let photos = (0..loaded).map(|i| synthetic_photo(a, i)).collect();
        let album = Album::new(&format!("Album {a}"), photos)
            .with_expected(expected)
            .with_day(20_000 + a as i32 / 2);
        library.add_album(album);
    }
    library
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mosaic_rs=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let width: f32 = args.next().map(|w| w.parse::<f32>()).transpose()?.unwrap_or(1280.0);
    let config = match args.next().map(PathBuf::from) {
        Some(path) => MosaicConfig::from_json_file(&path)?,
        None => MosaicConfig::default(),
    }
    .apply_env()?;

    println!("=== DIAGNOSTIC: Library → Session → Mosaic ===");
    println!("Viewport width: {:.0}px, mode {:?}, seed {}", width, config.mode, config.seed);

    let catalog = Arc::new(config.catalog()?);
    println!("\n[1] Catalog: {} templates", catalog.len());
    for t in catalog.templates() {
        println!(
            "    '{}' p={:.2} units={} slots={}",
            t.name,
            t.probability,
            t.width_units,
            t.photo_slots()
        );
    }

    let views = [
        View::Everything { album: AlbumId(0) },
        View::Summary,
        config.preview_view(),
        config.days_view(),
    ];

    for (i, view) in views.into_iter().enumerate() {
        let library = synthetic_library();
        println!(
            "\n[{}] {:?}: {} albums, {} photos loaded",
            i + 2,
            view,
            library.len(),
            library.photo_count()
        );

        let mut session = LayoutSession::new(
            library,
            view,
            config.mode,
            config.layout.clone(),
            catalog.clone(),
            config.seed,
        );
        let mut monitor = ViewportMonitor::new(Rect::new(0.0, 0.0, width, 900.0));
        let mut provider = SyntheticProvider { batch: 8 };
        let mut resolver = InstantResolver;

        session.start(width, &mut monitor);

        // Scroll down a viewport at a time until nothing more arrives.
        let mut y = 0.0;
        loop {
            let handled = session.poll_events(&mut monitor, &mut provider);
            let bottom = session.mosaic().height;
            if handled == 0 && y > bottom {
                break;
            }
            y += 900.0;
            monitor.scroll_to(y);
        }
        session.request_images(&mut resolver);
        session.poll_events(&mut monitor, &mut provider);

        let rows = match session.page() {
            Page::Placeholder => {
                println!("    (placeholder)");
                continue;
            }
            Page::Rows(rows) => rows,
        };

        for row in rows {
            println!(
                "    row {:>3}: {} groups, {}/{} units, {} photos, {:?}",
                row.index,
                row.groups.len(),
                row.units,
                session.groups_per_row(),
                row.consumed,
                row.outcome
            );
        }

        let mosaic = session.mosaic();
        let covered: f32 = mosaic.tiles.iter().map(|t| t.rect.area()).sum();
        let page = width * mosaic.height;
        println!(
            "    {:?}: {} tiles, {:.0}px tall, {:.1}% covered, epoch {}",
            session.phase,
            mosaic.tiles.len(),
            mosaic.height,
            if page > 0.0 { covered / page * 100.0 } else { 0.0 },
            mosaic.epoch
        );
    }

    Ok(())
}
