// Public library interface for mosaic-rs
// The debug CLI tool drives sessions through these modules

pub mod config;
pub mod error;
pub mod iter;
pub mod layout;
pub mod photos;
pub mod session;
pub mod visibility;

pub use config::MosaicConfig;
pub use error::{CatalogError, MosaicError, Result};
pub use iter::{PhotoIter, View};
pub use layout::template::{Catalog, BUILTIN_CATALOG};
pub use layout::{LayoutConfig, LayoutMode, RenderedRow};
pub use photos::{Album, AlbumId, PhotoLibrary, PhotoRecord, PhotoRef};
pub use session::{LayoutSession, MosaicLayout, Page, SessionEvent, SessionPhase};
pub use visibility::{ViewportMonitor, VisibilityMonitor};
