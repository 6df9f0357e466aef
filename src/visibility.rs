//! Viewport visibility triggers used to request more data while scrolling.

use std::sync::mpsc::Sender;

use crate::layout::render::Rect;
use crate::session::SessionEvent;

/// Handle of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(pub u64);

/// Watches regions of the page and reports when they come near the viewport.
///
/// Registrations are one-shot: after delivering
/// [`SessionEvent::NearViewport`] once, the registration is forgotten.
pub trait VisibilityMonitor {
    /// Watch `region` (page pixels). Fires when the region, scaled about its center
    /// by `trigger_scale`, intersects the visible viewport.
    fn register(
        &mut self,
        region: Rect,
        trigger_scale: f32,
        epoch: u64,
        notify: Sender<SessionEvent>,
    ) -> TriggerId;

    /// Forget a registration that has not fired yet. Unknown IDs are ignored.
    fn cancel(&mut self, id: TriggerId);
}

struct Watch {
    id: TriggerId,
    region: Rect,
    trigger_scale: f32,
    epoch: u64,
    notify: Sender<SessionEvent>,
}

impl Watch {
    fn is_near(&self, viewport: &Rect) -> bool {
        self.region
            .scaled_about_center(self.trigger_scale.max(0.0))
            .intersects(viewport)
    }

    fn fire(self) {
        // The session may be gone already; nothing to do then.
        let _ = self.notify.send(SessionEvent::NearViewport {
            trigger: self.id,
            epoch: self.epoch,
        });
    }
}

/// In-process monitor driven by explicit viewport updates (scroll/resize).
pub struct ViewportMonitor {
    viewport: Rect,
    watches: Vec<Watch>,
    next_id: u64,
}

impl ViewportMonitor {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            watches: Vec::new(),
            next_id: 0,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Move/resize the visible window and fire every registration now in range.
    /// Returns how many fired.
    pub fn set_viewport(&mut self, viewport: Rect) -> usize {
        self.viewport = viewport;
        let (near, far): (Vec<Watch>, Vec<Watch>) = std::mem::take(&mut self.watches)
            .into_iter()
            .partition(|w| w.is_near(&viewport));
        self.watches = far;

        let fired = near.len();
        for watch in near {
            tracing::debug!("Trigger {:?} near viewport", watch.id);
            watch.fire();
        }
        fired
    }

    /// Scroll vertically to `y`, keeping the viewport size.
    pub fn scroll_to(&mut self, y: f32) -> usize {
        let v = self.viewport;
        self.set_viewport(Rect::new(v.x, y, v.w, v.h))
    }

    /// Registrations that have not fired yet.
    pub fn pending(&self) -> usize {
        self.watches.len()
    }
}

impl VisibilityMonitor for ViewportMonitor {
    fn register(
        &mut self,
        region: Rect,
        trigger_scale: f32,
        epoch: u64,
        notify: Sender<SessionEvent>,
    ) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id += 1;

        let watch = Watch {
            id,
            region,
            trigger_scale,
            epoch,
            notify,
        };
        // Already in range: fire right away, like an intersection observer does.
        if watch.is_near(&self.viewport) {
            watch.fire();
        } else {
            self.watches.push(watch);
        }
        id
    }

    fn cancel(&mut self, id: TriggerId) {
        self.watches.retain(|w| w.id != id);
    }
}
