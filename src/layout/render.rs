use crate::iter::PhotoIter;
use crate::photos::{PhotoLibrary, PhotoRef};

use super::template::{Orientation, Template, TemplateNode};

/// Portrait crops keep this fraction of the overflow above the visible window,
/// so the upper part of the frame (faces, usually) stays in view.
const PORTRAIT_BIAS: f32 = 0.25;

/// Axis-aligned rectangle. Row-unit space inside the engine, pixels after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlapping area with another rectangle (0 when disjoint or merely touching).
    pub fn overlap(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlap(other) > 0.0
    }

    /// Same center, both sides multiplied by `factor`.
    pub fn scaled_about_center(&self, factor: f32) -> Rect {
        let w = self.w * factor;
        let h = self.h * factor;
        Rect::new(self.x - (w - self.w) / 2.0, self.y - (h - self.h) / 2.0, w, h)
    }

    /// Every coordinate multiplied by `factor` (unit space -> pixels).
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect::new(self.x * factor, self.y * factor, self.w * factor, self.h * factor)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Where the full image is drawn relative to its tile's top-left corner.
/// Anything outside the tile is clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFit {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ImageFit {
    pub fn scaled(&self, factor: f32) -> ImageFit {
        ImageFit {
            x: self.x * factor,
            y: self.y * factor,
            w: self.w * factor,
            h: self.h * factor,
        }
    }
}

/// Scale an image of the given aspect ratio to cover `cell`, centered horizontally.
/// Landscape images are centered vertically; portrait ones are biased upward.
pub fn cover_fit(aspect: f32, cell: &Rect) -> ImageFit {
    if cell.w <= 0.0 || cell.h <= 0.0 || aspect <= 0.0 {
        return ImageFit {
            x: 0.0,
            y: 0.0,
            w: cell.w.max(0.0),
            h: cell.h.max(0.0),
        };
    }

    let h = (cell.w / aspect).max(cell.h);
    let w = h * aspect;
    let overflow_y = cell.h - h;
    let y = if aspect < 1.0 {
        overflow_y * PORTRAIT_BIAS
    } else {
        overflow_y / 2.0
    };

    ImageFit {
        x: (cell.w - w) / 2.0,
        y,
        w,
        h,
    }
}

/// Rendered geometry. Mirrors the shape of the template it came from; leaves carry photos.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    pub rect: Rect,
    pub depth: u16,
    pub photo: Option<PhotoRef>,
    pub fit: Option<ImageFit>,
    /// Touches the right edge of its row
    pub last_in_row: bool,
    pub children: Vec<GeometryNode>,
}

impl GeometryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// All photo-bearing leaves, left-to-right / top-to-bottom.
    pub fn leaves(&self) -> Vec<&GeometryNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a GeometryNode>) {
        if self.photo.is_some() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    pub fn photo_count(&self) -> usize {
        usize::from(self.photo.is_some())
            + self.children.iter().map(GeometryNode::photo_count).sum::<usize>()
    }
}

/// One group after rendering, with the number of photos it took from the iterator.
#[derive(Debug, Clone)]
pub struct RenderedGroup {
    pub node: GeometryNode,
    pub consumed: usize,
}

/// Template subtree with photos bound to its leaves, before geometry is known.
enum Bound {
    Leaf { photo: PhotoRef, aspect: f32 },
    Split { orientation: Orientation, children: Vec<Bound> },
}

impl Bound {
    /// Natural width/height of the subtree when every photo keeps its own ratio.
    fn aspect(&self) -> f32 {
        match self {
            Bound::Leaf { aspect, .. } => *aspect,
            Bound::Split {
                orientation: Orientation::Horizontal,
                children,
            } => children.iter().map(Bound::aspect).sum(),
            Bound::Split {
                orientation: Orientation::Vertical,
                children,
            } => 1.0 / children.iter().map(|c| 1.0 / c.aspect()).sum::<f32>(),
        }
    }
}

/// Walk the template in layout order, taking one photo per leaf.
/// Leaves that find the iterator dry are dropped, as are splits left without children.
fn bind(
    node: &TemplateNode,
    iter: &mut dyn PhotoIter,
    library: &PhotoLibrary,
    consumed: &mut usize,
) -> Option<Bound> {
    iter.peek(library)?;

    match node {
        TemplateNode::Photo => {
            let photo = iter.next(library, true)?;
            *consumed += 1;
            Some(Bound::Leaf {
                photo,
                aspect: library.photo(photo).aspect_ratio().max(f32::EPSILON),
            })
        }
        TemplateNode::Split {
            orientation,
            children,
        } => {
            let mut bound = Vec::with_capacity(children.len());
            for child in children {
                match bind(child, iter, library, consumed) {
                    Some(b) => bound.push(b),
                    None => break,
                }
            }
            if bound.is_empty() {
                return None;
            }
            Some(Bound::Split {
                orientation: *orientation,
                children: bound,
            })
        }
    }
}

/// Subdivide `rect` along the split axis in proportion to each child's natural extent.
/// Horizontal splits weight widths by aspect, vertical splits weight heights by 1/aspect.
/// The last child takes whatever is left so the children tile `rect` exactly.
fn place(bound: &Bound, rect: Rect, depth: u16, last_in_row: bool) -> GeometryNode {
    match bound {
        Bound::Leaf { photo, aspect } => GeometryNode {
            rect,
            depth,
            photo: Some(*photo),
            fit: Some(cover_fit(*aspect, &rect)),
            last_in_row,
            children: Vec::new(),
        },
        Bound::Split {
            orientation,
            children,
        } => {
            let horizontal = *orientation == Orientation::Horizontal;
            let weights: Vec<f32> = children
                .iter()
                .map(|c| if horizontal { c.aspect() } else { 1.0 / c.aspect() })
                .collect();
            let total: f32 = weights.iter().sum();

            let (start, length) = if horizontal {
                (rect.x, rect.w)
            } else {
                (rect.y, rect.h)
            };
            let end = start + length;

            let mut pos = start;
            let mut placed = Vec::with_capacity(children.len());
            for (i, (child, weight)) in children.iter().zip(&weights).enumerate() {
                let is_last = i + 1 == children.len();
                let extent = if is_last {
                    end - pos
                } else {
                    length * weight / total
                };
                let child_rect = if horizontal {
                    Rect::new(pos, rect.y, extent, rect.h)
                } else {
                    Rect::new(rect.x, pos, rect.w, extent)
                };
                let child_last = last_in_row && (!horizontal || is_last);
                placed.push(place(child, child_rect, depth + 1, child_last));
                pos += extent;
            }

            GeometryNode {
                rect,
                depth,
                photo: None,
                fit: None,
                last_in_row,
                children: placed,
            }
        }
    }
}

/// Render one group into `parent`, pulling photos from `iter`.
///
/// Returns `None` when the iterator has nothing left. A group whose template has
/// more slots than there are photos renders the photos it got, filling `parent`.
pub fn render_group(
    parent: Rect,
    template: &Template,
    iter: &mut dyn PhotoIter,
    library: &PhotoLibrary,
    depth: u16,
    is_last_in_row: bool,
) -> Option<RenderedGroup> {
    let mut consumed = 0;
    let bound = bind(&template.root, iter, library, &mut consumed)?;
    if consumed < template.photo_slots() {
        tracing::debug!(
            "Template '{}' starved: {} of {} slots filled",
            template.name,
            consumed,
            template.photo_slots()
        );
    }
    Some(RenderedGroup {
        node: place(&bound, parent, depth, is_last_in_row),
        consumed,
    })
}
