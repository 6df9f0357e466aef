pub mod render;
pub mod select;
pub mod template;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::iter::PhotoIter;
use crate::photos::PhotoLibrary;

use self::render::{render_group, GeometryNode, Rect};
use self::select::{choose_groups, SelectionOutcome, SelectorConfig};
use self::template::Catalog;

/// How rows are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Scrapbook rows, as many groups as the width allows
    #[default]
    Rows,
    /// Gallery overlay, never more than `gallery_max_groups` per row
    Gallery,
}

/// Configuration for mosaic layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Narrowest a one-unit group may get (px)
    pub min_group_width: f32,
    /// Cap on groups per row in row mode
    pub max_groups_per_row: u32,
    /// Cap on groups per row in gallery mode
    pub gallery_max_groups: u32,
    /// Row height as a multiple of the unit width (1.0 = square cells)
    pub row_height_ratio: f32,
    /// How far around the first row of a page the load-more trigger reaches (>1 fires early)
    pub trigger_scale: f32,
    pub selector: SelectorConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_group_width: 180.0,
            max_groups_per_row: 8,
            gallery_max_groups: 4,
            row_height_ratio: 1.0,
            trigger_scale: 2.0,
            selector: SelectorConfig::default(),
        }
    }
}

/// Row capacity in group units for a viewport width.
pub fn groups_per_row(viewport_width: f32, mode: LayoutMode, config: &LayoutConfig) -> u32 {
    let max = match mode {
        LayoutMode::Rows => config.max_groups_per_row,
        LayoutMode::Gallery => config.gallery_max_groups,
    }
    .max(1);
    if !(viewport_width > 0.0) || config.min_group_width <= 0.0 {
        return 1;
    }
    ((viewport_width / config.min_group_width).floor() as u32).clamp(1, max)
}

/// One row of groups, in row-unit space (one unit = one group width).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub index: usize,
    pub y: f32,
    pub height: f32,
    pub groups: Vec<GeometryNode>,
    /// Width units actually used (may be short of capacity on the last row)
    pub units: u32,
    pub consumed: usize,
    pub outcome: SelectionOutcome,
}

impl RenderedRow {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, self.y, self.units as f32, self.height)
    }
}

/// Select and render one row at vertical offset `y`.
/// Returns `None` when the iterator has nothing left in its current row.
#[allow(clippy::too_many_arguments)]
pub fn render_row<R: Rng + ?Sized>(
    catalog: &Catalog,
    iter: &mut dyn PhotoIter,
    library: &PhotoLibrary,
    capacity: u32,
    index: usize,
    y: f32,
    must_fit: bool,
    config: &LayoutConfig,
    rng: &mut R,
) -> Option<RenderedRow> {
    let remaining = iter.remaining(library);
    if remaining == 0 {
        return None;
    }

    let selection = choose_groups(catalog, remaining, capacity, must_fit, &config.selector, rng);
    let height = config.row_height_ratio;

    let mut groups = Vec::with_capacity(selection.groups.len());
    let mut consumed = 0;
    let mut x = 0.0;
    let mut units = 0;
    for (i, template) in selection.groups.iter().enumerate() {
        let rect = Rect::new(x, y, template.width_units as f32, height);
        let is_last = i + 1 == selection.groups.len();
        let Some(group) = render_group(rect, template, iter, library, 0, is_last) else {
            break;
        };
        consumed += group.consumed;
        groups.push(group.node);
        x += template.width_units as f32;
        units += template.width_units;
    }

    if groups.is_empty() {
        return None;
    }

    tracing::debug!(
        "Row {}: {} groups, {}/{} units, {} photos ({:?}, {} attempts)",
        index,
        groups.len(),
        units,
        capacity,
        consumed,
        selection.outcome,
        selection.attempts
    );

    Some(RenderedRow {
        index,
        y,
        height,
        groups,
        units,
        consumed,
        outcome: selection.outcome,
    })
}
