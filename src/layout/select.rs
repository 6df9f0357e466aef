//! Group selection: pick a row's worth of templates for the photos at hand.
//!
//! Generate-and-test over random catalog draws. Each attempt fills the row to
//! capacity, then gets judged against how many photos are left; the ratio
//! heuristics exist to keep the last rows of a collection from looking lopsided.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::template::{Catalog, Template};

/// Tuning knobs for [`choose_groups`]. Empirical values, kept configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Candidate rows to try before settling for the best one
    pub max_attempts: u32,
    /// Underfilled rows are accepted outright when capacity/remaining is at most this
    pub accept_ratio: f64,
    /// Below this capacity/remaining ratio the photo budget is halved
    pub halve_ratio: f64,
    /// Catalog draws per candidate before padding with the fallback template
    pub max_fill_draws: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            accept_ratio: 1.0 / 3.0,
            halve_ratio: 2.0 / 3.0,
            max_fill_draws: 64,
        }
    }
}

/// Which branch of the search produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Photo slots match the photo budget exactly
    Exact,
    /// Too few photos for half a row: one single-unit template per photo
    Sparse,
    /// Fewer slots than photos, accepted because plenty more are coming
    Underfilled,
    /// Retries ran out; the best candidate seen
    BestEffort,
    /// Nothing to place
    Empty,
}

/// A row's worth of templates.
#[derive(Debug, Clone)]
pub struct Selection<'c> {
    pub groups: Vec<&'c Template>,
    pub outcome: SelectionOutcome,
    pub attempts: u32,
}

impl Selection<'_> {
    pub fn width_units(&self) -> u32 {
        self.groups.iter().map(|t| t.width_units).sum()
    }

    pub fn photo_slots(&self) -> usize {
        self.groups.iter().map(|t| t.photo_slots()).sum()
    }
}

/// Draw templates until the row is full, skipping draws that would overflow it.
fn fill_row<'c, R: Rng + ?Sized>(
    catalog: &'c Catalog,
    capacity: u32,
    max_draws: u32,
    rng: &mut R,
) -> (Vec<&'c Template>, usize) {
    let mut groups = Vec::new();
    let mut units = 0;
    let mut photos = 0;
    let mut draws = 0;

    while units < capacity {
        let template = if draws < max_draws {
            draws += 1;
            catalog.draw_template(rng)
        } else {
            catalog.fallback()
        };
        if units + template.width_units > capacity {
            continue;
        }
        units += template.width_units;
        photos += template.photo_slots();
        groups.push(template);
    }

    (groups, photos)
}

/// Choose templates for one row of `capacity` units given `remaining` photos.
///
/// With `must_fit` set, underfilled candidates are never accepted early; the
/// search keeps going for an exact fit and falls back to the best candidate.
pub fn choose_groups<'c, R: Rng + ?Sized>(
    catalog: &'c Catalog,
    remaining: usize,
    capacity: u32,
    must_fit: bool,
    config: &SelectorConfig,
    rng: &mut R,
) -> Selection<'c> {
    if remaining == 0 || capacity == 0 {
        return Selection {
            groups: Vec::new(),
            outcome: SelectionOutcome::Empty,
            attempts: 0,
        };
    }

    let mut budget = remaining;
    let mut best: Option<(Vec<&'c Template>, usize)> = None;
    let mut fullest_under: Option<(Vec<&'c Template>, usize)> = None;

    for attempt in 1..=config.max_attempts {
        let (candidate, photos) = fill_row(catalog, capacity, config.max_fill_draws, rng);

        if photos == budget {
            return Selection {
                groups: candidate,
                outcome: SelectionOutcome::Exact,
                attempts: attempt,
            };
        }

        if photos > budget {
            if remaining * 2 < capacity as usize {
                tracing::debug!(
                    "Only {} photos for a {}-unit row, using single-photo groups",
                    remaining,
                    capacity
                );
                return Selection {
                    groups: vec![catalog.fallback(); remaining],
                    outcome: SelectionOutcome::Sparse,
                    attempts: attempt,
                };
            }
            if best.as_ref().map_or(true, |(_, p)| photos < *p) {
                best = Some((candidate, photos));
            }
            continue;
        }

        if must_fit {
            if fullest_under.as_ref().map_or(true, |(_, p)| photos > *p) {
                fullest_under = Some((candidate, photos));
            }
            continue;
        }

        let ratio = capacity as f64 / budget as f64;
        if ratio <= config.accept_ratio {
            return Selection {
                groups: candidate,
                outcome: SelectionOutcome::Underfilled,
                attempts: attempt,
            };
        } else if ratio <= config.halve_ratio {
            budget = (budget / 2).max(1);
            best = None;
        } else if best.as_ref().map_or(true, |(_, p)| photos < *p) {
            best = Some((candidate, photos));
        }
    }

    if must_fit {
        tracing::warn!(
            "No exact fit for {} photos in {} units after {} attempts, using best effort",
            remaining,
            capacity,
            config.max_attempts
        );
    } else {
        tracing::debug!(
            "Selection for {} photos in {} units settled on best effort",
            remaining,
            capacity
        );
    }

    let groups = best
        .or(fullest_under)
        .map(|(groups, _)| groups)
        .unwrap_or_else(|| vec![catalog.fallback(); remaining.min(capacity as usize)]);

    Selection {
        groups,
        outcome: SelectionOutcome::BestEffort,
        attempts: config.max_attempts,
    }
}
