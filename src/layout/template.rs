//! Group templates: how one to three photos subdivide a cell that is one, two or
//! three row units wide, and the weighted catalog templates are drawn from.

use std::sync::LazyLock;

use compact_str::CompactString;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, MosaicError};

/// Slack allowed when checking that probabilities sum to 1.
pub const PROBABILITY_EPSILON: f64 = 1e-6;

/// Widest group a template may describe.
pub const MAX_WIDTH_UNITS: u32 = 3;

/// The catalog shipped with the crate.
pub static BUILTIN_CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

/// Direction in which a split lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Children side by side, left to right
    Horizontal,
    /// Children stacked, top to bottom
    Vertical,
}

/// One node of a template tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateNode {
    /// Holds exactly one photo
    Photo,
    /// Pure layout container
    Split {
        orientation: Orientation,
        children: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn row(children: Vec<TemplateNode>) -> Self {
        TemplateNode::Split {
            orientation: Orientation::Horizontal,
            children,
        }
    }

    pub fn column(children: Vec<TemplateNode>) -> Self {
        TemplateNode::Split {
            orientation: Orientation::Vertical,
            children,
        }
    }

    /// Number of photo leaves in this subtree.
    pub fn photo_slots(&self) -> usize {
        match self {
            TemplateNode::Photo => 1,
            TemplateNode::Split { children, .. } => children.iter().map(Self::photo_slots).sum(),
        }
    }

    fn has_empty_split(&self) -> bool {
        match self {
            TemplateNode::Photo => false,
            TemplateNode::Split { children, .. } => {
                children.is_empty() || children.iter().any(Self::has_empty_split)
            }
        }
    }
}

/// A top-level catalog entry. Immutable and shared by every row that picks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: CompactString,
    pub probability: f64,
    pub width_units: u32,
    pub root: TemplateNode,
    photo_slots: usize,
}

impl Template {
    pub fn new(name: &str, probability: f64, width_units: u32, root: TemplateNode) -> Self {
        let photo_slots = root.photo_slots();
        Self {
            name: CompactString::new(name),
            probability,
            width_units,
            root,
            photo_slots,
        }
    }

    pub fn photo_slots(&self) -> usize {
        self.photo_slots
    }

    /// Single photo filling a one-unit cell: the fallback every catalog must carry.
    pub fn is_single_unit_photo(&self) -> bool {
        self.width_units == 1 && self.root == TemplateNode::Photo
    }
}

/// On-disk form of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: CompactString,
    pub probability: f64,
    pub width_units: u32,
    pub root: TemplateNode,
}

impl From<TemplateSpec> for Template {
    fn from(spec: TemplateSpec) -> Self {
        Template::new(&spec.name, spec.probability, spec.width_units, spec.root)
    }
}

impl From<&Template> for TemplateSpec {
    fn from(t: &Template) -> Self {
        TemplateSpec {
            name: t.name.clone(),
            probability: t.probability,
            width_units: t.width_units,
            root: t.root.clone(),
        }
    }
}

/// Weighted set of top-level templates.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<Template>,
    fallback: usize,
}

impl Catalog {
    /// Validate and build a catalog.
    pub fn new(templates: Vec<Template>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }

        for t in &templates {
            if !(t.probability > 0.0 && t.probability <= 1.0) {
                return Err(CatalogError::Probability {
                    name: t.name.clone(),
                    probability: t.probability,
                });
            }
            if t.width_units == 0 || t.width_units > MAX_WIDTH_UNITS {
                return Err(CatalogError::WidthUnits {
                    name: t.name.clone(),
                    units: t.width_units,
                });
            }
            if t.root.has_empty_split() {
                return Err(CatalogError::EmptySplit {
                    name: t.name.clone(),
                });
            }
        }

        let sum: f64 = templates.iter().map(|t| t.probability).sum();
        if (sum - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(CatalogError::ProbabilitySum { sum });
        }

        let fallback = templates
            .iter()
            .position(Template::is_single_unit_photo)
            .ok_or(CatalogError::MissingFallback)?;

        Ok(Self {
            templates,
            fallback,
        })
    }

    /// Load a catalog from a JSON array of template records.
    pub fn from_json(json: &str) -> Result<Self, MosaicError> {
        let specs: Vec<TemplateSpec> = serde_json::from_str(json)?;
        let catalog = Self::new(specs.into_iter().map(Template::from).collect())?;
        tracing::info!("Loaded template catalog with {} templates", catalog.len());
        Ok(catalog)
    }

    /// Serialize back to the JSON form accepted by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Result<String, MosaicError> {
        let specs: Vec<TemplateSpec> = self.templates.iter().map(TemplateSpec::from).collect();
        Ok(serde_json::to_string_pretty(&specs)?)
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        use TemplateNode::Photo;

        let templates = vec![
            Template::new("single", 0.20, 1, Photo),
            Template::new("stack-2", 0.15, 1, TemplateNode::column(vec![Photo, Photo])),
            Template::new("stack-3", 0.05, 1, TemplateNode::column(vec![Photo, Photo, Photo])),
            Template::new("wide", 0.10, 2, Photo),
            Template::new("pair", 0.15, 2, TemplateNode::row(vec![Photo, Photo])),
            Template::new(
                "feature-left",
                0.15,
                2,
                TemplateNode::row(vec![Photo, TemplateNode::column(vec![Photo, Photo])]),
            ),
            Template::new(
                "feature-right",
                0.10,
                3,
                TemplateNode::row(vec![TemplateNode::column(vec![Photo, Photo]), Photo]),
            ),
            Template::new("triptych", 0.10, 3, TemplateNode::row(vec![Photo, Photo, Photo])),
        ];

        Self {
            templates,
            fallback: 0,
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The single-photo, one-unit template.
    pub fn fallback(&self) -> &Template {
        &self.templates[self.fallback]
    }

    /// Draw one template with probability proportional to its weight.
    pub fn draw_template<R: Rng + ?Sized>(&self, rng: &mut R) -> &Template {
        self.draw_at(rng.random::<f64>())
    }

    /// Inverse-CDF lookup: first template whose cumulative probability exceeds `u`.
    ///
    /// Panics when the cumulative probability runs past 1, which only a catalog
    /// that bypassed validation can do.
    pub fn draw_at(&self, u: f64) -> &Template {
        let mut cumulative = 0.0;
        for t in &self.templates {
            cumulative += t.probability;
            assert!(
                cumulative <= 1.0 + PROBABILITY_EPSILON,
                "template catalog probabilities exceed 1.0 (at '{}': {})",
                t.name,
                cumulative
            );
            if u < cumulative {
                return t;
            }
        }
        // Only reachable when rounding leaves the sum a hair below u.
        assert!(
            u >= cumulative - PROBABILITY_EPSILON,
            "no template selected for u={u} (cumulative {cumulative})"
        );
        &self.templates[self.templates.len() - 1]
    }
}
