//! Formula types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Regions taller than this (in points) are display formulas.
pub const BLOCK_FORMULA_MIN_HEIGHT: f32 = 50.0;

/// An extracted formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub id: String,
    pub bbox: BBox,
    #[serde(rename = "type")]
    pub kind: FormulaKind,
    /// LaTeX source (empty for placeholders)
    pub latex: String,
    pub confidence: f32,
    pub page_number: u32,
}

/// Display vs. inline formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaKind {
    Block,
    Inline,
}

impl FormulaKind {
    /// Classify by region height.
    pub fn for_bbox(bbox: &BBox) -> Self {
        if bbox.height() > BLOCK_FORMULA_MIN_HEIGHT {
            FormulaKind::Block
        } else {
            FormulaKind::Inline
        }
    }
}
