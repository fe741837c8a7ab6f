//! Document-level types.

use super::{Formula, Image, Page, Table};
use serde::{Deserialize, Serialize};

/// A complete extraction result.
///
/// Built fresh per request by the assembler and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Running text, in page order, each extracted text followed by one space
    pub text: String,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Extracted tables, in detection order
    pub tables: Vec<Table>,

    /// Extracted images, in detection order
    pub images: Vec<Image>,

    /// Extracted formulas, in detection order
    pub formulas: Vec<Formula>,

    /// Aggregate counts
    pub metadata: Metadata,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Recompute the count fields of `metadata` from the collections.
    pub fn refresh_metadata(&mut self) {
        self.metadata.total_pages = self.pages.len();
        self.metadata.total_tables = self.tables.len();
        self.metadata.total_images = self.images.len();
        self.metadata.total_formulas = self.formulas.len();
        self.metadata.text_length = self.text.chars().count();
    }
}

/// Aggregate document metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_pages: usize,
    pub total_tables: usize,
    pub total_images: usize,
    pub total_formulas: usize,

    /// Characters in `Document::text`
    pub text_length: usize,

    /// Strategy that produced the document
    pub extraction_method: ExtractionMethod,

    /// The per-document deadline expired before every element was extracted
    #[serde(default)]
    pub timed_out: bool,
}

/// Which strategy produced a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Full model suite
    Model,
    /// Geometric, structure-based heuristics
    #[default]
    Fallback,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Model => write!(f, "model"),
            ExtractionMethod::Fallback => write!(f, "fallback"),
        }
    }
}
