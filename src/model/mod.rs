//! Document model for extraction results.
//!
//! These types are what the assembler produces and the renderers consume.
//! Field names follow the camelCase JSON schema served to downstream
//! consumers.

mod document;
mod formula;
mod image;
mod page;
mod table;

pub use document::{Document, ExtractionMethod, Metadata};
pub use formula::{Formula, FormulaKind, BLOCK_FORMULA_MIN_HEIGHT};
pub use image::{detect_mime_type, mime_type_for, Image, ImageKind};
pub use page::{clamp_confidence, region_id, BBox, Element, ElementKind, Page};
pub use table::Table;
