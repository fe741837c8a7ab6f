//! Region extractors and the dispatcher that makes them total.
//!
//! Each capability is a trait taking `(handle, page_number, bbox)`; a
//! strategy provides one implementation of each. [`ExtractorSet`] bundles a
//! strategy's providers and turns every failure, including a panic, into a
//! zero-confidence placeholder so that assembly never aborts on one region.

mod fallback;
mod model;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::handle::DocumentHandle;
use crate::layout::{FallbackLayoutProvider, LayoutProvider};
use crate::model::{clamp_confidence, BBox, ElementKind, ExtractionMethod, ImageKind};

pub use fallback::{
    FallbackFormulaExtractor, FallbackImageExtractor, FallbackTableExtractor,
    FallbackTextExtractor, IMAGE_SCALE,
};
pub use model::{
    CapabilityLoader, FnLoader, LayoutDetector, ModelImageExtractor, ModelLayoutProvider,
    ModelSuite, UnavailableLoader,
};

/// Text recovered from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub confidence: f32,
}

/// A table recovered from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct TableContent {
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
    pub html: String,
    pub markdown: String,
    pub confidence: f32,
}

/// A formula recovered from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaContent {
    pub latex: String,
    pub confidence: f32,
}

/// A raster recovered from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContent {
    /// Encoded PNG or JPEG bytes
    pub data: Vec<u8>,
    pub kind: ImageKind,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub confidence: f32,
}

impl TextContent {
    pub fn placeholder() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
        }
    }
}

impl TableContent {
    pub fn placeholder() -> Self {
        Self {
            headers: Vec::new(),
            data: Vec::new(),
            html: String::new(),
            markdown: String::new(),
            confidence: 0.0,
        }
    }
}

impl FormulaContent {
    pub fn placeholder() -> Self {
        Self {
            latex: String::new(),
            confidence: 0.0,
        }
    }
}

impl ImageContent {
    pub fn placeholder() -> Self {
        Self {
            data: Vec::new(),
            kind: ImageKind::Unknown,
            width: None,
            height: None,
            confidence: 0.0,
        }
    }
}

/// Reads the text overlapping a region.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, handle: &DocumentHandle, page: u32, bbox: &BBox)
        -> Result<TextContent>;
}

/// Reads a table from a region.
pub trait TableExtractor: Send + Sync {
    fn extract_table(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<TableContent>;
}

/// Recognizes a formula in a region.
pub trait FormulaExtractor: Send + Sync {
    fn extract_formula(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<FormulaContent>;
}

/// Rasterizes a region.
pub trait ImageExtractor: Send + Sync {
    fn extract_image(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<ImageContent>;
}

/// The layout provider and region extractors of one strategy.
#[derive(Clone)]
pub struct ExtractorSet {
    method: ExtractionMethod,
    layout: Arc<dyn LayoutProvider>,
    text: Arc<dyn TextExtractor>,
    table: Arc<dyn TableExtractor>,
    formula: Arc<dyn FormulaExtractor>,
    image: Arc<dyn ImageExtractor>,
}

impl std::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorSet")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl ExtractorSet {
    /// The structure-based fallback strategy.
    pub fn fallback() -> Self {
        Self {
            method: ExtractionMethod::Fallback,
            layout: Arc::new(FallbackLayoutProvider::new()),
            text: Arc::new(FallbackTextExtractor),
            table: Arc::new(FallbackTableExtractor::new()),
            formula: Arc::new(FallbackFormulaExtractor),
            image: Arc::new(FallbackImageExtractor),
        }
    }

    /// The model strategy backed by `suite`.
    pub fn from_suite(suite: ModelSuite) -> Self {
        Self {
            method: ExtractionMethod::Model,
            layout: Arc::new(ModelLayoutProvider::new(suite.layout)),
            text: suite.text,
            table: suite.table,
            formula: suite.formula,
            image: Arc::new(ModelImageExtractor),
        }
    }

    /// Which strategy this set implements.
    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    /// The layout provider of this strategy.
    pub fn layout(&self) -> &dyn LayoutProvider {
        self.layout.as_ref()
    }

    /// Extract text; never fails, and the confidence is within [0, 1].
    pub fn text(&self, handle: &DocumentHandle, page: u32, bbox: &BBox) -> TextContent {
        let mut content = guarded(ElementKind::Text, page, || {
            self.text.extract_text(handle, page, bbox)
        })
        .unwrap_or_else(|_| TextContent::placeholder());
        content.confidence = clamp_confidence(content.confidence);
        content
    }

    /// Extract a table; never fails, and the confidence is within [0, 1].
    pub fn table(&self, handle: &DocumentHandle, page: u32, bbox: &BBox) -> TableContent {
        let mut content = guarded(ElementKind::Table, page, || {
            self.table.extract_table(handle, page, bbox)
        })
        .unwrap_or_else(|_| TableContent::placeholder());
        content.confidence = clamp_confidence(content.confidence);
        content
    }

    /// Extract a formula; never fails, and the confidence is within [0, 1].
    pub fn formula(&self, handle: &DocumentHandle, page: u32, bbox: &BBox) -> FormulaContent {
        let mut content = guarded(ElementKind::Formula, page, || {
            self.formula.extract_formula(handle, page, bbox)
        })
        .unwrap_or_else(|_| FormulaContent::placeholder());
        content.confidence = clamp_confidence(content.confidence);
        content
    }

    /// Extract an image; never fails, and the confidence is within [0, 1].
    pub fn image(&self, handle: &DocumentHandle, page: u32, bbox: &BBox) -> ImageContent {
        let mut content = guarded(ElementKind::Image, page, || {
            self.image.extract_image(handle, page, bbox)
        })
        .unwrap_or_else(|_| ImageContent::placeholder());
        content.confidence = clamp_confidence(content.confidence);
        content
    }
}

/// Run one extractor call, converting errors and panics into a logged
/// [`Error::RegionExtraction`].
fn guarded<T>(kind: ElementKind, page: u32, call: impl FnOnce() -> Result<T>) -> Result<T> {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err @ Error::RegionExtraction { .. })) => err,
        Ok(Err(e)) => Error::RegionExtraction {
            page,
            kind,
            reason: e.to_string(),
        },
        Err(payload) => Error::RegionExtraction {
            page,
            kind,
            reason: panic_message(payload.as_ref()),
        },
    };

    log::warn!("{}", outcome);
    Err(outcome)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("extractor panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("extractor panicked: {}", s)
    } else {
        "extractor panicked".to_string()
    }
}
