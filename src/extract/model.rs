//! Model-backed capabilities.
//!
//! The detectors themselves are opaque: a [`CapabilityLoader`] hands back a
//! [`ModelSuite`] of trait objects, and this module adapts it to the
//! [`LayoutProvider`] and extractor traits used by assembly.

use std::sync::Arc;

use super::fallback::rasterize_region;
use super::{FormulaExtractor, ImageContent, ImageExtractor, TableExtractor, TextExtractor};
use crate::error::{Error, Result};
use crate::handle::DocumentHandle;
use crate::layout::LayoutProvider;
use crate::model::{BBox, Element, ImageKind, Page};

const FIGURE_CONFIDENCE: f32 = 0.95;

/// An opaque layout detection model.
pub trait LayoutDetector: Send + Sync {
    /// Typed regions found on one page, in detection order.
    fn detect_page(&self, handle: &DocumentHandle, page_number: u32) -> Result<Vec<Element>>;
}

/// The capabilities acquired by a successful model load.
#[derive(Clone)]
pub struct ModelSuite {
    pub layout: Arc<dyn LayoutDetector>,
    pub text: Arc<dyn TextExtractor>,
    pub table: Arc<dyn TableExtractor>,
    pub formula: Arc<dyn FormulaExtractor>,
}

impl std::fmt::Debug for ModelSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSuite").finish_non_exhaustive()
    }
}

/// Acquires the model suite. Called at most once per selector reset.
pub trait CapabilityLoader: Send + Sync {
    fn load(&self) -> Result<ModelSuite>;
}

/// Loader used when no model backend is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLoader;

impl CapabilityLoader for UnavailableLoader {
    fn load(&self) -> Result<ModelSuite> {
        Err(Error::CapabilityUnavailable(
            "no model backend configured".to_string(),
        ))
    }
}

/// Loader backed by a closure.
pub struct FnLoader<F>(pub F);

impl<F> CapabilityLoader for FnLoader<F>
where
    F: Fn() -> Result<ModelSuite> + Send + Sync,
{
    fn load(&self) -> Result<ModelSuite> {
        (self.0)()
    }
}

/// Adapts a [`LayoutDetector`] to [`LayoutProvider`].
///
/// Element kinds and confidences pass through; corner order is normalized
/// and confidences are clamped into [0, 1]. Regions with non-finite
/// coordinates are dropped.
pub struct ModelLayoutProvider {
    detector: Arc<dyn LayoutDetector>,
}

impl ModelLayoutProvider {
    pub fn new(detector: Arc<dyn LayoutDetector>) -> Self {
        Self { detector }
    }
}

impl LayoutProvider for ModelLayoutProvider {
    fn detect_page(&self, handle: &DocumentHandle, page_number: u32) -> Result<Page> {
        let (width, height) = handle.page_size(page_number)?;
        let mut page = Page::new(page_number, width, height);

        for element in self.detector.detect_page(handle, page_number)? {
            let b = element.bbox;
            if !b.is_finite() {
                log::warn!(
                    "Page {}: dropping {} region with non-finite bbox {:?}",
                    page_number,
                    element.kind,
                    b
                );
                continue;
            }
            page.add_element(Element::new(
                element.kind,
                BBox::new(b.x0, b.y0, b.x1, b.y1),
                element.confidence,
            ));
        }
        Ok(page)
    }
}

/// Image extraction for the model strategy: the rasterized region is
/// reported as a figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelImageExtractor;

impl ImageExtractor for ModelImageExtractor {
    fn extract_image(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<ImageContent> {
        rasterize_region(handle, page, bbox, ImageKind::Figure, FIGURE_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_loader() {
        match UnavailableLoader.load() {
            Err(Error::CapabilityUnavailable(reason)) => assert!(reason.contains("no model")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fn_loader_calls_closure() {
        let loader = FnLoader(|| Err(Error::CapabilityUnavailable("gpu missing".into())));
        assert!(matches!(
            loader.load(),
            Err(Error::CapabilityUnavailable(r)) if r == "gpu missing"
        ));
    }
}
