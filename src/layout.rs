//! Page layout detection.
//!
//! A [`LayoutProvider`] turns an opened document into one [`Page`] per
//! physical page, each listing the regions found on it in detection order.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::handle::DocumentHandle;
use crate::model::{BBox, Element, ElementKind, Page};
use crate::parser::{group_into_lines, is_supported, split_at_gutters, TableDetector};

const TEXT_CONFIDENCE: f32 = 0.9;
const IMAGE_CONFIDENCE: f32 = 0.8;
const TABLE_CONFIDENCE: f32 = 0.8;

/// Detects typed regions on the pages of a document.
pub trait LayoutProvider: Send + Sync {
    /// Regions of a single page.
    fn detect_page(&self, handle: &DocumentHandle, page_number: u32) -> Result<Page>;

    /// Regions of every page, in page order.
    ///
    /// A page that fails is returned with no elements.
    fn detect(&self, handle: &DocumentHandle) -> Result<Vec<Page>> {
        Ok((1..=handle.page_count())
            .map(|n| self.detect_page_or_empty(handle, n))
            .collect())
    }

    /// [`detect_page`](Self::detect_page), with errors and panics replaced
    /// by an empty page of the right size.
    fn detect_page_or_empty(&self, handle: &DocumentHandle, page_number: u32) -> Page {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.detect_page(handle, page_number)
        }));
        let reason = match outcome {
            Ok(Ok(page)) => return page,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "layout detection panicked".to_string(),
        };

        log::warn!(
            "{}",
            Error::PageProcessing {
                page: page_number,
                reason
            }
        );
        let (width, height) = handle.page_size(page_number).unwrap_or((612.0, 792.0));
        Page::new(page_number, width, height)
    }
}

/// Layout from the document structure: text lines, placed images and
/// stream-mode tables. Never reports formulas.
#[derive(Debug, Clone, Default)]
pub struct FallbackLayoutProvider {
    detector: TableDetector,
}

impl FallbackLayoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }
}

impl LayoutProvider for FallbackLayoutProvider {
    fn detect_page(&self, handle: &DocumentHandle, page_number: u32) -> Result<Page> {
        let content = handle.page_content(page_number)?;
        let mut page = Page::new(page_number, content.width, content.height);

        let (tables, unused) = self.detector.detect(content.spans.clone());

        for line in split_at_gutters(group_into_lines(unused)) {
            if line.text().trim().is_empty() {
                continue;
            }
            page.add_element(Element::new(ElementKind::Text, line.bbox(), TEXT_CONFIDENCE));
        }

        for placement in &content.images {
            if !is_supported(handle.lopdf(), placement.object_id) {
                log::debug!(
                    "Page {}: skipping image {:?} with unsupported encoding",
                    page_number,
                    placement.object_id
                );
                continue;
            }
            let bbox = clip_to_page(&placement.bbox, content.width, content.height);
            if bbox.area() <= 0.0 {
                continue;
            }
            page.add_element(Element::new(ElementKind::Image, bbox, IMAGE_CONFIDENCE));
        }

        for table in &tables {
            page.add_element(Element::new(
                ElementKind::Table,
                table.bbox,
                TABLE_CONFIDENCE,
            ));
        }

        log::debug!(
            "Page {}: {} text, {} image, {} table regions",
            page_number,
            page.count_of(ElementKind::Text),
            page.count_of(ElementKind::Image),
            page.count_of(ElementKind::Table)
        );

        Ok(page)
    }
}

fn clip_to_page(bbox: &BBox, width: f32, height: f32) -> BBox {
    BBox::new(
        bbox.x0.clamp(0.0, width),
        bbox.y0.clamp(0.0, height),
        bbox.x1.clamp(0.0, width),
        bbox.y1.clamp(0.0, height),
    )
}
