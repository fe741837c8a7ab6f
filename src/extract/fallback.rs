//! Structure-based extractors used when no model suite is available.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};

use super::{
    FormulaContent, FormulaExtractor, ImageContent, ImageExtractor, TableContent, TableExtractor,
    TextContent, TextExtractor,
};
use crate::error::{Error, Result};
use crate::handle::DocumentHandle;
use crate::model::{BBox, ElementKind, ImageKind};
use crate::parser::{
    clean_text, group_into_lines, lines_to_text, render_region, TableDetector, TableDetectorConfig,
};
use crate::render::{table_to_html, table_to_markdown};

/// Output pixels per region point.
pub const IMAGE_SCALE: f32 = 2.0;

/// Longest side of an extracted raster, in pixels.
const MAX_OUTPUT_SIDE: u32 = 8192;

const TEXT_CONFIDENCE: f32 = 0.9;
const TABLE_CONFIDENCE: f32 = 0.8;
const IMAGE_CONFIDENCE: f32 = 0.8;

/// Text from the content stream spans inside the region.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTextExtractor;

impl TextExtractor for FallbackTextExtractor {
    fn extract_text(&self, handle: &DocumentHandle, page: u32, bbox: &BBox) -> Result<TextContent> {
        let content = handle.page_content(page)?;
        let lines = group_into_lines(content.spans_in(bbox));
        let text = clean_text(&lines_to_text(&lines));
        let confidence = if text.is_empty() { 0.0 } else { TEXT_CONFIDENCE };
        Ok(TextContent { text, confidence })
    }
}

/// Table grid built from the spans inside the region.
#[derive(Debug, Clone, Default)]
pub struct FallbackTableExtractor {
    detector: TableDetector,
}

impl FallbackTableExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self {
            detector: TableDetector::with_config(config),
        }
    }
}

impl TableExtractor for FallbackTableExtractor {
    fn extract_table(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<TableContent> {
        let content = handle.page_content(page)?;
        let mut spans = content.spans_in(bbox);
        for span in &mut spans {
            span.text = clean_text(&span.text);
        }

        let mut rows = self.detector.grid(&spans).into_iter();
        let Some(headers) = rows.next() else {
            return Err(Error::RegionExtraction {
                page,
                kind: ElementKind::Table,
                reason: "no text inside table region".to_string(),
            });
        };
        let data: Vec<Vec<String>> = rows.collect();

        Ok(TableContent {
            html: table_to_html(&headers, &data),
            markdown: table_to_markdown(&headers, &data),
            headers,
            data,
            confidence: TABLE_CONFIDENCE,
        })
    }
}

/// No formula recognition without a model; always a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackFormulaExtractor;

impl FormulaExtractor for FallbackFormulaExtractor {
    fn extract_formula(
        &self,
        _handle: &DocumentHandle,
        _page: u32,
        _bbox: &BBox,
    ) -> Result<FormulaContent> {
        Ok(FormulaContent::placeholder())
    }
}

/// Renders the region's paths and images.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackImageExtractor;

impl ImageExtractor for FallbackImageExtractor {
    fn extract_image(
        &self,
        handle: &DocumentHandle,
        page: u32,
        bbox: &BBox,
    ) -> Result<ImageContent> {
        rasterize_region(handle, page, bbox, ImageKind::Photo, IMAGE_CONFIDENCE)
    }
}

/// Render the paths and images inside `bbox` at [`IMAGE_SCALE`] pixels per
/// point and encode the result as PNG.
pub(crate) fn rasterize_region(
    handle: &DocumentHandle,
    page: u32,
    bbox: &BBox,
    kind: ImageKind,
    confidence: f32,
) -> Result<ImageContent> {
    let content = handle.page_content(page)?;
    let out_w = ((bbox.width() * IMAGE_SCALE).round() as u32).clamp(1, MAX_OUTPUT_SIDE);
    let out_h = ((bbox.height() * IMAGE_SCALE).round() as u32).clamp(1, MAX_OUTPUT_SIDE);

    let image = render_region(handle.lopdf(), &content, bbox, out_w, out_h)?.ok_or_else(|| {
        Error::RegionExtraction {
            page,
            kind: ElementKind::Image,
            reason: "nothing painted inside the region".to_string(),
        }
    })?;

    let mut data = Vec::new();
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)?;

    log::debug!(
        "Page {}: rasterized {:?} to {}x{}",
        page,
        bbox,
        out_w,
        out_h
    );

    Ok(ImageContent {
        data,
        kind,
        width: Some(out_w),
        height: Some(out_h),
        confidence,
    })
}
