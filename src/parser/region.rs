//! Rasterization of a page region from its paint operations.
//!
//! Paths and image XObjects are painted with tiny-skia onto a white canvas
//! covering only the requested region. Glyphs are not drawn.

use image::{DynamicImage, RgbaImage};
use lopdf::Document as LopdfDocument;
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use super::content::{Matrix, PageContent, PaintOp, PaintedPath, PathSegment};
use super::raster::decode_image;
use crate::error::{Error, Result};
use crate::model::BBox;

/// Render `region` into a `width` x `height` raster.
///
/// Returns `Ok(None)` when no path or image touches the region.
pub fn render_region(
    doc: &LopdfDocument,
    content: &PageContent,
    region: &BBox,
    width: u32,
    height: u32,
) -> Result<Option<DynamicImage>> {
    if region.width() <= 0.0 || region.height() <= 0.0 {
        return Ok(None);
    }
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("cannot allocate {}x{} canvas", width, height)))?;
    pixmap.fill(Color::WHITE);

    let sx = width as f32 / region.width();
    let sy = height as f32 / region.height();
    let base = Transform::from_row(sx, 0.0, 0.0, sy, -region.x0 * sx, -region.y0 * sy);

    let mut painted = 0usize;
    for op in &content.paint {
        match op {
            PaintOp::Path(path) => {
                if path.bbox().intersection(region).is_some()
                    && paint_path(&mut pixmap, path, base)
                {
                    painted += 1;
                }
            }
            PaintOp::Image(index) => {
                let Some(placement) = content.images.get(*index) else {
                    continue;
                };
                if placement.bbox.intersection(region).is_none() {
                    continue;
                }
                match decode_image(doc, placement.object_id) {
                    Ok(Some(image)) => {
                        if draw_image(&mut pixmap, &image, &placement.transform, base) {
                            painted += 1;
                        }
                    }
                    Ok(None) => log::debug!(
                        "Image {:?} has an unsupported encoding; not drawn",
                        placement.object_id
                    ),
                    Err(e) => log::warn!("Image {:?} not drawn: {}", placement.object_id, e),
                }
            }
        }
    }

    if painted == 0 {
        return Ok(None);
    }
    log::trace!("Rendered {:?} from {} paint ops", region, painted);

    // The canvas is opaque, so premultiplied and straight alpha agree.
    let rgba = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| Error::Render("canvas size mismatch".to_string()))?;
    Ok(Some(DynamicImage::ImageRgba8(rgba)))
}

fn solid(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = true;
    paint
}

fn paint_path(pixmap: &mut Pixmap, path: &PaintedPath, transform: Transform) -> bool {
    let mut builder = PathBuilder::new();
    for segment in &path.segments {
        match *segment {
            PathSegment::MoveTo(x, y) => builder.move_to(x, y),
            PathSegment::LineTo(x, y) => builder.line_to(x, y),
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                builder.cubic_to(x1, y1, x2, y2, x3, y3)
            }
            PathSegment::Close => builder.close(),
        }
    }
    let Some(skia_path) = builder.finish() else {
        return false;
    };

    if let Some(rgb) = path.fill {
        let rule = if path.even_odd {
            FillRule::EvenOdd
        } else {
            FillRule::Winding
        };
        pixmap.fill_path(&skia_path, &solid(rgb), rule, transform, None);
    }
    if let Some(rgb) = path.stroke {
        let stroke = Stroke {
            width: path.line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&skia_path, &solid(rgb), &stroke, transform, None);
    }
    true
}

fn draw_image(
    pixmap: &mut Pixmap,
    image: &DynamicImage,
    placement: &Matrix,
    base: Transform,
) -> bool {
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let Some(source) =
        IntSize::from_wh(w, h).and_then(|size| Pixmap::from_vec(rgba.into_raw(), size))
    else {
        return false;
    };

    // Pixel rows run top-down; the unit square's origin is bottom-left.
    let unit = Matrix::new(1.0 / w as f32, 0.0, 0.0, -1.0 / h as f32, 0.0, 1.0);
    let m = unit.concat(placement);
    let transform = base.pre_concat(Transform::from_row(m.a, m.b, m.c, m.d, m.e, m.f));

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    true
}
