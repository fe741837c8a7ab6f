//! Low-level PDF reading: content-stream walking, line grouping, table
//! detection, raster decoding, region rendering and text cleanup.

mod cleanup;
mod content;
mod lines;
mod raster;
mod region;
mod table_detector;

pub use cleanup::clean_text;
pub use content::{
    page_size, read_page, ImagePlacement, Matrix, PageContent, PaintOp, PaintedPath, PathSegment,
    TextSpan,
};
pub use lines::{group_into_lines, lines_to_text, split_at_gutters, TextLine};
pub use raster::{cmyk_to_rgb, color_model, decode_image, is_supported, ColorModel};
pub use region::render_region;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRow};
