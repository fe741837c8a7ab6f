//! Content-stream walk: positioned text spans, image placements and the
//! paint operations used to rasterize regions.
//!
//! Coordinates produced here are page points with a top-left origin, the
//! convention used by every layout element and bounding box in the crate.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::BBox;

/// Form XObjects nested deeper than this are not followed.
const MAX_FORM_DEPTH: usize = 8;

/// Letter size, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// A run of text drawn by a single show-text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position of the baseline, measured down from the page top
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    /// Create a new text span. The width is estimated from the character count.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Top of the glyph box (approximate ascender).
    pub fn top(&self) -> f32 {
        self.y - self.font_size * 0.8
    }

    /// Bottom of the glyph box (approximate descender).
    pub fn bottom(&self) -> f32 {
        self.y + self.font_size * 0.2
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Approximate glyph box of the span.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.top(), self.right(), self.bottom())
    }

    /// Whether the span's center lies inside `region`.
    pub fn is_inside(&self, region: &BBox) -> bool {
        let cx = self.x + self.width / 2.0;
        let cy = (self.top() + self.bottom()) / 2.0;
        region.contains_point(cx, cy)
    }
}

/// An image XObject painted on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Object holding the image stream
    pub object_id: ObjectId,
    /// Area covered on the page
    pub bbox: BBox,
    /// Maps the image unit square onto the page
    pub transform: Matrix,
}

/// Path construction step, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CurveTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// A filled and/or stroked path.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedPath {
    pub segments: Vec<PathSegment>,
    /// Fill color, when the path is filled
    pub fill: Option<[u8; 3]>,
    /// Even-odd instead of nonzero winding
    pub even_odd: bool,
    /// Stroke color, when the path is stroked
    pub stroke: Option<[u8; 3]>,
    /// Stroke width in page points
    pub line_width: f32,
}

impl PaintedPath {
    /// Box covering every point of the path, widened by half the stroke.
    pub fn bbox(&self) -> BBox {
        let (mut x0, mut y0) = (f32::MAX, f32::MAX);
        let (mut x1, mut y1) = (f32::MIN, f32::MIN);
        let mut include = |x: f32, y: f32| {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        };
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => include(x, y),
                PathSegment::CurveTo(ax, ay, bx, by, cx, cy) => {
                    include(ax, ay);
                    include(bx, by);
                    include(cx, cy);
                }
                PathSegment::Close => {}
            }
        }
        if x0 > x1 {
            return BBox::default();
        }
        let pad = if self.stroke.is_some() {
            self.line_width.max(1.0) / 2.0
        } else {
            0.0
        };
        BBox::new(x0 - pad, y0 - pad, x1 + pad, y1 + pad)
    }
}

/// One painting step, in content-stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Path(PaintedPath),
    /// Index into [`PageContent::images`]
    Image(usize),
}

/// Everything the fallback strategy reads from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text spans in content-stream order
    pub spans: Vec<TextSpan>,
    /// Image placements in content-stream order
    pub images: Vec<ImagePlacement>,
    /// Paths and images in painting order
    pub paint: Vec<PaintOp>,
}

impl PageContent {
    /// Spans whose center lies inside `region`.
    pub fn spans_in(&self, region: &BBox) -> Vec<TextSpan> {
        self.spans
            .iter()
            .filter(|s| s.is_inside(region))
            .cloned()
            .collect()
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit Y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Average linear scale factor.
    fn mean_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut v = [0.0f32; 6];
        for (slot, obj) in v.iter_mut().zip(operands) {
            *slot = get_number(obj)?;
        }
        Some(Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
    }
}

/// Read the spans and image placements of one page.
pub fn read_page(doc: &LopdfDocument, page_number: u32, page_id: ObjectId) -> Result<PageContent> {
    let media_box = page_media_box(doc, page_id);
    let width = (media_box[2] - media_box[0]).abs();
    let height = (media_box[3] - media_box[1]).abs();

    let resources = page_resources(doc, page_id);
    let content = page_content(doc, page_id)?;

    let mut walker = ContentWalker {
        doc,
        origin_x: media_box[0].min(media_box[2]),
        top_y: media_box[1].max(media_box[3]),
        spans: Vec::new(),
        images: Vec::new(),
        paint: Vec::new(),
        path: Vec::new(),
    };
    walker.walk(&content, resources, Matrix::IDENTITY, 0)?;

    log::debug!(
        "Page {}: {} spans, {} image placements, {} paint ops",
        page_number,
        walker.spans.len(),
        walker.images.len(),
        walker.paint.len()
    );

    Ok(PageContent {
        page_number,
        width,
        height,
        spans: walker.spans,
        images: walker.images,
        paint: walker.paint,
    })
}

/// Page dimensions from the (possibly inherited) MediaBox.
pub fn page_size(doc: &LopdfDocument, page_id: ObjectId) -> (f32, f32) {
    let mb = page_media_box(doc, page_id);
    ((mb[2] - mb[0]).abs(), (mb[3] - mb[1]).abs())
}

fn page_media_box(doc: &LopdfDocument, page_id: ObjectId) -> [f32; 4] {
    let Some(obj) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return DEFAULT_MEDIA_BOX;
    };
    let Ok(array) = obj.as_array() else {
        return DEFAULT_MEDIA_BOX;
    };
    if array.len() < 4 {
        return DEFAULT_MEDIA_BOX;
    }
    let mut mb = [0.0f32; 4];
    for (slot, value) in mb.iter_mut().zip(array) {
        match get_number(value) {
            Some(v) => *slot = v,
            None => return DEFAULT_MEDIA_BOX,
        }
    }
    mb
}

fn page_resources(doc: &LopdfDocument, page_id: ObjectId) -> Option<&Dictionary> {
    inherited_attribute(doc, page_id, b"Resources").and_then(|o| o.as_dict().ok())
}

/// Look up a page attribute, following the Parent chain for inherited keys.
fn inherited_attribute<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    doc.dereference(obj).ok().map(|(_, o)| o)
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        // A page without Contents is blank.
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r)? {
            Object::Stream(s) => Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone())),
            Object::Array(arr) => Ok(concat_streams(doc, arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => Ok(concat_streams(doc, arr)),
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn concat_streams(doc: &LopdfDocument, arr: &[Object]) -> Vec<u8> {
    let mut content = Vec::new();
    for obj in arr {
        if let Object::Reference(r) = obj {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                content.extend_from_slice(&data);
                content.push(b' ');
            }
        }
    }
    content
}

/// Text state that survives between BT/ET blocks.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
    fill: [u8; 3],
    stroke: [u8; 3],
    line_width: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            text: TextState::default(),
            fill: [0, 0, 0],
            stroke: [0, 0, 0],
            line_width: 1.0,
        }
    }
}

struct ContentWalker<'a> {
    doc: &'a LopdfDocument,
    origin_x: f32,
    top_y: f32,
    spans: Vec<TextSpan>,
    images: Vec<ImagePlacement>,
    paint: Vec<PaintOp>,
    /// Path under construction, already in page coordinates
    path: Vec<PathSegment>,
}

impl<'a> ContentWalker<'a> {
    fn walk(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        base_ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content = lopdf::content::Content::decode(content)?;
        let fonts = resource_fonts(self.doc, resources);

        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut gs = GraphicsState::new(base_ctm);
        let mut current = (0.0f32, 0.0f32);
        let mut subpath_start = current;
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        gs.ctm = m.concat(&gs.ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(key) = &op.operands[0] {
                            gs.text.font_key = key.clone();
                            gs.text.font_name = fonts
                                .get(key)
                                .and_then(|f| f.get(b"BaseFont").ok())
                                .and_then(|o| o.as_name_str().ok())
                                .map(String::from)
                                .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        }
                        gs.text.font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(tl) = op.operands.first().and_then(get_number) {
                        gs.text.leading = tl;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            gs.text.leading = -ty;
                        }
                        tlm = Matrix::translation(tx, ty).concat(&tlm);
                        tm = tlm;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translation(0.0, -self.leading(&gs.text)).concat(&tlm);
                    tm = tlm;
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        tlm = Matrix::translation(0.0, -self.leading(&gs.text)).concat(&tlm);
                        tm = tlm;
                    }
                    if !in_text_block {
                        continue;
                    }
                    let text = self.decode_show_text(&op.operator, &op.operands, &fonts, &gs.text);
                    if !text.trim().is_empty() {
                        self.push_span(text, &tm, &gs);
                        // Advance so consecutive shows on one line do not stack.
                        let advance = self.spans.last().map(|s| s.width).unwrap_or(0.0);
                        let scale = tm.concat(&gs.ctm).vertical_scale();
                        if scale > 0.0 {
                            tm = Matrix::translation(advance / scale, 0.0).concat(&tm);
                        }
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.paint_xobject(name, resources, gs.ctm, depth)?;
                    }
                }
                "w" => {
                    if let Some(w) = op.operands.first().and_then(get_number) {
                        gs.line_width = w;
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(rgb) = device_color(&op.operands) {
                        gs.fill = rgb;
                    }
                }
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    if let Some(rgb) = device_color(&op.operands) {
                        gs.stroke = rgb;
                    }
                }
                "cs" => gs.fill = [0, 0, 0],
                "CS" => gs.stroke = [0, 0, 0],
                "m" | "l" | "c" | "v" | "y" | "re" | "h" => {
                    let n = numbers(&op.operands);
                    let pt = |i: usize| self.to_page_point(&gs.ctm, n[i], n[i + 1]);
                    match (op.operator.as_str(), n.len()) {
                        ("m", 2..) => {
                            current = pt(0);
                            subpath_start = current;
                            self.path.push(PathSegment::MoveTo(current.0, current.1));
                        }
                        ("l", 2..) => {
                            current = pt(0);
                            self.path.push(PathSegment::LineTo(current.0, current.1));
                        }
                        ("c", 6..) => {
                            let (a, b, c) = (pt(0), pt(2), pt(4));
                            self.path.push(PathSegment::CurveTo(a.0, a.1, b.0, b.1, c.0, c.1));
                            current = c;
                        }
                        ("v", 4..) => {
                            let (b, c) = (pt(0), pt(2));
                            self.path.push(PathSegment::CurveTo(
                                current.0, current.1, b.0, b.1, c.0, c.1,
                            ));
                            current = c;
                        }
                        ("y", 4..) => {
                            let (a, c) = (pt(0), pt(2));
                            self.path.push(PathSegment::CurveTo(a.0, a.1, c.0, c.1, c.0, c.1));
                            current = c;
                        }
                        ("re", 4..) => {
                            let (x, y, w, h) = (n[0], n[1], n[2], n[3]);
                            let corners = [
                                self.to_page_point(&gs.ctm, x, y),
                                self.to_page_point(&gs.ctm, x + w, y),
                                self.to_page_point(&gs.ctm, x + w, y + h),
                                self.to_page_point(&gs.ctm, x, y + h),
                            ];
                            self.path.push(PathSegment::MoveTo(corners[0].0, corners[0].1));
                            for (cx, cy) in &corners[1..] {
                                self.path.push(PathSegment::LineTo(*cx, *cy));
                            }
                            self.path.push(PathSegment::Close);
                            current = corners[0];
                            subpath_start = current;
                        }
                        ("h", _) => {
                            self.path.push(PathSegment::Close);
                            current = subpath_start;
                        }
                        _ => {}
                    }
                }
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" => {
                    self.finish_path(&op.operator, &gs);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Close out the current path with a painting operator.
    fn finish_path(&mut self, operator: &str, gs: &GraphicsState) {
        let mut segments = std::mem::take(&mut self.path);
        if matches!(operator, "s" | "b" | "b*") {
            segments.push(PathSegment::Close);
        }
        let fills = matches!(operator, "f" | "F" | "f*" | "B" | "B*" | "b" | "b*");
        let strokes = matches!(operator, "S" | "s" | "B" | "B*" | "b" | "b*");
        if segments.is_empty() || !(fills || strokes) {
            return;
        }
        self.paint.push(PaintOp::Path(PaintedPath {
            segments,
            fill: fills.then_some(gs.fill),
            even_odd: operator.ends_with('*'),
            stroke: strokes.then_some(gs.stroke),
            line_width: gs.line_width * gs.ctm.mean_scale(),
        }));
    }

    fn leading(&self, text: &TextState) -> f32 {
        if text.leading != 0.0 {
            text.leading
        } else {
            text.font_size * 1.2
        }
    }

    fn decode_show_text(
        &self,
        operator: &str,
        operands: &[Object],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        text_state: &TextState,
    ) -> String {
        let encoding = fonts
            .get(&text_state.font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());

        let decode = |bytes: &[u8]| -> String {
            match encoding {
                Some(ref enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
                None => decode_text_simple(bytes),
            }
        };

        match operator {
            "TJ" => {
                let Some(Object::Array(arr)) = operands.first() else {
                    return String::new();
                };
                // Kerning adjustments beyond this many thousandths of an em
                // are treated as word spaces.
                let space_threshold = 200.0;
                let mut combined = String::new();
                for item in arr {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        Object::Integer(_) | Object::Real(_) => {
                            let adjustment = -get_number(item).unwrap_or(0.0);
                            if adjustment > space_threshold
                                && !combined.is_empty()
                                && !combined.ends_with(' ')
                                && !combined.ends_with('\u{00A0}')
                                && !combined
                                    .chars()
                                    .last()
                                    .map(is_spaceless_script_char)
                                    .unwrap_or(false)
                            {
                                combined.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
                combined
            }
            _ => {
                let text_idx = if operator == "\"" { 2 } else { 0 };
                match operands.get(text_idx) {
                    Some(Object::String(bytes, _)) => decode(bytes),
                    _ => String::new(),
                }
            }
        }
    }

    fn push_span(&mut self, text: String, tm: &Matrix, gs: &GraphicsState) {
        let trm = tm.concat(&gs.ctm);
        let (x, y) = trm.apply(0.0, 0.0);
        let effective_size = gs.text.font_size * trm.vertical_scale();
        let (px, py) = self.to_page(x, y);
        self.spans.push(TextSpan::new(
            text,
            px,
            py,
            effective_size,
            gs.text.font_name.clone(),
        ));
    }

    fn paint_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        let Some(xobjects) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Ok(());
        };
        let Ok(object_id) = xobjects.get(name).and_then(|o| o.as_reference()) else {
            return Ok(());
        };
        let Ok(Object::Stream(stream)) = doc.get_object(object_id) else {
            return Ok(());
        };

        match stream.dict.get(b"Subtype").and_then(|s| s.as_name_str()) {
            Ok("Image") => {
                let corners = [
                    ctm.apply(0.0, 0.0),
                    ctm.apply(1.0, 0.0),
                    ctm.apply(0.0, 1.0),
                    ctm.apply(1.0, 1.0),
                ];
                let (mut x0, mut y0) = (f32::MAX, f32::MAX);
                let (mut x1, mut y1) = (f32::MIN, f32::MIN);
                for (cx, cy) in corners {
                    let (px, py) = self.to_page(cx, cy);
                    x0 = x0.min(px);
                    y0 = y0.min(py);
                    x1 = x1.max(px);
                    y1 = y1.max(py);
                }
                let bbox = BBox::new(x0, y0, x1, y1);
                if bbox.area() > 0.0 {
                    let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, -self.origin_x, self.top_y);
                    self.paint.push(PaintOp::Image(self.images.len()));
                    self.images.push(ImagePlacement {
                        object_id,
                        bbox,
                        transform: ctm.concat(&flip),
                    });
                }
            }
            Ok("Form") if depth < MAX_FORM_DEPTH => {
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| Matrix::from_operands(arr))
                    .unwrap_or_default();
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| resolve(doc, o))
                    .and_then(|o| o.as_dict().ok())
                    .or(resources);
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                self.walk(&data, form_resources, form_matrix.concat(&ctm), depth + 1)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Device space (bottom-left origin) to page space (top-left origin).
    fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.origin_x, self.top_y - y)
    }

    /// User space point under `ctm` to page space.
    fn to_page_point(&self, ctm: &Matrix, x: f32, y: f32) -> (f32, f32) {
        let (dx, dy) = ctm.apply(x, y);
        self.to_page(dx, dy)
    }
}

fn numbers(operands: &[Object]) -> Vec<f32> {
    operands.iter().filter_map(get_number).collect()
}

/// RGB for a gray, RGB or CMYK operand list. Pattern and other operand
/// shapes leave the color unchanged.
fn device_color(operands: &[Object]) -> Option<[u8; 3]> {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    match *numbers(operands).as_slice() {
        [g] => Some([to_byte(g); 3]),
        [r, g, b] => Some([to_byte(r), to_byte(g), to_byte(b)]),
        [c, m, y, k] => Some([
            to_byte((1.0 - c) * (1.0 - k)),
            to_byte((1.0 - m) * (1.0 - k)),
            to_byte((1.0 - y) * (1.0 - k)),
        ]),
        _ => None,
    }
}

fn resource_fonts<'a>(
    doc: &'a LopdfDocument,
    resources: Option<&'a Dictionary>,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    let mut fonts = BTreeMap::new();
    let Some(font_dict) = resources
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return fonts;
    };
    for (key, value) in font_dict.iter() {
        if let Some(Ok(dict)) = resolve(doc, value).map(|o| o.as_dict()) {
            fonts.insert(key.clone(), dict);
        }
    }
    fonts
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
