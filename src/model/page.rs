//! Page-level types: pages, layout elements and bounding boxes.

use serde::{Deserialize, Serialize};

/// A single page of an extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Detected layout elements, in detection order
    pub elements: Vec<Element>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(page_number: u32) -> Self {
        Self::new(page_number, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Add an element to the page.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Count elements of a given kind.
    pub fn count_of(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

/// A detected layout region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// What the region contains
    #[serde(rename = "type")]
    pub kind: ElementKind,

    /// Region bounds in page coordinates (top-left origin)
    pub bbox: BBox,

    /// Detection confidence in [0, 1]
    pub confidence: f32,

    /// Short content summary, set only when the region was extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Element {
    /// Create an element; the confidence is clamped into [0, 1].
    pub fn new(kind: ElementKind, bbox: BBox, confidence: f32) -> Self {
        Self {
            kind,
            bbox,
            confidence: clamp_confidence(confidence),
            content: None,
        }
    }

    /// Set the content summary and return self.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Clamp a confidence into [0, 1], mapping NaN to 0.
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Kind of layout element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Running text
    Text,
    /// Document or section title
    Title,
    /// Page header
    Header,
    /// Tabular region
    Table,
    /// Mathematical formula
    Formula,
    /// Raster image
    Image,
    /// Figure (chart, diagram)
    Figure,
}

impl ElementKind {
    /// All kinds, in declaration order.
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Text,
        ElementKind::Title,
        ElementKind::Header,
        ElementKind::Table,
        ElementKind::Formula,
        ElementKind::Image,
        ElementKind::Figure,
    ];

    /// Lowercase name, as used on the wire and in identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Title => "title",
            ElementKind::Header => "header",
            ElementKind::Table => "table",
            ElementKind::Formula => "formula",
            ElementKind::Image => "image",
            ElementKind::Figure => "figure",
        }
    }

    /// Whether this kind carries running text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ElementKind::Text | ElementKind::Title | ElementKind::Header
        )
    }

    /// Whether this kind carries a raster.
    pub fn is_visual(&self) -> bool {
        matches!(self, ElementKind::Image | ElementKind::Figure)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::Error::InvalidOption(format!("element type '{}'", s)))
    }
}

/// Axis-aligned rectangle `(x0, y0, x1, y1)` with `x0 <= x1` and `y0 <= y1`.
///
/// Serialized as a four-number array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a box from two corners in any order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection of two boxes, if they overlap with positive area.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);
        if x1 > x0 && y1 > y0 {
            Some(BBox { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Area shared with `other` (0 when disjoint).
    pub fn overlap_area(&self, other: &BBox) -> f32 {
        self.intersection(other).map(|b| b.area()).unwrap_or(0.0)
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Build the identifier of an extracted entity: `{type}_{page}_{x0}_{y0}`,
/// with the coordinates floored to integers.
pub fn region_id(kind: &str, page_number: u32, bbox: &BBox) -> String {
    format!(
        "{}_{}_{}_{}",
        kind,
        page_number,
        bbox.x0.floor() as i64,
        bbox.y0.floor() as i64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(1, 612.0, 792.0);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.dimensions(), (612.0, 792.0));
        assert!(page.is_empty());
    }

    #[test]
    fn test_bbox_normalizes_corners() {
        let b = BBox::new(100.0, 50.0, 10.0, 5.0);
        assert_eq!(b, BBox::new(10.0, 5.0, 100.0, 50.0));
        assert_eq!(b.width(), 90.0);
        assert_eq!(b.height(), 45.0);
    }

    #[test]
    fn test_bbox_serializes_as_array() {
        let b = BBox::new(0.0, 0.0, 100.0, 20.0);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[0.0,0.0,100.0,20.0]");
        let back: BBox = serde_json::from_str("[5, 6, 1, 2]").unwrap();
        assert_eq!(back, BBox::new(1.0, 2.0, 5.0, 6.0));
    }

    #[test]
    fn test_bbox_overlap() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.overlap_area(&b), 25.0);
        assert!(a.intersection(&c).is_none());
        assert_eq!(a.union(&c), BBox::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn test_element_serialization() {
        let el = Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 100.0, 20.0), 1.4);
        assert_eq!(el.confidence, 1.0);
        let json = serde_json::to_string(&el).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(!json.contains("content"));

        let el = el.with_content("Hello");
        let json = serde_json::to_string(&el).unwrap();
        assert!(json.contains("\"content\":\"Hello\""));
    }

    #[test]
    fn test_element_kind_parse() {
        assert_eq!("Figure".parse::<ElementKind>().unwrap(), ElementKind::Figure);
        assert!("paragraph".parse::<ElementKind>().is_err());
        assert!(ElementKind::Header.is_textual());
        assert!(ElementKind::Figure.is_visual());
    }

    #[test]
    fn test_region_id_floors_coordinates() {
        let b = BBox::new(12.9, 40.2, 100.0, 80.0);
        assert_eq!(region_id("table", 3, &b), "table_3_12_40");
    }

    #[test]
    fn test_bbox_is_finite() {
        assert!(BBox::new(0.0, 0.0, 1.0, 1.0).is_finite());
        let nan = BBox {
            x0: f32::NAN,
            ..BBox::default()
        };
        assert!(!nan.is_finite());
        assert!(!BBox::new(0.0, 0.0, f32::INFINITY, 1.0).is_finite());
    }

    #[test]
    fn test_clamp_confidence_nan() {
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
        assert_eq!(clamp_confidence(-0.5), 0.0);
    }
}
