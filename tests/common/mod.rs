//! Builders for small in-memory PDFs used by the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// One text show at PDF user-space coordinates (bottom-left origin).
pub struct TextItem {
    pub x: i64,
    pub y: i64,
    pub text: &'static str,
}

pub fn text(x: i64, y: i64, text: &'static str) -> TextItem {
    TextItem { x, y, text }
}

/// Contents of one page.
#[derive(Default)]
pub struct PageSpec {
    pub texts: Vec<TextItem>,
    /// `(x, y, width, height)` of an RGB image painted on the page
    pub image: Option<(i64, i64, i64, i64)>,
    /// `(x, y, width, height)` of blue filled rectangles, painted first
    pub rects: Vec<(i64, i64, i64, i64)>,
}

impl PageSpec {
    pub fn with_texts(texts: Vec<TextItem>) -> Self {
        Self {
            texts,
            ..Self::default()
        }
    }

    pub fn with_image(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            image: Some((x, y, width, height)),
            ..Self::default()
        }
    }

    pub fn with_rect(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            rects: vec![(x, y, width, height)],
            ..Self::default()
        }
    }
}

fn page_operations(spec: &PageSpec) -> Vec<Operation> {
    let mut ops = Vec::new();
    for &(x, y, w, h) in &spec.rects {
        ops.push(Operation::new("rg", vec![0.into(), 0.into(), 1.into()]));
        ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), w.into(), h.into()],
        ));
        ops.push(Operation::new("f", vec![]));
    }
    for item in &spec.texts {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        ops.push(Operation::new("Td", vec![item.x.into(), item.y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(item.text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    if let Some((x, y, w, h)) = spec.image {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
        ));
        ops.push(Operation::new("Do", vec!["Im1".into()]));
        ops.push(Operation::new("Q", vec![]));
    }
    ops
}

/// A 2x2 RGB image: red, green / blue, white.
fn rgb_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
    )
}

/// Build a letter-sized PDF with the given pages.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(rgb_image());

    let mut kids = Vec::new();
    for spec in pages {
        let content = Content {
            operations: page_operations(spec),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));

        let mut resources = Dictionary::new();
        resources.set("Font", dictionary! { "F1" => font_id });
        if spec.image.is_some() {
            resources.set("XObject", dictionary! { "Im1" => image_id });
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}

/// Page 1: "Hello". Page 2: a three-row, two-column table.
pub fn hello_and_table_pdf() -> Vec<u8> {
    build_pdf(&[
        PageSpec::with_texts(vec![text(72, 700, "Hello")]),
        PageSpec::with_texts(vec![
            text(70, 700, "Name"),
            text(250, 700, "Qty"),
            text(70, 680, "Apple"),
            text(250, 680, "3"),
            text(70, 660, "Pear"),
            text(250, 660, "5"),
        ]),
    ])
}

/// One page with an image painted at (72, 600), 100 x 50 points.
pub fn image_pdf() -> Vec<u8> {
    build_pdf(&[PageSpec::with_image(72, 600, 100, 50)])
}
