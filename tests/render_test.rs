//! Integration tests for the output renderers.

use extractkit::render::{from_json, render, table_to_html, table_to_markdown, to_json};
use extractkit::{
    BBox, Document, Element, ElementKind, ExtractionMethod, Formula, FormulaKind, Image,
    ImageKind, JsonFormat, OutputFormat, Page, Table,
};

fn full_document() -> Document {
    let headers = vec!["A".to_string(), "B".to_string()];
    let data = vec![vec!["1".to_string(), "2".to_string()]];

    let mut page = Page::new(1, 595.0, 842.0);
    page.add_element(
        Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 100.0, 20.0), 0.9)
            .with_content("Hello <world>"),
    );
    page.add_element(
        Element::new(ElementKind::Table, BBox::new(0.0, 30.0, 200.0, 90.0), 0.8)
            .with_content("Table with 1 rows"),
    );
    page.add_element(Element::new(
        ElementKind::Figure,
        BBox::new(0.0, 100.0, 50.0, 150.0),
        0.7,
    ));

    let mut doc = Document::new();
    doc.text = "Hello <world> ".to_string();
    doc.pages.push(page);
    doc.tables.push(Table {
        id: "table_1_0_30".to_string(),
        bbox: BBox::new(0.0, 30.0, 200.0, 90.0),
        html: table_to_html(&headers, &data),
        markdown: table_to_markdown(&headers, &data),
        data,
        headers,
        confidence: 0.8,
        page_number: 1,
    });
    doc.formulas.push(Formula {
        id: "formula_1_10_200".to_string(),
        bbox: BBox::new(10.0, 200.0, 300.0, 230.0),
        kind: FormulaKind::Inline,
        latex: "x^2".to_string(),
        confidence: 0.85,
        page_number: 1,
    });
    doc.images.push(Image {
        id: "image_1_0_100".to_string(),
        bbox: BBox::new(0.0, 100.0, 50.0, 150.0),
        data: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        mime_type: "image/png".to_string(),
        kind: ImageKind::Figure,
        confidence: 0.95,
        page_number: 1,
        width: Some(100),
        height: Some(100),
    });
    doc.metadata.extraction_method = ExtractionMethod::Model;
    doc.refresh_metadata();
    doc
}

#[test]
fn test_json_round_trip() {
    let doc = full_document();
    for format in [JsonFormat::Pretty, JsonFormat::Compact] {
        let json = to_json(&doc, format).unwrap();
        assert_eq!(from_json(&json).unwrap(), doc);
    }
}

#[test]
fn test_json_wire_names() {
    let json = to_json(&full_document(), JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metadata"]["totalPages"], 1);
    assert_eq!(value["metadata"]["totalTables"], 1);
    assert_eq!(value["metadata"]["totalImages"], 1);
    assert_eq!(value["metadata"]["totalFormulas"], 1);
    assert_eq!(value["metadata"]["extractionMethod"], "model");
    assert_eq!(value["pages"][0]["pageNumber"], 1);
    assert_eq!(value["pages"][0]["elements"][0]["type"], "text");
    assert!(value["pages"][0]["elements"][2].get("content").is_none());
    assert_eq!(value["formulas"][0]["type"], "inline");
    assert_eq!(value["images"][0]["type"], "figure");
    assert_eq!(value["images"][0]["base64"], "iVBORw0KGgo=");
    assert_eq!(value["images"][0]["mimeType"], "image/png");
    assert_eq!(value["tables"][0]["bbox"], serde_json::json!([0.0, 30.0, 200.0, 90.0]));
}

#[test]
fn test_html_structure() {
    let html = render(&full_document(), OutputFormat::Html).unwrap();
    assert!(html.starts_with("<html><body><h1>Extracted Document</h1><p>Pages: 1</p>"));
    assert!(html.contains("<h2>Text Content</h2><p>Hello &lt;world&gt; </p>"));
    assert!(html.contains("<h2>Tables (1)</h2><table>"));
    assert!(html.ends_with("</body></html>"));
    assert!(!html.contains("x^2"));
}

#[test]
fn test_markdown_structure() {
    let md = render(&full_document(), OutputFormat::Markdown).unwrap();
    assert_eq!(
        md,
        "# Extracted Document\n\n**Pages:** 1\n\n\
         ## Text Content\n\nHello <world> \n\n\
         ## Tables (1)\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n"
    );
}

#[test]
fn test_empty_document_renders() {
    let doc = Document::new();
    let md = render(&doc, OutputFormat::Markdown).unwrap();
    assert_eq!(md, "# Extracted Document\n\n**Pages:** 0\n\n");
    let html = render(&doc, OutputFormat::Html).unwrap();
    assert!(!html.contains("<h2>"));
    let json = render(&doc, OutputFormat::Json).unwrap();
    assert_eq!(from_json(&json).unwrap(), doc);
}
