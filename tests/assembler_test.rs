//! Integration tests for document assembly with mock capability providers.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use extractkit::extract::{FormulaContent, ImageContent, TableContent, TextContent};
use extractkit::render::{from_json, to_json};
use extractkit::{
    BBox, DocumentAssembler, DocumentHandle, Element, ElementKind, Error, ExtractFlags,
    ExtractOptions, ExtractionMethod, ExtractorSet, FormulaExtractor, FormulaKind, ImageKind,
    JsonFormat, LayoutDetector, ModelSuite, Result, TableExtractor, TextExtractor,
};

/// Layout detector returning canned elements per page.
struct MockLayout {
    pages: HashMap<u32, Vec<Element>>,
}

impl LayoutDetector for MockLayout {
    fn detect_page(&self, _handle: &DocumentHandle, page_number: u32) -> Result<Vec<Element>> {
        Ok(self.pages.get(&page_number).cloned().unwrap_or_default())
    }
}

struct MockText;

impl TextExtractor for MockText {
    fn extract_text(&self, _h: &DocumentHandle, page: u32, _bbox: &BBox) -> Result<TextContent> {
        Ok(TextContent {
            text: if page == 1 { "Hello" } else { "World" }.to_string(),
            confidence: 0.9,
        })
    }
}

struct MockTable;

impl TableExtractor for MockTable {
    fn extract_table(&self, _h: &DocumentHandle, _p: u32, _b: &BBox) -> Result<TableContent> {
        Ok(TableContent {
            headers: vec!["A".to_string(), "B".to_string()],
            data: vec![vec!["1".to_string(), "2".to_string()]],
            html: "<table></table>".to_string(),
            markdown: "| A | B |".to_string(),
            confidence: 0.95,
        })
    }
}

struct FailingTable;

impl TableExtractor for FailingTable {
    fn extract_table(&self, _h: &DocumentHandle, page: u32, _b: &BBox) -> Result<TableContent> {
        Err(Error::RegionExtraction {
            page,
            kind: ElementKind::Table,
            reason: "model rejected region".to_string(),
        })
    }
}

struct MockFormula;

impl FormulaExtractor for MockFormula {
    fn extract_formula(
        &self,
        _h: &DocumentHandle,
        _p: u32,
        _b: &BBox,
    ) -> Result<FormulaContent> {
        Ok(FormulaContent {
            latex: "E = mc^2".to_string(),
            confidence: 0.85,
        })
    }
}

struct PanickingFormula;

impl FormulaExtractor for PanickingFormula {
    fn extract_formula(
        &self,
        _h: &DocumentHandle,
        _p: u32,
        _b: &BBox,
    ) -> Result<FormulaContent> {
        panic!("recognizer crashed")
    }
}

fn suite(
    pages: HashMap<u32, Vec<Element>>,
    table: Arc<dyn TableExtractor>,
    formula: Arc<dyn FormulaExtractor>,
) -> ExtractorSet {
    ExtractorSet::from_suite(ModelSuite {
        layout: Arc::new(MockLayout { pages }),
        text: Arc::new(MockText),
        table,
        formula,
    })
}

fn blank_handle(pages: usize) -> DocumentHandle {
    let specs: Vec<common::PageSpec> = (0..pages).map(|_| common::PageSpec::default()).collect();
    DocumentHandle::from_bytes(&common::build_pdf(&specs)).unwrap()
}

fn hello_and_table_layout() -> HashMap<u32, Vec<Element>> {
    HashMap::from([
        (
            1,
            vec![Element::new(
                ElementKind::Text,
                BBox::new(0.0, 0.0, 100.0, 20.0),
                0.9,
            )],
        ),
        (
            2,
            vec![Element::new(
                ElementKind::Table,
                BBox::new(10.5, 40.9, 300.0, 200.0),
                0.95,
            )],
        ),
    ])
}

#[test]
fn test_two_page_text_and_table() {
    let handle = blank_handle(2);
    let set = suite(
        hello_and_table_layout(),
        Arc::new(MockTable),
        Arc::new(MockFormula),
    );
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.text, "Hello ");
    assert_eq!(doc.tables.len(), 1);
    assert_eq!(doc.tables[0].headers, vec!["A", "B"]);
    assert_eq!(doc.tables[0].data, vec![vec!["1", "2"]]);
    assert_eq!(doc.tables[0].id, "table_2_10_40");
    assert_eq!(doc.tables[0].page_number, 2);
    assert_eq!(doc.metadata.total_tables, 1);
    assert_eq!(doc.metadata.total_pages, 2);
    assert_eq!(doc.metadata.text_length, 6);
    assert_eq!(doc.metadata.extraction_method, ExtractionMethod::Model);
    assert!(!doc.metadata.timed_out);

    assert_eq!(doc.pages[0].elements[0].content.as_deref(), Some("Hello"));
    assert_eq!(
        doc.pages[1].elements[0].content.as_deref(),
        Some("Table with 1 rows")
    );
}

#[test]
fn test_page_numbers_are_contiguous() {
    let handle = blank_handle(5);
    let set = suite(HashMap::new(), Arc::new(MockTable), Arc::new(MockFormula));
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    let numbers: Vec<u32> = doc.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(doc.metadata.total_pages, 5);
    assert_eq!(doc.pages[0].dimensions(), (612.0, 792.0));
}

#[test]
fn test_disabled_images_are_not_dispatched() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![
            Element::new(ElementKind::Image, BBox::new(0.0, 0.0, 50.0, 50.0), 0.7),
            Element::new(ElementKind::Figure, BBox::new(0.0, 60.0, 50.0, 90.0), 0.7),
            Element::new(ElementKind::Title, BBox::new(0.0, 100.0, 50.0, 120.0), 0.8),
        ],
    )]);
    let set = suite(layout, Arc::new(MockTable), Arc::new(MockFormula));
    let options = ExtractOptions::new().extract_images(false);
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert!(doc.images.is_empty());
    let elements = &doc.pages[0].elements;
    assert!(elements[0].content.is_none());
    assert!(elements[1].content.is_none());
    assert_eq!(elements[2].content.as_deref(), Some("Hello"));
    assert_eq!(doc.text, "Hello ");
}

#[test]
fn test_failed_regions_become_placeholders() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![
            Element::new(ElementKind::Table, BBox::new(0.0, 0.0, 100.0, 100.0), 0.9),
            Element::new(ElementKind::Formula, BBox::new(0.0, 200.0, 300.0, 280.0), 0.9),
            Element::new(ElementKind::Formula, BBox::new(0.0, 300.0, 300.0, 320.0), 0.9),
            Element::new(ElementKind::Image, BBox::new(0.0, 400.0, 100.0, 500.0), 0.9),
        ],
    )]);
    let set = suite(layout, Arc::new(FailingTable), Arc::new(PanickingFormula));
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.tables.len(), 1);
    assert_eq!(doc.tables[0].confidence, 0.0);
    assert!(doc.tables[0].data.is_empty());
    assert!(doc.tables[0].html.is_empty());

    assert_eq!(doc.formulas.len(), 2);
    assert!(doc.formulas.iter().all(|f| f.latex.is_empty() && f.confidence == 0.0));
    assert_eq!(doc.formulas[0].kind, FormulaKind::Block);
    assert_eq!(doc.formulas[1].kind, FormulaKind::Inline);

    // No embedded image on a blank page
    assert_eq!(doc.images.len(), 1);
    assert!(doc.images[0].data.is_empty());
    assert_eq!(doc.images[0].kind, ImageKind::Unknown);
    assert_eq!(doc.images[0].confidence, 0.0);
    assert_eq!(doc.images[0].mime_type, "application/octet-stream");

    assert_eq!(doc.metadata.total_formulas, 2);
    assert_eq!(doc.metadata.total_images, 1);
}

#[test]
fn test_expired_deadline_leaves_elements_undispatched() {
    let handle = blank_handle(2);
    let set = suite(
        hello_and_table_layout(),
        Arc::new(MockTable),
        Arc::new(MockFormula),
    );
    let options = ExtractOptions::new().with_timeout(Duration::ZERO);
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert!(doc.metadata.timed_out);
    assert!(doc.text.is_empty());
    assert!(doc.tables.is_empty());
    assert_eq!(doc.metadata.total_pages, 2);
    for page in &doc.pages {
        for element in &page.elements {
            assert_eq!(element.confidence, 0.0);
            assert!(element.content.is_none());
        }
    }
}

#[test]
fn test_ids_follow_scheme_and_may_collide() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![
            Element::new(ElementKind::Formula, BBox::new(12.7, 30.2, 80.0, 40.0), 0.9),
            Element::new(ElementKind::Formula, BBox::new(12.1, 30.9, 90.0, 45.0), 0.9),
        ],
    )]);
    let set = suite(layout, Arc::new(MockTable), Arc::new(MockFormula));
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.formulas[0].id, "formula_1_12_30");
    assert_eq!(doc.formulas[1].id, "formula_1_12_30");
    assert_eq!(doc.formulas[0].latex, "E = mc^2");
    assert_eq!(doc.pages[0].elements[0].content.as_deref(), Some("E = mc^2"));
}

#[test]
fn test_parallel_matches_sequential() {
    let handle = blank_handle(4);
    let layout: HashMap<u32, Vec<Element>> = (1..=4)
        .map(|n| {
            (
                n,
                vec![
                    Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 10.0, 10.0), 0.9),
                    Element::new(ElementKind::Table, BBox::new(0.0, n as f32, 10.0, 20.0), 0.9),
                ],
            )
        })
        .collect();
    let set = suite(layout, Arc::new(MockTable), Arc::new(MockFormula));

    let parallel_options = ExtractOptions::new().with_max_workers(3);
    let sequential_options = ExtractOptions::new().sequential();
    let parallel = DocumentAssembler::new(&set, &parallel_options)
        .process(&handle)
        .unwrap();
    let sequential = DocumentAssembler::new(&set, &sequential_options)
        .process(&handle)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.text, "Hello World World World ");
    let ids: Vec<&str> = parallel.tables.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["table_1_0_1", "table_2_0_2", "table_3_0_3", "table_4_0_4"]);
}

#[test]
fn test_model_confidences_are_clamped() {
    let handle = blank_handle(1);
    let mut wild = Element::new(ElementKind::Text, BBox::default(), 0.5);
    wild.bbox = BBox {
        x0: 50.0,
        y0: 50.0,
        x1: 0.0,
        y1: 0.0,
    };
    wild.confidence = 1.7;
    let layout = HashMap::from([(1, vec![wild])]);
    let set = suite(layout, Arc::new(MockTable), Arc::new(MockFormula));
    let options = ExtractOptions::new().with_flags(ExtractFlags {
        text: false,
        ..ExtractFlags::default()
    });
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    let element = &doc.pages[0].elements[0];
    assert_eq!(element.confidence, 1.0);
    assert_eq!(element.bbox, BBox::new(0.0, 0.0, 50.0, 50.0));
    assert!(element.content.is_none());
}

#[test]
fn test_image_placeholder_when_nothing_painted() {
    let handle = blank_handle(1);
    let content = ExtractorSet::fallback().image(&handle, 1, &BBox::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(content, ImageContent::placeholder());

    // the model image extractor behaves the same when nothing is there
    let set = suite(HashMap::new(), Arc::new(MockTable), Arc::new(MockFormula));
    let content = set.image(&handle, 1, &BBox::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(content.confidence, 0.0);
}

struct NanTable;

impl TableExtractor for NanTable {
    fn extract_table(&self, _h: &DocumentHandle, _p: u32, _b: &BBox) -> Result<TableContent> {
        Ok(TableContent {
            confidence: f32::NAN,
            ..TableContent::placeholder()
        })
    }
}

struct OverconfidentFormula;

impl FormulaExtractor for OverconfidentFormula {
    fn extract_formula(
        &self,
        _h: &DocumentHandle,
        _p: u32,
        _b: &BBox,
    ) -> Result<FormulaContent> {
        Ok(FormulaContent {
            latex: "x^2".to_string(),
            confidence: 1.7,
        })
    }
}

#[test]
fn test_extractor_confidences_are_clamped_and_round_trip() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![
            Element::new(ElementKind::Table, BBox::new(0.0, 0.0, 100.0, 100.0), 0.9),
            Element::new(ElementKind::Formula, BBox::new(0.0, 200.0, 100.0, 210.0), 0.9),
        ],
    )]);
    let set = suite(layout, Arc::new(NanTable), Arc::new(OverconfidentFormula));
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.tables[0].confidence, 0.0);
    assert_eq!(doc.formulas[0].confidence, 1.0);

    let json = to_json(&doc, JsonFormat::Compact).unwrap();
    assert_eq!(from_json(&json).unwrap(), doc);
}

/// Layout detector emitting one region with a NaN corner.
struct NanLayout;

impl LayoutDetector for NanLayout {
    fn detect_page(&self, _handle: &DocumentHandle, _page: u32) -> Result<Vec<Element>> {
        let mut broken = Element::new(ElementKind::Text, BBox::default(), 0.9);
        broken.bbox.x1 = f32::NAN;
        Ok(vec![
            broken,
            Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 100.0, 20.0), 0.9),
        ])
    }
}

#[test]
fn test_non_finite_model_regions_are_dropped() {
    let handle = blank_handle(1);
    let set = ExtractorSet::from_suite(ModelSuite {
        layout: Arc::new(NanLayout),
        text: Arc::new(MockText),
        table: Arc::new(MockTable),
        formula: Arc::new(MockFormula),
    });
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.pages[0].elements.len(), 1);
    assert_eq!(doc.pages[0].elements[0].bbox, BBox::new(0.0, 0.0, 100.0, 20.0));
    let json = to_json(&doc, JsonFormat::Pretty).unwrap();
    assert!(from_json(&json).is_ok());
}

/// Text extractor returning text only for regions near the page top.
struct TopOnlyText;

impl TextExtractor for TopOnlyText {
    fn extract_text(&self, _h: &DocumentHandle, _p: u32, bbox: &BBox) -> Result<TextContent> {
        let text = if bbox.y0 < 50.0 { "Hello" } else { "" };
        Ok(TextContent {
            text: text.to_string(),
            confidence: 0.9,
        })
    }
}

#[test]
fn test_empty_text_still_gets_separator() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![
            Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 100.0, 20.0), 0.9),
            Element::new(ElementKind::Text, BBox::new(0.0, 300.0, 100.0, 320.0), 0.9),
        ],
    )]);
    let set = ExtractorSet::from_suite(ModelSuite {
        layout: Arc::new(MockLayout { pages: layout }),
        text: Arc::new(TopOnlyText),
        table: Arc::new(MockTable),
        formula: Arc::new(MockFormula),
    });
    let options = ExtractOptions::default();
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert_eq!(doc.text, "Hello  ");
    assert_eq!(doc.metadata.text_length, 7);
    assert_eq!(doc.pages[0].elements[1].content.as_deref(), Some(""));
}

#[test]
fn test_deadline_ignores_disabled_kinds() {
    let handle = blank_handle(1);
    let layout = HashMap::from([(
        1,
        vec![Element::new(
            ElementKind::Image,
            BBox::new(0.0, 0.0, 50.0, 50.0),
            0.7,
        )],
    )]);
    let set = suite(layout, Arc::new(MockTable), Arc::new(MockFormula));
    let options = ExtractOptions::new()
        .extract_images(false)
        .with_timeout(Duration::ZERO);
    let doc = DocumentAssembler::new(&set, &options)
        .process(&handle)
        .unwrap();

    assert!(!doc.metadata.timed_out);
    assert_eq!(doc.pages[0].elements[0].confidence, 0.7);
    assert!(doc.images.is_empty());
}
