//! JSON rendering.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse a document previously produced by [`to_json`].
pub fn from_json(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Element, ElementKind, Page};

    fn sample() -> Document {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.add_element(
            Element::new(ElementKind::Text, BBox::new(0.0, 0.0, 100.0, 20.0), 0.9)
                .with_content("Hello"),
        );
        doc.pages.push(page);
        doc.text = "Hello ".to_string();
        doc.refresh_metadata();
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"pageNumber\": 1"));
        assert!(json.contains("\"type\": \"text\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"bbox\":[0.0,0.0,100.0,20.0]"));
    }

    #[test]
    fn test_from_json_restores_document() {
        let doc = sample();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert_eq!(from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(from_json("{not json"), Err(Error::Render(_))));
    }
}
