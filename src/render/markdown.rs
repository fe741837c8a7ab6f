//! Markdown rendering.

use crate::model::Document;

/// Convert a document to Markdown.
///
/// Same structure as the HTML output: page count, running text, then each
/// table's pre-rendered Markdown.
pub fn to_markdown(doc: &Document) -> String {
    let mut output = String::from("# Extracted Document\n\n");
    output.push_str(&format!("**Pages:** {}\n\n", doc.metadata.total_pages));

    if !doc.text.is_empty() {
        output.push_str("## Text Content\n\n");
        output.push_str(&doc.text);
        output.push_str("\n\n");
    }

    if !doc.tables.is_empty() {
        output.push_str(&format!("## Tables ({})\n\n", doc.tables.len()));
        for table in &doc.tables {
            output.push_str(&table.markdown);
            output.push_str("\n\n");
        }
    }

    output
}
