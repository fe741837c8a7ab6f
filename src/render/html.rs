//! HTML rendering.

use super::table::escape_html;
use crate::model::Document;

/// Convert a document to a standalone HTML page.
///
/// Contains the page count, the running text and every table's
/// pre-rendered markup. Images and formulas are not included.
pub fn to_html(doc: &Document) -> String {
    let mut output = String::from("<html><body>");
    output.push_str("<h1>Extracted Document</h1>");
    output.push_str(&format!("<p>Pages: {}</p>", doc.metadata.total_pages));

    if !doc.text.is_empty() {
        output.push_str("<h2>Text Content</h2>");
        output.push_str(&format!("<p>{}</p>", escape_html(&doc.text)));
    }

    if !doc.tables.is_empty() {
        output.push_str(&format!("<h2>Tables ({})</h2>", doc.tables.len()));
        for table in &doc.tables {
            output.push_str(&table.html);
        }
    }

    output.push_str("</body></html>");
    output
}
